use anyhow::anyhow;
use poll_render::PollPayload;
use reqwest::Url;
use serde::Serialize;

#[derive(Debug, Serialize)]
struct VoteRequest<'a> {
    option_id: &'a str,
    voter_id: &'a str,
}

#[derive(Clone)]
pub struct Api {
    client: reqwest::Client,
    backend: Url,
}

impl Api {
    pub fn new(backend: &str) -> anyhow::Result<Self> {
        Ok(Self {
            client: reqwest::Client::new(),
            backend: Url::parse(backend)?,
        })
    }

    fn endpoint(&self, segments: &[&str]) -> anyhow::Result<Url> {
        let mut url = self.backend.clone();
        url.path_segments_mut()
            .map_err(|_| anyhow!("{} cannot be used as a base URL", self.backend))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    pub fn view_url(&self, poll_id: &str, voter_id: &str) -> anyhow::Result<Url> {
        let mut url = self.endpoint(&["polls", poll_id, "view"])?;
        url.query_pairs_mut().append_pair("voter", voter_id);
        Ok(url)
    }

    pub async fn fetch_poll(&self, poll_id: &str) -> anyhow::Result<PollPayload> {
        let response = self
            .client
            .get(self.endpoint(&["polls", poll_id])?)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await?;
            anyhow::bail!("API error ({}): {}", status, text);
        }

        Ok(response.json().await?)
    }

    pub async fn submit_vote(
        &self,
        poll_id: &str,
        option_id: &str,
        voter_id: &str,
    ) -> anyhow::Result<PollPayload> {
        let response = self
            .client
            .post(self.endpoint(&["polls", poll_id, "vote"])?)
            .json(&VoteRequest { option_id, voter_id })
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await?;
            anyhow::bail!("Vote failed ({}): {}", status, text);
        }

        Ok(response.json().await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_escaped_endpoints() {
        let api = Api::new("http://localhost:3000").unwrap();

        assert_eq!(
            api.endpoint(&["polls", "p 1"]).unwrap().as_str(),
            "http://localhost:3000/polls/p%201"
        );
        assert_eq!(
            api.view_url("p1", "ada&co").unwrap().as_str(),
            "http://localhost:3000/polls/p1/view?voter=ada%26co"
        );
    }

    #[test]
    fn keeps_backend_path_prefix() {
        let api = Api::new("https://civic.example/api/").unwrap();

        assert_eq!(
            api.endpoint(&["polls", "p1", "vote"]).unwrap().as_str(),
            "https://civic.example/api/polls/p1/vote"
        );
    }
}
