//! One display session of a poll: the ephemeral render state, the client-side
//! vote guards and carousel navigation.

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::debug;

use crate::{
    countdown::CountdownState,
    layout::{LayoutType, Renderer},
    models::{Poll, Template},
    view::{PollView, render},
};

/// Receives cast votes. Fire-and-forget: the session never waits on it.
pub trait VoteSink {
    fn cast(&mut self, option_id: &str);
}

impl<F: FnMut(&str)> VoteSink for F {
    fn cast(&mut self, option_id: &str) {
        self(option_id)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RenderState {
    pub has_voted: bool,
    pub selected_option: Option<String>,
    pub show_results: bool,
    /// Seconds remaining, flash polls only.
    pub time_left: Option<u64>,
    /// Carousel polls only.
    pub current_slide: usize,
}

impl RenderState {
    pub fn countdown(&self) -> CountdownState {
        match self.time_left {
            None => CountdownState::Inactive,
            Some(0) => CountdownState::Expired,
            Some(seconds_left) => CountdownState::Counting { seconds_left },
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum VoteOutcome {
    Cast,
    AlreadyVoted,
    Expired,
    UnknownOption,
}

pub struct RenderSession<S> {
    poll: Poll,
    template: Template,
    layout: LayoutType,
    state: RenderState,
    sink: S,
}

impl<S: VoteSink> RenderSession<S> {
    /// Mounts a session. `now` seeds the countdown of flash polls.
    pub fn new(poll: Poll, template: Template, sink: S, now: DateTime<Utc>) -> Self {
        let layout = LayoutType::resolve(&template.layout_type);
        let mut session = Self {
            poll,
            template,
            layout,
            state: RenderState::default(),
            sink,
        };
        session.tick(now);
        session
    }

    /// Restores a vote the viewer cast in an earlier session.
    pub fn with_vote(mut self, option_id: Option<String>) -> Self {
        self.state.has_voted = option_id.is_some();
        self.state.selected_option = option_id;
        self
    }

    pub fn with_results(mut self, show_results: bool) -> Self {
        self.state.show_results = show_results;
        self
    }

    pub fn poll(&self) -> &Poll {
        &self.poll
    }

    pub fn template(&self) -> &Template {
        &self.template
    }

    pub fn layout(&self) -> LayoutType {
        self.layout
    }

    pub fn renderer(&self) -> Renderer {
        self.layout.renderer()
    }

    pub fn state(&self) -> &RenderState {
        &self.state
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn view(&self) -> PollView {
        render(&self.poll, &self.template, &self.state)
    }

    // ===== Countdown =====

    pub fn tick(&mut self, now: DateTime<Utc>) -> CountdownState {
        let state = CountdownState::at(now, self.poll.expires_at);
        self.apply_countdown(state);
        state
    }

    /// Takes a state published by a [`crate::CountdownTicker`].
    pub fn apply_countdown(&mut self, countdown: CountdownState) {
        if self.renderer() == Renderer::Flash {
            self.state.time_left = countdown.time_left();
        }
    }

    pub fn is_expired(&self) -> bool {
        self.renderer() == Renderer::Flash && self.state.countdown().is_expired()
    }

    // ===== Voting =====

    pub fn cast_vote(&mut self, option_id: &str) -> VoteOutcome {
        if self.state.has_voted {
            debug!("Ignoring vote for {option_id}: already voted");
            return VoteOutcome::AlreadyVoted;
        }
        if self.is_expired() {
            debug!("Ignoring vote for {option_id}: poll {} expired", self.poll.id);
            return VoteOutcome::Expired;
        }
        if self.poll.option(option_id).is_none() {
            debug!("Ignoring vote for unknown option {option_id}");
            return VoteOutcome::UnknownOption;
        }

        self.state.has_voted = true;
        self.state.selected_option = Some(option_id.to_string());
        self.sink.cast(option_id);
        VoteOutcome::Cast
    }

    /// Votes for the option on the current slide.
    pub fn vote_current(&mut self) -> VoteOutcome {
        match self.poll.options.get(self.state.current_slide) {
            Some(option) => {
                let option_id = option.id.clone();
                self.cast_vote(&option_id)
            }
            None => VoteOutcome::UnknownOption,
        }
    }

    /// Fed back by the data layer, e.g. with refreshed vote counts. The
    /// countdown is re-derived at `now` in case `expires_at` moved.
    pub fn update_poll(&mut self, poll: Poll, now: DateTime<Utc>) {
        self.poll = poll;
        self.state.current_slide = self.state.current_slide.min(self.last_slide());
        self.tick(now);
    }

    pub fn set_show_results(&mut self, show_results: bool) {
        self.state.show_results = show_results;
    }

    pub fn set_has_voted(&mut self, has_voted: bool) {
        self.state.has_voted = has_voted;
    }

    // ===== Carousel =====

    fn last_slide(&self) -> usize {
        self.poll.options.len().saturating_sub(1)
    }

    pub fn current_slide(&self) -> usize {
        self.state.current_slide
    }

    pub fn next_slide(&mut self) -> usize {
        self.state.current_slide = (self.state.current_slide + 1).min(self.last_slide());
        self.state.current_slide
    }

    pub fn previous_slide(&mut self) -> usize {
        self.state.current_slide = self.state.current_slide.saturating_sub(1);
        self.state.current_slide
    }

    /// Returns false and leaves the slide alone when `index` is out of range.
    pub fn go_to_slide(&mut self, index: usize) -> bool {
        if index >= self.poll.options.len() {
            return false;
        }
        self.state.current_slide = index;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::PollOption;
    use chrono::TimeDelta;

    fn poll(ids: &[&str]) -> Poll {
        Poll {
            id: "p".into(),
            title: "Night market".into(),
            description: None,
            options: ids
                .iter()
                .map(|id| PollOption {
                    id: id.to_string(),
                    text: id.to_uppercase(),
                    emoji: None,
                    image_url: None,
                    vote_count: None,
                })
                .collect(),
            total_votes: None,
            expires_at: None,
            region: None,
        }
    }

    fn template(layout: &str) -> Template {
        Template {
            layout_type: layout.into(),
            ..Template::default()
        }
    }

    #[derive(Default)]
    struct Recorder(Vec<String>);

    impl VoteSink for Recorder {
        fn cast(&mut self, option_id: &str) {
            self.0.push(option_id.to_string());
        }
    }

    fn session(p: Poll, layout: &str) -> RenderSession<Recorder> {
        RenderSession::new(p, template(layout), Recorder::default(), Utc::now())
    }

    #[test]
    fn second_vote_never_reaches_the_sink() {
        let mut s = session(poll(&["a", "b"]), "card");

        assert_eq!(s.cast_vote("a"), VoteOutcome::Cast);
        assert_eq!(s.cast_vote("b"), VoteOutcome::AlreadyVoted);
        assert_eq!(s.sink().0, ["a"]);
        assert_eq!(s.state().selected_option.as_deref(), Some("a"));
    }

    #[test]
    fn restored_vote_blocks_voting() {
        let mut s = session(poll(&["a", "b"]), "ballot").with_vote(Some("b".into()));

        assert_eq!(s.cast_vote("a"), VoteOutcome::AlreadyVoted);
        assert!(s.sink().0.is_empty());
    }

    #[test]
    fn unknown_option_is_ignored() {
        let mut s = session(poll(&["a"]), "card");

        assert_eq!(s.cast_vote("zzz"), VoteOutcome::UnknownOption);
        assert!(!s.state().has_voted);
        assert!(s.sink().0.is_empty());
    }

    #[test]
    fn closures_are_sinks() {
        let mut seen = Vec::new();
        {
            let mut s = RenderSession::new(
                poll(&["a"]),
                template("card"),
                |id: &str| seen.push(id.to_string()),
                Utc::now(),
            );
            s.cast_vote("a");
            s.cast_vote("a");
        }
        assert_eq!(seen, ["a"]);
    }

    #[test]
    fn expired_flash_poll_rejects_votes() {
        let now = Utc::now();
        let mut p = poll(&["a", "b"]);
        p.expires_at = Some(now + TimeDelta::seconds(10));
        let mut s = RenderSession::new(p, template("flash"), Recorder::default(), now);
        assert_eq!(s.state().time_left, Some(10));

        s.tick(now + TimeDelta::seconds(11));
        assert!(s.is_expired());
        assert_eq!(s.cast_vote("a"), VoteOutcome::Expired);
        assert!(s.sink().0.is_empty());
        assert!(s.view().expired);
    }

    #[test]
    fn expiry_only_guards_flash_polls() {
        let now = Utc::now();
        let mut p = poll(&["a"]);
        p.expires_at = Some(now - TimeDelta::seconds(60));
        let mut s = RenderSession::new(p, template("card"), Recorder::default(), now);

        assert_eq!(s.state().time_left, None);
        assert_eq!(s.cast_vote("a"), VoteOutcome::Cast);
    }

    #[test]
    fn carousel_clamps_both_ends() {
        let mut s = session(poll(&["a", "b", "c"]), "carousel");

        assert_eq!(s.previous_slide(), 0);
        assert_eq!(s.next_slide(), 1);
        assert_eq!(s.next_slide(), 2);
        assert_eq!(s.next_slide(), 2);
        assert!(!s.go_to_slide(3));
        assert_eq!(s.current_slide(), 2);
        assert!(s.go_to_slide(0));
        assert_eq!(s.current_slide(), 0);
    }

    #[test]
    fn carousel_votes_the_displayed_option() {
        let mut s = session(poll(&["a", "b", "c"]), "carousel");
        s.next_slide();
        s.next_slide();

        assert_eq!(s.vote_current(), VoteOutcome::Cast);
        assert_eq!(s.sink().0, ["c"]);
    }

    #[test]
    fn empty_carousel_stays_at_zero() {
        let mut s = session(poll(&[]), "carousel");

        assert_eq!(s.next_slide(), 0);
        assert_eq!(s.previous_slide(), 0);
        assert_eq!(s.vote_current(), VoteOutcome::UnknownOption);
    }

    #[test]
    fn shrinking_poll_clamps_slide() {
        let mut s = session(poll(&["a", "b", "c"]), "carousel");
        s.go_to_slide(2);

        s.update_poll(poll(&["a"]), Utc::now());
        assert_eq!(s.current_slide(), 0);
    }

    #[test]
    fn refreshed_expiry_resets_the_clock() {
        let now = Utc::now();
        let mut p = poll(&["a", "b"]);
        p.expires_at = Some(now + TimeDelta::seconds(30));
        let mut s = RenderSession::new(p.clone(), template("flash"), Recorder::default(), now);
        assert_eq!(s.state().time_left, Some(30));

        p.expires_at = Some(now + TimeDelta::seconds(90));
        s.update_poll(p.clone(), now);
        assert_eq!(s.state().time_left, Some(90));

        p.expires_at = Some(now - TimeDelta::seconds(1));
        s.update_poll(p, now);
        assert!(s.is_expired());
        assert_eq!(s.cast_vote("a"), VoteOutcome::Expired);
    }
}
