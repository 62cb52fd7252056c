mod api;
mod display;

use std::path::PathBuf;

use api::Api;
use chrono::Utc;
use clap::Parser;
use colored::*;
use poll_render::{
    CountdownState, CountdownTicker, PollPayload, RenderSession, Renderer, SystemClock, VoteOutcome,
    VoteSink,
};
use tokio::{
    io::{AsyncBufReadExt, BufReader},
    sync::{mpsc, watch},
};
use tracing_subscriber::EnvFilter;

// ===== Args =====

#[derive(Parser, Debug)]
#[command(about = "Vote on a civic poll from the terminal")]
struct Args {
    /// Poll to display
    poll_id: String,

    #[arg(long, env = "BACKEND_URL", default_value = "http://localhost:3000")]
    backend: String,

    /// Identity sent with votes; the backend accepts one vote per voter
    #[arg(long, env = "POLL_VOTER_ID")]
    voter: String,

    /// Read the poll from a JSON file instead of the backend; votes are
    /// tallied locally
    #[arg(long)]
    file: Option<PathBuf>,

    /// Reveal results before voting
    #[arg(long)]
    results: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Command {
    Vote(usize),
    VoteShown,
    Next,
    Previous,
    GoTo(usize),
    ToggleResults,
    Open,
    Quit,
    Invalid,
}

fn parse_command(input: &str) -> Command {
    let input = input.trim().to_lowercase();
    let mut words = input.split_whitespace();
    let head = words.next().unwrap_or("");

    match head {
        "n" | "next" => Command::Next,
        "p" | "prev" | "previous" => Command::Previous,
        "v" | "vote" => Command::VoteShown,
        "r" | "results" => Command::ToggleResults,
        "o" | "open" => Command::Open,
        "q" | "quit" => Command::Quit,
        "g" | "go" => match words.next().and_then(|n| n.parse::<usize>().ok()) {
            Some(n) if n > 0 => Command::GoTo(n - 1),
            _ => Command::Invalid,
        },
        number => match number.parse::<usize>() {
            Ok(n) if n > 0 => Command::Vote(n - 1),
            _ => Command::Invalid,
        },
    }
}

// ===== Vote sink =====

/// Hands votes to the forwarding task without waiting on it.
struct ChannelSink(mpsc::UnboundedSender<String>);

impl VoteSink for ChannelSink {
    fn cast(&mut self, option_id: &str) {
        if self.0.send(option_id.to_string()).is_err() {
            tracing::warn!("Vote forwarder is gone, dropping vote for {option_id}");
        }
    }
}

fn tally_locally(payload: &mut PollPayload, option_id: &str) {
    if let Some(option) = payload.poll.options.iter_mut().find(|o| o.id == option_id) {
        option.vote_count = Some(option.vote_count.unwrap_or(0) + 1);
        payload.poll.total_votes = Some(payload.poll.total_votes.unwrap_or(0) + 1);
    }
}

enum Source {
    Backend(Api),
    Local(PollPayload),
}

fn spawn_forwarder(
    source: Source,
    poll_id: String,
    voter_id: String,
    mut votes: mpsc::UnboundedReceiver<String>,
    refreshed: mpsc::UnboundedSender<PollPayload>,
) {
    tokio::spawn(async move {
        let mut source = source;
        while let Some(option_id) = votes.recv().await {
            let payload = match &mut source {
                Source::Backend(api) => match api.submit_vote(&poll_id, &option_id, &voter_id).await {
                    Ok(payload) => payload,
                    Err(e) => {
                        eprintln!("{} {}", "❌".red(), e);
                        continue;
                    }
                },
                Source::Local(payload) => {
                    tally_locally(payload, &option_id);
                    payload.clone()
                }
            };

            if refreshed.send(payload).is_err() {
                break;
            }
        }
    });
}

async fn next_countdown(slot: &mut Option<watch::Receiver<CountdownState>>) -> CountdownState {
    if let Some(rx) = slot {
        if rx.changed().await.is_ok() {
            return *rx.borrow_and_update();
        }
        *slot = None;
    }
    std::future::pending().await
}

// ===== Main =====

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .init();

    let args = Args::parse();
    let api = Api::new(&args.backend)?;

    println!("{}", "=".repeat(60).bright_cyan());
    println!("{}", "    🗳️  CIVIC POLLS 🗳️".bright_yellow().bold());
    println!("{}", "=".repeat(60).bright_cyan());
    println!();

    let (payload, source) = match &args.file {
        Some(path) => {
            let payload: PollPayload = serde_json::from_str(&std::fs::read_to_string(path)?)?;
            (payload.clone(), Source::Local(payload))
        }
        None => {
            println!("Fetching poll {}...", args.poll_id);
            (api.fetch_poll(&args.poll_id).await?, Source::Backend(api.clone()))
        }
    };

    if let Err(e) = payload.poll.validate() {
        eprintln!("{} {}", "⚠️ ".yellow(), e);
    }

    let (vote_tx, vote_rx) = mpsc::unbounded_channel();
    let (poll_tx, poll_rx) = mpsc::unbounded_channel();
    spawn_forwarder(source, payload.poll.id.clone(), args.voter.clone(), vote_rx, poll_tx);

    let session = RenderSession::new(payload.poll, payload.template, ChannelSink(vote_tx), Utc::now())
        .with_results(args.results);

    voting_loop(session, poll_rx, &api, &args).await
}

// ===== Voting Loop =====

async fn voting_loop(
    mut session: RenderSession<ChannelSink>,
    mut refreshed: mpsc::UnboundedReceiver<PollPayload>,
    api: &Api,
    args: &Args,
) -> anyhow::Result<()> {
    // Lives exactly as long as this loop; dropping it stops the clock.
    let mut ticker = (session.renderer() == Renderer::Flash)
        .then(|| CountdownTicker::spawn(session.poll().expires_at, SystemClock));
    let mut countdown = ticker.as_ref().map(|t| t.subscribe());

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    display::draw(&session.view(), &session.template().colors);

    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line? else {
                    break;
                };

                match parse_command(&line) {
                    Command::Quit => {
                        println!();
                        println!("{}", "Thanks for voting! 👋".bright_cyan().bold());
                        break;
                    }
                    Command::Vote(index) => {
                        let option_id = session.view().options.get(index).map(|o| o.id.clone());
                        match option_id {
                            Some(option_id) => report(session.cast_vote(&option_id)),
                            None => println!("{}", "No such option.".red()),
                        }
                    }
                    Command::VoteShown => report(session.vote_current()),
                    Command::Next => {
                        session.next_slide();
                    }
                    Command::Previous => {
                        session.previous_slide();
                    }
                    Command::GoTo(index) => {
                        if !session.go_to_slide(index) {
                            println!("{}", "No such slide.".red());
                        }
                    }
                    Command::ToggleResults => {
                        let show = !session.state().show_results;
                        session.set_show_results(show);
                    }
                    Command::Open => {
                        let url = api.view_url(&args.poll_id, &args.voter)?;
                        if let Err(e) = webbrowser::open(url.as_str()) {
                            eprintln!("{} {}", "⚠️  Could not open browser automatically:".yellow(), e);
                            println!("{}", url.as_str().bright_blue().underline());
                        }
                        continue;
                    }
                    Command::Invalid => {
                        println!("{}", "Invalid choice. Please try again.".red());
                        continue;
                    }
                }
                display::draw(&session.view(), &session.template().colors);
            }
            Some(payload) = refreshed.recv() => {
                let moved = payload.poll.expires_at != session.poll().expires_at;
                session.update_poll(payload.poll, Utc::now());
                if moved && session.renderer() == Renderer::Flash {
                    ticker = Some(CountdownTicker::spawn(session.poll().expires_at, SystemClock));
                    countdown = ticker.as_ref().map(|t| t.subscribe());
                }
                session.set_show_results(true);
                display::draw(&session.view(), &session.template().colors);
            }
            state = next_countdown(&mut countdown) => {
                session.apply_countdown(state);
                if state == CountdownState::Expired {
                    display::draw(&session.view(), &session.template().colors);
                }
            }
        }
    }

    Ok(())
}

fn report(outcome: VoteOutcome) {
    match outcome {
        VoteOutcome::Cast => println!("{}", "✓ Vote sent".green()),
        VoteOutcome::AlreadyVoted => println!("{}", "You already voted on this poll.".yellow()),
        VoteOutcome::Expired => println!("{}", "⏱  This poll has closed.".red()),
        VoteOutcome::UnknownOption => println!("{}", "No such option.".red()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use poll_render::{Poll, PollOption, Template};

    #[test]
    fn parses_commands() {
        assert_eq!(parse_command("2"), Command::Vote(1));
        assert_eq!(parse_command(" N "), Command::Next);
        assert_eq!(parse_command("prev"), Command::Previous);
        assert_eq!(parse_command("g 3"), Command::GoTo(2));
        assert_eq!(parse_command("v"), Command::VoteShown);
        assert_eq!(parse_command("R"), Command::ToggleResults);
        assert_eq!(parse_command("q"), Command::Quit);
        assert_eq!(parse_command("0"), Command::Invalid);
        assert_eq!(parse_command("g"), Command::Invalid);
        assert_eq!(parse_command("maybe"), Command::Invalid);
        assert_eq!(parse_command(""), Command::Invalid);
    }

    #[test]
    fn voter_identity_is_required() {
        if std::env::var_os("POLL_VOTER_ID").is_some() {
            return;
        }
        assert!(Args::try_parse_from(["poll_client", "p1"]).is_err());

        let args = Args::try_parse_from(["poll_client", "p1", "--voter", "ana"]).unwrap();
        assert_eq!(args.voter, "ana");
        assert!(!args.results);
    }

    fn payload() -> PollPayload {
        PollPayload {
            poll: Poll {
                id: "p".into(),
                title: "Pilot Scheme".into(),
                description: None,
                options: vec![PollOption {
                    id: "a".into(),
                    text: "Yes".into(),
                    emoji: None,
                    image_url: None,
                    vote_count: None,
                }],
                total_votes: None,
                expires_at: None,
                region: None,
            },
            template: Template::default(),
        }
    }

    #[test]
    fn local_tally_counts_known_options_only() {
        let mut p = payload();
        tally_locally(&mut p, "a");
        tally_locally(&mut p, "zzz");

        assert_eq!(p.poll.options[0].vote_count, Some(1));
        assert_eq!(p.poll.total_votes, Some(1));
    }

    #[tokio::test]
    async fn votes_flow_through_the_forwarder() {
        let (vote_tx, vote_rx) = mpsc::unbounded_channel();
        let (poll_tx, mut poll_rx) = mpsc::unbounded_channel();
        spawn_forwarder(Source::Local(payload()), "p".into(), "v".into(), vote_rx, poll_tx);

        let p = payload();
        let mut session = RenderSession::new(p.poll, p.template, ChannelSink(vote_tx), Utc::now());
        assert_eq!(session.cast_vote("a"), VoteOutcome::Cast);
        assert_eq!(session.cast_vote("a"), VoteOutcome::AlreadyVoted);

        let refreshed = poll_rx.recv().await.unwrap();
        assert_eq!(refreshed.poll.total_votes, Some(1));

        session.update_poll(refreshed.poll, Utc::now());
        session.set_show_results(true);
        assert_eq!(session.view().options[0].result.unwrap().votes, 1);
    }
}
