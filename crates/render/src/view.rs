//! The renderer-independent visual tree and the six renderers that build it.

use serde::Serialize;

use crate::{
    countdown::CountdownState,
    layout::{LayoutType, Renderer},
    models::{Poll, PollOption, Template},
    percentage::vote_percentage,
    session::RenderState,
};

const FALLBACK_EMOJI: &str = "🗳️";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PollView {
    pub renderer: Renderer,
    pub title: String,
    pub description: Option<String>,
    pub region_badge: Option<String>,
    pub timer: Option<TimerView>,
    /// Replaces the interactive affordances of an expired flash poll.
    pub expired: bool,
    pub options: Vec<OptionView>,
    pub slides: Option<SlideIndicator>,
    pub total_votes: Option<u64>,
    pub animated: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TimerView {
    pub label: String,
    pub expired: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SlideIndicator {
    pub current: usize,
    pub total: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum OptionStyle {
    Card,
    Ballot { checked: bool },
    Bar,
    Emoji,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct OptionResult {
    pub percentage: f64,
    pub votes: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OptionView {
    pub id: String,
    pub text: String,
    pub emoji: Option<String>,
    pub image_url: Option<String>,
    pub style: OptionStyle,
    pub selected: bool,
    pub interactive: bool,
    pub result: Option<OptionResult>,
    /// Fill of a progress/bar visual in `[0, 100]`.
    pub bar: Option<f64>,
}

pub fn render(poll: &Poll, template: &Template, state: &RenderState) -> PollView {
    let renderer = LayoutType::resolve(&template.layout_type).renderer();
    let mut frame = Frame::new(poll, template, state, renderer);

    match renderer {
        Renderer::Card => frame.card(),
        Renderer::Ballot => frame.ballot(),
        Renderer::BarChart => frame.bar_chart(),
        Renderer::EmojiBurst => frame.emoji_burst(),
        Renderer::Flash => frame.flash(),
        Renderer::Carousel => frame.carousel(),
    }

    frame.view
}

/// Shared pieces every renderer starts from.
struct Frame<'a> {
    poll: &'a Poll,
    template: &'a Template,
    state: &'a RenderState,
    view: PollView,
}

impl<'a> Frame<'a> {
    fn new(poll: &'a Poll, template: &'a Template, state: &'a RenderState, renderer: Renderer) -> Self {
        let features = &template.features;

        let region_badge = if features.has_flag_badge {
            poll.region.clone()
        } else {
            None
        };
        let total_votes = features
            .show_total_votes
            .unwrap_or(state.show_results)
            .then(|| poll.total_votes.unwrap_or(0));

        Self {
            poll,
            template,
            state,
            view: PollView {
                renderer,
                title: poll.title.clone(),
                description: poll.description.clone(),
                region_badge,
                timer: None,
                expired: false,
                options: Vec::new(),
                slides: None,
                total_votes,
                animated: features.has_animations,
            },
        }
    }

    fn option(&self, option: &PollOption, style: OptionStyle) -> OptionView {
        let selected = self.state.selected_option.as_deref() == Some(option.id.as_str());
        let result = self.state.show_results.then(|| OptionResult {
            percentage: vote_percentage(option.vote_count, self.poll.total_votes, true),
            votes: option.vote_count.unwrap_or(0),
        });

        OptionView {
            id: option.id.clone(),
            text: option.text.clone(),
            emoji: option.emoji.clone(),
            image_url: option.image_url.clone(),
            style,
            selected,
            interactive: !self.state.has_voted && !self.view.expired,
            result,
            bar: None,
        }
    }

    fn percentage(&self, option: &PollOption) -> f64 {
        vote_percentage(option.vote_count, self.poll.total_votes, self.state.show_results)
    }

    fn card(&mut self) {
        let progress = self.template.features.has_progress_bars && self.state.show_results;
        self.view.options = self
            .poll
            .options
            .iter()
            .map(|o| OptionView {
                bar: progress.then(|| self.percentage(o)),
                ..self.option(o, OptionStyle::Card)
            })
            .collect();
    }

    fn ballot(&mut self) {
        self.view.options = self
            .poll
            .options
            .iter()
            .map(|o| {
                let mut view = self.option(o, OptionStyle::Card);
                view.style = OptionStyle::Ballot {
                    checked: view.selected,
                };
                view
            })
            .collect();
    }

    fn bar_chart(&mut self) {
        self.view.options = self
            .poll
            .options
            .iter()
            .map(|o| OptionView {
                bar: Some(self.percentage(o)),
                ..self.option(o, OptionStyle::Bar)
            })
            .collect();
    }

    fn emoji_burst(&mut self) {
        self.view.options = self
            .poll
            .options
            .iter()
            .map(|o| {
                let mut view = self.option(o, OptionStyle::Emoji);
                if view.emoji.is_none() {
                    view.emoji = Some(FALLBACK_EMOJI.to_string());
                }
                view
            })
            .collect();
    }

    fn flash(&mut self) {
        let countdown = self.state.countdown();
        self.view.expired = countdown.is_expired();
        self.view.timer = countdown.display().map(|label| TimerView {
            label,
            expired: countdown == CountdownState::Expired,
        });
        self.card();
    }

    fn carousel(&mut self) {
        let total = self.poll.options.len();
        if total == 0 {
            self.view.slides = Some(SlideIndicator { current: 0, total });
            return;
        }

        let current = self.state.current_slide.min(total - 1);
        self.view.slides = Some(SlideIndicator { current, total });
        self.view.options = vec![self.option(&self.poll.options[current], OptionStyle::Card)];
    }
}
