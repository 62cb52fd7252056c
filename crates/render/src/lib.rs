//! Template-driven poll rendering.
//!
//! A [`Template`]'s `layout_type` picks one of ten layouts, which map onto
//! six renderers. A [`RenderSession`] owns the per-viewer state of one poll
//! display and produces a [`PollView`], which hosts turn into HTML
//! ([`html`]) or terminal output.

pub mod countdown;
pub mod error;
pub mod html;
pub mod layout;
pub mod models;
pub mod percentage;
pub mod session;
pub mod view;

pub use countdown::{Clock, CountdownState, CountdownTicker, SystemClock, format_clock};
pub use error::{Error, Result};
pub use layout::{LayoutType, Renderer};
pub use models::{ColorSlot, ColorTheme, FeatureFlags, Poll, PollOption, PollPayload, Rgb, Template};
pub use percentage::{format_percentage, vote_percentage};
pub use session::{RenderSession, RenderState, VoteOutcome, VoteSink};
pub use view::{OptionResult, OptionStyle, OptionView, PollView, SlideIndicator, TimerView, render};
