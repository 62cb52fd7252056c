use chrono::{DateTime, Utc};
use poll_render::{ColorTheme, FeatureFlags, PollOption, Template};
use serde::Deserialize;
use sqlx::types::Json;

// ===== Rows =====

#[derive(Debug, sqlx::FromRow)]
pub struct TemplateRow {
    pub id: String,
    pub name: String,
    pub style_name: String,
    pub layout_type: String,
    pub colors: Json<ColorTheme>,
    pub features: Json<FeatureFlags>,
}

impl From<TemplateRow> for Template {
    fn from(row: TemplateRow) -> Self {
        Template {
            id: row.id,
            name: row.name,
            style_name: row.style_name,
            layout_type: row.layout_type,
            colors: row.colors.0,
            features: row.features.0,
        }
    }
}

#[derive(Debug, sqlx::FromRow)]
pub struct PollRow {
    pub id: String,
    pub title: String,
    pub description: Option<String>,
    pub expires_at: Option<DateTime<Utc>>,
    pub region: Option<String>,
    pub template_id: Option<String>,
}

#[derive(Debug, sqlx::FromRow)]
pub struct OptionRow {
    pub id: String,
    pub text: String,
    pub emoji: Option<String>,
    pub image_url: Option<String>,
    pub vote_count: i64,
}

impl From<OptionRow> for PollOption {
    fn from(row: OptionRow) -> Self {
        PollOption {
            id: row.id,
            text: row.text,
            emoji: row.emoji,
            image_url: row.image_url,
            vote_count: Some(row.vote_count.max(0) as u64),
        }
    }
}

// ===== Requests =====

#[derive(Debug, Deserialize)]
pub struct VoteRequest {
    pub option_id: String,
    pub voter_id: String,
}

/// Posted by the option buttons of the HTML view.
#[derive(Debug, Deserialize)]
pub struct BallotForm {
    pub option_id: String,
    pub voter_id: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ViewParams {
    pub voter: Option<String>,
    pub show_results: Option<bool>,
    pub slide: Option<usize>,
}
