use std::collections::HashSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

// ===== Poll =====

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PollOption {
    pub id: String,
    pub text: String,
    #[serde(default)]
    pub emoji: Option<String>,
    #[serde(default, alias = "image")]
    pub image_url: Option<String>,
    /// Absent until the data source reveals results.
    #[serde(default)]
    pub vote_count: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Poll {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    /// Display order, never re-sorted.
    #[serde(default)]
    pub options: Vec<PollOption>,
    #[serde(default)]
    pub total_votes: Option<u64>,
    #[serde(default)]
    pub expires_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub region: Option<String>,
}

impl Poll {
    pub fn option(&self, option_id: &str) -> Option<&PollOption> {
        self.options.iter().find(|o| o.id == option_id)
    }

    pub fn validate(&self) -> Result<()> {
        if self.title.trim().is_empty() {
            return Err(Error::MissingTitle {
                poll_id: self.id.clone(),
            });
        }

        let mut seen = HashSet::new();
        for option in &self.options {
            if !seen.insert(option.id.as_str()) {
                return Err(Error::DuplicateOption {
                    poll_id: self.id.clone(),
                    option_id: option.id.clone(),
                });
            }
        }

        Ok(())
    }
}

// ===== Template =====

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    /// Parses `#rgb` or `#rrggbb` (leading `#` optional).
    pub fn parse_hex(value: &str) -> Result<Self> {
        let invalid = || Error::InvalidColor(value.to_string());
        let hex = value.trim().trim_start_matches('#');
        if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(invalid());
        }

        let channel = |s: &str| u8::from_str_radix(s, 16).map_err(|_| invalid());
        match hex.len() {
            3 => {
                let expand = |i: usize| channel(&hex[i..=i].repeat(2));
                Ok(Self {
                    r: expand(0)?,
                    g: expand(1)?,
                    b: expand(2)?,
                })
            }
            6 => Ok(Self {
                r: channel(&hex[0..2])?,
                g: channel(&hex[2..4])?,
                b: channel(&hex[4..6])?,
            }),
            _ => Err(invalid()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorSlot {
    Background,
    Primary,
    Secondary,
    Accent,
    Text,
}

impl ColorSlot {
    fn default_hex(self) -> &'static str {
        match self {
            ColorSlot::Background => "#ffffff",
            ColorSlot::Primary => "#2563eb",
            ColorSlot::Secondary => "#64748b",
            ColorSlot::Accent => "#f59e0b",
            ColorSlot::Text => "#0f172a",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ColorTheme {
    pub background: String,
    pub primary: String,
    pub secondary: String,
    pub accent: String,
    pub text: String,
}

impl Default for ColorTheme {
    fn default() -> Self {
        Self {
            background: ColorSlot::Background.default_hex().to_string(),
            primary: ColorSlot::Primary.default_hex().to_string(),
            secondary: ColorSlot::Secondary.default_hex().to_string(),
            accent: ColorSlot::Accent.default_hex().to_string(),
            text: ColorSlot::Text.default_hex().to_string(),
        }
    }
}

impl ColorTheme {
    pub fn hex(&self, slot: ColorSlot) -> &str {
        match slot {
            ColorSlot::Background => &self.background,
            ColorSlot::Primary => &self.primary,
            ColorSlot::Secondary => &self.secondary,
            ColorSlot::Accent => &self.accent,
            ColorSlot::Text => &self.text,
        }
    }

    /// Resolved color for a slot. A malformed value falls back to the
    /// default palette instead of failing the render.
    pub fn rgb(&self, slot: ColorSlot) -> Rgb {
        Rgb::parse_hex(self.hex(slot)).unwrap_or_else(|e| {
            tracing::warn!("{e}, using default for {slot:?}");
            Rgb::parse_hex(slot.default_hex()).unwrap_or(Rgb { r: 0, g: 0, b: 0 })
        })
    }

    /// Normalized `#rrggbb` form, safe to embed in markup.
    pub fn css(&self, slot: ColorSlot) -> String {
        let Rgb { r, g, b } = self.rgb(slot);
        format!("#{r:02x}{g:02x}{b:02x}")
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FeatureFlags {
    pub has_flag_badge: bool,
    pub has_progress_bars: bool,
    pub has_animations: bool,
    /// `None` follows the `show_results` flag.
    pub show_total_votes: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Template {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub style_name: String,
    /// Kept as a raw string so unknown layouts still deserialize.
    #[serde(default)]
    pub layout_type: String,
    #[serde(default, alias = "color_theme")]
    pub colors: ColorTheme,
    #[serde(default, alias = "feature_flags")]
    pub features: FeatureFlags,
}

impl Default for Template {
    fn default() -> Self {
        Self {
            id: "default".to_string(),
            name: "Default".to_string(),
            style_name: "classic".to_string(),
            layout_type: "card".to_string(),
            colors: ColorTheme::default(),
            features: FeatureFlags::default(),
        }
    }
}

// ===== Wire payloads =====

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PollPayload {
    pub poll: Poll,
    pub template: Template,
}
