//! Resolution of a template's `layout_type` string into a renderer.

use std::fmt;

use serde::Serialize;

/// Every layout a template can name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LayoutType {
    Card,
    Ballot,
    BarChart,
    EmojiBurst,
    Radar,
    Flash,
    SideBySide,
    Heatmap,
    Carousel,
    Voice,
}

/// The renderers that actually exist. Radar, side-by-side, heatmap and voice
/// draw through `Card`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Renderer {
    Card,
    Ballot,
    BarChart,
    EmojiBurst,
    Flash,
    Carousel,
}

impl LayoutType {
    pub const ALL: [LayoutType; 10] = [
        LayoutType::Card,
        LayoutType::Ballot,
        LayoutType::BarChart,
        LayoutType::EmojiBurst,
        LayoutType::Radar,
        LayoutType::Flash,
        LayoutType::SideBySide,
        LayoutType::Heatmap,
        LayoutType::Carousel,
        LayoutType::Voice,
    ];

    /// Never fails: anything unrecognized is a card.
    pub fn resolve(layout_type: &str) -> Self {
        let normalized: String = layout_type
            .trim()
            .chars()
            .map(|c| match c {
                '-' | ' ' => '_',
                c => c.to_ascii_lowercase(),
            })
            .collect();

        match normalized.as_str() {
            "card" => LayoutType::Card,
            "ballot" => LayoutType::Ballot,
            "bar_chart" => LayoutType::BarChart,
            "emoji_burst" => LayoutType::EmojiBurst,
            "radar" => LayoutType::Radar,
            "flash" | "countdown" => LayoutType::Flash,
            "side_by_side" => LayoutType::SideBySide,
            "heatmap" => LayoutType::Heatmap,
            "carousel" => LayoutType::Carousel,
            "voice" => LayoutType::Voice,
            other => {
                tracing::debug!("Unknown layout type {other:?}, falling back to card");
                LayoutType::Card
            }
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            LayoutType::Card => "card",
            LayoutType::Ballot => "ballot",
            LayoutType::BarChart => "bar_chart",
            LayoutType::EmojiBurst => "emoji_burst",
            LayoutType::Radar => "radar",
            LayoutType::Flash => "flash",
            LayoutType::SideBySide => "side_by_side",
            LayoutType::Heatmap => "heatmap",
            LayoutType::Carousel => "carousel",
            LayoutType::Voice => "voice",
        }
    }

    pub fn renderer(self) -> Renderer {
        match self {
            LayoutType::Ballot => Renderer::Ballot,
            LayoutType::BarChart => Renderer::BarChart,
            LayoutType::EmojiBurst => Renderer::EmojiBurst,
            LayoutType::Flash => Renderer::Flash,
            LayoutType::Carousel => Renderer::Carousel,
            LayoutType::Card
            | LayoutType::Radar
            | LayoutType::SideBySide
            | LayoutType::Heatmap
            | LayoutType::Voice => Renderer::Card,
        }
    }
}

impl fmt::Display for LayoutType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_layout_round_trips_through_its_name() {
        for layout in LayoutType::ALL {
            assert_eq!(LayoutType::resolve(layout.as_str()), layout);
        }
    }

    #[test]
    fn unknown_layouts_resolve_to_card() {
        for input in ["", "   ", "hologram", "cardd", "BAR CHART!", "🗳️", "radar\0"] {
            assert_eq!(LayoutType::resolve(input), LayoutType::Card, "{input:?}");
        }
    }

    #[test]
    fn resolution_tolerates_case_and_separators() {
        assert_eq!(LayoutType::resolve(" Bar-Chart "), LayoutType::BarChart);
        assert_eq!(LayoutType::resolve("side by side"), LayoutType::SideBySide);
        assert_eq!(LayoutType::resolve("EMOJI_BURST"), LayoutType::EmojiBurst);
        assert_eq!(LayoutType::resolve("countdown"), LayoutType::Flash);
    }

    #[test]
    fn four_layouts_share_the_card_renderer() {
        let card_backed: Vec<_> = LayoutType::ALL
            .into_iter()
            .filter(|l| l.renderer() == Renderer::Card)
            .collect();

        assert_eq!(
            card_backed,
            vec![
                LayoutType::Card,
                LayoutType::Radar,
                LayoutType::SideBySide,
                LayoutType::Heatmap,
                LayoutType::Voice,
            ]
        );
    }
}
