//! Static HTML for a [`PollView`], themed with the template's colors.

use std::fmt::Write as _;

use crate::{
    layout::Renderer,
    models::{ColorSlot, ColorTheme},
    percentage::format_percentage,
    view::{OptionStyle, OptionView, PollView},
};

/// Where the option buttons post to. Without one the options render as
/// plain, non-submitting buttons.
#[derive(Debug, Clone, Default)]
pub struct VoteForm {
    pub action: String,
    pub voter_id: Option<String>,
    /// Explicit results toggle from the current URL, carried into slide links.
    pub show_results: Option<bool>,
}

impl VoteForm {
    /// Query string for the carousel dot at `slide`, keeping the viewer's
    /// identity and results toggle. Not yet HTML-escaped.
    pub fn slide_query(&self, slide: usize) -> String {
        let mut query = String::from("?");
        if let Some(voter_id) = &self.voter_id {
            let _ = write!(query, "voter={}&", urlencoding::encode(voter_id));
        }
        if let Some(show_results) = self.show_results {
            let _ = write!(query, "show_results={show_results}&");
        }
        let _ = write!(query, "slide={slide}");
        query
    }
}

/// Escape text for HTML bodies and attribute values.
pub fn escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for ch in s.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            _ => out.push(ch),
        }
    }
    out
}

fn renderer_class(renderer: Renderer) -> &'static str {
    match renderer {
        Renderer::Card => "card",
        Renderer::Ballot => "ballot",
        Renderer::BarChart => "bar-chart",
        Renderer::EmojiBurst => "emoji-burst",
        Renderer::Flash => "flash",
        Renderer::Carousel => "carousel",
    }
}

pub fn render_page(view: &PollView, theme: &ColorTheme, form: Option<&VoteForm>) -> String {
    let mut out = String::with_capacity(4 * 1024);
    let _ = write!(
        out,
        "<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n<title>{}</title>\n<style>\n{}</style>\n</head>\n<body>\n",
        escape(&view.title),
        stylesheet(theme)
    );
    out.push_str(&render_fragment(view, form));
    out.push_str("</body>\n</html>\n");
    out
}

fn stylesheet(theme: &ColorTheme) -> String {
    format!(
        ":root {{ --bg: {}; --primary: {}; --secondary: {}; --accent: {}; --text: {}; }}\n\
         body {{ background: var(--bg); color: var(--text); font-family: sans-serif; }}\n\
         .poll {{ max-width: 40rem; margin: 2rem auto; }}\n\
         .badge {{ background: var(--accent); border-radius: 1rem; padding: 0 .5rem; }}\n\
         .option button {{ border: 2px solid var(--primary); background: none; color: inherit; width: 100%; text-align: left; }}\n\
         .option.selected button {{ background: var(--primary); color: var(--bg); }}\n\
         .bar {{ background: var(--secondary); height: .5rem; }}\n\
         .bar > div {{ background: var(--accent); height: 100%; }}\n\
         .timer.expired, .closed {{ color: var(--accent); font-weight: bold; }}\n\
         .poll.animated .option {{ transition: transform .2s; }}\n",
        theme.css(ColorSlot::Background),
        theme.css(ColorSlot::Primary),
        theme.css(ColorSlot::Secondary),
        theme.css(ColorSlot::Accent),
        theme.css(ColorSlot::Text),
    )
}

pub fn render_fragment(view: &PollView, form: Option<&VoteForm>) -> String {
    let mut out = String::new();
    let animated = if view.animated { " animated" } else { "" };
    let _ = writeln!(
        out,
        "<section class=\"poll poll--{}{animated}\">",
        renderer_class(view.renderer)
    );

    out.push_str("<header>\n");
    let _ = writeln!(out, "<h1>{}</h1>", escape(&view.title));
    if let Some(region) = &view.region_badge {
        let _ = writeln!(out, "<span class=\"badge\">{}</span>", escape(region));
    }
    if let Some(description) = &view.description {
        let _ = writeln!(out, "<p>{}</p>", escape(description));
    }
    if let Some(timer) = &view.timer {
        let class = if timer.expired { "timer expired" } else { "timer" };
        let _ = writeln!(out, "<div class=\"{class}\">⏱ {}</div>", escape(&timer.label));
    }
    out.push_str("</header>\n");

    if view.expired {
        out.push_str("<p class=\"closed\">This poll has closed</p>\n");
    }

    let submitting = form.filter(|_| view.options.iter().any(|o| o.interactive));
    if let Some(form) = submitting {
        let _ = writeln!(out, "<form method=\"post\" action=\"{}\">", escape(&form.action));
        if let Some(voter_id) = &form.voter_id {
            let _ = writeln!(
                out,
                "<input type=\"hidden\" name=\"voter_id\" value=\"{}\">",
                escape(voter_id)
            );
        }
    }

    out.push_str("<ul class=\"options\">\n");
    for option in &view.options {
        render_option(&mut out, option, submitting.is_some());
    }
    out.push_str("</ul>\n");

    if submitting.is_some() {
        out.push_str("</form>\n");
    }

    if let Some(slides) = view.slides {
        out.push_str("<nav class=\"slides\">");
        for i in 0..slides.total {
            let (dot, current) = if i == slides.current {
                ("●", " aria-current=\"true\"")
            } else {
                ("○", "")
            };
            let href = match form {
                Some(form) => form.slide_query(i),
                None => format!("?slide={i}"),
            };
            let _ = write!(out, "<a href=\"{}\"{current}>{dot}</a>", escape(&href));
        }
        out.push_str("</nav>\n");
    }

    if let Some(total) = view.total_votes {
        let _ = writeln!(out, "<footer>{total} votes</footer>");
    }

    out.push_str("</section>\n");
    out
}

fn render_option(out: &mut String, option: &OptionView, submitting: bool) {
    let selected = if option.selected { " selected" } else { "" };
    let _ = writeln!(out, "<li class=\"option{selected}\">");

    let kind = if submitting { "submit" } else { "button" };
    let disabled = if option.interactive { "" } else { " disabled" };
    let _ = write!(
        out,
        "<button type=\"{kind}\" name=\"option_id\" value=\"{}\"{disabled}>",
        escape(&option.id)
    );

    if let OptionStyle::Ballot { checked } = option.style {
        out.push_str(if checked { "☑ " } else { "☐ " });
    }
    if let Some(emoji) = &option.emoji {
        let _ = write!(out, "<span class=\"emoji\">{}</span> ", escape(emoji));
    }
    if let Some(image_url) = &option.image_url {
        let _ = write!(
            out,
            "<img src=\"{}\" alt=\"{}\"> ",
            escape(image_url),
            escape(&option.text)
        );
    }
    let _ = writeln!(out, "<span class=\"text\">{}</span></button>", escape(&option.text));

    if let Some(bar) = option.bar {
        let _ = writeln!(
            out,
            "<div class=\"bar\"><div style=\"width: {bar:.1}%\"></div></div>"
        );
    }
    if let Some(result) = option.result {
        let _ = writeln!(
            out,
            "<span class=\"result\">{} · {} votes</span>",
            format_percentage(result.percentage),
            result.votes
        );
    }

    out.push_str("</li>\n");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        models::{Poll, PollOption, Template},
        session::RenderState,
        view::render,
    };

    fn poll() -> Poll {
        Poll {
            id: "p".into(),
            title: "Rename <Main> Street?".into(),
            description: None,
            options: vec![
                PollOption {
                    id: "a".into(),
                    text: "\"Yes\" & more".into(),
                    emoji: None,
                    image_url: None,
                    vote_count: Some(30),
                },
                PollOption {
                    id: "b".into(),
                    text: "No".into(),
                    emoji: None,
                    image_url: None,
                    vote_count: Some(70),
                },
            ],
            total_votes: Some(100),
            expires_at: None,
            region: None,
        }
    }

    #[test]
    fn escapes_user_text() {
        let view = render(&poll(), &Template::default(), &RenderState::default());
        let html = render_page(&view, &ColorTheme::default(), None);

        assert!(html.contains("<h1>Rename &lt;Main&gt; Street?</h1>"));
        assert!(html.contains("&quot;Yes&quot; &amp; more"));
        assert!(!html.contains("<Main>"));
    }

    #[test]
    fn results_show_percentages() {
        let state = RenderState {
            show_results: true,
            ..RenderState::default()
        };
        let view = render(&poll(), &Template::default(), &state);
        let html = render_fragment(&view, None);

        assert!(html.contains("30.0% · 30 votes"));
        assert!(html.contains("70.0% · 70 votes"));
        assert!(html.contains("<footer>100 votes</footer>"));
    }

    #[test]
    fn form_only_wraps_interactive_options() {
        let form = VoteForm {
            action: "/polls/p/ballot".into(),
            voter_id: Some("v1".into()),
            show_results: None,
        };

        let open = render(&poll(), &Template::default(), &RenderState::default());
        let html = render_fragment(&open, Some(&form));
        assert!(html.contains("<form method=\"post\" action=\"/polls/p/ballot\">"));
        assert!(html.contains("name=\"voter_id\" value=\"v1\""));

        let voted = RenderState {
            has_voted: true,
            selected_option: Some("b".into()),
            ..RenderState::default()
        };
        let closed = render(&poll(), &Template::default(), &voted);
        let html = render_fragment(&closed, Some(&form));
        assert!(!html.contains("<form"));
        assert!(html.contains("<li class=\"option selected\">"));
        assert!(html.contains("disabled"));
    }

    #[test]
    fn slide_links_keep_voter_and_results() {
        let template = Template {
            layout_type: "carousel".into(),
            ..Template::default()
        };
        let view = render(&poll(), &template, &RenderState::default());
        let form = VoteForm {
            action: "/polls/p/ballot".into(),
            voter_id: Some("ana & bo".into()),
            show_results: Some(true),
        };

        let html = render_fragment(&view, Some(&form));
        assert!(html.contains(
            "<a href=\"?voter=ana%20%26%20bo&amp;show_results=true&amp;slide=1\">○</a>"
        ));
        assert!(html.contains("name=\"voter_id\" value=\"ana &amp; bo\""));

        let html = render_fragment(&view, None);
        assert!(html.contains("<a href=\"?slide=1\">○</a>"));
    }

    #[test]
    fn theme_colors_are_normalized() {
        let theme = ColorTheme {
            background: "#000".into(),
            primary: "\"><script>".into(),
            ..ColorTheme::default()
        };
        let css = stylesheet(&theme);

        assert!(css.contains("--bg: #000000"));
        assert!(css.contains("--primary: #2563eb"));
        assert!(!css.contains("script"));
    }
}
