use colored::*;
use poll_render::{
    ColorSlot, ColorTheme, OptionStyle, OptionView, PollView, Renderer, Rgb, format_percentage,
};

const BAR_WIDTH: usize = 24;

fn color(theme: &ColorTheme, slot: ColorSlot) -> Color {
    let Rgb { r, g, b } = theme.rgb(slot);
    Color::TrueColor { r, g, b }
}

pub fn bar(percentage: f64, width: usize) -> String {
    let filled = ((percentage.clamp(0.0, 100.0) / 100.0) * width as f64).round() as usize;
    format!("{}{}", "█".repeat(filled), "░".repeat(width - filled))
}

pub fn draw(view: &PollView, theme: &ColorTheme) {
    for line in lines(view, theme) {
        println!("{line}");
    }
}

pub fn lines(view: &PollView, theme: &ColorTheme) -> Vec<String> {
    let primary = color(theme, ColorSlot::Primary);
    let accent = color(theme, ColorSlot::Accent);
    let secondary = color(theme, ColorSlot::Secondary);

    let mut out = Vec::new();
    out.push("━".repeat(60).color(secondary).to_string());
    out.push(String::new());

    let mut title = view.title.color(primary).bold().to_string();
    if let Some(region) = &view.region_badge {
        title = format!("{} {}", format!("[{region}]").color(accent), title);
    }
    out.push(title);

    if let Some(description) = &view.description {
        out.push(description.bright_black().to_string());
    }

    if let Some(timer) = &view.timer {
        let clock = format!("⏱  {}", timer.label);
        if timer.expired {
            out.push(format!("{} {}", clock.color(accent).bold(), "CLOSED".red().bold()));
        } else {
            out.push(clock.color(accent).to_string());
        }
    }
    out.push(String::new());

    if view.expired {
        out.push("This poll has closed.".red().to_string());
    }

    for (i, option) in view.options.iter().enumerate() {
        out.extend(option_lines(i + 1, option, primary, accent));
    }

    if let Some(slides) = view.slides {
        let dots: Vec<_> = (0..slides.total)
            .map(|i| if i == slides.current { "●" } else { "○" })
            .collect();
        out.push(String::new());
        out.push(dots.join(" ").color(secondary).to_string());
    }

    if let Some(total) = view.total_votes {
        out.push(String::new());
        out.push(format!("{} {}", "Total votes:".bright_black(), total.to_string().bright_cyan()));
    }

    out.push(String::new());
    out.push(hint(view).bright_black().to_string());
    out
}

fn option_lines(number: usize, option: &OptionView, primary: Color, accent: Color) -> Vec<String> {
    let mut label = String::new();
    if let OptionStyle::Ballot { checked } = option.style {
        label.push_str(if checked { "☑ " } else { "☐ " });
    }
    if let Some(emoji) = &option.emoji {
        label.push_str(emoji);
        label.push(' ');
    }
    label.push_str(&option.text);

    let label = if option.selected {
        format!("{} {}", label.color(primary).bold(), "✓".green())
    } else if option.interactive {
        label.bright_white().to_string()
    } else {
        label.dimmed().to_string()
    };

    let mut out = vec![format!("{} {}", format!("[{number}]").bright_cyan(), label)];

    if let Some(fill) = option.bar {
        out.push(format!("    {}", bar(fill, BAR_WIDTH).color(accent)));
    }
    if let Some(result) = option.result {
        out.push(format!(
            "    {} ({} votes)",
            format_percentage(result.percentage).yellow(),
            result.votes
        ));
    }
    out
}

fn hint(view: &PollView) -> String {
    let mut commands = Vec::new();
    if view.options.iter().any(|o| o.interactive) {
        commands.push("[1-9] Vote");
    }
    if view.renderer == Renderer::Carousel {
        commands.extend(["[N]ext", "[P]rev", "[G]o <n>", "[V]ote shown"]);
    }
    commands.extend(["[R]esults", "[O]pen in browser", "[Q]uit"]);
    commands.join("  ")
}
