/// Share of the trusted total, in `[0, 100]`.
///
/// Hidden results, a zero total and a missing total all give 0, so the
/// result is always finite.
pub fn vote_percentage(vote_count: Option<u64>, total_votes: Option<u64>, show_results: bool) -> f64 {
    if !show_results {
        return 0.0;
    }

    match total_votes {
        Some(total) if total > 0 => {
            let pct = vote_count.unwrap_or(0) as f64 / total as f64 * 100.0;
            pct.clamp(0.0, 100.0)
        }
        _ => 0.0,
    }
}

pub fn format_percentage(percentage: f64) -> String {
    let pct = if percentage.is_finite() { percentage } else { 0.0 };
    format!("{pct:.1}%")
}
