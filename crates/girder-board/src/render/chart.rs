//! Ticket activity chart.
//!
//! A horizontal bar per bucket (typically one per day), scaled to the
//! configured width. This is the dashboard's created-tickets-over-time
//! view in text form.

use super::{dimmed, RenderConfig};
use colored::Colorize;

/// Render counts per bucket as a horizontal bar chart.
///
/// `points` pairs a short label (e.g. "08-05") with a count.
#[must_use]
pub fn render_activity_chart(points: &[(String, u64)], config: &RenderConfig) -> String {
    if points.is_empty() {
        return format!("{}\n", dimmed("No activity.", config));
    }

    let max_count = points.iter().map(|(_, count)| *count).max().unwrap_or(0);
    let label_width = points
        .iter()
        .map(|(label, _)| label.chars().count())
        .max()
        .unwrap_or(0);

    // Leave room for the label, separators, and the trailing count.
    let bar_budget = config
        .max_width
        .saturating_sub(label_width + 8)
        .clamp(10, 60);

    let glyph = if config.use_ascii { "#" } else { "▇" };

    let mut out = String::new();
    for (label, count) in points {
        let bar_len = if max_count == 0 {
            0
        } else {
            ((*count as usize) * bar_budget).div_ceil(max_count as usize)
        };
        let bar = glyph.repeat(bar_len);
        let bar = if config.use_colors {
            bar.cyan().to_string()
        } else {
            bar
        };
        out.push_str(&format!(
            "{label:>label_width$}  {bar} {count}\n",
            label = label,
            label_width = label_width,
        ));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn points() -> Vec<(String, u64)> {
        vec![
            ("08-04".to_string(), 2),
            ("08-05".to_string(), 6),
            ("08-06".to_string(), 0),
        ]
    }

    #[test]
    fn test_bars_scale_with_counts() {
        let config = RenderConfig::new(80, true, false);
        let out = render_activity_chart(&points(), &config);
        let lines: Vec<&str> = out.lines().collect();

        let hashes = |line: &str| line.matches('#').count();
        assert!(hashes(lines[1]) > hashes(lines[0]));
        assert_eq!(hashes(lines[2]), 0);
        assert!(lines[1].ends_with('6'));
    }

    #[test]
    fn test_empty_series() {
        let config = RenderConfig::new(80, true, false);
        assert!(render_activity_chart(&[], &config).contains("No activity."));
    }

    #[test]
    fn test_bar_width_respects_budget() {
        let config = RenderConfig::new(40, true, false);
        let out = render_activity_chart(&points(), &config);
        for line in out.lines() {
            assert!(line.chars().count() <= 40, "line too wide: {line}");
        }
    }
}
