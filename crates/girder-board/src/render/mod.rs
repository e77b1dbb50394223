//! Presentational rendering for boards, comment threads, and charts.
//!
//! No business logic lives here; everything takes already-fetched domain
//! values and produces text.
//!
//! Semantic color theme:
//!   - Error/urgent:  red     (bugs, highest priority)
//!   - Warning:       yellow  (high priority)
//!   - Info/keys:     cyan    (ticket keys, chart bars)
//!   - Accent:        magenta (epics)
//!   - Muted:         dimmed  (metadata, empty lanes)

mod chart;
mod comments;

pub use chart::render_activity_chart;
pub use comments::render_comments;

use colored::Colorize;
use girder::domain::{Column, IssuePriority, IssueType, Ticket, TicketId};
use std::env;

const DEFAULT_MAX_CONTENT_WIDTH: usize = 80;

/// Configuration for rendering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderConfig {
    /// Maximum content width for wrapping.
    pub max_width: usize,
    /// Use ASCII-only icons instead of Unicode.
    pub use_ascii: bool,
    /// Use colors.
    pub use_colors: bool,
}

impl RenderConfig {
    /// Create a config with explicit values.
    #[must_use]
    pub fn new(max_width: usize, use_ascii: bool, use_colors: bool) -> Self {
        Self {
            max_width,
            use_ascii,
            use_colors,
        }
    }

    /// Read configuration from the environment.
    ///
    /// - `GIRDER_MAX_WIDTH`: content width (default 80, capped by the
    ///   terminal when one is attached)
    /// - `GIRDER_ASCII`: "1"/"true" for ASCII-only icons
    /// - `NO_COLOR`: any value disables colors (<https://no-color.org/>)
    #[must_use]
    pub fn from_env() -> Self {
        let max_width = env::var("GIRDER_MAX_WIDTH")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or_else(|| {
                terminal_size::terminal_size()
                    .map(|(terminal_size::Width(w), _)| usize::from(w).min(120))
                    .unwrap_or(DEFAULT_MAX_CONTENT_WIDTH)
            });

        let use_ascii = env::var("GIRDER_ASCII")
            .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
            .unwrap_or(false);

        let use_colors = env::var("NO_COLOR").is_err();

        Self {
            max_width,
            use_ascii,
            use_colors,
        }
    }
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            max_width: DEFAULT_MAX_CONTENT_WIDTH,
            use_ascii: false,
            use_colors: true,
        }
    }
}

pub(crate) fn dimmed(text: &str, config: &RenderConfig) -> String {
    if !config.use_colors {
        return text.to_string();
    }
    text.dimmed().to_string()
}

pub(crate) fn key(text: &str, config: &RenderConfig) -> String {
    if !config.use_colors {
        return text.to_string();
    }
    text.cyan().to_string()
}

/// Type icon with ASCII fallback.
pub(crate) fn type_icon(issue_type: IssueType, config: &RenderConfig) -> &'static str {
    if config.use_ascii {
        match issue_type {
            IssueType::Story => "+",
            IssueType::Task => "-",
            IssueType::Bug => "*",
            IssueType::Epic => "#",
        }
    } else {
        match issue_type {
            IssueType::Story => "★",
            IssueType::Task => "◇",
            IssueType::Bug => "●",
            IssueType::Epic => "◆",
        }
    }
}

pub(crate) fn colored_type_icon(issue_type: IssueType, config: &RenderConfig) -> String {
    let icon = type_icon(issue_type, config);
    if !config.use_colors {
        return icon.to_string();
    }
    match issue_type {
        IssueType::Bug => icon.red().to_string(),
        IssueType::Story => icon.green().to_string(),
        IssueType::Epic => icon.magenta().bold().to_string(),
        IssueType::Task => icon.blue().to_string(),
    }
}

pub(crate) fn colored_priority(priority: IssuePriority, config: &RenderConfig) -> String {
    let text = priority.as_str();
    if !config.use_colors {
        return text.to_string();
    }
    match priority {
        IssuePriority::Highest => text.red().bold().to_string(),
        IssuePriority::High => text.yellow().to_string(),
        _ => text.to_string(),
    }
}

/// Render a board: one section per column, tickets in board order.
#[must_use]
pub fn render_board(columns: &[Column], tickets: &[Ticket], config: &RenderConfig) -> String {
    let mut out = String::new();

    for column in columns {
        out.push_str(&format!(
            "{} ({})\n",
            column.title.as_str(),
            column.ticket_ids.len()
        ));

        if column.ticket_ids.is_empty() {
            out.push_str(&format!("  {}\n", dimmed("(empty)", config)));
            continue;
        }

        for ticket_id in &column.ticket_ids {
            out.push_str(&render_board_line(ticket_id, tickets, config));
        }
    }

    out
}

fn render_board_line(ticket_id: &TicketId, tickets: &[Ticket], config: &RenderConfig) -> String {
    let Some(ticket) = tickets.iter().find(|t| t.id == *ticket_id) else {
        return format!("  {}\n", dimmed(&format!("{ticket_id} (missing)"), config));
    };

    let prefix = format!(
        "  {} {}  {}  ",
        colored_type_icon(ticket.issue_type, config),
        key(ticket.key.as_str(), config),
        colored_priority(ticket.issue_priority, config),
    );
    // Styling escapes don't count toward the visible prefix width.
    let visible_prefix = format!(
        "  {} {}  {}  ",
        type_icon(ticket.issue_type, config),
        ticket.key.as_str(),
        ticket.issue_priority.as_str(),
    );

    let summary_width = config.max_width.saturating_sub(visible_prefix.len()).max(20);
    let summary = if ticket.summary.len() > summary_width {
        let cut: String = ticket.summary.chars().take(summary_width - 1).collect();
        format!("{cut}…")
    } else {
        ticket.summary.clone()
    };

    format!("{prefix}{summary}\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use girder::domain::{ColumnId, ProjectId, UserId};
    use girder::keys::{ProjectKey, TicketKey};

    fn ticket(id: &str, count: u64, summary: &str) -> Ticket {
        let project_key = ProjectKey::new("DEMO").unwrap();
        Ticket {
            id: id.into(),
            project_id: ProjectId::new("p-1"),
            key: TicketKey::new(&project_key, count),
            count,
            issue_type: IssueType::Task,
            issue_priority: IssuePriority::Medium,
            summary: summary.to_string(),
            description: String::new(),
            assignee_id: None,
            reporter_id: UserId::new("u-1"),
            linked_epic: None,
            epic: None,
            comments: Vec::new(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn columns() -> Vec<Column> {
        vec![
            Column {
                id: ColumnId::new("l-todo"),
                title: "To Do".to_string(),
                ticket_ids: vec!["t-1".into(), "t-2".into()],
            },
            Column {
                id: ColumnId::new("l-done"),
                title: "Done".to_string(),
                ticket_ids: vec![],
            },
        ]
    }

    #[test]
    fn test_render_board_plain() {
        let tickets = vec![ticket("t-1", 1, "Fix login"), ticket("t-2", 2, "Add tests")];
        let config = RenderConfig::new(80, true, false);
        let out = render_board(&columns(), &tickets, &config);

        assert!(out.contains("To Do (2)"));
        assert!(out.contains("DEMO-1"));
        assert!(out.contains("Fix login"));
        assert!(out.contains("Done (0)"));
        assert!(out.contains("(empty)"));
        assert!(!out.contains('\u{1b}'), "no ANSI codes without colors");
    }

    #[test]
    fn test_render_board_marks_missing_tickets() {
        let config = RenderConfig::new(80, true, false);
        let out = render_board(&columns(), &[], &config);
        assert!(out.contains("t-1 (missing)"));
    }

    #[test]
    fn test_long_summary_is_truncated() {
        let tickets = vec![ticket("t-1", 1, &"long summary ".repeat(30))];
        let config = RenderConfig::new(60, true, false);
        let out = render_board(&columns()[..1], &tickets, &config);
        let first_line = out.lines().nth(1).unwrap();
        assert!(first_line.chars().count() <= 60);
        assert!(first_line.ends_with('…'));
    }
}
