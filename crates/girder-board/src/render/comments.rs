//! Comment thread rendering.

use super::{dimmed, RenderConfig};
use girder::domain::Comment;

/// Render a ticket's comment thread, most recent first (the order the
/// storage layer maintains).
#[must_use]
pub fn render_comments(comments: &[Comment], config: &RenderConfig) -> String {
    if comments.is_empty() {
        return format!("{}\n", dimmed("No comments yet.", config));
    }

    let mut out = String::new();
    for comment in comments {
        let header = format!(
            "{} · {}",
            comment.author.name,
            comment.created_at.format("%Y-%m-%d %H:%M")
        );
        out.push_str(&dimmed(&header, config));
        out.push('\n');

        let body_width = config.max_width.saturating_sub(4).max(20);
        for line in textwrap::wrap(&comment.text, body_width) {
            out.push_str("    ");
            out.push_str(&line);
            out.push('\n');
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use girder::domain::CommentAuthor;

    fn comment(text: &str, author: &str) -> Comment {
        Comment {
            id: "c-1".into(),
            author: CommentAuthor {
                user_id: "u-1".into(),
                name: author.to_string(),
                picture_url: String::new(),
            },
            text: text.to_string(),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_empty_thread() {
        let config = RenderConfig::new(80, true, false);
        assert!(render_comments(&[], &config).contains("No comments yet."));
    }

    #[test]
    fn test_thread_keeps_storage_order() {
        let config = RenderConfig::new(80, true, false);
        let out = render_comments(
            &[comment("newest", "alice"), comment("oldest", "bob")],
            &config,
        );

        let alice = out.find("alice").unwrap();
        let bob = out.find("bob").unwrap();
        assert!(alice < bob);
        assert!(out.contains("    newest"));
    }

    #[test]
    fn test_long_comment_wraps() {
        let config = RenderConfig::new(40, true, false);
        let out = render_comments(&[comment(&"word ".repeat(30), "alice")], &config);
        assert!(out.lines().filter(|l| l.starts_with("    ")).count() > 1);
    }
}
