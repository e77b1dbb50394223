//! Domain types for project/ticket tracking.
//!
//! This module contains the core domain types: projects with their board
//! columns, tickets (including epics), comments with denormalized author
//! snapshots, and the partial-update structs used by the storage layer.

mod ordering;

pub use ordering::{apply_column_order, apply_tickets_order, ColumnReorder, OrderingError, TicketsOrderUpdate};

use crate::keys::{ProjectKey, TicketKey};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Maximum length for a ticket summary.
pub const MAX_SUMMARY_LENGTH: usize = 255;

/// Maximum length for a comment body.
pub const MAX_COMMENT_LENGTH: usize = 5000;

macro_rules! string_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        pub struct $name(pub String);

        impl $name {
            /// Create a new id.
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            /// The id as a string slice.
            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<String> for $name {
            fn from(s: String) -> Self {
                Self(s)
            }
        }

        impl From<&str> for $name {
            fn from(s: &str) -> Self {
                Self(s.to_string())
            }
        }
    };
}

string_id! {
    /// Unique identifier for a project.
    ProjectId
}

string_id! {
    /// Unique identifier for a ticket.
    TicketId
}

string_id! {
    /// Unique identifier for a board column.
    ColumnId
}

string_id! {
    /// Unique identifier for a comment.
    CommentId
}

string_id! {
    /// Unique identifier for a user.
    UserId
}

/// Type of ticket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IssueType {
    /// User-facing story.
    Story,

    /// General task.
    Task,

    /// Bug fix.
    Bug,

    /// Epic (groups child tickets via `linked_epic`).
    Epic,
}

impl IssueType {
    /// Wire/display name of the type.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Story => "story",
            Self::Task => "task",
            Self::Bug => "bug",
            Self::Epic => "epic",
        }
    }
}

impl FromStr for IssueType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "story" => Ok(Self::Story),
            "task" => Ok(Self::Task),
            "bug" => Ok(Self::Bug),
            "epic" => Ok(Self::Epic),
            _ => Err(format!("Invalid issue type: {}", s)),
        }
    }
}

impl fmt::Display for IssueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Priority of a ticket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IssuePriority {
    /// Drop everything.
    Highest,

    /// Important.
    High,

    /// Default.
    Medium,

    /// Can wait.
    Low,

    /// Backlog noise.
    Lowest,
}

impl IssuePriority {
    /// Wire/display name of the priority.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Highest => "highest",
            Self::High => "high",
            Self::Medium => "medium",
            Self::Low => "low",
            Self::Lowest => "lowest",
        }
    }
}

impl FromStr for IssuePriority {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "highest" => Ok(Self::Highest),
            "high" => Ok(Self::High),
            "medium" => Ok(Self::Medium),
            "low" => Ok(Self::Low),
            "lowest" => Ok(Self::Lowest),
            _ => Err(format!("Invalid priority: {}", s)),
        }
    }
}

impl fmt::Display for IssuePriority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A user record.
///
/// Girder only stores what comment snapshots and the auth gate need;
/// registration and login live outside this system.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    /// Unique identifier.
    pub id: UserId,

    /// Display name.
    pub name: String,

    /// Avatar URL.
    pub picture_url: String,

    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
}

/// Data for creating a new user.
#[derive(Debug, Clone)]
pub struct NewUser {
    /// Display name.
    pub name: String,

    /// Avatar URL.
    pub picture_url: String,
}

/// A board column (lane) holding an ordered list of tickets.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Column {
    /// Unique identifier.
    pub id: ColumnId,

    /// Lane title, e.g. "In Progress".
    pub title: String,

    /// Ticket ids in board order, top to bottom.
    pub ticket_ids: Vec<TicketId>,
}

/// A project: key prefix, board columns, and the ticket-key counter.
///
/// Column order is the vector order. Invariant: every ticket id referenced
/// in any column ordering belongs to this project.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    /// Unique identifier.
    pub id: ProjectId,

    /// Project name.
    pub name: String,

    /// Short uppercase key prefix, e.g. "DEMO".
    pub key: ProjectKey,

    /// Board columns in display order.
    pub columns: Vec<Column>,

    /// Monotonic per-project ticket sequence. The next ticket created in
    /// this project gets `ticket_seq + 1` as its count.
    pub ticket_seq: u64,

    /// Creation timestamp.
    pub created_at: DateTime<Utc>,

    /// Last update timestamp.
    pub updated_at: DateTime<Utc>,
}

impl Project {
    /// Column ids in display order.
    #[must_use]
    pub fn column_order(&self) -> Vec<ColumnId> {
        self.columns.iter().map(|c| c.id.clone()).collect()
    }

    /// Find the column currently holding a ticket, if any.
    #[must_use]
    pub fn column_of(&self, ticket_id: &TicketId) -> Option<&Column> {
        self.columns
            .iter()
            .find(|c| c.ticket_ids.contains(ticket_id))
    }

    /// Remove a ticket id from whichever column ordering holds it.
    ///
    /// Returns `true` if the ticket was present somewhere.
    pub fn remove_ticket_from_columns(&mut self, ticket_id: &TicketId) -> bool {
        let mut removed = false;
        for column in &mut self.columns {
            let before = column.ticket_ids.len();
            column.ticket_ids.retain(|id| id != ticket_id);
            removed |= column.ticket_ids.len() != before;
        }
        removed
    }
}

/// Data for creating a new project.
#[derive(Debug, Clone)]
pub struct NewProject {
    /// Project name.
    pub name: String,

    /// Requested key prefix (validated on creation).
    pub key: String,
}

impl NewProject {
    /// Validate project fields that don't need storage context.
    pub fn validate(&self) -> Result<(), String> {
        if self.name.trim().is_empty() {
            return Err("project name cannot be empty".to_string());
        }
        Ok(())
    }
}

/// Inclusive date range for an epic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DateRange {
    /// Start of the epic.
    pub start: DateTime<Utc>,

    /// Target end of the epic.
    pub end: DateTime<Utc>,
}

/// Fields that only exist on epic tickets.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EpicFields {
    /// Display color for the epic's board chip.
    pub color: String,

    /// Planned date range.
    pub date_range: DateRange,

    /// Whether the epic has been marked done.
    pub done: bool,
}

/// Author snapshot denormalized into a comment at creation time.
///
/// This is a value copy, never a live reference: later changes to the
/// user record do not rewrite existing comments.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentAuthor {
    /// The authoring user.
    pub user_id: UserId,

    /// Display name at the time of writing.
    pub name: String,

    /// Avatar URL at the time of writing.
    pub picture_url: String,
}

/// A comment on a ticket.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    /// Unique identifier.
    pub id: CommentId,

    /// Denormalized author snapshot.
    pub author: CommentAuthor,

    /// Comment body.
    pub text: String,

    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
}

/// A ticket in the tracking system.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Ticket {
    /// Unique identifier.
    pub id: TicketId,

    /// Owning project.
    pub project_id: ProjectId,

    /// Human-readable key, `{project.key}-{count}`. Assigned once at
    /// creation, immutable thereafter.
    pub key: TicketKey,

    /// Per-project sequence number backing the key suffix.
    pub count: u64,

    /// Ticket type.
    pub issue_type: IssueType,

    /// Ticket priority.
    pub issue_priority: IssuePriority,

    /// One-line summary.
    pub summary: String,

    /// Long-form description.
    pub description: String,

    /// Assigned user, if any.
    pub assignee_id: Option<UserId>,

    /// Reporting user.
    pub reporter_id: UserId,

    /// The epic this ticket belongs to, if any.
    pub linked_epic: Option<TicketId>,

    /// Epic-only fields; present exactly when `issue_type` is epic.
    pub epic: Option<EpicFields>,

    /// Comments, most recent first.
    pub comments: Vec<Comment>,

    /// Creation timestamp.
    pub created_at: DateTime<Utc>,

    /// Last update timestamp.
    pub updated_at: DateTime<Utc>,
}

impl Ticket {
    /// Whether this ticket is an epic.
    #[must_use]
    pub fn is_epic(&self) -> bool {
        self.issue_type == IssueType::Epic
    }
}

/// Epic fields supplied at epic creation.
#[derive(Debug, Clone)]
pub struct NewEpicFields {
    /// Display color for the epic's board chip.
    pub color: String,

    /// Planned date range.
    pub date_range: DateRange,
}

/// Data for creating a new ticket.
///
/// `count` and `key` are absent on purpose: the storage layer allocates
/// both atomically from the owning project's sequence.
#[derive(Debug, Clone)]
pub struct NewTicket {
    /// Owning project.
    pub project_id: ProjectId,

    /// Ticket type.
    pub issue_type: IssueType,

    /// Ticket priority.
    pub issue_priority: IssuePriority,

    /// One-line summary.
    pub summary: String,

    /// Long-form description.
    pub description: String,

    /// Assigned user, if any.
    pub assignee_id: Option<UserId>,

    /// Reporting user.
    pub reporter_id: UserId,

    /// Epic fields; requires `issue_type` to be epic.
    pub epic: Option<NewEpicFields>,
}

impl NewTicket {
    /// Validate ticket fields that don't need storage context.
    pub fn validate(&self) -> Result<(), String> {
        if self.summary.trim().is_empty() {
            return Err("summary cannot be empty".to_string());
        }
        if self.summary.len() > MAX_SUMMARY_LENGTH {
            return Err(format!(
                "summary cannot exceed {} characters",
                MAX_SUMMARY_LENGTH
            ));
        }
        if self.epic.is_some() && self.issue_type != IssueType::Epic {
            return Err("epic fields require the epic issue type".to_string());
        }
        if self.epic.is_none() && self.issue_type == IssueType::Epic {
            return Err("epic tickets require epic fields".to_string());
        }
        Ok(())
    }
}

/// Data for a partial update of an existing ticket's core fields.
///
/// Only fields present are modified. `key`, `count`, `comments`,
/// `linked_epic`, and epic fields are never touched by this update.
#[derive(Debug, Clone, Default)]
pub struct TicketUpdate {
    /// New issue type (if updating).
    pub issue_type: Option<IssueType>,

    /// New priority (if updating).
    pub issue_priority: Option<IssuePriority>,

    /// New summary (if updating).
    pub summary: Option<String>,

    /// New description (if updating).
    pub description: Option<String>,

    /// New assignee (if updating; `Some(None)` clears it).
    pub assignee_id: Option<Option<UserId>>,

    /// New reporter (if updating).
    pub reporter_id: Option<UserId>,
}

/// Data for a partial update of an epic ticket, including epic fields.
#[derive(Debug, Clone, Default)]
pub struct EpicUpdate {
    /// Core ticket field updates.
    pub ticket: TicketUpdate,

    /// New epic color (if updating).
    pub color: Option<String>,

    /// New date range (if updating).
    pub date_range: Option<DateRange>,

    /// New done flag (if updating).
    pub done: Option<bool>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_ticket(issue_type: IssueType, epic: Option<NewEpicFields>) -> NewTicket {
        NewTicket {
            project_id: ProjectId::new("p-1"),
            issue_type,
            issue_priority: IssuePriority::Medium,
            summary: "Fix the login page".to_string(),
            description: String::new(),
            assignee_id: None,
            reporter_id: UserId::new("u-1"),
            epic,
        }
    }

    fn epic_fields() -> NewEpicFields {
        NewEpicFields {
            color: "#42526e".to_string(),
            date_range: DateRange {
                start: Utc::now(),
                end: Utc::now(),
            },
        }
    }

    #[test]
    fn test_validate_rejects_empty_summary() {
        let mut ticket = new_ticket(IssueType::Task, None);
        ticket.summary = "   ".to_string();
        assert!(ticket.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_epic_fields_on_non_epic() {
        let ticket = new_ticket(IssueType::Bug, Some(epic_fields()));
        assert!(ticket.validate().unwrap_err().contains("epic issue type"));
    }

    #[test]
    fn test_validate_requires_epic_fields_on_epic() {
        let ticket = new_ticket(IssueType::Epic, None);
        assert!(ticket.validate().is_err());
        assert!(new_ticket(IssueType::Epic, Some(epic_fields()))
            .validate()
            .is_ok());
    }

    #[test]
    fn test_issue_type_round_trip() {
        for t in [IssueType::Story, IssueType::Task, IssueType::Bug, IssueType::Epic] {
            assert_eq!(t.as_str().parse::<IssueType>().unwrap(), t);
        }
    }

    #[test]
    fn test_remove_ticket_from_columns() {
        let mut project = Project {
            id: ProjectId::new("p-1"),
            name: "Demo".to_string(),
            key: crate::keys::ProjectKey::new("DEMO").unwrap(),
            columns: vec![
                Column {
                    id: ColumnId::new("l-1"),
                    title: "To Do".to_string(),
                    ticket_ids: vec![TicketId::new("t-1"), TicketId::new("t-2")],
                },
                Column {
                    id: ColumnId::new("l-2"),
                    title: "Done".to_string(),
                    ticket_ids: vec![],
                },
            ],
            ticket_seq: 2,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };

        assert!(project.remove_ticket_from_columns(&TicketId::new("t-1")));
        assert_eq!(project.columns[0].ticket_ids, vec![TicketId::new("t-2")]);
        assert!(!project.remove_ticket_from_columns(&TicketId::new("t-9")));
    }
}
