//! Error types for girder core operations.

use crate::domain::{ColumnId, CommentId, OrderingError, ProjectId, TicketId, UserId};
use crate::ids::IdError;
use crate::keys::KeyError;
use std::io;
use thiserror::Error;

/// The error type for girder core operations.
///
/// The taxonomy the REST layer maps onto HTTP status codes:
/// not-found variants, [`Error::NotCommentAuthor`] (the unauthorized case),
/// validation failures, and everything else as an opaque storage failure.
#[derive(Debug, Error)]
pub enum Error {
    /// The requested project does not exist.
    #[error("project not found: {0}")]
    ProjectNotFound(ProjectId),

    /// The requested ticket does not exist.
    #[error("ticket not found: {0}")]
    TicketNotFound(TicketId),

    /// The requested comment does not exist on the ticket.
    #[error("comment not found: {0}")]
    CommentNotFound(CommentId),

    /// The requested user does not exist.
    #[error("user not found: {0}")]
    UserNotFound(UserId),

    /// A column id was referenced that the project does not contain.
    #[error("column not found in project {project}: {column}")]
    ColumnNotFound {
        /// The project that was asked for the column.
        project: ProjectId,
        /// The missing column id.
        column: ColumnId,
    },

    /// Another project already owns this key prefix.
    #[error("project key already in use: {0}")]
    DuplicateProjectKey(String),

    /// A board ordering update referenced a ticket from outside the
    /// project.
    #[error("ticket {ticket} does not belong to project {project}")]
    TicketNotInProject {
        /// The foreign ticket.
        ticket: TicketId,
        /// The project whose board was being updated.
        project: ProjectId,
    },

    /// Comment deletion was requested by someone other than the author.
    #[error("user {user} is not the author of comment {comment}")]
    NotCommentAuthor {
        /// The comment that was targeted.
        comment: CommentId,
        /// The user who made the request.
        user: UserId,
    },

    /// An epic-only operation targeted a non-epic ticket.
    #[error("ticket is not an epic: {0}")]
    NotAnEpic(TicketId),

    /// Input failed schema validation.
    #[error("validation failed: {0}")]
    Validation(String),

    /// A board ordering update was structurally invalid.
    #[error(transparent)]
    Ordering(#[from] OrderingError),

    /// A project or ticket key was malformed.
    #[error(transparent)]
    Key(#[from] KeyError),

    /// Entity id generation failed.
    #[error(transparent)]
    IdGeneration(#[from] IdError),

    /// IO error occurred.
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Any other persistence failure.
    #[error("storage error: {0}")]
    Storage(String),
}

/// A specialized Result type for girder operations.
pub type Result<T> = std::result::Result<T, Error>;
