//! Storage abstraction layer for girder.
//!
//! This module provides the core storage trait and factory for creating
//! storage backends:
//!
//! - **In-memory**: fast, ephemeral storage backed by HashMaps
//! - **JSONL**: the in-memory backend with persistent file backing
//!
//! # Architecture
//!
//! The storage layer uses an async trait so backends with real async IO
//! can slot in later. The trait is object-safe, allowing dynamic dispatch
//! via `Box<dyn TrackerStorage>`.
//!
//! # Atomic key allocation
//!
//! `create_ticket` allocates the per-project sequence number and assigns
//! the ticket key in one operation under the backend's single lock. There
//! is no observable state where a ticket exists without its key, and
//! concurrent creates on the same project cannot produce duplicate keys.

use crate::domain::{
    ColumnId, Comment, CommentId, EpicUpdate, NewProject, NewTicket, NewUser, Project, ProjectId,
    Ticket, TicketId, TicketUpdate, TicketsOrderUpdate, User, UserId,
};
use crate::error::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub mod in_memory;

pub use in_memory::LoadWarning;

/// One persisted entity, tagged with its kind.
///
/// The JSONL data file holds one record per line; the tag keeps users,
/// projects, and tickets distinguishable in a single file.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Record {
    /// A user record.
    User(User),

    /// A project record.
    Project(Project),

    /// A ticket record (comments ride along inside it).
    Ticket(Ticket),
}

/// Core storage trait for the tracker.
///
/// Method categories:
///
/// - **Users**: `create_user`, `get_user`
/// - **Projects**: `create_project`, `get_project`, `list_projects`,
///   `update_tickets_order`, `update_column_order`
/// - **Tickets**: `create_ticket`, `get_ticket`, `list_tickets`,
///   `update_ticket`, `update_epic`, `link_epic`, `delete_ticket`
/// - **Comments**: `add_comment`, `delete_comment`
/// - **Batch/persistence**: `export_records`, `import_records`, `save`,
///   `reload`
#[async_trait]
pub trait TrackerStorage: Send + Sync {
    // ========== Users ==========

    /// Create a new user record.
    async fn create_user(&mut self, user: NewUser) -> Result<User>;

    /// Get a user by id. Returns `None` if the user doesn't exist.
    async fn get_user(&self, id: &UserId) -> Result<Option<User>>;

    // ========== Projects ==========

    /// Create a new project with the default board lanes.
    ///
    /// # Errors
    ///
    /// - `Error::Key` if the requested key prefix is malformed
    /// - `Error::DuplicateProjectKey` if another project owns the key
    async fn create_project(&mut self, project: NewProject) -> Result<Project>;

    /// Get a project by id. Returns `None` if the project doesn't exist.
    async fn get_project(&self, id: &ProjectId) -> Result<Option<Project>>;

    /// List all projects.
    async fn list_projects(&self) -> Result<Vec<Project>>;

    /// Apply a drag-and-drop ticket ordering update to a project's board.
    ///
    /// Each affected column's complete new ordering is carried. The
    /// update may introduce project tickets not yet on the board (first
    /// placement of a created ticket) and may drop tickets from the
    /// board, but every referenced ticket must belong to this project and
    /// no ticket may end up in two columns.
    ///
    /// # Errors
    ///
    /// - `Error::ProjectNotFound` if the project doesn't exist
    /// - `Error::ColumnNotFound` if the update targets an unknown column
    /// - `Error::TicketNotInProject` if an id is foreign to the project
    /// - `Error::Ordering` if the update duplicates a ticket
    async fn update_tickets_order(
        &mut self,
        project_id: &ProjectId,
        update: TicketsOrderUpdate,
    ) -> Result<Project>;

    /// Reorder a project's columns. The new order must be a permutation
    /// of the existing column ids.
    async fn update_column_order(
        &mut self,
        project_id: &ProjectId,
        order: Vec<ColumnId>,
    ) -> Result<Project>;

    // ========== Tickets ==========

    /// Create a new ticket.
    ///
    /// Allocates the per-project count and the derived key atomically.
    /// Epic fields may be supplied and require the epic issue type.
    /// Creation does not place the ticket in a board column; placement is
    /// a separate ordering update.
    ///
    /// # Errors
    ///
    /// - `Error::ProjectNotFound` if the owning project doesn't exist
    /// - `Error::Validation` if the ticket fields are invalid
    async fn create_ticket(&mut self, ticket: NewTicket) -> Result<Ticket>;

    /// Get a ticket by id. Returns `None` if the ticket doesn't exist.
    async fn get_ticket(&self, id: &TicketId) -> Result<Option<Ticket>>;

    /// All tickets of a project, in no guaranteed order.
    ///
    /// Board ordering is owned by the project, not the tickets. An
    /// unknown project yields an empty list.
    async fn list_tickets(&self, project_id: &ProjectId) -> Result<Vec<Ticket>>;

    /// Partially update a ticket's core fields.
    ///
    /// Never mutates `key`, `count`, `comments`, `linked_epic`, or epic
    /// fields.
    async fn update_ticket(&mut self, id: &TicketId, updates: TicketUpdate) -> Result<Ticket>;

    /// Partially update an epic ticket, including epic-only fields.
    ///
    /// # Errors
    ///
    /// Returns `Error::NotAnEpic` if the ticket is not an epic.
    async fn update_epic(&mut self, id: &TicketId, updates: EpicUpdate) -> Result<Ticket>;

    /// Link a ticket to an epic.
    ///
    /// The target must exist and be an epic-type ticket.
    async fn link_epic(&mut self, id: &TicketId, epic_id: &TicketId) -> Result<Ticket>;

    /// Delete a ticket and return the deleted record.
    ///
    /// Also removes the ticket id from the owning project's column
    /// orderings.
    async fn delete_ticket(&mut self, id: &TicketId) -> Result<Ticket>;

    // ========== Comments ==========

    /// Add a comment to a ticket, prepending it (most recent first).
    ///
    /// The author's name and picture are snapshotted into the comment at
    /// creation time. Returns the updated comment list.
    async fn add_comment(
        &mut self,
        ticket_id: &TicketId,
        user_id: &UserId,
        text: String,
    ) -> Result<Vec<Comment>>;

    /// Delete a comment; only the author may delete their own comment.
    ///
    /// # Errors
    ///
    /// - `Error::CommentNotFound` if the comment is absent
    /// - `Error::NotCommentAuthor` if the requester is not the author
    async fn delete_comment(
        &mut self,
        ticket_id: &TicketId,
        comment_id: &CommentId,
        requesting_user: &UserId,
    ) -> Result<Vec<Comment>>;

    // ========== Batch Operations ==========

    /// Export all records, suitable for JSONL backup.
    async fn export_records(&self) -> Result<Vec<Record>>;

    /// Import records in bulk (used when loading from a JSONL file).
    async fn import_records(&mut self, records: Vec<Record>) -> Result<()>;

    // ========== Persistence ==========

    /// Save changes to persistent storage.
    ///
    /// Takes `&self` so callers can save after read-only borrows; the
    /// in-memory backend uses interior mutability. No-op for ephemeral
    /// storage.
    async fn save(&self) -> Result<()>;

    /// Reload state from persistent storage, discarding in-memory
    /// changes.
    ///
    /// Used to restore consistency when a `save()` fails after a
    /// mutation: memory is rolled back to match disk.
    async fn reload(&mut self) -> Result<()>;
}

/// Storage backend configuration.
#[derive(Debug, Clone)]
pub enum StorageBackend {
    /// In-memory storage (ephemeral).
    InMemory,

    /// In-memory storage persisted to a JSONL file.
    Jsonl(PathBuf),
}

impl StorageBackend {
    /// The data file path for file-based backends.
    #[must_use]
    pub fn data_path(&self) -> Option<&Path> {
        match self {
            StorageBackend::Jsonl(path) => Some(path),
            StorageBackend::InMemory => None,
        }
    }
}

/// Wrapper that adds JSONL file persistence to the in-memory backend.
struct JsonlBackedStorage {
    inner: Box<dyn TrackerStorage>,
    path: PathBuf,
}

#[async_trait]
impl TrackerStorage for JsonlBackedStorage {
    async fn create_user(&mut self, user: NewUser) -> Result<User> {
        self.inner.create_user(user).await
    }

    async fn get_user(&self, id: &UserId) -> Result<Option<User>> {
        self.inner.get_user(id).await
    }

    async fn create_project(&mut self, project: NewProject) -> Result<Project> {
        self.inner.create_project(project).await
    }

    async fn get_project(&self, id: &ProjectId) -> Result<Option<Project>> {
        self.inner.get_project(id).await
    }

    async fn list_projects(&self) -> Result<Vec<Project>> {
        self.inner.list_projects().await
    }

    async fn update_tickets_order(
        &mut self,
        project_id: &ProjectId,
        update: TicketsOrderUpdate,
    ) -> Result<Project> {
        self.inner.update_tickets_order(project_id, update).await
    }

    async fn update_column_order(
        &mut self,
        project_id: &ProjectId,
        order: Vec<ColumnId>,
    ) -> Result<Project> {
        self.inner.update_column_order(project_id, order).await
    }

    async fn create_ticket(&mut self, ticket: NewTicket) -> Result<Ticket> {
        self.inner.create_ticket(ticket).await
    }

    async fn get_ticket(&self, id: &TicketId) -> Result<Option<Ticket>> {
        self.inner.get_ticket(id).await
    }

    async fn list_tickets(&self, project_id: &ProjectId) -> Result<Vec<Ticket>> {
        self.inner.list_tickets(project_id).await
    }

    async fn update_ticket(&mut self, id: &TicketId, updates: TicketUpdate) -> Result<Ticket> {
        self.inner.update_ticket(id, updates).await
    }

    async fn update_epic(&mut self, id: &TicketId, updates: EpicUpdate) -> Result<Ticket> {
        self.inner.update_epic(id, updates).await
    }

    async fn link_epic(&mut self, id: &TicketId, epic_id: &TicketId) -> Result<Ticket> {
        self.inner.link_epic(id, epic_id).await
    }

    async fn delete_ticket(&mut self, id: &TicketId) -> Result<Ticket> {
        self.inner.delete_ticket(id).await
    }

    async fn add_comment(
        &mut self,
        ticket_id: &TicketId,
        user_id: &UserId,
        text: String,
    ) -> Result<Vec<Comment>> {
        self.inner.add_comment(ticket_id, user_id, text).await
    }

    async fn delete_comment(
        &mut self,
        ticket_id: &TicketId,
        comment_id: &CommentId,
        requesting_user: &UserId,
    ) -> Result<Vec<Comment>> {
        self.inner
            .delete_comment(ticket_id, comment_id, requesting_user)
            .await
    }

    async fn export_records(&self) -> Result<Vec<Record>> {
        self.inner.export_records().await
    }

    async fn import_records(&mut self, records: Vec<Record>) -> Result<()> {
        self.inner.import_records(records).await
    }

    async fn save(&self) -> Result<()> {
        in_memory::save_to_jsonl(self.inner.as_ref(), &self.path).await
    }

    async fn reload(&mut self) -> Result<()> {
        if self.path.exists() {
            let (new_storage, warnings) = in_memory::load_from_jsonl(&self.path).await?;
            for warning in &warnings {
                tracing::warn!(warning = ?warning, "JSONL reload warning");
            }
            self.inner = new_storage;
        } else {
            self.inner = in_memory::new_in_memory_storage();
        }
        Ok(())
    }
}

/// Create a storage instance for the given backend.
///
/// # Errors
///
/// - `Error::Io` if file operations fail (JSONL backend)
/// - `Error::Storage` for backend-specific initialization errors
pub async fn create_storage(backend: StorageBackend) -> Result<Box<dyn TrackerStorage>> {
    match backend {
        StorageBackend::InMemory => Ok(in_memory::new_in_memory_storage()),
        StorageBackend::Jsonl(path) => {
            let inner = if path.exists() {
                let (storage, warnings) = in_memory::load_from_jsonl(&path).await?;
                for warning in &warnings {
                    tracing::warn!(warning = ?warning, "JSONL load warning");
                }
                storage
            } else {
                // First run: file appears on first save.
                in_memory::new_in_memory_storage()
            };
            Ok(Box::new(JsonlBackedStorage { inner, path }))
        }
    }
}
