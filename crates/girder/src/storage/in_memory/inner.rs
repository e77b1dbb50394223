//! Core in-memory storage data structures.

use crate::domain::{Project, ProjectId, Ticket, TicketId, User, UserId};
use crate::error::{Error, Result};
use crate::ids::{EntityIdGenerator, EntityKind};
use std::collections::HashMap;

/// Inner storage structure (not thread-safe on its own).
///
/// Wrapped in `Arc<Mutex<>>` by the parent module. Holding every map
/// behind the one lock is what makes multi-entity mutations (key
/// allocation, comment snapshots, ordering updates) atomic.
pub(crate) struct TrackerStoreInner {
    /// Users indexed by id.
    pub(super) users: HashMap<UserId, User>,

    /// Projects indexed by id. The project owns its board columns and
    /// the per-project ticket sequence counter.
    pub(super) projects: HashMap<ProjectId, Project>,

    /// Tickets indexed by id. Comments live inside their ticket.
    pub(super) tickets: HashMap<TicketId, Ticket>,

    /// Generator for new entity ids.
    pub(super) ids: EntityIdGenerator,
}

impl TrackerStoreInner {
    /// Create a new empty storage instance.
    pub(crate) fn new() -> Self {
        Self {
            users: HashMap::new(),
            projects: HashMap::new(),
            tickets: HashMap::new(),
            ids: EntityIdGenerator::new(0),
        }
    }

    /// Total number of stored entities, for adaptive id length.
    pub(super) fn entity_count(&self) -> usize {
        self.users.len() + self.projects.len() + self.tickets.len()
    }

    /// Generate a new unique id for an entity of the given kind.
    pub(super) fn generate_id(&mut self, kind: EntityKind, seed: &str) -> Result<String> {
        let count = self.entity_count();
        self.ids.set_entity_count(count);
        self.ids
            .generate(kind, seed)
            .map_err(|e| Error::Storage(format!("id generation failed: {}", e)))
    }

    /// Register every stored id with the generator.
    ///
    /// Called after bulk imports so freshly generated ids can't collide
    /// with loaded data.
    pub(super) fn register_all_ids(&mut self) {
        let ids: Vec<String> = self
            .users
            .keys()
            .map(|id| id.as_str().to_string())
            .chain(self.projects.keys().map(|id| id.as_str().to_string()))
            .chain(self.tickets.keys().map(|id| id.as_str().to_string()))
            .collect();
        for id in ids {
            self.ids.register_id(id);
        }
        let count = self.entity_count();
        self.ids.set_entity_count(count);
    }
}
