//! Request-state machine for in-flight ordering mutations.
//!
//! Each mutation moves through `Pending -> Confirmed | Failed`. Because
//! in-flight requests are never cancelled, a slow response can arrive
//! after a newer mutation has already touched the same part of the board.
//! Every mutation therefore carries a monotonic token, and a completion
//! is only allowed to act if its token is still the newest for every
//! scope the mutation touched: stale confirmations are discarded, and a
//! stale failure asks the consumer to resync instead of rolling back
//! state that no longer belongs to it.

use crate::board::UndoState;
use girder::domain::ColumnId;
use std::collections::HashMap;
use std::fmt;

/// Monotonic fencing token for one mutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SyncToken(u64);

impl fmt::Display for SyncToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Lifecycle of one ordering mutation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RequestState {
    /// Applied optimistically, waiting for the server.
    Pending,

    /// Server acknowledged the mutation.
    Confirmed,

    /// Server rejected the mutation.
    Failed {
        /// Why the server rejected it.
        reason: String,
    },
}

/// The part of the board a mutation touches.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum SyncScope {
    /// One column's ticket ordering.
    Column(ColumnId),

    /// The column layout itself.
    Layout,
}

/// Outcome of confirming a mutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfirmOutcome {
    /// The mutation was the newest for all its scopes.
    Confirmed,

    /// A newer mutation superseded it; the confirmation is a no-op.
    Stale,
}

/// Outcome of failing a mutation.
#[derive(Debug)]
pub enum FailOutcome {
    /// The mutation was still the newest for all its scopes; apply this
    /// undo snapshot to revert the optimistic state.
    RollBack(UndoState),

    /// Newer optimistic state exists on top; rolling back would clobber
    /// it. The consumer should refetch the board from the server.
    Superseded,
}

struct MutationRecord {
    scopes: Vec<SyncScope>,
    state: RequestState,
    undo: Option<UndoState>,
}

/// Tracks all in-flight ordering mutations for one board.
#[derive(Default)]
pub struct OrderSync {
    next_token: u64,
    latest_by_scope: HashMap<SyncScope, SyncToken>,
    mutations: HashMap<SyncToken, MutationRecord>,
}

impl OrderSync {
    /// Create an empty tracker.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a freshly dispatched mutation as `Pending`.
    ///
    /// The undo snapshot must be captured *before* the optimistic
    /// mutation is applied.
    pub fn begin(&mut self, scopes: Vec<SyncScope>, undo: UndoState) -> SyncToken {
        self.next_token += 1;
        let token = SyncToken(self.next_token);
        for scope in &scopes {
            self.latest_by_scope.insert(scope.clone(), token);
        }
        self.mutations.insert(
            token,
            MutationRecord {
                scopes,
                state: RequestState::Pending,
                undo: Some(undo),
            },
        );
        token
    }

    /// Current state of a mutation, if it is still tracked.
    #[must_use]
    pub fn state(&self, token: SyncToken) -> Option<&RequestState> {
        self.mutations.get(&token).map(|m| &m.state)
    }

    /// Number of mutations still pending.
    #[must_use]
    pub fn pending_count(&self) -> usize {
        self.mutations
            .values()
            .filter(|m| m.state == RequestState::Pending)
            .count()
    }

    /// Whether this token is still the newest for every scope it touched.
    #[must_use]
    pub fn is_latest(&self, token: SyncToken) -> bool {
        self.mutations.get(&token).is_some_and(|record| {
            record
                .scopes
                .iter()
                .all(|scope| self.latest_by_scope.get(scope) == Some(&token))
        })
    }

    /// Server acknowledged the mutation.
    ///
    /// A stale acknowledgement (a newer mutation owns one of the scopes)
    /// is recorded but deliberately changes nothing else.
    pub fn confirm(&mut self, token: SyncToken) -> ConfirmOutcome {
        let stale = !self.is_latest(token);
        if let Some(record) = self.mutations.get_mut(&token) {
            record.state = RequestState::Confirmed;
            record.undo = None;
        }
        if stale {
            ConfirmOutcome::Stale
        } else {
            ConfirmOutcome::Confirmed
        }
    }

    /// Server rejected the mutation.
    ///
    /// Returns the undo snapshot only when the mutation is still the
    /// newest for all its scopes; otherwise newer optimistic state sits
    /// on top and the caller must resync from the server instead.
    pub fn fail(&mut self, token: SyncToken, reason: impl Into<String>) -> FailOutcome {
        let latest = self.is_latest(token);
        let undo = match self.mutations.get_mut(&token) {
            Some(record) => {
                record.state = RequestState::Failed {
                    reason: reason.into(),
                };
                record.undo.take()
            }
            None => None,
        };
        match undo {
            Some(undo) if latest => FailOutcome::RollBack(undo),
            _ => FailOutcome::Superseded,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use girder::domain::Column;

    fn undo() -> UndoState {
        UndoState::Columns(vec![Column {
            id: ColumnId::new("l-todo"),
            title: "To Do".to_string(),
            ticket_ids: vec![],
        }])
    }

    fn column_scope() -> Vec<SyncScope> {
        vec![SyncScope::Column(ColumnId::new("l-todo"))]
    }

    #[test]
    fn test_confirm_fresh_mutation() {
        let mut sync = OrderSync::new();
        let token = sync.begin(column_scope(), undo());

        assert_eq!(sync.state(token), Some(&RequestState::Pending));
        assert_eq!(sync.pending_count(), 1);

        assert_eq!(sync.confirm(token), ConfirmOutcome::Confirmed);
        assert_eq!(sync.state(token), Some(&RequestState::Confirmed));
        assert_eq!(sync.pending_count(), 0);
    }

    #[test]
    fn test_stale_confirmation_is_discarded() {
        let mut sync = OrderSync::new();
        let first = sync.begin(column_scope(), undo());
        let second = sync.begin(column_scope(), undo());

        // The older mutation's late acknowledgement is stale.
        assert_eq!(sync.confirm(first), ConfirmOutcome::Stale);
        assert_eq!(sync.confirm(second), ConfirmOutcome::Confirmed);
    }

    #[test]
    fn test_fresh_failure_rolls_back() {
        let mut sync = OrderSync::new();
        let token = sync.begin(column_scope(), undo());

        match sync.fail(token, "server said no") {
            FailOutcome::RollBack(UndoState::Columns(columns)) => {
                assert_eq!(columns.len(), 1);
            }
            other => panic!("expected rollback, got {other:?}"),
        }
        assert_eq!(
            sync.state(token),
            Some(&RequestState::Failed {
                reason: "server said no".to_string()
            })
        );
    }

    #[test]
    fn test_stale_failure_does_not_roll_back() {
        let mut sync = OrderSync::new();
        let first = sync.begin(column_scope(), undo());
        let _second = sync.begin(column_scope(), undo());

        // Rolling back the older mutation would clobber the newer
        // optimistic state.
        assert!(matches!(
            sync.fail(first, "timeout"),
            FailOutcome::Superseded
        ));
    }

    #[test]
    fn test_scopes_are_independent() {
        let mut sync = OrderSync::new();
        let first = sync.begin(vec![SyncScope::Column(ColumnId::new("l-a"))], undo());
        let _second = sync.begin(vec![SyncScope::Column(ColumnId::new("l-b"))], undo());

        // A mutation on another column doesn't supersede this one.
        assert!(sync.is_latest(first));
        assert!(matches!(
            sync.fail(first, "boom"),
            FailOutcome::RollBack(_)
        ));
    }

    #[test]
    fn test_split_mutation_superseded_by_either_column() {
        let mut sync = OrderSync::new();
        let split = sync.begin(
            vec![
                SyncScope::Column(ColumnId::new("l-a")),
                SyncScope::Column(ColumnId::new("l-b")),
            ],
            undo(),
        );
        let _later = sync.begin(vec![SyncScope::Column(ColumnId::new("l-b"))], undo());

        // One of the split's two scopes was superseded.
        assert!(!sync.is_latest(split));
        assert!(matches!(
            sync.fail(split, "boom"),
            FailOutcome::Superseded
        ));
    }

    #[test]
    fn test_layout_scope_fences_column_reorders() {
        let mut sync = OrderSync::new();
        let first = sync.begin(vec![SyncScope::Layout], undo());
        let _second = sync.begin(vec![SyncScope::Layout], undo());

        assert!(!sync.is_latest(first));
    }
}
