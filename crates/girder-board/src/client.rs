//! Dispatch-then-persist wrapper around the board mirror.
//!
//! Every ordering mutation is applied locally first, then sent to the
//! server. On success the mutation is confirmed; on rejection it is
//! rolled back — unless a newer mutation already owns the same scopes,
//! in which case the caller is told to resync instead.

use crate::api::OrderingApi;
use crate::board::{BoardState, UndoState};
use crate::sync::{ConfirmOutcome, FailOutcome, OrderSync, RequestState, SyncScope, SyncToken};
use girder::domain::{
    ColumnId, ColumnReorder, OrderingError, Project, TicketId, TicketsOrderUpdate,
};

/// What happened to one submitted mutation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MutationOutcome {
    /// The mutation's fencing token.
    pub token: SyncToken,

    /// Final request state.
    pub state: RequestState,

    /// Whether the optimistic change was reverted locally.
    pub rolled_back: bool,

    /// Whether local state may have diverged from the server and the
    /// board should be refetched.
    pub needs_resync: bool,
}

/// The client action layer for one project's board.
pub struct BoardClient<A: OrderingApi> {
    board: BoardState,
    sync: OrderSync,
    api: A,
}

impl<A: OrderingApi> BoardClient<A> {
    /// Build a client mirroring a project fetched from the server.
    pub fn new(project: &Project, api: A) -> Self {
        Self {
            board: BoardState::new(project),
            sync: OrderSync::new(),
            api,
        }
    }

    /// The local board mirror.
    pub fn board(&self) -> &BoardState {
        &self.board
    }

    /// The request-state tracker.
    pub fn sync(&self) -> &OrderSync {
        &self.sync
    }

    /// Reorder tickets within one column.
    pub async fn reorder_column(
        &mut self,
        column_id: ColumnId,
        ticket_ids: Vec<TicketId>,
    ) -> Result<MutationOutcome, OrderingError> {
        self.submit_tickets_order(TicketsOrderUpdate::Single(ColumnReorder {
            column_id,
            ticket_ids,
        }))
        .await
    }

    /// Move a ticket between two columns.
    pub async fn move_ticket(
        &mut self,
        from: ColumnReorder,
        to: ColumnReorder,
    ) -> Result<MutationOutcome, OrderingError> {
        self.submit_tickets_order(TicketsOrderUpdate::Split { from, to })
            .await
    }

    /// Reorder the board's columns.
    pub async fn reorder_columns(
        &mut self,
        order: Vec<ColumnId>,
    ) -> Result<MutationOutcome, OrderingError> {
        let undo = UndoState::Layout(self.board.column_order());

        // Optimistic local apply, dispatched before the network call.
        self.board.apply_column_order(&order)?;
        let token = self.sync.begin(vec![SyncScope::Layout], undo);

        let result = self
            .api
            .update_column_order(self.board.project_id(), &order)
            .await;
        Ok(self.settle(token, result.err().map(|e| e.to_string())))
    }

    /// Local-only notification: slot a freshly created ticket into a
    /// lane. No network call; the creation itself was already persisted.
    pub fn note_ticket_created(
        &mut self,
        ticket_id: TicketId,
        column_id: &ColumnId,
    ) -> Result<(), OrderingError> {
        self.board.note_ticket_created(ticket_id, column_id)
    }

    /// Local-only notification: an already-persisted ticket edit moved
    /// the ticket to another lane.
    pub fn note_ticket_column_changed(
        &mut self,
        ticket_id: &TicketId,
        to_column: &ColumnId,
    ) -> Result<(), OrderingError> {
        self.board.note_ticket_column_changed(ticket_id, to_column)
    }

    async fn submit_tickets_order(
        &mut self,
        update: TicketsOrderUpdate,
    ) -> Result<MutationOutcome, OrderingError> {
        let touched = update.column_ids();
        let undo = UndoState::Columns(self.board.snapshot_columns(&touched));

        // Optimistic local apply, dispatched before the network call.
        self.board.apply_tickets_order(&update)?;
        let scopes = touched.into_iter().map(SyncScope::Column).collect();
        let token = self.sync.begin(scopes, undo);

        let result = self
            .api
            .update_tickets_order(self.board.project_id(), &update)
            .await;
        Ok(self.settle(token, result.err().map(|e| e.to_string())))
    }

    /// Resolve a completed request against the fencing tokens.
    fn settle(&mut self, token: SyncToken, error: Option<String>) -> MutationOutcome {
        match error {
            None => {
                let confirm = self.sync.confirm(token);
                if confirm == ConfirmOutcome::Stale {
                    tracing::debug!(%token, "stale confirmation discarded");
                }
                MutationOutcome {
                    token,
                    state: RequestState::Confirmed,
                    rolled_back: false,
                    needs_resync: false,
                }
            }
            Some(reason) => {
                tracing::warn!(%token, %reason, "ordering mutation rejected");
                let state = RequestState::Failed {
                    reason: reason.clone(),
                };
                match self.sync.fail(token, reason) {
                    FailOutcome::RollBack(undo) => {
                        self.board.restore(undo);
                        MutationOutcome {
                            token,
                            state,
                            rolled_back: true,
                            needs_resync: false,
                        }
                    }
                    FailOutcome::Superseded => MutationOutcome {
                        token,
                        state,
                        rolled_back: false,
                        needs_resync: true,
                    },
                }
            }
        }
    }
}
