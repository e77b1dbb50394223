//! Integration tests for the dispatch-then-persist board client.

use async_trait::async_trait;
use chrono::Utc;
use girder::domain::{
    Column, ColumnId, ColumnReorder, OrderingError, Project, ProjectId, TicketId,
    TicketsOrderUpdate,
};
use girder::keys::ProjectKey;
use girder_board::{ApiClientError, BoardClient, OrderingApi, RequestState};
use std::collections::VecDeque;
use std::sync::Mutex;

/// Scripted stand-in for the HTTP API.
///
/// Responses are popped per call; an empty script means success. Clones
/// share state, so tests can keep a handle for inspection after moving
/// one into the client.
#[derive(Default, Clone)]
struct MockApi {
    inner: std::sync::Arc<MockState>,
}

#[derive(Default)]
struct MockState {
    responses: Mutex<VecDeque<Result<(), String>>>,
    calls: Mutex<Vec<String>>,
}

impl MockApi {
    fn failing_once(message: &str) -> Self {
        let api = Self::default();
        api.inner
            .responses
            .lock()
            .unwrap()
            .push_back(Err(message.to_string()));
        api
    }

    fn call_count(&self) -> usize {
        self.inner.calls.lock().unwrap().len()
    }

    fn next_response(&self) -> Result<(), ApiClientError> {
        match self.inner.responses.lock().unwrap().pop_front() {
            Some(Err(message)) => Err(ApiClientError::Rejected {
                status: 400,
                message,
            }),
            _ => Ok(()),
        }
    }
}

#[async_trait]
impl OrderingApi for MockApi {
    async fn update_tickets_order(
        &self,
        _project_id: &ProjectId,
        _update: &TicketsOrderUpdate,
    ) -> Result<(), ApiClientError> {
        self.inner
            .calls
            .lock()
            .unwrap()
            .push("tickets-order".to_string());
        self.next_response()
    }

    async fn update_column_order(
        &self,
        _project_id: &ProjectId,
        _order: &[ColumnId],
    ) -> Result<(), ApiClientError> {
        self.inner
            .calls
            .lock()
            .unwrap()
            .push("column-order".to_string());
        self.next_response()
    }
}

fn project() -> Project {
    Project {
        id: ProjectId::new("p-1"),
        name: "Demo".to_string(),
        key: ProjectKey::new("DEMO").unwrap(),
        columns: vec![
            Column {
                id: ColumnId::new("l-todo"),
                title: "To Do".to_string(),
                ticket_ids: vec![TicketId::new("t-1"), TicketId::new("t-2")],
            },
            Column {
                id: ColumnId::new("l-prog"),
                title: "In Progress".to_string(),
                ticket_ids: vec![TicketId::new("t-3")],
            },
        ],
        ticket_seq: 3,
        created_at: Utc::now(),
        updated_at: Utc::now(),
    }
}

#[tokio::test]
async fn test_successful_reorder_is_confirmed() {
    let mut client = BoardClient::new(&project(), MockApi::default());

    let outcome = client
        .reorder_column(
            ColumnId::new("l-todo"),
            vec![TicketId::new("t-2"), TicketId::new("t-1")],
        )
        .await
        .unwrap();

    assert_eq!(outcome.state, RequestState::Confirmed);
    assert!(!outcome.rolled_back);
    assert!(!outcome.needs_resync);
    assert_eq!(
        client.board().columns()[0].ticket_ids,
        vec![TicketId::new("t-2"), TicketId::new("t-1")]
    );
}

#[tokio::test]
async fn test_rejected_reorder_rolls_back() {
    let mut client = BoardClient::new(&project(), MockApi::failing_once("board moved on"));

    let outcome = client
        .reorder_column(
            ColumnId::new("l-todo"),
            vec![TicketId::new("t-2"), TicketId::new("t-1")],
        )
        .await
        .unwrap();

    assert!(matches!(outcome.state, RequestState::Failed { .. }));
    assert!(outcome.rolled_back);
    assert!(!outcome.needs_resync);
    // Back to the original ordering.
    assert_eq!(
        client.board().columns()[0].ticket_ids,
        vec![TicketId::new("t-1"), TicketId::new("t-2")]
    );
}

#[tokio::test]
async fn test_rejected_move_restores_both_columns() {
    let mut client = BoardClient::new(&project(), MockApi::failing_once("nope"));

    let outcome = client
        .move_ticket(
            ColumnReorder {
                column_id: ColumnId::new("l-todo"),
                ticket_ids: vec![TicketId::new("t-2")],
            },
            ColumnReorder {
                column_id: ColumnId::new("l-prog"),
                ticket_ids: vec![TicketId::new("t-1"), TicketId::new("t-3")],
            },
        )
        .await
        .unwrap();

    assert!(outcome.rolled_back);
    assert_eq!(
        client.board().columns()[0].ticket_ids,
        vec![TicketId::new("t-1"), TicketId::new("t-2")]
    );
    assert_eq!(
        client.board().columns()[1].ticket_ids,
        vec![TicketId::new("t-3")]
    );
}

#[tokio::test]
async fn test_rejected_column_reorder_restores_layout() {
    let mut client = BoardClient::new(&project(), MockApi::failing_once("nope"));

    let outcome = client
        .reorder_columns(vec![ColumnId::new("l-prog"), ColumnId::new("l-todo")])
        .await
        .unwrap();

    assert!(outcome.rolled_back);
    assert_eq!(
        client.board().column_order(),
        vec![ColumnId::new("l-todo"), ColumnId::new("l-prog")]
    );
}

#[tokio::test]
async fn test_structurally_invalid_mutation_never_hits_the_network() {
    let api = MockApi::default();
    let mut client = BoardClient::new(&project(), api.clone());

    // t-3 already sits in In Progress.
    let err = client
        .reorder_column(
            ColumnId::new("l-todo"),
            vec![
                TicketId::new("t-1"),
                TicketId::new("t-2"),
                TicketId::new("t-3"),
            ],
        )
        .await
        .unwrap_err();

    assert!(matches!(err, OrderingError::AlreadyPlaced { .. }));
    // Board unchanged, nothing dispatched.
    assert_eq!(client.board().columns()[0].ticket_ids.len(), 2);
    assert_eq!(client.sync().pending_count(), 0);
    assert_eq!(api.call_count(), 0);
}

#[tokio::test]
async fn test_local_notifications_skip_the_network() {
    let api = MockApi::default();
    let mut client = BoardClient::new(&project(), api.clone());

    client
        .note_ticket_created(TicketId::new("t-4"), &ColumnId::new("l-todo"))
        .unwrap();
    client
        .note_ticket_column_changed(&TicketId::new("t-1"), &ColumnId::new("l-prog"))
        .unwrap();

    assert_eq!(
        client.board().columns()[0].ticket_ids,
        vec![TicketId::new("t-2"), TicketId::new("t-4")]
    );
    assert!(client.board().columns()[1]
        .ticket_ids
        .contains(&TicketId::new("t-1")));
    assert_eq!(api.call_count(), 0);
}
