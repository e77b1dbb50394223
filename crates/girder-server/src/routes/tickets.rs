//! Ticket routes: CRUD, epic linking, and comments.

use super::persist;
use crate::auth::AuthedUser;
use crate::error::ApiError;
use crate::state::SharedState;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::{Extension, Json};
use girder::domain::{
    CommentId, DateRange, EpicUpdate, IssuePriority, IssueType, NewEpicFields, NewTicket,
    ProjectId, TicketId, TicketUpdate, UserId,
};

// ── Request payload types ─────────────────────────────────────────────

/// Body of `POST /tickets/create`.
#[derive(Debug, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTicketRequest {
    /// Owning project.
    pub project_id: ProjectId,
    /// Ticket type.
    pub issue_type: IssueType,
    /// Ticket priority.
    pub issue_priority: IssuePriority,
    /// One-line summary.
    pub summary: String,
    /// Long-form description.
    #[serde(default)]
    pub description: String,
    /// Assigned user, if any.
    #[serde(default)]
    pub assignee_id: Option<UserId>,
    /// Reporting user.
    pub reporter_id: UserId,
}

/// Body of `POST /tickets/create/epic`.
#[derive(Debug, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateEpicRequest {
    /// Owning project.
    pub project_id: ProjectId,
    /// Ticket priority.
    pub issue_priority: IssuePriority,
    /// One-line summary.
    pub summary: String,
    /// Long-form description.
    #[serde(default)]
    pub description: String,
    /// Assigned user, if any.
    #[serde(default)]
    pub assignee_id: Option<UserId>,
    /// Reporting user.
    pub reporter_id: UserId,
    /// Display color for the epic's board chip.
    pub issue_color: String,
    /// Planned date range.
    pub date_range: DateRange,
}

/// Body of `POST /tickets/update/{id}`.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UpdateTicketRequest {
    /// New issue type.
    pub issue_type: Option<IssueType>,
    /// New priority.
    pub issue_priority: Option<IssuePriority>,
    /// New summary.
    pub summary: Option<String>,
    /// New description.
    pub description: Option<String>,
    /// New assignee.
    pub assignee_id: Option<UserId>,
    /// New reporter.
    pub reporter_id: Option<UserId>,
}

impl UpdateTicketRequest {
    fn into_update(self) -> TicketUpdate {
        TicketUpdate {
            issue_type: self.issue_type,
            issue_priority: self.issue_priority,
            summary: self.summary,
            description: self.description,
            assignee_id: self.assignee_id.map(Some),
            reporter_id: self.reporter_id,
        }
    }
}

/// Body of `POST /tickets/update/epic/{id}`.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UpdateEpicRequest {
    /// Core ticket field updates.
    #[serde(flatten)]
    pub core: UpdateTicketRequest,
    /// New epic color.
    pub issue_color: Option<String>,
    /// New date range.
    pub date_range: Option<DateRange>,
    /// New done flag.
    pub is_epic_done: Option<bool>,
}

/// Body of `POST /tickets/edit/link_epic/{id}`.
#[derive(Debug, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LinkEpicRequest {
    /// The epic to link to.
    pub epic_id: TicketId,
}

/// Body of `POST /tickets/comment/{id}`.
#[derive(Debug, serde::Deserialize)]
pub struct AddCommentRequest {
    /// Comment body.
    pub text: String,
}

// ── Handlers ──────────────────────────────────────────────────────────

/// `GET /tickets/{project_id}` — all tickets of a project.
pub async fn list_tickets(
    State(state): State<SharedState>,
    Path(project_id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let tickets = state
        .store
        .read()
        .await
        .list_tickets(&ProjectId::new(project_id))
        .await?;
    Ok(Json(tickets))
}

/// `POST /tickets/create` — create a ticket; key is assigned atomically.
pub async fn create_ticket(
    State(state): State<SharedState>,
    Json(req): Json<CreateTicketRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let ticket = {
        let mut store = state.store.write().await;
        store
            .create_ticket(NewTicket {
                project_id: req.project_id,
                issue_type: req.issue_type,
                issue_priority: req.issue_priority,
                summary: req.summary,
                description: req.description,
                assignee_id: req.assignee_id,
                reporter_id: req.reporter_id,
                epic: None,
            })
            .await?
    };
    persist(&state).await?;
    Ok((StatusCode::CREATED, Json(ticket)))
}

/// `POST /tickets/create/epic` — create an epic ticket.
pub async fn create_epic(
    State(state): State<SharedState>,
    Json(req): Json<CreateEpicRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let ticket = {
        let mut store = state.store.write().await;
        store
            .create_ticket(NewTicket {
                project_id: req.project_id,
                issue_type: IssueType::Epic,
                issue_priority: req.issue_priority,
                summary: req.summary,
                description: req.description,
                assignee_id: req.assignee_id,
                reporter_id: req.reporter_id,
                epic: Some(NewEpicFields {
                    color: req.issue_color,
                    date_range: req.date_range,
                }),
            })
            .await?
    };
    persist(&state).await?;
    Ok((StatusCode::CREATED, Json(ticket)))
}

/// `DELETE /tickets/{ticket_id}` — delete a ticket, returning the record.
pub async fn delete_ticket(
    State(state): State<SharedState>,
    Path(ticket_id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let ticket = {
        let mut store = state.store.write().await;
        store.delete_ticket(&TicketId::new(ticket_id)).await?
    };
    persist(&state).await?;
    Ok(Json(ticket))
}

/// `POST /tickets/update/{id}` — partial update of core fields.
pub async fn update_ticket(
    State(state): State<SharedState>,
    Path(ticket_id): Path<String>,
    Json(req): Json<UpdateTicketRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let ticket = {
        let mut store = state.store.write().await;
        store
            .update_ticket(&TicketId::new(ticket_id), req.into_update())
            .await?
    };
    persist(&state).await?;
    Ok(Json(ticket))
}

/// `POST /tickets/update/epic/{id}` — partial update including epic fields.
pub async fn update_epic(
    State(state): State<SharedState>,
    Path(ticket_id): Path<String>,
    Json(req): Json<UpdateEpicRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let ticket = {
        let mut store = state.store.write().await;
        store
            .update_epic(
                &TicketId::new(ticket_id),
                EpicUpdate {
                    ticket: req.core.into_update(),
                    color: req.issue_color,
                    date_range: req.date_range,
                    done: req.is_epic_done,
                },
            )
            .await?
    };
    persist(&state).await?;
    Ok(Json(ticket))
}

/// `POST /tickets/edit/link_epic/{id}` — link a ticket to an epic.
pub async fn link_epic(
    State(state): State<SharedState>,
    Path(ticket_id): Path<String>,
    Json(req): Json<LinkEpicRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let ticket = {
        let mut store = state.store.write().await;
        store
            .link_epic(&TicketId::new(ticket_id), &req.epic_id)
            .await?
    };
    persist(&state).await?;
    Ok(Json(ticket))
}

/// `POST /tickets/comment/{id}` — comment as the authenticated user.
pub async fn add_comment(
    State(state): State<SharedState>,
    Path(ticket_id): Path<String>,
    Extension(AuthedUser(user_id)): Extension<AuthedUser>,
    Json(req): Json<AddCommentRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let comments = {
        let mut store = state.store.write().await;
        store
            .add_comment(&TicketId::new(ticket_id), &user_id, req.text)
            .await?
    };
    persist(&state).await?;
    Ok(Json(comments))
}

/// `DELETE /tickets/comment/{id}/{comment_id}` — delete own comment.
pub async fn delete_comment(
    State(state): State<SharedState>,
    Path((ticket_id, comment_id)): Path<(String, String)>,
    Extension(AuthedUser(user_id)): Extension<AuthedUser>,
) -> Result<impl IntoResponse, ApiError> {
    let comments = {
        let mut store = state.store.write().await;
        store
            .delete_comment(
                &TicketId::new(ticket_id),
                &CommentId::new(comment_id),
                &user_id,
            )
            .await?
    };
    persist(&state).await?;
    Ok(Json(comments))
}
