//! TrackerStorage trait implementation for in-memory storage.

use super::inner::TrackerStoreInner;
use super::InMemoryStorage;
use crate::domain::{
    apply_column_order, apply_tickets_order, Column, ColumnId, Comment, CommentAuthor, CommentId,
    EpicFields, EpicUpdate, NewProject, NewTicket, NewUser, OrderingError, Project, ProjectId,
    Ticket, TicketId, TicketUpdate, TicketsOrderUpdate, User, UserId, MAX_COMMENT_LENGTH,
    MAX_SUMMARY_LENGTH,
};
use crate::error::{Error, Result};
use crate::ids::EntityKind;
use crate::keys::{ProjectKey, TicketKey};
use crate::storage::{Record, TrackerStorage};
use async_trait::async_trait;
use chrono::Utc;

/// Lane titles seeded onto every new project's board.
const DEFAULT_LANES: [&str; 3] = ["To Do", "In Progress", "Done"];

/// Apply a partial core-field update to a ticket.
///
/// Shared by `update_ticket` and `update_epic`. Never touches `key`,
/// `count`, `comments`, `linked_epic`, or epic fields.
fn apply_core_update(ticket: &mut Ticket, updates: TicketUpdate) -> Result<()> {
    if let Some(summary) = &updates.summary {
        if summary.trim().is_empty() {
            return Err(Error::Validation("summary cannot be empty".to_string()));
        }
        if summary.len() > MAX_SUMMARY_LENGTH {
            return Err(Error::Validation(format!(
                "summary cannot exceed {} characters",
                MAX_SUMMARY_LENGTH
            )));
        }
    }
    if let Some(issue_type) = updates.issue_type {
        // Core updates can't change a ticket into or out of an epic;
        // epics carry fields this path doesn't manage.
        let is_epic = ticket.epic.is_some();
        if (issue_type == crate::domain::IssueType::Epic) != is_epic {
            return Err(Error::Validation(
                "cannot change a ticket into or out of the epic type".to_string(),
            ));
        }
        ticket.issue_type = issue_type;
    }
    if let Some(priority) = updates.issue_priority {
        ticket.issue_priority = priority;
    }
    if let Some(summary) = updates.summary {
        ticket.summary = summary;
    }
    if let Some(description) = updates.description {
        ticket.description = description;
    }
    if let Some(assignee) = updates.assignee_id {
        ticket.assignee_id = assignee;
    }
    if let Some(reporter) = updates.reporter_id {
        ticket.reporter_id = reporter;
    }
    ticket.updated_at = Utc::now();
    Ok(())
}

#[async_trait]
impl TrackerStorage for InMemoryStorage {
    async fn create_user(&mut self, new_user: NewUser) -> Result<User> {
        let mut inner = self.lock().await;

        if new_user.name.trim().is_empty() {
            return Err(Error::Validation("user name cannot be empty".to_string()));
        }

        let id = UserId::new(inner.generate_id(EntityKind::User, &new_user.name)?);
        let user = User {
            id: id.clone(),
            name: new_user.name,
            picture_url: new_user.picture_url,
            created_at: Utc::now(),
        };
        inner.users.insert(id, user.clone());
        Ok(user)
    }

    async fn get_user(&self, id: &UserId) -> Result<Option<User>> {
        let inner = self.lock().await;
        Ok(inner.users.get(id).cloned())
    }

    async fn create_project(&mut self, new_project: NewProject) -> Result<Project> {
        let mut inner = self.lock().await;

        new_project.validate().map_err(Error::Validation)?;
        let key = ProjectKey::new(new_project.key)?;
        if inner.projects.values().any(|p| p.key == key) {
            return Err(Error::DuplicateProjectKey(key.as_str().to_string()));
        }

        let id = ProjectId::new(inner.generate_id(EntityKind::Project, &new_project.name)?);

        let mut columns = Vec::with_capacity(DEFAULT_LANES.len());
        for title in DEFAULT_LANES {
            let column_id = ColumnId::new(inner.generate_id(EntityKind::Column, title)?);
            columns.push(Column {
                id: column_id,
                title: title.to_string(),
                ticket_ids: Vec::new(),
            });
        }

        let now = Utc::now();
        let project = Project {
            id: id.clone(),
            name: new_project.name,
            key,
            columns,
            ticket_seq: 0,
            created_at: now,
            updated_at: now,
        };
        inner.projects.insert(id, project.clone());
        Ok(project)
    }

    async fn get_project(&self, id: &ProjectId) -> Result<Option<Project>> {
        let inner = self.lock().await;
        Ok(inner.projects.get(id).cloned())
    }

    async fn list_projects(&self) -> Result<Vec<Project>> {
        let inner = self.lock().await;
        Ok(inner.projects.values().cloned().collect())
    }

    async fn update_tickets_order(
        &mut self,
        project_id: &ProjectId,
        update: TicketsOrderUpdate,
    ) -> Result<Project> {
        let mut inner = self.lock().await;
        let TrackerStoreInner {
            projects, tickets, ..
        } = &mut *inner;

        let project = projects
            .get_mut(project_id)
            .ok_or_else(|| Error::ProjectNotFound(project_id.clone()))?;

        // Orderings may introduce tickets not yet on the board, but only
        // tickets that actually belong to this project.
        for ticket_id in update.ticket_ids() {
            let belongs = tickets
                .get(ticket_id)
                .is_some_and(|t| t.project_id == *project_id);
            if !belongs {
                return Err(Error::TicketNotInProject {
                    ticket: ticket_id.clone(),
                    project: project_id.clone(),
                });
            }
        }

        apply_tickets_order(&mut project.columns, &update).map_err(|e| match e {
            OrderingError::UnknownColumn(column) => Error::ColumnNotFound {
                project: project_id.clone(),
                column,
            },
            other => Error::Ordering(other),
        })?;

        project.updated_at = Utc::now();
        Ok(project.clone())
    }

    async fn update_column_order(
        &mut self,
        project_id: &ProjectId,
        order: Vec<ColumnId>,
    ) -> Result<Project> {
        let mut inner = self.lock().await;

        let project = inner
            .projects
            .get_mut(project_id)
            .ok_or_else(|| Error::ProjectNotFound(project_id.clone()))?;

        apply_column_order(&mut project.columns, &order)?;
        project.updated_at = Utc::now();
        Ok(project.clone())
    }

    async fn create_ticket(&mut self, new_ticket: NewTicket) -> Result<Ticket> {
        let mut inner = self.lock().await;

        new_ticket.validate().map_err(Error::Validation)?;

        if !inner.projects.contains_key(&new_ticket.project_id) {
            return Err(Error::ProjectNotFound(new_ticket.project_id));
        }

        let id = TicketId::new(inner.generate_id(EntityKind::Ticket, &new_ticket.summary)?);

        // Count allocation and key assignment happen together under the
        // store lock: no observable state without a key, no duplicate
        // keys under concurrent creates.
        let project = inner
            .projects
            .get_mut(&new_ticket.project_id)
            .ok_or_else(|| Error::ProjectNotFound(new_ticket.project_id.clone()))?;
        project.ticket_seq += 1;
        let count = project.ticket_seq;
        let key = TicketKey::new(&project.key, count);

        let now = Utc::now();
        let ticket = Ticket {
            id: id.clone(),
            project_id: new_ticket.project_id,
            key,
            count,
            issue_type: new_ticket.issue_type,
            issue_priority: new_ticket.issue_priority,
            summary: new_ticket.summary,
            description: new_ticket.description,
            assignee_id: new_ticket.assignee_id,
            reporter_id: new_ticket.reporter_id,
            linked_epic: None,
            epic: new_ticket.epic.map(|epic| EpicFields {
                color: epic.color,
                date_range: epic.date_range,
                done: false,
            }),
            comments: Vec::new(),
            created_at: now,
            updated_at: now,
        };
        inner.tickets.insert(id, ticket.clone());
        Ok(ticket)
    }

    async fn get_ticket(&self, id: &TicketId) -> Result<Option<Ticket>> {
        let inner = self.lock().await;
        Ok(inner.tickets.get(id).cloned())
    }

    async fn list_tickets(&self, project_id: &ProjectId) -> Result<Vec<Ticket>> {
        let inner = self.lock().await;
        Ok(inner
            .tickets
            .values()
            .filter(|t| t.project_id == *project_id)
            .cloned()
            .collect())
    }

    async fn update_ticket(&mut self, id: &TicketId, updates: TicketUpdate) -> Result<Ticket> {
        let mut inner = self.lock().await;

        let ticket = inner
            .tickets
            .get_mut(id)
            .ok_or_else(|| Error::TicketNotFound(id.clone()))?;

        apply_core_update(ticket, updates)?;
        Ok(ticket.clone())
    }

    async fn update_epic(&mut self, id: &TicketId, updates: EpicUpdate) -> Result<Ticket> {
        let mut inner = self.lock().await;

        let ticket = inner
            .tickets
            .get_mut(id)
            .ok_or_else(|| Error::TicketNotFound(id.clone()))?;

        if !ticket.is_epic() {
            return Err(Error::NotAnEpic(id.clone()));
        }

        apply_core_update(ticket, updates.ticket)?;

        let Some(epic) = ticket.epic.as_mut() else {
            return Err(Error::Storage(format!(
                "epic ticket {} has no epic fields",
                id
            )));
        };
        if let Some(color) = updates.color {
            epic.color = color;
        }
        if let Some(date_range) = updates.date_range {
            epic.date_range = date_range;
        }
        if let Some(done) = updates.done {
            epic.done = done;
        }

        Ok(ticket.clone())
    }

    async fn link_epic(&mut self, id: &TicketId, epic_id: &TicketId) -> Result<Ticket> {
        let mut inner = self.lock().await;

        if id == epic_id {
            return Err(Error::Validation(
                "a ticket cannot be linked to itself".to_string(),
            ));
        }

        match inner.tickets.get(epic_id).map(Ticket::is_epic) {
            None => return Err(Error::TicketNotFound(epic_id.clone())),
            Some(false) => return Err(Error::NotAnEpic(epic_id.clone())),
            Some(true) => {}
        }

        let ticket = inner
            .tickets
            .get_mut(id)
            .ok_or_else(|| Error::TicketNotFound(id.clone()))?;
        ticket.linked_epic = Some(epic_id.clone());
        ticket.updated_at = Utc::now();
        Ok(ticket.clone())
    }

    async fn delete_ticket(&mut self, id: &TicketId) -> Result<Ticket> {
        let mut inner = self.lock().await;

        let ticket = inner
            .tickets
            .remove(id)
            .ok_or_else(|| Error::TicketNotFound(id.clone()))?;

        // Keep the board invariant: orderings never reference a ticket
        // that no longer exists.
        if let Some(project) = inner.projects.get_mut(&ticket.project_id) {
            if project.remove_ticket_from_columns(id) {
                project.updated_at = Utc::now();
            }
        }

        Ok(ticket)
    }

    async fn add_comment(
        &mut self,
        ticket_id: &TicketId,
        user_id: &UserId,
        text: String,
    ) -> Result<Vec<Comment>> {
        let mut inner = self.lock().await;

        if text.trim().is_empty() {
            return Err(Error::Validation("comment text cannot be empty".to_string()));
        }
        if text.len() > MAX_COMMENT_LENGTH {
            return Err(Error::Validation(format!(
                "comment cannot exceed {} characters",
                MAX_COMMENT_LENGTH
            )));
        }
        if !inner.tickets.contains_key(ticket_id) {
            return Err(Error::TicketNotFound(ticket_id.clone()));
        }

        let user = inner
            .users
            .get(user_id)
            .cloned()
            .ok_or_else(|| Error::UserNotFound(user_id.clone()))?;

        let comment_id = CommentId::new(inner.generate_id(EntityKind::Comment, &text)?);

        let ticket = inner
            .tickets
            .get_mut(ticket_id)
            .ok_or_else(|| Error::TicketNotFound(ticket_id.clone()))?;

        let now = Utc::now();
        let comment = Comment {
            id: comment_id,
            // Snapshot the author at write time; later profile edits must
            // not rewrite existing comments.
            author: CommentAuthor {
                user_id: user.id,
                name: user.name,
                picture_url: user.picture_url,
            },
            text,
            created_at: now,
        };

        ticket.comments.insert(0, comment);
        ticket.updated_at = now;
        Ok(ticket.comments.clone())
    }

    async fn delete_comment(
        &mut self,
        ticket_id: &TicketId,
        comment_id: &CommentId,
        requesting_user: &UserId,
    ) -> Result<Vec<Comment>> {
        let mut inner = self.lock().await;

        let ticket = inner
            .tickets
            .get_mut(ticket_id)
            .ok_or_else(|| Error::TicketNotFound(ticket_id.clone()))?;

        let comment = ticket
            .comments
            .iter()
            .find(|c| c.id == *comment_id)
            .ok_or_else(|| Error::CommentNotFound(comment_id.clone()))?;

        if comment.author.user_id != *requesting_user {
            return Err(Error::NotCommentAuthor {
                comment: comment_id.clone(),
                user: requesting_user.clone(),
            });
        }

        ticket.comments.retain(|c| c.id != *comment_id);
        ticket.updated_at = Utc::now();
        Ok(ticket.comments.clone())
    }

    async fn export_records(&self) -> Result<Vec<Record>> {
        let inner = self.lock().await;

        // Deterministic export order (by kind, then id) keeps the JSONL
        // file stable across saves.
        let mut users: Vec<&User> = inner.users.values().collect();
        users.sort_by(|a, b| a.id.cmp(&b.id));
        let mut projects: Vec<&Project> = inner.projects.values().collect();
        projects.sort_by(|a, b| a.id.cmp(&b.id));
        let mut tickets: Vec<&Ticket> = inner.tickets.values().collect();
        tickets.sort_by(|a, b| a.id.cmp(&b.id));

        Ok(users
            .into_iter()
            .map(|u| Record::User(u.clone()))
            .chain(projects.into_iter().map(|p| Record::Project(p.clone())))
            .chain(tickets.into_iter().map(|t| Record::Ticket(t.clone())))
            .collect())
    }

    async fn import_records(&mut self, records: Vec<Record>) -> Result<()> {
        let mut inner = self.lock().await;

        for record in records {
            match record {
                Record::User(user) => {
                    inner.users.insert(user.id.clone(), user);
                }
                Record::Project(project) => {
                    inner.projects.insert(project.id.clone(), project);
                }
                Record::Ticket(ticket) => {
                    inner.tickets.insert(ticket.id.clone(), ticket);
                }
            }
        }

        inner.register_all_ids();
        Ok(())
    }

    async fn save(&self) -> Result<()> {
        // Ephemeral storage; the JSONL wrapper overrides this.
        Ok(())
    }

    async fn reload(&mut self) -> Result<()> {
        Ok(())
    }
}
