//! JSONL persistence for in-memory storage.
//!
//! The data file holds one tagged record per line (see
//! [`crate::storage::Record`]). Loading is resilient: malformed lines and
//! records that violate referential integrity are skipped with warnings
//! instead of failing the whole load.

use super::inner::TrackerStoreInner;
use crate::domain::{ProjectId, TicketId};
use crate::error::{Error, Result};
use crate::storage::{Record, TrackerStorage};
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;
use tokio::fs::File;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, BufWriter};
use tokio::sync::Mutex;

/// Non-fatal problems encountered while loading a JSONL data file.
///
/// The load continues past all of these; callers should surface them
/// (girder logs them via `tracing::warn!`) since they indicate data that
/// needed repair.
#[derive(Debug, Clone)]
pub enum LoadWarning {
    /// A line that couldn't be parsed as a record. The line is skipped.
    MalformedJson {
        /// 1-based line number in the file.
        line_number: usize,
        /// Parser error message.
        error: String,
    },

    /// A ticket whose owning project is not in the file. The ticket is
    /// skipped.
    OrphanTicket {
        /// The skipped ticket.
        ticket: TicketId,
        /// The project it claimed to belong to.
        project: ProjectId,
    },

    /// A column ordering referenced a ticket that doesn't exist or lives
    /// in another project. The entry is pruned from the ordering.
    DanglingBoardEntry {
        /// The project whose board was repaired.
        project: ProjectId,
        /// The pruned ticket id.
        ticket: TicketId,
    },

    /// A project's ticket counter was behind the highest ticket count
    /// observed; it was bumped so future keys can't collide.
    CounterBehind {
        /// The repaired project.
        project: ProjectId,
        /// The highest ticket count found in the file.
        observed: u64,
    },
}

/// Load storage from a JSONL file.
///
/// Returns the storage and all non-fatal warnings produced while loading.
pub async fn load_from_jsonl(path: &Path) -> Result<(Box<dyn TrackerStorage>, Vec<LoadWarning>)> {
    let file = File::open(path).await.map_err(Error::Io)?;
    let reader = BufReader::new(file);
    let mut lines = reader.lines();

    let mut warnings = Vec::new();
    let mut records = Vec::new();
    let mut line_number = 0usize;

    while let Some(line) = lines.next_line().await.map_err(Error::Io)? {
        line_number += 1;
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        match serde_json::from_str::<Record>(trimmed) {
            Ok(record) => records.push(record),
            Err(e) => warnings.push(LoadWarning::MalformedJson {
                line_number,
                error: e.to_string(),
            }),
        }
    }

    let mut inner = TrackerStoreInner::new();

    // First pass: users and projects.
    for record in &records {
        match record {
            Record::User(user) => {
                inner.users.insert(user.id.clone(), user.clone());
            }
            Record::Project(project) => {
                inner.projects.insert(project.id.clone(), project.clone());
            }
            Record::Ticket(_) => {}
        }
    }

    // Second pass: tickets, skipping any whose project didn't load.
    let mut max_counts: HashMap<ProjectId, u64> = HashMap::new();
    for record in records {
        if let Record::Ticket(ticket) = record {
            if !inner.projects.contains_key(&ticket.project_id) {
                warnings.push(LoadWarning::OrphanTicket {
                    ticket: ticket.id,
                    project: ticket.project_id,
                });
                continue;
            }
            let entry = max_counts.entry(ticket.project_id.clone()).or_default();
            *entry = (*entry).max(ticket.count);
            inner.tickets.insert(ticket.id.clone(), ticket);
        }
    }

    // Third pass: repair board orderings and sequence counters.
    let TrackerStoreInner {
        projects, tickets, ..
    } = &mut inner;
    for project in projects.values_mut() {
        for column in &mut project.columns {
            column.ticket_ids.retain(|ticket_id| {
                let valid = tickets
                    .get(ticket_id)
                    .is_some_and(|t| t.project_id == project.id);
                if !valid {
                    warnings.push(LoadWarning::DanglingBoardEntry {
                        project: project.id.clone(),
                        ticket: ticket_id.clone(),
                    });
                }
                valid
            });
        }

        if let Some(&observed) = max_counts.get(&project.id) {
            if project.ticket_seq < observed {
                warnings.push(LoadWarning::CounterBehind {
                    project: project.id.clone(),
                    observed,
                });
                project.ticket_seq = observed;
            }
        }
    }

    inner.register_all_ids();

    Ok((Box::new(Arc::new(Mutex::new(inner))), warnings))
}

/// Save storage to a JSONL file with atomic writes.
///
/// Writes to a temporary file first, then renames over the target, so an
/// interrupted save leaves the original file untouched.
pub async fn save_to_jsonl(storage: &dyn TrackerStorage, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            tokio::fs::create_dir_all(parent).await.map_err(Error::Io)?;
        }
    }

    let temp_path = path.with_extension("tmp");
    let file = File::create(&temp_path).await.map_err(Error::Io)?;
    let mut writer = BufWriter::new(file);

    let records = storage.export_records().await?;
    for record in &records {
        let json = serde_json::to_string(record)?;
        writer.write_all(json.as_bytes()).await.map_err(Error::Io)?;
        writer.write_all(b"\n").await.map_err(Error::Io)?;
    }

    writer.flush().await.map_err(Error::Io)?;

    tokio::fs::rename(&temp_path, path)
        .await
        .map_err(Error::Io)?;

    Ok(())
}
