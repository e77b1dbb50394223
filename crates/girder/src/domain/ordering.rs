//! Board ordering updates.
//!
//! Drag-and-drop on the board produces one of two ticket-ordering shapes
//! (reorder within one column, move between two columns) or a column-order
//! change. The server and the client's optimistic mirror apply the same
//! update through the same functions, so a structurally invalid update is
//! rejected identically on both sides.
//!
//! An update carries the complete new ordering of each affected column.
//! It may introduce tickets that aren't on the board yet (this is how a
//! freshly created ticket gets its first placement) and may drop tickets
//! from the board, but it can never duplicate a ticket across columns.
//! Whether an introduced ticket actually belongs to the project is checked
//! by the storage layer, which knows the ticket records.

use super::{Column, ColumnId, TicketId};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use thiserror::Error;

/// Errors produced by applying an ordering update.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum OrderingError {
    /// The update referenced a column the board does not have.
    #[error("unknown column: {0}")]
    UnknownColumn(ColumnId),

    /// The same column appeared on both sides of a split update.
    #[error("split update must target two distinct columns")]
    SameColumn,

    /// A ticket id appeared more than once in the new orderings.
    #[error("ticket appears more than once in the update: {0}")]
    DuplicateTicket(TicketId),

    /// A ticket in the new orderings already sits in a column the update
    /// doesn't touch; applying would duplicate it across the board.
    #[error("ticket {ticket} is already placed in column {column}")]
    AlreadyPlaced {
        /// The offending ticket.
        ticket: TicketId,
        /// The untouched column that holds it.
        column: ColumnId,
    },

    /// A column-order update was not a permutation of the existing columns.
    #[error("column order must be a permutation of the existing columns")]
    NotAPermutation,
}

/// New ticket ordering for a single column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ColumnReorder {
    /// The column being reordered.
    pub column_id: ColumnId,

    /// The complete new ticket ordering for that column.
    pub ticket_ids: Vec<TicketId>,
}

/// One drag-and-drop ticket ordering mutation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TicketsOrderUpdate {
    /// Reorder (or place/remove) tickets within one column.
    Single(ColumnReorder),

    /// Move a ticket between two columns; both columns' complete new
    /// orderings are carried.
    Split {
        /// The column the ticket left.
        from: ColumnReorder,

        /// The column the ticket landed in.
        to: ColumnReorder,
    },
}

impl TicketsOrderUpdate {
    /// The column ids this update touches.
    #[must_use]
    pub fn column_ids(&self) -> Vec<ColumnId> {
        match self {
            Self::Single(reorder) => vec![reorder.column_id.clone()],
            Self::Split { from, to } => vec![from.column_id.clone(), to.column_id.clone()],
        }
    }

    /// Every ticket id referenced by the new orderings.
    #[must_use]
    pub fn ticket_ids(&self) -> Vec<&TicketId> {
        match self {
            Self::Single(reorder) => reorder.ticket_ids.iter().collect(),
            Self::Split { from, to } => {
                from.ticket_ids.iter().chain(&to.ticket_ids).collect()
            }
        }
    }
}

/// Apply a ticket ordering update to a board's columns.
pub fn apply_tickets_order(
    columns: &mut [Column],
    update: &TicketsOrderUpdate,
) -> Result<(), OrderingError> {
    let targets: Vec<(usize, &ColumnReorder)> = match update {
        TicketsOrderUpdate::Single(reorder) => {
            vec![(find_column(columns, &reorder.column_id)?, reorder)]
        }
        TicketsOrderUpdate::Split { from, to } => {
            if from.column_id == to.column_id {
                return Err(OrderingError::SameColumn);
            }
            vec![
                (find_column(columns, &from.column_id)?, from),
                (find_column(columns, &to.column_id)?, to),
            ]
        }
    };

    // No ticket may appear twice within the new orderings.
    let mut seen: HashSet<&TicketId> = HashSet::new();
    for (_, reorder) in &targets {
        for ticket_id in &reorder.ticket_ids {
            if !seen.insert(ticket_id) {
                return Err(OrderingError::DuplicateTicket(ticket_id.clone()));
            }
        }
    }

    // Nor may it already sit in a column the update doesn't touch.
    let touched: HashSet<usize> = targets.iter().map(|(index, _)| *index).collect();
    for (index, column) in columns.iter().enumerate() {
        if touched.contains(&index) {
            continue;
        }
        if let Some(ticket_id) = column.ticket_ids.iter().find(|id| seen.contains(id)) {
            return Err(OrderingError::AlreadyPlaced {
                ticket: ticket_id.clone(),
                column: column.id.clone(),
            });
        }
    }

    for (index, reorder) in targets {
        columns[index].ticket_ids = reorder.ticket_ids.clone();
    }
    Ok(())
}

/// Apply a column-order update to a board's columns.
///
/// `order` must be a permutation of the existing column ids.
pub fn apply_column_order(
    columns: &mut Vec<Column>,
    order: &[ColumnId],
) -> Result<(), OrderingError> {
    let mut existing: Vec<&ColumnId> = columns.iter().map(|c| &c.id).collect();
    let mut requested: Vec<&ColumnId> = order.iter().collect();
    existing.sort();
    requested.sort();
    if existing != requested {
        return Err(OrderingError::NotAPermutation);
    }

    columns.sort_by_key(|c| {
        order
            .iter()
            .position(|id| *id == c.id)
            .unwrap_or(usize::MAX)
    });
    Ok(())
}

fn find_column(columns: &[Column], id: &ColumnId) -> Result<usize, OrderingError> {
    columns
        .iter()
        .position(|c| c.id == *id)
        .ok_or_else(|| OrderingError::UnknownColumn(id.clone()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn board() -> Vec<Column> {
        vec![
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
            Column {
                id: ColumnId::new("l-done"),
                title: "Done".to_string(),
                ticket_ids: vec![],
            },
        ]
    }

    #[test]
    fn test_single_reorder() {
        let mut columns = board();
        let update = TicketsOrderUpdate::Single(ColumnReorder {
            column_id: ColumnId::new("l-todo"),
            ticket_ids: vec![TicketId::new("t-2"), TicketId::new("t-1")],
        });

        apply_tickets_order(&mut columns, &update).unwrap();
        assert_eq!(
            columns[0].ticket_ids,
            vec![TicketId::new("t-2"), TicketId::new("t-1")]
        );
    }

    #[test]
    fn test_single_can_place_a_new_ticket() {
        let mut columns = board();
        let update = TicketsOrderUpdate::Single(ColumnReorder {
            column_id: ColumnId::new("l-todo"),
            ticket_ids: vec![
                TicketId::new("t-4"),
                TicketId::new("t-1"),
                TicketId::new("t-2"),
            ],
        });

        apply_tickets_order(&mut columns, &update).unwrap();
        assert_eq!(columns[0].ticket_ids.len(), 3);
        assert_eq!(columns[0].ticket_ids[0], TicketId::new("t-4"));
    }

    #[test]
    fn test_single_can_drop_a_ticket_from_the_board() {
        let mut columns = board();
        let update = TicketsOrderUpdate::Single(ColumnReorder {
            column_id: ColumnId::new("l-todo"),
            ticket_ids: vec![TicketId::new("t-1")],
        });

        apply_tickets_order(&mut columns, &update).unwrap();
        assert_eq!(columns[0].ticket_ids, vec![TicketId::new("t-1")]);
    }

    #[test]
    fn test_rejects_duplicate_within_update() {
        let mut columns = board();
        let update = TicketsOrderUpdate::Single(ColumnReorder {
            column_id: ColumnId::new("l-todo"),
            ticket_ids: vec![TicketId::new("t-1"), TicketId::new("t-1")],
        });

        assert_eq!(
            apply_tickets_order(&mut columns, &update).unwrap_err(),
            OrderingError::DuplicateTicket(TicketId::new("t-1"))
        );
    }

    #[test]
    fn test_rejects_ticket_already_placed_elsewhere() {
        let mut columns = board();
        // t-3 lives in In Progress, which this update doesn't touch.
        let update = TicketsOrderUpdate::Single(ColumnReorder {
            column_id: ColumnId::new("l-todo"),
            ticket_ids: vec![
                TicketId::new("t-1"),
                TicketId::new("t-2"),
                TicketId::new("t-3"),
            ],
        });

        assert_eq!(
            apply_tickets_order(&mut columns, &update).unwrap_err(),
            OrderingError::AlreadyPlaced {
                ticket: TicketId::new("t-3"),
                column: ColumnId::new("l-prog"),
            }
        );
    }

    #[test]
    fn test_split_move() {
        let mut columns = board();
        // Move t-1 from To Do to the top of In Progress.
        let update = TicketsOrderUpdate::Split {
            from: ColumnReorder {
                column_id: ColumnId::new("l-todo"),
                ticket_ids: vec![TicketId::new("t-2")],
            },
            to: ColumnReorder {
                column_id: ColumnId::new("l-prog"),
                ticket_ids: vec![TicketId::new("t-1"), TicketId::new("t-3")],
            },
        };

        apply_tickets_order(&mut columns, &update).unwrap();
        assert_eq!(columns[0].ticket_ids, vec![TicketId::new("t-2")]);
        assert_eq!(
            columns[1].ticket_ids,
            vec![TicketId::new("t-1"), TicketId::new("t-3")]
        );
    }

    #[test]
    fn test_split_rejects_same_column() {
        let mut columns = board();
        let reorder = ColumnReorder {
            column_id: ColumnId::new("l-todo"),
            ticket_ids: vec![TicketId::new("t-1"), TicketId::new("t-2")],
        };
        let update = TicketsOrderUpdate::Split {
            from: reorder.clone(),
            to: reorder,
        };

        assert_eq!(
            apply_tickets_order(&mut columns, &update).unwrap_err(),
            OrderingError::SameColumn
        );
    }

    #[test]
    fn test_split_rejects_duplicate_across_sides() {
        let mut columns = board();
        let update = TicketsOrderUpdate::Split {
            from: ColumnReorder {
                column_id: ColumnId::new("l-todo"),
                ticket_ids: vec![TicketId::new("t-1"), TicketId::new("t-2")],
            },
            to: ColumnReorder {
                column_id: ColumnId::new("l-prog"),
                ticket_ids: vec![TicketId::new("t-1"), TicketId::new("t-3")],
            },
        };

        assert!(matches!(
            apply_tickets_order(&mut columns, &update).unwrap_err(),
            OrderingError::DuplicateTicket(_)
        ));
    }

    #[test]
    fn test_unknown_column() {
        let mut columns = board();
        let update = TicketsOrderUpdate::Single(ColumnReorder {
            column_id: ColumnId::new("l-nope"),
            ticket_ids: vec![],
        });

        assert_eq!(
            apply_tickets_order(&mut columns, &update).unwrap_err(),
            OrderingError::UnknownColumn(ColumnId::new("l-nope"))
        );
    }

    #[test]
    fn test_column_order_permutation() {
        let mut columns = board();
        let order = vec![
            ColumnId::new("l-done"),
            ColumnId::new("l-todo"),
            ColumnId::new("l-prog"),
        ];

        apply_column_order(&mut columns, &order).unwrap();
        let titles: Vec<&str> = columns.iter().map(|c| c.title.as_str()).collect();
        assert_eq!(titles, vec!["Done", "To Do", "In Progress"]);
    }

    #[test]
    fn test_column_order_rejects_non_permutation() {
        let mut columns = board();

        // Missing a column.
        let short = vec![ColumnId::new("l-todo"), ColumnId::new("l-prog")];
        assert_eq!(
            apply_column_order(&mut columns, &short).unwrap_err(),
            OrderingError::NotAPermutation
        );

        // Duplicated column.
        let duplicated = vec![
            ColumnId::new("l-todo"),
            ColumnId::new("l-todo"),
            ColumnId::new("l-prog"),
        ];
        assert!(apply_column_order(&mut columns, &duplicated).is_err());
    }
}
