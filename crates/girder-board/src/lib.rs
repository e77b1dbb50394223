//! Girder board client: the action layer between a UI and the REST API.
//!
//! Drag-and-drop ordering mutations are applied to a local board mirror
//! immediately (decoupling input latency from network latency), then
//! confirmed or rolled back when the server responds. A monotonic fencing
//! token per board scope keeps late-arriving responses from clobbering
//! newer optimistic state.
//!
//! The [`render`] module holds the presentational pieces: board table,
//! comment thread, and activity chart.

#![forbid(unsafe_code)]

pub mod api;
pub mod board;
pub mod client;
pub mod render;
pub mod sync;

pub use api::{ApiClientError, HttpOrderingApi, OrderingApi};
pub use board::{BoardState, UndoState};
pub use client::{BoardClient, MutationOutcome};
pub use render::{render_activity_chart, render_board, render_comments, RenderConfig};
pub use sync::{ConfirmOutcome, FailOutcome, OrderSync, RequestState, SyncScope, SyncToken};
