//! In-memory storage backend backed by HashMaps.
//!
//! All data is held in RAM; optional JSONL persistence is available via
//! [`load_from_jsonl`] and [`save_to_jsonl`] (used by the `Jsonl` backend
//! wrapper in the parent module).
//!
//! # Atomicity
//!
//! The whole store sits behind one `Arc<Mutex<_>>`. Every operation takes
//! the lock once and performs all of its reads and writes inside it, so
//! multi-step mutations — in particular ticket creation, which bumps the
//! owning project's sequence counter, formats the ticket key, and inserts
//! the ticket — are atomic with respect to each other. This is what makes
//! ticket keys pairwise distinct under concurrent creates.
//!
//! # Thread Safety
//!
//! The storage is wrapped in `Arc<Mutex<TrackerStoreInner>>` (a tokio
//! mutex) for safe concurrent access from async tasks.

mod inner;
mod jsonl;
mod trait_impl;

use crate::storage::TrackerStorage;
use inner::TrackerStoreInner;
use std::sync::Arc;
use tokio::sync::Mutex;

pub use jsonl::{load_from_jsonl, save_to_jsonl, LoadWarning};

/// Thread-safe in-memory storage.
pub(crate) type InMemoryStorage = Arc<Mutex<TrackerStoreInner>>;

/// Create a new empty in-memory storage instance.
#[must_use]
pub fn new_in_memory_storage() -> Box<dyn TrackerStorage> {
    Box::new(Arc::new(Mutex::new(TrackerStoreInner::new())))
}
