//! Girder - core library for a Jira-like project/ticket tracker.
//!
//! This crate provides the domain model, error taxonomy, id and ticket-key
//! generation, and the storage abstraction used by the girder REST server
//! and the board synchronization client.

#![forbid(unsafe_code)]

pub mod domain;
pub mod error;
pub mod ids;
pub mod keys;
pub mod storage;
