//! Hash-based entity id generation.
//!
//! Entity ids are short, collision-resistant strings derived from SHA-256
//! and base36 encoding, with a one-letter kind prefix: `t-a3f8` for a
//! ticket, `c-9kx2` for a comment, and so on. The length adapts to the
//! number of stored entities (4-6 characters) and collisions are resolved
//! by retrying with a nonce.
//!
//! Ticket ids are distinct from human-readable ticket *keys* ("DEMO-7"),
//! which are handled by [`crate::keys`].

use chrono::Utc;
use sha2::{Digest, Sha256};
use std::collections::HashSet;
use thiserror::Error;
use tracing::{debug, warn};

const BASE36_CHARS: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";
const MAX_NONCE: u32 = 100;

/// Errors that can occur during id generation.
#[derive(Debug, Error)]
pub enum IdError {
    /// Unable to generate a unique id after exhausting all nonces and
    /// length increases.
    #[error("unable to generate unique id after {attempts} attempts")]
    CollisionExhausted {
        /// Number of nonces tried.
        attempts: u32,
    },

    /// Base36 encoding failed.
    #[error("base36 encoding failed: {0}")]
    EncodingFailed(String),
}

/// The kinds of entities girder stores.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityKind {
    /// A project record.
    Project,
    /// A ticket record.
    Ticket,
    /// A comment on a ticket.
    Comment,
    /// A user record.
    User,
    /// A board column within a project.
    Column,
}

impl EntityKind {
    /// One-letter prefix used in ids of this kind.
    #[must_use]
    pub fn prefix(self) -> char {
        match self {
            Self::Project => 'p',
            Self::Ticket => 't',
            Self::Comment => 'c',
            Self::User => 'u',
            Self::Column => 'l',
        }
    }
}

/// Hash-based id generator with collision detection.
///
/// The generator tracks every id it has handed out (or been told about via
/// [`EntityIdGenerator::register_id`]) so freshly generated ids never
/// collide with loaded data.
pub struct EntityIdGenerator {
    existing_ids: HashSet<String>,
    entity_count: usize,
}

impl EntityIdGenerator {
    /// Create a generator sized for `entity_count` existing entities.
    #[must_use]
    pub fn new(entity_count: usize) -> Self {
        Self {
            existing_ids: HashSet::new(),
            entity_count,
        }
    }

    /// Register an existing id to prevent collisions.
    pub fn register_id(&mut self, id: String) {
        self.existing_ids.insert(id);
    }

    /// The entity count used for adaptive length selection.
    #[must_use]
    pub fn entity_count(&self) -> usize {
        self.entity_count
    }

    /// Update the entity count used for adaptive length selection.
    pub fn set_entity_count(&mut self, count: usize) {
        self.entity_count = count;
    }

    /// Generate a new unique id for an entity of the given kind.
    ///
    /// `seed` is any stable-ish material for the hash (summary, name,
    /// comment text); the timestamp and nonce make repeated seeds diverge.
    ///
    /// # Errors
    ///
    /// Returns an error if no unique id can be produced after trying all
    /// nonces at the maximum length.
    pub fn generate(&mut self, kind: EntityKind, seed: &str) -> Result<String, IdError> {
        let id_length = self.adaptive_length();

        for nonce in 0..MAX_NONCE {
            let id = hash_id(kind, seed, nonce, id_length)?;
            if !self.existing_ids.contains(&id) {
                if nonce > 0 {
                    debug!(nonce, id_length, "generated unique id after collision retries");
                }
                self.existing_ids.insert(id.clone());
                return Ok(id);
            }
        }

        // All nonces collided at this length; escalate once.
        if id_length < 6 {
            warn!(
                id_length,
                max_nonce = MAX_NONCE,
                "all nonces exhausted, increasing id length"
            );
            let longer = hash_id(kind, seed, 0, id_length + 1)?;
            self.existing_ids.insert(longer.clone());
            return Ok(longer);
        }

        Err(IdError::CollisionExhausted {
            attempts: MAX_NONCE,
        })
    }

    /// Determine id length based on how many entities exist.
    ///
    /// - 0-500 entities: 4 chars
    /// - 501-1,500: 5 chars
    /// - 1,501+: 6 chars
    fn adaptive_length(&self) -> usize {
        match self.entity_count {
            0..=500 => 4,
            501..=1500 => 5,
            _ => 6,
        }
    }
}

/// Produce a single candidate id.
fn hash_id(kind: EntityKind, seed: &str, nonce: u32, length: usize) -> Result<String, IdError> {
    let timestamp = Utc::now().timestamp_micros();
    let content = format!("{}|{}|{}|{}", kind.prefix(), seed, timestamp, nonce);

    let mut hasher = Sha256::new();
    hasher.update(content.as_bytes());
    let hash_bytes = hasher.finalize();

    let hash_str = encode_base36(&hash_bytes[..8], length)?;
    Ok(format!("{}-{}", kind.prefix(), hash_str))
}

/// Encode the first bytes of a hash as a fixed-length base36 string.
fn encode_base36(bytes: &[u8], length: usize) -> Result<String, IdError> {
    // Only the first 8 bytes are used, so wrapping keeps this within u64.
    let mut num: u64 = 0;
    for &byte in bytes {
        num = num.wrapping_shl(8).wrapping_add(u64::from(byte));
    }

    let mut result = Vec::new();
    let mut n = num;
    while result.len() < length {
        let remainder = (n % 36) as usize;
        result.push(BASE36_CHARS[remainder]);
        n /= 36;
    }
    result.reverse();

    String::from_utf8(result)
        .map_err(|e| IdError::EncodingFailed(format!("UTF-8 conversion failed: {}", e)))
}

/// Validate id format: `{kind-prefix}-{base36 hash, 4-6 chars}`.
#[must_use]
pub fn validate_id(id: &str, kind: EntityKind) -> bool {
    let Some(hash) = id.strip_prefix(&format!("{}-", kind.prefix())) else {
        return false;
    };
    (4..=6).contains(&hash.len()) && hash.chars().all(|c| c.is_ascii_alphanumeric())
}
