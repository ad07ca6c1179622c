//! ID generation utilities.

use std::sync::atomic::{AtomicU32, Ordering};

use once_cell::sync::Lazy;
use rand::Rng;
use regex::Regex;
use uuid::Uuid;

/// Length of a document id in hex characters.
pub const ID_LEN: usize = 24;

static COUNTER: Lazy<AtomicU32> = Lazy::new(|| AtomicU32::new(rand::thread_rng().r#gen()));

static ID_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[0-9a-fA-F]{24}$").unwrap_or_else(|_| unreachable!("static pattern"))
});

/// ID generator for entities.
#[derive(Debug, Clone, Default)]
pub struct IdGenerator {
    _private: (),
}

impl IdGenerator {
    /// Create a new ID generator.
    #[must_use]
    pub const fn new() -> Self {
        Self { _private: () }
    }

    /// Generate a new document id.
    ///
    /// Layout (12 bytes, hex encoded):
    /// - 4 bytes: seconds since the Unix epoch, big-endian
    /// - 5 bytes: random
    /// - 3 bytes: process-wide counter
    ///
    /// Ids created in different seconds sort by creation time.
    #[must_use]
    pub fn generate(&self) -> String {
        let secs = u32::try_from(chrono::Utc::now().timestamp()).unwrap_or(u32::MAX);
        let random: [u8; 5] = rand::thread_rng().r#gen();
        let count = COUNTER.fetch_add(1, Ordering::Relaxed).to_be_bytes();

        let mut bytes = [0u8; 12];
        bytes[..4].copy_from_slice(&secs.to_be_bytes());
        bytes[4..9].copy_from_slice(&random);
        bytes[9..].copy_from_slice(&count[1..]);

        hex::encode(bytes)
    }

    /// Generate a cryptographically secure random token.
    #[must_use]
    pub fn generate_token(&self) -> String {
        // Use UUID v4 for tokens (no time component for security)
        Uuid::new_v4().simple().to_string()
    }
}

/// Whether `id` has the shape of a document id.
#[must_use]
pub fn is_valid_id(id: &str) -> bool {
    ID_PATTERN.is_match(id)
}
