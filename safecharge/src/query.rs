//! Query identifiers correlating a request with its log lines.
//!
//! Identifiers come from a [`QueryIdSource`] passed to the client, so tests
//! can use a deterministic source instead of the random default.

use std::fmt::{Display, Formatter};
use std::sync::atomic::{AtomicU32, Ordering};

/// Upper bound of the random identifier range.
pub const MAX_RANDOM_ID: u32 = 100_000;

/// Opaque token tying one request to its log lines and result.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct QueryId(String);

impl QueryId {
    /// Creates the identifier for sequence number `n`, rendered `[QUERY n]`.
    #[must_use]
    pub fn new(n: u32) -> Self {
        Self(format!("[QUERY {n}]"))
    }

    /// Returns the rendered identifier.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for QueryId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Produces a fresh [`QueryId`] for every request.
pub trait QueryIdSource: Send + Sync {
    /// Returns the identifier for the next request.
    fn next_id(&self) -> QueryId;
}

/// Random identifiers in `1..=MAX_RANDOM_ID`.
#[derive(Debug, Clone, Copy, Default)]
pub struct RandomQueryIds;

impl QueryIdSource for RandomQueryIds {
    fn next_id(&self) -> QueryId {
        QueryId::new(rand::random_range(1..=MAX_RANDOM_ID))
    }
}

/// Increasing identifiers starting at 1; never repeats within a source.
#[derive(Debug, Default)]
pub struct SequentialQueryIds {
    last: AtomicU32,
}

impl SequentialQueryIds {
    /// Creates a source whose first identifier is `[QUERY 1]`.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            last: AtomicU32::new(0),
        }
    }
}

impl QueryIdSource for SequentialQueryIds {
    fn next_id(&self) -> QueryId {
        QueryId::new(self.last.fetch_add(1, Ordering::Relaxed) + 1)
    }
}
