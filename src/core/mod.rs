//! In-memory authoritative quiz store.

/// Authoritative quiz store and op journal.
pub mod store;
