//! Shared primitive ids.

/// Store-assigned quiz identifier.
///
/// Signed so that any integer the user types survives validation and simply misses on lookup.
pub type QuizId = i64;
/// Monotonic operation sequence number.
pub type OpSeq = u64;
