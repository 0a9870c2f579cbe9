//! Timestamp comparison with a shared tolerance.
//!
//! Simulation timestamps are `f64` seconds that have round-tripped through
//! on-disk storage, so exact equality is never used. Every timestamp
//! comparison in the workspace goes through [`times_equal`] with the single
//! shared [`TIME_TOLERANCE`] — seek termination, merge alignment, and
//! resampling all agree on what "the same instant" means, which is what
//! keeps the seek loops from spinning on representation noise.

/// Absolute tolerance for timestamp equality, in seconds.
pub const TIME_TOLERANCE: f64 = 1e-6;

/// Whether two timestamps denote the same simulation instant.
pub fn times_equal(a: f64, b: f64) -> bool {
    (a - b).abs() < TIME_TOLERANCE
}
