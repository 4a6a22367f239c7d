//! Cancellation signals, request outcomes, and keyed query deduplication.

/// Keyed query registry with per-instance cancellation.
pub mod client;
/// Monotonic instance numbering.
mod generation;
/// Request descriptors used for deduplication.
pub mod key;
/// Outcome state machine and its single-settlement slot.
pub mod outcome;
/// Query function and query error contracts.
pub mod query_fn;
/// One-shot cooperative cancellation signal.
pub mod signal;

pub use client::{QueryClient, QueryObserver};
pub use key::QueryKey;
pub use outcome::{OutcomeCell, QueryOutcome};
pub use query_fn::{QueryError, QueryFn};
pub use signal::CancelSignal;
