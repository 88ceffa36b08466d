//! Satchel Runtime — the capture repository and its write-behind
//! remote sync.
//!
//! The repository owns the in-memory collection and drives the whole
//! capture pipeline: classification with deterministic fallback, local
//! cache persistence, and debounced remote synchronization.

pub mod repository;
pub mod sync;

#[cfg(test)]
pub(crate) mod testing;

pub use repository::CaptureRepository;
pub use sync::{SyncScheduler, WriteOp};
