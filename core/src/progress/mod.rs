//! Learner progress: merged snapshots and the store they are loaded from.

pub mod snapshot;
pub mod store;

pub use self::snapshot::{merge_sources, ProgressSnapshot, ProgressSources};
pub use self::store::{InMemoryProgressStore, ProgressStore};
