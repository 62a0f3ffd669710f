//! Client-side synchronization: merge engine, pending-change queue, engine,
//! and scheduler.

mod engine;
mod merge;
mod queue;
mod scheduler;
#[cfg(test)]
mod testing;

pub use engine::{DrainReport, LoadOutcome, SyncEngine};
pub use merge::{merge, ConflictPair, MergeOutcome};
pub use queue::{FailureOutcome, PendingQueue};
pub use scheduler::{SchedulerHandle, SyncScheduler};
