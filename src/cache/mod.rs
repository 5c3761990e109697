//! Cache Module
//!
//! Provides a read-through result cache with sliding TTL expiration driven by
//! per-entry timers.

mod entry;
mod expiring;
mod scheduler;
mod stats;

#[cfg(test)]
mod property_tests;

// Re-export public types
pub use entry::Entry;
pub use expiring::{ExpiringCache, Lookup};
pub use scheduler::{CancelTimer, ManualScheduler, Scheduler, Task, TimerHandle, TokioScheduler};
pub use stats::CacheStats;

// == Public Constants ==
/// Idle time after which an unrenewed entry is evicted.
pub const DEFAULT_TTL: std::time::Duration = std::time::Duration::from_secs(60);
