//! Calc Cache - An HTTP calculator with a self-expiring result cache
//!
//! Results are cached per canonical request and evicted after an idle TTL;
//! every cache hit restarts that TTL.

pub mod api;
pub mod cache;
pub mod calc;
pub mod config;
pub mod error;
pub mod models;

pub use api::{create_router, AppState};
pub use cache::{ExpiringCache, ManualScheduler, TokioScheduler};
pub use config::Config;
pub use error::CalcError;
