//! Calculator Module
//!
//! The four arithmetic operations, the result payload they produce and the
//! cache keys requests are filed under.

mod key;
mod operation;

pub use key::cache_key;
pub use operation::{Calculation, Operation};
