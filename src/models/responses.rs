//! Response DTOs for the calculator API
//!
//! Defines the structure of outgoing HTTP response bodies.

use serde::{Serialize, Serializer};

use crate::cache::CacheStats;
use crate::calc::{Calculation, Operation};

// Largest magnitude below which every integral f64 is exact.
const MAX_EXACT_INTEGER: f64 = 9_007_199_254_740_992.0;

/// Writes integral values without a fractional part (`6`, not `6.0`).
fn serialize_number<S: Serializer>(value: &f64, serializer: S) -> Result<S::Ok, S::Error> {
    if value.fract() == 0.0 && value.abs() < MAX_EXACT_INTEGER {
        serializer.serialize_i64(*value as i64)
    } else {
        serializer.serialize_f64(*value)
    }
}

/// Response body for every operation endpoint
#[derive(Debug, Clone, Serialize)]
pub struct CalcResponse {
    /// Operation that was performed
    pub action: Operation,
    #[serde(serialize_with = "serialize_number")]
    pub x: f64,
    #[serde(serialize_with = "serialize_number")]
    pub y: f64,
    #[serde(serialize_with = "serialize_number")]
    pub answer: f64,
    /// True when the answer came from an existing cache entry
    pub cached: bool,
}

impl CalcResponse {
    pub fn new(calc: Calculation, cached: bool) -> Self {
        Self {
            action: calc.action,
            x: calc.x,
            y: calc.y,
            answer: calc.answer,
            cached,
        }
    }
}

/// Response body for the stats endpoint (GET /stats)
#[derive(Debug, Clone, Serialize)]
pub struct StatsResponse {
    /// Number of cache hits
    pub hits: u64,
    /// Number of cache misses
    pub misses: u64,
    /// Number of timer evictions
    pub evictions: u64,
    /// Number of TTL renewals
    pub renewals: u64,
    /// Number of failed computations
    pub failures: u64,
    /// Current number of entries in cache
    pub total_entries: usize,
    /// Hit rate (hits / (hits + misses))
    pub hit_rate: f64,
}

impl From<CacheStats> for StatsResponse {
    fn from(stats: CacheStats) -> Self {
        Self {
            hit_rate: stats.hit_rate(),
            hits: stats.hits,
            misses: stats.misses,
            evictions: stats.evictions,
            renewals: stats.renewals,
            failures: stats.failures,
            total_entries: stats.total_entries,
        }
    }
}

/// Response body for the health endpoint (GET /health)
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    /// Health status (e.g., "healthy")
    pub status: String,
    /// Current timestamp in ISO 8601 format
    pub timestamp: String,
}

impl HealthResponse {
    /// Creates a new HealthResponse with current timestamp
    pub fn healthy() -> Self {
        Self {
            status: "healthy".to_string(),
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }
}

/// Error response body for all error conditions
#[derive(Debug, Clone, Serialize)]
pub struct ErrorResponse {
    /// Error message describing what went wrong
    pub error: String,
    /// Error kind: "request" or "math"
    pub kind: String,
}

impl ErrorResponse {
    /// Creates a new ErrorResponse
    pub fn new(kind: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            kind: kind.into(),
        }
    }
}
