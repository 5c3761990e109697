//! API Module
//!
//! HTTP handlers and routing for the calculator REST API.
//!
//! # Endpoints
//! - `GET /add`, `/subtract`, `/multiply`, `/divide` with `x` and `y` query parameters
//! - `GET /stats` - Get cache statistics
//! - `GET /health` - Health check endpoint

pub mod handlers;
pub mod routes;

pub use handlers::*;
pub use routes::create_router;
