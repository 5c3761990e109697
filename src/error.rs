//! Error types for the calculator server
//!
//! Provides unified error handling using thiserror.

use axum::{
    extract::rejection::QueryRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;

use crate::models::ErrorResponse;

// == Calc Error Enum ==
/// Every way a calculator request can fail.
///
/// Neither kind is ever cached: a retried request recomputes.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CalcError {
    /// Missing or non-numeric operand
    #[error("Malformed calculator request: {0}")]
    Request(String),

    /// Operation has no finite answer, e.g. division by zero
    #[error("Nonnumber math answer: {0}")]
    Math(String),
}

impl CalcError {
    /// Short machine-readable name of the error kind.
    pub fn kind(&self) -> &'static str {
        match self {
            CalcError::Request(_) => "request",
            CalcError::Math(_) => "math",
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            CalcError::Request(_) => StatusCode::BAD_REQUEST,
            CalcError::Math(_) => StatusCode::UNPROCESSABLE_ENTITY,
        }
    }
}

impl From<QueryRejection> for CalcError {
    fn from(rejection: QueryRejection) -> Self {
        CalcError::Request(rejection.body_text())
    }
}

// == IntoResponse Implementation ==
impl IntoResponse for CalcError {
    fn into_response(self) -> Response {
        let body = Json(ErrorResponse::new(self.kind(), self.to_string()));
        (self.status(), body).into_response()
    }
}

// == Result Type Alias ==
/// Convenience Result type for the calculator server.
pub type Result<T> = std::result::Result<T, CalcError>;
