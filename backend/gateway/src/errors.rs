//! Application-wide error types.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use charity_crowdfunding::Error as EngineError;
use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum GatewayError {
    #[error(transparent)]
    Engine(#[from] EngineError),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    Migrate(#[from] sqlx::migrate::MigrateError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Missing x-principal header")]
    MissingPrincipal,

    #[error("Not found: {0}")]
    NotFound(String),
}

pub type Result<T> = std::result::Result<T, GatewayError>;

#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: String,
    /// Engine error code; 0 for gateway-level failures.
    pub code: u32,
}

impl GatewayError {
    pub fn status(&self) -> StatusCode {
        match self {
            GatewayError::Engine(err) => engine_status(err),
            GatewayError::BadRequest(_) => StatusCode::BAD_REQUEST,
            GatewayError::MissingPrincipal => StatusCode::UNAUTHORIZED,
            GatewayError::NotFound(_) => StatusCode::NOT_FOUND,
            GatewayError::Database(_)
            | GatewayError::Migrate(_)
            | GatewayError::Json(_)
            | GatewayError::Config(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn code(&self) -> u32 {
        match self {
            GatewayError::Engine(err) => err.code(),
            _ => 0,
        }
    }
}

fn engine_status(err: &EngineError) -> StatusCode {
    match err {
        EngineError::NotFound(_) => StatusCode::NOT_FOUND,
        EngineError::NotCreator | EngineError::Unauthorized => StatusCode::FORBIDDEN,
        EngineError::EmptyTitle
        | EngineError::InvalidGoal
        | EngineError::PastDeadline
        | EngineError::InvalidAmount
        | EngineError::AmountOverflow => StatusCode::UNPROCESSABLE_ENTITY,
        EngineError::AlreadyFinalized
        | EngineError::DeadlinePassed
        | EngineError::DeadlineNotPassed
        | EngineError::NotFinalized
        | EngineError::AlreadyWithdrawn
        | EngineError::NothingToRelease(_)
        | EngineError::AlreadyBound => StatusCode::CONFLICT,
        EngineError::InsufficientFunds { .. } => StatusCode::PAYMENT_REQUIRED,
    }
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!("request failed: {self}");
        }
        (
            status,
            Json(ErrorResponse {
                error: self.to_string(),
                code: self.code(),
            }),
        )
            .into_response()
    }
}
