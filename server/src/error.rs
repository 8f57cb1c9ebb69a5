use crate::fixtures::FixtureError;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use shared::{ErrorResponse, NO_FIXTURES_MESSAGE};
use thiserror::Error;

const FIXTURE_LOAD_MESSAGE: &str = "Failed to load response file";

/// Errors returned by the API handlers
#[derive(Debug, Error)]
pub enum AppError {
    #[error("No response files found")]
    NoFixturesAvailable,

    #[error(transparent)]
    Fixture(FixtureError),
}

impl From<FixtureError> for AppError {
    fn from(err: FixtureError) -> Self {
        match err {
            FixtureError::NoFixtures { .. } => AppError::NoFixturesAvailable,
            other => AppError::Fixture(other),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let message = match self {
            AppError::NoFixturesAvailable => {
                tracing::warn!("No response files available");
                NO_FIXTURES_MESSAGE
            }
            AppError::Fixture(err) => {
                tracing::error!("{:#}", anyhow::Error::from(err));
                FIXTURE_LOAD_MESSAGE
            }
        };

        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ErrorResponse::new(message)),
        )
            .into_response()
    }
}

/// Result alias for handlers
pub type AppResult<T> = Result<T, AppError>;
