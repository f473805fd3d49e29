use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

/// Application-level errors
///
/// "Not found" is deliberately absent: an unresolved name is an `Option::None`
/// canonical id, not a failure.
#[derive(thiserror::Error, Debug)]
pub enum AppError {
    #[error("HTTP client error: {0}")]
    HttpClient(#[from] reqwest::Error),

    #[error("Unknown category: {0}")]
    UnknownCategory(String),

    #[error("Upstream unavailable: {0}")]
    UpstreamUnavailable(String),

    #[error("Malformed generated payload: {0}")]
    MalformedGeneratedPayload(String),

    #[error("No resolvable categories in request")]
    NoResolvableCategories,

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Internal server error: {0}")]
    Internal(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match &self {
            AppError::InvalidInput(_) | AppError::UnknownCategory(_) => StatusCode::BAD_REQUEST,
            AppError::NoResolvableCategories => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::HttpClient(_) | AppError::UpstreamUnavailable(_) => StatusCode::BAD_GATEWAY,
            AppError::MalformedGeneratedPayload(_) | AppError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };

        let body = Json(json!({
            "status": "error",
            "message": self.to_string(),
        }));

        (status, body).into_response()
    }
}

pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        let cases = [
            (AppError::InvalidInput("x".into()), StatusCode::BAD_REQUEST),
            (AppError::UnknownCategory("x".into()), StatusCode::BAD_REQUEST),
            (AppError::NoResolvableCategories, StatusCode::UNPROCESSABLE_ENTITY),
            (AppError::UpstreamUnavailable("x".into()), StatusCode::BAD_GATEWAY),
            (
                AppError::MalformedGeneratedPayload("x".into()),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];

        for (error, expected) in cases {
            assert_eq!(error.into_response().status(), expected);
        }
    }
}
