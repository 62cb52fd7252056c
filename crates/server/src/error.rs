use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("{0}")]
    BadRequest(String),

    #[error("Already voted on this poll")]
    AlreadyVoted,

    #[error("Poll has expired")]
    Expired,

    #[error("Database error")]
    Database(#[from] sqlx::Error),
}

impl AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::AlreadyVoted => StatusCode::CONFLICT,
            AppError::Expired => StatusCode::GONE,
            AppError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        if let AppError::Database(err) = &self {
            tracing::error!("Database error: {:?}", err);
        }

        let status = self.status_code();
        let body = serde_json::json!({ "error": self.to_string() });
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maps_to_status_codes() {
        let cases = [
            (AppError::NotFound("poll x".into()), StatusCode::NOT_FOUND),
            (AppError::BadRequest("voter_id missing".into()), StatusCode::BAD_REQUEST),
            (AppError::AlreadyVoted, StatusCode::CONFLICT),
            (AppError::Expired, StatusCode::GONE),
            (AppError::Database(sqlx::Error::RowNotFound), StatusCode::INTERNAL_SERVER_ERROR),
        ];

        for (err, status) in cases {
            assert_eq!(err.into_response().status(), status);
        }
    }

    #[test]
    fn database_details_are_not_leaked() {
        let err = AppError::Database(sqlx::Error::Protocol("secret dsn".into()));
        assert_eq!(err.to_string(), "Database error");
    }
}
