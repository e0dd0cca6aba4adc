use actix_web::{HttpResponse, ResponseError};
use serde::Serialize;
use thiserror::Error;

/// Every precondition the match lifecycle can reject, as a distinct kind.
/// The front-end relies on these to render a specific user-facing message,
/// so nothing here collapses into a generic failure.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0} not found")]
    NotFound(&'static str),

    #[error("match is not in a state that allows this operation")]
    InvalidState,

    #[error("caller is not a participant in this match")]
    NotParticipant,

    #[error("both players must confirm before a result can be reported")]
    NotConfirmed,

    #[error("invalid score: {0}")]
    InvalidScore(String),

    #[error("an active match between these players already exists in this league")]
    DuplicateMatch,

    #[error("cannot challenge yourself")]
    SelfChallenge,

    #[error("scheduled date must be in the future")]
    InvalidSchedule,

    #[error("already a member of this league")]
    DuplicateMember,

    #[error("validation error: {0}")]
    Validation(String),

    #[error("database error: {0}")]
    Storage(#[from] sqlx::Error),
}

impl From<validator::ValidationErrors> for ApiError {
    fn from(errors: validator::ValidationErrors) -> Self {
        ApiError::Validation(errors.to_string())
    }
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
    code: u16,
    details: Option<String>,
}

impl ResponseError for ApiError {
    fn error_response(&self) -> HttpResponse {
        use actix_web::http::StatusCode;

        let (status, message) = match self {
            ApiError::NotFound(_) => (StatusCode::NOT_FOUND, self.to_string()),
            ApiError::InvalidState => (StatusCode::CONFLICT, self.to_string()),
            ApiError::NotParticipant => (StatusCode::FORBIDDEN, self.to_string()),
            ApiError::NotConfirmed => (StatusCode::CONFLICT, self.to_string()),
            ApiError::InvalidScore(_) => (StatusCode::BAD_REQUEST, self.to_string()),
            ApiError::DuplicateMatch => (StatusCode::CONFLICT, self.to_string()),
            ApiError::SelfChallenge => (StatusCode::BAD_REQUEST, self.to_string()),
            ApiError::InvalidSchedule => (StatusCode::BAD_REQUEST, self.to_string()),
            ApiError::DuplicateMember => (StatusCode::CONFLICT, self.to_string()),
            ApiError::Validation(_) => (StatusCode::BAD_REQUEST, self.to_string()),
            // Storage failures must not leak driver detail to callers.
            ApiError::Storage(_) => (StatusCode::INTERNAL_SERVER_ERROR, "Database error".to_string()),
        };

        let details = match self {
            ApiError::Storage(_) => None,
            _ => Some(self.to_string()),
        };

        let error_response = ErrorResponse {
            error: message,
            code: status.as_u16(),
            details,
        };

        HttpResponse::build(status).json(error_response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::http::StatusCode;

    #[test]
    fn precondition_errors_map_to_client_statuses() {
        assert_eq!(ApiError::NotFound("match").error_response().status(), StatusCode::NOT_FOUND);
        assert_eq!(ApiError::InvalidState.error_response().status(), StatusCode::CONFLICT);
        assert_eq!(ApiError::NotParticipant.error_response().status(), StatusCode::FORBIDDEN);
        assert_eq!(ApiError::NotConfirmed.error_response().status(), StatusCode::CONFLICT);
        assert_eq!(
            ApiError::InvalidScore("tied".into()).error_response().status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(ApiError::DuplicateMatch.error_response().status(), StatusCode::CONFLICT);
        assert_eq!(ApiError::SelfChallenge.error_response().status(), StatusCode::BAD_REQUEST);
        assert_eq!(ApiError::InvalidSchedule.error_response().status(), StatusCode::BAD_REQUEST);
        assert_eq!(ApiError::DuplicateMember.error_response().status(), StatusCode::CONFLICT);
    }

    #[test]
    fn storage_errors_are_internal_and_opaque() {
        let err = ApiError::Storage(sqlx::Error::RowNotFound);
        let response = err.error_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn not_found_names_the_missing_entity() {
        assert_eq!(ApiError::NotFound("match").to_string(), "match not found");
        assert_eq!(
            ApiError::NotFound("league member").to_string(),
            "league member not found"
        );
    }
}
