//! HTTP error mapping.
//!
//! Every core error maps onto its proper status code: not-found kinds to
//! 404, the comment-ownership failure to 401, validation failures to 400,
//! and everything else to 500. Bodies are always `{"error": msg}`.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use girder::error::Error;

/// An error response from the API.
#[derive(Debug)]
pub enum ApiError {
    /// 404 with a message.
    NotFound(String),

    /// 401 with a message.
    Unauthorized(String),

    /// 400 with a message.
    BadRequest(String),

    /// 500 with a message.
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            ApiError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, msg),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
        };
        (status, Json(serde_json::json!({ "error": message }))).into_response()
    }
}

impl From<Error> for ApiError {
    fn from(err: Error) -> Self {
        match err {
            Error::ProjectNotFound(_)
            | Error::TicketNotFound(_)
            | Error::CommentNotFound(_)
            | Error::UserNotFound(_)
            | Error::ColumnNotFound { .. } => ApiError::NotFound(err.to_string()),

            Error::NotCommentAuthor { .. } => ApiError::Unauthorized(err.to_string()),

            Error::Validation(_)
            | Error::Ordering(_)
            | Error::Key(_)
            | Error::DuplicateProjectKey(_)
            | Error::TicketNotInProject { .. }
            | Error::NotAnEpic(_) => ApiError::BadRequest(err.to_string()),

            Error::IdGeneration(_) | Error::Io(_) | Error::Json(_) | Error::Storage(_) => {
                ApiError::Internal(err.to_string())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use girder::domain::TicketId;

    #[test]
    fn test_status_mapping() {
        let not_found: ApiError = Error::TicketNotFound(TicketId::new("t-1")).into();
        assert!(matches!(not_found, ApiError::NotFound(_)));

        let unauthorized: ApiError = Error::NotCommentAuthor {
            comment: "c-1".into(),
            user: "u-1".into(),
        }
        .into();
        assert!(matches!(unauthorized, ApiError::Unauthorized(_)));

        let bad_request: ApiError = Error::Validation("nope".to_string()).into();
        assert!(matches!(bad_request, ApiError::BadRequest(_)));

        let internal: ApiError = Error::Storage("disk on fire".to_string()).into();
        assert!(matches!(internal, ApiError::Internal(_)));
    }
}
