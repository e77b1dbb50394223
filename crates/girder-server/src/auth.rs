//! Bearer-token request gate.
//!
//! Authentication itself is an external concern; the server consumes it
//! as a request-gating function over a static token table. A missing or
//! unknown token yields 401 before any handler runs. The resolved user id
//! is what comment endpoints treat as the requesting user.

use crate::error::ApiError;
use crate::state::SharedState;
use axum::extract::{Request, State};
use axum::http::header;
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use girder::domain::UserId;

/// The authenticated user, inserted as a request extension.
#[derive(Debug, Clone)]
pub struct AuthedUser(pub UserId);

/// Middleware gating every tracker route.
pub async fn require_auth(
    State(state): State<SharedState>,
    mut request: Request,
    next: Next,
) -> Response {
    let token = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "));

    match token.and_then(|t| state.auth.get(t)) {
        Some(user_id) => {
            request.extensions_mut().insert(AuthedUser(user_id.clone()));
            next.run(request).await
        }
        None => {
            ApiError::Unauthorized("missing or invalid credentials".to_string()).into_response()
        }
    }
}
