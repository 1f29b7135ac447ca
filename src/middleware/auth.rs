use axum::{
    extract::{FromRef, FromRequestParts},
    http::request::Parts,
};

use crate::error::AppError;
use crate::repositories::SessionRepository;
use crate::session::get_session_token;

/// The authenticated caller, resolved from the session token.
#[derive(Clone, Debug)]
pub struct AuthUser {
    pub id: String,
}

impl<S> FromRequestParts<S> for AuthUser
where
    SessionRepository: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let token = get_session_token(&parts.headers).ok_or(AppError::Unauthorized)?;
        let session_repo = SessionRepository::from_ref(state);

        match session_repo.find_valid(&token).await? {
            Some(id) => Ok(AuthUser { id }),
            None => {
                tracing::debug!("Rejected unknown or expired session token");
                Err(AppError::Unauthorized)
            }
        }
    }
}
