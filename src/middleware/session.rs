use axum::extract::FromRequestParts;

use crate::{error::AppError, services::cart_service::validate_session_key};

pub const SESSION_KEY_HEADER: &str = "x-session-key";

/// Session key supplied by the session layer in front of this service.
#[derive(Debug, Clone)]
pub struct SessionKey(pub String);

impl SessionKey {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl<S> FromRequestParts<S> for SessionKey
where
    S: Send + Sync,
{
    type Rejection = AppError;
    async fn from_request_parts(
        parts: &mut axum::http::request::Parts,
        _state: &S,
    ) -> Result<Self, Self::Rejection> {
        let header = parts
            .headers
            .get(SESSION_KEY_HEADER)
            .ok_or_else(|| AppError::BadRequest("Missing x-session-key header".into()))?;

        let value = header
            .to_str()
            .map_err(|_| AppError::BadRequest("Invalid x-session-key header".into()))?
            .trim();

        validate_session_key(value)?;

        Ok(SessionKey(value.to_string()))
    }
}
