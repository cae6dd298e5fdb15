use axum::{async_trait, extract::FromRequestParts, http::request::Parts, RequestPartsExt};
use axum_extra::{
    headers::{authorization::Bearer, Authorization},
    TypedHeader,
};
use rand::{distributions::Alphanumeric, Rng};

use crate::error::{AppError, AppResult};

const PASSWORD_LENGTH: usize = 12;
const PASSWORD_HASH_COST: u32 = 10;

// ============================================================================
// Wishlist Passwords
// ============================================================================

/// Random alphanumeric password handed to a wishlist's creator for sharing
/// edit access.
pub fn generate_password() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(PASSWORD_LENGTH)
        .map(char::from)
        .collect()
}

pub fn hash_password(password: &str) -> AppResult<String> {
    bcrypt::hash(password, PASSWORD_HASH_COST).map_err(|e| {
        tracing::error!("Failed to hash password: {:?}", e);
        AppError::Internal
    })
}

pub fn verify_password(password: &str, hash: &str) -> AppResult<bool> {
    bcrypt::verify(password, hash).map_err(|e| {
        tracing::error!("Failed to verify password: {:?}", e);
        AppError::Internal
    })
}

// ============================================================================
// Session Key Extractor
// ============================================================================

/// The caller's session key, taken from `Authorization: Bearer <key>`.
///
/// Keys are opaque capabilities issued by the client: whoever presents a key
/// owns the wishlists created with it and the permissions registered to it.
/// Keys are compared case-insensitively.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionKey(pub String);

impl SessionKey {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for SessionKey
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let TypedHeader(Authorization(bearer)) = parts
            .extract::<TypedHeader<Authorization<Bearer>>>()
            .await
            .map_err(|_| {
                AppError::Auth("You don't have a session key associated with your browser".into())
            })?;

        let key = bearer.token().trim().to_lowercase();
        if key.is_empty() {
            return Err(AppError::Auth(
                "You don't have a session key associated with your browser".into(),
            ));
        }

        Ok(SessionKey(key))
    }
}
