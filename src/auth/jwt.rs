use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts},
    http::request::Parts,
};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use time::{Duration, OffsetDateTime};
use tracing::debug;

use crate::auth::repo::User;
use crate::config::JwtConfig;
use crate::error::ApiError;
use crate::state::AppState;

/// Header carrying the bearer token. The original API reads a bare `token`
/// header rather than the `Authorization: Bearer` scheme, and clients
/// depend on that.
pub const TOKEN_HEADER: &str = "token";

/// Token payload. `email_ID` matches the wire spelling used everywhere
/// else in the API.
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub id: i64,
    #[serde(rename = "email_ID")]
    pub email: String,
    pub exp: usize,
}

/// Signing and verification material, derived from [`JwtConfig`].
#[derive(Clone)]
pub struct JwtKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
    header: Header,
    validation: Validation,
    ttl: Duration,
}

impl FromRef<AppState> for JwtKeys {
    fn from_ref(state: &AppState) -> Self {
        Self::from_config(&state.config.jwt)
    }
}

impl JwtKeys {
    pub fn from_config(cfg: &JwtConfig) -> Self {
        Self {
            encoding: EncodingKey::from_secret(cfg.secret.as_bytes()),
            decoding: DecodingKey::from_secret(cfg.secret.as_bytes()),
            header: Header::new(cfg.algorithm),
            validation: Validation::new(cfg.algorithm),
            ttl: Duration::days(cfg.ttl_days),
        }
    }

    /// Issues a token for `user`, expiring `ttl` from now.
    pub fn sign(&self, user: &User) -> anyhow::Result<String> {
        let exp = OffsetDateTime::now_utc() + self.ttl;
        let claims = Claims {
            id: user.id,
            email: user.email.clone(),
            exp: exp.unix_timestamp() as usize,
        };
        let token = encode(&self.header, &claims, &self.encoding)?;
        debug!(user_id = user.id, "jwt signed");
        Ok(token)
    }

    /// Returns the user id carried by a valid token, `None` on any decode
    /// failure, bad signature, expiry, or malformed payload.
    pub fn verify(&self, token: &str) -> Option<i64> {
        decode::<Claims>(token, &self.decoding, &self.validation)
            .ok()
            .map(|data| data.claims.id)
    }
}

/// Extracts the caller's user id from the `token` header.
pub struct AuthUser(pub i64);

#[async_trait]
impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
    JwtKeys: FromRef<S>,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let token = parts
            .headers
            .get(TOKEN_HEADER)
            .and_then(|v| v.to_str().ok())
            .ok_or(ApiError::InvalidToken)?;

        let keys = JwtKeys::from_ref(state);
        let user_id = keys.verify(token).ok_or(ApiError::InvalidToken)?;
        Ok(AuthUser(user_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jsonwebtoken::Algorithm;

    fn make_keys(secret: &str, ttl_days: i64) -> JwtKeys {
        JwtKeys::from_config(&JwtConfig {
            secret: secret.into(),
            algorithm: Algorithm::HS256,
            ttl_days,
        })
    }

    fn make_user() -> User {
        User {
            id: 42,
            email: "player@example.com".into(),
            password_hash: String::new(),
        }
    }

    #[test]
    fn sign_then_verify_recovers_user_id() {
        let keys = make_keys("dev-secret", 80);
        let token = keys.sign(&make_user()).expect("sign");
        assert_eq!(keys.verify(&token), Some(42));
    }

    #[test]
    fn tampered_token_is_invalid() {
        let keys = make_keys("dev-secret", 80);
        let mut token = keys.sign(&make_user()).expect("sign");
        token.push('x');
        assert_eq!(keys.verify(&token), None);
    }

    #[test]
    fn token_signed_with_other_secret_is_invalid() {
        let keys = make_keys("dev-secret", 80);
        let other = make_keys("other-secret", 80);
        let token = other.sign(&make_user()).expect("sign");
        assert_eq!(keys.verify(&token), None);
    }

    #[test]
    fn expired_token_is_invalid() {
        let keys = make_keys("dev-secret", -1);
        let token = keys.sign(&make_user()).expect("sign");
        assert_eq!(keys.verify(&token), None);
    }

    #[test]
    fn token_without_id_claim_is_invalid() {
        let keys = make_keys("dev-secret", 80);
        let exp = (OffsetDateTime::now_utc() + Duration::days(1)).unix_timestamp();
        let payload = serde_json::json!({ "email_ID": "player@example.com", "exp": exp });
        let token = encode(
            &Header::new(Algorithm::HS256),
            &payload,
            &EncodingKey::from_secret(b"dev-secret"),
        )
        .expect("encode");
        assert_eq!(keys.verify(&token), None);
    }

    #[test]
    fn garbage_token_is_invalid() {
        let keys = make_keys("dev-secret", 80);
        assert_eq!(keys.verify("not-a-jwt"), None);
    }
}
