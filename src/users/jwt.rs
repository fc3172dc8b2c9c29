use std::time::Duration;

use axum::{
    extract::{FromRef, FromRequestParts},
    http::request::Parts,
};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use time::{Duration as TimeDuration, OffsetDateTime};
use tracing::{debug, warn};

use crate::{config::JwtConfig, error::ApiError, state::AppState};

/// Identity claims carried by a session token. No password material.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub email: String,
    pub name: String,
    pub iat: usize,
    pub exp: usize,
    pub iss: String,
    pub aud: String,
}

#[derive(Clone)]
pub struct JwtKeys {
    pub encoding: EncodingKey,
    pub decoding: DecodingKey,
    pub issuer: String,
    pub audience: String,
    pub ttl: Duration,
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
            issuer: cfg.issuer.clone(),
            audience: cfg.audience.clone(),
            ttl: Duration::from_secs((cfg.ttl_minutes as u64) * 60),
        }
    }

    pub fn sign(&self, email: &str, name: &str) -> Result<String, ApiError> {
        let now = OffsetDateTime::now_utc();
        let exp = now + TimeDuration::seconds(self.ttl.as_secs() as i64);
        let claims = Claims {
            email: email.to_string(),
            name: name.to_string(),
            iat: now.unix_timestamp() as usize,
            exp: exp.unix_timestamp() as usize,
            iss: self.issuer.clone(),
            aud: self.audience.clone(),
        };
        let token =
            encode(&Header::default(), &claims, &self.encoding).map_err(ApiError::TokenSigning)?;
        debug!(email = %email, "jwt signed");
        Ok(token)
    }

    /// Any failure (bad signature, malformed, expired) collapses to
    /// `InvalidToken`: the caller is simply not authenticated.
    pub fn verify(&self, token: &str) -> Result<Claims, ApiError> {
        let mut validation = Validation::default();
        validation.set_audience(std::slice::from_ref(&self.audience));
        validation.set_issuer(std::slice::from_ref(&self.issuer));
        let data = decode::<Claims>(token, &self.decoding, &validation).map_err(|e| {
            debug!(error = %e, "jwt verification failed");
            ApiError::InvalidToken
        })?;
        debug!(email = %data.claims.email, "jwt verified");
        Ok(data.claims)
    }
}

/// Extracts and validates the `token` header, yielding the caller's claims.
/// This is the only trust decision authenticated routes make.
#[derive(Debug)]
pub struct AuthUser(pub Claims);

#[axum::async_trait]
impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
    JwtKeys: FromRef<S>,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let keys = JwtKeys::from_ref(state);
        let token = parts
            .headers
            .get("token")
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| {
                warn!("missing token header");
                ApiError::InvalidToken
            })?;
        let claims = keys.verify(token)?;
        Ok(AuthUser(claims))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::JwtConfig;

    fn make_keys(secret: &str) -> JwtKeys {
        JwtKeys::from_config(&JwtConfig {
            secret: secret.into(),
            issuer: "test-issuer".into(),
            audience: "test-aud".into(),
            ttl_minutes: 5,
        })
    }

    #[test]
    fn sign_and_verify_roundtrip_preserves_claims() {
        let keys = make_keys("dev-secret");
        let token = keys.sign("user@email.com", "user").expect("sign");
        let claims = keys.verify(&token).expect("verify");
        assert_eq!(claims.email, "user@email.com");
        assert_eq!(claims.name, "user");
        assert_eq!(claims.iss, "test-issuer");
        assert_eq!(claims.aud, "test-aud");
    }

    #[test]
    fn verify_rejects_tampered_signature() {
        let keys = make_keys("dev-secret");
        let token = keys.sign("user@email.com", "user").expect("sign");
        // Flip the first signature character.
        let (payload, signature) = token.rsplit_once('.').expect("three segments");
        let flipped = if signature.starts_with('A') { "B" } else { "A" };
        let tampered = format!("{payload}.{flipped}{}", &signature[1..]);
        let err = keys.verify(&tampered).unwrap_err();
        assert!(matches!(err, ApiError::InvalidToken));
    }

    #[test]
    fn verify_rejects_token_signed_with_other_secret() {
        let good = make_keys("secret-one");
        let bad = make_keys("secret-two");
        let token = good.sign("user@email.com", "user").expect("sign");
        assert!(matches!(bad.verify(&token), Err(ApiError::InvalidToken)));
    }

    #[test]
    fn verify_rejects_expired_token() {
        let keys = make_keys("dev-secret");
        let past = OffsetDateTime::now_utc() - TimeDuration::hours(2);
        let claims = Claims {
            email: "user@email.com".into(),
            name: "user".into(),
            iat: (past - TimeDuration::minutes(5)).unix_timestamp() as usize,
            exp: past.unix_timestamp() as usize,
            iss: keys.issuer.clone(),
            aud: keys.audience.clone(),
        };
        let token = encode(&Header::default(), &claims, &keys.encoding).expect("encode");
        assert!(matches!(keys.verify(&token), Err(ApiError::InvalidToken)));
    }

    #[test]
    fn verify_rejects_garbage() {
        let keys = make_keys("dev-secret");
        assert!(matches!(
            keys.verify("notV41idt0ke9"),
            Err(ApiError::InvalidToken)
        ));
    }

    #[tokio::test]
    async fn extractor_rejects_missing_token_header() {
        let keys = make_keys("dev-secret");
        let request = axum::http::Request::builder().body(()).unwrap();
        let (mut parts, _) = request.into_parts();
        let err = AuthUser::from_request_parts(&mut parts, &keys)
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::InvalidToken));
    }

    #[tokio::test]
    async fn extractor_accepts_valid_token_header() {
        let keys = make_keys("dev-secret");
        let token = keys.sign("user@email.com", "user").expect("sign");
        let request = axum::http::Request::builder()
            .header("token", token)
            .body(())
            .unwrap();
        let (mut parts, _) = request.into_parts();
        let AuthUser(claims) = AuthUser::from_request_parts(&mut parts, &keys)
            .await
            .expect("extract");
        assert_eq!(claims.email, "user@email.com");
    }
}
