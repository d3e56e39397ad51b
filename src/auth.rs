//! Bearer-token authentication.
//!
//! Tokens are HS256 JWTs whose `sub` claim is the user id. Handlers take an
//! [`AuthenticatedUser`] argument; requests without a valid token are
//! rejected with 401 before the handler runs.

use std::future::{ready, Ready};

use actix_web::dev::Payload;
use actix_web::http::header;
use actix_web::{web, FromRequest, HttpRequest};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::error::MatchingError;

/// JWT claims understood by the service
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub exp: usize,
    pub iat: usize,
}

/// Issues and verifies bearer tokens
#[derive(Clone)]
pub struct JwtAuth {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
    token_ttl_secs: u64,
}

impl std::fmt::Debug for JwtAuth {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtAuth")
            .field("secret", &"[REDACTED]")
            .field("leeway", &self.validation.leeway)
            .field("token_ttl_secs", &self.token_ttl_secs)
            .finish()
    }
}

impl JwtAuth {
    pub fn new(secret: &str, leeway_secs: u64, token_ttl_secs: u64) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = leeway_secs;

        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            validation,
            token_ttl_secs,
        }
    }

    /// Mint a token for `user_id`
    pub fn issue(&self, user_id: i64) -> Result<String, MatchingError> {
        let now = chrono::Utc::now().timestamp().max(0) as usize;
        let claims = Claims {
            sub: user_id.to_string(),
            iat: now,
            exp: now + self.token_ttl_secs as usize,
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map_err(|e| MatchingError::Internal(format!("Failed to issue token: {}", e)))
    }

    /// Validate `token` and return the user id it was issued for
    pub fn verify(&self, token: &str) -> Result<i64, MatchingError> {
        let data = decode::<Claims>(token, &self.decoding, &self.validation).map_err(|e| {
            tracing::debug!("Rejected bearer token: {}", e);
            MatchingError::Unauthenticated("Could not validate credentials".to_string())
        })?;

        data.claims
            .sub
            .parse::<i64>()
            .map_err(|_| MatchingError::Unauthenticated("Malformed token subject".to_string()))
    }
}

/// Identity of the caller, resolved from the `Authorization` header
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuthenticatedUser {
    pub user_id: i64,
}

impl AuthenticatedUser {
    fn from_http(req: &HttpRequest) -> Result<Self, MatchingError> {
        let auth = req.app_data::<web::Data<JwtAuth>>().ok_or_else(|| {
            tracing::error!("JwtAuth missing from application data");
            MatchingError::Unauthenticated("Authentication is not configured".to_string())
        })?;

        let token = req
            .headers()
            .get(header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.strip_prefix("Bearer "))
            .map(str::trim)
            .filter(|token| !token.is_empty())
            .ok_or_else(|| MatchingError::Unauthenticated("Not authenticated".to_string()))?;

        Ok(Self {
            user_id: auth.verify(token)?,
        })
    }
}

impl FromRequest for AuthenticatedUser {
    type Error = MatchingError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(Self::from_http(req))
    }
}
