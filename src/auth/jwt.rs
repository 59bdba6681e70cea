use std::time::Duration;

use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts},
    http::{request::Parts, StatusCode},
};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use thiserror::Error;
use time::OffsetDateTime;
use tracing::{debug, warn};

use super::dto::{Claims, JwtKeys, TokenKind, TokenPair};
use crate::{config::JwtConfig, state::AppState};

#[derive(Debug, Error)]
pub enum TokenError {
    #[error("Invalid or expired token")]
    Invalid(#[from] jsonwebtoken::errors::Error),
    #[error("{expected} token required")]
    WrongKind { expected: TokenKind },
    #[error("token signing failed: {0}")]
    Sign(jsonwebtoken::errors::Error),
}

impl From<TokenError> for (StatusCode, String) {
    fn from(err: TokenError) -> Self {
        let status = match err {
            TokenError::Sign(_) => StatusCode::INTERNAL_SERVER_ERROR,
            TokenError::Invalid(_) | TokenError::WrongKind { .. } => StatusCode::UNAUTHORIZED,
        };
        (status, err.to_string())
    }
}

fn minutes(m: i64) -> Duration {
    Duration::from_secs(u64::try_from(m).unwrap_or(0) * 60)
}

impl FromRef<AppState> for JwtKeys {
    fn from_ref(state: &AppState) -> Self {
        let JwtConfig {
            secret,
            issuer,
            audience,
            ttl_minutes,
            refresh_ttl_minutes,
        } = state.config.jwt.clone();
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            issuer,
            audience,
            access_ttl: minutes(ttl_minutes),
            refresh_ttl: minutes(refresh_ttl_minutes),
        }
    }
}

impl JwtKeys {
    fn lifetime(&self, kind: TokenKind) -> Duration {
        match kind {
            TokenKind::Access => self.access_ttl,
            TokenKind::Refresh => self.refresh_ttl,
        }
    }

    fn issue(&self, donor_id: u64, kind: TokenKind, now: OffsetDateTime) -> Result<String, TokenError> {
        let iat = now.unix_timestamp().max(0) as usize;
        let claims = Claims {
            sub: donor_id,
            iat,
            exp: iat + self.lifetime(kind).as_secs() as usize,
            iss: self.issuer.clone(),
            aud: self.audience.clone(),
            kind,
        };
        encode(&Header::default(), &claims, &self.encoding).map_err(TokenError::Sign)
    }

    /// Issues the access and refresh tokens a donor receives on register,
    /// login and refresh. Both share one issue instant.
    pub fn issue_pair(&self, donor_id: u64) -> Result<TokenPair, TokenError> {
        let now = OffsetDateTime::now_utc();
        let pair = TokenPair {
            access_token: self.issue(donor_id, TokenKind::Access, now)?,
            refresh_token: self.issue(donor_id, TokenKind::Refresh, now)?,
        };
        debug!(donor_id, "token pair issued");
        Ok(pair)
    }

    /// Decodes `token` and checks it was issued here as a `expected` token.
    pub fn decode_as(&self, token: &str, expected: TokenKind) -> Result<Claims, TokenError> {
        let mut validation = Validation::default();
        validation.set_audience(std::slice::from_ref(&self.audience));
        validation.set_issuer(std::slice::from_ref(&self.issuer));
        let claims = decode::<Claims>(token, &self.decoding, &validation)?.claims;
        if claims.kind != expected {
            return Err(TokenError::WrongKind { expected });
        }
        Ok(claims)
    }
}

/// Id of the donor behind a valid access token.
pub struct AuthUser(pub u64);

#[async_trait]
impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
    JwtKeys: FromRef<S>,
{
    type Rejection = (StatusCode, String);

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let auth_header = parts
            .headers
            .get(axum::http::header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .ok_or((StatusCode::UNAUTHORIZED, "Unauthorized".to_string()))?;

        let token = auth_header
            .strip_prefix("Bearer ")
            .or_else(|| auth_header.strip_prefix("bearer "))
            .ok_or((
                StatusCode::UNAUTHORIZED,
                "Invalid Authorization header".to_string(),
            ))?;

        let claims = JwtKeys::from_ref(state)
            .decode_as(token, TokenKind::Access)
            .map_err(|e| {
                warn!(error = %e, "bearer token rejected");
                <(StatusCode, String)>::from(e)
            })?;

        Ok(AuthUser(claims.sub))
    }
}
