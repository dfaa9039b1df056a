//! Signed session tokens: access/refresh generation and validation.
//!
//! Both token classes are HS256-signed JWTs over the same process-wide
//! secret, kept apart by a `kind` claim bound into the signed payload. A
//! refresh token therefore cannot pass access-token validation even if the
//! claim shapes ever converge. Tokens are self-contained and never
//! persisted; they expire by wall clock and cannot be revoked server-side.

use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use parley_core::types::UserId;
use serde::{Deserialize, Serialize};

/// Token class, bound into the signed claims.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenKind {
    Access,
    Refresh,
}

/// Claims embedded in every access token.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct AccessClaims {
    /// Subject -- the user's id.
    pub sub: UserId,
    /// The user's current username at issue time.
    pub username: String,
    /// Expiration time (UTC Unix timestamp).
    pub exp: i64,
    /// Issued-at time (UTC Unix timestamp).
    pub iat: i64,
    pub kind: TokenKind,
}

/// Claims embedded in every refresh token. Deliberately narrower than
/// [`AccessClaims`]: no username, so a refresh token can never satisfy a
/// resource operation that needs one.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct RefreshClaims {
    pub sub: UserId,
    pub exp: i64,
    pub iat: i64,
    pub kind: TokenKind,
}

/// Why a token failed validation. Either way the request is
/// unauthenticated, but callers can phrase the failure accurately.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum TokenError {
    /// Signature valid but past the expiry instant.
    #[error("token expired")]
    Expired,
    /// Malformed, forged, wrong secret, or wrong token kind.
    #[error("token invalid")]
    Invalid,
}

/// Configuration for token generation and validation.
#[derive(Debug, Clone)]
pub struct JwtConfig {
    /// HMAC-SHA256 secret used to sign and verify both token classes.
    pub secret: String,
    /// Access token lifetime in hours (default: 24).
    pub access_token_expiry_hours: i64,
    /// Refresh token lifetime in days (default: 7).
    pub refresh_token_expiry_days: i64,
}

/// Default access token expiry in hours.
const DEFAULT_ACCESS_EXPIRY_HOURS: i64 = 24;
/// Default refresh token expiry in days.
const DEFAULT_REFRESH_EXPIRY_DAYS: i64 = 7;

impl JwtConfig {
    /// Load JWT configuration from environment variables.
    ///
    /// | Env Var                    | Required | Default |
    /// |----------------------------|----------|---------|
    /// | `JWT_SECRET`               | **yes**  | --      |
    /// | `JWT_ACCESS_EXPIRY_HOURS`  | no       | `24`    |
    /// | `JWT_REFRESH_EXPIRY_DAYS`  | no       | `7`     |
    ///
    /// # Panics
    ///
    /// Panics if `JWT_SECRET` is unset or empty, or if the access token
    /// would outlive the refresh token.
    pub fn from_env() -> Self {
        let secret =
            std::env::var("JWT_SECRET").expect("JWT_SECRET must be set in the environment");
        assert!(!secret.is_empty(), "JWT_SECRET must not be empty");

        let access_token_expiry_hours: i64 = std::env::var("JWT_ACCESS_EXPIRY_HOURS")
            .unwrap_or_else(|_| DEFAULT_ACCESS_EXPIRY_HOURS.to_string())
            .parse()
            .expect("JWT_ACCESS_EXPIRY_HOURS must be a valid i64");

        let refresh_token_expiry_days: i64 = std::env::var("JWT_REFRESH_EXPIRY_DAYS")
            .unwrap_or_else(|_| DEFAULT_REFRESH_EXPIRY_DAYS.to_string())
            .parse()
            .expect("JWT_REFRESH_EXPIRY_DAYS must be a valid i64");

        assert!(
            access_token_expiry_hours * 3600 <= refresh_token_expiry_days * 86_400,
            "access token lifetime must not exceed refresh token lifetime"
        );

        Self {
            secret,
            access_token_expiry_hours,
            refresh_token_expiry_days,
        }
    }
}

/// Generate an HS256 access token carrying the user's id and username.
pub fn generate_access_token(
    user_id: UserId,
    username: &str,
    config: &JwtConfig,
) -> Result<String, jsonwebtoken::errors::Error> {
    let now = chrono::Utc::now().timestamp();
    let exp = now + config.access_token_expiry_hours * 3600;

    let claims = AccessClaims {
        sub: user_id,
        username: username.to_string(),
        exp,
        iat: now,
        kind: TokenKind::Access,
    };

    encode(
        &Header::default(), // HS256
        &claims,
        &EncodingKey::from_secret(config.secret.as_bytes()),
    )
}

/// Generate an HS256 refresh token carrying only the user's id.
pub fn generate_refresh_token(
    user_id: UserId,
    config: &JwtConfig,
) -> Result<String, jsonwebtoken::errors::Error> {
    let now = chrono::Utc::now().timestamp();
    let exp = now + config.refresh_token_expiry_days * 86_400;

    let claims = RefreshClaims {
        sub: user_id,
        exp,
        iat: now,
        kind: TokenKind::Refresh,
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(config.secret.as_bytes()),
    )
}

/// HS256 validation with exact expiry: a token is rejected at and after its
/// `exp` instant, with no clock tolerance.
fn strict_validation() -> Validation {
    let mut validation = Validation::default(); // HS256, validates exp
    validation.leeway = 0;
    validation
}

/// Validate an access token, returning the embedded [`AccessClaims`].
///
/// Checks signature, expiry, and that the token kind is `access`.
pub fn validate_access_token(token: &str, config: &JwtConfig) -> Result<AccessClaims, TokenError> {
    let data = decode::<AccessClaims>(
        token,
        &DecodingKey::from_secret(config.secret.as_bytes()),
        &strict_validation(),
    )
    .map_err(classify_error)?;

    if data.claims.kind != TokenKind::Access {
        return Err(TokenError::Invalid);
    }
    Ok(data.claims)
}

/// Validate a refresh token, returning the embedded [`RefreshClaims`].
///
/// An access token decodes into this shape (extra claims are ignored), so
/// the kind check is what actually keeps the classes apart.
pub fn validate_refresh_token(
    token: &str,
    config: &JwtConfig,
) -> Result<RefreshClaims, TokenError> {
    let data = decode::<RefreshClaims>(
        token,
        &DecodingKey::from_secret(config.secret.as_bytes()),
        &strict_validation(),
    )
    .map_err(classify_error)?;

    if data.claims.kind != TokenKind::Refresh {
        return Err(TokenError::Invalid);
    }
    Ok(data.claims)
}

/// Collapse jsonwebtoken errors into the two cases callers may act on.
fn classify_error(e: jsonwebtoken::errors::Error) -> TokenError {
    match e.kind() {
        jsonwebtoken::errors::ErrorKind::ExpiredSignature => TokenError::Expired,
        _ => TokenError::Invalid,
    }
}
