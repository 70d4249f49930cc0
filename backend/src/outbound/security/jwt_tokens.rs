//! HS256 JWT implementation of the token service port.

use chrono::{Duration, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::domain::account::UserId;
use crate::domain::ports::{TokenError, TokenService};

#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    sub: String,
    exp: i64,
}

/// Stateless identity tokens signed with a shared HS256 secret.
pub struct JwtTokenService {
    encoding: EncodingKey,
    decoding: DecodingKey,
    ttl: Duration,
}

impl JwtTokenService {
    /// Create the service from the shared secret and token lifetime.
    pub fn new(secret: &[u8], ttl: Duration) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
            ttl,
        }
    }
}

impl TokenService for JwtTokenService {
    fn issue(&self, identity: &UserId) -> Result<String, TokenError> {
        let claims = Claims {
            sub: identity.to_string(),
            exp: (Utc::now() + self.ttl).timestamp(),
        };
        encode(&Header::default(), &claims, &self.encoding)
            .map_err(|encode_error| TokenError::Issue {
                message: encode_error.to_string(),
            })
    }

    fn resolve(&self, token: &str) -> Result<UserId, TokenError> {
        let data = decode::<Claims>(token, &self.decoding, &Validation::default()).map_err(
            |decode_error| match decode_error.kind() {
                ErrorKind::ExpiredSignature => TokenError::Expired,
                _ => {
                    debug!(error = %decode_error, "token rejected");
                    TokenError::Invalid
                }
            },
        )?;
        UserId::parse(&data.claims.sub).map_err(|_| TokenError::Invalid)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn service(ttl: Duration) -> JwtTokenService {
        JwtTokenService::new(b"test-secret", ttl)
    }

    #[test]
    fn issued_tokens_resolve_to_the_same_identity() {
        let service = service(Duration::hours(24));
        let identity = UserId::random();
        let token = service.issue(&identity).expect("issued");
        assert_eq!(service.resolve(&token).expect("resolved"), identity);
    }

    #[test]
    fn expired_tokens_are_reported_as_expired() {
        let service = service(Duration::hours(-1));
        let token = service.issue(&UserId::random()).expect("issued");
        assert_eq!(service.resolve(&token).expect_err("expired"), TokenError::Expired);
    }

    #[test]
    fn foreign_tokens_are_invalid() {
        let issuing = service(Duration::hours(24));
        let verifying = JwtTokenService::new(b"other-secret", Duration::hours(24));
        let token = issuing.issue(&UserId::random()).expect("issued");
        assert_eq!(
            verifying.resolve(&token).expect_err("rejected"),
            TokenError::Invalid
        );
    }

    #[test]
    fn garbage_tokens_are_invalid() {
        let service = service(Duration::hours(24));
        assert_eq!(
            service.resolve("not.a.token").expect_err("rejected"),
            TokenError::Invalid
        );
    }
}
