//! Port for issuing and resolving stateless identity tokens.

use crate::domain::account::UserId;

/// Outcomes of resolving a presented token.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TokenError {
    /// The token was well-formed but has expired.
    #[error("token has expired")]
    Expired,
    /// The token was malformed or its signature did not verify.
    #[error("token is invalid")]
    Invalid,
    /// The token could not be produced.
    #[error("token issuing failed: {message}")]
    Issue {
        /// Adapter-level failure detail.
        message: String,
    },
}

/// Port binding a user identity to a signed, expiring credential.
///
/// Tokens are stateless; nothing is persisted server-side.
#[cfg_attr(test, mockall::automock)]
pub trait TokenService: Send + Sync {
    /// Issue a fresh token for the given identity.
    fn issue(&self, identity: &UserId) -> Result<String, TokenError>;

    /// Resolve a presented token back to the identity it was issued for.
    fn resolve(&self, token: &str) -> Result<UserId, TokenError>;
}

/// Fixture token service encoding the identity in clear text.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureTokenService;

const FIXTURE_PREFIX: &str = "fixture-token:";

impl TokenService for FixtureTokenService {
    fn issue(&self, identity: &UserId) -> Result<String, TokenError> {
        Ok(format!("{FIXTURE_PREFIX}{identity}"))
    }

    fn resolve(&self, token: &str) -> Result<UserId, TokenError> {
        let raw = token.strip_prefix(FIXTURE_PREFIX).ok_or(TokenError::Invalid)?;
        UserId::parse(raw).map_err(|_| TokenError::Invalid)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fixture_tokens_round_trip() {
        let identity = UserId::random();
        let service = FixtureTokenService;
        let token = service.issue(&identity).expect("issued");
        assert_eq!(service.resolve(&token).expect("resolved"), identity);
    }

    #[test]
    fn fixture_rejects_foreign_tokens() {
        assert_eq!(
            FixtureTokenService.resolve("garbage").expect_err("rejected"),
            TokenError::Invalid
        );
    }
}
