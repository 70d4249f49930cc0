//! bcrypt implementation of the credential hashing port.

use crate::domain::account::Password;
use crate::domain::ports::{CredentialHashError, CredentialHasher};

/// Hashes passwords with bcrypt at a configurable cost.
#[derive(Debug, Clone, Copy)]
pub struct BcryptCredentialHasher {
    cost: u32,
}

impl BcryptCredentialHasher {
    /// Create a hasher with an explicit cost factor.
    pub fn new(cost: u32) -> Self {
        Self { cost }
    }
}

impl Default for BcryptCredentialHasher {
    fn default() -> Self {
        Self::new(bcrypt::DEFAULT_COST)
    }
}

impl CredentialHasher for BcryptCredentialHasher {
    fn hash(&self, password: &Password) -> Result<String, CredentialHashError> {
        bcrypt::hash(password.reveal(), self.cost)
            .map_err(|hash_error| CredentialHashError::hashing(hash_error.to_string()))
    }

    fn verify(&self, password: &Password, hash: &str) -> Result<bool, CredentialHashError> {
        bcrypt::verify(password.reveal(), hash)
            .map_err(|verify_error| CredentialHashError::hashing(verify_error.to_string()))
    }
}
