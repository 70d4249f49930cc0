//! Port for password hashing and verification.

use crate::domain::account::Password;

use super::define_port_error;

define_port_error! {
    /// Errors raised by credential hashing adapters.
    pub enum CredentialHashError {
        /// Hashing or verification failed unexpectedly.
        Hashing { message: String } => "credential hashing failed: {message}",
    }
}

/// Port for irreversible password hashing.
#[cfg_attr(test, mockall::automock)]
pub trait CredentialHasher: Send + Sync {
    /// Hash a plaintext password for storage.
    fn hash(&self, password: &Password) -> Result<String, CredentialHashError>;

    /// Verify a plaintext password against a stored hash.
    fn verify(&self, password: &Password, hash: &str) -> Result<bool, CredentialHashError>;
}

/// Fixture hasher with a reversible, obviously-fake encoding for tests.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureCredentialHasher;

impl CredentialHasher for FixtureCredentialHasher {
    fn hash(&self, password: &Password) -> Result<String, CredentialHashError> {
        Ok(format!("plain:{}", password.reveal()))
    }

    fn verify(&self, password: &Password, hash: &str) -> Result<bool, CredentialHashError> {
        Ok(hash
            .strip_prefix("plain:")
            .is_some_and(|stored| stored == password.reveal()))
    }
}
