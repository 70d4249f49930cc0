//! Port for user account persistence adapters.

use async_trait::async_trait;

use crate::domain::account::{ProfileChanges, UserAccount, UserId};

use super::define_port_error;

define_port_error! {
    /// Persistence errors raised by account repository adapters.
    pub enum AccountRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } => "account repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "account repository query failed: {message}",
        /// The email is already registered.
        DuplicateEmail { email: String } => "email {email} already exists",
    }
}

/// Port for account storage and retrieval.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AccountRepository: Send + Sync {
    /// Persist a new account. Fails with [`AccountRepositoryError::DuplicateEmail`]
    /// when the email is already taken.
    async fn insert(&self, account: &UserAccount) -> Result<(), AccountRepositoryError>;

    /// Fetch an account by its exact email.
    async fn find_by_email(
        &self,
        email: &str,
    ) -> Result<Option<UserAccount>, AccountRepositoryError>;

    /// Fetch an account by identifier.
    async fn find_by_id(&self, id: &UserId) -> Result<Option<UserAccount>, AccountRepositoryError>;

    /// Apply profile changes. Returns `false` when the account does not exist.
    async fn update_profile(
        &self,
        id: &UserId,
        changes: &ProfileChanges,
    ) -> Result<bool, AccountRepositoryError>;

    /// Replace the stored password hash. Returns `false` when the account
    /// does not exist.
    async fn update_password_hash(
        &self,
        id: &UserId,
        password_hash: &str,
    ) -> Result<bool, AccountRepositoryError>;

    /// Delete the account document. Returns `false` when it was already gone.
    async fn delete(&self, id: &UserId) -> Result<bool, AccountRepositoryError>;
}

/// Fixture implementation for tests that do not exercise account storage.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureAccountRepository;

#[async_trait]
impl AccountRepository for FixtureAccountRepository {
    async fn insert(&self, _account: &UserAccount) -> Result<(), AccountRepositoryError> {
        Ok(())
    }

    async fn find_by_email(
        &self,
        _email: &str,
    ) -> Result<Option<UserAccount>, AccountRepositoryError> {
        Ok(None)
    }

    async fn find_by_id(
        &self,
        _id: &UserId,
    ) -> Result<Option<UserAccount>, AccountRepositoryError> {
        Ok(None)
    }

    async fn update_profile(
        &self,
        _id: &UserId,
        _changes: &ProfileChanges,
    ) -> Result<bool, AccountRepositoryError> {
        Ok(true)
    }

    async fn update_password_hash(
        &self,
        _id: &UserId,
        _password_hash: &str,
    ) -> Result<bool, AccountRepositoryError> {
        Ok(true)
    }

    async fn delete(&self, _id: &UserId) -> Result<bool, AccountRepositoryError> {
        Ok(true)
    }
}
