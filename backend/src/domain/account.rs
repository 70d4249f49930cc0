//! User account model and its validated value types.

use std::fmt;
use std::sync::OnceLock;

use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use zeroize::Zeroizing;

use super::asset::AssetRef;

/// Validation errors returned by the account value constructors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AccountValidationError {
    /// The user id was not a valid UUID.
    InvalidId,
    /// The full name was empty after trimming.
    EmptyFullName,
    /// The email was empty after trimming.
    EmptyEmail,
    /// The email did not match the accepted shape.
    InvalidEmail,
    /// The password was empty.
    EmptyPassword,
    /// The contact number matched neither accepted format.
    InvalidContactNumber,
}

impl fmt::Display for AccountValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidId => write!(f, "user id must be a valid UUID"),
            Self::EmptyFullName => write!(f, "full name is required"),
            Self::EmptyEmail => write!(f, "email is required"),
            Self::InvalidEmail => write!(f, "email is invalid"),
            Self::EmptyPassword => write!(f, "password is required"),
            Self::InvalidContactNumber => write!(
                f,
                "contact number must look like +923001234567 or 03001234567"
            ),
        }
    }
}

impl std::error::Error for AccountValidationError {}

impl From<AccountValidationError> for super::Error {
    fn from(error: AccountValidationError) -> Self {
        let field = match error {
            AccountValidationError::InvalidId => {
                return Self::invalid_request(error.to_string());
            }
            AccountValidationError::EmptyFullName => "fullName",
            AccountValidationError::EmptyEmail | AccountValidationError::InvalidEmail => "email",
            AccountValidationError::EmptyPassword => "password",
            AccountValidationError::InvalidContactNumber => "contactNumber",
        };
        Self::invalid_field(field, error.to_string())
    }
}

/// Stable user identifier stored as a UUID.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct UserId(Uuid);

impl UserId {
    /// Parse an identifier from its string form.
    pub fn parse(raw: &str) -> Result<Self, AccountValidationError> {
        Uuid::parse_str(raw)
            .map(Self)
            .map_err(|_| AccountValidationError::InvalidId)
    }

    /// Generate a fresh random identifier.
    pub fn random() -> Self {
        Self(Uuid::new_v4())
    }

    /// Wrap an already-parsed UUID.
    pub fn from_uuid(value: Uuid) -> Self {
        Self(value)
    }

    /// Access the underlying UUID.
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<UserId> for String {
    fn from(value: UserId) -> Self {
        value.0.to_string()
    }
}

impl TryFrom<String> for UserId {
    type Error = AccountValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

/// Full name shown on the profile, non-blank once trimmed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct FullName(String);

impl FullName {
    /// Validate and construct a full name.
    pub fn new(raw: impl Into<String>) -> Result<Self, AccountValidationError> {
        let raw = raw.into();
        if raw.trim().is_empty() {
            return Err(AccountValidationError::EmptyFullName);
        }
        Ok(Self(raw))
    }
}

impl AsRef<str> for FullName {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl From<FullName> for String {
    fn from(value: FullName) -> Self {
        value.0
    }
}

impl TryFrom<String> for FullName {
    type Error = AccountValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

static EMAIL_RE: OnceLock<Regex> = OnceLock::new();

fn email_regex() -> &'static Regex {
    EMAIL_RE.get_or_init(|| {
        Regex::new(r"^\S+@\S+\.\S+$")
            .unwrap_or_else(|error| panic!("email regex failed to compile: {error}"))
    })
}

/// Email address used as the case-sensitive login key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct EmailAddress(String);

impl EmailAddress {
    /// Validate and construct an email address.
    pub fn new(raw: impl Into<String>) -> Result<Self, AccountValidationError> {
        let raw = raw.into();
        if raw.trim().is_empty() {
            return Err(AccountValidationError::EmptyEmail);
        }
        if !email_regex().is_match(&raw) {
            return Err(AccountValidationError::InvalidEmail);
        }
        Ok(Self(raw))
    }
}

impl AsRef<str> for EmailAddress {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for EmailAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_ref())
    }
}

impl From<EmailAddress> for String {
    fn from(value: EmailAddress) -> Self {
        value.0
    }
}

impl TryFrom<String> for EmailAddress {
    type Error = AccountValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

static CONTACT_RE: OnceLock<Regex> = OnceLock::new();

fn contact_regex() -> &'static Regex {
    // Two accepted shapes: country-code prefixed (+92 plus ten digits) or a
    // leading-zero eleven digit local form.
    CONTACT_RE.get_or_init(|| {
        Regex::new(r"^(\+92[0-9]{10}|0[0-9]{10})$")
            .unwrap_or_else(|error| panic!("contact regex failed to compile: {error}"))
    })
}

/// Optional contact number in one of the two accepted formats.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ContactNumber(String);

impl ContactNumber {
    /// Validate and construct a contact number.
    pub fn new(raw: impl Into<String>) -> Result<Self, AccountValidationError> {
        let raw = raw.into();
        if !contact_regex().is_match(&raw) {
            return Err(AccountValidationError::InvalidContactNumber);
        }
        Ok(Self(raw))
    }
}

impl AsRef<str> for ContactNumber {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl From<ContactNumber> for String {
    fn from(value: ContactNumber) -> Self {
        value.0
    }
}

impl TryFrom<String> for ContactNumber {
    type Error = AccountValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Plaintext password in transit.
///
/// The wrapper zeroizes its contents on drop and never implements
/// `Serialize` or prints its value, so plaintext cannot leak into logs or
/// response bodies.
pub struct Password(Zeroizing<String>);

impl Password {
    /// Wrap a non-empty plaintext password.
    pub fn new(raw: impl Into<String>) -> Result<Self, AccountValidationError> {
        let raw = raw.into();
        if raw.is_empty() {
            return Err(AccountValidationError::EmptyPassword);
        }
        Ok(Self(Zeroizing::new(raw)))
    }

    /// Number of characters, used for the per-operation length policies.
    pub fn len(&self) -> usize {
        self.0.chars().count()
    }

    /// Whether the password is empty. Always false for constructed values.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Expose the plaintext to the credential hasher.
    pub fn reveal(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Debug for Password {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Password(..)")
    }
}

/// A registered user account.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserAccount {
    /// Repository-assigned identifier.
    pub id: UserId,
    /// Display name.
    pub full_name: FullName,
    /// Unique login key.
    pub email: EmailAddress,
    /// Irreversible password hash; plaintext is never persisted.
    #[serde(skip_serializing)]
    pub password_hash: String,
    /// Optional validated contact number.
    pub contact_number: Option<ContactNumber>,
    /// Optional profile picture reference.
    pub profile_picture: Option<AssetRef>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
}

/// Profile fields a user may change; `None` leaves the stored value alone.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProfileChanges {
    /// Replacement full name.
    pub full_name: Option<FullName>,
    /// Replacement contact number.
    pub contact_number: Option<ContactNumber>,
    /// Replacement profile picture reference.
    pub profile_picture: Option<AssetRef>,
}

impl ProfileChanges {
    /// Whether any recognised field was supplied.
    pub fn is_empty(&self) -> bool {
        self.full_name.is_none() && self.contact_number.is_none() && self.profile_picture.is_none()
    }
}
