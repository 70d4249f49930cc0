//! Credential hashing and identity token adapters.

mod bcrypt_hasher;
mod jwt_tokens;

pub use bcrypt_hasher::BcryptCredentialHasher;
pub use jwt_tokens::JwtTokenService;
