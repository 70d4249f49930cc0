//! Outbound adapters implementing the domain ports against real
//! infrastructure: PostgreSQL, the filesystem, bcrypt, JWT, and the
//! model-serving endpoint.

pub mod assets;
pub mod classifier;
pub mod persistence;
pub mod security;
