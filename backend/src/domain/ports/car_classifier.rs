//! Port for the opaque pre-trained car-name classifier.

use async_trait::async_trait;

use super::define_port_error;

define_port_error! {
    /// Errors raised by classifier adapters.
    pub enum CarClassifierError {
        /// The classifier endpoint could not be reached.
        Transport { message: String } => "classifier unreachable: {message}",
        /// The classifier answered with a non-success status.
        Status { code: u16 } => "classifier answered with status {code}",
        /// The classifier response could not be decoded.
        Decode { message: String } => "classifier response invalid: {message}",
    }
}

/// Port mapping an encoded feature vector to a single predicted car name.
///
/// The vector layout is owned by the recommendation domain; adapters pass it
/// through untouched.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CarClassifier: Send + Sync {
    /// Predict the car name for an encoded feature vector.
    async fn predict(&self, features: &[f64]) -> Result<String, CarClassifierError>;
}

/// Fixture classifier returning a constant label.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureCarClassifier;

#[async_trait]
impl CarClassifier for FixtureCarClassifier {
    async fn predict(&self, _features: &[f64]) -> Result<String, CarClassifierError> {
        Ok("Toyota Corolla".to_owned())
    }
}
