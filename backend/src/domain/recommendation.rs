//! Car-name recommendation: feature validation, encoding, and the service
//! calling the opaque classifier.
//!
//! Categorical values are encoded as their ordinal position in fixed,
//! lexicographically ordered tables. The ordering is the contract with the
//! trained model and must not be reordered or extended in place.

use std::fmt;
use std::sync::Arc;

use serde_json::json;
use tracing::error;

use super::Error;
use super::ports::{CarClassifier, CarClassifierError};

/// Accepted engine types, in encoding order.
pub const ENGINE_TYPES: [&str; 3] = ["Diesel", "Hybrid", "Petrol"];

/// Accepted assembly values, in encoding order.
pub const ASSEMBLIES: [&str; 2] = ["Imported", "Local"];

/// Accepted body types, in encoding order.
pub const BODY_TYPES: [&str; 6] = ["Cross Over", "Hatchback", "Mini Van", "SUV", "Sedan", "Van"];

/// Accepted transmission types, in encoding order.
pub const TRANSMISSION_TYPES: [&str; 2] = ["Automatic", "Manual"];

/// Accepted registration statuses, in encoding order.
pub const REGISTRATION_STATUSES: [&str; 2] = ["Registered", "Un-Registered"];

/// Validation error naming the rejected field and the accepted values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownFeatureValue {
    /// Feature field the value belongs to.
    pub field: &'static str,
    /// Rejected raw value.
    pub value: String,
    /// Accepted values for the field, in encoding order.
    pub accepted: &'static [&'static str],
}

impl fmt::Display for UnknownFeatureValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "unknown {} {:?}; accepted: {}",
            self.field,
            self.value,
            self.accepted.join(", ")
        )
    }
}

impl std::error::Error for UnknownFeatureValue {}

/// Feature set describing the car the caller wants a name suggestion for.
#[derive(Debug, Clone, PartialEq)]
pub struct CarFeatures {
    /// Asking price.
    pub price: f64,
    /// Model year.
    pub model_year: f64,
    /// Engine type, one of [`ENGINE_TYPES`].
    pub engine_type: String,
    /// Engine capacity in cc.
    pub engine_capacity: f64,
    /// Assembly, one of [`ASSEMBLIES`].
    pub assembly: String,
    /// Body type, one of [`BODY_TYPES`].
    pub body_type: String,
    /// Transmission type, one of [`TRANSMISSION_TYPES`].
    pub transmission_type: String,
    /// Registration status, one of [`REGISTRATION_STATUSES`].
    pub registration_status: String,
}

fn ordinal(
    field: &'static str,
    value: &str,
    accepted: &'static [&'static str],
) -> Result<f64, UnknownFeatureValue> {
    accepted
        .iter()
        .position(|candidate| *candidate == value)
        .map(|index| index as f64)
        .ok_or_else(|| UnknownFeatureValue {
            field,
            value: value.to_owned(),
            accepted,
        })
}

impl CarFeatures {
    /// Encode the features into the numeric vector the classifier expects.
    ///
    /// The element order matches the training column order:
    /// price, model year, engine type, engine capacity, assembly, body type,
    /// transmission type, registration status.
    pub fn encode(&self) -> Result<Vec<f64>, UnknownFeatureValue> {
        Ok(vec![
            self.price,
            self.model_year,
            ordinal("engine type", &self.engine_type, &ENGINE_TYPES)?,
            self.engine_capacity,
            ordinal("assembly", &self.assembly, &ASSEMBLIES)?,
            ordinal("body type", &self.body_type, &BODY_TYPES)?,
            ordinal("transmission type", &self.transmission_type, &TRANSMISSION_TYPES)?,
            ordinal(
                "registration status",
                &self.registration_status,
                &REGISTRATION_STATUSES,
            )?,
        ])
    }
}

/// Service translating validated features into a single predicted car name.
#[derive(Clone)]
pub struct RecommendationService {
    classifier: Arc<dyn CarClassifier>,
}

impl RecommendationService {
    /// Create the service over a classifier port.
    pub fn new(classifier: Arc<dyn CarClassifier>) -> Self {
        Self { classifier }
    }

    /// Encode the features and ask the classifier for a car name.
    pub async fn recommend(&self, features: &CarFeatures) -> Result<String, Error> {
        let encoded = features.encode().map_err(|unknown| {
            Error::invalid_field(unknown.field, unknown.to_string())
                .with_details(json!({ "field": unknown.field, "accepted": unknown.accepted }))
        })?;

        self.classifier
            .predict(&encoded)
            .await
            .map_err(map_classifier_error)
    }
}

fn map_classifier_error(error: CarClassifierError) -> Error {
    error!(error = %error, "classifier call failed");
    match error {
        CarClassifierError::Transport { .. } => {
            Error::service_unavailable("recommendation service unavailable")
        }
        CarClassifierError::Status { .. } | CarClassifierError::Decode { .. } => {
            Error::internal("recommendation failed")
        }
    }
}
