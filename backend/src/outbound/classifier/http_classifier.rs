//! Reqwest-backed adapter for the model-serving endpoint.
//!
//! This adapter owns transport details only: request serialisation, timeout
//! and HTTP status mapping, and decoding the predicted label. The feature
//! encoding itself lives in the domain.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Url};
use serde::{Deserialize, Serialize};

use crate::domain::ports::{CarClassifier, CarClassifierError};

#[derive(Debug, Serialize)]
struct PredictRequestDto<'a> {
    features: &'a [f64],
}

#[derive(Debug, Deserialize)]
struct PredictResponseDto {
    label: String,
}

/// Classifier adapter performing JSON POST requests against one endpoint.
pub struct HttpCarClassifier {
    client: Client,
    endpoint: Url,
}

impl HttpCarClassifier {
    /// Build an adapter with an explicit request timeout.
    ///
    /// # Errors
    ///
    /// Returns an error when the reqwest client cannot be constructed.
    pub fn new(endpoint: Url, timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self { client, endpoint })
    }
}

#[async_trait]
impl CarClassifier for HttpCarClassifier {
    async fn predict(&self, features: &[f64]) -> Result<String, CarClassifierError> {
        let response = self
            .client
            .post(self.endpoint.clone())
            .json(&PredictRequestDto { features })
            .send()
            .await
            .map_err(|send_error| CarClassifierError::transport(send_error.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(CarClassifierError::status(status.as_u16()));
        }

        let decoded: PredictResponseDto = response
            .json()
            .await
            .map_err(|decode_error| CarClassifierError::decode(decode_error.to_string()))?;
        if decoded.label.trim().is_empty() {
            return Err(CarClassifierError::decode("empty label in response"));
        }
        Ok(decoded.label)
    }
}
