//! Decoding of uploaded image payloads.
//!
//! Images travel as base64 inside the JSON body. Decoding and validation
//! happen before any service call, so a request either produces a complete
//! set of validated uploads or fails with no file persisted.

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use serde::Deserialize;
use serde_json::json;
use utoipa::ToSchema;

use crate::domain::{Error, ImageUpload};

/// One uploaded image in a request body.
#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ImagePayload {
    /// Client-side file name; its extension is validated.
    pub file_name: String,
    /// Base64-encoded file contents.
    pub data: String,
}

/// Decode and validate a single payload.
pub fn decode_image(payload: ImagePayload) -> Result<ImageUpload, Error> {
    let bytes = STANDARD.decode(payload.data.as_bytes()).map_err(|_| {
        Error::invalid_request(format!("file {} is not valid base64", payload.file_name))
            .with_details(json!({ "field": "images", "file": payload.file_name }))
    })?;
    ImageUpload::new(payload.file_name, bytes).map_err(Error::from)
}

/// Decode and validate a whole set, failing on the first bad file.
pub fn decode_images(payloads: Vec<ImagePayload>) -> Result<Vec<ImageUpload>, Error> {
    payloads.into_iter().map(decode_image).collect()
}
