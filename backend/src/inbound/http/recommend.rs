//! Car-name recommendation endpoint.

use actix_web::{HttpResponse, post, web};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::CarFeatures;

use super::auth::Identity;
use super::error::ApiResult;
use super::state::HttpState;

/// Request body for `POST /api/v1/recommend`.
///
/// Field names match the training dataset's column headers.
#[derive(Debug, Deserialize, ToSchema)]
pub struct RecommendRequest {
    /// Asking price.
    #[serde(rename = "Price")]
    pub price: f64,
    /// Model year.
    #[serde(rename = "Model Year")]
    pub model_year: f64,
    /// Engine type.
    #[serde(rename = "Engine Type")]
    pub engine_type: String,
    /// Engine capacity in cc.
    #[serde(rename = "Engine Capacity")]
    pub engine_capacity: f64,
    /// Assembly.
    #[serde(rename = "Assembly")]
    pub assembly: String,
    /// Body type.
    #[serde(rename = "Body Type")]
    pub body_type: String,
    /// Transmission type.
    #[serde(rename = "Transmission Type")]
    pub transmission_type: String,
    /// Registration status.
    #[serde(rename = "Registration Status")]
    pub registration_status: String,
}

/// Response carrying the single predicted car name.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RecommendResponse {
    /// Predicted car name.
    pub label: String,
}

/// Recommend a car name for the described vehicle.
#[utoipa::path(
    post,
    path = "/api/v1/recommend",
    request_body = RecommendRequest,
    responses(
        (status = 200, description = "Predicted car name", body = RecommendResponse),
        (status = 400, description = "Unrecognised feature value", body = crate::domain::Error),
        (status = 401, description = "Authentication required", body = crate::domain::Error),
        (status = 503, description = "Classifier unavailable", body = crate::domain::Error)
    ),
    tags = ["recommendations"],
    security(("BearerToken" = []))
)]
#[post("/recommend")]
pub async fn recommend(
    _identity: Identity,
    state: web::Data<HttpState>,
    payload: web::Json<RecommendRequest>,
) -> ApiResult<HttpResponse> {
    let body = payload.into_inner();
    let features = CarFeatures {
        price: body.price,
        model_year: body.model_year,
        engine_type: body.engine_type,
        engine_capacity: body.engine_capacity,
        assembly: body.assembly,
        body_type: body.body_type,
        transmission_type: body.transmission_type,
        registration_status: body.registration_status,
    };
    let label = state.recommender.recommend(&features).await?;
    Ok(HttpResponse::Ok().json(RecommendResponse { label }))
}
