//! HTTP handlers for rainwater harvesting assessments.

use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
};
use tracing::info;

use crate::{
    AppState,
    api::models::assessments::{AssessmentCreate, AssessmentResponse, AssessmentStats},
    assessment,
    db::models::assessments::AssessmentCreateDBRequest,
    errors::{Error, ErrorBody, Result},
    types::Coordinates,
};

/// Run an assessment and record it
#[utoipa::path(
    post,
    path = "/assess",
    tag = "assessments",
    summary = "Assess a rooftop",
    description = "Look up a year of daily rainfall for the location, estimate the harvestable volume and recommend a recharge structure. Every successful assessment is stored.",
    request_body = AssessmentCreate,
    responses(
        (status = 200, description = "Assessment computed and stored", body = AssessmentResponse),
        (status = 422, description = "Invalid request body", body = ErrorBody),
        (status = 500, description = "Rainfall lookup or storage failed", body = ErrorBody),
    )
)]
#[tracing::instrument(skip_all, fields(roof_area = tracing::field::Empty))]
pub async fn create_assessment(
    State(state): State<AppState>,
    payload: std::result::Result<Json<AssessmentCreate>, JsonRejection>,
) -> Result<Json<AssessmentResponse>> {
    let Json(request) = payload.map_err(|rejection| Error::Validation {
        message: rejection.body_text(),
    })?;
    request.validate()?;
    tracing::Span::current().record("roof_area", request.roof_area);

    let location = Coordinates::or_fallback(request.lat, request.lng, state.config.assessment.default_location);
    let daily = state.rainfall.fetch_daily_precipitation(location).await?;
    let outcome = assessment::assess(request.roof_area, &daily);
    if !outcome.captured_volume_litres.is_finite() {
        return Err(Error::Validation {
            message: "roof_area is too large to compute a captured volume".to_string(),
        });
    }

    // Nothing is stored unless the rainfall lookup succeeded
    let id = state
        .storage
        .insert(&AssessmentCreateDBRequest {
            roof_area: request.roof_area,
            dwellers: request.dwellers.map(i64::from),
            open_space: request.open_space,
            roof_type: request.roof_type,
            lat: location.lat,
            lng: location.lng,
            annual_rainfall: outcome.annual_rainfall_mm,
            captured_volume: outcome.captured_volume_litres,
            structure_type: outcome.recommendation.structure_type,
            cost: outcome.recommendation.cost,
        })
        .await?;

    let structure_type = outcome.recommendation.structure_type;
    metrics::counter!("rtrwh_assessments_total", "structure_type" => structure_type.as_str()).increment(1);
    info!(
        id,
        %location,
        days = daily.len(),
        structure_type = %structure_type,
        "Stored assessment"
    );

    Ok(Json(AssessmentResponse::from(&outcome)))
}

/// Community totals
#[utoipa::path(
    get,
    path = "/stats",
    tag = "assessments",
    summary = "Get community totals",
    description = "Number of assessments recorded so far and the total harvestable volume across them, in litres.",
    responses(
        (status = 200, description = "Current totals", body = AssessmentStats),
        (status = 500, description = "Storage failed", body = ErrorBody),
    )
)]
#[tracing::instrument(skip_all)]
pub async fn get_stats(State(state): State<AppState>) -> Result<Json<AssessmentStats>> {
    let totals = state.storage.aggregate().await?;
    Ok(Json(totals.into()))
}
