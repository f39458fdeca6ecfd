//! OpenAPI documentation for the assessment API.
//!
//! The document is served as JSON at `/api-docs/openapi.json` and rendered with Scalar at `/docs`.

use utoipa::OpenApi;

use crate::{api, assessment, errors};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "RTRWH Assessment API",
        description = "Rooftop rainwater harvesting assessment.

Submit a roof area (and optionally a location) to `POST /assess` to get the volume of rainwater the roof could collect over a year and a recommended recharge structure. `GET /stats` reports community totals across every assessment.",
    ),
    paths(
        api::handlers::service::root,
        api::handlers::assessments::create_assessment,
        api::handlers::assessments::get_stats,
    ),
    components(schemas(
        api::models::assessments::AssessmentCreate,
        api::models::assessments::AssessmentResponse,
        api::models::assessments::AssessmentStats,
        api::models::service::ServiceMessage,
        assessment::StructureType,
        errors::ErrorBody,
    )),
    tags(
        (name = "assessments", description = "Rainwater harvesting assessments and totals"),
        (name = "service", description = "Service information"),
    )
)]
pub struct ApiDoc;
