use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Static banner returned from the root path
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ServiceMessage {
    #[schema(example = "RTRWH Assessment API - Beta")]
    pub message: String,
}
