//! API layer for HTTP request handling and data models.
//!
//! - **[`handlers`]**: Axum route handlers
//! - **[`models`]**: Request/response data structures
//!
//! All endpoints carry `utoipa` annotations; the rendered documentation is served at `/docs`.

pub mod handlers;
pub mod models;
