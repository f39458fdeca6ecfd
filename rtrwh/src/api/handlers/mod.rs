//! HTTP request handlers.
//!
//! Handlers take [`AppState`](crate::AppState) through axum's `State` extractor and return
//! `Result<Json<T>, Error>`; failures render through [`Error`](crate::errors::Error).
//!
//! - [`assessments`]: `POST /assess` and `GET /stats`
//! - [`service`]: the root banner and `/healthz`

pub mod assessments;
pub mod service;
