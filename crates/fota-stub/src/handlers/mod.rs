//! HTTP handlers for the stub FOTA endpoints

pub mod download;
pub mod history;
pub mod jobs;
pub mod listing;

use axum::http::Uri;

use crate::error::ApiError;

/// Fallback for unknown routes
pub async fn not_found(uri: Uri) -> ApiError {
    ApiError::NotFound(format!("no route for {}", uri.path()))
}
