//! fota-stub - In-process stub of the FOTA management API
//!
//! Serves the observable contract the scenarios check (bearer auth,
//! pagination bounds, job lifecycle, signed downloads) from seeded in-memory
//! state, so the contract suite and the client can run without a live
//! environment. It makes no claim about how the real service works inside.
//!
//! # Usage
//!
//! ```ignore
//! use fota_core::FixtureRegistry;
//! use fota_stub::{create_router, StubConfig, StubState};
//!
//! let fixtures = FixtureRegistry::embedded()?;
//! let state = StubState::seeded(&fixtures, StubConfig::default());
//! let router = create_router(state);
//! ```

pub mod auth;
pub mod config;
pub mod error;
pub mod handlers;
pub mod pagination;
pub mod signing;
pub mod state;
mod store;

pub use config::StubConfig;
pub use error::ApiError;
pub use state::{StubDevice, StubState};

use axum::middleware;
use axum::routing::{get, post};
use axum::Router;
use fota_core::paths;
use tower_http::trace::TraceLayer;

/// Create the stub FOTA router with the given state
pub fn create_router(state: StubState) -> Router {
    let authenticated = Router::new()
        .route(
            paths::AVAILABLE_UPDATES,
            get(handlers::listing::available_updates),
        )
        .route(paths::JOBS, get(handlers::listing::list_jobs))
        .route(
            "/api/fota/device/{uid}/history",
            get(handlers::history::device_history),
        )
        .route(paths::JOBS_BULK, post(handlers::jobs::bulk_create))
        .route(
            paths::JOBS_DOWNLOADED_CANCEL,
            post(handlers::jobs::cancel_downloaded),
        )
        .route(paths::JOBS_UPDATE, post(handlers::jobs::update_jobs))
        .route(paths::JOBS_CANCEL, post(handlers::jobs::cancel_jobs))
        .route(paths::JOBS_RETRY, post(handlers::jobs::retry_jobs))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth::require_bearer,
        ));

    let public = Router::new().route(
        "/api/fota/firmware/download/{file}",
        get(handlers::download::firmware_download),
    );

    authenticated
        .merge(public)
        .fallback(handlers::not_found)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
