//! fota-core - Shared types for the FOTA contract harness
//!
//! This crate holds everything the client, the stub service and the
//! contract scenarios agree on: the observed wire models, the job state
//! machine, the endpoint paths, the field-shape contracts and the fixture
//! registry describing the devices of a target environment.

pub mod contract;
pub mod error;
pub mod fixtures;
pub mod models;
pub mod paths;
pub mod token;

pub use error::ApiErrorKind;
pub use fixtures::{
    DeviceFixture, DownloadFixture, FixtureError, FixtureRegistry, ReferenceJob, ScenarioFixtures,
};
pub use models::*;
