//! Observed data models of the FOTA API

mod device;
mod download;
mod history;
mod id;
mod job;

pub use device::*;
pub use download::*;
pub use history::*;
pub use id::*;
pub use job::*;
