//! Command implementations for fota-cli

pub mod actions;
pub mod download;
pub mod list;
pub mod login;
pub mod wait;

pub use actions::{bulk, cancel, cancel_downloaded, retry, update};
pub use download::download;
pub use list::{history, jobs, updates};
pub use login::login;
pub use wait::wait;
