//! Command implementations for build-cli

pub mod devices;
pub mod logs;
pub mod models;
pub mod revisions;

pub use logs::logs;
