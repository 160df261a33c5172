// Library exports for testing
pub mod api;
pub mod config;
pub mod errors;
pub mod metrics;

pub use errors::{Cause, Detail, ErrorCase};
