//! Structured error envelope for API responses

pub mod cause;
pub mod codes;
pub mod response;

pub use cause::{append, find, find_cause, BoxError, Cause, Message};
pub use codes::ErrorCase;
pub use response::{Detail, ErrorBody, ErrorResponse};
