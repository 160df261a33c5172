use serde::{Deserialize, Serialize};
use std::fmt;
use utoipa::ToSchema;

// Machine status codes carried in the `status` field of an error document.
pub const STATUS_BAD_REQUEST: &str = "INVALID_ARGUMENT";
pub const STATUS_UNAUTHENTICATED: &str = "UNAUTHENTICATED";
pub const STATUS_PERMISSION_DENIED: &str = "PERMISSION_DENIED";
pub const STATUS_NOT_FOUND: &str = "NOT_FOUND";
pub const STATUS_ABORTED: &str = "ABORTED";
pub const STATUS_ALREADY_EXISTS: &str = "ALREADY_EXISTS";
pub const STATUS_RESOURCE_EXHAUSTED: &str = "RESOURCE_EXHAUSTED";
pub const STATUS_UNAVAILABLE: &str = "UNAVAILABLE";
pub const STATUS_BACKEND_ERROR: &str = "INTERNAL";

const KNOWN_STATUSES: [&str; 9] = [
    STATUS_BAD_REQUEST,
    STATUS_UNAUTHENTICATED,
    STATUS_PERMISSION_DENIED,
    STATUS_NOT_FOUND,
    STATUS_ABORTED,
    STATUS_ALREADY_EXISTS,
    STATUS_RESOURCE_EXHAUSTED,
    STATUS_UNAVAILABLE,
    STATUS_BACKEND_ERROR,
];

/// The matching `STATUS_*` constant, `None` for a status outside the vocabulary.
pub fn known_status(status: &str) -> Option<&'static str> {
    KNOWN_STATUSES.into_iter().find(|known| *known == status)
}

// Reason codes carried by each detail entry.
pub const REASON_BAD_REQUEST: &str = "badRequest";
pub const REASON_UNAUTHENTICATED: &str = "unauthenticated";
pub const REASON_PERMISSION_DENIED: &str = "permissionDenied";
pub const REASON_NOT_FOUND: &str = "notFound";
pub const REASON_ABORTED: &str = "abourtedRequest";
pub const REASON_ALREADY_EXISTS: &str = "alreadyExists";
pub const REASON_RESOURCE_EXHAUSTED: &str = "userRateLimitExceeded";
pub const REASON_UNAVAILABLE: &str = "unavailable";
pub const REASON_BACKEND_ERROR: &str = "backendError";

/// Failure classification used to build a [`Cause`](super::Cause)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCase {
    /// Malformed or invalid input
    BadRequest,

    /// Missing or invalid credentials
    Unauthenticated,

    /// Caller is known but not allowed
    PermissionDenied,

    /// Target resource does not exist
    NotFound,

    /// Conflicting concurrent operation
    Aborted,

    /// Resource already present
    AlreadyExists,

    /// Rate limit or quota exceeded
    ResourceExhausted,

    /// Service temporarily unavailable
    Unavailable,

    /// Anything without a more specific classification
    BackendError,
}

impl ErrorCase {
    /// Every predefined case, in table order.
    pub const ALL: [ErrorCase; 9] = [
        Self::BadRequest,
        Self::Unauthenticated,
        Self::PermissionDenied,
        Self::NotFound,
        Self::Aborted,
        Self::AlreadyExists,
        Self::ResourceExhausted,
        Self::Unavailable,
        Self::BackendError,
    ];

    /// HTTP status code for this case
    pub const fn code(&self) -> u16 {
        match self {
            Self::BadRequest => 400,
            Self::Unauthenticated => 401,
            Self::PermissionDenied => 403,
            Self::NotFound => 404,
            Self::Aborted => 409,
            Self::AlreadyExists => 409,
            Self::ResourceExhausted => 429,
            Self::Unavailable => 503,
            Self::BackendError => 500,
        }
    }

    /// Machine status code for this case
    pub const fn status(&self) -> &'static str {
        match self {
            Self::BadRequest => STATUS_BAD_REQUEST,
            Self::Unauthenticated => STATUS_UNAUTHENTICATED,
            Self::PermissionDenied => STATUS_PERMISSION_DENIED,
            Self::NotFound => STATUS_NOT_FOUND,
            Self::Aborted => STATUS_ABORTED,
            Self::AlreadyExists => STATUS_BACKEND_ERROR,
            Self::ResourceExhausted => STATUS_RESOURCE_EXHAUSTED,
            Self::Unavailable => STATUS_UNAVAILABLE,
            Self::BackendError => STATUS_BACKEND_ERROR,
        }
    }

    /// Reason code recorded in the detail produced by this case
    pub const fn reason(&self) -> &'static str {
        match self {
            Self::BadRequest => REASON_BAD_REQUEST,
            Self::Unauthenticated => REASON_UNAUTHENTICATED,
            Self::PermissionDenied => REASON_PERMISSION_DENIED,
            Self::NotFound => REASON_NOT_FOUND,
            Self::Aborted => REASON_ABORTED,
            Self::AlreadyExists => REASON_BACKEND_ERROR,
            Self::ResourceExhausted => REASON_RESOURCE_EXHAUSTED,
            Self::Unavailable => REASON_UNAVAILABLE,
            Self::BackendError => REASON_BACKEND_ERROR,
        }
    }

    /// Snake-case name, as used in URLs and JSON
    pub const fn name(&self) -> &'static str {
        match self {
            Self::BadRequest => "bad_request",
            Self::Unauthenticated => "unauthenticated",
            Self::PermissionDenied => "permission_denied",
            Self::NotFound => "not_found",
            Self::Aborted => "aborted",
            Self::AlreadyExists => "already_exists",
            Self::ResourceExhausted => "resource_exhausted",
            Self::Unavailable => "unavailable",
            Self::BackendError => "backend_error",
        }
    }

    /// Look a case up by its snake-case name.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|case| case.name() == name)
    }
}

impl fmt::Display for ErrorCase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
