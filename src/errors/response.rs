use serde::{ser, Deserialize, Deserializer, Serialize, Serializer};
use utoipa::ToSchema;

use super::cause::Cause;

/// Error document returned to API clients
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    pub error: ErrorBody,
}

/// Body of an error document
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize, ToSchema)]
#[serde(default)]
pub struct ErrorBody {
    /// HTTP status code
    #[schema(example = 500)]
    pub code: u16,
    /// Machine status code
    #[schema(example = "INTERNAL")]
    pub status: String,
    /// Message of the originating error
    pub message: String,
    /// Every contributing failure, oldest first
    pub details: Vec<Detail>,
}

/// One contributing failure
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "PascalCase", default)]
pub struct Detail {
    /// Reason code, e.g. `backendError`
    pub reason: String,
    /// Error message
    pub message: String,
}

impl Detail {
    pub fn new(reason: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
            message: message.into(),
        }
    }
}

impl ErrorResponse {
    /// Document for a non-zero cause, `None` otherwise.
    pub fn from_cause(cause: &Cause) -> Option<Self> {
        if cause.is_zero() {
            return None;
        }
        Some(Self {
            error: ErrorBody {
                code: cause.code(),
                status: cause.status().to_string(),
                message: cause.message(),
                details: cause.details().to_vec(),
            },
        })
    }
}

impl From<ErrorResponse> for Cause {
    fn from(response: ErrorResponse) -> Self {
        let ErrorBody {
            code,
            status,
            message,
            details,
        } = response.error;
        Cause::from_parts(code, status, message, details)
    }
}

impl Serialize for Cause {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match ErrorResponse::from_cause(self) {
            Some(response) => response.serialize(serializer),
            None => Err(ser::Error::custom("cannot serialize a zero-valued cause")),
        }
    }
}

impl<'de> Deserialize<'de> for Cause {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let response = ErrorResponse::deserialize(deserializer)?;
        let mut cause = Cause::default();
        cause.merge(response);
        Ok(cause)
    }
}

impl Cause {
    /// Decode an error document and append it onto `self`.
    ///
    /// A zero receiver becomes the decoded cause; a populated one keeps its classification and
    /// gains the decoded details.
    pub fn merge_json(&mut self, json: &[u8]) -> Result<(), serde_json::Error> {
        let response: ErrorResponse = serde_json::from_slice(json)?;
        self.merge(response);
        Ok(())
    }

    /// Append an already-decoded error document onto `self`.
    pub fn merge(&mut self, response: ErrorResponse) {
        self.append(Cause::from(response));
    }

    /// Decode an error document into a fresh cause.
    pub fn from_json(json: &[u8]) -> Result<Self, serde_json::Error> {
        let mut cause = Cause::default();
        cause.merge_json(json)?;
        Ok(cause)
    }

    /// Encode as an error document.
    pub fn to_json(&self) -> Result<Vec<u8>, serde_json::Error> {
        serde_json::to_vec(self)
    }
}
