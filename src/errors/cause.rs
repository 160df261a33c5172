use std::error::Error;
use std::fmt;
use std::sync::Arc;

use super::codes::{ErrorCase, REASON_BACKEND_ERROR};
use super::response::Detail;

/// Boxed error accepted by [`Cause`] constructors and [`Cause::append`].
pub type BoxError = Box<dyn Error + Send + Sync + 'static>;

/// Plain-text error, used where only a message survives (e.g. after decoding JSON).
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{0}")]
pub struct Message(pub String);

impl Message {
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}

/// Structured API error.
///
/// Carries the HTTP status and machine status code it was classified with, the error it was
/// built from, and a trail of details (oldest first) recording every contributing failure.
/// `Cause::default()` is the zero value: it must be filled through [`Cause::append`] before it
/// can be rendered.
#[derive(Debug, Clone, Default)]
pub struct Cause {
    code: u16,
    status: String,
    source: Option<Arc<dyn Error + Send + Sync + 'static>>,
    details: Vec<Detail>,
}

impl Cause {
    /// Classify `err` with one of the predefined cases.
    pub fn new<E>(err: E, case: ErrorCase) -> Self
    where
        E: Into<BoxError>,
    {
        Self::with_status(err, case.code(), case.status(), case.reason())
    }

    /// Classify `err` with a status triple outside the predefined table.
    pub fn with_status<E>(
        err: E,
        code: u16,
        status: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self
    where
        E: Into<BoxError>,
    {
        let err: BoxError = err.into();
        let message = err.to_string();
        Self {
            code,
            status: status.into(),
            source: Some(Arc::from(err)),
            details: vec![Detail::new(reason, message)],
        }
    }

    /// Return the first `Cause` found in `err`'s source chain, or classify `err` as a backend
    /// error when the chain holds none.
    pub fn promote<E>(err: E) -> Self
    where
        E: Into<BoxError>,
    {
        let err: BoxError = err.into();
        let err = match err.downcast::<Cause>() {
            Ok(cause) => return *cause,
            Err(err) => err,
        };
        if let Some(cause) = find_cause(&*err) {
            return cause.clone();
        }
        Self::new(err, ErrorCase::BackendError)
    }

    /// Append `err` to the detail trail.
    ///
    /// A zero receiver is replaced wholesale by [`Cause::promote`]. Otherwise the receiver keeps
    /// its code, status and source: a non-zero `Cause` anywhere in `err`'s chain contributes all
    /// of its details, any other error (a zero `Cause` included) contributes one `backendError`
    /// detail.
    pub fn append<E>(&mut self, err: E)
    where
        E: Into<BoxError>,
    {
        let err: BoxError = err.into();
        if self.is_zero() {
            *self = Self::promote(err);
            return;
        }

        match find_cause(&*err) {
            Some(other) if !other.is_zero() => {
                self.details.extend(other.details.iter().cloned())
            }
            _ => self
                .details
                .push(Detail::new(REASON_BACKEND_ERROR, err.to_string())),
        }
    }

    /// Owned form of [`Cause::append`].
    #[must_use]
    pub fn merged<E>(mut self, err: E) -> Self
    where
        E: Into<BoxError>,
    {
        self.append(err);
        self
    }

    /// True when any of code, status, source or details is missing.
    pub fn is_zero(&self) -> bool {
        self.code == 0 || self.status.is_empty() || self.source.is_none() || self.details.is_empty()
    }

    /// HTTP status code
    pub fn code(&self) -> u16 {
        self.code
    }

    /// Machine status code, e.g. `NOT_FOUND`
    pub fn status(&self) -> &str {
        &self.status
    }

    /// Accumulated details, oldest first
    pub fn details(&self) -> &[Detail] {
        &self.details
    }

    /// Reason code of the first detail
    pub fn reason(&self) -> &str {
        self.details
            .first()
            .map(|detail| detail.reason.as_str())
            .unwrap_or("")
    }

    /// The error this cause was built from
    pub fn underlying(&self) -> Option<&(dyn Error + Send + Sync + 'static)> {
        self.source.as_deref()
    }

    /// Message of the underlying error, empty for a zero cause
    pub fn message(&self) -> String {
        self.source
            .as_ref()
            .map(|err| err.to_string())
            .unwrap_or_default()
    }

    pub(crate) fn from_parts(
        code: u16,
        status: String,
        message: String,
        details: Vec<Detail>,
    ) -> Self {
        Self {
            code,
            status,
            source: Some(Arc::new(Message(message))),
            details,
        }
    }
}

impl fmt::Display for Cause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} : ", self.reason())?;
        match &self.source {
            Some(err) => write!(f, "{err}"),
            None => Ok(()),
        }
    }
}

impl Error for Cause {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        self.source.as_ref().map(|err| err.as_ref() as _)
    }
}

/// Append `err` onto an optional receiver, returning the resulting cause.
///
/// `None` behaves like a zero receiver.
pub fn append<E>(receiver: Option<Cause>, err: E) -> Cause
where
    E: Into<BoxError>,
{
    receiver.unwrap_or_default().merged(err)
}

/// Walk `err` and its sources, returning the first error of type `T`.
pub fn find<'a, T>(err: &'a (dyn Error + 'static)) -> Option<&'a T>
where
    T: Error + 'static,
{
    let mut current = Some(err);
    while let Some(err) = current {
        if let Some(found) = err.downcast_ref::<T>() {
            return Some(found);
        }
        current = err.source();
    }
    None
}

/// Shorthand for `find::<Cause>`.
pub fn find_cause<'a>(err: &'a (dyn Error + 'static)) -> Option<&'a Cause> {
    find::<Cause>(err)
}
