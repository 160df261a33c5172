//! JSON response writing, including the error envelope

use axum::{
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
};
use serde::Serialize;
use tracing::{error, warn};

use crate::errors::codes::known_status;
use crate::errors::{BoxError, Cause, ErrorCase};
use crate::metrics::ERROR_RESPONSES_TOTAL;

pub const MIME_APPLICATION_JSON: &str = "application/json";
pub const MIME_APPLICATION_JSON_CHARSET_UTF8: &str = "application/json; charset=UTF-8";

/// Metric label for statuses outside the known vocabulary.
pub const OTHER_STATUS_LABEL: &str = "other";

/// Serialize `value` as the body of a `status` response.
///
/// The body is newline terminated. Encoding failures become a bare 500.
pub fn json<T>(status: StatusCode, value: &T) -> Response
where
    T: Serialize + ?Sized,
{
    match serde_json::to_vec(value) {
        Ok(mut body) => {
            body.push(b'\n');
            (
                status,
                [(
                    header::CONTENT_TYPE,
                    HeaderValue::from_static(MIME_APPLICATION_JSON_CHARSET_UTF8),
                )],
                body,
            )
                .into_response()
        }
        Err(e) => {
            error!("Failed to encode response body: {}", e);
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

/// Render any error as an error document.
///
/// A `Cause` anywhere in the chain is rendered as is; anything else is classified as a
/// backend error first.
pub fn error_json<E>(err: E) -> Response
where
    E: Into<BoxError>,
{
    let mut cause = Cause::promote(err);
    if cause.is_zero() {
        warn!("Refusing to render an uninitialized cause, substituting an internal error");
        cause = Cause::new("uninitialized error", ErrorCase::BackendError);
    }

    let status =
        StatusCode::from_u16(cause.code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

    if status.is_server_error() {
        error!(
            code = cause.code(),
            status = %cause.status(),
            reason = %cause.reason(),
            details = cause.details().len(),
            "{}", cause
        );
    } else {
        warn!(
            code = cause.code(),
            status = %cause.status(),
            reason = %cause.reason(),
            details = cause.details().len(),
            "{}", cause
        );
    }

    // Labels are bounded: the HTTP status actually sent, and a known status or "other".
    ERROR_RESPONSES_TOTAL
        .with_label_values(&[
            status.as_str(),
            known_status(cause.status()).unwrap_or(OTHER_STATUS_LABEL),
        ])
        .inc();

    json(status, &cause)
}

impl IntoResponse for Cause {
    fn into_response(self) -> Response {
        error_json(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Value;

    #[derive(Debug, thiserror::Error)]
    #[error("handler failed")]
    struct HandlerError {
        #[source]
        cause: Cause,
    }

    async fn body_json(response: Response) -> Value {
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&body).unwrap()
    }

    #[tokio::test]
    async fn test_json_sets_status_and_content_type() {
        let response = json(StatusCode::CREATED, &serde_json::json!({"ok": true}));
        assert_eq!(response.status(), StatusCode::CREATED);
        assert_eq!(
            response.headers()[header::CONTENT_TYPE],
            MIME_APPLICATION_JSON_CHARSET_UTF8
        );

        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        assert_eq!(&body[..], b"{\"ok\":true}\n");
    }

    #[tokio::test]
    async fn test_plain_error_renders_as_internal() {
        let response = error_json("database is on fire");
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let body = body_json(response).await;
        assert_eq!(body["error"]["code"], 500);
        assert_eq!(body["error"]["status"], "INTERNAL");
        assert_eq!(body["error"]["message"], "database is on fire");
        assert_eq!(body["error"]["details"][0]["Reason"], "backendError");
    }

    #[tokio::test]
    async fn test_cause_keeps_its_status() {
        let mut cause = Cause::new("maintenance", ErrorCase::Unavailable);
        cause.append(Cause::new("disk full", ErrorCase::BackendError));

        let response = cause.into_response();
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);

        let body = body_json(response).await;
        assert_eq!(body["error"]["status"], "UNAVAILABLE");
        assert_eq!(body["error"]["details"].as_array().unwrap().len(), 2);
        assert_eq!(body["error"]["details"][1]["Message"], "disk full");
    }

    #[tokio::test]
    async fn test_wrapped_cause_is_found_in_chain() {
        let response = error_json(HandlerError {
            cause: Cause::new("no such user", ErrorCase::NotFound),
        });
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let body = body_json(response).await;
        assert_eq!(body["error"]["status"], "NOT_FOUND");
        assert_eq!(body["error"]["message"], "no such user");
    }

    #[tokio::test]
    async fn test_zero_cause_is_replaced() {
        let response = Cause::default().into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let body = body_json(response).await;
        assert_eq!(body["error"]["status"], "INTERNAL");
        assert_eq!(body["error"]["message"], "uninitialized error");
    }

    #[test]
    fn test_unknown_status_is_counted_as_other() {
        let other = ERROR_RESPONSES_TOTAL.with_label_values(&["500", OTHER_STATUS_LABEL]);
        let before = other.get();

        let _ = Cause::with_status("spoofed", 1000, "SPOOFED_STATUS_7", "r").into_response();
        let _ = Cause::with_status("spoofed", 599, "SPOOFED_STATUS_8", "r").into_response();

        assert!(other.get() >= before + 1);
        assert!(ERROR_RESPONSES_TOTAL
            .with_label_values(&["599", OTHER_STATUS_LABEL])
            .get()
            >= 1);

        let families = prometheus::gather();
        let leaked = families
            .iter()
            .filter(|family| family.get_name() == "error_responses_total")
            .flat_map(|family| family.get_metric())
            .flat_map(|metric| metric.get_label())
            .any(|label| {
                label.get_value().starts_with("SPOOFED_STATUS") || label.get_value() == "1000"
            });
        assert!(!leaked);
    }

    #[tokio::test]
    async fn test_out_of_range_code_falls_back_to_500() {
        let cause = Cause::with_status("odd", 1000, "ODD", "odd");
        let response = cause.into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let body = body_json(response).await;
        assert_eq!(body["error"]["code"], 1000);
    }
}
