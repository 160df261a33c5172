//! Request body decoding that reports failures as bad-request causes

use std::io::Read;

use axum::{
    async_trait,
    body::Bytes,
    extract::{FromRequest, Request},
};
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::errors::codes::{REASON_BAD_REQUEST, STATUS_BAD_REQUEST};
use crate::errors::{Cause, ErrorCase};

/// Decode a JSON value from `body`.
pub fn from_reader<T, R>(body: R) -> Result<T, Cause>
where
    T: DeserializeOwned,
    R: Read,
{
    serde_json::from_reader(body).map_err(|e| Cause::new(e, ErrorCase::BadRequest))
}

/// Decode a JSON value from an in-memory body.
pub fn from_slice<T>(body: &[u8]) -> Result<T, Cause>
where
    T: DeserializeOwned,
{
    serde_json::from_slice(body).map_err(|e| Cause::new(e, ErrorCase::BadRequest))
}

/// JSON body extractor whose rejection is a bad-request [`Cause`].
///
/// Unlike `axum::Json` it does not look at the `Content-Type` header. A body that cannot be
/// read keeps the HTTP status of the read failure (e.g. 413 past the body limit) with the
/// bad-request status and reason codes; a body that is not valid JSON is a plain 400.
#[derive(Debug, Clone)]
pub struct JsonBody<T>(pub T);

#[async_trait]
impl<T, S> FromRequest<S> for JsonBody<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = Cause;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let bytes = Bytes::from_request(req, state)
            .await
            .map_err(|rejection| {
                let code = rejection.status().as_u16();
                Cause::with_status(rejection, code, STATUS_BAD_REQUEST, REASON_BAD_REQUEST)
            })?;

        match from_slice(&bytes) {
            Ok(value) => Ok(JsonBody(value)),
            Err(cause) => {
                debug!(bytes = bytes.len(), "Rejecting request body: {}", cause);
                Err(cause)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::Request;
    use serde::Deserialize;

    #[derive(Debug, Deserialize, PartialEq)]
    struct Payload {
        name: String,
        count: u32,
    }

    #[test]
    fn test_from_reader_ok() {
        let body = br#"{"name": "widget", "count": 4}"#;
        let payload: Payload = from_reader(&body[..]).unwrap();
        assert_eq!(
            payload,
            Payload {
                name: "widget".to_string(),
                count: 4
            }
        );
    }

    #[test]
    fn test_malformed_json_is_bad_request() {
        let cause = from_reader::<Payload, _>(&b"{\"name\": "[..]).unwrap_err();
        assert_eq!(cause.code(), 400);
        assert_eq!(cause.status(), "INVALID_ARGUMENT");
        assert_eq!(cause.reason(), "badRequest");
        assert!(cause
            .underlying()
            .unwrap()
            .downcast_ref::<serde_json::Error>()
            .is_some());
    }

    #[test]
    fn test_wrong_shape_is_bad_request() {
        let cause = from_slice::<Payload>(br#"{"name": "x", "count": -1}"#).unwrap_err();
        assert_eq!(cause.code(), 400);
        assert_eq!(cause.details().len(), 1);
        assert_eq!(cause.details()[0].message, cause.message());
    }

    #[tokio::test]
    async fn test_extractor_accepts_body_without_content_type() {
        let req = Request::builder()
            .method("POST")
            .uri("/")
            .body(Body::from(r#"{"name": "a", "count": 1}"#))
            .unwrap();

        let JsonBody(payload) = JsonBody::<Payload>::from_request(req, &()).await.unwrap();
        assert_eq!(payload.count, 1);
    }

    #[tokio::test]
    async fn test_extractor_rejects_malformed_body() {
        let req = Request::builder()
            .method("POST")
            .uri("/")
            .body(Body::from("not json"))
            .unwrap();

        let cause = JsonBody::<Payload>::from_request(req, &())
            .await
            .unwrap_err();
        assert_eq!(cause.code(), 400);
        assert_eq!(cause.status(), "INVALID_ARGUMENT");
    }

    #[tokio::test]
    async fn test_oversized_body_keeps_payload_too_large() {
        use axum::{extract::DefaultBodyLimit, http::StatusCode, routing::post, Router};
        use tower::Service;

        async fn accept(JsonBody(_): JsonBody<serde_json::Value>) -> StatusCode {
            StatusCode::OK
        }

        let mut app = Router::new()
            .route("/", post(accept))
            .layer(DefaultBodyLimit::max(16));

        let req = Request::builder()
            .method("POST")
            .uri("/")
            .body(Body::from(format!("{{\"name\": \"{}\"}}", "x".repeat(64))))
            .unwrap();

        let response = app.call(req).await.unwrap();
        assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);

        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(body["error"]["code"], 413);
        assert_eq!(body["error"]["status"], "INVALID_ARGUMENT");
        assert_eq!(body["error"]["details"][0]["Reason"], "badRequest");
    }
}
