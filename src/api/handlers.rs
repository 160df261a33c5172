use axum::{
    extract::{Path, State},
    http::{StatusCode, Uri},
    response::{IntoResponse, Json, Response},
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Instant;
use tracing::info;
use utoipa::ToSchema;

use super::binder::JsonBody;
use super::render;
use crate::errors::{Cause, ErrorCase, ErrorResponse};

lazy_static::lazy_static! {
    static ref START_TIME: Instant = Instant::now();
}

pub type AppState = Arc<AppStateInner>;

pub struct AppStateInner {
    pub instance_id: String,
}

/// One row of the classification table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct CaseView {
    /// Case name, usable in `/cases/{name}/render`
    pub name: ErrorCase,
    /// HTTP status code
    pub code: u16,
    /// Machine status code
    pub status: String,
    /// Reason code of the first detail
    pub reason: String,
}

impl From<ErrorCase> for CaseView {
    fn from(case: ErrorCase) -> Self {
        Self {
            name: case,
            code: case.code(),
            status: case.status().to_string(),
            reason: case.reason().to_string(),
        }
    }
}

/// A contributing failure: free text, or a complete error document
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(untagged)]
pub enum CauseInput {
    Text(String),
    Document(ErrorResponse),
}

/// Body of a render request
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct RenderRequest {
    /// Message of the originating error
    pub message: String,
    /// Failures appended after construction, in order
    #[serde(default)]
    pub causes: Vec<CauseInput>,
}

/// Health check endpoint
#[utoipa::path(
    get,
    path = "/health",
    tag = "health",
    responses(
        (status = 200, description = "Service is healthy", body = serde_json::Value)
    )
)]
pub async fn health(State(state): State<AppState>) -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "healthy",
        "service": "api-envelope",
        "version": env!("CARGO_PKG_VERSION"),
        "instance_id": state.instance_id,
        "uptime_seconds": START_TIME.elapsed().as_secs(),
    }))
}

/// List the classification table
#[utoipa::path(
    get,
    path = "/cases",
    tag = "cases",
    responses(
        (status = 200, description = "Every predefined case", body = [CaseView])
    )
)]
pub async fn list_cases() -> Response {
    let cases: Vec<CaseView> = ErrorCase::ALL.into_iter().map(CaseView::from).collect();
    render::json(StatusCode::OK, &cases)
}

/// Build an error of the named case and render it
#[utoipa::path(
    post,
    path = "/cases/{name}/render",
    tag = "cases",
    params(
        ("name" = ErrorCase, Path, description = "Case name, e.g. not_found")
    ),
    request_body = RenderRequest,
    responses(
        (status = "4XX", description = "Rendered error, or the request was invalid", body = ErrorResponse),
        (status = "5XX", description = "Rendered error", body = ErrorResponse)
    )
)]
pub async fn render_case(
    Path(name): Path<String>,
    JsonBody(req): JsonBody<RenderRequest>,
) -> Cause {
    let Some(case) = ErrorCase::from_name(&name) else {
        return Cause::new(format!("unknown case: {}", name), ErrorCase::NotFound);
    };

    info!(case = %case, causes = req.causes.len(), "Rendering case");

    let mut cause = Cause::new(req.message, case);
    for input in req.causes {
        match input {
            CauseInput::Text(message) => cause.append(message),
            CauseInput::Document(document) => cause.merge(document),
        }
    }
    cause
}

/// Merge error documents, first one outermost, and render the result
#[utoipa::path(
    post,
    path = "/envelopes/merge",
    tag = "envelopes",
    request_body = [ErrorResponse],
    responses(
        (status = "4XX", description = "Merged error, or the request was invalid", body = ErrorResponse),
        (status = "5XX", description = "Merged error", body = ErrorResponse)
    )
)]
pub async fn merge_envelopes(JsonBody(documents): JsonBody<Vec<ErrorResponse>>) -> Cause {
    if documents.is_empty() {
        return Cause::new("at least one error document is required", ErrorCase::BadRequest);
    }

    info!(documents = documents.len(), "Merging error documents");

    let mut cause = Cause::default();
    for document in documents {
        cause.merge(document);
    }
    cause
}

/// Fallback for unknown routes
pub async fn not_found(uri: Uri) -> Cause {
    Cause::new(format!("no route for {}", uri.path()), ErrorCase::NotFound)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_case_view_from_case() {
        let view = CaseView::from(ErrorCase::ResourceExhausted);
        assert_eq!(view.code, 429);
        assert_eq!(view.status, "RESOURCE_EXHAUSTED");
        assert_eq!(view.reason, "userRateLimitExceeded");

        let json = serde_json::to_value(&view).unwrap();
        assert_eq!(json["name"], "resource_exhausted");
    }

    #[test]
    fn test_cause_input_untagged() {
        let text: CauseInput = serde_json::from_str("\"timeout\"").unwrap();
        assert!(matches!(text, CauseInput::Text(ref s) if s == "timeout"));

        let document: CauseInput = serde_json::from_value(serde_json::json!({
            "error": {"code": 404, "status": "NOT_FOUND", "message": "gone",
                      "details": [{"Reason": "notFound", "Message": "gone"}]}
        }))
        .unwrap();
        assert!(matches!(document, CauseInput::Document(_)));
    }

    #[tokio::test]
    async fn test_render_case_unknown_name() {
        let cause = render_case(
            Path("teapot".to_string()),
            JsonBody(RenderRequest {
                message: "x".to_string(),
                causes: vec![],
            }),
        )
        .await;
        assert_eq!(cause.code(), 404);
        assert_eq!(cause.message(), "unknown case: teapot");
    }

    #[tokio::test]
    async fn test_render_case_appends_in_order() {
        let cause = render_case(
            Path("unavailable".to_string()),
            JsonBody(RenderRequest {
                message: "maintenance".to_string(),
                causes: vec![CauseInput::Text("disk full".to_string())],
            }),
        )
        .await;
        assert_eq!(cause.code(), 503);
        assert_eq!(cause.details().len(), 2);
        assert_eq!(cause.details()[1].reason, "backendError");
    }

    #[tokio::test]
    async fn test_merge_envelopes_empty_is_bad_request() {
        let cause = merge_envelopes(JsonBody(vec![])).await;
        assert_eq!(cause.code(), 400);
    }
}
