use utoipa::OpenApi;

use crate::api::handlers::{CaseView, CauseInput, RenderRequest};
use crate::errors::{Detail, ErrorBody, ErrorCase, ErrorResponse};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "API Error Envelope",
        version = "0.1.0",
        description = "Structured error documents for service APIs: an HTTP status, a machine status code and the ordered trail of every contributing failure.",
    ),
    paths(
        crate::api::handlers::health,
        crate::api::handlers::list_cases,
        crate::api::handlers::render_case,
        crate::api::handlers::merge_envelopes,
    ),
    components(
        schemas(
            ErrorResponse,
            ErrorBody,
            Detail,
            ErrorCase,
            CaseView,
            CauseInput,
            RenderRequest,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "cases", description = "Classification table and rendering"),
        (name = "envelopes", description = "Error document merging"),
    )
)]
pub struct ApiDoc;
