use crate::error::ApiError;
use crate::AppState;
use axum::{body::Bytes, extract::State, Json};
use runbox_sandbox::{ExecutionRequest, ExecutionResponse};
use tracing::debug;

/// `POST /execute`
///
/// The body is parsed here rather than through the `Json` extractor so a
/// malformed body produces the same response shape as any other protocol
/// error, whatever its content type.
pub(super) async fn execute(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<ExecutionResponse>, ApiError> {
    let request = ExecutionRequest::from_json(&body).map_err(|e| {
        debug!(body_len = body.len(), error = %e, "Rejected malformed request");
        e
    })?;

    let outcome = state.service.handle(request).await?;
    Ok(Json(ExecutionResponse::from(outcome)))
}
