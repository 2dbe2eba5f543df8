//! HTTP boundary
//!
//! Routes:
//! - `GET /helloz` - liveness probe, 204
//! - `POST /eval` - evaluate one submission
//!
//! The request body is read through a bounded streaming accumulator: the
//! instant the configured ceiling is crossed, reading stops and the request
//! is rejected, before any workspace exists.

use std::sync::Arc;

use axum::{
    body::Body,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use futures::StreamExt;
use tower_http::compression::CompressionLayer;
use tower_http::cors::CorsLayer;
use tracing::{error, info_span, warn, Instrument};
use uuid::Uuid;

use crate::config::Config;
use crate::eval::{self, Submission};
use crate::sandbox::Checker;

/// Shared server state
#[derive(Clone)]
pub struct AppState {
    pub checker: Arc<dyn Checker>,
    pub config: Arc<Config>,
}

// ---- Error Handling ----

struct AppError(crate::Error);

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        // Infrastructure failures are reported generically; no partial state
        // reaches the caller.
        error!("Evaluation failed: {}", self.0);
        StatusCode::INTERNAL_SERVER_ERROR.into_response()
    }
}

// ---- Body Ingestion ----

enum BodyError {
    TooLarge,
    Read(axum::Error),
}

/// Accumulate the request body, halting the instant `limit` is crossed.
async fn read_body_limited(body: Body, limit: usize) -> Result<Vec<u8>, BodyError> {
    let mut stream = body.into_data_stream();
    let mut buf: Vec<u8> = Vec::new();

    while let Some(chunk) = stream.next().await {
        let chunk = chunk.map_err(BodyError::Read)?;
        if buf.len() + chunk.len() > limit {
            return Err(BodyError::TooLarge);
        }
        buf.extend_from_slice(&chunk);
    }

    Ok(buf)
}

// ---- Handlers ----

async fn helloz() -> StatusCode {
    StatusCode::NO_CONTENT
}

async fn eval_handler(State(state): State<AppState>, body: Body) -> Response {
    let bytes = match read_body_limited(body, state.config.server.max_body_bytes).await {
        Ok(bytes) => bytes,
        Err(BodyError::TooLarge) => {
            warn!(
                limit = state.config.server.max_body_bytes,
                "Rejected oversized submission"
            );
            return StatusCode::PAYLOAD_TOO_LARGE.into_response();
        }
        Err(BodyError::Read(e)) => {
            warn!("Failed to read request body: {}", e);
            return StatusCode::BAD_REQUEST.into_response();
        }
    };

    let submission = match Submission::from_bytes(&bytes) {
        Ok(submission) => submission,
        Err(e) => {
            warn!("Malformed submission: {}", e);
            return StatusCode::BAD_REQUEST.into_response();
        }
    };

    let invocation = Uuid::new_v4();
    let span = info_span!("eval", %invocation);

    let result = eval::evaluate(
        state.checker.as_ref(),
        &state.config.checker.workspace_root,
        state.config.decoder.token_placement,
        &submission,
    )
    .instrument(span)
    .await;

    match result {
        Ok(response) => Json(response).into_response(),
        Err(e) => AppError(e).into_response(),
    }
}

// ---- Router ----

/// Build the service router
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/helloz", get(helloz))
        .route("/eval", post(eval_handler))
        .with_state(state)
        .layer(CorsLayer::permissive())
        .layer(CompressionLayer::new())
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use axum::http::Request;
    use std::path::Path;
    use tempfile::TempDir;
    use tower::ServiceExt;

    use crate::error::Error;
    use crate::sandbox::{ExitDisposition, RawRun};

    /// Emits a conformant transcript bracketing `OK.` for whatever view path
    /// the pipeline persisted.
    struct EchoChecker;

    #[async_trait]
    impl Checker for EchoChecker {
        async fn run(&self, _prelude: &Path, view: &Path) -> crate::Result<RawRun> {
            let transcript = [
                "Twelf 1.7.1+".to_string(),
                "%% OK %%".to_string(),
                "%% OK %%".to_string(),
                "%% OK %%".to_string(),
                "%% OK %%".to_string(),
                format!("[Opening file {}]", view.display()),
                "OK.".to_string(),
                format!("[Closing file {}]", view.display()),
                "%% OK %%".to_string(),
            ]
            .join("\n");

            Ok(RawRun {
                stdout: transcript,
                stderr: String::new(),
                disposition: ExitDisposition::Clean,
            })
        }
    }

    struct BrokenChecker;

    #[async_trait]
    impl Checker for BrokenChecker {
        async fn run(&self, _prelude: &Path, _view: &Path) -> crate::Result<RawRun> {
            Err(Error::Checker("spawn failed".to_string()))
        }
    }

    fn test_router(checker: Arc<dyn Checker>, root: &TempDir, max_body_bytes: usize) -> Router {
        let mut config = Config::default();
        config.checker.workspace_root = root.path().to_path_buf();
        config.server.max_body_bytes = max_body_bytes;

        build_router(AppState {
            checker,
            config: Arc::new(config),
        })
    }

    async fn body_json(response: Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_helloz() {
        let root = TempDir::new().unwrap();
        let router = test_router(Arc::new(EchoChecker), &root, 250_000);

        let response = router
            .oneshot(Request::get("/helloz").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NO_CONTENT);
    }

    #[tokio::test]
    async fn test_helloz_rejects_post() {
        let root = TempDir::new().unwrap();
        let router = test_router(Arc::new(EchoChecker), &root, 250_000);

        let response = router
            .oneshot(Request::post("/helloz").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
    }

    #[tokio::test]
    async fn test_unknown_route() {
        let root = TempDir::new().unwrap();
        let router = test_router(Arc::new(EchoChecker), &root, 250_000);

        let response = router
            .oneshot(Request::get("/nope").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_eval_rejects_get() {
        let root = TempDir::new().unwrap();
        let router = test_router(Arc::new(EchoChecker), &root, 250_000);

        let response = router
            .oneshot(Request::get("/eval").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
    }

    #[tokio::test]
    async fn test_eval_empty_prelude_success() {
        let root = TempDir::new().unwrap();
        let router = test_router(Arc::new(EchoChecker), &root, 250_000);

        let response = router
            .oneshot(
                Request::post("/eval")
                    .body(Body::from("\0o : type.".as_bytes().to_vec()))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let json = body_json(response).await;
        assert_eq!(json["preludeLoaded"], true);
        assert_eq!(json["killed"], false);
        assert_eq!(json["output"], "OK.");
        assert_eq!(json["server"], "%% OK %%");
    }

    #[tokio::test]
    async fn test_eval_oversized_body_leaves_no_state() {
        let root = TempDir::new().unwrap();
        let router = test_router(Arc::new(EchoChecker), &root, 64);

        let response = router
            .oneshot(
                Request::post("/eval")
                    .body(Body::from(vec![b'x'; 65]))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);

        // No workspace was ever created
        let leftovers: Vec<_> = std::fs::read_dir(root.path()).unwrap().collect();
        assert!(leftovers.is_empty());
    }

    #[tokio::test]
    async fn test_eval_body_at_ceiling_is_accepted() {
        let root = TempDir::new().unwrap();
        let router = test_router(Arc::new(EchoChecker), &root, 64);

        let response = router
            .oneshot(
                Request::post("/eval")
                    .body(Body::from(vec![b'x'; 64]))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_eval_three_segments_is_malformed() {
        let root = TempDir::new().unwrap();
        let router = test_router(Arc::new(EchoChecker), &root, 250_000);

        let response = router
            .oneshot(
                Request::post("/eval")
                    .body(Body::from(b"a\0b\0c".to_vec()))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let leftovers: Vec<_> = std::fs::read_dir(root.path()).unwrap().collect();
        assert!(leftovers.is_empty());
    }

    #[tokio::test]
    async fn test_eval_infrastructure_error_is_500() {
        let root = TempDir::new().unwrap();
        let router = test_router(Arc::new(BrokenChecker), &root, 250_000);

        let response = router
            .oneshot(
                Request::post("/eval")
                    .body(Body::from(b"o : type.".to_vec()))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let leftovers: Vec<_> = std::fs::read_dir(root.path()).unwrap().collect();
        assert!(leftovers.is_empty());
    }
}
