// HTTP route handlers for the judge API

use arena_common::types::{Language, Submission};
use arena_engine::JudgeError;
use axum::{
    body::Bytes,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde::Serialize;
use std::sync::Arc;
use std::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

use crate::metrics::{self, Outcome};
use crate::AppState;

/// Body of every non-200 answer.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub success: bool,
    pub error: String,
}

fn error_response(status: StatusCode, error: impl Into<String>) -> Response {
    (
        status,
        Json(ErrorResponse {
            success: false,
            error: error.into(),
        }),
    )
        .into_response()
}

/// POST / and POST /compile-code - Judge a submission synchronously
///
/// The body is parsed as JSON whatever its Content-Type says.
pub async fn compile_code(State(state): State<Arc<AppState>>, body: Bytes) -> Response {
    let submission: Submission = match serde_json::from_slice(&body) {
        Ok(submission) => submission,
        Err(e) => {
            warn!(error = %e, "Rejected malformed submission");
            metrics::record_submission(None, Outcome::Invalid);
            return error_response(StatusCode::BAD_REQUEST, format!("Invalid request body: {}", e));
        }
    };

    info!(
        language = %submission.language,
        challenge_id = %submission.challenge_id,
        code_bytes = submission.code.len(),
        "Submission received"
    );

    // Client gone: this future is dropped, the guard cancels the token and
    // the executor kills the running process group.
    let cancel = CancellationToken::new();
    let guard = cancel.clone().drop_guard();
    let judge = state.judge.clone();
    let language = Language::from_str(&submission.language);
    let started = Instant::now();
    let task = tokio::spawn(async move { judge.judge(&submission, &cancel).await });

    let outcome = task.await;
    guard.disarm();

    match outcome {
        Ok(Ok(run)) => {
            metrics::record_run(&run, started.elapsed());
            let label = if run.report.success {
                Outcome::Accepted
            } else {
                Outcome::Rejected
            };
            metrics::record_submission(Some(run.language), label);
            (StatusCode::OK, Json(run.report)).into_response()
        }
        Ok(Err(e)) if e.is_client_error() => {
            info!(error = %e, "Submission rejected");
            metrics::record_submission(language, Outcome::Invalid);
            error_response(StatusCode::BAD_REQUEST, e.to_string())
        }
        Ok(Err(JudgeError::Cancelled)) => {
            metrics::record_submission(language, Outcome::Cancelled);
            error_response(StatusCode::INTERNAL_SERVER_ERROR, JudgeError::Cancelled.to_string())
        }
        Ok(Err(e)) => {
            error!(error = %e, "Judging failed");
            metrics::record_submission(language, Outcome::Error);
            error_response(StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
        }
        Err(e) => {
            error!(error = %e, "Judge task panicked");
            metrics::record_submission(language, Outcome::Error);
            error_response(StatusCode::INTERNAL_SERVER_ERROR, "Internal error")
        }
    }
}

/// OPTIONS - CORS preflight without the Access-Control-Request-Method header
pub async fn preflight() -> StatusCode {
    StatusCode::OK
}

/// GET /health - Health check endpoint
pub async fn health_check() -> impl IntoResponse {
    (StatusCode::OK, "OK")
}

/// GET /metrics - Prometheus exposition
pub async fn metrics_handler() -> Response {
    match metrics::gather() {
        Ok(text) => (
            StatusCode::OK,
            [("content-type", "text/plain; version=0.0.4")],
            text,
        )
            .into_response(),
        Err(e) => {
            error!(error = %e, "Failed to encode metrics");
            (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()).into_response()
        }
    }
}
