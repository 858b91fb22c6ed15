//! # Handlers HTTP para Jobs
//! src/jobs/handlers.rs
//!
//! Endpoints del servicio:
//! - `POST /submit`
//! - `GET /status/{job_id}`
//! - `GET /result/{job_id}`
//! - `GET /health`

use crate::http::{Method, Request, Response, StatusCode};
use crate::jobs::coordinator::JobCoordinator;
use crate::jobs::error::JobError;
use crate::router::Router;
use serde::Deserialize;
use tracing::debug;

/// Body de `POST /submit`
#[derive(Debug, Deserialize)]
pub struct SubmitPayload {
    pub numbers: Vec<i64>,
}

/// Router con todas las rutas del servicio de jobs
pub fn job_router() -> Router<JobCoordinator> {
    let mut router = Router::new();
    router.register(Method::POST, "/submit", submit_handler);
    router.register(Method::GET, "/status/{job_id}", status_handler);
    router.register(Method::GET, "/result/{job_id}", result_handler);
    router.register(Method::GET, "/health", health_handler);
    router
}

/// Traduce un error del coordinador a su respuesta HTTP
pub fn error_response(error: &JobError) -> Response {
    match error {
        JobError::EmptyInput => Response::error(StatusCode::BadRequest, &error.to_string()),
        JobError::PoolUnavailable => Response::error(StatusCode::ServiceUnavailable, "Server not ready")
            .with_header("Retry-After", "5"),
        JobError::NotFound(_) => Response::error(StatusCode::NotFound, "Job not found"),
        JobError::ComputationFailed(_) => {
            Response::error(StatusCode::InternalServerError, &error.to_string())
        }
    }
}

/// Handler para `POST /submit`
///
/// # Ejemplo de request
/// ```json
/// {"numbers": [3, 10, 40]}
/// ```
///
/// # Ejemplo de response
/// ```json
/// {"job_id": "5f0c..."}
/// ```
pub fn submit_handler(req: &Request, coordinator: &JobCoordinator) -> Response {
    let payload: SubmitPayload = match req.json() {
        Ok(payload) => payload,
        Err(e) if e.is_syntax() || e.is_eof() => {
            return Response::error(StatusCode::BadRequest, &format!("Invalid JSON body: {}", e));
        }
        Err(e) => {
            return Response::error(
                StatusCode::UnprocessableEntity,
                &format!("Invalid payload: {}", e),
            );
        }
    };

    match coordinator.submit(payload.numbers) {
        Ok(job_id) => Response::json(StatusCode::Ok, &serde_json::json!({ "job_id": job_id })),
        Err(error) => {
            debug!(%error, "submit rejected");
            error_response(&error)
        }
    }
}

/// Handler para `GET /status/{job_id}`
///
/// # Ejemplo de response
/// ```json
/// {"job_id": "5f0c...", "status": "finished",
///  "submitted_at": "2026-01-01T00:00:00Z", "finished_at": "2026-01-01T00:00:01Z"}
/// ```
pub fn status_handler(req: &Request, coordinator: &JobCoordinator) -> Response {
    let job_id = req.path_param("job_id").unwrap_or_default();

    match coordinator.status(job_id) {
        Ok(snapshot) => Response::json(StatusCode::Ok, &snapshot),
        Err(error) => error_response(&error),
    }
}

/// Handler para `GET /result/{job_id}`
///
/// Si el job terminó: `{"result": {"3": 2, "10": 55}}`.
/// Si no: `{"status": "queued"}` con 200; no es un error.
pub fn result_handler(req: &Request, coordinator: &JobCoordinator) -> Response {
    let job_id = req.path_param("job_id").unwrap_or_default();

    match coordinator.result(job_id) {
        Ok(outcome) => Response::json(StatusCode::Ok, &outcome),
        Err(error) => error_response(&error),
    }
}

/// Handler para `GET /health`
///
/// # Ejemplo de response
/// ```json
/// {"status": "ok", "cpu_workers": 7, "ready": true}
/// ```
pub fn health_handler(_req: &Request, coordinator: &JobCoordinator) -> Response {
    Response::json(
        StatusCode::Ok,
        &serde_json::json!({
            "status": "ok",
            "cpu_workers": coordinator.capacity(),
            "ready": coordinator.is_ready(),
        }),
    )
}
