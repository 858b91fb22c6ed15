//! # Sistema de Jobs
//!
//! Capa de coordinación asíncrona: admite lotes, los ejecuta en un pool
//! fijo de workers CPU-bound y permite consultar estado y resultado sin
//! bloquear a quien pregunta.
//!
//! ## Endpoints
//!
//! - `POST /submit` - Encolar un lote
//! - `GET /status/{job_id}` - Consultar estado
//! - `GET /result/{job_id}` - Obtener resultado
//! - `GET /health` - Tamaño del pool

pub mod coordinator;
pub mod error;
pub mod handlers;
pub mod pool;
pub mod registry;
pub mod types;

pub use coordinator::{CoordinatorConfig, JobCoordinator};
pub use error::JobError;
pub use registry::JobRegistry;
pub use types::{Job, JobId, JobOutcome, JobSnapshot, JobStatus};
