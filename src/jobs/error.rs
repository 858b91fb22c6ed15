//! # Errores del sistema de jobs
//! src/jobs/error.rs

use crate::jobs::types::JobId;

/// Errores que el coordinador reporta a quien lo llama
///
/// `ComputationFailed` nunca se retorna desde `submit`: se captura en el
/// worker y queda guardado como texto en el campo `error` del job.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum JobError {
    /// El lote no trae ningún valor
    #[error("numbers must be a non-empty list")]
    EmptyInput,

    /// El pool no se inicializó o ya fue apagado
    #[error("worker pool is not available")]
    PoolUnavailable,

    /// Ningún job con ese ID fue creado por este proceso
    #[error("job not found: {0}")]
    NotFound(JobId),

    /// El cómputo entró en pánico dentro del worker
    #[error("computation failed: {0}")]
    ComputationFailed(String),
}
