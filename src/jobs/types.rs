//! # Tipos y Estructuras para el Sistema de Jobs
//! src/jobs/types.rs
//!
//! Define el registro de un job, su estado y las vistas de solo lectura
//! que se entregan a quien consulta.

use crate::commands::BatchResult;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Identificador de un job (UUID v4 en texto)
pub type JobId = String;

/// Estado de un job
///
/// `Running` no existe como estado observable: un job pasa de `Queued`
/// directamente a uno de los dos estados terminales.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    /// Job admitido, esperando o ejecutándose en el pool
    Queued,

    /// Job completado con resultado
    Finished,

    /// El cómputo falló; el detalle queda en `error`
    Failed,
}

impl JobStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            JobStatus::Queued => "queued",
            JobStatus::Finished => "finished",
            JobStatus::Failed => "failed",
        }
    }

    /// Verifica si el estado es terminal
    pub fn is_terminal(&self) -> bool {
        matches!(self, JobStatus::Finished | JobStatus::Failed)
    }
}

impl std::fmt::Display for JobStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Registro completo de un job
///
/// Solo el registro lo modifica después de crearlo. `result` y `error` son
/// excluyentes y solo se llenan en la transición terminal.
#[derive(Debug, Clone)]
pub struct Job {
    pub id: JobId,
    pub status: JobStatus,
    pub submitted_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
    pub result: Option<BatchResult>,
    pub error: Option<String>,
}

impl Job {
    /// Crea un job recién admitido
    pub fn new(id: JobId) -> Self {
        Self {
            id,
            status: JobStatus::Queued,
            submitted_at: Utc::now(),
            finished_at: None,
            result: None,
            error: None,
        }
    }

    /// Marca el job como completado
    pub fn mark_finished(&mut self, result: BatchResult) {
        self.status = JobStatus::Finished;
        self.result = Some(result);
        self.finished_at = Some(Utc::now());
    }

    /// Marca el job como fallido
    pub fn mark_failed(&mut self, error: String) {
        self.status = JobStatus::Failed;
        self.error = Some(error);
        self.finished_at = Some(Utc::now());
    }

    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }

    /// Vista para `status`: todo menos el resultado
    pub fn snapshot(&self) -> JobSnapshot {
        JobSnapshot {
            job_id: self.id.clone(),
            status: self.status,
            submitted_at: self.submitted_at,
            finished_at: self.finished_at,
            error: self.error.clone(),
        }
    }

    /// Vista para `result`
    pub fn outcome(&self) -> JobOutcome {
        match (&self.status, &self.result) {
            (JobStatus::Finished, Some(result)) => JobOutcome::Ready {
                result: result.clone(),
            },
            _ => JobOutcome::Pending {
                status: self.status,
            },
        }
    }
}

/// Foto de solo lectura del estado de un job
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct JobSnapshot {
    pub job_id: JobId,
    pub status: JobStatus,
    pub submitted_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub finished_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Respuesta de `result`
///
/// Consultar antes de que el job termine no es un error: se retorna el
/// estado actual sin resultado.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum JobOutcome {
    Ready { result: BatchResult },
    Pending { status: JobStatus },
}
