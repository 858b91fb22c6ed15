//! # Registro de Jobs
//! src/jobs/registry.rs
//!
//! Almacén en memoria, thread-safe, de todos los jobs del proceso. Es la
//! única fuente de verdad para `status` y `result`, y el único componente
//! que modifica un job después de crearlo. No hay persistencia: al
//! reiniciar el proceso los jobs se pierden.

use crate::commands::BatchResult;
use crate::jobs::types::{Job, JobId, JobOutcome, JobSnapshot};
use chrono::Utc;
use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use uuid::Uuid;

/// Registro compartido de jobs
///
/// Clonar el registro comparte el mismo mapa interno.
#[derive(Clone, Default)]
pub struct JobRegistry {
    jobs: Arc<Mutex<HashMap<JobId, Job>>>,
}

impl JobRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Un pánico con el lock tomado no deja el mapa a medio escribir: cada
    /// operación hace una sola inserción o asignación.
    fn lock(&self) -> MutexGuard<'_, HashMap<JobId, Job>> {
        self.jobs.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Crea un job nuevo en estado `Queued` y retorna su ID
    pub fn create(&self) -> JobId {
        let mut jobs = self.lock();

        loop {
            let id = Uuid::new_v4().to_string();
            if let Entry::Vacant(slot) = jobs.entry(id.clone()) {
                slot.insert(Job::new(id.clone()));
                return id;
            }
        }
    }

    /// Aplica la transición terminal de un job
    ///
    /// Retorna `false` si el job no existe o ya estaba en estado terminal;
    /// en ese caso no se modifica nada.
    pub fn complete(&self, job_id: &str, outcome: Result<BatchResult, String>) -> bool {
        let mut jobs = self.lock();

        let Some(job) = jobs.get_mut(job_id) else {
            return false;
        };
        if job.is_terminal() {
            return false;
        }

        match outcome {
            Ok(result) => job.mark_finished(result),
            Err(error) => job.mark_failed(error),
        }
        true
    }

    /// Obtiene la foto de estado de un job
    pub fn snapshot(&self, job_id: &str) -> Option<JobSnapshot> {
        self.lock().get(job_id).map(Job::snapshot)
    }

    /// Obtiene el resultado (o el estado actual) de un job
    pub fn outcome(&self, job_id: &str) -> Option<JobOutcome> {
        self.lock().get(job_id).map(Job::outcome)
    }

    /// Obtiene el número de jobs almacenados
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Elimina jobs terminados hace más de `ttl`
    ///
    /// Los jobs en cola nunca se eliminan. Retorna cuántos se borraron.
    pub fn evict_expired(&self, ttl: Duration) -> usize {
        let Ok(ttl) = chrono::Duration::from_std(ttl) else {
            return 0;
        };
        let Some(cutoff) = Utc::now().checked_sub_signed(ttl) else {
            return 0;
        };

        let mut jobs = self.lock();
        let before = jobs.len();

        jobs.retain(|_, job| match job.finished_at {
            Some(finished_at) => finished_at > cutoff,
            None => true,
        });

        before - jobs.len()
    }
}
