//! # Coordinador de Jobs
//! src/jobs/coordinator.rs
//!
//! Orquesta el ciclo de vida de un job: admisión, despacho al pool,
//! recepción del mensaje de completado y actualización del registro.
//!
//! ## Flujo
//!
//! ```text
//! submit → registry.create (Queued) → pool.dispatch → worker
//!                                                        │
//!          registry.complete (Finished | Failed) ← canal de completados
//! ```
//!
//! `submit`, `status` y `result` nunca esperan a un cómputo en curso. El
//! único escritor de transiciones terminales es el thread de completados.

use crate::commands::{run_batch, BatchFn};
use crate::config::Config;
use crate::jobs::error::JobError;
use crate::jobs::pool::{Completion, Dispatch, WorkerPool};
use crate::jobs::registry::JobRegistry;
use crate::jobs::types::{JobId, JobOutcome, JobSnapshot};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError};
use std::sync::{PoisonError, RwLock};
use std::thread;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// Cada cuánto se revisan jobs expirados cuando hay TTL
const SWEEP_INTERVAL: Duration = Duration::from_secs(1);

/// Error que queda en los jobs que seguían en cola al apagar el pool
const ABANDONED_ERROR: &str = "worker pool shut down before the job ran";

/// Workers por defecto: CPUs disponibles menos uno, mínimo uno
pub fn default_workers() -> usize {
    thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1)
        .saturating_sub(1)
        .max(1)
}

/// Configuración del coordinador
#[derive(Debug, Clone)]
pub struct CoordinatorConfig {
    /// Número fijo de workers
    pub workers: usize,

    /// Tiempo que se conserva un job terminado (`None` = para siempre)
    pub job_ttl: Option<Duration>,

    /// Ejecutor de lotes que corren los workers
    pub executor: BatchFn,
}

impl Default for CoordinatorConfig {
    fn default() -> Self {
        Self {
            workers: default_workers(),
            job_ttl: None,
            executor: run_batch,
        }
    }
}

impl CoordinatorConfig {
    /// Crea una configuración desde el Config principal
    pub fn from_config(config: &Config) -> Self {
        Self {
            workers: config.worker_count(),
            job_ttl: config.job_ttl(),
            executor: run_batch,
        }
    }
}

/// Coordinador central de jobs
///
/// Es dueño del registro; el pool existe solo entre `initialize` y
/// `shutdown`.
pub struct JobCoordinator {
    config: CoordinatorConfig,
    registry: JobRegistry,
    pool: RwLock<Option<WorkerPool>>,
}

impl JobCoordinator {
    /// Crea un coordinador sin pool; `submit` falla hasta `initialize`
    pub fn new(config: CoordinatorConfig) -> Self {
        Self {
            config,
            registry: JobRegistry::new(),
            pool: RwLock::new(None),
        }
    }

    /// Crea el pool de workers y el thread de completados
    ///
    /// Llamarlo con el pool ya activo no hace nada.
    pub fn initialize(&self) -> std::io::Result<()> {
        let mut slot = self.pool.write().unwrap_or_else(PoisonError::into_inner);

        if slot.is_some() {
            debug!("worker pool already initialized");
            return Ok(());
        }

        let (sender, receiver) = mpsc::channel();
        let registry = self.registry.clone();
        let job_ttl = self.config.job_ttl;

        thread::Builder::new()
            .name("job-completions".to_string())
            .spawn(move || Self::completion_loop(receiver, registry, job_ttl))?;

        *slot = Some(WorkerPool::new(self.config.workers, self.config.executor, sender)?);

        info!(workers = self.config.workers, ttl = ?self.config.job_ttl, "job coordinator ready");
        Ok(())
    }

    /// Libera el pool sin drenar el trabajo pendiente
    ///
    /// Los jobs que seguían en cola pasan a `Failed`. Retorna cuántos se
    /// abandonaron.
    pub fn shutdown(&self) -> usize {
        let pool = self
            .pool
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .take();

        let Some(pool) = pool else {
            return 0;
        };

        let abandoned = pool.shutdown();
        for dispatch in &abandoned {
            self.registry
                .complete(&dispatch.job_id, Err(ABANDONED_ERROR.to_string()));
        }

        if !abandoned.is_empty() {
            warn!(abandoned = abandoned.len(), "queued jobs abandoned at shutdown");
        }
        abandoned.len()
    }

    /// Verifica si el pool está aceptando trabajo
    pub fn is_ready(&self) -> bool {
        self.pool
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }

    /// Tamaño configurado del pool (diagnóstico)
    pub fn capacity(&self) -> usize {
        self.config.workers
    }

    /// Número de jobs en el registro
    pub fn job_count(&self) -> usize {
        self.registry.len()
    }

    /// Admite un lote y retorna el ID del job sin esperar el cómputo
    pub fn submit(&self, inputs: Vec<i64>) -> Result<JobId, JobError> {
        if inputs.is_empty() {
            return Err(JobError::EmptyInput);
        }

        let slot = self.pool.read().unwrap_or_else(PoisonError::into_inner);
        let pool = slot.as_ref().ok_or(JobError::PoolUnavailable)?;

        // El registro existe antes del despacho: el completado siempre lo encuentra
        let job_id = self.registry.create();
        let batch_size = inputs.len();

        if let Err(error) = pool.dispatch(Dispatch {
            job_id: job_id.clone(),
            inputs,
        }) {
            self.registry.complete(&job_id, Err(ABANDONED_ERROR.to_string()));
            return Err(error);
        }

        info!(job_id = %job_id, inputs = batch_size, "job submitted");
        Ok(job_id)
    }

    /// Foto de estado de un job
    pub fn status(&self, job_id: &str) -> Result<JobSnapshot, JobError> {
        self.registry
            .snapshot(job_id)
            .ok_or_else(|| JobError::NotFound(job_id.to_string()))
    }

    /// Resultado de un job, o su estado actual si aún no terminó
    pub fn result(&self, job_id: &str) -> Result<JobOutcome, JobError> {
        self.registry
            .outcome(job_id)
            .ok_or_else(|| JobError::NotFound(job_id.to_string()))
    }

    /// Aplica los mensajes de completado hasta que se cierre el canal
    ///
    /// El canal se cierra cuando todos los workers terminan, es decir,
    /// después de `shutdown`.
    fn completion_loop(
        receiver: Receiver<Completion>,
        registry: JobRegistry,
        job_ttl: Option<Duration>,
    ) {
        let mut last_sweep = Instant::now();

        loop {
            let received = match job_ttl {
                Some(_) => receiver.recv_timeout(SWEEP_INTERVAL),
                None => receiver
                    .recv()
                    .map_err(|_| RecvTimeoutError::Disconnected),
            };

            match received {
                Ok(completion) => Self::apply_completion(&registry, completion),
                Err(RecvTimeoutError::Timeout) => {}
                Err(RecvTimeoutError::Disconnected) => break,
            }

            if let Some(ttl) = job_ttl {
                if last_sweep.elapsed() >= SWEEP_INTERVAL {
                    let evicted = registry.evict_expired(ttl);
                    if evicted > 0 {
                        debug!(evicted, "expired jobs evicted");
                    }
                    last_sweep = Instant::now();
                }
            }
        }

        debug!("completion loop stopped");
    }

    fn apply_completion(registry: &JobRegistry, completion: Completion) {
        let finished = completion.outcome.is_ok();

        if !registry.complete(&completion.job_id, completion.outcome) {
            warn!(job_id = %completion.job_id, "completion ignored: job unknown or already terminal");
            return;
        }

        if finished {
            info!(job_id = %completion.job_id, "job finished");
        } else {
            info!(job_id = %completion.job_id, "job failed");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::BatchResult;
    use crate::jobs::types::{JobOutcome, JobStatus};
    use assert_matches::assert_matches;
    use std::sync::Arc;

    fn slow_batch(inputs: Vec<i64>) -> BatchResult {
        thread::sleep(Duration::from_millis(200));
        run_batch(inputs)
    }

    fn picky_batch(inputs: Vec<i64>) -> BatchResult {
        if inputs.contains(&13) {
            panic!("unlucky input");
        }
        run_batch(inputs)
    }

    fn coordinator_with(workers: usize, executor: BatchFn) -> JobCoordinator {
        let coordinator = JobCoordinator::new(CoordinatorConfig {
            workers,
            job_ttl: None,
            executor,
        });
        coordinator.initialize().unwrap();
        coordinator
    }

    fn wait_for_terminal(coordinator: &JobCoordinator, job_id: &str) -> JobSnapshot {
        let deadline = Instant::now() + Duration::from_secs(5);
        loop {
            let snapshot = coordinator.status(job_id).unwrap();
            if snapshot.status.is_terminal() {
                return snapshot;
            }
            assert!(Instant::now() < deadline, "job {} never finished", job_id);
            thread::sleep(Duration::from_millis(10));
        }
    }

    #[test]
    fn test_default_workers_at_least_one() {
        assert!(default_workers() >= 1);
        assert_eq!(CoordinatorConfig::default().workers, default_workers());
    }

    #[test]
    fn test_submit_and_result() {
        let coordinator = coordinator_with(2, run_batch);

        let id = coordinator.submit(vec![3, 10, 40]).unwrap();
        let snapshot = wait_for_terminal(&coordinator, &id);

        assert_eq!(snapshot.status, JobStatus::Finished);
        assert!(snapshot.finished_at.is_some());
        assert_eq!(
            coordinator.result(&id).unwrap(),
            JobOutcome::Ready {
                result: BatchResult::from([(3, 2), (10, 55), (40, 5)])
            }
        );
    }

    #[test]
    fn test_duplicates_collapse() {
        let coordinator = coordinator_with(1, run_batch);

        let id = coordinator.submit(vec![7, 7, 7]).unwrap();
        wait_for_terminal(&coordinator, &id);

        assert_matches!(
            coordinator.result(&id).unwrap(),
            JobOutcome::Ready { result } if result == BatchResult::from([(7, 13)])
        );
    }

    #[test]
    fn test_empty_input_creates_nothing() {
        let coordinator = coordinator_with(1, run_batch);

        assert_eq!(coordinator.submit(Vec::new()), Err(JobError::EmptyInput));
        assert_eq!(coordinator.job_count(), 0);
    }

    #[test]
    fn test_empty_input_checked_before_pool() {
        let coordinator = JobCoordinator::new(CoordinatorConfig::default());
        assert_eq!(coordinator.submit(Vec::new()), Err(JobError::EmptyInput));
    }

    #[test]
    fn test_submit_before_initialize() {
        let coordinator = JobCoordinator::new(CoordinatorConfig::default());

        assert!(!coordinator.is_ready());
        assert_eq!(coordinator.submit(vec![1]), Err(JobError::PoolUnavailable));
        assert_eq!(coordinator.job_count(), 0);
    }

    #[test]
    fn test_initialize_twice_is_noop() {
        let coordinator = coordinator_with(1, run_batch);
        coordinator.initialize().unwrap();

        assert!(coordinator.is_ready());
        let id = coordinator.submit(vec![5]).unwrap();
        assert_eq!(wait_for_terminal(&coordinator, &id).status, JobStatus::Finished);
    }

    #[test]
    fn test_unknown_id_not_found() {
        let coordinator = coordinator_with(1, run_batch);

        assert_eq!(
            coordinator.status("missing"),
            Err(JobError::NotFound("missing".to_string()))
        );
        assert_matches!(coordinator.result("missing"), Err(JobError::NotFound(_)));
    }

    #[test]
    fn test_status_visible_right_after_submit() {
        let coordinator = coordinator_with(1, slow_batch);

        let id = coordinator.submit(vec![1, 2, 3]).unwrap();
        let snapshot = coordinator.status(&id).unwrap();

        assert_eq!(snapshot.status, JobStatus::Queued);
        assert!(snapshot.finished_at.is_none());
    }

    #[test]
    fn test_result_before_finish_is_pending() {
        let coordinator = coordinator_with(1, slow_batch);

        let id = coordinator.submit(vec![1]).unwrap();

        assert_eq!(
            coordinator.result(&id).unwrap(),
            JobOutcome::Pending {
                status: JobStatus::Queued
            }
        );
    }

    #[test]
    fn test_panic_marks_job_failed_and_coordinator_keeps_working() {
        let coordinator = coordinator_with(1, picky_batch);

        let bad = coordinator.submit(vec![1, 13]).unwrap();
        let failed = wait_for_terminal(&coordinator, &bad);
        assert_eq!(failed.status, JobStatus::Failed);
        assert!(failed.error.unwrap().contains("unlucky input"));
        assert_eq!(
            coordinator.result(&bad).unwrap(),
            JobOutcome::Pending {
                status: JobStatus::Failed
            }
        );

        let good = coordinator.submit(vec![10]).unwrap();
        assert_eq!(wait_for_terminal(&coordinator, &good).status, JobStatus::Finished);
    }

    #[test]
    fn test_concurrent_submits() {
        let coordinator = Arc::new(coordinator_with(2, run_batch));

        let handles: Vec<_> = (0..8)
            .map(|i| {
                let coordinator = Arc::clone(&coordinator);
                thread::spawn(move || (i, coordinator.submit(vec![i, i + 1]).unwrap()))
            })
            .collect();

        let submitted: Vec<(i64, JobId)> = handles.into_iter().map(|h| h.join().unwrap()).collect();

        let mut ids: Vec<&JobId> = submitted.iter().map(|(_, id)| id).collect();
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), 8);

        for (i, id) in &submitted {
            wait_for_terminal(&coordinator, id);
            assert_eq!(
                coordinator.result(id).unwrap(),
                JobOutcome::Ready {
                    result: run_batch(vec![*i, i + 1])
                }
            );
        }
    }

    #[test]
    fn test_shutdown_rejects_and_fails_queued_jobs() {
        let coordinator = coordinator_with(1, slow_batch);

        let _first = coordinator.submit(vec![1]).unwrap();
        let _second = coordinator.submit(vec![2]).unwrap();
        let third = coordinator.submit(vec![3]).unwrap();

        let abandoned = coordinator.shutdown();
        assert!(abandoned >= 2);
        assert!(!coordinator.is_ready());

        let snapshot = coordinator.status(&third).unwrap();
        assert_eq!(snapshot.status, JobStatus::Failed);
        assert_eq!(snapshot.error.as_deref(), Some(ABANDONED_ERROR));

        assert_eq!(coordinator.submit(vec![4]), Err(JobError::PoolUnavailable));
        assert_eq!(coordinator.shutdown(), 0);
    }

    #[test]
    fn test_ttl_evicts_finished_jobs() {
        let coordinator = JobCoordinator::new(CoordinatorConfig {
            workers: 1,
            job_ttl: Some(Duration::from_millis(1)),
            executor: run_batch,
        });
        coordinator.initialize().unwrap();

        let id = coordinator.submit(vec![2]).unwrap();

        let deadline = Instant::now() + Duration::from_secs(5);
        while coordinator.status(&id).is_ok() {
            assert!(Instant::now() < deadline, "job was never evicted");
            thread::sleep(Duration::from_millis(50));
        }
        assert_eq!(coordinator.job_count(), 0);
    }
}
