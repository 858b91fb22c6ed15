//! # Pool de Workers
//! src/jobs/pool.rs
//!
//! Conjunto fijo de threads del sistema operativo que ejecutan lotes.
//! Los lotes esperan en una cola FIFO protegida por `Mutex` + `Condvar`;
//! cada worker toma uno, lo ejecuta aislado con `catch_unwind` y envía
//! exactamente un mensaje [`Completion`] por el canal de completados.
//!
//! ```text
//! dispatch() → cola FIFO → worker N → executor(inputs) → Completion → canal
//! ```

use crate::commands::{BatchFn, BatchResult};
use crate::jobs::error::JobError;
use crate::jobs::types::JobId;
use std::any::Any;
use std::collections::VecDeque;
use std::panic::{self, AssertUnwindSafe};
use std::sync::mpsc::Sender;
use std::sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError};
use std::thread;
use tracing::{debug, info, warn};

/// Trabajo despachado al pool
///
/// El lote se mueve al worker; quien despacha ya no tiene acceso a él.
#[derive(Debug)]
pub struct Dispatch {
    pub job_id: JobId,
    pub inputs: Vec<i64>,
}

/// Mensaje que un worker envía al terminar un lote
#[derive(Debug)]
pub struct Completion {
    pub job_id: JobId,
    pub outcome: Result<BatchResult, String>,
}

struct QueueState {
    pending: VecDeque<Dispatch>,
    shutting_down: bool,
}

struct Shared {
    state: Mutex<QueueState>,
    condvar: Condvar,
}

impl Shared {
    fn lock(&self) -> MutexGuard<'_, QueueState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Pool de tamaño fijo; no se redimensiona en runtime
pub struct WorkerPool {
    shared: Arc<Shared>,
    size: usize,
}

impl WorkerPool {
    /// Crea el pool e inicia `size` workers
    ///
    /// Cada worker recibe una copia del `Sender` de completados. Si algún
    /// thread no puede crearse, los ya creados se detienen y se retorna el
    /// error.
    pub fn new(
        size: usize,
        executor: BatchFn,
        completions: Sender<Completion>,
    ) -> std::io::Result<Self> {
        let shared = Arc::new(Shared {
            state: Mutex::new(QueueState {
                pending: VecDeque::new(),
                shutting_down: false,
            }),
            condvar: Condvar::new(),
        });

        let pool = Self {
            shared: Arc::clone(&shared),
            size,
        };

        for i in 0..size {
            let name = format!("batch-worker-{}", i);
            let shared = Arc::clone(&shared);
            let completions = completions.clone();
            let worker_name = name.clone();

            // Si falla, `pool` se descarta y Drop detiene a los demás
            thread::Builder::new()
                .name(name)
                .spawn(move || Self::worker_loop(worker_name, shared, executor, completions))?;
        }

        info!(workers = size, "worker pool started");
        Ok(pool)
    }

    /// Número de workers del pool
    pub fn size(&self) -> usize {
        self.size
    }

    /// Número de lotes esperando un worker libre
    pub fn pending(&self) -> usize {
        self.shared.lock().pending.len()
    }

    /// Encola un lote; nunca bloquea esperando el cómputo
    pub fn dispatch(&self, job: Dispatch) -> Result<(), JobError> {
        let mut state = self.shared.lock();

        if state.shutting_down {
            return Err(JobError::PoolUnavailable);
        }

        state.pending.push_back(job);
        self.shared.condvar.notify_one();

        Ok(())
    }

    /// Apaga el pool sin esperar a que termine el trabajo en curso
    ///
    /// Retorna los lotes que seguían en cola y que ya no se ejecutarán.
    /// Los lotes que un worker ya tomó pueden terminar y reportarse.
    pub fn shutdown(self) -> Vec<Dispatch> {
        let abandoned = self.signal_shutdown();
        info!(abandoned = abandoned.len(), "worker pool shut down");
        abandoned
    }

    fn signal_shutdown(&self) -> Vec<Dispatch> {
        let mut state = self.shared.lock();
        state.shutting_down = true;
        let abandoned = state.pending.drain(..).collect();
        self.shared.condvar.notify_all();
        abandoned
    }

    /// Loop principal del worker
    fn worker_loop(
        name: String,
        shared: Arc<Shared>,
        executor: BatchFn,
        completions: Sender<Completion>,
    ) {
        debug!(worker = %name, "worker started");

        loop {
            // Esperar por un lote
            let job = {
                let mut state = shared.lock();
                loop {
                    if state.shutting_down {
                        debug!(worker = %name, "worker stopped");
                        return;
                    }
                    if let Some(job) = state.pending.pop_front() {
                        break job;
                    }
                    state = shared
                        .condvar
                        .wait(state)
                        .unwrap_or_else(PoisonError::into_inner);
                }
            };

            debug!(worker = %name, job_id = %job.job_id, inputs = job.inputs.len(), "worker picked up job");

            let outcome = Self::execute(executor, job.inputs);
            if let Err(error) = &outcome {
                warn!(worker = %name, job_id = %job.job_id, %error, "batch failed");
            }

            let completion = Completion {
                job_id: job.job_id,
                outcome,
            };
            if completions.send(completion).is_err() {
                warn!(worker = %name, "completion channel closed, stopping worker");
                return;
            }
        }
    }

    /// Ejecuta un lote aislando cualquier pánico
    fn execute(executor: BatchFn, inputs: Vec<i64>) -> Result<BatchResult, String> {
        panic::catch_unwind(AssertUnwindSafe(|| executor(inputs)))
            .map_err(|payload| JobError::ComputationFailed(panic_message(payload.as_ref())).to_string())
    }
}

impl Drop for WorkerPool {
    fn drop(&mut self) {
        self.signal_shutdown();
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "worker panicked".to_string()
    }
}
