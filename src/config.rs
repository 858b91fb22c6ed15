//! # Configuración del Servicio
//! src/config.rs
//!
//! Configuración por argumentos CLI y variables de entorno. Al arrancar
//! también se carga un `.env` si existe.
//!
//! ## Ejemplos de uso
//!
//! ### CLI
//! ```bash
//! ./parallel_jobs --port 8000 --workers 4 --job-ttl-secs 3600
//! ```
//!
//! ### Variables de entorno
//! ```bash
//! HTTP_PORT=8000 CPU_WORKERS=4 ./parallel_jobs
//! ```

use crate::jobs::coordinator::default_workers;
use clap::Parser;
use std::time::Duration;
use tracing::info;

/// Máximo de workers aceptado
const MAX_WORKERS: usize = 1024;

/// Configuración del servicio de jobs
#[derive(Debug, Clone, Parser)]
#[command(name = "parallel_jobs")]
#[command(about = "Servicio de jobs por lotes con pool de workers CPU-bound")]
#[command(version)]
pub struct Config {
    /// Puerto en el que escucha el servidor
    #[arg(short, long, default_value = "8000", env = "HTTP_PORT")]
    pub port: u16,

    /// Host/IP en el que escucha
    #[arg(long, default_value = "127.0.0.1", env = "HTTP_HOST")]
    pub host: String,

    /// Workers del pool (0 = CPUs disponibles menos uno, mínimo uno)
    #[arg(long, default_value = "0", env = "CPU_WORKERS")]
    pub workers: usize,

    /// Segundos que se conserva un job terminado (0 = para siempre)
    #[arg(long = "job-ttl-secs", default_value = "0", env = "JOB_TTL_SECS")]
    pub job_ttl_secs: u64,

    /// Tamaño máximo del body de un request en bytes
    #[arg(long = "max-body-bytes", default_value = "1048576", env = "MAX_BODY_BYTES")]
    pub max_body_bytes: usize,
}

impl Config {
    /// Crea una nueva configuración parseando argumentos CLI
    pub fn new() -> Self {
        Config::parse()
    }

    /// Obtiene la dirección completa para bind (host:port)
    ///
    /// # Ejemplo
    /// ```rust
    /// use parallel_jobs::config::Config;
    ///
    /// let config = Config::default();
    /// assert_eq!(config.address(), "127.0.0.1:8000");
    /// ```
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Número efectivo de workers
    pub fn worker_count(&self) -> usize {
        if self.workers == 0 {
            default_workers()
        } else {
            self.workers
        }
    }

    /// TTL de jobs terminados; `None` si la expiración está desactivada
    pub fn job_ttl(&self) -> Option<Duration> {
        (self.job_ttl_secs > 0).then(|| Duration::from_secs(self.job_ttl_secs))
    }

    /// Valida la configuración
    pub fn validate(&self) -> Result<(), String> {
        if self.workers > MAX_WORKERS {
            return Err(format!("Workers must be <= {}", MAX_WORKERS));
        }
        if self.max_body_bytes == 0 {
            return Err("Max body bytes must be >= 1".to_string());
        }
        if self.host.trim().is_empty() {
            return Err("Host must not be empty".to_string());
        }
        Ok(())
    }

    /// Registra un resumen de la configuración en el log
    pub fn log_summary(&self) {
        info!(
            address = %self.address(),
            workers = self.worker_count(),
            job_ttl = ?self.job_ttl(),
            max_body_bytes = self.max_body_bytes,
            "configuration loaded"
        );
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: 8000,
            host: "127.0.0.1".to_string(),
            workers: 0,
            job_ttl_secs: 0,
            max_body_bytes: 1_048_576,
        }
    }
}
