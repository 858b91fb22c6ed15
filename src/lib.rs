//! # Parallel Jobs
//! src/lib.rs
//!
//! Servicio de jobs por lotes sobre un servidor HTTP/1.0 propio. Un cliente
//! envía una lista de enteros, recibe un `job_id` al instante y consulta
//! después el estado y el resultado mientras un pool fijo de workers hace
//! el cómputo CPU-bound.
//!
//! ## Arquitectura
//!
//! - `commands`: La función de cómputo (Fibonacci sobre `n mod 35`) y el ejecutor de lotes
//! - `jobs`: Registro de jobs, pool de workers y coordinador
//! - `http`: Parsing y manejo del protocolo HTTP/1.0
//! - `router`: Enrutamiento de peticiones a handlers
//! - `server`: Lógica del servidor TCP y manejo de conexiones
//! - `config`: Argumentos CLI y variables de entorno
//!
//! ## Ejemplo de uso
//!
//! ```no_run
//! use parallel_jobs::config::Config;
//! use parallel_jobs::jobs::{CoordinatorConfig, JobCoordinator};
//! use parallel_jobs::server::Server;
//! use std::sync::Arc;
//!
//! let config = Config::default();
//! let coordinator = Arc::new(JobCoordinator::new(CoordinatorConfig::from_config(&config)));
//! coordinator.initialize().expect("Error al iniciar el pool");
//!
//! let server = Server::bind(&config, Arc::clone(&coordinator)).expect("Error en bind");
//! server.run().expect("Error al iniciar servidor");
//! ```

pub mod commands;
pub mod config;
pub mod http;
pub mod jobs;
pub mod router;
pub mod server;
