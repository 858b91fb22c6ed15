//! # Comandos de cómputo
//!
//! Trabajo puro y CPU-bound que ejecutan los workers:
//!
//! - **fibonacci**: función de cómputo por elemento
//! - **batch**: aplica la función a un lote completo
//!
//! Nada en este módulo conoce jobs, colas ni HTTP.

pub mod batch;
pub mod fibonacci;

// Re-exportar funciones útiles
pub use batch::{run_batch, BatchFn, BatchResult};
pub use fibonacci::{fibonacci, reduce, INPUT_MODULUS};
