//! # Ejecutor de lotes
//! src/commands/batch.rs
//!
//! Aplica la función de cómputo a cada valor de un lote. Es la unidad de
//! trabajo que se despacha al pool de workers, así que no toca ningún
//! estado fuera de su propia entrada.

use super::fibonacci::{fibonacci, reduce};
use std::collections::BTreeMap;

/// Resultado de un lote: valor original -> término calculado
pub type BatchResult = BTreeMap<i64, u64>;

/// Firma de un ejecutor de lotes
///
/// El pool recibe un `BatchFn` en vez de llamar directamente a
/// [`run_batch`], lo que permite inyectar ejecutores alternativos.
pub type BatchFn = fn(Vec<i64>) -> BatchResult;

/// Ejecuta un lote completo
///
/// Cada valor se reduce módulo 35 antes de calcular, pero la clave del
/// resultado es el valor original. Si el lote trae valores repetidos, la
/// última ocurrencia sobrescribe a las anteriores y el mapa queda con una
/// sola entrada por valor.
///
/// # Ejemplo
/// ```
/// use parallel_jobs::commands::run_batch;
///
/// let result = run_batch(vec![3, 10, 40]);
/// assert_eq!(result[&40], 5);
/// ```
pub fn run_batch(inputs: Vec<i64>) -> BatchResult {
    let mut results = BatchResult::new();

    for value in inputs {
        results.insert(value, fibonacci(reduce(value)));
    }

    results
}
