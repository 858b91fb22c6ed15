//! # Función de cómputo
//! src/commands/fibonacci.rs
//!
//! Término N de la sucesión de Fibonacci (semillas 0 y 1), calculado de
//! forma iterativa: O(n) en tiempo, O(1) en memoria.

/// Módulo con el que se reduce cada entrada antes de calcular.
///
/// Acota la latencia por elemento: `fibonacci(34)` es el término más caro
/// que puede pedir un lote.
pub const INPUT_MODULUS: i64 = 35;

/// Calcula el N-ésimo número de Fibonacci
///
/// Para `n < 2` retorna `n` sin cambios. No tiene efectos secundarios ni
/// condiciones de error; quien llama es responsable de reducir la entrada
/// (ver [`reduce`]) para que el resultado quepa en `u64`.
///
/// # Ejemplo
/// ```
/// use parallel_jobs::commands::fibonacci;
///
/// assert_eq!(fibonacci(10), 55);
/// ```
pub fn fibonacci(n: u32) -> u64 {
    if n < 2 {
        return u64::from(n);
    }

    let mut a = 0u64;
    let mut b = 1u64;

    for _ in 0..n {
        let next = a + b;
        a = b;
        b = next;
    }

    a
}

/// Reduce un valor de entrada al rango `0..INPUT_MODULUS`
///
/// Usa división euclidiana, así que los negativos también caen en el rango
/// (por ejemplo `-1` se reduce a `34`).
pub fn reduce(value: i64) -> u32 {
    // rem_euclid con módulo positivo siempre da 0..35
    value.rem_euclid(INPUT_MODULUS) as u32
}
