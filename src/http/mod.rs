//! # Módulo HTTP
//!
//! Capa de transporte mínima para exponer el coordinador de jobs:
//!
//! - Parsing de requests HTTP/1.0 y HTTP/1.1 (cabecera + body)
//! - Construcción de responses JSON
//! - Códigos de estado
//!
//! Todas las respuestas son HTTP/1.0 con `Connection: close`: una
//! conexión atiende un único request.

pub mod request; // Parsing de HTTP requests
pub mod response; // Construcción de HTTP responses
pub mod status; // Códigos de estado HTTP

pub use request::{Method, ParseError, Request};
pub use response::Response;
pub use status::StatusCode;
