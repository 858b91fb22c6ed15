//! # Sistema de Routing
//! src/router/mod.rs
//!
//! Mapea `(método, path)` a handlers.
//!
//! ```text
//! Request → Router → Handler(&Request, &S) → Response
//! ```
//!
//! Los patrones aceptan segmentos `{nombre}` que se capturan como
//! parámetros de path: `/status/{job_id}` hace match con `/status/abc`.
//! El router también resuelve el preflight CORS (`OPTIONS`) y agrega los
//! headers comunes a toda respuesta.

use crate::http::{Method, Request, Response, StatusCode};
use std::collections::HashMap;

/// Un handler recibe el request y el estado compartido del servidor
pub type Handler<S> = fn(&Request, &S) -> Response;

/// Segmento de un patrón de ruta
#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Param(String),
}

struct Route<S> {
    method: Method,
    segments: Vec<Segment>,
    handler: Handler<S>,
}

impl<S> Route<S> {
    /// Retorna los parámetros capturados si el path hace match
    fn match_path(&self, path: &str) -> Option<HashMap<String, String>> {
        let parts = split_path(path);
        if parts.len() != self.segments.len() {
            return None;
        }

        let mut params = HashMap::new();
        for (segment, part) in self.segments.iter().zip(parts) {
            match segment {
                Segment::Literal(literal) if literal == part => {}
                Segment::Literal(_) => return None,
                Segment::Param(name) => {
                    params.insert(name.clone(), part.to_string());
                }
            }
        }
        Some(params)
    }
}

fn split_path(path: &str) -> Vec<&str> {
    path.split('/').filter(|part| !part.is_empty()).collect()
}

/// Router que mapea rutas a handlers
pub struct Router<S> {
    routes: Vec<Route<S>>,
}

impl<S> Router<S> {
    /// Crea un nuevo router vacío
    pub fn new() -> Self {
        Self { routes: Vec::new() }
    }

    /// Registra una ruta con su handler
    ///
    /// # Ejemplo
    /// ```
    /// use parallel_jobs::router::Router;
    /// use parallel_jobs::http::{Method, Request, Response, StatusCode};
    ///
    /// fn echo_handler(req: &Request, _state: &()) -> Response {
    ///     let id = req.path_param("id").unwrap_or_default();
    ///     Response::json(StatusCode::Ok, &serde_json::json!({ "id": id }))
    /// }
    ///
    /// let mut router = Router::new();
    /// router.register(Method::GET, "/echo/{id}", echo_handler);
    /// ```
    pub fn register(&mut self, method: Method, pattern: &str, handler: Handler<S>) {
        let segments = split_path(pattern)
            .into_iter()
            .map(|part| match part.strip_prefix('{').and_then(|p| p.strip_suffix('}')) {
                Some(name) => Segment::Param(name.to_string()),
                None => Segment::Literal(part.to_string()),
            })
            .collect();

        self.routes.push(Route {
            method,
            segments,
            handler,
        });
    }

    /// Encuentra y ejecuta el handler apropiado
    ///
    /// - Ruta y método coinciden: se ejecuta el handler
    /// - `OPTIONS` sobre una ruta conocida: 204 con headers CORS
    /// - La ruta existe con otro método: 405
    /// - Nada coincide: 404
    pub fn route(&self, mut request: Request, state: &S) -> Response {
        let mut allowed: Vec<Method> = Vec::new();

        for route in &self.routes {
            let Some(params) = route.match_path(request.path()) else {
                continue;
            };

            if route.method == request.method() {
                request.set_path_params(params);
                let mut response = (route.handler)(&request, state);
                Self::add_common_headers(&mut response);
                return response;
            }
            allowed.push(route.method);
        }

        let mut response = if allowed.is_empty() {
            Response::error(
                StatusCode::NotFound,
                &format!("Route not found: {}", request.path()),
            )
        } else if request.method() == Method::OPTIONS {
            Self::preflight(&allowed)
        } else {
            let allow = Self::allow_header(&allowed);
            Response::error(StatusCode::MethodNotAllowed, "Method Not Allowed")
                .with_header("Allow", &allow)
        };

        Self::add_common_headers(&mut response);
        response
    }

    fn allow_header(allowed: &[Method]) -> String {
        allowed
            .iter()
            .map(Method::as_str)
            .chain(std::iter::once("OPTIONS"))
            .collect::<Vec<_>>()
            .join(", ")
    }

    fn preflight(allowed: &[Method]) -> Response {
        Response::new(StatusCode::NoContent)
            .with_header("Access-Control-Allow-Methods", &Self::allow_header(allowed))
            .with_header("Access-Control-Allow-Headers", "*")
            .with_header("Access-Control-Max-Age", "600")
    }

    /// Agrega headers comunes a todas las respuestas
    fn add_common_headers(response: &mut Response) {
        response.add_header("Server", "parallel-jobs/0.1");
        response.add_header("Connection", "close");
        response.add_header("Access-Control-Allow-Origin", "*");
    }
}

impl<S> Default for Router<S> {
    fn default() -> Self {
        Self::new()
    }
}
