//! # Servidor TCP Concurrente
//! src/server/tcp.rs
//!
//! Acepta conexiones y atiende cada una en su propio thread. Los handlers
//! solo leen o escriben el registro y encolan trabajo, así que un thread de
//! conexión nunca queda esperando un cómputo.

use crate::config::Config;
use crate::http::request::head_length;
use crate::http::{Request, Response, StatusCode};
use crate::jobs::coordinator::JobCoordinator;
use crate::jobs::handlers::job_router;
use crate::router::Router;
use std::io::{Read, Write};
use std::net::{SocketAddr, TcpListener, TcpStream};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};
use tracing::{debug, error, info, info_span, warn};
use uuid::Uuid;

/// Tiempo máximo esperando bytes de un cliente
const READ_TIMEOUT: Duration = Duration::from_secs(10);

/// Límite de la cabecera de un request
const MAX_HEAD_BYTES: usize = 16 * 1024;

/// Resultado de leer un request del socket
enum ReadOutcome {
    /// El cliente cerró sin enviar nada
    Closed,
    Complete(Vec<u8>),
    TooLarge,
}

/// Servidor HTTP del servicio de jobs
pub struct Server {
    listener: TcpListener,
    router: Arc<Router<JobCoordinator>>,
    coordinator: Arc<JobCoordinator>,
    max_body_bytes: usize,
}

impl Server {
    /// Hace bind en la dirección configurada
    ///
    /// Con puerto 0 el sistema operativo elige uno libre (ver
    /// [`Server::local_addr`]).
    pub fn bind(config: &Config, coordinator: Arc<JobCoordinator>) -> std::io::Result<Self> {
        let listener = TcpListener::bind(config.address())?;

        Ok(Self {
            listener,
            router: Arc::new(job_router()),
            coordinator,
            max_body_bytes: config.max_body_bytes,
        })
    }

    pub fn local_addr(&self) -> std::io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    /// Loop de aceptación; un thread por conexión
    pub fn run(&self) -> std::io::Result<()> {
        info!(address = %self.local_addr()?, "server listening");

        for stream in self.listener.incoming() {
            match stream {
                Ok(stream) => {
                    let router = Arc::clone(&self.router);
                    let coordinator = Arc::clone(&self.coordinator);
                    let max_body_bytes = self.max_body_bytes;

                    thread::spawn(move || {
                        if let Err(e) =
                            Self::handle_connection(stream, &router, &coordinator, max_body_bytes)
                        {
                            warn!(error = %e, "connection error");
                        }
                    });
                }
                Err(e) => {
                    error!(error = %e, "failed to accept connection");
                }
            }
        }

        Ok(())
    }

    fn handle_connection(
        mut stream: TcpStream,
        router: &Router<JobCoordinator>,
        coordinator: &JobCoordinator,
        max_body_bytes: usize,
    ) -> std::io::Result<()> {
        let start = Instant::now();
        let request_id = Uuid::new_v4().simple().to_string();
        let peer = stream
            .peer_addr()
            .map(|addr| addr.to_string())
            .unwrap_or_else(|_| "unknown".to_string());

        let span = info_span!("request", request_id = %&request_id[..8], %peer);
        let _guard = span.enter();

        stream.set_read_timeout(Some(READ_TIMEOUT))?;

        let (mut response, path) = match Self::read_request(&mut stream, max_body_bytes)? {
            ReadOutcome::Closed => {
                debug!("connection closed before request");
                return Ok(());
            }
            ReadOutcome::TooLarge => (
                Response::error(StatusCode::PayloadTooLarge, "Request body too large"),
                "-".to_string(),
            ),
            ReadOutcome::Complete(buffer) => match Request::parse(&buffer) {
                Ok(request) => {
                    let path = request.path().to_string();
                    debug!(method = request.method().as_str(), %path, "request received");
                    (router.route(request, coordinator), path)
                }
                Err(e) => {
                    debug!(error = %e, "parse error");
                    (
                        Response::error(StatusCode::BadRequest, &format!("Invalid: {}", e)),
                        "-".to_string(),
                    )
                }
            },
        };

        response.add_header("X-Request-Id", &request_id);
        response.add_header("Connection", "close");

        stream.write_all(&response.to_bytes())?;
        stream.flush()?;

        info!(
            %path,
            status = response.status().as_u16(),
            latency_ms = start.elapsed().as_secs_f64() * 1000.0,
            "request served"
        );

        Ok(())
    }

    /// Lee la cabecera completa y luego `Content-Length` bytes de body
    fn read_request(stream: &mut TcpStream, max_body_bytes: usize) -> std::io::Result<ReadOutcome> {
        let mut buffer = Vec::with_capacity(4096);
        let mut chunk = [0u8; 4096];

        let head_end = loop {
            if let Some(end) = head_length(&buffer) {
                break end;
            }
            if buffer.len() > MAX_HEAD_BYTES {
                return Ok(ReadOutcome::TooLarge);
            }

            let n = stream.read(&mut chunk)?;
            if n == 0 {
                // Sin terminador: se intenta parsear lo recibido
                return Ok(if buffer.is_empty() {
                    ReadOutcome::Closed
                } else {
                    ReadOutcome::Complete(buffer)
                });
            }
            buffer.extend_from_slice(&chunk[..n]);
        };

        let content_length = Request::parse(&buffer[..head_end])
            .ok()
            .and_then(|head| head.content_length())
            .unwrap_or(0);

        if content_length > max_body_bytes {
            return Ok(ReadOutcome::TooLarge);
        }

        let total = head_end + content_length;
        while buffer.len() < total {
            let n = stream.read(&mut chunk)?;
            if n == 0 {
                break;
            }
            buffer.extend_from_slice(&chunk[..n]);
        }
        buffer.truncate(total.min(buffer.len()));

        Ok(ReadOutcome::Complete(buffer))
    }
}
