//! Tests de integración para el servicio de jobs
//! tests/integration_test.rs
//!
//! Cada test levanta su propio servidor en un puerto efímero y le habla
//! por TCP con requests HTTP crudos.

use parallel_jobs::config::Config;
use parallel_jobs::jobs::{CoordinatorConfig, JobCoordinator};
use parallel_jobs::server::Server;
use serde_json::{json, Value};
use std::io::{Read, Write};
use std::net::{SocketAddr, TcpStream};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

/// Levanta un servidor con `workers` workers y retorna su dirección
fn start_server(workers: usize) -> SocketAddr {
    let config = Config {
        port: 0,
        workers,
        ..Config::default()
    };

    let coordinator = Arc::new(JobCoordinator::new(CoordinatorConfig::from_config(&config)));
    coordinator.initialize().expect("Failed to start pool");

    let server = Server::bind(&config, coordinator).expect("Failed to bind");
    let addr = server.local_addr().expect("No local addr");

    thread::spawn(move || {
        let _ = server.run();
    });

    addr
}

/// Helper: envía un request HTTP crudo y retorna la response completa
fn send_raw(addr: SocketAddr, raw: &str) -> Result<String, Box<dyn std::error::Error>> {
    let mut stream = TcpStream::connect(addr)?;

    stream.set_read_timeout(Some(Duration::from_secs(5)))?;
    stream.set_write_timeout(Some(Duration::from_secs(5)))?;

    stream.write_all(raw.as_bytes())?;
    stream.flush()?;

    let mut response = String::new();
    stream.read_to_string(&mut response)?;

    Ok(response)
}

fn get(addr: SocketAddr, path: &str) -> String {
    send_raw(addr, &format!("GET {} HTTP/1.0\r\n\r\n", path)).expect("Failed to send request")
}

fn post_json(addr: SocketAddr, path: &str, body: &str) -> String {
    let raw = format!(
        "POST {} HTTP/1.1\r\nContent-Type: application/json\r\nContent-Length: {}\r\n\r\n{}",
        path,
        body.len(),
        body
    );
    send_raw(addr, &raw).expect("Failed to send request")
}

/// Helper: extrae el body de una response HTTP
fn extract_body(response: &str) -> &str {
    if let Some(pos) = response.find("\r\n\r\n") {
        &response[pos + 4..]
    } else {
        ""
    }
}

fn body_json(response: &str) -> Value {
    serde_json::from_str(extract_body(response)).expect("Body is not JSON")
}

fn submit(addr: SocketAddr, numbers: &str) -> String {
    let response = post_json(addr, "/submit", &format!(r#"{{"numbers": {}}}"#, numbers));
    assert!(response.contains("200 OK"), "Expected 200 OK, got: {}", response);

    body_json(&response)["job_id"]
        .as_str()
        .expect("job_id missing")
        .to_string()
}

/// Consulta `/result` hasta que el job termine
fn wait_for_result(addr: SocketAddr, job_id: &str) -> Value {
    let deadline = Instant::now() + Duration::from_secs(10);

    loop {
        let response = get(addr, &format!("/result/{}", job_id));
        assert!(response.contains("200 OK"), "Expected 200 OK, got: {}", response);

        let body = body_json(&response);
        if body.get("result").is_some() {
            return body;
        }
        assert_eq!(body, json!({"status": "queued"}));

        assert!(Instant::now() < deadline, "Job {} never finished", job_id);
        thread::sleep(Duration::from_millis(20));
    }
}

#[test]
fn test_health_endpoint() {
    let addr = start_server(2);

    let response = get(addr, "/health");

    assert!(response.contains("200 OK"));
    assert!(response.contains("Access-Control-Allow-Origin: *"));
    assert_eq!(
        body_json(&response),
        json!({"status": "ok", "cpu_workers": 2, "ready": true})
    );
}

#[test]
fn test_submit_status_result_flow() {
    let addr = start_server(2);

    let job_id = submit(addr, "[3, 10, 40]");

    let result = wait_for_result(addr, &job_id);
    assert_eq!(result, json!({"result": {"3": 2, "10": 55, "40": 5}}));

    let status = body_json(&get(addr, &format!("/status/{}", job_id)));
    assert_eq!(status["job_id"], job_id.as_str());
    assert_eq!(status["status"], "finished");
    assert!(status.get("finished_at").is_some());
}

#[test]
fn test_negative_and_duplicate_inputs() {
    let addr = start_server(1);

    let job_id = submit(addr, "[7, 7, -1]");

    // -1 mod 35 = 34
    let result = wait_for_result(addr, &job_id);
    assert_eq!(result, json!({"result": {"7": 13, "-1": 5702887}}));
}

#[test]
fn test_many_concurrent_submissions() {
    let addr = start_server(2);

    let handles: Vec<_> = (0..8)
        .map(|i| thread::spawn(move || submit(addr, &format!("[{}]", i))))
        .collect();

    let job_ids: Vec<String> = handles
        .into_iter()
        .map(|h| h.join().expect("Submit thread panicked"))
        .collect();

    let mut unique = job_ids.clone();
    unique.sort();
    unique.dedup();
    assert_eq!(unique.len(), job_ids.len());

    for job_id in &job_ids {
        assert!(wait_for_result(addr, job_id).get("result").is_some());
    }
}

#[test]
fn test_empty_list_rejected() {
    let addr = start_server(1);

    let response = post_json(addr, "/submit", r#"{"numbers": []}"#);

    assert!(response.contains("400 Bad Request"), "Got: {}", response);
    assert!(body_json(&response).get("detail").is_some());
}

#[test]
fn test_wrong_payload_shape() {
    let addr = start_server(1);

    let response = post_json(addr, "/submit", r#"{"values": [1, 2]}"#);

    assert!(response.contains("422"), "Got: {}", response);
}

#[test]
fn test_unknown_job_returns_404() {
    let addr = start_server(1);

    let status = get(addr, "/status/does-not-exist");
    let result = get(addr, "/result/does-not-exist");

    assert!(status.contains("404 Not Found"));
    assert!(result.contains("404 Not Found"));
    assert_eq!(body_json(&status), json!({"detail": "Job not found"}));
}

#[test]
fn test_cors_preflight() {
    let addr = start_server(1);

    let response = send_raw(addr, "OPTIONS /submit HTTP/1.1\r\n\r\n").expect("Failed to send request");

    assert!(response.contains("204 No Content"), "Got: {}", response);
    assert!(response.contains("Access-Control-Allow-Origin: *"));
}

#[test]
fn test_wrong_method_on_known_path() {
    let addr = start_server(1);

    let response = get(addr, "/submit");

    assert!(response.contains("405 Method Not Allowed"), "Got: {}", response);
}
