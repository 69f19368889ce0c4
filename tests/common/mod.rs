//! Shared test infrastructure for integration tests.
//!
//! `MockFleet` is an in-process HTTP server standing in for the whole demo
//! stack: every service base URL in the generated config points at it, routes
//! return canned (optionally scripted) JSON, and every request is recorded so
//! tests can assert ordering, headers, and bodies.

use serde_json::Value;
use std::collections::VecDeque;
use std::io::{BufRead, BufReader, Read, Write};
use std::net::{TcpListener, TcpStream};
use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use std::sync::{Arc, Mutex};

/// One request the fleet received, in arrival order.
// Not every test binary reads every field.
#[allow(dead_code)]
#[derive(Debug, Clone)]
pub struct Recorded {
    pub method: String,
    pub path: String,
    pub authorization: Option<String>,
    pub idempotency_key: Option<String>,
    pub body: String,
}

struct Route {
    method: String,
    path: String,
    /// Responses served in order; the last one repeats.
    responses: VecDeque<(u16, String)>,
}

struct Shared {
    routes: Mutex<Vec<Route>>,
    recorded: Mutex<Vec<Recorded>>,
}

pub struct MockFleet {
    base_url: String,
    shared: Arc<Shared>,
}

impl MockFleet {
    pub fn start() -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").expect("bind mock fleet");
        let addr = listener.local_addr().expect("mock fleet addr");
        let shared = Arc::new(Shared {
            routes: Mutex::new(Vec::new()),
            recorded: Mutex::new(Vec::new()),
        });
        let accept_shared = Arc::clone(&shared);
        std::thread::spawn(move || {
            for stream in listener.incoming() {
                let Ok(stream) = stream else { continue };
                let conn_shared = Arc::clone(&accept_shared);
                std::thread::spawn(move || handle_connection(stream, conn_shared));
            }
        });
        MockFleet {
            base_url: format!("http://{addr}"),
            shared,
        }
    }

    #[allow(dead_code)]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Register a route answering with one canned JSON body.
    pub fn route(&self, method: &str, path: &str, status: u16, body: Value) {
        self.route_seq(method, path, vec![(status, body)]);
    }

    /// Register a route whose responses are served in order (last repeats).
    #[allow(dead_code)]
    pub fn route_seq(&self, method: &str, path: &str, responses: Vec<(u16, Value)>) {
        self.shared.routes.lock().unwrap().push(Route {
            method: method.to_string(),
            path: path.to_string(),
            responses: responses
                .into_iter()
                .map(|(status, body)| (status, body.to_string()))
                .collect(),
        });
    }

    /// Everything received so far, in arrival order.
    #[allow(dead_code)]
    pub fn requests(&self) -> Vec<Recorded> {
        self.shared.recorded.lock().unwrap().clone()
    }

    /// Write a stack config pointing every service at this fleet, with fast
    /// poll settings suited to tests.
    pub fn write_config(&self, dir: &Path) -> PathBuf {
        write_config_with_overrides(dir, self.base_url(), &[])
    }

    /// Like [`write_config`], but the named services point elsewhere.
    ///
    /// [`write_config`]: MockFleet::write_config
    #[allow(dead_code)]
    pub fn write_config_with(&self, dir: &Path, overrides: &[(&str, &str)]) -> PathBuf {
        write_config_with_overrides(dir, self.base_url(), overrides)
    }
}

fn write_config_with_overrides(dir: &Path, base: &str, overrides: &[(&str, &str)]) -> PathBuf {
    let body_status = serde_json::json!({ "kind": "body_status", "expected": "healthy" });
    let reachable = serde_json::json!({ "kind": "reachable" });
    let services: Vec<Value> = [
        ("registry", "/health", &body_status),
        ("adapter", "/health", &body_status),
        ("evidence-locker", "/health", &body_status),
        ("iot-oracle", "/health", &body_status),
        ("iot-sim", "/health", &body_status),
        ("explorer", "/api/health", &reachable),
        ("issuer-portal", "/api/health", &reachable),
        ("verifier-console", "/api/health", &reachable),
        ("buyer-marketplace", "/api/health", &reachable),
    ]
    .iter()
    .map(|(name, health_path, readiness)| {
        let base_url = overrides
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, url)| url.to_string())
            .unwrap_or_else(|| base.to_string());
        serde_json::json!({
            "name": name,
            "base_url": base_url,
            "health_path": health_path,
            "readiness": readiness,
            "timeout_ms": 2000,
        })
    })
    .collect();

    let config = serde_json::json!({
        "services": services,
        "receipt_poll": { "initial_delay_ms": 5, "max_delay_ms": 20, "deadline_ms": 2000 },
        "evidence_dir": dir.join("samples").display().to_string(),
    });
    let path = dir.join("stack.json");
    std::fs::write(&path, serde_json::to_vec_pretty(&config).unwrap()).unwrap();
    path
}

/// Run the carbonctl binary with the given arguments.
pub fn run_carbonctl(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_carbonctl"))
        .args(args)
        .output()
        .expect("run carbonctl")
}

pub fn stdout_json(output: &Output) -> Value {
    let text = String::from_utf8_lossy(&output.stdout);
    serde_json::from_str(text.trim()).unwrap_or_else(|e| {
        panic!("stdout is not JSON ({e}): {text}");
    })
}

fn handle_connection(stream: TcpStream, shared: Arc<Shared>) {
    let mut reader = BufReader::new(stream);

    let mut request_line = String::new();
    if reader.read_line(&mut request_line).is_err() || request_line.trim().is_empty() {
        return;
    }
    let mut parts = request_line.split_whitespace();
    let method = parts.next().unwrap_or_default().to_string();
    let path = parts.next().unwrap_or_default().to_string();

    let mut content_length = 0usize;
    let mut authorization = None;
    let mut idempotency_key = None;
    loop {
        let mut line = String::new();
        if reader.read_line(&mut line).is_err() {
            return;
        }
        let line = line.trim_end();
        if line.is_empty() {
            break;
        }
        if let Some((name, value)) = line.split_once(':') {
            let value = value.trim().to_string();
            match name.to_ascii_lowercase().as_str() {
                "content-length" => content_length = value.parse().unwrap_or(0),
                "authorization" => authorization = Some(value),
                "idempotency-key" => idempotency_key = Some(value),
                _ => {}
            }
        }
    }

    let mut body_bytes = vec![0u8; content_length];
    if content_length > 0 && reader.read_exact(&mut body_bytes).is_err() {
        return;
    }

    shared.recorded.lock().unwrap().push(Recorded {
        method: method.clone(),
        path: path.clone(),
        authorization,
        idempotency_key,
        body: String::from_utf8_lossy(&body_bytes).into_owned(),
    });

    let (status, body) = next_response(&shared, &method, &path);
    let response = format!(
        "HTTP/1.1 {status} Mock\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
        body.len(),
    );
    let mut stream = reader.into_inner();
    let _ = stream.write_all(response.as_bytes());
}

/// Longest-prefix route match, so `/issuances/ISS-1/finalize` can coexist
/// with `/issuances`.
fn next_response(shared: &Shared, method: &str, path: &str) -> (u16, String) {
    let mut routes = shared.routes.lock().unwrap();
    let best = routes
        .iter_mut()
        .filter(|route| route.method == method && path.starts_with(route.path.as_str()))
        .max_by_key(|route| route.path.len());
    match best {
        Some(route) => {
            if route.responses.len() > 1 {
                route.responses.pop_front().expect("scripted response")
            } else {
                route
                    .responses
                    .front()
                    .cloned()
                    .unwrap_or((500, "{}".to_string()))
            }
        }
        None => (404, r#"{"error":"no such route"}"#.to_string()),
    }
}
