//! Common test utilities for motcode integration tests.
//!
//! Provides `TestEnv`, which bundles a scripted backend fixture server
//! with a `mot()` command builder that points the binary at it. Every
//! request the binary makes is recorded (method, path, body) so tests
//! can assert exact wire bodies and request ordering.

#![allow(dead_code)]

use assert_cmd::Command;
use std::io::{BufRead, BufReader, Read, Write};
use std::net::{SocketAddr, TcpListener, TcpStream};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::thread::JoinHandle;
pub use tempfile::TempDir;

/// One request the binary made against the fixture backend.
#[derive(Debug, Clone)]
pub struct Recorded {
    pub method: String,
    pub path: String,
    pub body: String,
}

impl Recorded {
    /// Parse the recorded body as JSON.
    pub fn body_json(&self) -> serde_json::Value {
        serde_json::from_str(&self.body).unwrap()
    }
}

#[derive(Debug, Clone)]
struct Rule {
    method: String,
    path: String,
    status: u16,
    body: String,
}

/// A minimal scripted HTTP/1.1 server standing in for the MOT Club
/// backend. Routes are stubbed per (method, path); the most recently
/// added matching stub wins. Unstubbed routes answer 404.
pub struct MockBackend {
    addr: SocketAddr,
    requests: Arc<Mutex<Vec<Recorded>>>,
    rules: Arc<Mutex<Vec<Rule>>>,
    shutdown: Arc<AtomicBool>,
    handle: Option<JoinHandle<()>>,
}

impl MockBackend {
    pub fn start() -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        let requests: Arc<Mutex<Vec<Recorded>>> = Arc::new(Mutex::new(Vec::new()));
        let rules: Arc<Mutex<Vec<Rule>>> = Arc::new(Mutex::new(Vec::new()));
        let shutdown = Arc::new(AtomicBool::new(false));

        let handle = {
            let requests = Arc::clone(&requests);
            let rules = Arc::clone(&rules);
            let shutdown = Arc::clone(&shutdown);
            std::thread::spawn(move || {
                for stream in listener.incoming() {
                    if shutdown.load(Ordering::SeqCst) {
                        break;
                    }
                    if let Ok(stream) = stream {
                        let _ = handle_connection(stream, &requests, &rules);
                    }
                }
            })
        };

        Self {
            addr,
            requests,
            rules,
            shutdown,
            handle: Some(handle),
        }
    }

    /// Base URL of the fixture backend.
    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// Stub a route. Later stubs for the same route win.
    pub fn stub(&self, method: &str, path: &str, status: u16, body: &str) {
        self.rules.lock().unwrap().push(Rule {
            method: method.to_string(),
            path: path.to_string(),
            status,
            body: body.to_string(),
        });
    }

    /// Stub `GET /api/codes` with the given tree.
    pub fn set_tree(&self, tree: serde_json::Value) {
        self.stub("GET", "/api/codes", 200, &tree.to_string());
    }

    /// All requests the binary made, in order.
    pub fn requests(&self) -> Vec<Recorded> {
        self.requests.lock().unwrap().clone()
    }

    /// (method, path) pairs in order, for asserting request sequences.
    pub fn request_sequence(&self) -> Vec<(String, String)> {
        self.requests()
            .into_iter()
            .map(|r| (r.method, r.path))
            .collect()
    }
}

impl Drop for MockBackend {
    fn drop(&mut self) {
        self.shutdown.store(true, Ordering::SeqCst);
        // Unblock the accept loop
        let _ = TcpStream::connect(self.addr);
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

fn handle_connection(
    stream: TcpStream,
    requests: &Arc<Mutex<Vec<Recorded>>>,
    rules: &Arc<Mutex<Vec<Rule>>>,
) -> std::io::Result<()> {
    let mut reader = BufReader::new(stream.try_clone()?);
    let mut stream = stream;

    let mut request_line = String::new();
    reader.read_line(&mut request_line)?;
    let mut parts = request_line.split_whitespace();
    let method = parts.next().unwrap_or_default().to_string();
    let path = parts.next().unwrap_or_default().to_string();
    if method.is_empty() {
        return Ok(());
    }

    let mut content_length = 0usize;
    loop {
        let mut header = String::new();
        reader.read_line(&mut header)?;
        let header = header.trim_end();
        if header.is_empty() {
            break;
        }
        if let Some((name, value)) = header.split_once(':') {
            if name.eq_ignore_ascii_case("content-length") {
                content_length = value.trim().parse().unwrap_or(0);
            }
        }
    }

    let mut body = vec![0u8; content_length];
    reader.read_exact(&mut body)?;
    let body = String::from_utf8_lossy(&body).to_string();

    requests.lock().unwrap().push(Recorded {
        method: method.clone(),
        path: path.clone(),
        body,
    });

    let rule = rules
        .lock()
        .unwrap()
        .iter()
        .rev()
        .find(|rule| rule.method == method && rule.path == path)
        .cloned();
    let (status, response_body) = match rule {
        Some(rule) => (rule.status, rule.body),
        None => (404, r#"{"message":"no stub for this route"}"#.to_string()),
    };

    let reason = match status {
        200 => "OK",
        201 => "Created",
        204 => "No Content",
        400 => "Bad Request",
        404 => "Not Found",
        500 => "Internal Server Error",
        _ => "Error",
    };
    write!(
        stream,
        "HTTP/1.1 {} {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
        status,
        reason,
        response_body.len(),
        response_body
    )?;
    stream.flush()?;
    Ok(())
}

/// A test environment: fixture backend plus isolated config and data
/// directories, injected per-invocation so tests stay parallel-safe.
pub struct TestEnv {
    pub server: MockBackend,
    pub config_dir: TempDir,
    pub data_dir: TempDir,
}

impl TestEnv {
    pub fn new() -> Self {
        Self {
            server: MockBackend::start(),
            config_dir: TempDir::new().unwrap(),
            data_dir: TempDir::new().unwrap(),
        }
    }

    /// Get a Command for the mot binary wired to the fixture backend.
    pub fn mot(&self) -> Command {
        let mut cmd = Command::new(env!("CARGO_BIN_EXE_mot"));
        cmd.env("MOT_SERVER", self.server.url());
        cmd.env("MOT_CONFIG_DIR", self.config_dir.path());
        cmd.env("MOT_DATA_DIR", self.data_dir.path());
        cmd
    }

    /// Like `mot()`, but without the backend env var, so server-url
    /// resolution can be observed.
    pub fn mot_unwired(&self) -> Command {
        let mut cmd = self.mot();
        cmd.env_remove("MOT_SERVER");
        cmd
    }
}

impl Default for TestEnv {
    fn default() -> Self {
        Self::new()
    }
}
