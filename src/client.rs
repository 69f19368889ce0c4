//! Identity-scoped HTTP client for one service.
//!
//! One `ApiClient` is bound to exactly one base address. Identity is an
//! explicit, immutable [`Session`] value passed into each call rather than
//! state mutated on the client, so the identity behind every request is
//! visible at the call site. Mutating calls carry an `Idempotency-Key`
//! header supplied by the caller.

use crate::config::ServiceTarget;
use crate::error::FlowError;
use crate::idempotency::IdempotencyKey;
use serde_json::Value;
use std::path::Path;
use std::time::{Duration, Instant};
use ureq::Agent;

/// A bearer credential for one authenticated actor. Immutable once issued.
#[derive(Debug, Clone)]
pub struct Session {
    token: String,
}

impl Session {
    pub fn bearer(&self) -> String {
        format!("Bearer {}", self.token)
    }

    #[cfg(test)]
    pub(crate) fn for_tests(token: &str) -> Self {
        Session {
            token: token.to_string(),
        }
    }
}

/// HTTP client bound to a single service base address.
pub struct ApiClient {
    base_url: String,
    agent: Agent,
}

impl ApiClient {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Self {
        let config = Agent::config_builder()
            .timeout_global(Some(timeout))
            // Non-2xx statuses are data, not transport failures; the error
            // taxonomy distinguishes them explicitly.
            .http_status_as_error(false)
            .build();
        ApiClient {
            base_url: base_url.into(),
            agent: config.into(),
        }
    }

    pub fn for_target(target: &ServiceTarget) -> Self {
        ApiClient::new(&target.base_url, target.timeout())
    }

    /// Authenticate and return the credential. Does not retain it.
    pub fn login(&self, identity: &str, secret: &str) -> Result<Session, FlowError> {
        let url = self.url("/auth/login");
        let payload = serde_json::json!({ "email": identity, "password": secret });
        let started = Instant::now();
        let mut response = self
            .agent
            .post(&url)
            .send_json(&payload)
            .map_err(|e| FlowError::transport(&url, e))?;
        let status = response.status();
        tracing::debug!(
            url,
            status = status.as_u16(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "login attempt"
        );
        if !status.is_success() {
            return Err(FlowError::Auth {
                identity: identity.to_string(),
                status: status.as_u16(),
            });
        }
        let body: Value = response
            .body_mut()
            .read_json()
            .map_err(|e| FlowError::transport(&url, e))?;
        let token = body
            .get("token")
            .and_then(Value::as_str)
            .ok_or_else(|| malformed(&url, "login response missing token"))?;
        Ok(Session {
            token: token.to_string(),
        })
    }

    /// Idempotent read. `session` is optional because some endpoints respond
    /// unauthenticated.
    pub fn get(&self, session: Option<&Session>, path: &str) -> Result<Value, FlowError> {
        let url = self.url(path);
        let mut request = self.agent.get(&url);
        if let Some(session) = session {
            request = request.header("Authorization", session.bearer());
        }
        let started = Instant::now();
        let response = request.call().map_err(|e| FlowError::transport(&url, e))?;
        trace_call("GET", &url, &response, started);
        read_json_body("GET", &url, response)
    }

    /// Status-only read for endpoints whose body is not JSON (portal pages).
    pub fn get_status(&self, path: &str) -> Result<u16, FlowError> {
        let url = self.url(path);
        let started = Instant::now();
        let response = self
            .agent
            .get(&url)
            .call()
            .map_err(|e| FlowError::transport(&url, e))?;
        trace_call("GET", &url, &response, started);
        Ok(response.status().as_u16())
    }

    /// Mutating call: bearer credential plus the caller's idempotency key.
    pub fn post(
        &self,
        session: Option<&Session>,
        path: &str,
        body: &Value,
        key: &IdempotencyKey,
    ) -> Result<Value, FlowError> {
        let url = self.url(path);
        let mut request = self.agent.post(&url).header("Idempotency-Key", key.as_str());
        if let Some(session) = session {
            request = request.header("Authorization", session.bearer());
        }
        let started = Instant::now();
        let response = request
            .send_json(body)
            .map_err(|e| FlowError::transport(&url, e))?;
        trace_call("POST", &url, &response, started);
        read_json_body("POST", &url, response)
    }

    /// File-bearing mutating call (multipart). Same contract as [`post`]:
    /// idempotency key attached, same error taxonomy.
    ///
    /// [`post`]: ApiClient::post
    pub fn upload_file(
        &self,
        session: &Session,
        path: &str,
        file: &Path,
        key: &IdempotencyKey,
    ) -> Result<Value, FlowError> {
        let url = self.url(path);
        let bytes = std::fs::read(file).map_err(|e| FlowError::transport(&url, e))?;
        let filename = file
            .file_name()
            .and_then(|name| name.to_str())
            .unwrap_or("evidence.bin");
        let boundary = format!("carbonctl-{}", uuid::Uuid::new_v4().simple());
        let body = multipart_body(&boundary, "file", filename, &bytes);
        let started = Instant::now();
        let response = self
            .agent
            .post(&url)
            .header("Authorization", session.bearer())
            .header("Idempotency-Key", key.as_str())
            .header(
                "Content-Type",
                format!("multipart/form-data; boundary={boundary}"),
            )
            .send(&body[..])
            .map_err(|e| FlowError::transport(&url, e))?;
        trace_call("POST", &url, &response, started);
        read_json_body("POST", &url, response)
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

fn trace_call(
    method: &'static str,
    url: &str,
    response: &ureq::http::Response<ureq::Body>,
    started: Instant,
) {
    tracing::debug!(
        method,
        url,
        status = response.status().as_u16(),
        elapsed_ms = started.elapsed().as_millis() as u64,
        "api call"
    );
}

fn read_json_body(
    method: &'static str,
    url: &str,
    mut response: ureq::http::Response<ureq::Body>,
) -> Result<Value, FlowError> {
    let status = response.status();
    let text = response
        .body_mut()
        .read_to_string()
        .map_err(|e| FlowError::transport(url, e))?;
    if !status.is_success() {
        return Err(FlowError::Rejected {
            method,
            url: url.to_string(),
            status: status.as_u16(),
            body: text,
        });
    }
    if text.trim().is_empty() {
        return Ok(Value::Null);
    }
    serde_json::from_str(&text).map_err(|e| FlowError::transport(url, e))
}

fn malformed(url: &str, message: &str) -> FlowError {
    FlowError::transport(
        url,
        std::io::Error::new(std::io::ErrorKind::InvalidData, message.to_string()),
    )
}

/// Frame a single-file multipart/form-data body. The dependency tree has no
/// multipart codec, so the framing lives here.
fn multipart_body(boundary: &str, field: &str, filename: &str, bytes: &[u8]) -> Vec<u8> {
    let mut body = Vec::with_capacity(bytes.len() + 256);
    body.extend_from_slice(format!("--{boundary}\r\n").as_bytes());
    body.extend_from_slice(
        format!("Content-Disposition: form-data; name=\"{field}\"; filename=\"{filename}\"\r\n")
            .as_bytes(),
    );
    body.extend_from_slice(b"Content-Type: application/octet-stream\r\n\r\n");
    body.extend_from_slice(bytes);
    body.extend_from_slice(format!("\r\n--{boundary}--\r\n").as_bytes());
    body
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn multipart_framing_is_well_formed() {
        let body = multipart_body("B", "file", "baseline.pdf", b"%PDF-1.4");
        let text = String::from_utf8(body).unwrap();
        assert!(text.starts_with("--B\r\n"));
        assert!(text.contains("Content-Disposition: form-data; name=\"file\"; filename=\"baseline.pdf\"\r\n"));
        assert!(text.contains("\r\n\r\n%PDF-1.4\r\n"));
        assert!(text.ends_with("--B--\r\n"));
    }

    #[test]
    fn session_renders_bearer_header() {
        let session = Session::for_tests("tok-123");
        assert_eq!(session.bearer(), "Bearer tok-123");
    }
}
