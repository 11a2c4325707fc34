//! REST client for the MOT Club backend's common-code surface.
//!
//! The backend owns all business logic (uniqueness, referential
//! integrity, cascade deletion); this client only moves JSON. Exact
//! paths consumed:
//! - `GET    /api/codes`      - full nested tree
//! - `POST   /api/codes`      - create one code
//! - `PUT    /api/codes/{id}` - update one code
//! - `DELETE /api/codes/{id}` - delete one code
//!
//! Mutations deliberately return no data: callers follow every
//! successful mutation with a full refetch (command-then-query), so any
//! success body the backend might send is ignored.

use std::time::Duration;

use crate::models::{CodeNode, CodePayload};
use crate::{Error, Result};

/// Request timeout for all backend calls.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// User-Agent header sent with every request.
const USER_AGENT: &str = "motcode-cli";

/// Client for the backend REST surface.
pub struct ApiClient {
    base_url: String,
    agent: ureq::Agent,
}

impl ApiClient {
    /// Create a client for the given server base URL (scheme + host +
    /// optional port, with or without a trailing slash).
    pub fn new(base_url: &str) -> Self {
        let agent = ureq::AgentBuilder::new()
            .timeout(REQUEST_TIMEOUT)
            .user_agent(USER_AGENT)
            .build();
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            agent,
        }
    }

    /// The server base URL this client talks to.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn codes_url(&self) -> String {
        format!("{}/api/codes", self.base_url)
    }

    fn code_url(&self, id: i64) -> String {
        format!("{}/api/codes/{}", self.base_url, id)
    }

    /// Fetch the full nested tree.
    ///
    /// The backend returns each node pre-nested under `children`; no
    /// client-side tree building occurs. On failure the caller keeps
    /// whatever tree it already had.
    pub fn fetch_codes(&self) -> Result<Vec<CodeNode>> {
        let response = self
            .agent
            .get(&self.codes_url())
            .set("Accept", "application/json")
            .call();

        match response {
            Ok(resp) => Ok(resp.into_json()?),
            Err(err) => Err(map_error(err)),
        }
    }

    /// Create a code. `payload.sort_order` must be `None` for level-1/2
    /// creations (the backend computes it) and explicit for level 3.
    pub fn create_code(&self, payload: &CodePayload) -> Result<()> {
        let response = self.agent.post(&self.codes_url()).send_json(payload);

        match response {
            Ok(_) => Ok(()),
            Err(err) => Err(map_error(err)),
        }
    }

    /// Update a code with the same body shape as create.
    pub fn update_code(&self, id: i64, payload: &CodePayload) -> Result<()> {
        let response = self.agent.put(&self.code_url(id)).send_json(payload);

        match response {
            Ok(_) => Ok(()),
            Err(err) => Err(map_error(err)),
        }
    }

    /// Delete a single code. Cascade behavior is the backend's concern.
    pub fn delete_code(&self, id: i64) -> Result<()> {
        let response = self.agent.delete(&self.code_url(id)).call();

        match response {
            Ok(_) => Ok(()),
            Err(err) => Err(map_error(err)),
        }
    }
}

/// Map a ureq failure onto the crate error taxonomy.
///
/// Non-success statuses carry the backend-provided message when the
/// body has one, otherwise the HTTP status line. Everything else
/// (DNS, refused connection, timeout) is a transport failure.
fn map_error(err: ureq::Error) -> Error {
    match err {
        ureq::Error::Status(status, resp) => {
            let status_text = resp.status_text().to_string();
            let body = resp.into_string().unwrap_or_default();
            let message = backend_message(&body).unwrap_or_else(|| {
                if status_text.is_empty() {
                    format!("HTTP {}", status)
                } else {
                    status_text
                }
            });
            Error::Api { status, message }
        }
        other => Error::Transport(other.to_string()),
    }
}

/// Extract the backend's error message from a response body, if any.
///
/// The backend reports failures as `{"message": "..."}`; some proxies
/// in front of it use `{"error": "..."}` instead.
fn backend_message(body: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(body).ok()?;
    for key in ["message", "error"] {
        if let Some(msg) = value.get(key).and_then(|v| v.as_str()) {
            if !msg.trim().is_empty() {
                return Some(msg.to_string());
            }
        }
    }
    None
}
