//! Motcode - taxonomy administration for the MOT Club platform.
//!
//! This library provides the core functionality for the `mot` CLI tool:
//! the common-code tree model, hierarchy lookup helpers, the level-aware
//! node editor, and the REST client talking to the platform backend.

pub mod action_log;
pub mod api;
pub mod cli;
pub mod commands;
pub mod config;
pub mod editor;
pub mod models;
pub mod render;
#[cfg(feature = "tui")]
pub mod tui;

/// Library-level error type for motcode operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// The request never completed (DNS, refused connection, timeout).
    #[error("Request failed: {0}")]
    Transport(String),

    /// The backend answered with a non-success status. `message` is the
    /// backend-provided message when one exists, otherwise the HTTP
    /// status line.
    #[error("Backend error (HTTP {status}): {message}")]
    Api { status: u16, message: String },

    #[error("Code not found: {0}")]
    NotFound(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// A node references a parent id that does not exist in the tree.
    #[error("Code {0} references a parent that is not in the tree")]
    OrphanNode(i64),

    /// The ancestor chain of a node is longer than the three levels the
    /// editor supports.
    #[error("Code {0} is nested deeper than three levels")]
    DepthExceeded(i64),

    #[error("Configuration error: {0}")]
    Config(String),
}

/// Result type alias for motcode operations.
pub type Result<T> = std::result::Result<T, Error>;
