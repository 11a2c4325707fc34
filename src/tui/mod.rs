//! Terminal user interface for the taxonomy editor.
//!
//! This module provides a keyboard-driven TUI mirroring the web admin
//! screen: the classification tree with expand/collapse, a level-aware
//! modal editor for create/update, and confirmed deletion. All backend
//! traffic goes through the same blocking [`crate::api::ApiClient`] as
//! the CLI; one operation is in flight at a time.

mod app;
mod editor;

pub use app::run;
pub use editor::{EditorModal, Field, ModalEvent};
