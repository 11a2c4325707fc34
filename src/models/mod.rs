//! Data models for the common-code taxonomy.
//!
//! This module defines the core data structures:
//! - `CodeNode` - One entry of the three-level classification tree
//! - `CodePayload` - The create/update wire body sent to the backend
//! - `MenuName` - The fixed set of top-level platform domains
//! - `NodeLevel` - Explicit depth tier of a node (level 1/2/3)

pub mod tree;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Top-level platform domain a taxonomy subtree belongs to.
///
/// Every node in a subtree shares the `MenuName` of its level-1 root;
/// deeper nodes never carry an independently chosen value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MenuName {
    Library,
    Learning,
    Opinion,
    News,
    Qna,
}

impl MenuName {
    /// All menus, in display order.
    pub const ALL: [MenuName; 5] = [
        MenuName::Library,
        MenuName::Learning,
        MenuName::Opinion,
        MenuName::News,
        MenuName::Qna,
    ];

    /// Parse from string, case-insensitive.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "library" => Some(MenuName::Library),
            "learning" => Some(MenuName::Learning),
            "opinion" => Some(MenuName::Opinion),
            "news" => Some(MenuName::News),
            "qna" => Some(MenuName::Qna),
            _ => None,
        }
    }

    /// Convert to the wire representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            MenuName::Library => "Library",
            MenuName::Learning => "Learning",
            MenuName::Opinion => "Opinion",
            MenuName::News => "News",
            MenuName::Qna => "Qna",
        }
    }
}

impl fmt::Display for MenuName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Depth tier of a node, always computed by walking parent references.
///
/// The tree never stores a level field: a denormalized level could drift
/// out of sync with the actual tree shape, so the tier is recomputed at
/// the moment it is needed (edit-open, save).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NodeLevel {
    Level1,
    Level2,
    Level3,
}

impl NodeLevel {
    /// 1-based depth of this tier.
    pub fn depth(&self) -> usize {
        match self {
            NodeLevel::Level1 => 1,
            NodeLevel::Level2 => 2,
            NodeLevel::Level3 => 3,
        }
    }

    /// The tier of a child created under this one. `None` for level 3:
    /// the editor supports no fourth level.
    pub fn child(&self) -> Option<NodeLevel> {
        match self {
            NodeLevel::Level1 => Some(NodeLevel::Level2),
            NodeLevel::Level2 => Some(NodeLevel::Level3),
            NodeLevel::Level3 => None,
        }
    }

    /// Build a tier from a 1-based depth.
    pub fn from_depth(depth: usize) -> Option<NodeLevel> {
        match depth {
            1 => Some(NodeLevel::Level1),
            2 => Some(NodeLevel::Level2),
            3 => Some(NodeLevel::Level3),
            _ => None,
        }
    }
}

impl fmt::Display for NodeLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "level {}", self.depth())
    }
}

/// One entry of the classification tree, as returned by the backend.
///
/// The backend returns the full hierarchy pre-nested: each node arrives
/// with its immediate descendants under `children`, and the client never
/// rebuilds the tree from a flat list.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CodeNode {
    /// Unique identifier, assigned by the backend; immutable once created
    pub id: i64,

    /// Domain of the subtree this node belongs to, inherited from the
    /// level-1 ancestor
    pub menu_name: MenuName,

    /// Human-readable label
    pub code_name: String,

    /// Derived machine token: uppercased `code_name` at save time
    pub code_value: String,

    /// Optional free-text annotation
    #[serde(default)]
    pub description: Option<String>,

    /// Display order, meaningful only at level 3 (ascending)
    #[serde(default)]
    pub sort_order: Option<i64>,

    /// Owning node; `None` marks a level-1 root
    #[serde(default)]
    pub parent_id: Option<i64>,

    /// Immediate descendants, populated by the backend response
    #[serde(default)]
    pub children: Vec<CodeNode>,

    /// Creation timestamp, informational only
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,

    /// Last update timestamp, informational only
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl CodeNode {
    /// Whether this node has at least one child.
    pub fn has_children(&self) -> bool {
        !self.children.is_empty()
    }
}

/// Wire body for `POST /api/codes` and `PUT /api/codes/{id}`.
///
/// Every field is always serialized: the backend expects `sortOrder` as
/// an explicit `null` for level-1/2 writes (it computes the order for
/// those tiers itself).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CodePayload {
    pub menu_name: MenuName,
    pub code_name: String,
    pub code_value: String,
    pub description: Option<String>,
    pub sort_order: Option<i64>,
    pub parent_id: Option<i64>,
}

/// Compute the machine token for a label.
///
/// The token is never entered by the user; it is recomputed from the
/// label on every create and update.
pub fn derive_code_value(code_name: &str) -> String {
    code_name.trim().to_uppercase()
}
