//! Hierarchy algorithms for the classification tree.
//!
//! This module provides the pure, in-memory helpers the editor and the
//! renderer are built on: depth-first lookup, level-1 ancestor
//! resolution, level detection, sibling ordering, expansion tracking,
//! and flattening of the tree into visible rows.
//!
//! The tree is a value, not a graph: every node owns its children, and
//! nodes are always located by id comparison, never by reference.

use std::cmp::Ordering;
use std::collections::HashSet;

use crate::models::{CodeNode, NodeLevel};
use crate::{Error, Result};

/// Maximum supported nesting. The editor knows three tiers; anything
/// deeper is rejected rather than misclassified.
pub const MAX_DEPTH: usize = 3;

/// Depth-first search for a node with the given id.
///
/// Roots first, then each node's children, recursively. Used whenever a
/// `parent_id` has to be resolved to an actual node (e.g. to read its
/// inherited menu).
pub fn find_node(tree: &[CodeNode], id: i64) -> Option<&CodeNode> {
    for node in tree {
        if node.id == id {
            return Some(node);
        }
        if let Some(found) = find_node(&node.children, id) {
            return Some(found);
        }
    }
    None
}

/// Walk upward to the level-1 ancestor of `node`.
///
/// A node without a parent is its own ancestor. The walk is bounded by
/// [`MAX_DEPTH`], so a malformed (cyclic or over-deep) tree returns
/// `None` instead of recursing forever.
pub fn find_level1_ancestor<'a>(tree: &'a [CodeNode], node: &'a CodeNode) -> Option<&'a CodeNode> {
    let mut current = node;
    for _ in 0..MAX_DEPTH {
        match current.parent_id {
            None => return Some(current),
            Some(parent_id) => current = find_node(tree, parent_id)?,
        }
    }
    None
}

/// Detect the tier of `node` by walking its full ancestor chain.
///
/// - no parent: level 1
/// - parent has no parent: level 2
/// - parent has a parent: level 3
///
/// A `parent_id` that resolves nowhere in the tree is an error
/// ([`Error::OrphanNode`]); a chain longer than [`MAX_DEPTH`] hops -
/// including the degenerate cyclic case - is [`Error::DepthExceeded`].
pub fn level_of(tree: &[CodeNode], node: &CodeNode) -> Result<NodeLevel> {
    let mut depth = 1;
    let mut current = node;
    while let Some(parent_id) = current.parent_id {
        current = find_node(tree, parent_id).ok_or(Error::OrphanNode(current.id))?;
        depth += 1;
        if depth > MAX_DEPTH {
            return Err(Error::DepthExceeded(node.id));
        }
    }
    NodeLevel::from_depth(depth).ok_or(Error::DepthExceeded(node.id))
}

/// Default sort order for a new level-3 node under `parent`:
/// `max(existing sibling sort_order) + 1`, starting at 1 when no sibling
/// carries an order yet.
pub fn next_sort_order(parent: &CodeNode) -> i64 {
    parent
        .children
        .iter()
        .filter_map(|child| child.sort_order)
        .max()
        .map_or(1, |max| max + 1)
}

/// Roots, ordered alphabetically by `code_name`.
pub fn sorted_roots(tree: &[CodeNode]) -> Vec<&CodeNode> {
    let mut roots: Vec<&CodeNode> = tree.iter().collect();
    roots.sort_by(|a, b| a.code_name.cmp(&b.code_name));
    roots
}

/// Children of `node` in display order, given the node's own tier.
///
/// Children of a level-1 node sort alphabetically; children of a level-2
/// node sort by ascending `sort_order` with missing orders last (ties
/// and order-less runs fall back to the label). A level-3 node has no
/// renderable children.
pub fn sorted_children(node: &CodeNode, level: NodeLevel) -> Vec<&CodeNode> {
    if level == NodeLevel::Level3 {
        return Vec::new();
    }

    let mut children: Vec<&CodeNode> = node.children.iter().collect();
    match level {
        NodeLevel::Level1 => children.sort_by(|a, b| a.code_name.cmp(&b.code_name)),
        _ => children.sort_by(|a, b| match (a.sort_order, b.sort_order) {
            (Some(x), Some(y)) => x.cmp(&y).then_with(|| a.code_name.cmp(&b.code_name)),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => a.code_name.cmp(&b.code_name),
        }),
    }

    children
}

/// Ids of interior nodes currently expanded in the UI.
///
/// Reset to empty (everything collapsed) after each fetch: ids may
/// vanish between fetches, and stale expansion state would go unnoticed.
#[derive(Debug, Clone, Default)]
pub struct ExpansionState {
    expanded: HashSet<i64>,
}

impl ExpansionState {
    /// Create an empty (all collapsed) state.
    pub fn new() -> Self {
        Self::default()
    }

    /// Expand if collapsed, collapse if expanded. Pure and synchronous.
    pub fn toggle(&mut self, id: i64) {
        if !self.expanded.remove(&id) {
            self.expanded.insert(id);
        }
    }

    /// Whether the node is currently expanded.
    pub fn is_expanded(&self, id: i64) -> bool {
        self.expanded.contains(&id)
    }

    /// Collapse everything.
    pub fn clear(&mut self) {
        self.expanded.clear();
    }

    /// Expand every expandable node of the tree (used by `mot tree`).
    pub fn expand_all(&mut self, tree: &[CodeNode]) {
        fn mark(nodes: &[CodeNode], depth: usize, expanded: &mut HashSet<i64>) {
            for node in nodes {
                if node.has_children() && depth < MAX_DEPTH {
                    expanded.insert(node.id);
                    mark(&node.children, depth + 1, expanded);
                }
            }
        }
        mark(tree, 1, &mut self.expanded);
    }

    /// Number of expanded nodes.
    pub fn len(&self) -> usize {
        self.expanded.len()
    }

    /// Whether nothing is expanded.
    pub fn is_empty(&self) -> bool {
        self.expanded.is_empty()
    }
}

/// One visible row of the rendered tree.
#[derive(Debug, Clone, Copy)]
pub struct TreeRow<'a> {
    /// The node shown on this row
    pub node: &'a CodeNode,
    /// 1-based depth of the row
    pub depth: usize,
    /// Whether the row can be expanded (has children within the
    /// supported depth)
    pub expandable: bool,
    /// Whether the row is currently expanded
    pub expanded: bool,
}

/// Flatten the tree into the ordered list of currently visible rows.
///
/// Roots render alphabetically; an expanded row recursively contributes
/// its ordered children. Rendering the same tree with the same expansion
/// state always yields the same rows.
pub fn visible_rows<'a>(tree: &'a [CodeNode], expansion: &ExpansionState) -> Vec<TreeRow<'a>> {
    fn push<'a>(
        node: &'a CodeNode,
        depth: usize,
        expansion: &ExpansionState,
        rows: &mut Vec<TreeRow<'a>>,
    ) {
        let expandable = node.has_children() && depth < MAX_DEPTH;
        let expanded = expandable && expansion.is_expanded(node.id);
        rows.push(TreeRow {
            node,
            depth,
            expandable,
            expanded,
        });

        if expanded {
            if let Some(level) = NodeLevel::from_depth(depth) {
                for child in sorted_children(node, level) {
                    push(child, depth + 1, expansion, rows);
                }
            }
        }
    }

    let mut rows = Vec::new();
    for root in sorted_roots(tree) {
        push(root, 1, expansion, &mut rows);
    }
    rows
}
