//! Text rendering of the classification tree.
//!
//! Turns the deterministic row list from [`crate::models::tree`] into
//! indented lines for the CLI and the TUI. Expandable rows carry a
//! disclosure glyph; leaf rows get a blank placeholder of the same
//! width so the label column stays aligned.

use crate::models::NodeLevel;
use crate::models::tree::TreeRow;

/// Glyph for an expanded row.
const GLYPH_EXPANDED: &str = "▾ ";
/// Glyph for a collapsed, expandable row.
const GLYPH_COLLAPSED: &str = "▸ ";
/// Same-width placeholder for leaf rows.
const GLYPH_LEAF: &str = "  ";

/// Indentation per depth tier.
const INDENT: &str = "  ";

/// Render a single row.
pub fn render_row(row: &TreeRow) -> String {
    let indent = INDENT.repeat(row.depth.saturating_sub(1));
    let glyph = if !row.expandable {
        GLYPH_LEAF
    } else if row.expanded {
        GLYPH_EXPANDED
    } else {
        GLYPH_COLLAPSED
    };

    let mut line = format!("{}{}{} (#{})", indent, glyph, row.node.code_name, row.node.id);

    // Only the deepest tier is ordered by an explicit key; show it
    if row.depth == NodeLevel::Level3.depth() {
        if let Some(order) = row.node.sort_order {
            line.push_str(&format!(" [order {}]", order));
        }
    }

    line
}

/// Render the whole row list, one line per row.
pub fn render_rows(rows: &[TreeRow]) -> String {
    rows.iter()
        .map(render_row)
        .collect::<Vec<_>>()
        .join("\n")
}
