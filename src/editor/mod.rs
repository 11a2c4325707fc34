//! Level-aware create/update form for classification codes.
//!
//! One form serves all three tiers; which fields are exposed and how
//! inherited attributes are computed depends on an explicit
//! [`NodeLevel`] determined once, at form-open time, by walking parent
//! references through the current tree:
//!
//! | field       | level 1        | level 2            | level 3                |
//! |-------------|----------------|--------------------|------------------------|
//! | menu_name   | editable       | inherited (parent) | inherited (two hops)   |
//! | code_name   | required       | required           | required               |
//! | description | optional       | optional           | optional               |
//! | sort_order  | hidden         | hidden             | numeric, default max+1 |
//!
//! The form never mutates the tree it was opened against; it only
//! assembles the wire payload. Dispatching the payload and refetching
//! afterwards is the caller's job.

use crate::models::tree::{find_level1_ancestor, find_node, level_of, next_sort_order};
use crate::models::{CodeNode, CodePayload, MenuName, NodeLevel, derive_code_value};
use crate::{Error, Result};

/// What the form was opened for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditorMode {
    /// Creating a new node under the captured parent context
    Create,
    /// Editing the existing node with this id
    Edit(i64),
}

/// In-flight state of the node editor.
#[derive(Debug, Clone)]
pub struct EditorForm {
    mode: EditorMode,
    level: NodeLevel,
    menu_name: MenuName,
    code_name: String,
    description: String,
    /// Level-3 order field. Preloaded with the node's current value on
    /// edit, with the computed sibling default on create.
    sort_order: Option<i64>,
    /// Order value carried through unchanged on level-1/2 updates.
    passthrough_sort_order: Option<i64>,
    parent_id: Option<i64>,
}

impl EditorForm {
    /// Open the form to create a new level-1 node.
    pub fn create_root(menu_name: MenuName) -> Self {
        Self {
            mode: EditorMode::Create,
            level: NodeLevel::Level1,
            menu_name,
            code_name: String::new(),
            description: String::new(),
            sort_order: None,
            passthrough_sort_order: None,
            parent_id: None,
        }
    }

    /// Open the form to create a child of `parent_id`.
    ///
    /// The child's tier is the parent's plus one; a level-3 parent is
    /// rejected, since no fourth level exists. The menu is inherited
    /// from the parent's level-1 ancestor and a level-3 child gets the
    /// sibling-derived default order.
    pub fn create_child(tree: &[CodeNode], parent_id: i64) -> Result<Self> {
        let parent = find_node(tree, parent_id)
            .ok_or_else(|| Error::NotFound(format!("parent code {}", parent_id)))?;
        let parent_level = level_of(tree, parent)?;
        let level = parent_level.child().ok_or_else(|| {
            Error::InvalidInput(format!(
                "code {} is at level 3; codes cannot be nested deeper",
                parent_id
            ))
        })?;
        let ancestor =
            find_level1_ancestor(tree, parent).ok_or(Error::OrphanNode(parent_id))?;

        let sort_order = match level {
            NodeLevel::Level3 => Some(next_sort_order(parent)),
            _ => None,
        };

        Ok(Self {
            mode: EditorMode::Create,
            level,
            menu_name: ancestor.menu_name,
            code_name: String::new(),
            description: String::new(),
            sort_order,
            passthrough_sort_order: None,
            parent_id: Some(parent_id),
        })
    }

    /// Open the form to edit an existing node.
    ///
    /// The tier is auto-detected by a full tree walk and the inherited
    /// menu is recomputed from the ancestor chain, so a stale or
    /// inconsistent `menu_name` on a deep node is corrected on save.
    pub fn edit(tree: &[CodeNode], id: i64) -> Result<Self> {
        let node = find_node(tree, id).ok_or_else(|| Error::NotFound(format!("code {}", id)))?;
        let level = level_of(tree, node)?;
        let menu_name = match level {
            NodeLevel::Level1 => node.menu_name,
            _ => {
                find_level1_ancestor(tree, node)
                    .ok_or(Error::OrphanNode(id))?
                    .menu_name
            }
        };

        let (sort_order, passthrough_sort_order) = match level {
            NodeLevel::Level3 => (node.sort_order, None),
            _ => (None, node.sort_order),
        };

        Ok(Self {
            mode: EditorMode::Edit(id),
            level,
            menu_name,
            code_name: node.code_name.clone(),
            description: node.description.clone().unwrap_or_default(),
            sort_order,
            passthrough_sort_order,
            parent_id: node.parent_id,
        })
    }

    pub fn mode(&self) -> EditorMode {
        self.mode
    }

    pub fn level(&self) -> NodeLevel {
        self.level
    }

    pub fn menu_name(&self) -> MenuName {
        self.menu_name
    }

    pub fn code_name(&self) -> &str {
        &self.code_name
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn sort_order(&self) -> Option<i64> {
        self.sort_order
    }

    pub fn parent_id(&self) -> Option<i64> {
        self.parent_id
    }

    /// The menu is only directly editable on level-1 nodes.
    pub fn menu_editable(&self) -> bool {
        self.level == NodeLevel::Level1
    }

    /// The order field is only shown for level-3 nodes.
    pub fn shows_sort_order(&self) -> bool {
        self.level == NodeLevel::Level3
    }

    pub fn set_code_name(&mut self, code_name: impl Into<String>) {
        self.code_name = code_name.into();
    }

    pub fn set_description(&mut self, description: impl Into<String>) {
        self.description = description.into();
    }

    /// Change the menu of a level-1 node. Deeper tiers inherit and may
    /// not be set directly.
    pub fn set_menu_name(&mut self, menu_name: MenuName) -> Result<()> {
        if !self.menu_editable() {
            return Err(Error::InvalidInput(format!(
                "menu is inherited from the level-1 ancestor for a {} code",
                self.level
            )));
        }
        self.menu_name = menu_name;
        Ok(())
    }

    /// Set the order of a level-3 node (minimum 1).
    pub fn set_sort_order(&mut self, sort_order: i64) -> Result<()> {
        if !self.shows_sort_order() {
            return Err(Error::InvalidInput(format!(
                "sort order only applies to level-3 codes, not a {} code",
                self.level
            )));
        }
        if sort_order < 1 {
            return Err(Error::InvalidInput(format!(
                "sort order must be at least 1, got {}",
                sort_order
            )));
        }
        self.sort_order = Some(sort_order);
        Ok(())
    }

    /// The only client-side validation: a non-blank label. Uniqueness
    /// and referential integrity stay with the backend.
    pub fn validate(&self) -> Result<()> {
        if self.code_name.trim().is_empty() {
            return Err(Error::InvalidInput("code name must not be empty".to_string()));
        }
        Ok(())
    }

    /// Assemble the wire body.
    ///
    /// `code_value` is recomputed from the label on every save. The
    /// order slot is the level-3 field value for level 3, and the
    /// untouched pass-through value (if any) for level 1/2 updates.
    pub fn payload(&self) -> Result<CodePayload> {
        self.validate()?;

        let description = {
            let trimmed = self.description.trim();
            if trimmed.is_empty() {
                None
            } else {
                Some(trimmed.to_string())
            }
        };

        let sort_order = match self.level {
            NodeLevel::Level3 => self.sort_order,
            _ => self.passthrough_sort_order,
        };

        Ok(CodePayload {
            menu_name: self.menu_name,
            code_name: self.code_name.trim().to_string(),
            code_value: derive_code_value(&self.code_name),
            description,
            sort_order,
            parent_id: self.parent_id,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn node(id: i64, code_name: &str, parent_id: Option<i64>, children: Vec<CodeNode>) -> CodeNode {
        CodeNode {
            id,
            menu_name: MenuName::Library,
            code_name: code_name.to_string(),
            code_value: code_name.to_uppercase(),
            description: None,
            sort_order: None,
            parent_id,
            children,
            created_at: None,
            updated_at: None,
        }
    }

    /// Library(1) > Sources(2) > {Tech(4, order 3), Science(5, order 7)}
    fn sample_tree() -> Vec<CodeNode> {
        let mut tech = node(4, "Tech", Some(2), vec![]);
        tech.sort_order = Some(3);
        tech.description = Some("technology".to_string());
        let mut science = node(5, "Science", Some(2), vec![]);
        science.sort_order = Some(7);

        vec![node(
            1,
            "Library",
            None,
            vec![node(2, "Sources", Some(1), vec![tech, science])],
        )]
    }

    #[test]
    fn test_edit_root_is_level1_with_editable_menu() {
        let tree = sample_tree();
        let form = EditorForm::edit(&tree, 1).unwrap();
        assert_eq!(form.level(), NodeLevel::Level1);
        assert!(form.menu_editable());
        assert!(!form.shows_sort_order());
    }

    #[test]
    fn test_edit_level2_inherits_parent_menu_read_only() {
        let tree = sample_tree();
        let mut form = EditorForm::edit(&tree, 2).unwrap();
        assert_eq!(form.level(), NodeLevel::Level2);
        assert_eq!(form.menu_name(), MenuName::Library);
        assert!(!form.menu_editable());
        assert!(form.set_menu_name(MenuName::News).is_err());
    }

    #[test]
    fn test_edit_level3_inherits_menu_two_hops_up() {
        let tree = sample_tree();
        let form = EditorForm::edit(&tree, 4).unwrap();
        assert_eq!(form.level(), NodeLevel::Level3);
        assert_eq!(form.menu_name(), MenuName::Library);
        assert!(!form.menu_editable());
        assert!(form.shows_sort_order());
        assert_eq!(form.sort_order(), Some(3));
    }

    #[test]
    fn test_edit_unknown_id() {
        let tree = sample_tree();
        match EditorForm::edit(&tree, 404) {
            Err(Error::NotFound(_)) => {}
            other => panic!("expected NotFound, got {:?}", other),
        }
    }

    #[test]
    fn test_create_child_of_root_pre_seeds_level2() {
        let tree = sample_tree();
        let form = EditorForm::create_child(&tree, 1).unwrap();
        assert_eq!(form.level(), NodeLevel::Level2);
        assert_eq!(form.menu_name(), MenuName::Library);
        assert_eq!(form.parent_id(), Some(1));
        assert!(!form.shows_sort_order());
    }

    #[test]
    fn test_create_child_of_level2_defaults_order_to_max_plus_one() {
        let tree = sample_tree();
        let form = EditorForm::create_child(&tree, 2).unwrap();
        assert_eq!(form.level(), NodeLevel::Level3);
        // Existing siblings carry orders 3 and 7
        assert_eq!(form.sort_order(), Some(8));
    }

    #[test]
    fn test_create_child_of_level2_without_siblings_defaults_to_one() {
        let tree = vec![node(
            1,
            "Library",
            None,
            vec![node(2, "Sources", Some(1), vec![])],
        )];
        let form = EditorForm::create_child(&tree, 2).unwrap();
        assert_eq!(form.sort_order(), Some(1));
    }

    #[test]
    fn test_create_child_below_level3_rejected() {
        let tree = sample_tree();
        match EditorForm::create_child(&tree, 4) {
            Err(Error::InvalidInput(msg)) => assert!(msg.contains("level 3")),
            other => panic!("expected InvalidInput, got {:?}", other),
        }
    }

    #[test]
    fn test_validate_rejects_blank_code_name() {
        let mut form = EditorForm::create_root(MenuName::Library);
        assert!(form.validate().is_err());
        form.set_code_name("   ");
        assert!(form.validate().is_err());
        form.set_code_name("Sources");
        assert!(form.validate().is_ok());
    }

    #[test]
    fn test_payload_scenario_add_level2_child() {
        // Tree contains one level-1 node; adding a child and saving must
        // post the inherited menu, uppercased value, parent id, and a
        // null sort order.
        let tree = vec![node(1, "Library", None, vec![])];
        let mut form = EditorForm::create_child(&tree, 1).unwrap();
        form.set_code_name("자료출처");

        let payload = form.payload().unwrap();
        assert_eq!(payload.menu_name, MenuName::Library);
        assert_eq!(payload.code_name, "자료출처");
        assert_eq!(payload.code_value, "자료출처".to_uppercase());
        assert_eq!(payload.parent_id, Some(1));
        assert_eq!(payload.sort_order, None);
    }

    #[test]
    fn test_payload_scenario_add_first_level3_child() {
        let tree = vec![node(
            1,
            "Library",
            None,
            vec![node(2, "Sources", Some(1), vec![])],
        )];
        let mut form = EditorForm::create_child(&tree, 2).unwrap();
        form.set_code_name("기술");

        let payload = form.payload().unwrap();
        assert_eq!(payload.menu_name, MenuName::Library);
        assert_eq!(payload.code_name, "기술");
        assert_eq!(payload.code_value, "기술".to_uppercase());
        assert_eq!(payload.parent_id, Some(2));
        assert_eq!(payload.sort_order, Some(1));
    }

    #[test]
    fn test_payload_scenario_edit_description_only() {
        // Changing only the description of a level-3 node must still
        // submit the unchanged order, label, and recomputed inheritance.
        let tree = sample_tree();
        let mut form = EditorForm::edit(&tree, 4).unwrap();
        form.set_description("updated");

        let payload = form.payload().unwrap();
        assert_eq!(payload.sort_order, Some(3));
        assert_eq!(payload.code_name, "Tech");
        assert_eq!(payload.menu_name, MenuName::Library);
        assert_eq!(payload.parent_id, Some(2));
        assert_eq!(payload.description, Some("updated".to_string()));
    }

    #[test]
    fn test_payload_recomputes_code_value() {
        // A stale code_value on the node must not survive an edit
        let mut tree = sample_tree();
        tree[0].children[0].code_value = "OUTDATED".to_string();
        let mut form = EditorForm::edit(&tree, 2).unwrap();
        form.set_code_name("sources v2");

        let payload = form.payload().unwrap();
        assert_eq!(payload.code_value, "SOURCES V2");
    }

    #[test]
    fn test_payload_level2_edit_passes_existing_order_through() {
        let mut tree = sample_tree();
        tree[0].children[0].sort_order = Some(42);
        let form = EditorForm::edit(&tree, 2).unwrap();

        assert!(!form.shows_sort_order());
        let payload = form.payload().unwrap();
        assert_eq!(payload.sort_order, Some(42));
    }

    #[test]
    fn test_set_sort_order_bounds() {
        let tree = sample_tree();
        let mut form = EditorForm::edit(&tree, 4).unwrap();
        assert!(form.set_sort_order(0).is_err());
        assert!(form.set_sort_order(1).is_ok());
        assert_eq!(form.sort_order(), Some(1));

        let mut level2 = EditorForm::edit(&tree, 2).unwrap();
        assert!(level2.set_sort_order(5).is_err());
    }

    #[test]
    fn test_payload_blank_description_becomes_null() {
        let tree = sample_tree();
        let mut form = EditorForm::edit(&tree, 4).unwrap();
        form.set_description("   ");
        let payload = form.payload().unwrap();
        assert_eq!(payload.description, None);
    }
}
