//! Command implementations for the motcode CLI.
//!
//! This module contains the business logic for each CLI command. Every
//! mutation follows the explicit two-step protocol: dispatch the
//! command, then refetch the whole tree. Nothing is patched locally -
//! on failure the backend state and the caller's view both stay as
//! they were.

use std::path::PathBuf;

use serde::Serialize;

use crate::api::ApiClient;
use crate::config::{self, MotConfig, Overrides, ResolvedSettings};
use crate::editor::EditorForm;
use crate::models::tree::{ExpansionState, find_level1_ancestor, find_node, level_of, visible_rows};
use crate::models::{CodeNode, MenuName, NodeLevel};
use crate::render::render_rows;
use crate::{Error, Result};

/// Command results that can be serialized to JSON or formatted for humans.
pub trait CommandResult {
    /// Serialize to JSON string.
    fn to_json(&self) -> String;

    /// Format for human-readable output.
    fn to_human(&self) -> String;
}

fn to_json_string<T: Serialize>(value: &T) -> String {
    serde_json::to_string(value).unwrap_or_else(|_| "{}".to_string())
}

/// Count every node of the tree, all tiers included.
fn count_nodes(tree: &[CodeNode]) -> usize {
    tree.iter()
        .map(|node| 1 + count_nodes(&node.children))
        .sum()
}

// === tree ===

/// Result of `mot tree`.
#[derive(Debug, Serialize)]
pub struct TreeResult {
    /// Total number of codes across all tiers
    pub count: usize,
    /// The (possibly menu-filtered) root nodes
    pub codes: Vec<CodeNode>,
    /// Whether the human rendering collapses to roots only
    #[serde(skip)]
    collapsed: bool,
}

impl CommandResult for TreeResult {
    fn to_json(&self) -> String {
        to_json_string(self)
    }

    fn to_human(&self) -> String {
        if self.codes.is_empty() {
            return "No codes defined".to_string();
        }

        let mut expansion = ExpansionState::new();
        if !self.collapsed {
            expansion.expand_all(&self.codes);
        }
        let rows = visible_rows(&self.codes, &expansion);
        format!("{}\n{} codes", render_rows(&rows), self.count)
    }
}

/// Fetch and render the classification tree, optionally filtered to
/// the subtrees of one menu.
pub fn tree(client: &ApiClient, menu: Option<MenuName>, collapsed: bool) -> Result<TreeResult> {
    let mut codes = client.fetch_codes()?;
    if let Some(menu) = menu {
        codes.retain(|root| root.menu_name == menu);
    }

    Ok(TreeResult {
        count: count_nodes(&codes),
        codes,
        collapsed,
    })
}

// === show ===

/// Result of `mot show`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ShowResult {
    pub id: i64,
    pub level: NodeLevel,
    pub menu_name: MenuName,
    pub code_name: String,
    pub code_value: String,
    pub description: Option<String>,
    pub sort_order: Option<i64>,
    pub parent_id: Option<i64>,
    pub level1_ancestor_id: i64,
    pub child_count: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<chrono::DateTime<chrono::Utc>>,
}

impl CommandResult for ShowResult {
    fn to_json(&self) -> String {
        to_json_string(self)
    }

    fn to_human(&self) -> String {
        let mut lines = vec![
            format!("Code #{} \"{}\" ({})", self.id, self.code_name, self.level),
            format!("  menu:     {}", self.menu_name),
            format!("  value:    {}", self.code_value),
        ];
        if let Some(ref description) = self.description {
            lines.push(format!("  desc:     {}", description));
        }
        if let Some(order) = self.sort_order {
            lines.push(format!("  order:    {}", order));
        }
        match self.parent_id {
            Some(parent) => lines.push(format!("  parent:   #{}", parent)),
            None => lines.push("  parent:   (root)".to_string()),
        }
        lines.push(format!("  children: {}", self.child_count));
        if let Some(updated) = self.updated_at {
            lines.push(format!("  updated:  {}", updated.to_rfc3339()));
        }
        lines.join("\n")
    }
}

/// Show one code with its detected level and ancestry.
pub fn show(client: &ApiClient, id: i64) -> Result<ShowResult> {
    let tree = client.fetch_codes()?;
    let node = find_node(&tree, id).ok_or_else(|| Error::NotFound(format!("code {}", id)))?;
    let level = level_of(&tree, node)?;
    let ancestor = find_level1_ancestor(&tree, node).ok_or(Error::OrphanNode(id))?;

    Ok(ShowResult {
        id: node.id,
        level,
        menu_name: ancestor.menu_name,
        code_name: node.code_name.clone(),
        code_value: node.code_value.clone(),
        description: node.description.clone(),
        sort_order: node.sort_order,
        parent_id: node.parent_id,
        level1_ancestor_id: ancestor.id,
        child_count: node.children.len(),
        updated_at: node.updated_at,
    })
}

// === add / edit / delete ===

/// Result of a mutation, reported after the mandatory refetch.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MutationResult {
    /// "created", "updated" or "deleted"
    pub action: String,
    /// Label of the affected code
    pub code_name: String,
    /// Id of the affected code (absent for creations: the backend
    /// assigns ids and the create response body is not relied upon)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    /// Tier the editor operated at
    pub level: NodeLevel,
    /// Total codes after the refetch
    pub tree_count: usize,
}

impl CommandResult for MutationResult {
    fn to_json(&self) -> String {
        to_json_string(self)
    }

    fn to_human(&self) -> String {
        let subject = match self.id {
            Some(id) => format!("code #{} \"{}\"", id, self.code_name),
            None => format!("code \"{}\"", self.code_name),
        };
        let action = match self.action.as_str() {
            "created" => "Created",
            "updated" => "Updated",
            "deleted" => "Deleted",
            other => other,
        };
        format!(
            "{} {} ({}); tree now has {} codes",
            action, subject, self.level, self.tree_count
        )
    }
}

/// Options for `mot add`.
#[derive(Debug, Default)]
pub struct AddOptions {
    pub code_name: String,
    pub menu: Option<MenuName>,
    pub parent_id: Option<i64>,
    pub description: Option<String>,
    pub sort_order: Option<i64>,
}

/// Create a code. The tier is inferred from the parent context: no
/// parent means a new level-1 root (which needs a menu, from `--menu`
/// or the configured default), a parent means one tier below it.
pub fn add(
    client: &ApiClient,
    options: AddOptions,
    default_menu: Option<MenuName>,
) -> Result<MutationResult> {
    let tree = client.fetch_codes()?;

    let mut form = match options.parent_id {
        Some(parent_id) => {
            if options.menu.is_some() {
                return Err(Error::InvalidInput(
                    "menu is inherited from the parent; --menu only applies to level-1 codes"
                        .to_string(),
                ));
            }
            EditorForm::create_child(&tree, parent_id)?
        }
        None => {
            let menu = options.menu.or(default_menu).ok_or_else(|| {
                Error::InvalidInput(
                    "creating a level-1 code requires --menu (or a configured default-menu)"
                        .to_string(),
                )
            })?;
            EditorForm::create_root(menu)
        }
    };

    form.set_code_name(options.code_name);
    if let Some(description) = options.description {
        form.set_description(description);
    }
    if let Some(sort_order) = options.sort_order {
        form.set_sort_order(sort_order)?;
    }

    let payload = form.payload()?;
    client.create_code(&payload)?;
    let refreshed = client.fetch_codes()?;

    Ok(MutationResult {
        action: "created".to_string(),
        code_name: payload.code_name,
        id: None,
        level: form.level(),
        tree_count: count_nodes(&refreshed),
    })
}

/// Options for `mot edit`.
#[derive(Debug, Default)]
pub struct EditOptions {
    pub code_name: Option<String>,
    pub menu: Option<MenuName>,
    pub description: Option<String>,
    pub sort_order: Option<i64>,
}

/// Update a code. Untouched fields keep their current values; the
/// inherited menu and the machine token are recomputed on save.
pub fn edit(client: &ApiClient, id: i64, options: EditOptions) -> Result<MutationResult> {
    let tree = client.fetch_codes()?;
    let mut form = EditorForm::edit(&tree, id)?;

    if let Some(code_name) = options.code_name {
        form.set_code_name(code_name);
    }
    if let Some(menu) = options.menu {
        form.set_menu_name(menu)?;
    }
    if let Some(description) = options.description {
        form.set_description(description);
    }
    if let Some(sort_order) = options.sort_order {
        form.set_sort_order(sort_order)?;
    }

    let payload = form.payload()?;
    client.update_code(id, &payload)?;
    let refreshed = client.fetch_codes()?;

    Ok(MutationResult {
        action: "updated".to_string(),
        code_name: payload.code_name,
        id: Some(id),
        level: form.level(),
        tree_count: count_nodes(&refreshed),
    })
}

/// Delete a code. Whether descendants cascade is the backend's call;
/// the refetch shows whatever it decided.
pub fn delete(client: &ApiClient, id: i64) -> Result<MutationResult> {
    let tree = client.fetch_codes()?;
    let node = find_node(&tree, id).ok_or_else(|| Error::NotFound(format!("code {}", id)))?;
    let code_name = node.code_name.clone();
    let level = level_of(&tree, node)?;

    client.delete_code(id)?;
    let refreshed = client.fetch_codes()?;

    Ok(MutationResult {
        action: "deleted".to_string(),
        code_name,
        id: Some(id),
        level,
        tree_count: count_nodes(&refreshed),
    })
}

// === config ===

/// One resolved setting reported by `mot config show`.
#[derive(Debug, Serialize)]
pub struct ReportedValue {
    pub value: String,
    pub source: String,
}

/// Result of `mot config show`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigShowResult {
    pub path: String,
    pub server_url: ReportedValue,
    pub output_format: ReportedValue,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_menu: Option<ReportedValue>,
}

impl CommandResult for ConfigShowResult {
    fn to_json(&self) -> String {
        to_json_string(self)
    }

    fn to_human(&self) -> String {
        let mut lines = vec![
            format!("Config file: {}", self.path),
            format!(
                "  server-url:    {} ({})",
                self.server_url.value, self.server_url.source
            ),
            format!(
                "  output-format: {} ({})",
                self.output_format.value, self.output_format.source
            ),
        ];
        if let Some(ref menu) = self.default_menu {
            lines.push(format!("  default-menu:  {} ({})", menu.value, menu.source));
        }
        lines.join("\n")
    }
}

/// Report the resolved settings and where each value came from.
pub fn config_show(
    config_dir: Option<PathBuf>,
    settings: &ResolvedSettings,
) -> Result<ConfigShowResult> {
    let path = config::config_path(config_dir)?;

    Ok(ConfigShowResult {
        path: path.display().to_string(),
        server_url: ReportedValue {
            value: settings.server_url.value.clone(),
            source: settings.server_url.source.to_string(),
        },
        output_format: ReportedValue {
            value: settings.output_format.value.to_string(),
            source: settings.output_format.source.to_string(),
        },
        default_menu: settings.default_menu.as_ref().map(|menu| ReportedValue {
            value: menu.value.to_string(),
            source: menu.source.to_string(),
        }),
    })
}

/// Result of `mot config set`.
#[derive(Debug, Serialize)]
pub struct ConfigSetResult {
    pub path: String,
    pub key: String,
    pub value: String,
}

impl CommandResult for ConfigSetResult {
    fn to_json(&self) -> String {
        to_json_string(self)
    }

    fn to_human(&self) -> String {
        format!("Set {} = {} in {}", self.key, self.value, self.path)
    }
}

/// Update one key of config.kdl.
pub fn config_set(config_dir: Option<PathBuf>, key: &str, value: &str) -> Result<ConfigSetResult> {
    let mut config = config::load_config(config_dir.clone())?;

    match key {
        "server-url" => config.server_url = Some(value.to_string()),
        "output-format" => {
            let format = config::OutputFormat::parse(value).ok_or_else(|| {
                Error::InvalidInput(format!(
                    "output-format must be \"json\" or \"human\", got {:?}",
                    value
                ))
            })?;
            config.output_format = Some(format);
        }
        "default-menu" => {
            let menu = MenuName::parse(value).ok_or_else(|| {
                Error::InvalidInput(format!(
                    "default-menu must be one of Library, Learning, Opinion, News, Qna; got {:?}",
                    value
                ))
            })?;
            config.default_menu = Some(menu);
        }
        other => {
            return Err(Error::InvalidInput(format!(
                "unknown config key {:?} (known: server-url, output-format, default-menu)",
                other
            )));
        }
    }

    let path = config::save_config(config_dir, &config)?;
    Ok(ConfigSetResult {
        path: path.display().to_string(),
        key: key.to_string(),
        value: value.to_string(),
    })
}

/// Result of `mot config path`.
#[derive(Debug, Serialize)]
pub struct ConfigPathResult {
    pub path: String,
    pub exists: bool,
}

impl CommandResult for ConfigPathResult {
    fn to_json(&self) -> String {
        to_json_string(self)
    }

    fn to_human(&self) -> String {
        self.path.clone()
    }
}

/// Report the config file location.
pub fn config_path(config_dir: Option<PathBuf>) -> Result<ConfigPathResult> {
    let path = config::config_path(config_dir)?;
    Ok(ConfigPathResult {
        exists: path.exists(),
        path: path.display().to_string(),
    })
}

// === version ===

/// Result of `mot version`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VersionResult {
    pub version: &'static str,
    pub commit: &'static str,
    pub built_at: &'static str,
}

impl CommandResult for VersionResult {
    fn to_json(&self) -> String {
        to_json_string(self)
    }

    fn to_human(&self) -> String {
        format!(
            "motcode {} ({}, built {})",
            self.version, self.commit, self.built_at
        )
    }
}

/// Report version and build information.
pub fn version() -> VersionResult {
    VersionResult {
        version: env!("CARGO_PKG_VERSION"),
        commit: env!("MOT_GIT_COMMIT"),
        built_at: env!("MOT_BUILD_TIMESTAMP"),
    }
}

/// Resolve the settings a command runs with from the config file and
/// CLI flags.
pub fn resolve_settings(
    config_dir: Option<PathBuf>,
    overrides: &Overrides,
) -> Result<ResolvedSettings> {
    let config: MotConfig = config::load_config(config_dir)?;
    Ok(config::resolve(&config, overrides))
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

    #[test]
    fn test_count_nodes() {
        let tree = vec![
            node(
                1,
                "Library",
                None,
                vec![node(2, "Sources", Some(1), vec![node(4, "Tech", Some(2), vec![])])],
            ),
            node(6, "News", None, vec![]),
        ];
        assert_eq!(count_nodes(&tree), 4);
        assert_eq!(count_nodes(&[]), 0);
    }

    #[test]
    fn test_tree_result_human_empty() {
        let result = TreeResult {
            count: 0,
            codes: vec![],
            collapsed: false,
        };
        assert_eq!(result.to_human(), "No codes defined");
    }

    #[test]
    fn test_tree_result_human_expands_all() {
        let result = TreeResult {
            count: 2,
            codes: vec![node(
                1,
                "Library",
                None,
                vec![node(2, "Sources", Some(1), vec![])],
            )],
            collapsed: false,
        };
        let text = result.to_human();
        assert!(text.contains("▾ Library (#1)"));
        assert!(text.contains("Sources (#2)"));
        assert!(text.contains("2 codes"));
    }

    #[test]
    fn test_mutation_result_human() {
        let result = MutationResult {
            action: "created".to_string(),
            code_name: "기술".to_string(),
            id: None,
            level: NodeLevel::Level3,
            tree_count: 5,
        };
        assert_eq!(
            result.to_human(),
            "Created code \"기술\" (level 3); tree now has 5 codes"
        );
    }

    #[test]
    fn test_mutation_result_json_omits_missing_id() {
        let result = MutationResult {
            action: "created".to_string(),
            code_name: "기술".to_string(),
            id: None,
            level: NodeLevel::Level3,
            tree_count: 5,
        };
        assert!(!result.to_json().contains("\"id\""));
    }

    #[test]
    fn test_version_result_human() {
        let result = version();
        assert!(result.to_human().starts_with("motcode "));
    }
}
