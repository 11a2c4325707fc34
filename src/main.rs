//! Motcode CLI - taxonomy administration for the MOT Club platform.

use clap::Parser;
use motcode::action_log;
use motcode::api::ApiClient;
use motcode::cli::{Cli, Commands, ConfigCommands};
use motcode::commands::{self, AddOptions, CommandResult, EditOptions};
use motcode::config::{OutputFormat, Overrides, ResolvedSettings};
use motcode::models::MenuName;
use std::path::PathBuf;
use std::process;
use std::time::Instant;

fn main() {
    let cli = Cli::parse();

    let overrides = Overrides {
        server_url: cli.server.clone(),
        output_format: cli.human_readable.then_some(OutputFormat::Human),
    };

    // Resolve settings: CLI flag > MOT_SERVER env > config.kdl > default
    let settings = match commands::resolve_settings(cli.config_dir.clone(), &overrides) {
        Ok(settings) => settings,
        Err(e) => {
            report_error(&e, cli.human_readable);
            process::exit(1);
        }
    };
    let human = settings.human();

    // Serialize command for logging
    let (cmd_name, args_json) = serialize_command(&cli.command);

    // Start timing
    let start = Instant::now();

    // Execute command
    let result = run_command(cli.command, cli.config_dir, &settings, human);

    // Calculate duration
    let duration = start.elapsed().as_millis() as u64;

    // Determine success/error
    let (success, error) = match &result {
        Ok(_) => (true, None),
        Err(e) => (false, Some(e.to_string())),
    };

    // Log the action (silently falls back on logging errors)
    action_log::log_action(
        settings.server_url(),
        &cmd_name,
        args_json,
        success,
        error,
        duration,
    );

    // Handle result
    if let Err(e) = result {
        report_error(&e, human);
        process::exit(1);
    }
}

fn report_error(error: &motcode::Error, human: bool) {
    if human {
        eprintln!("Error: {}", error);
    } else {
        eprintln!("{}", serde_json::json!({ "error": error.to_string() }));
    }
}

fn parse_menu(menu: Option<String>) -> motcode::Result<Option<MenuName>> {
    match menu {
        None => Ok(None),
        Some(raw) => MenuName::parse(&raw)
            .map(Some)
            .ok_or_else(|| motcode::Error::InvalidInput(format!("unknown menu {:?}", raw))),
    }
}

fn run_command(
    command: Commands,
    config_dir: Option<PathBuf>,
    settings: &ResolvedSettings,
    human: bool,
) -> Result<(), motcode::Error> {
    match command {
        Commands::Tree { menu, collapsed } => {
            let client = ApiClient::new(settings.server_url());
            let result = commands::tree(&client, parse_menu(menu)?, collapsed)?;
            output(&result, human);
        }

        Commands::Show { id } => {
            let client = ApiClient::new(settings.server_url());
            let result = commands::show(&client, id)?;
            output(&result, human);
        }

        Commands::Add {
            name,
            menu,
            parent,
            description,
            sort_order,
        } => {
            let client = ApiClient::new(settings.server_url());
            let options = AddOptions {
                code_name: name,
                menu: parse_menu(menu)?,
                parent_id: parent,
                description,
                sort_order,
            };
            let result = commands::add(&client, options, settings.default_menu())?;
            output(&result, human);
        }

        Commands::Edit {
            id,
            name,
            menu,
            description,
            sort_order,
        } => {
            let client = ApiClient::new(settings.server_url());
            let options = EditOptions {
                code_name: name,
                menu: parse_menu(menu)?,
                description,
                sort_order,
            };
            let result = commands::edit(&client, id, options)?;
            output(&result, human);
        }

        Commands::Delete { id } => {
            let client = ApiClient::new(settings.server_url());
            let result = commands::delete(&client, id)?;
            output(&result, human);
        }

        Commands::Config { command } => match command {
            ConfigCommands::Show => {
                let result = commands::config_show(config_dir, settings)?;
                output(&result, human);
            }
            ConfigCommands::Set { key, value } => {
                let result = commands::config_set(config_dir, &key, &value)?;
                output(&result, human);
            }
            ConfigCommands::Path => {
                let result = commands::config_path(config_dir)?;
                output(&result, human);
            }
        },

        Commands::Version => {
            output(&commands::version(), human);
        }

        #[cfg(feature = "tui")]
        Commands::Tui => {
            motcode::tui::run(settings.server_url())?;
        }
    }

    Ok(())
}

/// Print a command result in the selected format.
fn output<R: CommandResult>(result: &R, human: bool) {
    if human {
        println!("{}", result.to_human());
    } else {
        println!("{}", result.to_json());
    }
}

/// Name and argument JSON for the action log.
fn serialize_command(command: &Commands) -> (String, serde_json::Value) {
    match command {
        Commands::Tree { menu, collapsed } => (
            "tree".to_string(),
            serde_json::json!({ "menu": menu, "collapsed": collapsed }),
        ),
        Commands::Show { id } => ("show".to_string(), serde_json::json!({ "id": id })),
        Commands::Add {
            name,
            menu,
            parent,
            description,
            sort_order,
        } => (
            "add".to_string(),
            serde_json::json!({
                "name": name,
                "menu": menu,
                "parent": parent,
                "description": description,
                "sortOrder": sort_order,
            }),
        ),
        Commands::Edit {
            id,
            name,
            menu,
            description,
            sort_order,
        } => (
            "edit".to_string(),
            serde_json::json!({
                "id": id,
                "name": name,
                "menu": menu,
                "description": description,
                "sortOrder": sort_order,
            }),
        ),
        Commands::Delete { id } => ("delete".to_string(), serde_json::json!({ "id": id })),
        Commands::Config { command } => match command {
            ConfigCommands::Show => ("config show".to_string(), serde_json::json!({})),
            ConfigCommands::Set { key, value } => (
                "config set".to_string(),
                serde_json::json!({ "key": key, "value": value }),
            ),
            ConfigCommands::Path => ("config path".to_string(), serde_json::json!({})),
        },
        Commands::Version => ("version".to_string(), serde_json::json!({})),
        #[cfg(feature = "tui")]
        Commands::Tui => ("tui".to_string(), serde_json::json!({})),
    }
}
