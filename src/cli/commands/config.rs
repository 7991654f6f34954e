use crate::cli::parser::Commands;
use crate::config::Config;
use crate::config::migrate::{check_missing_keys, migrate_config_file};
use crate::errors::AppResult;
use crate::ui::messages::{error, info, success, warning};
use std::process::Command;

/// Handle the `config` subcommand
pub fn handle(cmd: &Commands, cfg: &Config) -> AppResult<bool> {
    let Commands::Config {
        print_config,
        check,
        migrate,
        edit_config,
        editor,
    } = cmd
    else {
        return Ok(true);
    };

    let path = Config::config_file();
    let mut ok = true;

    if *print_config {
        println!("📄 Current configuration:\n");
        println!("{}", serde_yaml::to_string(cfg)?);
    }

    if *check {
        if !path.exists() {
            warning(format!(
                "No configuration file at {} (defaults in use).",
                path.display()
            ));
        } else {
            let missing = check_missing_keys(&path)?;
            if missing.is_empty() {
                success("Configuration file is complete.");
            } else {
                warning(format!("Missing keys: {}", missing.join(", ")));
                info("Run `toil-ledger config --migrate` to add them with default values.");
                ok = false;
            }
        }
    }

    if *migrate {
        if !path.exists() {
            cfg.save_to(&path)?;
            success(format!("Configuration file created at {}", path.display()));
        } else if migrate_config_file(&path)? {
            success("Configuration file updated with missing keys.");
        } else {
            info("Configuration file already up to date.");
        }
    }

    if *edit_config {
        let default_editor = std::env::var("EDITOR")
            .or_else(|_| std::env::var("VISUAL"))
            .unwrap_or_else(|_| {
                if cfg!(target_os = "windows") {
                    "notepad".to_string()
                } else {
                    "nano".to_string()
                }
            });
        let editor_to_use = editor.clone().unwrap_or_else(|| default_editor.clone());

        match Command::new(&editor_to_use).arg(&path).status() {
            Ok(s) if s.success() => {
                success(format!("Configuration file edited using '{editor_to_use}'"));
            }
            _ => {
                warning(format!(
                    "Editor '{editor_to_use}' not available, falling back to '{default_editor}'"
                ));
                match Command::new(&default_editor).arg(&path).status() {
                    Ok(s) if s.success() => {
                        success(format!("Configuration file edited using '{default_editor}'"));
                    }
                    _ => {
                        error(format!(
                            "Failed to edit configuration file using '{default_editor}'"
                        ));
                        ok = false;
                    }
                }
            }
        }
    }

    Ok(ok)
}
