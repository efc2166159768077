//! Command-line interface definitions using clap

use std::path::Path;

use anyhow::{Result, bail};
use clap::{Parser, Subcommand};

use crate::config::StaticConfig;

/// UseThisLink - a session-aware URL shortener
#[derive(Parser)]
#[command(name = "usethislink")]
#[command(version)]
#[command(about = "A session-aware URL shortener", long_about = None)]
pub struct Cli {
    /// Path to the TOML configuration file
    #[arg(long, short = 'c', global = true)]
    pub config: Option<String>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available commands
#[derive(Subcommand)]
pub enum Commands {
    /// Start the HTTP server (default)
    Serve,

    /// Configuration helpers
    Config {
        #[command(subcommand)]
        action: ConfigCommands,
    },
}

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Generate example configuration file
    Generate {
        /// Output path (default: config.example.toml)
        output_path: Option<String>,

        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

pub const DEFAULT_SAMPLE_PATH: &str = "config.example.toml";

/// 执行 config 子命令
pub fn run_config_command(action: ConfigCommands) -> Result<String> {
    match action {
        ConfigCommands::Generate { output_path, force } => {
            let path = output_path.unwrap_or_else(|| DEFAULT_SAMPLE_PATH.to_string());
            if Path::new(&path).exists() && !force {
                bail!("{} already exists, use --force to overwrite", path);
            }

            let mut sample = StaticConfig::default();
            sample.site.base_url = "http://localhost:8080".to_string();
            sample
                .save_to_file(&path)
                .map_err(|e| anyhow::anyhow!("Failed to write {}: {}", path, e))?;
            Ok(path)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_config_generate() {
        let cli = Cli::try_parse_from(["usethislink", "-c", "my.toml", "config", "generate", "out.toml"])
            .unwrap();
        assert_eq!(cli.config.as_deref(), Some("my.toml"));
        match cli.command {
            Some(Commands::Config {
                action: ConfigCommands::Generate { output_path, force },
            }) => {
                assert_eq!(output_path.as_deref(), Some("out.toml"));
                assert!(!force);
            }
            _ => panic!("expected config generate"),
        }
    }

    #[test]
    fn test_generate_refuses_overwrite() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        let path_str = path.to_string_lossy().to_string();

        let written = run_config_command(ConfigCommands::Generate {
            output_path: Some(path_str.clone()),
            force: false,
        })
        .unwrap();
        assert_eq!(written, path_str);
        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.contains("base_url"));

        assert!(
            run_config_command(ConfigCommands::Generate {
                output_path: Some(path_str.clone()),
                force: false,
            })
            .is_err()
        );
        assert!(
            run_config_command(ConfigCommands::Generate {
                output_path: Some(path_str),
                force: true,
            })
            .is_ok()
        );
    }
}
