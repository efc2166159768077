use std::process::ExitCode;

use clap::Parser;
use colored::Colorize;

use usethislink::cli::{Cli, Commands, run_config_command};
use usethislink::config::{DEFAULT_CONFIG_PATH, get_config, init_config_from};
use usethislink::errors::UseThisLinkError;
use usethislink::runtime::modes::run_server;
use usethislink::system::init_logging;

#[actix_web::main]
async fn main() -> ExitCode {
    // .env 不存在时忽略
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    if let Some(Commands::Config { action }) = cli.command {
        return match run_config_command(action) {
            Ok(path) => {
                println!("{} {}", "Sample configuration written to".green(), path);
                ExitCode::SUCCESS
            }
            Err(e) => {
                eprintln!("{}", UseThisLinkError::validation(e.to_string()).format_colored());
                ExitCode::FAILURE
            }
        };
    }

    let config_path = cli.config.as_deref().unwrap_or(DEFAULT_CONFIG_PATH);
    init_config_from(config_path);
    let config = get_config();

    if let Err(e) = config.validate() {
        eprintln!(
            "{}",
            UseThisLinkError::validation(format!("Invalid configuration: {}", e)).format_colored()
        );
        return ExitCode::FAILURE;
    }

    // guard 必须活到进程结束，否则缓冲的日志会丢失
    let _log_guard = match init_logging(&config.logging) {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!(
                "{}",
                UseThisLinkError::internal(format!("Failed to initialize logging: {:#}", e))
                    .format_colored()
            );
            return ExitCode::FAILURE;
        }
    };

    match run_server().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("Server error: {:#}", e);
            eprintln!(
                "{}",
                UseThisLinkError::internal(format!("{:#}", e)).format_colored()
            );
            ExitCode::FAILURE
        }
    }
}
