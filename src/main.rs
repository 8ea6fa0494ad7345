use clap::Parser;
use quote_gen::app::{bootstrap, terminal};
use quote_gen::utils::error::ErrorSeverity;
use quote_gen::utils::{logger, validation::Validate};
use quote_gen::CliConfig;
use tokio::io::BufReader;

fn exit_code(severity: ErrorSeverity) -> i32 {
    match severity {
        ErrorSeverity::Low => 0,
        ErrorSeverity::Medium => 2,
        ErrorSeverity::High => 1,
        ErrorSeverity::Critical => 3,
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = CliConfig::parse();

    let config = match cli.load() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("❌ Failed to load configuration: {}", e);
            eprintln!("💡 {}", e.recovery_suggestion());
            std::process::exit(1);
        }
    };

    logger::init_cli_logger(cli.verbose, config.logging.level.as_deref(), config.logging.json);
    tracing::info!("Starting quote-gen");

    if let Err(e) = config.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        eprintln!("❌ {}", e);
        eprintln!("💡 {}", e.recovery_suggestion());
        std::process::exit(exit_code(e.severity()));
    }

    let manager = match bootstrap::start_session(&config) {
        Ok(manager) => manager,
        Err(e) => {
            tracing::error!("❌ Could not start session: {} (Severity: {:?})", e, e.severity());
            eprintln!("❌ {}", e);
            eprintln!("💡 {}", e.recovery_suggestion());
            std::process::exit(exit_code(e.severity()));
        }
    };

    terminal::run(&manager, BufReader::new(tokio::io::stdin())).await?;

    manager.shutdown();
    tracing::info!("Session closed");
    Ok(())
}
