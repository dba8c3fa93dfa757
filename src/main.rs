use anyhow::Context;
use clap::Parser;
use findmypark::app::output;
use findmypark::app::session::{build_session, run_session};
use findmypark::utils::error::ErrorSeverity;
use findmypark::utils::{logger, validation::Validate};
use findmypark::{CliConfig, LotId, ParkError};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = CliConfig::parse();

    if let Err(e) = cli.validate() {
        eprintln!("❌ {}", e.user_friendly_message());
        std::process::exit(1);
    }

    let config = match cli.resolve() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("❌ {}", e.user_friendly_message());
            eprintln!("💡 {}", e.recovery_suggestion());
            std::process::exit(1);
        }
    };

    let level = config.logging.level.as_deref();
    if config.logging.json {
        logger::init_json_logger(cli.verbose, level);
    } else {
        logger::init_cli_logger(cli.verbose, level);
    }

    tracing::info!("Starting findmypark");
    tracing::debug!("Resolved config: {:?}", config);

    let session = build_session(&config).context("building discovery session")?;
    let select = cli.select.as_deref().map(LotId::from);

    match run_session(&session, cli.query.as_deref(), select.as_ref()).await {
        Ok(report) => {
            let rendered = output::render(&report, cli.format).context("rendering results")?;
            print!("{}", rendered);
        }
        Err(e) => {
            tracing::error!(
                "Session failed: {} (severity: {:?})",
                e,
                e.severity()
            );
            eprintln!("❌ {}", e.user_friendly_message());
            eprintln!("💡 {}", e.recovery_suggestion());
            std::process::exit(exit_code(&e));
        }
    }

    Ok(())
}

fn exit_code(e: &ParkError) -> i32 {
    match e.severity() {
        ErrorSeverity::Low => 0,
        ErrorSeverity::Medium => 2,
        ErrorSeverity::High => 1,
        ErrorSeverity::Critical => 3,
    }
}
