#![forbid(unsafe_code)]

use clap::Parser;
use glasshouse_core::telemetry::{init_tracing_with_otel, shutdown_tracing};
use glasshouse_core::{load_from_path, run};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{error, info};

#[derive(Parser, Debug)]
#[command(author, version, about = "TLS/HTTP fingerprinting echo service")]
struct Cli {
    /// Path to configuration JSON file
    #[arg(short, long, value_name = "FILE", default_value = "config/glasshouse.json")]
    config: PathBuf,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let cfg = match load_from_path(&cli.config) {
        Ok(cfg) => cfg,
        Err(err) => {
            // Tracing isn't initialized yet (it needs `cfg.logging`), so a
            // config load failure is reported on stderr directly.
            eprintln!("failed to load configuration: {err}");
            std::process::exit(1);
        }
    };

    if let Err(err) = init_tracing_with_otel(
        cfg.logging.level.clone(),
        cfg.logging.show_target,
        cfg.telemetry.otel_log_level.clone(),
    ) {
        eprintln!("failed to initialize tracing: {err}");
        std::process::exit(1);
    }

    info!(tls_port = %cfg.tls_port, http_port = %cfg.http_port, host = %cfg.host, "configuration loaded");

    if let Err(err) = run(Arc::new(cfg)).await {
        error!(%err, "service exited with error");
        shutdown_tracing();
        std::process::exit(1);
    }

    shutdown_tracing();
}
