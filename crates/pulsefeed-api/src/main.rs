//! Pulsefeed CLI and API server entry point.
//!
//! Binary name: `pfeed`
//!
//! Parses CLI arguments, initializes tracing and application state, then
//! starts the API server (or emits shell completions).

mod http;
mod state;

use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::{generate, Shell};

use pulsefeed_infra::config::{load_config, resolve_data_dir};
use state::AppState;

#[derive(Parser)]
#[command(name = "pfeed", version, about = "Pulsefeed API server")]
struct Cli {
    /// Increase log verbosity (-v, -vv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Only log errors.
    #[arg(short, long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the API server.
    Serve {
        /// Override the configured bind port.
        #[arg(long)]
        port: Option<u16>,
        /// Override the configured bind host.
        #[arg(long)]
        host: Option<String>,
        /// Export traces to stdout via OpenTelemetry.
        #[arg(long)]
        otel: bool,
    },
    /// Generate shell completions.
    Completions {
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Shell completions don't need tracing or app state
    if let Commands::Completions { shell } = &cli.command {
        let mut cmd = Cli::command();
        generate(*shell, &mut cmd, "pfeed", &mut std::io::stdout());
        return Ok(());
    }

    let filter = match cli.verbose {
        0 if cli.quiet => "error",
        0 => "warn",
        1 => "info,pulsefeed_core=debug,pulsefeed_api=debug",
        _ => "trace",
    };
    let otel = matches!(&cli.command, Commands::Serve { otel: true, .. });
    pulsefeed_observe::tracing_setup::init_tracing(filter, otel)
        .map_err(|e| anyhow::anyhow!("failed to initialize tracing: {e}"))?;

    match cli.command {
        Commands::Serve { port, host, .. } => {
            let data_dir = resolve_data_dir();
            let mut config = load_config(&data_dir).await;
            if let Some(port) = port {
                config.port = port;
            }
            if let Some(host) = host {
                config.host = host;
            }

            let state = AppState::init(&config, &data_dir).await?;
            let hub = state.hub.clone();
            let poller = hub.spawn_poller();

            let addr = format!("{}:{}", config.host, config.port);
            let listener = tokio::net::TcpListener::bind(&addr).await?;

            println!(
                "  {} Pulsefeed API listening on {}",
                console::style("⚡").bold(),
                console::style(format!("http://{addr}")).cyan()
            );
            println!("  {}", console::style("Press Ctrl+C to stop").dim());

            let router = http::router::build_router(state);

            axum::serve(listener, router)
                .with_graceful_shutdown(shutdown_signal())
                .await?;

            hub.shutdown();
            let _ = poller.await;
            pulsefeed_observe::tracing_setup::shutdown_tracing();

            println!("\n  Server stopped.");
        }

        Commands::Completions { .. } => unreachable!("handled above"),
    }

    Ok(())
}

/// Wait for Ctrl+C or SIGTERM for graceful shutdown.
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
