//! Pomodoro Timer CLI
//!
//! A single countdown that cycles through three fixed intervals:
//! - 25 minutes of focused work
//! - 5 minutes of short break
//! - 20 minutes of long break

use anyhow::Result;
use clap::{CommandFactory, Parser};

use pomodoro_app::cli::{Cli, Commands, DaemonArgs, Display, IpcClient};
use pomodoro_app::daemon::run_daemon;
use pomodoro_app::types::DaemonConfig;

/// Main entry point
#[tokio::main(flavor = "current_thread")]
async fn main() {
    // Parse command line arguments
    let cli = Cli::parse();

    // Initialize logging
    init_tracing(cli.verbose);

    // Execute command
    if let Err(e) = execute(cli).await {
        Display::show_error(&format!("{:#}", e));
        std::process::exit(1);
    }
}

/// Initializes the tracing subscriber for logging.
///
/// `RUST_LOG` wins over `--verbose`.
fn init_tracing(verbose: bool) {
    use tracing_subscriber::{fmt, EnvFilter};

    let default_level = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .without_time()
        .init();
}

/// Executes the CLI command.
async fn execute(cli: Cli) -> Result<()> {
    if cli.verbose {
        tracing::debug!("Verbose mode enabled");
    }

    match cli.command {
        Some(Commands::Toggle) => {
            let response = client(cli.socket.as_ref()).toggle().await?;
            Display::show_toggle_success(&response);
        }
        Some(Commands::Select { interval }) => {
            let response = client(cli.socket.as_ref()).select(interval.into()).await?;
            Display::show_select_success(&response);
        }
        Some(Commands::Status) => {
            let response = client(cli.socket.as_ref()).status().await?;
            Display::show_status(&response);
        }
        Some(Commands::Items) => {
            let response = client(cli.socket.as_ref()).items().await?;
            Display::show_items(&response);
        }
        Some(Commands::Daemon(args)) => {
            run_daemon(daemon_config(&args, cli.socket)).await?;
        }
        Some(Commands::Completions { shell }) => {
            generate_completions(shell);
        }
        None => {
            // No command provided, show help
            Cli::command().print_help()?;
        }
    }

    Ok(())
}

/// Builds an IPC client, honouring `--socket`.
fn client(socket: Option<&std::path::PathBuf>) -> IpcClient {
    match socket {
        Some(path) => IpcClient::with_socket_path(path.clone()),
        None => IpcClient::new(),
    }
}

/// Merges daemon flags over the default configuration.
fn daemon_config(args: &DaemonArgs, socket: Option<std::path::PathBuf>) -> DaemonConfig {
    let mut config = DaemonConfig::default().with_tick_interval_ms(args.tick_ms);
    if let Some(path) = socket {
        config = config.with_socket_path(path);
    }
    if let Some(path) = &args.schedule_file {
        config = config.with_schedule_path(path.clone());
    }
    config
}

/// Generates shell completion scripts.
fn generate_completions(shell: clap_complete::Shell) {
    use clap_complete::generate;
    use std::io;

    let mut cmd = Cli::command();
    let bin_name = cmd.get_name().to_string();
    generate(shell, &mut cmd, bin_name, &mut io::stdout());
}

// ============================================================================
// Tests
// ============================================================================
