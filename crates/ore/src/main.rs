mod cli;

use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use log::{debug, error};
use ore_core::{ClientConfig, HostSnapshot, OreClient};
use tracing_subscriber::EnvFilter;

use cli::{Action, ConsoleMessenger, Session};

/// File describing the host's loaded plugins, looked up next to the configuration
const DEFAULT_HOST_FILE: &str = "host.json";

/// Ore: install, update and remove server plugins from an Ore repository
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct CliArgs {
    /// Configuration file (JSON, TOML or YAML)
    #[arg(long, short, default_value = "ore.toml")]
    config: PathBuf,

    /// Snapshot of the host's loaded plugins
    #[arg(long)]
    host: Option<PathBuf>,

    /// Increase log output (-v info, -vv debug); RUST_LOG takes precedence
    #[arg(long, short, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    #[command(flatten)]
    Action(Action),
    /// Read commands from stdin; staged changes are applied on exit
    Shell,
}

fn init_logging(verbosity: u8) {
    let default_level = match verbosity {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    if let Err(e) = tracing_log::LogTracer::init() {
        eprintln!("Failed to bridge log records: {}", e);
    }
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .finish();
    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to install log subscriber: {}", e);
    }
}

fn host_path(args: &CliArgs) -> PathBuf {
    match &args.host {
        Some(path) => path.clone(),
        None => args
            .config
            .parent()
            .unwrap_or_else(|| Path::new("."))
            .join(DEFAULT_HOST_FILE),
    }
}

fn open_session(args: &CliArgs) -> Result<Session, Box<dyn std::error::Error>> {
    let config = ClientConfig::load(&args.config)?;
    let host_path = host_path(args);
    let host = HostSnapshot::load(&host_path)?;
    debug!("Loaded configuration: {:?}", config);

    let client = OreClient::from_config(&config, Arc::new(host.clone()))?.with_messenger(Arc::new(ConsoleMessenger));
    Ok(Session::new(client, host, host_path))
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = CliArgs::parse();
    init_logging(args.verbose);

    let mut session = match open_session(&args) {
        Ok(session) => session,
        Err(e) => {
            error!("Failed to start: {}", e);
            eprintln!("Error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let mut status = ExitCode::SUCCESS;
    match args.command {
        Commands::Action(action) => {
            if let Err(e) = session.run(action).await {
                if !e.is_user_error() {
                    error!("Request failed: {:?}", e);
                }
                eprintln!("Error: {}", e);
                status = ExitCode::FAILURE;
            }
        }
        Commands::Shell => {
            if let Err(e) = session.shell().await {
                eprintln!("Error reading input: {}", e);
                status = ExitCode::FAILURE;
            }
        }
    }

    if let Err(e) = session.finish().await {
        eprintln!("Error applying pending changes: {}", e);
        status = ExitCode::FAILURE;
    }
    status
}
