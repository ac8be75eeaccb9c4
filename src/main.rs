use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::io::Write;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod config;
mod error;
mod mounter;
mod orchestrator;
mod secrets;
mod target;

use config::Environment;
use mounter::{MountCommand, Mounter, DEFAULT_MOUNT_PROGRAM};
use orchestrator::MountOutcome;

const MAPPINGS_FILE: &str = ".nas_mappings.json";
const PASSWORD_FILE: &str = ".naspass";

#[derive(Parser)]
#[command(name = "nas-mount")]
#[command(about = "Mount NAS shares listed in ~/.nas_mappings.json", long_about = None)]
struct Cli {
    /// Home directory; mapping destinations are relative to it
    #[arg(long, env = "HOME")]
    home: PathBuf,

    /// User to mount as when the mapping file names none
    #[arg(long, env = "USER")]
    user: String,

    /// Mapping file [default: ~/.nas_mappings.json]
    #[arg(long)]
    config: Option<PathBuf>,

    /// File holding the share password [default: ~/.naspass]
    #[arg(long)]
    password_file: Option<PathBuf>,

    /// Mount utility to run for each mapping
    #[arg(long, default_value = DEFAULT_MOUNT_PROGRAM)]
    mount_program: String,

    /// Extra argument passed to the mount utility before the addresses
    #[arg(long = "mount-option", allow_hyphen_values = true)]
    mount_options: Vec<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Mount every configured share (default)
    Mount,

    /// Show the configured mappings without mounting
    List,
}

/// Everything resolved from the command line and environment.
struct Settings {
    env: Environment,
    config_path: PathBuf,
    password_path: PathBuf,
    command: MountCommand,
}

impl From<Cli> for Settings {
    fn from(cli: Cli) -> Self {
        let config_path = cli.config.unwrap_or_else(|| cli.home.join(MAPPINGS_FILE));
        let password_path = cli
            .password_file
            .unwrap_or_else(|| cli.home.join(PASSWORD_FILE));

        Self {
            env: Environment {
                home: cli.home,
                user: cli.user,
            },
            config_path,
            password_path,
            command: MountCommand {
                program: cli.mount_program,
                options: cli.mount_options,
            },
        }
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "nas_mount=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let mut cli = Cli::parse();
    let command = cli.command.take().unwrap_or(Commands::Mount);
    let settings = Settings::from(cli);

    ExitCode::from(run(command, &settings, &mut std::io::stderr()).await)
}

/// Runs a subcommand and returns the process exit status.
///
/// Fatal errors are written to `errors` and yield 1. Individual mount
/// failures are only reported; the run still finishes with `Done` and 0.
async fn run(command: Commands, settings: &Settings, errors: &mut impl Write) -> u8 {
    let result = match command {
        Commands::Mount => mount_shares(settings).await.map(|outcomes| {
            orchestrator::summarize(&outcomes);
            println!("Done");
        }),
        Commands::List => list_mappings(settings).await,
    };

    match result {
        Ok(()) => 0,
        Err(e) => {
            let _ = writeln!(errors, "Error: {:?}", e);
            1
        }
    }
}

async fn mount_shares(settings: &Settings) -> Result<Vec<MountOutcome>> {
    let mappings = config::load_mappings(&settings.config_path)
        .await
        .context("Failed to load mount mappings")?;
    let credential = secrets::load_secret(&settings.password_path)
        .await
        .context("Failed to load NAS password")?;
    let tasks = mappings.tasks(&settings.env)?;

    let mounter = Mounter::new(
        settings.command.clone(),
        mappings.user(&settings.env).to_string(),
        mappings.server().to_string(),
        credential,
    );

    tracing::info!(
        "Mounting {} shares from {}",
        tasks.len(),
        mappings.server()
    );
    Ok(orchestrator::mount_all(&mounter, tasks).await)
}

async fn list_mappings(settings: &Settings) -> Result<()> {
    let mappings = config::load_mappings(&settings.config_path)
        .await
        .context("Failed to load mount mappings")?;
    let tasks = mappings.tasks(&settings.env)?;

    println!("Server: {}", mappings.server());
    println!("User:   {}", mappings.user(&settings.env));

    if tasks.is_empty() {
        println!("\nNo mappings configured in {}", settings.config_path.display());
        return Ok(());
    }

    println!("\nMappings:\n");
    for task in tasks {
        println!("  {} -> {}", task.remote_path, task.local_dir.display());
    }

    Ok(())
}
