use std::io::Write;
use std::path::PathBuf;

use clap::{Parser, Subcommand};
use leadflow_board::{BoardConfig, FileStorage};
use tracing_subscriber::EnvFilter;

use crate::commands::{
    CheckArgs, Context, InitArgs, ReplayArgs, ShowArgs, run_check, run_init, run_replay, run_show,
};
use crate::error::{DoctorError, Result};

/// Environment variable holding the log filter.
pub const LOG_ENV: &str = "LEADFLOW_LOG";

#[derive(Debug, Parser)]
#[command(
    name = "leadflow-doctor",
    about = "Inspect, check, and replay drag scripts against a stored lead board",
    version
)]
pub struct Cli {
    /// Board config file (TOML, or JSON by extension).
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Directory holding stored boards.
    #[arg(long, global = true, default_value = ".")]
    pub data_dir: PathBuf,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Store a fresh board with the default pipeline.
    Init(InitArgs),

    /// Print the stored board.
    Show(ShowArgs),

    /// Report inconsistencies in the stored board.
    Check(CheckArgs),

    /// Run a JSON script of drag gestures against the stored board.
    Replay(ReplayArgs),
}

pub fn run_from_env() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();
    run(cli, &mut std::io::stdout().lock())
}

/// Install a stderr subscriber filtered by `LEADFLOW_LOG` (default `warn`).
fn init_tracing() {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn"));
    // A subscriber may already be installed when embedded; keep it.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

pub fn run(cli: Cli, out: &mut dyn Write) -> Result<()> {
    let ctx = context(&cli)?;
    match &cli.command {
        Commands::Init(args) => run_init(&ctx, args, out),
        Commands::Show(args) => run_show(&ctx, args, out),
        Commands::Check(args) => run_check(&ctx, args, out),
        Commands::Replay(args) => run_replay(&ctx, args, out),
    }
}

fn context(cli: &Cli) -> Result<Context> {
    let config = match &cli.config {
        Some(path) if !path.exists() => {
            return Err(DoctorError::MissingPath { path: path.clone() });
        }
        Some(path) => BoardConfig::load(path)?,
        None => BoardConfig::default(),
    };
    Ok(Context {
        config,
        storage: FileStorage::new(&cli.data_dir),
    })
}
