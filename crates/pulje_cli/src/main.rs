//! Pulje CLI
//!
//! Distributes teams, reports conflicts and maintains project files.

#[cfg(feature = "cli")]
use anyhow::{Context, Result};
#[cfg(feature = "cli")]
use clap::{Parser, Subcommand, ValueEnum};
#[cfg(feature = "cli")]
use pulje_core::engine::DistributionMode;
#[cfg(feature = "cli")]
use std::path::{Path, PathBuf};

#[cfg(feature = "cli")]
#[derive(Parser)]
#[command(name = "pulje")]
#[command(about = "Pool assignment for youth football tournaments", long_about = None)]
#[command(version)]
struct Cli {
    /// Reference tables (.json, .yaml); built-in templates when omitted
    #[arg(long, global = true)]
    reference: Option<PathBuf>,

    /// More output (-v debug, -vv trace); RUST_LOG takes precedence
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[cfg(feature = "cli")]
#[derive(Clone, Copy, ValueEnum)]
enum Mode {
    /// Release every unpinned team and start over
    All,
    /// Only place teams without a pool
    Unassigned,
}

#[cfg(feature = "cli")]
impl From<Mode> for DistributionMode {
    fn from(mode: Mode) -> Self {
        match mode {
            Mode::All => DistributionMode::All,
            Mode::Unassigned => DistributionMode::Unassigned,
        }
    }
}

#[cfg(feature = "cli")]
#[derive(Subcommand)]
enum Commands {
    /// Distribute teams into pools, pick hosts and assign keys
    Distribute {
        /// Project file (.json or .pulje)
        project: PathBuf,

        /// Seed of the first attempt
        #[arg(long, default_value_t = 0)]
        seed: u64,

        #[arg(long, value_enum, default_value_t = Mode::All)]
        mode: Mode,

        /// Only this row
        #[arg(long)]
        row: Option<String>,

        /// Output project file; the input is overwritten when omitted
        #[arg(long)]
        out: Option<PathBuf>,
    },

    /// List conflicts as JSON
    Conflicts {
        project: PathBuf,

        #[arg(long)]
        row: Option<String>,

        /// Include suggested remediations
        #[arg(long, default_value = "false")]
        fixes: bool,
    },

    /// Show (or apply) the optimal pool count per row
    PoolCount {
        project: PathBuf,

        #[arg(long)]
        row: Option<String>,

        /// Add or remove empty pools to match
        #[arg(long, default_value = "false")]
        apply: bool,

        #[arg(long)]
        out: Option<PathBuf>,
    },

    /// Re-resolve fixture keys
    Keys {
        project: PathBuf,

        #[arg(long)]
        row: Option<String>,

        #[arg(long)]
        out: Option<PathBuf>,
    },

    /// Classify wish texts into rule types
    Classify {
        project: PathBuf,

        /// Reclassify wishes that already have a rule type
        #[arg(long, default_value = "false")]
        force: bool,

        #[arg(long)]
        out: Option<PathBuf>,
    },
}

#[cfg(feature = "cli")]
fn init_logging(verbose: u8) {
    use tracing_subscriber::EnvFilter;

    let default_level = match verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt().with_env_filter(filter).with_writer(std::io::stderr).init();
}

#[cfg(feature = "cli")]
fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let reference = pulje_cli::load_reference(cli.reference.as_deref())?;
    let config = pulje_core::EngineConfig::from_env_or_default().context("Failed to load engine config")?;

    match cli.command {
        Commands::Distribute { project, seed, mode, row, out } => {
            let mut data = pulje_cli::load_project(&project)?;
            let scope = pulje_cli::scope_for(row.as_deref());
            let summary = pulje_cli::distribute(&mut data, &reference, &config, mode.into(), &scope, seed)?;
            write_back(&project, out.as_deref(), &mut data)?;
            print_json(&summary)?;
        }

        Commands::Conflicts { project, row, fixes } => {
            let data = pulje_cli::load_project(&project)?;
            let reports = pulje_cli::conflicts(&data, &reference, &config, &pulje_cli::scope_for(row.as_deref()), fixes)?;
            print_json(&reports)?;
        }

        Commands::PoolCount { project, row, apply, out } => {
            let mut data = pulje_cli::load_project(&project)?;
            let lines = pulje_cli::pool_counts(&mut data, &pulje_cli::scope_for(row.as_deref()), apply)?;
            if apply {
                write_back(&project, out.as_deref(), &mut data)?;
            }
            print_json(&lines)?;
        }

        Commands::Keys { project, row, out } => {
            let mut data = pulje_cli::load_project(&project)?;
            let changed = pulje_cli::resolve_keys(&mut data, &reference, &config, &pulje_cli::scope_for(row.as_deref()))?;
            write_back(&project, out.as_deref(), &mut data)?;
            println!("{changed} keys changed");
        }

        Commands::Classify { project, force, out } => {
            let mut data = pulje_cli::load_project(&project)?;
            let changed = pulje_cli::classify(&mut data, &reference, force);
            write_back(&project, out.as_deref(), &mut data)?;
            println!("{changed} wishes classified");
        }
    }

    Ok(())
}

#[cfg(feature = "cli")]
fn write_back(input: &Path, out: Option<&Path>, project: &mut pulje_core::Project) -> Result<()> {
    let path = out.unwrap_or(input);
    pulje_cli::save_project(path, project)?;
    tracing::info!(path = %path.display(), "project written");
    Ok(())
}

#[cfg(feature = "cli")]
fn print_json<T: serde::Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

#[cfg(not(feature = "cli"))]
fn main() {
    eprintln!("pulje CLI is not available. Enable the 'cli' feature to use it.");
    std::process::exit(1);
}
