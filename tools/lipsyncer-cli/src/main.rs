//! Lipsyncer CLI — compile viseme cues into keyframes and manage presets.
//!
//! Usage:
//!   lipsync compile <CUES>... --preset <P>   Compile cue files to keyframes
//!   lipsync labels <CUES>                    List cue labels
//!   lipsync validate <CUES> [--preset <P>]   Check a cue file
//!   lipsync preset <ACTION>                  Edit viseme presets
//!   lipsync config [--init]                  Show or write the config file

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use lipsyncer_common::config::AppConfig;

mod commands;

#[derive(Parser)]
#[command(
    name = "lipsync",
    about = "Turn viseme cues into blended bone keyframes",
    version,
    author
)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Config file (defaults to $XDG_CONFIG_HOME/lipsyncer/config.json)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compile cue files into keyframe samples
    Compile(commands::compile::CompileArgs),

    /// List the distinct labels in a cue file
    Labels {
        /// Path to the cue JSON file
        cues: PathBuf,
    },

    /// Validate a cue file and, optionally, its preset coverage
    Validate {
        /// Path to the cue JSON file
        cues: PathBuf,

        /// Viseme preset to check label coverage against
        #[arg(short, long)]
        preset: Option<PathBuf>,
    },

    /// Create and edit viseme presets
    Preset {
        #[command(subcommand)]
        action: commands::preset::PresetAction,
    },

    /// Print the effective config, or write it with --init
    Config {
        /// Write the config file if it does not exist yet
        #[arg(long)]
        init: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => AppConfig::load_from(path),
        None => AppConfig::load(),
    };

    // Initialize logging
    let mut logging = config.logging.clone();
    if cli.verbose {
        logging.level = "debug".to_string();
    }
    lipsyncer_common::logging::init_logging(&logging);

    match cli.command {
        Commands::Compile(args) => commands::compile::run(args, &config).await,
        Commands::Labels { cues } => commands::labels::run(cues),
        Commands::Validate { cues, preset } => commands::validate::run(cues, preset),
        Commands::Preset { action } => commands::preset::run(action),
        Commands::Config { init } => commands::config::run(&config, cli.config.as_deref(), init),
    }
}
