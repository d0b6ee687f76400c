// SPDX-License-Identifier: AGPL-3.0-or-later
//! File Manager Kit CLI
//!
//! Front end for the local file-management engine.

mod commands;

use clap::{Parser, Subcommand};
use fmk_core::{EngineConfig, FmkResult};
use fmk_engine::FileManager;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "fmk")]
#[command(author, version, about = "File Manager Kit - local file management", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Configuration file (defaults to the platform config directory)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Start directory (defaults to the working directory)
    #[arg(short = 'C', long, global = true)]
    dir: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// List directory contents
    #[command(alias = "dir")]
    Ls {
        /// Directory to list (defaults to the start directory)
        path: Option<PathBuf>,

        /// Long format with details
        #[arg(short, long)]
        long: bool,

        /// Show all files including hidden
        #[arg(short, long)]
        all: bool,

        /// Human-readable sizes
        #[arg(short = 'H', long)]
        human: bool,
    },

    /// List the parent of the start directory
    Up,

    /// Print the start directory
    Pwd,

    /// Create a directory (parents are not created)
    Mkdir {
        name: String,
    },

    /// Create a new file
    Touch {
        name: String,

        /// Initial content
        #[arg(short, long, default_value = "")]
        content: String,
    },

    /// Display a text file
    Cat {
        path: PathBuf,
    },

    /// Overwrite a file, keeping a timestamped backup of the old content
    Write {
        path: PathBuf,

        /// New content (read from stdin when omitted)
        #[arg(short, long)]
        content: Option<String>,
    },

    /// Remove files or directories
    Rm {
        /// Path(s) to remove
        #[arg(required = true)]
        paths: Vec<PathBuf>,

        /// Do not ask for confirmation
        #[arg(short, long)]
        yes: bool,
    },

    /// Rename within the same directory
    Rename {
        path: PathBuf,
        new_name: String,
    },

    /// Copy into a directory, numbering the name on collision
    Cp {
        source: PathBuf,
        dest_dir: PathBuf,
    },

    /// Move into a directory, numbering the name on collision
    Mv {
        source: PathBuf,
        dest_dir: PathBuf,
    },

    /// Search file names below a directory
    Find {
        pattern: String,

        /// Directory to search (defaults to the start directory)
        #[arg(short, long)]
        path: Option<PathBuf>,

        /// Treat the pattern as a glob (`*.txt`, `name.*`)
        #[arg(short, long)]
        glob: bool,
    },

    /// Show file or directory information
    Stat {
        path: PathBuf,
    },

    /// Show mounted volumes and their usage
    Df,

    /// Answer JSON requests, one per line, on stdin/stdout
    Serve,
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn build_manager(config: Option<PathBuf>, dir: Option<PathBuf>) -> FmkResult<FileManager> {
    let mut config = match config {
        Some(path) => EngineConfig::load(&path)?,
        None => EngineConfig::load_default()?,
    };
    if dir.is_some() {
        config.start_dir = dir;
    }
    FileManager::new(config)
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let fm = match build_manager(cli.config, cli.dir) {
        Ok(fm) => fm,
        Err(e) => {
            eprintln!("Error: {e}");
            return ExitCode::FAILURE;
        }
    };

    let result = match cli.command {
        Commands::Ls { path, long, all, human } => {
            commands::ls(&fm, path.as_deref(), long, all, human).await
        }
        Commands::Up => commands::up(&fm).await,
        Commands::Pwd => commands::pwd(&fm).await,
        Commands::Mkdir { name } => commands::mkdir(&fm, &name).await,
        Commands::Touch { name, content } => commands::touch(&fm, &name, &content).await,
        Commands::Cat { path } => commands::cat(&fm, &path, cli.verbose).await,
        Commands::Write { path, content } => commands::write(&fm, &path, content).await,
        Commands::Rm { paths, yes } => commands::rm(&fm, &paths, yes).await,
        Commands::Rename { path, new_name } => commands::rename(&fm, &path, &new_name).await,
        Commands::Cp { source, dest_dir } => commands::cp(&fm, &source, &dest_dir).await,
        Commands::Mv { source, dest_dir } => commands::mv(&fm, &source, &dest_dir).await,
        Commands::Find { pattern, path, glob } => {
            commands::find(&fm, &pattern, path.as_deref(), glob).await
        }
        Commands::Stat { path } => commands::stat(&fm, &path).await,
        Commands::Df => commands::df(&fm).await,
        Commands::Serve => commands::serve(&fm).await,
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}
