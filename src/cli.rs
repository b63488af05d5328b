// CLI module - command-line argument parsing and handlers
//
// Subcommands:
// - export --source <capture.json>: Replay a captured table and export it
// - demo: Export the built-in lazily loaded demo table
// - config --show/--reset/--edit/--update/--path: Manage configuration

use crate::config::{Config, VERSION};
use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::Command;

/// scrollgrab - export every row of a virtualized table
#[derive(Parser)]
#[command(name = "scrollgrab")]
#[command(version = VERSION)]
#[command(about = "Export every row of a virtualized table", long_about = None)]
#[command(arg_required_else_help = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Export a table from a JSON capture
    Export {
        /// Capture file (headers, rows, optional layout)
        #[arg(long)]
        source: PathBuf,

        #[command(flatten)]
        destination: DestinationArgs,
    },

    /// Export the built-in demo table
    Demo {
        /// Number of rows in the demo table
        #[arg(long, default_value_t = 250)]
        rows: usize,

        #[command(flatten)]
        destination: DestinationArgs,
    },

    /// Manage configuration
    Config {
        /// Show effective configuration
        #[arg(long)]
        show: bool,

        /// Reset config file to defaults
        #[arg(long)]
        reset: bool,

        /// Open config file in $EDITOR
        #[arg(long)]
        edit: bool,

        /// Update config with new defaults (preserves user values)
        #[arg(long)]
        update: bool,

        /// Show config file path
        #[arg(long)]
        path: bool,
    },
}

/// Where the export goes; defaults to a file in the configured output dir
#[derive(clap::Args, Debug, Clone, Default)]
pub struct DestinationArgs {
    /// Print the export to stdout
    #[arg(long, conflicts_with_all = ["clipboard", "out"])]
    stdout: bool,

    /// Copy the export to the system clipboard
    #[arg(long, conflicts_with = "out")]
    clipboard: bool,

    /// Write the export into this directory
    #[arg(long, value_name = "DIR")]
    out: Option<PathBuf>,
}

/// Resolved export destination
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Destination {
    /// File sink; `None` means the configured output directory
    File(Option<PathBuf>),
    Stdout,
    Clipboard,
}

impl From<DestinationArgs> for Destination {
    fn from(args: DestinationArgs) -> Self {
        if args.stdout {
            Self::Stdout
        } else if args.clipboard {
            Self::Clipboard
        } else {
            Self::File(args.out)
        }
    }
}

/// Where the rows come from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Source {
    Capture(PathBuf),
    Demo { rows: usize },
}

/// An export the main task should run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunRequest {
    pub source: Source,
    pub destination: Destination,
}

/// Handle CLI commands. Returns the export to run, or `None` when a
/// config command was handled and the process should exit.
pub fn handle_cli() -> Option<RunRequest> {
    dispatch(Cli::parse())
}

fn dispatch(cli: Cli) -> Option<RunRequest> {
    match cli.command {
        Commands::Export {
            source,
            destination,
        } => Some(RunRequest {
            source: Source::Capture(source),
            destination: destination.into(),
        }),
        Commands::Demo { rows, destination } => Some(RunRequest {
            source: Source::Demo { rows },
            destination: destination.into(),
        }),
        Commands::Config {
            show,
            reset,
            edit,
            update,
            path,
        } => {
            match ConfigAction::from_flags(show, reset, edit, update, path) {
                Some(action) => {
                    if let Err(e) = action.run() {
                        eprintln!("Error: {:#}", e);
                        std::process::exit(1);
                    }
                }
                None => print_config_usage(),
            }
            None
        }
    }
}

/// One `config` flag; `--path` wins when several are given
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ConfigAction {
    Path,
    Show,
    Reset,
    Edit,
    Update,
}

impl ConfigAction {
    fn from_flags(show: bool, reset: bool, edit: bool, update: bool, path: bool) -> Option<Self> {
        [
            (path, Self::Path),
            (show, Self::Show),
            (reset, Self::Reset),
            (edit, Self::Edit),
            (update, Self::Update),
        ]
        .into_iter()
        .find_map(|(set, action)| set.then_some(action))
    }

    fn run(self) -> Result<()> {
        match self {
            Self::Path => {
                println!("{}", config_file()?.display());
                Ok(())
            }
            Self::Show => {
                show_config();
                Ok(())
            }
            Self::Reset => reset_config(&config_file()?),
            Self::Edit => edit_config(&config_file()?),
            Self::Update => update_config(&config_file()?),
        }
    }
}

fn print_config_usage() {
    println!("Usage: scrollgrab config [--show|--reset|--edit|--update|--path]");
    println!();
    println!("  --show    Print the effective configuration");
    println!("  --reset   Overwrite the config file with defaults");
    println!("  --edit    Open the config file in $EDITOR");
    println!("  --update  Rewrite the config file with current keys, keeping values");
    println!("  --path    Print the config file location");
}

fn config_file() -> Result<PathBuf> {
    Config::config_path().context("Could not determine config path")
}

/// Write a config file, creating its directory
fn write_config(path: &Path, contents: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }
    std::fs::write(path, contents).with_context(|| format!("Failed to write {}", path.display()))
}

/// Ask a yes/no question on stderr; anything but "y" is a no
fn confirm(prompt: &str) -> bool {
    eprint!("{} [y/N] ", prompt);
    let _ = std::io::stderr().flush();
    let mut input = String::new();
    std::io::stdin().read_line(&mut input).is_ok() && input.trim().eq_ignore_ascii_case("y")
}

fn editor_command() -> String {
    std::env::var("EDITOR")
        .or_else(|_| std::env::var("VISUAL"))
        .unwrap_or_else(|_| if cfg!(windows) { "notepad" } else { "nano" }.to_string())
}

fn show_config() {
    println!("# Effective configuration (env > file > defaults)");
    println!();
    print!("{}", Config::from_env().to_toml());
    println!();
    match Config::config_path() {
        Some(path) if path.exists() => println!("# Source: {}", path.display()),
        _ => println!("# Source: defaults (no config file)"),
    }
}

fn reset_config(path: &Path) -> Result<()> {
    if path.exists() && !confirm(&format!("Overwrite {}?", path.display())) {
        println!("Aborted.");
        return Ok(());
    }
    write_config(path, &Config::default().to_toml())?;
    println!("Config reset to defaults: {}", path.display());
    Ok(())
}

fn edit_config(path: &Path) -> Result<()> {
    if !path.exists() {
        write_config(path, &Config::default().to_toml())?;
        println!("Created {}", path.display());
    }

    let editor = editor_command();
    let status = Command::new(&editor)
        .arg(path)
        .status()
        .with_context(|| format!("Failed to launch '{}' (set $EDITOR)", editor))?;
    if !status.success() {
        bail!("{} exited with {}", editor, status);
    }
    Ok(())
}

/// Rewrite the file from the effective config so new keys appear and
/// existing values survive. The previous file is kept as `.toml.bak`.
fn update_config(path: &Path) -> Result<()> {
    if path.exists() {
        let backup = path.with_extension("toml.bak");
        match std::fs::copy(path, &backup) {
            Ok(_) => println!("Backup: {}", backup.display()),
            Err(e) => eprintln!("Warning: no backup written: {}", e),
        }
    }
    write_config(path, &Config::from_env().to_toml())?;
    println!("Config updated: {}", path.display());
    Ok(())
}
