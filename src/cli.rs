use clap::{ArgAction, Parser, Subcommand};
use std::path::{Path, PathBuf};

use crate::session::DEFAULT_LISTEN_ADDR;

/// Sync directory used when neither --dir nor PARAMSYNC_DIR is set
pub const DEFAULT_DIR: &str = "/var/tmp/filecoin-proof-parameters";

#[derive(Parser, Debug)]
#[command(name = "paramsync")]
#[command(about = "Copy missing content-addressed files between two hosts", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Directory holding the synced files
    #[arg(long, global = true, env = "PARAMSYNC_DIR", default_value = DEFAULT_DIR)]
    pub dir: PathBuf,

    /// Disable per-file progress bars
    #[arg(long, global = true)]
    pub no_progress: bool,

    /// Verbose output (-v debug, -vv trace)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    /// Only log warnings and errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
pub enum Command {
    /// Connect to a receiver and offer the local files
    Send {
        /// Receiver address (host:port)
        addr: String,
    },

    /// Wait for one sender and fetch the files missing locally
    Recv {
        /// Address to listen on
        #[arg(default_value = DEFAULT_LISTEN_ADDR)]
        addr: String,
    },

    /// Print the local manifest and exit
    Manifest {
        /// Print as JSON
        #[arg(long)]
        json: bool,
    },
}

impl Cli {
    /// Default tracing filter when RUST_LOG is unset
    pub fn log_level(&self) -> &'static str {
        if self.quiet {
            return "warn";
        }
        match self.verbose {
            0 => "info",
            1 => "debug",
            _ => "trace",
        }
    }

    /// Sync directory with `~` expanded
    pub fn root(&self) -> PathBuf {
        expand_tilde(&self.dir)
    }
}

/// Expand tilde (~) in paths to the user's home directory.
fn expand_tilde(path: &Path) -> PathBuf {
    let path_str = path.to_string_lossy();

    if path_str == "~" {
        dirs::home_dir().unwrap_or_else(|| PathBuf::from("."))
    } else if let Some(rest) = path_str.strip_prefix("~/") {
        match dirs::home_dir() {
            Some(home) => home.join(rest),
            None => path.to_path_buf(),
        }
    } else {
        path.to_path_buf()
    }
}
