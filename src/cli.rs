//! Command-line arguments.

use crate::config::Overrides;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Upload mobile apps to a MobSF server, scan them and fetch the results
#[derive(Parser, Debug, Clone)]
#[command(name = "mobsf-cli", version)]
#[command(about = "Command-line client for the MobSF REST API", long_about = None)]
pub struct Args {
    /// MobSF server base URL [default: http://127.0.0.1:8000]
    #[arg(short, long, env = "MOBSF_SERVER", global = true)]
    pub server: Option<String>,

    /// REST API key sent in the Authorization header
    #[arg(short = 'k', long, env = "MOBSF_API_KEY", hide_env_values = true, global = true)]
    pub api_key: Option<String>,

    /// Config file path [default: <config dir>/mobsf-cli/config.json]
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Directory reports are saved to [default: current directory]
    #[arg(short, long, global = true)]
    pub output_dir: Option<PathBuf>,

    /// Request timeout in seconds, 0 to wait indefinitely [default: 300]
    #[arg(short, long, global = true)]
    pub timeout: Option<u64>,

    /// Increase log verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Only log errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum Command {
    /// Upload a file, scan it, and optionally fetch reports
    Scan {
        /// APK, IPA, APPX or zipped source to upload
        file: PathBuf,

        /// Download the PDF report as static-<hash>.pdf
        #[arg(long)]
        pdf: bool,

        /// Save the JSON report as report.json
        #[arg(long)]
        json: bool,

        /// Print the security score card
        #[arg(long)]
        score: bool,

        /// Delete the scan from the server afterwards
        #[arg(long)]
        delete: bool,
    },

    /// List recent scans on the server
    Recent {
        #[arg(long)]
        page: Option<u32>,

        #[arg(long)]
        page_size: Option<u32>,
    },

    /// Compare two scans by hash
    Compare { first: String, second: String },

    /// Interactive menu (the default when no command is given)
    Menu {
        /// File to upload
        #[arg(short, long)]
        file: Option<PathBuf>,
    },
}

impl Args {
    pub fn overrides(&self) -> Overrides {
        Overrides {
            server: self.server.clone(),
            api_key: self.api_key.clone(),
            timeout_secs: self.timeout,
            output_dir: self.output_dir.clone(),
        }
    }
}
