use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "mailferry", version, about = "Forward unread IMAP email to a messaging gateway", disable_help_subcommand = true)]
pub struct Cli {
    /// Config file (default: .mailferry.toml in the current directory)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Interactive session: poll, pick, forward, mark seen
    Forward,

    /// List unread messages without forwarding anything
    List,

    /// Send a test message through the gateway
    SendTest {
        /// Text to send
        #[arg(long, default_value = "mailferry test message")]
        message: String,
    },

    /// Write a starter config file
    Init {
        /// Directory to write .mailferry.toml into (default: current directory)
        #[arg(value_name = "PATH", default_value = ".")]
        path: PathBuf,

        /// Overwrite an existing config file
        #[arg(long)]
        force: bool,
    },
}
