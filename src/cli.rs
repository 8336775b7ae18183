use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::config::BaudRate;

/// The command line interface for the Wi-Fi provisioner.
#[derive(Parser)]
#[command(author, version, about)]
pub struct Cli {
    /// Path to a RON configuration file with link defaults
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Also log to daily rolling files in this directory
    #[arg(long, global = true)]
    pub log_dir: Option<PathBuf>,

    /// Subcommands
    #[command(subcommand)]
    pub command: Commands,
}

/// Commands available in the command line interface.
#[derive(Subcommand)]
pub enum Commands {
    /// List the serial ports attached to this host.
    Ports,

    /// Open a port, send Wi-Fi credentials, and report what the device says.
    Provision {
        /// The port to open, e.g. `/dev/ttyACM0` or `COM3`.
        /// Falls back to the configuration file.
        #[arg(long)]
        port: Option<String>,

        /// The baud rate (9600, 19200, 38400, 57600 or 115200).
        #[arg(long)]
        baud: Option<BaudRate>,

        /// The network name to send.
        #[arg(long)]
        ssid: String,

        /// The network password to send.
        #[arg(long)]
        password: String,

        /// Keep observing device output after sending, until ctrl-c.
        #[arg(long)]
        watch: bool,
    },

    /// Show an example of a configuration file's contents.
    ExampleConfig,
}
