//! CLI definition using clap

use clap::{Parser, Subcommand};
use placaview_types::OutputFormat;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "placaview")]
#[command(author = "yuuji")]
#[command(version)]
#[command(about = "License plate recognition front-end for the PlacaView backend")]
#[command(long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Backend base URL (overrides config and PLACAVIEW_API_URL)
    #[arg(long, global = true)]
    pub api_url: Option<String>,

    /// Output format (json, table). Uses config value if not specified.
    #[arg(long, short = 'f', global = true)]
    pub format: Option<OutputFormat>,

    /// Verbose output
    #[arg(long, short = 'v', global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Submit an image file for plate recognition
    Upload {
        /// Path to image file
        image: PathBuf,

        /// Write the annotated image returned by the backend
        #[arg(long)]
        save_image: Option<PathBuf>,
    },

    /// Capture one camera frame and submit it
    Capture {
        /// Camera device index. Uses config value if not specified.
        #[arg(long, short = 'd')]
        device: Option<usize>,

        /// Also keep the captured frame as a PNG file
        #[arg(long)]
        save_frame: Option<PathBuf>,

        /// Write the annotated image returned by the backend
        #[arg(long)]
        save_image: Option<PathBuf>,
    },

    /// List stored records
    List {
        /// Maximum number of records. Uses config value if not specified.
        #[arg(long, short = 'n')]
        limit: Option<u32>,
    },

    /// Show one record
    Get {
        /// Record identifier
        id: String,

        /// Write the record image
        #[arg(long)]
        save_image: Option<PathBuf>,
    },

    /// Look up a record by plate number
    Search {
        /// Plate number (e.g., "ABC1D23")
        plate: String,

        /// Write the record image
        #[arg(long)]
        save_image: Option<PathBuf>,
    },

    /// Edit a record
    Edit {
        /// Record identifier
        id: String,

        /// New plate text
        #[arg(long, short = 'p')]
        plate: Option<String>,

        /// New entry time (YYYY-MM-DD HH:MM:SS)
        #[arg(long)]
        entry: Option<String>,

        /// New exit time (YYYY-MM-DD HH:MM:SS)
        #[arg(long, conflicts_with = "exit_now")]
        exit: Option<String>,

        /// Set the exit time to the local clock
        #[arg(long)]
        exit_now: bool,
    },

    /// Register the exit of a vehicle (backend sets the time)
    Exit {
        /// Record identifier
        id: String,
    },

    /// Delete a record
    Delete {
        /// Record identifier
        id: String,

        /// Skip confirmation prompt
        #[arg(long, short = 'y')]
        yes: bool,
    },

    /// Check backend status
    Health,

    /// Remove records without plate text from the backend
    Clean,

    /// Manage configuration
    Config {
        /// Show current configuration
        #[arg(long)]
        show: bool,

        /// Set backend base URL
        #[arg(long)]
        set_api_url: Option<String>,

        /// Set default number of listed records
        #[arg(long)]
        set_limit: Option<u32>,

        /// Set default output format
        #[arg(long)]
        set_output: Option<OutputFormat>,

        /// Set camera device index
        #[arg(long)]
        set_camera: Option<usize>,

        /// Reset to defaults
        #[arg(long)]
        reset: bool,
    },
}
