//! Command-line argument definitions for the Roleplay CLI.
//!
//! This module defines the [`Args`] structure parsed from the command line
//! using [`clap`]. Global options select the configuration file and logging
//! verbosity; the [`Command`] picks what to do with a project.

use clap::{Parser, Subcommand};

/// Command-line arguments for the Roleplay story tool
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    #[command(subcommand)]
    pub command: Command,

    /// Path to configuration file (TOML)
    #[arg(short, long, global = true)]
    pub config: Option<String>,

    /// Log level (off, error, warn, info, debug, trace)
    #[arg(long, default_value = "info", global = true)]
    pub log_level: String,
}

/// What to do with a project.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Create a new project bundle with a start and an end scene
    New {
        /// Directory to write the bundle into
        output: String,

        /// Project title
        #[arg(short, long)]
        title: Option<String>,
    },

    /// Validate a project and report every diagnostic
    Check {
        /// Bundle directory or project JSON file
        input: String,
    },

    /// Print the grid layout of a project
    Layout {
        /// Bundle directory or project JSON file
        input: String,

        /// Print the layout as JSON
        #[arg(long)]
        json: bool,
    },

    /// Play a project interactively
    Play {
        /// Bundle directory or project JSON file
        input: String,
    },
}

impl Command {
    /// Returns the project path the command reads or writes.
    pub fn path(&self) -> &str {
        match self {
            Command::New { output, .. } => output,
            Command::Check { input } | Command::Layout { input, .. } | Command::Play { input } => {
                input
            }
        }
    }
}
