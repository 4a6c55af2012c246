//! CLI module - Command-line interface for Holocron
//!
//! This module provides a structured CLI using clap for argument parsing.

mod commands;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Holocron - Star Wars catalog favorites API
#[derive(Parser)]
#[command(name = "holocron")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the HTTP API (default)
    Serve,

    /// Apply pending database migrations and exit
    Migrate,

    /// Load users, planets and characters from a TOML fixture.
    /// Entries whose email or name already exists are skipped.
    Seed {
        /// Path to the fixture file
        file: PathBuf,
    },
}

pub use commands::*;
