//! Command-line argument definitions for the Drilldown CLI.
//!
//! This module defines the [`Args`] structure parsed from the command line
//! using [`clap`]. Arguments select the catalog, the drill-down path to
//! follow, the container width, the output path, configuration file and
//! logging verbosity.

use clap::Parser;

/// Command-line arguments for the Drilldown explorer
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Path to the diagram catalog (TOML)
    #[arg(help = "Path to the catalog file")]
    pub catalog: String,

    /// Node to activate, starting from the root diagram. Repeat to drill deeper.
    #[arg(long = "click", value_name = "NODE_ID")]
    pub clicks: Vec<String>,

    /// Container width in pixels
    #[arg(long)]
    pub width: Option<f32>,

    /// Path to the output SVG file
    #[arg(short, long, default_value = "out.svg")]
    pub output: String,

    /// Path to configuration file (TOML)
    #[arg(short, long)]
    pub config: Option<String>,

    /// Log level (off, error, warn, info, debug, trace)
    #[arg(long, default_value = "info")]
    pub log_level: String,
}
