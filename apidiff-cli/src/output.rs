//! Output format selection for CLI results.

use clap::ValueEnum;

/// Output format for comparison results.
#[derive(Debug, Clone, Copy, Default, ValueEnum, PartialEq, Eq)]
pub enum OutputFormat {
    /// Human-readable report (default)
    #[default]
    Report,
    /// JSON catalogue for machine consumption
    Json,
}
