use std::path::PathBuf;

use clap::Parser;

use crate::config::{AnalysisConfig, DEFAULT_INPUT, DEFAULT_SCALE, DEFAULT_SHEET, DEFAULT_THRESHOLD};

#[derive(Parser, Debug, Clone)]
#[command(author, version, about)]
pub struct Args {
    /// Sweep file (.xlsx, .xls, .ods, .csv, .json, .parquet)
    #[arg(value_name = "PATH", default_value = DEFAULT_INPUT)]
    pub input: PathBuf,

    /// Worksheet to read from spreadsheet inputs
    #[arg(long, default_value = DEFAULT_SHEET)]
    pub sheet: String,

    /// Voltage magnitude treated as a zero crossing (V, >= 0)
    #[arg(long, default_value_t = DEFAULT_THRESHOLD, value_parser = parse_threshold)]
    pub threshold: f64,

    /// Factor applied to slopes for display (nm/V -> pm/V)
    #[arg(long, default_value_t = DEFAULT_SCALE)]
    pub scale: f64,

    /// Print the report and exit without opening the plot window
    #[arg(long, default_value_t = false)]
    pub no_plot: bool,

    /// Print the summary as JSON instead of text
    #[arg(long, default_value_t = false)]
    pub json: bool,
}

/// Zero-crossing thresholds are magnitudes: finite and non-negative.
fn parse_threshold(s: &str) -> Result<f64, String> {
    let value: f64 = s.parse().map_err(|e| format!("'{s}' is not a number: {e}"))?;
    if !value.is_finite() || value < 0.0 {
        return Err(format!("threshold must be a finite value >= 0, got {s}"));
    }
    Ok(value)
}

impl Args {
    pub fn analysis_config(&self) -> AnalysisConfig {
        AnalysisConfig {
            input: self.input.clone(),
            sheet: self.sheet.clone(),
            threshold: self.threshold,
            scale: self.scale,
        }
    }
}
