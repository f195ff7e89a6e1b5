use std::path::PathBuf;

use serde::Serialize;

/// Workbook read when no path is given.
pub const DEFAULT_INPUT: &str = "hyster4.xlsx";
/// Worksheet read from spreadsheet inputs.
pub const DEFAULT_SHEET: &str = "Sheet1";
/// Voltage magnitude treated as a zero crossing (V).
pub const DEFAULT_THRESHOLD: f64 = 0.1;
/// nm/V → pm/V.
pub const DEFAULT_SCALE: f64 = 1000.0;

// ---------------------------------------------------------------------------
// Analysis configuration
// ---------------------------------------------------------------------------

/// Everything a run needs besides the samples themselves.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalysisConfig {
    pub input: PathBuf,
    pub sheet: String,
    pub threshold: f64,
    pub scale: f64,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            input: PathBuf::from(DEFAULT_INPUT),
            sheet: DEFAULT_SHEET.to_string(),
            threshold: DEFAULT_THRESHOLD,
            scale: DEFAULT_SCALE,
        }
    }
}
