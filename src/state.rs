use std::path::Path;

use crate::analysis::{LoopAnalysis, analyze};
use crate::config::AnalysisConfig;
use crate::data::loader::load_file;
use crate::data::model::Sweep;

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// The full UI state, independent of rendering.
pub struct AppState {
    /// Input, sheet, threshold and scale of the current run.
    pub config: AnalysisConfig,

    /// Loaded sweep (None until a file loads successfully).
    pub sweep: Option<Sweep>,

    /// Regions, fits and d33 summary for `sweep`.
    pub analysis: Option<LoopAnalysis>,

    /// Status / error message shown in the UI.
    pub status_message: Option<String>,
}

impl AppState {
    pub fn new(config: AnalysisConfig) -> Self {
        Self {
            config,
            sweep: None,
            analysis: None,
            status_message: None,
        }
    }

    /// State for a sweep that has already been analysed.
    pub fn with_analysis(config: AnalysisConfig, sweep: Sweep, analysis: LoopAnalysis) -> Self {
        Self {
            sweep: Some(sweep),
            analysis: Some(analysis),
            ..Self::new(config)
        }
    }

    /// Replace the sweep and rerun the analysis.
    pub fn set_sweep(&mut self, sweep: Sweep) {
        self.sweep = Some(sweep);
        self.status_message = None;
        self.reanalyze();
    }

    /// Load `path` (using the configured sheet) and analyse it.
    ///
    /// On failure the previous sweep stays in place and the error is shown.
    pub fn load(&mut self, path: &Path) {
        match load_file(path, &self.config.sheet) {
            Ok(sweep) => {
                self.config.input = path.to_path_buf();
                self.set_sweep(sweep);
            }
            Err(e) => {
                log::error!("Failed to load file: {e:#}");
                self.status_message = Some(format!("Error: {e:#}"));
            }
        }
    }

    /// Change the zero-crossing threshold and recompute the regions.
    pub fn set_threshold(&mut self, threshold: f64) {
        self.config.threshold = threshold;
        self.reanalyze();
    }

    /// Recompute the analysis for the current sweep and config.
    ///
    /// The console report is printed once by `main`; viewer updates only log it.
    fn reanalyze(&mut self) {
        self.analysis = self.sweep.as_ref().map(|sweep| {
            let analysis = analyze(sweep, &self.config);
            log::info!("{}:\n{}", sweep.source, analysis.summary);
            analysis
        });
    }
}
