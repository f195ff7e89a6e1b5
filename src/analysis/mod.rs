/// Analysis layer: region partitioning, per-region fits, d33 summary.
///
/// ```text
///   Sweep
///     │
///     ▼
///   ┌──────────┐
///   │ regions   │  n1 / p1 / p2 / n2 index ranges
///   └──────────┘
///     │
///     ▼
///   ┌──────────┐
///   │   fit     │  least squares per region → slope
///   └──────────┘
///     │
///     ▼
///   ┌──────────┐
///   │  report   │  scaled d33 values + branch averages
///   └──────────┘
/// ```

pub mod fit;
pub mod regions;
pub mod report;

use crate::config::AnalysisConfig;
use crate::data::model::Sweep;

use fit::{FitError, LinearFit, linear_fit};
use regions::{Partition, Region, RegionKind, partition};
use report::D33Summary;

/// A region together with the outcome of fitting it.
#[derive(Debug, Clone, PartialEq)]
pub struct RegionFit {
    pub region: Region,
    pub fit: Result<LinearFit, FitError>,
}

impl RegionFit {
    pub fn kind(&self) -> RegionKind {
        self.region.kind
    }

    /// Raw slope, `None` when the region was not fitted.
    pub fn slope(&self) -> Option<f64> {
        self.fit.as_ref().ok().map(|f| f.slope)
    }
}

/// Complete result of one run over a sweep.
#[derive(Debug, Clone, PartialEq)]
pub struct LoopAnalysis {
    pub partition: Partition,
    /// Fits in sweep order (n1, p1, p2, n2).
    pub fits: Vec<RegionFit>,
    pub summary: D33Summary,
}

impl LoopAnalysis {
    pub fn fit(&self, kind: RegionKind) -> Option<&RegionFit> {
        self.fits.iter().find(|f| f.kind() == kind)
    }
}

/// Partition `sweep`, fit every region, and summarise.
pub fn analyze(sweep: &Sweep, config: &AnalysisConfig) -> LoopAnalysis {
    let partition = partition(sweep, config.threshold);
    for (kind, err) in partition.failures() {
        log::warn!("Could not find {kind} region: {err}");
    }

    let fits: Vec<RegionFit> = RegionKind::ALL
        .into_iter()
        .map(|kind| {
            let region = partition.region(kind);
            let samples = match region.span {
                Some((start, end)) => sweep.slice(start, end),
                None => &[],
            };
            let fit = linear_fit(samples);
            match &fit {
                Ok(f) => log::debug!(
                    "{kind}: {} of {} samples fitted, slope {:.6}, r²={:.4}",
                    f.n,
                    region.len(),
                    f.slope,
                    f.r_squared()
                ),
                Err(e) => log::info!("{kind} not fitted: {e}"),
            }
            RegionFit { region, fit }
        })
        .collect();

    let summary = D33Summary::new(&partition, &fits, config.scale);
    LoopAnalysis {
        partition,
        fits,
        summary,
    }
}
