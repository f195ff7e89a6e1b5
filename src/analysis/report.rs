use std::fmt;

use serde::Serialize;

use super::RegionFit;
use super::fit::FitError;
use super::regions::{Partition, RegionKind};

/// Order in which per-region results are printed.
pub const REPORT_ORDER: [RegionKind; 4] = [
    RegionKind::P1,
    RegionKind::N1,
    RegionKind::N2,
    RegionKind::P2,
];

// ---------------------------------------------------------------------------
// Per-region line
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RegionD33 {
    pub region: RegionKind,
    /// Inclusive sample index range, `None` for an empty region.
    pub span: Option<(usize, usize)>,
    /// Raw slope (nm/V).
    pub slope: Option<f64>,
    /// Scaled slope (pm/V).
    pub d33: Option<f64>,
    pub r_squared: Option<f64>,
    /// Why no slope was computed.
    pub notice: Option<String>,
}

impl RegionD33 {
    fn new(fit: &RegionFit, scale: f64) -> Self {
        let (slope, r_squared, notice) = match &fit.fit {
            Ok(f) => (Some(f.slope), Some(f.r_squared()), None),
            Err(FitError::Empty) => (
                None,
                None,
                Some(format!("{} region is empty. Skipping.", fit.kind())),
            ),
            Err(e) => (
                None,
                None,
                Some(format!("{} region could not be fitted ({e}). Skipping.", fit.kind())),
            ),
        };
        Self {
            region: fit.kind(),
            span: fit.region.span,
            slope,
            d33: slope.map(|s| s * scale),
            r_squared,
            notice,
        }
    }
}

// ---------------------------------------------------------------------------
// Summary
// ---------------------------------------------------------------------------

/// Scaled d33 estimates for every region plus the branch averages.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct D33Summary {
    pub scale: f64,
    /// Boundary warnings, sweep order.
    pub warnings: Vec<String>,
    /// Region results in [`REPORT_ORDER`].
    pub regions: Vec<RegionD33>,
    /// Mean of the p1 and p2 slopes, scaled.
    pub average_positive: Option<f64>,
    /// Mean of the n1 and n2 slopes, scaled.
    pub average_negative: Option<f64>,
}

impl D33Summary {
    pub fn new(partition: &Partition, fits: &[RegionFit], scale: f64) -> Self {
        let warnings = partition
            .failures()
            .map(|(kind, err)| format!("Could not find {kind} region: {err}"))
            .collect();

        let slope_of = |kind: RegionKind| {
            fits.iter()
                .find(|f| f.kind() == kind)
                .and_then(RegionFit::slope)
        };

        let regions = REPORT_ORDER
            .iter()
            .filter_map(|&kind| fits.iter().find(|f| f.kind() == kind))
            .map(|f| RegionD33::new(f, scale))
            .collect();

        Self {
            scale,
            warnings,
            regions,
            average_positive: branch_average(slope_of(RegionKind::P1), slope_of(RegionKind::P2), scale),
            average_negative: branch_average(slope_of(RegionKind::N1), slope_of(RegionKind::N2), scale),
        }
    }

    pub fn region(&self, kind: RegionKind) -> Option<&RegionD33> {
        self.regions.iter().find(|r| r.region == kind)
    }
}

/// `(a + b) * scale / 2` over RAW slopes; undefined if either side is missing.
pub fn branch_average(a: Option<f64>, b: Option<f64>, scale: f64) -> Option<f64> {
    Some((a? + b?) * scale / 2.0)
}

impl fmt::Display for D33Summary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for w in &self.warnings {
            writeln!(f, "⚠️ {w}")?;
        }
        for r in &self.regions {
            match (r.d33, &r.notice) {
                (Some(d33), _) => writeln!(f, "{} d33: {d33:.2} pm/V", r.region)?,
                (None, Some(notice)) => writeln!(f, "{notice}")?,
                (None, None) => writeln!(f, "{} region is empty. Skipping.", r.region)?,
            }
        }
        write_average(f, "positive", self.average_positive, "p1/p2")?;
        write_average(f, "negative", self.average_negative, "n1/n2")
    }
}

fn write_average(
    f: &mut fmt::Formatter<'_>,
    branch: &str,
    value: Option<f64>,
    sources: &str,
) -> fmt::Result {
    match value {
        Some(v) => writeln!(f, "average {branch} d33: {v:.2}"),
        None => writeln!(f, "average {branch} d33: undefined ({sources} slope missing)"),
    }
}
