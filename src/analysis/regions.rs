use std::fmt;

use serde::Serialize;
use thiserror::Error;

use crate::data::model::Sweep;

// ---------------------------------------------------------------------------
// RegionKind – the four branches of the butterfly loop
// ---------------------------------------------------------------------------

/// One of the four branches used for independent d33 estimates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RegionKind {
    /// Start of the sweep up to the displacement minimum at positive voltage.
    N1,
    /// Displacement maximum at positive voltage back down to ~0 V.
    P1,
    /// First clearly negative voltage to the displacement minimum at negative voltage.
    P2,
    /// Displacement maximum at negative voltage to the end of the sweep.
    N2,
}

impl RegionKind {
    /// Sweep order.
    pub const ALL: [RegionKind; 4] = [RegionKind::N1, RegionKind::P1, RegionKind::P2, RegionKind::N2];

    pub fn label(self) -> &'static str {
        match self {
            RegionKind::N1 => "n1",
            RegionKind::P1 => "p1",
            RegionKind::P2 => "p2",
            RegionKind::N2 => "n2",
        }
    }
}

impl fmt::Display for RegionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

// ---------------------------------------------------------------------------
// Region – an inclusive index range into the sweep
// ---------------------------------------------------------------------------

/// A contiguous run of sweep samples, `[start, end]` inclusive.
///
/// `span` is `None` for an empty region.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Region {
    pub kind: RegionKind,
    pub span: Option<(usize, usize)>,
}

impl Region {
    /// A region covering `[start, end]`; empty when `start > end`.
    pub fn new(kind: RegionKind, start: usize, end: usize) -> Self {
        let span = (start <= end).then_some((start, end));
        Self { kind, span }
    }

    pub fn empty(kind: RegionKind) -> Self {
        Self { kind, span: None }
    }

    pub fn is_empty(&self) -> bool {
        self.span.is_none()
    }

    /// Number of samples covered.
    pub fn len(&self) -> usize {
        self.span.map_or(0, |(s, e)| e - s + 1)
    }

    /// Whether `index` falls inside the region.
    pub fn contains(&self, index: usize) -> bool {
        self.span.is_some_and(|(s, e)| (s..=e).contains(&index))
    }
}

// ---------------------------------------------------------------------------
// Boundary search failures
// ---------------------------------------------------------------------------

/// Why a region boundary could not be located.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum BoundaryError {
    #[error("no sample with positive voltage")]
    NoPositiveVoltage,
    #[error("no sample with negative voltage")]
    NoNegativeVoltage,
    #[error("voltage never drops below {threshold} after index {peak}")]
    NoZeroCrossing { peak: usize, threshold: f64 },
    #[error("voltage never drops below -{threshold}")]
    NoNegativeCrossing { threshold: f64 },
}

/// Outcome of locating one region.
pub type RegionResult = Result<Region, BoundaryError>;

// ---------------------------------------------------------------------------
// Partitioner
// ---------------------------------------------------------------------------

/// The four regions of a sweep, in sweep order (n1, p1, p2, n2).
#[derive(Debug, Clone, PartialEq)]
pub struct Partition {
    pub n1: RegionResult,
    pub p1: RegionResult,
    pub p2: RegionResult,
    pub n2: RegionResult,
}

impl Partition {
    pub fn get(&self, kind: RegionKind) -> &RegionResult {
        match kind {
            RegionKind::N1 => &self.n1,
            RegionKind::P1 => &self.p1,
            RegionKind::P2 => &self.p2,
            RegionKind::N2 => &self.n2,
        }
    }

    /// The region for `kind`, substituting an empty placeholder for a failed search.
    pub fn region(&self, kind: RegionKind) -> Region {
        self.get(kind).clone().unwrap_or(Region::empty(kind))
    }

    /// Boundary failures in sweep order.
    pub fn failures(&self) -> impl Iterator<Item = (RegionKind, &BoundaryError)> + '_ {
        RegionKind::ALL
            .into_iter()
            .filter_map(|k| self.get(k).as_ref().err().map(|e| (k, e)))
    }
}

/// Split a sweep into the n1, p1, p2 and n2 branches.
///
/// `threshold` is the voltage magnitude that marks a zero crossing: p1 ends at
/// the first sample below `+threshold` after the positive displacement peak,
/// and p2 starts at the first sample below `-threshold`.
pub fn partition(sweep: &Sweep, threshold: f64) -> Partition {
    let pos_min = argmin_displacement(sweep, sweep.positive_indices());
    let pos_max = argmax_displacement(sweep, sweep.positive_indices());
    let neg_min = argmin_displacement(sweep, sweep.negative_indices());
    let neg_max = argmax_displacement(sweep, sweep.negative_indices());

    let n1 = pos_min
        .map(|end| Region::new(RegionKind::N1, 0, end))
        .ok_or(BoundaryError::NoPositiveVoltage);

    let p1 = pos_max.ok_or(BoundaryError::NoPositiveVoltage).and_then(|peak| {
        sweep.samples()[peak + 1..]
            .iter()
            .position(|s| s.voltage < threshold)
            .map(|offset| Region::new(RegionKind::P1, peak, peak + 1 + offset))
            .ok_or(BoundaryError::NoZeroCrossing { peak, threshold })
    });

    let p2 = sweep
        .samples()
        .iter()
        .position(|s| s.voltage < 0.0 && s.voltage < -threshold)
        .ok_or(BoundaryError::NoNegativeCrossing { threshold })
        .and_then(|start| {
            neg_min
                .map(|end| Region::new(RegionKind::P2, start, end))
                .ok_or(BoundaryError::NoNegativeVoltage)
        });

    let n2 = neg_max
        .map(|start| Region::new(RegionKind::N2, start, sweep.len() - 1))
        .ok_or(BoundaryError::NoNegativeVoltage);

    Partition { n1, p1, p2, n2 }
}

/// First index of the smallest finite displacement among `indices`.
fn argmin_displacement(sweep: &Sweep, indices: impl Iterator<Item = usize>) -> Option<usize> {
    first_extremum(sweep, indices, |candidate, best| candidate < best)
}

/// First index of the largest finite displacement among `indices`.
fn argmax_displacement(sweep: &Sweep, indices: impl Iterator<Item = usize>) -> Option<usize> {
    first_extremum(sweep, indices, |candidate, best| candidate > best)
}

fn first_extremum(
    sweep: &Sweep,
    indices: impl Iterator<Item = usize>,
    better: impl Fn(f64, f64) -> bool,
) -> Option<usize> {
    let samples = sweep.samples();
    let mut best: Option<(usize, f64)> = None;
    for i in indices {
        let x = samples[i].displacement;
        if x.is_nan() {
            continue;
        }
        match best {
            Some((_, bx)) if !better(x, bx) => {}
            _ => best = Some((i, x)),
        }
    }
    best.map(|(i, _)| i)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sweep(points: &[(f64, f64)]) -> Sweep {
        let v: Vec<f64> = points.iter().map(|p| p.0).collect();
        let x: Vec<f64> = points.iter().map(|p| p.1).collect();
        Sweep::from_columns(&v, &x, "test")
    }

    #[test]
    fn extremum_search_keeps_first_occurrence_and_skips_nan() {
        let s = sweep(&[(1.0, 2.0), (1.0, f64::NAN), (1.0, 5.0), (1.0, 5.0), (1.0, 2.0)]);
        assert_eq!(argmax_displacement(&s, s.positive_indices()), Some(2));
        assert_eq!(argmin_displacement(&s, s.positive_indices()), Some(0));
        assert_eq!(argmin_displacement(&s, s.negative_indices()), None);
    }

    #[test]
    fn p1_stops_at_first_sample_below_threshold() {
        let s = sweep(&[
            (0.0, 0.0),
            (1.0, -1.0),
            (2.0, 3.0),
            (1.0, 2.0),
            (0.05, 1.0),
            (-0.5, 0.5),
        ]);
        let part = partition(&s, 0.1);
        assert_eq!(part.p1, Ok(Region::new(RegionKind::P1, 2, 4)));
        assert_eq!(part.n1, Ok(Region::new(RegionKind::N1, 0, 1)));
    }

    #[test]
    fn p1_without_zero_crossing_is_a_boundary_error() {
        let s = sweep(&[(0.0, 0.0), (1.0, -1.0), (2.0, 3.0), (1.5, 2.0), (1.0, 1.0)]);
        let part = partition(&s, 0.1);
        assert_eq!(
            part.p1,
            Err(BoundaryError::NoZeroCrossing {
                peak: 2,
                threshold: 0.1
            })
        );
        assert!(part.region(RegionKind::P1).is_empty());
    }

    #[test]
    fn p2_starting_after_its_end_is_empty() {
        // Displacement minimum at negative voltage comes before the -0.1 crossing.
        let s = sweep(&[(1.0, 0.0), (-0.05, -5.0), (-0.5, 1.0), (-1.0, 2.0)]);
        let part = partition(&s, 0.1);
        let p2 = part.p2.clone().unwrap();
        assert!(p2.is_empty());
        assert_eq!(part.n2, Ok(Region::new(RegionKind::N2, 3, 3)));
    }

    #[test]
    fn positive_only_sweep_loses_negative_branches() {
        let s = sweep(&[(0.5, 0.0), (1.0, 1.0), (0.0, 0.5)]);
        let part = partition(&s, 0.1);
        assert_eq!(part.p2, Err(BoundaryError::NoNegativeCrossing { threshold: 0.1 }));
        assert_eq!(part.n2, Err(BoundaryError::NoNegativeVoltage));
        let failed: Vec<RegionKind> = part.failures().map(|(k, _)| k).collect();
        assert_eq!(failed, vec![RegionKind::P2, RegionKind::N2]);
    }

    #[test]
    fn empty_sweep_fails_every_search() {
        let part = partition(&Sweep::new(Vec::new(), "empty"), 0.1);
        assert_eq!(part.failures().count(), 4);
    }

    #[test]
    fn region_len_and_contains() {
        let r = Region::new(RegionKind::N2, 3, 5);
        assert_eq!(r.len(), 3);
        assert!(r.contains(3) && r.contains(5));
        assert!(!r.contains(6));
        assert_eq!(Region::empty(RegionKind::N2).len(), 0);
    }
}
