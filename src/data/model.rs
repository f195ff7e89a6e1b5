use std::fmt;

// ---------------------------------------------------------------------------
// Sample – one row of the source sheet
// ---------------------------------------------------------------------------

/// A single (voltage, displacement) reading.
///
/// Missing cells are carried as `NaN` so the row index of every other sample
/// stays identical to the row order of the source file.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sample {
    /// Applied voltage (V).
    pub voltage: f64,
    /// Measured displacement (nm).
    pub displacement: f64,
}

impl Sample {
    pub fn new(voltage: f64, displacement: f64) -> Self {
        Self {
            voltage,
            displacement,
        }
    }

    /// Both coordinates are finite numbers.
    pub fn is_finite(&self) -> bool {
        self.voltage.is_finite() && self.displacement.is_finite()
    }
}

// ---------------------------------------------------------------------------
// Sweep – the complete loaded loop
// ---------------------------------------------------------------------------

/// The ordered samples of one voltage sweep, in acquisition order.
#[derive(Debug, Clone, PartialEq)]
pub struct Sweep {
    samples: Vec<Sample>,
    /// Human-readable origin, e.g. `hyster4.xlsx [Sheet1]`.
    pub source: String,
}

impl Sweep {
    pub fn new(samples: Vec<Sample>, source: impl Into<String>) -> Self {
        Self {
            samples,
            source: source.into(),
        }
    }

    /// Build a sweep from parallel voltage / displacement columns.
    pub fn from_columns(voltage: &[f64], displacement: &[f64], source: impl Into<String>) -> Self {
        let samples = voltage
            .iter()
            .zip(displacement)
            .map(|(&v, &x)| Sample::new(v, x))
            .collect();
        Self::new(samples, source)
    }

    pub fn samples(&self) -> &[Sample] {
        &self.samples
    }

    /// Number of samples.
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// Whether the sweep is empty.
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Samples in the inclusive index range `[start, end]`, clamped to the sweep.
    pub fn slice(&self, start: usize, end: usize) -> &[Sample] {
        if start > end || start >= self.samples.len() {
            return &[];
        }
        let end = end.min(self.samples.len() - 1);
        &self.samples[start..=end]
    }

    /// Indices of samples with strictly positive voltage.
    pub fn positive_indices(&self) -> impl Iterator<Item = usize> + '_ {
        self.samples
            .iter()
            .enumerate()
            .filter(|(_, s)| s.voltage > 0.0)
            .map(|(i, _)| i)
    }

    /// Indices of samples with strictly negative voltage.
    pub fn negative_indices(&self) -> impl Iterator<Item = usize> + '_ {
        self.samples
            .iter()
            .enumerate()
            .filter(|(_, s)| s.voltage < 0.0)
            .map(|(i, _)| i)
    }

    /// Voltage range `(min, max)` over finite samples.
    pub fn voltage_range(&self) -> Option<(f64, f64)> {
        self.samples
            .iter()
            .map(|s| s.voltage)
            .filter(|v| v.is_finite())
            .fold(None, |acc, v| match acc {
                None => Some((v, v)),
                Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
            })
    }
}

impl fmt::Display for Sweep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({} samples)", self.source, self.samples.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slice_is_inclusive_and_clamped() {
        let sweep = Sweep::from_columns(&[0.0, 1.0, 2.0, 3.0], &[0.0, 0.1, 0.2, 0.3], "t");
        assert_eq!(sweep.slice(1, 2).len(), 2);
        assert_eq!(sweep.slice(2, 99).len(), 2);
        assert!(sweep.slice(3, 1).is_empty());
        assert!(sweep.slice(7, 9).is_empty());
    }

    #[test]
    fn sign_partitions_exclude_zero_and_nan() {
        let sweep = Sweep::from_columns(
            &[0.0, 1.0, -1.0, f64::NAN, 2.0],
            &[0.0, 0.0, 0.0, 0.0, 0.0],
            "t",
        );
        assert_eq!(sweep.positive_indices().collect::<Vec<_>>(), vec![1, 4]);
        assert_eq!(sweep.negative_indices().collect::<Vec<_>>(), vec![2]);
        assert_eq!(sweep.voltage_range(), Some((-1.0, 2.0)));
    }
}
