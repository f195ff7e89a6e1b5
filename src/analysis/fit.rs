use serde::Serialize;
use thiserror::Error;

use crate::data::model::Sample;

/// Ordinary least-squares fit of displacement on voltage.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LinearFit {
    /// Displacement units per volt (nm/V for the usual input).
    pub slope: f64,
    pub intercept: f64,
    /// Pearson correlation coefficient.
    pub r_value: f64,
    /// Standard error of the slope.
    pub stderr: f64,
    /// Number of finite samples that entered the fit.
    pub n: usize,
}

impl LinearFit {
    pub fn r_squared(&self) -> f64 {
        self.r_value * self.r_value
    }
}

/// Why no slope could be computed for a region.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum FitError {
    #[error("region is empty")]
    Empty,
    #[error("only {0} finite sample(s), need at least 2")]
    TooFewSamples(usize),
    #[error("voltage is constant across the region")]
    ZeroVoltageSpan,
}

/// Fit `displacement = slope * voltage + intercept` over `samples`.
///
/// Samples with a non-finite coordinate are left out.
pub fn linear_fit(samples: &[Sample]) -> Result<LinearFit, FitError> {
    if samples.is_empty() {
        return Err(FitError::Empty);
    }

    let finite: Vec<&Sample> = samples.iter().filter(|s| s.is_finite()).collect();
    let n = finite.len();
    if n < 2 {
        return Err(FitError::TooFewSamples(n));
    }

    let nf = n as f64;
    let mean_v = finite.iter().map(|s| s.voltage).sum::<f64>() / nf;
    let mean_x = finite.iter().map(|s| s.displacement).sum::<f64>() / nf;

    let (mut ss_vv, mut ss_xx, mut ss_vx) = (0.0, 0.0, 0.0);
    for s in &finite {
        let dv = s.voltage - mean_v;
        let dx = s.displacement - mean_x;
        ss_vv += dv * dv;
        ss_xx += dx * dx;
        ss_vx += dv * dx;
    }

    if ss_vv == 0.0 {
        return Err(FitError::ZeroVoltageSpan);
    }

    let slope = ss_vx / ss_vv;
    let intercept = mean_x - slope * mean_v;
    let r_value = if ss_xx == 0.0 {
        0.0
    } else {
        (ss_vx / (ss_vv * ss_xx).sqrt()).clamp(-1.0, 1.0)
    };
    let stderr = if n == 2 {
        0.0
    } else {
        ((1.0 - r_value * r_value) * ss_xx / ss_vv / (nf - 2.0)).max(0.0).sqrt()
    };

    Ok(LinearFit {
        slope,
        intercept,
        r_value,
        stderr,
        n,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line(k: f64, b: f64, voltages: &[f64]) -> Vec<Sample> {
        voltages.iter().map(|&v| Sample::new(v, k * v + b)).collect()
    }

    #[test]
    fn exact_line_recovers_slope() {
        let samples = line(0.42, 0.0, &[-3.0, -1.5, 0.0, 0.5, 2.0, 4.0]);
        let fit = linear_fit(&samples).unwrap();
        assert!((fit.slope - 0.42).abs() < 1e-12);
        assert!(fit.intercept.abs() < 1e-12);
        assert!((fit.r_value - 1.0).abs() < 1e-12);
        assert!(fit.stderr < 1e-6);
        assert_eq!(fit.n, 6);
    }

    #[test]
    fn negative_slope_has_negative_r() {
        let samples = line(-0.3, 1.0, &[0.0, 1.0, 2.0, 3.0]);
        let fit = linear_fit(&samples).unwrap();
        assert!((fit.slope + 0.3).abs() < 1e-12);
        assert!((fit.intercept - 1.0).abs() < 1e-12);
        assert!((fit.r_value + 1.0).abs() < 1e-12);
    }

    #[test]
    fn noisy_line_matches_hand_computed_values() {
        // v = 0,1,2,3 ; x = 0,1,1,3 -> slope 0.9, intercept -0.1
        let samples = vec![
            Sample::new(0.0, 0.0),
            Sample::new(1.0, 1.0),
            Sample::new(2.0, 1.0),
            Sample::new(3.0, 3.0),
        ];
        let fit = linear_fit(&samples).unwrap();
        assert!((fit.slope - 0.9).abs() < 1e-12);
        assert!((fit.intercept + 0.1).abs() < 1e-12);
        assert!(fit.r_value > 0.9 && fit.r_value < 1.0);
        assert!(fit.stderr > 0.0);
    }

    #[test]
    fn empty_region_is_not_fitted() {
        assert_eq!(linear_fit(&[]), Err(FitError::Empty));
    }

    #[test]
    fn degenerate_regions_are_not_fitted() {
        assert_eq!(
            linear_fit(&[Sample::new(1.0, 2.0)]),
            Err(FitError::TooFewSamples(1))
        );
        assert_eq!(
            linear_fit(&[Sample::new(1.0, 2.0), Sample::new(f64::NAN, 3.0)]),
            Err(FitError::TooFewSamples(1))
        );
        assert_eq!(
            linear_fit(&[Sample::new(1.0, 2.0), Sample::new(1.0, 3.0)]),
            Err(FitError::ZeroVoltageSpan)
        );
    }

    #[test]
    fn nan_samples_are_skipped() {
        let mut samples = line(2.0, 0.0, &[0.0, 1.0, 2.0]);
        samples.push(Sample::new(3.0, f64::NAN));
        let fit = linear_fit(&samples).unwrap();
        assert!((fit.slope - 2.0).abs() < 1e-12);
        assert_eq!(fit.n, 3);
    }
}
