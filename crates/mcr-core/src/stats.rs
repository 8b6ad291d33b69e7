//! Small-sample statistics used by the weight generator and the decision
//! procedure.

/// Arithmetic mean, or `None` for an empty slice.
pub fn mean(samples: &[f64]) -> Option<f64> {
    if samples.is_empty() {
        return None;
    }
    Some(samples.iter().sum::<f64>() / samples.len() as f64)
}

/// Bessel-corrected (n − 1) standard deviation, or `None` with fewer than
/// two samples.
pub fn sample_std_dev(samples: &[f64]) -> Option<f64> {
    if samples.len() < 2 {
        return None;
    }
    let m = mean(samples)?;
    let ss: f64 = samples.iter().map(|s| (s - m).powi(2)).sum();
    Some((ss / (samples.len() - 1) as f64).sqrt())
}

/// `mean + k·stdev`, or `None` with fewer than two samples.
pub fn sigma_threshold(samples: &[f64], k: f64) -> Option<f64> {
    Some(mean(samples)? + k * sample_std_dev(samples)?)
}
