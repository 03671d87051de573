//! 1-D signal helpers shared by the detectors.

mod gaussian;
mod peaks;

pub(crate) use gaussian::{gaussian_kernel, gaussian_smooth};
pub(crate) use peaks::{local_maxima, peak_prominences};

/// Mean and population standard deviation. Returns `(0, 0)` for an empty slice.
pub(crate) fn mean_std(values: &[f64]) -> (f64, f64) {
    if values.is_empty() {
        return (0.0, 0.0);
    }
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let var = values.iter().map(|v| (v - mean) * (v - mean)).sum::<f64>() / n;
    (mean, var.sqrt())
}
