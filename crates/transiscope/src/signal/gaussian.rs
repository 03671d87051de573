//! Discrete Gaussian smoothing with mirror-reflect boundaries.

/// Kernel half-width in units of sigma.
const TRUNCATE_SIGMAS: f64 = 4.0;

/// Normalized, symmetric Gaussian kernel of length `2 * radius + 1`.
///
/// `radius = round(4 * sigma)`. A non-positive sigma yields the identity kernel `[1.0]`.
pub(crate) fn gaussian_kernel(sigma: f64) -> Vec<f64> {
    if !sigma.is_finite() || sigma <= 0.0 {
        return vec![1.0];
    }
    let radius = (TRUNCATE_SIGMAS * sigma + 0.5) as usize;
    let inv_two_var = 0.5 / (sigma * sigma);
    let mut kernel: Vec<f64> = (0..=2 * radius)
        .map(|i| {
            let x = i as f64 - radius as f64;
            (-x * x * inv_two_var).exp()
        })
        .collect();
    let sum: f64 = kernel.iter().sum();
    for w in &mut kernel {
        *w /= sum;
    }
    kernel
}

/// Map any index onto `[0, n)` by half-sample symmetric reflection
/// (`d c b a | a b c d | d c b a`).
#[inline]
fn reflect_index(i: isize, n: usize) -> usize {
    let n = n as isize;
    let period = 2 * n;
    let mut m = i.rem_euclid(period);
    if m >= n {
        m = period - 1 - m;
    }
    m as usize
}

/// Convolve `values` with a Gaussian of width `sigma` (in samples).
pub(crate) fn gaussian_smooth(values: &[f64], sigma: f64) -> Vec<f64> {
    let n = values.len();
    if n == 0 {
        return Vec::new();
    }
    let kernel = gaussian_kernel(sigma);
    let radius = (kernel.len() / 2) as isize;

    (0..n as isize)
        .map(|i| {
            kernel
                .iter()
                .enumerate()
                .map(|(k, &w)| w * values[reflect_index(i + k as isize - radius, n)])
                .sum()
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn kernel_is_normalized_and_symmetric() {
        let k = gaussian_kernel(2.0);
        assert_eq!(k.len(), 17);
        assert_abs_diff_eq!(k.iter().sum::<f64>(), 1.0, epsilon = 1e-12);
        for i in 0..k.len() / 2 {
            assert_abs_diff_eq!(k[i], k[k.len() - 1 - i], epsilon = 1e-15);
        }
        assert_eq!(gaussian_kernel(0.0), vec![1.0]);
    }

    #[test]
    fn reflect_index_mirrors_both_ends() {
        let n = 4;
        let mapped: Vec<usize> = (-5..9).map(|i| reflect_index(i, n)).collect();
        assert_eq!(mapped, vec![3, 3, 2, 1, 0, 0, 1, 2, 3, 3, 2, 1, 0, 0]);
    }

    #[test]
    fn constant_signal_is_unchanged() {
        let v = vec![3.5; 12];
        for s in gaussian_smooth(&v, 1.7) {
            assert_abs_diff_eq!(s, 3.5, epsilon = 1e-12);
        }
    }

    #[test]
    fn smoothing_preserves_impulse_mass_away_from_edges() {
        let mut v = vec![0.0; 41];
        v[20] = 1.0;
        let s = gaussian_smooth(&v, 1.5);
        assert_abs_diff_eq!(s.iter().sum::<f64>(), 1.0, epsilon = 1e-12);
        let peak = s
            .iter()
            .enumerate()
            .max_by(|a, b| a.1.total_cmp(b.1))
            .map(|(i, _)| i);
        assert_eq!(peak, Some(20));
    }
}
