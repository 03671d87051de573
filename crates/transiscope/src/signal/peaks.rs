//! Local maxima and topographic prominence on 1-D signals.

/// Prominence of one peak together with the bases it was measured against.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct Prominence {
    pub value: f64,
    pub left_base: usize,
    pub right_base: usize,
}

/// Indices of strict local maxima.
///
/// Flat tops are reported once, at the middle sample (rounded down). Peaks
/// touching either end of the signal are not reported.
pub(crate) fn local_maxima(x: &[f64]) -> Vec<usize> {
    let mut peaks = Vec::new();
    if x.len() < 3 {
        return peaks;
    }
    let i_max = x.len() - 1;
    let mut i = 1;
    while i < i_max {
        if x[i - 1] < x[i] {
            let mut ahead = i + 1;
            while ahead < i_max && x[ahead] == x[i] {
                ahead += 1;
            }
            if x[ahead] < x[i] {
                peaks.push((i + ahead - 1) / 2);
                i = ahead;
                continue;
            }
        }
        i += 1;
    }
    peaks
}

/// Prominence of each peak in `peaks` (indices into `x`).
///
/// From the peak, walk each way until a strictly higher sample or the signal
/// end; the lowest sample seen on that side is its base. Prominence is the
/// peak height above the higher of the two bases.
pub(crate) fn peak_prominences(x: &[f64], peaks: &[usize]) -> Vec<Prominence> {
    peaks
        .iter()
        .map(|&peak| {
            let height = x[peak];

            let mut left_base = peak;
            let mut left_min = height;
            let mut i = peak;
            loop {
                if x[i] > height {
                    break;
                }
                if x[i] < left_min {
                    left_min = x[i];
                    left_base = i;
                }
                if i == 0 {
                    break;
                }
                i -= 1;
            }

            let mut right_base = peak;
            let mut right_min = height;
            for (j, &v) in x.iter().enumerate().skip(peak) {
                if v > height {
                    break;
                }
                if v < right_min {
                    right_min = v;
                    right_base = j;
                }
            }

            Prominence {
                value: height - left_min.max(right_min),
                left_base,
                right_base,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn finds_strict_and_flat_maxima() {
        let x = [0.0, 2.0, 1.0, 3.0, 3.0, 3.0, 0.0, 1.0];
        assert_eq!(local_maxima(&x), vec![1, 4]);
    }

    #[test]
    fn edge_plateaus_are_not_peaks() {
        assert!(local_maxima(&[5.0, 5.0, 1.0, 0.0]).is_empty());
        assert!(local_maxima(&[0.0, 1.0, 2.0, 2.0]).is_empty());
        assert!(local_maxima(&[1.0, 2.0]).is_empty());
    }

    #[test]
    fn prominence_uses_higher_base() {
        //            0    1    2    3    4    5    6
        let x = [1.0, 5.0, 2.0, 4.0, 0.0, 6.0, 3.0];
        let peaks = local_maxima(&x);
        assert_eq!(peaks, vec![1, 3, 5]);
        let p = peak_prominences(&x, &peaks);
        // Peak 1: left min 1.0 (boundary side), right walk stops at 6.0, min 0.0.
        assert_abs_diff_eq!(p[0].value, 4.0, epsilon = 1e-12);
        assert_eq!(p[0].left_base, 0);
        assert_eq!(p[0].right_base, 4);
        // Peak 3: left stops at 5.0 with min 2.0, right stops at 6.0 with min 0.0.
        assert_abs_diff_eq!(p[1].value, 2.0, epsilon = 1e-12);
        // Peak 5 is the global maximum: bases are the global minima on each side.
        assert_abs_diff_eq!(p[2].value, 3.0, epsilon = 1e-12);
        assert_eq!(p[2].right_base, 6);
    }
}
