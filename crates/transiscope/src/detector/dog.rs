//! Difference-of-Gaussians band-pass peak detector.

use super::{
    check_fps, DetectContext, DetectError, DetectorOutcome, Event, EventDetector, EventKind,
};
use crate::config::DogParams;
use crate::roi::RoiId;
use crate::signal::{gaussian_kernel, gaussian_smooth, local_maxima, mean_std, peak_prominences};
use crate::trace::Trace;

fn check_sigmas(sigma1: f64, sigma2: f64) -> Result<(), DetectError> {
    let ok = sigma1.is_finite() && sigma2.is_finite() && sigma1 > 0.0 && sigma1 < sigma2;
    if ok {
        Ok(())
    } else {
        Err(DetectError::InvalidSigma { sigma1, sigma2 })
    }
}

/// Peak response of the DoG filter to a unit impulse.
///
/// Dividing by it makes an isolated one-sample spike of amplitude `A` come
/// out of the filter with height `A`.
fn impulse_gain(sigma1: f64, sigma2: f64) -> f64 {
    let k1 = gaussian_kernel(sigma1);
    let k2 = gaussian_kernel(sigma2);
    let gain = k1[k1.len() / 2] - k2[k2.len() / 2];
    if gain > 0.0 {
        gain
    } else {
        1.0
    }
}

/// Band-pass `samples`: `(smooth(sigma1) - smooth(sigma2)) / impulse_gain`.
pub(crate) fn dog_filter(samples: &[f64], sigma1: f64, sigma2: f64) -> Vec<f64> {
    let narrow = gaussian_smooth(samples, sigma1);
    let wide = gaussian_smooth(samples, sigma2);
    let inv_gain = 1.0 / impulse_gain(sigma1, sigma2);
    narrow
        .iter()
        .zip(&wide)
        .map(|(a, b)| (a - b) * inv_gain)
        .collect()
}

/// One instantaneous event per sufficiently prominent peak of the DoG response.
///
/// Each event carries the peak `prominence`, the filtered `amplitude` and
/// `base_width_s`, the time between the two bases the prominence was
/// measured against.
///
/// With `min_prominence` unset or `<= 0`, peaks are accepted when their
/// prominence reaches `mean + dynamic_k_sigma * std` of the filtered trace.
pub fn detect_dog(
    trace: &Trace,
    fps: f64,
    roi_id: RoiId,
    params: &DogParams,
) -> Result<Vec<Event>, DetectError> {
    check_fps(fps)?;
    check_sigmas(params.sigma1, params.sigma2)?;
    if trace.len() < 3 {
        return Ok(Vec::new());
    }

    let filtered = dog_filter(trace.samples(), params.sigma1, params.sigma2);
    let bound = match params.min_prominence {
        Some(p) if p > 0.0 => p,
        _ => {
            let (mean, std) = mean_std(&filtered);
            let dynamic = mean + params.dynamic_k_sigma * std;
            tracing::debug!(roi_id, bound = dynamic, "DoG dynamic prominence bound");
            dynamic
        }
    };

    let peaks = local_maxima(&filtered);
    let prominences = peak_prominences(&filtered, &peaks);
    let events: Vec<Event> = peaks
        .iter()
        .zip(&prominences)
        .filter(|(_, p)| p.value >= bound)
        .map(|(&k, p)| {
            let t = Trace::time_at(k, fps);
            Event::new(roi_id, EventKind::DoG, t, t)
                .with_property("prominence", p.value)
                .with_property("amplitude", filtered[k])
                .with_property("base_width_s", (p.right_base - p.left_base) as f64 / fps)
        })
        .collect();

    tracing::debug!(
        roi_id,
        candidates = peaks.len(),
        accepted = events.len(),
        "DoG detection"
    );
    Ok(events)
}

/// [`EventDetector`] adapter for [`detect_dog`].
#[derive(Debug, Clone, Default)]
pub struct DogDetector {
    pub params: DogParams,
}

impl DogDetector {
    pub fn new(params: DogParams) -> Self {
        Self { params }
    }
}

impl EventDetector for DogDetector {
    fn name(&self) -> &str {
        "dog"
    }

    fn detect(&self, trace: &Trace, ctx: &DetectContext) -> Result<DetectorOutcome, DetectError> {
        detect_dog(trace, ctx.fps, ctx.roi_id, &self.params).map(DetectorOutcome::Events)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::{abs_diff_eq, assert_abs_diff_eq};
    use crate::test_utils::{noisy_trace, spike_trace};

    fn params(min_prominence: Option<f64>) -> DogParams {
        DogParams {
            enable: true,
            sigma1: 1.0,
            sigma2: 2.0,
            min_prominence,
            dynamic_k_sigma: 1.5,
        }
    }

    #[test]
    fn isolated_spike_gives_one_instantaneous_event() {
        let amplitude = 40.0;
        let fps = 25.0;
        let trace = spike_trace(100, &[50], amplitude, 0.0);
        let events = detect_dog(&trace, fps, 7, &params(Some(amplitude / 2.0))).unwrap();
        assert_eq!(events.len(), 1);
        let e = &events[0];
        assert_eq!(e.event_type(), EventKind::DoG);
        assert_abs_diff_eq!(e.start_time(), 50.0 / fps, epsilon = 1e-12);
        assert_eq!(e.start_time(), e.end_time());
        assert_eq!(e.duration(), 0.0);
        let amp = e.property("amplitude").and_then(|p| p.as_f64()).unwrap();
        assert_abs_diff_eq!(amp, amplitude, epsilon = 1e-9);
    }

    #[test]
    fn offset_does_not_change_detection() {
        let p = params(Some(5.0));
        let a = detect_dog(&spike_trace(80, &[40], 10.0, 0.0), 10.0, 1, &p).unwrap();
        let b = detect_dog(&spike_trace(80, &[40], 10.0, 500.0), 10.0, 1, &p).unwrap();
        assert_eq!(a.len(), 1);
        assert_eq!(a[0].start_time(), b[0].start_time());
    }

    #[test]
    fn dynamic_bound_keeps_spikes_over_noise() {
        let mut trace = noisy_trace(300, 100.0, 1.0, 11).samples().to_vec();
        for &k in &[60usize, 150, 240] {
            trace[k] += 30.0;
        }
        let events = detect_dog(&Trace::new(trace), 10.0, 1, &params(None)).unwrap();
        let times: Vec<f64> = events.iter().map(|e| e.start_time()).collect();
        for t in [6.0, 15.0, 24.0] {
            assert!(
                times.iter().any(|&x| abs_diff_eq!(x, t, epsilon = 1e-9)),
                "missing {t} in {times:?}"
            );
        }
    }

    #[test]
    fn zero_prominence_selects_dynamic_bound() {
        let trace = spike_trace(60, &[30], 20.0, 0.0);
        let explicit_zero = detect_dog(&trace, 1.0, 1, &params(Some(0.0))).unwrap();
        let unset = detect_dog(&trace, 1.0, 1, &params(None)).unwrap();
        assert_eq!(explicit_zero, unset);
    }

    #[test]
    fn invalid_sigmas_are_rejected() {
        let trace = spike_trace(20, &[10], 1.0, 0.0);
        let mut p = params(None);
        p.sigma1 = 3.0;
        assert_eq!(
            detect_dog(&trace, 1.0, 1, &p).unwrap_err(),
            DetectError::InvalidSigma {
                sigma1: 3.0,
                sigma2: 2.0
            }
        );
    }

    #[test]
    fn filter_is_zero_on_constant_signal() {
        for v in dog_filter(&[7.0; 30], 1.0, 2.5) {
            assert_abs_diff_eq!(v, 0.0, epsilon = 1e-9);
        }
    }
}
