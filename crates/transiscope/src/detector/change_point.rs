//! Penalized mean-shift segmentation (PELT with an L2 segment cost).

use super::{
    check_fps, DetectContext, DetectError, DetectorOutcome, Event, EventDetector, EventKind,
};
use crate::config::ChangePointParams;
use crate::roi::RoiId;
use crate::trace::Trace;

/// Prefix sums of `x` and `x^2` for O(1) segment costs.
struct SegmentCost {
    sum: Vec<f64>,
    sum_sq: Vec<f64>,
}

impl SegmentCost {
    fn new(x: &[f64]) -> Self {
        let mut sum = Vec::with_capacity(x.len() + 1);
        let mut sum_sq = Vec::with_capacity(x.len() + 1);
        sum.push(0.0);
        sum_sq.push(0.0);
        for &v in x {
            sum.push(sum[sum.len() - 1] + v);
            sum_sq.push(sum_sq[sum_sq.len() - 1] + v * v);
        }
        Self { sum, sum_sq }
    }

    fn mean(&self, start: usize, end: usize) -> f64 {
        (self.sum[end] - self.sum[start]) / (end - start) as f64
    }

    /// Sum of squared deviations from the mean over `[start, end)`.
    fn cost(&self, start: usize, end: usize) -> f64 {
        let n = (end - start) as f64;
        let s = self.sum[end] - self.sum[start];
        let ss = self.sum_sq[end] - self.sum_sq[start];
        (ss - s * s / n).max(0.0)
    }
}

/// Optimal breakpoints `0 = b0 < b1 < ... < bm = n` minimizing
/// `sum(cost(segment)) + penalty * (m - 1)`, every segment at least
/// `min_len` samples long.
pub(crate) fn pelt_breakpoints(x: &[f64], penalty: f64, min_len: usize) -> Vec<usize> {
    let n = x.len();
    let min_len = min_len.max(1);
    if n < 2 * min_len {
        return vec![0, n];
    }

    let cost = SegmentCost::new(x);
    let mut best = vec![f64::INFINITY; n + 1];
    let mut last_break = vec![0usize; n + 1];
    best[0] = -penalty;
    let mut candidates: Vec<usize> = Vec::new();

    for t in min_len..=n {
        candidates.push(t - min_len);

        let mut best_t = f64::INFINITY;
        let mut arg = 0;
        let totals: Vec<f64> = candidates
            .iter()
            .map(|&s| best[s] + cost.cost(s, t) + penalty)
            .collect();
        for (&s, &total) in candidates.iter().zip(&totals) {
            if total < best_t {
                best_t = total;
                arg = s;
            }
        }
        best[t] = best_t;
        last_break[t] = arg;

        // A candidate whose cost without the penalty already exceeds the
        // optimum can never become optimal later.
        candidates = candidates
            .iter()
            .zip(&totals)
            .filter(|&(_, &total)| total - penalty <= best_t)
            .map(|(&s, _)| s)
            .collect();
    }

    let mut breaks = vec![n];
    let mut t = n;
    while t > 0 {
        t = last_break[t];
        breaks.push(t);
    }
    breaks.reverse();
    breaks
}

/// One event per segment whose mean departs from the previous segment's
/// mean by at least `min_level_shift`.
///
/// Segment `[b_i, b_{i+1})` maps to `b_i / fps .. b_{i+1} / fps`.
pub fn detect_change_points(
    trace: &Trace,
    fps: f64,
    roi_id: RoiId,
    params: &ChangePointParams,
) -> Result<Vec<Event>, DetectError> {
    check_fps(fps)?;
    if !params.penalty.is_finite() || params.penalty < 0.0 {
        return Err(DetectError::InvalidPenalty {
            value: params.penalty,
        });
    }

    let x = trace.samples();
    let breaks = pelt_breakpoints(x, params.penalty, params.min_segment_len);
    let cost = SegmentCost::new(x);

    let events: Vec<Event> = breaks
        .windows(3)
        .filter_map(|w| {
            let prev_mean = cost.mean(w[0], w[1]);
            let mean = cost.mean(w[1], w[2]);
            let shift = mean - prev_mean;
            (shift.abs() >= params.min_level_shift).then(|| {
                Event::new(
                    roi_id,
                    EventKind::ChangePoint,
                    Trace::time_at(w[1], fps),
                    Trace::time_at(w[2], fps),
                )
                .with_property("level_shift", shift)
                .with_property("segment_mean", mean)
                .with_property("penalty", params.penalty)
            })
        })
        .collect();

    tracing::debug!(
        roi_id,
        segments = breaks.len().saturating_sub(1),
        events = events.len(),
        "change-point detection"
    );
    Ok(events)
}

/// [`EventDetector`] adapter for [`detect_change_points`].
#[derive(Debug, Clone, Default)]
pub struct ChangePointDetector {
    pub params: ChangePointParams,
}

impl ChangePointDetector {
    pub fn new(params: ChangePointParams) -> Self {
        Self { params }
    }
}

impl EventDetector for ChangePointDetector {
    fn name(&self) -> &str {
        "change_point"
    }

    fn detect(&self, trace: &Trace, ctx: &DetectContext) -> Result<DetectorOutcome, DetectError> {
        detect_change_points(trace, ctx.fps, ctx.roi_id, &self.params).map(DetectorOutcome::Events)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use crate::test_utils::{noisy_trace, step_trace};

    fn params(penalty: f64) -> ChangePointParams {
        ChangePointParams {
            enable: true,
            penalty,
            min_segment_len: 2,
            min_level_shift: 0.0,
        }
    }

    #[test]
    fn step_up_then_down_gives_two_segment_events() {
        let trace = step_trace(&[(0.0, 20), (10.0, 20), (0.0, 20)]);
        let events = detect_change_points(&trace, 10.0, 3, &params(10.0)).unwrap();
        assert_eq!(events.len(), 2);
        assert_abs_diff_eq!(events[0].start_time(), 2.0, epsilon = 1e-12);
        assert_abs_diff_eq!(events[0].end_time(), 4.0, epsilon = 1e-12);
        assert_abs_diff_eq!(events[1].start_time(), 4.0, epsilon = 1e-12);
        assert_abs_diff_eq!(events[1].end_time(), 6.0, epsilon = 1e-12);
        let shift = events[0].property("level_shift").and_then(|p| p.as_f64());
        assert_eq!(shift, Some(10.0));
        let shift = events[1].property("level_shift").and_then(|p| p.as_f64());
        assert_eq!(shift, Some(-10.0));
    }

    #[test]
    fn constant_trace_has_no_breakpoints() {
        let trace = Trace::new(vec![4.0; 50]);
        assert_eq!(pelt_breakpoints(trace.samples(), 1.0, 2), vec![0, 50]);
        assert!(detect_change_points(&trace, 1.0, 1, &params(1.0))
            .unwrap()
            .is_empty());
    }

    #[test]
    fn huge_penalty_suppresses_noise_splits() {
        let trace = noisy_trace(200, 50.0, 1.0, 3);
        let breaks = pelt_breakpoints(trace.samples(), 1e6, 2);
        assert_eq!(breaks, vec![0, 200]);
    }

    #[test]
    fn level_shift_floor_filters_small_steps() {
        let trace = step_trace(&[(0.0, 15), (1.0, 15), (20.0, 15)]);
        let mut p = params(0.5);
        p.min_level_shift = 5.0;
        let events = detect_change_points(&trace, 1.0, 1, &p).unwrap();
        assert_eq!(events.len(), 1);
        assert_abs_diff_eq!(events[0].start_time(), 30.0, epsilon = 1e-12);
    }

    #[test]
    fn segments_respect_min_length() {
        let trace = spike_like();
        let breaks = pelt_breakpoints(&trace, 0.1, 5);
        for w in breaks.windows(2) {
            assert!(w[1] - w[0] >= 5, "{breaks:?}");
        }
    }

    fn spike_like() -> Vec<f64> {
        let mut v = vec![0.0; 40];
        v[20] = 100.0;
        v
    }

    #[test]
    fn negative_penalty_is_rejected() {
        let trace = Trace::new(vec![0.0; 4]);
        assert_eq!(
            detect_change_points(&trace, 1.0, 1, &params(-1.0)).unwrap_err(),
            DetectError::InvalidPenalty { value: -1.0 }
        );
    }
}
