//! Fixed or Otsu-level threshold runs.

use super::{
    check_fps, DetectContext, DetectError, DetectorOutcome, Event, EventDetector, EventKind,
};
use crate::config::{ThresholdLevel, ThresholdParams};
use crate::roi::RoiId;
use crate::trace::Trace;

const OTSU_BINS: usize = 256;

/// Otsu's threshold over the sample values.
///
/// Values are binned into 256 equal bins over `[min, max]`. The returned level
/// is the upper edge of the last background bin, so a sample is foreground
/// iff `sample >= level` (up to floating point at the bin boundary). Returns
/// `None` for an empty, flat or non-finite input.
pub fn otsu_threshold(values: &[f64]) -> Option<f64> {
    if values.is_empty() || values.iter().any(|v| !v.is_finite()) {
        return None;
    }
    let lo = values.iter().copied().fold(f64::INFINITY, f64::min);
    let hi = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    if hi <= lo {
        return None;
    }

    let bin_width = (hi - lo) / OTSU_BINS as f64;
    let mut hist = [0usize; OTSU_BINS];
    for &v in values {
        let bin = (((v - lo) / bin_width) as usize).min(OTSU_BINS - 1);
        hist[bin] += 1;
    }

    let total = values.len() as f64;
    let center = |b: usize| lo + (b as f64 + 0.5) * bin_width;
    let sum_all: f64 = hist
        .iter()
        .enumerate()
        .map(|(b, &c)| c as f64 * center(b))
        .sum();

    let mut best_split = 0;
    let mut best_var = -1.0;
    let mut w_bg = 0.0;
    let mut sum_bg = 0.0;
    for (b, &count) in hist.iter().enumerate().take(OTSU_BINS - 1) {
        w_bg += count as f64;
        sum_bg += count as f64 * center(b);
        let w_fg = total - w_bg;
        if w_bg == 0.0 || w_fg == 0.0 {
            continue;
        }
        let mean_bg = sum_bg / w_bg;
        let mean_fg = (sum_all - sum_bg) / w_fg;
        let between = w_bg * w_fg * (mean_bg - mean_fg) * (mean_bg - mean_fg);
        if between > best_var {
            best_var = between;
            best_split = b;
        }
    }

    Some(lo + (best_split + 1) as f64 * bin_width)
}

/// Maximal runs of consecutive samples `>= level`, as `[first, last]` indices.
fn active_runs(samples: &[f64], level: f64) -> Vec<(usize, usize)> {
    let mut runs = Vec::new();
    let mut start: Option<usize> = None;
    for (i, &v) in samples.iter().enumerate() {
        match (v >= level, start) {
            (true, None) => start = Some(i),
            (false, Some(s)) => {
                runs.push((s, i - 1));
                start = None;
            }
            _ => {}
        }
    }
    if let Some(s) = start {
        runs.push((s, samples.len() - 1));
    }
    runs
}

/// One event per maximal run of samples at or above the threshold level.
///
/// A run `[i, j]` spans `i / fps .. (j + 1) / fps`. A flat trace under the
/// Otsu level yields no events.
pub fn detect_threshold(
    trace: &Trace,
    fps: f64,
    roi_id: RoiId,
    params: &ThresholdParams,
) -> Result<Vec<Event>, DetectError> {
    check_fps(fps)?;
    let (level, method) = match params.level {
        ThresholdLevel::Fixed { value } => {
            if !value.is_finite() {
                return Err(DetectError::NonFiniteThreshold { value });
            }
            (value, "fixed")
        }
        ThresholdLevel::Otsu => match otsu_threshold(trace.samples()) {
            Some(level) => (level, "otsu"),
            None => {
                tracing::debug!(roi_id, "Otsu level undefined for flat trace");
                return Ok(Vec::new());
            }
        },
    };

    let events: Vec<Event> = active_runs(trace.samples(), level)
        .into_iter()
        .map(|(i, j)| {
            Event::new(
                roi_id,
                EventKind::Threshold,
                Trace::time_at(i, fps),
                Trace::time_at(j + 1, fps),
            )
            .with_property("threshold", level)
            .with_property("method", method)
        })
        .collect();

    tracing::debug!(roi_id, level, method, n = events.len(), "threshold detection");
    Ok(events)
}

/// [`EventDetector`] adapter for [`detect_threshold`].
#[derive(Debug, Clone, Default)]
pub struct ThresholdDetector {
    pub params: ThresholdParams,
}

impl ThresholdDetector {
    pub fn new(params: ThresholdParams) -> Self {
        Self { params }
    }
}

impl EventDetector for ThresholdDetector {
    fn name(&self) -> &str {
        "threshold"
    }

    fn detect(&self, trace: &Trace, ctx: &DetectContext) -> Result<DetectorOutcome, DetectError> {
        detect_threshold(trace, ctx.fps, ctx.roi_id, &self.params).map(DetectorOutcome::Events)
    }
}
