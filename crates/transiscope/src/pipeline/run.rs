//! Pipeline orchestrator: trace -> detectors -> dedup -> rate.

use rayon::prelude::*;

use super::result::{AnalysisReport, DetectorOutcomeSummary, DetectorReport, RoiAnalysis, RoiStatus};
use crate::config::AnalysisConfig;
use crate::detector::{
    dedup_events, ChangePointDetector, DetectContext, DetectorOutcome, DogDetector, Event,
    EventDetector, ThresholdDetector,
};
use crate::rate::normalize_rate;
use crate::roi::{Roi, RoiRegistry};
use crate::stack::{AcquisitionMeta, ImageStack};
use crate::trace::{extract_trace, Trace};

/// Enabled built-in detectors in declaration order.
fn builtin_detectors(config: &AnalysisConfig) -> Vec<Box<dyn EventDetector>> {
    let mut detectors: Vec<Box<dyn EventDetector>> = Vec::new();
    if config.threshold.enable {
        detectors.push(Box::new(ThresholdDetector::new(config.threshold)));
    }
    if config.dog.enable {
        detectors.push(Box::new(DogDetector::new(config.dog)));
    }
    if config.change_point.enable {
        detectors.push(Box::new(ChangePointDetector::new(config.change_point)));
    }
    detectors
}

fn run_detectors(
    trace: &Trace,
    ctx: &DetectContext,
    detectors: &[&dyn EventDetector],
) -> (Vec<Event>, Vec<DetectorReport>) {
    let mut candidates = Vec::new();
    let mut reports = Vec::with_capacity(detectors.len());
    for detector in detectors {
        let name = detector.name().to_owned();
        let outcome = match detector.detect(trace, ctx) {
            Ok(DetectorOutcome::Events(events)) => {
                let n = events.len();
                candidates.extend(events);
                DetectorOutcomeSummary::Events(n)
            }
            Ok(DetectorOutcome::NotImplemented) => {
                tracing::info!(roi_id = ctx.roi_id, detector = %name, "detector not implemented");
                DetectorOutcomeSummary::NotImplemented
            }
            Err(err) => {
                tracing::warn!(roi_id = ctx.roi_id, detector = %name, "detector failed: {}", err);
                DetectorOutcomeSummary::Failed(err.to_string())
            }
        };
        reports.push(DetectorReport { name, outcome });
    }
    (candidates, reports)
}

fn analyze_with(
    roi: &Roi,
    stack: &ImageStack,
    meta: &AcquisitionMeta,
    config: &AnalysisConfig,
    detectors: &[&dyn EventDetector],
) -> RoiAnalysis {
    let roi_id = roi.id();
    let skip = |reason: String| {
        tracing::warn!(roi_id, "skipping ROI: {}", reason);
        RoiAnalysis::skipped(roi_id, roi.area_pixels(), roi.area_sq_um(), reason)
    };

    if !meta.has_valid_fps() {
        return skip(format!("frame rate must be > 0, got {}", meta.fps));
    }
    if !roi.is_contributing() {
        return skip("polygon covers no pixel centers".to_owned());
    }
    let trace = match extract_trace(roi, stack) {
        Ok(trace) => trace,
        Err(err) => return skip(err.to_string()),
    };

    let ctx = DetectContext {
        roi_id,
        fps: meta.fps,
    };
    let (candidates, detector_reports) = run_detectors(&trace, &ctx, detectors);
    let raw_event_count = candidates.len();
    let events = dedup_events(candidates, config.min_event_separation_s);
    tracing::debug!(roi_id, raw = raw_event_count, kept = events.len(), "events deduplicated");

    let duration = stack.observation_duration_s(meta.fps);
    let (rate, standard_error, rate_issue) =
        match normalize_rate(events.len(), duration, roi.area_sq_um()) {
            Ok(r) => (r.rate, r.standard_error, None),
            Err(err) => {
                tracing::warn!(roi_id, "rate set to zero: {}", err);
                (0.0, 0.0, Some(err.to_string()))
            }
        };

    RoiAnalysis {
        roi_id,
        area_pixels: roi.area_pixels(),
        area_sq_um: roi.area_sq_um(),
        status: RoiStatus::Analyzed,
        raw_event_count,
        events,
        rate,
        standard_error,
        rate_issue,
        detector_reports,
    }
}

/// Analyze one ROI.
///
/// Built-in detectors enabled in `config` run first, then `extra` detectors
/// in order. Never fails: problems end up in the returned status and reports.
pub fn analyze_roi(
    roi: &Roi,
    stack: &ImageStack,
    meta: &AcquisitionMeta,
    config: &AnalysisConfig,
    extra: &[Box<dyn EventDetector>],
) -> RoiAnalysis {
    let builtin = builtin_detectors(config);
    let detectors: Vec<&dyn EventDetector> =
        builtin.iter().chain(extra.iter()).map(|d| d.as_ref()).collect();
    analyze_with(roi, stack, meta, config, &detectors)
}

/// Analyze every ROI of `registry`.
///
/// ROIs are independent and share the stack read-only; with
/// `config.parallel` they run on the rayon pool. Results keep registry order.
pub fn analyze_all(
    registry: &RoiRegistry,
    stack: &ImageStack,
    meta: &AcquisitionMeta,
    config: &AnalysisConfig,
    extra: &[Box<dyn EventDetector>],
) -> AnalysisReport {
    let builtin = builtin_detectors(config);
    let detectors: Vec<&dyn EventDetector> =
        builtin.iter().chain(extra.iter()).map(|d| d.as_ref()).collect();

    let rois = registry.enumerate_all();
    tracing::info!(
        n_rois = rois.len(),
        n_frames = stack.n_frames(),
        n_detectors = detectors.len(),
        parallel = config.parallel,
        "analysis started"
    );

    let results: Vec<RoiAnalysis> = if config.parallel {
        rois.par_iter()
            .map(|roi| analyze_with(roi, stack, meta, config, &detectors))
            .collect()
    } else {
        rois.iter()
            .map(|roi| analyze_with(roi, stack, meta, config, &detectors))
            .collect()
    };

    let report = AnalysisReport {
        n_frames: stack.n_frames(),
        fps: meta.fps,
        observation_duration_s: if meta.has_valid_fps() {
            stack.observation_duration_s(meta.fps)
        } else {
            0.0
        },
        rois: results,
    };
    tracing::info!(
        analyzed = report.n_analyzed(),
        skipped = report.rois.len() - report.n_analyzed(),
        events = report.events().len(),
        "analysis finished"
    );
    report
}
