//! Event detection in ROI intensity traces from time-lapse microscopy.
//!
//! The per-ROI pipeline stages are:
//!
//! 1. **ROI** – polygon rasterization into a pixel mask (even-odd rule on
//!    pixel centers), pixel and physical area.
//! 2. **Trace** – per-frame mean intensity over the ROI mask.
//! 3. **Detect** – independent detectors over the same trace: threshold runs
//!    (fixed or Otsu level), difference-of-Gaussians peaks, penalized
//!    change-point segmentation.
//! 4. **Dedup** – greedy suppression of events closer than a minimum separation.
//! 5. **Rate** – event count normalized by observation time and ROI area, with
//!    a Poisson standard error.
//!
//! ROIs are independent; [`analyze_all`] runs them in parallel over a shared,
//! immutable [`ImageStack`].
//!
//! # Public API
//! - [`Analyzer`] as the primary entry point
//! - [`RoiRegistry`] / [`Roi`] for region bookkeeping
//! - [`AnalysisConfig`] for tuning
//! - [`EventDetector`] for plugging in additional detectors
//!
//! No file formats or UI state live here: callers hand in finalized vertex
//! lists and decoded frames.

mod api;
mod config;
mod detector;
mod pipeline;
mod rate;
mod roi;
mod signal;
mod stack;
mod trace;

#[cfg(test)]
pub(crate) mod test_utils;

pub use api::Analyzer;
pub use config::{
    AnalysisConfig, ChangePointParams, DogParams, ThresholdLevel, ThresholdParams,
};
pub use detector::{
    dedup_events, detect_change_points, detect_dog, detect_threshold, otsu_threshold,
    ChangePointDetector, DetectContext, DetectError, DetectorOutcome, DogDetector, Event,
    EventDetector, EventKind, PropertyValue, ThresholdDetector,
};
pub use pipeline::{
    analyze_all, analyze_roi, AnalysisReport, DetectorOutcomeSummary, DetectorReport,
    RoiAnalysis, RoiStatus, RoiSummary,
};
pub use rate::{normalize_rate, RateError, RateEstimate};
pub use roi::{Roi, RoiError, RoiId, RoiMask, RoiRegistry, Vertex};
pub use stack::{AcquisitionMeta, ImageStack, StackError, DEFAULT_PIXEL_SIZE_UM};
pub use trace::{extract_trace, Trace, TraceError};
