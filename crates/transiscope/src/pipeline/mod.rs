//! Per-ROI analysis pipeline.
//!
//! trace extraction -> detectors -> dedup -> rate normalization.
//!
//! Algorithmic stages live in `crate::trace`, `crate::detector` and
//! `crate::rate`; this layer only wires them together, turns per-ROI failures
//! into skip records, and fans ROIs out over rayon.

mod result;
mod run;

pub use result::{
    AnalysisReport, DetectorOutcomeSummary, DetectorReport, RoiAnalysis, RoiStatus, RoiSummary,
};
pub use run::{analyze_all, analyze_roi};
