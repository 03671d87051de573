use crate::detector::Event;
use crate::roi::RoiId;

/// Whether an ROI went through detection.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
#[serde(rename_all = "snake_case", tag = "state")]
pub enum RoiStatus {
    Analyzed,
    Skipped { reason: String },
}

/// What one detector returned for one ROI.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DetectorOutcomeSummary {
    /// Number of candidate events before dedup.
    Events(usize),
    NotImplemented,
    Failed(String),
}

#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct DetectorReport {
    pub name: String,
    pub outcome: DetectorOutcomeSummary,
}

/// Full per-ROI result.
#[derive(Debug, Clone, serde::Serialize)]
pub struct RoiAnalysis {
    pub roi_id: RoiId,
    pub area_pixels: usize,
    pub area_sq_um: Option<f64>,
    pub status: RoiStatus,
    /// Candidate events across all detectors, before dedup.
    pub raw_event_count: usize,
    /// Accepted events, ascending start time.
    pub events: Vec<Event>,
    /// Events per second per µm². Zero when it could not be normalized.
    pub rate: f64,
    pub standard_error: f64,
    /// Why `rate` was forced to zero, if it was.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rate_issue: Option<String>,
    pub detector_reports: Vec<DetectorReport>,
}

impl RoiAnalysis {
    pub(crate) fn skipped(
        roi_id: RoiId,
        area_pixels: usize,
        area_sq_um: Option<f64>,
        reason: String,
    ) -> Self {
        Self {
            roi_id,
            area_pixels,
            area_sq_um,
            status: RoiStatus::Skipped { reason },
            raw_event_count: 0,
            events: Vec::new(),
            rate: 0.0,
            standard_error: 0.0,
            rate_issue: None,
            detector_reports: Vec::new(),
        }
    }

    pub fn is_analyzed(&self) -> bool {
        self.status == RoiStatus::Analyzed
    }
}

/// One row of the per-ROI rate summary.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize)]
pub struct RoiSummary {
    pub roi_id: RoiId,
    pub event_count: usize,
    pub rate: f64,
    pub standard_error: f64,
}

/// Result of analyzing every ROI of a registry against one stack.
#[derive(Debug, Clone, serde::Serialize)]
pub struct AnalysisReport {
    pub n_frames: usize,
    pub fps: f64,
    pub observation_duration_s: f64,
    /// Per-ROI results in registry enumeration order.
    pub rois: Vec<RoiAnalysis>,
}

impl AnalysisReport {
    /// All accepted events across ROIs, grouped by ROI in enumeration order.
    pub fn events(&self) -> Vec<&Event> {
        self.rois.iter().flat_map(|r| r.events.iter()).collect()
    }

    /// `(roi_id, event_count, rate, standard_error)` rows sorted by ROI id.
    pub fn summary(&self) -> Vec<RoiSummary> {
        let mut rows: Vec<RoiSummary> = self
            .rois
            .iter()
            .map(|r| RoiSummary {
                roi_id: r.roi_id,
                event_count: r.events.len(),
                rate: r.rate,
                standard_error: r.standard_error,
            })
            .collect();
        rows.sort_by_key(|r| r.roi_id);
        rows
    }

    pub fn get(&self, roi_id: RoiId) -> Option<&RoiAnalysis> {
        self.rois.iter().find(|r| r.roi_id == roi_id)
    }

    pub fn n_analyzed(&self) -> usize {
        self.rois.iter().filter(|r| r.is_analyzed()).count()
    }
}
