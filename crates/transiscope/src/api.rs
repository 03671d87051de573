//! High-level analysis API.
//!
//! [`Analyzer`] is the primary entry point. It owns an [`AnalysisConfig`] and
//! any caller-supplied detectors, and runs them over a registry of ROIs.

use std::path::Path;

use crate::config::AnalysisConfig;
use crate::detector::EventDetector;
use crate::pipeline::{self, AnalysisReport, RoiAnalysis};
use crate::roi::{Roi, RoiError, RoiRegistry};
use crate::stack::{AcquisitionMeta, ImageStack};

/// Primary analysis interface.
///
/// Create once, analyze many stacks.
///
/// # Examples
///
/// ```no_run
/// use transiscope::{AcquisitionMeta, Analyzer, ImageStack};
///
/// let stack = ImageStack::new(100, 64, 64, vec![0.0; 100 * 64 * 64]).unwrap();
/// let meta = AcquisitionMeta::new(20.0);
/// let analyzer = Analyzer::new();
/// let mut rois = analyzer.registry_for(&stack, &meta).unwrap();
/// rois.add(&[[10.0, 10.0], [10.0, 30.0], [30.0, 30.0], [30.0, 10.0]]).unwrap();
/// let report = analyzer.analyze(&rois, &stack, &meta);
/// for row in report.summary() {
///     println!("ROI {}: {:.4} ± {:.4}", row.roi_id, row.rate, row.standard_error);
/// }
/// ```
#[derive(Default)]
pub struct Analyzer {
    config: AnalysisConfig,
    extra_detectors: Vec<Box<dyn EventDetector>>,
}

impl Analyzer {
    /// Analyzer with [`AnalysisConfig::default`].
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: AnalysisConfig) -> Self {
        Self {
            config,
            extra_detectors: Vec::new(),
        }
    }

    /// Load config JSON and create an analyzer in one step.
    pub fn from_config_json_file(path: &Path) -> Result<Self, Box<dyn std::error::Error>> {
        Ok(Self::with_config(AnalysisConfig::from_json_file(path)?))
    }

    /// Register an additional detector. Runs after the built-in ones.
    pub fn with_detector(mut self, detector: Box<dyn EventDetector>) -> Self {
        self.extra_detectors.push(detector);
        self
    }

    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    pub fn config_mut(&mut self) -> &mut AnalysisConfig {
        &mut self.config
    }

    /// Names of all detectors that will run, in order.
    pub fn detector_names(&self) -> Vec<String> {
        let mut names = Vec::new();
        if self.config.threshold.enable {
            names.push("threshold".to_owned());
        }
        if self.config.dog.enable {
            names.push("dog".to_owned());
        }
        if self.config.change_point.enable {
            names.push("change_point".to_owned());
        }
        names.extend(self.extra_detectors.iter().map(|d| d.name().to_owned()));
        names
    }

    /// Empty registry sized for `stack` frames, with the acquisition pixel size.
    pub fn registry_for(
        &self,
        stack: &ImageStack,
        meta: &AcquisitionMeta,
    ) -> Result<RoiRegistry, RoiError> {
        RoiRegistry::with_pixel_size(stack.frame_shape(), meta.pixel_size_um)
    }

    /// Analyze every ROI in `registry`.
    pub fn analyze(
        &self,
        registry: &RoiRegistry,
        stack: &ImageStack,
        meta: &AcquisitionMeta,
    ) -> AnalysisReport {
        pipeline::analyze_all(registry, stack, meta, &self.config, &self.extra_detectors)
    }

    /// Analyze a single ROI.
    pub fn analyze_roi(
        &self,
        roi: &Roi,
        stack: &ImageStack,
        meta: &AcquisitionMeta,
    ) -> RoiAnalysis {
        pipeline::analyze_roi(roi, stack, meta, &self.config, &self.extra_detectors)
    }
}
