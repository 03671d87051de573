use std::path::Path;

/// Level at which the threshold detector binarizes a trace.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case", tag = "mode")]
pub enum ThresholdLevel {
    /// Explicit intensity level.
    Fixed { value: f64 },
    /// Otsu's bimodal-histogram threshold computed over the trace samples.
    Otsu,
}

/// Threshold-run detector settings.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct ThresholdParams {
    pub enable: bool,
    pub level: ThresholdLevel,
}

impl Default for ThresholdParams {
    fn default() -> Self {
        Self {
            enable: true,
            level: ThresholdLevel::Fixed { value: 100.0 },
        }
    }
}

/// Difference-of-Gaussians peak detector settings.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct DogParams {
    pub enable: bool,
    /// Narrow smoothing width, in samples.
    pub sigma1: f64,
    /// Wide smoothing width, in samples. Must exceed `sigma1`.
    pub sigma2: f64,
    /// Minimum peak prominence. `None` or `<= 0` selects the dynamic bound.
    pub min_prominence: Option<f64>,
    /// Dynamic bound is `mean + dynamic_k_sigma * std` of the filtered trace.
    pub dynamic_k_sigma: f64,
}

impl Default for DogParams {
    fn default() -> Self {
        Self {
            enable: true,
            sigma1: 1.0,
            sigma2: 2.0,
            min_prominence: Some(5.0),
            dynamic_k_sigma: 1.5,
        }
    }
}

/// Penalized mean-shift segmentation settings.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct ChangePointParams {
    pub enable: bool,
    /// Cost added per breakpoint; larger values give fewer segments.
    pub penalty: f64,
    /// Minimum segment length in samples (clamped to at least 1).
    pub min_segment_len: usize,
    /// Segments whose mean moves by less than this from the previous one
    /// produce no event.
    pub min_level_shift: f64,
}

impl Default for ChangePointParams {
    fn default() -> Self {
        Self {
            enable: false,
            penalty: 10.0,
            min_segment_len: 2,
            min_level_shift: 0.0,
        }
    }
}

/// Top-level analysis configuration.
///
/// Missing JSON fields fall back to [`Default`], so partial files are valid.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Events of one ROI starting closer than this (seconds) to the last kept
    /// event are dropped.
    pub min_event_separation_s: f64,
    pub threshold: ThresholdParams,
    pub dog: DogParams,
    pub change_point: ChangePointParams,
    /// Process ROIs on the rayon thread pool.
    pub parallel: bool,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            min_event_separation_s: 0.5,
            threshold: ThresholdParams::default(),
            dog: DogParams::default(),
            change_point: ChangePointParams::default(),
            parallel: true,
        }
    }
}

impl AnalysisConfig {
    /// Load a config from a JSON file.
    pub fn from_json_file(path: &Path) -> Result<Self, Box<dyn std::error::Error>> {
        let data = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&data)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_json_fills_defaults() {
        let cfg: AnalysisConfig = serde_json::from_str(
            r#"{ "threshold": { "level": { "mode": "otsu" } }, "dog": { "sigma2": 3.0 } }"#,
        )
        .unwrap();
        assert_eq!(cfg.threshold.level, ThresholdLevel::Otsu);
        assert!(cfg.threshold.enable);
        assert_eq!(cfg.dog.sigma1, 1.0);
        assert_eq!(cfg.dog.sigma2, 3.0);
        assert_eq!(cfg.min_event_separation_s, 0.5);
        assert!(!cfg.change_point.enable);
    }

    #[test]
    fn default_round_trips_through_json() {
        let cfg = AnalysisConfig::default();
        let text = serde_json::to_string(&cfg).unwrap();
        let back: AnalysisConfig = serde_json::from_str(&text).unwrap();
        assert_eq!(back, cfg);
    }
}
