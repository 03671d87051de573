//! Event detectors over a single ROI trace, plus cross-detector dedup.
//!
//! Every detector is a pure function of `(trace, fps, roi_id, params)`. The
//! [`EventDetector`] trait wraps them behind one seam so the pipeline can run
//! built-in and caller-supplied detectors uniformly.

mod change_point;
mod dedup;
mod dog;
mod event;
mod threshold;

pub use change_point::{detect_change_points, ChangePointDetector};
pub use dedup::dedup_events;
pub use dog::{detect_dog, DogDetector};
pub use event::{Event, EventKind, PropertyValue};
pub use threshold::{detect_threshold, otsu_threshold, ThresholdDetector};

use crate::roi::RoiId;
use crate::trace::Trace;

/// Invalid detector input. Reported per detector; other detectors still run.
#[derive(Debug, Clone, PartialEq)]
pub enum DetectError {
    /// Frame rate is zero, negative or not finite.
    InvalidFps { fps: f64 },
    /// DoG widths must satisfy `0 < sigma1 < sigma2`.
    InvalidSigma { sigma1: f64, sigma2: f64 },
    /// An explicit threshold level is NaN or infinite.
    NonFiniteThreshold { value: f64 },
    /// Change-point penalty is negative or not finite.
    InvalidPenalty { value: f64 },
}

impl std::fmt::Display for DetectError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidFps { fps } => write!(f, "frame rate must be > 0, got {}", fps),
            Self::InvalidSigma { sigma1, sigma2 } => write!(
                f,
                "DoG widths must satisfy 0 < sigma1 < sigma2, got sigma1={} sigma2={}",
                sigma1, sigma2
            ),
            Self::NonFiniteThreshold { value } => {
                write!(f, "threshold must be finite, got {}", value)
            }
            Self::InvalidPenalty { value } => {
                write!(f, "penalty must be finite and >= 0, got {}", value)
            }
        }
    }
}

impl std::error::Error for DetectError {}

pub(crate) fn check_fps(fps: f64) -> Result<(), DetectError> {
    if fps.is_finite() && fps > 0.0 {
        Ok(())
    } else {
        Err(DetectError::InvalidFps { fps })
    }
}

/// Per-call context handed to every detector.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DetectContext {
    pub roi_id: RoiId,
    pub fps: f64,
}

/// Result of running one detector.
///
/// `NotImplemented` is distinct from an empty `Events` list: a placeholder
/// detector did not look at the data at all.
#[derive(Debug, Clone, PartialEq)]
pub enum DetectorOutcome {
    Events(Vec<Event>),
    NotImplemented,
}

impl DetectorOutcome {
    pub fn is_implemented(&self) -> bool {
        matches!(self, Self::Events(_))
    }

    /// Events found, or an empty slice for `NotImplemented`.
    pub fn events(&self) -> &[Event] {
        match self {
            Self::Events(events) => events,
            Self::NotImplemented => &[],
        }
    }

    pub fn into_events(self) -> Vec<Event> {
        match self {
            Self::Events(events) => events,
            Self::NotImplemented => Vec::new(),
        }
    }
}

/// A stateless algorithm turning a trace into candidate events.
pub trait EventDetector: Send + Sync {
    /// Short label used in reports and logs.
    fn name(&self) -> &str;

    fn detect(&self, trace: &Trace, ctx: &DetectContext) -> Result<DetectorOutcome, DetectError>;
}
