//! Per-frame mean intensity over an ROI mask.

use crate::roi::{Roi, RoiId};
use crate::stack::ImageStack;

/// Reasons a trace cannot be extracted for one ROI.
///
/// These are per-ROI skip conditions; callers report them and move on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TraceError {
    /// The mask has no member pixels, so there is nothing to average.
    EmptyMask {
        /// ROI that produced the empty mask.
        roi_id: RoiId,
    },
    /// Mask shape differs from the stack's per-frame shape.
    ShapeMismatch {
        /// ROI whose mask was built for another image size.
        roi_id: RoiId,
        /// Mask `[height, width]`.
        mask: [usize; 2],
        /// Stack frame `[height, width]`.
        frame: [usize; 2],
    },
}

impl std::fmt::Display for TraceError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyMask { roi_id } => write!(f, "ROI {} has an empty mask", roi_id),
            Self::ShapeMismatch {
                roi_id,
                mask,
                frame,
            } => write!(
                f,
                "ROI {} mask is {}x{} but frames are {}x{}",
                roi_id, mask[0], mask[1], frame[0], frame[1]
            ),
        }
    }
}

impl std::error::Error for TraceError {}

/// Mean intensity per frame; sample `i` is taken at `i / fps` seconds.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Trace {
    samples: Vec<f64>,
}

impl Trace {
    pub fn new(samples: Vec<f64>) -> Self {
        Self { samples }
    }

    pub fn samples(&self) -> &[f64] {
        &self.samples
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Timestamp of sample `index` in seconds.
    pub fn time_at(index: usize, fps: f64) -> f64 {
        index as f64 / fps
    }
}

impl From<Vec<f64>> for Trace {
    fn from(samples: Vec<f64>) -> Self {
        Self::new(samples)
    }
}

/// Average `stack` over the member pixels of `roi.mask()`, frame by frame.
pub fn extract_trace(roi: &Roi, stack: &ImageStack) -> Result<Trace, TraceError> {
    let mask = roi.mask();
    if mask.shape() != stack.frame_shape() {
        return Err(TraceError::ShapeMismatch {
            roi_id: roi.id(),
            mask: mask.shape(),
            frame: stack.frame_shape(),
        });
    }

    let members: Vec<usize> = mask.member_indices().collect();
    if members.is_empty() {
        return Err(TraceError::EmptyMask { roi_id: roi.id() });
    }

    let inv_n = 1.0 / members.len() as f64;
    let samples = stack
        .frames()
        .map(|frame| members.iter().map(|&i| frame[i] as f64).sum::<f64>() * inv_n)
        .collect();

    tracing::trace!(roi_id = roi.id(), n_pixels = members.len(), "trace extracted");
    Ok(Trace::new(samples))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use crate::test_utils::{ramp_stack, square_roi};

    #[test]
    fn trace_is_mean_over_mask_per_frame() {
        // Pixel value = frame * 100 + row * width + col.
        let stack = ramp_stack(3, 6, 6);
        let roi = square_roi(1, [1.0, 1.0], 2.0, [6, 6]);
        // Members: rows 1..3, cols 1..3 -> flat indices 7, 8, 13, 14.
        let trace = extract_trace(&roi, &stack).unwrap();
        assert_eq!(trace.len(), 3);
        let base = (7.0 + 8.0 + 13.0 + 14.0) / 4.0;
        for (f, &v) in trace.samples().iter().enumerate() {
            assert_abs_diff_eq!(v, base + 100.0 * f as f64, epsilon = 1e-9);
        }
    }

    #[test]
    fn empty_mask_is_reported() {
        let stack = ramp_stack(2, 4, 4);
        let roi = Roi::new(5, vec![[1.0, 1.0], [2.0, 2.0], [3.0, 3.0]], [4, 4]);
        assert_eq!(
            extract_trace(&roi, &stack).unwrap_err(),
            TraceError::EmptyMask { roi_id: 5 }
        );
    }

    #[test]
    fn shape_mismatch_is_reported() {
        let stack = ramp_stack(2, 4, 4);
        let roi = square_roi(2, [0.0, 0.0], 2.0, [8, 8]);
        assert_eq!(
            extract_trace(&roi, &stack).unwrap_err(),
            TraceError::ShapeMismatch {
                roi_id: 2,
                mask: [8, 8],
                frame: [4, 4]
            }
        );
    }

    #[test]
    fn time_at_divides_by_fps() {
        assert_abs_diff_eq!(Trace::time_at(25, 10.0), 2.5, epsilon = 1e-12);
    }
}
