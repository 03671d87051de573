//! Frame-major intensity volume plus acquisition metadata.

use image::{DynamicImage, GrayImage};

/// Pixel size used when the acquisition does not provide one (µm per pixel).
pub const DEFAULT_PIXEL_SIZE_UM: f64 = 0.16;

// ── Error type ─────────────────────────────────────────────────────────────

/// Errors raised while assembling an [`ImageStack`].
#[derive(Debug, Clone, PartialEq)]
pub enum StackError {
    /// No frames were supplied, or a dimension is zero.
    EmptyStack,
    /// Flat buffer length disagrees with `frames * height * width`.
    ShapeMismatch {
        /// Expected number of samples.
        expected: usize,
        /// Supplied number of samples.
        got: usize,
    },
    /// A frame's `[height, width]` differs from the first frame.
    InconsistentFrame {
        /// Frame index.
        index: usize,
        /// Shape of frame 0.
        expected: [usize; 2],
        /// Shape of the offending frame.
        got: [usize; 2],
    },
}

impl std::fmt::Display for StackError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyStack => write!(f, "image stack has no samples"),
            Self::ShapeMismatch { expected, got } => {
                write!(f, "stack buffer has {} samples, expected {}", got, expected)
            }
            Self::InconsistentFrame {
                index,
                expected,
                got,
            } => write!(
                f,
                "frame {} is {}x{}, expected {}x{}",
                index, got[0], got[1], expected[0], expected[1]
            ),
        }
    }
}

impl std::error::Error for StackError {}

// ── Types ──────────────────────────────────────────────────────────────────

/// Acquisition metadata accompanying an image stack.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct AcquisitionMeta {
    /// Frames per second. Must be > 0 for any time-based operation.
    pub fps: f64,
    /// Micrometers per pixel.
    pub pixel_size_um: f64,
}

impl AcquisitionMeta {
    /// Metadata with the default pixel size.
    pub fn new(fps: f64) -> Self {
        Self {
            fps,
            pixel_size_um: DEFAULT_PIXEL_SIZE_UM,
        }
    }

    pub fn with_pixel_size(fps: f64, pixel_size_um: f64) -> Self {
        Self { fps, pixel_size_um }
    }

    /// `true` when `fps` is finite and positive.
    pub fn has_valid_fps(&self) -> bool {
        self.fps.is_finite() && self.fps > 0.0
    }
}

/// Intensity volume of shape `frames x height x width`, frame-major.
#[derive(Debug, Clone)]
pub struct ImageStack {
    n_frames: usize,
    height: usize,
    width: usize,
    data: Vec<f32>,
}

impl ImageStack {
    /// Wrap a flat frame-major buffer.
    pub fn new(
        n_frames: usize,
        height: usize,
        width: usize,
        data: Vec<f32>,
    ) -> Result<Self, StackError> {
        if n_frames == 0 || height == 0 || width == 0 {
            return Err(StackError::EmptyStack);
        }
        let expected = n_frames * height * width;
        if data.len() != expected {
            return Err(StackError::ShapeMismatch {
                expected,
                got: data.len(),
            });
        }
        Ok(Self {
            n_frames,
            height,
            width,
            data,
        })
    }

    /// Build from 8-bit greyscale frames.
    pub fn from_gray_frames(frames: &[GrayImage]) -> Result<Self, StackError> {
        let shapes: Vec<[usize; 2]> = frames
            .iter()
            .map(|f| [f.height() as usize, f.width() as usize])
            .collect();
        let [height, width] = check_uniform(&shapes)?;
        let mut data = Vec::with_capacity(frames.len() * height * width);
        for frame in frames {
            data.extend(frame.as_raw().iter().map(|&v| v as f32));
        }
        Self::new(frames.len(), height, width, data)
    }

    /// Build from decoded frames of any colour type.
    ///
    /// Colour frames are reduced to luminance. Frames with 16-bit (or wider)
    /// channels keep 16-bit intensity values; everything else is 8-bit.
    pub fn from_dynamic_frames(frames: &[DynamicImage]) -> Result<Self, StackError> {
        let shapes: Vec<[usize; 2]> = frames
            .iter()
            .map(|f| [f.height() as usize, f.width() as usize])
            .collect();
        let [height, width] = check_uniform(&shapes)?;
        let mut data = Vec::with_capacity(frames.len() * height * width);
        for frame in frames {
            let color = frame.color();
            let bytes_per_channel = color.bytes_per_pixel() / color.channel_count();
            if bytes_per_channel >= 2 {
                data.extend(frame.to_luma16().as_raw().iter().map(|&v| v as f32));
            } else {
                data.extend(frame.to_luma8().as_raw().iter().map(|&v| v as f32));
            }
        }
        Self::new(frames.len(), height, width, data)
    }

    /// `[frames, height, width]`.
    pub fn shape(&self) -> [usize; 3] {
        [self.n_frames, self.height, self.width]
    }

    /// `[height, width]` of every frame.
    pub fn frame_shape(&self) -> [usize; 2] {
        [self.height, self.width]
    }

    pub fn n_frames(&self) -> usize {
        self.n_frames
    }

    /// Row-major samples of frame `index`.
    ///
    /// # Panics
    /// If `index >= n_frames()`.
    pub fn frame(&self, index: usize) -> &[f32] {
        let len = self.height * self.width;
        &self.data[index * len..(index + 1) * len]
    }

    /// Iterator over all frames in order.
    pub fn frames(&self) -> impl Iterator<Item = &[f32]> + '_ {
        self.data.chunks_exact(self.height * self.width)
    }

    /// Observation time covered by the stack: `frames / fps` seconds.
    pub fn observation_duration_s(&self, fps: f64) -> f64 {
        self.n_frames as f64 / fps
    }
}

fn check_uniform(shapes: &[[usize; 2]]) -> Result<[usize; 2], StackError> {
    let first = *shapes.first().ok_or(StackError::EmptyStack)?;
    if let Some((index, &got)) = shapes.iter().enumerate().find(|(_, s)| **s != first) {
        return Err(StackError::InconsistentFrame {
            index,
            expected: first,
            got,
        });
    }
    Ok(first)
}
