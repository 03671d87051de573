//! User-defined polygon regions and their derived geometry.
//!
//! A [`Roi`] is built once from a finalized vertex list; its mask and pixel
//! area never change afterwards. Editing a polygon means building a new ROI
//! (see [`RoiRegistry::replace`]).

mod mask;
mod polygon;
mod registry;

pub use mask::RoiMask;
pub use registry::RoiRegistry;

pub(crate) use polygon::{collapse_duplicates, rasterize_even_odd, shoelace_area};

/// Identifier assigned by [`RoiRegistry`], starting at 1.
pub type RoiId = u32;

/// Polygon vertex in image coordinates: `[row, column]`.
///
/// Integer coordinates address pixel centers.
pub type Vertex = [f64; 2];

// ── Error type ─────────────────────────────────────────────────────────────

/// Errors raised at the ROI boundary.
#[derive(Debug, Clone, PartialEq)]
pub enum RoiError {
    /// A polygon needs at least three vertices.
    TooFewVertices {
        /// Number of vertices supplied.
        got: usize,
    },
    /// A vertex coordinate is NaN or infinite.
    NonFiniteVertex {
        /// Position of the offending vertex in the input list.
        index: usize,
    },
    /// No ROI with this id is registered.
    UnknownRoi {
        /// Requested id.
        id: RoiId,
    },
    /// Pixel size must be finite and positive.
    InvalidPixelSize {
        /// Rejected value (µm per pixel).
        value: f64,
    },
}

impl std::fmt::Display for RoiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::TooFewVertices { got } => {
                write!(f, "polygon needs at least 3 vertices, got {}", got)
            }
            Self::NonFiniteVertex { index } => {
                write!(f, "vertex {} has a non-finite coordinate", index)
            }
            Self::UnknownRoi { id } => write!(f, "no ROI with id {}", id),
            Self::InvalidPixelSize { value } => {
                write!(f, "pixel size must be finite and > 0, got {}", value)
            }
        }
    }
}

impl std::error::Error for RoiError {}

// ── Types ──────────────────────────────────────────────────────────────────

/// A region of interest with its rasterized mask and areas.
#[derive(Debug, Clone, serde::Serialize)]
pub struct Roi {
    id: RoiId,
    vertices: Vec<Vertex>,
    #[serde(skip)]
    mask: RoiMask,
    area_pixels: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    area_sq_um: Option<f64>,
}

impl Roi {
    /// Rasterize `vertices` over an image of `image_shape = [height, width]`.
    ///
    /// Never fails: polygons with fewer than three distinct vertices, zero
    /// area, or non-finite coordinates produce an empty mask and
    /// `area_pixels == 0`. Vertex-count validation happens in
    /// [`RoiRegistry::add`].
    pub fn new(id: RoiId, vertices: Vec<Vertex>, image_shape: [usize; 2]) -> Self {
        let [height, width] = image_shape;
        let mask = rasterize_even_odd(&vertices, height, width);
        let area_pixels = mask.count();
        Self {
            id,
            vertices,
            mask,
            area_pixels,
            area_sq_um: None,
        }
    }

    pub fn id(&self) -> RoiId {
        self.id
    }

    /// Vertices exactly as supplied.
    pub fn vertices(&self) -> &[Vertex] {
        &self.vertices
    }

    pub fn mask(&self) -> &RoiMask {
        &self.mask
    }

    /// Number of member pixels.
    pub fn area_pixels(&self) -> usize {
        self.area_pixels
    }

    /// Physical area in µm², `None` until a pixel size has been applied.
    pub fn area_sq_um(&self) -> Option<f64> {
        self.area_sq_um
    }

    /// `false` for degenerate polygons that cover no pixel centers.
    pub fn is_contributing(&self) -> bool {
        self.area_pixels > 0
    }

    /// Analytic polygon area (shoelace) in square pixels.
    pub fn polygon_area_px(&self) -> f64 {
        shoelace_area(&collapse_duplicates(&self.vertices))
    }

    /// Recompute `area_sq_um` for a pixel size in µm per pixel.
    ///
    /// Leaves mask and pixel area untouched.
    pub fn set_area_physical(&mut self, pixel_size_um: f64) -> Result<(), RoiError> {
        if !pixel_size_um.is_finite() || pixel_size_um <= 0.0 {
            return Err(RoiError::InvalidPixelSize {
                value: pixel_size_um,
            });
        }
        self.area_sq_um = Some(self.area_pixels as f64 * pixel_size_um * pixel_size_um);
        Ok(())
    }
}
