use std::collections::HashMap;

use super::{Roi, RoiError, RoiId, Vertex};

const FIRST_ROI_ID: RoiId = 1;

/// Owns the ROIs of one image plane and assigns their ids.
///
/// Ids increase monotonically from 1 and are not reused by [`remove`](Self::remove).
/// [`clear_all`](Self::clear_all) resets the counter, so ids handed out after a
/// clear start again at 1.
#[derive(Debug, Clone)]
pub struct RoiRegistry {
    image_shape: [usize; 2],
    pixel_size_um: Option<f64>,
    rois: Vec<Roi>,
    /// Fast lookup: ROI id -> index into `rois`.
    id_to_idx: HashMap<RoiId, usize>,
    next_id: RoiId,
}

impl RoiRegistry {
    /// Empty registry for images of `image_shape = [height, width]`.
    pub fn new(image_shape: [usize; 2]) -> Self {
        Self {
            image_shape,
            pixel_size_um: None,
            rois: Vec::new(),
            id_to_idx: HashMap::new(),
            next_id: FIRST_ROI_ID,
        }
    }

    /// Empty registry with a pixel size applied to every ROI it creates.
    pub fn with_pixel_size(image_shape: [usize; 2], pixel_size_um: f64) -> Result<Self, RoiError> {
        let mut registry = Self::new(image_shape);
        registry.set_pixel_size(pixel_size_um)?;
        Ok(registry)
    }

    pub fn image_shape(&self) -> [usize; 2] {
        self.image_shape
    }

    pub fn pixel_size_um(&self) -> Option<f64> {
        self.pixel_size_um
    }

    /// Create a ROI from a finalized vertex list.
    ///
    /// The vertices are copied; rejects fewer than three vertices or
    /// non-finite coordinates. Geometrically identical polygons are not
    /// detected here, see [`find_by_vertices`](Self::find_by_vertices).
    pub fn add(&mut self, vertices: &[Vertex]) -> Result<&Roi, RoiError> {
        if let Err(err) = validate_vertices(vertices) {
            tracing::warn!(n_vertices = vertices.len(), "ROI rejected: {}", err);
            return Err(err);
        }
        let id = self.next_id;
        let roi = self.build(id, vertices)?;
        self.next_id += 1;

        tracing::debug!(
            roi_id = id,
            area_px = roi.area_pixels(),
            area_um2 = roi.area_sq_um(),
            "ROI added"
        );
        if !roi.is_contributing() {
            tracing::warn!(roi_id = id, "ROI covers no pixel centers");
        }

        let index = self.rois.len();
        self.rois.push(roi);
        self.id_to_idx.insert(id, index);
        Ok(&self.rois[index])
    }

    /// Rebuild the ROI `id` from new vertices, keeping its id and position.
    pub fn replace(&mut self, id: RoiId, vertices: &[Vertex]) -> Result<&Roi, RoiError> {
        let index = *self.id_to_idx.get(&id).ok_or(RoiError::UnknownRoi { id })?;
        validate_vertices(vertices)?;
        let roi = self.build(id, vertices)?;
        self.rois[index] = roi;
        tracing::debug!(roi_id = id, "ROI geometry replaced");
        Ok(&self.rois[index])
    }

    /// Remove the ROI `id`. Its id is not handed out again until [`clear_all`](Self::clear_all).
    pub fn remove(&mut self, id: RoiId) -> Result<Roi, RoiError> {
        let index = self
            .id_to_idx
            .remove(&id)
            .ok_or(RoiError::UnknownRoi { id })?;
        let roi = self.rois.remove(index);
        self.rebuild_index();
        Ok(roi)
    }

    /// Drop every ROI and reset the id counter to 1.
    pub fn clear_all(&mut self) {
        self.rois.clear();
        self.id_to_idx.clear();
        self.next_id = FIRST_ROI_ID;
    }

    /// ROIs in insertion order.
    pub fn enumerate_all(&self) -> &[Roi] {
        &self.rois
    }

    pub fn get(&self, id: RoiId) -> Option<&Roi> {
        self.id_to_idx.get(&id).map(|&idx| &self.rois[idx])
    }

    pub fn len(&self) -> usize {
        self.rois.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rois.is_empty()
    }

    /// Id of a registered ROI with exactly this vertex list, if any.
    pub fn find_by_vertices(&self, vertices: &[Vertex]) -> Option<RoiId> {
        self.rois
            .iter()
            .find(|roi| roi.vertices() == vertices)
            .map(Roi::id)
    }

    /// Set the pixel size (µm per pixel) and recompute every ROI's physical area.
    pub fn set_pixel_size(&mut self, pixel_size_um: f64) -> Result<(), RoiError> {
        if !pixel_size_um.is_finite() || pixel_size_um <= 0.0 {
            return Err(RoiError::InvalidPixelSize {
                value: pixel_size_um,
            });
        }
        self.pixel_size_um = Some(pixel_size_um);
        for roi in &mut self.rois {
            roi.set_area_physical(pixel_size_um)?;
        }
        Ok(())
    }

    fn build(&self, id: RoiId, vertices: &[Vertex]) -> Result<Roi, RoiError> {
        let mut roi = Roi::new(id, vertices.to_vec(), self.image_shape);
        if let Some(pixel_size_um) = self.pixel_size_um {
            roi.set_area_physical(pixel_size_um)?;
        }
        Ok(roi)
    }

    fn rebuild_index(&mut self) {
        self.id_to_idx = self
            .rois
            .iter()
            .enumerate()
            .map(|(i, roi)| (roi.id(), i))
            .collect();
    }
}

fn validate_vertices(vertices: &[Vertex]) -> Result<(), RoiError> {
    if vertices.len() < 3 {
        return Err(RoiError::TooFewVertices {
            got: vertices.len(),
        });
    }
    if let Some(index) = vertices
        .iter()
        .position(|v| !v[0].is_finite() || !v[1].is_finite())
    {
        return Err(RoiError::NonFiniteVertex { index });
    }
    Ok(())
}
