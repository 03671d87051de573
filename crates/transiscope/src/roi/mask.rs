/// Boolean membership grid over an image plane (row-major).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoiMask {
    height: usize,
    width: usize,
    data: Vec<bool>,
}

impl RoiMask {
    /// All-`false` mask of the given size.
    pub fn empty(height: usize, width: usize) -> Self {
        Self {
            height,
            width,
            data: vec![false; height * width],
        }
    }

    /// `[height, width]`.
    pub fn shape(&self) -> [usize; 2] {
        [self.height, self.width]
    }

    /// Membership of pixel `(row, col)`; out-of-bounds pixels are not members.
    pub fn get(&self, row: usize, col: usize) -> bool {
        row < self.height && col < self.width && self.data[row * self.width + col]
    }

    /// Number of member pixels.
    pub fn count(&self) -> usize {
        self.data.iter().filter(|&&m| m).count()
    }

    /// Row-major flat indices of member pixels.
    pub fn member_indices(&self) -> impl Iterator<Item = usize> + '_ {
        self.data
            .iter()
            .enumerate()
            .filter_map(|(i, &m)| m.then_some(i))
    }

    pub fn as_slice(&self) -> &[bool] {
        &self.data
    }

    /// Mark columns `[col_start, col_end)` of `row` as members.
    pub(crate) fn fill_span(&mut self, row: usize, col_start: usize, col_end: usize) {
        let base = row * self.width;
        for m in &mut self.data[base + col_start..base + col_end] {
            *m = true;
        }
    }
}
