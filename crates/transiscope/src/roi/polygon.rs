//! Polygon helpers: duplicate collapsing, shoelace area, even-odd scanline fill.
//!
//! Pixel `(r, c)` is a member when the point `(r, c)` lies inside the polygon
//! under the even-odd rule. Boundary points follow the half-open crossing
//! convention (a point on a top/left edge is inside, on a bottom/right edge is
//! outside), so abutting polygons never share a pixel.

use super::{RoiMask, Vertex};

/// Drop consecutive repeated vertices, including a closing vertex equal to the first.
pub(crate) fn collapse_duplicates(vertices: &[Vertex]) -> Vec<Vertex> {
    let mut out: Vec<Vertex> = Vec::with_capacity(vertices.len());
    for &v in vertices {
        if out.last() != Some(&v) {
            out.push(v);
        }
    }
    while out.len() > 1 && out.first() == out.last() {
        out.pop();
    }
    out
}

/// Absolute polygon area via the shoelace formula.
pub(crate) fn shoelace_area(vertices: &[Vertex]) -> f64 {
    if vertices.len() < 3 {
        return 0.0;
    }
    let n = vertices.len();
    let mut twice = 0.0;
    for i in 0..n {
        let [r0, c0] = vertices[i];
        let [r1, c1] = vertices[(i + 1) % n];
        twice += c0 * r1 - c1 * r0;
    }
    0.5 * twice.abs()
}

/// Order an edge's endpoints so that the same segment always yields the same
/// floating-point intersections regardless of traversal direction.
#[inline]
fn canonical_edge(a: Vertex, b: Vertex) -> (Vertex, Vertex) {
    if (a[0], a[1]) <= (b[0], b[1]) {
        (a, b)
    } else {
        (b, a)
    }
}

/// Rasterize a polygon into a `height x width` mask.
pub(crate) fn rasterize_even_odd(vertices: &[Vertex], height: usize, width: usize) -> RoiMask {
    let mut mask = RoiMask::empty(height, width);
    if vertices.iter().flatten().any(|v| !v.is_finite()) {
        return mask;
    }
    let poly = collapse_duplicates(vertices);
    if poly.len() < 3 || height == 0 || width == 0 {
        return mask;
    }

    let edges: Vec<(Vertex, Vertex)> = (0..poly.len())
        .map(|i| canonical_edge(poly[i], poly[(i + 1) % poly.len()]))
        .collect();

    let (min_r, max_r) = poly
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
            (lo.min(v[0]), hi.max(v[0]))
        });
    let row_start = min_r.ceil().max(0.0) as usize;
    let row_end = (max_r.floor() + 1.0).clamp(0.0, height as f64) as usize;

    let width_f = width as f64;
    let mut crossings: Vec<f64> = Vec::with_capacity(edges.len());
    for row in row_start..row_end {
        let y = row as f64;
        crossings.clear();
        for &(a, b) in &edges {
            if (a[0] > y) != (b[0] > y) {
                crossings.push(a[1] + (b[1] - a[1]) * (y - a[0]) / (b[0] - a[0]));
            }
        }
        crossings.sort_by(f64::total_cmp);

        // Column c is inside iff an odd number of crossings lie strictly to its right.
        for pair in crossings.chunks_exact(2) {
            let c0 = pair[0].ceil().clamp(0.0, width_f) as usize;
            let c1 = pair[1].ceil().clamp(0.0, width_f) as usize;
            if c1 > c0 {
                mask.fill_span(row, c0, c1);
            }
        }
    }
    mask
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn collapse_removes_runs_and_closing_vertex() {
        let v = vec![[0.0, 0.0], [0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 0.0]];
        assert_eq!(
            collapse_duplicates(&v),
            vec![[0.0, 0.0], [1.0, 0.0], [1.0, 1.0]]
        );
    }

    #[test]
    fn shoelace_triangle() {
        let tri = vec![[0.0, 0.0], [0.0, 4.0], [3.0, 0.0]];
        assert_abs_diff_eq!(shoelace_area(&tri), 6.0, epsilon = 1e-12);
    }

    #[test]
    fn rectangle_uses_half_open_boundaries() {
        let rect = vec![[2.0, 3.0], [2.0, 8.0], [6.0, 8.0], [6.0, 3.0]];
        let mask = rasterize_even_odd(&rect, 10, 10);
        assert_eq!(mask.count(), 4 * 5);
        assert!(mask.get(2, 3));
        assert!(mask.get(5, 7));
        assert!(!mask.get(6, 3));
        assert!(!mask.get(2, 8));
    }

    #[test]
    fn polygon_is_clipped_to_image_bounds() {
        let big = vec![[-5.0, -5.0], [-5.0, 50.0], [50.0, 50.0], [50.0, -5.0]];
        let mask = rasterize_even_odd(&big, 8, 6);
        assert_eq!(mask.count(), 48);
    }

    #[test]
    fn self_intersecting_bowtie_follows_even_odd_rule() {
        // Two triangles meeting at (5, 5); the crossing point region is not doubled.
        let bowtie = vec![[0.0, 0.0], [10.0, 10.0], [10.0, 0.0], [0.0, 10.0]];
        let mask = rasterize_even_odd(&bowtie, 12, 12);
        assert!(mask.count() > 0);
        assert!(mask.get(1, 5));
        assert!(mask.get(9, 5));
        assert!(!mask.get(5, 1));
        assert!(!mask.get(5, 9));
    }

    #[test]
    fn overlapping_winding_cancels_under_even_odd() {
        // The same square traversed twice encloses the interior twice: even → outside.
        let sq = [[0.0, 0.0], [0.0, 4.0], [4.0, 4.0], [4.0, 0.0]];
        let twice: Vec<Vertex> = sq.iter().chain(sq.iter()).copied().collect();
        let mask = rasterize_even_odd(&twice, 8, 8);
        assert_eq!(mask.count(), 0);
    }

    #[test]
    fn non_finite_vertices_give_empty_mask() {
        let poly = vec![[0.0, 0.0], [0.0, f64::NAN], [4.0, 4.0]];
        assert_eq!(rasterize_even_odd(&poly, 8, 8).count(), 0);
    }
}
