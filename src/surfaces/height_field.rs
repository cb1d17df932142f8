// Copyright @yucwang 2026

use crate::core::face::FaceDirection;
use crate::math::constants::{ Float, Vector3f };
use crate::shapes::triangle::Triangle;
use crate::surfaces::patch::orient_to_face;

/// Regular grid of surface heights (µm), centered on the origin of its lateral plane.
#[derive(Debug, Clone, PartialEq)]
pub struct HeightField {
    nx: usize,
    ny: usize,
    spacing: Float,
    heights: Vec<Float>,
}

impl HeightField {
    /// `heights` is row-major, `ny` rows of `nx` samples.
    pub fn new(nx: usize, ny: usize, spacing: Float, heights: Vec<Float>) -> Option<Self> {
        if nx < 2 || ny < 2 || !(spacing > 0.0) || heights.len() != nx * ny {
            return None;
        }
        Some(Self { nx, ny, spacing, heights })
    }

    /// Polished surface: a flat square of side `extent` split into `cells` per side.
    pub fn flat(extent: Float, cells: usize) -> Self {
        let cells = cells.max(1);
        let n = cells + 1;
        Self { nx: n, ny: n, spacing: extent / cells as Float, heights: vec![0.0; n * n] }
    }

    /// Milled finish: parallel V-grooves of `pitch` and peak-to-valley `depth` running along
    /// the second lateral axis. Heights are centered on zero.
    pub fn v_grooves(extent: Float, pitch: Float, depth: Float, samples_per_pitch: usize) -> Self {
        let samples = (samples_per_pitch.max(2) + 1) / 2 * 2;
        let spacing = pitch / samples as Float;
        let n = (extent / spacing).ceil().max(1.0) as usize + 1;

        let mut heights = Vec::with_capacity(n * n);
        for _ in 0..n {
            for i in 0..n {
                let phase = (i % samples) as Float / samples as Float;
                let ridge = (2.0 * phase - 1.0).abs();
                heights.push(depth * (ridge - 0.5));
            }
        }
        Self { nx: n, ny: n, spacing, heights }
    }

    pub fn height(&self, i: usize, j: usize) -> Float {
        self.heights[j * self.nx + i]
    }

    pub fn extent(&self) -> (Float, Float) {
        ((self.nx - 1) as Float * self.spacing, (self.ny - 1) as Float * self.spacing)
    }

    fn grid_point(&self, i: usize, j: usize) -> Vector3f {
        let (ex, ey) = self.extent();
        Vector3f::new(i as Float * self.spacing - 0.5 * ex,
                      j as Float * self.spacing - 0.5 * ey,
                      self.height(i, j))
    }

    /// Two triangles per grid cell, placed on `face`.
    pub fn triangulate(&self, face: FaceDirection) -> Vec<Triangle> {
        let mut triangles = Vec::with_capacity(2 * (self.nx - 1) * (self.ny - 1));
        for j in 0..(self.ny - 1) {
            for i in 0..(self.nx - 1) {
                let p00 = orient_to_face(face, &self.grid_point(i, j));
                let p10 = orient_to_face(face, &self.grid_point(i + 1, j));
                let p01 = orient_to_face(face, &self.grid_point(i, j + 1));
                let p11 = orient_to_face(face, &self.grid_point(i + 1, j + 1));
                triangles.push(Triangle::new(p00, p10, p11));
                triangles.push(Triangle::new(p00, p11, p01));
            }
        }
        triangles
    }
}
