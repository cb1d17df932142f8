// Copyright @yucwang 2026

use crate::core::face::FaceDirection;
use crate::math::aabb::AABB;
use crate::math::constants::{ round_to_nano, round_vector_to_nano, Float, Vector3f, EPSILON };
use crate::math::ray::Ray3f;

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct CuboidHit {
    pub t: Float,
    pub point: Vector3f,
    pub face: FaceDirection,
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Cuboid {
    bounds: AABB,
}

impl Cuboid {
    pub fn new(center: Vector3f, size: Vector3f) -> Self {
        Self { bounds: AABB::from_center_size(center, size) }
    }

    pub fn center(&self) -> Vector3f {
        self.bounds.center()
    }

    pub fn size(&self) -> Vector3f {
        self.bounds.extent()
    }

    pub fn face_coordinate(&self, face: FaceDirection) -> Float {
        if face.is_positive() {
            self.bounds.p_max[face.axis()]
        } else {
            self.bounds.p_min[face.axis()]
        }
    }

    // Forward crossings of the boundary, nearest first: at most an entry and an exit.
    // Crossings within 1e-9 of the origin are not reported.
    pub fn ray_hits(&self, ray: &Ray3f) -> Vec<CuboidHit> {
        let d = ray.dir();
        let span = match self.bounds.slab_span(&ray.origin(), &d) {
            Some(span) => span,
            None => return Vec::new(),
        };

        let enter = FaceDirection::new(span.enter_axis, d[span.enter_axis] < 0.0);
        let exit = FaceDirection::new(span.exit_axis, d[span.exit_axis] > 0.0);
        [(span.t_enter, enter), (span.t_exit, exit)].iter()
            .map(|(t, face)| (round_to_nano(*t), *face))
            .filter(|(t, _)| *t > EPSILON)
            .map(|(t, face)| CuboidHit { t, point: self.snap_to_face(ray.at(t), face), face })
            .collect()
    }

    pub fn contains_laterally(&self, p: &Vector3f, face: FaceDirection) -> bool {
        let (a, b) = face.lateral_axes();
        [a, b].iter().all(|axis| {
            let lo = round_to_nano(self.bounds.p_min[*axis]);
            let hi = round_to_nano(self.bounds.p_max[*axis]);
            p[*axis] > lo && p[*axis] < hi
        })
    }

    fn snap_to_face(&self, p: Vector3f, face: FaceDirection) -> Vector3f {
        let mut p = round_vector_to_nano(&p);
        p[face.axis()] = self.face_coordinate(face);
        p
    }
}
