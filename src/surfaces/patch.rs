// Copyright @yucwang 2026

use crate::core::bvh::BVH;
use crate::core::face::FaceDirection;
use crate::core::shape::{ Shape, SurfaceHit };
use crate::io::obj_utils::{ self, ObjLoadError };
use crate::math::aabb::AABB;
use crate::math::constants::{ round_to_nano, Float, Vector2f, Vector3f, EPSILON };
use crate::math::ray::Ray3f;
use crate::math::transform::Transform;
use crate::shapes::triangle::Triangle;
use crate::surfaces::height_field::HeightField;

use std::path::Path;
use std::sync::Arc;

/// Share of the lateral extent left unsampled on each side of a patch.
pub const SAMPLING_MARGIN: Float = 0.025;

/// Rectangle on the two lateral axes of a face, inside which intersection points are sampled.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct SamplingBounds {
    pub axes: (usize, usize),
    pub first: (Float, Float),
    pub second: (Float, Float),
}

impl SamplingBounds {
    fn from_extent(face: FaceDirection, bounds: &AABB) -> Self {
        let (a, b) = face.lateral_axes();
        let shrink = |axis: usize| {
            let margin = SAMPLING_MARGIN * (bounds.p_max[axis] - bounds.p_min[axis]);
            (bounds.p_min[axis] + margin, bounds.p_max[axis] - margin)
        };
        Self { axes: (a, b), first: shrink(a), second: shrink(b) }
    }

    /// Point with lateral coordinates mapped from `u`, zero on the vertical axis.
    pub fn sample(&self, u: &Vector2f) -> Vector3f {
        let mut p = Vector3f::zeros();
        p[self.axes.0] = self.first.0 + (self.first.1 - self.first.0) * u.x;
        p[self.axes.1] = self.second.0 + (self.second.1 - self.second.0) * u.y;
        p
    }

    pub fn contains(&self, p: &Vector3f) -> bool {
        let x = p[self.axes.0];
        let y = p[self.axes.1];
        x >= self.first.0 && x <= self.first.1 && y >= self.second.0 && y <= self.second.1
    }
}

/// Triangulated micro-topography of one cuboid face, in µm, in its own frame:
/// the mean surface sits near zero on the face's normal axis. Shared read-only.
pub struct SurfacePatch {
    face: FaceDirection,
    triangles: Vec<Triangle>,
    bvh: BVH,
    bounds: AABB,
    sampling_bounds: SamplingBounds,
}

impl SurfacePatch {
    /// Triangles are rewound so their normals point out of the face. `None` if nothing usable remains.
    pub fn new(face: FaceDirection, triangles: Vec<Triangle>) -> Option<Self> {
        let outward = face.normal();
        let triangles: Vec<Triangle> = triangles.into_iter()
            .filter(|t| !t.is_degenerate())
            .map(|t| if t.geometric_normal().dot(&outward) < 0.0 { t.flipped() } else { t })
            .collect();
        if triangles.is_empty() {
            return None;
        }

        let prim_bounds: Vec<AABB> = triangles.iter().map(|t| t.bounding_box()).collect();
        let prim_centroids = prim_bounds.iter().map(|b| b.center()).collect();
        let mut bounds = AABB::default();
        for b in prim_bounds.iter() {
            bounds.expand_by_aabb(b);
        }
        let bvh = BVH::new(prim_bounds, prim_centroids);
        let sampling_bounds = SamplingBounds::from_extent(face, &bounds);

        Some(Self { face, triangles, bvh, bounds, sampling_bounds })
    }

    pub fn from_height_field(face: FaceDirection, field: &HeightField) -> Option<Self> {
        Self::new(face, field.triangulate(face))
    }

    /// Loads an OBJ authored with the surface facing +z; it is reoriented onto `face`.
    pub fn from_obj<P: AsRef<Path>>(face: FaceDirection, path: P) -> Result<Option<Self>, ObjLoadError> {
        let triangles = obj_utils::load_triangles_from_file(path)?
            .into_iter()
            .map(|t| {
                let (p0, p1, p2) = t.vertices();
                Triangle::new(orient_to_face(face, &p0), orient_to_face(face, &p1), orient_to_face(face, &p2))
            })
            .collect();
        Ok(Self::new(face, triangles))
    }

    pub fn face(&self) -> FaceDirection {
        self.face
    }

    pub fn triangle_count(&self) -> usize {
        self.triangles.len()
    }

    pub fn safe_sampling_bounds(&self) -> SamplingBounds {
        self.sampling_bounds
    }
}

impl Shape for SurfacePatch {
    fn bounding_box(&self) -> AABB {
        self.bounds
    }

    /// Nearest hit farther than 1e-9 from the ray origin.
    fn ray_intersection(&self, ray: &Ray3f) -> Option<SurfaceHit> {
        self.bvh.ray_intersection(ray, |prim_idx, ray| {
            let hit = self.triangles[prim_idx].ray_intersection(ray)?;
            let t = round_to_nano(hit.t);
            if t > EPSILON {
                Some((SurfaceHit { t, ..hit }, t))
            } else {
                None
            }
        }).map(|(_, hit)| hit)
    }
}

/// Maps a point authored in the +z frame (lateral x, y and height z) onto `face`.
pub fn orient_to_face(face: FaceDirection, p: &Vector3f) -> Vector3f {
    let (a, b) = face.lateral_axes();
    let mut out = Vector3f::zeros();
    out[a] = p.x;
    out[b] = p.y;
    out[face.axis()] = face.sign() * p.z;
    out
}

/// A shared patch template placed by a rigid translation. Built fresh for every use.
#[derive(Clone)]
pub struct PatchInstance {
    template: Arc<SurfacePatch>,
    transform: Transform,
}

impl PatchInstance {
    pub fn new(template: Arc<SurfacePatch>) -> Self {
        Self { template, transform: Transform::default() }
    }

    pub fn translate(&self, offset: &Vector3f) -> Self {
        Self {
            template: self.template.clone(),
            transform: Transform::translate(offset).compose(&self.transform),
        }
    }

    pub fn face(&self) -> FaceDirection {
        self.template.face()
    }

    pub fn safe_sampling_bounds(&self) -> SamplingBounds {
        self.template.safe_sampling_bounds()
    }

    /// Nearest true intersection with the placed patch: point and unit face normal.
    pub fn intersect(&self, origin: &Vector3f, dir: &Vector3f) -> Option<(Vector3f, Vector3f)> {
        self.ray_intersection(&Ray3f::new(*origin, *dir))
            .map(|hit| (hit.point, hit.normal))
    }
}

impl Shape for PatchInstance {
    fn bounding_box(&self) -> AABB {
        let b = self.template.bounding_box();
        AABB::new(self.transform.apply_point(b.p_min), self.transform.apply_point(b.p_max))
    }

    fn ray_intersection(&self, ray: &Ray3f) -> Option<SurfaceHit> {
        let local = self.transform.inv_apply_ray(ray);
        self.template.ray_intersection(&local).map(|hit| SurfaceHit {
            point: self.transform.apply_point(hit.point),
            normal: self.transform.apply_normal(hit.normal).normalize(),
            ..hit
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::surfaces::height_field::HeightField;

    fn flat_patch(face: FaceDirection) -> Arc<SurfacePatch> {
        Arc::new(SurfacePatch::from_height_field(face, &HeightField::flat(100.0, 4)).unwrap())
    }

    #[test]
    fn test_sampling_bounds_leave_margin() {
        let patch = flat_patch(FaceDirection::PosZ);
        let bounds = patch.safe_sampling_bounds();
        assert_eq!(bounds.axes, (0, 1));
        assert!((bounds.first.0 + 47.5).abs() < 1e-9);
        assert!((bounds.first.1 - 47.5).abs() < 1e-9);
        assert!((bounds.second.1 - 47.5).abs() < 1e-9);

        let p = bounds.sample(&Vector2f::new(1.0, 0.0));
        assert!((p - Vector3f::new(47.5, -47.5, 0.0)).norm() < 1e-9);
        assert!(bounds.contains(&Vector3f::new(0.0, 0.0, 12.0)));
        assert!(!bounds.contains(&Vector3f::new(49.0, 0.0, 0.0)));
    }

    #[test]
    fn test_normals_point_outward() {
        for face in FaceDirection::ALL.iter() {
            let patch = flat_patch(*face);
            for tri in patch.triangles.iter() {
                assert!((tri.geometric_normal() - face.normal()).norm() < 1e-12);
            }
            let (a, b) = face.lateral_axes();
            assert_eq!(patch.safe_sampling_bounds().axes, (a, b));
        }
    }

    #[test]
    fn test_translated_instance_intersection() {
        let patch = flat_patch(FaceDirection::PosX);
        let instance = PatchInstance::new(patch.clone()).translate(&Vector3f::new(2500.0, 10.0, -3.0));

        let origin = Vector3f::new(2000.0, 0.0, 0.0);
        let (p, n) = instance.intersect(&origin, &Vector3f::new(1.0, 0.0, 0.0)).unwrap();
        assert!((p - Vector3f::new(2500.0, 0.0, 0.0)).norm() < 1e-9);
        assert!((n - Vector3f::new(1.0, 0.0, 0.0)).norm() < 1e-12);

        // The template itself is untouched.
        let template_hit = patch.ray_intersection(&Ray3f::new(Vector3f::new(-10.0, 0.0, 0.0),
                                                              Vector3f::new(1.0, 0.0, 0.0)));
        assert!((template_hit.unwrap().point - Vector3f::zeros()).norm() < 1e-9);

        // Behind the origin and outside the patch.
        assert!(instance.intersect(&origin, &Vector3f::new(-1.0, 0.0, 0.0)).is_none());
        assert!(instance.intersect(&Vector3f::new(2000.0, 500.0, 0.0), &Vector3f::new(1.0, 0.0, 0.0)).is_none());
    }

    #[test]
    fn test_origin_on_surface_is_not_a_hit() {
        let instance = PatchInstance::new(flat_patch(FaceDirection::PosZ));
        assert!(instance.intersect(&Vector3f::zeros(), &Vector3f::new(0.0, 0.6, 0.8)).is_none());
    }

    #[test]
    fn test_orient_to_face() {
        let p = Vector3f::new(1.0, 2.0, 3.0);
        assert_eq!(orient_to_face(FaceDirection::PosZ, &p), p);
        assert_eq!(orient_to_face(FaceDirection::NegX, &p), Vector3f::new(-3.0, 1.0, 2.0));
        assert_eq!(orient_to_face(FaceDirection::PosY, &p), Vector3f::new(1.0, 3.0, 2.0));
    }
}
