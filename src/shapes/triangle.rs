// Copyright @yucwang 2023

use crate::core::shape::{ Shape, SurfaceHit };
use crate::math::aabb::AABB;
use crate::math::constants::{ Float, Vector3f };
use crate::math::ray::Ray3f;

const PARALLEL_EPSILON: Float = 1e-12;

#[derive(Debug, Copy, Clone)]
pub struct Triangle {
    p0: Vector3f,
    p1: Vector3f,
    p2: Vector3f,
}

impl Triangle {
    pub fn new(p0: Vector3f, p1: Vector3f, p2: Vector3f) -> Self {
        Self { p0, p1, p2 }
    }

    pub fn vertices(&self) -> (Vector3f, Vector3f, Vector3f) {
        (self.p0, self.p1, self.p2)
    }

    fn area_vector(&self) -> Vector3f {
        (self.p1 - self.p0).cross(&(self.p2 - self.p0))
    }

    pub fn geometric_normal(&self) -> Vector3f {
        self.area_vector().normalize()
    }

    pub fn is_degenerate(&self) -> bool {
        self.area_vector().norm() < PARALLEL_EPSILON
    }

    pub fn flipped(&self) -> Self {
        Self::new(self.p0, self.p2, self.p1)
    }

    // Edges included: a point on a shared edge belongs to both neighbours.
    fn contains(&self, p: &Vector3f) -> bool {
        let area = self.area_vector();
        [(self.p0, self.p1), (self.p1, self.p2), (self.p2, self.p0)].iter()
            .all(|(a, b)| (b - a).cross(&(p - a)).dot(&area) >= 0.0)
    }
}

impl Shape for Triangle {
    fn bounding_box(&self) -> AABB {
        let mut bounds = AABB::new(self.p0, self.p1);
        bounds.expand_by_point(&self.p2);
        bounds
    }

    fn ray_intersection(&self, ray: &Ray3f) -> Option<SurfaceHit> {
        let normal = self.geometric_normal();
        let cos_d = normal.dot(&ray.dir());
        if cos_d.abs() < PARALLEL_EPSILON {
            return None;
        }

        let t = normal.dot(&(self.p0 - ray.origin())) / cos_d;
        if !ray.covers(t) {
            return None;
        }
        let point = ray.at(t);
        if self.contains(&point) {
            Some(SurfaceHit { t, point, normal })
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn facet() -> Triangle {
        Triangle::new(Vector3f::new(1.0, 1.0, 0.0),
                      Vector3f::new(2.0, 2.0, 0.0),
                      Vector3f::new(2.0, 1.0, 0.0))
    }

    #[test]
    fn test_bounding_box() {
        let triangle = Triangle::new(Vector3f::new(1.0, 1.0, 1.0),
                                     Vector3f::new(1.5, 4.0, -1.0),
                                     Vector3f::new(-1.0, 2.0, 2.5));
        let bounds = triangle.bounding_box();
        assert_eq!(bounds.p_min, Vector3f::new(-1.0, 1.0, -1.0));
        assert_eq!(bounds.p_max, Vector3f::new(1.5, 4.0, 2.5));
    }

    #[test]
    fn test_containment_includes_edges() {
        let triangle = facet();
        assert!(triangle.contains(&Vector3f::new(1.5, 1.1, 0.0)));
        assert!(triangle.contains(&Vector3f::new(1.5, 1.5, 0.0)));
        assert!(triangle.contains(&Vector3f::new(2.0, 2.0, 0.0)));
        assert!(!triangle.contains(&Vector3f::new(1.5, 2.0, 0.0)));
    }

    #[test]
    fn test_hit_from_either_side() {
        let triangle = facet();
        let down = Ray3f::new(Vector3f::new(1.5, 1.1, 3.0), Vector3f::new(0.0, 0.0, -1.0));
        let hit = triangle.ray_intersection(&down).unwrap();
        assert!((hit.t - 3.0).abs() < 1e-12);
        assert!((hit.point - Vector3f::new(1.5, 1.1, 0.0)).norm() < 1e-12);
        assert_eq!(hit.normal, triangle.geometric_normal());

        let up = Ray3f::new(Vector3f::new(1.5, 1.1, -3.0), Vector3f::new(0.0, 0.0, 1.0));
        assert!(triangle.ray_intersection(&up).is_some());

        let away = Ray3f::new(Vector3f::new(1.5, 1.1, 3.0), Vector3f::new(0.0, 0.0, 1.0));
        assert!(triangle.ray_intersection(&away).is_none());
        let short = Ray3f::segment(Vector3f::new(1.5, 1.1, 3.0), Vector3f::new(0.0, 0.0, -1.0), 0.0, 2.0);
        assert!(triangle.ray_intersection(&short).is_none());
    }

    #[test]
    fn test_flipped_normal() {
        let triangle = Triangle::new(Vector3f::zeros(),
                                     Vector3f::new(1.0, 0.0, 0.0),
                                     Vector3f::new(0.0, 1.0, 0.0));
        assert_eq!(triangle.geometric_normal(), Vector3f::new(0.0, 0.0, 1.0));
        assert_eq!(triangle.flipped().geometric_normal(), Vector3f::new(0.0, 0.0, -1.0));
        assert!(!triangle.is_degenerate());
        assert!(Triangle::new(Vector3f::zeros(), Vector3f::zeros(), Vector3f::new(1.0, 0.0, 0.0)).is_degenerate());
    }
}
