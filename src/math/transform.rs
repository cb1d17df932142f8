// Copyright 2020 @TwoCookingMice

use super::constants::{ Vector3f, Matrix4f };
use super::ray::Ray3f;

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Transform {
    matrix: Matrix4f,
    inv_matrix: Matrix4f
}

impl Default for Transform {
    fn default() -> Self {
        Self { matrix: Matrix4f::identity(),
               inv_matrix: Matrix4f::identity() }
    }
}

impl Transform {
    pub fn translate(offset: &Vector3f) -> Self {
        Self { matrix: Matrix4f::new_translation(offset),
               inv_matrix: Matrix4f::new_translation(&(-offset)) }
    }

    pub fn compose(&self, other: &Transform) -> Self {
        Self { matrix: self.matrix * other.matrix,
               inv_matrix: other.inv_matrix * self.inv_matrix }
    }

    pub fn apply_point(&self, p: Vector3f) -> Vector3f {
        self.matrix.transform_point(&p.into()).coords
    }

    // Normal transformation is different from point transformation.
    // Before transformation, we have n^Tx = 0
    // After transformation, we have (Sn)^T(Mx) = 0
    // Then, we will get: S = (M^{-1})^T
    pub fn apply_normal(&self, n: Vector3f) -> Vector3f {
        self.inv_matrix.transpose().fixed_slice::<3, 3>(0, 0) * n
    }

    pub fn inv_apply_point(&self, p: Vector3f) -> Vector3f {
        self.inv_matrix.transform_point(&p.into()).coords
    }

    pub fn inv_apply_vector(&self, v: Vector3f) -> Vector3f {
        self.inv_matrix.transform_vector(&v)
    }

    pub fn inv_apply_ray(&self, ray: &Ray3f) -> Ray3f {
        let new_p = self.inv_apply_point(ray.origin());
        let new_d = self.inv_apply_vector(ray.dir());

        let (t_min, t_max) = ray.span();
        Ray3f::segment(new_p, new_d, t_min, t_max)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_translate_round_trip() {
        let t = Transform::translate(&Vector3f::new(10.0, -2.0, 2500.0));
        let p = Vector3f::new(1.0, 2.0, 3.0);
        assert_eq!(t.apply_point(p), Vector3f::new(11.0, 0.0, 2503.0));
        assert_eq!(t.inv_apply_point(t.apply_point(p)), p);
        assert_eq!(t.apply_normal(Vector3f::new(0.0, 0.0, 1.0)), Vector3f::new(0.0, 0.0, 1.0));
    }

    #[test]
    fn test_normal_ignores_offset_sign() {
        for offset in [Vector3f::new(2500.0, 10.0, -3.0), Vector3f::new(-2500.0, 0.0, 7.0)].iter() {
            let t = Transform::translate(offset);
            for n in [Vector3f::new(1.0, 0.0, 0.0), Vector3f::new(0.0, -1.0, 0.0), Vector3f::new(0.0, 0.6, 0.8)].iter() {
                assert_eq!(t.apply_normal(*n), *n);
            }
        }
    }

    #[test]
    fn test_compose_translations() {
        let a = Transform::translate(&Vector3f::new(1.0, 0.0, 0.0));
        let b = Transform::translate(&Vector3f::new(0.0, 5.0, -1.0));
        let c = a.compose(&b);
        assert_eq!(c.apply_point(Vector3f::zeros()), Vector3f::new(1.0, 5.0, -1.0));
        assert_eq!(c.inv_apply_point(Vector3f::new(1.0, 5.0, -1.0)), Vector3f::zeros());
    }

    #[test]
    fn test_inv_apply_ray() {
        let t = Transform::translate(&Vector3f::new(0.0, 0.0, 100.0));
        let ray = Ray3f::new(Vector3f::new(0.0, 0.0, 90.0), Vector3f::new(0.0, 0.0, 1.0));
        let local = t.inv_apply_ray(&ray);
        assert_eq!(local.origin(), Vector3f::new(0.0, 0.0, -10.0));
        assert_eq!(local.dir(), ray.dir());
    }
}
