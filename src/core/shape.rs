// Copyright @yucwang 2023

use crate::math::aabb::AABB;
use crate::math::constants::{ Float, Vector3f };
use crate::math::ray::Ray3f;

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct SurfaceHit {
    pub t: Float,
    pub point: Vector3f,
    pub normal: Vector3f,
}

pub trait Shape: Send + Sync {
    fn bounding_box(&self) -> AABB;
    fn ray_intersection(&self, ray: &Ray3f) -> Option<SurfaceHit>;
}
