// Copyright 2020 @TwoCookingMice

use super::constants::{ Float, Vector3f, FLOAT_MAX, FLOAT_MIN };
use super::ray::Ray3f;

const PARALLEL_EPSILON: Float = 1e-12;

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct SlabSpan {
    pub t_enter: Float,
    pub enter_axis: usize,
    pub t_exit: Float,
    pub exit_axis: usize,
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct AABB {
    pub p_min: Vector3f,
    pub p_max: Vector3f,
}

impl Default for AABB {
    fn default() -> Self {
        Self { p_min: Vector3f::repeat(FLOAT_MAX), p_max: Vector3f::repeat(FLOAT_MIN) }
    }
}

impl AABB {
    pub fn new(a: Vector3f, b: Vector3f) -> Self {
        Self { p_min: a.inf(&b), p_max: a.sup(&b) }
    }

    pub fn from_center_size(center: Vector3f, size: Vector3f) -> Self {
        let half = 0.5 * size;
        Self::new(center - half, center + half)
    }

    pub fn center(&self) -> Vector3f {
        0.5 * (self.p_min + self.p_max)
    }

    pub fn extent(&self) -> Vector3f {
        self.p_max - self.p_min
    }

    pub fn widest_axis(&self) -> usize {
        self.extent().imax()
    }

    pub fn is_empty(&self) -> bool {
        (0..3).any(|axis| self.p_min[axis] > self.p_max[axis])
    }

    pub fn expand_by_point(&mut self, p: &Vector3f) {
        self.p_min = self.p_min.inf(p);
        self.p_max = self.p_max.sup(p);
    }

    pub fn expand_by_aabb(&mut self, other: &AABB) {
        self.p_min = self.p_min.inf(&other.p_min);
        self.p_max = self.p_max.sup(&other.p_max);
    }

    // Crossing interval of the infinite line through `origin` along `dir`. When slabs
    // tie, the lowest axis bounds the interval.
    pub fn slab_span(&self, origin: &Vector3f, dir: &Vector3f) -> Option<SlabSpan> {
        if self.is_empty() {
            return None;
        }

        let mut enter: Option<(Float, usize)> = None;
        let mut exit: Option<(Float, usize)> = None;
        for axis in 0..3 {
            if dir[axis].abs() < PARALLEL_EPSILON {
                if origin[axis] < self.p_min[axis] || origin[axis] > self.p_max[axis] {
                    return None;
                }
                continue;
            }

            let t_low = (self.p_min[axis] - origin[axis]) / dir[axis];
            let t_high = (self.p_max[axis] - origin[axis]) / dir[axis];
            let (near, far) = if dir[axis] > 0.0 { (t_low, t_high) } else { (t_high, t_low) };
            if enter.map_or(true, |(t, _)| near > t) {
                enter = Some((near, axis));
            }
            if exit.map_or(true, |(t, _)| far < t) {
                exit = Some((far, axis));
            }
        }

        match (enter, exit) {
            (Some((t_enter, enter_axis)), Some((t_exit, exit_axis))) if t_enter <= t_exit => {
                Some(SlabSpan { t_enter, enter_axis, t_exit, exit_axis })
            }
            _ => None,
        }
    }

    pub fn hit_by(&self, ray: &Ray3f) -> bool {
        let (t_min, t_max) = ray.span();
        self.slab_span(&ray.origin(), &ray.dir())
            .map_or(false, |span| span.t_exit >= t_min && span.t_enter <= t_max)
    }
}
