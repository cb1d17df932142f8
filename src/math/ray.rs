// Copyright 2020 @TwoCookingMice

use super::constants::{ Float, Vector3f, FLOAT_MAX };

#[derive(Debug, Copy, Clone)]
pub struct Ray3f {
    origin: Vector3f,
    dir: Vector3f,
    t_min: Float,
    t_max: Float,
}

impl Ray3f {
    pub fn new(origin: Vector3f, dir: Vector3f) -> Self {
        Self::segment(origin, dir, 0.0, FLOAT_MAX)
    }

    pub fn segment(origin: Vector3f, dir: Vector3f, t_min: Float, t_max: Float) -> Self {
        Self { origin, dir: dir.normalize(), t_min, t_max }
    }

    pub fn origin(&self) -> Vector3f {
        self.origin
    }

    pub fn dir(&self) -> Vector3f {
        self.dir
    }

    pub fn span(&self) -> (Float, Float) {
        (self.t_min, self.t_max)
    }

    pub fn at(&self, t: Float) -> Vector3f {
        self.origin + self.dir * t
    }

    pub fn covers(&self, t: Float) -> bool {
        t >= self.t_min && t <= self.t_max
    }

    pub fn clipped(&self, t_max: Float) -> Self {
        Self { t_max: t_max.min(self.t_max), ..*self }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_direction_is_normalized() {
        let ray = Ray3f::new(Vector3f::new(0.0, 0.0, 1500.0), Vector3f::new(3.0, 0.0, 4.0));
        assert!((ray.dir() - Vector3f::new(0.6, 0.0, 0.8)).norm() < 1e-12);
        assert!((ray.at(5.0) - Vector3f::new(3.0, 0.0, 1504.0)).norm() < 1e-12);
        assert!(ray.covers(1e12));
        assert!(!ray.covers(-1e-3));
    }

    #[test]
    fn test_clipped_segment() {
        let ray = Ray3f::segment(Vector3f::zeros(), Vector3f::new(0.0, 0.0, 1.0), 1.0, 10.0);
        assert!(ray.covers(5.0));
        assert!(!ray.covers(0.5));

        let short = ray.clipped(4.0);
        assert_eq!(short.span(), (1.0, 4.0));
        assert!(!short.covers(5.0));
        assert_eq!(short.clipped(20.0).span(), (1.0, 4.0));
    }
}
