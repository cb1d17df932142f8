// Copyright @yucwang 2023

use crate::math::constants::{ Float, Vector3f };

#[derive(Debug, Copy, Clone)]
pub struct Frame {
    pub x: Vector3f,
    pub y: Vector3f,
    pub z: Vector3f
}

impl Default for Frame {
    fn default() -> Frame {
        Frame {
            x: Vector3f::new(1.0, 0.0, 0.0),
            y: Vector3f::new(0.0, 1.0, 0.0),
            z: Vector3f::new(0.0, 0.0, 1.0)
        }
    }
}

impl Frame {
    pub fn from_normal(n: &Vector3f) -> Frame {
        let up = if n.z.abs() < 0.999 {
            Vector3f::new(0.0, 0.0, 1.0)
        } else {
            Vector3f::new(1.0, 0.0, 0.0)
        };
        let x = n.cross(&up).normalize();
        let y = n.cross(&x).normalize();
        Frame { x, y, z: *n }
    }

    pub fn from_incidence(n: &Vector3f, dir: &Vector3f) -> Frame {
        let perp = n.cross(dir);
        if perp.norm() < 1e-12 {
            return Frame::from_normal(n);
        }
        let perp = perp.normalize();
        let para = perp.cross(n).normalize();
        Frame { x: para, y: perp, z: *n }
    }

    pub fn from_local(&self, v: &Vector3f) -> Vector3f {
        v.x * self.x + v.y * self.y + v.z * self.z
    }

    pub fn from_spherical(&self, theta: Float, phi: Float) -> Vector3f {
        let (sin_t, cos_t) = theta.sin_cos();
        let (sin_p, cos_p) = phi.sin_cos();
        self.from_local(&Vector3f::new(sin_t * cos_p, sin_t * sin_p, cos_t))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_orthonormal(f: &Frame) {
        assert!((f.x.norm() - 1.0).abs() < 1e-12);
        assert!((f.y.norm() - 1.0).abs() < 1e-12);
        assert!(f.x.dot(&f.y).abs() < 1e-12);
        assert!(f.x.dot(&f.z).abs() < 1e-12);
        assert!(f.y.dot(&f.z).abs() < 1e-12);
    }

    #[test]
    fn test_incidence_frame() {
        let n = Vector3f::new(0.0, 0.0, 1.0);
        let d = Vector3f::new(1.0, 0.0, -1.0).normalize();
        let f = Frame::from_incidence(&n, &d);
        assert_orthonormal(&f);
        // The incidence direction has no component perpendicular to the incidence plane.
        assert!(d.dot(&f.y).abs() < 1e-12);
    }

    #[test]
    fn test_normal_incidence_falls_back() {
        let n = Vector3f::new(0.0, 0.0, 1.0);
        let f = Frame::from_incidence(&n, &Vector3f::new(0.0, 0.0, -1.0));
        assert_orthonormal(&f);
    }

    #[test]
    fn test_spherical_round_trip() {
        let f = Frame::from_normal(&Vector3f::new(0.0, 1.0, 0.0));
        let v = f.from_spherical(0.0, 1.0);
        assert!((v - f.z).norm() < 1e-12);
        let w = Vector3f::new(0.3, -0.4, 0.5);
        let local = Vector3f::new(w.dot(&f.x), w.dot(&f.y), w.dot(&f.z));
        assert!((f.from_local(&local) - w).norm() < 1e-12);
    }
}
