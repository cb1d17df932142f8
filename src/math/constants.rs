/* Copyright 2020 @Yuchen Wong */

use nalgebra as na;

pub type Float = f64;

pub type Vector2f = na::Vector2<Float>;
pub type Vector3f = na::Vector3<Float>;
pub type Matrix4f = na::Matrix4<Float>;

pub const EPSILON: Float = 1e-9;
pub const PI: Float = std::f64::consts::PI;
pub const FLOAT_MAX: Float = std::f64::MAX;
pub const FLOAT_MIN: Float = std::f64::MIN;

// Speed of light in vacuum, µm/ns.
pub const SPEED_OF_LIGHT: Float = 299792458e-3;

// Microns per millimeter.
pub const UM_PER_MM: Float = 1e3;

// Rounds to 1e-9, the precision every distance and boundary comparison is made at.
pub fn round_to_nano(x: Float) -> Float {
    (x * 1e9).round() / 1e9
}

pub fn round_vector_to_nano(v: &Vector3f) -> Vector3f {
    Vector3f::new(round_to_nano(v.x), round_to_nano(v.y), round_to_nano(v.z))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_to_nano() {
        assert_eq!(round_to_nano(2500.0000000004), 2500.0);
        assert_eq!(round_to_nano(-0.0000000016), -0.000000002);
        assert_eq!(round_to_nano(1.5), 1.5);
    }
}
