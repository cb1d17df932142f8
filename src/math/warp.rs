// Copyright @yucwang 2023

use super::constants::{ PI, Float, Vector2f, Vector3f };

pub fn square_to_uniform_sphere(u: &Vector2f) -> Vector3f {
    let phi: Float = 2.0 * PI * u.x;
    let gamma: Float = 2.0 * u.y - 1.0;
    let r: Float = (1.0 - gamma * gamma).max(0.0).sqrt();

    Vector3f::new(r * phi.cos(), r * phi.sin(), gamma).normalize()
}

pub fn square_to_uniform_hemisphere(u: &Vector2f, n: &Vector3f) -> Vector3f {
    let v = square_to_uniform_sphere(u);
    if v.dot(n) < 0.0 { -v } else { v }
}
