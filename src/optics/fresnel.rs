// Copyright @yucwang 2026

use crate::core::error::TrackError;
use crate::core::history::InteractionType;
use crate::math::constants::{ Float, Vector3f };

use rand::{ Rng, RngCore };

/// Result of one boundary interaction.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct InteractionOutcome {
    pub interaction: InteractionType,
    pub cos_incidence: Float,
    /// `None` when refraction is impossible.
    pub sin_transmission: Option<Float>,
    pub direction: Vector3f,
    pub polarization: Vector3f,
    /// Radians.
    pub out_angle: Float,
}

impl InteractionOutcome {
    /// Radians.
    pub fn incidence_angle(&self) -> Float {
        self.cos_incidence.max(-1.0).min(1.0).acos()
    }
}

/// Cosine of the incidence angle. `normal` must face the incoming photon.
pub fn cos_incidence(direction: &Vector3f, normal: &Vector3f) -> Result<Float, TrackError> {
    let cos_d = direction.dot(normal);
    if cos_d > 0.0 {
        return Err(TrackError::IncidenceBeyondNormal(cos_d));
    }
    Ok(-cos_d)
}

/// Snell's law. `None` means total internal reflection.
pub fn sin_transmission(cos_i: Float, eta_i: Float, eta_t: Float) -> Result<Option<Float>, TrackError> {
    let sin_i = (1.0 - cos_i * cos_i).max(0.0).sqrt();
    let sin_t = (eta_i / eta_t) * sin_i;
    if sin_t > 1.0 {
        return Ok(None);
    }
    if !(sin_t >= 0.0) {
        return Err(TrackError::TransmissionAngleOutOfRange(sin_t));
    }
    Ok(Some(sin_t))
}

/// Unpolarized Fresnel reflectance.
pub fn reflectance(cos_i: Float, sin_t: Float, eta_i: Float, eta_t: Float) -> Result<Float, TrackError> {
    let cos_t = (1.0 - sin_t * sin_t).max(0.0).sqrt();
    let r_perp = (eta_i * cos_i - eta_t * cos_t) / (eta_i * cos_i + eta_t * cos_t);
    let r_parl = (eta_i * cos_t - eta_t * cos_i) / (eta_i * cos_t + eta_t * cos_i);
    let r = 0.5 * (r_perp * r_perp + r_parl * r_parl);
    if !(r >= 0.0 && r <= 1.0) {
        return Err(TrackError::ReflectanceOutOfRange(r));
    }
    Ok(r)
}

pub fn reflect(direction: &Vector3f, normal: &Vector3f) -> Vector3f {
    (direction - 2.0 * direction.dot(normal) * normal).normalize()
}

pub fn refract(direction: &Vector3f,
               normal: &Vector3f,
               cos_i: Float,
               sin_t: Float,
               eta_i: Float,
               eta_t: Float) -> Vector3f {
    let cos_t = (1.0 - sin_t * sin_t).max(0.0).sqrt();
    ((eta_i / eta_t) * (direction + cos_i * normal) - cos_t * normal).normalize()
}

/// Interaction at a smooth dielectric boundary between indices `eta_i` (photon side) and `eta_t`.
pub fn interact(direction: &Vector3f,
                polarization: &Vector3f,
                normal: &Vector3f,
                eta_i: Float,
                eta_t: Float,
                rng: &mut dyn RngCore) -> Result<InteractionOutcome, TrackError> {
    let u = rng.gen::<Float>();
    interact_with_sample(direction, polarization, normal, eta_i, eta_t, u)
}

/// As `interact`, with the reflection draw `u` in [0, 1) supplied by the caller.
pub fn interact_with_sample(direction: &Vector3f,
                            polarization: &Vector3f,
                            normal: &Vector3f,
                            eta_i: Float,
                            eta_t: Float,
                            u: Float) -> Result<InteractionOutcome, TrackError> {
    let cos_i = cos_incidence(direction, normal)?;
    let incidence = cos_i.max(-1.0).min(1.0).acos();

    let sin_t = match sin_transmission(cos_i, eta_i, eta_t)? {
        Some(sin_t) => sin_t,
        None => {
            return Ok(InteractionOutcome {
                interaction: InteractionType::TotalInternalReflection,
                cos_incidence: cos_i,
                sin_transmission: None,
                direction: reflect(direction, normal),
                polarization: *polarization,
                out_angle: incidence,
            });
        }
    };

    let r = reflectance(cos_i, sin_t, eta_i, eta_t)?;
    let outcome = if u < r {
        InteractionOutcome {
            interaction: InteractionType::Reflection,
            cos_incidence: cos_i,
            sin_transmission: Some(sin_t),
            direction: reflect(direction, normal),
            polarization: *polarization,
            out_angle: sin_t.min(1.0).asin(),
        }
    } else {
        InteractionOutcome {
            interaction: InteractionType::Transmission,
            cos_incidence: cos_i,
            sin_transmission: Some(sin_t),
            direction: refract(direction, normal, cos_i, sin_t, eta_i, eta_t),
            polarization: *polarization,
            out_angle: sin_t.min(1.0).asin(),
        }
    };
    Ok(outcome)
}
