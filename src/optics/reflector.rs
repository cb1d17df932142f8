// Copyright @yucwang 2026

use crate::core::error::TrackError;
use crate::core::history::InteractionType;
use crate::core::material::ReflectorModel;
use crate::math::constants::{ Float, Vector2f, Vector3f };
use crate::math::frame::Frame;
use crate::math::warp::square_to_uniform_hemisphere;
use crate::optics::fresnel::{ cos_incidence, InteractionOutcome };

use rand::{ Rng, RngCore };
use rand_distr::{ Distribution, Normal };

/// Diffuse reflector response: a reflectivity draw, then a Lambertian or specular-lobe
/// direction. Light that is not reflected passes straight through.
pub fn interact_with_reflector(model: &ReflectorModel,
                               direction: &Vector3f,
                               polarization: &Vector3f,
                               normal: &Vector3f,
                               rng: &mut dyn RngCore) -> Result<InteractionOutcome, TrackError> {
    let cos_i = cos_incidence(direction, normal)?;
    let incidence_deg = cos_i.max(-1.0).min(1.0).acos().to_degrees();

    if rng.gen::<Float>() >= model.reflectivity {
        let sin_t = (1.0 - cos_i * cos_i).max(0.0).sqrt();
        return Ok(InteractionOutcome {
            interaction: InteractionType::Transmission,
            cos_incidence: cos_i,
            sin_transmission: Some(sin_t),
            direction: *direction,
            polarization: *polarization,
            out_angle: sin_t.min(1.0).asin(),
        });
    }

    let new_direction = if rng.gen::<Float>() < model.lambertian.fraction(incidence_deg) {
        lambertian_direction(normal, rng)
    } else {
        let sigma = model.lobe.sigma(incidence_deg);
        specular_lobe_direction(normal, direction, incidence_deg, sigma, rng)?
    };

    Ok(InteractionOutcome {
        interaction: InteractionType::Reflection,
        cos_incidence: cos_i,
        sin_transmission: None,
        direction: new_direction,
        polarization: *polarization,
        out_angle: new_direction.dot(normal).max(-1.0).min(1.0).acos(),
    })
}

/// Cosine-weighted direction about `normal`, by rejection from the uniform hemisphere.
pub fn lambertian_direction(normal: &Vector3f, rng: &mut dyn RngCore) -> Vector3f {
    loop {
        let u = Vector2f::new(rng.gen::<Float>(), rng.gen::<Float>());
        let candidate = square_to_uniform_hemisphere(&u, normal);
        if rng.gen::<Float>() < candidate.dot(normal) {
            return candidate;
        }
    }
}

/// Polar angle drawn around the incidence angle and azimuth around the incidence plane,
/// both Gaussian with `sigma` degrees. Polar angles outside [0, 90] are redrawn.
pub fn specular_lobe_direction(normal: &Vector3f,
                               direction: &Vector3f,
                               incidence_deg: Float,
                               sigma: Float,
                               rng: &mut dyn RngCore) -> Result<Vector3f, TrackError> {
    let polar_dist = Normal::new(incidence_deg, sigma)
        .map_err(|e| TrackError::InvalidDistribution(e.to_string()))?;
    let azimuth_dist = Normal::new(0.0, sigma)
        .map_err(|e| TrackError::InvalidDistribution(e.to_string()))?;

    let polar = loop {
        let candidate: Float = polar_dist.sample(rng);
        if (0.0..=90.0).contains(&candidate) {
            break candidate;
        }
    };
    let azimuth: Float = azimuth_dist.sample(rng);

    let frame = Frame::from_incidence(normal, direction);
    Ok(frame.from_spherical(polar.to_radians(), azimuth.to_radians()).normalize())
}
