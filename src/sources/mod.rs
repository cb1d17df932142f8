// Copyright @yucwang 2026

pub mod deposit;
pub mod isotropic;

use crate::core::error::TrackError;
use crate::core::material::Material;
use crate::core::photon::Photon;
use crate::core::volume::VolumeId;
use crate::math::constants::{ Float, Vector2f, Vector3f };
use crate::math::warp::square_to_uniform_sphere;

use rand::{ Rng, RngCore };

pub trait PhotonSource: Sync {
    fn emit(&self, rng: &mut dyn RngCore) -> Result<Vec<Photon>, TrackError>;
    fn describe(&self) -> String {
        String::from("PhotonSource")
    }
}

pub fn scintillation_photon(position: &Vector3f,
                            volume: VolumeId,
                            material: &Material,
                            rng: &mut dyn RngCore) -> Photon {
    let direction = square_to_uniform_sphere(&Vector2f::new(rng.gen::<Float>(), rng.gen::<Float>()));
    let polarization = square_to_uniform_sphere(&Vector2f::new(rng.gen::<Float>(), rng.gen::<Float>()));
    let (wavelength, time) = match material.scintillation() {
        Some(s) => (s.sample_wavelength(rng.gen::<Float>()), s.sample_emission_time(rng.gen::<Float>())),
        None => (0.0, 0.0),
    };
    Photon::new(*position, wavelength, direction, polarization, time, volume)
}
