// Copyright @yucwang 2026

use crate::core::volume::VolumeId;
use crate::math::constants::{ Float, Vector3f };

// An optical photon in flight. Lengths are µm, times ns.
#[derive(Debug, Clone)]
pub struct Photon {
    pub position: Vector3f,
    pub wavelength: Float,
    pub direction: Vector3f,
    pub polarization: Vector3f,
    pub time: Float,
    pub distance: Float,
    pub weight: Float,
    pub volume: VolumeId,
    alive: bool,
}

impl Photon {
    pub fn new(position: Vector3f,
               wavelength: Float,
               direction: Vector3f,
               polarization: Vector3f,
               time: Float,
               volume: VolumeId) -> Self {
        Self {
            position,
            wavelength,
            direction: direction.normalize(),
            polarization: polarization.normalize(),
            time,
            distance: 0.0,
            weight: 1.0,
            volume,
            alive: true,
        }
    }

    pub fn is_alive(&self) -> bool {
        self.alive
    }

    pub fn kill(&mut self) {
        self.alive = false;
    }
}
