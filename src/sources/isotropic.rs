// Copyright @yucwang 2026

use crate::core::error::TrackError;
use crate::core::material::Material;
use crate::core::photon::Photon;
use crate::core::volume::VolumeId;
use crate::math::constants::Vector3f;
use crate::sources::{ scintillation_photon, PhotonSource };

use rand::RngCore;
use std::sync::Arc;

pub struct IsotropicPointSource {
    position: Vector3f,
    volume: VolumeId,
    material: Arc<Material>,
    count: usize,
}

impl IsotropicPointSource {
    // `position` in µm.
    pub fn new(position: Vector3f, volume: VolumeId, material: Arc<Material>, count: usize) -> Self {
        Self { position, volume, material, count }
    }
}

impl PhotonSource for IsotropicPointSource {
    fn emit(&self, rng: &mut dyn RngCore) -> Result<Vec<Photon>, TrackError> {
        Ok((0..self.count)
            .map(|_| scintillation_photon(&self.position, self.volume, &self.material, rng))
            .collect())
    }

    fn describe(&self) -> String {
        format!("IsotropicPointSource[{} photons at {:?} in {}]", self.count, self.position, self.material.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::material::MaterialLibrary;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_emits_count() {
        let library = MaterialLibrary::builtin();
        let source = IsotropicPointSource::new(Vector3f::zeros(), VolumeId(1), library.get("EJ-204").unwrap(), 64);
        let mut rng = StdRng::seed_from_u64(5);
        let photons = source.emit(&mut rng).unwrap();
        assert_eq!(photons.len(), 64);
        let mean = photons.iter().fold(Vector3f::zeros(), |acc, p| acc + p.direction) / 64.0;
        assert!(mean.norm() < 0.4);

        let none = IsotropicPointSource::new(Vector3f::zeros(), VolumeId(1), library.get("EJ-204").unwrap(), 0);
        assert!(none.emit(&mut rng).unwrap().is_empty());
    }
}
