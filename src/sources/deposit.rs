// Copyright @yucwang 2026

use crate::core::error::TrackError;
use crate::core::material::Material;
use crate::core::photon::Photon;
use crate::core::volume::VolumeId;
use crate::math::constants::{ Float, Vector3f };
use crate::sources::{ scintillation_photon, PhotonSource };

use rand::RngCore;
use rand_distr::{ Distribution, Normal };
use std::sync::Arc;

pub struct EnergyDeposit {
    position: Vector3f,
    volume: VolumeId,
    material: Arc<Material>,
    // keV
    energy: Float,
}

impl EnergyDeposit {
    pub fn new(position: Vector3f, volume: VolumeId, material: Arc<Material>, energy: Float) -> Self {
        Self { position, volume, material, energy }
    }

    pub fn mean_photon_count(&self) -> Float {
        let per_kev = self.material.scintillation().map(|s| s.photons_per_kev()).unwrap_or(0.0);
        self.energy * per_kev
    }

    pub fn sample_photon_count(&self, rng: &mut dyn RngCore) -> Result<usize, TrackError> {
        let mean = self.mean_photon_count();
        let normal = Normal::new(mean, mean.max(0.0).sqrt())
            .map_err(|e| TrackError::InvalidDistribution(e.to_string()))?;
        let count: Float = normal.sample(rng);
        Ok(count.round().max(0.0) as usize)
    }
}

impl PhotonSource for EnergyDeposit {
    fn emit(&self, rng: &mut dyn RngCore) -> Result<Vec<Photon>, TrackError> {
        let count = self.sample_photon_count(rng)?;
        Ok((0..count)
            .map(|_| scintillation_photon(&self.position, self.volume, &self.material, rng))
            .collect())
    }

    fn describe(&self) -> String {
        format!("EnergyDeposit[{} keV at {:?} in {}]", self.energy, self.position, self.material.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::material::MaterialLibrary;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_photon_count_follows_light_yield() {
        let library = MaterialLibrary::builtin();
        let deposit = EnergyDeposit::new(Vector3f::zeros(), VolumeId(1), library.get("EJ-204").unwrap(), 10.0);
        assert!((deposit.mean_photon_count() - 104.0).abs() < 1e-9);

        let mut rng = StdRng::seed_from_u64(8);
        let runs = 400;
        let mut total = 0;
        for _ in 0..runs {
            total += deposit.emit(&mut rng).unwrap().len();
        }
        let mean = total as Float / runs as Float;
        assert!((mean - 104.0).abs() < 3.0, "mean {}", mean);
    }

    #[test]
    fn test_dark_material_emits_nothing() {
        let library = MaterialLibrary::builtin();
        let deposit = EnergyDeposit::new(Vector3f::zeros(), VolumeId(1), library.get("EJ-550").unwrap(), 50.0);
        let mut rng = StdRng::seed_from_u64(9);
        assert_eq!(deposit.sample_photon_count(&mut rng).unwrap(), 0);
    }

    #[test]
    fn test_negative_energy_emits_nothing() {
        let library = MaterialLibrary::builtin();
        let deposit = EnergyDeposit::new(Vector3f::zeros(), VolumeId(1), library.get("EJ-204").unwrap(), -5.0);
        let mut rng = StdRng::seed_from_u64(10);
        assert_eq!(deposit.sample_photon_count(&mut rng).unwrap(), 0);
    }
}
