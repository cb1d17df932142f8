// Copyright @yucwang 2026

use crate::math::constants::{ Float, UM_PER_MM };
use crate::math::distribution::DiscreteDistribution;

use std::collections::HashMap;
use std::sync::Arc;

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct LambertianFit {
    pub a1: Float,
    pub b1: Float,
    pub a2: Float,
    pub b2: Float,
}

impl LambertianFit {
    pub fn fraction(&self, incidence_deg: Float) -> Float {
        self.a1 * (self.b1 * incidence_deg).exp() + self.a2 * (self.b2 * incidence_deg).exp()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SpecularLobeTable {
    sigmas: Vec<Float>,
}

impl SpecularLobeTable {
    pub fn new(angles: &[Float], sigmas: &[Float]) -> Option<Self> {
        if angles.is_empty() || angles.len() != sigmas.len() {
            return None;
        }
        if angles.windows(2).any(|w| w[1] <= w[0]) || sigmas.iter().any(|s| !(*s > 0.0)) {
            return None;
        }

        let table = (0..=90)
            .map(|deg| {
                let x = deg as Float;
                if x <= angles[0] {
                    return sigmas[0];
                }
                let last = angles.len() - 1;
                if x >= angles[last] {
                    return sigmas[last];
                }
                let hi = angles.partition_point(|a| *a < x);
                let lo = hi - 1;
                let f = (x - angles[lo]) / (angles[hi] - angles[lo]);
                sigmas[lo] + f * (sigmas[hi] - sigmas[lo])
            })
            .collect();

        Some(Self { sigmas: table })
    }

    pub fn sigma(&self, incidence_deg: Float) -> Float {
        let idx = incidence_deg.round().max(0.0).min(90.0) as usize;
        self.sigmas[idx]
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ReflectorModel {
    pub reflectivity: Float,
    pub lambertian: LambertianFit,
    pub lobe: SpecularLobeTable,
}

#[derive(Debug, Clone)]
pub struct Scintillation {
    // Photons per MeV.
    pub light_yield: Float,
    pub rise_time: Float,
    pub fall_time: Float,
    emission: DiscreteDistribution,
    time_response: DiscreteDistribution,
}

const TIME_RESPONSE_END: Float = 32.0;
const TIME_RESPONSE_STEP: Float = 0.05;

impl Scintillation {
    pub fn new(light_yield: Float,
               rise_time: Float,
               fall_time: Float,
               wavelengths: Vec<Float>,
               amplitudes: &[Float]) -> Option<Self> {
        if !(rise_time > 0.0) || !(fall_time > 0.0) || light_yield < 0.0 {
            return None;
        }
        let emission = DiscreteDistribution::new(wavelengths, amplitudes)?;

        let steps = (TIME_RESPONSE_END / TIME_RESPONSE_STEP).round() as usize;
        let times: Vec<Float> = (0..=steps)
            .map(|i| (i as Float * TIME_RESPONSE_STEP * 100.0).round() / 100.0)
            .collect();
        let response: Vec<Float> = times.iter()
            .map(|t| ((-t / fall_time).exp() - (-t / rise_time).exp()).max(0.0))
            .collect();
        let time_response = DiscreteDistribution::new(times, &response)?;

        Some(Self { light_yield, rise_time, fall_time, emission, time_response })
    }

    pub fn sample_wavelength(&self, u: Float) -> Float {
        self.emission.sample(u)
    }

    pub fn sample_emission_time(&self, u: Float) -> Float {
        self.time_response.sample(u)
    }

    pub fn photons_per_kev(&self) -> Float {
        self.light_yield * 1e-3
    }
}

#[derive(Debug, Clone)]
pub struct Material {
    name: String,
    refractive_index: Float,
    // mm
    attenuation_length: Float,
    reflector: Option<ReflectorModel>,
    scintillation: Option<Scintillation>,
}

impl Material {
    pub fn new(name: &str, refractive_index: Float, attenuation_length: Float) -> Self {
        Self {
            name: name.to_string(),
            refractive_index,
            attenuation_length,
            reflector: None,
            scintillation: None,
        }
    }

    pub fn with_reflector(mut self, reflector: ReflectorModel) -> Self {
        self.reflector = Some(reflector);
        self
    }

    pub fn with_scintillation(mut self, scintillation: Scintillation) -> Self {
        self.scintillation = Some(scintillation);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn refractive_index(&self) -> Float {
        self.refractive_index
    }

    pub fn attenuation_length(&self) -> Float {
        self.attenuation_length
    }

    pub fn reflector(&self) -> Option<&ReflectorModel> {
        self.reflector.as_ref()
    }

    pub fn scintillation(&self) -> Option<&Scintillation> {
        self.scintillation.as_ref()
    }

    pub fn transmittance(&self, distance: Float) -> Float {
        (-(distance / UM_PER_MM) / self.attenuation_length).exp()
    }
}

pub struct MaterialLibrary {
    materials: HashMap<String, Arc<Material>>,
}

impl MaterialLibrary {
    pub fn new() -> Self {
        Self { materials: HashMap::new() }
    }

    pub fn builtin() -> Self {
        let mut library = Self::new();
        library.insert(ej204());
        library.insert(Material::new("EJ-550", 1.46, 1600.0));
        library.insert(Material::new("SensLGlass", 1.53, 1600.0));
        library.insert(Material::new("Air", 1.0, 3000.0));
        library.insert(teflon());
        library
    }

    pub fn insert(&mut self, material: Material) -> Arc<Material> {
        let material = Arc::new(material);
        self.materials.insert(material.name().to_string(), material.clone());
        material
    }

    pub fn get(&self, name: &str) -> Option<Arc<Material>> {
        self.materials.get(name).cloned()
    }

    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.materials.keys().map(|k| k.as_str()).collect();
        names.sort();
        names
    }
}

impl Default for MaterialLibrary {
    fn default() -> Self {
        Self::builtin()
    }
}

// Eljen EJ-204 emission spectrum, (wavelength nm, relative amplitude).
const EJ204_EMISSION: [(Float, Float); 30] = [
    (380.0, 0.0439), (384.1, 0.0997), (388.2, 0.2394), (392.2, 0.4707), (396.3, 0.7274),
    (400.3, 0.8816), (404.4, 0.9681), (408.4, 0.9987), (412.5, 0.9428), (416.5, 0.7593),
    (420.6, 0.6064), (424.6, 0.5359), (428.7, 0.4920), (432.8, 0.4588), (436.8, 0.4215),
    (440.9, 0.3816), (444.9, 0.3311), (449.0, 0.2832), (453.0, 0.2274), (457.1, 0.1795),
    (461.1, 0.1423), (465.2, 0.1130), (469.2, 0.0891), (473.3, 0.0745), (477.4, 0.0638),
    (481.4, 0.0532), (485.5, 0.0465), (489.5, 0.0412), (493.6, 0.0332), (496.0, 0.0293),
];

fn ej204() -> Material {
    let wavelengths: Vec<Float> = EJ204_EMISSION.iter().map(|(w, _)| *w).collect();
    let amplitudes: Vec<Float> = EJ204_EMISSION.iter().map(|(_, a)| *a).collect();
    let material = Material::new("EJ-204", 1.58, 1600.0);
    match Scintillation::new(10400.0, 1.3, 2.0, wavelengths, &amplitudes) {
        Some(scintillation) => material.with_scintillation(scintillation),
        None => material,
    }
}

const TEFLON_LOBE_ANGLES: [Float; 7] = [0.0, 10.0, 30.0, 50.0, 62.0, 74.0, 90.0];
const TEFLON_LOBE_SIGMAS: [Float; 7] = [32.07, 25.97, 13.77, 13.4, 11.4, 7.60, 2.52];

fn teflon() -> Material {
    let material = Material::new("Teflon", 1.0, 3000.0);
    match SpecularLobeTable::new(&TEFLON_LOBE_ANGLES, &TEFLON_LOBE_SIGMAS) {
        Some(lobe) => material.with_reflector(ReflectorModel {
            reflectivity: 0.945,
            lambertian: LambertianFit { a1: -9.182e-5, b1: 0.09479, a2: 0.9799, b2: -9.27e-5 },
            lobe,
        }),
        None => material,
    }
}
