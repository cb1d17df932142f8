// Copyright @yucwang 2026

use crate::core::face::FaceDirection;
use crate::core::material::Material;
use crate::shapes::cuboid::Cuboid;
use crate::surfaces::patch::SurfacePatch;

use std::fmt;
use std::sync::Arc;

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct VolumeId(pub usize);

impl fmt::Display for VolumeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum VolumeKind {
    Ordinary,
    Ambient,
    Shell,
    Detector,
}

impl VolumeKind {
    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim() {
            "ordinary" => Some(VolumeKind::Ordinary),
            "ambient" => Some(VolumeKind::Ambient),
            "shell" => Some(VolumeKind::Shell),
            "detector" => Some(VolumeKind::Detector),
            _ => None,
        }
    }
}

pub struct Volume {
    name: String,
    kind: VolumeKind,
    material: Arc<Material>,
    cuboid: Cuboid,
    patches: [Option<Arc<SurfacePatch>>; 6],
    touching: [Option<VolumeId>; 6],
}

impl Volume {
    pub fn new(name: &str, kind: VolumeKind, material: Arc<Material>, cuboid: Cuboid) -> Self {
        Self {
            name: name.to_string(),
            kind,
            material,
            cuboid,
            patches: Default::default(),
            touching: [None; 6],
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> VolumeKind {
        self.kind
    }

    pub fn material(&self) -> &Material {
        &self.material
    }

    pub fn cuboid(&self) -> &Cuboid {
        &self.cuboid
    }

    pub fn is_enclosing(&self) -> bool {
        matches!(self.kind, VolumeKind::Ambient | VolumeKind::Shell)
    }

    pub fn is_detector(&self) -> bool {
        self.kind == VolumeKind::Detector
    }

    pub fn has_patches(&self) -> bool {
        self.patches.iter().any(|p| p.is_some())
    }

    pub fn patch(&self, face: FaceDirection) -> Option<&Arc<SurfacePatch>> {
        self.patches[face.index()].as_ref()
    }

    pub fn touching(&self, face: FaceDirection) -> Option<VolumeId> {
        self.touching[face.index()]
    }

    pub(crate) fn set_patch(&mut self, face: FaceDirection, patch: Arc<SurfacePatch>) {
        self.patches[face.index()] = Some(patch);
    }

    pub(crate) fn set_touching(&mut self, face: FaceDirection, neighbor: VolumeId) {
        self.touching[face.index()] = Some(neighbor);
    }
}
