// Copyright @yucwang 2026

use crate::core::error::GeometryError;
use crate::core::face::FaceDirection;
use crate::core::material::Material;
use crate::core::volume::{ Volume, VolumeId, VolumeKind };
use crate::math::constants::{ round_to_nano, round_vector_to_nano, Float, Vector3f, UM_PER_MM };
use crate::math::ray::Ray3f;
use crate::shapes::cuboid::Cuboid;
use crate::surfaces::patch::SurfacePatch;

use log::{ info, warn };
use std::collections::HashMap;
use std::sync::Arc;

pub struct GeometryGraph {
    volumes: Vec<Volume>,
    ids: HashMap<String, VolumeId>,
    ambient: VolumeId,
}

impl GeometryGraph {
    pub fn volume(&self, id: VolumeId) -> &Volume {
        &self.volumes[id.0]
    }

    pub fn id(&self, name: &str) -> Option<VolumeId> {
        self.ids.get(name).copied()
    }

    pub fn ambient(&self) -> VolumeId {
        self.ambient
    }

    pub fn len(&self) -> usize {
        self.volumes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.volumes.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (VolumeId, &Volume)> {
        self.volumes.iter().enumerate().map(|(i, v)| (VolumeId(i), v))
    }
}

pub struct GeometryBuilder {
    volumes: Vec<Volume>,
    ids: HashMap<String, VolumeId>,
    lenient: bool,
}

impl Default for GeometryBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl GeometryBuilder {
    pub fn new() -> Self {
        Self { volumes: Vec::new(), ids: HashMap::new(), lenient: false }
    }

    pub fn lenient(mut self, lenient: bool) -> Self {
        self.lenient = lenient;
        self
    }

    // `center` and `size` are in mm.
    pub fn add_volume(&mut self,
                      name: &str,
                      kind: VolumeKind,
                      material: Arc<Material>,
                      center: Vector3f,
                      size: Vector3f) -> Result<VolumeId, GeometryError> {
        if self.ids.contains_key(name) {
            return Err(GeometryError::DuplicateVolume(name.to_string()));
        }
        if size.iter().any(|s| !(*s > 0.0)) {
            return Err(GeometryError::DegenerateBounds(name.to_string()));
        }

        let center = round_vector_to_nano(&(center * UM_PER_MM));
        let size = round_vector_to_nano(&(size * UM_PER_MM));
        let id = VolumeId(self.volumes.len());
        self.volumes.push(Volume::new(name, kind, material, Cuboid::new(center, size)));
        self.ids.insert(name.to_string(), id);
        Ok(id)
    }

    pub fn add_patch(&mut self,
                     volume: &str,
                     face: FaceDirection,
                     patch: Arc<SurfacePatch>) -> Result<(), GeometryError> {
        let id = self.ids.get(volume)
            .copied()
            .ok_or_else(|| GeometryError::UnknownVolume(volume.to_string()))?;
        if patch.face() != face {
            return Err(GeometryError::PatchFaceMismatch {
                volume: volume.to_string(),
                face,
                patch: patch.face(),
            });
        }
        self.volumes[id.0].set_patch(face, patch);
        Ok(())
    }

    pub fn build(mut self) -> Result<GeometryGraph, GeometryError> {
        let ambients: Vec<VolumeId> = self.volumes.iter()
            .enumerate()
            .filter(|(_, v)| v.kind() == VolumeKind::Ambient)
            .map(|(i, _)| VolumeId(i))
            .collect();
        if ambients.len() != 1 {
            return Err(GeometryError::AmbientCount(ambients.len()));
        }
        let ambient = ambients[0];

        let issues = self.check_placement();
        if issues > 0 {
            if self.lenient {
                warn!("Continuing with {} misplaced volume(s).", issues);
            } else {
                return Err(GeometryError::Placement(issues));
            }
        }

        self.identify_touching(ambient)?;

        Ok(GeometryGraph { volumes: self.volumes, ids: self.ids, ambient })
    }

    fn check_placement(&self) -> usize {
        let mut misplaced = 0;
        for (i, current) in self.volumes.iter().enumerate() {
            if current.is_enclosing() {
                continue;
            }

            let mut issues = 0;
            for face in FaceDirection::ALL.iter() {
                let nearest = self.cast_from_center(i, *face, |v| !v.is_enclosing());
                let (t, others) = match nearest {
                    Some(n) => n,
                    None => continue,
                };
                let half = round_to_nano(current.cuboid().size()[face.axis()]) / 2.0;
                let other = self.volumes[others[0].0].name();
                if t < half {
                    warn!("{} intersects with {}.", other, current.name());
                    issues += 1;
                } else if t > half {
                    warn!("{} is not in perfect touch with {} across {}.", other, current.name(), face);
                    issues += 1;
                }
            }

            if issues == 0 {
                info!("Placement of {}: OK", current.name());
            } else {
                misplaced += 1;
            }
        }
        misplaced
    }

    fn identify_touching(&mut self, ambient: VolumeId) -> Result<(), GeometryError> {
        for i in 0..self.volumes.len() {
            if self.volumes[i].is_enclosing() {
                continue;
            }

            let mut table = Vec::with_capacity(6);
            for face in FaceDirection::ALL.iter() {
                let neighbor = match self.cast_from_center(i, *face, |v| v.kind() != VolumeKind::Ambient) {
                    None => ambient,
                    Some((_, candidates)) if candidates.len() == 1 => candidates[0],
                    Some((_, candidates)) => {
                        // A tie comes from a shell sharing the boundary.
                        match self.cast_from_center(i, *face, |v| !v.is_enclosing()) {
                            Some((_, rest)) if rest.len() == 1 => rest[0],
                            _ => {
                                return Err(GeometryError::AmbiguousNeighbor {
                                    volume: self.volumes[i].name().to_string(),
                                    face: *face,
                                    candidates: candidates.iter()
                                        .map(|c| self.volumes[c.0].name().to_string())
                                        .collect(),
                                });
                            }
                        }
                    }
                };
                table.push((*face, neighbor));
            }

            let listing: Vec<String> = table.iter()
                .map(|(face, id)| format!("{}: {}", face, self.volumes[id.0].name()))
                .collect();
            info!("Touching volumes of {}: {}", self.volumes[i].name(), listing.join(", "));

            for (face, neighbor) in table {
                self.volumes[i].set_touching(face, neighbor);
            }
        }
        Ok(())
    }

    fn cast_from_center<F>(&self, index: usize, face: FaceDirection, filter: F) -> Option<(Float, Vec<VolumeId>)>
    where
        F: Fn(&Volume) -> bool,
    {
        let origin = round_vector_to_nano(&self.volumes[index].cuboid().center());
        let ray = Ray3f::new(origin, face.normal());

        let mut nearest: Option<(Float, Vec<VolumeId>)> = None;
        for (j, other) in self.volumes.iter().enumerate() {
            if j == index || !filter(other) {
                continue;
            }
            for hit in other.cuboid().ray_hits(&ray) {
                match &mut nearest {
                    Some((t, ids)) if hit.t == *t => {
                        if !ids.contains(&VolumeId(j)) {
                            ids.push(VolumeId(j));
                        }
                    }
                    Some((t, _)) if hit.t > *t => {}
                    _ => nearest = Some((hit.t, vec![VolumeId(j)])),
                }
            }
        }
        nearest
    }
}
