// Copyright @yucwang 2026

use crate::core::error::TrackError;
use crate::core::face::FaceDirection;
use crate::core::geometry::GeometryGraph;
use crate::core::volume::{ VolumeId, VolumeKind };
use crate::math::constants::{ Float, Vector3f, FLOAT_MAX };
use crate::math::ray::Ray3f;
use crate::shapes::cuboid::CuboidHit;

use log::trace;

/// The next boundary a photon reaches.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Crossing {
    pub point: Vector3f,
    /// Orientation of the boundary normal that faces the incoming photon.
    pub facing: FaceDirection,
    pub next: VolumeId,
}

impl Crossing {
    pub fn normal(&self) -> Vector3f {
        self.facing.normal()
    }
}

/// Finds the boundary crossed next from `position` along `direction`. `None` means the
/// photon leaves into open space.
pub fn next_crossing(geometry: &GeometryGraph,
                     position: &Vector3f,
                     direction: &Vector3f,
                     current: VolumeId) -> Result<Option<Crossing>, TrackError> {
    let ray = Ray3f::new(*position, *direction);
    let volume = geometry.volume(current);

    if !volume.is_enclosing() {
        // Inside a solid volume only its own exit matters.
        let exit = match volume.cuboid().ray_hits(&ray).into_iter().last() {
            Some(hit) => hit,
            None => return Ok(None),
        };
        let next = volume.touching(exit.face).ok_or_else(|| TrackError::MissingAdjacency {
            volume: volume.name().to_string(),
            face: exit.face,
        })?;
        trace!("{} exits {} through {} at {:?}", current, volume.name(), exit.face, exit.point);
        return Ok(Some(Crossing { point: exit.point, facing: exit.face.opposite(), next }));
    }

    let mut candidates: Vec<(VolumeId, CuboidHit)> = Vec::new();
    for (id, other) in geometry.iter() {
        for hit in other.cuboid().ray_hits(&ray) {
            candidates.push((id, hit));
        }
    }
    // A single crossing can only be the way out of the world.
    if candidates.len() <= 1 {
        return Ok(None);
    }

    // Several volumes at the same distance: a shell or a rough surface shares the boundary.
    if nearest(&candidates).len() > 1 {
        candidates.retain(|(id, _)| {
            let v = geometry.volume(*id);
            !(v.kind() == VolumeKind::Shell || v.has_patches())
        });
    }

    // The origin sits marginally inside another volume, so its only crossing is an exit.
    if let Some(&first) = nearest(&candidates).first() {
        let (id, _) = candidates[first];
        if id != current && candidates.iter().filter(|(other, _)| *other == id).count() == 1 {
            candidates.remove(first);
        }
    }
    if candidates.len() <= 1 {
        return Ok(None);
    }

    let closest = nearest(&candidates);
    let (next, hit) = candidates[closest[0]];
    if closest.iter().any(|i| candidates[*i].0 != next) {
        let mut names: Vec<String> = closest.iter()
            .map(|i| geometry.volume(candidates[*i].0).name().to_string())
            .collect();
        names.dedup();
        return Err(TrackError::AmbiguousIntersection(names));
    }

    // Hit faces point out of their volume, so they face a photon arriving from outside.
    let facing = if next == current { hit.face.opposite() } else { hit.face };
    trace!("{} reaches {} through {} at {:?}", current, geometry.volume(next).name(), hit.face, hit.point);
    Ok(Some(Crossing { point: hit.point, facing, next }))
}

/// Indices of every candidate at the minimal distance.
fn nearest(candidates: &[(VolumeId, CuboidHit)]) -> Vec<usize> {
    let min_t = candidates.iter().map(|(_, h)| h.t).fold(FLOAT_MAX, Float::min);
    (0..candidates.len()).filter(|i| candidates[*i].1.t == min_t).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::geometry::GeometryBuilder;
    use crate::core::material::MaterialLibrary;
    use crate::surfaces::height_field::HeightField;
    use crate::surfaces::patch::SurfacePatch;
    use std::sync::Arc;

    fn stack(rough_top: bool) -> GeometryGraph {
        let library = MaterialLibrary::builtin();
        let mut builder = GeometryBuilder::new();
        builder.add_volume("world", VolumeKind::Ambient, library.get("Air").unwrap(),
                           Vector3f::zeros(), Vector3f::new(100.0, 100.0, 100.0)).unwrap();
        builder.add_volume("pillar", VolumeKind::Ordinary, library.get("EJ-204").unwrap(),
                           Vector3f::zeros(), Vector3f::new(3.0, 3.0, 3.0)).unwrap();
        builder.add_volume("gel", VolumeKind::Ordinary, library.get("EJ-550").unwrap(),
                           Vector3f::new(0.0, 0.0, 1.55), Vector3f::new(3.0, 3.0, 0.1)).unwrap();
        builder.add_volume("window", VolumeKind::Detector, library.get("SensLGlass").unwrap(),
                           Vector3f::new(0.0, 0.0, 1.85), Vector3f::new(3.0, 3.0, 0.5)).unwrap();
        if rough_top {
            let patch = SurfacePatch::from_height_field(FaceDirection::PosZ, &HeightField::flat(3000.0, 4)).unwrap();
            builder.add_patch("pillar", FaceDirection::PosZ, Arc::new(patch)).unwrap();
        }
        builder.build().unwrap()
    }

    #[test]
    fn test_exit_lands_on_exact_face_coordinate() {
        let graph = stack(false);
        let pillar = graph.id("pillar").unwrap();
        let crossing = next_crossing(&graph, &Vector3f::zeros(), &Vector3f::new(0.0, 0.0, 1.0), pillar)
            .unwrap()
            .unwrap();
        assert_eq!(crossing.point, Vector3f::new(0.0, 0.0, 1500.0));
        assert_eq!(crossing.next, graph.id("gel").unwrap());
        assert_eq!(crossing.normal(), Vector3f::new(0.0, 0.0, -1.0));
    }

    #[test]
    fn test_oblique_exit_uses_adjacency_of_crossed_face() {
        let graph = stack(false);
        let pillar = graph.id("pillar").unwrap();
        let crossing = next_crossing(&graph, &Vector3f::zeros(), &Vector3f::new(1.0, 0.0, 0.5), pillar)
            .unwrap()
            .unwrap();
        assert_eq!(crossing.facing, FaceDirection::NegX);
        assert_eq!(crossing.point, Vector3f::new(1500.0, 0.0, 750.0));
        assert_eq!(crossing.next, graph.ambient());
    }

    #[test]
    fn test_from_world_into_volume() {
        let graph = stack(false);
        let origin = Vector3f::new(0.0, 0.0, -10000.0);
        let crossing = next_crossing(&graph, &origin, &Vector3f::new(0.0, 0.0, 1.0), graph.ambient())
            .unwrap()
            .unwrap();
        assert_eq!(crossing.next, graph.id("pillar").unwrap());
        assert_eq!(crossing.point, Vector3f::new(0.0, 0.0, -1500.0));
        assert_eq!(crossing.facing, FaceDirection::NegZ);
    }

    #[test]
    fn test_leaving_the_world() {
        let graph = stack(false);
        let origin = Vector3f::new(0.0, 0.0, -10000.0);
        let crossing = next_crossing(&graph, &origin, &Vector3f::new(0.0, 0.0, -1.0), graph.ambient()).unwrap();
        assert!(crossing.is_none());
    }

    #[test]
    fn test_origin_marginally_inside_neighbor() {
        for rough in [false, true].iter() {
            let graph = stack(*rough);
            let origin = Vector3f::new(0.0, 0.0, 1499.5);
            let crossing = next_crossing(&graph, &origin, &Vector3f::new(0.0, 0.0, 1.0), graph.ambient())
                .unwrap()
                .unwrap();
            assert_eq!(crossing.next, graph.id("gel").unwrap());
            assert_eq!(crossing.point, Vector3f::new(0.0, 0.0, 1500.0));
            assert_eq!(crossing.facing, FaceDirection::NegZ);
        }
    }

    #[test]
    fn test_shell_inner_wall() {
        let library = MaterialLibrary::builtin();
        let mut builder = GeometryBuilder::new();
        builder.add_volume("world", VolumeKind::Ambient, library.get("Air").unwrap(),
                           Vector3f::zeros(), Vector3f::new(100.0, 100.0, 100.0)).unwrap();
        builder.add_volume("reflector", VolumeKind::Shell, library.get("Teflon").unwrap(),
                           Vector3f::zeros(), Vector3f::new(10.0, 10.0, 10.0)).unwrap();
        builder.add_volume("pillar", VolumeKind::Ordinary, library.get("EJ-204").unwrap(),
                           Vector3f::zeros(), Vector3f::new(3.0, 3.0, 3.0)).unwrap();
        let graph = builder.build().unwrap();
        let reflector = graph.id("reflector").unwrap();

        let crossing = next_crossing(&graph, &Vector3f::new(0.0, 0.0, 3000.0),
                                     &Vector3f::new(0.0, 0.0, 1.0), reflector).unwrap().unwrap();
        assert_eq!(crossing.next, reflector);
        assert_eq!(crossing.point, Vector3f::new(0.0, 0.0, 5000.0));
        assert_eq!(crossing.facing, FaceDirection::NegZ);

        let crossing = next_crossing(&graph, &Vector3f::new(0.0, 0.0, 3000.0),
                                     &Vector3f::new(0.0, 0.0, -1.0), reflector).unwrap().unwrap();
        assert_eq!(crossing.next, graph.id("pillar").unwrap());
        assert_eq!(crossing.facing, FaceDirection::PosZ);
    }

    #[test]
    fn test_unresolvable_tie_is_an_error() {
        let library = MaterialLibrary::builtin();
        let mut builder = GeometryBuilder::new();
        builder.add_volume("world", VolumeKind::Ambient, library.get("Air").unwrap(),
                           Vector3f::zeros(), Vector3f::new(100.0, 100.0, 100.0)).unwrap();
        builder.add_volume("left", VolumeKind::Ordinary, library.get("EJ-204").unwrap(),
                           Vector3f::new(0.5, 0.5, 0.5), Vector3f::new(1.0, 1.0, 1.0)).unwrap();
        builder.add_volume("right", VolumeKind::Ordinary, library.get("EJ-204").unwrap(),
                           Vector3f::new(0.5, -0.5, 0.5), Vector3f::new(1.0, 1.0, 1.0)).unwrap();
        let graph = builder.build().unwrap();

        let result = next_crossing(&graph, &Vector3f::new(-5000.0, 0.0, 500.0),
                                   &Vector3f::new(1.0, 0.0, 0.0), graph.ambient());
        assert!(matches!(result, Err(TrackError::AmbiguousIntersection(_))));
    }
}
