// Copyright @yucwang 2026

use crate::core::error::TrackError;
use crate::core::face::FaceDirection;
use crate::core::geometry::GeometryGraph;
use crate::core::history::TerminationReason;
use crate::core::volume::{ VolumeId, VolumeKind };
use crate::math::constants::{ Float, Vector2f, Vector3f };
use crate::math::ray::Ray3f;
use crate::optics::fresnel;
use crate::optics::reflector::interact_with_reflector;
use crate::surfaces::patch::{ PatchInstance, SurfacePatch };
use crate::tracking::tracker::{ TraceState, TrackingLimits };

use log::debug;
use rand::Rng;
use std::sync::Arc;

/// Resolves a crossing of a rough face against its micro-surface: sample a placement of
/// the patch under the coarse crossing point, then bounce on it until the photon leaves.
pub(crate) struct SurfaceResolver<'a> {
    geometry: &'a GeometryGraph,
    limits: &'a TrackingLimits,
}

impl<'a> SurfaceResolver<'a> {
    pub fn new(geometry: &'a GeometryGraph, limits: &'a TrackingLimits) -> Self {
        Self { geometry, limits }
    }

    /// `rough` owns the patch on `face`; `next` is the volume across the boundary from the
    /// photon. `Ok(None)` hands the photon back to the tracker.
    pub fn resolve(&self,
                   state: &mut TraceState,
                   coarse: &Vector3f,
                   next: VolumeId,
                   rough: VolumeId,
                   face: FaceDirection) -> Result<Option<TerminationReason>, TrackError> {
        let host = self.geometry.volume(rough);
        let template = host.patch(face).ok_or_else(|| TrackError::MissingPatch {
            volume: host.name().to_string(),
            face,
        })?;

        let (instance, first) = match self.place(state, template, coarse) {
            Some(placed) => placed,
            None => {
                debug!("corner trap on {} {} at {:?} heading {:?}",
                       host.name(), face, state.photon.position, state.photon.direction);
                return Ok(Some(TerminationReason::CornerTrap));
            }
        };

        let mut next = next;
        let mut bounces = 0;
        let mut found = Some(first);
        while let Some((point, normal)) = found {
            if !host.cuboid().contains_laterally(&point, face) {
                debug!("lateral escape from {} {} at {:?} heading {:?}",
                       host.name(), face, point, state.photon.direction);
                return Ok(Some(TerminationReason::LateralEscape));
            }
            if bounces >= self.limits.max_local_bounces {
                debug!("feature trap on {} {} at {:?} heading {:?}",
                       host.name(), face, point, state.photon.direction);
                return Ok(Some(TerminationReason::FeatureTrap));
            }
            bounces += 1;

            let normal = if state.photon.direction.dot(&normal) > 0.0 { -normal } else { normal };
            let here = state.photon.volume;
            let outcome = fresnel::interact(&state.photon.direction, &state.photon.polarization, &normal,
                                            self.refractive_index(here), self.refractive_index(next),
                                            &mut *state.rng)?;
            let volume = if outcome.interaction.is_transmission() {
                std::mem::replace(&mut next, here)
            } else {
                here
            };
            state.advance(self.geometry, &point, &outcome, volume, face);
            if let Some(reason) = state.terminal(self.geometry, self.limits) {
                return Ok(Some(reason));
            }

            found = instance.intersect(&state.photon.position, &state.photon.direction);
            if found.is_none() && self.geometry.volume(state.photon.volume).kind() == VolumeKind::Shell {
                match self.reflector_wall(state, face)? {
                    WallOutcome::Terminated(reason) => return Ok(Some(reason)),
                    WallOutcome::Reflected => {
                        next = rough;
                        bounces = 0;
                        found = instance.intersect(&state.photon.position, &state.photon.direction);
                    }
                    WallOutcome::Passed => {}
                }
            }
        }
        Ok(None)
    }

    /// Tries placements until the photon's ray meets the patch.
    fn place(&self,
             state: &mut TraceState,
             template: &Arc<SurfacePatch>,
             coarse: &Vector3f) -> Option<(PatchInstance, (Vector3f, Vector3f))> {
        let base = PatchInstance::new(template.clone());
        let bounds = base.safe_sampling_bounds();
        for _ in 0..self.limits.max_sampling_attempts {
            let u = Vector2f::new(state.rng.gen::<Float>(), state.rng.gen::<Float>());
            let instance = base.translate(&(coarse - bounds.sample(&u)));
            if let Some(hit) = instance.intersect(&state.photon.position, &state.photon.direction) {
                return Some((instance, hit));
            }
        }
        None
    }

    /// A photon in a reflector gap heading for the wall parallel to the rough face.
    fn reflector_wall(&self, state: &mut TraceState, face: FaceDirection) -> Result<WallOutcome, TrackError> {
        let shell_id = state.photon.volume;
        let shell = self.geometry.volume(shell_id);
        let ray = Ray3f::new(state.photon.position, state.photon.direction);
        let wall = match shell.cuboid().ray_hits(&ray).into_iter().last() {
            Some(hit) if hit.face == face => hit,
            _ => return Ok(WallOutcome::Passed),
        };

        let model = shell.material()
            .reflector()
            .ok_or_else(|| TrackError::MissingReflectorModel(shell.name().to_string()))?;
        let outcome = interact_with_reflector(model, &state.photon.direction, &state.photon.polarization,
                                              &(-face.normal()), &mut *state.rng)?;
        let transmitted = outcome.interaction.is_transmission();
        let volume = if transmitted { self.geometry.ambient() } else { shell_id };
        state.advance(self.geometry, &wall.point, &outcome, volume, face);

        if let Some(reason) = state.terminal(self.geometry, self.limits) {
            return Ok(WallOutcome::Terminated(reason));
        }
        Ok(if transmitted { WallOutcome::Passed } else { WallOutcome::Reflected })
    }

    fn refractive_index(&self, id: VolumeId) -> Float {
        self.geometry.volume(id).material().refractive_index()
    }
}

enum WallOutcome {
    Passed,
    Reflected,
    Terminated(TerminationReason),
}
