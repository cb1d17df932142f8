// Copyright @yucwang 2026

use crate::core::error::TrackError;
use crate::core::face::FaceDirection;
use crate::core::geometry::GeometryGraph;
use crate::core::history::{ HistoryRecorder, Step, TerminationReason, TrackHistory };
use crate::core::photon::Photon;
use crate::core::volume::{ VolumeId, VolumeKind };
use crate::math::constants::{ round_to_nano, Float, Vector3f, SPEED_OF_LIGHT };
use crate::optics::fresnel::{ self, InteractionOutcome };
use crate::optics::reflector::interact_with_reflector;
use crate::tracking::intersector::{ next_crossing, Crossing };
use crate::tracking::resolver::SurfaceResolver;

use log::debug;
use rand::RngCore;

/// Bounds that keep every trace finite.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct TrackingLimits {
    /// Patch placements tried before a corner trap.
    pub max_sampling_attempts: usize,
    /// Interactions with one placed patch before a feature trap.
    pub max_local_bounces: usize,
    pub weight_floor: Float,
}

impl Default for TrackingLimits {
    fn default() -> Self {
        Self { max_sampling_attempts: 20, max_local_bounces: 20, weight_floor: 1e-4 }
    }
}

/// A photon being traced, with its history and random stream.
pub(crate) struct TraceState<'r> {
    pub photon: Photon,
    pub recorder: HistoryRecorder,
    pub rng: &'r mut dyn RngCore,
}

impl<'r> TraceState<'r> {
    pub fn new(photon_id: usize, photon: Photon, geometry: &GeometryGraph, rng: &'r mut dyn RngCore) -> Self {
        let recorder = HistoryRecorder::new(photon_id, &photon, geometry.volume(photon.volume).name());
        Self { photon, recorder, rng }
    }

    /// Moves the photon to `point` through its current medium, applies `outcome`, places it
    /// in `volume` and records the step.
    pub fn advance(&mut self,
                   geometry: &GeometryGraph,
                   point: &Vector3f,
                   outcome: &InteractionOutcome,
                   volume: VolumeId,
                   plane: FaceDirection) {
        let medium = geometry.volume(self.photon.volume).material();
        let distance = round_to_nano((point - self.photon.position).norm());

        self.photon.time += distance / (SPEED_OF_LIGHT / medium.refractive_index());
        self.photon.weight *= medium.transmittance(distance);
        self.photon.distance += distance;
        self.photon.position = *point;
        self.photon.direction = outcome.direction;
        self.photon.polarization = outcome.polarization;
        self.photon.volume = volume;

        self.recorder.record(&self.photon, geometry.volume(volume).name(), Step {
            interaction: outcome.interaction,
            plane,
            angle_in: outcome.incidence_angle(),
            angle_out: outcome.out_angle,
        });
    }

    pub fn terminal(&self, geometry: &GeometryGraph, limits: &TrackingLimits) -> Option<TerminationReason> {
        if self.photon.weight < limits.weight_floor {
            return Some(TerminationReason::SubThresholdWeight);
        }
        if geometry.volume(self.photon.volume).is_detector() {
            return Some(TerminationReason::Detected);
        }
        None
    }
}

/// Steps photons from boundary to boundary until they terminate.
pub struct Tracker<'a> {
    geometry: &'a GeometryGraph,
    limits: TrackingLimits,
}

impl<'a> Tracker<'a> {
    pub fn new(geometry: &'a GeometryGraph, limits: TrackingLimits) -> Self {
        Self { geometry, limits }
    }

    pub fn geometry(&self) -> &GeometryGraph {
        self.geometry
    }

    pub fn limits(&self) -> &TrackingLimits {
        &self.limits
    }

    /// Traces one photon to termination. Errors are configuration or numerical
    /// inconsistencies and should abort the run.
    pub fn track(&self,
                 photon_id: usize,
                 photon: Photon,
                 rng: &mut dyn RngCore) -> Result<TrackHistory, TrackError> {
        let mut state = TraceState::new(photon_id, photon, self.geometry, rng);

        while state.photon.is_alive() {
            if let Some(outcome) = self.step(&mut state)? {
                state.photon.kill();
                debug!("photon {} terminated: {} after {} steps in {}",
                       photon_id, outcome, state.recorder.len() - 1,
                       self.geometry.volume(state.photon.volume).name());
                return Ok(state.recorder.finish(outcome));
            }
        }
        Err(TrackError::NotAlive(photon_id))
    }

    fn step(&self, state: &mut TraceState) -> Result<Option<TerminationReason>, TrackError> {
        let current = state.photon.volume;
        let crossing = match next_crossing(self.geometry, &state.photon.position, &state.photon.direction, current)? {
            Some(crossing) => crossing,
            None => return Ok(Some(TerminationReason::NoCrossing)),
        };

        if crossing.next == current && self.geometry.volume(current).kind() == VolumeKind::Shell {
            return self.reflector_step(state, &crossing);
        }

        match self.rough_side(current, &crossing) {
            Some((rough, face)) => SurfaceResolver::new(self.geometry, &self.limits)
                .resolve(state, &crossing.point, crossing.next, rough, face),
            None => self.smooth_step(state, &crossing),
        }
    }

    /// The volume whose micro-surface covers the crossed face, and that face.
    fn rough_side(&self, current: VolumeId, crossing: &Crossing) -> Option<(VolumeId, FaceDirection)> {
        let exit_face = crossing.facing.opposite();
        if self.geometry.volume(current).patch(exit_face).is_some() {
            return Some((current, exit_face));
        }
        if self.geometry.volume(crossing.next).patch(crossing.facing).is_some() {
            return Some((crossing.next, crossing.facing));
        }
        None
    }

    fn smooth_step(&self, state: &mut TraceState, crossing: &Crossing) -> Result<Option<TerminationReason>, TrackError> {
        let current = state.photon.volume;
        let eta_i = self.geometry.volume(current).material().refractive_index();
        let eta_t = self.geometry.volume(crossing.next).material().refractive_index();
        let outcome = fresnel::interact(&state.photon.direction, &state.photon.polarization,
                                        &crossing.normal(), eta_i, eta_t, &mut *state.rng)?;

        let volume = if outcome.interaction.is_transmission() { crossing.next } else { current };
        state.advance(self.geometry, &crossing.point, &outcome, volume, crossing.facing.opposite());
        Ok(state.terminal(self.geometry, &self.limits))
    }

    /// The inner wall of a reflector shell seen from its own gap.
    fn reflector_step(&self, state: &mut TraceState, crossing: &Crossing) -> Result<Option<TerminationReason>, TrackError> {
        let shell = self.geometry.volume(crossing.next);
        let model = shell.material()
            .reflector()
            .ok_or_else(|| TrackError::MissingReflectorModel(shell.name().to_string()))?;
        let outcome = interact_with_reflector(model, &state.photon.direction, &state.photon.polarization,
                                              &crossing.normal(), &mut *state.rng)?;

        let volume = if outcome.interaction.is_transmission() { self.geometry.ambient() } else { crossing.next };
        state.advance(self.geometry, &crossing.point, &outcome, volume, crossing.facing.opposite());
        Ok(state.terminal(self.geometry, &self.limits))
    }
}
