// Copyright @yucwang 2026

use crate::core::face::FaceDirection;
use crate::math::constants::Float;

use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum TrackError {
    #[error("incidence angle beyond 90 degrees (cos = {0})")]
    IncidenceBeyondNormal(Float),
    #[error("reflectance {0} outside [0, 1]")]
    ReflectanceOutOfRange(Float),
    #[error("transmission angle sine {0} outside [0, 1]")]
    TransmissionAngleOutOfRange(Float),
    #[error("ambiguous nearest intersection between volumes {0:?}")]
    AmbiguousIntersection(Vec<String>),
    #[error("volume '{volume}' has no neighbor across face {face}")]
    MissingAdjacency { volume: String, face: FaceDirection },
    #[error("volume '{volume}' has no micro-surface patch on face {face}")]
    MissingPatch { volume: String, face: FaceDirection },
    #[error("volume '{0}' is a reflector shell without a reflector model")]
    MissingReflectorModel(String),
    #[error("invalid sampling distribution: {0}")]
    InvalidDistribution(String),
    #[error("photon {0} was already terminated")]
    NotAlive(usize),
}

#[derive(Debug, Error, Clone, PartialEq)]
pub enum GeometryError {
    #[error("duplicate volume name '{0}'")]
    DuplicateVolume(String),
    #[error("unknown volume '{0}'")]
    UnknownVolume(String),
    #[error("volume '{0}' has a non-positive size")]
    DegenerateBounds(String),
    #[error("expected exactly one ambient volume, found {0}")]
    AmbientCount(usize),
    #[error("ambiguous touching neighbor for volume '{volume}' across face {face}: {candidates:?}")]
    AmbiguousNeighbor { volume: String, face: FaceDirection, candidates: Vec<String> },
    #[error("patch for face {patch} cannot be attached to face {face} of volume '{volume}'")]
    PatchFaceMismatch { volume: String, face: FaceDirection, patch: FaceDirection },
    #[error("{0} placement problem(s) between volumes")]
    Placement(usize),
}
