// Copyright @yucwang 2026

use crate::core::face::FaceDirection;
use crate::core::photon::Photon;
use crate::math::constants::{ Float, Vector3f, UM_PER_MM };

use serde::Serialize;
use std::fmt;

#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize)]
pub enum InteractionType {
    #[serde(rename = "emission")]
    Emission,
    #[serde(rename = "reflection")]
    Reflection,
    #[serde(rename = "transmission")]
    Transmission,
    #[serde(rename = "TIR")]
    TotalInternalReflection,
}

impl InteractionType {
    pub fn is_transmission(&self) -> bool {
        *self == InteractionType::Transmission
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TerminationReason {
    NoCrossing,
    SubThresholdWeight,
    Detected,
    CornerTrap,
    FeatureTrap,
    LateralEscape,
}

impl TerminationReason {
    pub const ALL: [TerminationReason; 6] = [
        TerminationReason::NoCrossing,
        TerminationReason::SubThresholdWeight,
        TerminationReason::Detected,
        TerminationReason::CornerTrap,
        TerminationReason::FeatureTrap,
        TerminationReason::LateralEscape,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            TerminationReason::NoCrossing => "no-crossing",
            TerminationReason::SubThresholdWeight => "sub-threshold-weight",
            TerminationReason::Detected => "detected",
            TerminationReason::CornerTrap => "corner-trap",
            TerminationReason::FeatureTrap => "feature-trap",
            TerminationReason::LateralEscape => "lateral-escape",
        }
    }
}

impl fmt::Display for TerminationReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

// One step of a photon's history. Positions and distances are mm, angles degrees, times ns.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrackRecord {
    pub id: usize,
    pub step: usize,
    pub position: Vector3f,
    #[serde(rename = "type")]
    pub interaction: InteractionType,
    pub plane: Option<FaceDirection>,
    pub volume: String,
    pub momentum_in: Option<Vector3f>,
    pub momentum_out: Vector3f,
    pub angle_in: Option<Float>,
    pub angle_out: Option<Float>,
    pub polarization_in: Option<Vector3f>,
    pub polarization_out: Vector3f,
    pub abs_time: Float,
    pub rel_time: Float,
    pub distance: Float,
    pub weight: Float,
}

#[derive(Debug, Clone, Serialize)]
pub struct TrackHistory {
    pub photon_id: usize,
    pub records: Vec<TrackRecord>,
    pub outcome: TerminationReason,
}

impl TrackHistory {
    pub fn is_detected(&self) -> bool {
        self.outcome == TerminationReason::Detected
    }

    pub fn emission(&self) -> Option<&TrackRecord> {
        self.records.first()
    }
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Step {
    pub interaction: InteractionType,
    pub plane: FaceDirection,
    pub angle_in: Float,
    pub angle_out: Float,
}

pub struct HistoryRecorder {
    records: Vec<TrackRecord>,
    emission_time: Float,
}

impl HistoryRecorder {
    pub fn new(photon_id: usize, photon: &Photon, volume: &str) -> Self {
        let emission = TrackRecord {
            id: photon_id,
            step: 0,
            position: photon.position / UM_PER_MM,
            interaction: InteractionType::Emission,
            plane: None,
            volume: volume.to_string(),
            momentum_in: None,
            momentum_out: photon.direction,
            angle_in: None,
            angle_out: None,
            polarization_in: None,
            polarization_out: photon.polarization,
            abs_time: photon.time,
            rel_time: 0.0,
            distance: 0.0,
            weight: photon.weight,
        };
        Self { records: vec![emission], emission_time: photon.time }
    }

    pub fn record(&mut self, photon: &Photon, volume: &str, step: Step) {
        let (id, index, momentum_in, polarization_in) = match self.records.last() {
            Some(last) => (last.id, last.step + 1, last.momentum_out, last.polarization_out),
            None => (0, 0, photon.direction, photon.polarization),
        };

        self.records.push(TrackRecord {
            id,
            step: index,
            position: photon.position / UM_PER_MM,
            interaction: step.interaction,
            plane: Some(step.plane),
            volume: volume.to_string(),
            momentum_in: Some(momentum_in),
            momentum_out: photon.direction,
            angle_in: Some(step.angle_in.to_degrees()),
            angle_out: Some(step.angle_out.to_degrees()),
            polarization_in: Some(polarization_in),
            polarization_out: photon.polarization,
            abs_time: photon.time,
            rel_time: photon.time - self.emission_time,
            distance: photon.distance / UM_PER_MM,
            weight: photon.weight,
        });
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn last(&self) -> Option<&TrackRecord> {
        self.records.last()
    }

    pub fn finish(self, outcome: TerminationReason) -> TrackHistory {
        let photon_id = self.records.first().map(|r| r.id).unwrap_or(0);
        TrackHistory { photon_id, records: self.records, outcome }
    }
}
