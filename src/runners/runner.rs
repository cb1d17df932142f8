// Copyright @yucwang 2026

use crate::core::error::TrackError;
use crate::core::geometry::GeometryGraph;
use crate::core::history::{ TerminationReason, TrackHistory };
use crate::core::photon::Photon;
use crate::math::constants::Float;

use std::collections::BTreeMap;
use std::fmt;

pub trait Runner {
    fn run(&self, geometry: &GeometryGraph, photons: &[Photon]) -> Result<RunReport, TrackError>;
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct RunSummary {
    counts: BTreeMap<TerminationReason, usize>,
}

impl RunSummary {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, reason: TerminationReason) {
        *self.counts.entry(reason).or_insert(0) += 1;
    }

    pub fn count(&self, reason: TerminationReason) -> usize {
        self.counts.get(&reason).copied().unwrap_or(0)
    }

    pub fn total(&self) -> usize {
        self.counts.values().sum()
    }

    pub fn detection_efficiency(&self) -> Float {
        match self.total() {
            0 => 0.0,
            total => self.count(TerminationReason::Detected) as Float / total as Float,
        }
    }
}

impl fmt::Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} photons", self.total())?;
        for reason in TerminationReason::ALL.iter() {
            write!(f, ", {}: {}", reason, self.count(*reason))?;
        }
        Ok(())
    }
}

pub struct RunReport {
    pub histories: Vec<TrackHistory>,
    pub summary: RunSummary,
}

impl RunReport {
    pub fn from_histories(histories: Vec<TrackHistory>) -> Self {
        let mut summary = RunSummary::new();
        for history in histories.iter() {
            summary.add(history.outcome);
        }
        Self { histories, summary }
    }
}
