// Copyright @yucwang 2026

use crate::math::constants::{ Float, Vector3f };

use serde::{ Serialize, Serializer };
use std::fmt;

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum FaceDirection {
    PosX,
    NegX,
    PosY,
    NegY,
    PosZ,
    NegZ,
}

impl FaceDirection {
    pub const ALL: [FaceDirection; 6] = [
        FaceDirection::PosX,
        FaceDirection::NegX,
        FaceDirection::PosY,
        FaceDirection::NegY,
        FaceDirection::PosZ,
        FaceDirection::NegZ,
    ];

    pub fn new(axis: usize, positive: bool) -> Self {
        match (axis, positive) {
            (0, true) => FaceDirection::PosX,
            (0, false) => FaceDirection::NegX,
            (1, true) => FaceDirection::PosY,
            (1, false) => FaceDirection::NegY,
            (_, true) => FaceDirection::PosZ,
            (_, false) => FaceDirection::NegZ,
        }
    }

    pub fn index(&self) -> usize {
        match self {
            FaceDirection::PosX => 0,
            FaceDirection::NegX => 1,
            FaceDirection::PosY => 2,
            FaceDirection::NegY => 3,
            FaceDirection::PosZ => 4,
            FaceDirection::NegZ => 5,
        }
    }

    pub fn axis(&self) -> usize {
        self.index() / 2
    }

    pub fn is_positive(&self) -> bool {
        self.index() % 2 == 0
    }

    pub fn sign(&self) -> Float {
        if self.is_positive() { 1.0 } else { -1.0 }
    }

    pub fn normal(&self) -> Vector3f {
        let mut n = Vector3f::zeros();
        n[self.axis()] = self.sign();
        n
    }

    pub fn opposite(&self) -> Self {
        FaceDirection::new(self.axis(), !self.is_positive())
    }

    pub fn lateral_axes(&self) -> (usize, usize) {
        match self.axis() {
            0 => (1, 2),
            1 => (0, 2),
            _ => (0, 1),
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            FaceDirection::PosX => "+x",
            FaceDirection::NegX => "-x",
            FaceDirection::PosY => "+y",
            FaceDirection::NegY => "-y",
            FaceDirection::PosZ => "+z",
            FaceDirection::NegZ => "-z",
        }
    }

    pub fn from_label(label: &str) -> Option<Self> {
        FaceDirection::ALL.iter().copied().find(|f| f.label() == label.trim())
    }

    pub fn from_normal(n: &Vector3f) -> Option<Self> {
        FaceDirection::ALL.iter().copied().find(|f| f.normal() == *n)
    }
}

impl fmt::Display for FaceDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

impl Serialize for FaceDirection {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.label())
    }
}
