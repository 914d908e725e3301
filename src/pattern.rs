//! Static reference patterns for the supported dance moves.

use std::fmt;
use std::str::FromStr;

use crate::error::AnalysisError;
use crate::pose::LandmarkIndex;

/// Move identifier selected by the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DanceMove {
    BasicStep,
    SideStep,
}

impl DanceMove {
    pub const ALL: [DanceMove; 2] = [DanceMove::BasicStep, DanceMove::SideStep];

    pub fn id(self) -> &'static str {
        match self {
            DanceMove::BasicStep => "basic-step",
            DanceMove::SideStep => "side-step",
        }
    }
}

impl fmt::Display for DanceMove {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

impl FromStr for DanceMove {
    type Err = AnalysisError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        DanceMove::ALL
            .into_iter()
            .find(|m| m.id() == s)
            .ok_or_else(|| AnalysisError::UnknownMove(s.to_string()))
    }
}

/// Overall shape of the movement a pattern expects.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MovementKind {
    SideToSide,
    LateralMovement,
}

impl MovementKind {
    /// Only side-to-side patterns are judged on lateral hip sway.
    pub fn expects_hip_sway(self) -> bool {
        matches!(self, MovementKind::SideToSide)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RhythmSignature {
    pub beats_per_minute: f32,
    /// 1-based counts that carry the accent.
    pub accent_beats: &'static [u8],
    /// Relative weight of each count in the 8-count phrase.
    pub timing: &'static [f32],
}

#[derive(Debug, Clone, PartialEq)]
pub struct ExpectedMovement {
    pub direction: [f32; 3],
    pub magnitude: f32,
    /// Seconds.
    pub duration: f32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CriticalMovement {
    pub phase: &'static str,
    pub landmarks: &'static [LandmarkIndex],
    pub expected: ExpectedMovement,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DancePattern {
    pub name: &'static str,
    pub key_points: &'static [LandmarkIndex],
    pub expected_pattern: MovementKind,
    pub difficulty: u8,
    pub rhythm: RhythmSignature,
    pub critical_movements: &'static [CriticalMovement],
}

use LandmarkIndex::*;

const LOWER_BODY: &[LandmarkIndex] = &[LeftHip, RightHip, LeftKnee, RightKnee, LeftAnkle, RightAnkle];
const HIPS_AND_KNEES: &[LandmarkIndex] = &[LeftHip, RightHip, LeftKnee, RightKnee];

static BASIC_STEP: DancePattern = DancePattern {
    name: "Bachata Basic Step",
    key_points: LOWER_BODY,
    expected_pattern: MovementKind::SideToSide,
    difficulty: 1,
    rhythm: RhythmSignature {
        beats_per_minute: 120.0,
        accent_beats: &[1, 5],
        timing: &[1.0, 0.5, 0.5, 1.0, 0.5, 0.5, 1.0, 1.0],
    },
    critical_movements: &[
        CriticalMovement {
            phase: "weight-transfer-left",
            landmarks: HIPS_AND_KNEES,
            expected: ExpectedMovement {
                direction: [-0.1, 0.0, 0.0],
                magnitude: 0.05,
                duration: 0.5,
            },
        },
        CriticalMovement {
            phase: "weight-transfer-right",
            landmarks: HIPS_AND_KNEES,
            expected: ExpectedMovement {
                direction: [0.1, 0.0, 0.0],
                magnitude: 0.05,
                duration: 0.5,
            },
        },
    ],
};

static SIDE_STEP: DancePattern = DancePattern {
    name: "Side Step",
    key_points: LOWER_BODY,
    expected_pattern: MovementKind::LateralMovement,
    difficulty: 2,
    rhythm: RhythmSignature {
        beats_per_minute: 130.0,
        accent_beats: &[1, 3, 5, 7],
        timing: &[1.0; 8],
    },
    critical_movements: &[CriticalMovement {
        phase: "side-step-left",
        landmarks: HIPS_AND_KNEES,
        expected: ExpectedMovement {
            direction: [-0.15, 0.0, 0.0],
            magnitude: 0.08,
            duration: 0.75,
        },
    }],
};

/// Look up the reference pattern for a move.
pub fn pattern_for(dance_move: DanceMove) -> &'static DancePattern {
    match dance_move {
        DanceMove::BasicStep => &BASIC_STEP,
        DanceMove::SideStep => &SIDE_STEP,
    }
}
