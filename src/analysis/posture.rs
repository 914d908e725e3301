use crate::pose::{LandmarkIndex, PoseFrame};

pub const DEFAULT_POSTURE_STRICTNESS: f32 = 0.05;

const SHOULDER_WEIGHT: f32 = 0.25;
const HIP_WEIGHT: f32 = 0.25;
const SPINE_WEIGHT: f32 = 0.30;
const KNEE_WEIGHT: f32 = 0.20;

/// 姿勢の内訳 (各0〜100)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PostureAnalysis {
    pub shoulders: f32,
    pub hips: f32,
    pub spine: f32,
    /// 両膝が見えていない場合は `None`
    pub knees: Option<f32>,
    pub score: f32,
}

fn symmetry_score(deviation: f32, tolerance: f32) -> f32 {
    (100.0 - (deviation / tolerance) * 100.0).max(0.0)
}

/// 最新フレーム1枚から左右対称性と体幹の中心線を評価する
///
/// 膝が欠けている場合、その項は加算しない（重みの再正規化もしない）。
pub fn analyze_posture(frame: &PoseFrame, strictness: f32) -> PostureAnalysis {
    use LandmarkIndex::*;

    let shoulder_diff = (frame.get(LeftShoulder).y - frame.get(RightShoulder).y).abs();
    let shoulders = symmetry_score(shoulder_diff, strictness);

    let hip_diff = (frame.get(LeftHip).y - frame.get(RightHip).y).abs();
    let hips = symmetry_score(hip_diff, strictness);

    let (hip_x, _) = frame.hip_center();
    let spine_offset = (frame.get(Nose).x - hip_x).abs();
    let spine = symmetry_score(spine_offset, strictness * 2.0);

    let left_knee = frame.get(LeftKnee);
    let right_knee = frame.get(RightKnee);
    let knees = (left_knee.is_present() && right_knee.is_present())
        .then(|| symmetry_score((left_knee.y - right_knee.y).abs(), strictness));

    let score = shoulders * SHOULDER_WEIGHT
        + hips * HIP_WEIGHT
        + spine * SPINE_WEIGHT
        + knees.map_or(0.0, |k| k * KNEE_WEIGHT);

    PostureAnalysis {
        shoulders,
        hips,
        spine,
        knees,
        score: score.min(100.0),
    }
}
