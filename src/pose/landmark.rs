use serde::{Deserialize, Serialize};

use crate::error::AnalysisError;

/// MediaPipe Pose の 33 ランドマークインデックス
///
/// 番号はモデル出力の並びそのまま。モデルを差し替える場合はこの表だけを直す。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(usize)]
pub enum LandmarkIndex {
    Nose = 0,
    LeftEyeInner = 1,
    LeftEye = 2,
    LeftEyeOuter = 3,
    RightEyeInner = 4,
    RightEye = 5,
    RightEyeOuter = 6,
    LeftEar = 7,
    RightEar = 8,
    MouthLeft = 9,
    MouthRight = 10,
    LeftShoulder = 11,
    RightShoulder = 12,
    LeftElbow = 13,
    RightElbow = 14,
    LeftWrist = 15,
    RightWrist = 16,
    LeftPinky = 17,
    RightPinky = 18,
    LeftIndex = 19,
    RightIndex = 20,
    LeftThumb = 21,
    RightThumb = 22,
    LeftHip = 23,
    RightHip = 24,
    LeftKnee = 25,
    RightKnee = 26,
    LeftAnkle = 27,
    RightAnkle = 28,
    LeftHeel = 29,
    RightHeel = 30,
    LeftFootIndex = 31,
    RightFootIndex = 32,
}

pub const LANDMARK_COUNT: usize = 33;

pub const TRACKED_JOINT_COUNT: usize = 6;

/// 速度・加速度を追跡する関節（肩・腰・膝）
pub const TRACKED_JOINTS: [LandmarkIndex; TRACKED_JOINT_COUNT] = [
    LandmarkIndex::LeftShoulder,
    LandmarkIndex::RightShoulder,
    LandmarkIndex::LeftHip,
    LandmarkIndex::RightHip,
    LandmarkIndex::LeftKnee,
    LandmarkIndex::RightKnee,
];

impl LandmarkIndex {
    pub const COUNT: usize = LANDMARK_COUNT;

    const ALL: [LandmarkIndex; LANDMARK_COUNT] = {
        use LandmarkIndex::*;
        [
            Nose, LeftEyeInner, LeftEye, LeftEyeOuter, RightEyeInner, RightEye, RightEyeOuter,
            LeftEar, RightEar, MouthLeft, MouthRight,
            LeftShoulder, RightShoulder, LeftElbow, RightElbow, LeftWrist, RightWrist,
            LeftPinky, RightPinky, LeftIndex, RightIndex, LeftThumb, RightThumb,
            LeftHip, RightHip, LeftKnee, RightKnee, LeftAnkle, RightAnkle,
            LeftHeel, RightHeel, LeftFootIndex, RightFootIndex,
        ]
    };

    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }
}

/// 単一ランドマーク
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Landmark {
    /// 正規化されたX座標 (概ね0.0〜1.0)
    pub x: f32,
    /// 正規化されたY座標 (概ね0.0〜1.0、下が正)
    pub y: f32,
    /// 腰中心を基準とした相対深度
    pub z: f32,
    /// 可視度 (0.0〜1.0)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub visibility: Option<f32>,
}

impl Landmark {
    pub fn new(x: f32, y: f32, z: f32) -> Self {
        Self {
            x,
            y,
            z,
            visibility: None,
        }
    }

    pub fn with_visibility(mut self, visibility: f32) -> Self {
        self.visibility = Some(visibility);
        self
    }

    /// 可視度が報告されていないか、0より大きい
    pub fn is_present(&self) -> bool {
        self.visibility.map_or(true, |v| v > 0.0)
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.z.is_finite()
    }

    /// 3Dユークリッド距離
    pub fn distance(&self, other: &Landmark) -> f32 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        let dz = self.z - other.z;
        (dx * dx + dy * dy + dz * dz).sqrt()
    }
}

/// 1フレーム分の 33 ランドマーク
///
/// 構築時に個数と座標の有限性を検証するので、以降のインデックスアクセスは常に有効。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Landmark>", into = "Vec<Landmark>")]
pub struct PoseFrame {
    landmarks: Vec<Landmark>,
}

impl PoseFrame {
    pub fn new(landmarks: Vec<Landmark>) -> Result<Self, AnalysisError> {
        if landmarks.len() != LANDMARK_COUNT {
            return Err(AnalysisError::landmark_count(landmarks.len()));
        }
        if let Some(index) = landmarks.iter().position(|l| !l.is_finite()) {
            return Err(AnalysisError::NonFiniteLandmark { index });
        }
        Ok(Self { landmarks })
    }

    /// インデックスでランドマークを取得
    pub fn get(&self, index: LandmarkIndex) -> &Landmark {
        &self.landmarks[index as usize]
    }

    pub fn landmarks(&self) -> &[Landmark] {
        &self.landmarks
    }

    /// 左右ヒップの中点 (x, y)
    pub fn hip_center(&self) -> (f32, f32) {
        let left = self.get(LandmarkIndex::LeftHip);
        let right = self.get(LandmarkIndex::RightHip);
        ((left.x + right.x) / 2.0, (left.y + right.y) / 2.0)
    }

    pub(crate) fn landmarks_mut(&mut self) -> &mut [Landmark] {
        &mut self.landmarks
    }
}

impl TryFrom<Vec<Landmark>> for PoseFrame {
    type Error = AnalysisError;

    fn try_from(landmarks: Vec<Landmark>) -> Result<Self, Self::Error> {
        Self::new(landmarks)
    }
}

impl From<PoseFrame> for Vec<Landmark> {
    fn from(frame: PoseFrame) -> Self {
        frame.landmarks
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_landmark_index_count() {
        assert_eq!(LandmarkIndex::COUNT, 33);
    }

    #[test]
    fn test_landmark_index_from_index() {
        assert_eq!(LandmarkIndex::from_index(0), Some(LandmarkIndex::Nose));
        assert_eq!(LandmarkIndex::from_index(23), Some(LandmarkIndex::LeftHip));
        assert_eq!(LandmarkIndex::from_index(32), Some(LandmarkIndex::RightFootIndex));
        assert_eq!(LandmarkIndex::from_index(33), None);
    }

    #[test]
    fn test_index_table_matches_discriminants() {
        for i in 0..LANDMARK_COUNT {
            assert_eq!(LandmarkIndex::from_index(i).unwrap() as usize, i);
        }
    }

    #[test]
    fn test_frame_rejects_wrong_count() {
        let err = PoseFrame::new(vec![Landmark::default(); 17]).unwrap_err();
        assert_eq!(err, AnalysisError::LandmarkCount { expected: 33, actual: 17 });
    }

    #[test]
    fn test_frame_rejects_nan() {
        let mut landmarks = vec![Landmark::default(); LANDMARK_COUNT];
        landmarks[24].x = f32::NAN;
        let err = PoseFrame::new(landmarks).unwrap_err();
        assert_eq!(err, AnalysisError::NonFiniteLandmark { index: 24 });
    }

    #[test]
    fn test_frame_get() {
        let mut landmarks = vec![Landmark::default(); LANDMARK_COUNT];
        landmarks[LandmarkIndex::Nose as usize] = Landmark::new(0.5, 0.3, -0.1);
        let frame = PoseFrame::new(landmarks).unwrap();
        let nose = frame.get(LandmarkIndex::Nose);
        assert_eq!(nose.x, 0.5);
        assert_eq!(nose.y, 0.3);
        assert_eq!(nose.z, -0.1);
    }

    #[test]
    fn test_is_present() {
        assert!(Landmark::new(0.0, 0.0, 0.0).is_present());
        assert!(Landmark::new(0.0, 0.0, 0.0).with_visibility(0.4).is_present());
        assert!(!Landmark::new(0.0, 0.0, 0.0).with_visibility(0.0).is_present());
    }

    #[test]
    fn test_distance() {
        let a = Landmark::new(0.0, 0.0, 0.0);
        let b = Landmark::new(0.3, 0.4, 0.0);
        assert!((a.distance(&b) - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_frame_deserialize_validates() {
        let json = serde_json::to_string(&vec![Landmark::new(0.1, 0.2, 0.0); 33]).unwrap();
        let frame: PoseFrame = serde_json::from_str(&json).unwrap();
        assert_eq!(frame.landmarks().len(), 33);

        let short = serde_json::to_string(&vec![Landmark::new(0.1, 0.2, 0.0); 5]).unwrap();
        assert!(serde_json::from_str::<PoseFrame>(&short).is_err());
    }
}
