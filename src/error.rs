use thiserror::Error;

use crate::pose::LANDMARK_COUNT;

/// 入力契約違反
///
/// ウォームアップ中（履歴不足）はエラーではなく `Ok(None)` で表す。
#[derive(Debug, Clone, PartialEq, Error)]
pub enum AnalysisError {
    #[error("pose frame must contain {expected} landmarks, got {actual}")]
    LandmarkCount { expected: usize, actual: usize },
    #[error("landmark {index} has a non-finite coordinate")]
    NonFiniteLandmark { index: usize },
    #[error("unknown dance move '{0}'")]
    UnknownMove(String),
    #[error("frame timestamp {0} is not finite")]
    NonFiniteTimestamp(f64),
    #[error("frame timestamp {current} is earlier than the previous frame ({previous})")]
    TimestampOutOfOrder { previous: f64, current: f64 },
    #[error("threshold {name} = {value} is out of range")]
    InvalidThreshold { name: &'static str, value: f32 },
}

impl AnalysisError {
    pub fn landmark_count(actual: usize) -> Self {
        Self::LandmarkCount {
            expected: LANDMARK_COUNT,
            actual,
        }
    }
}
