use super::stats::variance;
use crate::kinematics::LandmarkBuffer;
use crate::pose::{LandmarkIndex, PoseFrame};

/// 表現力の評価窓
pub const EXPRESSION_WINDOW: usize = 30;
/// 履歴不足時の中立値
pub const NEUTRAL_EXPRESSION: f32 = 50.0;

fn forearm_angle(frame: &PoseFrame, elbow: LandmarkIndex, wrist: LandmarkIndex) -> f32 {
    let e = frame.get(elbow);
    let w = frame.get(wrist);
    f32::atan2(w.y - e.y, w.x - e.x)
}

/// 前腕角度（肘→手首）の分散が大きいほど動きのバリエーションがあるとみなす
pub fn analyze_expression(buffer: &LandmarkBuffer) -> f32 {
    if buffer.len() < EXPRESSION_WINDOW {
        return NEUTRAL_EXPRESSION;
    }

    let (left, right): (Vec<f32>, Vec<f32>) = buffer
        .recent_poses(EXPRESSION_WINDOW)
        .map(|frame| {
            (
                forearm_angle(frame, LandmarkIndex::LeftElbow, LandmarkIndex::LeftWrist),
                forearm_angle(frame, LandmarkIndex::RightElbow, LandmarkIndex::RightWrist),
            )
        })
        .unzip();

    ((variance(&left) + variance(&right)) * 50.0).min(100.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pose::{Landmark, LANDMARK_COUNT};

    fn arm_frame(left_angle: f32, right_angle: f32) -> PoseFrame {
        let mut landmarks = vec![Landmark::new(0.5, 0.5, 0.0); LANDMARK_COUNT];
        landmarks[LandmarkIndex::LeftElbow as usize] = Landmark::new(0.6, 0.4, 0.0);
        landmarks[LandmarkIndex::LeftWrist as usize] =
            Landmark::new(0.6 + 0.1 * left_angle.cos(), 0.4 + 0.1 * left_angle.sin(), 0.0);
        landmarks[LandmarkIndex::RightElbow as usize] = Landmark::new(0.4, 0.4, 0.0);
        landmarks[LandmarkIndex::RightWrist as usize] =
            Landmark::new(0.4 + 0.1 * right_angle.cos(), 0.4 + 0.1 * right_angle.sin(), 0.0);
        PoseFrame::new(landmarks).unwrap()
    }

    #[test]
    fn test_neutral_during_warmup() {
        let mut buffer = LandmarkBuffer::new(90);
        for _ in 0..29 {
            buffer.push(arm_frame(0.0, 0.0), None);
        }
        assert_eq!(analyze_expression(&buffer), NEUTRAL_EXPRESSION);
    }

    #[test]
    fn test_still_arms_score_zero() {
        let mut buffer = LandmarkBuffer::new(90);
        for _ in 0..30 {
            buffer.push(arm_frame(1.0, -1.0), None);
        }
        assert!(analyze_expression(&buffer) < 1e-4);
    }

    #[test]
    fn test_varied_arms() {
        let mut buffer = LandmarkBuffer::new(90);
        // 左腕のみ ±0.5rad を交互 → 分散0.25 → 12.5
        for i in 0..30 {
            let a = if i % 2 == 0 { 0.5 } else { -0.5 };
            buffer.push(arm_frame(a, 0.0), None);
        }
        assert!((analyze_expression(&buffer) - 12.5).abs() < 0.05);
    }

    #[test]
    fn test_capped_at_100() {
        let mut buffer = LandmarkBuffer::new(90);
        for i in 0..30 {
            let a = if i % 2 == 0 { 1.5 } else { -1.5 };
            buffer.push(arm_frame(a, -a), None);
        }
        assert_eq!(analyze_expression(&buffer), 100.0);
    }
}
