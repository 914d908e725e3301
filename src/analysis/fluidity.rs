use super::stats::clamp_score;
use crate::kinematics::LandmarkBuffer;

/// 滑らかさの評価に使う加速度サンプル数
pub const FLUIDITY_WINDOW: usize = 20;

/// 直近の加速度の絶対値平均（ジャークの代用）が小さいほど高得点
///
/// サンプル不足なら0。
pub fn analyze_fluidity(buffer: &LandmarkBuffer, jerk_scale: f32) -> f32 {
    if buffer.accelerations().len() < FLUIDITY_WINDOW {
        return 0.0;
    }

    let mut total = 0.0;
    let mut count = 0usize;
    for frame in buffer.recent_accelerations(FLUIDITY_WINDOW) {
        for accel in frame {
            total += accel.abs();
            count += 1;
        }
    }
    let avg_jerk = total / count as f32;

    clamp_score(100.0 - avg_jerk * jerk_scale)
}
