use crate::config::ScoringConfig;
use crate::kinematics::LandmarkBuffer;
use crate::pattern::{CriticalMovement, DancePattern};
use crate::pose::PoseFrame;

/// 動作評価に使う直近フレーム数（30fpsで1秒）
pub const MOVEMENT_WINDOW: usize = 30;
/// これ未満のフレームでは変位を評価しない
const MIN_MOVEMENT_FRAMES: usize = 10;

/// 重要動作の評価結果 (0〜100)
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct MovementScore {
    /// 変位量の一致度
    pub precision: f32,
    /// X方向の一致度
    pub technique: f32,
}

/// 窓内の腰中点の変位
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HipSway {
    pub horizontal: f32,
    pub vertical: f32,
}

fn window_bounds(buffer: &LandmarkBuffer) -> Option<(&PoseFrame, &PoseFrame, usize)> {
    let count = buffer.len().min(MOVEMENT_WINDOW);
    let mut window = buffer.recent_poses(MOVEMENT_WINDOW);
    let start = window.next()?;
    let end = window.last().unwrap_or(start);
    Some((start, end, count))
}

/// パターンの各重要動作について、直近窓の始点→終点の変位を期待値と比較する
pub fn analyze_movement(
    buffer: &LandmarkBuffer,
    pattern: &DancePattern,
    scoring: &ScoringConfig,
) -> MovementScore {
    let (start, end, count) = match window_bounds(buffer) {
        Some(bounds) => bounds,
        None => return MovementScore::default(),
    };
    if count < MIN_MOVEMENT_FRAMES || pattern.critical_movements.is_empty() {
        return MovementScore::default();
    }

    let mut total = MovementScore::default();
    for movement in pattern.critical_movements {
        let score = evaluate_critical_movement(movement, start, end, scoring);
        total.precision += score.precision;
        total.technique += score.technique;
    }

    let n = pattern.critical_movements.len() as f32;
    MovementScore {
        precision: (total.precision / n).min(100.0),
        technique: (total.technique / n).min(100.0),
    }
}

fn evaluate_critical_movement(
    movement: &CriticalMovement,
    start: &PoseFrame,
    end: &PoseFrame,
    scoring: &ScoringConfig,
) -> MovementScore {
    if movement.landmarks.is_empty() {
        return MovementScore::default();
    }
    let expected = &movement.expected;

    let mut precision = 0.0;
    let mut technique = 0.0;
    for &joint in movement.landmarks {
        let a = start.get(joint);
        let b = end.get(joint);
        let dx = b.x - a.x;
        let magnitude = a.distance(b);

        let magnitude_error = (magnitude - expected.magnitude).abs();
        precision += (100.0 - magnitude_error * scoring.precision_error_scale).max(0.0);

        let direction_error = (dx - expected.direction[0]).abs();
        technique += (100.0 - direction_error * scoring.direction_error_scale).max(0.0);
    }

    let n = movement.landmarks.len() as f32;
    MovementScore {
        precision: precision / n,
        technique: technique / n,
    }
}

/// 直近窓の腰中点の変位。フレームが2未満なら `None`
pub fn hip_sway(buffer: &LandmarkBuffer) -> Option<HipSway> {
    let (start, end, count) = window_bounds(buffer)?;
    if count < 2 {
        return None;
    }
    let (sx, sy) = start.hip_center();
    let (ex, ey) = end.hip_center();
    Some(HipSway {
        horizontal: ex - sx,
        vertical: ey - sy,
    })
}
