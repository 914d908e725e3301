use crate::config::SmoothingConfig;
use crate::pose::PoseFrame;

/// EMAベースのランドマーク平滑化フィルタ
///
/// 成分ごとに `alpha * 現在 + (1 - alpha) * 前回出力`。可視度はそのまま通す。
pub struct LandmarkSmoother {
    alpha: f32,
    prev: Option<PoseFrame>,
}

impl LandmarkSmoother {
    pub fn new(alpha: f32) -> Self {
        Self {
            alpha: alpha.clamp(0.0, 1.0),
            prev: None,
        }
    }

    /// 無効設定なら `None`
    pub fn from_config(config: &SmoothingConfig) -> Option<Self> {
        config.enabled.then(|| Self::new(config.alpha))
    }

    pub fn apply(&mut self, frame: PoseFrame) -> PoseFrame {
        let prev = match self.prev.take() {
            Some(prev) => prev,
            None => {
                self.prev = Some(frame.clone());
                return frame;
            }
        };

        let a = self.alpha;
        let mut result = frame;
        for (cur, old) in result.landmarks_mut().iter_mut().zip(prev.landmarks()) {
            cur.x = a * cur.x + (1.0 - a) * old.x;
            cur.y = a * cur.y + (1.0 - a) * old.y;
            cur.z = a * cur.z + (1.0 - a) * old.z;
        }

        self.prev = Some(result.clone());
        result
    }

    pub fn reset(&mut self) {
        self.prev = None;
    }
}
