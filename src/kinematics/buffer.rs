use std::collections::VecDeque;

use crate::pose::{PoseFrame, TRACKED_JOINTS, TRACKED_JOINT_COUNT};

/// 追跡関節ごとのスカラー値（速度または速度差）
pub type JointVector = [f32; TRACKED_JOINT_COUNT];

/// ポーズ履歴と、そこから導出した速度・加速度履歴
///
/// 不変条件:
/// - `poses.len() <= capacity`
/// - `velocities.len() == max(0, poses.len() - 1)`
/// - `accelerations.len() == max(0, velocities.len() - 1)`
///
/// `velocities[i]` は `poses[i]` → `poses[i + 1]` の移動量、
/// `accelerations[i]` は `velocities[i + 1] - velocities[i]`。
pub struct LandmarkBuffer {
    capacity: usize,
    poses: VecDeque<PoseFrame>,
    timestamps: VecDeque<Option<f64>>,
    velocities: VecDeque<JointVector>,
    accelerations: VecDeque<JointVector>,
}

impl LandmarkBuffer {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            capacity,
            poses: VecDeque::with_capacity(capacity + 1),
            timestamps: VecDeque::with_capacity(capacity + 1),
            velocities: VecDeque::with_capacity(capacity),
            accelerations: VecDeque::with_capacity(capacity),
        }
    }

    /// フレームを末尾に追加し、運動量を更新してから容量超過分を先頭から捨てる
    pub fn push(&mut self, frame: PoseFrame, timestamp: Option<f64>) {
        if let Some(prev) = self.poses.back() {
            let mut velocity = [0.0; TRACKED_JOINT_COUNT];
            for (v, &joint) in velocity.iter_mut().zip(TRACKED_JOINTS.iter()) {
                *v = frame.get(joint).distance(prev.get(joint));
            }

            if let Some(prev_velocity) = self.velocities.back() {
                let mut acceleration = [0.0; TRACKED_JOINT_COUNT];
                for (i, a) in acceleration.iter_mut().enumerate() {
                    *a = velocity[i] - prev_velocity[i];
                }
                self.accelerations.push_back(acceleration);
            }
            self.velocities.push_back(velocity);
        }

        self.poses.push_back(frame);
        self.timestamps.push_back(timestamp);

        if self.poses.len() > self.capacity {
            self.poses.pop_front();
            self.timestamps.pop_front();
            self.velocities.pop_front();
            self.accelerations.pop_front();
        }
    }

    pub fn clear(&mut self) {
        self.poses.clear();
        self.timestamps.clear();
        self.velocities.clear();
        self.accelerations.clear();
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.poses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.poses.is_empty()
    }

    pub fn poses(&self) -> &VecDeque<PoseFrame> {
        &self.poses
    }

    pub fn latest(&self) -> Option<&PoseFrame> {
        self.poses.back()
    }

    /// 最新フレームのタイムスタンプ（無ければ `None`）
    pub fn latest_timestamp(&self) -> Option<f64> {
        self.timestamps.back().copied().flatten()
    }

    /// 直近 `n` フレーム（古い順）
    pub fn recent_poses(&self, n: usize) -> impl Iterator<Item = &PoseFrame> {
        self.poses.iter().skip(self.poses.len().saturating_sub(n))
    }

    pub fn velocities(&self) -> &VecDeque<JointVector> {
        &self.velocities
    }

    pub fn accelerations(&self) -> &VecDeque<JointVector> {
        &self.accelerations
    }

    /// 直近 `n` 件の加速度（古い順）
    pub fn recent_accelerations(&self, n: usize) -> impl Iterator<Item = &JointVector> {
        self.accelerations
            .iter()
            .skip(self.accelerations.len().saturating_sub(n))
    }

    /// 全フレームにタイムスタンプがある場合のみ、`velocities` と同じ並びで
    /// 各速度サンプルの時刻（移動後フレームの時刻）を返す
    pub fn velocity_timestamps(&self) -> Option<Vec<f64>> {
        if self.timestamps.len() < 2 {
            return None;
        }
        self.timestamps.iter().skip(1).copied().collect()
    }
}
