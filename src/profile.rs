use anyhow::{Context, Result};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::analysis::posture::DEFAULT_POSTURE_STRICTNESS;
use crate::analysis::stats::mean;
use crate::error::AnalysisError;

/// 直近の誤りとして保持する件数
const MAX_MISTAKES: usize = 20;
/// 改善率の比較窓
const IMPROVEMENT_WINDOW: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum SkillLevel {
    #[default]
    Beginner,
    Intermediate,
    Advanced,
}

/// ユーザーごとの感度設定
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersonalThresholds {
    /// これ未満の腰の横移動は「動きが小さい」とみなす
    #[serde(default = "default_hip_movement_sensitivity")]
    pub hip_movement_sensitivity: f32,
    #[serde(default = "default_posture_strictness")]
    pub posture_strictness: f32,
    /// ビート検出閾値の上乗せ率
    #[serde(default = "default_rhythm_tolerance")]
    pub rhythm_tolerance: f32,
}

fn default_hip_movement_sensitivity() -> f32 { 0.02 }
fn default_posture_strictness() -> f32 { DEFAULT_POSTURE_STRICTNESS }
fn default_rhythm_tolerance() -> f32 { 0.15 }

fn is_non_negative(v: f32) -> bool {
    v.is_finite() && v >= 0.0
}

fn is_positive(v: f32) -> bool {
    v.is_finite() && v > 0.0
}

impl PersonalThresholds {
    /// 姿勢の許容幅は正、それ以外は0以上の有限値でなければならない
    pub fn validate(&self) -> Result<(), AnalysisError> {
        let checks: [(&'static str, f32, fn(f32) -> bool); 3] = [
            ("hip_movement_sensitivity", self.hip_movement_sensitivity, is_non_negative),
            ("posture_strictness", self.posture_strictness, is_positive),
            ("rhythm_tolerance", self.rhythm_tolerance, is_non_negative),
        ];
        match checks.into_iter().find(|&(_, value, ok)| !ok(value)) {
            Some((name, value, _)) => Err(AnalysisError::InvalidThreshold { name, value }),
            None => Ok(()),
        }
    }

    /// 範囲外の値をデフォルトに戻す。戻した項目があれば `true`
    pub fn sanitize(&mut self) -> bool {
        let defaults = Self::default();
        let mut changed = false;
        if !is_non_negative(self.hip_movement_sensitivity) {
            self.hip_movement_sensitivity = defaults.hip_movement_sensitivity;
            changed = true;
        }
        if !is_positive(self.posture_strictness) {
            self.posture_strictness = defaults.posture_strictness;
            changed = true;
        }
        if !is_non_negative(self.rhythm_tolerance) {
            self.rhythm_tolerance = defaults.rhythm_tolerance;
            changed = true;
        }
        changed
    }
}

impl Default for PersonalThresholds {
    fn default() -> Self {
        Self {
            hip_movement_sensitivity: default_hip_movement_sensitivity(),
            posture_strictness: default_posture_strictness(),
            rhythm_tolerance: default_rhythm_tolerance(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct LearningData {
    /// 採点されたスコア（古い順）
    #[serde(default)]
    pub average_scores: Vec<u8>,
    /// 直近10件の平均 − その前の最大10件の平均
    #[serde(default)]
    pub improvement_rate: f32,
    /// 最近の誤り（重複なし、最後に起きたものが末尾）
    #[serde(default)]
    pub common_mistakes: Vec<String>,
}

impl LearningData {
    /// 採点1回分を記録する。`history_limit` を超えた古いスコアは捨てる
    pub fn record(&mut self, score: u8, mistakes: &[String], history_limit: usize) {
        self.average_scores.push(score);
        if self.average_scores.len() > history_limit {
            let excess = self.average_scores.len() - history_limit;
            self.average_scores.drain(..excess);
        }

        let scores = &self.average_scores;
        if scores.len() > IMPROVEMENT_WINDOW {
            let split = scores.len() - IMPROVEMENT_WINDOW;
            let recent: Vec<f32> = scores[split..].iter().map(|&s| s as f32).collect();
            let older: Vec<f32> = scores[split.saturating_sub(IMPROVEMENT_WINDOW)..split]
                .iter()
                .map(|&s| s as f32)
                .collect();
            self.improvement_rate = mean(&recent) - mean(&older);
        }

        for mistake in mistakes {
            self.common_mistakes.retain(|m| m != mistake);
            self.common_mistakes.push(mistake.clone());
        }
        if self.common_mistakes.len() > MAX_MISTAKES {
            let excess = self.common_mistakes.len() - MAX_MISTAKES;
            self.common_mistakes.drain(..excess);
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub skill_level: SkillLevel,
    #[serde(default)]
    pub thresholds: PersonalThresholds,
    #[serde(default)]
    pub learning: LearningData,
}

impl UserProfile {
    pub fn new(id: impl Into<String>, name: impl Into<String>, skill_level: SkillLevel) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            skill_level,
            thresholds: PersonalThresholds::default(),
            learning: LearningData::default(),
        }
    }
}

impl Default for UserProfile {
    fn default() -> Self {
        Self::new("default", "New Dancer", SkillLevel::Beginner)
    }
}

// --- Save / Load ---

pub fn save_profile<P: AsRef<Path>>(path: P, profile: &UserProfile) -> Result<()> {
    let json = serde_json::to_string_pretty(profile)?;
    fs::write(path, json).context("Failed to write profile file")?;
    Ok(())
}

pub fn load_profile<P: AsRef<Path>>(path: P) -> Result<UserProfile> {
    let content = fs::read_to_string(path).context("Failed to read profile file")?;
    let profile: UserProfile = serde_json::from_str(&content).context("Invalid profile JSON")?;
    profile
        .thresholds
        .validate()
        .context("Invalid profile thresholds")?;
    Ok(profile)
}
