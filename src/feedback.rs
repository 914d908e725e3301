use serde::Serialize;
use std::collections::VecDeque;

use crate::analysis::stats::{mean, variance};
use crate::scoring::SubScores;

const TECHNIQUE_THRESHOLD: f32 = 70.0;
const RHYTHM_THRESHOLD: f32 = 60.0;
const POSTURE_THRESHOLD: f32 = 75.0;
const FLUIDITY_THRESHOLD: f32 = 65.0;

/// トレンド判定で比較する片側の件数
const TREND_SPAN: usize = 5;
/// 安定度を出すのに必要な最小件数
const MIN_CONSISTENCY_SAMPLES: usize = 3;
/// これを超える平均差をトレンドとみなす（点）
const TREND_MARGIN: f32 = 5.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AdviceCategory {
    Technique,
    Rhythm,
    Posture,
    Style,
}

impl AdviceCategory {
    pub fn as_str(self) -> &'static str {
        match self {
            AdviceCategory::Technique => "technique",
            AdviceCategory::Rhythm => "rhythm",
            AdviceCategory::Posture => "posture",
            AdviceCategory::Style => "style",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    Medium,
    High,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Advice {
    pub category: AdviceCategory,
    pub message: &'static str,
    pub priority: Priority,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggested_exercise: Option<&'static str>,
}

/// 評価軸ごとの品質 (0〜100)
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct MovementQuality {
    pub fluidity: f32,
    pub precision: f32,
    pub rhythm: f32,
    pub expression: f32,
    pub technique: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Trend {
    Improving,
    Declining,
    Stable,
    InsufficientData,
}

impl Trend {
    pub fn message(self) -> &'static str {
        match self {
            Trend::Improving => "Steadily improving!",
            Trend::Declining => "Watch out: performance is declining",
            Trend::Stable => "Performance is stable",
            Trend::InsufficientData => "Keep practicing to see your trends",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProgressTracking {
    /// 直近窓の最後 − 最初
    pub improvement: i32,
    pub consistency: f32,
    pub trend: Trend,
    pub trends_last_session: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DetailedFeedback {
    pub score: u8,
    pub breakdown: MovementQuality,
    pub posture: f32,
    pub detected_bpm: f32,
    pub advice: Vec<Advice>,
    pub progress: ProgressTracking,
}

/// ルール表を順に評価する。各ルールは独立に発火する
pub fn generate_advice(scores: &SubScores) -> Vec<Advice> {
    let mut advice = Vec::new();

    if scores.technique < TECHNIQUE_THRESHOLD {
        advice.push(Advice {
            category: AdviceCategory::Technique,
            message: "Focus on the basic steps and keep each step precise.",
            priority: Priority::High,
            suggested_exercise: Some("Practise the steps slowly in front of a mirror"),
        });
    }
    if scores.rhythm < RHYTHM_THRESHOLD {
        advice.push(Advice {
            category: AdviceCategory::Rhythm,
            message: "Listen closely to the music and try to stay on the beat.",
            priority: Priority::High,
            suggested_exercise: Some("Count the beats out loud: 1-2-3-4-5-6-7-8"),
        });
    }
    if scores.posture < POSTURE_THRESHOLD {
        advice.push(Advice {
            category: AdviceCategory::Posture,
            message: "Keep your back straight and your shoulders relaxed.",
            priority: Priority::Medium,
            suggested_exercise: Some("Imagine a string pulling the top of your head upwards"),
        });
    }
    if scores.fluidity < FLUIDITY_THRESHOLD {
        advice.push(Advice {
            category: AdviceCategory::Style,
            message: "Make your movements smoother and more natural.",
            priority: Priority::Medium,
            suggested_exercise: Some("Practise slow, continuous movements without stopping"),
        });
    }

    advice
}

/// 直近の総合スコアの履歴
#[derive(Debug, Clone)]
pub struct ScoreHistory {
    window: usize,
    scores: VecDeque<u8>,
}

impl ScoreHistory {
    pub fn new(window: usize) -> Self {
        let window = window.max(1);
        Self {
            window,
            scores: VecDeque::with_capacity(window + 1),
        }
    }

    pub fn push(&mut self, score: u8) {
        self.scores.push_back(score);
        if self.scores.len() > self.window {
            self.scores.pop_front();
        }
    }

    pub fn clear(&mut self) {
        self.scores.clear();
    }

    pub fn len(&self) -> usize {
        self.scores.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scores.is_empty()
    }

    pub fn scores(&self) -> impl Iterator<Item = u8> + '_ {
        self.scores.iter().copied()
    }

    fn as_f32(&self) -> Vec<f32> {
        self.scores.iter().map(|&s| s as f32).collect()
    }

    pub fn improvement(&self) -> i32 {
        match (self.scores.front(), self.scores.back()) {
            (Some(&first), Some(&last)) if self.scores.len() > 1 => last as i32 - first as i32,
            _ => 0,
        }
    }

    /// `100 - 分散`。3件未満なら 0
    pub fn consistency(&self) -> f32 {
        if self.scores.len() < MIN_CONSISTENCY_SAMPLES {
            return 0.0;
        }
        (100.0 - variance(&self.as_f32())).clamp(0.0, 100.0)
    }

    /// 最新5件の平均を、その前の最大5件の平均と比べる
    pub fn trend(&self) -> Trend {
        let values = self.as_f32();
        if values.len() < TREND_SPAN {
            return Trend::InsufficientData;
        }
        let split = values.len() - TREND_SPAN;
        let recent_avg = mean(&values[split..]);
        let older = &values[split.saturating_sub(TREND_SPAN)..split];
        let older_avg = if older.is_empty() { recent_avg } else { mean(older) };

        if recent_avg > older_avg + TREND_MARGIN {
            Trend::Improving
        } else if recent_avg < older_avg - TREND_MARGIN {
            Trend::Declining
        } else {
            Trend::Stable
        }
    }

    pub fn progress(&self) -> ProgressTracking {
        let trend = self.trend();
        ProgressTracking {
            improvement: self.improvement(),
            consistency: self.consistency(),
            trend,
            trends_last_session: vec![trend.message().to_string()],
        }
    }
}
