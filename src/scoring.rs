use crate::profile::SkillLevel;

/// 各評価軸の重み
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoreWeights {
    pub technique: f32,
    pub rhythm: f32,
    pub posture: f32,
    pub fluidity: f32,
    pub expression: f32,
}

impl ScoreWeights {
    /// 初心者はテクニックと姿勢重視、上級者は流れと表現重視
    pub fn for_skill(level: SkillLevel) -> Self {
        match level {
            SkillLevel::Beginner => Self {
                technique: 0.40,
                rhythm: 0.20,
                posture: 0.30,
                fluidity: 0.10,
                expression: 0.00,
            },
            SkillLevel::Intermediate => Self {
                technique: 0.30,
                rhythm: 0.30,
                posture: 0.20,
                fluidity: 0.15,
                expression: 0.05,
            },
            SkillLevel::Advanced => Self {
                technique: 0.25,
                rhythm: 0.25,
                posture: 0.15,
                fluidity: 0.20,
                expression: 0.15,
            },
        }
    }
}

/// 重み付けに使う5軸のサブスコア (0〜100)
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct SubScores {
    pub technique: f32,
    pub rhythm: f32,
    pub posture: f32,
    pub fluidity: f32,
    pub expression: f32,
}

/// スキルレベルに応じた加重和を四捨五入し0〜100に収める
pub fn adaptive_score(scores: &SubScores, level: SkillLevel) -> u8 {
    let w = ScoreWeights::for_skill(level);
    let total = scores.technique * w.technique
        + scores.rhythm * w.rhythm
        + scores.posture * w.posture
        + scores.fluidity * w.fluidity
        + scores.expression * w.expression;
    total.clamp(0.0, 100.0).round() as u8
}
