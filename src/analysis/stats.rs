/// 算術平均。空なら0
pub fn mean(values: &[f32]) -> f32 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f32>() / values.len() as f32
}

/// 母分散。空なら0
pub fn variance(values: &[f32]) -> f32 {
    if values.is_empty() {
        return 0.0;
    }
    let m = mean(values);
    values.iter().map(|v| (v - m) * (v - m)).sum::<f32>() / values.len() as f32
}

pub fn std_dev(values: &[f32]) -> f32 {
    variance(values).sqrt()
}

/// 0〜100に丸め込む
pub fn clamp_score(score: f32) -> f32 {
    score.clamp(0.0, 100.0)
}
