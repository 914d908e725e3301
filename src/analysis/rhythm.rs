use super::stats::{clamp_score, mean, std_dev};
use crate::kinematics::LandmarkBuffer;
use crate::pattern::DancePattern;

/// テンポ推定に必要な速度サンプル数（30fpsで2秒）
pub const RHYTHM_MIN_SAMPLES: usize = 60;

/// リズム解析結果
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct RhythmAnalysis {
    /// 推定テンポ。ピークが2未満なら0
    pub bpm: f32,
    pub peak_count: usize,
    pub score: f32,
}

/// 平均関節速度の時系列からビート（速度ピーク）を検出し、パターンのBPMと比較する
///
/// 全フレームにタイムスタンプがあれば実時間でBPMを計算し、無ければ `frame_rate` を仮定する。
pub fn analyze_rhythm(
    buffer: &LandmarkBuffer,
    pattern: &DancePattern,
    rhythm_tolerance: f32,
    frame_rate: f32,
) -> RhythmAnalysis {
    let velocities = buffer.velocities();
    if velocities.len() < RHYTHM_MIN_SAMPLES {
        return RhythmAnalysis::default();
    }

    let series: Vec<f32> = velocities.iter().map(|v| mean(v)).collect();
    let peaks = detect_beats(&series, rhythm_tolerance);

    let bpm = match buffer.velocity_timestamps() {
        Some(timestamps) => bpm_from_timestamps(&peaks, &timestamps),
        None => bpm_from_frames(&peaks, frame_rate),
    };

    let expected = pattern.rhythm.beats_per_minute;
    let error = (bpm - expected).abs() / expected;
    RhythmAnalysis {
        bpm,
        peak_count: peaks.len(),
        score: clamp_score(100.0 - error * 100.0),
    }
}

/// `mean + std * (1 + tolerance)` を超え、両隣より厳密に大きいサンプルの位置
pub fn detect_beats(series: &[f32], rhythm_tolerance: f32) -> Vec<usize> {
    if series.len() < 3 {
        return Vec::new();
    }
    let threshold = mean(series) + std_dev(series) * (1.0 + rhythm_tolerance);

    (1..series.len() - 1)
        .filter(|&i| {
            series[i] > series[i - 1] && series[i] > series[i + 1] && series[i] > threshold
        })
        .collect()
}

/// ピーク間隔（フレーム数）の平均からBPMを求める
pub fn bpm_from_frames(peaks: &[usize], frame_rate: f32) -> f32 {
    if peaks.len() < 2 {
        return 0.0;
    }
    let intervals: Vec<f32> = peaks.windows(2).map(|w| (w[1] - w[0]) as f32).collect();
    let avg_interval = mean(&intervals);
    frame_rate / avg_interval * 60.0
}

/// ピーク時刻の間隔（秒）の平均からBPMを求める
pub fn bpm_from_timestamps(peaks: &[usize], timestamps: &[f64]) -> f32 {
    if peaks.len() < 2 {
        return 0.0;
    }
    let total: f64 = peaks
        .windows(2)
        .map(|w| timestamps[w[1]] - timestamps[w[0]])
        .sum();
    let avg_interval = total / (peaks.len() - 1) as f64;
    if !avg_interval.is_finite() || avg_interval <= 0.0 {
        return 0.0;
    }
    (60.0 / avg_interval) as f32
}
