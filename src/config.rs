use anyhow::{ensure, Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::Path;

#[derive(Debug, Deserialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub analysis: AnalysisConfig,
    #[serde(default)]
    pub scoring: ScoringConfig,
    #[serde(default)]
    pub smoothing: SmoothingConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AnalysisConfig {
    /// ポーズ履歴の最大フレーム数（30fpsで約3秒）
    #[serde(default = "default_history_capacity")]
    pub history_capacity: usize,
    /// 解析結果を出すまでに必要なフレーム数
    #[serde(default = "default_warmup_frames")]
    pub warmup_frames: usize,
    /// タイムスタンプが無い場合に仮定するフレームレート
    #[serde(default = "default_frame_rate")]
    pub frame_rate: f32,
    /// 改善度・一貫性を計算するスコア窓
    #[serde(default = "default_score_window")]
    pub score_window: usize,
    /// プロファイルに残すスコア数
    #[serde(default = "default_learning_history")]
    pub learning_history: usize,
}

/// スコア換算の校正定数
#[derive(Debug, Deserialize, Clone)]
pub struct ScoringConfig {
    #[serde(default = "default_precision_error_scale")]
    pub precision_error_scale: f32,
    #[serde(default = "default_direction_error_scale")]
    pub direction_error_scale: f32,
    #[serde(default = "default_jerk_scale")]
    pub jerk_scale: f32,
}

/// ランドマーク入力のEMA平滑化
#[derive(Debug, Deserialize, Clone)]
pub struct SmoothingConfig {
    #[serde(default)]
    pub enabled: bool,
    /// 1.0 = 平滑化なし, 0.0 = 初回値で固定
    #[serde(default = "default_smoothing_alpha")]
    pub alpha: f32,
}

fn default_history_capacity() -> usize { 90 }
fn default_warmup_frames() -> usize { 30 }
fn default_frame_rate() -> f32 { 30.0 }
fn default_score_window() -> usize { 10 }
fn default_learning_history() -> usize { 100 }
fn default_precision_error_scale() -> f32 { 1000.0 }
fn default_direction_error_scale() -> f32 { 500.0 }
fn default_jerk_scale() -> f32 { 1000.0 }
fn default_smoothing_alpha() -> f32 { 0.5 }

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            history_capacity: default_history_capacity(),
            warmup_frames: default_warmup_frames(),
            frame_rate: default_frame_rate(),
            score_window: default_score_window(),
            learning_history: default_learning_history(),
        }
    }
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            precision_error_scale: default_precision_error_scale(),
            direction_error_scale: default_direction_error_scale(),
            jerk_scale: default_jerk_scale(),
        }
    }
}

impl Default for SmoothingConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            alpha: default_smoothing_alpha(),
        }
    }
}

impl Config {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config {}", path.display()))?;
        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config {}", path.display()))?;
        config
            .validate()
            .with_context(|| format!("Invalid config {}", path.display()))?;
        Ok(config)
    }

    /// 値の組み合わせを検証する
    pub fn validate(&self) -> Result<()> {
        let analysis = &self.analysis;
        ensure!(analysis.warmup_frames >= 1, "analysis.warmup_frames must be at least 1");
        ensure!(
            analysis.history_capacity >= analysis.warmup_frames,
            "analysis.history_capacity ({}) must be >= analysis.warmup_frames ({})",
            analysis.history_capacity,
            analysis.warmup_frames
        );
        ensure!(
            analysis.frame_rate.is_finite() && analysis.frame_rate > 0.0,
            "analysis.frame_rate must be positive, got {}",
            analysis.frame_rate
        );
        ensure!(analysis.score_window >= 1, "analysis.score_window must be at least 1");
        ensure!(analysis.learning_history >= 1, "analysis.learning_history must be at least 1");

        let scoring = &self.scoring;
        for (name, value) in [
            ("scoring.precision_error_scale", scoring.precision_error_scale),
            ("scoring.direction_error_scale", scoring.direction_error_scale),
            ("scoring.jerk_scale", scoring.jerk_scale),
        ] {
            ensure!(value.is_finite() && value >= 0.0, "{} must be >= 0, got {}", name, value);
        }

        let alpha = self.smoothing.alpha;
        ensure!(
            (0.0..=1.0).contains(&alpha),
            "smoothing.alpha must be within 0.0..=1.0, got {}",
            alpha
        );
        Ok(())
    }

    /// 読み込みに失敗した場合はデフォルト設定を返す
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Self {
        match Self::load(path) {
            Ok(config) => config,
            Err(e) => {
                tracing::warn!("{:#}; using default config", e);
                Self::default()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.analysis.history_capacity, 90);
        assert_eq!(config.analysis.warmup_frames, 30);
        assert_eq!(config.analysis.frame_rate, 30.0);
        assert_eq!(config.scoring.precision_error_scale, 1000.0);
        assert_eq!(config.scoring.direction_error_scale, 500.0);
        assert_eq!(config.scoring.jerk_scale, 1000.0);
        assert!(!config.smoothing.enabled);
    }

    #[test]
    fn test_partial_toml_fills_defaults() {
        let config: Config = toml::from_str(
            r#"
            [analysis]
            frame_rate = 60.0

            [smoothing]
            enabled = true
            "#,
        )
        .unwrap();
        assert_eq!(config.analysis.frame_rate, 60.0);
        assert_eq!(config.analysis.history_capacity, 90);
        assert!(config.smoothing.enabled);
        assert_eq!(config.smoothing.alpha, 0.5);
        assert_eq!(config.scoring.jerk_scale, 1000.0);
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[scoring]\njerk_scale = 250.0").unwrap();
        let config = Config::load(file.path()).unwrap();
        assert_eq!(config.scoring.jerk_scale, 250.0);
    }

    #[test]
    fn test_default_config_is_valid() {
        assert!(Config::default().validate().is_ok());
    }

    #[test]
    fn test_history_shorter_than_warmup_rejected() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[analysis]\nhistory_capacity = 20").unwrap();
        let err = Config::load(file.path()).unwrap_err();
        assert!(format!("{:#}", err).contains("history_capacity"));

        let config = Config::load_or_default(file.path());
        assert_eq!(config.analysis.history_capacity, 90);
    }

    #[test]
    fn test_invalid_values_rejected() {
        let mut config = Config::default();
        config.analysis.frame_rate = 0.0;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.analysis.frame_rate = -30.0;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.analysis.warmup_frames = 0;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.smoothing.alpha = 1.5;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.scoring.jerk_scale = f32::NAN;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_load_or_default_missing_file() {
        let config = Config::load_or_default("does/not/exist.toml");
        assert_eq!(config.analysis.score_window, 10);
    }
}
