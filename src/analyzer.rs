use crate::analysis::{
    analyze_expression, analyze_fluidity, analyze_movement, analyze_posture, analyze_rhythm,
    hip_sway,
};
use crate::config::{AnalysisConfig, Config, ScoringConfig};
use crate::error::AnalysisError;
use crate::feedback::{generate_advice, DetailedFeedback, MovementQuality, ScoreHistory};
use crate::kinematics::{LandmarkBuffer, LandmarkSmoother};
use crate::pattern::{pattern_for, DanceMove, DancePattern};
use crate::pose::{Landmark, PoseFrame};
use crate::profile::UserProfile;
use crate::scoring::{adaptive_score, SubScores};

/// 腰の横移動が感度未満だったときに記録する誤り
pub const LIMITED_HIP_SWAY: &str = "limited-hip-sway";

/// 1ユーザー・1セッション分の解析器
///
/// フレームは1枚ずつ同期的に処理する。バッファ・スコア履歴・プロファイルはすべてこの構造体が排他的に所有する。
pub struct DanceAnalyzer {
    analysis: AnalysisConfig,
    scoring: ScoringConfig,
    buffer: LandmarkBuffer,
    smoother: Option<LandmarkSmoother>,
    history: ScoreHistory,
    profile: UserProfile,
    current_move: Option<DanceMove>,
}

impl DanceAnalyzer {
    pub fn new(profile: UserProfile) -> Self {
        Self::with_config(&Config::default(), profile)
    }

    pub fn with_config(config: &Config, mut profile: UserProfile) -> Self {
        Self::sanitize_profile(&mut profile);
        Self {
            analysis: config.analysis.clone(),
            scoring: config.scoring.clone(),
            buffer: LandmarkBuffer::new(config.analysis.history_capacity),
            smoother: LandmarkSmoother::from_config(&config.smoothing),
            history: ScoreHistory::new(config.analysis.score_window),
            profile,
            current_move: None,
        }
    }

    /// 33ランドマークを検証して解析する
    ///
    /// - `Err`: 入力契約違反（フレームはバッファに入らない）
    /// - `Ok(None)`: ウォームアップ中
    pub fn analyze(
        &mut self,
        landmarks: Vec<Landmark>,
        dance_move: DanceMove,
    ) -> Result<Option<DetailedFeedback>, AnalysisError> {
        let frame = Self::validate(landmarks)?;
        Ok(self.analyze_frame(frame, dance_move, None))
    }

    /// キャプチャ時刻（秒）付きで解析する。全フレームに時刻があればテンポは実時間で計算される
    ///
    /// 時刻は有限でなければならず、同じ動作の直前フレームより前に戻ってはならない
    pub fn analyze_at(
        &mut self,
        landmarks: Vec<Landmark>,
        dance_move: DanceMove,
        timestamp_secs: f64,
    ) -> Result<Option<DetailedFeedback>, AnalysisError> {
        let frame = Self::validate(landmarks)?;
        self.check_timestamp(dance_move, timestamp_secs)
            .map_err(Self::log_rejection)?;
        Ok(self.analyze_frame(frame, dance_move, Some(timestamp_secs)))
    }

    fn validate(landmarks: Vec<Landmark>) -> Result<PoseFrame, AnalysisError> {
        PoseFrame::new(landmarks).map_err(Self::log_rejection)
    }

    fn log_rejection(e: AnalysisError) -> AnalysisError {
        tracing::warn!("Rejected pose frame: {}", e);
        e
    }

    fn check_timestamp(&self, dance_move: DanceMove, timestamp: f64) -> Result<(), AnalysisError> {
        if !timestamp.is_finite() {
            return Err(AnalysisError::NonFiniteTimestamp(timestamp));
        }
        // 動作の切り替え時はバッファが空になる
        if self.current_move != Some(dance_move) {
            return Ok(());
        }
        match self.buffer.latest_timestamp() {
            Some(previous) if timestamp < previous => Err(AnalysisError::TimestampOutOfOrder {
                previous,
                current: timestamp,
            }),
            _ => Ok(()),
        }
    }

    /// 検証済みフレームを解析する
    pub fn analyze_frame(
        &mut self,
        frame: PoseFrame,
        dance_move: DanceMove,
        timestamp: Option<f64>,
    ) -> Option<DetailedFeedback> {
        if self.current_move.is_some_and(|m| m != dance_move) {
            tracing::info!("Dance move changed to {}, resetting session", dance_move);
            self.reset();
        }
        self.current_move = Some(dance_move);

        let frame = match self.smoother.as_mut() {
            Some(smoother) => smoother.apply(frame),
            None => frame,
        };
        self.buffer.push(frame, timestamp);

        let buffered = self.buffer.len();
        if buffered < self.analysis.warmup_frames {
            return None;
        }
        if buffered == self.analysis.warmup_frames {
            tracing::debug!("Warm-up complete after {} frames", buffered);
        }

        Some(self.score(pattern_for(dance_move)))
    }

    fn score(&mut self, pattern: &DancePattern) -> DetailedFeedback {
        let thresholds = &self.profile.thresholds;

        let movement = analyze_movement(&self.buffer, pattern, &self.scoring);
        let rhythm = analyze_rhythm(
            &self.buffer,
            pattern,
            thresholds.rhythm_tolerance,
            self.analysis.frame_rate,
        );
        let posture = match self.buffer.latest() {
            Some(latest) => analyze_posture(latest, thresholds.posture_strictness).score,
            None => 0.0,
        };
        let fluidity = analyze_fluidity(&self.buffer, self.scoring.jerk_scale);
        let expression = analyze_expression(&self.buffer);

        tracing::trace!(
            technique = movement.technique,
            precision = movement.precision,
            rhythm = rhythm.score,
            bpm = rhythm.bpm,
            posture,
            fluidity,
            expression,
            "sub-scores"
        );

        let sub_scores = SubScores {
            technique: movement.technique,
            rhythm: rhythm.score,
            posture,
            fluidity,
            expression,
        };
        let score = adaptive_score(&sub_scores, self.profile.skill_level);
        let advice = generate_advice(&sub_scores);

        self.history.push(score);
        let progress = self.history.progress();

        let mut mistakes: Vec<String> = advice
            .iter()
            .map(|a| a.category.as_str().to_string())
            .collect();
        if pattern.expected_pattern.expects_hip_sway() {
            if let Some(sway) = hip_sway(&self.buffer) {
                if sway.horizontal.abs() < thresholds.hip_movement_sensitivity {
                    mistakes.push(LIMITED_HIP_SWAY.to_string());
                }
            }
        }
        self.profile
            .learning
            .record(score, &mistakes, self.analysis.learning_history);

        tracing::debug!(
            "{}: score {} ({} advice, trend {:?})",
            pattern.name,
            score,
            advice.len(),
            progress.trend
        );

        DetailedFeedback {
            score,
            breakdown: MovementQuality {
                fluidity,
                precision: movement.precision,
                rhythm: rhythm.score,
                expression,
                technique: movement.technique,
            },
            posture,
            detected_bpm: rhythm.bpm,
            advice,
            progress,
        }
    }

    /// バッファとスコア履歴を空にする。プロファイルは保持する
    pub fn reset(&mut self) {
        self.buffer.clear();
        if let Some(smoother) = self.smoother.as_mut() {
            smoother.reset();
        }
        self.history.clear();
        self.current_move = None;
        tracing::info!("Analyzer reset");
    }

    pub fn user_profile(&self) -> &UserProfile {
        &self.profile
    }

    /// 範囲外のしきい値はデフォルトに戻してから設定する
    pub fn set_user_profile(&mut self, mut profile: UserProfile) {
        Self::sanitize_profile(&mut profile);
        tracing::info!("User profile set: {} ({:?})", profile.id, profile.skill_level);
        self.profile = profile;
    }

    fn sanitize_profile(profile: &mut UserProfile) {
        if let Err(e) = profile.thresholds.validate() {
            tracing::warn!("Profile {}: {}; restoring default thresholds", profile.id, e);
            profile.thresholds.sanitize();
        }
    }

    /// セッション終了時にプロファイルを取り出す
    pub fn into_user_profile(self) -> UserProfile {
        self.profile
    }

    pub fn frames_buffered(&self) -> usize {
        self.buffer.len()
    }

    pub fn buffer(&self) -> &LandmarkBuffer {
        &self.buffer
    }

    pub fn score_history(&self) -> &ScoreHistory {
        &self.history
    }
}

impl Default for DanceAnalyzer {
    fn default() -> Self {
        Self::new(UserProfile::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pose::LANDMARK_COUNT;

    fn still_landmarks() -> Vec<Landmark> {
        vec![Landmark::new(0.5, 0.5, 0.0); LANDMARK_COUNT]
    }

    #[test]
    fn test_warmup_returns_none() {
        let mut analyzer = DanceAnalyzer::default();
        for _ in 0..29 {
            let result = analyzer.analyze(still_landmarks(), DanceMove::BasicStep).unwrap();
            assert!(result.is_none());
        }
        let result = analyzer.analyze(still_landmarks(), DanceMove::BasicStep).unwrap();
        assert!(result.is_some());
    }

    #[test]
    fn test_invalid_frame_not_buffered() {
        let mut analyzer = DanceAnalyzer::default();
        let err = analyzer
            .analyze(vec![Landmark::default(); 10], DanceMove::BasicStep)
            .unwrap_err();
        assert_eq!(err, AnalysisError::LandmarkCount { expected: 33, actual: 10 });
        assert_eq!(analyzer.frames_buffered(), 0);
    }

    #[test]
    fn test_move_change_resets() {
        let mut analyzer = DanceAnalyzer::default();
        for _ in 0..35 {
            analyzer.analyze(still_landmarks(), DanceMove::BasicStep).unwrap();
        }
        assert_eq!(analyzer.score_history().len(), 6);
        let result = analyzer.analyze(still_landmarks(), DanceMove::SideStep).unwrap();
        assert!(result.is_none());
        assert_eq!(analyzer.frames_buffered(), 1);
        assert!(analyzer.score_history().is_empty());
    }

    #[test]
    fn test_learning_data_updated() {
        let mut analyzer = DanceAnalyzer::default();
        for _ in 0..32 {
            analyzer.analyze(still_landmarks(), DanceMove::BasicStep).unwrap();
        }
        let profile = analyzer.user_profile();
        assert_eq!(profile.learning.average_scores.len(), 3);
        assert!(profile
            .learning
            .common_mistakes
            .iter()
            .any(|m| m == LIMITED_HIP_SWAY));
    }

    #[test]
    fn test_invalid_thresholds_restored() {
        let mut profile = UserProfile::default();
        profile.thresholds.posture_strictness = 0.0;
        profile.thresholds.rhythm_tolerance = -0.5;

        let analyzer = DanceAnalyzer::new(profile.clone());
        assert_eq!(analyzer.user_profile().thresholds, crate::profile::PersonalThresholds::default());

        let mut analyzer = DanceAnalyzer::default();
        analyzer.set_user_profile(profile);
        assert_eq!(analyzer.user_profile().thresholds.posture_strictness, 0.05);
        assert_eq!(analyzer.user_profile().thresholds.rhythm_tolerance, 0.15);
    }

    #[test]
    fn test_zero_strictness_profile_scores_symmetric_pose() {
        let mut profile = UserProfile::default();
        profile.thresholds.posture_strictness = 0.0;
        let mut analyzer = DanceAnalyzer::new(profile);
        let mut last = None;
        for _ in 0..30 {
            last = analyzer.analyze(still_landmarks(), DanceMove::BasicStep).unwrap();
        }
        assert!((last.unwrap().posture - 100.0).abs() < 1e-3);
    }

    #[test]
    fn test_side_step_does_not_track_hip_sway() {
        let mut analyzer = DanceAnalyzer::default();
        for _ in 0..32 {
            analyzer.analyze(still_landmarks(), DanceMove::SideStep).unwrap();
        }
        assert!(!analyzer
            .user_profile()
            .learning
            .common_mistakes
            .iter()
            .any(|m| m == LIMITED_HIP_SWAY));
    }

    #[test]
    fn test_timestamp_rejections() {
        let mut analyzer = DanceAnalyzer::default();
        analyzer.analyze_at(still_landmarks(), DanceMove::BasicStep, 1.0).unwrap();

        let err = analyzer
            .analyze_at(still_landmarks(), DanceMove::BasicStep, f64::NAN)
            .unwrap_err();
        assert!(matches!(err, AnalysisError::NonFiniteTimestamp(_)));

        let err = analyzer
            .analyze_at(still_landmarks(), DanceMove::BasicStep, 0.5)
            .unwrap_err();
        assert_eq!(err, AnalysisError::TimestampOutOfOrder { previous: 1.0, current: 0.5 });
        assert_eq!(analyzer.frames_buffered(), 1);

        // 動作の切り替えでは時刻が戻ってもよい
        analyzer.analyze_at(still_landmarks(), DanceMove::SideStep, 0.0).unwrap();
        assert_eq!(analyzer.frames_buffered(), 1);
    }

    #[test]
    fn test_reset_keeps_profile() {
        let mut analyzer = DanceAnalyzer::new(UserProfile::new("p", "P", crate::profile::SkillLevel::Advanced));
        for _ in 0..31 {
            analyzer.analyze(still_landmarks(), DanceMove::BasicStep).unwrap();
        }
        analyzer.reset();
        assert_eq!(analyzer.frames_buffered(), 0);
        assert!(analyzer.buffer().velocities().is_empty());
        assert_eq!(analyzer.user_profile().id, "p");
        assert_eq!(analyzer.user_profile().learning.average_scores.len(), 2);
    }
}
