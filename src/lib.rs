pub mod analysis;
pub mod analyzer;
pub mod config;
pub mod error;
pub mod feedback;
pub mod kinematics;
pub mod pattern;
pub mod pose;
pub mod profile;
pub mod scoring;

pub use analyzer::DanceAnalyzer;
pub use error::AnalysisError;
pub use feedback::DetailedFeedback;
pub use pattern::DanceMove;
pub use pose::{Landmark, PoseFrame};
pub use profile::{SkillLevel, UserProfile};
