pub mod expression;
pub mod fluidity;
pub mod movement;
pub mod posture;
pub mod rhythm;
pub mod stats;

pub use expression::analyze_expression;
pub use fluidity::analyze_fluidity;
pub use movement::{analyze_movement, hip_sway, HipSway, MovementScore};
pub use posture::{analyze_posture, PostureAnalysis};
pub use rhythm::{analyze_rhythm, RhythmAnalysis};
