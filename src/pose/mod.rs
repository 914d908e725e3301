pub mod landmark;

pub use landmark::{Landmark, LandmarkIndex, PoseFrame, LANDMARK_COUNT, TRACKED_JOINTS, TRACKED_JOINT_COUNT};
