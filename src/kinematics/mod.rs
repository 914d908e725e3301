pub mod buffer;
pub mod smooth;

pub use buffer::{JointVector, LandmarkBuffer};
pub use smooth::LandmarkSmoother;
