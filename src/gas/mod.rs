pub mod blending;
pub mod planner;
