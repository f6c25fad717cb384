//! Counter-driven recommendations: view recording and ranking of
//! per-product and per-session recommendations.

pub mod ranking;
pub mod recommendations;
pub mod visits;

pub use recommendations::RecommendationEngine;
pub use visits::VisitRecorder;
