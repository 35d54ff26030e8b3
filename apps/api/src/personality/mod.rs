//! Interview-video personality analysis.
//!
//! Scores come from an external video-analysis service; this module validates
//! uploads, stores videos and results, and describes the scores.

pub mod analyzer;
pub mod handlers;
pub mod storage;
pub mod traits;

pub use analyzer::{HttpVideoAnalyzer, VideoAnalyzer};
