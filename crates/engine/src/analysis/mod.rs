//! Dimension-importance analysis.
//!
//! - **vecmath**: the small vector/matrix kernel everything else leans on
//! - **sample**: reproducible index permutations for Monte-Carlo baselines
//! - **analyser**: the two strategies scoring how well each taste dimension
//!   explains a user's ratings

pub mod analyser;
pub mod sample;
pub mod vecmath;

pub use analyser::DimensionAnalyser;
pub use sample::SampleIndexSequence;
