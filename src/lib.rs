//! Resume screener library

pub mod cli;
pub mod config;
pub mod error;
pub mod input;
pub mod processing;
pub mod llm;
pub mod output;

pub use error::{Result, ResumeScreenerError};
pub use config::Config;
pub use processing::document::{CandidateResult, Document, RankedResults};
pub use processing::pipeline::{rank_candidates, RankingOutcome, RankingPipeline};
