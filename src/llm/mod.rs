//! LLM integration module

pub mod client;
pub mod prompts;
pub mod justification;

pub use justification::{JustificationGenerator, Justifier};
