//! Scoring and ranking module

pub mod document;
pub mod embeddings;
pub mod embedding_manager;
pub mod similarity;
pub mod pipeline;
