//! Embeddings generation using Model2Vec

use crate::config::Config;
use crate::error::{Result, ResumeScreenerError};
use crate::processing::embedding_manager::EmbeddingModelManager;
use log::{debug, info};
use model2vec_rs::model::StaticModel;
use std::collections::HashMap;
use std::path::Path;
use std::time::Instant;

/// Token limit passed to model2vec. `None` embeds the whole text; `StaticModel::encode` would cut at 512.
const ENCODE_MAX_LENGTH: Option<usize> = None;
const ENCODE_BATCH_SIZE: usize = 1024;

/// Maps text to a fixed-dimension vector. The same text must always map to the same vector.
pub trait EmbeddingProvider {
    fn model_name(&self) -> &str;

    fn embed(&mut self, text: &str) -> Result<Vec<f32>>;
}

pub struct EmbeddingEngine {
    model: StaticModel,
    cache: HashMap<String, Vec<f32>>,
    enable_cache: bool,
    model_name: String,
}

#[derive(Debug, Clone)]
pub struct EmbeddingResult {
    pub embedding: Vec<f32>,
    pub processing_time_ms: u64,
    pub cache_hit: bool,
}

#[derive(Debug, Clone)]
pub struct CacheStats {
    pub cache_size: usize,
    pub model_name: String,
}

impl EmbeddingEngine {
    pub fn new(model_path: &Path, model_name: &str, config: &Config) -> Result<Self> {
        let start_time = Instant::now();

        info!("Loading Model2Vec embedding model from: {}", model_path.display());

        let model = StaticModel::from_pretrained(
            model_path,
            None, // token
            None, // normalize
            None, // subfolder
        )
        .map_err(|e| ResumeScreenerError::ModelLoading(format!("Failed to load '{}': {}", model_name, e)))?;

        info!("Model loaded successfully in {:.2?}", start_time.elapsed());

        Ok(Self {
            model,
            cache: HashMap::new(),
            enable_cache: config.processing.enable_embedding_cache,
            model_name: model_name.to_string(),
        })
    }

    /// Load the configured default model, downloading it first if needed.
    pub async fn from_config(config: &Config) -> Result<Self> {
        let requested = &config.models.default_embedding_model;

        // A directory path skips the catalogue entirely
        let direct_path = Path::new(requested);
        if direct_path.is_dir() {
            return Self::new(direct_path, requested, config);
        }

        let mut manager = EmbeddingModelManager::new(config.models_dir().clone()).await?;
        let model_id = manager
            .resolve_model_id(requested)
            .ok_or_else(|| ResumeScreenerError::ModelNotFound(requested.clone()))?;
        let model_path = manager.ensure_model_available(&model_id).await?;

        Self::new(&model_path, &model_id, config)
    }

    /// Encode a single text, reusing a previous encoding of the same text when caching is on.
    ///
    /// Long resumes are embedded in full, with no token limit.
    pub fn encode_single_cached(&mut self, text: &str) -> EmbeddingResult {
        if self.enable_cache {
            if let Some(cached_embedding) = self.cache.get(text) {
                return EmbeddingResult {
                    embedding: cached_embedding.clone(),
                    processing_time_ms: 0,
                    cache_hit: true,
                };
            }
        }

        let start_time = Instant::now();
        let embedding = self
            .model
            .encode_with_args(&[text.to_string()], ENCODE_MAX_LENGTH, ENCODE_BATCH_SIZE)
            .into_iter()
            .next()
            .unwrap_or_default();
        let processing_time = start_time.elapsed().as_millis() as u64;

        if self.enable_cache {
            self.cache.insert(text.to_string(), embedding.clone());
        }

        EmbeddingResult {
            embedding,
            processing_time_ms: processing_time,
            cache_hit: false,
        }
    }

    pub fn cache_stats(&self) -> CacheStats {
        CacheStats {
            cache_size: self.cache.len(),
            model_name: self.model_name.clone(),
        }
    }

    pub fn clear_cache(&mut self) {
        self.cache.clear();
    }
}

impl EmbeddingProvider for EmbeddingEngine {
    fn model_name(&self) -> &str {
        &self.model_name
    }

    fn embed(&mut self, text: &str) -> Result<Vec<f32>> {
        let result = self.encode_single_cached(text);
        debug!(
            "Embedded {} chars into {} dims in {}ms{}",
            text.chars().count(),
            result.embedding.len(),
            result.processing_time_ms,
            if result.cache_hit { " (cached)" } else { "" }
        );

        if result.embedding.is_empty() {
            return Err(ResumeScreenerError::Embedding(format!(
                "Model '{}' returned an empty embedding",
                self.model_name
            )));
        }

        Ok(result.embedding)
    }
}
