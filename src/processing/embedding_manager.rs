//! Embedding model management for downloading and managing Model2Vec models

use crate::error::{Result, ResumeScreenerError};
use hf_hub::api::tokio::Api;
use log::{info, warn};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use tokio::fs;

/// Files `StaticModel::from_pretrained` needs in a local model directory.
const REQUIRED_FILES: [&str; 3] = ["model.safetensors", "tokenizer.json", "config.json"];
const OPTIONAL_FILES: [&str; 1] = ["README.md"];

/// Information about an available embedding model
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbeddingModelInfo {
    pub name: String,
    pub repo_id: String,
    pub size_mb: u64,
    pub description: String,
    pub model_type: EmbeddingModelType,
    pub dimensions: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum EmbeddingModelType {
    Model2Vec,
    Potion,
    Custom,
}

/// Manager for embedding models - handles download, caching, and selection
pub struct EmbeddingModelManager {
    models_dir: PathBuf,
    available_models: HashMap<String, EmbeddingModelInfo>,
    downloaded_models: HashSet<String>,
    api: Api,
}

impl EmbeddingModelManager {
    /// Create a new embedding model manager
    pub async fn new(models_dir: PathBuf) -> Result<Self> {
        if !models_dir.exists() {
            fs::create_dir_all(&models_dir).await.map_err(|e| {
                ResumeScreenerError::ModelError(format!("Failed to create models directory: {}", e))
            })?;
        }

        let api = Api::new()
            .map_err(|e| ResumeScreenerError::ModelError(format!("Failed to initialize HF API: {}", e)))?;

        let mut manager = Self {
            models_dir,
            available_models: HashMap::new(),
            downloaded_models: HashSet::new(),
            api,
        };

        manager.init_available_models();
        manager.scan_downloaded_models().await?;

        Ok(manager)
    }

    fn init_available_models(&mut self) {
        self.available_models.insert(
            "potion-base-8M".to_string(),
            EmbeddingModelInfo {
                name: "Potion Base 8M".to_string(),
                repo_id: "minishlab/potion-base-8M".to_string(),
                size_mb: 33,
                description: "High-quality Model2Vec embeddings with 8M parameters".to_string(),
                model_type: EmbeddingModelType::Potion,
                dimensions: 256,
            },
        );

        self.available_models.insert(
            "m2v-base".to_string(),
            EmbeddingModelInfo {
                name: "Model2Vec Base".to_string(),
                repo_id: "minishlab/M2V_base_output".to_string(),
                size_mb: 90,
                description: "Legacy Model2Vec base embeddings model".to_string(),
                model_type: EmbeddingModelType::Model2Vec,
                dimensions: 256,
            },
        );

        self.available_models.insert(
            "m2v-large".to_string(),
            EmbeddingModelInfo {
                name: "Model2Vec Large".to_string(),
                repo_id: "minishlab/M2V_large_output".to_string(),
                size_mb: 250,
                description: "High-capacity Model2Vec large embeddings model".to_string(),
                model_type: EmbeddingModelType::Model2Vec,
                dimensions: 512,
            },
        );
    }

    async fn scan_downloaded_models(&mut self) -> Result<()> {
        let mut entries = fs::read_dir(&self.models_dir).await.map_err(|e| {
            ResumeScreenerError::ModelError(format!("Failed to scan models directory: {}", e))
        })?;

        while let Some(entry) = entries.next_entry().await.map_err(|e| {
            ResumeScreenerError::ModelError(format!("Failed to read directory entry: {}", e))
        })? {
            if entry.path().is_dir() && Self::is_valid_model_directory(&entry.path()).await {
                self.downloaded_models.insert(entry.file_name().to_string_lossy().to_string());
            }
        }

        Ok(())
    }

    async fn is_valid_model_directory(path: &Path) -> bool {
        for file in REQUIRED_FILES {
            if fs::metadata(path.join(file)).await.is_err() {
                return false;
            }
        }
        true
    }

    /// Directory name used for a model id; repo ids contain a slash.
    fn model_dir(&self, model_id: &str) -> PathBuf {
        self.models_dir.join(model_id.replace('/', "--"))
    }

    /// Download an embedding model from Hugging Face Hub
    pub async fn download_model(&mut self, model_id: &str) -> Result<PathBuf> {
        let model_info = self
            .available_models
            .get(model_id)
            .ok_or_else(|| ResumeScreenerError::ModelNotFound(model_id.to_string()))?
            .clone();

        let model_dir = self.model_dir(model_id);

        info!("Downloading embedding model: {} ({} MB) from {}", model_info.name, model_info.size_mb, model_info.repo_id);

        fs::create_dir_all(&model_dir).await.map_err(|e| {
            ResumeScreenerError::ModelError(format!("Failed to create model directory: {}", e))
        })?;

        let repo = self.api.repo(hf_hub::Repo::model(model_info.repo_id.clone()));

        for file in REQUIRED_FILES {
            let cached = repo.get(file).await.map_err(|e| {
                ResumeScreenerError::ModelLoading(format!("Failed to download required file {}: {}", file, e))
            })?;
            fs::copy(&cached, model_dir.join(file))
                .await
                .map_err(|e| ResumeScreenerError::ModelError(format!("Failed to copy {}: {}", file, e)))?;
            info!("Downloaded: {}", file);
        }

        for file in OPTIONAL_FILES {
            match repo.get(file).await {
                Ok(cached) => {
                    fs::copy(&cached, model_dir.join(file)).await?;
                }
                Err(e) => warn!("Optional file {} not found: {}", file, e),
            }
        }

        self.downloaded_models.insert(model_id.replace('/', "--"));

        info!("Embedding model {} downloaded", model_info.name);
        Ok(model_dir)
    }

    /// Get path to a downloaded model
    pub fn get_model_path(&self, model_id: &str) -> Option<PathBuf> {
        if self.is_model_downloaded(model_id) {
            Some(self.model_dir(model_id))
        } else {
            None
        }
    }

    /// Get or download a model, returning its path
    pub async fn ensure_model_available(&mut self, model_id: &str) -> Result<PathBuf> {
        if let Some(path) = self.get_model_path(model_id) {
            return Ok(path);
        }

        self.download_model(model_id).await
    }

    /// Remove a downloaded model's directory
    pub async fn remove_model(&mut self, model_id: &str) -> Result<PathBuf> {
        let path = self
            .get_model_path(model_id)
            .ok_or_else(|| ResumeScreenerError::ModelNotFound(format!("{} is not downloaded", model_id)))?;

        fs::remove_dir_all(&path)
            .await
            .map_err(|e| ResumeScreenerError::ModelError(format!("Failed to remove model: {}", e)))?;
        self.downloaded_models.remove(&model_id.replace('/', "--"));

        Ok(path)
    }

    /// List all available models, sorted by id
    pub fn list_available_models(&self) -> Vec<(&String, &EmbeddingModelInfo)> {
        let mut models: Vec<_> = self.available_models.iter().collect();
        models.sort_by(|a, b| a.0.cmp(b.0));
        models
    }

    pub fn list_downloaded_models(&self) -> Vec<String> {
        let mut models: Vec<String> = self.downloaded_models.iter().cloned().collect();
        models.sort();
        models
    }

    pub fn get_model_info(&self, model_id: &str) -> Option<&EmbeddingModelInfo> {
        self.available_models.get(model_id)
    }

    pub fn is_model_downloaded(&self, model_id: &str) -> bool {
        self.downloaded_models.contains(&model_id.replace('/', "--"))
    }

    /// Resolve model ID from various formats (id, repo_id, display name).
    ///
    /// An unknown `owner/name` repo id is registered as a custom model.
    pub fn resolve_model_id(&mut self, input: &str) -> Option<String> {
        if self.available_models.contains_key(input) {
            return Some(input.to_string());
        }

        for (id, info) in &self.available_models {
            if info.repo_id == input {
                return Some(id.clone());
            }
        }

        let input_lower = input.to_lowercase();
        for (id, info) in &self.available_models {
            if info.name.to_lowercase() == input_lower {
                return Some(id.clone());
            }
        }

        if input.split('/').filter(|part| !part.is_empty()).count() == 2 {
            self.available_models.insert(
                input.to_string(),
                EmbeddingModelInfo {
                    name: input.to_string(),
                    repo_id: input.to_string(),
                    size_mb: 0,
                    description: "Custom Model2Vec model from the Hugging Face Hub".to_string(),
                    model_type: EmbeddingModelType::Custom,
                    dimensions: 0,
                },
            );
            return Some(input.to_string());
        }

        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_embedding_model_manager_creation() {
        let temp_dir = TempDir::new().unwrap();
        let manager = EmbeddingModelManager::new(temp_dir.path().to_path_buf()).await.unwrap();

        assert_eq!(manager.list_available_models().len(), 3);
        assert!(manager.list_downloaded_models().is_empty());
    }

    #[tokio::test]
    async fn test_resolve_model_id() {
        let temp_dir = TempDir::new().unwrap();
        let mut manager = EmbeddingModelManager::new(temp_dir.path().to_path_buf()).await.unwrap();

        assert_eq!(manager.resolve_model_id("potion-base-8M"), Some("potion-base-8M".to_string()));
        assert_eq!(manager.resolve_model_id("minishlab/potion-base-8M"), Some("potion-base-8M".to_string()));
        assert_eq!(manager.resolve_model_id("Potion Base 8M"), Some("potion-base-8M".to_string()));
        assert_eq!(manager.resolve_model_id("all-MiniLM-L6-v2"), None);

        assert_eq!(
            manager.resolve_model_id("minishlab/potion-base-32M"),
            Some("minishlab/potion-base-32M".to_string())
        );
        assert!(manager.get_model_info("minishlab/potion-base-32M").is_some());
    }

    #[tokio::test]
    async fn test_scan_finds_complete_model_directories() {
        let temp_dir = TempDir::new().unwrap();
        let complete = temp_dir.path().join("potion-base-8M");
        let partial = temp_dir.path().join("m2v-base");
        std::fs::create_dir_all(&complete).unwrap();
        std::fs::create_dir_all(&partial).unwrap();
        for file in REQUIRED_FILES {
            std::fs::write(complete.join(file), b"{}").unwrap();
        }
        std::fs::write(partial.join("tokenizer.json"), b"{}").unwrap();

        let mut manager = EmbeddingModelManager::new(temp_dir.path().to_path_buf()).await.unwrap();
        assert!(manager.is_model_downloaded("potion-base-8M"));
        assert!(!manager.is_model_downloaded("m2v-base"));
        assert_eq!(manager.get_model_path("potion-base-8M"), Some(complete.clone()));

        let removed = manager.remove_model("potion-base-8M").await.unwrap();
        assert_eq!(removed, complete);
        assert!(!complete.exists());
        assert!(manager.remove_model("m2v-base").await.is_err());
    }
}
