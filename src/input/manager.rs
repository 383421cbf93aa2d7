//! Input manager for loading job descriptions and resume files from disk

use crate::error::{Result, ResumeScreenerError};
use crate::input::text_extractor::{DocumentExtractor, TextExtractor};
use crate::processing::document::Document;
use log::info;
use std::collections::HashMap;
use std::path::Path;
use tokio::fs;

pub struct InputManager {
    cache: HashMap<String, String>,
    enable_cache: bool,
    extractor: DocumentExtractor,
}

impl InputManager {
    pub fn new() -> Self {
        Self {
            cache: HashMap::new(),
            enable_cache: true,
            extractor: DocumentExtractor::new(),
        }
    }

    pub fn with_cache(mut self, enable: bool) -> Self {
        self.enable_cache = enable;
        self
    }

    /// Read a file into a `Document` named after its file name.
    pub async fn load_document(&self, path: &Path) -> Result<Document> {
        if !path.exists() {
            return Err(ResumeScreenerError::InvalidInput(format!(
                "File does not exist: {}",
                path.display()
            )));
        }

        let bytes = fs::read(path).await?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| path.display().to_string());

        Ok(Document::new(name, bytes))
    }

    /// Load resumes in the order given; that order breaks score ties.
    pub async fn load_documents(&self, paths: &[impl AsRef<Path>]) -> Result<Vec<Document>> {
        let mut documents = Vec::with_capacity(paths.len());
        for path in paths {
            documents.push(self.load_document(path.as_ref()).await?);
        }
        info!("Loaded {} document(s)", documents.len());
        Ok(documents)
    }

    /// Extract the text of a job description file. Unlike resumes, failures here are errors.
    pub async fn extract_text(&mut self, path: &Path) -> Result<String> {
        let path_str = path.to_string_lossy().to_string();

        if self.enable_cache {
            if let Some(cached_text) = self.cache.get(&path_str) {
                info!("Using cached text for: {}", path.display());
                return Ok(cached_text.clone());
            }
        }

        let document = self.load_document(path).await?;
        info!("Extracting text from: {}", path.display());
        let text = self.extractor.extract(&document)?;

        if self.enable_cache {
            self.cache.insert(path_str, text.clone());
        }

        Ok(text)
    }

    pub fn clear_cache(&mut self) {
        self.cache.clear();
    }

    pub fn cache_size(&self) -> usize {
        self.cache.len()
    }
}

impl Default for InputManager {
    fn default() -> Self {
        Self::new()
    }
}
