//! Shared test doubles for the ranking pipeline

#![allow(dead_code)]

use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Object, Stream};
use resume_screener::llm::client::LlmError;
use resume_screener::llm::Justifier;
use resume_screener::processing::embeddings::EmbeddingProvider;
use resume_screener::Result;
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

const DIMENSIONS: usize = 512;

/// Bag-of-words embedder: each lowercased word adds 1.0 to a hashed bucket.
#[derive(Clone, Default)]
pub struct HashEmbedder {
    pub calls: Arc<AtomicUsize>,
}

impl HashEmbedder {
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl EmbeddingProvider for HashEmbedder {
    fn model_name(&self) -> &str {
        "hash-bow"
    }

    fn embed(&mut self, text: &str) -> Result<Vec<f32>> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        let mut vector = vec![0.0f32; DIMENSIONS];
        for word in text
            .split(|c: char| !c.is_alphanumeric())
            .filter(|w| !w.is_empty())
        {
            let mut hasher = DefaultHasher::new();
            word.to_lowercase().hash(&mut hasher);
            vector[(hasher.finish() as usize) % DIMENSIONS] += 1.0;
        }
        Ok(vector)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct JustifyCall {
    pub job_description: String,
    pub resume_text: String,
    pub score: f64,
}

/// Justifier that records every call and fails for resumes containing `fail_marker`.
#[derive(Clone, Default)]
pub struct StubJustifier {
    pub calls: Arc<Mutex<Vec<JustifyCall>>>,
    pub fail_marker: Option<String>,
}

impl StubJustifier {
    pub fn failing_on(marker: &str) -> Self {
        Self {
            fail_marker: Some(marker.to_string()),
            ..Self::default()
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    pub fn recorded(&self) -> Vec<JustifyCall> {
        self.calls.lock().unwrap().clone()
    }
}

impl Justifier for StubJustifier {
    fn model_name(&self) -> &str {
        "stub-llm"
    }

    async fn justify(
        &self,
        job_description: &str,
        resume_text: &str,
        score: f64,
    ) -> std::result::Result<String, LlmError> {
        self.calls.lock().unwrap().push(JustifyCall {
            job_description: job_description.to_string(),
            resume_text: resume_text.to_string(),
            score,
        });

        match &self.fail_marker {
            Some(marker) if resume_text.contains(marker.as_str()) => Err(LlmError::Api {
                status: 429,
                message: "Rate limit exceeded".to_string(),
            }),
            _ => Ok(format!("Scored {:.2}. Reasonable overlap with the role.", score)),
        }
    }
}

pub const GO_JOB: &str = "Senior Go engineer to build gRPC microservices on Kubernetes. \
    Experience with distributed systems, Postgres and observability required.";

pub const GO_RESUME: &str = "Backend engineer. Six years writing Go microservices with gRPC, \
    deployed on Kubernetes. Built distributed systems backed by Postgres, owned observability.";

pub const PASTRY_RESUME: &str = "Pastry chef. Laminated dough, croissants, sourdough and plated \
    desserts for a busy bakery. Managed a kitchen brigade of four.";

/// Single-page PDF drawing each word with its own `Tj`.
pub fn pdf_with_words(words: &[&str]) -> Vec<u8> {
    let mut doc = lopdf::Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Courier",
        "Encoding" => "WinAnsiEncoding",
    });
    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! { "F1" => font_id },
    });

    let mut operations = vec![
        Operation::new("BT", vec![]),
        Operation::new("Tf", vec![Object::Name(b"F1".to_vec()), Object::Integer(12)]),
        Operation::new("Td", vec![Object::Integer(72), Object::Integer(720)]),
    ];
    for word in words {
        operations.push(Operation::new("Tj", vec![Object::string_literal(*word)]));
    }
    operations.push(Operation::new("ET", vec![]));
    let content = Content { operations };
    let content_id = doc.add_object(Stream::new(dictionary! {}, content.encode().unwrap()));

    let page_id = doc.add_object(dictionary! {
        "Type" => "Page",
        "Parent" => pages_id,
        "Resources" => resources_id,
        "Contents" => content_id,
    });
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => vec![Object::from(page_id)],
            "Count" => Object::Integer(1),
            "MediaBox" => vec![Object::Integer(0), Object::Integer(0), Object::Integer(595), Object::Integer(842)],
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    let mut bytes = Vec::new();
    doc.save_to(&mut bytes).unwrap();
    bytes
}
