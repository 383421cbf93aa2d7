//! Ranking pipeline: extract, embed, score and justify each resume, then rank
//!
//! Documents are processed one at a time in upload order. Progress, warnings
//! and stage changes are reported through a [`PipelineObserver`] so the
//! pipeline never talks to a terminal or UI directly.

use crate::config::{Config, JustificationFailurePolicy};
use crate::error::{Result, ResumeScreenerError};
use crate::input::text_extractor::{DocumentExtractor, TextExtractor};
use crate::llm::justification::{JustificationGenerator, Justifier};
use crate::processing::document::{
    fold_outcomes, CandidateResult, Document, DocumentOutcome, RankedResults, SkipReason, SkippedDocument,
};
use crate::processing::embeddings::{EmbeddingEngine, EmbeddingProvider};
use crate::processing::similarity::match_score;
use log::{info, warn};
use std::fmt;
use std::time::Instant;

pub const NO_VALID_TEXT: &str = "No valid text found in documents.";

#[derive(Debug, Clone, PartialEq)]
pub enum PipelineStage {
    Idle,
    Validating,
    Initializing,
    Extracting,
    Embedding,
    Scoring,
    Justifying,
    Sorting,
    Done,
    Failed(String),
}

#[derive(Debug, Clone, PartialEq)]
pub enum PipelineEvent {
    StageChanged(PipelineStage),
    DocumentStarted { index: usize, name: String },
    DocumentSkipped(SkippedDocument),
    Progress { processed: usize, total: usize },
    Warning(String),
    Info(String),
}

/// Receives pipeline events. The presentation layer decides how to show them.
pub trait PipelineObserver {
    fn on_event(&mut self, event: &PipelineEvent);
}

/// Observer that ignores everything.
pub struct NoopObserver;

impl PipelineObserver for NoopObserver {
    fn on_event(&mut self, _event: &PipelineEvent) {}
}

/// Observer that keeps every event, in order.
#[derive(Debug, Default)]
pub struct EventLog {
    pub events: Vec<PipelineEvent>,
}

impl EventLog {
    pub fn warnings(&self) -> Vec<&str> {
        self.events
            .iter()
            .filter_map(|e| match e {
                PipelineEvent::Warning(message) => Some(message.as_str()),
                _ => None,
            })
            .collect()
    }

    pub fn stages(&self) -> Vec<&PipelineStage> {
        self.events
            .iter()
            .filter_map(|e| match e {
                PipelineEvent::StageChanged(stage) => Some(stage),
                _ => None,
            })
            .collect()
    }
}

impl PipelineObserver for EventLog {
    fn on_event(&mut self, event: &PipelineEvent) {
        self.events.push(event.clone());
    }
}

/// Why a run was refused before any work started.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputIssue {
    MissingJobDescription,
    NoDocuments,
}

impl fmt::Display for InputIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InputIssue::MissingJobDescription => write!(f, "Please enter a Job Description."),
            InputIssue::NoDocuments => write!(f, "Please upload at least one resume."),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RankingRun {
    pub results: RankedResults,
    pub skipped: Vec<SkippedDocument>,
    pub total_documents: usize,
    pub processing_time_ms: u64,
    pub embedding_model: String,
    pub llm_model: String,
}

#[derive(Debug, Clone, PartialEq)]
pub enum RankingOutcome {
    Rejected(InputIssue),
    Completed(RankingRun),
}

impl RankingOutcome {
    /// Ranked candidates; empty when the run was rejected.
    pub fn results(&self) -> &[CandidateResult] {
        match self {
            RankingOutcome::Rejected(_) => &[],
            RankingOutcome::Completed(run) => run.results.as_slice(),
        }
    }

    pub fn skipped(&self) -> &[SkippedDocument] {
        match self {
            RankingOutcome::Rejected(_) => &[],
            RankingOutcome::Completed(run) => &run.skipped,
        }
    }
}

/// Check the preconditions for a run.
pub fn validate_inputs(job_description: &str, documents: &[Document]) -> Option<InputIssue> {
    if job_description.trim().is_empty() {
        Some(InputIssue::MissingJobDescription)
    } else if documents.is_empty() {
        Some(InputIssue::NoDocuments)
    } else {
        None
    }
}

pub struct RankingPipeline<X, E, J> {
    extractor: X,
    embedder: E,
    justifier: J,
    failure_policy: JustificationFailurePolicy,
}

impl RankingPipeline<DocumentExtractor, EmbeddingEngine, JustificationGenerator> {
    /// Build the production pipeline. The credential is checked before the embedding model loads.
    pub async fn initialize(config: &Config) -> Result<Self> {
        let justifier = JustificationGenerator::from_config(config)?;
        let embedder = EmbeddingEngine::from_config(config).await?;

        Ok(Self::with_components(DocumentExtractor::new(), embedder, justifier)
            .with_failure_policy(config.processing.on_justification_error))
    }
}

impl<X, E, J> RankingPipeline<X, E, J>
where
    X: TextExtractor,
    E: EmbeddingProvider,
    J: Justifier,
{
    pub fn with_components(extractor: X, embedder: E, justifier: J) -> Self {
        Self {
            extractor,
            embedder,
            justifier,
            failure_policy: JustificationFailurePolicy::Abort,
        }
    }

    pub fn with_failure_policy(mut self, policy: JustificationFailurePolicy) -> Self {
        self.failure_policy = policy;
        self
    }

    /// Validate the inputs, then rank every document against the job description.
    pub async fn rank<O: PipelineObserver>(
        &mut self,
        job_description: &str,
        documents: &[Document],
        observer: &mut O,
    ) -> Result<RankingOutcome> {
        observer.on_event(&PipelineEvent::StageChanged(PipelineStage::Validating));
        if let Some(issue) = validate_inputs(job_description, documents) {
            return Ok(reject(issue, observer));
        }

        self.run_validated(job_description, documents, observer).await
    }

    async fn run_validated<O: PipelineObserver>(
        &mut self,
        job_description: &str,
        documents: &[Document],
        observer: &mut O,
    ) -> Result<RankingOutcome> {
        let started = Instant::now();
        let total = documents.len();
        info!("Ranking {} document(s)", total);

        let job_embedding = self
            .embedder
            .embed(job_description)
            .map_err(|e| fail(observer, e))?;

        let mut outcomes = Vec::with_capacity(total);
        for (index, document) in documents.iter().enumerate() {
            observer.on_event(&PipelineEvent::DocumentStarted {
                index,
                name: document.name.clone(),
            });

            let outcome = self
                .process_document(job_description, &job_embedding, document, observer)
                .await
                .map_err(|e| fail(observer, e))?;

            if let DocumentOutcome::Skipped(skipped) = &outcome {
                observer.on_event(&PipelineEvent::DocumentSkipped(skipped.clone()));
            }
            outcomes.push(outcome);

            observer.on_event(&PipelineEvent::Progress {
                processed: index + 1,
                total,
            });
        }

        observer.on_event(&PipelineEvent::StageChanged(PipelineStage::Sorting));
        let (results, skipped) = fold_outcomes(outcomes);
        if results.is_empty() {
            observer.on_event(&PipelineEvent::Info(NO_VALID_TEXT.to_string()));
        }
        observer.on_event(&PipelineEvent::StageChanged(PipelineStage::Done));

        info!("Ranked {} candidate(s), skipped {}", results.len(), skipped.len());

        Ok(RankingOutcome::Completed(RankingRun {
            results,
            skipped,
            total_documents: total,
            processing_time_ms: started.elapsed().as_millis() as u64,
            embedding_model: self.embedder.model_name().to_string(),
            llm_model: self.justifier.model_name().to_string(),
        }))
    }

    async fn process_document<O: PipelineObserver>(
        &mut self,
        job_description: &str,
        job_embedding: &[f32],
        document: &Document,
        observer: &mut O,
    ) -> Result<DocumentOutcome> {
        observer.on_event(&PipelineEvent::StageChanged(PipelineStage::Extracting));
        let text = match self.extractor.extract(document) {
            Ok(text) if !text.trim().is_empty() => text,
            // Whitespace-only text counts as no text
            Ok(_) => return Ok(skip(document, SkipReason::NoText)),
            Err(e) => {
                warn!("Skipping '{}': {}", document.name, e);
                observer.on_event(&PipelineEvent::Warning(format!("Error reading {}: {}", document.name, e)));
                return Ok(skip(document, SkipReason::ExtractionFailed(e.to_string())));
            }
        };

        observer.on_event(&PipelineEvent::StageChanged(PipelineStage::Embedding));
        let embedding = self.embedder.embed(&text)?;

        observer.on_event(&PipelineEvent::StageChanged(PipelineStage::Scoring));
        let score = match_score(job_embedding, &embedding)?;

        observer.on_event(&PipelineEvent::StageChanged(PipelineStage::Justifying));
        let justification = match self.justifier.justify(job_description, &text, score).await {
            Ok(justification) => justification,
            Err(source) => match self.failure_policy {
                JustificationFailurePolicy::Abort => {
                    return Err(ResumeScreenerError::Justification {
                        document: document.name.clone(),
                        source,
                    })
                }
                JustificationFailurePolicy::Skip => {
                    warn!("Justification failed for '{}': {}", document.name, source);
                    observer.on_event(&PipelineEvent::Warning(format!(
                        "Could not justify {}: {}",
                        document.name, source
                    )));
                    return Ok(skip(document, SkipReason::JustificationFailed(source.to_string())));
                }
            },
        };

        Ok(DocumentOutcome::Scored(CandidateResult {
            name: document.name.clone(),
            score,
            justification,
        }))
    }
}

/// Validate, initialize the production components from `config`, and rank.
///
/// Invalid input returns `Rejected` without loading any model; an
/// initialization failure returns `Err` before any document is read.
pub async fn rank_candidates<O: PipelineObserver>(
    config: &Config,
    job_description: &str,
    documents: &[Document],
    observer: &mut O,
) -> Result<RankingOutcome> {
    observer.on_event(&PipelineEvent::StageChanged(PipelineStage::Validating));
    if let Some(issue) = validate_inputs(job_description, documents) {
        return Ok(reject(issue, observer));
    }

    observer.on_event(&PipelineEvent::StageChanged(PipelineStage::Initializing));
    let mut pipeline = RankingPipeline::initialize(config)
        .await
        .map_err(|e| fail(observer, e))?;

    pipeline.run_validated(job_description, documents, observer).await
}

fn reject<O: PipelineObserver>(issue: InputIssue, observer: &mut O) -> RankingOutcome {
    observer.on_event(&PipelineEvent::Warning(issue.to_string()));
    observer.on_event(&PipelineEvent::StageChanged(PipelineStage::Idle));
    RankingOutcome::Rejected(issue)
}

fn fail<O: PipelineObserver>(observer: &mut O, error: ResumeScreenerError) -> ResumeScreenerError {
    observer.on_event(&PipelineEvent::StageChanged(PipelineStage::Failed(error.to_string())));
    error
}

fn skip(document: &Document, reason: SkipReason) -> DocumentOutcome {
    DocumentOutcome::Skipped(SkippedDocument {
        name: document.name.clone(),
        reason,
    })
}
