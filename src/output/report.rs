//! Report structures built from a finished ranking run

use crate::llm::prompts::truncate_chars;
use crate::processing::pipeline::RankingRun;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Everything a formatter needs to render one ranking run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RankingReport {
    pub candidates: Vec<RankedCandidate>,
    pub skipped: Vec<SkippedEntry>,
    pub metadata: ReportMetadata,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RankedCandidate {
    /// 1-based position in the ranking
    pub rank: usize,
    pub name: String,
    pub score: f64,
    pub band: ScoreBand,
    pub justification: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SkippedEntry {
    pub name: String,
    pub reason: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportMetadata {
    pub generated_at: DateTime<Utc>,
    pub processing_time_ms: u64,
    pub total_documents: usize,
    pub embedding_model: String,
    pub llm_model: String,
    pub job_description_preview: String,
    pub screener_version: String,
}

/// Coarse label for a match score
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ScoreBand {
    Strong,
    Moderate,
    Weak,
    Poor,
}

impl ScoreBand {
    pub fn from_score(score: f64) -> Self {
        if score >= 70.0 {
            ScoreBand::Strong
        } else if score >= 50.0 {
            ScoreBand::Moderate
        } else if score >= 30.0 {
            ScoreBand::Weak
        } else {
            ScoreBand::Poor
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ScoreBand::Strong => "STRONG",
            ScoreBand::Moderate => "MODERATE",
            ScoreBand::Weak => "WEAK",
            ScoreBand::Poor => "POOR",
        }
    }
}

const JOB_PREVIEW_CHARS: usize = 120;

impl RankingReport {
    pub fn from_run(run: &RankingRun, job_description: &str) -> Self {
        let candidates = run
            .results
            .iter()
            .enumerate()
            .map(|(i, c)| RankedCandidate {
                rank: i + 1,
                name: c.name.clone(),
                score: c.score,
                band: ScoreBand::from_score(c.score),
                justification: c.justification.trim().to_string(),
            })
            .collect();

        let skipped = run
            .skipped
            .iter()
            .map(|s| SkippedEntry {
                name: s.name.clone(),
                reason: s.reason.to_string(),
            })
            .collect();

        let flattened = job_description.split_whitespace().collect::<Vec<_>>().join(" ");
        let preview = truncate_chars(&flattened, JOB_PREVIEW_CHARS);
        let job_description_preview = if preview.len() < flattened.len() {
            format!("{}...", preview)
        } else {
            preview.to_string()
        };

        Self {
            candidates,
            skipped,
            metadata: ReportMetadata {
                generated_at: Utc::now(),
                processing_time_ms: run.processing_time_ms,
                total_documents: run.total_documents,
                embedding_model: run.embedding_model.clone(),
                llm_model: run.llm_model.clone(),
                job_description_preview,
                screener_version: env!("CARGO_PKG_VERSION").to_string(),
            },
        }
    }
}
