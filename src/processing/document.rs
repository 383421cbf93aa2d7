//! Documents, per-document outcomes and ranked results

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;

/// An uploaded file: raw bytes plus the name it is displayed under.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub name: String,
    pub bytes: Vec<u8>,
}

impl Document {
    pub fn new(name: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            name: name.into(),
            bytes: bytes.into(),
        }
    }
}

/// One scored resume.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CandidateResult {
    pub name: String,
    /// Cosine similarity times 100, rounded to two decimals.
    pub score: f64,
    pub justification: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkippedDocument {
    pub name: String,
    pub reason: SkipReason,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum SkipReason {
    /// Extraction succeeded but produced no text.
    NoText,
    ExtractionFailed(String),
    JustificationFailed(String),
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::NoText => write!(f, "no extractable text"),
            SkipReason::ExtractionFailed(e) => write!(f, "extraction failed: {}", e),
            SkipReason::JustificationFailed(e) => write!(f, "justification failed: {}", e),
        }
    }
}

/// Result of pushing a single document through the pipeline.
#[derive(Debug, Clone, PartialEq)]
pub enum DocumentOutcome {
    Scored(CandidateResult),
    Skipped(SkippedDocument),
}

/// Candidates ordered by score, highest first. Equal scores keep upload order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RankedResults {
    candidates: Vec<CandidateResult>,
}

impl RankedResults {
    /// Sort candidates given in upload order.
    pub fn from_candidates(mut candidates: Vec<CandidateResult>) -> Self {
        // sort_by is stable, which keeps upload order on ties
        candidates.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(Ordering::Equal));
        Self { candidates }
    }

    pub fn as_slice(&self) -> &[CandidateResult] {
        &self.candidates
    }

    pub fn iter(&self) -> std::slice::Iter<'_, CandidateResult> {
        self.candidates.iter()
    }

    pub fn len(&self) -> usize {
        self.candidates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.candidates.is_empty()
    }

    pub fn top(&self) -> Option<&CandidateResult> {
        self.candidates.first()
    }

    pub fn into_vec(self) -> Vec<CandidateResult> {
        self.candidates
    }
}

impl<'a> IntoIterator for &'a RankedResults {
    type Item = &'a CandidateResult;
    type IntoIter = std::slice::Iter<'a, CandidateResult>;

    fn into_iter(self) -> Self::IntoIter {
        self.candidates.iter()
    }
}

/// Split per-document outcomes into ranked candidates and skips, both in upload order before sorting.
pub fn fold_outcomes(outcomes: Vec<DocumentOutcome>) -> (RankedResults, Vec<SkippedDocument>) {
    let mut candidates = Vec::new();
    let mut skipped = Vec::new();

    for outcome in outcomes {
        match outcome {
            DocumentOutcome::Scored(candidate) => candidates.push(candidate),
            DocumentOutcome::Skipped(skip) => skipped.push(skip),
        }
    }

    (RankedResults::from_candidates(candidates), skipped)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn candidate(name: &str, score: f64) -> CandidateResult {
        CandidateResult {
            name: name.to_string(),
            score,
            justification: String::new(),
        }
    }

    #[test]
    fn test_ranked_descending_with_stable_ties() {
        let ranked = RankedResults::from_candidates(vec![
            candidate("a.pdf", 41.5),
            candidate("b.pdf", 88.0),
            candidate("c.pdf", 41.5),
            candidate("d.pdf", -12.25),
            candidate("e.pdf", 88.0),
        ]);

        let names: Vec<&str> = ranked.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["b.pdf", "e.pdf", "a.pdf", "c.pdf", "d.pdf"]);
        assert_eq!(ranked.top().map(|c| c.name.as_str()), Some("b.pdf"));
    }

    #[test]
    fn test_negative_zero_ties_with_zero() {
        let ranked = RankedResults::from_candidates(vec![candidate("first", -0.0), candidate("second", 0.0)]);
        assert_eq!(ranked.as_slice()[0].name, "first");
    }

    #[test]
    fn test_fold_outcomes() {
        let outcomes = vec![
            DocumentOutcome::Scored(candidate("low.pdf", 10.0)),
            DocumentOutcome::Skipped(SkippedDocument {
                name: "scan.pdf".to_string(),
                reason: SkipReason::NoText,
            }),
            DocumentOutcome::Scored(candidate("high.pdf", 90.0)),
        ];

        let (ranked, skipped) = fold_outcomes(outcomes);
        assert_eq!(ranked.len(), 2);
        assert_eq!(ranked.as_slice()[0].name, "high.pdf");
        assert_eq!(skipped.len(), 1);
        assert_eq!(skipped[0].name, "scan.pdf");
    }
}
