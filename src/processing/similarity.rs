//! Cosine similarity and the match score shown to users

use crate::error::{Result, ResumeScreenerError};

/// Cosine similarity in [-1, 1]. Zero-norm or empty vectors score 0.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> Result<f64> {
    if a.len() != b.len() {
        return Err(ResumeScreenerError::Processing(format!(
            "Embedding dimensions don't match: {} vs {}",
            a.len(),
            b.len()
        )));
    }

    if a.is_empty() {
        return Ok(0.0);
    }

    let dot_product: f64 = a.iter().zip(b.iter()).map(|(x, y)| *x as f64 * *y as f64).sum();
    let norm_a: f64 = a.iter().map(|x| (*x as f64) * (*x as f64)).sum::<f64>().sqrt();
    let norm_b: f64 = b.iter().map(|x| (*x as f64) * (*x as f64)).sum::<f64>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        return Ok(0.0);
    }

    // Rounding noise can push identical vectors a hair past 1.0
    Ok((dot_product / (norm_a * norm_b)).clamp(-1.0, 1.0))
}

/// Raw cosine times 100, rounded to two decimals.
///
/// The cosine is not remapped into [0, 100], so opposed vectors give negative
/// scores (down to -100.00).
pub fn match_score(job_embedding: &[f32], resume_embedding: &[f32]) -> Result<f64> {
    let cosine = cosine_similarity(job_embedding, resume_embedding)?;
    Ok(round_to_hundredths(cosine * 100.0))
}

fn round_to_hundredths(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
