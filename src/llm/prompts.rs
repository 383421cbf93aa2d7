//! Prompt template for score justifications

/// Template placeholders: `{job}`, `{resume}`, `{score}`.
const JUSTIFICATION_TEMPLATE: &str = r#"You are an expert HR assistant.
Job Description Snippet: "{job}..."
Candidate Resume Snippet: "{resume}..."

The calculated semantic match score is {score}%.

Task: Provide a strict 2-sentence summary justifying this score."#;

#[derive(Debug, Clone)]
pub struct PromptTemplates {
    pub justification: String,
    /// Characters kept from each text before it enters the prompt.
    pub snippet_chars: usize,
}

impl Default for PromptTemplates {
    fn default() -> Self {
        Self {
            justification: JUSTIFICATION_TEMPLATE.to_string(),
            snippet_chars: 2000,
        }
    }
}

impl PromptTemplates {
    pub fn with_snippet_chars(mut self, snippet_chars: usize) -> Self {
        self.snippet_chars = snippet_chars;
        self
    }

    /// Build the justification prompt. Both texts are cut to `snippet_chars` without notice.
    pub fn render_justification(&self, job_description: &str, resume_text: &str, score: f64) -> String {
        let job = truncate_chars(job_description, self.snippet_chars);
        let resume = truncate_chars(resume_text, self.snippet_chars);

        // Substituted in one pass so placeholder-like text inside a resume stays literal
        let mut prompt = String::with_capacity(self.justification.len() + job.len() + resume.len());
        let mut rest = self.justification.as_str();
        while let Some(start) = rest.find('{') {
            prompt.push_str(&rest[..start]);
            let tail = &rest[start..];
            if let Some(after) = tail.strip_prefix("{job}") {
                prompt.push_str(job);
                rest = after;
            } else if let Some(after) = tail.strip_prefix("{resume}") {
                prompt.push_str(resume);
                rest = after;
            } else if let Some(after) = tail.strip_prefix("{score}") {
                prompt.push_str(&score.to_string());
                rest = after;
            } else {
                prompt.push('{');
                rest = &tail[1..];
            }
        }
        prompt.push_str(rest);
        prompt
    }
}

/// Prefix of at most `max_chars` characters, cut on a char boundary.
pub fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((byte_index, _)) => &text[..byte_index],
        None => text,
    }
}
