//! Output formatters for ranking reports

use crate::config::OutputFormat;
use crate::error::{Result, ResumeScreenerError};
use crate::output::report::{RankingReport, ScoreBand, SkippedEntry};
use askama::Template;
use colored::{Color, Colorize};
use std::path::Path;

/// Trait for formatting ranking reports
pub trait OutputFormatter {
    fn format_report(&self, report: &RankingReport) -> Result<String>;
    fn supports_format(&self) -> OutputFormat;
}

/// Console formatter with colors
pub struct ConsoleFormatter {
    use_colors: bool,
}

/// JSON formatter for piping into other tools
pub struct JsonFormatter {
    pretty: bool,
}

/// Markdown formatter producing a results table
pub struct MarkdownFormatter {
    include_metadata: bool,
}

/// HTML formatter with inline styling
pub struct HtmlFormatter {
    include_styles: bool,
}

/// Report generator that coordinates different formatters
pub struct ReportGenerator {
    console_formatter: ConsoleFormatter,
    json_formatter: JsonFormatter,
    markdown_formatter: MarkdownFormatter,
    html_formatter: HtmlFormatter,
}

#[derive(Template)]
#[template(source = r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>Resume Ranking Report</title>
    {% if include_styles %}
    <style>
        body {
            font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', Roboto, sans-serif;
            line-height: 1.6;
            color: #333;
            max-width: 1000px;
            margin: 0 auto;
            padding: 20px;
            background: #f8f9fa;
        }
        .container {
            background: white;
            padding: 30px;
            border-radius: 8px;
            box-shadow: 0 2px 10px rgba(0,0,0,0.1);
        }
        table { width: 100%; border-collapse: collapse; }
        th, td { text-align: left; padding: 10px; border-bottom: 1px solid #e9ecef; vertical-align: top; }
        th { background: #f1f3f5; }
        .score { font-weight: bold; white-space: nowrap; }
        .band-strong { color: #2b8a3e; }
        .band-moderate { color: #5c940d; }
        .band-weak { color: #e67700; }
        .band-poor { color: #c92a2a; }
        .skipped { color: #868e96; }
        .metadata { margin-top: 30px; font-size: 0.9em; color: #666; }
    </style>
    {% endif %}
</head>
<body>
    <div class="container">
        <h1>Resume Ranking</h1>
        <p><strong>Job:</strong> {{ job_preview }}</p>
        <p>Generated {{ generated_at }} | {{ ranked_count }} of {{ total_documents }} resumes ranked in {{ processing_time }}ms</p>

        {% if has_rows %}
        <table>
            <thead>
                <tr><th>#</th><th>Candidate</th><th>Match %</th><th>AI Analysis</th></tr>
            </thead>
            <tbody>
                {% for row in rows %}
                <tr>
                    <td>{{ row.rank }}</td>
                    <td>{{ row.name }}</td>
                    <td class="score {{ row.band_class }}">{{ row.score }} ({{ row.band_label }})</td>
                    <td>{{ row.justification }}</td>
                </tr>
                {% endfor %}
            </tbody>
        </table>
        {% else %}
        <p>No valid text found in documents.</p>
        {% endif %}

        {% if has_skipped %}
        <h2>Skipped</h2>
        <ul class="skipped">
            {% for entry in skipped %}
            <li>{{ entry.name }}: {{ entry.reason }}</li>
            {% endfor %}
        </ul>
        {% endif %}

        <div class="metadata">
            <p><strong>Generated by Resume Screener v{{ version }}</strong></p>
            <p><strong>Models:</strong> {{ embedding_model }} + {{ llm_model }}</p>
        </div>
    </div>
</body>
</html>"#, ext = "html")]
struct HtmlTemplate {
    include_styles: bool,
    generated_at: String,
    processing_time: u64,
    total_documents: usize,
    ranked_count: usize,
    job_preview: String,
    has_rows: bool,
    rows: Vec<HtmlRow>,
    has_skipped: bool,
    skipped: Vec<SkippedEntry>,
    version: String,
    embedding_model: String,
    llm_model: String,
}

#[derive(Debug, Clone)]
struct HtmlRow {
    rank: usize,
    name: String,
    score: String,
    band_class: String,
    band_label: String,
    justification: String,
}

impl ConsoleFormatter {
    pub fn new(use_colors: bool) -> Self {
        Self { use_colors }
    }

    fn colorize(&self, text: &str, color: Color) -> String {
        if self.use_colors {
            text.color(color).to_string()
        } else {
            text.to_string()
        }
    }

    fn format_header(&self, title: &str, level: u8) -> String {
        let (prefix, color) = match level {
            1 => ("█", Color::Blue),
            2 => ("▓", Color::Green),
            _ => ("▒", Color::Yellow),
        };

        if self.use_colors {
            format!("\n{} {}\n", prefix.color(color).bold(), title.color(color).bold())
        } else {
            format!("\n{} {}\n", prefix, title)
        }
    }

    fn format_band_badge(&self, band: ScoreBand) -> String {
        let color = match band {
            ScoreBand::Strong => Color::Green,
            ScoreBand::Moderate => Color::BrightGreen,
            ScoreBand::Weak => Color::Yellow,
            ScoreBand::Poor => Color::BrightRed,
        };

        if self.use_colors {
            format!("[{}]", band.label().color(color).bold())
        } else {
            format!("[{}]", band.label())
        }
    }
}

impl OutputFormatter for ConsoleFormatter {
    fn format_report(&self, report: &RankingReport) -> Result<String> {
        let mut output = String::new();

        output.push_str(&self.format_header("RESUME RANKING", 1));
        output.push_str(&format!(
            "Generated: {} | Processing time: {}ms\n",
            report.metadata.generated_at.format("%Y-%m-%d %H:%M:%S UTC"),
            report.metadata.processing_time_ms
        ));
        output.push_str(&format!("Job: {}\n", self.colorize(&report.metadata.job_description_preview, Color::Cyan)));
        output.push_str(&format!(
            "Ranked {} of {} resume(s)\n",
            report.candidates.len(),
            report.metadata.total_documents
        ));

        output.push_str(&self.format_header("Candidates", 2));
        if report.candidates.is_empty() {
            output.push_str("No valid text found in documents.\n");
        }

        for candidate in &report.candidates {
            output.push_str(&format!(
                "#{:<3} {}  {:.2}% {}\n",
                candidate.rank,
                self.colorize(&candidate.name, Color::White),
                candidate.score,
                self.format_band_badge(candidate.band)
            ));
            for line in candidate.justification.lines().filter(|l| !l.trim().is_empty()) {
                output.push_str(&format!("     {}\n", line.trim()));
            }
            output.push('\n');
        }

        if !report.skipped.is_empty() {
            output.push_str(&self.format_header("Skipped", 3));
            for entry in &report.skipped {
                output.push_str(&format!("  • {} ({})\n", entry.name, self.colorize(&entry.reason, Color::Yellow)));
            }
        }

        output.push_str(&format!(
            "\nModels: {} + {}\n",
            report.metadata.embedding_model, report.metadata.llm_model
        ));

        Ok(output)
    }

    fn supports_format(&self) -> OutputFormat {
        OutputFormat::Console
    }
}

impl JsonFormatter {
    pub fn new(pretty: bool) -> Self {
        Self { pretty }
    }
}

impl OutputFormatter for JsonFormatter {
    fn format_report(&self, report: &RankingReport) -> Result<String> {
        if self.pretty {
            Ok(serde_json::to_string_pretty(report)?)
        } else {
            Ok(serde_json::to_string(report)?)
        }
    }

    fn supports_format(&self) -> OutputFormat {
        OutputFormat::Json
    }
}

impl MarkdownFormatter {
    pub fn new(include_metadata: bool) -> Self {
        Self { include_metadata }
    }

    fn table_cell(text: &str) -> String {
        text.split_whitespace()
            .collect::<Vec<_>>()
            .join(" ")
            .replace('|', "\\|")
    }
}

impl OutputFormatter for MarkdownFormatter {
    fn format_report(&self, report: &RankingReport) -> Result<String> {
        let mut output = String::new();

        output.push_str("# Resume Ranking Report\n\n");

        if self.include_metadata {
            output.push_str(&format!(
                "**Generated:** {} | **Processing Time:** {}ms\n\n",
                report.metadata.generated_at.format("%Y-%m-%d %H:%M:%S UTC"),
                report.metadata.processing_time_ms
            ));
            output.push_str(&format!("**Job:** {}\n\n", report.metadata.job_description_preview));
        }

        if report.candidates.is_empty() {
            output.push_str("No valid text found in documents.\n");
        } else {
            output.push_str("| # | Candidate | Match % | AI Analysis |\n");
            output.push_str("|---|-----------|---------|-------------|\n");
            for candidate in &report.candidates {
                output.push_str(&format!(
                    "| {} | {} | {:.2} | {} |\n",
                    candidate.rank,
                    Self::table_cell(&candidate.name),
                    candidate.score,
                    Self::table_cell(&candidate.justification)
                ));
            }
        }

        if !report.skipped.is_empty() {
            output.push_str("\n## Skipped\n\n");
            for entry in &report.skipped {
                output.push_str(&format!("- `{}`: {}\n", entry.name, entry.reason));
            }
        }

        if self.include_metadata {
            output.push_str(&format!(
                "\n---\n*Resume Screener v{} using {} + {}*\n",
                report.metadata.screener_version, report.metadata.embedding_model, report.metadata.llm_model
            ));
        }

        Ok(output)
    }

    fn supports_format(&self) -> OutputFormat {
        OutputFormat::Markdown
    }
}

impl HtmlFormatter {
    pub fn new(include_styles: bool) -> Self {
        Self { include_styles }
    }

    fn create_template_data(&self, report: &RankingReport) -> HtmlTemplate {
        let rows: Vec<HtmlRow> = report
            .candidates
            .iter()
            .map(|c| HtmlRow {
                rank: c.rank,
                name: c.name.clone(),
                score: format!("{:.2}", c.score),
                band_class: format!("band-{}", c.band.label().to_lowercase()),
                band_label: c.band.label().to_string(),
                justification: c.justification.clone(),
            })
            .collect();

        HtmlTemplate {
            include_styles: self.include_styles,
            generated_at: report.metadata.generated_at.format("%Y-%m-%d %H:%M:%S UTC").to_string(),
            processing_time: report.metadata.processing_time_ms,
            total_documents: report.metadata.total_documents,
            ranked_count: rows.len(),
            job_preview: report.metadata.job_description_preview.clone(),
            has_rows: !rows.is_empty(),
            rows,
            has_skipped: !report.skipped.is_empty(),
            skipped: report.skipped.clone(),
            version: report.metadata.screener_version.clone(),
            embedding_model: report.metadata.embedding_model.clone(),
            llm_model: report.metadata.llm_model.clone(),
        }
    }
}

impl OutputFormatter for HtmlFormatter {
    fn format_report(&self, report: &RankingReport) -> Result<String> {
        self.create_template_data(report)
            .render()
            .map_err(|e| ResumeScreenerError::OutputFormatting(e.to_string()))
    }

    fn supports_format(&self) -> OutputFormat {
        OutputFormat::Html
    }
}

impl ReportGenerator {
    pub fn new() -> Self {
        Self::with_options(true, true, true, true)
    }

    pub fn with_options(use_colors: bool, pretty_json: bool, include_metadata: bool, include_html_styles: bool) -> Self {
        Self {
            console_formatter: ConsoleFormatter::new(use_colors),
            json_formatter: JsonFormatter::new(pretty_json),
            markdown_formatter: MarkdownFormatter::new(include_metadata),
            html_formatter: HtmlFormatter::new(include_html_styles),
        }
    }

    pub fn generate_report(&self, report: &RankingReport, format: &OutputFormat) -> Result<String> {
        let formatter: &dyn OutputFormatter = match format {
            OutputFormat::Console => &self.console_formatter,
            OutputFormat::Json => &self.json_formatter,
            OutputFormat::Markdown => &self.markdown_formatter,
            OutputFormat::Html => &self.html_formatter,
        };
        debug_assert_eq!(formatter.supports_format(), *format);
        formatter.format_report(report)
    }
}

impl Default for ReportGenerator {
    fn default() -> Self {
        Self::new()
    }
}

pub fn save_report_to_file(content: &str, file_path: &Path) -> Result<()> {
    use std::fs;
    if let Some(parent) = file_path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(file_path, content)?;
    Ok(())
}

pub fn suggest_filename(format: &OutputFormat, timestamp: bool) -> String {
    let timestamp_suffix = if timestamp {
        format!("_{}", chrono::Utc::now().format("%Y%m%d_%H%M%S"))
    } else {
        String::new()
    };

    match format {
        OutputFormat::Console => format!("ranking{}.txt", timestamp_suffix),
        OutputFormat::Json => format!("ranking{}.json", timestamp_suffix),
        OutputFormat::Markdown => format!("ranking{}.md", timestamp_suffix),
        OutputFormat::Html => format!("ranking{}.html", timestamp_suffix),
    }
}
