//! Text extraction from uploaded documents

use crate::error::{Result, ResumeScreenerError};
use crate::input::file_detector::FileType;
use crate::processing::document::Document;
use log::{debug, warn};
use pulldown_cmark::{html, Parser};
use std::panic::{self, AssertUnwindSafe};

pub trait TextExtractor {
    /// Plain text of the document. An `Err` means the document as a whole could not be read.
    fn extract(&self, document: &Document) -> Result<String>;
}

pub struct PdfExtractor;

impl PdfExtractor {
    /// Text of each page in page order. Pages that fail to extract come back empty.
    pub fn extract_pages(bytes: &[u8]) -> Result<Vec<String>> {
        let pdf = lopdf::Document::load_mem(bytes)
            .map_err(|e| ResumeScreenerError::PdfExtraction(format!("Failed to parse PDF: {}", e)))?;

        let pages = pdf.get_pages();
        let mut texts = Vec::with_capacity(pages.len());
        for page_number in pages.keys() {
            match pdf.extract_text(&[*page_number]) {
                Ok(text) => texts.push(text),
                Err(e) => {
                    warn!("Could not extract text from page {}: {}", page_number, e);
                    texts.push(String::new());
                }
            }
        }

        Ok(texts)
    }
}

impl TextExtractor for PdfExtractor {
    fn extract(&self, document: &Document) -> Result<String> {
        // pdf-extract panics on some malformed inputs
        let whole = panic::catch_unwind(AssertUnwindSafe(|| pdf_extract::extract_text_from_mem(&document.bytes)));

        match whole {
            Ok(Ok(text)) => return Ok(text),
            Ok(Err(e)) => debug!("pdf-extract failed on '{}' ({}), extracting page by page", document.name, e),
            Err(_) => debug!("pdf-extract panicked on '{}', extracting page by page", document.name),
        }

        let pages = Self::extract_pages(&document.bytes).map_err(|e| match e {
            ResumeScreenerError::PdfExtraction(msg) => {
                ResumeScreenerError::PdfExtraction(format!("'{}': {}", document.name, msg))
            }
            other => other,
        })?;
        Ok(pages.concat())
    }
}

pub struct PlainTextExtractor;

impl TextExtractor for PlainTextExtractor {
    fn extract(&self, document: &Document) -> Result<String> {
        String::from_utf8(document.bytes.clone()).map_err(|e| {
            ResumeScreenerError::TextProcessing(format!("'{}' is not valid UTF-8: {}", document.name, e))
        })
    }
}

pub struct MarkdownExtractor;

impl TextExtractor for MarkdownExtractor {
    fn extract(&self, document: &Document) -> Result<String> {
        let markdown_content = PlainTextExtractor.extract(document)?;

        let parser = Parser::new(&markdown_content);
        let mut html_output = String::new();
        html::push_html(&mut html_output, parser);

        self.html_to_text(&html_output)
    }
}

impl MarkdownExtractor {
    fn html_to_text(&self, html: &str) -> Result<String> {
        let text = html
            .replace("<br>", "\n")
            .replace("</p>", "\n\n")
            .replace("&nbsp;", " ")
            .replace("&amp;", "&")
            .replace("&lt;", "<")
            .replace("&gt;", ">")
            .replace("&quot;", "\"")
            .replace("&#39;", "'");

        let re = regex::Regex::new(r"<[^>]*>")
            .map_err(|e| ResumeScreenerError::TextProcessing(e.to_string()))?;
        let clean_text = re.replace_all(&text, "");

        let lines: Vec<String> = clean_text
            .lines()
            .map(|line| line.trim().to_string())
            .filter(|line| !line.is_empty())
            .collect();

        Ok(lines.join("\n"))
    }
}

/// Routes each document to the extractor matching its file extension.
#[derive(Default)]
pub struct DocumentExtractor;

impl DocumentExtractor {
    pub fn new() -> Self {
        Self
    }
}

impl TextExtractor for DocumentExtractor {
    fn extract(&self, document: &Document) -> Result<String> {
        match FileType::from_name(&document.name) {
            FileType::Pdf => PdfExtractor.extract(document),
            FileType::Text => PlainTextExtractor.extract(document),
            FileType::Markdown => MarkdownExtractor.extract(document),
            FileType::Unknown => Err(ResumeScreenerError::UnsupportedFormat(format!(
                "Unsupported file type for: {}",
                document.name
            ))),
        }
    }
}
