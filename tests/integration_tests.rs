//! Integration tests for the resume screener

mod common;

use common::*;
use resume_screener::config::{Config, JustificationFailurePolicy};
use resume_screener::input::{DocumentExtractor, InputManager};
use resume_screener::llm::JustificationGenerator;
use resume_screener::processing::document::SkipReason;
use resume_screener::processing::pipeline::{EventLog, InputIssue, PipelineEvent, PipelineStage};
use resume_screener::{rank_candidates, Document, RankingOutcome, RankingPipeline, ResumeScreenerError};
use std::fs;
use tempfile::TempDir;

fn pipeline(
    embedder: &HashEmbedder,
    justifier: &StubJustifier,
) -> RankingPipeline<DocumentExtractor, HashEmbedder, StubJustifier> {
    RankingPipeline::with_components(DocumentExtractor::new(), embedder.clone(), justifier.clone())
}

fn completed(outcome: RankingOutcome) -> resume_screener::processing::pipeline::RankingRun {
    match outcome {
        RankingOutcome::Completed(run) => run,
        RankingOutcome::Rejected(issue) => panic!("run was rejected: {}", issue),
    }
}

#[tokio::test]
async fn test_go_engineer_outranks_pastry_chef() {
    let embedder = HashEmbedder::default();
    let justifier = StubJustifier::default();
    let documents = vec![
        Document::new("pastry_chef.txt", PASTRY_RESUME),
        Document::new("go_engineer.txt", GO_RESUME),
    ];

    let mut log = EventLog::default();
    let outcome = pipeline(&embedder, &justifier)
        .rank(GO_JOB, &documents, &mut log)
        .await
        .unwrap();
    let run = completed(outcome);

    let names: Vec<&str> = run.results.iter().map(|c| c.name.as_str()).collect();
    assert_eq!(names, vec!["go_engineer.txt", "pastry_chef.txt"]);
    assert!(run.results.as_slice()[0].score > run.results.as_slice()[1].score);
    assert!(run.skipped.is_empty());
    assert_eq!(run.total_documents, 2);
    assert_eq!(run.embedding_model, "hash-bow");
    assert_eq!(run.llm_model, "stub-llm");

    // Job description embedded once, plus one embedding per resume
    assert_eq!(embedder.call_count(), 3);
    assert_eq!(justifier.call_count(), 2);

    let calls = justifier.recorded();
    let go_call = calls.iter().find(|c| c.resume_text == GO_RESUME).unwrap();
    assert_eq!(go_call.job_description, GO_JOB);
    assert_eq!(go_call.score, run.results.top().unwrap().score);
}

#[tokio::test]
async fn test_scores_have_two_decimals() {
    let embedder = HashEmbedder::default();
    let justifier = StubJustifier::default();
    let documents = vec![Document::new("go.txt", GO_RESUME), Document::new("chef.txt", PASTRY_RESUME)];

    let run = completed(
        pipeline(&embedder, &justifier)
            .rank(GO_JOB, &documents, &mut EventLog::default())
            .await
            .unwrap(),
    );

    for candidate in &run.results {
        assert_eq!(candidate.score, (candidate.score * 100.0).round() / 100.0);
        assert!((-100.0..=100.0).contains(&candidate.score));
        assert_eq!(candidate.justification, format!("Scored {:.2}. Reasonable overlap with the role.", candidate.score));
    }
}

#[tokio::test]
async fn test_corrupt_pdf_is_skipped_with_warning() {
    let embedder = HashEmbedder::default();
    let justifier = StubJustifier::default();
    let documents = vec![
        Document::new("alex.pdf", pdf_with_words(&["Go", "Kubernetes", "gRPC"])),
        Document::new("broken.pdf", b"%PDF-1.4 this is not really a pdf".to_vec()),
        Document::new("sam.pdf", pdf_with_words(&["Pastry", "croissants"])),
        Document::new("jane.pdf", pdf_with_words(&["Postgres", "observability"])),
    ];

    let mut log = EventLog::default();
    let run = completed(pipeline(&embedder, &justifier).rank(GO_JOB, &documents, &mut log).await.unwrap());

    assert_eq!(run.results.len(), 3);
    let mut names: Vec<&str> = run.results.iter().map(|c| c.name.as_str()).collect();
    names.sort();
    assert_eq!(names, vec!["alex.pdf", "jane.pdf", "sam.pdf"]);

    let warnings = log.warnings();
    assert_eq!(warnings.len(), 1);
    assert!(warnings[0].starts_with("Error reading broken.pdf"));

    assert_eq!(run.skipped.len(), 1);
    assert_eq!(run.skipped[0].name, "broken.pdf");
    assert!(matches!(run.skipped[0].reason, SkipReason::ExtractionFailed(_)));

    let calls = justifier.recorded();
    assert_eq!(calls.len(), 3);
    assert!(calls[0].resume_text.contains("Kubernetes"));
    assert!(calls[1].resume_text.contains("croissants"));
    assert!(calls[2].resume_text.contains("Postgres"));
}

#[tokio::test]
async fn test_unsupported_file_type_is_skipped_with_warning() {
    let embedder = HashEmbedder::default();
    let justifier = StubJustifier::default();
    let documents = vec![
        Document::new("cv.docx", b"PK\x03\x04".to_vec()),
        Document::new("go.txt", GO_RESUME),
    ];

    let mut log = EventLog::default();
    let run = completed(pipeline(&embedder, &justifier).rank(GO_JOB, &documents, &mut log).await.unwrap());

    assert_eq!(run.results.len(), 1);
    assert_eq!(run.skipped[0].name, "cv.docx");
    assert_eq!(log.warnings().len(), 1);
    assert!(log.warnings()[0].starts_with("Error reading cv.docx"));
}

#[tokio::test]
async fn test_document_without_text_is_excluded_silently() {
    let embedder = HashEmbedder::default();
    let justifier = StubJustifier::default();
    let documents = vec![Document::new("scan.txt", "  \n\t "), Document::new("go.txt", GO_RESUME)];

    let mut log = EventLog::default();
    let run = completed(pipeline(&embedder, &justifier).rank(GO_JOB, &documents, &mut log).await.unwrap());

    assert_eq!(run.results.len(), 1);
    assert_eq!(run.results.top().unwrap().name, "go.txt");
    assert_eq!(run.skipped[0].reason, SkipReason::NoText);
    assert!(log.warnings().is_empty());
    assert_eq!(justifier.call_count(), 1);
}

#[tokio::test]
async fn test_all_documents_empty_reports_no_valid_text() {
    let embedder = HashEmbedder::default();
    let justifier = StubJustifier::default();
    let documents = vec![Document::new("blank.txt", ""), Document::new("blank.md", "   ")];

    let mut log = EventLog::default();
    let run = completed(pipeline(&embedder, &justifier).rank(GO_JOB, &documents, &mut log).await.unwrap());

    assert!(run.results.is_empty());
    assert_eq!(justifier.call_count(), 0);
    assert!(log
        .events
        .contains(&PipelineEvent::Info("No valid text found in documents.".to_string())));
}

#[tokio::test]
async fn test_rejected_inputs_do_no_work() {
    let embedder = HashEmbedder::default();
    let justifier = StubJustifier::default();

    let mut log = EventLog::default();
    let outcome = pipeline(&embedder, &justifier).rank(GO_JOB, &[], &mut log).await.unwrap();
    assert_eq!(outcome, RankingOutcome::Rejected(InputIssue::NoDocuments));
    assert!(outcome.results().is_empty());
    assert_eq!(log.warnings(), vec!["Please upload at least one resume."]);

    let documents = vec![Document::new("go.txt", GO_RESUME)];
    let outcome = pipeline(&embedder, &justifier)
        .rank("   \n", &documents, &mut EventLog::default())
        .await
        .unwrap();
    assert_eq!(outcome, RankingOutcome::Rejected(InputIssue::MissingJobDescription));

    assert_eq!(embedder.call_count(), 0);
    assert_eq!(justifier.call_count(), 0);
}

#[tokio::test]
async fn test_ties_keep_upload_order() {
    let embedder = HashEmbedder::default();
    let justifier = StubJustifier::default();
    let documents = vec![
        Document::new("first.txt", GO_RESUME),
        Document::new("chef.txt", PASTRY_RESUME),
        Document::new("second.txt", GO_RESUME),
        Document::new("third.md", GO_RESUME),
    ];

    let run = completed(
        pipeline(&embedder, &justifier)
            .rank(GO_JOB, &documents, &mut EventLog::default())
            .await
            .unwrap(),
    );

    let names: Vec<&str> = run.results.iter().map(|c| c.name.as_str()).collect();
    assert_eq!(names, vec!["first.txt", "second.txt", "third.md", "chef.txt"]);
}

#[tokio::test]
async fn test_justification_failure_aborts_by_default() {
    let embedder = HashEmbedder::default();
    let justifier = StubJustifier::failing_on("Pastry");
    let documents = vec![Document::new("go.txt", GO_RESUME), Document::new("chef.txt", PASTRY_RESUME)];

    let mut log = EventLog::default();
    let err = pipeline(&embedder, &justifier)
        .rank(GO_JOB, &documents, &mut log)
        .await
        .unwrap_err();

    match err {
        ResumeScreenerError::Justification { document, .. } => assert_eq!(document, "chef.txt"),
        other => panic!("unexpected error: {}", other),
    }
    assert!(matches!(log.stages().last(), Some(PipelineStage::Failed(_))));
}

#[tokio::test]
async fn test_justification_failure_can_skip() {
    let embedder = HashEmbedder::default();
    let justifier = StubJustifier::failing_on("Pastry");
    let documents = vec![
        Document::new("chef.txt", PASTRY_RESUME),
        Document::new("go.txt", GO_RESUME),
    ];

    let mut log = EventLog::default();
    let run = completed(
        pipeline(&embedder, &justifier)
            .with_failure_policy(JustificationFailurePolicy::Skip)
            .rank(GO_JOB, &documents, &mut log)
            .await
            .unwrap(),
    );

    assert_eq!(run.results.len(), 1);
    assert_eq!(run.results.top().unwrap().name, "go.txt");
    assert!(matches!(run.skipped[0].reason, SkipReason::JustificationFailed(_)));
    assert_eq!(log.warnings().len(), 1);
    assert_eq!(justifier.call_count(), 2);
}

#[tokio::test]
async fn test_progress_reported_for_every_document() {
    let embedder = HashEmbedder::default();
    let justifier = StubJustifier::default();
    let documents = vec![
        Document::new("a.txt", GO_RESUME),
        Document::new("broken.pdf", b"garbage".to_vec()),
        Document::new("empty.txt", ""),
    ];

    let mut log = EventLog::default();
    pipeline(&embedder, &justifier).rank(GO_JOB, &documents, &mut log).await.unwrap();

    let progress: Vec<(usize, usize)> = log
        .events
        .iter()
        .filter_map(|e| match e {
            PipelineEvent::Progress { processed, total } => Some((*processed, *total)),
            _ => None,
        })
        .collect();
    assert_eq!(progress, vec![(1, 3), (2, 3), (3, 3)]);

    let started: Vec<usize> = log
        .events
        .iter()
        .filter_map(|e| match e {
            PipelineEvent::DocumentStarted { index, .. } => Some(*index),
            _ => None,
        })
        .collect();
    assert_eq!(started, vec![0, 1, 2]);
    assert_eq!(log.stages().last(), Some(&&PipelineStage::Done));
}

#[tokio::test]
async fn test_rank_candidates_requires_credential_before_any_document() {
    let mut config = Config::default();
    config.llm.api_key = None;
    let documents = vec![Document::new("go.txt", GO_RESUME)];

    let mut log = EventLog::default();
    let err = rank_candidates(&config, GO_JOB, &documents, &mut log).await.unwrap_err();

    assert!(matches!(err, ResumeScreenerError::Configuration(_)));
    assert!(!log
        .events
        .iter()
        .any(|e| matches!(e, PipelineEvent::DocumentStarted { .. })));
    assert!(matches!(log.stages().last(), Some(PipelineStage::Failed(_))));
}

#[tokio::test]
async fn test_rank_candidates_rejects_before_initializing() {
    let config = Config::default();
    let documents = vec![Document::new("go.txt", GO_RESUME)];

    let mut log = EventLog::default();
    let outcome = rank_candidates(&config, "", &documents, &mut log).await.unwrap();

    assert_eq!(outcome, RankingOutcome::Rejected(InputIssue::MissingJobDescription));
    assert!(!log.stages().contains(&&PipelineStage::Initializing));
}

#[tokio::test]
async fn test_pipeline_with_hosted_justifier() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/chat/completions")
        .match_header("authorization", "Bearer test-key")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"choices":[{"message":{"role":"assistant","content":"Solid overlap with the role."}}]}"#)
        .expect(2)
        .create_async()
        .await;

    let mut config = Config::default();
    config.llm.endpoint = server.url();
    config.llm.api_key = Some("test-key".to_string());
    let justifier = JustificationGenerator::from_config(&config).unwrap();

    let documents = vec![Document::new("go.txt", GO_RESUME), Document::new("chef.txt", PASTRY_RESUME)];
    let mut pipeline = RankingPipeline::with_components(DocumentExtractor::new(), HashEmbedder::default(), justifier);
    let run = completed(pipeline.rank(GO_JOB, &documents, &mut EventLog::default()).await.unwrap());

    assert_eq!(run.llm_model, "openai/gpt-3.5-turbo");
    assert!(run.results.iter().all(|c| c.justification == "Solid overlap with the role."));
    mock.assert_async().await;
}

#[tokio::test]
async fn test_input_manager_loads_files_in_order() {
    let temp_dir = TempDir::new().unwrap();
    let resume_md = temp_dir.path().join("jane.md");
    let resume_txt = temp_dir.path().join("john.txt");
    fs::write(&resume_md, "# Jane Doe\n\n**Go** engineer, *Kubernetes* operator").unwrap();
    fs::write(&resume_txt, "John Doe\nPastry chef").unwrap();

    let manager = InputManager::new();
    let documents = manager.load_documents(&[&resume_md, &resume_txt]).await.unwrap();

    assert_eq!(documents.len(), 2);
    assert_eq!(documents[0].name, "jane.md");
    assert_eq!(documents[1].name, "john.txt");
    assert_eq!(documents[1].bytes, b"John Doe\nPastry chef".to_vec());

    let missing = manager.load_document(&temp_dir.path().join("nobody.pdf")).await;
    assert!(matches!(missing, Err(ResumeScreenerError::InvalidInput(_))));
}

#[tokio::test]
async fn test_job_description_from_markdown_file() {
    let temp_dir = TempDir::new().unwrap();
    let job = temp_dir.path().join("job.md");
    fs::write(&job, "## Senior Go Engineer\n\n- gRPC\n- Kubernetes").unwrap();

    let mut manager = InputManager::new();
    let text = manager.extract_text(&job).await.unwrap();

    assert!(text.contains("Senior Go Engineer"));
    assert!(text.contains("Kubernetes"));
    assert!(!text.contains("##"));
    assert_eq!(manager.cache_size(), 1);
}
