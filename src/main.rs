//! Resume screener: rank resumes against a job description

use clap::Parser;
use colored::Colorize;
use log::{error, info};
use resume_screener::cli::{self, Cli, Commands, ConfigAction, ModelAction};
use resume_screener::config::{JustificationFailurePolicy, OutputFormat};
use resume_screener::input::InputManager;
use resume_screener::output::{save_report_to_file, suggest_filename, CliObserver, RankingReport, ReportGenerator};
use resume_screener::processing::embedding_manager::EmbeddingModelManager;
use resume_screener::{rank_candidates, Config, RankingOutcome, Result, ResumeScreenerError};
use std::path::Path;
use std::process;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let log_level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level)).init();

    let config_path = cli.config.clone().unwrap_or_else(Config::config_path);
    let config = match load_config(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            error!("Failed to load configuration: {}", e);
            eprintln!("{} {}", "Error:".red().bold(), e);
            process::exit(1);
        }
    };

    if let Err(e) = run_command(cli.command, config, &config_path).await {
        error!("Command failed: {}", e);
        eprintln!("{} {}", "Error:".red().bold(), e);
        process::exit(1);
    }
}

fn load_config(path: Option<&Path>) -> Result<Config> {
    match path {
        Some(path) => Config::load_from(path),
        None => Config::load(),
    }
}

async fn run_command(command: Commands, mut config: Config, config_path: &Path) -> Result<()> {
    match command {
        Commands::Rank {
            job,
            job_text,
            resumes,
            embedding,
            llm,
            output,
            save,
            continue_on_error,
        } => {
            let output_format = match output {
                Some(format) => cli::parse_output_format(&format).map_err(ResumeScreenerError::InvalidInput)?,
                None => config.output.format,
            };

            if let Some(embedding) = embedding {
                config.models.default_embedding_model = embedding;
            }
            if let Some(llm) = llm {
                config.llm.model = llm;
            }
            if continue_on_error {
                config.processing.on_justification_error = JustificationFailurePolicy::Skip;
            }
            let config = config.apply_env_overrides();

            let mut input_manager = InputManager::new();
            let job_description = match (job_text, job) {
                (Some(text), _) => text,
                (None, Some(path)) => {
                    cli::validate_file_extension(&path, &["txt", "md", "pdf"]).map_err(|e| {
                        ResumeScreenerError::InvalidInput(format!("Job description file: {}", e))
                    })?;
                    input_manager.extract_text(&path).await?
                }
                (None, None) => String::new(),
            };

            let documents = input_manager.load_documents(&resumes).await?;
            info!("Ranking {} resume(s) with {}", documents.len(), config.llm.model);

            let mut observer = CliObserver::new(config.output.color_output);
            let outcome = rank_candidates(&config, &job_description, &documents, &mut observer).await?;

            let run = match outcome {
                // The observer has already shown the reason
                RankingOutcome::Rejected(issue) => {
                    info!("Run rejected: {}", issue);
                    return Ok(());
                }
                RankingOutcome::Completed(run) => run,
            };

            let report = RankingReport::from_run(&run, &job_description);
            let use_colors = config.output.color_output && save.is_none();
            let generator = ReportGenerator::with_options(use_colors, config.output.pretty_json, true, true);
            let rendered = generator.generate_report(&report, &output_format)?;

            match save {
                Some(path) => {
                    let path = if path.is_dir() {
                        path.join(suggest_filename(&output_format, true))
                    } else {
                        path
                    };
                    save_report_to_file(&rendered, &path)?;
                    println!("✅ Report saved to {}", path.display());
                }
                None => println!("{}", rendered),
            }
        }

        Commands::Models { action } => run_models_command(action, &config).await?,

        Commands::Config { action } => run_config_command(action, config, config_path)?,
    }

    Ok(())
}

async fn run_models_command(action: ModelAction, config: &Config) -> Result<()> {
    let mut manager = EmbeddingModelManager::new(config.models_dir().clone()).await?;

    match action {
        ModelAction::List => {
            println!("📚 Available Embedding Models\n");
            for (id, info) in manager.list_available_models() {
                let status = if manager.is_model_downloaded(id) { "✅ Downloaded" } else { "⬇️  Available" };
                println!("  • {} ({}) - {} MB [{}]", id, info.repo_id, info.size_mb, status);
                println!("    {}", info.description);
            }
            println!("\nDefault: {}", config.models.default_embedding_model);
        }

        ModelAction::Download { model, force } => {
            let model_id = manager
                .resolve_model_id(&model)
                .ok_or_else(|| ResumeScreenerError::ModelNotFound(model.clone()))?;

            if !force && manager.is_model_downloaded(&model_id) {
                println!("✅ Model '{}' is already downloaded!", model_id);
                println!("💡 Use --force to re-download");
                return Ok(());
            }

            println!("⬇️  Downloading model: {}", model_id);
            let path = manager.download_model(&model_id).await?;
            println!("✅ Model '{}' downloaded successfully!", model_id);
            println!("📁 Location: {}", path.display());
        }

        ModelAction::Remove { model } => {
            let model_id = manager
                .resolve_model_id(&model)
                .ok_or_else(|| ResumeScreenerError::ModelNotFound(model.clone()))?;

            if !manager.is_model_downloaded(&model_id) {
                println!("⚠️  Model '{}' is not downloaded", model_id);
                return Ok(());
            }

            let path = manager.remove_model(&model_id).await?;
            println!("✅ Model '{}' removed ({})", model_id, path.display());
        }

        ModelAction::Info { model } => {
            let model_id = manager
                .resolve_model_id(&model)
                .ok_or_else(|| ResumeScreenerError::ModelNotFound(model.clone()))?;
            let info = manager
                .get_model_info(&model_id)
                .ok_or_else(|| ResumeScreenerError::ModelNotFound(model_id.clone()))?;

            println!("📋 Model Information for '{}'\n", model_id);
            println!("Name: {}", info.name);
            println!("Repository: {}", info.repo_id);
            println!("Type: {:?}", info.model_type);
            println!("Size: {} MB", info.size_mb);
            println!("Dimensions: {}", info.dimensions);
            println!("Description: {}", info.description);

            match manager.get_model_path(&model_id) {
                Some(path) if manager.is_model_downloaded(&model_id) => {
                    println!("Status: ✅ Downloaded");
                    println!("Location: {}", path.display());
                }
                _ => {
                    println!("Status: ⬇️  Available for download");
                    println!("\n💡 To download this model, run:");
                    println!("   resume-screener models download {}", model_id);
                }
            }
        }
    }

    Ok(())
}

fn run_config_command(action: Option<ConfigAction>, mut config: Config, config_path: &Path) -> Result<()> {
    match action {
        Some(ConfigAction::Show) | None => {
            println!("⚙️  Current Configuration\n");
            println!("Models Directory: {}", config.models_dir().display());
            println!("Default Embedding Model: {}", config.models.default_embedding_model);
            println!("LLM Endpoint: {}", config.llm.endpoint);
            println!("LLM Model: {}", config.llm.model);
            println!("Temperature: {}", config.llm.temperature);
            println!("API Key Variable: {}", config.llm.api_key_env);
            let key_status = if config.clone().apply_env_overrides().api_key().is_ok() { "set" } else { "missing" };
            println!("API Key: {}", key_status);
            println!("Snippet Length: {} chars", config.processing.snippet_chars);
            println!("On Justification Error: {:?}", config.processing.on_justification_error);
            println!("Output Format: {}", format_name(config.output.format));
        }

        Some(ConfigAction::Path) => println!("{}", config_path.display()),

        Some(ConfigAction::Reset) => {
            Config::default().save_to(config_path)?;
            println!("✅ Configuration reset to defaults ({})", config_path.display());
        }

        Some(ConfigAction::Set { key, value }) => {
            config.set_value(&key, &value)?;
            config.save_to(config_path)?;
            println!("✅ {} = {}", key, value);
        }
    }

    Ok(())
}

fn format_name(format: OutputFormat) -> &'static str {
    match format {
        OutputFormat::Console => "console",
        OutputFormat::Json => "json",
        OutputFormat::Markdown => "markdown",
        OutputFormat::Html => "html",
    }
}
