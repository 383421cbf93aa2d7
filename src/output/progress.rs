//! Terminal progress reporting for ranking runs

use crate::processing::pipeline::{PipelineEvent, PipelineObserver, PipelineStage};
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};

/// Renders pipeline events as a progress bar plus coloured notices on stderr.
pub struct CliObserver {
    bar: Option<ProgressBar>,
    use_colors: bool,
    warnings: usize,
}

impl CliObserver {
    pub fn new(use_colors: bool) -> Self {
        Self {
            bar: None,
            use_colors,
            warnings: 0,
        }
    }

    pub fn warning_count(&self) -> usize {
        self.warnings
    }

    fn print(&self, line: String) {
        match &self.bar {
            Some(bar) => bar.println(line),
            None => eprintln!("{}", line),
        }
    }

    fn ensure_bar(&mut self, total: usize) -> &ProgressBar {
        self.bar.get_or_insert_with(|| {
            let bar = ProgressBar::new(total as u64);
            let style = ProgressStyle::with_template("{spinner:.green} [{bar:30.cyan/blue}] {pos}/{len} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .progress_chars("=> ");
            bar.set_style(style);
            bar
        })
    }

    fn finish(&mut self) {
        if let Some(bar) = self.bar.take() {
            bar.finish_and_clear();
        }
    }
}

impl PipelineObserver for CliObserver {
    fn on_event(&mut self, event: &PipelineEvent) {
        match event {
            PipelineEvent::StageChanged(PipelineStage::Initializing) => {
                self.print("Initializing AI models...".to_string());
            }
            PipelineEvent::StageChanged(PipelineStage::Done) => self.finish(),
            PipelineEvent::StageChanged(PipelineStage::Failed(reason)) => {
                self.finish();
                let line = format!("Ranking failed: {}", reason);
                self.print(if self.use_colors { line.red().to_string() } else { line });
            }
            PipelineEvent::StageChanged(_) => {}
            PipelineEvent::DocumentStarted { index, name } => {
                if *index == 0 {
                    self.print("Scoring resumes...".to_string());
                }
                if let Some(bar) = &self.bar {
                    bar.set_message(name.clone());
                }
            }
            PipelineEvent::Progress { processed, total } => {
                let bar = self.ensure_bar(*total);
                bar.set_position(*processed as u64);
            }
            PipelineEvent::DocumentSkipped(skipped) => {
                log::debug!("Skipped {}: {}", skipped.name, skipped.reason);
            }
            PipelineEvent::Warning(message) => {
                self.warnings += 1;
                let line = format!("⚠️  {}", message);
                self.print(if self.use_colors { line.yellow().to_string() } else { line });
            }
            PipelineEvent::Info(message) => {
                let line = format!("ℹ️  {}", message);
                self.print(if self.use_colors { line.cyan().to_string() } else { line });
            }
        }
    }
}
