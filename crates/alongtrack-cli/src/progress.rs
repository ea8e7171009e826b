use async_trait::async_trait;
use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};

use alongtrack_pipeline::{checkpoints, PipelineProgress};

/// Progress bar following the pipeline's percentage checkpoints
pub struct BarProgress {
    bar: ProgressBar,
}

impl BarProgress {
    pub fn new() -> Self {
        let bar = ProgressBar::new(u64::from(checkpoints::DONE));
        if let Ok(style) = ProgressStyle::default_bar()
            .template("{msg}\n[{bar:40.cyan/blue}] {pos}% ({elapsed})")
        {
            bar.set_style(style.progress_chars("█▓▒░ "));
        }
        Self { bar }
    }

    /// Bar that draws nothing, for JSON output
    pub fn hidden() -> Self {
        let bar = ProgressBar::new(u64::from(checkpoints::DONE));
        bar.set_draw_target(ProgressDrawTarget::hidden());
        Self { bar }
    }

    pub fn finish_success(&self, message: &str) {
        self.bar.set_position(u64::from(checkpoints::DONE));
        self.bar.finish_with_message(format!("✓ {}", message));
    }

    pub fn finish_error(&self, message: &str) {
        self.bar.abandon_with_message(format!("✗ {}", message));
    }
}

#[async_trait]
impl PipelineProgress for BarProgress {
    async fn report(&self, percent: u8, message: &str) {
        let percent = u64::from(percent);
        if percent > self.bar.position() {
            self.bar.set_position(percent);
        }
        self.bar.set_message(message.to_string());
    }
}
