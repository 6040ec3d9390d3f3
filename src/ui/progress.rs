use crate::extractor::ExtractionProgress;
use crate::ui::output::format_duration;
use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

pub struct ProgressManager {
    enabled: bool,
}

impl ProgressManager {
    pub fn new(enabled: bool) -> Self {
        Self { enabled }
    }

    pub fn create_image_progress(&self, total_images: u64) -> ProgressBar {
        if !self.enabled || total_images == 0 {
            return ProgressBar::hidden();
        }

        let pb = ProgressBar::new(total_images);
        pb.set_style(
            ProgressStyle::with_template(
                "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos:>5}/{len:5} images {msg}",
            )
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("#>-"),
        );
        pb.set_message("Decoding...");
        pb.enable_steady_tick(Duration::from_millis(100));
        pb
    }

    /// Runs `f` with `pb` cleared from the terminal so printed lines don't tear it.
    pub fn suspend<F, R>(&self, pb: &ProgressBar, f: F) -> R
    where
        F: FnOnce() -> R,
    {
        if self.enabled {
            pb.suspend(f)
        } else {
            f()
        }
    }
}

impl Default for ProgressManager {
    fn default() -> Self {
        Self::new(true)
    }
}

pub fn update_image_progress(pb: &ProgressBar, progress: &ExtractionProgress) {
    pb.set_position(progress.images_processed as u64);

    match progress.current_image {
        Some(ref current) => pb.set_message(format!("{} ({:.0}%)", current, progress.percentage())),
        None => pb.set_message("Decoding..."),
    }
}

pub fn finish_progress_with_summary(pb: &ProgressBar, message: &str, duration: Duration) {
    let final_message = format!("{} (completed in {})", message, format_duration(duration));
    pb.finish_with_message(final_message);
}
