use crate::error::{UnembedError, UserFriendlyError};
use crate::extractor::{ExtractionReport, ImageOutcome, TextEncoding};
use console::{style, Emoji, Term};
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum OutputMode {
    Human,
    Json,
    Plain,
}

// Emojis with text fallbacks
static CHECKMARK: Emoji = Emoji("✅ ", "✓ ");
static CROSS: Emoji = Emoji("❌ ", "✗ ");
static INFO: Emoji = Emoji("ℹ️  ", "i ");
static WARNING: Emoji = Emoji("⚠️  ", "! ");
static ROCKET: Emoji = Emoji("🚀 ", "> ");

pub struct OutputFormatter {
    mode: OutputMode,
    use_colors: bool,
    verbose_level: u8,
    quiet: bool,
}

impl OutputFormatter {
    pub fn new(mode: OutputMode, verbose: u8, quiet: bool) -> Self {
        let use_colors = match mode {
            OutputMode::Human => Term::stdout().features().colors_supported() && !quiet,
            _ => false,
        };

        Self {
            mode,
            use_colors,
            verbose_level: if quiet { 0 } else { verbose },
            quiet,
        }
    }

    // Core messaging methods
    pub fn success(&self, message: &str) {
        if self.should_show_message(0) {
            match self.mode {
                OutputMode::Human => self.print_human_message(MessageType::Success, message),
                OutputMode::Json => self.print_json_message("success", message),
                OutputMode::Plain => println!("SUCCESS: {}", message),
            }
        }
    }

    pub fn error(&self, message: &str) {
        match self.mode {
            OutputMode::Human => self.print_human_message(MessageType::Error, message),
            OutputMode::Json => self.print_json_message("error", message),
            OutputMode::Plain => eprintln!("ERROR: {}", message),
        }
    }

    pub fn warning(&self, message: &str) {
        if self.should_show_message(0) {
            match self.mode {
                OutputMode::Human => self.print_human_message(MessageType::Warning, message),
                OutputMode::Json => self.print_json_message("warning", message),
                OutputMode::Plain => println!("WARNING: {}", message),
            }
        }
    }

    pub fn info(&self, message: &str) {
        if self.should_show_message(0) {
            match self.mode {
                OutputMode::Human => self.print_human_message(MessageType::Info, message),
                OutputMode::Json => self.print_json_message("info", message),
                OutputMode::Plain => println!("INFO: {}", message),
            }
        }
    }

    pub fn debug(&self, message: &str) {
        if self.should_show_message(1) {
            match self.mode {
                OutputMode::Human => {
                    if self.use_colors {
                        println!("  {}", style(message).dim());
                    } else {
                        println!("  DEBUG: {}", message);
                    }
                }
                OutputMode::Json => self.print_json_message("debug", message),
                OutputMode::Plain => println!("DEBUG: {}", message),
            }
        }
    }

    pub fn start_operation(&self, operation: &str) {
        if self.should_show_message(0) {
            match self.mode {
                OutputMode::Human => {
                    if self.use_colors {
                        println!("{}{}", ROCKET, style(operation).bold());
                    } else {
                        println!("> {}", operation);
                    }
                }
                OutputMode::Json => self.print_json_message("operation_start", operation),
                OutputMode::Plain => println!("STARTING: {}", operation),
            }
        }
    }

    pub fn print_user_friendly_error(&self, error: &UnembedError) {
        let user_message = error.user_message();
        self.error(&user_message);

        if let Some(suggestion) = error.suggestion() {
            match self.mode {
                OutputMode::Human => {
                    if self.use_colors {
                        eprintln!(
                            "{}{}",
                            INFO,
                            style(&format!("Suggestion: {}", suggestion)).cyan()
                        );
                    } else {
                        eprintln!("Suggestion: {}", suggestion);
                    }
                }
                OutputMode::Json => {
                    self.print_json_object(&serde_json::json!({
                        "type": "suggestion",
                        "message": suggestion
                    }));
                }
                OutputMode::Plain => {
                    eprintln!("SUGGESTION: {}", suggestion);
                }
            }
        }
    }

    /// One line per processed image.
    pub fn print_image_outcome(&self, outcome: &ImageOutcome) {
        match &outcome.result {
            Ok(image) => {
                let message = format!(
                    "Extracted: {} ({})",
                    image.filename,
                    format_bytes(image.decoded_size)
                );
                match self.mode {
                    OutputMode::Json => {
                        if !self.quiet {
                            self.print_json_object(&serde_json::json!({
                                "type": "image",
                                "sequence": outcome.sequence,
                                "filename": image.filename,
                                "reference": image.reference,
                                "decoded_size": image.decoded_size,
                            }));
                        }
                    }
                    _ => self.success(&message),
                }
            }
            Err(e) => {
                let message = format!("Error extracting image {}: {}", outcome.sequence, e);
                match self.mode {
                    OutputMode::Json => self.print_json_object(&serde_json::json!({
                        "type": "image_error",
                        "sequence": outcome.sequence,
                        "filename": outcome.filename,
                        "error": e.to_string(),
                    })),
                    _ => self.warning(&message),
                }
            }
        }
    }

    pub fn print_extraction_report(&self, report: &ExtractionReport) {
        match self.mode {
            OutputMode::Human => self.print_human_report(report),
            OutputMode::Json => {
                let json_output =
                    serde_json::to_string_pretty(report).unwrap_or_else(|_| "{}".to_string());
                println!("{}", json_output);
            }
            OutputMode::Plain => self.print_plain_report(report),
        }
    }

    pub fn print_next_steps(&self, report: &ExtractionReport) {
        if self.quiet || self.mode != OutputMode::Human || report.dry_run {
            return;
        }

        let image_dir = report
            .image_dir
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| report.image_dir.display().to_string());

        println!();
        println!("To use:");
        println!("  1. Upload '{}' to your host", report.output_path.display());
        println!("  2. Upload the '{}/' folder alongside it", image_dir);
        println!("  3. Keep them in the same directory so the relative paths resolve");
    }

    pub fn print_separator(&self) {
        if self.quiet {
            return;
        }

        match self.mode {
            OutputMode::Human => {
                if self.use_colors {
                    println!("{}", style("─".repeat(60)).dim());
                } else {
                    println!("{}", "-".repeat(60));
                }
            }
            OutputMode::Plain => {
                println!("{}", "-".repeat(60));
            }
            OutputMode::Json => {}
        }
    }

    fn should_show_message(&self, min_verbose_level: u8) -> bool {
        !self.quiet && self.verbose_level >= min_verbose_level
    }

    fn print_human_message(&self, msg_type: MessageType, message: &str) {
        #[allow(clippy::type_complexity)]
        let (emoji, color_fn): (Emoji, Box<dyn Fn(&str) -> console::StyledObject<&str>>) =
            match msg_type {
                MessageType::Success => (CHECKMARK, Box::new(|msg| style(msg).green())),
                MessageType::Error => (CROSS, Box::new(|msg| style(msg).red().bold())),
                MessageType::Warning => (WARNING, Box::new(|msg| style(msg).yellow().bold())),
                MessageType::Info => (INFO, Box::new(|msg| style(msg).cyan())),
            };

        if self.use_colors {
            match msg_type {
                MessageType::Error => eprintln!("{}{}", emoji, color_fn(message)),
                _ => println!("{}{}", emoji, color_fn(message)),
            }
        } else {
            let prefix = match msg_type {
                MessageType::Success => "✓",
                MessageType::Error => "✗",
                MessageType::Warning => "!",
                MessageType::Info => "i",
            };

            match msg_type {
                MessageType::Error => eprintln!("{} {}", prefix, message),
                _ => println!("{} {}", prefix, message),
            }
        }
    }

    fn print_json_message(&self, level: &str, message: &str) {
        self.print_json_object(&serde_json::json!({
            "type": "message",
            "level": level,
            "message": message,
            "timestamp": chrono::Utc::now().to_rfc3339()
        }));
    }

    fn print_json_object(&self, obj: &serde_json::Value) {
        println!(
            "{}",
            serde_json::to_string(obj).unwrap_or_else(|_| "{}".to_string())
        );
    }

    fn highlight(&self, value: String) -> String {
        if self.use_colors {
            style(value).cyan().bold().to_string()
        } else {
            value
        }
    }

    fn print_human_report(&self, report: &ExtractionReport) {
        if self.quiet {
            return;
        }

        let summary = &report.summary;
        self.print_separator();

        let title = if report.dry_run {
            "Dry run completed (no files written)"
        } else {
            "Done!"
        };
        if self.use_colors {
            println!("{} {}", style(title).green().bold(), CHECKMARK);
        } else {
            println!("✓ {}", title);
        }

        println!();
        println!(
            "  Images extracted: {}",
            self.highlight(summary.images_extracted.to_string())
        );
        if summary.images_failed > 0 {
            println!(
                "  Images failed:    {}",
                self.highlight(summary.images_failed.to_string())
            );
        }
        println!(
            "  Original size:    {}",
            self.highlight(format_bytes(report.original_size))
        );
        println!(
            "  New file size:    {}",
            self.highlight(format_bytes(report.new_size))
        );
        println!(
            "  Reduction:        {}",
            self.highlight(format!("{:.1}%", report.reduction_percent))
        );
        println!(
            "  Time taken:       {}",
            self.highlight(format_duration(summary.extraction_duration))
        );

        if report.encoding != TextEncoding::Utf8 {
            println!("  Input encoding:   {} (fallback)", report.encoding);
        }

        if !report.errors.is_empty() {
            println!();
            println!("Issues encountered:");
            for error in &report.errors {
                println!("  - {}", error);
            }
        }

        self.print_separator();
    }

    fn print_plain_report(&self, report: &ExtractionReport) {
        if self.quiet {
            return;
        }

        let summary = &report.summary;
        println!("REPORT: Extraction completed");
        println!("Output: {}", report.output_path.display());
        println!("Images found: {}", summary.images_found);
        println!("Images extracted: {}", summary.images_extracted);
        println!("Images failed: {}", summary.images_failed);
        println!("Original size: {} bytes", report.original_size);
        println!("New size: {} bytes", report.new_size);
        println!("Reduction: {:.1}%", report.reduction_percent);
        println!("Duration: {:?}", summary.extraction_duration);
    }
}

#[derive(Debug, Clone, Copy)]
enum MessageType {
    Success,
    Error,
    Warning,
    Info,
}

pub fn format_bytes(bytes: u64) -> String {
    const UNITS: &[&str] = &["B", "KB", "MB", "GB"];
    let mut size = bytes as f64;
    let mut unit_index = 0;

    while size >= 1024.0 && unit_index < UNITS.len() - 1 {
        size /= 1024.0;
        unit_index += 1;
    }

    if unit_index == 0 {
        format!("{} {}", bytes, UNITS[unit_index])
    } else {
        format!("{:.2} {}", size, UNITS[unit_index])
    }
}

pub fn format_duration(duration: Duration) -> String {
    let secs = duration.as_secs();
    if secs >= 60 {
        format!("{}m {}s", secs / 60, secs % 60)
    } else if secs > 0 {
        format!("{}s", secs)
    } else {
        format!("{}ms", duration.as_millis())
    }
}
