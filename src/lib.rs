pub mod cli;
pub mod config;
pub mod error;
pub mod extractor;
pub mod ui;

// Public API re-exports
pub use cli::{Cli, OutputFormat};
pub use config::{CliOverrides, Config, ExtractionConfig, OutputConfig};
pub use error::{ImageError, Result, UnembedError, UserFriendlyError};

// Core functionality re-exports
pub use extractor::{
    Document, EmbeddedImage, ExtractedImage, Extraction, ExtractionProgress, ExtractionReport,
    ImageExtractor, ImageOutcome, ImageSubtype, TextEncoding,
};
pub use ui::{OutputFormatter, OutputMode, ProgressManager};

use extractor::pattern::count_embedded_images;
use extractor::RunPaths;
use std::path::{Path, PathBuf};

/// Main library interface: one HTML file in, one rewritten HTML file and a
/// directory of images out.
pub struct Unembed {
    config: Config,
    output_formatter: OutputFormatter,
    progress_manager: ProgressManager,
    dry_run: bool,
}

impl Unembed {
    pub fn new(config: Config, output_mode: OutputMode, verbose: u8, quiet: bool) -> Self {
        let output_formatter = OutputFormatter::new(output_mode, verbose, quiet);
        let progress_manager = ProgressManager::new(!quiet && output_mode == OutputMode::Human);

        Self {
            config,
            output_formatter,
            progress_manager,
            dry_run: false,
        }
    }

    pub fn from_cli(cli_args: &Cli) -> Result<Self> {
        let config = cli_args.load_config()?;
        let output_mode = match cli_args.output_format {
            OutputFormat::Human => OutputMode::Human,
            OutputFormat::Json => OutputMode::Json,
            OutputFormat::Plain => OutputMode::Plain,
        };

        Ok(Self::new(config, output_mode, cli_args.verbose, cli_args.quiet)
            .with_dry_run(cli_args.dry_run))
    }

    /// Decode and report without writing images or the output file.
    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// Runs the whole pipeline for `input`.
    ///
    /// `output` defaults to `<stem><suffix><ext>` next to the input. Images go
    /// to the configured image directory, resolved against the output file's
    /// directory so the rewritten references resolve on disk.
    pub fn process_file(&self, input: &Path, output: Option<&Path>) -> Result<ExtractionReport> {
        self.output_formatter
            .start_operation(&format!("Reading '{}'", input.display()));
        let document = Document::read(input)?;

        self.output_formatter.info(&format!(
            "Original file size: {}",
            ui::output::format_bytes(document.size)
        ));
        if document.encoding != TextEncoding::Utf8 {
            self.output_formatter.warning(&format!(
                "Input is not valid UTF-8, decoded as {}",
                document.encoding
            ));
        }

        let output_path = output
            .map(Path::to_path_buf)
            .unwrap_or_else(|| extractor::default_output_path(input, &self.config.output.suffix));
        let image_dir = self.resolve_image_dir(&output_path);

        let extraction = self.extract_images(&document.text, &image_dir)?;

        let new_size = if self.dry_run {
            extraction.text.len() as u64
        } else {
            self.output_formatter.start_operation(&format!(
                "Writing optimized HTML to '{}'",
                output_path.display()
            ));
            extractor::write_document(&output_path, &extraction.text)?
        };

        let paths = RunPaths {
            input_path: input.to_path_buf(),
            output_path,
            image_dir,
        };

        Ok(ExtractionReport::new(
            paths,
            document.encoding,
            document.size,
            new_size,
            &extraction,
            self.dry_run,
        ))
    }

    fn resolve_image_dir(&self, output_path: &Path) -> PathBuf {
        let image_dir = &self.config.extraction.image_dir;
        match output_path.parent() {
            Some(parent) => parent.join(image_dir),
            None => PathBuf::from(image_dir),
        }
    }

    fn extract_images(&self, text: &str, image_dir: &Path) -> Result<Extraction> {
        let total_images = count_embedded_images(text);
        self.output_formatter.start_operation(&format!(
            "Extracting base64 images ({} found)",
            total_images
        ));
        self.output_formatter
            .debug(&format!("Image directory: {}", image_dir.display()));

        let extractor = ImageExtractor::new(image_dir)
            .with_reference_dir(&self.config.extraction.image_dir)
            .with_filename_prefix(self.config.extraction.filename_prefix.clone())
            .with_sequence_width(self.config.extraction.sequence_width)
            .with_dry_run(self.dry_run);

        let pb = self.progress_manager.create_image_progress(total_images as u64);
        let on_image = |outcome: &ImageOutcome, progress: &ExtractionProgress| {
            self.progress_manager
                .suspend(&pb, || self.output_formatter.print_image_outcome(outcome));
            ui::progress::update_image_progress(&pb, progress);
        };

        let extraction = extractor.extract(text, Some(&on_image))?;

        ui::progress::finish_progress_with_summary(
            &pb,
            &format!("Extracted {} images", extraction.images_extracted()),
            extraction.progress.elapsed(),
        );

        Ok(extraction)
    }

    pub fn generate_sample_config<P: AsRef<Path>>(output_path: P) -> Result<()> {
        let sample_config = Config::create_sample_config();
        std::fs::write(output_path.as_ref(), sample_config).map_err(|source| UnembedError::Write {
            path: output_path.as_ref().to_path_buf(),
            source,
        })?;
        Ok(())
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn output_formatter(&self) -> &OutputFormatter {
        &self.output_formatter
    }

    pub fn is_dry_run(&self) -> bool {
        self.dry_run
    }

    pub fn handle_error(&self, error: &UnembedError) {
        self.output_formatter.print_user_friendly_error(error);
    }
}

/// Extracts every embedded image in `text` into `output_dir` using the
/// default naming, referencing them as `./<output_dir>/image_NNNN.<ext>`
/// (or `<output_dir>/image_NNNN.<ext>` when `output_dir` is absolute).
pub fn extract_images<P: AsRef<Path>>(text: &str, output_dir: P) -> Result<Extraction> {
    ImageExtractor::new(output_dir.as_ref()).extract(text, None)
}

pub fn version_info() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
