use crate::extractor::document::TextEncoding;
use crate::extractor::image_extractor::{Extraction, ImageOutcome};
use crate::extractor::pattern::ImageSubtype;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Clone, Serialize)]
pub struct ExtractionReport {
    pub input_path: PathBuf,
    pub output_path: PathBuf,
    pub image_dir: PathBuf,
    pub encoding: TextEncoding,
    pub original_size: u64,
    pub new_size: u64,
    pub reduction_percent: f64,
    pub summary: ExtractionSummary,
    pub images: Vec<ImageEntry>,
    pub errors: Vec<String>,
    pub extraction_time: DateTime<Utc>,
    pub dry_run: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct ExtractionSummary {
    pub images_found: usize,
    pub images_extracted: usize,
    pub images_failed: usize,
    pub bytes_extracted: u64,
    pub extraction_duration: Duration,
}

#[derive(Debug, Clone, Serialize)]
pub struct ImageEntry {
    pub sequence: usize,
    pub subtype: ImageSubtype,
    pub filename: String,
    pub encoded_size: usize,
    pub decoded_size: Option<u64>,
    pub reference: Option<String>,
    pub error: Option<String>,
}

impl From<&ImageOutcome> for ImageEntry {
    fn from(outcome: &ImageOutcome) -> Self {
        let (decoded_size, reference, error) = match &outcome.result {
            Ok(image) => (Some(image.decoded_size), Some(image.reference.clone()), None),
            Err(e) => (None, None, Some(e.to_string())),
        };

        Self {
            sequence: outcome.sequence,
            subtype: outcome.subtype,
            filename: outcome.filename.clone(),
            encoded_size: outcome.encoded_len(),
            decoded_size,
            reference,
            error,
        }
    }
}

/// Where the run read from and wrote to.
#[derive(Debug, Clone)]
pub struct RunPaths {
    pub input_path: PathBuf,
    pub output_path: PathBuf,
    pub image_dir: PathBuf,
}

impl ExtractionReport {
    pub fn new(
        paths: RunPaths,
        encoding: TextEncoding,
        original_size: u64,
        new_size: u64,
        extraction: &Extraction,
        dry_run: bool,
    ) -> Self {
        let progress = &extraction.progress;

        Self {
            input_path: paths.input_path,
            output_path: paths.output_path,
            image_dir: paths.image_dir,
            encoding,
            original_size,
            new_size,
            reduction_percent: reduction_percent(original_size, new_size),
            summary: ExtractionSummary {
                images_found: progress.total_images,
                images_extracted: progress.images_extracted,
                images_failed: progress.images_failed,
                bytes_extracted: progress.bytes_written,
                extraction_duration: progress.elapsed(),
            },
            images: extraction.outcomes.iter().map(ImageEntry::from).collect(),
            errors: progress.errors.clone(),
            extraction_time: Utc::now(),
            dry_run,
        }
    }

    pub fn has_failures(&self) -> bool {
        self.summary.images_failed > 0
    }
}

/// Percentage of `original` saved by `new`; negative when the output grew.
pub fn reduction_percent(original: u64, new: u64) -> f64 {
    if original == 0 {
        0.0
    } else {
        (original as f64 - new as f64) / original as f64 * 100.0
    }
}
