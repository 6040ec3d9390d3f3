pub mod document;
pub mod image_extractor;
pub mod pattern;
pub mod report;

pub use document::{default_output_path, write_document, Document, TextEncoding};
pub use image_extractor::{ExtractedImage, Extraction, ExtractionProgress, ImageExtractor, ImageOutcome};
pub use pattern::{find_embedded_images, EmbeddedImage, ImageSubtype};
pub use report::{ExtractionReport, ExtractionSummary, ImageEntry, RunPaths};
