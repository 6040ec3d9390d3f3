use crate::error::{ImageError, Result, UnembedError};
use crate::extractor::pattern::{count_embedded_images, find_embedded_images, EmbeddedImage, ImageSubtype};
use base64::alphabet;
use base64::engine::{GeneralPurpose, GeneralPurposeConfig};
use base64::Engine;
use std::fs;
use std::ops::Range;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

// Padding is required and must end the payload; non-zero trailing bits in the
// last symbol are tolerated.
const PAYLOAD_ENGINE: GeneralPurpose = GeneralPurpose::new(
    &alphabet::STANDARD,
    GeneralPurposeConfig::new().with_decode_allow_trailing_bits(true),
);

pub const DEFAULT_IMAGE_DIR: &str = "images";
pub const DEFAULT_FILENAME_PREFIX: &str = "image";
pub const DEFAULT_SEQUENCE_WIDTH: usize = 4;

#[derive(Debug, Clone)]
pub struct ExtractedImage {
    pub filename: String,
    pub path: PathBuf,
    /// Replacement text placed in the document, e.g. `./images/image_0001.png`.
    pub reference: String,
    pub decoded_size: u64,
}

/// Result of processing one embedded image.
#[derive(Debug)]
pub struct ImageOutcome {
    pub sequence: usize,
    pub subtype: ImageSubtype,
    pub span: Range<usize>,
    pub filename: String,
    pub result: std::result::Result<ExtractedImage, ImageError>,
}

impl ImageOutcome {
    pub fn is_extracted(&self) -> bool {
        self.result.is_ok()
    }

    pub fn encoded_len(&self) -> usize {
        self.span.len()
    }
}

#[derive(Debug, Clone)]
pub struct ExtractionProgress {
    pub images_processed: usize,
    pub total_images: usize,
    pub images_extracted: usize,
    pub images_failed: usize,
    pub bytes_written: u64,
    pub current_image: Option<String>,
    pub start_time: Instant,
    pub errors: Vec<String>,
}

impl ExtractionProgress {
    pub fn new(total_images: usize) -> Self {
        Self {
            images_processed: 0,
            total_images,
            images_extracted: 0,
            images_failed: 0,
            bytes_written: 0,
            current_image: None,
            start_time: Instant::now(),
            errors: Vec::new(),
        }
    }

    pub fn record(&mut self, outcome: &ImageOutcome) {
        self.images_processed += 1;
        self.current_image = Some(outcome.filename.clone());

        match &outcome.result {
            Ok(image) => {
                self.images_extracted += 1;
                self.bytes_written += image.decoded_size;
            }
            Err(e) => {
                self.images_failed += 1;
                self.errors
                    .push(format!("Error extracting image {}: {}", outcome.sequence, e));
            }
        }
    }

    pub fn percentage(&self) -> f64 {
        if self.total_images == 0 {
            0.0
        } else {
            (self.images_processed as f64 / self.total_images as f64) * 100.0
        }
    }

    pub fn elapsed(&self) -> Duration {
        self.start_time.elapsed()
    }
}

/// Output of one extraction pass over a document.
#[derive(Debug)]
pub struct Extraction {
    pub text: String,
    pub outcomes: Vec<ImageOutcome>,
    pub progress: ExtractionProgress,
}

impl Extraction {
    pub fn images_extracted(&self) -> usize {
        self.progress.images_extracted
    }

    pub fn images_failed(&self) -> usize {
        self.progress.images_failed
    }

    pub fn extracted(&self) -> impl Iterator<Item = &ExtractedImage> {
        self.outcomes.iter().filter_map(|o| o.result.as_ref().ok())
    }
}

pub struct ImageExtractor {
    image_dir: PathBuf,
    reference_dir: String,
    filename_prefix: String,
    sequence_width: usize,
    dry_run: bool,
}

impl ImageExtractor {
    /// Images are written to `image_dir`; references use the same path,
    /// with forward slashes, unless overridden by [`with_reference_dir`].
    ///
    /// [`with_reference_dir`]: ImageExtractor::with_reference_dir
    pub fn new<P: Into<PathBuf>>(image_dir: P) -> Self {
        let image_dir = image_dir.into();
        let reference_dir = image_dir.to_string_lossy().to_string();

        Self {
            image_dir,
            reference_dir: normalize_reference_dir(&reference_dir),
            filename_prefix: DEFAULT_FILENAME_PREFIX.to_string(),
            sequence_width: DEFAULT_SEQUENCE_WIDTH,
            dry_run: false,
        }
    }

    pub fn with_reference_dir<S: AsRef<str>>(mut self, dir: S) -> Self {
        self.reference_dir = normalize_reference_dir(dir.as_ref());
        self
    }

    pub fn with_filename_prefix<S: Into<String>>(mut self, prefix: S) -> Self {
        self.filename_prefix = prefix.into();
        self
    }

    pub fn with_sequence_width(mut self, width: usize) -> Self {
        self.sequence_width = width.max(1);
        self
    }

    /// Decode every payload but touch nothing on disk.
    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    pub fn image_dir(&self) -> &Path {
        &self.image_dir
    }

    pub fn filename_for(&self, sequence: usize, subtype: ImageSubtype) -> String {
        format!(
            "{}_{:0width$}.{}",
            self.filename_prefix,
            sequence,
            subtype.extension(),
            width = self.sequence_width
        )
    }

    /// `./<dir>/<file>` for relative directories, `<dir>/<file>` for absolute ones.
    pub fn reference_for(&self, filename: &str) -> String {
        if self.reference_dir.is_empty() {
            format!("./{}", filename)
        } else if self.reference_dir.starts_with('/') || Path::new(&self.reference_dir).is_absolute() {
            format!("{}/{}", self.reference_dir, filename)
        } else {
            format!("./{}/{}", self.reference_dir, filename)
        }
    }

    /// Scans `text`, writes each decodable image and returns the rewritten text.
    ///
    /// Sequence numbers follow match order; a failed image keeps its number,
    /// so on-disk numbering has a gap where a payload could not be extracted.
    pub fn extract(
        &self,
        text: &str,
        callback: Option<&dyn Fn(&ImageOutcome, &ExtractionProgress)>,
    ) -> Result<Extraction> {
        let mut progress = ExtractionProgress::new(count_embedded_images(text));

        if !self.dry_run {
            fs::create_dir_all(&self.image_dir).map_err(|source| UnembedError::Write {
                path: self.image_dir.clone(),
                source,
            })?;
        }

        let mut rewritten = String::with_capacity(text.len());
        let mut outcomes = Vec::with_capacity(progress.total_images);
        let mut last_end = 0;

        for (index, image) in find_embedded_images(text).enumerate() {
            let outcome = self.process_image(index + 1, &image);

            rewritten.push_str(&text[last_end..image.span.start]);
            match &outcome.result {
                Ok(extracted) => rewritten.push_str(&extracted.reference),
                Err(_) => rewritten.push_str(&text[image.span.clone()]),
            }
            last_end = image.span.end;

            progress.record(&outcome);
            if let Some(callback) = callback {
                callback(&outcome, &progress);
            }
            outcomes.push(outcome);
        }

        rewritten.push_str(&text[last_end..]);

        Ok(Extraction {
            text: rewritten,
            outcomes,
            progress,
        })
    }

    fn process_image(&self, sequence: usize, image: &EmbeddedImage<'_>) -> ImageOutcome {
        let filename = self.filename_for(sequence, image.subtype);
        let path = self.image_dir.join(&filename);

        let result = self
            .decode_and_write(image.payload, &path)
            .map(|decoded_size| ExtractedImage {
                filename: filename.clone(),
                reference: self.reference_for(&filename),
                path,
                decoded_size,
            });

        ImageOutcome {
            sequence,
            subtype: image.subtype,
            span: image.span.clone(),
            filename,
            result,
        }
    }

    fn decode_and_write(&self, payload: &str, path: &Path) -> std::result::Result<u64, ImageError> {
        let bytes = PAYLOAD_ENGINE.decode(payload)?;

        if !self.dry_run {
            fs::write(path, &bytes).map_err(|source| ImageError::Write {
                path: path.to_path_buf(),
                source,
            })?;
        }

        Ok(bytes.len() as u64)
    }
}

impl Default for ImageExtractor {
    fn default() -> Self {
        Self::new(DEFAULT_IMAGE_DIR)
    }
}

// Web references always use forward slashes.
fn normalize_reference_dir(dir: &str) -> String {
    let dir = dir.replace('\\', "/");
    let dir = dir.trim_start_matches("./").trim_end_matches('/');
    if dir == "." {
        String::new()
    } else {
        dir.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use tempfile::TempDir;

    // 1x1 transparent PNG
    const PNG_B64: &str = "iVBORw0KGgoAAAANSUhEUgAAAAEAAAABCAYAAAAfFcSJAAAADUlEQVR42mNkYPhfDwAChwGA60e6kgAAAABJRU5ErkJggg==";

    fn extractor_in(temp_dir: &TempDir) -> ImageExtractor {
        ImageExtractor::new(temp_dir.path().join("images")).with_reference_dir("images")
    }

    #[test]
    fn test_pass_through_without_matches() {
        let temp_dir = TempDir::new().unwrap();
        let html = "<html><body><img src=\"photo.png\"><p>data:image is text</p></body></html>";

        let extraction = extractor_in(&temp_dir).extract(html, None).unwrap();

        assert_eq!(extraction.text, html);
        assert_eq!(extraction.images_extracted(), 0);
        assert!(extraction.outcomes.is_empty());
        assert_eq!(fs::read_dir(temp_dir.path().join("images")).unwrap().count(), 0);
    }

    #[test]
    fn test_round_trip_decode() {
        let temp_dir = TempDir::new().unwrap();
        let html = format!("<img src=\"data:image/png;base64,{}\" alt=\"dot\">", PNG_B64);

        let extraction = extractor_in(&temp_dir).extract(&html, None).unwrap();

        assert_eq!(extraction.text, "<img src=\"./images/image_0001.png\" alt=\"dot\">");
        assert_eq!(extraction.images_extracted(), 1);

        let written = fs::read(temp_dir.path().join("images").join("image_0001.png")).unwrap();
        assert_eq!(written, PAYLOAD_ENGINE.decode(PNG_B64).unwrap());
        assert_eq!(&written[1..4], b"PNG");
    }

    #[test]
    fn test_sequencing_follows_document_order() {
        let temp_dir = TempDir::new().unwrap();
        let html = "<img src=\"data:image/gif;base64,R0lG\">\
                    <div style=\"background:url(data:image/jpeg;base64,/9j/)\"></div>\
                    <img src=\"data:image/webp;base64,UklG\">";

        let extraction = extractor_in(&temp_dir).extract(html, None).unwrap();

        let filenames: Vec<_> = extraction.extracted().map(|i| i.filename.as_str()).collect();
        assert_eq!(filenames, vec!["image_0001.gif", "image_0002.jpeg", "image_0003.webp"]);
        assert_eq!(
            extraction.text,
            "<img src=\"./images/image_0001.gif\">\
             <div style=\"background:url(./images/image_0002.jpeg)\"></div>\
             <img src=\"./images/image_0003.webp\">"
        );
        assert_eq!(fs::read(temp_dir.path().join("images/image_0002.jpeg")).unwrap(), vec![0xff, 0xd8, 0xff]);
    }

    #[test]
    fn test_unrecognized_subtype_left_untouched() {
        let temp_dir = TempDir::new().unwrap();
        let html = "<img src=\"data:image/bmp;base64,AAAA\">";

        let extraction = extractor_in(&temp_dir).extract(html, None).unwrap();

        assert_eq!(extraction.text, html);
        assert_eq!(fs::read_dir(temp_dir.path().join("images")).unwrap().count(), 0);
    }

    #[test]
    fn test_svg_extension_mapping() {
        let temp_dir = TempDir::new().unwrap();
        let html = "<img src=\"data:image/svg+xml;base64,PHN2Zy8+\">";

        let extraction = extractor_in(&temp_dir).extract(html, None).unwrap();

        assert_eq!(extraction.text, "<img src=\"./images/image_0001.svg\">");
        let svg = fs::read_to_string(temp_dir.path().join("images/image_0001.svg")).unwrap();
        assert_eq!(svg, "<svg/>");
    }

    #[test]
    fn test_corrupt_payload_kept_and_numbering_gap() {
        let temp_dir = TempDir::new().unwrap();
        let html = "<img src=\"data:image/png;base64,AAAAA\"><img src=\"data:image/png;base64,AAAA\">";

        let extraction = extractor_in(&temp_dir).extract(html, None).unwrap();

        assert_eq!(extraction.images_extracted(), 1);
        assert_eq!(extraction.images_failed(), 1);
        assert_eq!(
            extraction.text,
            "<img src=\"data:image/png;base64,AAAAA\"><img src=\"./images/image_0002.png\">"
        );
        assert!(!temp_dir.path().join("images/image_0001.png").exists());
        assert!(temp_dir.path().join("images/image_0002.png").exists());

        let failed = &extraction.outcomes[0];
        assert!(matches!(failed.result, Err(ImageError::Decode(_))));
        assert_eq!(extraction.progress.errors.len(), 1);
        assert!(extraction.progress.errors[0].contains("image 1"));
    }

    #[test]
    fn test_missing_padding_is_a_decode_failure() {
        let temp_dir = TempDir::new().unwrap();
        let html = "data:image/png;base64,AAA";

        let extraction = extractor_in(&temp_dir).extract(html, None).unwrap();

        assert_eq!(extraction.text, html);
        assert_eq!(extraction.images_failed(), 1);
    }

    #[test]
    fn test_padding_past_a_complete_group_is_a_decode_failure() {
        let temp_dir = TempDir::new().unwrap();
        let html = "data:image/png;base64,AAAA= | data:image/png;base64,YQ==YQ==";

        let extraction = extractor_in(&temp_dir).extract(html, None).unwrap();

        assert_eq!(extraction.text, html);
        assert_eq!(extraction.images_extracted(), 0);
        assert_eq!(extraction.images_failed(), 2);
        assert!(!temp_dir.path().join("images/image_0001.png").exists());
    }

    #[test]
    fn test_directory_created_and_rerun_overwrites() {
        let temp_dir = TempDir::new().unwrap();
        let image_dir = temp_dir.path().join("nested").join("images");
        assert!(!image_dir.exists());

        let extractor = ImageExtractor::new(&image_dir);
        extractor.extract("data:image/png;base64,AAAA", None).unwrap();
        assert!(image_dir.is_dir());
        assert_eq!(fs::read(image_dir.join("image_0001.png")).unwrap(), vec![0, 0, 0]);

        extractor.extract("data:image/png;base64,/w==", None).unwrap();
        assert_eq!(fs::read(image_dir.join("image_0001.png")).unwrap(), vec![0xff]);
    }

    #[test]
    fn test_write_failure_is_recoverable() {
        let temp_dir = TempDir::new().unwrap();
        let image_dir = temp_dir.path().join("images");
        fs::create_dir_all(image_dir.join("image_0001.png")).unwrap();

        let extractor = ImageExtractor::new(&image_dir);
        let html = "data:image/png;base64,AAAA data:image/png;base64,AAAA";
        let extraction = extractor.extract(html, None).unwrap();

        assert!(matches!(extraction.outcomes[0].result, Err(ImageError::Write { .. })));
        assert!(extraction.outcomes[1].is_extracted());
        assert!(extraction.text.starts_with("data:image/png;base64,AAAA "));
    }

    #[test]
    fn test_dry_run_writes_nothing() {
        let temp_dir = TempDir::new().unwrap();
        let image_dir = temp_dir.path().join("images");

        let extraction = ImageExtractor::new(&image_dir)
            .with_dry_run(true)
            .extract("data:image/gif;base64,R0lG", None)
            .unwrap();

        assert_eq!(extraction.images_extracted(), 1);
        assert!(!image_dir.exists());
    }

    #[test]
    fn test_callback_sees_running_totals() {
        let temp_dir = TempDir::new().unwrap();
        let calls = Cell::new(0);
        let callback = |outcome: &ImageOutcome, progress: &ExtractionProgress| {
            calls.set(calls.get() + 1);
            assert_eq!(progress.images_processed, outcome.sequence);
            assert_eq!(progress.total_images, 2);
        };

        extractor_in(&temp_dir)
            .extract("data:image/png;base64,AAAA data:image/png;base64,A", Some(&callback))
            .unwrap();

        assert_eq!(calls.get(), 2);
    }

    #[test]
    fn test_filename_formatting() {
        let extractor = ImageExtractor::default();
        assert_eq!(extractor.filename_for(1, ImageSubtype::Png), "image_0001.png");
        assert_eq!(extractor.filename_for(12345, ImageSubtype::Jpg), "image_12345.jpg");

        let custom = ImageExtractor::default()
            .with_filename_prefix("asset")
            .with_sequence_width(2);
        assert_eq!(custom.filename_for(7, ImageSubtype::SvgXml), "asset_07.svg");
    }

    #[test]
    fn test_reference_normalization() {
        let extractor = ImageExtractor::default().with_reference_dir("assets\\img\\");
        assert_eq!(extractor.reference_for("image_0001.png"), "./assets/img/image_0001.png");

        let current = ImageExtractor::default().with_reference_dir(".");
        assert_eq!(current.reference_for("image_0001.png"), "./image_0001.png");

        let absolute = ImageExtractor::default().with_reference_dir("/srv/site/images/");
        assert_eq!(absolute.reference_for("image_0001.png"), "/srv/site/images/image_0001.png");
    }
}
