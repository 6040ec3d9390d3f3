use crate::error::{Result, UnembedError};
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};

pub const DEFAULT_OUTPUT_SUFFIX: &str = "_optimized";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum TextEncoding {
    Utf8,
    Latin1,
}

impl std::fmt::Display for TextEncoding {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TextEncoding::Utf8 => write!(f, "UTF-8"),
            TextEncoding::Latin1 => write!(f, "Latin-1"),
        }
    }
}

/// An HTML document loaded fully into memory.
#[derive(Debug, Clone)]
pub struct Document {
    pub path: PathBuf,
    pub text: String,
    pub encoding: TextEncoding,
    /// Size of the file on disk, before decoding.
    pub size: u64,
}

impl Document {
    pub fn read<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(UnembedError::InputNotFound {
                path: path.to_path_buf(),
            });
        }

        let bytes = fs::read(path).map_err(|source| UnembedError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let size = bytes.len() as u64;
        let (text, encoding) = decode_text(bytes);

        Ok(Self {
            path: path.to_path_buf(),
            text,
            encoding,
            size,
        })
    }
}

/// Decodes as UTF-8, falling back to Latin-1 when the bytes are not valid UTF-8.
///
/// Latin-1 maps each byte to the code point of the same value, so the
/// fallback always succeeds.
pub fn decode_text(bytes: Vec<u8>) -> (String, TextEncoding) {
    match String::from_utf8(bytes) {
        Ok(text) => (text, TextEncoding::Utf8),
        Err(e) => {
            let text = e.into_bytes().into_iter().map(char::from).collect();
            (text, TextEncoding::Latin1)
        }
    }
}

/// Writes `text` as UTF-8 and returns the number of bytes written.
pub fn write_document<P: AsRef<Path>>(path: P, text: &str) -> Result<u64> {
    let path = path.as_ref();
    fs::write(path, text).map_err(|source| UnembedError::Write {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(text.len() as u64)
}

/// `<dir>/<stem><suffix><.ext>` next to the input, e.g. `page.html` -> `page_optimized.html`.
pub fn default_output_path<P: AsRef<Path>>(input: P, suffix: &str) -> PathBuf {
    let input = input.as_ref();
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_default();
    let extension = input
        .extension()
        .map(|e| format!(".{}", e.to_string_lossy()))
        .unwrap_or_default();

    input.with_file_name(format!("{}{}{}", stem, suffix, extension))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_read_utf8_document() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("page.html");
        fs::write(&path, "<p>caf\u{e9}</p>").unwrap();

        let document = Document::read(&path).unwrap();
        assert_eq!(document.encoding, TextEncoding::Utf8);
        assert_eq!(document.text, "<p>caf\u{e9}</p>");
        assert_eq!(document.size, 12);
    }

    #[test]
    fn test_latin1_fallback() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("legacy.html");
        fs::write(&path, b"<p>caf\xe9</p>").unwrap();

        let document = Document::read(&path).unwrap();
        assert_eq!(document.encoding, TextEncoding::Latin1);
        assert_eq!(document.text, "<p>caf\u{e9}</p>");
        assert_eq!(document.size, 11);
    }

    #[test]
    fn test_missing_input() {
        let temp_dir = TempDir::new().unwrap();
        let result = Document::read(temp_dir.path().join("nope.html"));
        assert!(matches!(result, Err(UnembedError::InputNotFound { .. })));
    }

    #[test]
    fn test_reading_a_directory_fails() {
        let temp_dir = TempDir::new().unwrap();
        let result = Document::read(temp_dir.path());
        assert!(matches!(result, Err(UnembedError::Read { .. })));
    }

    #[test]
    fn test_default_output_path() {
        assert_eq!(
            default_output_path("site/page.html", DEFAULT_OUTPUT_SUFFIX),
            PathBuf::from("site/page_optimized.html")
        );
        assert_eq!(
            default_output_path("report.v2.htm", "_small"),
            PathBuf::from("report.v2_small.htm")
        );
        assert_eq!(
            default_output_path("index", DEFAULT_OUTPUT_SUFFIX),
            PathBuf::from("index_optimized")
        );
    }

    #[test]
    fn test_write_document() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("out.html");

        let written = write_document(&path, "<p>\u{e9}</p>").unwrap();
        assert_eq!(written, 9);
        assert_eq!(fs::read_to_string(&path).unwrap(), "<p>\u{e9}</p>");
    }
}
