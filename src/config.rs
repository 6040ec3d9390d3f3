use crate::error::{Result, UnembedError};
use crate::extractor::document::DEFAULT_OUTPUT_SUFFIX;
use crate::extractor::image_extractor::{
    DEFAULT_FILENAME_PREFIX, DEFAULT_IMAGE_DIR, DEFAULT_SEQUENCE_WIDTH,
};
use serde::{Deserialize, Serialize};
use std::path::{Component, Path};

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    pub extraction: ExtractionConfig,
    pub output: OutputConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ExtractionConfig {
    /// Image directory, relative to the output HTML file.
    pub image_dir: String,
    pub filename_prefix: String,
    pub sequence_width: usize,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct OutputConfig {
    pub suffix: String,
    pub show_next_steps: bool,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            image_dir: DEFAULT_IMAGE_DIR.to_string(),
            filename_prefix: DEFAULT_FILENAME_PREFIX.to_string(),
            sequence_width: DEFAULT_SEQUENCE_WIDTH,
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            suffix: DEFAULT_OUTPUT_SUFFIX.to_string(),
            show_next_steps: true,
        }
    }
}

impl Config {
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(UnembedError::Config {
                message: format!("Configuration file not found: {}", path.display()),
            });
        }

        let content = std::fs::read_to_string(path).map_err(|e| UnembedError::Config {
            message: format!("Failed to read config file {}: {}", path.display(), e),
        })?;

        let config: Config = toml::from_str(&content).map_err(|e| UnembedError::Config {
            message: format!("Failed to parse config file {}: {}", path.display(), e),
        })?;

        Ok(config)
    }

    pub fn load_with_defaults<P: AsRef<Path>>(config_path: Option<P>) -> Result<Self> {
        match config_path {
            Some(path) => Self::load_from_file(path),
            None => {
                let default_paths = ["unembed.toml", ".unembed.toml"];

                for default_path in &default_paths {
                    if Path::new(default_path).exists() {
                        return Self::load_from_file(default_path);
                    }
                }

                Ok(Self::default())
            }
        }
    }

    pub fn merge_with_cli_args(&mut self, cli_args: &CliOverrides) {
        if let Some(ref image_dir) = cli_args.image_dir {
            self.extraction.image_dir = image_dir.clone();
        }

        if let Some(ref suffix) = cli_args.suffix {
            self.output.suffix = suffix.clone();
        }
    }

    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let content = toml::to_string_pretty(self).map_err(|e| UnembedError::Config {
            message: format!("Failed to serialize config: {}", e),
        })?;

        std::fs::write(path, content).map_err(|e| UnembedError::Config {
            message: format!("Failed to write config file {}: {}", path.display(), e),
        })?;

        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        validate_image_dir(&self.extraction.image_dir)?;

        if self.extraction.filename_prefix.is_empty() {
            return Err(UnembedError::Config {
                message: "Image filename prefix must not be empty".to_string(),
            });
        }

        if has_path_separator(&self.extraction.filename_prefix) {
            return Err(UnembedError::Config {
                message: format!(
                    "Image filename prefix cannot contain path separators: {}",
                    self.extraction.filename_prefix
                ),
            });
        }

        if !(1..=10).contains(&self.extraction.sequence_width) {
            return Err(UnembedError::Config {
                message: format!(
                    "Sequence width must be between 1 and 10, got {}",
                    self.extraction.sequence_width
                ),
            });
        }

        if has_path_separator(&self.output.suffix) {
            return Err(UnembedError::Config {
                message: format!(
                    "Output suffix cannot contain path separators: {}",
                    self.output.suffix
                ),
            });
        }

        Ok(())
    }

    pub fn create_sample_config() -> String {
        let sample_config = Self::default();
        toml::to_string_pretty(&sample_config).unwrap_or_else(|_| String::new())
    }
}

// References are written as `./<image_dir>/...`, so the directory must stay
// relative and below the output file.
fn validate_image_dir(image_dir: &str) -> Result<()> {
    let path = Path::new(image_dir);

    if image_dir.trim().is_empty() {
        return Err(UnembedError::InvalidPath {
            path: "image directory must not be empty".to_string(),
        });
    }

    if path.is_absolute() || path.has_root() {
        return Err(UnembedError::InvalidPath {
            path: format!("image directory must be relative: {}", image_dir),
        });
    }

    if path.components().any(|c| matches!(c, Component::ParentDir)) {
        return Err(UnembedError::InvalidPath {
            path: format!("Directory traversal not allowed: {}", image_dir),
        });
    }

    Ok(())
}

fn has_path_separator(s: &str) -> bool {
    s.contains('/') || s.contains('\\')
}

#[derive(Debug, Default)]
pub struct CliOverrides {
    pub image_dir: Option<String>,
    pub suffix: Option<String>,
}

impl CliOverrides {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_image_dir(mut self, image_dir: Option<String>) -> Self {
        self.image_dir = image_dir;
        self
    }

    pub fn with_suffix(mut self, suffix: Option<String>) -> Self {
        self.suffix = suffix;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::NamedTempFile;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.extraction.image_dir, "images");
        assert_eq!(config.extraction.sequence_width, 4);
        assert_eq!(config.output.suffix, "_optimized");
    }

    #[test]
    fn test_config_validation() {
        let mut config = Config::default();
        assert!(config.validate().is_ok());

        config.extraction.sequence_width = 0;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.extraction.filename_prefix.clear();
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.output.suffix = "/tmp/x".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_image_dir_validation() {
        assert!(validate_image_dir("images").is_ok());
        assert!(validate_image_dir("assets/img").is_ok());
        assert!(validate_image_dir("./images").is_ok());

        assert!(validate_image_dir("").is_err());
        assert!(validate_image_dir("/var/www/images").is_err());
        assert!(validate_image_dir("../images").is_err());
    }

    #[test]
    fn test_config_file_operations() {
        let mut config = Config::default();
        config.extraction.image_dir = "assets".to_string();
        let temp_file = NamedTempFile::new().unwrap();

        config.save_to_file(temp_file.path()).unwrap();

        let loaded_config = Config::load_from_file(temp_file.path()).unwrap();
        assert_eq!(loaded_config.extraction.image_dir, "assets");
        assert_eq!(loaded_config.output.suffix, config.output.suffix);
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let config: Config = toml::from_str("[output]\nsuffix = \"_lite\"\n").unwrap();
        assert_eq!(config.output.suffix, "_lite");
        assert_eq!(config.extraction.image_dir, "images");
        assert!(config.output.show_next_steps);
    }

    #[test]
    fn test_missing_config_file() {
        let result = Config::load_from_file("definitely-not-here.toml");
        assert!(matches!(result, Err(UnembedError::Config { .. })));
    }

    #[test]
    fn test_cli_overrides() {
        let mut config = Config::default();

        let overrides = CliOverrides::new()
            .with_image_dir(Some("img".to_string()))
            .with_suffix(None);

        config.merge_with_cli_args(&overrides);

        assert_eq!(config.extraction.image_dir, "img");
        assert_eq!(config.output.suffix, "_optimized");
    }

    #[test]
    fn test_sample_config_generation() {
        let sample = Config::create_sample_config();
        assert!(sample.contains("[extraction]"));
        assert!(sample.contains("[output]"));
        assert!(sample.contains("image_dir = \"images\""));
    }
}
