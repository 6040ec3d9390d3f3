use crate::config::{CliOverrides, Config};
use crate::error::Result;
use clap::{Parser, ValueEnum};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "unembed")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Extract base64-embedded images from HTML files")]
#[command(
    long_about = "Unembed finds base64 data URIs (data:image/...;base64,...) in an HTML file, \
                  writes each image to its own file and rewrites the HTML to reference those \
                  files, so the page can be hosted with its images as separate assets."
)]
#[command(after_help = "EXAMPLES:\n  \
    unembed mypage.html\n  \
    unembed mypage.html mypage_optimized.html\n  \
    unembed mypage.html --image-dir assets/img --dry-run")]
#[command(arg_required_else_help = true)]
pub struct Cli {
    /// HTML file to process
    #[arg(required_unless_present = "generate_config")]
    pub input: Option<PathBuf>,

    /// Output HTML file (defaults to <input_stem>_optimized<ext> next to the input)
    pub output: Option<PathBuf>,

    /// Directory for extracted images, relative to the output HTML file
    #[arg(short = 'd', long)]
    pub image_dir: Option<String>,

    /// Suffix used to derive the default output filename
    #[arg(long)]
    pub suffix: Option<String>,

    /// Configuration file path
    #[arg(short, long, help = "Path to TOML configuration file")]
    pub config: Option<PathBuf>,

    /// Output format for results
    #[arg(long, value_enum, default_value_t = OutputFormat::Human)]
    pub output_format: OutputFormat,

    /// Verbose output level (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Quiet mode (suppress non-essential output)
    #[arg(short, long, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Dry run (show what would be extracted without writing anything)
    #[arg(long, help = "List embedded images without writing any files")]
    pub dry_run: bool,

    /// Generate sample configuration file
    #[arg(long, help = "Generate a sample configuration file")]
    pub generate_config: bool,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable colored output
    Human,
    /// JSON formatted output
    Json,
    /// Plain text output
    Plain,
}

impl Cli {
    pub fn load_config(&self) -> Result<Config> {
        let mut config = Config::load_with_defaults(self.config.as_ref())?;

        let overrides = self.create_cli_overrides();
        config.merge_with_cli_args(&overrides);
        config.validate()?;

        Ok(config)
    }

    pub fn create_cli_overrides(&self) -> CliOverrides {
        CliOverrides::new()
            .with_image_dir(self.image_dir.clone())
            .with_suffix(self.suffix.clone())
    }
}
