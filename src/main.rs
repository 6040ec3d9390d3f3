use clap::Parser;
use std::process;
use unembed::{Cli, OutputFormatter, OutputMode, Unembed, UnembedError, UserFriendlyError};

fn main() {
    let exit_code = run();
    process::exit(exit_code);
}

// Distinct from clap's usage-error code (2).
const EXIT_PARTIAL_FAILURE: i32 = 6;

fn run() -> i32 {
    let cli = Cli::parse();

    if cli.generate_config {
        return handle_generate_config(&cli);
    }

    let unembed = match Unembed::from_cli(&cli) {
        Ok(unembed) => unembed,
        Err(e) => {
            print_startup_error(&e);
            return 1;
        }
    };

    // clap enforces the input unless --generate-config was given
    let Some(input) = cli.input.as_deref() else {
        return 1;
    };

    if unembed.is_dry_run() {
        unembed
            .output_formatter()
            .info("DRY RUN MODE - No files will be written");
    }

    match unembed.process_file(input, cli.output.as_deref()) {
        Ok(report) => {
            let formatter = unembed.output_formatter();
            formatter.print_extraction_report(&report);
            if unembed.config().output.show_next_steps {
                formatter.print_next_steps(&report);
            }

            if report.has_failures() {
                EXIT_PARTIAL_FAILURE
            } else {
                0
            }
        }
        Err(e) => {
            unembed.handle_error(&e);
            exit_code_for(&e)
        }
    }
}

fn exit_code_for(error: &UnembedError) -> i32 {
    match error {
        UnembedError::InputNotFound { .. } => 3,
        UnembedError::Read { .. } => 4,
        UnembedError::Write { .. } => 5,
        _ => 1,
    }
}

fn handle_generate_config(cli: &Cli) -> i32 {
    let config_path = cli
        .config
        .as_ref()
        .map(|p| p.to_string_lossy().to_string())
        .unwrap_or_else(|| "unembed.toml".to_string());

    match Unembed::generate_sample_config(&config_path) {
        Ok(()) => {
            println!("Generated sample configuration file: {}", config_path);
            println!("\nTo use this configuration:");
            println!("  unembed <input.html> --config {}", config_path);
            println!("\nEdit the file to customize settings for your needs.");
            0
        }
        Err(e) => {
            eprintln!("Failed to generate configuration file: {}", e.user_message());
            if let Some(suggestion) = e.suggestion() {
                eprintln!("Suggestion: {}", suggestion);
            }
            1
        }
    }
}

fn print_startup_error(error: &UnembedError) {
    let formatter = OutputFormatter::new(OutputMode::Human, 0, false);
    formatter.print_user_friendly_error(error);
}
