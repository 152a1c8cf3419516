use fifth_lexer::{logging, pipeline};
use std::env;
use std::path::Path;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize global logging system
    logging::init_global_logging()?;

    // Validate pipeline configuration
    pipeline::validate_pipeline()?;

    let args: Vec<String> = env::args().collect();
    if args.len() < 2 {
        eprintln!("Usage: {} <input.5th> [options]", args[0]);
        eprintln!("       {} --help", args[0]);
        std::process::exit(1);
    }

    if args[1] == "--help" {
        print_help(&args[0]);
        return Ok(());
    }

    let options = parse_options(&args[2..]);
    let input_path = Path::new(&args[1]);

    if !input_path.is_file() {
        eprintln!("Error: Input must be a Fifth source file (.5th)");
        eprintln!("  File: {}", input_path.display());
        std::process::exit(1);
    }

    process_single_file(&args[1], &options)?;

    Ok(())
}

struct Options {
    /// Print the full token listing on success
    show_tokens: bool,
    /// Suppress the summary line
    quiet: bool,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            show_tokens: true,
            quiet: false,
        }
    }
}

fn print_help(program_name: &str) {
    println!("Fifth Lexer v{}", env!("CARGO_PKG_VERSION"));
    println!("Tokenizer for the Fifth stack language");
    println!();
    println!("USAGE:");
    println!("    {} <input.5th> [options]", program_name);
    println!();
    println!("ARGUMENTS:");
    println!("    <input.5th>    Path to the Fifth source file to tokenize");
    println!();
    println!("OPTIONS:");
    println!("    --help         Show this help message");
    println!("    --no-tokens    Suppress the token listing");
    println!("    --quiet        Suppress the summary line");
    println!();
    println!("OUTPUT:");
    println!("    Success: one line per token (kind, value, span), plus totals");
    println!("    Failure: source context with a caret and the expected input classes");
    println!();
    println!("EXAMPLES:");
    println!("    {} example.5th              # Tokenize and list", program_name);
    println!("    {} example.5th --no-tokens  # Only the summary", program_name);
}

fn parse_options(args: &[String]) -> Options {
    let mut options = Options::default();

    for arg in args {
        match arg.as_str() {
            "--no-tokens" => options.show_tokens = false,
            "--quiet" => options.quiet = true,
            _ => eprintln!("Warning: Unknown option '{}'", arg),
        }
    }

    options
}

fn process_single_file(
    file_path: &str,
    options: &Options,
) -> Result<(), Box<dyn std::error::Error>> {
    match pipeline::process_file(file_path) {
        Ok(result) => {
            if options.show_tokens {
                print!("{}", pipeline::output::render_tokens(&result.scan));
            }
            if !options.quiet {
                println!(
                    "SUCCESS: {} tokens from {} ({:.2} ms)",
                    result.token_count(),
                    file_path,
                    result.processing_duration.as_secs_f64() * 1000.0
                );
            }
            logging::print_cargo_style_summary();
        }
        Err(error) => {
            eprintln!("FAILED: {}", error);
            print_diagnostic(file_path, &error);
            logging::print_cargo_style_summary();
            std::process::exit(1);
        }
    }

    Ok(())
}

fn print_diagnostic(file_path: &str, error: &pipeline::PipelineError) {
    if let pipeline::PipelineError::LexicalAnalysis(fifth_lexer::LexerError::Scan(scan_error)) =
        error
    {
        // Re-read the source for context; tolerate races with the filesystem
        if let Ok(source) = std::fs::read(file_path) {
            eprintln!();
            eprint!(
                "{}",
                pipeline::output::render_scan_error(scan_error, &source, file_path)
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_options() {
        let args = vec!["--no-tokens".to_string(), "--quiet".to_string()];
        let options = parse_options(&args);
        assert!(!options.show_tokens);
        assert!(options.quiet);
    }

    #[test]
    fn test_parse_options_defaults() {
        let options = parse_options(&[]);
        assert!(options.show_tokens);
        assert!(!options.quiet);
    }

    #[test]
    fn test_parse_options_unknown_ignored() {
        let args = vec!["--frobnicate".to_string()];
        let options = parse_options(&args);
        assert!(options.show_tokens);
    }
}
