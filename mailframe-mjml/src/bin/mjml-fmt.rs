use mailframe_mjml::{beautify, FormatOptions, MjmlError};
use std::env;
use std::fs;
use std::process;

fn main() {
    let args: Vec<String> = env::args().collect();

    let mut write = false;
    let mut config: Option<String> = None;
    let mut files: Vec<String> = Vec::new();
    let mut idx = 1;
    while idx < args.len() {
        match args[idx].as_str() {
            "--write" => write = true,
            "--config" => {
                idx += 1;
                if idx >= args.len() {
                    eprintln!("--config needs a file argument");
                    process::exit(1);
                }
                config = Some(args[idx].clone());
            }
            other => files.push(other.to_string()),
        }
        idx += 1;
    }

    if files.is_empty() {
        eprintln!("Usage: mjml-fmt [--write] [--config <options.yaml>] <file.mjml>...");
        eprintln!();
        eprintln!("Checks MJML files for formatting; --write formats them in place.");
        eprintln!();
        eprintln!("Examples:");
        eprintln!("  mjml-fmt newsletter.mjml");
        eprintln!("  mjml-fmt --write *.mjml");
        process::exit(1);
    }

    let options = match config {
        Some(path) => match load_options(&path) {
            Ok(o) => o,
            Err(e) => {
                eprintln!("✗ {}", e);
                process::exit(1);
            }
        },
        None => FormatOptions::default(),
    };

    let mut exit_code = 0;
    for file_path in files {
        match run_file(&file_path, &options, write) {
            Ok(Outcome::Clean) => {
                println!("✓ {} is formatted", file_path);
            }
            Ok(Outcome::Rewritten) => {
                println!("✓ {} formatted", file_path);
            }
            Ok(Outcome::NeedsFormat) => {
                println!("✗ {} needs formatting", file_path);
                exit_code = 1;
            }
            Err(e) => {
                eprintln!("✗ {} has errors:", file_path);
                print_failure(&e);
                exit_code = 1;
            }
        }
    }

    process::exit(exit_code);
}

enum Outcome {
    Clean,
    Rewritten,
    NeedsFormat,
}

enum Failure {
    Io(std::io::Error),
    Format(MjmlError),
}

fn run_file(path: &str, options: &FormatOptions, write: bool) -> Result<Outcome, Failure> {
    let source = fs::read_to_string(path).map_err(Failure::Io)?;
    let formatted = beautify(&source, options).map_err(Failure::Format)?;
    if formatted == source {
        return Ok(Outcome::Clean);
    }
    if write {
        fs::write(path, formatted).map_err(Failure::Io)?;
        return Ok(Outcome::Rewritten);
    }
    Ok(Outcome::NeedsFormat)
}

fn load_options(path: &str) -> Result<FormatOptions, String> {
    let content =
        fs::read_to_string(path).map_err(|e| format!("Failed to read config {}: {}", path, e))?;
    serde_yaml::from_str(&content).map_err(|e| format!("Invalid config {}: {}", path, e))
}

fn print_failure(failure: &Failure) {
    match failure {
        Failure::Io(e) => {
            eprintln!("  {}", e);
        }
        Failure::Format(e) => match e {
            MjmlError::UnterminatedTag { offset } => {
                eprintln!("  Unterminated tag starting at byte {}", offset);
                eprintln!("    A '<' never reaches its '>'");
            }
            MjmlError::UnterminatedComment { offset } => {
                eprintln!("  Unterminated comment starting at byte {}", offset);
                eprintln!("    '<!--' without a matching '-->'");
            }
            MjmlError::UnterminatedAttribute { tag, offset } => {
                eprintln!("  Unterminated attribute value in <{}>", tag);
                eprintln!("    Quote opened at byte {} never closes", offset);
            }
            MjmlError::MaxNestingDepthExceeded { max_depth } => {
                eprintln!("  Maximum nesting depth ({}) exceeded", max_depth);
                eprintln!("    Elements are nested too deeply");
            }
            MjmlError::EmptyInput => {
                eprintln!("  Empty input");
            }
        },
    }
}
