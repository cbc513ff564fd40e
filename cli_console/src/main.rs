//! # Tab Shell
//!
//! Main entry point for the console host.

use cli_console::{run, Console, ConsoleConfig};
use std::env;
use std::io;
use std::path::PathBuf;
use std::process;
use tracing_subscriber::EnvFilter;

fn main() {
    let args: Vec<String> = env::args().collect();
    let program = args.first().map(String::as_str).unwrap_or("tabshell");

    let config = parse_args(&args).unwrap_or_else(|e| {
        eprintln!("Error: {}", e);
        print_usage(program);
        process::exit(1);
    });

    init_logging(config.verbose);

    let mut console = Console::start(&config).unwrap_or_else(|e| {
        eprintln!("Failed to start: {}", e);
        process::exit(1);
    });

    let stdin = io::stdin();
    if let Err(e) = run(&mut console, stdin.lock(), io::stdout()) {
        eprintln!("Console error: {}", e);
        process::exit(1);
    }
}

/// Logs go to stderr so stdout stays the console transcript
fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(io::stderr)
        .init();
}

fn parse_args(args: &[String]) -> Result<ConsoleConfig, String> {
    let mut config = ConsoleConfig::default();
    let mut i = 1;

    while i < args.len() {
        match args[i].as_str() {
            "--store" | "-s" => {
                i += 1;
                if i >= args.len() {
                    return Err("Missing value for --store".to_string());
                }
                config.store_path = Some(PathBuf::from(&args[i]));
            }
            "--config" | "-c" => {
                i += 1;
                if i >= args.len() {
                    return Err("Missing value for --config".to_string());
                }
                config.config_path = Some(PathBuf::from(&args[i]));
            }
            "--verbose" | "-v" => {
                config.verbose = true;
            }
            "--help" | "-h" => {
                print_usage(args.first().map(String::as_str).unwrap_or("tabshell"));
                process::exit(0);
            }
            other => {
                return Err(format!("Unknown option: {}", other));
            }
        }
        i += 1;
    }

    Ok(config)
}

fn print_usage(program: &str) {
    eprintln!("Usage: {} [OPTIONS]", program);
    eprintln!();
    eprintln!("Options:");
    eprintln!("  -s, --store <FILE>       Journal file holding the saved tabs");
    eprintln!("  -c, --config <FILE>      Settings overrides (JSON)");
    eprintln!("  -v, --verbose            Debug logging on stderr");
    eprintln!("  -h, --help               Show this help message");
    eprintln!();
    eprintln!("Examples:");
    eprintln!("  {} --store tabs.json", program);
    eprintln!("  echo new | {} --store tabs.json --verbose", program);
}
