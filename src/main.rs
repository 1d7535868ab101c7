//! wfimports CLI Entry Point
//!
//! Expands the imports of a markdown workflow file and prints the result.
//!
//! # Usage
//!
//! ```bash
//! # Print the expanded markdown
//! wfimports .github/workflows/triage.md
//!
//! # Print the merged tools JSON instead
//! wfimports .github/workflows/triage.md --tools
//!
//! # Local imports only
//! wfimports .github/workflows/triage.md --no-remote
//!
//! # Custom layout
//! wfimports agentics/triage.md --workflows-dir agentics --root .
//! ```

use std::env;
use std::path::PathBuf;
use std::process::ExitCode;

use colored::Colorize;
use log::{error, info};

use workflow_imports::local::OsFileSystem;
use workflow_imports::remote::{ContentApi, DisabledContentApi, GhCliContentApi};
use workflow_imports::{load_config, Resolver, ResolverConfig, APP_NAME, VERSION};

/// Command-line configuration parsed from arguments.
#[derive(Debug, Default)]
struct Config {
    workflow_path: Option<String>,
    config_path: Option<String>,
    security_root: Option<PathBuf>,
    workflows_dir: Option<String>,
    print_tools: bool,
    no_remote: bool,
    verbose: bool,
}

/// Configures the logging system with appropriate formatting.
fn setup_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format(|buf, record| {
            use std::io::Write;

            match record.level() {
                log::Level::Warn | log::Level::Error => {
                    writeln!(buf, "[{}] {}", record.level(), record.args())
                }
                _ => writeln!(buf, "{}", record.args()),
            }
        })
        .init();
}

/// Prints the application banner with version information.
fn print_banner() {
    eprintln!();
    eprintln!("{} v{}", APP_NAME, VERSION);
    eprintln!("Markdown Workflow Import Resolver");
    eprintln!();
}

/// Prints usage information.
fn print_usage() {
    println!("Usage: wfimports [OPTIONS] <WORKFLOW_FILE>");
    println!();
    println!("Arguments:");
    println!("  <WORKFLOW_FILE>        Markdown workflow whose imports are expanded");
    println!();
    println!("Options:");
    println!("  --tools                Print the merged tools JSON instead of markdown");
    println!("  --root DIR             Folder local imports must stay inside");
    println!("  --workflows-dir DIR    Canonical workflows directory (default: .github/workflows)");
    println!("  --config FILE          Load resolver configuration from YAML");
    println!("  --no-remote            Fail on imports from other repositories");
    println!("  --verbose              Enable debug logging");
    println!("  --help                 Show this help message");
    println!("  --version              Show version information");
    println!();
    println!("Examples:");
    println!("  wfimports .github/workflows/triage.md");
    println!("  wfimports .github/workflows/triage.md --tools");
    println!("  wfimports agentics/triage.md --workflows-dir agentics --root .");
}

/// Reads the value following an option.
fn option_value<'a>(args: &'a [String], i: &mut usize, option: &str) -> Result<&'a str, String> {
    *i += 1;
    args.get(*i)
        .map(String::as_str)
        .ok_or_else(|| format!("{} requires an argument", option))
}

/// Parses command-line arguments into a Config struct.
fn parse_arguments(args: &[String]) -> Result<Config, String> {
    let mut config = Config::default();
    let mut i = 1; // Skip program name

    while i < args.len() {
        let arg = &args[i];

        match arg.as_str() {
            "--help" | "-h" => {
                print_usage();
                std::process::exit(0);
            }
            "--version" | "-V" => {
                println!("{} {}", APP_NAME, VERSION);
                std::process::exit(0);
            }
            "--tools" => config.print_tools = true,
            "--no-remote" => config.no_remote = true,
            "--verbose" | "-v" => config.verbose = true,
            "--root" => {
                config.security_root = Some(PathBuf::from(option_value(args, &mut i, arg)?));
            }
            "--workflows-dir" => {
                config.workflows_dir = Some(option_value(args, &mut i, arg)?.to_string());
            }
            "--config" => {
                config.config_path = Some(option_value(args, &mut i, arg)?.to_string());
            }
            arg if arg.starts_with('-') => {
                return Err(format!("Unknown option: {}", arg));
            }
            _ => {
                if config.workflow_path.is_some() {
                    return Err(format!("Unexpected argument: {}", arg));
                }
                config.workflow_path = Some(arg.clone());
            }
        }
        i += 1;
    }

    if config.workflow_path.is_none() {
        return Err("No workflow file given".to_string());
    }

    Ok(config)
}

/// Builds the resolver configuration: YAML file first, then CLI overrides.
fn resolver_config(config: &Config) -> Result<ResolverConfig, Box<dyn std::error::Error>> {
    let mut resolver_config = match &config.config_path {
        Some(path) => load_config(path)?,
        None => ResolverConfig::default(),
    };

    if let Some(dir) = &config.workflows_dir {
        resolver_config = resolver_config.with_workflows_dir(dir.as_str());
    }
    if let Some(root) = &config.security_root {
        resolver_config = resolver_config.with_security_root(root.clone());
    }

    Ok(resolver_config)
}

/// Main application entry point.
fn run() -> Result<(), Box<dyn std::error::Error>> {
    let args: Vec<String> = env::args().collect();

    // Parse arguments
    let config = parse_arguments(&args).map_err(|e| {
        eprintln!("Error: {}", e);
        eprintln!();
        print_usage();
        e
    })?;

    // Setup logging
    setup_logging(config.verbose);

    if config.verbose {
        print_banner();
    }

    let resolver_config = resolver_config(&config)?;
    let workflow_path = config.workflow_path.unwrap_or_default();

    let fs = OsFileSystem;
    let gh = GhCliContentApi::new();
    let disabled = DisabledContentApi;
    let api: &dyn ContentApi = if config.no_remote {
        info!("Remote imports disabled");
        &disabled
    } else {
        &gh
    };

    let resolver = Resolver::new(&fs, api, resolver_config);
    let resolution = resolver.resolve(&workflow_path).map_err(|e| {
        error!("Import resolution failed [{:?}]", e.kind());
        format!("Could not resolve imports of '{}': {}", workflow_path, e)
    })?;

    for notice in &resolution.notices {
        eprintln!("{} {}", "warning:".yellow().bold(), notice);
    }

    if config.print_tools {
        println!("{}", resolution.tools_json()?);
    } else {
        print!("{}", resolution.markdown);
    }

    info!(
        "Resolved {} imports of {}",
        resolution.imported_files.len(),
        workflow_path
    );

    Ok(())
}

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!();
            eprintln!("{} {}", "Error:".red().bold(), e);
            ExitCode::FAILURE
        }
    }
}
