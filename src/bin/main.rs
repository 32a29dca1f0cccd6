//! lkml CLI - Inspect LookML documents and run the language server
//!
//! Usage:
//!   lkml symbols <file.lkml> [--format json|text] [--enhance]
//!   lkml outline <file.lkml>
//!   lkml lsp
//!
//! Examples:
//!   lkml symbols views/orders.view.lkml
//!   lkml symbols models/shop.model.lkml --format text --enhance
//!   lkml outline models/shop.model.lkml

use clap::{Parser, Subcommand, ValueEnum};
use lkml::config::{Settings, SettingsError};
use lkml::dsl::{self, outline, Document, ParseResult};
use lkml::enhancer;
use lkml::lsp::{self, ProjectState};
use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "lkml")]
#[command(about = "lkml - Structural parser and language server for LookML")]
#[command(version)]
struct Cli {
    /// Config file (defaults to $LKML_CONFIG, ./lkml.toml, then the user config dir)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the symbols a document declares
    Symbols {
        /// Path to the .lkml file
        file: PathBuf,

        /// Output format
        #[arg(short, long, default_value = "json")]
        format: OutputFormat,

        /// Enrich the result with the configured semantic enhancer
        #[arg(long)]
        enhance: bool,
    },

    /// Print an indented outline of a document
    Outline {
        /// Path to the .lkml file
        file: PathBuf,
    },

    /// Run the language server over stdio
    Lsp,
}

#[derive(Clone, ValueEnum)]
enum OutputFormat {
    /// Pretty-printed JSON snapshot
    Json,
    /// One line per declaration
    Text,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let settings = match load_settings(cli.config.as_deref()) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("Error loading configuration: {}", e);
            return ExitCode::FAILURE;
        }
    };

    init_logging(&settings);

    match cli.command {
        Commands::Symbols {
            file,
            format,
            enhance,
        } => cmd_symbols(&settings, file, format, enhance).await,
        Commands::Outline { file } => cmd_outline(&settings, file),
        Commands::Lsp => cmd_lsp(&settings).await,
    }
}

fn load_settings(path: Option<&Path>) -> Result<Settings, SettingsError> {
    match path {
        Some(path) => Settings::from_file(path),
        None => Settings::load(),
    }
}

/// Log to stderr; stdout carries command output or the LSP stream.
fn init_logging(settings: &Settings) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&settings.log.level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn read_document(file: &Path) -> Option<Document> {
    match fs::read_to_string(file) {
        Ok(text) => Some(Document::new(file.to_string_lossy(), text)),
        Err(e) => {
            eprintln!("Error reading file '{}': {}", file.display(), e);
            None
        }
    }
}

async fn cmd_symbols(
    settings: &Settings,
    file: PathBuf,
    format: OutputFormat,
    enhance: bool,
) -> ExitCode {
    let Some(document) = read_document(&file) else {
        return ExitCode::FAILURE;
    };
    let options = settings.parser.to_parse_options();

    let result = if enhance {
        // The flag turns the enhancer on even when the config leaves it off.
        let mut enhancer_settings = settings.enhancer.clone();
        enhancer_settings.enabled = true;
        let semantic = match enhancer::from_settings(&enhancer_settings) {
            Ok(e) => e,
            Err(e) => {
                eprintln!("Error configuring enhancer: {}", e);
                return ExitCode::FAILURE;
            }
        };
        enhancer::parse_and_enhance(&document, &options, semantic.as_ref()).await
    } else {
        dsl::parse_with_options(&document, &options)
    };

    match format {
        OutputFormat::Json => print_json(&result),
        OutputFormat::Text => {
            print!("{}", outline::render_symbol_table(&result));
            ExitCode::SUCCESS
        }
    }
}

fn print_json(result: &ParseResult) -> ExitCode {
    match serde_json::to_string_pretty(result) {
        Ok(json) => {
            println!("{}", json);
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("Error serializing result: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn cmd_outline(settings: &Settings, file: PathBuf) -> ExitCode {
    let Some(document) = read_document(&file) else {
        return ExitCode::FAILURE;
    };

    let result = dsl::parse_with_options(&document, &settings.parser.to_parse_options());
    print!("{}", outline::render_outline(&result));
    ExitCode::SUCCESS
}

async fn cmd_lsp(settings: &Settings) -> ExitCode {
    let options = settings.parser.to_parse_options();
    let project = if settings.enhancer.enabled {
        match enhancer::from_settings(&settings.enhancer) {
            Ok(e) => ProjectState::with_enhancer(options, e),
            Err(e) => {
                eprintln!("Error configuring enhancer: {}", e);
                return ExitCode::FAILURE;
            }
        }
    } else {
        ProjectState::new(options)
    };

    tracing::info!("starting LookML language server");
    lsp::run_stdio(project).await;
    ExitCode::SUCCESS
}
