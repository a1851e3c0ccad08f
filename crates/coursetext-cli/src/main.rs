use std::io::{Read, Write};
use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand};
use coursetext_common::config::{Config, FileStore, load_glossary};
use coursetext_common::telemetry::{self, TelemetryConfig};
use coursetext_common::{ParseOptions, Term};
use coursetext_renderer::{TextPipeline, find_term_matches, format_text, is_valid_text};
use miette::{IntoDiagnostic, Result};

#[derive(Parser)]
#[command(version, about = "Coursetext - render course material HTML with math, citations and glossary markers", long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Configuration file (.json or .toml)
    #[arg(long, global = true, env = "COURSETEXT_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the text pipeline over an HTML fragment
    Render {
        /// HTML input file, stdin when omitted or "-"
        input: Option<PathBuf>,

        /// Glossary terms (.json or .toml)
        #[arg(long)]
        glossary: Option<PathBuf>,

        /// Skip glossary annotation
        #[arg(long)]
        no_glossary: bool,

        /// Print the full result as JSON instead of the HTML
        #[arg(long)]
        json: bool,
    },
    /// Format quiz text with [latex] and [markdown] tags
    Format {
        /// Text input file, stdin when omitted or "-"
        input: Option<PathBuf>,

        #[command(flatten)]
        tags: TagArgs,

        /// Render math inline instead of as display blocks
        #[arg(long)]
        inline: bool,
    },
    /// Fail when enabled tags overlap or nest
    Check {
        /// Text input file, stdin when omitted or "-"
        input: Option<PathBuf>,

        #[command(flatten)]
        tags: TagArgs,
    },
    /// Print whole-word matches of a term as JSON
    Matches { text: String, term: String },
}

#[derive(Args)]
struct TagArgs {
    /// Recognise [latex] tags
    #[arg(long)]
    latex: bool,

    /// Recognise [markdown] tags
    #[arg(long)]
    markdown: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    init_miette();
    telemetry::init(TelemetryConfig::from_env("coursetext"));

    let cli = Cli::parse();
    let store = match &cli.config {
        Some(path) => FileStore::new(path),
        None => FileStore::default_location(),
    };
    let config = Config::load(&store).await?;
    tracing::debug!(path = %store.path().display(), "configuration loaded");

    let stdout = std::io::stdout();
    run(cli.command, &config, &mut stdout.lock())
}

fn run(command: Commands, config: &Config, out: &mut impl Write) -> Result<()> {
    match command {
        Commands::Render {
            input,
            glossary,
            no_glossary,
            json,
        } => {
            let content = read_input(input.as_deref())?;
            let terms: Vec<Term> = match glossary {
                Some(path) => load_glossary(path)?,
                None => Vec::new(),
            };
            let options = ParseOptions {
                glossary: config.glossary && !no_glossary,
            };
            let pipeline = TextPipeline::with_sanitizer_config(config.sanitizer.clone());
            let result = pipeline.parse_text(Some(&content), &terms, options);
            if json {
                let rendered = serde_json::to_string_pretty(&result).into_diagnostic()?;
                writeln!(out, "{rendered}").into_diagnostic()?;
            } else {
                writeln!(out, "{}", result.parsed_text).into_diagnostic()?;
            }
        }
        Commands::Format {
            input,
            tags,
            inline,
        } => {
            let text = read_input(input.as_deref())?;
            let formatted = format_text(tags.latex, tags.markdown, Some(&text), inline);
            writeln!(out, "{formatted}").into_diagnostic()?;
        }
        Commands::Check { input, tags } => {
            let text = read_input(input.as_deref())?;
            if !is_valid_text(tags.latex, tags.markdown, Some(&text)) {
                return Err(miette::miette!(
                    help = "close each [latex] or [markdown] tag before opening the next",
                    "enabled tags overlap or nest"
                ));
            }
            writeln!(out, "ok").into_diagnostic()?;
        }
        Commands::Matches { text, term } => {
            let matches = find_term_matches(&text, &term);
            let rendered = serde_json::to_string(&matches).into_diagnostic()?;
            writeln!(out, "{rendered}").into_diagnostic()?;
        }
    }
    Ok(())
}

fn read_input(path: Option<&Path>) -> Result<String> {
    match path {
        Some(path) if path != Path::new("-") => std::fs::read_to_string(path)
            .into_diagnostic()
            .map_err(|err| err.wrap_err(format!("reading {}", path.display()))),
        _ => {
            let mut buf = String::new();
            std::io::stdin()
                .read_to_string(&mut buf)
                .into_diagnostic()?;
            Ok(buf)
        }
    }
}

fn init_miette() {
    // A hook can only be installed once per process.
    let _ = miette::set_hook(Box::new(|_| {
        Box::new(
            miette::MietteHandlerOpts::new()
                .terminal_links(true)
                .with_cause_chain()
                .color(true)
                .context_lines(5)
                .tab_width(2)
                .break_words(true)
                .build(),
        )
    }));
    miette::set_panic_hook();
}
