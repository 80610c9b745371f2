use std::fs;
use std::io::{self, Read};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use tracing::debug;
use tracing_subscriber::EnvFilter;

use myc::backend;
use myc::lexer;
use myc::parser;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum BackendName {
    Interpreter,
    C,
    Go,
}

impl BackendName {
    fn as_str(self) -> &'static str {
        match self {
            Self::Interpreter => "interpreter",
            Self::C => "c",
            Self::Go => "go",
        }
    }
}

/// Runs a myc program, or translates it to C or Go.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Cli {
    /// Back-end that consumes the parsed program.
    #[arg(short, long, value_enum, default_value_t = BackendName::Interpreter)]
    backend: BackendName,

    /// Print the token stream and stop.
    #[arg(short, long)]
    tokens: bool,

    /// Source file; stdin when omitted.
    file: Option<PathBuf>,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_target(false)
        .with_writer(io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .init();

    let cli = Cli::parse();

    let source = match &cli.file {
        Some(path) => {
            fs::read_to_string(path).with_context(|| format!("Reading {}", path.display()))?
        }
        None => {
            let mut buffer = String::new();
            io::stdin()
                .read_to_string(&mut buffer)
                .context("Reading stdin")?;
            buffer
        }
    };

    let tokens = lexer::tokenize(&source).context("Lexing failed")?;
    if cli.tokens {
        for token in &tokens {
            println!("{token}");
        }
        return Ok(());
    }

    let project = parser::parse_tokens(tokens).context("Parsing failed")?;
    let backend = backend::backend(cli.backend.as_str())?;
    debug!(backend = backend.name(), "running");
    let output = backend
        .run(&project)
        .with_context(|| format!("{} backend failed", backend.name()))?;
    if !output.is_empty() {
        println!("{}", output.trim_end());
    }
    Ok(())
}
