use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use cdom_diagnostics::build_diagnostic_message;
use cdom_indexer::{Indexer, IndexerConfig, SourceInput};
use cdom_parser::Language;
use clap::{ArgAction, Parser, ValueEnum};
use tracing::Level;

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Lang {
    C,
    Cpp,
}

impl From<Lang> for Language {
    fn from(lang: Lang) -> Self {
        match lang {
            Lang::C => Self::C,
            Lang::Cpp => Self::Cpp,
        }
    }
}

/// C/C++ cross-file indexer
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Configuration file (defaults to ./cdom.toml when present)
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Dialect for every input, instead of guessing from the extension
    #[arg(long, value_enum)]
    lang: Option<Lang>,

    /// Worker threads
    #[arg(short, long)]
    jobs: Option<usize>,

    /// More logging (-v debug, -vv trace)
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,

    /// Source files to index
    #[arg(value_name = "FILES", required = true)]
    files: Vec<PathBuf>,
}

impl Args {
    fn load_config(&self) -> anyhow::Result<IndexerConfig> {
        let mut config = match &self.config {
            Some(path) => IndexerConfig::from_path(path)
                .with_context(|| format!("loading configuration from {}", path.display()))?,
            None => {
                let cwd = std::env::current_dir().context("reading the working directory")?;
                IndexerConfig::discover(&cwd).context("loading cdom.toml")?
            }
        };
        if let Some(lang) = self.lang {
            config.language = Some(lang.into());
        }
        if let Some(jobs) = self.jobs {
            config.jobs = jobs;
        }
        Ok(config)
    }
}

fn main() -> anyhow::Result<ExitCode> {
    let args = Args::parse();
    let level = match args.verbose {
        0 => Level::WARN,
        1 => Level::DEBUG,
        _ => Level::TRACE,
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();

    let config = args.load_config()?;
    let color = config.diagnostics.color;

    let inputs = args
        .files
        .iter()
        .map(|path| {
            let text = std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
            Ok(SourceInput::new(path.display().to_string(), text))
        })
        .collect::<anyhow::Result<Vec<_>>>()?;

    let indexer = Indexer::new(config)?;
    let indexed = indexer.index_files(&inputs)?;
    tracing::info!(
        files = indexed.outcomes.len(),
        failed = indexed.failures.len(),
        "indexed"
    );

    // Second pass so every file sees names from the whole batch
    let checked = indexer.check_files(&inputs)?;
    let mut failed = !checked.failures.is_empty();
    for failure in &checked.failures {
        eprintln!("{}: {}", failure.path, failure.error);
    }
    for outcome in &checked.outcomes {
        let Some(input) = inputs.iter().find(|input| input.path == outcome.path) else {
            continue;
        };
        for diagnostic in &outcome.diagnostics {
            println!("{}", build_diagnostic_message(&input.text, diagnostic, color));
        }
        failed |= outcome.has_errors();
    }

    Ok(if failed { ExitCode::FAILURE } else { ExitCode::SUCCESS })
}
