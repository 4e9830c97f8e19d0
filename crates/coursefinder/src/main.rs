use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use std::io;
use std::path::PathBuf;
use tracing::info;

use coursefinder::config::ConfigOverrides;
use coursefinder::display::{self, OutputFormat};
use coursefinder::embedding::{self, EmbeddingProvider};
use coursefinder::{interactive, logging, Backend, Config, Corpus, CourseSearch};

#[derive(Parser)]
#[command(name = "coursefinder")]
#[command(
  about = "Coursefinder - Smart Course Search\nDiscover the free courses that best match what you want to learn"
)]
#[command(version)]
struct Cli {
  #[command(flatten)]
  global: GlobalOptions,
  #[command(subcommand)]
  command: Command,
}

#[derive(Args)]
struct GlobalOptions {
  /// Course catalog file (comma separated, or tab separated with a .tsv extension)
  #[arg(short, long, global = true)]
  corpus: Option<PathBuf>,
  /// Configuration file (defaults to .coursefinder.json, coursefinder.json, then the user config dir)
  #[arg(long, global = true)]
  config: Option<PathBuf>,
  /// Embedding backend
  #[arg(long, value_enum, global = true)]
  backend: Option<Backend>,
  /// Enable verbose logging
  #[arg(short, long, global = true)]
  verbose: bool,
}

/// Result count option shared by the query commands
#[derive(Args)]
struct TopK {
  /// Number of courses to show
  #[arg(short = 'k', long)]
  top_k: Option<usize>,
}

#[derive(Subcommand)]
enum Command {
  /// Find the courses closest to a query
  Search {
    #[command(flatten)]
    top_k: TopK,
    /// Output format
    #[arg(short, long, value_enum, default_value = "pretty")]
    format: OutputFormat,
    /// Query words (joined with spaces)
    #[arg(required = true)]
    query: Vec<String>,
  },
  /// Prompt for queries until EOF or `quit`
  Interactive {
    #[command(flatten)]
    top_k: TopK,
  },
  /// List the loaded course catalog
  Courses,
}

fn resolve_config(options: &GlobalOptions, top_k: Option<usize>) -> Result<Config> {
  let overrides = ConfigOverrides { corpus_path: options.corpus.clone(), top_k, backend: options.backend };
  Config::load(options.config.as_deref(), &overrides).context("Failed to load configuration")
}

fn load_corpus(config: &Config) -> Result<Corpus> {
  Ok(Corpus::load(&config.corpus_path)?)
}

async fn open_search(config: &Config) -> Result<CourseSearch<Box<dyn EmbeddingProvider>>> {
  let corpus = load_corpus(config)?;
  let provider = embedding::build_provider(config).await?;
  Ok(CourseSearch::new(corpus, provider)?)
}

async fn search(config: &Config, query: &[String], format: OutputFormat) -> Result<()> {
  let query = query.join(" ");
  let mut search = open_search(config).await?;

  let results = search.search(&query, config.top_k)?;
  let rendered = display::render_results(&results, &query, format)?;
  println!("{}", rendered.trim_end());
  Ok(())
}

async fn interactive(config: &Config) -> Result<()> {
  let mut search = open_search(config).await?;
  info!(courses = search.corpus().len(), "ready for queries");

  let stdin = io::stdin();
  interactive::run(&mut search, config.top_k, stdin.lock(), &mut io::stdout(), &mut io::stderr())?;
  Ok(())
}

fn courses(config: &Config) -> Result<()> {
  let corpus = load_corpus(config)?;
  print!("{}", display::render_catalog(&corpus));
  Ok(())
}

async fn handle(cli: Cli) -> Result<()> {
  match cli.command {
    Command::Search { top_k, format, query } => {
      let config = resolve_config(&cli.global, top_k.top_k)?;
      search(&config, &query, format).await
    }
    Command::Interactive { top_k } => {
      let config = resolve_config(&cli.global, top_k.top_k)?;
      interactive(&config).await
    }
    Command::Courses => {
      let config = resolve_config(&cli.global, None)?;
      courses(&config)
    }
  }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
  let cli = Cli::parse();
  logging::init(cli.global.verbose);

  handle(cli).await
}
