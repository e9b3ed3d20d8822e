use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::info;

use topiclens::config::Config;
use topiclens::output;
use topiclens::pipeline::{summary_text, AnalysisOptions, Pipeline, Stage};

/// topiclens: topic modeling for batches of research papers.
///
/// Extracts text from a zip archive of PDFs, fits an LDA topic model and
/// reports top words, representative papers and trends over decades.
#[derive(Parser)]
#[command(name = "topiclens", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Analyze a zip archive of PDFs
    Analyze {
        /// Path to the archive
        archive: PathBuf,

        /// Number of topics to fit (default: 5)
        #[arg(long, default_value = "5")]
        topics: usize,

        /// Words shown per topic (default: 10)
        #[arg(long, default_value = "10")]
        words: usize,

        /// Representative papers per topic (default: 5)
        #[arg(long, default_value = "5")]
        top_papers: usize,

        /// Cut reference sections instead of lemmatizing
        #[arg(long)]
        skip_bibliography: bool,

        /// Extra stop words, comma-separated
        #[arg(long, default_value = "")]
        stopwords: String,

        /// Include average topic distribution per decade
        #[arg(long)]
        decades: bool,

        /// Print the report as JSON instead of a table
        #[arg(long)]
        json: bool,

        /// Also write topic summaries to this CSV file
        #[arg(long)]
        csv: Option<PathBuf>,
    },

    /// Describe an analysis configuration
    Summary {
        #[arg(long, default_value = "5")]
        topics: usize,

        #[arg(long, default_value = "10")]
        words: usize,
    },

    /// Run the HTTP API
    #[cfg(feature = "web")]
    Serve {
        /// Port to listen on (default: 5000)
        #[arg(long, default_value = "5000")]
        port: u16,

        /// Address to bind (default: 127.0.0.1)
        #[arg(long, default_value = "127.0.0.1")]
        bind: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (silently ignore if missing)
    let _ = dotenvy::dotenv();

    // Set up structured logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("topiclens=info")),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Analyze {
            archive,
            topics,
            words,
            top_papers,
            skip_bibliography,
            stopwords,
            decades,
            json,
            csv,
        } => {
            let config = Config::load()?;
            let pipeline = Pipeline::from_config(config)?;

            let options = AnalysisOptions {
                num_topics: topics,
                num_words: words,
                num_top_papers: top_papers,
                skip_bibliography,
                additional_stopwords: topiclens::pipeline::options::parse_stopwords(&stopwords),
                include_decade_analysis: decades,
            };

            info!(archive = %archive.display(), "Starting analysis");
            let spinner = stage_spinner(json);
            let observer = spinner.clone().map(|pb| {
                Arc::new(move |stage: Stage| {
                    if !stage.is_terminal() {
                        pb.set_message(stage.describe());
                    }
                }) as topiclens::pipeline::StageObserver
            });

            let result = pipeline.analyze_path(&archive, &options, observer).await;
            if let Some(pb) = spinner {
                pb.finish_and_clear();
            }
            let report = result.with_context(|| format!("Analysis of {} failed", archive.display()))?;

            if json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                output::terminal::display_report(&report);
            }

            if let Some(path) = csv {
                output::csv::write_topics_csv(&path, &report.topics)?;
                if !json {
                    println!("Topic summaries written to {}", path.display().to_string().bold());
                }
            }
        }

        Commands::Summary { topics, words } => {
            println!("{}", summary_text(topics, words));
        }

        #[cfg(feature = "web")]
        Commands::Serve { port, bind } => {
            let config = Config::load()?;
            let pipeline = Pipeline::from_config(config)?;
            topiclens::web::run_server(pipeline, port, &bind).await?;
        }
    }

    Ok(())
}

/// Spinner showing the current analysis stage; none in JSON mode so stdout
/// stays machine-readable.
fn stage_spinner(json: bool) -> Option<ProgressBar> {
    if json {
        return None;
    }
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("  {spinner} {msg}")
            .expect("valid template"),
    );
    pb.enable_steady_tick(Duration::from_millis(120));
    pb.set_message(Stage::Idle.describe());
    Some(pb)
}
