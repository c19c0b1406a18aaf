//! Knot-Graph CLI - headless access to the movie graph.
//!
//! Builds the shared-people graph of a movie catalog, runs the live layout
//! engine for a while and dumps where nodes settled, finds movies by title,
//! or ranks recommendations from a description-embedding index.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::Result;
use clap::{Parser, Subcommand};
use knot_graph_layout::Bounds;
use knot_graph_semantic::DEFAULT_SEARCH_LIMIT;
use tracing::Level;
use tracing_subscriber::fmt::format::FmtSpan;

mod commands;
mod config;

use commands::layout::LayoutRun;
use commands::recommend::RecommendLayout;
use config::Config;

/// Knot-Graph CLI - movie graphs, layouts and recommendations.
#[derive(Parser, Debug)]
#[command(
    name = "knot",
    author,
    version,
    about = "Knot-Graph: lay out and explore a movie graph",
    long_about = None
)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Path to a JSON config file.
    #[arg(long, global = true, env = "KNOT_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

/// Available CLI commands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Print the edges and per-movie connection counts as JSON.
    Edges {
        /// JSON array of movies.
        movies: PathBuf,

        /// Output file path.
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Run the layout engine live, then write normalized positions as JSON.
    Layout {
        /// JSON array of movies.
        movies: PathBuf,

        /// How long the loops run before positions are taken.
        #[arg(long, default_value_t = 2000)]
        duration_ms: u64,

        /// Viewport width.
        #[arg(long, default_value_t = 100.0)]
        width: f64,

        /// Viewport height.
        #[arg(long, default_value_t = 100.0)]
        height: f64,

        /// Zoom factor.
        #[arg(long, default_value_t = 1.0)]
        zoom: f64,

        /// Place movies on a static circle instead of simulating.
        #[arg(long)]
        circular: bool,

        /// Output file path.
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Rank movies related to a prompt movie.
    Recommend {
        /// JSON array of movies.
        movies: PathBuf,

        /// JSON vector index of movie descriptions.
        #[arg(long)]
        index: PathBuf,

        /// Id of the prompt movie.
        #[arg(long)]
        prompt: String,

        /// Neighbor expansion rounds.
        #[arg(long, default_value_t = 2)]
        steps: usize,

        /// Maximum recommendations to print.
        #[arg(long)]
        limit: Option<usize>,

        /// Also lay out the prompt, watched movies and recommendations, and
        /// write their positions here.
        #[arg(long)]
        layout: Option<PathBuf>,

        /// Comma-separated ids of movies already watched.
        #[arg(long, value_delimiter = ',', requires = "layout")]
        watched: Vec<String>,

        /// How long the layout runs before positions are taken.
        #[arg(long, default_value_t = 2000)]
        duration_ms: u64,
    },

    /// Find movies by (approximate) title.
    Search {
        /// JSON array of movies.
        movies: PathBuf,

        /// Title text to look for.
        text: String,

        /// Maximum matches to print.
        #[arg(long, default_value_t = DEFAULT_SEARCH_LIMIT)]
        limit: usize,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Setup tracing based on verbosity
    let level = if cli.quiet {
        Level::ERROR
    } else if cli.verbose {
        Level::DEBUG
    } else {
        Level::WARN
    };

    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_span_events(FmtSpan::CLOSE)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let config = Config::load(cli.config.as_deref())?;

    match cli.command {
        Commands::Edges { movies, output } => {
            commands::edges::execute(&movies, output.as_deref())?;
        }

        Commands::Layout {
            movies,
            duration_ms,
            width,
            height,
            zoom,
            circular,
            output,
        } => {
            let run = LayoutRun {
                duration: Duration::from_millis(duration_ms),
                bounds: Bounds::new(width, height),
                zoom,
                circular,
            };
            commands::layout::execute(&config, &movies, run, output.as_deref()).await?;
        }

        Commands::Recommend {
            movies,
            index,
            prompt,
            steps,
            limit,
            layout,
            watched,
            duration_ms,
        } => {
            let layout = layout.map(|output| RecommendLayout {
                output,
                watched,
                duration: Duration::from_millis(duration_ms),
            });
            commands::recommend::execute(&config, &movies, &index, &prompt, steps, limit, layout)
                .await?;
        }

        Commands::Search {
            movies,
            text,
            limit,
        } => {
            commands::search::execute(&movies, &text, limit)?;
        }
    }

    Ok(())
}
