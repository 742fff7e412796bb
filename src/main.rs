use clap::{builder::BoolishValueParser, ArgAction, ArgGroup, Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use lyric_scrub::config::Settings;
use lyric_scrub::error::ScrubError;
use lyric_scrub::normalizer::wrap_lines;
use lyric_scrub::pipeline::Redaction;
use lyric_scrub::scoring::validate_alpha;
use lyric_scrub::scrub::{self, CleanRequest, Query};

/// LyricScrub: learn which words make a song explicit, then clean lyrics.
///
/// Scores every word by smoothed log-odds of appearing in explicit vs.
/// appropriate songs. Cleaning masks high-scoring words or replaces them
/// with the most similar strongly appropriate word.
#[derive(Parser)]
#[command(name = "lyric_scrub")]
#[command(version = "0.1.0")]
#[command(about = "Build an explicit-word lexicon and clean lyrics with it", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Train a lexicon from labelled song tables
    ///
    /// Reads song metadata (song_id, song_name, explicit) and lyrics
    /// (song_id, lyrics), both tab-separated, and writes the scored lexicon
    /// as JSON.
    BuildLexicon {
        /// Song metadata table
        #[arg(long, value_name = "PATH")]
        song_info: PathBuf,

        /// Lyrics table
        #[arg(long, value_name = "PATH")]
        lyrics: PathBuf,

        /// Where to write the lexicon
        #[arg(long, value_name = "PATH")]
        output_path: PathBuf,

        /// Smoothing constant, must be positive [default: SCRUB_ALPHA or 20]
        #[arg(long, value_parser = parse_alpha)]
        alpha: Option<f64>,
    },

    /// Clean a song from the dataset or a text file
    ///
    /// Explicit words are replaced with `$substitute$` (or masked with
    /// asterisks when --replace false). New substitutes are saved back into
    /// the lexicon.
    #[command(group(ArgGroup::new("input").required(true).args(["song_title", "text"])))]
    Clean {
        /// Song metadata table, used with --song-title
        #[arg(long, value_name = "PATH", default_value = "data/songs.csv")]
        song_info: PathBuf,

        /// Lyrics table, used with --song-title
        #[arg(long, value_name = "PATH", default_value = "data/lyrics.csv")]
        lyrics: PathBuf,

        /// Lexicon built by `build-lexicon`
        #[arg(long, value_name = "PATH")]
        lexicon: PathBuf,

        /// Replace explicit words (true) or mask them (false)
        #[arg(long, default_value = "true", action = ArgAction::Set, value_parser = BoolishValueParser::new())]
        replace: bool,

        /// Title of a song in the dataset (case-insensitive)
        #[arg(long, value_name = "TITLE")]
        song_title: Option<String>,

        /// Plain-text file to clean (.txt)
        #[arg(long, value_name = "FILE_PATH")]
        text: Option<PathBuf>,

        /// Word-vectors file used instead of Ollama embeddings [default: SCRUB_VECTORS]
        #[arg(long, value_name = "PATH")]
        vectors: Option<PathBuf>,
    },
}

fn parse_alpha(raw: &str) -> Result<f64, String> {
    let alpha: f64 = raw.parse().map_err(|e| format!("{e}"))?;
    validate_alpha(alpha).map_err(|e| e.to_string())
}

#[tokio::main]
async fn main() {
    // Load .env file if present
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .init();

    let settings = Settings::from_env();
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::BuildLexicon {
            song_info,
            lyrics,
            output_path,
            alpha,
        } => {
            let alpha = alpha.unwrap_or(settings.alpha);
            scrub::build_lexicon(&song_info, &lyrics, &output_path, alpha).map(|_| ())
        }
        Commands::Clean {
            song_info,
            lyrics,
            lexicon,
            replace,
            song_title,
            text,
            vectors,
        } => {
            let query = match (song_title, text) {
                (Some(title), _) => Query::SongTitle(title),
                (None, Some(path)) => Query::TextFile(path),
                // clap enforces one of the two
                (None, None) => unreachable!("input group is required"),
            };
            let request = CleanRequest {
                song_info,
                lyrics,
                lexicon,
                mode: Redaction::from_replace_flag(replace),
                query,
                vectors,
            };
            match scrub::clean(&request, &settings).await {
                Ok(text) => {
                    println!("{}", wrap_lines(&text));
                    Ok(())
                }
                Err(e) => Err(e),
            }
        }
    };

    if let Err(e) = result {
        if let Some(scrub_err) = e.downcast_ref::<ScrubError>() {
            if scrub_err.is_user_error() {
                eprintln!("{}", scrub_err);
                std::process::exit(2);
            }
        }
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}
