use clap::{Parser, Subcommand};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;
use tracing_subscriber::EnvFilter;

use card_trio::config::{Config, StorageBackend};
use card_trio::scoring::{AnswerKey, Combination};
use card_trio::store::{FileStore, MemoryStore, ScoreStore};

const EXIT_SUCCESS: i32 = 0;
const EXIT_INVALID_INPUT: i32 = 1;
/// Storage and other I/O failures (including the listener)
const EXIT_STORAGE: i32 = 2;
const EXIT_CONFIG: i32 = 4;

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run the HTTP API (default if no subcommand)
    Serve,
    /// Score a JSON submission file without recording it
    Score {
        /// File holding a JSON array of combinations
        file: PathBuf,
        /// Nickname shown in the report
        #[arg(short, long, default_value = "Anonymous")]
        nickname: String,
    },
    /// Print the card catalog as tab-separated values
    Cards {
        /// Shuffle before printing
        #[arg(short, long)]
        shuffle: bool,
        /// Seed for a reproducible shuffle (implies --shuffle)
        #[arg(long)]
        seed: Option<u64>,
    },
    /// Print the ranked completed sessions
    Leaderboard {
        #[arg(short, long)]
        limit: Option<usize>,
        #[arg(short, long, default_value_t = 0)]
        offset: usize,
    },
    /// Print aggregate statistics
    Stats,
}

#[derive(Parser, Debug)]
#[command(name = "card-trio")]
#[command(about = "Scoring server for the card trio game", long_about = None)]
#[command(version)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to config file (defaults to ~/.config/card-trio/config.yaml)
    #[arg(short, long, global = true)]
    config: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn open_store(config: &Config) -> anyhow::Result<Arc<dyn ScoreStore>> {
    match config.storage.backend {
        StorageBackend::Memory => Ok(Arc::new(MemoryStore::new())),
        StorageBackend::File => {
            let path = config
                .storage
                .path
                .clone()
                .unwrap_or_else(card_trio::store::get_store_path);
            Ok(Arc::new(FileStore::open(path)?))
        }
    }
}

fn exit_on_errors(heading: &str, errors: Vec<String>) -> ! {
    eprintln!("{}:", heading);
    for error in errors {
        eprintln!("  - {}", error);
    }
    std::process::exit(EXIT_CONFIG);
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);
    let command = cli.command.unwrap_or(Commands::Serve);
    let start_time = Instant::now();
    let use_colors = card_trio::output::should_use_colors();

    // Load config
    let config_path = cli.config.map(PathBuf::from);
    let config = match card_trio::config::load_config(config_path) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Config error: {:#}", e);
            std::process::exit(EXIT_CONFIG);
        }
    };

    if let Err(errors) = card_trio::config::validate_config(&config) {
        exit_on_errors("Config errors", errors);
    }

    // The built-in key must describe a playable board before anything is scored
    if let Err(errors) = card_trio::scoring::validate_answer_key(AnswerKey::standard()) {
        exit_on_errors("Answer key errors", errors);
    }

    match command {
        Commands::Serve => {
            let store = match open_store(&config) {
                Ok(s) => s,
                Err(e) => {
                    eprintln!("Storage error: {:#}", e);
                    std::process::exit(EXIT_STORAGE);
                }
            };
            if let Err(e) = card_trio::server::serve(&config, store).await {
                eprintln!("Server error: {:#}", e);
                std::process::exit(EXIT_STORAGE);
            }
        }
        Commands::Score { file, nickname } => {
            let submission: Vec<Combination> = match std::fs::read_to_string(&file)
                .map_err(anyhow::Error::from)
                .and_then(|content| serde_json::from_str(&content).map_err(anyhow::Error::from))
            {
                Ok(s) => s,
                Err(e) => {
                    eprintln!("Failed to read submission {}: {}", file.display(), e);
                    std::process::exit(EXIT_INVALID_INPUT);
                }
            };

            match card_trio::scoring::score(&nickname, &submission, AnswerKey::standard()) {
                Ok(result) => {
                    println!(
                        "{}",
                        card_trio::output::format_score_result(&result, use_colors)
                    );
                }
                Err(e) => {
                    eprintln!("Error: {}", e);
                    std::process::exit(EXIT_INVALID_INPUT);
                }
            }
        }
        Commands::Cards { shuffle, seed } => {
            let mut cards = card_trio::cards::catalog();
            match seed {
                Some(seed) => {
                    card_trio::cards::shuffle_cards(&mut cards, &mut StdRng::seed_from_u64(seed))
                }
                None if shuffle => card_trio::cards::shuffle_cards(&mut cards, &mut rand::rng()),
                None => {}
            }
            println!("{}", card_trio::output::format_cards_tsv(&cards));
        }
        Commands::Leaderboard { limit, offset } => {
            let limit = limit
                .unwrap_or(config.leaderboard.default_limit)
                .min(config.leaderboard.max_limit);
            let page = match open_store(&config).and_then(|store| store.leaderboard(limit, offset))
            {
                Ok(p) => p,
                Err(e) => {
                    eprintln!("Storage error: {:#}", e);
                    std::process::exit(EXIT_STORAGE);
                }
            };
            println!(
                "{}",
                card_trio::output::format_leaderboard(&page, use_colors)
            );
        }
        Commands::Stats => {
            let stats = match open_store(&config).and_then(|store| store.stats()) {
                Ok(s) => s,
                Err(e) => {
                    eprintln!("Storage error: {:#}", e);
                    std::process::exit(EXIT_STORAGE);
                }
            };
            println!("{}", card_trio::output::format_stats(&stats, use_colors));
        }
    }

    tracing::debug!(elapsed = ?start_time.elapsed(), "done");
    std::process::exit(EXIT_SUCCESS);
}
