//! Play-call dataset CLI
//!
//! Scrapes play-by-play tables, labels run/pass plays and writes the model
//! feature table.

use clap::{Parser, Subcommand};
use playcall::{Config, Result};

#[derive(Parser)]
#[command(name = "playcall")]
#[command(about = "NFL play-by-play run/pass feature extraction", long_about = None)]
struct Cli {
    /// Config file path
    #[arg(short, long, default_value = "config.toml")]
    config: String,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Data collection commands
    Data {
        #[command(subcommand)]
        action: DataCommands,
    },
    /// Derive the feature table from a saved plays CSV
    Features {
        /// Plays CSV (defaults to data.plays_path)
        #[arg(long)]
        input: Option<String>,
        /// Feature CSV (defaults to data.features_path)
        #[arg(long)]
        output: Option<String>,
    },
    /// Initialize a new project with default config
    Init,
}

#[derive(Subcommand)]
enum DataCommands {
    /// Fetch every configured season, then write plays and features
    Sync {
        /// Only sync a single season
        #[arg(long)]
        season: Option<u16>,
        /// Cache directory for game pages (defaults to scrape.cache_dir)
        #[arg(long)]
        cache: Option<String>,
        /// Use only cached files (no network requests)
        #[arg(long)]
        offline: bool,
    },
    /// Parse cached game pages directly
    ParseCache {
        /// Directory containing <game_id>.html files
        dir: String,
    },
}

fn main() {
    let cli = Cli::parse();

    // Initialize logging
    let log_level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level))
        .format_timestamp(None)
        .init();

    // Load or create config
    let config = if std::path::Path::new(&cli.config).exists() {
        match Config::load(&cli.config) {
            Ok(c) => c,
            Err(e) => {
                eprintln!("Error loading config: {}", e);
                std::process::exit(1);
            }
        }
    } else {
        Config::default()
    };

    let result = match cli.command {
        Commands::Data { action } => match action {
            DataCommands::Sync {
                season,
                cache,
                offline,
            } => commands::data_sync(&config, season, cache, offline),
            DataCommands::ParseCache { dir } => commands::parse_cache(&config, &dir),
        },
        Commands::Features { input, output } => commands::features(&config, input, output),
        Commands::Init => commands::init(&cli.config),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

mod commands {
    use super::*;
    use playcall::data::export::{read_plays, write_features, write_plays};
    use playcall::data::scrapers::pfr::{cached_documents, read_document, PfrScraper};
    use playcall::features::derive_features;
    use playcall::pipeline::{GamePipeline, PlayAccumulator};

    pub fn init(config_path: &str) -> Result<()> {
        let config = Config::default();
        config.save(config_path)?;
        println!("Created default config at {}", config_path);

        std::fs::create_dir_all(&config.scrape.cache_dir)?;
        println!("Created {}/", config.scrape.cache_dir);

        println!("\nNext steps:");
        println!("  1. Edit {} to pick the team and seasons", config_path);
        println!("  2. Run 'playcall data sync' to fetch games and build the dataset");
        Ok(())
    }

    pub fn data_sync(
        config: &Config,
        season: Option<u16>,
        cache: Option<String>,
        offline: bool,
    ) -> Result<()> {
        let cache_dir = cache.unwrap_or_else(|| config.scrape.cache_dir.clone());
        println!("Using cache directory: {}", cache_dir);
        if offline {
            println!("Offline mode: using cached files only");
        }

        let scraper = PfrScraper::new(config)?
            .with_cache(&cache_dir)
            .offline_only(offline);
        let pipeline = GamePipeline::new(config);
        let mut plays = PlayAccumulator::new();

        let seasons = match season {
            Some(year) => year..=year,
            None => config.scrape.first_season..=config.scrape.last_season,
        };

        for year in seasons {
            log::info!("Processing season {}", year);
            let games = match scraper.season_games(year) {
                Ok(games) => games,
                Err(e) => {
                    log::warn!("Failed to list {} games: {}", year, e);
                    continue;
                }
            };
            log::info!("  Found {} games", games.len());

            for link in games {
                let result = scraper
                    .game_document(year, &link)
                    .and_then(|html| pipeline.process_game(&link.game_id, &html));
                plays.add_game(&link.game_id, result);
            }
        }

        save(config, &plays, pipeline.team())
    }

    pub fn parse_cache(config: &Config, dir: &str) -> Result<()> {
        println!("Parsing cached game pages from {}...", dir);
        let pipeline = GamePipeline::new(config);
        let mut plays = PlayAccumulator::new();

        for (game_id, path) in cached_documents(dir)? {
            let result = read_document(&path).and_then(|html| pipeline.process_game(&game_id, &html));
            plays.add_game(&game_id, result);
        }

        save(config, &plays, pipeline.team())
    }

    pub fn features(config: &Config, input: Option<String>, output: Option<String>) -> Result<()> {
        let input = input.unwrap_or_else(|| config.data.plays_path.clone());
        let output = output.unwrap_or_else(|| config.data.features_path.clone());

        let plays = read_plays(&input)?;
        println!("Loaded {} plays from {}", plays.len(), input);

        let rows = derive_features(&plays, &config.team);
        write_features(&output, &rows)?;
        println!("Saved {} feature rows to {}", rows.len(), output);
        Ok(())
    }

    fn save(config: &Config, plays: &PlayAccumulator, team: &playcall::TeamConfig) -> Result<()> {
        println!(
            "Processed {} games ({} skipped)",
            plays.games_processed(),
            plays.games_skipped()
        );

        if plays.is_empty() {
            println!("No plays found.");
            return Ok(());
        }

        write_plays(&config.data.plays_path, plays.plays())?;
        println!("Saved {} plays to {}", plays.len(), config.data.plays_path);

        let rows = plays.features(team);
        write_features(&config.data.features_path, &rows)?;
        println!(
            "Saved {} feature rows to {}",
            rows.len(),
            config.data.features_path
        );
        Ok(())
    }
}
