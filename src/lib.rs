//! NFL play-by-play feature extraction
//!
//! Scrapes per-game play-by-play tables, works out which team has the ball,
//! labels each play as a run or a pass and derives a compact numeric feature
//! set for play-call prediction.

pub mod data;
pub mod features;
pub mod pipeline;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Identifier of a single game, e.g. `202309100sfo`
///
/// The first eight characters are the game date and the trailing three name
/// the home team.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GameId(pub String);

impl GameId {
    pub fn new(id: impl Into<String>) -> Self {
        GameId(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Home team code (last three characters, lowercased)
    pub fn home_code(&self) -> String {
        let chars: Vec<char> = self.0.chars().collect();
        let start = chars.len().saturating_sub(3);
        chars[start..].iter().collect::<String>().to_lowercase()
    }

    /// Game date encoded in the leading `YYYYMMDD`, if present
    pub fn date(&self) -> Option<NaiveDate> {
        let prefix = self.0.get(..8)?;
        NaiveDate::parse_from_str(prefix, "%Y%m%d").ok()
    }
}

impl fmt::Display for GameId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Categorical play label derived from the play description
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlayType {
    Run,
    Pass,
    Other,
}

impl fmt::Display for PlayType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlayType::Run => write!(f, "run"),
            PlayType::Pass => write!(f, "pass"),
            PlayType::Other => write!(f, "other"),
        }
    }
}

/// The team whose perspective the pipeline takes
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeamConfig {
    /// Lowercase code used in game identifiers (e.g. "sfo")
    pub code: String,
    /// Side tokens used in field-position text for this team's half
    pub field_aliases: Vec<String>,
}

impl TeamConfig {
    /// Whether a field-position side token names this team's half
    pub fn owns_side(&self, side: &str) -> bool {
        self.field_aliases
            .iter()
            .any(|alias| alias.eq_ignore_ascii_case(side))
    }

    /// Whether this team is the home side of the given game
    pub fn is_home(&self, game_id: &GameId) -> bool {
        game_id.home_code() == self.code.to_lowercase()
    }
}

impl Default for TeamConfig {
    fn default() -> Self {
        TeamConfig {
            code: "sfo".to_string(),
            field_aliases: vec!["SFO".to_string(), "SF".to_string()],
        }
    }
}

/// Application-wide errors
#[derive(Debug, Error)]
pub enum PlayError {
    #[error("Scraper failed: {message}")]
    Scraper { message: String },

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("No table with id \"{table_id}\" found")]
    TableNotFound { table_id: String },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(String),
}

pub type Result<T> = std::result::Result<T, PlayError>;

/// Application configuration loaded from config.toml
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub team: TeamConfig,
    #[serde(default)]
    pub scrape: ScrapeConfig,
    #[serde(default)]
    pub pipeline: PipelineConfig,
    #[serde(default)]
    pub data: DataConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScrapeConfig {
    pub base_url: String,
    pub first_season: u16,
    pub last_season: u16,
    pub request_delay_ms: u64,
    pub cache_dir: String,
    pub table_id: String,
    pub schedule_table_id: String,
    pub max_attempts: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Keep only plays where the configured team is on offense
    pub offense_only: bool,
    /// Allowed gap between the cell sort key and a candidate yardage
    pub csk_tolerance: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataConfig {
    pub plays_path: String,
    pub features_path: String,
}

impl Default for ScrapeConfig {
    fn default() -> Self {
        ScrapeConfig {
            base_url: "https://www.pro-football-reference.com".to_string(),
            first_season: 2017,
            last_season: 2025,
            request_delay_ms: 3000,
            cache_dir: "data/raw".to_string(),
            table_id: "pbp".to_string(),
            schedule_table_id: "games".to_string(),
            max_attempts: 3,
        }
    }
}

impl Default for PipelineConfig {
    fn default() -> Self {
        PipelineConfig {
            offense_only: false,
            csk_tolerance: 1,
        }
    }
}

impl Default for DataConfig {
    fn default() -> Self {
        DataConfig {
            plays_path: "data/processed/plays.csv".to_string(),
            features_path: "data/processed/features.csv".to_string(),
        }
    }
}

impl Config {
    pub fn load(path: &str) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            PlayError::Config(format!("Failed to read config file {}: {}", path, e))
        })?;
        toml::from_str(&content)
            .map_err(|e| PlayError::Config(format!("Failed to parse config: {}", e)))
    }

    pub fn save(&self, path: &str) -> Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| PlayError::Config(format!("Failed to serialize config: {}", e)))?;
        std::fs::write(path, content)?;
        Ok(())
    }
}
