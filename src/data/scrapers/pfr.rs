//! Pro Football Reference scraper
//!
//! Discovers a team's games from its season schedule page and downloads the
//! per-game box score pages that carry the play-by-play table. Game pages are
//! cached on disk as `{cache_dir}/{year}/{game_id}.html`.

use super::with_retry;
use crate::data::table::with_table;
use crate::{Config, GameId, PlayError, Result};
use regex::Regex;
use scraper::Selector;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// A game discovered on a schedule page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameLink {
    pub game_id: GameId,
    pub url: String,
}

/// Scraper for pro-football-reference.com
pub struct PfrScraper {
    client: reqwest::blocking::Client,
    base_url: String,
    team_code: String,
    schedule_table_id: String,
    request_delay: Duration,
    max_attempts: u32,
    /// Optional cache directory for raw game pages
    cache_dir: Option<PathBuf>,
    /// If true, only use cache (no network requests)
    offline_only: bool,
}

impl PfrScraper {
    pub fn new(config: &Config) -> Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .user_agent("playcall/0.1")
            .timeout(Duration::from_secs(30))
            .build()?;

        Ok(PfrScraper {
            client,
            base_url: config.scrape.base_url.trim_end_matches('/').to_string(),
            team_code: config.team.code.to_lowercase(),
            schedule_table_id: config.scrape.schedule_table_id.clone(),
            request_delay: Duration::from_millis(config.scrape.request_delay_ms),
            max_attempts: config.scrape.max_attempts,
            cache_dir: None,
            offline_only: false,
        })
    }

    /// Create scraper with a cache directory
    pub fn with_cache<P: AsRef<Path>>(mut self, cache_dir: P) -> Self {
        self.cache_dir = Some(cache_dir.as_ref().to_path_buf());
        self
    }

    /// Set offline-only mode (no network requests, cache must exist)
    pub fn offline_only(mut self, offline: bool) -> Self {
        self.offline_only = offline;
        self
    }

    pub fn schedule_url(&self, year: u16) -> String {
        format!("{}/teams/{}/{}.htm", self.base_url, self.team_code, year)
    }

    pub fn game_url(&self, game_id: &GameId) -> String {
        format!("{}/boxscores/{}.htm", self.base_url, game_id)
    }

    /// Games of one season
    ///
    /// Offline, the season's cache directory stands in for the schedule page.
    pub fn season_games(&self, year: u16) -> Result<Vec<GameLink>> {
        if self.offline_only {
            let Some(dir) = self.cache_dir.as_ref().map(|d| d.join(year.to_string())) else {
                return Err(PlayError::Scraper {
                    message: "Offline mode requires a cache directory".to_string(),
                });
            };
            if !dir.is_dir() {
                log::warn!("No cached games for {} in {}", year, dir.display());
                return Ok(Vec::new());
            }
            return Ok(cached_documents(&dir)?
                .into_iter()
                .map(|(game_id, _)| GameLink {
                    url: self.game_url(&game_id),
                    game_id,
                })
                .collect());
        }

        let url = self.schedule_url(year);
        log::info!("Fetching schedule for {}...", year);
        let html = self.fetch(&url)?;
        self.parse_schedule(&html)
    }

    /// Extract box score links from a schedule page
    pub fn parse_schedule(&self, html: &str) -> Result<Vec<GameLink>> {
        let cell_selector = Selector::parse("td[data-stat=\"boxscore_word\"]")
            .map_err(|e| PlayError::Parse(e.to_string()))?;
        let link_selector = Selector::parse("a").map_err(|e| PlayError::Parse(e.to_string()))?;
        let href_pattern =
            Regex::new(r"/boxscores/([0-9a-z]+)\.htm").map_err(|e| PlayError::Parse(e.to_string()))?;

        let hrefs = with_table(html, &self.schedule_table_id, |table| {
            table
                .select(&cell_selector)
                .filter_map(|cell| cell.select(&link_selector).next())
                .filter_map(|link| link.value().attr("href").map(str::to_string))
                .collect::<Vec<_>>()
        })?;

        let games = hrefs
            .iter()
            .filter_map(|href| {
                let caps = href_pattern.captures(href)?;
                let game_id = GameId::new(caps.get(1)?.as_str());
                Some(GameLink {
                    url: format!("{}{}", self.base_url, href),
                    game_id,
                })
            })
            .collect::<Vec<_>>();

        log::debug!("Schedule lists {} games", games.len());
        Ok(games)
    }

    /// Get a game's page, from cache when possible
    pub fn game_document(&self, year: u16, link: &GameLink) -> Result<String> {
        let cache_path = self.game_cache_path(year, &link.game_id);

        if let Some(path) = cache_path.as_ref().filter(|p| p.exists()) {
            log::debug!("Loading from cache: {}", path.display());
            return read_document(path);
        }

        let html = self.fetch(&link.url)?;

        if let Some(path) = cache_path {
            if let Err(e) = save_document(&path, &html) {
                log::warn!("Failed to cache {}: {}", link.url, e);
            }
        }

        Ok(html)
    }

    fn game_cache_path(&self, year: u16, game_id: &GameId) -> Option<PathBuf> {
        self.cache_dir
            .as_ref()
            .map(|dir| dir.join(year.to_string()).join(format!("{}.html", game_id)))
    }

    /// Fetch a page, then pause for the configured delay
    fn fetch(&self, url: &str) -> Result<String> {
        if self.offline_only {
            return Err(PlayError::Scraper {
                message: format!("No cached data for {} (offline mode)", url),
            });
        }

        log::debug!("Fetching {}", url);
        let result = with_retry(
            || {
                let response = self.client.get(url).send()?;
                if !response.status().is_success() {
                    return Err(PlayError::Scraper {
                        message: format!("HTTP {}: {}", response.status(), url),
                    });
                }
                Ok(response.text()?)
            },
            self.max_attempts,
        );

        std::thread::sleep(self.request_delay);
        result
    }
}

/// Read a raw document, replacing invalid UTF-8
pub fn read_document<P: AsRef<Path>>(path: P) -> Result<String> {
    let bytes = std::fs::read(path.as_ref())?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

fn save_document(path: &Path, html: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, html)?;
    log::debug!("Saved to cache: {}", path.display());
    Ok(())
}

/// Cached `.html` documents in a directory, keyed by file stem, sorted by id
///
/// Files whose stem does not start with a `YYYYMMDD` date are skipped.
pub fn cached_documents<P: AsRef<Path>>(dir: P) -> Result<Vec<(GameId, PathBuf)>> {
    let mut documents = Vec::new();

    for entry in std::fs::read_dir(dir.as_ref())? {
        let path = entry?.path();
        if path.extension().map(|e| e == "html").unwrap_or(false) {
            let Some(stem) = path.file_stem().and_then(|s| s.to_str()) else {
                continue;
            };
            let game_id = GameId::new(stem);
            if game_id.date().is_none() {
                log::debug!("Skipping {}: not a game id", path.display());
                continue;
            }
            documents.push((game_id, path.clone()));
        }
    }

    documents.sort();
    Ok(documents)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scraper() -> PfrScraper {
        PfrScraper::new(&Config::default()).unwrap()
    }

    #[test]
    fn test_urls() {
        let s = scraper();
        assert_eq!(
            s.schedule_url(2023),
            "https://www.pro-football-reference.com/teams/sfo/2023.htm"
        );
        assert_eq!(
            s.game_url(&GameId::new("202309100pit")),
            "https://www.pro-football-reference.com/boxscores/202309100pit.htm"
        );
    }

    #[test]
    fn test_parse_schedule() {
        let html = r#"<html><body><table id="games"><tbody>
            <tr><td data-stat="boxscore_word"><a href="/boxscores/202309100pit.htm">boxscore</a></td></tr>
            <tr><td data-stat="boxscore_word">preview</td></tr>
            <tr><td data-stat="opp"><a href="/teams/sea/2023.htm">Seahawks</a></td></tr>
            <tr><td data-stat="boxscore_word"><a href="/boxscores/202309170sfo.htm">boxscore</a></td></tr>
        </tbody></table></body></html>"#;

        let games = scraper().parse_schedule(html).unwrap();
        assert_eq!(games.len(), 2);
        assert_eq!(games[0].game_id, GameId::new("202309100pit"));
        assert_eq!(
            games[0].url,
            "https://www.pro-football-reference.com/boxscores/202309100pit.htm"
        );
        assert_eq!(games[1].game_id.home_code(), "sfo");
    }

    #[test]
    fn test_schedule_without_table() {
        let result = scraper().parse_schedule("<html><body></body></html>");
        assert!(matches!(result, Err(PlayError::TableNotFound { .. })));
    }

    #[test]
    fn test_offline_uses_cache() {
        let dir = tempfile::tempdir().unwrap();
        let season = dir.path().join("2023");
        std::fs::create_dir_all(&season).unwrap();
        std::fs::write(season.join("202309170sfo.html"), "<html></html>").unwrap();
        std::fs::write(season.join("202309100pit.html"), "<html>pit</html>").unwrap();
        std::fs::write(season.join("notes.txt"), "ignored").unwrap();
        std::fs::write(season.join("index.html"), "<html>listing</html>").unwrap();

        let s = scraper().with_cache(dir.path()).offline_only(true);
        let games = s.season_games(2023).unwrap();
        let ids: Vec<_> = games.iter().map(|g| g.game_id.as_str()).collect();
        assert_eq!(ids, vec!["202309100pit", "202309170sfo"]);

        let html = s.game_document(2023, &games[0]).unwrap();
        assert_eq!(html, "<html>pit</html>");

        assert!(s.season_games(2019).unwrap().is_empty());

        let missing = GameLink {
            game_id: GameId::new("202310010sfo"),
            url: s.game_url(&GameId::new("202310010sfo")),
        };
        assert!(matches!(
            s.game_document(2023, &missing),
            Err(PlayError::Scraper { .. })
        ));
    }

    #[test]
    fn test_cached_documents_skips_non_game_files() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("202401280sfo.html"), "").unwrap();
        std::fs::write(dir.path().join("schedule.html"), "").unwrap();
        std::fs::write(dir.path().join("20241399xsfo.html"), "").unwrap();
        std::fs::write(dir.path().join("202309100pit.htm"), "").unwrap();

        let documents = cached_documents(dir.path()).unwrap();
        let ids: Vec<_> = documents.iter().map(|(id, _)| id.as_str()).collect();
        assert_eq!(ids, vec!["202401280sfo"]);
    }
}
