//! Per-game processing and cross-game accumulation
//!
//! A game document goes through extraction, normalization and
//! classification on its own; the surviving plays are appended to a single
//! collection that feeds feature derivation once every game is done.

use crate::data::table::extract_table;
use crate::features::{classify_plays, derive_features, normalize_rows, ClassifiedPlay, FeatureRow};
use crate::{Config, GameId, Result, TeamConfig};

/// Extraction, normalization and classification for one game document
#[derive(Debug, Clone)]
pub struct GamePipeline {
    team: TeamConfig,
    table_id: String,
    offense_only: bool,
    csk_tolerance: i32,
}

impl GamePipeline {
    pub fn new(config: &Config) -> Self {
        GamePipeline {
            team: config.team.clone(),
            table_id: config.scrape.table_id.clone(),
            offense_only: config.pipeline.offense_only,
            csk_tolerance: config.pipeline.csk_tolerance,
        }
    }

    pub fn team(&self) -> &TeamConfig {
        &self.team
    }

    /// Run and pass plays of one game, in table order
    pub fn process_game(&self, game_id: &GameId, html: &str) -> Result<Vec<ClassifiedPlay>> {
        let table = extract_table(html, &self.table_id)?;
        let mut plays = normalize_rows(&table.rows, &self.team, self.csk_tolerance);

        if self.offense_only {
            plays.retain(|play| play.is_offense_team);
        }

        let classified = classify_plays(plays, game_id);
        log::debug!(
            "{}: {} rows, {} run/pass plays",
            game_id,
            table.rows.len(),
            classified.len()
        );
        Ok(classified)
    }
}

/// Append-only collection of plays across games
#[derive(Debug, Default)]
pub struct PlayAccumulator {
    plays: Vec<ClassifiedPlay>,
    games_processed: usize,
    games_skipped: usize,
}

impl PlayAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a game's result; a failed game is logged and skipped
    ///
    /// Returns the number of plays added.
    pub fn add_game(&mut self, game_id: &GameId, result: Result<Vec<ClassifiedPlay>>) -> usize {
        match result {
            Ok(plays) => {
                let added = plays.len();
                self.plays.extend(plays);
                self.games_processed += 1;
                added
            }
            Err(e) => {
                log::warn!("Skipping {}: {}", game_id, e);
                self.games_skipped += 1;
                0
            }
        }
    }

    pub fn plays(&self) -> &[ClassifiedPlay] {
        &self.plays
    }

    pub fn len(&self) -> usize {
        self.plays.len()
    }

    pub fn is_empty(&self) -> bool {
        self.plays.is_empty()
    }

    pub fn games_processed(&self) -> usize {
        self.games_processed
    }

    pub fn games_skipped(&self) -> usize {
        self.games_skipped
    }

    /// Derive the feature table from everything accumulated so far
    pub fn features(&self, team: &TeamConfig) -> Vec<FeatureRow> {
        derive_features(&self.plays, team)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::PlayType;

    const GAME: &str = r#"<html><body>
<div id="all_pbp"><!--
<table id="pbp">
<thead><tr><th>Quarter</th><th>Time</th><th>Down</th><th>ToGo</th><th>Location</th><th>Away</th><th>Home</th><th>Detail</th></tr></thead>
<tbody>
<tr><th data-stat="quarter">2</th><td data-stat="qtr_time_remain">5:30</td><td data-stat="down">1</td><td data-stat="yds_to_go">10</td><td data-stat="location" csk="55">SFO 45</td><td data-stat="pbp_score_aw">3</td><td data-stat="pbp_score_hm">7</td><td data-stat="detail">pass complete</td></tr>
<tr><th data-stat="quarter">2</th><td data-stat="qtr_time_remain">5:00</td><td data-stat="down"></td><td data-stat="yds_to_go"></td><td data-stat="location" csk="65">SFO 35</td><td data-stat="pbp_score_aw">3</td><td data-stat="pbp_score_hm">7</td><td data-stat="detail">Moody kicks off</td></tr>
</tbody>
</table>
--></div>
</body></html>"#;

    const MIXED: &str = r#"<table id="pbp"><tbody>
<tr><th data-stat="quarter">1</th><td data-stat="qtr_time_remain">12:00</td><td data-stat="down">2</td><td data-stat="yds_to_go">6</td><td data-stat="location" csk="55">SFO 45</td><td data-stat="pbp_score_aw">0</td><td data-stat="pbp_score_hm">0</td><td data-stat="detail">McCaffrey left end for 4 yards</td></tr>
<tr><th data-stat="quarter">1</th><td data-stat="qtr_time_remain">9:00</td><td data-stat="down">3</td><td data-stat="yds_to_go">8</td><td data-stat="location" csk="45">SFO 45</td><td data-stat="pbp_score_aw">0</td><td data-stat="pbp_score_hm">0</td><td data-stat="detail">Pickett pass incomplete short right</td></tr>
<tr><th data-stat="quarter">1</th><td data-stat="qtr_time_remain">8:55</td><td data-stat="down">4</td><td data-stat="yds_to_go">8</td><td data-stat="location" csk="45">SFO 45</td><td data-stat="pbp_score_aw">0</td><td data-stat="pbp_score_hm">0</td><td data-stat="detail">Harris punts 40 yards</td></tr>
</tbody></table>"#;

    #[test]
    fn test_end_to_end_single_play() {
        let config = Config::default();
        let pipeline = GamePipeline::new(&config);
        let game = GameId::new("202309100sfo");

        let mut acc = PlayAccumulator::new();
        let added = acc.add_game(&game, pipeline.process_game(&game, GAME));
        assert_eq!(added, 1);
        assert_eq!(acc.plays()[0].play_type, PlayType::Pass);
        assert!(acc.plays()[0].is_offense_team);

        let features = acc.features(pipeline.team());
        assert_eq!(
            features,
            vec![FeatureRow {
                game_id: game,
                quarter: 2,
                down: 1,
                ydstogo: 10,
                yards_to_endzone: 55,
                score_differential: Some(4),
                game_seconds_remaining: Some(2130),
                target: 1,
            }]
        );
    }

    #[test]
    fn test_both_teams_pass_through_by_default() {
        let pipeline = GamePipeline::new(&Config::default());
        let game = GameId::new("202309100pit");

        let plays = pipeline.process_game(&game, MIXED).unwrap();
        assert_eq!(plays.len(), 2);
        assert!(plays[0].is_offense_team);
        assert!(!plays[1].is_offense_team);

        // Opponent plays keep the sort key as their end zone distance
        let features = derive_features(&plays, pipeline.team());
        assert_eq!(features[1].yards_to_endzone, 45);
        assert_eq!(features[1].target, 1);
    }

    #[test]
    fn test_offense_only_filters_opponent_plays() {
        let mut config = Config::default();
        config.pipeline.offense_only = true;
        let pipeline = GamePipeline::new(&config);
        let game = GameId::new("202309100pit");

        let plays = pipeline.process_game(&game, MIXED).unwrap();
        assert_eq!(plays.len(), 1);
        assert_eq!(plays[0].play_type, PlayType::Run);
        assert!(plays[0].is_offense_team);
    }

    #[test]
    fn test_missing_table_skips_only_that_game() {
        let pipeline = GamePipeline::new(&Config::default());
        let mut acc = PlayAccumulator::new();

        let broken = GameId::new("202310010sfo");
        acc.add_game(&broken, pipeline.process_game(&broken, "<html><body>No data</body></html>"));
        let good = GameId::new("202309100pit");
        acc.add_game(&good, pipeline.process_game(&good, MIXED));

        assert_eq!(acc.games_skipped(), 1);
        assert_eq!(acc.games_processed(), 1);
        assert_eq!(acc.len(), 2);
    }

    #[test]
    fn test_rerun_is_identical() {
        let pipeline = GamePipeline::new(&Config::default());
        let run = || {
            let mut acc = PlayAccumulator::new();
            for (id, html) in [("202309100sfo", GAME), ("202309170pit", MIXED)] {
                let game = GameId::new(id);
                acc.add_game(&game, pipeline.process_game(&game, html));
            }
            acc.features(pipeline.team())
        };

        assert_eq!(run(), run());
    }
}
