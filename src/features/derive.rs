//! Model feature derivation
//!
//! Turns the accumulated classified plays of every game into the numeric
//! feature table used for run/pass prediction.

use super::classify::ClassifiedPlay;
use crate::{GameId, PlayType, TeamConfig};
use serde::{Deserialize, Serialize};

/// Length of a regulation quarter in seconds
pub const QUARTER_SECONDS: i64 = 900;
pub const REGULATION_QUARTERS: i64 = 4;

/// One modelling row
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeatureRow {
    pub game_id: GameId,
    pub quarter: i64,
    pub down: i64,
    pub ydstogo: i64,
    pub yards_to_endzone: i64,
    /// Configured team's score minus the opponent's
    pub score_differential: Option<i64>,
    pub game_seconds_remaining: Option<i64>,
    /// 0 for a run, 1 for a pass
    pub target: u8,
}

/// Coerce cell text to an integer
///
/// Accepts integral decimals such as "2.0"; anything else is missing.
pub fn coerce_number(text: Option<&str>) -> Option<i64> {
    let text = text?.trim();
    if let Ok(value) = text.parse::<i64>() {
        return Some(value);
    }
    let value = text.parse::<f64>().ok()?;
    (value.is_finite() && value.fract() == 0.0).then_some(value as i64)
}

/// Seconds left in the quarter from "M:SS" clock text
pub fn clock_seconds(text: &str) -> Option<i64> {
    let parts: Vec<&str> = text.split(':').collect();
    let [minutes, seconds] = parts.as_slice() else {
        return None;
    };
    let minutes: i64 = minutes.trim().parse().ok()?;
    let seconds: i64 = seconds.trim().parse().ok()?;
    Some(minutes * 60 + seconds)
}

/// Seconds left in the game
///
/// Overtime periods only count their own clock.
pub fn game_seconds_remaining(quarter: i64, seconds_in_quarter: i64) -> i64 {
    if quarter > REGULATION_QUARTERS {
        seconds_in_quarter
    } else {
        (REGULATION_QUARTERS - quarter) * QUARTER_SECONDS + seconds_in_quarter
    }
}

/// Score margin from the configured team's side of the game
pub fn score_differential(
    game_id: &GameId,
    home_score: Option<i64>,
    away_score: Option<i64>,
    team: &TeamConfig,
) -> Option<i64> {
    let (home, away) = (home_score?, away_score?);
    if team.is_home(game_id) {
        Some(home - away)
    } else {
        Some(away - home)
    }
}

pub fn target(play_type: PlayType) -> Option<u8> {
    match play_type {
        PlayType::Run => Some(0),
        PlayType::Pass => Some(1),
        PlayType::Other => None,
    }
}

/// Derive features for one play
///
/// Returns `None` when quarter, down, distance or the sort key is missing.
/// The sort key is used as the distance to the end zone as-is.
pub fn derive_row(play: &ClassifiedPlay, team: &TeamConfig) -> Option<FeatureRow> {
    let quarter = coerce_number(play.quarter.as_deref())?;
    let down = coerce_number(Some(play.down.as_str()))?;
    let ydstogo = coerce_number(Some(play.ydstogo.as_str()))?;
    let yards_to_endzone = coerce_number(play.location_csk.as_deref())?;
    let target = target(play.play_type)?;

    let home_score = coerce_number(play.home_score.as_deref());
    let away_score = coerce_number(play.away_score.as_deref());

    let seconds_left = play
        .time_remaining
        .as_deref()
        .and_then(clock_seconds)
        .map(|seconds| game_seconds_remaining(quarter, seconds));

    Some(FeatureRow {
        game_id: play.game_id.clone(),
        quarter,
        down,
        ydstogo,
        yards_to_endzone,
        score_differential: score_differential(&play.game_id, home_score, away_score, team),
        game_seconds_remaining: seconds_left,
        target,
    })
}

/// Derive the feature table, preserving play order
pub fn derive_features(plays: &[ClassifiedPlay], team: &TeamConfig) -> Vec<FeatureRow> {
    let rows: Vec<_> = plays
        .iter()
        .filter_map(|play| derive_row(play, team))
        .collect();

    let dropped = plays.len() - rows.len();
    if dropped > 0 {
        log::debug!("Dropped {} plays missing critical fields", dropped);
    }
    rows
}
