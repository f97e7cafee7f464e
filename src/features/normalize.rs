//! Play normalization and offense disambiguation
//!
//! Maps extracted rows onto canonical play fields, drops rows that are not
//! usable plays, and works out whether the configured team had the ball.

use crate::data::table::{RawRow, LOCATION_KEY};
use crate::TeamConfig;

/// Source `data-stat` keys of the play-by-play table
mod keys {
    pub const QUARTER: &str = "quarter";
    pub const CLOCK: &str = "qtr_time_remain";
    pub const DOWN: &str = "down";
    pub const DISTANCE: &str = "yds_to_go";
    pub const DETAIL: &str = "detail";
    pub const AWAY_SCORE: &str = "pbp_score_aw";
    pub const HOME_SCORE: &str = "pbp_score_hm";
    pub const EXP_PTS_BEFORE: &str = "exp_pts_before";
    pub const EXP_PTS_AFTER: &str = "exp_pts_after";
}

/// A play row under canonical field names
///
/// Numeric columns keep their source text; coercion happens when features
/// are derived.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedPlay {
    pub quarter: Option<String>,
    /// Quarter clock as "M:SS"
    pub time_remaining: Option<String>,
    pub down: String,
    pub ydstogo: String,
    /// Field position as "SIDE NUM"
    pub yrdline: String,
    /// Offense's distance to the end zone, from the cell sort key
    pub location_csk: Option<String>,
    pub away_score: Option<String>,
    pub home_score: Option<String>,
    /// Expected points before the play
    pub epb: Option<String>,
    /// Expected points after the play
    pub epa: Option<String>,
    pub description: String,
    pub is_offense_team: bool,
}

/// Who had the ball on a play, from the configured team's perspective
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Possession {
    Offense,
    Defense,
    /// Neither candidate yardage matched the sort key
    Unknown,
}

impl Possession {
    pub fn is_offense(self) -> bool {
        self == Possession::Offense
    }
}

/// Decide possession from a field position and its sort key
///
/// At `SIDE line` the offense needs either `line` or `100 - line` yards,
/// depending on whose half `SIDE` is. Comparing both candidates with `csk`
/// tells the two apart. The first candidate checked wins when both match
/// (around midfield).
pub fn possession(
    side: &str,
    line: i32,
    csk: i32,
    tolerance: i32,
    team: &TeamConfig,
) -> Possession {
    let near = |yards: i32| (csk - yards).abs() <= tolerance;

    let (team_yards, opponent_yards) = if team.owns_side(side) {
        (100 - line, line)
    } else {
        (line, 100 - line)
    };

    if near(team_yards) {
        Possession::Offense
    } else if near(opponent_yards) {
        Possession::Defense
    } else {
        Possession::Unknown
    }
}

/// Parse field-position text and sort key, then decide possession
///
/// Anything unparseable resolves to [`Possession::Unknown`].
pub fn field_possession(
    yrdline: &str,
    csk: Option<&str>,
    tolerance: i32,
    team: &TeamConfig,
) -> Possession {
    let parts: Vec<&str> = yrdline.split_whitespace().collect();
    let (side, line) = match parts.as_slice() {
        [side, line] => (*side, line.parse::<i32>()),
        _ => return Possession::Unknown,
    };
    let (Ok(line), Some(Ok(csk))) = (line, csk.map(|c| c.trim().parse::<i32>())) else {
        return Possession::Unknown;
    };

    possession(side, line, csk, tolerance, team)
}

fn non_empty(row: &RawRow, key: &str) -> Option<String> {
    row.get(key)
        .filter(|text| !text.is_empty())
        .map(str::to_string)
}

/// Normalize one row, or drop it if it is not a usable play
pub fn normalize_row(row: &RawRow, team: &TeamConfig, tolerance: i32) -> Option<NormalizedPlay> {
    // Headers and kickoffs have no down
    let down = non_empty(row, keys::DOWN)?;
    let ydstogo = non_empty(row, keys::DISTANCE)?;
    let description = row.get(keys::DETAIL)?.to_string();
    // Plays at midfield carry no side and cannot be placed
    let yrdline = non_empty(row, LOCATION_KEY)?;

    let is_offense_team =
        field_possession(&yrdline, row.location_csk.as_deref(), tolerance, team).is_offense();

    Some(NormalizedPlay {
        quarter: row.get(keys::QUARTER).map(str::to_string),
        time_remaining: row.get(keys::CLOCK).map(str::to_string),
        down,
        ydstogo,
        yrdline,
        location_csk: row.location_csk.clone(),
        away_score: row.get(keys::AWAY_SCORE).map(str::to_string),
        home_score: row.get(keys::HOME_SCORE).map(str::to_string),
        epb: row.get(keys::EXP_PTS_BEFORE).map(str::to_string),
        epa: row.get(keys::EXP_PTS_AFTER).map(str::to_string),
        description,
        is_offense_team,
    })
}

/// Normalize a game's rows, keeping source order
pub fn normalize_rows(rows: &[RawRow], team: &TeamConfig, tolerance: i32) -> Vec<NormalizedPlay> {
    let plays: Vec<_> = rows
        .iter()
        .filter_map(|row| normalize_row(row, team, tolerance))
        .collect();

    log::debug!("Kept {} of {} rows as plays", plays.len(), rows.len());
    plays
}
