//! Run/pass labelling from play descriptions

use super::normalize::NormalizedPlay;
use crate::{GameId, PlayType};
use serde::{Deserialize, Serialize};

const PASS_KEYWORDS: [&str; 3] = ["pass", "sacked", "scramble"];
const RUN_KEYWORDS: [&str; 3] = ["left", "right", "middle"];

/// A run or pass play tagged with its game
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassifiedPlay {
    pub quarter: Option<String>,
    pub time_remaining: Option<String>,
    pub down: String,
    pub ydstogo: String,
    pub yrdline: String,
    pub location_csk: Option<String>,
    pub away_score: Option<String>,
    pub home_score: Option<String>,
    pub epb: Option<String>,
    pub epa: Option<String>,
    pub is_offense_team: bool,
    pub play_type: PlayType,
    pub game_id: GameId,
}

impl ClassifiedPlay {
    fn new(play: NormalizedPlay, play_type: PlayType, game_id: &GameId) -> Self {
        ClassifiedPlay {
            quarter: play.quarter,
            time_remaining: play.time_remaining,
            down: play.down,
            ydstogo: play.ydstogo,
            yrdline: play.yrdline,
            location_csk: play.location_csk,
            away_score: play.away_score,
            home_score: play.home_score,
            epb: play.epb,
            epa: play.epa,
            is_offense_team: play.is_offense_team,
            play_type,
            game_id: game_id.clone(),
        }
    }
}

/// Label a play description (case-insensitive, pass keywords first)
pub fn classify(description: &str) -> PlayType {
    let text = description.to_lowercase();

    if PASS_KEYWORDS.iter().any(|k| text.contains(k)) {
        PlayType::Pass
    } else if RUN_KEYWORDS.iter().any(|k| text.contains(k)) {
        PlayType::Run
    } else {
        PlayType::Other
    }
}

/// Classify a game's plays, dropping anything that is neither run nor pass
pub fn classify_plays(plays: Vec<NormalizedPlay>, game_id: &GameId) -> Vec<ClassifiedPlay> {
    plays
        .into_iter()
        .filter_map(|play| match classify(&play.description) {
            PlayType::Other => None,
            play_type => Some(ClassifiedPlay::new(play, play_type, game_id)),
        })
        .collect()
}
