//! Wire types for the FPL and Football-Data.org APIs.
//!
//! Only the fields the backend uses are modelled; everything else in the
//! payloads is ignored by serde.

use serde::{Deserialize, Serialize};

use crate::scoring::EventType;
use crate::storage::NewPlayerEvent;
use crate::Gameweek;


/// `GET /bootstrap-static/`
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Bootstrap {
    pub teams: Vec<FplTeam>,
    pub elements: Vec<FplElement>,
    #[serde(default)]
    pub events: Vec<FplEvent>,
}

impl Bootstrap {
    /// The gameweek lineups should target: the one FPL flags as next, else
    /// the first unfinished one that has not started.
    pub fn next_open_gameweek(&self) -> Option<Gameweek> {
        self.events
            .iter()
            .find(|e| e.is_next)
            .or_else(|| self.events.iter().find(|e| !e.finished && !e.is_current))
            .and_then(|e| Gameweek::checked(e.id as i64).ok())
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct FplTeam {
    pub id: u32,
    pub name: String,
    pub short_name: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct FplElement {
    pub id: u32,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub second_name: String,
    pub web_name: String,
    pub team: u32,
    pub element_type: u8,
    /// Price in tenths of a million
    pub now_cost: u32,
    #[serde(default)]
    pub goals_scored: i64,
    #[serde(default)]
    pub assists: i64,
    #[serde(default)]
    pub total_points: i64,
}

impl FplElement {
    pub fn full_name(&self) -> String {
        let full = format!("{} {}", self.first_name.trim(), self.second_name.trim());
        let full = full.trim();
        if full.is_empty() {
            self.web_name.clone()
        } else {
            full.to_string()
        }
    }

    pub fn price(&self) -> f64 {
        self.now_cost as f64 / 10.0
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct FplEvent {
    pub id: u8,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub deadline_time: Option<String>,
    #[serde(default)]
    pub finished: bool,
    #[serde(default)]
    pub is_current: bool,
    #[serde(default)]
    pub is_next: bool,
}

/// One row of `GET /fixtures/?event={gw}`
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct FplFixture {
    pub id: i64,
    pub event: Option<u8>,
    pub team_h: u32,
    pub team_a: u32,
    pub team_h_score: Option<i64>,
    pub team_a_score: Option<i64>,
    #[serde(default)]
    pub finished: bool,
    #[serde(default)]
    pub minutes: i64,
    pub kickoff_time: Option<String>,
}

/// `GET /element-summary/{id}/`
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ElementSummary {
    #[serde(default)]
    pub history: Vec<ElementHistory>,
}

/// A player's line for one fixture
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct ElementHistory {
    pub element: u32,
    pub fixture: i64,
    pub round: u8,
    pub minutes: u32,
    pub goals_scored: u32,
    pub assists: u32,
    pub clean_sheets: u32,
    pub goals_conceded: u32,
    pub own_goals: u32,
    pub penalties_saved: u32,
    pub penalties_missed: u32,
    pub yellow_cards: u32,
    pub red_cards: u32,
    pub saves: u32,
    pub bonus: i32,
    pub total_points: i32,
}

impl ElementHistory {
    /// Expand the aggregate line into discrete events.
    ///
    /// The appearance event carries minutes played in its value; counted
    /// stats become one event per occurrence; goals conceded and bonus are
    /// single events carrying their count.
    pub fn to_events(&self) -> Vec<NewPlayerEvent> {
        let mut events = Vec::new();
        if self.minutes == 0 {
            return events;
        }

        let single = |kind: EventType, value: Option<i64>| NewPlayerEvent {
            event_type: kind.as_str().to_string(),
            minute: None,
            value,
        };

        events.push(single(EventType::Appearance, Some(self.minutes as i64)));
        if self.minutes >= crate::scoring::rules::FULL_APPEARANCE_MINUTES {
            events.push(single(EventType::Minutes60, None));
        }

        let counted = [
            (EventType::Goal, self.goals_scored),
            (EventType::Assist, self.assists),
            (EventType::CleanSheet, self.clean_sheets),
            (EventType::OwnGoal, self.own_goals),
            (EventType::PenaltySave, self.penalties_saved),
            (EventType::PenaltyMiss, self.penalties_missed),
            (EventType::YellowCard, self.yellow_cards),
            (EventType::RedCard, self.red_cards),
            (EventType::Save, self.saves),
        ];
        for (kind, count) in counted {
            for _ in 0..count {
                events.push(single(kind, None));
            }
        }

        if self.goals_conceded > 0 {
            events.push(single(
                EventType::GoalsConceded,
                Some(self.goals_conceded as i64),
            ));
        }
        if self.bonus != 0 {
            events.push(single(EventType::Bonus, Some(self.bonus as i64)));
        }

        events
    }
}

/// `GET /v4/competitions/PL/matches`
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct MatchesResponse {
    #[serde(default)]
    pub matches: Vec<FdMatch>,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct FdMatch {
    pub id: i64,
    pub matchday: Option<u8>,
    pub status: String,
    #[serde(rename = "utcDate")]
    pub utc_date: Option<String>,
    #[serde(rename = "homeTeam")]
    pub home_team: FdTeam,
    #[serde(rename = "awayTeam")]
    pub away_team: FdTeam,
    pub score: FdScore,
}

impl FdMatch {
    pub fn is_finished(&self) -> bool {
        self.status.eq_ignore_ascii_case("FINISHED")
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct FdTeam {
    pub id: Option<i64>,
    pub name: Option<String>,
    #[serde(rename = "shortName")]
    pub short_name: Option<String>,
    pub tla: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct FdScore {
    #[serde(rename = "fullTime")]
    pub full_time: FdScoreLine,
}

#[derive(Debug, Clone, PartialEq, Default, Deserialize, Serialize)]
pub struct FdScoreLine {
    pub home: Option<i64>,
    pub away: Option<i64>,
}
