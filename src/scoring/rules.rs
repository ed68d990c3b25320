//! Position-dependent scoring table.
//!
//! Everything here is a pure function of its inputs. Unknown event tags and
//! unknown positions score 0 rather than failing, so a provider adding a new
//! event type never breaks settlement.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::{FantasyError, Position};

#[cfg(test)]
mod tests;

/// Saves needed for one point.
pub const SAVES_PER_POINT: u32 = 3;

/// Goals conceded per point deducted (GK/DEF only).
pub const GOALS_CONCEDED_PER_DEDUCTION: u32 = 2;

/// Minutes needed for the full appearance award.
pub const FULL_APPEARANCE_MINUTES: u32 = 60;

/// Match event tags recorded in `player_events.event_type`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventType {
    Goal,
    Assist,
    CleanSheet,
    YellowCard,
    RedCard,
    PenaltyMiss,
    OwnGoal,
    PenaltySave,
    Save,
    Bonus,
    Appearance,
    #[serde(rename = "minutes_60")]
    Minutes60,
    GoalsConceded,
}

impl EventType {
    pub const ALL: [EventType; 13] = [
        EventType::Goal,
        EventType::Assist,
        EventType::CleanSheet,
        EventType::YellowCard,
        EventType::RedCard,
        EventType::PenaltyMiss,
        EventType::OwnGoal,
        EventType::PenaltySave,
        EventType::Save,
        EventType::Bonus,
        EventType::Appearance,
        EventType::Minutes60,
        EventType::GoalsConceded,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            EventType::Goal => "goal",
            EventType::Assist => "assist",
            EventType::CleanSheet => "clean_sheet",
            EventType::YellowCard => "yellow_card",
            EventType::RedCard => "red_card",
            EventType::PenaltyMiss => "penalty_miss",
            EventType::OwnGoal => "own_goal",
            EventType::PenaltySave => "penalty_save",
            EventType::Save => "save",
            EventType::Bonus => "bonus",
            EventType::Appearance => "appearance",
            EventType::Minutes60 => "minutes_60",
            EventType::GoalsConceded => "goals_conceded",
        }
    }

    /// Events derived from minutes played rather than counted individually.
    pub fn is_appearance(&self) -> bool {
        matches!(self, EventType::Appearance | EventType::Minutes60)
    }
}

impl fmt::Display for EventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EventType {
    type Err = FantasyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        EventType::ALL
            .iter()
            .copied()
            .find(|e| e.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| FantasyError::validation(format!("unknown event type: {}", s)))
    }
}

/// One scored event for a player: its tag and the optional integer payload
/// (goals conceded count, bonus points, minutes for appearances).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoringEvent {
    pub kind: EventType,
    pub value: Option<i32>,
}

impl ScoringEvent {
    pub fn new(kind: EventType) -> Self {
        Self { kind, value: None }
    }

    pub fn with_value(kind: EventType, value: i32) -> Self {
        Self {
            kind,
            value: Some(value),
        }
    }
}

/// Points for one event, given the player's position.
///
/// `save` returns a third of a point per tick; callers that want whole
/// points go through [`aggregate_points`], which floors save ticks.
pub fn point_delta(event: EventType, position: Position, payload: Option<i32>) -> f64 {
    match event {
        EventType::Goal => match position {
            Position::GK | Position::DEF => 6.0,
            Position::MID => 5.0,
            Position::FWD => 4.0,
        },
        EventType::Assist => 3.0,
        EventType::CleanSheet => match position {
            Position::GK | Position::DEF => 4.0,
            Position::MID => 1.0,
            Position::FWD => 0.0,
        },
        EventType::YellowCard => -1.0,
        EventType::RedCard => -3.0,
        EventType::PenaltyMiss => -2.0,
        EventType::OwnGoal => -2.0,
        EventType::PenaltySave if position == Position::GK => 5.0,
        EventType::PenaltySave => 0.0,
        EventType::Save if position == Position::GK => 1.0 / SAVES_PER_POINT as f64,
        EventType::Save => 0.0,
        EventType::Bonus => payload.unwrap_or(0) as f64,
        EventType::Appearance => 1.0,
        EventType::Minutes60 => 1.0,
        EventType::GoalsConceded => {
            if position.is_defensive() {
                -(goals_conceded_deduction(payload.unwrap_or(0)) as f64)
            } else {
                0.0
            }
        }
    }
}

/// Tag-level entry point used on raw rows: unknown tags or positions score 0.
pub fn point_delta_for_tag(event_type: &str, position: &str, payload: Option<i32>) -> f64 {
    match (event_type.parse::<EventType>(), position.parse::<Position>()) {
        (Ok(event), Ok(position)) => point_delta(event, position, payload),
        _ => 0.0,
    }
}

/// Appearance award: 1 for any minutes, 2 from 60 minutes.
pub fn appearance_points(minutes: u32) -> i32 {
    match minutes {
        0 => 0,
        m if m < FULL_APPEARANCE_MINUTES => 1,
        _ => 2,
    }
}

fn goals_conceded_deduction(conceded: i32) -> i32 {
    conceded.max(0) / GOALS_CONCEDED_PER_DEDUCTION as i32
}

/// Total points for one player's gameweek, before any captaincy multiplier.
///
/// Appearance points come from `minutes` only; discrete `appearance` and
/// `minutes_60` events are ignored here so they cannot be counted twice.
pub fn aggregate_points(position: Position, minutes: u32, events: &[ScoringEvent]) -> i32 {
    let mut total = appearance_points(minutes);
    let mut save_ticks: u32 = 0;

    for event in events {
        match event.kind {
            kind if kind.is_appearance() => continue,
            EventType::Save => {
                if position == Position::GK {
                    save_ticks += 1;
                }
            }
            kind => total += point_delta(kind, position, event.value) as i32,
        }
    }

    total + (save_ticks / SAVES_PER_POINT) as i32
}

/// Per-event contribution shown in score breakdowns.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PointsLine {
    pub event_type: String,
    pub count: u32,
    pub points: i32,
}

/// Explain an aggregate: one line per event type plus the appearance line.
/// The lines sum to [`aggregate_points`] for the same inputs.
pub fn breakdown(position: Position, minutes: u32, events: &[ScoringEvent]) -> Vec<PointsLine> {
    let mut lines = Vec::new();

    let appearance = appearance_points(minutes);
    if appearance != 0 {
        lines.push(PointsLine {
            event_type: EventType::Appearance.as_str().to_string(),
            count: 1,
            points: appearance,
        });
    }

    for kind in EventType::ALL.iter().copied().filter(|k| !k.is_appearance()) {
        let matching: Vec<&ScoringEvent> = events.iter().filter(|e| e.kind == kind).collect();
        if matching.is_empty() {
            continue;
        }

        let points = if kind == EventType::Save {
            if position == Position::GK {
                (matching.len() as u32 / SAVES_PER_POINT) as i32
            } else {
                0
            }
        } else {
            matching
                .iter()
                .map(|e| point_delta(kind, position, e.value) as i32)
                .sum()
        };

        lines.push(PointsLine {
            event_type: kind.as_str().to_string(),
            count: matching.len() as u32,
            points,
        });
    }

    lines
}
