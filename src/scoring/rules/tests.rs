//! Unit tests for the scoring table

use super::*;

mod table_tests {
    use super::*;

    #[test]
    fn test_goal_points_by_position() {
        assert_eq!(point_delta(EventType::Goal, Position::GK, None), 6.0);
        assert_eq!(point_delta(EventType::Goal, Position::DEF, None), 6.0);
        assert_eq!(point_delta(EventType::Goal, Position::MID, None), 5.0);
        assert_eq!(point_delta(EventType::Goal, Position::FWD, None), 4.0);
    }

    #[test]
    fn test_assist_is_flat() {
        for position in Position::ALL {
            assert_eq!(point_delta(EventType::Assist, position, None), 3.0);
        }
    }

    #[test]
    fn test_clean_sheet_points_by_position() {
        assert_eq!(point_delta(EventType::CleanSheet, Position::GK, None), 4.0);
        assert_eq!(point_delta(EventType::CleanSheet, Position::DEF, None), 4.0);
        assert_eq!(point_delta(EventType::CleanSheet, Position::MID, None), 1.0);
        assert_eq!(point_delta(EventType::CleanSheet, Position::FWD, None), 0.0);
    }

    #[test]
    fn test_penalties_are_position_independent() {
        for position in Position::ALL {
            assert_eq!(point_delta(EventType::YellowCard, position, None), -1.0);
            assert_eq!(point_delta(EventType::RedCard, position, None), -3.0);
            assert_eq!(point_delta(EventType::PenaltyMiss, position, None), -2.0);
            assert_eq!(point_delta(EventType::OwnGoal, position, None), -2.0);
        }
    }

    #[test]
    fn test_goalkeeper_only_events() {
        assert_eq!(point_delta(EventType::PenaltySave, Position::GK, None), 5.0);
        assert_eq!(point_delta(EventType::PenaltySave, Position::DEF, None), 0.0);
        assert_eq!(point_delta(EventType::PenaltySave, Position::FWD, None), 0.0);

        let per_save = point_delta(EventType::Save, Position::GK, None);
        assert!((per_save - 1.0 / 3.0).abs() < f64::EPSILON);
        assert_eq!(point_delta(EventType::Save, Position::MID, None), 0.0);
    }

    #[test]
    fn test_bonus_passes_payload_through() {
        assert_eq!(point_delta(EventType::Bonus, Position::MID, Some(3)), 3.0);
        assert_eq!(point_delta(EventType::Bonus, Position::GK, Some(1)), 1.0);
        assert_eq!(point_delta(EventType::Bonus, Position::FWD, None), 0.0);
    }

    #[test]
    fn test_goals_conceded_floor_division() {
        assert_eq!(point_delta(EventType::GoalsConceded, Position::GK, Some(1)), 0.0);
        assert_eq!(point_delta(EventType::GoalsConceded, Position::GK, Some(3)), -1.0);
        assert_eq!(point_delta(EventType::GoalsConceded, Position::GK, Some(4)), -2.0);
        assert_eq!(point_delta(EventType::GoalsConceded, Position::DEF, Some(5)), -2.0);
        assert_eq!(point_delta(EventType::GoalsConceded, Position::MID, Some(4)), 0.0);
        assert_eq!(point_delta(EventType::GoalsConceded, Position::FWD, Some(6)), 0.0);
        assert_eq!(point_delta(EventType::GoalsConceded, Position::GK, None), 0.0);
    }

    #[test]
    fn test_appearance_events_score_one_each() {
        assert_eq!(point_delta(EventType::Appearance, Position::MID, None), 1.0);
        assert_eq!(point_delta(EventType::Minutes60, Position::MID, None), 1.0);
    }
}

mod tag_tests {
    use super::*;

    #[test]
    fn test_tag_lookup_matches_typed_lookup() {
        assert_eq!(point_delta_for_tag("goal", "DEF", None), 6.0);
        assert_eq!(point_delta_for_tag("clean_sheet", "MID", None), 1.0);
        assert_eq!(point_delta_for_tag("bonus", "FWD", Some(2)), 2.0);
        assert_eq!(point_delta_for_tag("minutes_60", "GK", None), 1.0);
    }

    #[test]
    fn test_unknown_tag_or_position_scores_zero() {
        assert_eq!(point_delta_for_tag("offside", "FWD", None), 0.0);
        assert_eq!(point_delta_for_tag("goal", "STRIKER", None), 0.0);
        assert_eq!(point_delta_for_tag("", "", None), 0.0);
    }

    #[test]
    fn test_event_type_round_trips_through_str() {
        for event in EventType::ALL {
            assert_eq!(event.as_str().parse::<EventType>().unwrap(), event);
        }
        assert!("Goal".parse::<EventType>().is_ok());
    }

    #[test]
    fn test_event_type_serde_names() {
        let json = serde_json::to_string(&EventType::Minutes60).unwrap();
        assert_eq!(json, "\"minutes_60\"");
        let json = serde_json::to_string(&EventType::GoalsConceded).unwrap();
        assert_eq!(json, "\"goals_conceded\"");
    }
}

mod aggregate_tests {
    use super::*;

    #[test]
    fn test_appearance_points() {
        assert_eq!(appearance_points(0), 0);
        assert_eq!(appearance_points(1), 1);
        assert_eq!(appearance_points(59), 1);
        assert_eq!(appearance_points(60), 2);
        assert_eq!(appearance_points(90), 2);
    }

    #[test]
    fn test_aggregate_defender_with_goal_and_clean_sheet() {
        let events = vec![
            ScoringEvent::new(EventType::Goal),
            ScoringEvent::new(EventType::CleanSheet),
            ScoringEvent::with_value(EventType::Bonus, 3),
        ];
        // 2 appearance + 6 goal + 4 clean sheet + 3 bonus
        assert_eq!(aggregate_points(Position::DEF, 90, &events), 15);
    }

    #[test]
    fn test_aggregate_ignores_discrete_appearance_events() {
        let events = vec![
            ScoringEvent::new(EventType::Appearance),
            ScoringEvent::new(EventType::Minutes60),
        ];
        assert_eq!(aggregate_points(Position::MID, 75, &events), 2);
        assert_eq!(aggregate_points(Position::MID, 0, &events), 0);
    }

    #[test]
    fn test_aggregate_floors_saves() {
        let saves = |n: usize| vec![ScoringEvent::new(EventType::Save); n];

        assert_eq!(aggregate_points(Position::GK, 90, &saves(2)), 2);
        assert_eq!(aggregate_points(Position::GK, 90, &saves(3)), 3);
        assert_eq!(aggregate_points(Position::GK, 90, &saves(5)), 3);
        assert_eq!(aggregate_points(Position::GK, 90, &saves(6)), 4);
        assert_eq!(aggregate_points(Position::DEF, 90, &saves(6)), 2);
    }

    #[test]
    fn test_aggregate_goalkeeper_bad_day() {
        let events = vec![
            ScoringEvent::with_value(EventType::GoalsConceded, 4),
            ScoringEvent::new(EventType::YellowCard),
            ScoringEvent::new(EventType::OwnGoal),
        ];
        // 2 appearance - 2 conceded - 1 yellow - 2 own goal
        assert_eq!(aggregate_points(Position::GK, 90, &events), -3);
    }

    #[test]
    fn test_aggregate_forward_cameo() {
        let events = vec![
            ScoringEvent::new(EventType::Goal),
            ScoringEvent::new(EventType::Assist),
            ScoringEvent::with_value(EventType::GoalsConceded, 4),
        ];
        // 1 appearance + 4 goal + 3 assist; conceded ignored for FWD
        assert_eq!(aggregate_points(Position::FWD, 20, &events), 8);
    }

    #[test]
    fn test_breakdown_sums_to_aggregate() {
        let mut events = vec![
            ScoringEvent::new(EventType::PenaltySave),
            ScoringEvent::with_value(EventType::GoalsConceded, 3),
            ScoringEvent::with_value(EventType::Bonus, 1),
        ];
        events.extend(vec![ScoringEvent::new(EventType::Save); 7]);

        let lines = breakdown(Position::GK, 90, &events);
        let sum: i32 = lines.iter().map(|l| l.points).sum();
        assert_eq!(sum, aggregate_points(Position::GK, 90, &events));

        let saves = lines.iter().find(|l| l.event_type == "save").unwrap();
        assert_eq!(saves.count, 7);
        assert_eq!(saves.points, 2);
    }

    #[test]
    fn test_breakdown_empty_for_unused_player() {
        assert!(breakdown(Position::MID, 0, &[]).is_empty());
    }
}
