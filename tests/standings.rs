use std::collections::BTreeMap;

use prediction_pool::model::{
    Fixture, GroupCounters, KnockoutCounts, Member, Stage, StandingsRow,
};
use prediction_pool::schedule::{matches_on, played_matches, started_stages};
use prediction_pool::standings::{ScoringWeights, compose};

fn member(id: u32, name: &str) -> Member {
    Member {
        id,
        name: name.to_string(),
        winning_team: None,
    }
}

fn row(member_id: u32, home: u32, away: u32, result: u32, perfect: u32) -> StandingsRow {
    StandingsRow {
        member_id,
        group: GroupCounters {
            home_goals: home,
            away_goals: away,
            result,
            perfect,
        },
        ..StandingsRow::default()
    }
}

#[test]
fn total_combines_group_knockout_and_bonus() {
    let members = vec![member(1, "Alice")];
    let rows = vec![row(1, 3, 2, 2, 1)];
    let knockout = BTreeMap::from([(
        1,
        KnockoutCounts {
            round_of_16: 1,
            ..KnockoutCounts::default()
        },
    )]);

    let table = compose(&members, &rows, &knockout, &ScoringWeights::default());

    let alice = &table[0];
    assert_eq!(alice.group_goals, 5);
    assert_eq!(alice.group_points, 14);
    assert_eq!(alice.knockout_points, 3);
    assert_eq!(alice.total, 17);
}

#[test]
fn every_weight_applies() {
    let members = vec![member(1, "Alice")];
    let mut stored = row(1, 0, 0, 0, 0);
    stored.tournament_winner = true;
    let knockout = BTreeMap::from([(
        1,
        KnockoutCounts {
            round_of_16: 1,
            quarter_finals: 1,
            semi_finals: 1,
            finals: 1,
        },
    )]);

    let table = compose(&members, &[stored], &knockout, &ScoringWeights::default());

    assert_eq!(table[0].knockout_points, 3 + 4 + 6 + 8);
    assert_eq!(table[0].total, 21 + 20);
}

#[test]
fn equal_totals_get_distinct_positions_by_name() {
    // Totals: Cara 17, Bob 20, Alice 20.
    let members = vec![member(3, "Cara"), member(2, "Bob"), member(1, "Alice")];
    let rows = vec![row(3, 5, 0, 3, 1), row(2, 5, 0, 5, 0), row(1, 2, 0, 4, 2)];

    let table = compose(&members, &rows, &BTreeMap::new(), &ScoringWeights::default());

    let order: Vec<(&str, usize, u32)> = table
        .iter()
        .map(|e| (e.name.as_str(), e.position, e.total))
        .collect();
    assert_eq!(
        order,
        vec![("Alice", 1, 20), ("Bob", 2, 20), ("Cara", 3, 17)]
    );
}

#[test]
fn missing_rows_and_knockout_data_default_to_zero() {
    let members = vec![member(1, "Alice"), member(2, "Bob")];
    let rows = vec![row(1, 1, 0, 1, 0)];

    let table = compose(&members, &rows, &BTreeMap::new(), &ScoringWeights::default());

    assert_eq!(table.len(), 2);
    let bob = table.iter().find(|e| e.name == "Bob").unwrap();
    assert_eq!(bob.total, 0);
    assert_eq!(bob.position, 2);
    assert!(!bob.tournament_winner);
}

#[test]
fn persisted_knockout_counts_are_used_when_none_computed() {
    let members = vec![member(1, "Alice")];
    let mut stored = row(1, 0, 0, 0, 0);
    stored.knockout.semi_finals = 2;

    let table = compose(&members, &[stored], &BTreeMap::new(), &ScoringWeights::default());

    assert_eq!(table[0].semi_finals, 2);
    assert_eq!(table[0].total, 12);
}

fn fixture(number: u32, stage: Stage, date: &str, played: bool) -> Fixture {
    Fixture {
        number,
        home: "H".to_string(),
        away: "A".to_string(),
        home_goals: played.then_some(1),
        away_goals: played.then_some(0),
        home_penalties: None,
        away_penalties: None,
        stage,
        group: None,
        next_match: None,
        date: Some(date.parse().unwrap()),
        time: None,
        venue: None,
    }
}

#[test]
fn started_stages_follow_recorded_results() {
    let fixtures = vec![
        fixture(1, Stage::Group, "2024-06-14", true),
        fixture(37, Stage::RoundOf16, "2024-06-29", true),
        fixture(41, Stage::QuarterFinal, "2024-07-05", false),
    ];
    assert_eq!(started_stages(&fixtures), vec![Stage::RoundOf16]);
}

#[test]
fn played_matches_are_latest_first_up_to_today() {
    let fixtures = vec![
        fixture(1, Stage::Group, "2024-06-14", true),
        fixture(2, Stage::Group, "2024-06-15", false),
        fixture(3, Stage::Group, "2024-06-20", false),
    ];
    let today = "2024-06-15".parse().unwrap();

    let numbers: Vec<u32> = played_matches(&fixtures, today)
        .iter()
        .map(|f| f.number)
        .collect();
    assert_eq!(numbers, vec![2, 1]);
}

#[test]
fn matches_on_a_day_are_ordered_by_kickoff() {
    let mut late = fixture(10, Stage::Group, "2024-06-20", false);
    late.time = Some("21:00".to_string());
    let mut early = fixture(11, Stage::Group, "2024-06-20", false);
    early.time = Some("15:00".to_string());
    let untimed = fixture(12, Stage::Group, "2024-06-20", false);
    let mut evening = fixture(13, Stage::Group, "2024-06-20", false);
    evening.time = Some("18:00:00".to_string());
    let other_day = fixture(14, Stage::Group, "2024-06-21", false);
    let fixtures = vec![late, early, untimed, evening, other_day];

    let numbers: Vec<u32> = matches_on(&fixtures, "2024-06-20".parse().unwrap())
        .iter()
        .map(|f| f.number)
        .collect();
    assert_eq!(numbers, vec![11, 13, 10, 12]);
}

#[test]
fn standings_serialize_to_json_rows() {
    let members = vec![member(1, "Alice")];
    let rows = vec![row(1, 3, 2, 2, 1)];
    let table = compose(&members, &rows, &BTreeMap::new(), &ScoringWeights::default());

    let json = serde_json::to_value(&table).unwrap();
    assert_eq!(json[0]["name"], "Alice");
    assert_eq!(json[0]["position"], 1);
    assert_eq!(json[0]["total"], 14);
    assert_eq!(json[0]["tournament_winner"], false);
}
