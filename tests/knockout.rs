use prediction_pool::bracket::{advancement, apply_advancement, decide_winner};
use prediction_pool::error::ScoringError;
use prediction_pool::knockout::advancement_counts;
use prediction_pool::model::{Fixture, Member, NextMatch, Prediction, Side, Stage};
use prediction_pool::winner_bonus::{champion, tournament_winner_flags};

fn knockout_match(number: u32, stage: Stage, home: &str, away: &str) -> Fixture {
    Fixture {
        number,
        home: home.to_string(),
        away: away.to_string(),
        home_goals: None,
        away_goals: None,
        home_penalties: None,
        away_penalties: None,
        stage,
        group: None,
        next_match: None,
        date: None,
        time: None,
        venue: None,
    }
}

fn played(mut fixture: Fixture, home: i32, away: i32) -> Fixture {
    fixture.home_goals = Some(home);
    fixture.away_goals = Some(away);
    fixture
}

fn with_penalties(mut fixture: Fixture, home: i32, away: i32) -> Fixture {
    fixture.home_penalties = Some(home);
    fixture.away_penalties = Some(away);
    fixture
}

fn feeds(mut fixture: Fixture, next: &str) -> Fixture {
    fixture.next_match = Some(next.parse().unwrap());
    fixture
}

fn team_pick(member_id: u32, match_number: u32, home: &str, away: &str) -> Prediction {
    Prediction {
        member_id,
        match_number,
        home_goals: 1,
        away_goals: 0,
        home_team: Some(home.to_string()),
        away_team: Some(away.to_string()),
    }
}

#[test]
fn quarter_final_advancement_counts_overlap_only() {
    let fixtures = vec![knockout_match(41, Stage::QuarterFinal, "France", "Germany")];
    let predictions = vec![team_pick(1, 41, "France", "Spain")];

    let counts = advancement_counts(&fixtures, &predictions);

    assert_eq!(counts[&1].quarter_finals, 1);
    assert_eq!(counts[&1].round_of_16, 0);
}

#[test]
fn advancement_ignores_fixture_pairing_and_duplicates() {
    let fixtures = vec![
        knockout_match(37, Stage::RoundOf16, "France", "Belgium"),
        knockout_match(38, Stage::RoundOf16, "Spain", "Georgia"),
        knockout_match(45, Stage::SemiFinal, "Spain", "France"),
    ];
    let predictions = vec![
        // Right teams, swapped fixtures.
        team_pick(1, 37, "Spain", "Georgia"),
        team_pick(1, 38, "France", "Belgium"),
        // France picked twice still counts once.
        team_pick(2, 37, "France", "Italy"),
        team_pick(2, 38, "France", "Spain"),
        team_pick(2, 45, "France", "Portugal"),
    ];

    let counts = advancement_counts(&fixtures, &predictions);

    assert_eq!(counts[&1].round_of_16, 4);
    assert_eq!(counts[&1].semi_finals, 0);
    assert_eq!(counts[&2].round_of_16, 2);
    assert_eq!(counts[&2].semi_finals, 1);
}

#[test]
fn advancement_skips_group_matches_and_blank_slots() {
    let fixtures = vec![
        knockout_match(1, Stage::Group, "France", "Germany"),
        knockout_match(50, Stage::Final, "", "Spain"),
    ];
    let mut blank = team_pick(1, 50, "", "Spain");
    blank.home_team = Some("  ".to_string());
    let predictions = vec![team_pick(1, 1, "France", "Germany"), blank];

    let counts = advancement_counts(&fixtures, &predictions);

    assert_eq!(counts[&1].finals, 1);
    assert_eq!(counts[&1].round_of_16, 0);
}

#[test]
fn predictions_for_unknown_matches_are_dropped() {
    let fixtures = vec![
        knockout_match(41, Stage::QuarterFinal, "France", "Germany"),
        knockout_match(50, Stage::Final, "France", "Spain"),
    ];
    let base = vec![team_pick(1, 41, "France", "Spain")];
    let mut with_stray = base.clone();
    with_stray.push(team_pick(1, 404, "France", "Spain"));

    assert_eq!(
        advancement_counts(&fixtures, &with_stray),
        advancement_counts(&fixtures, &base)
    );

    // A member whose only pick is for a missing match gets no counts at all.
    let counts = advancement_counts(&fixtures, &[team_pick(2, 404, "France", "Spain")]);
    assert!(counts.is_empty());
}

#[test]
fn winner_by_goals_feeds_next_match_home_slot() {
    let semi = feeds(
        played(knockout_match(45, Stage::SemiFinal, "Spain", "France"), 2, 1),
        "50-home",
    );
    let mut fixtures = vec![
        semi.clone(),
        knockout_match(50, Stage::Final, "Winner 45", "Winner 46"),
    ];

    let adv = advancement(&semi).unwrap();
    assert_eq!(
        adv.target,
        NextMatch {
            match_number: 50,
            side: Side::Home
        }
    );
    assert_eq!(adv.team, "Spain");

    assert!(apply_advancement(&mut fixtures, &adv));
    assert_eq!(fixtures[1].home, "Spain");
    assert_eq!(fixtures[1].away, "Winner 46");

    // Running it again writes the same value.
    assert!(apply_advancement(&mut fixtures, &advancement(&semi).unwrap()));
    assert_eq!(fixtures[1].home, "Spain");
}

#[test]
fn away_winner_and_penalty_winners() {
    let away_win = played(knockout_match(37, Stage::RoundOf16, "A", "B"), 0, 2);
    assert_eq!(decide_winner(&away_win).unwrap(), Side::Away);

    let home_pens = with_penalties(played(knockout_match(38, Stage::RoundOf16, "A", "B"), 1, 1), 5, 4);
    assert_eq!(decide_winner(&home_pens).unwrap(), Side::Home);

    let away_pens = with_penalties(played(knockout_match(39, Stage::RoundOf16, "A", "B"), 1, 1), 3, 4);
    assert_eq!(decide_winner(&away_pens).unwrap(), Side::Away);
}

#[test]
fn level_score_without_penalties_is_incomplete() {
    let level = feeds(
        played(knockout_match(41, Stage::QuarterFinal, "A", "B"), 1, 1),
        "45-away",
    );
    assert_eq!(
        advancement(&level),
        Err(ScoringError::IncompleteResult { match_number: 41 })
    );

    let level_pens = with_penalties(level, 3, 3);
    assert_eq!(
        decide_winner(&level_pens),
        Err(ScoringError::IncompleteResult { match_number: 41 })
    );
}

#[test]
fn unplayed_or_unlinked_matches_do_not_propagate() {
    let unplayed = feeds(knockout_match(41, Stage::QuarterFinal, "A", "B"), "45-home");
    assert_eq!(advancement(&unplayed), Err(ScoringError::UnplayedMatch(41)));

    let unlinked = played(knockout_match(42, Stage::QuarterFinal, "A", "B"), 2, 0);
    assert_eq!(advancement(&unlinked), Err(ScoringError::MissingNextMatch(42)));
}

#[test]
fn winner_bonus_flags_every_member() {
    let final_match = played(knockout_match(51, Stage::Final, "Spain", "England"), 2, 1);
    let members = vec![
        Member {
            id: 1,
            name: "Alice".to_string(),
            winning_team: Some("Spain".to_string()),
        },
        Member {
            id: 2,
            name: "Bob".to_string(),
            winning_team: Some("England".to_string()),
        },
        Member {
            id: 3,
            name: "Cara".to_string(),
            winning_team: None,
        },
    ];

    assert_eq!(champion(&final_match).unwrap(), "Spain");
    let flags = tournament_winner_flags(&final_match, &members).unwrap();
    assert_eq!(flags.len(), 3);
    assert!(flags[&1]);
    assert!(!flags[&2]);
    assert!(!flags[&3]);
}

#[test]
fn tied_final_needs_penalties() {
    let level = played(knockout_match(51, Stage::Final, "Spain", "England"), 1, 1);
    assert_eq!(
        champion(&level),
        Err(ScoringError::IncompleteResult { match_number: 51 })
    );

    let decided = with_penalties(level, 2, 4);
    assert_eq!(champion(&decided).unwrap(), "England");
}
