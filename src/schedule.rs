use chrono::{NaiveDate, NaiveTime};

use crate::model::{Fixture, Stage};

/// Knockout stages with at least one recorded result, in bracket order. Leaderboard
/// columns for later rounds stay hidden until these appear.
pub fn started_stages(fixtures: &[Fixture]) -> Vec<Stage> {
    Stage::KNOCKOUT
        .into_iter()
        .filter(|stage| fixtures.iter().any(|f| f.stage == *stage && f.is_played()))
        .collect()
}

/// Matches scheduled on or before `today`, most recent match number first. Undated
/// fixtures are left out.
pub fn played_matches(fixtures: &[Fixture], today: NaiveDate) -> Vec<&Fixture> {
    let mut out: Vec<&Fixture> = fixtures
        .iter()
        .filter(|f| f.date.is_some_and(|date| date <= today))
        .collect();
    out.sort_by(|a, b| b.number.cmp(&a.number));
    out
}

/// Fixtures dated `day`, earliest kickoff first. Unparseable or missing times sort last.
pub fn matches_on(fixtures: &[Fixture], day: NaiveDate) -> Vec<&Fixture> {
    let mut out: Vec<&Fixture> = fixtures.iter().filter(|f| f.date == Some(day)).collect();
    out.sort_by_key(|f| (kickoff(f).is_none(), kickoff(f), f.number));
    out
}

fn kickoff(fixture: &Fixture) -> Option<NaiveTime> {
    let raw = fixture.time.as_deref()?.trim();
    NaiveTime::parse_from_str(raw, "%H:%M")
        .or_else(|_| NaiveTime::parse_from_str(raw, "%H:%M:%S"))
        .ok()
}
