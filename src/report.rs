use std::collections::HashMap;

use crate::classifier::{OutcomeFlags, classify};
use crate::error::{ScoringError, ScoringResult};
use crate::model::{Fixture, Member, Score};
use crate::store::Snapshot;

/// One member's prediction next to the fixture it was made for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PredictionRow {
    pub match_number: u32,
    pub stage: String,
    pub home: String,
    pub away: String,
    pub actual: Option<Score>,
    pub predicted: Score,
    /// `None` until the match has a recorded score.
    pub outcome: Option<OutcomeFlags>,
    pub home_team_prediction: Option<String>,
    pub away_team_prediction: Option<String>,
    pub home_team_match: bool,
    pub away_team_match: bool,
}

impl PredictionRow {
    pub fn both_teams_match(&self) -> bool {
        self.home_team_match && self.away_team_match
    }
}

pub fn member_predictions(
    snapshot: &Snapshot,
    member_id: u32,
) -> ScoringResult<Vec<PredictionRow>> {
    if !snapshot.members.iter().any(|m| m.id == member_id) {
        return Err(ScoringError::MemberNotFound(member_id));
    }
    let fixtures: HashMap<u32, &Fixture> =
        snapshot.fixtures.iter().map(|f| (f.number, f)).collect();

    let mut rows: Vec<PredictionRow> = snapshot
        .predictions
        .iter()
        .filter(|p| p.member_id == member_id)
        .filter_map(|p| {
            let fixture = fixtures.get(&p.match_number)?;
            let actual = fixture.score();
            Some(PredictionRow {
                match_number: fixture.number,
                stage: stage_label(fixture),
                home: fixture.home.clone(),
                away: fixture.away.clone(),
                actual,
                predicted: p.score(),
                outcome: actual.map(|score| classify(score, p.score())),
                home_team_prediction: p.home_team.clone(),
                away_team_prediction: p.away_team.clone(),
                home_team_match: same_team(p.home_team.as_deref(), &fixture.home),
                away_team_match: same_team(p.away_team.as_deref(), &fixture.away),
            })
        })
        .collect();
    rows.sort_by_key(|row| row.match_number);
    Ok(rows)
}

/// Resolve a member from an id or a case-insensitive name.
pub fn find_member<'a>(members: &'a [Member], key: &str) -> Option<&'a Member> {
    let key = key.trim();
    if let Ok(id) = key.parse::<u32>() {
        return members.iter().find(|m| m.id == id);
    }
    members.iter().find(|m| m.name.eq_ignore_ascii_case(key))
}

fn stage_label(fixture: &Fixture) -> String {
    match fixture.group.as_deref().map(str::trim) {
        Some(group) if !group.is_empty() => format!("{} {group}", fixture.stage),
        _ => fixture.stage.to_string(),
    }
}

fn same_team(predicted: Option<&str>, actual: &str) -> bool {
    let actual = actual.trim();
    predicted.is_some_and(|team| !actual.is_empty() && team.trim() == actual)
}
