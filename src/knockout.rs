use std::collections::{BTreeMap, HashMap, HashSet};

use crate::model::{Fixture, KnockoutCounts, Prediction, Stage};

/// Per member and knockout stage, how many of the teams the member placed in that
/// stage actually reached it. Pairings are ignored and blank names never count.
pub fn advancement_counts(
    fixtures: &[Fixture],
    predictions: &[Prediction],
) -> BTreeMap<u32, KnockoutCounts> {
    let stage_of: HashMap<u32, Stage> = fixtures
        .iter()
        .filter(|f| f.stage.is_knockout())
        .map(|f| (f.number, f.stage))
        .collect();

    let mut actual: HashMap<Stage, HashSet<&str>> = HashMap::new();
    for fixture in fixtures.iter().filter(|f| f.stage.is_knockout()) {
        let teams = actual.entry(fixture.stage).or_default();
        teams.extend(
            [fixture.home.as_str(), fixture.away.as_str()]
                .into_iter()
                .filter_map(team_key),
        );
    }

    let mut predicted: BTreeMap<u32, HashMap<Stage, HashSet<&str>>> = BTreeMap::new();
    for prediction in predictions {
        let Some(stage) = stage_of.get(&prediction.match_number) else {
            continue;
        };
        let teams = predicted
            .entry(prediction.member_id)
            .or_default()
            .entry(*stage)
            .or_default();
        teams.extend(
            [&prediction.home_team, &prediction.away_team]
                .into_iter()
                .filter_map(|team| team.as_deref().and_then(team_key)),
        );
    }

    let empty = HashSet::new();
    predicted
        .into_iter()
        .map(|(member_id, per_stage)| {
            let mut counts = KnockoutCounts::default();
            for stage in Stage::KNOCKOUT {
                let Some(teams) = per_stage.get(&stage) else {
                    continue;
                };
                let reached = actual.get(&stage).unwrap_or(&empty);
                counts.set(stage, teams.intersection(reached).count() as u32);
            }
            (member_id, counts)
        })
        .collect()
}

fn team_key(name: &str) -> Option<&str> {
    let trimmed = name.trim();
    if trimmed.is_empty() { None } else { Some(trimmed) }
}
