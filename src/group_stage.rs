use std::collections::{BTreeMap, HashMap};

use crate::classifier::classify;
use crate::model::{Fixture, GroupCounters, Member, Prediction, Score, Stage};

/// Recompute group-stage counters from the full match history.
///
/// Every member in `members` gets an entry, as does any member id that only shows up
/// in `predictions`. Matches without both goals recorded and predictions pointing at
/// unknown match numbers are skipped. The result holds absolute totals, so running it
/// twice over the same snapshot yields the same map.
pub fn aggregate_group_stage(
    fixtures: &[Fixture],
    predictions: &[Prediction],
    members: &[Member],
) -> BTreeMap<u32, GroupCounters> {
    let played: HashMap<u32, Score> = fixtures
        .iter()
        .filter(|f| f.stage == Stage::Group)
        .filter_map(|f| f.score().map(|score| (f.number, score)))
        .collect();

    let mut counters: BTreeMap<u32, GroupCounters> = members
        .iter()
        .map(|m| (m.id, GroupCounters::default()))
        .collect();

    for prediction in predictions {
        let entry = counters.entry(prediction.member_id).or_default();
        let Some(actual) = played.get(&prediction.match_number) else {
            continue;
        };
        let flags = classify(*actual, prediction.score());
        entry.home_goals += u32::from(flags.home_goals_exact);
        entry.away_goals += u32::from(flags.away_goals_exact);
        entry.result += u32::from(flags.result_match);
        entry.perfect += u32::from(flags.perfect);
    }

    counters
}
