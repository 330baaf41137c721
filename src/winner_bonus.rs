use std::collections::BTreeMap;

use crate::bracket::winning_team;
use crate::error::ScoringResult;
use crate::model::{Fixture, Member, Stage};

/// Champion of the tournament, taken from the Final. A level Final is settled by
/// penalties; without a penalty winner the champion is unknown and this fails.
pub fn champion(final_match: &Fixture) -> ScoringResult<&str> {
    winning_team(final_match)
}

pub fn find_final(fixtures: &[Fixture]) -> Option<&Fixture> {
    fixtures.iter().find(|f| f.stage == Stage::Final)
}

/// Flag for every member: did they pick the champion. Covers all members so the
/// stored flags are overwritten wholesale.
pub fn tournament_winner_flags(
    final_match: &Fixture,
    members: &[Member],
) -> ScoringResult<BTreeMap<u32, bool>> {
    let winner = champion(final_match)?;
    Ok(members
        .iter()
        .map(|m| (m.id, m.winning_team.as_deref() == Some(winner)))
        .collect())
}
