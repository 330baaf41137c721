use crate::error::{ScoringError, ScoringResult};
use crate::model::{Fixture, NextMatch, Side};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Advancement {
    pub from_match: u32,
    pub target: NextMatch,
    pub team: String,
}

/// Decide which side won a match. Level scores go to penalties; a level score without
/// a penalty winner is an error rather than a guess.
pub fn decide_winner(fixture: &Fixture) -> ScoringResult<Side> {
    let score = fixture
        .score()
        .ok_or(ScoringError::UnplayedMatch(fixture.number))?;
    if score.home > score.away {
        return Ok(Side::Home);
    }
    if score.away > score.home {
        return Ok(Side::Away);
    }

    let incomplete = ScoringError::IncompleteResult {
        match_number: fixture.number,
    };
    let penalties = fixture.penalties().ok_or(incomplete.clone())?;
    if penalties.home > penalties.away {
        Ok(Side::Home)
    } else if penalties.away > penalties.home {
        Ok(Side::Away)
    } else {
        Err(incomplete)
    }
}

pub fn winning_team(fixture: &Fixture) -> ScoringResult<&str> {
    decide_winner(fixture).map(|side| fixture.team(side))
}

pub fn advancement(fixture: &Fixture) -> ScoringResult<Advancement> {
    let target = fixture
        .next_match
        .ok_or(ScoringError::MissingNextMatch(fixture.number))?;
    let team = winning_team(fixture)?.to_string();
    Ok(Advancement {
        from_match: fixture.number,
        target,
        team,
    })
}

/// Returns false when the target match is not in the list.
pub fn apply_advancement(fixtures: &mut [Fixture], advancement: &Advancement) -> bool {
    let Some(target) = fixtures
        .iter_mut()
        .find(|f| f.number == advancement.target.match_number)
    else {
        return false;
    };
    match advancement.target.side {
        Side::Home => target.home = advancement.team.clone(),
        Side::Away => target.away = advancement.team.clone(),
    }
    true
}
