use std::collections::BTreeSet;

use anyhow::{Context, Result, bail};
use rand::Rng;
use rand::seq::SliceRandom;

use prediction_pool::config::{PoolConfig, init_logging};
use prediction_pool::engine::ScoringContext;
use prediction_pool::model::{Member, Prediction, Stage};

const DEMO_MEMBERS: [&str; 6] = ["Alex", "Billie", "Charlie", "Dana", "Eli", "Frankie"];
const MAX_GOALS: i32 = 4;

/// Fill an imported tournament with random members and predictions so the scoring
/// passes have something to chew on. Existing predictions for the same member/match
/// are overwritten.
fn main() -> Result<()> {
    let mut config = PoolConfig::from_env()?;
    init_logging(&config.log_filter);
    if let Some(path) = std::env::args().nth(1) {
        config.db_path = path.into();
    }

    let mut ctx = ScoringContext::open(&config)?;
    let snapshot = ctx.snapshot()?.clone();
    if snapshot.fixtures.is_empty() {
        bail!("no matches in {}; import a tournament first", config.db_path.display());
    }

    let teams: Vec<String> = snapshot
        .fixtures
        .iter()
        .filter(|f| f.stage == Stage::Group)
        .flat_map(|f| [f.home.clone(), f.away.clone()])
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect();
    if teams.len() < 2 {
        bail!("need at least two group-stage teams to seed knockout picks");
    }

    let mut rng = rand::thread_rng();
    let mut members = snapshot.members.clone();
    if members.is_empty() {
        members = DEMO_MEMBERS
            .iter()
            .enumerate()
            .map(|(idx, name)| Member {
                id: idx as u32 + 1,
                name: name.to_string(),
                winning_team: teams.choose(&mut rng).cloned(),
            })
            .collect();
    }

    let mut predictions = Vec::new();
    for member in &members {
        for fixture in &snapshot.fixtures {
            let (home_team, away_team) = if fixture.stage.is_knockout() {
                let picks: Vec<&String> = teams.choose_multiple(&mut rng, 2).collect();
                (picks.first().map(|t| t.to_string()), picks.get(1).map(|t| t.to_string()))
            } else {
                (Some(fixture.home.clone()), Some(fixture.away.clone()))
            };
            predictions.push(Prediction {
                member_id: member.id,
                match_number: fixture.number,
                home_goals: rng.gen_range(0..=MAX_GOALS),
                away_goals: rng.gen_range(0..=MAX_GOALS),
                home_team,
                away_team,
            });
        }
    }

    let (members_written, predictions_written) = ctx
        .write(|store| Ok((store.upsert_members(&members)?, store.upsert_predictions(&predictions)?)))
        .context("write demo predictions")?;

    println!("Demo seed complete");
    println!("DB: {}", config.db_path.display());
    println!("Members: {members_written}");
    println!("Predictions: {predictions_written}");
    Ok(())
}
