use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::engine::ScoringContext;
use crate::model::{Fixture, Member, Prediction};

/// A tournament description: fixtures, the pool's members and their predictions.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TournamentSeed {
    #[serde(default)]
    pub members: Vec<Member>,
    #[serde(default)]
    pub matches: Vec<Fixture>,
    #[serde(default)]
    pub predictions: Vec<Prediction>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImportSummary {
    pub members: usize,
    pub matches: usize,
    pub predictions: usize,
}

pub fn parse_tournament_json(raw: &str) -> Result<TournamentSeed> {
    let trimmed = raw.trim();
    if trimmed.is_empty() || trimmed == "null" {
        return Ok(TournamentSeed::default());
    }
    serde_json::from_str(trimmed).context("invalid tournament json")
}

pub fn load_tournament_file(path: &Path) -> Result<TournamentSeed> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("read tournament file {}", path.display()))?;
    parse_tournament_json(&raw)
}

/// Upsert everything in `seed`. Re-importing the same file leaves the store unchanged.
pub fn import_tournament(ctx: &mut ScoringContext, seed: &TournamentSeed) -> Result<ImportSummary> {
    let summary = ctx.write(|store| {
        Ok(ImportSummary {
            members: store.upsert_members(&seed.members)?,
            matches: store.upsert_fixtures(&seed.matches)?,
            predictions: store.upsert_predictions(&seed.predictions)?,
        })
    })?;
    info!(
        members = summary.members,
        matches = summary.matches,
        predictions = summary.predictions,
        "tournament imported"
    );
    Ok(summary)
}
