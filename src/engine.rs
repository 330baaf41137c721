use std::collections::BTreeMap;

use anyhow::{Context, Result};
use tracing::{info, warn};

use crate::bracket::{Advancement, advancement, apply_advancement};
use crate::cache::SnapshotCache;
use crate::config::PoolConfig;
use crate::error::ScoringError;
use crate::group_stage::aggregate_group_stage;
use crate::knockout::advancement_counts;
use crate::model::{Fixture, KnockoutCounts, Score, Stage};
use crate::schedule::started_stages;
use crate::standings::{ScoringWeights, StandingEntry, compose};
use crate::store::{PoolStore, Snapshot};
use crate::winner_bonus::{champion, find_final, tournament_winner_flags};

pub struct ScoringContext {
    store: PoolStore,
    cache: SnapshotCache,
    weights: ScoringWeights,
}

impl ScoringContext {
    pub fn new(store: PoolStore, cache: SnapshotCache, weights: ScoringWeights) -> Self {
        Self {
            store,
            cache,
            weights,
        }
    }

    pub fn open(config: &PoolConfig) -> Result<Self> {
        let store = PoolStore::open(&config.db_path)?;
        Ok(Self::new(
            store,
            SnapshotCache::new(config.cache_ttl),
            config.weights,
        ))
    }

    pub fn store(&self) -> &PoolStore {
        &self.store
    }

    pub fn weights(&self) -> &ScoringWeights {
        &self.weights
    }

    pub fn write<T>(&mut self, op: impl FnOnce(&mut PoolStore) -> Result<T>) -> Result<T> {
        let out = op(&mut self.store);
        self.cache.invalidate();
        out
    }

    pub fn snapshot(&mut self) -> Result<&Snapshot> {
        let store = &self.store;
        self.cache.get_or_load(|| store.load_snapshot())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResultEntry {
    pub match_number: u32,
    pub score: Score,
    pub penalties: Option<Score>,
}

impl ResultEntry {
    pub fn new(match_number: u32, home: i32, away: i32) -> Self {
        Self {
            match_number,
            score: Score::new(home, away),
            penalties: None,
        }
    }

    pub fn with_penalties(mut self, home: i32, away: i32) -> Self {
        self.penalties = Some(Score::new(home, away));
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PassOutcome {
    GroupRecomputed {
        members: usize,
    },
    WinnerAdvanced {
        advancement: Advancement,
        knockout_rows: usize,
    },
    ChampionDecided {
        champion: String,
        members: usize,
        correct_picks: usize,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecomputeSummary {
    pub group_rows: usize,
    pub knockout_rows: usize,
    pub champion: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Leaderboard {
    pub entries: Vec<StandingEntry>,
    pub started_stages: Vec<Stage>,
}

/// Write a match result and run the scoring pass its stage calls for.
pub fn record_result(ctx: &mut ScoringContext, entry: ResultEntry) -> Result<PassOutcome> {
    ctx.write(|store| store.record_score(entry.match_number, entry.score, entry.penalties))
        .with_context(|| format!("record result for match {}", entry.match_number))?;
    info!(
        match_number = entry.match_number,
        home = entry.score.home,
        away = entry.score.away,
        "result recorded"
    );
    score_match(ctx, entry.match_number)
}

pub fn score_match(ctx: &mut ScoringContext, match_number: u32) -> Result<PassOutcome> {
    let mut snapshot = ctx.store.load_snapshot().context("load scoring snapshot")?;
    let fixture = snapshot
        .fixture(match_number)
        .cloned()
        .ok_or(ScoringError::MatchNotFound(match_number))?;

    let outcome = match fixture.stage {
        Stage::Group => {
            let members = recompute_group_stage(ctx, &snapshot)?;
            PassOutcome::GroupRecomputed { members }
        }
        Stage::RoundOf16 | Stage::QuarterFinal | Stage::SemiFinal => {
            let advancement = advancement(&fixture)?;
            ctx.write(|store| store.set_team(advancement.target, &advancement.team))?;
            if !apply_advancement(&mut snapshot.fixtures, &advancement) {
                warn!(slot = %advancement.target, "advanced into a match missing from snapshot");
            }
            let knockout_rows = persist_knockout_counts(ctx, &snapshot)?;
            info!(
                from = advancement.from_match,
                slot = %advancement.target,
                team = %advancement.team,
                "winner advanced"
            );
            PassOutcome::WinnerAdvanced {
                advancement,
                knockout_rows,
            }
        }
        Stage::Final => {
            let (champion, flags) = champion_flags(&fixture, &snapshot)?;
            let correct_picks = flags.values().filter(|picked| **picked).count();
            let members = ctx.write(|store| store.upsert_tournament_winner(&flags))?;
            persist_knockout_counts(ctx, &snapshot)?;
            info!(%champion, members, correct_picks, "tournament winner bonus applied");
            PassOutcome::ChampionDecided {
                champion,
                members,
                correct_picks,
            }
        }
    };
    Ok(outcome)
}

/// Rebuild every persisted aggregate from the full history. Safe to retry.
pub fn recompute_all(ctx: &mut ScoringContext) -> Result<RecomputeSummary> {
    let snapshot = ctx.store.load_snapshot().context("load scoring snapshot")?;
    let group_rows = recompute_group_stage(ctx, &snapshot)?;
    let knockout_rows = persist_knockout_counts(ctx, &snapshot)?;

    let champion = match find_final(&snapshot.fixtures) {
        Some(final_match) if final_match.is_played() => {
            let (champion, flags) = champion_flags(final_match, &snapshot)?;
            ctx.write(|store| store.upsert_tournament_winner(&flags))?;
            Some(champion)
        }
        _ => None,
    };

    info!(group_rows, knockout_rows, champion = ?champion, "full recompute finished");
    Ok(RecomputeSummary {
        group_rows,
        knockout_rows,
        champion,
    })
}

pub fn leaderboard(ctx: &mut ScoringContext) -> Result<Leaderboard> {
    let weights = ctx.weights;
    let snapshot = ctx.snapshot()?;
    let knockout = advancement_counts(&snapshot.fixtures, &snapshot.predictions);
    Ok(Leaderboard {
        entries: compose(&snapshot.members, &snapshot.standings, &knockout, &weights),
        started_stages: started_stages(&snapshot.fixtures),
    })
}

fn recompute_group_stage(ctx: &mut ScoringContext, snapshot: &Snapshot) -> Result<usize> {
    let counters = aggregate_group_stage(
        &snapshot.fixtures,
        &snapshot.predictions,
        &snapshot.members,
    );
    let rows = ctx.write(|store| store.upsert_group_counters(&counters))?;
    info!(rows, "group standings recomputed");
    Ok(rows)
}

fn persist_knockout_counts(ctx: &mut ScoringContext, snapshot: &Snapshot) -> Result<usize> {
    let mut counts: BTreeMap<u32, KnockoutCounts> = snapshot
        .members
        .iter()
        .map(|m| (m.id, KnockoutCounts::default()))
        .collect();
    counts.extend(advancement_counts(&snapshot.fixtures, &snapshot.predictions));
    ctx.write(|store| store.upsert_knockout_counts(&counts))
}

fn champion_flags(
    final_match: &Fixture,
    snapshot: &Snapshot,
) -> Result<(String, BTreeMap<u32, bool>)> {
    let flags = tournament_winner_flags(final_match, &snapshot.members)?;
    Ok((champion(final_match)?.to_string(), flags))
}
