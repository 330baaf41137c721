use std::cmp::Ordering;
use std::collections::{BTreeMap, HashMap};

use serde::Serialize;

use crate::model::{KnockoutCounts, Member, Stage, StandingsRow};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScoringWeights {
    pub goal_exact: u32,
    pub result: u32,
    pub perfect_bonus: u32,
    pub round_of_16: u32,
    pub quarter_final: u32,
    pub semi_final: u32,
    pub final_: u32,
    pub tournament_winner: u32,
}

impl Default for ScoringWeights {
    fn default() -> Self {
        Self {
            goal_exact: 1,
            result: 3,
            perfect_bonus: 3,
            round_of_16: 3,
            quarter_final: 4,
            semi_final: 6,
            final_: 8,
            tournament_winner: 20,
        }
    }
}

impl ScoringWeights {
    pub fn stage_weight(&self, stage: Stage) -> u32 {
        match stage {
            Stage::Group => 0,
            Stage::RoundOf16 => self.round_of_16,
            Stage::QuarterFinal => self.quarter_final,
            Stage::SemiFinal => self.semi_final,
            Stage::Final => self.final_,
        }
    }

    pub fn knockout_points(&self, counts: &KnockoutCounts) -> u32 {
        Stage::KNOCKOUT
            .iter()
            .map(|stage| self.stage_weight(*stage) * counts.get(*stage))
            .sum()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StandingEntry {
    pub position: usize,
    pub member_id: u32,
    pub name: String,
    pub group_goals: u32,
    pub group_result: u32,
    pub group_perfect: u32,
    pub round_of_16: u32,
    pub quarter_finals: u32,
    pub semi_finals: u32,
    pub finals: u32,
    pub tournament_winner: bool,
    pub group_points: u32,
    pub knockout_points: u32,
    pub total: u32,
}

impl StandingEntry {
    pub fn stage_count(&self, stage: Stage) -> u32 {
        match stage {
            Stage::Group => 0,
            Stage::RoundOf16 => self.round_of_16,
            Stage::QuarterFinal => self.quarter_finals,
            Stage::SemiFinal => self.semi_finals,
            Stage::Final => self.finals,
        }
    }
}

/// Knockout counts in `knockout` win over the persisted row. Equal totals are ordered
/// by name, then member id, and still get distinct positions.
pub fn compose(
    members: &[Member],
    rows: &[StandingsRow],
    knockout: &BTreeMap<u32, KnockoutCounts>,
    weights: &ScoringWeights,
) -> Vec<StandingEntry> {
    let rows_by_member: HashMap<u32, &StandingsRow> =
        rows.iter().map(|row| (row.member_id, row)).collect();

    let mut entries: Vec<StandingEntry> = members
        .iter()
        .map(|member| {
            let row = rows_by_member
                .get(&member.id)
                .map(|row| **row)
                .unwrap_or_else(|| StandingsRow::new(member.id));
            let counts = knockout.get(&member.id).copied().unwrap_or(row.knockout);

            let group_goals = row.group.home_goals + row.group.away_goals;
            let group_points = group_goals * weights.goal_exact
                + row.group.result * weights.result
                + row.group.perfect * weights.perfect_bonus;
            let knockout_points = weights.knockout_points(&counts);
            let bonus = if row.tournament_winner {
                weights.tournament_winner
            } else {
                0
            };

            StandingEntry {
                position: 0,
                member_id: member.id,
                name: member.name.clone(),
                group_goals,
                group_result: row.group.result,
                group_perfect: row.group.perfect,
                round_of_16: counts.round_of_16,
                quarter_finals: counts.quarter_finals,
                semi_finals: counts.semi_finals,
                finals: counts.finals,
                tournament_winner: row.tournament_winner,
                group_points,
                knockout_points,
                total: group_points + knockout_points + bonus,
            }
        })
        .collect();

    entries.sort_by(rank_order);
    for (idx, entry) in entries.iter_mut().enumerate() {
        entry.position = idx + 1;
    }
    entries
}

fn rank_order(a: &StandingEntry, b: &StandingEntry) -> Ordering {
    b.total
        .cmp(&a.total)
        .then_with(|| a.name.cmp(&b.name))
        .then_with(|| a.member_id.cmp(&b.member_id))
}
