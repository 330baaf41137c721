use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::ScoringError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Stage {
    Group,
    RoundOf16,
    QuarterFinal,
    SemiFinal,
    Final,
}

impl Stage {
    pub const KNOCKOUT: [Stage; 4] = [
        Stage::RoundOf16,
        Stage::QuarterFinal,
        Stage::SemiFinal,
        Stage::Final,
    ];

    /// Label used in the `matches.stage` column.
    pub fn label(self) -> &'static str {
        match self {
            Stage::Group => "Group",
            Stage::RoundOf16 => "Round of 16",
            Stage::QuarterFinal => "Quarter finals",
            Stage::SemiFinal => "Semi finals",
            Stage::Final => "Finals",
        }
    }

    pub fn is_knockout(self) -> bool {
        !matches!(self, Stage::Group)
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Stage {
    type Err = ScoringError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let key: String = raw
            .chars()
            .filter(|ch| ch.is_ascii_alphanumeric())
            .collect::<String>()
            .to_ascii_lowercase();
        match key.as_str() {
            "group" => Ok(Stage::Group),
            "roundof16" | "r16" => Ok(Stage::RoundOf16),
            "quarterfinal" | "quarterfinals" => Ok(Stage::QuarterFinal),
            "semifinal" | "semifinals" => Ok(Stage::SemiFinal),
            "final" | "finals" => Ok(Stage::Final),
            _ => Err(ScoringError::UnknownStage(raw.to_string())),
        }
    }
}

impl TryFrom<String> for Stage {
    type Error = ScoringError;

    fn try_from(raw: String) -> Result<Self, Self::Error> {
        raw.parse()
    }
}

impl From<Stage> for String {
    fn from(stage: Stage) -> Self {
        stage.label().to_string()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Side {
    Home,
    Away,
}

impl Side {
    pub fn as_str(self) -> &'static str {
        match self {
            Side::Home => "home",
            Side::Away => "away",
        }
    }
}

/// Slot of a downstream fixture that a knockout winner advances into,
/// written as `"<match_number>-<home|away>"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct NextMatch {
    pub match_number: u32,
    pub side: Side,
}

impl fmt::Display for NextMatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.match_number, self.side.as_str())
    }
}

impl FromStr for NextMatch {
    type Err = ScoringError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let invalid = || ScoringError::InvalidNextMatch(raw.to_string());
        let (number, slot) = raw.trim().split_once('-').ok_or_else(invalid)?;
        let match_number = number.trim().parse::<u32>().map_err(|_| invalid())?;
        let side = match slot.trim().to_ascii_lowercase().as_str() {
            "home" => Side::Home,
            "away" => Side::Away,
            _ => return Err(invalid()),
        };
        Ok(NextMatch { match_number, side })
    }
}

impl TryFrom<String> for NextMatch {
    type Error = ScoringError;

    fn try_from(raw: String) -> Result<Self, Self::Error> {
        raw.parse()
    }
}

impl From<NextMatch> for String {
    fn from(next: NextMatch) -> Self {
        next.to_string()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Score {
    pub home: i32,
    pub away: i32,
}

impl Score {
    pub fn new(home: i32, away: i32) -> Self {
        Self { home, away }
    }

    pub fn is_draw(self) -> bool {
        self.home == self.away
    }
}

/// Accepts `"2-1"`, `"2:1"` or `"2 : 1"`.
impl FromStr for Score {
    type Err = anyhow::Error;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let mut nums = raw
            .split(|ch: char| !ch.is_ascii_digit())
            .filter(|s| !s.is_empty())
            .map(|s| s.parse::<i32>());
        match (nums.next(), nums.next(), nums.next()) {
            (Some(Ok(home)), Some(Ok(away)), None) => Ok(Score::new(home, away)),
            _ => Err(anyhow::anyhow!("expected a score like 2-1, got {raw:?}")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Fixture {
    pub number: u32,
    pub home: String,
    pub away: String,
    #[serde(default)]
    pub home_goals: Option<i32>,
    #[serde(default)]
    pub away_goals: Option<i32>,
    #[serde(default)]
    pub home_penalties: Option<i32>,
    #[serde(default)]
    pub away_penalties: Option<i32>,
    pub stage: Stage,
    #[serde(default)]
    pub group: Option<String>,
    #[serde(default)]
    pub next_match: Option<NextMatch>,
    #[serde(default)]
    pub date: Option<NaiveDate>,
    #[serde(default)]
    pub time: Option<String>,
    #[serde(default)]
    pub venue: Option<String>,
}

impl Fixture {
    pub fn score(&self) -> Option<Score> {
        let (Some(home), Some(away)) = (self.home_goals, self.away_goals) else {
            return None;
        };
        Some(Score::new(home, away))
    }

    pub fn penalties(&self) -> Option<Score> {
        let (Some(home), Some(away)) = (self.home_penalties, self.away_penalties) else {
            return None;
        };
        Some(Score::new(home, away))
    }

    pub fn is_played(&self) -> bool {
        self.score().is_some()
    }

    pub fn team(&self, side: Side) -> &str {
        match side {
            Side::Home => &self.home,
            Side::Away => &self.away,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    pub member_id: u32,
    pub match_number: u32,
    pub home_goals: i32,
    pub away_goals: i32,
    #[serde(default)]
    pub home_team: Option<String>,
    #[serde(default)]
    pub away_team: Option<String>,
}

impl Prediction {
    pub fn score(&self) -> Score {
        Score::new(self.home_goals, self.away_goals)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Member {
    pub id: u32,
    pub name: String,
    #[serde(default)]
    pub winning_team: Option<String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GroupCounters {
    pub home_goals: u32,
    pub away_goals: u32,
    pub result: u32,
    pub perfect: u32,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct KnockoutCounts {
    pub round_of_16: u32,
    pub quarter_finals: u32,
    pub semi_finals: u32,
    pub finals: u32,
}

impl KnockoutCounts {
    pub fn get(&self, stage: Stage) -> u32 {
        match stage {
            Stage::Group => 0,
            Stage::RoundOf16 => self.round_of_16,
            Stage::QuarterFinal => self.quarter_finals,
            Stage::SemiFinal => self.semi_finals,
            Stage::Final => self.finals,
        }
    }

    pub fn set(&mut self, stage: Stage, count: u32) {
        match stage {
            Stage::Group => {}
            Stage::RoundOf16 => self.round_of_16 = count,
            Stage::QuarterFinal => self.quarter_finals = count,
            Stage::SemiFinal => self.semi_finals = count,
            Stage::Final => self.finals = count,
        }
    }
}

/// Persisted per-member aggregate.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StandingsRow {
    pub member_id: u32,
    pub group: GroupCounters,
    pub knockout: KnockoutCounts,
    pub tournament_winner: bool,
}

impl StandingsRow {
    pub fn new(member_id: u32) -> Self {
        Self {
            member_id,
            ..Self::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{NextMatch, Score, Side, Stage};
    use crate::error::ScoringError;

    #[test]
    fn next_match_parses_and_formats() {
        let next: NextMatch = "50-home".parse().unwrap();
        assert_eq!(next.match_number, 50);
        assert_eq!(next.side, Side::Home);
        assert_eq!(next.to_string(), "50-home");
        assert_eq!("51-Away".parse::<NextMatch>().unwrap().side, Side::Away);
    }

    #[test]
    fn next_match_rejects_garbage() {
        for raw in ["50", "50-left", "x-home", ""] {
            assert_eq!(
                raw.parse::<NextMatch>(),
                Err(ScoringError::InvalidNextMatch(raw.to_string()))
            );
        }
    }

    #[test]
    fn score_parses_common_spellings() {
        assert_eq!("2-1".parse::<Score>().unwrap(), Score::new(2, 1));
        assert_eq!("0 : 0".parse::<Score>().unwrap(), Score::new(0, 0));
        assert!("ab".parse::<Score>().is_err());
        assert!("1-2-3".parse::<Score>().is_err());
    }

    #[test]
    fn stage_accepts_labels_and_identifiers() {
        assert_eq!("Round of 16".parse::<Stage>().unwrap(), Stage::RoundOf16);
        assert_eq!("RoundOf16".parse::<Stage>().unwrap(), Stage::RoundOf16);
        assert_eq!("Quarter finals".parse::<Stage>().unwrap(), Stage::QuarterFinal);
        assert_eq!("Finals".parse::<Stage>().unwrap(), Stage::Final);
        assert_eq!("Final".parse::<Stage>().unwrap(), Stage::Final);
        assert!(matches!(
            "Playoff".parse::<Stage>(),
            Err(ScoringError::UnknownStage(_))
        ));
    }
}
