use std::collections::BTreeMap;
use std::path::Path;

use anyhow::{Context, Result, anyhow};
use chrono::{NaiveDate, Utc};
use rusqlite::{Connection, params};
use tracing::debug;

use crate::error::ScoringError;
use crate::model::{
    Fixture, GroupCounters, KnockoutCounts, Member, NextMatch, Prediction, Score, Side, Stage,
    StandingsRow,
};

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Everything one scoring pass reads, loaded once.
#[derive(Debug, Clone, Default)]
pub struct Snapshot {
    pub fixtures: Vec<Fixture>,
    pub predictions: Vec<Prediction>,
    pub members: Vec<Member>,
    pub standings: Vec<StandingsRow>,
}

impl Snapshot {
    pub fn fixture(&self, number: u32) -> Option<&Fixture> {
        self.fixtures.iter().find(|f| f.number == number)
    }
}

/// SQLite-backed result store: fixtures, predictions, members and the per-member
/// standings aggregate.
pub struct PoolStore {
    conn: Connection,
}

impl PoolStore {
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).ok();
        }
        let conn =
            Connection::open(path).with_context(|| format!("open sqlite db {}", path.display()))?;
        conn.execute_batch("PRAGMA journal_mode = WAL;")
            .context("enable wal journal")?;
        Self::from_connection(conn)
    }

    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().context("open in-memory sqlite db")?;
        Self::from_connection(conn)
    }

    fn from_connection(conn: Connection) -> Result<Self> {
        init_schema(&conn)?;
        Ok(Self { conn })
    }

    pub fn load_snapshot(&self) -> Result<Snapshot> {
        Ok(Snapshot {
            fixtures: self.load_fixtures()?,
            predictions: self.load_predictions()?,
            members: self.load_members()?,
            standings: self.load_standings()?,
        })
    }

    pub fn load_fixtures(&self) -> Result<Vec<Fixture>> {
        let mut stmt = self
            .conn
            .prepare(
                r#"
                SELECT
                    number, home, away, home_goals, away_goals,
                    home_penalties, away_penalties, stage, group_label,
                    next_game, date, time, venue
                FROM matches
                ORDER BY number ASC
                "#,
            )
            .context("prepare load matches query")?;

        let rows = stmt
            .query_map([], |row| {
                Ok(FixtureRecord {
                    number: row.get(0)?,
                    home: row.get(1)?,
                    away: row.get(2)?,
                    home_goals: row.get(3)?,
                    away_goals: row.get(4)?,
                    home_penalties: row.get(5)?,
                    away_penalties: row.get(6)?,
                    stage: row.get(7)?,
                    group: row.get(8)?,
                    next_game: row.get(9)?,
                    date: row.get(10)?,
                    time: row.get(11)?,
                    venue: row.get(12)?,
                })
            })
            .context("query load matches")?;

        let mut out = Vec::new();
        for row in rows {
            let record = row.context("decode match row")?;
            out.push(record.into_fixture()?);
        }
        Ok(out)
    }

    pub fn load_fixture(&self, number: u32) -> Result<Option<Fixture>> {
        Ok(self
            .load_fixtures()?
            .into_iter()
            .find(|f| f.number == number))
    }

    pub fn load_predictions(&self) -> Result<Vec<Prediction>> {
        let mut stmt = self
            .conn
            .prepare(
                r#"
                SELECT
                    member_id, match_number, home_goals_prediction, away_goals_prediction,
                    home_team_prediction, away_team_prediction
                FROM predictions
                ORDER BY member_id ASC, match_number ASC
                "#,
            )
            .context("prepare load predictions query")?;

        let rows = stmt
            .query_map([], |row| {
                Ok(Prediction {
                    member_id: row.get(0)?,
                    match_number: row.get(1)?,
                    home_goals: row.get(2)?,
                    away_goals: row.get(3)?,
                    home_team: row.get(4)?,
                    away_team: row.get(5)?,
                })
            })
            .context("query load predictions")?;

        let mut out = Vec::new();
        for row in rows {
            out.push(row.context("decode prediction row")?);
        }
        Ok(out)
    }

    pub fn load_members(&self) -> Result<Vec<Member>> {
        let mut stmt = self
            .conn
            .prepare("SELECT id, name, winning_team FROM members ORDER BY name ASC, id ASC")
            .context("prepare load members query")?;

        let rows = stmt
            .query_map([], |row| {
                Ok(Member {
                    id: row.get(0)?,
                    name: row.get(1)?,
                    winning_team: row.get(2)?,
                })
            })
            .context("query load members")?;

        let mut out = Vec::new();
        for row in rows {
            out.push(row.context("decode member row")?);
        }
        Ok(out)
    }

    pub fn load_standings(&self) -> Result<Vec<StandingsRow>> {
        let mut stmt = self
            .conn
            .prepare(
                r#"
                SELECT
                    member_id, group_home_goals, group_away_goals, group_result,
                    group_perfect_prediction, round_of_16, quarter_finals, semi_finals,
                    finals, tournament_winner
                FROM standings
                ORDER BY member_id ASC
                "#,
            )
            .context("prepare load standings query")?;

        let rows = stmt
            .query_map([], |row| {
                Ok(StandingsRow {
                    member_id: row.get(0)?,
                    group: GroupCounters {
                        home_goals: row.get(1)?,
                        away_goals: row.get(2)?,
                        result: row.get(3)?,
                        perfect: row.get(4)?,
                    },
                    knockout: KnockoutCounts {
                        round_of_16: row.get(5)?,
                        quarter_finals: row.get(6)?,
                        semi_finals: row.get(7)?,
                        finals: row.get(8)?,
                    },
                    tournament_winner: row.get::<_, i64>(9)? != 0,
                })
            })
            .context("query load standings")?;

        let mut out = Vec::new();
        for row in rows {
            out.push(row.context("decode standings row")?);
        }
        Ok(out)
    }

    /// Write a result. Penalties are cleared when `penalties` is `None`.
    pub fn record_score(
        &mut self,
        number: u32,
        score: Score,
        penalties: Option<Score>,
    ) -> Result<()> {
        let changed = self
            .conn
            .execute(
                r#"
                UPDATE matches
                SET home_goals = ?1, away_goals = ?2,
                    home_penalties = ?3, away_penalties = ?4, updated_at = ?5
                WHERE number = ?6
                "#,
                params![
                    score.home,
                    score.away,
                    penalties.map(|p| p.home),
                    penalties.map(|p| p.away),
                    Utc::now().to_rfc3339(),
                    number,
                ],
            )
            .context("update match score")?;
        if changed == 0 {
            return Err(ScoringError::MatchNotFound(number).into());
        }
        debug!(number, home = score.home, away = score.away, "recorded score");
        Ok(())
    }

    /// Put a team into one slot of a fixture.
    pub fn set_team(&mut self, target: NextMatch, team: &str) -> Result<()> {
        let sql = match target.side {
            Side::Home => "UPDATE matches SET home = ?1, updated_at = ?2 WHERE number = ?3",
            Side::Away => "UPDATE matches SET away = ?1, updated_at = ?2 WHERE number = ?3",
        };
        let changed = self
            .conn
            .execute(
                sql,
                params![team, Utc::now().to_rfc3339(), target.match_number],
            )
            .with_context(|| format!("advance {team} into {target}"))?;
        if changed == 0 {
            return Err(ScoringError::MatchNotFound(target.match_number).into());
        }
        debug!(slot = %target, team, "set team slot");
        Ok(())
    }

    pub fn upsert_group_counters(
        &mut self,
        counters: &BTreeMap<u32, GroupCounters>,
    ) -> Result<usize> {
        let now = Utc::now().to_rfc3339();
        let tx = self
            .conn
            .transaction()
            .context("begin group standings transaction")?;
        for (member_id, c) in counters {
            tx.execute(
                r#"
                INSERT INTO standings (
                    member_id, group_home_goals, group_away_goals, group_result,
                    group_perfect_prediction, updated_at
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6)
                ON CONFLICT(member_id) DO UPDATE SET
                    group_home_goals = excluded.group_home_goals,
                    group_away_goals = excluded.group_away_goals,
                    group_result = excluded.group_result,
                    group_perfect_prediction = excluded.group_perfect_prediction,
                    updated_at = excluded.updated_at
                "#,
                params![member_id, c.home_goals, c.away_goals, c.result, c.perfect, now],
            )
            .context("upsert group standings")?;
        }
        tx.commit().context("commit group standings transaction")?;
        Ok(counters.len())
    }

    pub fn upsert_knockout_counts(
        &mut self,
        counts: &BTreeMap<u32, KnockoutCounts>,
    ) -> Result<usize> {
        let now = Utc::now().to_rfc3339();
        let tx = self
            .conn
            .transaction()
            .context("begin knockout standings transaction")?;
        for (member_id, c) in counts {
            tx.execute(
                r#"
                INSERT INTO standings (
                    member_id, round_of_16, quarter_finals, semi_finals, finals, updated_at
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6)
                ON CONFLICT(member_id) DO UPDATE SET
                    round_of_16 = excluded.round_of_16,
                    quarter_finals = excluded.quarter_finals,
                    semi_finals = excluded.semi_finals,
                    finals = excluded.finals,
                    updated_at = excluded.updated_at
                "#,
                params![
                    member_id,
                    c.round_of_16,
                    c.quarter_finals,
                    c.semi_finals,
                    c.finals,
                    now
                ],
            )
            .context("upsert knockout standings")?;
        }
        tx.commit().context("commit knockout standings transaction")?;
        Ok(counts.len())
    }

    pub fn upsert_tournament_winner(&mut self, flags: &BTreeMap<u32, bool>) -> Result<usize> {
        let now = Utc::now().to_rfc3339();
        let tx = self
            .conn
            .transaction()
            .context("begin tournament winner transaction")?;
        for (member_id, picked) in flags {
            tx.execute(
                r#"
                INSERT INTO standings (member_id, tournament_winner, updated_at)
                VALUES (?1, ?2, ?3)
                ON CONFLICT(member_id) DO UPDATE SET
                    tournament_winner = excluded.tournament_winner,
                    updated_at = excluded.updated_at
                "#,
                params![member_id, bool_to_i64(*picked), now],
            )
            .context("upsert tournament winner flag")?;
        }
        tx.commit().context("commit tournament winner transaction")?;
        Ok(flags.len())
    }

    pub fn upsert_fixtures(&mut self, fixtures: &[Fixture]) -> Result<usize> {
        let now = Utc::now().to_rfc3339();
        let tx = self.conn.transaction().context("begin fixtures transaction")?;
        for f in fixtures {
            tx.execute(
                r#"
                INSERT INTO matches (
                    number, home, away, home_goals, away_goals,
                    home_penalties, away_penalties, stage, group_label,
                    next_game, date, time, venue, updated_at
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14)
                ON CONFLICT(number) DO UPDATE SET
                    home = excluded.home,
                    away = excluded.away,
                    home_goals = excluded.home_goals,
                    away_goals = excluded.away_goals,
                    home_penalties = excluded.home_penalties,
                    away_penalties = excluded.away_penalties,
                    stage = excluded.stage,
                    group_label = excluded.group_label,
                    next_game = excluded.next_game,
                    date = excluded.date,
                    time = excluded.time,
                    venue = excluded.venue,
                    updated_at = excluded.updated_at
                "#,
                params![
                    f.number,
                    f.home,
                    f.away,
                    f.home_goals,
                    f.away_goals,
                    f.home_penalties,
                    f.away_penalties,
                    f.stage.label(),
                    f.group,
                    f.next_match.map(|n| n.to_string()),
                    f.date.map(|d| d.format(DATE_FORMAT).to_string()),
                    f.time,
                    f.venue,
                    now,
                ],
            )
            .with_context(|| format!("upsert match {}", f.number))?;
        }
        tx.commit().context("commit fixtures transaction")?;
        Ok(fixtures.len())
    }

    pub fn upsert_predictions(&mut self, predictions: &[Prediction]) -> Result<usize> {
        let now = Utc::now().to_rfc3339();
        let tx = self
            .conn
            .transaction()
            .context("begin predictions transaction")?;
        for p in predictions {
            tx.execute(
                r#"
                INSERT INTO predictions (
                    member_id, match_number, home_goals_prediction, away_goals_prediction,
                    home_team_prediction, away_team_prediction, updated_at
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
                ON CONFLICT(member_id, match_number) DO UPDATE SET
                    home_goals_prediction = excluded.home_goals_prediction,
                    away_goals_prediction = excluded.away_goals_prediction,
                    home_team_prediction = excluded.home_team_prediction,
                    away_team_prediction = excluded.away_team_prediction,
                    updated_at = excluded.updated_at
                "#,
                params![
                    p.member_id,
                    p.match_number,
                    p.home_goals,
                    p.away_goals,
                    p.home_team,
                    p.away_team,
                    now,
                ],
            )
            .context("upsert prediction")?;
        }
        tx.commit().context("commit predictions transaction")?;
        Ok(predictions.len())
    }

    pub fn upsert_members(&mut self, members: &[Member]) -> Result<usize> {
        let tx = self.conn.transaction().context("begin members transaction")?;
        for m in members {
            tx.execute(
                r#"
                INSERT INTO members (id, name, winning_team) VALUES (?1, ?2, ?3)
                ON CONFLICT(id) DO UPDATE SET
                    name = excluded.name,
                    winning_team = excluded.winning_team
                "#,
                params![m.id, m.name, m.winning_team],
            )
            .context("upsert member")?;
        }
        tx.commit().context("commit members transaction")?;
        Ok(members.len())
    }

    pub fn standings_row(&self, member_id: u32) -> Result<Option<StandingsRow>> {
        Ok(self
            .load_standings()?
            .into_iter()
            .find(|row| row.member_id == member_id))
    }
}

pub fn init_schema(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS matches (
            number INTEGER PRIMARY KEY,
            home TEXT NOT NULL,
            away TEXT NOT NULL,
            home_goals INTEGER NULL,
            away_goals INTEGER NULL,
            home_penalties INTEGER NULL,
            away_penalties INTEGER NULL,
            stage TEXT NOT NULL,
            group_label TEXT NULL,
            next_game TEXT NULL,
            date TEXT NULL,
            time TEXT NULL,
            venue TEXT NULL,
            updated_at TEXT NOT NULL
        );
        CREATE INDEX IF NOT EXISTS idx_matches_stage ON matches(stage);
        CREATE INDEX IF NOT EXISTS idx_matches_date ON matches(date);

        CREATE TABLE IF NOT EXISTS members (
            id INTEGER PRIMARY KEY,
            name TEXT NOT NULL,
            winning_team TEXT NULL
        );

        CREATE TABLE IF NOT EXISTS predictions (
            member_id INTEGER NOT NULL,
            match_number INTEGER NOT NULL,
            home_goals_prediction INTEGER NOT NULL,
            away_goals_prediction INTEGER NOT NULL,
            home_team_prediction TEXT NULL,
            away_team_prediction TEXT NULL,
            updated_at TEXT NOT NULL,
            PRIMARY KEY (member_id, match_number)
        );
        CREATE INDEX IF NOT EXISTS idx_predictions_match ON predictions(match_number);

        CREATE TABLE IF NOT EXISTS standings (
            member_id INTEGER PRIMARY KEY,
            group_home_goals INTEGER NOT NULL DEFAULT 0,
            group_away_goals INTEGER NOT NULL DEFAULT 0,
            group_result INTEGER NOT NULL DEFAULT 0,
            group_perfect_prediction INTEGER NOT NULL DEFAULT 0,
            round_of_16 INTEGER NOT NULL DEFAULT 0,
            quarter_finals INTEGER NOT NULL DEFAULT 0,
            semi_finals INTEGER NOT NULL DEFAULT 0,
            finals INTEGER NOT NULL DEFAULT 0,
            tournament_winner INTEGER NOT NULL DEFAULT 0,
            updated_at TEXT NOT NULL
        );
        "#,
    )
    .context("create sqlite schema")?;
    Ok(())
}

struct FixtureRecord {
    number: u32,
    home: String,
    away: String,
    home_goals: Option<i32>,
    away_goals: Option<i32>,
    home_penalties: Option<i32>,
    away_penalties: Option<i32>,
    stage: String,
    group: Option<String>,
    next_game: Option<String>,
    date: Option<String>,
    time: Option<String>,
    venue: Option<String>,
}

impl FixtureRecord {
    fn into_fixture(self) -> Result<Fixture> {
        let stage: Stage = self.stage.parse()?;
        let next_match = self
            .next_game
            .as_deref()
            .filter(|raw| !raw.trim().is_empty())
            .map(str::parse::<NextMatch>)
            .transpose()?;
        let date = self
            .date
            .as_deref()
            .filter(|raw| !raw.trim().is_empty())
            .map(|raw| {
                NaiveDate::parse_from_str(raw.trim(), DATE_FORMAT)
                    .map_err(|err| anyhow!("match {} has bad date {raw:?}: {err}", self.number))
            })
            .transpose()?;
        Ok(Fixture {
            number: self.number,
            home: self.home,
            away: self.away,
            home_goals: self.home_goals,
            away_goals: self.away_goals,
            home_penalties: self.home_penalties,
            away_penalties: self.away_penalties,
            stage,
            group: self.group,
            next_match,
            date,
            time: self.time,
            venue: self.venue,
        })
    }
}

fn bool_to_i64(v: bool) -> i64 {
    if v { 1 } else { 0 }
}
