use std::path::PathBuf;

use anyhow::{Context, Result, anyhow, bail};
use chrono::{Local, NaiveDate};

use prediction_pool::config::{PoolConfig, init_logging};
use prediction_pool::engine::{
    Leaderboard, PassOutcome, ResultEntry, ScoringContext, leaderboard, recompute_all,
    record_result,
};
use prediction_pool::export::{export_standings, standings_rows};
use prediction_pool::import::{import_tournament, load_tournament_file};
use prediction_pool::model::{Fixture, Score};
use prediction_pool::report::{PredictionRow, find_member, member_predictions};
use prediction_pool::schedule::{matches_on, played_matches};

const USAGE: &str = "usage: pool_admin [--db PATH] <command>

commands:
  import <tournament.json>          upsert members, matches and predictions
  record <match> <h-a> [<ph-pa>]    record a result (penalties optional) and rescore
  recompute                         rebuild every standings row
  standings [--json]                print the leaderboard
  played [YYYY-MM-DD]               list matches on or before a date
  today [YYYY-MM-DD]                list the day's matches by kickoff
  predictions <member>              one member's predictions (id or name)
  export <file.xlsx>                write the leaderboard to a workbook";

fn main() -> Result<()> {
    let mut config = PoolConfig::from_env()?;
    init_logging(&config.log_filter);

    let (db_override, args) = split_db_arg(std::env::args().skip(1).collect());
    if let Some(path) = db_override {
        config.db_path = path;
    }
    let Some((command, rest)) = args.split_first() else {
        println!("{USAGE}");
        return Ok(());
    };

    let mut ctx = ScoringContext::open(&config)?;
    match command.as_str() {
        "import" => {
            let path = rest.first().context("import needs a tournament file")?;
            let seed = load_tournament_file(&PathBuf::from(path))?;
            let summary = import_tournament(&mut ctx, &seed)?;
            println!("Import complete");
            println!("DB: {}", config.db_path.display());
            println!("Members: {}", summary.members);
            println!("Matches: {}", summary.matches);
            println!("Predictions: {}", summary.predictions);
        }
        "record" => {
            let entry = parse_record_args(rest)?;
            match record_result(&mut ctx, entry)? {
                PassOutcome::GroupRecomputed { members } => {
                    println!("Group standings recomputed for {members} members");
                }
                PassOutcome::WinnerAdvanced { advancement, .. } => {
                    println!(
                        "{} advances from match {} into {}",
                        advancement.team, advancement.from_match, advancement.target
                    );
                }
                PassOutcome::ChampionDecided {
                    champion,
                    members,
                    correct_picks,
                } => {
                    println!("Champion: {champion}");
                    println!("Correct picks: {correct_picks}/{members}");
                }
            }
        }
        "recompute" => {
            let summary = recompute_all(&mut ctx)?;
            println!("Group rows: {}", summary.group_rows);
            println!("Knockout rows: {}", summary.knockout_rows);
            if let Some(champion) = summary.champion {
                println!("Champion: {champion}");
            }
        }
        "standings" => {
            let board = leaderboard(&mut ctx)?;
            if rest.iter().any(|arg| arg == "--json") {
                let json = serde_json::to_string_pretty(&board.entries)
                    .context("serialize standings")?;
                println!("{json}");
            } else {
                print_leaderboard(&board);
            }
        }
        "played" => {
            let today = parse_day(rest.first())?;
            let snapshot = ctx.snapshot()?;
            for fixture in played_matches(&snapshot.fixtures, today) {
                let date = fixture.date.map(|d| d.to_string()).unwrap_or_default();
                println!(
                    "#{:<3} {date}: {} vs {} ({})",
                    fixture.number,
                    fixture.home,
                    fixture.away,
                    score_cell(fixture.score())
                );
            }
        }
        "today" => {
            let day = parse_day(rest.first())?;
            let snapshot = ctx.snapshot()?;
            let fixtures = matches_on(&snapshot.fixtures, day);
            if fixtures.is_empty() {
                println!("No matches on {day}");
            }
            for fixture in fixtures {
                print_fixture_line(fixture);
            }
        }
        "predictions" => {
            let key = rest.first().context("predictions needs a member id or name")?;
            let snapshot = ctx.snapshot()?;
            let member = find_member(&snapshot.members, key)
                .with_context(|| format!("no member matching {key:?}"))?;
            println!("Predictions for {}", member.name);
            for row in member_predictions(snapshot, member.id)? {
                print_prediction_row(&row);
            }
        }
        "export" => {
            let path = rest.first().context("export needs an output path")?;
            let board = leaderboard(&mut ctx)?;
            let report = export_standings(&PathBuf::from(path), &board)?;
            println!("Exported {} rows to {path}", report.rows);
        }
        other => {
            bail!("unknown command {other:?}\n\n{USAGE}");
        }
    }
    Ok(())
}

fn split_db_arg(args: Vec<String>) -> (Option<PathBuf>, Vec<String>) {
    let mut db = None;
    let mut rest = Vec::new();
    let mut iter = args.into_iter();
    while let Some(arg) = iter.next() {
        if let Some(path) = arg.strip_prefix("--db=") {
            let trimmed = path.trim();
            if !trimmed.is_empty() {
                db = Some(PathBuf::from(trimmed));
            }
            continue;
        }
        if arg == "--db" {
            if let Some(next) = iter.next()
                && !next.trim().is_empty()
            {
                db = Some(PathBuf::from(next));
            }
            continue;
        }
        rest.push(arg);
    }
    (db, rest)
}

fn parse_record_args(args: &[String]) -> Result<ResultEntry> {
    let [number, score, tail @ ..] = args else {
        return Err(anyhow!("record needs <match> <h-a>"));
    };
    let number = number
        .trim()
        .parse::<u32>()
        .with_context(|| format!("bad match number {number:?}"))?;
    let score: Score = score.parse()?;
    let mut entry = ResultEntry::new(number, score.home, score.away);
    if let Some(raw) = tail.first() {
        let pens: Score = raw.parse()?;
        entry = entry.with_penalties(pens.home, pens.away);
    }
    Ok(entry)
}

fn parse_day(raw: Option<&String>) -> Result<NaiveDate> {
    match raw {
        Some(raw) => NaiveDate::parse_from_str(raw, "%Y-%m-%d")
            .with_context(|| format!("bad date {raw:?}")),
        None => Ok(Local::now().date_naive()),
    }
}

fn score_cell(score: Option<Score>) -> String {
    score
        .map(|s| format!("{} : {}", s.home, s.away))
        .unwrap_or_else(|| "-".to_string())
}

fn print_fixture_line(fixture: &Fixture) {
    let stage = match fixture.group.as_deref() {
        Some(group) => format!("{} {group}", fixture.stage),
        None => fixture.stage.to_string(),
    };
    println!(
        "{:>5}  {} {:>5} {}  [{stage}] {}",
        fixture.time.as_deref().unwrap_or("--:--"),
        fixture.home,
        score_cell(fixture.score()),
        fixture.away,
        fixture.venue.as_deref().unwrap_or_default()
    );
}

fn print_prediction_row(row: &PredictionRow) {
    let marks = match row.outcome {
        Some(flags) if flags.perfect => "perfect",
        Some(flags) if flags.result_match => "result",
        Some(flags) if flags.home_goals_exact || flags.away_goals_exact => "goals",
        Some(_) => "miss",
        None => "",
    };
    let teams = match (&row.home_team_prediction, &row.away_team_prediction) {
        (Some(home), Some(away)) => {
            let tag = if row.both_teams_match() {
                " (both teams)"
            } else if row.home_team_match || row.away_team_match {
                " (one team)"
            } else {
                ""
            };
            format!("{home} v {away}{tag}")
        }
        _ => String::new(),
    };
    println!(
        "#{:<3} {:<16} {} vs {}  actual {:>5}  predicted {} : {}  {marks:<7} {teams}",
        row.match_number,
        row.stage,
        row.home,
        row.away,
        score_cell(row.actual),
        row.predicted.home,
        row.predicted.away
    );
}

fn print_leaderboard(board: &Leaderboard) {
    for row in standings_rows(board) {
        let cells: Vec<String> = row
            .iter()
            .enumerate()
            .map(|(idx, cell)| {
                if idx == 1 {
                    format!("{cell:<20}")
                } else {
                    format!("{cell:>8}")
                }
            })
            .collect();
        println!("{}", cells.join(" "));
    }
}
