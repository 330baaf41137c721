use std::path::Path;

use anyhow::{Context, Result};
use rust_xlsxwriter::{Workbook, Worksheet};

use crate::engine::Leaderboard;
use crate::model::Stage;
use crate::standings::StandingEntry;

pub struct ExportReport {
    pub rows: usize,
    pub columns: usize,
}

/// Header and cell rows for the leaderboard, with knockout columns limited to the
/// stages that have started.
pub fn standings_rows(board: &Leaderboard) -> Vec<Vec<String>> {
    let mut header = vec![
        "Position".to_string(),
        "Name".to_string(),
        "Group Goals".to_string(),
        "Group Result".to_string(),
        "Group Perfect".to_string(),
    ];
    header.extend(board.started_stages.iter().map(|stage| stage.label().to_string()));
    header.push("Total".to_string());

    let mut rows = vec![header];
    rows.extend(
        board
            .entries
            .iter()
            .map(|entry| entry_row(entry, &board.started_stages)),
    );
    rows
}

pub fn export_standings(path: &Path, board: &Leaderboard) -> Result<ExportReport> {
    let rows = standings_rows(board);
    let mut workbook = Workbook::new();
    {
        let sheet = workbook.add_worksheet();
        sheet.set_name("Standings")?;
        write_rows(sheet, &rows)?;
    }
    workbook
        .save(path)
        .with_context(|| format!("failed writing workbook to {}", path.display()))?;

    Ok(ExportReport {
        rows: rows.len().saturating_sub(1),
        columns: rows.first().map(Vec::len).unwrap_or_default(),
    })
}

fn entry_row(entry: &StandingEntry, stages: &[Stage]) -> Vec<String> {
    let mut row = vec![
        entry.position.to_string(),
        entry.name.clone(),
        entry.group_goals.to_string(),
        entry.group_result.to_string(),
        entry.group_perfect.to_string(),
    ];
    row.extend(stages.iter().map(|stage| entry.stage_count(*stage).to_string()));
    row.push(entry.total.to_string());
    row
}

fn write_rows(worksheet: &mut Worksheet, rows: &[Vec<String>]) -> Result<()> {
    for (row_idx, row) in rows.iter().enumerate() {
        for (col_idx, value) in row.iter().enumerate() {
            worksheet
                .write_string(row_idx as u32, col_idx as u16, value)
                .with_context(|| format!("write cell ({row_idx},{col_idx})"))?;
        }
    }
    Ok(())
}
