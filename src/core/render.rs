use std::fmt::Write;

use crate::core::state::{TableView, ViewModel};
use crate::domain::model::Row;

const PROGRESS_BAR_WIDTH: usize = 20;

pub fn progress_bar(progress: u8) -> String {
    let filled = usize::from(progress.min(100)) * PROGRESS_BAR_WIDTH / 100;
    format!(
        "[{}{}] {}%",
        "#".repeat(filled),
        " ".repeat(PROGRESS_BAR_WIDTH - filled),
        progress
    )
}

/// Header line plus one line per row, columns padded to the widest cell.
pub fn render_table(headers: &[String], rows: &[Row]) -> String {
    let mut widths: Vec<usize> = headers.iter().map(|h| h.chars().count()).collect();
    for row in rows {
        for (idx, width) in widths.iter_mut().enumerate() {
            let len = row.cell(idx).map_or(0, |c| c.chars().count());
            *width = (*width).max(len);
        }
    }

    let format_line = |cells: Vec<&str>| -> String {
        cells
            .iter()
            .zip(&widths)
            .map(|(cell, width)| format!("{:<width$}", cell, width = *width))
            .collect::<Vec<_>>()
            .join(" | ")
            .trim_end()
            .to_string()
    };

    let mut out = String::new();
    let _ = writeln!(out, "{}", format_line(headers.iter().map(String::as_str).collect()));
    let _ = writeln!(
        out,
        "{}",
        widths.iter().map(|w| "-".repeat(*w)).collect::<Vec<_>>().join("-+-")
    );
    for row in rows {
        let cells = (0..headers.len()).map(|idx| row.cell(idx).unwrap_or("")).collect();
        let _ = writeln!(out, "{}", format_line(cells));
    }
    out
}

/// Plain-text frame: error banner, search hint, progress, pager, table.
pub fn render_text(view: &ViewModel) -> String {
    let mut out = String::new();

    if let Some(error) = view.file_error {
        let _ = writeln!(out, "! {}", error);
    }
    if view.show_search {
        let _ = writeln!(out, "Search: {}", view.search_term);
    }
    if view.progress > 0 {
        let _ = writeln!(out, "{}", progress_bar(view.progress));
    }
    if let Some(pagination) = &view.pagination {
        let _ = writeln!(out, "{}", pagination.to_text());
    }

    match &view.table {
        TableView::Page { headers, rows, .. } => out.push_str(&render_table(headers, rows)),
        TableView::NoMatches { term } => {
            let _ = writeln!(out, "No matching records for '{}'", term);
        }
        TableView::NoRecords => {
            let _ = writeln!(out, "No Records");
        }
    }
    out
}
