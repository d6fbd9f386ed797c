use comfy_table::modifiers::UTF8_ROUND_CORNERS;
use comfy_table::presets::UTF8_FULL_CONDENSED;
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};

use crate::types::{PlatformSummary, SyncResult};

pub fn print_summary(result: &SyncResult) {
    println!("Project root: {}", result.project_root.display());
    println!("Locales: {}", format_locales(&result.locales));

    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Platform"),
        header_cell("Status"),
        header_cell("Locales"),
        header_cell("Files"),
        header_cell("Project"),
        header_cell("Errors"),
    ]);
    apply_table_style(&mut table);
    align_column(&mut table, 2, CellAlignment::Right);
    align_column(&mut table, 3, CellAlignment::Right);
    align_column(&mut table, 4, CellAlignment::Center);
    align_column(&mut table, 5, CellAlignment::Right);

    for summary in &result.platforms {
        table.add_row(vec![
            Cell::new(summary.platform.to_string())
                .fg(Color::Blue)
                .add_attribute(Attribute::Bold),
            status_cell(summary),
            Cell::new(summary.locales_applied),
            Cell::new(summary.files_written),
            project_cell(summary.project_synchronized),
            error_count_cell(summary.errors.len()),
        ]);
    }
    println!("{table}");

    if !result.ingest_errors.is_empty() {
        eprintln!("Skipped locale files:");
        for error in &result.ingest_errors {
            eprintln!("- {error}");
        }
    }
    for summary in &result.platforms {
        if summary.errors.is_empty() {
            continue;
        }
        eprintln!("{} errors:", summary.platform);
        for error in &summary.errors {
            eprintln!("- {error}");
        }
    }
}

fn format_locales(locales: &[String]) -> String {
    if locales.is_empty() {
        "(none)".to_string()
    } else {
        locales.join(", ")
    }
}

fn status_cell(summary: &PlatformSummary) -> Cell {
    if summary.skipped.is_some() {
        Cell::new("skipped").fg(Color::DarkGrey)
    } else if summary.errors.is_empty() {
        Cell::new("updated")
            .fg(Color::Green)
            .add_attribute(Attribute::Bold)
    } else {
        Cell::new("failed").fg(Color::Red).add_attribute(Attribute::Bold)
    }
}

fn project_cell(synchronized: Option<bool>) -> Cell {
    match synchronized {
        Some(true) => Cell::new("✓")
            .fg(Color::Green)
            .add_attribute(Attribute::Bold),
        Some(false) => Cell::new("✗").fg(Color::Red),
        None => dim_cell("-"),
    }
}

fn error_count_cell(count: usize) -> Cell {
    if count > 0 {
        Cell::new(count).fg(Color::Red).add_attribute(Attribute::Bold)
    } else {
        dim_cell(count)
    }
}

fn apply_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_width(100);
}

fn align_column(table: &mut Table, index: usize, alignment: CellAlignment) {
    if let Some(column) = table.column_mut(index) {
        column.set_cell_alignment(alignment);
    }
}

fn header_cell(label: &str) -> Cell {
    Cell::new(label)
        .fg(Color::Cyan)
        .add_attribute(Attribute::Bold)
}

fn dim_cell<T: ToString>(value: T) -> Cell {
    Cell::new(value).fg(Color::DarkGrey)
}
