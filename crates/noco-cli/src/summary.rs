use comfy_table::modifiers::{UTF8_ROUND_CORNERS, UTF8_SOLID_INNER_BORDERS};
use comfy_table::presets::UTF8_FULL;
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};

use noco_cli::{CloneReport, InsertMode};

pub fn print_summary(report: &CloneReport) {
    println!("Source: {}", report.source);
    println!("Target: {}", report.target);

    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Step"),
        header_cell("Count"),
        header_cell("Details"),
    ]);
    apply_summary_table_style(&mut table);
    align_column(&mut table, 1, CellAlignment::Right);

    let deletions = &report.deletions;
    table.add_row(vec![
        Cell::new("Rows deleted"),
        count_cell(deletions.rows_deleted),
        dim_cell("-"),
    ]);
    table.add_row(vec![
        Cell::new("Columns deleted"),
        count_cell(deletions.columns_deleted),
        dim_cell("-"),
    ]);
    table.add_row(vec![
        Cell::new("Columns skipped"),
        count_cell(report.skipped_columns.len()),
        list_cell(&report.skipped_columns),
    ]);
    table.add_row(vec![
        Cell::new("Columns created"),
        count_cell(report.created_columns.len()),
        list_cell(&report.created_columns),
    ]);
    if !report.timestamp_columns.is_empty() {
        table.add_row(vec![
            Cell::new("Timestamp columns"),
            count_cell(report.timestamp_columns.len()),
            list_cell(&report.timestamp_columns),
        ]);
    }
    table.add_row(vec![
        Cell::new("Rows fetched"),
        count_cell(report.rows_fetched),
        match report.counts.source_reported {
            Some(total) if report.source_count_mismatch() => {
                warn_cell(format!("source reports {total}"))
            }
            _ => dim_cell("-"),
        },
    ]);
    table.add_row(vec![
        Cell::new("Rows inserted")
            .fg(Color::Cyan)
            .add_attribute(Attribute::Bold),
        Cell::new(report.write.inserted).add_attribute(Attribute::Bold),
        mode_cell(report.write.mode),
    ]);
    table.add_row(vec![
        Cell::new("Target total rows"),
        match report.counts.target_after {
            Some(total) if report.target_count_mismatch() => warn_cell(total),
            Some(total) => Cell::new(total),
            None => dim_cell("?"),
        },
        match report.expected_target_rows() {
            Some(expected) => dim_cell(format!("expected {expected}")),
            None => dim_cell("pageInfo.totalRows"),
        },
    ]);
    println!("{table}");

    if report.has_warnings() {
        eprintln!("Warnings:");
    }
    if report.source_count_mismatch() {
        eprintln!(
            "- fetched {} source rows, source reports {}",
            report.rows_fetched,
            report.counts.source_reported.unwrap_or_default()
        );
    }
    if report.target_count_mismatch() {
        eprintln!(
            "- target reports {} rows, expected {}",
            report.counts.target_after.unwrap_or_default(),
            report.expected_target_rows().unwrap_or_default()
        );
    }
    for failure in &deletions.failures {
        eprintln!(
            "- could not delete {} {}: {}",
            failure.kind.as_str(),
            failure.item,
            failure.error
        );
    }
}

fn apply_summary_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .apply_modifier(UTF8_SOLID_INNER_BORDERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_width(120);
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

fn count_cell(count: usize) -> Cell {
    if count > 0 {
        Cell::new(count)
    } else {
        dim_cell(count)
    }
}

fn list_cell(titles: &[String]) -> Cell {
    if titles.is_empty() {
        dim_cell("-")
    } else {
        Cell::new(titles.join(", "))
    }
}

fn mode_cell(mode: InsertMode) -> Cell {
    match mode {
        InsertMode::Bulk => Cell::new(mode.as_str()).fg(Color::Green),
        InsertMode::PerRow => Cell::new(mode.as_str()).fg(Color::Yellow),
        InsertMode::Skipped => dim_cell(mode.as_str()),
    }
}

fn warn_cell<T: ToString>(value: T) -> Cell {
    Cell::new(value)
        .fg(Color::Yellow)
        .add_attribute(Attribute::Bold)
}

fn dim_cell<T: ToString>(value: T) -> Cell {
    Cell::new(value).fg(Color::DarkGrey)
}
