//! Terminal tables for run results.

use comfy_table::modifiers::{UTF8_ROUND_CORNERS, UTF8_SOLID_INNER_BORDERS};
use comfy_table::presets::{UTF8_FULL, UTF8_FULL_CONDENSED};
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};
use fieldnorm_model::{CleanedTable, ColumnReport, Detection, Report};

/// Failing cells listed before the rest are summarized as a count.
pub const MAX_LISTED_FAILURES: usize = 20;

pub fn detection_label(detection: &Detection) -> String {
    match detection {
        Detection::Override => "configured".to_string(),
        Detection::Detected { ratio, sampled } => {
            format!("detected {:.0}% of {sampled}", ratio * 100.0)
        }
        Detection::Undecided {
            best: Some(kind),
            ratio,
            sampled,
        } => format!("undecided ({kind} {:.0}% of {sampled})", ratio * 100.0),
        Detection::Undecided { best: None, .. } => "undecided".to_string(),
    }
}

/// One row per column: name, kind, detection, ok, failed, empty, passed.
pub fn column_rows(report: &Report) -> Vec<Vec<String>> {
    report.columns.iter().map(column_row).collect()
}

fn column_row(column: &ColumnReport) -> Vec<String> {
    vec![
        column.column.clone(),
        column.kind.to_string(),
        detection_label(&column.detection),
        column.counts.ok.to_string(),
        column.counts.failed.to_string(),
        column.counts.skipped_empty.to_string(),
        column.counts.passed_through.to_string(),
    ]
}

pub fn print_summary(report: &Report) {
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Column"),
        header_cell("Kind"),
        header_cell("Detection"),
        header_cell("OK"),
        header_cell("Failed"),
        header_cell("Empty"),
        header_cell("Passed"),
    ]);
    apply_summary_table_style(&mut table);
    for index in 3..7 {
        align_column(&mut table, index, CellAlignment::Right);
    }
    for (column, row) in report.columns.iter().zip(column_rows(report)) {
        let mut cells: Vec<Cell> = row.into_iter().map(Cell::new).collect();
        if column.counts.failed > 0 {
            cells[4] = Cell::new(column.counts.failed)
                .fg(Color::Red)
                .add_attribute(Attribute::Bold);
        }
        if !column.kind.is_normalized() {
            cells[1] = dim_cell(column.kind);
        }
        table.add_row(cells);
    }
    let summary = &report.summary;
    table.add_row(vec![
        Cell::new("TOTAL")
            .fg(Color::Cyan)
            .add_attribute(Attribute::Bold),
        dim_cell("-"),
        dim_cell("-"),
        Cell::new(summary.total_ok).add_attribute(Attribute::Bold),
        count_cell(summary.total_failed, Color::Red).add_attribute(Attribute::Bold),
        Cell::new(summary.total_skipped_empty).add_attribute(Attribute::Bold),
        Cell::new(summary.total_passed_through).add_attribute(Attribute::Bold),
    ]);
    println!("{table}");
    println!(
        "Reference tables: {} ({})",
        report.reference.version, report.reference.fingerprint
    );
    print_warnings(report);
    print_failures(report);
}

fn print_warnings(report: &Report) {
    for (column, warning) in report.warnings() {
        eprintln!("warning: {column}: {}", warning.message);
    }
}

fn print_failures(report: &Report) {
    if report.summary.total_failed == 0 {
        return;
    }
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Row"),
        header_cell("Column"),
        header_cell("Error"),
        header_cell("Value"),
        header_cell("Reason"),
    ]);
    apply_table_style(&mut table);
    align_column(&mut table, 0, CellAlignment::Right);
    for failure in report.failures().take(MAX_LISTED_FAILURES) {
        table.add_row(vec![
            // 1-based data rows, as a spreadsheet shows them below the header.
            Cell::new(failure.row + 1),
            Cell::new(failure.column),
            Cell::new(failure.kind).fg(Color::Red),
            Cell::new(failure.original),
            dim_cell(failure.reason),
        ]);
    }
    println!("{table}");
    let remaining = report.summary.total_failed.saturating_sub(MAX_LISTED_FAILURES);
    if remaining > 0 {
        println!("... and {remaining} more failing cells (see --report)");
    }
}

/// Prints the first `rows` rows of the cleaned table.
pub fn print_preview(table: &CleanedTable, rows: usize) {
    if rows == 0 || table.column_count() == 0 {
        return;
    }
    let mut preview = Table::new();
    preview.set_header(table.headers().into_iter().map(header_cell));
    apply_table_style(&mut preview);
    for row in table.rows().take(rows) {
        preview.add_row(row);
    }
    println!("{preview}");
    if table.row_count() > rows {
        println!("... {} more rows", table.row_count() - rows);
    }
}

pub fn apply_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_width(120);
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

fn count_cell(count: usize, color: Color) -> Cell {
    if count > 0 {
        Cell::new(count).fg(color)
    } else {
        dim_cell(count)
    }
}

fn dim_cell<T: ToString>(value: T) -> Cell {
    Cell::new(value).fg(Color::DarkGrey)
}
