use comfy_table::modifiers::{UTF8_ROUND_CORNERS, UTF8_SOLID_INNER_BORDERS};
use comfy_table::presets::{UTF8_FULL, UTF8_FULL_CONDENSED};
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};

use seo_cli::pipeline::AuditOutcome;
use seo_report::DashboardStatus;

pub fn print_summary(outcome: &AuditOutcome) {
    let summary = &outcome.summary;
    println!("Source: {}", outcome.source.display());
    println!("Run at: {}", outcome.run_at.format("%Y-%m-%d %H:%M:%S"));
    match &outcome.written {
        Some(written) => {
            println!("Output: {}", outcome.output_dir.display());
            println!("Workbook: {}", written.workbook.display());
            match written.dashboard_status {
                DashboardStatus::Rendered => {
                    println!("Dashboard: {}", written.dashboard.display());
                }
                DashboardStatus::ErrorNotice => {
                    eprintln!("Dashboard: error notice at {}", written.dashboard.display());
                }
            }
            println!("Files written: {}", written.file_count);
        }
        None => println!("Dry run: no files written"),
    }

    let mut totals = Table::new();
    totals.set_header(vec![header_cell("Metric"), header_cell("Value")]);
    apply_table_style(&mut totals);
    align_column(&mut totals, 1, CellAlignment::Right);
    totals.add_row(vec![Cell::new("Input rows"), Cell::new(summary.input_rows)]);
    totals.add_row(vec![Cell::new("Total URLs"), Cell::new(summary.total_urls)]);
    totals.add_row(vec![Cell::new("HTML URLs"), Cell::new(summary.html_urls)]);
    totals.add_row(vec![
        Cell::new("Avg response time (s)"),
        match summary.avg_response_time {
            Some(value) => Cell::new(format!("{value:.3}")),
            None => dim_cell("-"),
        },
    ]);
    totals.add_row(vec![
        Cell::new("Duplicate rows dropped"),
        count_cell(summary.duplicate_rows, Color::Yellow),
    ]);
    totals.add_row(vec![
        Cell::new("Rows without address"),
        count_cell(summary.keyless_rows, Color::Yellow),
    ]);
    totals.add_row(vec![
        Cell::new("Cells coerced to missing"),
        count_cell(summary.coerced_cells, Color::Yellow),
    ]);
    println!("{totals}");

    let mut rules = Table::new();
    rules.set_header(vec![
        header_cell("Rule"),
        header_cell("Name"),
        header_cell("Matched"),
    ]);
    apply_summary_table_style(&mut rules);
    align_column(&mut rules, 2, CellAlignment::Right);
    for rule in &summary.rules {
        rules.add_row(vec![
            Cell::new(&rule.id).fg(Color::Blue).add_attribute(Attribute::Bold),
            Cell::new(&rule.name),
            count_cell(rule.matched, Color::Yellow),
        ]);
    }
    println!("{rules}");
}

fn count_cell(count: usize, color: Color) -> Cell {
    if count > 0 {
        Cell::new(count).fg(color).add_attribute(Attribute::Bold)
    } else {
        dim_cell(count)
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
        .set_content_arrangement(ContentArrangement::DynamicFullWidth)
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
