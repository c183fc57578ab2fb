use comfy_table::modifiers::UTF8_ROUND_CORNERS;
use comfy_table::presets::UTF8_FULL_CONDENSED;
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};

use kpi_common::{format_count, format_percent};
use kpi_report::{
    BenchmarkPanel, ChangeRow, ComparisonTable, ComparisonView, Dashboard, FieldPanel,
    KpiSummary, PanelError,
};

use kpi_cli::types::{GenerationReport, TableStatus};

pub fn print_generation_summary(report: &GenerationReport) {
    println!("Topic: {}", report.topic.title());
    println!("Backend: {}", report.backend);
    println!(
        "Started: {}",
        report
            .started_at
            .to_rfc3339_opts(chrono::SecondsFormat::Secs, true)
    );
    if let Some(path) = &report.script {
        println!("Script: {}", path.display());
    }
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Kind"),
        header_cell("Table"),
        header_cell("Status"),
        header_cell("Time (ms)"),
        header_cell("Detail"),
    ]);
    apply_table_style(&mut table);
    align_column(&mut table, 2, CellAlignment::Center);
    align_column(&mut table, 3, CellAlignment::Right);
    for outcome in &report.outcomes {
        let (status, time, detail) = match &outcome.status {
            TableStatus::Created { duration } => (
                Cell::new("✓").fg(Color::Green).add_attribute(Attribute::Bold),
                Cell::new(duration.as_millis()),
                dim_cell("-"),
            ),
            TableStatus::Skipped { reason } => (
                Cell::new("skipped").fg(Color::Yellow),
                dim_cell("-"),
                dim_cell(reason),
            ),
            TableStatus::Failed { kind, message } => (
                Cell::new("✗").fg(Color::Red).add_attribute(Attribute::Bold),
                dim_cell("-"),
                Cell::new(format!("[{kind}] {message}")).fg(Color::Red),
            ),
        };
        table.add_row(vec![
            Cell::new(outcome.kind.label()),
            Cell::new(&outcome.table.table),
            status,
            time,
            detail,
        ]);
    }
    table.add_row(vec![
        Cell::new("TOTAL")
            .fg(Color::Cyan)
            .add_attribute(Attribute::Bold),
        Cell::new(format!(
            "{} created, {} skipped",
            report.created_count(),
            report.skipped_count()
        ))
        .add_attribute(Attribute::Bold),
        count_cell(report.failed_count(), Color::Red).add_attribute(Attribute::Bold),
        Cell::new(report.elapsed().num_milliseconds()).add_attribute(Attribute::Bold),
        dim_cell("-"),
    ]);
    println!("{table}");
    if report.has_failures() {
        eprintln!("Failed tables:");
        for outcome in report.outcomes.iter().filter(|o| o.is_failure()) {
            eprintln!("- {}", outcome.table);
        }
    }
}

pub fn print_dashboard(dashboard: &Dashboard) {
    match &dashboard.country {
        Some(country) => println!("{} | {country}", dashboard.topic.title()),
        None => println!("{} | all countries", dashboard.topic.title()),
    }
    for panel in &dashboard.panels {
        print_field_panel(panel);
    }
    if let Some(benchmark) = &dashboard.benchmark {
        print_benchmark_panel(benchmark);
    }
    let errors = dashboard.error_count();
    if errors > 0 {
        eprintln!("{errors} table(s) could not be shown");
    }
}

fn print_field_panel(panel: &FieldPanel) {
    println!();
    println!("Field: {}", panel.field);
    if let Some(note) = panel.note {
        println!("Note: {note}");
    }
    match &panel.kpi {
        Ok(summary) => println!("{}", kpi_table(summary)),
        Err(error) => print_panel_error(error),
    }
    match &panel.comparison {
        Ok(Some(view)) => print_comparison_view(view),
        Ok(None) => println!("No values in {}", panel.comparison_table),
        Err(error) => print_panel_error(error),
    }
}

fn print_comparison_view(view: &ComparisonView) {
    let shown = view.top_counts.rows.len();
    println!("Top {shown} values (counts)");
    println!("{}", comparison_table(&view.top_counts, format_count));
    println!("Top {shown} values (percent of shown)");
    println!("{}", comparison_table(&view.top_percentages, format_percent));
    if view.largest_changes.is_empty() {
        println!("No values present in both versions");
    } else {
        println!("Largest changes");
        println!("{}", changes_table(&view.top_counts, &view.largest_changes));
    }
}

fn print_benchmark_panel(panel: &BenchmarkPanel) {
    println!();
    println!("{}", panel.title);
    match &panel.table {
        Ok(Some(table)) => println!("{}", comparison_table(table, format_percent)),
        Ok(None) => println!("No values in {}", panel.table_name),
        Err(error) => print_panel_error(error),
    }
}

fn print_panel_error(error: &PanelError) {
    let kind = error.kind.map_or("layout", |kind| kind.as_str());
    println!("✗ [{kind}] {error}");
}

fn kpi_table(summary: &KpiSummary) -> Table {
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Source"),
        header_cell("Coverage"),
        header_cell("Profiles"),
    ]);
    apply_table_style(&mut table);
    align_column(&mut table, 1, CellAlignment::Right);
    align_column(&mut table, 2, CellAlignment::Right);
    for metric in &summary.metrics {
        table.add_row(vec![
            Cell::new(&metric.label),
            Cell::new(format_percent(metric.coverage)),
            Cell::new(format_count(metric.profiles)),
        ]);
    }
    table
}

fn comparison_table(data: &ComparisonTable, format: fn(f64) -> String) -> Table {
    let mut table = Table::new();
    let mut header = vec![header_cell("Value")];
    header.extend(data.columns.iter().map(|c| header_cell(&c.label)));
    table.set_header(header);
    apply_table_style(&mut table);
    for idx in 0..data.columns.len() {
        align_column(&mut table, idx + 1, CellAlignment::Right);
    }
    for row in &data.rows {
        let mut cells = vec![value_cell(row.value.as_deref())];
        cells.extend(row.values.iter().map(|v| Cell::new(format(*v))));
        table.add_row(cells);
    }
    table
}

fn changes_table(counts: &ComparisonTable, rows: &[ChangeRow]) -> Table {
    let label = |idx: usize| {
        counts
            .columns
            .get(idx)
            .map_or_else(String::new, |c| c.label.clone())
    };
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Value"),
        header_cell(&label(0)),
        header_cell(&label(1)),
        header_cell("Change"),
    ]);
    apply_table_style(&mut table);
    for idx in 1..4 {
        align_column(&mut table, idx, CellAlignment::Right);
    }
    for row in rows {
        table.add_row(vec![
            Cell::new(&row.category),
            Cell::new(format_count(row.base)),
            Cell::new(format_count(row.new)),
            change_cell(row.pct_change),
        ]);
    }
    table
}

fn change_cell(change: Option<f64>) -> Cell {
    match change {
        Some(value) if value > 0.0 => Cell::new(format!("+{}", format_percent(value))).fg(Color::Green),
        Some(value) if value < 0.0 => Cell::new(format_percent(value)).fg(Color::Red),
        Some(value) => dim_cell(format_percent(value)),
        None => dim_cell("-"),
    }
}

fn value_cell(value: Option<&str>) -> Cell {
    match value {
        Some(value) => Cell::new(value),
        None => dim_cell(kpi_report::NULL_LABEL),
    }
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

fn align_column(table: &mut Table, index: usize, alignment: CellAlignment) {
    if let Some(column) = table.column_mut(index) {
        column.set_cell_alignment(alignment);
    }
}

pub fn header_cell(label: &str) -> Cell {
    Cell::new(label)
        .fg(Color::Cyan)
        .add_attribute(Attribute::Bold)
}

pub fn dim_cell<T: ToString>(value: T) -> Cell {
    Cell::new(value.to_string()).fg(Color::DarkGrey)
}
