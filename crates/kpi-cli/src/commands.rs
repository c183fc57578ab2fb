use std::num::NonZeroUsize;
use std::path::Path;

use anyhow::{Context, Result};
use comfy_table::{Cell, Table};
use kpi_model::{ComparisonConfig, TableKind, Topic, TopicSpec};
use kpi_report::{Dashboard, ReportOptions, ReportScope, export_dashboard, read_scope};
use kpi_sql::{GenerationPlan, PlanEntry, PlanOptions, TopN, plan_topic};
use kpi_warehouse::{
    ScriptWarehouse, SnapshotWarehouse, SqlApiConfig, SqlApiWarehouse, Warehouse, token_from_env,
};
use tracing::{info, info_span};

use kpi_cli::pipeline::{execute_plan, plan_progress};
use kpi_cli::types::GenerationReport;

use crate::cli::{GenerateArgs, ReportArgs, ScopeArgs, SqlArgs, TablesArgs};
use crate::summary::{apply_table_style, dim_cell, header_cell};

pub fn load_config(path: Option<&Path>) -> Result<ComparisonConfig> {
    let config = ComparisonConfig::load_or_default(path).with_context(|| match path {
        Some(path) => format!("load configuration {}", path.display()),
        None => "load default configuration".to_string(),
    })?;
    Ok(config)
}

pub fn run_generate(args: &GenerateArgs, config: &ComparisonConfig) -> Result<GenerationReport> {
    let topic = args.scope.topic;
    let span = info_span!("generate", topic = %topic);
    let _guard = span.enter();

    let plan = build_plan(&args.scope, config)?;
    info!(
        statements = plan.ready_count(),
        skipped = plan.entries.len() - plan.ready_count(),
        schema = %config.schema(),
        "plan ready"
    );

    let mut script_path = None;
    let warehouse: Box<dyn Warehouse> = match &args.dry_run {
        Some(dir) => {
            let script = ScriptWarehouse::create(dir, &format!("{}.sql", topic.as_str()))
                .with_context(|| format!("create dry-run script in {}", dir.display()))?;
            script_path = Some(script.path().to_path_buf());
            Box::new(script)
        }
        None => Box::new(connect(config)?),
    };

    let progress = plan_progress(&plan);
    let mut report = execute_plan(warehouse.as_ref(), topic, &plan, &progress);
    report.script = script_path;
    Ok(report)
}

pub fn run_report(args: &ReportArgs, config: &ComparisonConfig) -> Result<Dashboard> {
    let span = info_span!("report", topic = %args.topic);
    let _guard = span.enter();

    let scope = ReportScope::resolve(config, args.topic, args.country.as_deref(), &args.fields)
        .context("resolve report scope")?;
    let warehouse: Box<dyn Warehouse> = match &args.snapshot_dir {
        Some(dir) => Box::new(
            SnapshotWarehouse::open(dir)
                .with_context(|| format!("open snapshot {}", dir.display()))?,
        ),
        None => Box::new(connect(config)?),
    };
    let top_n = args.top_n.map_or(config.top_n, NonZeroUsize::get);
    let dashboard = read_scope(warehouse.as_ref(), config, scope, ReportOptions::new(top_n));

    if let Some(dir) = &args.export {
        let written = export_dashboard(&dashboard, dir)
            .with_context(|| format!("export panels to {}", dir.display()))?;
        for path in &written {
            info!(path = %path.display(), "panel exported");
        }
    }
    Ok(dashboard)
}

pub fn run_sql(args: &SqlArgs, config: &ComparisonConfig) -> Result<()> {
    let plan = build_plan(&args.scope, config)?;
    for entry in &plan.entries {
        match entry {
            PlanEntry::Ready(planned) => {
                println!("-- {} ({})", planned.table, planned.kind.label());
                println!("{};", planned.statement.trim_end());
                println!();
            }
            PlanEntry::Skipped(skipped) => {
                println!("-- skipped {}: {}", skipped.table, skipped.reason);
                println!();
            }
        }
    }
    Ok(())
}

pub fn run_tables(args: &TablesArgs, config: &ComparisonConfig) -> Result<()> {
    let plan = build_plan(&args.scope, config)?;
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Kind"),
        header_cell("Table"),
        header_cell("Status"),
    ]);
    apply_table_style(&mut table);
    for entry in &plan.entries {
        let row = match entry {
            PlanEntry::Ready(planned) => vec![
                Cell::new(planned.kind.label()),
                Cell::new(planned.table.to_string()),
                Cell::new("planned"),
            ],
            PlanEntry::Skipped(skipped) => vec![
                Cell::new(skipped.kind.label()),
                Cell::new(skipped.table.to_string()),
                dim_cell(format!("skipped: {}", skipped.reason)),
            ],
        };
        table.add_row(row);
    }
    println!("{table}");
    Ok(())
}

pub fn run_topics(config: &ComparisonConfig) -> Result<()> {
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Topic"),
        header_cell("Source"),
        header_cell("Benchmark"),
        header_cell("Fields"),
    ]);
    apply_table_style(&mut table);
    for topic in Topic::ALL {
        let spec = TopicSpec::resolve(config, topic)
            .with_context(|| format!("resolve topic {topic}"))?;
        let fields: Vec<&str> = topic.fields().iter().map(|f| f.column_name()).collect();
        table.add_row(vec![
            Cell::new(topic.as_str()),
            Cell::new(config.version_source(&config.versions.new, topic)),
            match spec.benchmark_alias() {
                Some(alias) => Cell::new(alias),
                None => dim_cell("-"),
            },
            Cell::new(fields.join("\n")),
        ]);
    }
    println!("{table}");
    Ok(())
}

fn build_plan(scope: &ScopeArgs, config: &ComparisonConfig) -> Result<GenerationPlan> {
    let spec = TopicSpec::resolve(config, scope.topic)
        .with_context(|| format!("resolve topic {}", scope.topic))?;
    let countries = if scope.all_countries {
        config.countries.clone()
    } else {
        scope
            .countries
            .iter()
            .map(|country| config.resolve_country(country).map(String::from))
            .collect::<Result<Vec<_>, _>>()
            .context("resolve countries")?
    };
    let kinds = if scope.kinds.is_empty() {
        TableKind::ALL.to_vec()
    } else {
        scope.kinds.iter().map(|kind| TableKind::from(*kind)).collect()
    };
    let top_n = TopN::new(scope.top_n.map_or(config.top_n, NonZeroUsize::get))
        .ranked_by(scope.rank_by.into());
    let options = PlanOptions::new(top_n)
        .with_fields(scope.fields.clone())
        .with_countries(countries)
        .with_kinds(kinds);
    plan_topic(config, &spec, &options).context("plan statements")
}

fn connect(config: &ComparisonConfig) -> Result<SqlApiWarehouse> {
    let token = token_from_env().context("warehouse credentials")?;
    let settings = SqlApiConfig::from_settings(&config.warehouse, config.schema(), token)
        .context("warehouse settings")?;
    SqlApiWarehouse::connect(settings).context("connect to warehouse")
}
