pub mod cli;
pub mod columns;
pub mod dataset;
pub mod eda;
pub mod error;
pub mod frequency;
pub mod hypothesis;
pub mod io_utils;
pub mod regression;
pub mod schema;
pub mod session;
pub mod stats;
pub mod summary;
pub mod table;

use std::{env, path::Path, sync::OnceLock};

use anyhow::{Context, Result, anyhow};
use clap::Parser;
use log::{LevelFilter, debug, info};
use serde::Serialize;

use crate::{
    cli::{Cli, Commands},
    columns::text_column,
    frequency::FrequencyTable,
    hypothesis::{TestKind, TestOptions, TestRequest, eligible_columns},
    schema::ColumnType,
    session::Session,
    stats::BasicStats,
};

static LOGGER: OnceLock<()> = OnceLock::new();

fn init_logging() {
    LOGGER.get_or_init(|| {
        let mut builder = env_logger::Builder::from_env(env_logger::Env::default());
        if env::var("RUST_LOG").is_err() {
            builder.filter_module("csv_analyst", LevelFilter::Info);
        }
        let _ = builder.format_timestamp_millis().try_init();
    });
}

pub fn run() -> Result<()> {
    init_logging();
    let cli = Cli::parse();
    match cli.command {
        Commands::Profile(args) => handle_profile(&args),
        Commands::Frequency(args) => handle_frequency(&args),
        Commands::Test(args) => handle_test(&args),
        Commands::Plot(args) => handle_plot(&args),
        Commands::Regress(args) => handle_regress(&args),
        Commands::Tests(args) => handle_tests(&args),
    }
}

fn load_session(input: &Path, encoding_label: Option<&str>) -> Result<Session> {
    let encoding = io_utils::resolve_encoding(encoding_label)?;
    info!("Reading '{}' as {}", input.display(), encoding.name());
    let text = io_utils::read_input_text(input, encoding)?;
    let name = io_utils::dataset_name(input);
    let mut session = Session::new();
    session
        .ingest(name.as_deref(), &text)
        .with_context(|| format!("Loading dataset from {input:?}"))?;
    Ok(session)
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ColumnProfile<'a> {
    name: &'a str,
    datatype: ColumnType,
    #[serde(flatten)]
    stats: &'a BasicStats,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct DatasetProfile<'a> {
    file_name: Option<&'a str>,
    row_count: usize,
    columns: Vec<ColumnProfile<'a>>,
}

fn handle_profile(args: &cli::ProfileArgs) -> Result<()> {
    let session = load_session(&args.source.input, args.source.input_encoding.as_deref())?;
    let dataset = session.dataset()?;
    let columns = dataset
        .column_types()
        .map(|(name, datatype)| {
            Ok(ColumnProfile {
                name,
                datatype,
                stats: dataset.basic_stats(name)?,
            })
        })
        .collect::<Result<Vec<_>, error::AnalysisError>>()?;

    if args.json {
        let profile = DatasetProfile {
            file_name: dataset.file_name(),
            row_count: dataset.row_count(),
            columns,
        };
        println!(
            "{}",
            serde_json::to_string_pretty(&profile).context("Serializing profile")?
        );
    } else {
        let headers = [
            "column", "type", "count", "missing", "mean", "median", "std_dev", "min", "max",
            "unique", "top",
        ]
        .into_iter()
        .map(String::from)
        .collect::<Vec<_>>();
        let rows = columns
            .iter()
            .map(|column| {
                let mut row = vec![column.name.to_string(), column.datatype.to_string()];
                row.extend(column.stats.render_cells());
                row
            })
            .collect::<Vec<_>>();
        table::print_table(&headers, &rows);
    }
    if args.overview {
        println!();
        print!("{}", dataset.overview());
    }
    info!(
        "Profiled {} column(s) across {} row(s)",
        dataset.headers().len(),
        dataset.row_count()
    );
    Ok(())
}

fn handle_frequency(args: &cli::FrequencyArgs) -> Result<()> {
    let session = load_session(&args.source.input, args.source.input_encoding.as_deref())?;
    let dataset = session.dataset()?;
    let values = text_column(dataset, &args.column)?;
    let table = FrequencyTable::from_values(values.iter().map(String::as_str));
    if table.is_empty() {
        return Err(anyhow!("Column '{}' has no non-empty values", args.column));
    }
    let headers = vec![args.column.clone(), "count".to_string(), "percent".to_string()];
    table::print_table(&headers, &table.render_rows(args.top));
    info!(
        "Counted {} distinct value(s) in '{}'",
        table.len(),
        args.column
    );
    Ok(())
}

fn handle_test(args: &cli::TestArgs) -> Result<()> {
    let mut session = load_session(&args.source.input, args.source.input_encoding.as_deref())?;
    let options = TestOptions {
        hypothesized_mean: args.mean,
        proportions: args.proportions.clone(),
    };
    let request = TestRequest::build(
        session.dataset()?,
        args.kind,
        &args.var1,
        args.var2.as_deref(),
        &options,
    )?;
    debug!("Test request: {request:?}");
    let result = session
        .run_test(&request)
        .with_context(|| format!("Running {}", args.kind.display_name()))?;
    if args.json {
        println!(
            "{}",
            serde_json::to_string_pretty(&result).context("Serializing test result")?
        );
    } else {
        println!("{}", result.summary);
    }
    if args.show_log {
        println!("\n{}", session.report_context());
    }
    Ok(())
}

fn handle_plot(args: &cli::PlotArgs) -> Result<()> {
    let session = load_session(&args.source.input, args.source.input_encoding.as_deref())?;
    let chart = eda::generate_plot(
        session.dataset()?,
        args.kind,
        &args.var1,
        args.var2.as_deref(),
    )
    .with_context(|| format!("Building {} for '{}'", args.kind, args.var1))?;
    let rendered = if args.pretty {
        serde_json::to_string_pretty(&chart)
    } else {
        serde_json::to_string(&chart)
    }
    .context("Serializing chart configuration")?;
    println!("{rendered}");
    info!("Generated '{}'", chart.title());
    Ok(())
}

fn handle_regress(args: &cli::RegressArgs) -> Result<()> {
    let mut session = load_session(&args.source.input, args.source.input_encoding.as_deref())?;
    let result = session
        .run_regression(&args.predictor, &args.response)
        .with_context(|| {
            format!(
                "Regressing '{}' on '{}'",
                args.response, args.predictor
            )
        })?;
    if args.json {
        println!(
            "{}",
            serde_json::to_string_pretty(&result).context("Serializing regression result")?
        );
    } else {
        println!("{}", result.summary);
    }
    Ok(())
}

fn handle_tests(args: &cli::TestsArgs) -> Result<()> {
    let session = match &args.input {
        Some(input) => Some(load_session(input, args.input_encoding.as_deref())?),
        None => None,
    };
    let dataset = session.as_ref().map(Session::dataset).transpose()?;
    let describe = |role: hypothesis::VariableRole| match dataset {
        Some(dataset) => {
            let eligible = eligible_columns(dataset, role);
            if eligible.is_empty() {
                format!("{} (none)", role.describe())
            } else {
                format!("{}: {}", role.describe(), eligible.join(", "))
            }
        }
        None => role.describe().to_string(),
    };

    let headers = ["test", "name", "var1", "var2"]
        .into_iter()
        .map(String::from)
        .collect::<Vec<_>>();
    let rows = TestKind::ALL
        .iter()
        .map(|kind| {
            let (first, second) = kind.roles();
            vec![
                kind.id().to_string(),
                kind.display_name().to_string(),
                describe(first),
                second.map(describe).unwrap_or_default(),
            ]
        })
        .collect::<Vec<_>>();
    table::print_table(&headers, &rows);
    Ok(())
}
