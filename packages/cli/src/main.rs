#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! CLI entry point for the municipal risk engine.
//!
//! Reads a JSON row payload (a bare array or `{"resultados": [...]}`) from
//! a file or stdin, runs one of the engine's computations, and prints the
//! resulting view-model as JSON on stdout. Logs go to stderr through
//! `pretty_env_logger`, filtered by `RUST_LOG`.

mod input;

use std::path::PathBuf;
use std::str::FromStr as _;

use clap::{Args, Parser, Subcommand};
use serde::Serialize;
use urbanik_risk::{
    IncidentFilter, ReportSelection, RiskConfig, RiskInput, RiskReport, aggregate_by_municipio,
    age_group_breakdown_for, heatmap_points, incident_rows, municipio_detail, rank_municipios,
    scored_rows,
};
use urbanik_risk_models::{IncidentRow, RankingStrategy, ScoredRow, TieBreak};

#[derive(Parser)]
#[command(name = "urbanik_cli", about = "Municipal crime risk aggregation tool")]
struct Cli {
    /// TOML config file (overrides the `URBANIK_RISK_CONFIG` env var)
    #[arg(long)]
    config: Option<PathBuf>,
    /// JSON payload file; reads stdin when omitted or "-"
    #[arg(long, short)]
    input: Option<PathBuf>,
    /// Pretty-print the JSON output
    #[arg(long)]
    pretty: bool,
    #[command(flatten)]
    filters: FilterArgs,
    #[command(subcommand)]
    command: Commands,
}

/// Row filters applied before any computation.
#[derive(Args)]
struct FilterArgs {
    /// Only rows with this crime category (e.g. `HURTO`)
    #[arg(long)]
    categoria: Option<String>,
    /// Only rows from this year
    #[arg(long)]
    anio: Option<i32>,
    /// Only rows from this month (1-12)
    #[arg(long, value_parser = clap::value_parser!(u32).range(1..=12))]
    mes: Option<u32>,
    /// Only rows with this gender label
    #[arg(long)]
    genero: Option<String>,
    /// Only rows with this age band label (e.g. `18 a 59`)
    #[arg(long)]
    grupo_etario: Option<String>,
}

impl FilterArgs {
    fn to_filter(&self) -> IncidentFilter {
        IncidentFilter {
            municipio: None,
            categoria: self.categoria.clone(),
            anio: self.anio,
            mes: self.mes,
            genero: self.genero.clone(),
            grupo_etario: self.grupo_etario.clone(),
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Per-municipality totals with risk tiers
    Aggregate,
    /// Highest-risk municipalities
    Top {
        /// Number of municipalities (defaults to `top_n` from the config)
        #[arg(long)]
        limit: Option<usize>,
        /// Ranking source: `summed-counts` or `max-score`
        #[arg(long, value_parser = parse_strategy)]
        strategy: Option<RankingStrategy>,
    },
    /// Share of one municipality in the global total
    Detail {
        /// Municipality name
        municipio: String,
    },
    /// Dominant crime category per age band for one municipality
    AgeGroups {
        /// Municipality name
        municipio: String,
        /// Tie-break policy: `first-seen` or `alphabetical`
        #[arg(long, value_parser = parse_tie_break)]
        tie_break: Option<TieBreak>,
    },
    /// Weighted heatmap points
    Heatmap,
    /// Totals, ranking, and (with `--municipio`) detail and age bands
    Report {
        /// Selected municipality
        #[arg(long)]
        municipio: Option<String>,
    },
}

fn parse_strategy(s: &str) -> Result<RankingStrategy, String> {
    RankingStrategy::from_str(s).map_err(|_| format!("unknown strategy '{s}'"))
}

fn parse_tie_break(s: &str) -> Result<TieBreak, String> {
    TieBreak::from_str(s).map_err(|_| format!("unknown tie-break '{s}'"))
}

fn print_json<T: Serialize>(value: &T, pretty: bool) -> Result<(), serde_json::Error> {
    let out = if pretty {
        serde_json::to_string_pretty(value)?
    } else {
        serde_json::to_string(value)?
    };
    println!("{out}");
    Ok(())
}

fn filtered_incidents(
    payload: &serde_json::Value,
    config: &RiskConfig,
    filter: &IncidentFilter,
) -> Result<Vec<IncidentRow>, urbanik_risk::RiskError> {
    let rows = incident_rows(payload, &config.fields)?;
    Ok(filter.apply(&rows))
}

fn filtered_scores(
    payload: &serde_json::Value,
    config: &RiskConfig,
    filter: &IncidentFilter,
) -> Result<Vec<ScoredRow>, urbanik_risk::RiskError> {
    if filter.has_incident_only_fields() {
        log::warn!("--genero and --grupo-etario do not apply to scored risk rows");
    }
    let rows = scored_rows(payload, &config.fields)?;
    Ok(filter.apply_scored(&rows))
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    pretty_env_logger::init();
    let cli = Cli::parse();

    let config = RiskConfig::resolve(cli.config.as_deref())?;
    let payload = input::read_payload(cli.input.as_deref())?;
    let filter = cli.filters.to_filter();

    match cli.command {
        Commands::Aggregate => {
            let rows = filtered_incidents(&payload, &config, &filter)?;
            print_json(&aggregate_by_municipio(&rows, &config.thresholds), cli.pretty)?;
        }
        Commands::Top { limit, strategy } => {
            let limit = limit.unwrap_or(config.top_n);
            let ranked = match strategy.unwrap_or(config.strategy) {
                RankingStrategy::SummedCounts => {
                    let rows = filtered_incidents(&payload, &config, &filter)?;
                    rank_municipios(RiskInput::Incidents(&rows), &config.thresholds, limit)
                }
                RankingStrategy::MaxScore => {
                    let rows = filtered_scores(&payload, &config, &filter)?;
                    rank_municipios(RiskInput::Scores(&rows), &config.thresholds, limit)
                }
            };
            print_json(&ranked, cli.pretty)?;
        }
        Commands::Detail { municipio } => {
            let rows = filtered_incidents(&payload, &config, &filter)?;
            let aggregation = aggregate_by_municipio(&rows, &config.thresholds);
            let detail = municipio_detail(&aggregation, &municipio)
                .ok_or_else(|| format!("No data found for municipio '{municipio}'"))?;
            print_json(&detail, cli.pretty)?;
        }
        Commands::AgeGroups {
            municipio,
            tie_break,
        } => {
            let rows = filtered_incidents(&payload, &config, &filter)?;
            let breakdown = age_group_breakdown_for(
                &rows,
                &municipio,
                &config.age_groups,
                tie_break.unwrap_or(config.tie_break),
            );
            print_json(&breakdown, cli.pretty)?;
        }
        Commands::Heatmap => {
            let rows = filtered_incidents(&payload, &config, &filter)?;
            print_json(&heatmap_points(&rows), cli.pretty)?;
        }
        Commands::Report { municipio } => {
            let rows = incident_rows(&payload, &config.fields)?;
            let selection = ReportSelection { filter, municipio };
            print_json(&RiskReport::build(&rows, &config, &selection), cli.pretty)?;
        }
    }

    Ok(())
}
