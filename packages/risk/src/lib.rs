#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Municipal risk aggregation engine.
//!
//! Turns crime incident rows (already fetched from the `/delitos`,
//! `/riesgo` or `/heatmap` endpoints and parsed as JSON) into the
//! view-models the risk map renders: per-municipality totals with a
//! relative risk tier, a top-N ranking, a per-municipality percentage
//! detail, and the dominant crime category per age band.
//!
//! Every function here is pure and synchronous. Results are recomputed
//! from scratch on each call; nothing is cached or mutated in place.

pub mod age_groups;
pub mod aggregate;
pub mod breakdown;
pub mod config;
pub mod detail;
pub mod fields;
pub mod filter;
pub mod heatmap;
pub mod ranking;
pub mod report;

use thiserror::Error;

pub use age_groups::AgeGroupMapping;
pub use aggregate::aggregate_by_municipio;
pub use breakdown::{age_group_breakdown, age_group_breakdown_for};
pub use config::RiskConfig;
pub use detail::municipio_detail;
pub use fields::{FieldMapping, incident_rows, payload_rows, scored_rows};
pub use filter::IncidentFilter;
pub use heatmap::heatmap_points;
pub use ranking::{RiskInput, rank_aggregates, rank_municipios, top_municipios};
pub use report::{ReportSelection, RiskReport};

/// Errors that can occur at the edges of the risk engine (loading
/// configuration and decoding payloads). The aggregation functions
/// themselves are infallible.
#[derive(Debug, Error)]
pub enum RiskError {
    /// Reading a file or stream failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The payload was not valid JSON.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// The configuration could not be parsed or is inconsistent.
    #[error("Config error: {message}")]
    Config {
        /// Description of what went wrong.
        message: String,
    },

    /// The payload parsed but does not contain a row array.
    #[error("Payload error: {message}")]
    Payload {
        /// Description of what went wrong.
        message: String,
    },
}
