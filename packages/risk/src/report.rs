//! Full view-model for the risk map side panel.

use serde::{Deserialize, Serialize};
use urbanik_risk_models::{
    AgeGroupBreakdown, IncidentRow, MunicipioAggregation, MunicipioDetail, RankedMunicipio,
};

use crate::aggregate::aggregate_by_municipio;
use crate::breakdown::age_group_breakdown_for;
use crate::config::RiskConfig;
use crate::detail::municipio_detail;
use crate::filter::IncidentFilter;
use crate::ranking::rank_aggregates;

/// What the user currently has selected on the map.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportSelection {
    /// Filters applied to the rows before anything is computed.
    pub filter: IncidentFilter,
    /// Municipality picked from the ranking, if any.
    pub municipio: Option<String>,
}

/// Everything the side panel renders, computed from one row set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RiskReport {
    /// Rows left after filtering.
    pub row_count: usize,
    /// Per-municipality totals and tiers.
    pub aggregation: MunicipioAggregation,
    /// Highest-total municipalities.
    pub top: Vec<RankedMunicipio>,
    /// Selected municipality, echoed back.
    pub selected: Option<String>,
    /// Share of the selected municipality; `None` when nothing is selected
    /// or the selection has no data.
    pub detail: Option<MunicipioDetail>,
    /// Dominant category per age band for the selected municipality.
    pub age_groups: Option<AgeGroupBreakdown>,
}

impl RiskReport {
    /// Builds the report from scratch.
    #[must_use]
    pub fn build(rows: &[IncidentRow], config: &RiskConfig, selection: &ReportSelection) -> Self {
        let filtered = selection.filter.apply(rows);
        let aggregation = aggregate_by_municipio(&filtered, &config.thresholds);
        let top = rank_aggregates(&aggregation.list, config.top_n);

        let (detail, age_groups) = selection.municipio.as_deref().map_or((None, None), |m| {
            (
                municipio_detail(&aggregation, m),
                Some(age_group_breakdown_for(
                    &filtered,
                    m,
                    &config.age_groups,
                    config.tie_break,
                )),
            )
        });

        log::info!(
            "Report: {} row(s), {} municipality(ies), total {}",
            filtered.len(),
            aggregation.list.len(),
            aggregation.total_global
        );

        Self {
            row_count: filtered.len(),
            aggregation,
            top,
            selected: selection.municipio.clone(),
            detail,
            age_groups,
        }
    }
}
