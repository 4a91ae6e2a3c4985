//! Per-municipality aggregation with relative risk tiers.

use std::collections::HashMap;

use urbanik_risk_models::{IncidentRow, MunicipioAggregate, MunicipioAggregation, RiskThresholds};

/// Groups `rows` by municipality, sums their counts, and assigns each
/// municipality a tier relative to the largest total.
///
/// Rows without a municipality are grouped under
/// [`urbanik_risk_models::SIN_MUNICIPIO`]; rows without a count contribute
/// zero. The list keeps the order in which municipalities first appear.
/// When every total is zero (or there are no rows) every tier is
/// [`urbanik_risk_models::RiskLevel::Bajo`].
#[must_use]
pub fn aggregate_by_municipio(
    rows: &[IncidentRow],
    thresholds: &RiskThresholds,
) -> MunicipioAggregation {
    let mut index: HashMap<&str, usize> = HashMap::new();
    let mut totals: Vec<(&str, u64)> = Vec::new();

    for row in rows {
        let key = row.municipio_key();
        let count = row.count_or_zero();
        match index.get(key) {
            Some(&i) => totals[i].1 = totals[i].1.saturating_add(count),
            None => {
                index.insert(key, totals.len());
                totals.push((key, count));
            }
        }
    }

    let max = totals.iter().map(|(_, t)| *t).max().unwrap_or(0);
    let total_global = totals.iter().fold(0u64, |acc, (_, t)| acc.saturating_add(*t));

    #[allow(clippy::cast_precision_loss)]
    let list: Vec<MunicipioAggregate> = totals
        .into_iter()
        .map(|(municipio, total)| MunicipioAggregate {
            municipio: municipio.to_string(),
            total,
            nivel_riesgo: thresholds.classify_relative(total as f64, max as f64),
        })
        .collect();

    log::debug!(
        "Aggregated {} row(s) into {} municipality(ies), max={max} total={total_global}",
        rows.len(),
        list.len()
    );

    MunicipioAggregation { list, total_global }
}
