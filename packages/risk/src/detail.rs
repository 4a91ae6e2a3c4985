//! Share of a single municipality in the global total.

use urbanik_risk_models::{MunicipioAggregation, MunicipioDetail};

/// Looks up `municipio` in `aggregation` and computes its percentage of
/// the global total.
///
/// Names are compared after trimming both sides, the same way
/// [`crate::IncidentFilter`] matches rows. Returns `None` when no aggregate
/// has that name. The percentage is zero when the global total is zero.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn municipio_detail(aggregation: &MunicipioAggregation, municipio: &str) -> Option<MunicipioDetail> {
    let wanted = municipio.trim();
    let Some(item) = aggregation.list.iter().find(|m| m.municipio.trim() == wanted) else {
        log::debug!("No aggregate for municipio '{municipio}'");
        return None;
    };

    let porcentaje = if aggregation.total_global > 0 {
        item.total as f64 / aggregation.total_global as f64 * 100.0
    } else {
        0.0
    };

    Some(MunicipioDetail {
        municipio: item.municipio.clone(),
        delitos_observados: item.total,
        nivel_riesgo: item.nivel_riesgo,
        porcentaje,
    })
}

#[cfg(test)]
mod tests {
    use urbanik_risk_models::{IncidentRow, RiskLevel, RiskThresholds};

    use super::*;
    use crate::aggregate::aggregate_by_municipio;

    fn sample() -> MunicipioAggregation {
        aggregate_by_municipio(
            &[
                IncidentRow::new("A", 10),
                IncidentRow::new("A", 5),
                IncidentRow::new("B", 3),
            ],
            &RiskThresholds::default(),
        )
    }

    #[test]
    fn computes_percentage() {
        let detail = municipio_detail(&sample(), "B").unwrap();
        assert_eq!(detail.delitos_observados, 3);
        assert_eq!(detail.nivel_riesgo, RiskLevel::Bajo);
        assert!((detail.porcentaje - 100.0 / 6.0).abs() < 1e-9);
    }

    #[test]
    fn lookup_ignores_surrounding_whitespace() {
        let aggregation =
            aggregate_by_municipio(&[IncidentRow::new("A ", 4)], &RiskThresholds::default());
        let detail = municipio_detail(&aggregation, " A").unwrap();
        assert_eq!(detail.municipio, "A ");
        assert_eq!(detail.delitos_observados, 4);
    }

    #[test]
    fn unknown_municipio_is_none() {
        assert!(municipio_detail(&sample(), "Z").is_none());
        assert!(municipio_detail(&MunicipioAggregation::default(), "A").is_none());
    }

    #[test]
    fn zero_global_total_gives_zero_percent() {
        let aggregation =
            aggregate_by_municipio(&[IncidentRow::new("A", 0)], &RiskThresholds::default());
        let detail = municipio_detail(&aggregation, "A").unwrap();
        assert!(detail.porcentaje.abs() < f64::EPSILON);
        assert!(!detail.porcentaje.is_nan());
    }

    #[test]
    fn single_municipio_is_one_hundred_percent() {
        let aggregation =
            aggregate_by_municipio(&[IncidentRow::new("A", 7)], &RiskThresholds::default());
        let detail = municipio_detail(&aggregation, "A").unwrap();
        assert!((detail.porcentaje - 100.0).abs() < f64::EPSILON);
    }
}
