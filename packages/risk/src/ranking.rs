//! Top-N municipality rankings.
//!
//! Two risk sources exist and they are not reconciled: summed incident
//! counts (tiers derived from the ratio to the largest total) and the
//! model's `riesgo_score` table (one row kept per municipality, the one
//! with the highest score). [`RiskInput`] selects between them and
//! [`rank_municipios`] produces the same [`RankedMunicipio`] shape for
//! both.

use std::collections::HashMap;

use urbanik_risk_models::{
    IncidentRow, MunicipioAggregate, RankedMunicipio, RankingStrategy, RiskThresholds, ScoredRow,
};

use crate::aggregate::aggregate_by_municipio;

/// Default number of municipalities in a ranking.
pub const DEFAULT_TOP_N: usize = 5;

/// Rows to rank, tagged with the strategy that applies to them.
#[derive(Debug, Clone, Copy)]
pub enum RiskInput<'a> {
    /// Incident rows; ranked by summed count.
    Incidents(&'a [IncidentRow]),
    /// Model risk rows; ranked by maximum `riesgo_score`.
    Scores(&'a [ScoredRow]),
}

impl RiskInput<'_> {
    /// The ranking strategy this input is ranked with.
    #[must_use]
    pub const fn strategy(&self) -> RankingStrategy {
        match self {
            Self::Incidents(_) => RankingStrategy::SummedCounts,
            Self::Scores(_) => RankingStrategy::MaxScore,
        }
    }
}

/// Ranks municipalities by descending risk and returns at most `limit`.
///
/// Ties keep the order in which municipalities first appear.
#[must_use]
pub fn rank_municipios(
    input: RiskInput<'_>,
    thresholds: &RiskThresholds,
    limit: usize,
) -> Vec<RankedMunicipio> {
    log::debug!("Ranking top {limit} municipalities by {}", input.strategy());

    match input {
        RiskInput::Incidents(rows) => {
            let aggregation = aggregate_by_municipio(rows, thresholds);
            rank_aggregates(&aggregation.list, limit)
        }
        RiskInput::Scores(rows) => {
            let best = max_score_by_municipio(rows);
            let max = best
                .iter()
                .map(ScoredRow::score_or_zero)
                .fold(0.0_f64, f64::max);
            top_by_key(&best, limit, ScoredRow::score_or_zero)
                .into_iter()
                .map(|row| RankedMunicipio {
                    municipio: row.municipio_key().to_string(),
                    score: row.score_or_zero(),
                    delitos_observados: row.delitos_observados.unwrap_or(0),
                    nivel_riesgo: row
                        .nivel_riesgo
                        .unwrap_or_else(|| thresholds.classify_relative(row.score_or_zero(), max)),
                })
                .collect()
        }
    }
}

/// Ranks already aggregated municipalities by total, keeping at most
/// `limit`. Ties keep their relative order.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn rank_aggregates(list: &[MunicipioAggregate], limit: usize) -> Vec<RankedMunicipio> {
    top_municipios(list, limit)
        .into_iter()
        .map(|m| RankedMunicipio {
            score: m.total as f64,
            delitos_observados: m.total,
            nivel_riesgo: m.nivel_riesgo,
            municipio: m.municipio,
        })
        .collect()
}

/// Returns the `limit` municipalities with the highest totals.
///
/// Does not reorder `list`; ties keep their relative order.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn top_municipios(list: &[MunicipioAggregate], limit: usize) -> Vec<MunicipioAggregate> {
    top_by_key(list, limit, |m| m.total as f64)
}

/// Keeps, per municipality, the row with the highest `riesgo_score`.
///
/// Rows without a score count as zero. On equal scores the earlier row is
/// kept. Output is in order of first appearance.
#[must_use]
pub fn max_score_by_municipio(rows: &[ScoredRow]) -> Vec<ScoredRow> {
    let mut index: HashMap<&str, usize> = HashMap::new();
    let mut best: Vec<&ScoredRow> = Vec::new();

    for row in rows {
        match index.get(row.municipio_key()) {
            Some(&i) => {
                if row.score_or_zero() > best[i].score_or_zero() {
                    best[i] = row;
                }
            }
            None => {
                index.insert(row.municipio_key(), best.len());
                best.push(row);
            }
        }
    }

    best.into_iter().cloned().collect()
}

/// Stable descending sort on `key`, truncated to `limit`.
fn top_by_key<T: Clone>(items: &[T], limit: usize, key: impl Fn(&T) -> f64) -> Vec<T> {
    let mut sorted = items.to_vec();
    sorted.sort_by(|a, b| key(b).total_cmp(&key(a)));
    sorted.truncate(limit);
    sorted
}

#[cfg(test)]
mod tests {
    use urbanik_risk_models::RiskLevel;

    use super::*;

    fn scored(municipio: &str, score: f64) -> ScoredRow {
        ScoredRow {
            municipio: Some(municipio.to_string()),
            riesgo_score: Some(score),
            ..ScoredRow::default()
        }
    }

    fn aggregate(municipio: &str, total: u64) -> MunicipioAggregate {
        MunicipioAggregate {
            municipio: municipio.to_string(),
            total,
            nivel_riesgo: RiskLevel::Bajo,
        }
    }

    #[test]
    fn top_is_descending_and_limited() {
        let list: Vec<MunicipioAggregate> = (1..=8u64)
            .map(|i| aggregate(&format!("M{i}"), i))
            .collect();
        let top = top_municipios(&list, DEFAULT_TOP_N);
        let totals: Vec<u64> = top.iter().map(|m| m.total).collect();
        assert_eq!(totals, [8, 7, 6, 5, 4]);
    }

    #[test]
    fn top_does_not_mutate_input() {
        let list = vec![aggregate("A", 1), aggregate("B", 3)];
        let before = list.clone();
        let _ = top_municipios(&list, DEFAULT_TOP_N);
        assert_eq!(list, before);
    }

    #[test]
    fn top_ties_keep_insertion_order() {
        let list = vec![
            aggregate("A", 2),
            aggregate("B", 5),
            aggregate("C", 2),
            aggregate("D", 5),
        ];
        let names: Vec<String> = top_municipios(&list, 3)
            .into_iter()
            .map(|m| m.municipio)
            .collect();
        assert_eq!(names, ["B", "D", "A"]);
    }

    #[test]
    fn top_with_fewer_municipalities() {
        let list = vec![aggregate("A", 1), aggregate("B", 2)];
        assert_eq!(top_municipios(&list, DEFAULT_TOP_N).len(), 2);
        assert!(top_municipios(&[], DEFAULT_TOP_N).is_empty());
    }

    #[test]
    fn rank_incidents_sums_counts() {
        let rows = vec![
            IncidentRow::new("A", 10),
            IncidentRow::new("A", 5),
            IncidentRow::new("B", 3),
        ];
        let ranked = rank_municipios(
            RiskInput::Incidents(&rows),
            &RiskThresholds::default(),
            DEFAULT_TOP_N,
        );
        assert_eq!(ranked.len(), 2);
        assert_eq!(ranked[0].municipio, "A");
        assert_eq!(ranked[0].delitos_observados, 15);
        assert!((ranked[0].score - 15.0).abs() < f64::EPSILON);
        assert_eq!(ranked[0].nivel_riesgo, RiskLevel::Alto);
        assert_eq!(ranked[1].nivel_riesgo, RiskLevel::Bajo);
    }

    #[test]
    fn rank_aggregates_matches_rank_incidents() {
        let rows = vec![
            IncidentRow::new("A", 2),
            IncidentRow::new("B", 9),
            IncidentRow::new("C", 4),
        ];
        let thresholds = RiskThresholds::default();
        let aggregation = aggregate_by_municipio(&rows, &thresholds);
        assert_eq!(
            rank_aggregates(&aggregation.list, 2),
            rank_municipios(RiskInput::Incidents(&rows), &thresholds, 2)
        );
    }

    #[test]
    fn rank_empty_input() {
        let ranked = rank_municipios(
            RiskInput::Incidents(&[]),
            &RiskThresholds::default(),
            DEFAULT_TOP_N,
        );
        assert!(ranked.is_empty());
    }

    #[test]
    fn max_score_keeps_best_row_per_municipio() {
        let rows = vec![scored("A", 0.2), scored("B", 0.9), scored("A", 0.7), scored("A", 0.5)];
        let best = max_score_by_municipio(&rows);
        assert_eq!(best.len(), 2);
        assert_eq!(best[0].municipio_key(), "A");
        assert!((best[0].score_or_zero() - 0.7).abs() < f64::EPSILON);
    }

    #[test]
    fn max_score_keeps_earlier_row_on_equal_scores() {
        let mut first = scored("A", 0.5);
        first.mes = Some(1);
        let mut second = scored("A", 0.5);
        second.mes = Some(2);
        let best = max_score_by_municipio(&[first, second]);
        assert_eq!(best[0].mes, Some(1));
    }

    #[test]
    fn rank_scores_prefers_precomputed_tier() {
        let mut a = scored("A", 0.4);
        a.nivel_riesgo = Some(RiskLevel::Alto);
        let rows = vec![a, scored("B", 0.8), scored("C", 0.1)];
        let ranked = rank_municipios(
            RiskInput::Scores(&rows),
            &RiskThresholds::default(),
            DEFAULT_TOP_N,
        );
        let names: Vec<&str> = ranked.iter().map(|r| r.municipio.as_str()).collect();
        assert_eq!(names, ["B", "A", "C"]);
        assert_eq!(ranked[0].nivel_riesgo, RiskLevel::Alto);
        assert_eq!(ranked[1].nivel_riesgo, RiskLevel::Alto);
        assert_eq!(ranked[2].nivel_riesgo, RiskLevel::Bajo);
    }

    #[test]
    fn strategy_follows_input() {
        assert_eq!(
            RiskInput::Incidents(&[]).strategy(),
            RankingStrategy::SummedCounts
        );
        assert_eq!(RiskInput::Scores(&[]).strategy(), RankingStrategy::MaxScore);
    }
}
