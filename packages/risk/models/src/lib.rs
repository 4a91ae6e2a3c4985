#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Incident row, risk tier, and municipality view-model types.
//!
//! This crate defines the data shapes that flow through the municipal risk
//! engine: the normalized [`IncidentRow`] and [`ScoredRow`] inputs, and the
//! derived view-models ([`MunicipioAggregation`], [`MunicipioDetail`],
//! [`RankedMunicipio`], [`AgeGroupBreakdown`], [`HeatmapPoint`]) handed to
//! the rendering layer. Serialized field names follow the portal's JSON
//! conventions (`delitos_observados`, `nivel_riesgo`, `totalGlobal`, ...).

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

/// Grouping label used for rows with no municipality.
pub const SIN_MUNICIPIO: &str = "SIN MUNICIPIO";

/// Category label used for rows with no crime category.
pub const OTRO: &str = "OTRO";

/// Relative risk tier of a municipality within the current result set.
///
/// Variants are declared in ascending order so the derived [`Ord`] can be
/// used to compare tiers.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum RiskLevel {
    /// Below the `medio` ratio threshold.
    Bajo,
    /// Between the `medio` and `alto` ratio thresholds.
    Medio,
    /// At or above the `alto` ratio threshold.
    Alto,
}

impl RiskLevel {
    /// Returns all variants of this enum, lowest tier first.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[Self::Bajo, Self::Medio, Self::Alto]
    }
}

/// Ratio thresholds (inclusive lower bounds) used to discretize a
/// municipality's share of the maximum total into a [`RiskLevel`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RiskThresholds {
    /// Lowest ratio classified as [`RiskLevel::Alto`].
    pub alto: f64,
    /// Lowest ratio classified as [`RiskLevel::Medio`].
    pub medio: f64,
}

impl RiskThresholds {
    /// Default `alto` threshold.
    pub const DEFAULT_ALTO: f64 = 0.66;
    /// Default `medio` threshold.
    pub const DEFAULT_MEDIO: f64 = 0.33;

    /// Classifies a ratio in `[0, 1]`.
    #[must_use]
    pub fn classify(&self, ratio: f64) -> RiskLevel {
        if ratio >= self.alto {
            RiskLevel::Alto
        } else if ratio >= self.medio {
            RiskLevel::Medio
        } else {
            RiskLevel::Bajo
        }
    }

    /// Classifies `value` relative to `max`.
    ///
    /// A non-positive `max` yields a ratio of zero, so the result is
    /// [`RiskLevel::Bajo`] and no division happens.
    #[must_use]
    pub fn classify_relative(&self, value: f64, max: f64) -> RiskLevel {
        if max > 0.0 {
            self.classify(value / max)
        } else {
            RiskLevel::Bajo
        }
    }
}

impl Default for RiskThresholds {
    fn default() -> Self {
        Self {
            alto: Self::DEFAULT_ALTO,
            medio: Self::DEFAULT_MEDIO,
        }
    }
}

/// Canonical population age bands used for demographic breakdowns.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum AgeGroup {
    /// Children.
    Ninos,
    /// Adolescents.
    Adolescentes,
    /// Adults.
    Adultos,
    /// Older adults.
    Mayores,
}

impl AgeGroup {
    /// Returns all variants of this enum, youngest first.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[Self::Ninos, Self::Adolescentes, Self::Adultos, Self::Mayores]
    }
}

/// How to pick a dominant category when several share the highest total.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum TieBreak {
    /// Among the tied categories, the one whose first row appears earliest
    /// in the input.
    #[default]
    FirstSeen,
    /// The lexicographically smallest category label.
    Alphabetical,
}

/// Which risk source a ranking is computed from.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum RankingStrategy {
    /// Sum incident counts per municipality and rank by total.
    #[default]
    SummedCounts,
    /// Keep the highest `riesgo_score` row per municipality and rank by it.
    MaxScore,
}

/// One normalized incident observation.
///
/// Fields hold what the source row carried; defaults for absent values are
/// applied by the accessor methods so the raw row stays inspectable.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IncidentRow {
    /// Municipality name.
    pub municipio: Option<String>,
    /// Incident count, resolved from the first non-null alias.
    pub count: Option<u64>,
    /// Crime category label.
    pub categoria: Option<String>,
    /// Free-text age band label as it appears in the source.
    pub grupo_etario: Option<String>,
    /// Latitude.
    pub lat: Option<f64>,
    /// Longitude.
    pub lng: Option<f64>,
    /// Year.
    pub anio: Option<i32>,
    /// Month (1-12).
    pub mes: Option<u32>,
    /// Gender label.
    pub genero: Option<String>,
}

impl IncidentRow {
    /// Creates a row with only a municipality and a count.
    #[must_use]
    pub fn new(municipio: impl Into<String>, count: u64) -> Self {
        Self {
            municipio: Some(municipio.into()),
            count: Some(count),
            ..Self::default()
        }
    }

    /// Sets the crime category.
    #[must_use]
    pub fn with_categoria(mut self, categoria: impl Into<String>) -> Self {
        self.categoria = Some(categoria.into());
        self
    }

    /// Sets the age band label.
    #[must_use]
    pub fn with_grupo_etario(mut self, grupo_etario: impl Into<String>) -> Self {
        self.grupo_etario = Some(grupo_etario.into());
        self
    }

    /// Sets the coordinates.
    #[must_use]
    pub const fn with_location(mut self, lat: f64, lng: f64) -> Self {
        self.lat = Some(lat);
        self.lng = Some(lng);
        self
    }

    /// Grouping key: the municipality, or [`SIN_MUNICIPIO`] when absent or
    /// empty.
    #[must_use]
    pub fn municipio_key(&self) -> &str {
        match self.municipio.as_deref() {
            Some(m) if !m.is_empty() => m,
            _ => SIN_MUNICIPIO,
        }
    }

    /// Category label, or [`OTRO`] when absent or empty.
    #[must_use]
    pub fn categoria_key(&self) -> &str {
        match self.categoria.as_deref() {
            Some(c) if !c.is_empty() => c,
            _ => OTRO,
        }
    }

    /// Incident count, defaulting to zero.
    #[must_use]
    pub fn count_or_zero(&self) -> u64 {
        self.count.unwrap_or(0)
    }
}

/// One row of the model-produced risk table (`/riesgo`).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScoredRow {
    /// Municipality name.
    pub municipio: Option<String>,
    /// Year.
    pub anio: Option<i32>,
    /// Month (1-12).
    pub mes: Option<u32>,
    /// Crime category label.
    pub categoria: Option<String>,
    /// Model risk score.
    pub riesgo_score: Option<f64>,
    /// Tier precomputed by the model, if any.
    pub nivel_riesgo: Option<RiskLevel>,
    /// Observed incidents.
    pub delitos_observados: Option<u64>,
    /// Incidents the model expected.
    pub delitos_esperados: Option<f64>,
}

impl ScoredRow {
    /// Grouping key: the municipality, or [`SIN_MUNICIPIO`] when absent or
    /// empty.
    #[must_use]
    pub fn municipio_key(&self) -> &str {
        match self.municipio.as_deref() {
            Some(m) if !m.is_empty() => m,
            _ => SIN_MUNICIPIO,
        }
    }

    /// Category label, or [`OTRO`] when absent or empty.
    #[must_use]
    pub fn categoria_key(&self) -> &str {
        match self.categoria.as_deref() {
            Some(c) if !c.is_empty() => c,
            _ => OTRO,
        }
    }

    /// Risk score, defaulting to zero.
    #[must_use]
    pub fn score_or_zero(&self) -> f64 {
        self.riesgo_score.unwrap_or(0.0)
    }
}

/// Per-municipality incident total with its relative risk tier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MunicipioAggregate {
    /// Municipality name (or [`SIN_MUNICIPIO`]).
    pub municipio: String,
    /// Sum of incident counts.
    #[serde(rename = "delitos_observados", alias = "total")]
    pub total: u64,
    /// Tier relative to the largest total in the same result set.
    pub nivel_riesgo: RiskLevel,
}

/// Result of aggregating a row set by municipality.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MunicipioAggregation {
    /// Aggregates in order of first appearance.
    pub list: Vec<MunicipioAggregate>,
    /// Sum of all municipality totals.
    pub total_global: u64,
}

/// A municipality's share of the global total.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MunicipioDetail {
    /// Municipality name.
    pub municipio: String,
    /// Sum of incident counts.
    pub delitos_observados: u64,
    /// Relative risk tier.
    pub nivel_riesgo: RiskLevel,
    /// Percentage of the global total, in `[0, 100]`.
    pub porcentaje: f64,
}

/// Entry of a top-N ranking, shared by both ranking strategies.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedMunicipio {
    /// Municipality name.
    pub municipio: String,
    /// Ranking key: summed total or `riesgo_score`.
    pub score: f64,
    /// Observed incidents.
    pub delitos_observados: u64,
    /// Risk tier.
    pub nivel_riesgo: RiskLevel,
}

/// Highest-total category within an age band.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DominantCategory {
    /// Category label.
    pub categoria: String,
    /// Summed count for the category.
    pub total: u64,
}

/// Result for one age band.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgeGroupSummary {
    /// `None` when no row matched the band.
    pub dominant_category: Option<DominantCategory>,
}

/// Summary per age band, keyed by band.
pub type AgeGroupBreakdown = BTreeMap<AgeGroup, AgeGroupSummary>;

/// Weighted point for the heatmap layer.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HeatmapPoint {
    /// Latitude.
    pub lat: f64,
    /// Longitude.
    pub lng: f64,
    /// Weight in `[1, 10]`.
    pub weight: f64,
}

#[cfg(test)]
mod tests {
    use std::str::FromStr as _;

    use super::*;

    #[test]
    fn risk_levels_are_ordered() {
        assert!(RiskLevel::Bajo < RiskLevel::Medio);
        assert!(RiskLevel::Medio < RiskLevel::Alto);
    }

    #[test]
    fn default_thresholds_classify_inclusive_lower_bounds() {
        let t = RiskThresholds::default();
        assert_eq!(t.classify(1.0), RiskLevel::Alto);
        assert_eq!(t.classify(0.66), RiskLevel::Alto);
        assert_eq!(t.classify(0.659), RiskLevel::Medio);
        assert_eq!(t.classify(0.33), RiskLevel::Medio);
        assert_eq!(t.classify(0.2), RiskLevel::Bajo);
        assert_eq!(t.classify(0.0), RiskLevel::Bajo);
    }

    #[test]
    fn classify_relative_with_zero_max_is_bajo() {
        let t = RiskThresholds::default();
        assert_eq!(t.classify_relative(0.0, 0.0), RiskLevel::Bajo);
        assert_eq!(t.classify_relative(5.0, 0.0), RiskLevel::Bajo);
    }

    #[test]
    fn age_group_strings() {
        assert_eq!(AgeGroup::Ninos.to_string(), "NINOS");
        assert_eq!(AgeGroup::from_str("MAYORES").unwrap(), AgeGroup::Mayores);
        assert!(AgeGroup::from_str("bebes").is_err());
    }

    #[test]
    fn strategy_and_tie_break_parse_kebab_case() {
        assert_eq!(RankingStrategy::SummedCounts.to_string(), "summed-counts");
        assert_eq!(
            RankingStrategy::from_str("max-score").unwrap(),
            RankingStrategy::MaxScore
        );
        assert_eq!(
            TieBreak::from_str("alphabetical").unwrap(),
            TieBreak::Alphabetical
        );
        assert_eq!(TieBreak::default(), TieBreak::FirstSeen);
    }

    #[test]
    fn policy_names_match_between_serde_and_strum() {
        for strategy in [RankingStrategy::SummedCounts, RankingStrategy::MaxScore] {
            let json = serde_json::to_value(strategy).unwrap();
            assert_eq!(json, strategy.as_ref());
        }
        for tie_break in [TieBreak::FirstSeen, TieBreak::Alphabetical] {
            let json = serde_json::to_value(tie_break).unwrap();
            assert_eq!(json, tie_break.as_ref());
        }
        let parsed: TieBreak = serde_json::from_str("\"first-seen\"").unwrap();
        assert_eq!(parsed, TieBreak::FirstSeen);
    }

    #[test]
    fn missing_municipio_and_categoria_use_sentinels() {
        let row = IncidentRow {
            municipio: Some(String::new()),
            ..IncidentRow::default()
        };
        assert_eq!(row.municipio_key(), SIN_MUNICIPIO);
        assert_eq!(row.categoria_key(), OTRO);
        assert_eq!(row.count_or_zero(), 0);
    }

    #[test]
    fn aggregate_serializes_portal_field_names() {
        let agg = MunicipioAggregation {
            list: vec![MunicipioAggregate {
                municipio: "A".to_string(),
                total: 3,
                nivel_riesgo: RiskLevel::Alto,
            }],
            total_global: 3,
        };
        let json = serde_json::to_value(&agg).unwrap();
        assert_eq!(json["totalGlobal"], 3);
        assert_eq!(json["list"][0]["delitos_observados"], 3);
        assert_eq!(json["list"][0]["nivel_riesgo"], "ALTO");
    }

    #[test]
    fn breakdown_serializes_group_keys() {
        let mut breakdown = AgeGroupBreakdown::new();
        breakdown.insert(AgeGroup::Ninos, AgeGroupSummary::default());
        breakdown.insert(
            AgeGroup::Adultos,
            AgeGroupSummary {
                dominant_category: Some(DominantCategory {
                    categoria: "HURTO".to_string(),
                    total: 8,
                }),
            },
        );
        let json = serde_json::to_value(&breakdown).unwrap();
        assert!(json["NINOS"]["dominantCategory"].is_null());
        assert_eq!(json["ADULTOS"]["dominantCategory"]["categoria"], "HURTO");
    }
}
