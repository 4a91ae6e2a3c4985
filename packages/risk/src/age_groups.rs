//! Mapping from free-text `grupo_etario` labels to canonical age bands.
//!
//! The built-in table lives in `config/age_groups.toml` and is baked into
//! the binary at compile time via [`include_str!`]. A replacement table can
//! be supplied through [`crate::RiskConfig`].

use std::collections::{BTreeMap, HashMap};
use std::str::FromStr as _;

use serde::{Deserialize, Serialize};
use urbanik_risk_models::AgeGroup;

use crate::RiskError;

/// Built-in mapping, embedded at compile time.
const AGE_GROUPS_TOML: &str = include_str!("../config/age_groups.toml");

/// Canonical age band to the set of source labels that belong to it.
///
/// Every label belongs to at most one band. Bands missing from the table
/// simply never match.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(
    try_from = "BTreeMap<String, Vec<String>>",
    into = "BTreeMap<String, Vec<String>>"
)]
pub struct AgeGroupMapping {
    groups: BTreeMap<AgeGroup, Vec<String>>,
}

impl AgeGroupMapping {
    /// Builds a mapping, trimming labels and rejecting labels claimed by
    /// more than one band.
    ///
    /// # Errors
    ///
    /// Returns [`RiskError::Config`] if a label appears under two bands.
    pub fn new(groups: BTreeMap<AgeGroup, Vec<String>>) -> Result<Self, RiskError> {
        let mut owner: HashMap<String, AgeGroup> = HashMap::new();
        let mut cleaned = BTreeMap::new();

        for (group, labels) in groups {
            let mut kept: Vec<String> = Vec::with_capacity(labels.len());
            for label in labels {
                let label = label.trim().to_string();
                if let Some(&other) = owner.get(&label) {
                    if other == group {
                        continue;
                    }
                    return Err(RiskError::Config {
                        message: format!("age group label '{label}' is mapped to both {other} and {group}"),
                    });
                }
                owner.insert(label.clone(), group);
                kept.push(label);
            }
            cleaned.insert(group, kept);
        }

        Ok(Self { groups: cleaned })
    }

    /// Parses a mapping from TOML with one array of labels per band, e.g.
    /// `ADULTOS = ["18 a 59"]`.
    ///
    /// # Errors
    ///
    /// Returns [`RiskError::Config`] if the TOML is malformed, names an
    /// unknown band, or maps a label twice.
    pub fn from_toml_str(toml_str: &str) -> Result<Self, RiskError> {
        toml::de::from_str(toml_str).map_err(|e| RiskError::Config {
            message: e.to_string(),
        })
    }

    /// The built-in mapping.
    ///
    /// # Panics
    ///
    /// Panics if the embedded `age_groups.toml` is invalid, which the
    /// tests below rule out.
    #[must_use]
    pub fn builtin() -> Self {
        Self::from_toml_str(AGE_GROUPS_TOML)
            .unwrap_or_else(|e| panic!("Failed to parse age_groups.toml: {e}"))
    }

    /// Labels mapped to `group`.
    #[must_use]
    pub fn labels(&self, group: AgeGroup) -> &[String] {
        self.groups.get(&group).map(Vec::as_slice).unwrap_or_default()
    }

    /// Band a raw label belongs to, compared after trimming.
    #[must_use]
    pub fn group_for(&self, label: &str) -> Option<AgeGroup> {
        let label = label.trim();
        self.groups
            .iter()
            .find(|(_, labels)| labels.iter().any(|l| l == label))
            .map(|(group, _)| *group)
    }
}

impl Default for AgeGroupMapping {
    fn default() -> Self {
        Self::builtin()
    }
}

impl TryFrom<BTreeMap<String, Vec<String>>> for AgeGroupMapping {
    type Error = RiskError;

    fn try_from(raw: BTreeMap<String, Vec<String>>) -> Result<Self, Self::Error> {
        let mut groups = BTreeMap::new();
        for (name, labels) in raw {
            let group = AgeGroup::from_str(name.trim()).map_err(|_| RiskError::Config {
                message: format!(
                    "unknown age group '{name}', expected one of: {}",
                    AgeGroup::all()
                        .iter()
                        .map(ToString::to_string)
                        .collect::<Vec<_>>()
                        .join(", ")
                ),
            })?;
            groups.insert(group, labels);
        }
        Self::new(groups)
    }
}

impl From<AgeGroupMapping> for BTreeMap<String, Vec<String>> {
    fn from(mapping: AgeGroupMapping) -> Self {
        mapping
            .groups
            .into_iter()
            .map(|(group, labels)| (group.to_string(), labels))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_parses_and_covers_every_group() {
        let mapping = AgeGroupMapping::builtin();
        for group in AgeGroup::all() {
            assert!(
                !mapping.labels(*group).is_empty(),
                "{group} has no labels in age_groups.toml"
            );
        }
    }

    #[test]
    fn builtin_maps_common_labels() {
        let mapping = AgeGroupMapping::builtin();
        assert_eq!(mapping.group_for("18 a 59"), Some(AgeGroup::Adultos));
        assert_eq!(mapping.group_for("  ADOLESCENTES "), Some(AgeGroup::Adolescentes));
        assert_eq!(mapping.group_for("MENORES"), Some(AgeGroup::Ninos));
        assert_eq!(mapping.group_for("ADULTO MAYOR"), Some(AgeGroup::Mayores));
        assert_eq!(mapping.group_for("NO REPORTA"), None);
    }

    #[test]
    fn matching_is_exact_after_trim() {
        let mapping = AgeGroupMapping::builtin();
        assert_eq!(mapping.group_for("adultos"), None);
        assert_eq!(mapping.group_for("18 a 59 años"), None);
    }

    #[test]
    fn custom_toml() {
        let mapping = AgeGroupMapping::from_toml_str(
            r#"
            NINOS = ["0-11"]
            ADULTOS = [" 18-59 "]
            "#,
        )
        .unwrap();
        assert_eq!(mapping.group_for("18-59"), Some(AgeGroup::Adultos));
        assert!(mapping.labels(AgeGroup::Mayores).is_empty());
    }

    #[test]
    fn rejects_unknown_group() {
        let err = AgeGroupMapping::from_toml_str(r#"BEBES = ["0"]"#).unwrap_err();
        assert!(matches!(err, RiskError::Config { .. }));
        assert!(err.to_string().contains("BEBES"));
    }

    #[test]
    fn rejects_label_in_two_groups() {
        let err = AgeGroupMapping::from_toml_str(
            r#"
            NINOS = ["12 a 17"]
            ADOLESCENTES = ["12 a 17"]
            "#,
        )
        .unwrap_err();
        assert!(err.to_string().contains("12 a 17"));
    }

    #[test]
    fn duplicate_label_in_same_group_is_collapsed() {
        let mut groups = BTreeMap::new();
        groups.insert(AgeGroup::Adultos, vec!["A".to_string(), " A".to_string()]);
        let mapping = AgeGroupMapping::new(groups).unwrap();
        assert_eq!(mapping.labels(AgeGroup::Adultos), ["A"]);
    }
}
