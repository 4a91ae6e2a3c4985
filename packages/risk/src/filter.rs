//! Row filters matching the query parameters of the `/delitos` and
//! `/riesgo` endpoints.

use serde::{Deserialize, Serialize};
use urbanik_risk_models::{IncidentRow, ScoredRow};

/// Exact-match filter over incident rows. Unset fields match everything.
///
/// String fields are compared after trimming both sides. The `municipio`
/// filter compares against the grouping key, so filtering on
/// [`urbanik_risk_models::SIN_MUNICIPIO`] selects rows with no
/// municipality.
///
/// Scored rows only carry municipio, categoria, anio and mes; `genero` and
/// `grupo_etario` do not apply to them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IncidentFilter {
    /// Municipality name.
    pub municipio: Option<String>,
    /// Crime category.
    pub categoria: Option<String>,
    /// Year.
    pub anio: Option<i32>,
    /// Month (1-12).
    pub mes: Option<u32>,
    /// Gender.
    pub genero: Option<String>,
    /// Free-text age band label.
    pub grupo_etario: Option<String>,
}

impl IncidentFilter {
    /// Filter on a single municipality.
    #[must_use]
    pub fn municipio(municipio: impl Into<String>) -> Self {
        Self {
            municipio: Some(municipio.into()),
            ..Self::default()
        }
    }

    /// Returns `true` if no field is set.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.municipio.is_none()
            && self.categoria.is_none()
            && self.anio.is_none()
            && self.mes.is_none()
            && !self.has_incident_only_fields()
    }

    /// Returns `true` if a field that scored rows cannot be matched on
    /// (`genero`, `grupo_etario`) is set.
    #[must_use]
    pub const fn has_incident_only_fields(&self) -> bool {
        self.genero.is_some() || self.grupo_etario.is_some()
    }

    /// Returns `true` if `row` satisfies every set field.
    #[must_use]
    pub fn matches(&self, row: &IncidentRow) -> bool {
        self.matches_common(row.municipio_key(), row.categoria_key(), row.anio, row.mes)
            && matches_text(self.genero.as_deref(), row.genero.as_deref())
            && matches_text(self.grupo_etario.as_deref(), row.grupo_etario.as_deref())
    }

    /// Returns `true` if `row` satisfies the municipio, categoria, anio and
    /// mes fields. `genero` and `grupo_etario` are ignored.
    #[must_use]
    pub fn matches_scored(&self, row: &ScoredRow) -> bool {
        self.matches_common(row.municipio_key(), row.categoria_key(), row.anio, row.mes)
    }

    /// Returns the rows satisfying this filter, in input order.
    #[must_use]
    pub fn apply(&self, rows: &[IncidentRow]) -> Vec<IncidentRow> {
        if self.is_empty() {
            return rows.to_vec();
        }
        let filtered: Vec<IncidentRow> = rows.iter().filter(|r| self.matches(r)).cloned().collect();
        log::debug!("Filter kept {}/{} row(s)", filtered.len(), rows.len());
        filtered
    }

    /// Returns the scored rows satisfying [`Self::matches_scored`], in input
    /// order.
    #[must_use]
    pub fn apply_scored(&self, rows: &[ScoredRow]) -> Vec<ScoredRow> {
        let filtered: Vec<ScoredRow> = rows
            .iter()
            .filter(|r| self.matches_scored(r))
            .cloned()
            .collect();
        log::debug!("Filter kept {}/{} scored row(s)", filtered.len(), rows.len());
        filtered
    }

    fn matches_common(
        &self,
        municipio_key: &str,
        categoria_key: &str,
        anio: Option<i32>,
        mes: Option<u32>,
    ) -> bool {
        if let Some(ref municipio) = self.municipio
            && municipio_key.trim() != municipio.trim()
        {
            return false;
        }
        if let Some(ref categoria) = self.categoria
            && categoria_key.trim() != categoria.trim()
        {
            return false;
        }
        if self.anio.is_some() && anio != self.anio {
            return false;
        }
        if self.mes.is_some() && mes != self.mes {
            return false;
        }
        true
    }
}

fn matches_text(wanted: Option<&str>, actual: Option<&str>) -> bool {
    wanted.is_none_or(|w| actual.map(str::trim) == Some(w.trim()))
}
