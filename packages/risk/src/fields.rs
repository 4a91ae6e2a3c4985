//! Row extraction from raw JSON payloads.
//!
//! Backends disagree on column names (`count` vs `total` vs
//! `total_delitos`, `lat` vs `latitud`), so [`FieldMapping`] lists, for
//! each logical field, the JSON keys to try in order. The first key holding
//! a usable value wins.

use std::str::FromStr as _;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use urbanik_risk_models::{IncidentRow, RiskLevel, ScoredRow};

use crate::RiskError;

/// JSON key aliases for every logical row field, tried in order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FieldMapping {
    /// Municipality name.
    pub municipio: Vec<String>,
    /// Incident count.
    pub count: Vec<String>,
    /// Crime category.
    pub categoria: Vec<String>,
    /// Free-text age band.
    pub grupo_etario: Vec<String>,
    /// Latitude.
    pub lat: Vec<String>,
    /// Longitude.
    pub lng: Vec<String>,
    /// Year.
    pub anio: Vec<String>,
    /// Month.
    pub mes: Vec<String>,
    /// Gender.
    pub genero: Vec<String>,
    /// Model risk score.
    pub riesgo_score: Vec<String>,
    /// Precomputed risk tier.
    pub nivel_riesgo: Vec<String>,
    /// Observed incidents on a scored row.
    pub delitos_observados: Vec<String>,
    /// Expected incidents on a scored row.
    pub delitos_esperados: Vec<String>,
}

fn keys(names: &[&str]) -> Vec<String> {
    names.iter().map(|s| (*s).to_string()).collect()
}

impl Default for FieldMapping {
    fn default() -> Self {
        Self {
            municipio: keys(&["municipio"]),
            count: keys(&["count", "total", "total_delitos", "cantidad"]),
            categoria: keys(&["categoria"]),
            grupo_etario: keys(&["grupo_etario"]),
            lat: keys(&["lat", "latitud", "latitude"]),
            lng: keys(&["lng", "longitud", "longitude"]),
            anio: keys(&["anio"]),
            mes: keys(&["mes"]),
            genero: keys(&["genero"]),
            riesgo_score: keys(&["riesgo_score"]),
            nivel_riesgo: keys(&["nivel_riesgo"]),
            delitos_observados: keys(&["delitos_observados"]),
            delitos_esperados: keys(&["delitos_esperados"]),
        }
    }
}

impl FieldMapping {
    /// Extracts an [`IncidentRow`] from one JSON record.
    ///
    /// Returns `None` if the record is not a JSON object.
    #[must_use]
    pub fn incident(&self, record: &Value) -> Option<IncidentRow> {
        if !record.is_object() {
            return None;
        }

        Some(IncidentRow {
            municipio: first_string(record, &self.municipio),
            count: first_u64(record, &self.count),
            categoria: first_string(record, &self.categoria),
            grupo_etario: first_string(record, &self.grupo_etario),
            lat: first_f64(record, &self.lat),
            lng: first_f64(record, &self.lng),
            anio: first_u64(record, &self.anio).and_then(|v| i32::try_from(v).ok()),
            mes: first_u64(record, &self.mes).and_then(|v| u32::try_from(v).ok()),
            genero: first_string(record, &self.genero),
        })
    }

    /// Extracts a [`ScoredRow`] from one JSON record.
    ///
    /// Returns `None` if the record is not a JSON object. An unrecognized
    /// `nivel_riesgo` label is dropped rather than rejected.
    #[must_use]
    pub fn scored(&self, record: &Value) -> Option<ScoredRow> {
        if !record.is_object() {
            return None;
        }

        let nivel_riesgo = first_string(record, &self.nivel_riesgo).and_then(|label| {
            RiskLevel::from_str(label.trim().to_uppercase().as_str())
                .inspect_err(|_| log::debug!("Ignoring unknown nivel_riesgo '{label}'"))
                .ok()
        });

        Some(ScoredRow {
            municipio: first_string(record, &self.municipio),
            anio: first_u64(record, &self.anio).and_then(|v| i32::try_from(v).ok()),
            mes: first_u64(record, &self.mes).and_then(|v| u32::try_from(v).ok()),
            categoria: first_string(record, &self.categoria),
            riesgo_score: first_f64(record, &self.riesgo_score),
            nivel_riesgo,
            delitos_observados: first_u64(record, &self.delitos_observados),
            delitos_esperados: first_f64(record, &self.delitos_esperados),
        })
    }
}

/// Returns the row array of a payload.
///
/// Accepts either a bare JSON array or an object wrapping the array under
/// `resultados`, the two shapes the backends return.
///
/// # Errors
///
/// Returns [`RiskError::Payload`] if the payload is neither.
pub fn payload_rows(payload: &Value) -> Result<&[Value], RiskError> {
    match payload {
        Value::Array(rows) => Ok(rows),
        Value::Object(map) => match map.get("resultados") {
            Some(Value::Array(rows)) => Ok(rows),
            _ => Err(RiskError::Payload {
                message: "expected an object with a 'resultados' array".to_string(),
            }),
        },
        _ => Err(RiskError::Payload {
            message: "expected a JSON array of rows".to_string(),
        }),
    }
}

/// Extracts every incident row of a payload, skipping non-object entries.
///
/// # Errors
///
/// Returns [`RiskError::Payload`] if the payload holds no row array.
pub fn incident_rows(payload: &Value, fields: &FieldMapping) -> Result<Vec<IncidentRow>, RiskError> {
    let raw = payload_rows(payload)?;
    let rows: Vec<IncidentRow> = raw
        .iter()
        .enumerate()
        .filter_map(|(idx, record)| {
            let row = fields.incident(record);
            if row.is_none() {
                log::warn!("Skipping row {idx}: not a JSON object");
            }
            row
        })
        .collect();

    log::debug!("Extracted {} incident row(s) from {} record(s)", rows.len(), raw.len());

    Ok(rows)
}

/// Extracts every scored risk row of a payload, skipping non-object entries.
///
/// # Errors
///
/// Returns [`RiskError::Payload`] if the payload holds no row array.
pub fn scored_rows(payload: &Value, fields: &FieldMapping) -> Result<Vec<ScoredRow>, RiskError> {
    let raw = payload_rows(payload)?;
    let rows: Vec<ScoredRow> = raw
        .iter()
        .enumerate()
        .filter_map(|(idx, record)| {
            let row = fields.scored(record);
            if row.is_none() {
                log::warn!("Skipping row {idx}: not a JSON object");
            }
            row
        })
        .collect();

    log::debug!("Extracted {} scored row(s) from {} record(s)", rows.len(), raw.len());

    Ok(rows)
}

/// First alias holding a string (numbers are stringified).
fn first_string(record: &Value, aliases: &[String]) -> Option<String> {
    aliases.iter().find_map(|key| match record.get(key)? {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    })
}

/// First alias holding a non-negative integer, as a number or numeric
/// string. Fractional values are rounded.
fn first_u64(record: &Value, aliases: &[String]) -> Option<u64> {
    aliases
        .iter()
        .find_map(|key| record.get(key).and_then(parse_u64))
}

/// First alias holding a finite number, as a number or numeric string.
fn first_f64(record: &Value, aliases: &[String]) -> Option<f64> {
    aliases
        .iter()
        .find_map(|key| record.get(key).and_then(parse_f64))
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn parse_u64(value: &Value) -> Option<u64> {
    if let Some(n) = value.as_u64() {
        return Some(n);
    }
    if let Value::String(s) = value
        && let Ok(n) = s.trim().parse::<u64>()
    {
        return Some(n);
    }
    let f = parse_f64(value)?;
    if f < 0.0 {
        return None;
    }
    Some(f.round() as u64)
}

fn parse_f64(value: &Value) -> Option<f64> {
    let f = match value {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => s.trim().parse::<f64>().ok()?,
        _ => return None,
    };
    f.is_finite().then_some(f)
}
