//! Weighted points for the heatmap layer.

use urbanik_risk_models::{HeatmapPoint, IncidentRow};

/// Largest weight a point can receive.
pub const MAX_WEIGHT: f64 = 10.0;

/// Smallest weight a point can receive.
pub const MIN_WEIGHT: f64 = 1.0;

/// Converts rows with coordinates into heatmap points weighted by count.
///
/// Weights scale linearly to [`MAX_WEIGHT`] against the largest count in
/// `rows` and never drop below [`MIN_WEIGHT`]. A row with no count weighs
/// as a single incident. Rows missing either coordinate are dropped.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn heatmap_points(rows: &[IncidentRow]) -> Vec<HeatmapPoint> {
    let max_count = rows.iter().map(IncidentRow::count_or_zero).max().unwrap_or(0);

    let points: Vec<HeatmapPoint> = rows
        .iter()
        .filter_map(|row| {
            let (lat, lng) = (row.lat?, row.lng?);
            let raw = row.count.unwrap_or(1);
            let weight = if max_count > 0 {
                (raw as f64 / max_count as f64 * MAX_WEIGHT).max(MIN_WEIGHT)
            } else {
                MIN_WEIGHT
            };
            Some(HeatmapPoint { lat, lng, weight })
        })
        .collect();

    log::debug!(
        "Built {} heatmap point(s) from {} row(s), max count {max_count}",
        points.len(),
        rows.len()
    );

    points
}
