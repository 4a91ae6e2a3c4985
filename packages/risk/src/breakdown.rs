//! Dominant crime category per age band for a single municipality.

use std::collections::HashMap;

use urbanik_risk_models::{
    AgeGroup, AgeGroupBreakdown, AgeGroupSummary, DominantCategory, IncidentRow, TieBreak,
};

use crate::age_groups::AgeGroupMapping;
use crate::filter::IncidentFilter;

/// Computes the dominant category for each canonical age band.
///
/// `rows` are expected to be scoped to one municipality already (see
/// [`age_group_breakdown_for`]). For each band, rows whose trimmed
/// `grupo_etario` is one of the band's labels are summed per category
/// (absent categories count as [`urbanik_risk_models::OTRO`]), and the
/// category with the highest total wins. `tie_break` decides between
/// categories sharing that total. Bands with no matching rows have
/// no dominant category. The result always has an entry for every band.
#[must_use]
pub fn age_group_breakdown(
    rows: &[IncidentRow],
    mapping: &AgeGroupMapping,
    tie_break: TieBreak,
) -> AgeGroupBreakdown {
    AgeGroup::all()
        .iter()
        .map(|&group| {
            let summary = AgeGroupSummary {
                dominant_category: dominant_category(rows, mapping, group, tie_break),
            };
            (group, summary)
        })
        .collect()
}

/// Filters `rows` down to `municipio` and computes the age band breakdown.
#[must_use]
pub fn age_group_breakdown_for(
    rows: &[IncidentRow],
    municipio: &str,
    mapping: &AgeGroupMapping,
    tie_break: TieBreak,
) -> AgeGroupBreakdown {
    let scoped = IncidentFilter::municipio(municipio).apply(rows);
    age_group_breakdown(&scoped, mapping, tie_break)
}

fn dominant_category(
    rows: &[IncidentRow],
    mapping: &AgeGroupMapping,
    group: AgeGroup,
    tie_break: TieBreak,
) -> Option<DominantCategory> {
    let labels = mapping.labels(group);
    let mut index: HashMap<&str, usize> = HashMap::new();
    let mut totals: Vec<(&str, u64)> = Vec::new();

    for row in rows {
        let Some(label) = row.grupo_etario.as_deref() else {
            continue;
        };
        let label = label.trim();
        if !labels.iter().any(|l| l == label) {
            continue;
        }

        let categoria = row.categoria_key();
        let count = row.count_or_zero();
        match index.get(categoria) {
            Some(&i) => totals[i].1 = totals[i].1.saturating_add(count),
            None => {
                index.insert(categoria, totals.len());
                totals.push((categoria, count));
            }
        }
    }

    let mut best: Option<(&str, u64)> = None;
    for (categoria, total) in totals {
        let replace = match best {
            None => true,
            Some((best_cat, best_total)) => {
                total > best_total
                    || (total == best_total
                        && tie_break == TieBreak::Alphabetical
                        && categoria < best_cat)
            }
        };
        if replace {
            best = Some((categoria, total));
        }
    }

    if let Some((categoria, total)) = best {
        log::trace!("{group}: dominant category {categoria} ({total})");
    }

    best.map(|(categoria, total)| DominantCategory {
        categoria: categoria.to_string(),
        total,
    })
}
