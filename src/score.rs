// src/score.rs
// Min-max normalization and the 0-10 scoring on top of it. Rent flows
// through twice: once as a plain norm for display, once flipped into an
// affordability norm that is what actually gets scored, so a cheap district
// earns points rather than losing them.

use crate::signal::SignalKind;
use crate::table::{CleanRow, CleanTable, ImputedTable, RankedRow, RankedTable};

/// Attach min-max norms to every column, plus the inverted rent norm.
/// A flat column normalizes to 0.0; flat *affordability* sits at the
/// neutral 0.5 instead, since neither cheap nor expensive can be told apart.
pub fn normalize(imputed: &ImputedTable) -> CleanTable {
    let mut rows: Vec<CleanRow> = imputed
        .rows
        .iter()
        .map(|(district, values)| CleanRow {
            district: district.clone(),
            values: *values,
            norms: [0.0; 4],
            affordability: 0.5,
        })
        .collect();

    for kind in SignalKind::ALL {
        let i = kind.index();
        let Some((min, max)) = column_range(imputed, i) else {
            continue;
        };
        let span = max - min;
        for row in &mut rows {
            row.norms[i] = if span != 0.0 { (row.values[i] - min) / span } else { 0.0 };
        }
        if kind == SignalKind::Rent {
            for row in &mut rows {
                row.affordability =
                    if span != 0.0 { (max - row.values[i]) / span } else { 0.5 };
            }
        }
    }
    CleanTable { rows }
}

fn column_range(imputed: &ImputedTable, i: usize) -> Option<(f64, f64)> {
    let mut values = imputed.rows.iter().map(|(_, v)| v[i]);
    let first = values.next()?;
    let (mut min, mut max) = (first, first);
    for v in values {
        min = min.min(v);
        max = max.max(v);
    }
    Some((min, max))
}

/// Scale the norms to 0-10 factor scores, average them into the composite,
/// and sort best-first. Equal composites keep their merge order, so the
/// earlier-seen district places higher.
pub fn rank(clean: &CleanTable) -> RankedTable {
    let mut rows: Vec<RankedRow> = clean
        .rows
        .iter()
        .map(|row| {
            let mut scores = [0.0; 4];
            for kind in SignalKind::ALL {
                let i = kind.index();
                let norm = if kind == SignalKind::Rent { row.affordability } else { row.norms[i] };
                scores[i] = norm * 10.0;
            }
            let composite = scores.iter().sum::<f64>() / scores.len() as f64;
            RankedRow { clean: row.clone(), scores, composite }
        })
        .collect();

    rows.sort_by(|a, b| b.composite.total_cmp(&a.composite));
    RankedTable { rows }
}
