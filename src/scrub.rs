// src/scrub.rs
// Reconciliation: canonicalize district names, outer-join the four raw
// tables, reclassify implausible zeros as missing, impute what is left.
// The output has no gaps and keeps transport-first row order, which later
// doubles as the ranking tiebreak.

use std::path::Path;

use tracing::{debug, info, warn};

use crate::config::CityProfile;
use crate::error::{Error, Result};
use crate::signal::SignalKind;
use crate::table::{ImputedTable, MergedTable, SignalTable};

/// Reconcile whatever raw tables exist into one fully-populated table.
/// Refuses outright when there are none at all.
pub fn reconcile(
    tables: &[SignalTable],
    profile: &CityProfile,
    cache_dir: &Path,
) -> Result<ImputedTable> {
    if tables.is_empty() {
        return Err(Error::NoRawData(cache_dir.to_path_buf()));
    }
    info!(tables = tables.len(), "reconciling raw tables");
    let mut merged = outer_join(tables, profile);
    zeros_to_missing(&mut merged);
    Ok(impute(&merged))
}

/// Outer join in fixed signal order. Row order is first-seen, so the
/// transport table seeds it when present; districts only other tables know
/// are appended as they turn up.
fn outer_join(tables: &[SignalTable], profile: &CityProfile) -> MergedTable {
    let mut merged = MergedTable::new();
    for kind in SignalKind::ALL {
        let Some(table) = tables.iter().find(|t| t.kind == kind) else {
            continue;
        };
        for (raw, value) in &table.rows {
            let district = profile.canonicalize(raw);
            let row = merged.row_mut(&district);
            if row.get(kind).is_some() {
                warn!(
                    %district,
                    signal = kind.label(),
                    "duplicate row after canonicalization, keeping the first"
                );
                continue;
            }
            row.set(kind, Some(*value));
        }
    }
    merged
}

/// A zero rent/jobs/POI reading in a city-sized district means "no signal",
/// not a true zero. Transport zeros stay; a district without stations is real.
fn zeros_to_missing(merged: &mut MergedTable) {
    for kind in SignalKind::ALL {
        if !kind.zero_is_missing() {
            continue;
        }
        for row in &mut merged.rows {
            if row.get(kind) == Some(0.0) {
                row.set(kind, None);
            }
        }
    }
}

/// Fill every gap with the column's median over the districts that do carry
/// the signal. A column with no values anywhere imputes zero.
fn impute(merged: &MergedTable) -> ImputedTable {
    let mut rows: Vec<(String, [f64; 4])> = merged
        .rows
        .iter()
        .map(|r| (r.district.clone(), [0.0; 4]))
        .collect();

    for kind in SignalKind::ALL {
        let mut present: Vec<f64> = merged.rows.iter().filter_map(|r| r.get(kind)).collect();
        let fill = match median(&mut present) {
            Some(m) => m,
            None => {
                warn!(column = kind.column(), "column has no values anywhere, imputing zero");
                0.0
            }
        };
        let missing = merged.rows.iter().filter(|r| r.get(kind).is_none()).count();
        if missing > 0 {
            debug!(column = kind.column(), missing, fill, "filled column gaps");
        }
        for (row, out) in merged.rows.iter().zip(rows.iter_mut()) {
            out.1[kind.index()] = row.get(kind).unwrap_or(fill);
        }
    }
    ImputedTable { rows }
}

/// Interpolated median: mean of the two middle values for even counts.
fn median(values: &mut [f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    values.sort_by(|a, b| a.total_cmp(b));
    let n = values.len();
    Some(if n % 2 == 1 {
        values[n / 2]
    } else {
        (values[n / 2 - 1] + values[n / 2]) / 2.0
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use SignalKind::*;

    fn table(kind: SignalKind, rows: &[(&str, f64)]) -> SignalTable {
        let mut t = SignalTable::new(kind);
        for (d, v) in rows {
            t.push(*d, *v);
        }
        t
    }

    fn profile() -> CityProfile {
        CityProfile::default()
    }

    #[test]
    fn outer_join_keeps_every_district() {
        let tables = [
            table(Transport, &[("Yunusabad", 8.0), ("Yangihayot", 2.0)]),
            table(Rent, &[("Yunusabad", 650.0), ("Chilanzar", 450.0)]),
            table(Jobs, &[("Chilanzar", 120.0)]),
        ];
        let out = reconcile(&tables, &profile(), Path::new("data/raw")).unwrap();

        let districts: Vec<&str> = out.rows.iter().map(|(d, _)| d.as_str()).collect();
        assert_eq!(districts, ["Yunusabad", "Yangihayot", "Chilanzar"]);

        // Yangihayot never appeared in the rent table; it gets the
        // interpolated median of the two rents that exist.
        assert_eq!(out.rows[1].1[Rent.index()], 550.0);
    }

    #[test]
    fn zero_handling_differs_by_signal() {
        let tables = [
            table(Transport, &[("A", 0.0), ("B", 4.0)]),
            table(Jobs, &[("A", 0.0), ("B", 10.0), ("C", 20.0)]),
        ];
        let out = reconcile(&tables, &profile(), Path::new("data/raw")).unwrap();

        // A true zero transport score survives.
        assert_eq!(out.rows[0].1[Transport.index()], 0.0);
        // A zero office count is a failed query, replaced by the median.
        assert_eq!(out.rows[0].1[Jobs.index()], 15.0);
    }

    #[test]
    fn alias_rows_collapse_to_one() {
        // Transit exports spell it Олмазор; the listings side says Almazar.
        let tables = [
            table(Transport, &[("Олмазор", 4.0)]),
            table(Rent, &[("Almazar", 400.0)]),
        ];
        let out = reconcile(&tables, &profile(), Path::new("data/raw")).unwrap();

        assert_eq!(out.rows.len(), 1);
        let (district, values) = &out.rows[0];
        assert_eq!(district, "Almazar");
        assert_eq!(values[Transport.index()], 4.0);
        assert_eq!(values[Rent.index()], 400.0);
    }

    #[test]
    fn duplicate_canonical_rows_keep_the_first() {
        let tables = [table(Transport, &[("Юнусобод", 8.0), ("Yunusabad", 9.0)])];
        let out = reconcile(&tables, &profile(), Path::new("data/raw")).unwrap();

        assert_eq!(out.rows.len(), 1);
        assert_eq!(out.rows[0].1[Transport.index()], 8.0);
    }

    #[test]
    fn unknown_names_pass_through_untouched() {
        let tables = [table(Transport, &[("Кукча", 5.0)])];
        let out = reconcile(&tables, &profile(), Path::new("data/raw")).unwrap();
        assert_eq!(out.rows[0].0, "Кукча");
    }

    #[test]
    fn all_zero_column_imputes_zero() {
        let tables = [
            table(Transport, &[("A", 3.0), ("B", 5.0)]),
            table(Poi, &[("A", 0.0), ("B", 0.0)]),
        ];
        let out = reconcile(&tables, &profile(), Path::new("data/raw")).unwrap();
        assert_eq!(out.rows[0].1[Poi.index()], 0.0);
        assert_eq!(out.rows[1].1[Poi.index()], 0.0);
    }

    #[test]
    fn no_tables_at_all_is_fatal() {
        let err = reconcile(&[], &profile(), Path::new("data/raw")).unwrap_err();
        assert!(matches!(err, Error::NoRawData(_)));
    }

    #[test]
    fn interpolated_median() {
        assert_eq!(median(&mut [3.0, 1.0, 2.0]), Some(2.0));
        assert_eq!(median(&mut [40.0, 10.0, 20.0, 30.0]), Some(25.0));
        assert_eq!(median(&mut []), None);
    }
}
