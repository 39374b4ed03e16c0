// src/table.rs
// Tabular artifacts that move between pipeline stages, plus their CSV
// faces. Missing cells are Option<f64> until imputation; the types after
// that point cannot express a gap.

use std::io::Write;
use std::path::Path;

use crate::error::{Error, Result};
use crate::signal::SignalKind;

/* ---------------- raw per-signal tables ---------------- */

/// One row per district, one value column, produced by exactly one fetcher.
#[derive(Clone, Debug, PartialEq)]
pub struct SignalTable {
    pub kind: SignalKind,
    pub rows: Vec<(String, f64)>,
}

impl SignalTable {
    pub fn new(kind: SignalKind) -> Self {
        Self { kind, rows: Vec::new() }
    }

    pub fn push(&mut self, district: impl Into<String>, value: f64) {
        self.rows.push((district.into(), value));
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Strict reader for cache artifacts: exactly the two expected headers,
    /// every value a finite number. Anything else is `MalformedCache`, which
    /// the store treats as "no cache".
    pub fn read_csv(kind: SignalKind, path: &Path) -> Result<Self> {
        let malformed = |reason: String| Error::MalformedCache {
            path: path.to_path_buf(),
            reason,
        };

        let mut rdr = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_path(path)?;

        let headers = rdr.headers()?.clone();
        if headers.len() != 2 || &headers[0] != "District" || &headers[1] != kind.column() {
            return Err(malformed(format!(
                "expected headers District,{} got {:?}",
                kind.column(),
                headers
            )));
        }

        let mut table = SignalTable::new(kind);
        for record in rdr.records() {
            let record = record?;
            if record.len() != 2 {
                return Err(malformed(format!("row has {} fields", record.len())));
            }
            let value: f64 = record[1]
                .parse()
                .map_err(|_| malformed(format!("non-numeric value {:?}", &record[1])))?;
            // f64's parser happily accepts "NaN" and "inf"; neither is a
            // usable signal value.
            if !value.is_finite() {
                return Err(malformed(format!("non-finite value {:?}", &record[1])));
            }
            table.push(&record[0], value);
        }
        Ok(table)
    }

    pub fn write_csv<W: Write>(&self, w: W) -> Result<()> {
        let mut wtr = csv::Writer::from_writer(w);
        wtr.write_record(["District", self.kind.column()])?;
        for (district, value) in &self.rows {
            wtr.write_record([district.as_str(), value.to_string().as_str()])?;
        }
        wtr.flush()?;
        Ok(())
    }
}

/* ---------------- merged (pre-impute) ---------------- */

/// Outer join of the four signal tables. A cell is `None` when the district
/// never appeared in that signal's table, or when a zero was reclassified
/// as missing.
#[derive(Clone, Debug, PartialEq)]
pub struct MergedTable {
    pub rows: Vec<MergedRow>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct MergedRow {
    pub district: String,
    values: [Option<f64>; 4],
}

impl MergedRow {
    pub fn new(district: impl Into<String>) -> Self {
        Self { district: district.into(), values: [None; 4] }
    }

    pub fn get(&self, kind: SignalKind) -> Option<f64> {
        self.values[kind.index()]
    }

    pub fn set(&mut self, kind: SignalKind, value: Option<f64>) {
        self.values[kind.index()] = value;
    }
}

impl MergedTable {
    pub fn new() -> Self {
        Self { rows: Vec::new() }
    }

    /// Row for `district`, inserted at the back on first sight.
    /// Insertion order is the ranking tiebreak, so first-seen wins.
    pub fn row_mut(&mut self, district: &str) -> &mut MergedRow {
        if let Some(i) = self.rows.iter().position(|r| r.district == district) {
            return &mut self.rows[i];
        }
        let i = self.rows.len();
        self.rows.push(MergedRow::new(district));
        &mut self.rows[i]
    }
}

impl Default for MergedTable {
    fn default() -> Self {
        Self::new()
    }
}

/* ---------------- imputed / scored ---------------- */

/// Merged table after imputation: every cell populated, same row order.
#[derive(Clone, Debug, PartialEq)]
pub struct ImputedTable {
    pub rows: Vec<(String, [f64; 4])>,
}

/// Imputed values plus the derived normalized columns; this is the cleaned
/// artifact handed to the plotting/regression collaborators.
#[derive(Clone, Debug, PartialEq)]
pub struct CleanTable {
    pub rows: Vec<CleanRow>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct CleanRow {
    pub district: String,
    pub values: [f64; 4],
    pub norms: [f64; 4],
    pub affordability: f64,
}

/// Cleaned rows plus 0–10 factor scores and the composite, sorted
/// descending by composite score.
#[derive(Clone, Debug, PartialEq)]
pub struct RankedTable {
    pub rows: Vec<RankedRow>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct RankedRow {
    pub clean: CleanRow,
    /// Factor scores in `SignalKind::ALL` order; rent's slot holds the
    /// affordability direction.
    pub scores: [f64; 4],
    pub composite: f64,
}

fn clean_headers() -> Vec<&'static str> {
    let mut h = vec!["District"];
    h.extend(SignalKind::ALL.iter().map(|k| k.column()));
    h.extend(SignalKind::ALL.iter().map(|k| k.norm_column()));
    h.push("Rent_Affordability_Norm");
    h
}

fn push_clean_fields(record: &mut Vec<String>, row: &CleanRow) {
    record.push(row.district.clone());
    for v in row.values {
        record.push(v.to_string());
    }
    for n in row.norms {
        record.push(n.to_string());
    }
    record.push(row.affordability.to_string());
}

impl CleanTable {
    pub fn write_csv<W: Write>(&self, w: W) -> Result<()> {
        let mut wtr = csv::Writer::from_writer(w);
        wtr.write_record(clean_headers())?;
        for row in &self.rows {
            let mut record = Vec::with_capacity(10);
            push_clean_fields(&mut record, row);
            wtr.write_record(&record)?;
        }
        wtr.flush()?;
        Ok(())
    }
}

impl RankedTable {
    pub fn write_csv<W: Write>(&self, w: W) -> Result<()> {
        use SignalKind::*;

        let mut headers = clean_headers();
        // Score column order is fixed by the downstream report, not by ALL.
        for kind in [Transport, Jobs, Poi, Rent] {
            headers.push(kind.score_column());
        }
        headers.push("Composite_Score");

        let mut wtr = csv::Writer::from_writer(w);
        wtr.write_record(&headers)?;
        for row in &self.rows {
            let mut record = Vec::with_capacity(15);
            push_clean_fields(&mut record, &row.clean);
            for kind in [Transport, Jobs, Poi, Rent] {
                record.push(row.scores[kind.index()].to_string());
            }
            record.push(row.composite.to_string());
            wtr.write_record(&record)?;
        }
        wtr.flush()?;
        Ok(())
    }

    /// Best `n` districts with their composite score and raw rent.
    pub fn top(&self, n: usize) -> Vec<(&str, f64, f64)> {
        self.rows
            .iter()
            .take(n)
            .map(|r| {
                (
                    r.clean.district.as_str(),
                    r.composite,
                    r.clean.values[SignalKind::Rent.index()],
                )
            })
            .collect()
    }
}
