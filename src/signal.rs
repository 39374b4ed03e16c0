// src/signal.rs
// The four measured signals and their table shapes. Everything downstream
// (cache names, merge semantics, column headers) keys off this enum.

use std::fmt;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SignalKind {
    Transport,
    Rent,
    Jobs,
    Poi,
}

impl SignalKind {
    /// Acquisition and merge order. Transport first: its table seeds the
    /// outer join, so its district order leads the output.
    pub const ALL: [SignalKind; 4] = [
        SignalKind::Transport,
        SignalKind::Rent,
        SignalKind::Jobs,
        SignalKind::Poi,
    ];

    /// Value column header in the raw and merged tables.
    pub fn column(self) -> &'static str {
        match self {
            SignalKind::Transport => "Transport_Score",
            SignalKind::Rent => "Rent_Price_USD",
            SignalKind::Jobs => "Tech_Jobs_Count",
            SignalKind::Poi => "Cultural_POI_Count",
        }
    }

    /// Derived min-max column header.
    pub fn norm_column(self) -> &'static str {
        match self {
            SignalKind::Transport => "Transport_Score_Norm",
            SignalKind::Rent => "Rent_Price_USD_Norm",
            SignalKind::Jobs => "Tech_Jobs_Count_Norm",
            SignalKind::Poi => "Cultural_POI_Count_Norm",
        }
    }

    /// 0–10 factor score header. Rent's factor is the affordability
    /// direction, hence the plain name.
    pub fn score_column(self) -> &'static str {
        match self {
            SignalKind::Transport => "Score_Transport",
            SignalKind::Rent => "Score_Rent",
            SignalKind::Jobs => "Score_Jobs",
            SignalKind::Poi => "Score_POI",
        }
    }

    /// Position in [`Self::ALL`]; merged-table cells are laid out in this
    /// order.
    pub fn index(self) -> usize {
        match self {
            SignalKind::Transport => 0,
            SignalKind::Rent => 1,
            SignalKind::Jobs => 2,
            SignalKind::Poi => 3,
        }
    }

    /// Cache artifact name under the raw data directory.
    pub fn cache_file(self) -> &'static str {
        match self {
            SignalKind::Transport => "raw_transport.csv",
            SignalKind::Rent => "raw_rent.csv",
            SignalKind::Jobs => "raw_jobs.csv",
            SignalKind::Poi => "raw_pois.csv",
        }
    }

    /// Whether an exact 0.0 reads as "no observation" for this signal.
    /// A true zero is implausible for rent, offices and POIs in districts
    /// of this size; for transport it is a legitimate reading (no metro).
    pub fn zero_is_missing(self) -> bool {
        !matches!(self, SignalKind::Transport)
    }

    pub fn label(self) -> &'static str {
        match self {
            SignalKind::Transport => "transport",
            SignalKind::Rent => "rent",
            SignalKind::Jobs => "jobs",
            SignalKind::Poi => "poi",
        }
    }
}

impl fmt::Display for SignalKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
