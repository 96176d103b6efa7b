// Fingrid open data datasets used by the production job.
// https://data.fingrid.fi/en/datasets

use std::fmt::Display;

use jiff::Timestamp;

/// An ordered sequence of readings for one dataset.
pub type Series = Vec<i64>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Dataset {
    /// Electricity consumption in Finland
    Consumption,
    /// Electricity production in Finland
    Production,
    /// Wind power generation
    Wind,
    /// Nuclear power production
    Nuclear,
    /// Hydro power production
    Water,
}

impl Dataset {
    /// Fetch order of one run.  Consumption and production come first because
    /// they are paired position by position later on.
    pub const ALL: [Dataset; 5] = [
        Dataset::Consumption,
        Dataset::Production,
        Dataset::Wind,
        Dataset::Nuclear,
        Dataset::Water,
    ];

    pub fn id(&self) -> u32 {
        use Dataset::*;
        match self {
            Consumption => 124,
            Production => 74,
            Wind => 181,
            Nuclear => 188,
            Water => 191,
        }
    }

    /// Finnish label used when grouping production by source.  [None] for
    /// the totals, which are not grouped.
    pub fn label(&self) -> Option<&'static str> {
        use Dataset::*;
        match self {
            Consumption | Production => None,
            Wind => Some("Tuulivoima"),
            Nuclear => Some("Ydinvoima"),
            Water => Some("Vesivoima"),
        }
    }
}

impl Display for Dataset {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        use Dataset::*;
        match self {
            Consumption => write!(f, "consumption"),
            Production => write!(f, "production"),
            Wind => write!(f, "wind"),
            Nuclear => write!(f, "nuclear"),
            Water => write!(f, "water"),
        }
    }
}

/// The `[start, end]` window requested from the API.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeWindow {
    pub start: Timestamp,
    pub end: Timestamp,
}

impl Default for TimeWindow {
    /// 2023-01-28T12:15:00Z to 2023-06-28T12:30:00Z
    fn default() -> Self {
        TimeWindow {
            start: Timestamp::constant(1_674_908_100, 0),
            end: Timestamp::constant(1_687_955_400, 0),
        }
    }
}
