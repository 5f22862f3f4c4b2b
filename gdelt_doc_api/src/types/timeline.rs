//! Timeline types: the raw `timeline*` response and the merged time series.

use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

use super::article::GDELT_DATETIME_FORMAT;
use crate::query::QueryMode;
use crate::Error;

/// Column holding each row's timestamp.
pub const DATETIME_COLUMN: &str = "datetime";

/// Extra column added in `timelinevolraw` mode, built from each point's `norm`.
pub const ALL_ARTICLES_COLUMN: &str = "All Articles";

/// Raw timeline response body.
#[derive(Serialize, Deserialize)]
pub struct TimelineResponse {
    #[serde(default)]
    pub timeline: Vec<TimelineSeries>,
}

/// One named series, e.g. `Volume Intensity`, `English` or `United States`.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct TimelineSeries {
    pub series: String,
    #[serde(default)]
    pub data: Vec<TimelinePoint>,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct TimelinePoint {
    pub date: String,
    pub value: f64,
    /// Total monitored articles in the bucket. Only sent by `timelinevolraw`.
    #[serde(default)]
    pub norm: Option<f64>,
}

/// One timestamp and a value per series column. `None` means no data.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct TimelineRow {
    pub datetime: DateTime<Utc>,
    pub values: Vec<Option<f64>>,
}

/// A time-indexed table: one row per distinct timestamp, ascending, and one
/// column per series.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Timeline {
    pub mode: QueryMode,
    /// Series column names, in the order the API returned them.
    pub series: Vec<String>,
    pub rows: Vec<TimelineRow>,
}

impl Timeline {
    pub fn empty(mode: QueryMode) -> Self {
        Self {
            mode,
            series: Vec::new(),
            rows: Vec::new(),
        }
    }

    /// All column names, starting with [`DATETIME_COLUMN`].
    pub fn columns(&self) -> Vec<&str> {
        std::iter::once(DATETIME_COLUMN)
            .chain(self.series.iter().map(String::as_str))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Values of one series column, aligned with `rows`.
    pub fn column(&self, name: &str) -> Option<Vec<Option<f64>>> {
        let idx = self.series.iter().position(|s| s == name)?;
        Some(self.rows.iter().map(|r| r.values[idx]).collect())
    }

    /// Merges the raw series into rows, outer-joined on timestamp.
    ///
    /// A series without a point at some timestamp gets `None` there. Series
    /// with a repeated name are merged into one column.
    pub fn from_response(mode: QueryMode, resp: TimelineResponse) -> Result<Self, Error> {
        let mut series: Vec<String> = Vec::new();
        let mut by_time: BTreeMap<DateTime<Utc>, Vec<Option<f64>>> = BTreeMap::new();

        let mut set = |series: &mut Vec<String>, name: &str, at: DateTime<Utc>, value: f64| {
            let idx = match series.iter().position(|s| s == name) {
                Some(idx) => idx,
                None => {
                    series.push(name.to_string());
                    series.len() - 1
                }
            };
            let row = by_time.entry(at).or_default();
            if row.len() <= idx {
                row.resize(idx + 1, None);
            }
            row[idx] = Some(value);
        };

        for s in &resp.timeline {
            for point in &s.data {
                let at = parse_timestamp(&point.date)?;
                set(&mut series, &s.series, at, point.value);
            }
        }

        if mode == QueryMode::TimelineVolRaw {
            if let Some(first) = resp.timeline.first() {
                for point in &first.data {
                    if let Some(norm) = point.norm {
                        let at = parse_timestamp(&point.date)?;
                        set(&mut series, ALL_ARTICLES_COLUMN, at, norm);
                    }
                }
            }
        }

        let width = series.len();
        let rows = by_time
            .into_iter()
            .map(|(datetime, mut values)| {
                values.resize(width, None);
                TimelineRow { datetime, values }
            })
            .collect();

        Ok(Self { mode, series, rows })
    }
}

fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>, Error> {
    NaiveDateTime::parse_from_str(raw, GDELT_DATETIME_FORMAT)
        .map(|dt| dt.and_utc())
        .map_err(|e| Error::Parse(format!("invalid timeline date '{}': {}", raw, e)))
}
