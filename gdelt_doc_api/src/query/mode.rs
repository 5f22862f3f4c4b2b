use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::Error;

/// The API mode, which selects both the endpoint behaviour and the response shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QueryMode {
    /// A list of articles matching the filters.
    ArtList,
    /// Coverage volume as a percentage of all monitored articles.
    TimelineVol,
    /// Like `TimelineVol`, with raw article counts and the total per bucket.
    TimelineVolRaw,
    /// Volume broken down by publication language, one series per language.
    TimelineLang,
    /// Volume broken down by source country, one series per country.
    TimelineSourceCountry,
    /// Average tone of matching coverage.
    TimelineTone,
}

impl QueryMode {
    pub const TIMELINE_MODES: [QueryMode; 5] = [
        QueryMode::TimelineVol,
        QueryMode::TimelineVolRaw,
        QueryMode::TimelineLang,
        QueryMode::TimelineSourceCountry,
        QueryMode::TimelineTone,
    ];

    /// The token sent as the `mode` query parameter.
    pub fn as_str(&self) -> &'static str {
        match self {
            QueryMode::ArtList => "artlist",
            QueryMode::TimelineVol => "timelinevol",
            QueryMode::TimelineVolRaw => "timelinevolraw",
            QueryMode::TimelineLang => "timelinelang",
            QueryMode::TimelineSourceCountry => "timelinesourcecountry",
            QueryMode::TimelineTone => "timelinetone",
        }
    }

    pub fn is_timeline(&self) -> bool {
        !matches!(self, QueryMode::ArtList)
    }

    /// Whether the response carries one series per language or country.
    pub fn is_multi_series(&self) -> bool {
        matches!(
            self,
            QueryMode::TimelineLang | QueryMode::TimelineSourceCountry
        )
    }
}

impl std::fmt::Display for QueryMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for QueryMode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "artlist" => Ok(QueryMode::ArtList),
            "timelinevol" => Ok(QueryMode::TimelineVol),
            "timelinevolraw" => Ok(QueryMode::TimelineVolRaw),
            "timelinelang" => Ok(QueryMode::TimelineLang),
            "timelinesourcecountry" => Ok(QueryMode::TimelineSourceCountry),
            "timelinetone" => Ok(QueryMode::TimelineTone),
            _ => Err(Error::InvalidMode(s.to_string())),
        }
    }
}
