//! The [`Filters`] value and its compilation into API query parameters.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use url::Url;

use crate::Error;

use super::common::{BoolOp, FilterValue, SortBy};
use super::constraints::{Combined, Near, Repeat};
use super::mode::QueryMode;

/// Largest `maxrecords` the article list mode accepts.
pub const MAX_RECORDS: u32 = 250;

/// Units accepted in a timespan token, e.g. `90min`, `24h`, `3days`, `2months`.
pub const VALID_TIMESPAN_UNITS: &[&str] = &[
    "min", "h", "hours", "d", "days", "w", "weeks", "m", "months",
];

const DATETIME_FORMAT: &str = "%Y%m%d%H%M%S";

/// Search criteria for the DOC API.
///
/// Built with the `with_*` methods and checked when compiled. Exactly one of
/// a start/end date pair or a timespan must be set. Filters that take a
/// [`FilterValue`] accept a single string or a list, and lists are OR-combined.
///
/// ```
/// use gdelt_doc_api::{Filters, QueryMode};
/// use chrono::NaiveDate;
///
/// let filters = Filters::default()
///     .with_keyword(["airline", "carbon"])
///     .with_date_range(
///         NaiveDate::from_ymd_opt(2020, 5, 1).unwrap(),
///         NaiveDate::from_ymd_opt(2020, 5, 2).unwrap(),
///     );
/// assert_eq!(
///     filters.compile().unwrap(),
///     r#"(keyword:"airline" OR keyword:"carbon")"#
/// );
/// assert!(filters.to_query_pairs(QueryMode::ArtList).is_ok());
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Filters {
    start_date: Option<NaiveDateTime>,
    end_date: Option<NaiveDateTime>,
    timespan: Option<String>,
    num_records: u32,
    keyword: Option<FilterValue>,
    domain: Option<FilterValue>,
    domain_exact: Option<FilterValue>,
    country: Option<FilterValue>,
    language: Option<FilterValue>,
    theme: Option<FilterValue>,
    tone: Option<String>,
    tone_absolute: Option<String>,
    near: Option<Combined<Near>>,
    repeat: Option<Combined<Repeat>>,
    sort: Option<SortBy>,
}

impl Default for Filters {
    fn default() -> Self {
        Self {
            start_date: None,
            end_date: None,
            timespan: None,
            num_records: MAX_RECORDS,
            keyword: None,
            domain: None,
            domain_exact: None,
            country: None,
            language: None,
            theme: None,
            tone: None,
            tone_absolute: None,
            near: None,
            repeat: None,
            sort: None,
        }
    }
}

impl Filters {
    /// Sets an inclusive date range. Dates are taken as midnight UTC.
    pub fn with_date_range(self, start: NaiveDate, end: NaiveDate) -> Self {
        self.with_datetime_range(start.and_time(NaiveTime::MIN), end.and_time(NaiveTime::MIN))
    }

    /// Sets a date range with second granularity, in UTC.
    pub fn with_datetime_range(mut self, start: NaiveDateTime, end: NaiveDateTime) -> Self {
        self.start_date = Some(start);
        self.end_date = Some(end);
        self
    }

    pub fn with_start_date(mut self, start: NaiveDateTime) -> Self {
        self.start_date = Some(start);
        self
    }

    pub fn with_end_date(mut self, end: NaiveDateTime) -> Self {
        self.end_date = Some(end);
        self
    }

    /// Searches a window relative to the time of the request, e.g. `"3days"`.
    pub fn with_timespan(mut self, timespan: &str) -> Self {
        self.timespan = Some(timespan.to_string());
        self
    }

    /// Number of articles to return. Only used by the article list mode.
    pub fn with_num_records(mut self, num_records: u32) -> Self {
        self.num_records = num_records;
        self
    }

    /// Matches the exact phrase in the article text.
    pub fn with_keyword(mut self, keyword: impl Into<FilterValue>) -> Self {
        self.keyword = Some(keyword.into());
        self
    }

    /// Matches articles from the domain. Not an exact match: `cnn.com` also
    /// matches `subdomain.cnn.com`.
    pub fn with_domain(mut self, domain: impl Into<FilterValue>) -> Self {
        self.domain = Some(domain.into());
        self
    }

    /// Like [`Filters::with_domain`], but requires an exact match.
    pub fn with_domain_exact(mut self, domain: impl Into<FilterValue>) -> Self {
        self.domain_exact = Some(domain.into());
        self
    }

    /// Matches articles published in a country, as a 2-letter FIPS code.
    pub fn with_country(mut self, country: impl Into<FilterValue>) -> Self {
        self.country = Some(country.into());
        self
    }

    /// Matches articles published in a language, as an ISO 639 code.
    pub fn with_language(mut self, language: impl Into<FilterValue>) -> Self {
        self.language = Some(language.into());
        self
    }

    /// Matches articles covering one of GDELT's GKG themes.
    pub fn with_theme(mut self, theme: impl Into<FilterValue>) -> Self {
        self.theme = Some(theme.into());
        self
    }

    /// Matches articles above or below a tone score, e.g. `">5"` or `"<-5"`.
    pub fn with_tone(mut self, tone: &str) -> Self {
        self.tone = Some(tone.to_string());
        self
    }

    /// Like [`Filters::with_tone`], but compares the absolute tone.
    pub fn with_tone_absolute(mut self, tone: &str) -> Self {
        self.tone_absolute = Some(tone.to_string());
        self
    }

    pub fn with_near(mut self, near: Near) -> Self {
        self.near = Some(Combined::One(near));
        self
    }

    /// Several proximity constraints joined by `op`.
    pub fn with_nears(mut self, op: BoolOp, nears: Vec<Near>) -> Self {
        self.near = Some(Combined::Many(op, nears));
        self
    }

    pub fn with_repeat(mut self, repeat: Repeat) -> Self {
        self.repeat = Some(Combined::One(repeat));
        self
    }

    /// Several repetition constraints joined by `op`.
    pub fn with_repeats(mut self, op: BoolOp, repeats: Vec<Repeat>) -> Self {
        self.repeat = Some(Combined::Many(op, repeats));
        self
    }

    pub fn with_sort(mut self, sort: SortBy) -> Self {
        self.sort = Some(sort);
        self
    }

    pub fn num_records(&self) -> u32 {
        self.num_records
    }

    pub fn timespan(&self) -> Option<&str> {
        self.timespan.as_deref()
    }

    pub fn date_range(&self) -> Option<(NaiveDateTime, NaiveDateTime)> {
        self.start_date.zip(self.end_date)
    }

    /// Validates the filters and renders the search expression.
    ///
    /// Clauses are space-joined in a fixed order and unset filters are left
    /// out, so a filter with only a date range compiles to `""`.
    pub fn compile(&self) -> Result<String, Error> {
        self.validate_window()?;

        let mut clauses: Vec<String> = Vec::new();
        let fields = [
            ("keyword", &self.keyword),
            ("domain", &self.domain),
            ("domainis", &self.domain_exact),
            ("sourcecountry", &self.country),
            ("sourcelang", &self.language),
            ("theme", &self.theme),
        ];
        for (field, value) in fields {
            if let Some(value) = value {
                if field == "sourcecountry" {
                    validate_countries(value)?;
                }
                clauses.push(value.render(field)?);
            }
        }
        if let Some(tone) = &self.tone {
            clauses.push(format!("tone{}", validate_tone(tone)?));
        }
        if let Some(tone) = &self.tone_absolute {
            clauses.push(format!("toneabs{}", validate_tone(tone)?));
        }
        if let Some(near) = &self.near {
            clauses.push(near.render(Near::render)?);
        }
        if let Some(repeat) = &self.repeat {
            clauses.push(repeat.render(Repeat::render)?);
        }

        Ok(clauses.join(" "))
    }

    /// Compiles the filters into the `(name, value)` pairs sent for `mode`.
    ///
    /// `maxrecords` is only checked and sent for [`QueryMode::ArtList`].
    pub fn to_query_pairs(&self, mode: QueryMode) -> Result<Vec<(String, String)>, Error> {
        let query = self.compile()?;
        let mut pairs = vec![("query".to_string(), query)];

        match (&self.start_date, &self.end_date, &self.timespan) {
            (Some(start), Some(end), None) => {
                pairs.push(("startdatetime".to_string(), start.format(DATETIME_FORMAT).to_string()));
                pairs.push(("enddatetime".to_string(), end.format(DATETIME_FORMAT).to_string()));
            }
            (None, None, Some(timespan)) => {
                pairs.push(("timespan".to_string(), timespan.trim().to_string()));
            }
            // compile() has already rejected every other combination
            _ => return Err(Error::validation("Must provide either start_date and end_date, or timespan")),
        }

        if mode == QueryMode::ArtList {
            if self.num_records == 0 || self.num_records > MAX_RECORDS {
                return Err(Error::validation(format!(
                    "num_records must be between 1 and {}, not {}",
                    MAX_RECORDS, self.num_records
                )));
            }
            pairs.push(("maxrecords".to_string(), self.num_records.to_string()));
        }

        if let Some(sort) = self.sort {
            pairs.push(("sort".to_string(), sort.to_string()));
        }

        Ok(pairs)
    }

    /// Appends the full parameter set for `mode` to `url`, including `mode`
    /// and `format=json`.
    pub fn add_to_url(&self, url: &Url, mode: QueryMode) -> Result<Url, Error> {
        let pairs = self.to_query_pairs(mode)?;
        let mut url = url.clone();
        {
            let mut query = url.query_pairs_mut();
            for (name, value) in &pairs {
                query.append_pair(name, value);
            }
            query.append_pair("mode", mode.as_str());
            query.append_pair("format", "json");
        }
        Ok(url)
    }

    fn validate_window(&self) -> Result<(), Error> {
        match (&self.start_date, &self.end_date, &self.timespan) {
            (None, None, None) => Err(Error::validation(
                "Must provide either start_date and end_date, or timespan",
            )),
            (Some(_), _, Some(_)) | (_, Some(_), Some(_)) => Err(Error::validation(
                "Can only provide either start_date and end_date, or timespan",
            )),
            (Some(_), None, None) | (None, Some(_), None) => Err(Error::validation(
                "Must provide both start_date and end_date",
            )),
            (Some(start), Some(end), None) => {
                if start > end {
                    Err(Error::validation(format!(
                        "start_date {} is after end_date {}",
                        start, end
                    )))
                } else {
                    Ok(())
                }
            }
            (None, None, Some(timespan)) => validate_timespan(timespan),
        }
    }
}

/// Checks a timespan token such as `60min`, `24h`, `30days` or `2months`.
pub fn validate_timespan(timespan: &str) -> Result<(), Error> {
    let timespan = timespan.trim();
    let unit_start = timespan
        .char_indices()
        .rev()
        .take_while(|(_, c)| c.is_ascii_lowercase())
        .last()
        .map(|(i, _)| i)
        .unwrap_or(timespan.len());
    let (value, unit) = timespan.split_at(unit_start);

    if !VALID_TIMESPAN_UNITS.contains(&unit) {
        return Err(Error::validation(format!(
            "Timespan {} is invalid. {} is not a supported unit, must be one of {}",
            timespan,
            unit,
            VALID_TIMESPAN_UNITS.join(" ")
        )));
    }
    if value.is_empty() || !value.chars().all(|c| c.is_ascii_digit()) {
        return Err(Error::validation(format!(
            "Timespan {} is invalid. {} could not be converted into an integer",
            timespan, value
        )));
    }
    let amount: u64 = value.parse().map_err(|_| {
        Error::validation(format!("Timespan {} is invalid. {} is out of range", timespan, value))
    })?;
    if amount == 0 {
        return Err(Error::validation(format!(
            "Timespan {} is invalid. Period must be greater than zero",
            timespan
        )));
    }
    if unit == "min" && amount < 60 {
        return Err(Error::validation(format!(
            "Timespan {} is invalid. Period must be at least 60 minutes",
            timespan
        )));
    }
    Ok(())
}

/// Checks a tone comparison such as `>5` or `<-2.5` and returns it trimmed.
pub fn validate_tone(tone: &str) -> Result<&str, Error> {
    let tone = tone.trim();
    if tone.contains('=') {
        return Err(Error::validation("Tone cannot contain '='"));
    }
    let threshold = tone
        .strip_prefix('<')
        .or_else(|| tone.strip_prefix('>'))
        .ok_or_else(|| Error::validation("Tone must contain either greater than or less than"))?;
    if threshold.trim().parse::<f64>().is_err() {
        return Err(Error::validation(format!(
            "Tone threshold {} is not a number",
            threshold
        )));
    }
    Ok(tone)
}

fn validate_countries(value: &FilterValue) -> Result<(), Error> {
    for code in value.values() {
        let code = code.trim();
        if code.len() != 2 || !code.chars().all(|c| c.is_ascii_alphabetic()) {
            return Err(Error::validation(format!(
                "country must be a 2-letter country code, not '{}'",
                code
            )));
        }
    }
    Ok(())
}

/// Parses `YYYY-MM-DD`, `YYYY-MM-DD HH:MM:SS` or `YYYY-MM-DDTHH:MM:SS` as UTC.
pub fn parse_date(input: &str) -> Result<NaiveDateTime, Error> {
    let input = input.trim();
    if let Ok(date) = NaiveDate::parse_from_str(input, "%Y-%m-%d") {
        return Ok(date.and_time(NaiveTime::MIN));
    }
    NaiveDateTime::parse_from_str(input, "%Y-%m-%d %H:%M:%S")
        .or_else(|_| NaiveDateTime::parse_from_str(input, "%Y-%m-%dT%H:%M:%S"))
        .map_err(|_| {
            Error::validation(format!(
                "invalid date '{}', expected YYYY-MM-DD or YYYY-MM-DD HH:MM:SS",
                input
            ))
        })
}
