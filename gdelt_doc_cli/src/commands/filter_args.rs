//! Filter flags shared by the `articles` and `timeline` subcommands.

use anyhow::{anyhow, bail, Result};
use clap::Args;
use gdelt_doc_api::query::parse_date;
use gdelt_doc_api::{BoolOp, FilterValue, Filters, Near, Repeat, SortBy};

#[derive(Args, Debug, Default)]
pub struct FilterArgs {
    /// Start of the date range, YYYY-MM-DD or "YYYY-MM-DD HH:MM:SS" (UTC)
    #[arg(long, requires = "end")]
    pub start: Option<String>,

    /// End of the date range, same formats as --start
    #[arg(long, requires = "start")]
    pub end: Option<String>,

    /// Window relative to now instead of a date range (e.g. 24h, 3days, 2months)
    #[arg(long, conflicts_with_all = ["start", "end"])]
    pub timespan: Option<String>,

    /// Exact word or phrase; repeat the flag to match any of several
    #[arg(long)]
    pub keyword: Vec<String>,

    /// Source domain, inexact match (e.g. cnn.com); repeatable
    #[arg(long)]
    pub domain: Vec<String>,

    /// Source domain, exact match; repeatable
    #[arg(long)]
    pub domain_exact: Vec<String>,

    /// 2-letter FIPS country code of the source (e.g. US, UK); repeatable
    #[arg(long)]
    pub country: Vec<String>,

    /// ISO 639 language code of the source (e.g. eng, fra); repeatable
    #[arg(long)]
    pub language: Vec<String>,

    /// GKG theme (e.g. ENV_CLIMATECHANGE); repeatable
    #[arg(long)]
    pub theme: Vec<String>,

    /// Tone threshold such as ">5" or "<-5"
    #[arg(long, allow_hyphen_values = true)]
    pub tone: Option<String>,

    /// Absolute tone threshold such as ">10"
    #[arg(long, allow_hyphen_values = true)]
    pub tone_absolute: Option<String>,

    /// Proximity constraint as DISTANCE:WORD,WORD[,...] (e.g. 5:airline,crisis); repeatable
    #[arg(long)]
    pub near: Vec<String>,

    /// How several --near constraints combine: and, or
    #[arg(long, default_value = "or")]
    pub near_op: String,

    /// Repetition constraint as COUNT:WORD (e.g. 3:environment); repeatable
    #[arg(long)]
    pub repeat: Vec<String>,

    /// How several --repeat constraints combine: and, or
    #[arg(long, default_value = "and")]
    pub repeat_op: String,

    /// Sort order: DateDesc, DateAsc, ToneDesc, ToneAsc, HybridRel
    #[arg(long)]
    pub sort: Option<String>,
}

impl FilterArgs {
    /// Builds the library filters. Validation of the combination happens when
    /// the filters are compiled by the client.
    pub fn to_filters(&self) -> Result<Filters> {
        let mut filters = Filters::default();

        if let (Some(start), Some(end)) = (&self.start, &self.end) {
            filters = filters.with_datetime_range(parse_date(start)?, parse_date(end)?);
        }
        if let Some(ref timespan) = self.timespan {
            filters = filters.with_timespan(timespan);
        }
        if let Some(v) = to_value(&self.keyword) {
            filters = filters.with_keyword(v);
        }
        if let Some(v) = to_value(&self.domain) {
            filters = filters.with_domain(v);
        }
        if let Some(v) = to_value(&self.domain_exact) {
            filters = filters.with_domain_exact(v);
        }
        if let Some(v) = to_value(&self.country) {
            let codes: Vec<String> = v.values().map(str::to_uppercase).collect();
            filters = filters.with_country(codes);
        }
        if let Some(v) = to_value(&self.language) {
            filters = filters.with_language(v);
        }
        if let Some(v) = to_value(&self.theme) {
            filters = filters.with_theme(v);
        }
        if let Some(ref tone) = self.tone {
            filters = filters.with_tone(tone);
        }
        if let Some(ref tone) = self.tone_absolute {
            filters = filters.with_tone_absolute(tone);
        }

        let mut nears = self
            .near
            .iter()
            .map(|s| parse_near(s))
            .collect::<Result<Vec<_>>>()?;
        match nears.len() {
            0 => {}
            1 => filters = filters.with_near(nears.remove(0)),
            _ => filters = filters.with_nears(self.near_op.parse::<BoolOp>()?, nears),
        }

        let mut repeats = self
            .repeat
            .iter()
            .map(|s| parse_repeat(s))
            .collect::<Result<Vec<_>>>()?;
        match repeats.len() {
            0 => {}
            1 => filters = filters.with_repeat(repeats.remove(0)),
            _ => filters = filters.with_repeats(self.repeat_op.parse::<BoolOp>()?, repeats),
        }

        if let Some(ref sort) = self.sort {
            filters = filters.with_sort(sort.parse::<SortBy>()?);
        }

        Ok(filters)
    }
}

fn to_value(values: &[String]) -> Option<FilterValue> {
    match values {
        [] => None,
        [one] => Some(FilterValue::Single(one.clone())),
        many => Some(FilterValue::Many(many.to_vec())),
    }
}

/// Parses `DISTANCE:WORD,WORD[,...]`.
pub fn parse_near(input: &str) -> Result<Near> {
    let (distance, words) = input
        .split_once(':')
        .ok_or_else(|| anyhow!("near must look like DISTANCE:WORD,WORD, got '{}'", input))?;
    let distance: u32 = distance
        .trim()
        .parse()
        .map_err(|_| anyhow!("near distance '{}' is not a positive integer", distance))?;
    let words: Vec<&str> = words.split(',').map(str::trim).collect();
    if words.len() < 2 {
        bail!("near needs at least two words, got '{}'", input);
    }
    Ok(Near::new(distance, words))
}

/// Parses `COUNT:WORD`.
pub fn parse_repeat(input: &str) -> Result<Repeat> {
    let (count, word) = input
        .split_once(':')
        .ok_or_else(|| anyhow!("repeat must look like COUNT:WORD, got '{}'", input))?;
    let count: u32 = count
        .trim()
        .parse()
        .map_err(|_| anyhow!("repeat count '{}' is not a positive integer", count))?;
    Ok(Repeat::new(count, word.trim()))
}
