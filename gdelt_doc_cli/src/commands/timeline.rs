use anyhow::Result;
use clap::Args;
use gdelt_doc_api::{Client, QueryMode};

use crate::commands::filter_args::FilterArgs;
use crate::output::{
    print_json, print_timeline_csv, print_timeline_markdown, print_timeline_table,
    timeline_json_rows, OutputFormat,
};

#[derive(Args)]
pub struct TimelineArgs {
    /// Timeline mode: vol, volraw, lang, sourcecountry, tone
    #[arg(long, default_value = "vol")]
    pub mode: String,

    #[command(flatten)]
    pub filters: FilterArgs,
}

/// Accepts the short names shown in `--help` as well as the API's own mode tokens.
pub fn parse_mode(input: &str) -> Result<QueryMode> {
    let mode = match input.trim().to_lowercase().as_str() {
        "vol" | "volume" => QueryMode::TimelineVol,
        "volraw" => QueryMode::TimelineVolRaw,
        "lang" | "language" => QueryMode::TimelineLang,
        "sourcecountry" | "country" => QueryMode::TimelineSourceCountry,
        "tone" => QueryMode::TimelineTone,
        other => other.parse::<QueryMode>()?,
    };
    Ok(mode)
}

pub async fn run(args: &TimelineArgs, client: &Client, format: &OutputFormat) -> Result<()> {
    let mode = parse_mode(&args.mode)?;
    let filters = args.filters.to_filters()?;

    let timeline = client.timeline_search(mode, &filters).await?;

    eprintln!(
        "{} rows, {} series ({})",
        timeline.len(),
        timeline.series.len(),
        mode
    );

    match format {
        OutputFormat::Table => print_timeline_table(&timeline),
        OutputFormat::Json => print_json(&timeline_json_rows(&timeline)),
        OutputFormat::Csv => print_timeline_csv(&timeline)?,
        OutputFormat::Markdown => print_timeline_markdown(&timeline),
    }

    Ok(())
}
