use anyhow::Result;
use chrono::SecondsFormat;
use clap::ValueEnum;
use gdelt_doc_api::{Article, ArticleList, Timeline};
use serde::Serialize;
use serde_json::{Map, Value};
use tabled::builder::Builder;
use tabled::settings::Style;
use tabled::{Table, Tabled};

#[derive(Clone, Debug, ValueEnum)]
pub enum OutputFormat {
    Table,
    Json,
    Csv,
    #[value(alias = "md")]
    Markdown,
}

#[derive(Tabled, Serialize)]
struct ArticleRow {
    #[tabled(rename = "Date")]
    #[serde(rename = "Date")]
    seen: String,
    #[tabled(rename = "Title")]
    #[serde(rename = "Title")]
    title: String,
    #[tabled(rename = "Domain")]
    #[serde(rename = "Domain")]
    domain: String,
    #[tabled(rename = "Language")]
    #[serde(rename = "Language")]
    language: String,
    #[tabled(rename = "Country")]
    #[serde(rename = "Country")]
    country: String,
    #[tabled(rename = "URL")]
    #[serde(rename = "URL")]
    url: String,
}

fn build_article_rows(articles: &[Article]) -> Vec<ArticleRow> {
    articles
        .iter()
        .map(|a| ArticleRow {
            seen: format_seen(a),
            title: a.title.clone(),
            domain: a.domain.clone(),
            language: a.language.clone(),
            country: a.sourcecountry.clone(),
            url: a.url.clone(),
        })
        .collect()
}

fn format_seen(article: &Article) -> String {
    match article.seen_at() {
        Some(dt) => dt.format("%Y-%m-%d %H:%M").to_string(),
        None => article.seendate.clone(),
    }
}

fn format_cell(value: Option<f64>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

/// Header plus one record per timestamp; missing cells are empty strings.
fn timeline_records(timeline: &Timeline) -> Vec<Vec<String>> {
    let mut records = Vec::with_capacity(timeline.len() + 1);
    records.push(timeline.columns().into_iter().map(String::from).collect());
    for row in &timeline.rows {
        let mut record = Vec::with_capacity(row.values.len() + 1);
        record.push(row.datetime.format("%Y-%m-%d %H:%M:%S").to_string());
        record.extend(row.values.iter().map(|v| format_cell(*v)));
        records.push(record);
    }
    records
}

fn timeline_table(timeline: &Timeline) -> Table {
    let mut builder = Builder::default();
    for record in timeline_records(timeline) {
        builder.push_record(record);
    }
    builder.build()
}

/// One JSON object per timestamp, keyed by column name. Missing cells are `null`.
pub fn timeline_json_rows(timeline: &Timeline) -> Vec<Map<String, Value>> {
    let columns = timeline.columns();
    timeline
        .rows
        .iter()
        .map(|row| {
            let mut obj = Map::new();
            obj.insert(
                columns[0].to_string(),
                Value::String(row.datetime.to_rfc3339_opts(SecondsFormat::Secs, true)),
            );
            for (name, value) in columns[1..].iter().zip(row.values.iter().copied()) {
                let cell = value
                    .and_then(serde_json::Number::from_f64)
                    .map(Value::Number)
                    .unwrap_or(Value::Null);
                obj.insert(name.to_string(), cell);
            }
            obj
        })
        .collect()
}

// -- Table output --

pub fn print_articles_table(articles: &ArticleList) {
    println!("{}", Table::new(build_article_rows(&articles.articles)));
}

pub fn print_timeline_table(timeline: &Timeline) {
    println!("{}", timeline_table(timeline));
}

// -- Markdown output --

pub fn print_articles_markdown(articles: &ArticleList) {
    let mut table = Table::new(build_article_rows(&articles.articles));
    table.with(Style::markdown());
    println!("{}", table);
}

pub fn print_timeline_markdown(timeline: &Timeline) {
    let mut table = timeline_table(timeline);
    table.with(Style::markdown());
    println!("{}", table);
}

// -- CSV output --

/// CSV keeps every article column, not just the ones shown in the table.
pub fn print_articles_csv(articles: &ArticleList) -> Result<()> {
    let mut wtr = csv::Writer::from_writer(std::io::stdout());
    write_articles_csv(&mut wtr, articles)?;
    wtr.flush()?;
    Ok(())
}

fn write_articles_csv<W: std::io::Write>(
    wtr: &mut csv::Writer<W>,
    articles: &ArticleList,
) -> Result<()> {
    if articles.is_empty() {
        wtr.write_record(ArticleList::COLUMNS)?;
    }
    for article in articles.iter() {
        wtr.serialize(article)?;
    }
    Ok(())
}

pub fn print_timeline_csv(timeline: &Timeline) -> Result<()> {
    let mut wtr = csv::Writer::from_writer(std::io::stdout());
    for record in timeline_records(timeline) {
        wtr.write_record(&record)?;
    }
    wtr.flush()?;
    Ok(())
}

// -- JSON output --

pub fn print_json<T: serde::Serialize>(data: &T) {
    match serde_json::to_string_pretty(data) {
        Ok(json) => println!("{}", json),
        Err(e) => eprintln!("Failed to serialize to JSON: {}", e),
    }
}
