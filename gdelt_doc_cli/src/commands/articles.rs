use anyhow::Result;
use clap::Args;
use gdelt_doc_api::Client;

use crate::commands::filter_args::FilterArgs;
use crate::output::{
    print_articles_csv, print_articles_markdown, print_articles_table, print_json, OutputFormat,
};

#[derive(Args)]
pub struct ArticlesArgs {
    #[command(flatten)]
    pub filters: FilterArgs,

    /// Maximum number of articles to return (1-250)
    #[arg(long, default_value = "250")]
    pub max_records: u32,
}

pub async fn run(args: &ArticlesArgs, client: &Client, format: &OutputFormat) -> Result<()> {
    let filters = args.filters.to_filters()?.with_num_records(args.max_records);

    let articles = client.article_search(&filters).await?;

    eprintln!("{} articles", articles.len());

    match format {
        OutputFormat::Table => print_articles_table(&articles),
        OutputFormat::Json => print_json(&articles.articles),
        OutputFormat::Csv => print_articles_csv(&articles)?,
        OutputFormat::Markdown => print_articles_markdown(&articles),
    }

    Ok(())
}
