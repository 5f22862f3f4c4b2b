//! Client for the GDELT DOC 2.0 API.
//!
//! Build a [`Filters`] value, then run it through [`Client::article_search`]
//! for a list of matching articles or [`Client::timeline_search`] for one of
//! the five timeline views.
//!
//! ```no_run
//! use gdelt_doc_api::{Client, Filters, QueryMode};
//!
//! # async fn run() -> Result<(), gdelt_doc_api::Error> {
//! let filters = Filters::default()
//!     .with_keyword("climate change")
//!     .with_timespan("3days");
//!
//! let client = Client::new()?;
//! let articles = client.article_search(&filters).await?;
//! let timeline = client.timeline_search(QueryMode::TimelineVol, &filters).await?;
//! # Ok(())
//! # }
//! ```

mod client;
mod errors;
pub mod query;
pub mod sanitize;
pub mod types;
mod user_agent;
pub use self::client::{Client, DEFAULT_BASE_URL};
pub use self::errors::{Error, StatusKind};
pub use self::query::{BoolOp, FilterValue, Filters, Near, QueryMode, Repeat, SortBy};
pub use self::sanitize::Sanitizer;
pub use self::types::{Article, ArticleList, Timeline, TimelineRow};
