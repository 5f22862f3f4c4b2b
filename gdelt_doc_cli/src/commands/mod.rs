//! CLI subcommand implementations.

pub mod articles;
pub mod filter_args;
pub mod timeline;
