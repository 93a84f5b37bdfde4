use clap::{Args, Parser, Subcommand};
use readwise_common::readwise::DEFAULT_API_ENDPOINT;
use readwise_common::Category;

/// Exports highlights from Readwise and formats them as a Tana paste.
#[derive(Debug, Parser)]
#[command(name = "tana-readwise-exporter", version)]
pub struct Cli {
    /// Print debugging logs
    #[arg(long, short, global = true)]
    pub debug: bool,

    /// Base url of the Readwise API
    #[arg(
        long,
        env = "READWISE_API_URL",
        default_value = DEFAULT_API_ENDPOINT,
        global = true,
        hide = true
    )]
    pub api_url: String,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// List the books
    #[command(alias = "l")]
    List(ListCommand),

    /// Export the highlights
    #[command(alias = "e")]
    Export(ExportCommand),
}

#[derive(Debug, Args)]
pub struct TokenArgs {
    /// Readwise API token
    #[arg(long, short, env = "READWISE_TOKEN", hide_env_values = true)]
    pub token: String,
}

#[derive(Debug, Args)]
pub struct ListCommand {
    /// Category to list from: 'books', 'articles', 'tweets', 'podcasts', etc
    #[arg(long, short, default_value = "books")]
    pub category: Category,

    #[command(flatten)]
    pub auth: TokenArgs,
}

#[derive(Debug, Args)]
pub struct ExportCommand {
    #[command(flatten)]
    pub auth: TokenArgs,

    /// Only export highlights updated within this many days
    #[arg(long, short)]
    pub updated_after: Option<i64>,

    /// Ids of books/articles to fetch the highlights for. Allows multiple.
    #[arg(long, short, value_delimiter = ',')]
    pub ids: Vec<String>,
}
