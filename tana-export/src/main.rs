use anyhow::Context as _;
use chrono::Utc;
use clap::Parser;
use readwise_common::{ExportQuery, Item, Readwise};
use serde::Serialize;
use std::io::Write;
use tracing::{info, Level};

use crate::cli::{Cli, Command, ExportCommand, ListCommand};
use crate::tana::TanaFormatter;

mod cli;
mod tana;

fn readwise(cli: &Cli, token: &str) -> anyhow::Result<Readwise> {
    Readwise::with_endpoint(reqwest::Client::new(), token, &cli.api_url)
        .with_context(|| format!("Invalid Readwise API url {}", cli.api_url))
}

async fn list(readwise: &Readwise, command: &ListCommand) -> anyhow::Result<()> {
    let items = readwise
        .list_items(&command.category)
        .await
        .context("Failed to list Readwise items")?;

    info!("Listing {} items", items.len());

    let stdout = std::io::stdout();
    write_items(&mut stdout.lock(), &items)?;

    Ok(())
}

/// One tab-indented JSON document per item.
fn write_items<W: Write>(out: &mut W, items: &[Item]) -> anyhow::Result<()> {
    for item in items {
        let formatter = serde_json::ser::PrettyFormatter::with_indent(b"\t");
        let mut serializer = serde_json::Serializer::with_formatter(&mut *out, formatter);
        item.serialize(&mut serializer)?;
        writeln!(out)?;
    }

    Ok(())
}

async fn export(readwise: &Readwise, command: &ExportCommand) -> anyhow::Result<()> {
    let days = command.updated_after.unwrap_or_default();
    let query =
        ExportQuery::updated_within_days(days, Utc::now()).with_ids(command.ids.iter().cloned());

    let mut records = readwise
        .export_highlights(&query)
        .await
        .context("Failed to export Readwise highlights")?;

    info!("Formatting {} records", records.len());

    let formatter = TanaFormatter::new()?;
    let stdout = std::io::stdout();
    formatter.write_paste(&mut stdout.lock(), &mut records)?;

    Ok(())
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), anyhow::Error> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_max_level(if cli.debug { Level::DEBUG } else { Level::WARN })
        .init();

    match &cli.command {
        Command::List(list_cmd) => {
            let readwise = readwise(&cli, &list_cmd.auth.token)?;
            list(&readwise, list_cmd).await
        }
        Command::Export(export_cmd) => {
            let readwise = readwise(&cli, &export_cmd.auth.token)?;
            export(&readwise, export_cmd).await
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn items_are_printed_as_tab_indented_json() {
        let item: Item = serde_json::from_value(json!({
            "id": 5,
            "title": "Deep Work",
            "category": "books",
            "tags": []
        }))
        .unwrap();

        let mut out = Vec::new();
        write_items(&mut out, &[item.clone(), item]).unwrap();
        let out = String::from_utf8(out).unwrap();

        assert!(out.starts_with("{\n\t\"id\": 5,\n\t\"title\": \"Deep Work\",\n"));
        assert_eq!(out.matches("\n}\n").count(), 2);
    }
}
