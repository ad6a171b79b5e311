use std::io::{self, Write};
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::Args;

use crate::app::{form, App};
use crate::config::AppConfig;
use crate::identity;
use crate::storage::{self, Category, RecordStore};

#[derive(Args, Debug, Clone)]
pub struct AddArgs {
    /// Name of the user whose table the record is appended to
    #[arg(long)]
    pub user: String,
    /// Record title (prompted if omitted)
    #[arg()]
    pub title: Option<String>,
    /// Category: honor, education, competition, certificate, account, other
    /// (defaults to the configured default_category)
    #[arg(long)]
    pub category: Option<String>,
    /// Optional free-text notes
    #[arg(long, default_value = "")]
    pub notes: String,
}

#[derive(Args, Debug, Clone)]
pub struct ListArgs {
    /// Name of the user whose records to print
    #[arg(long)]
    pub user: String,
}

pub fn run_tui(app: &mut App) -> Result<()> {
    app.run()
}

pub fn add_record(config: Arc<AppConfig>, store: RecordStore, args: AddArgs) -> Result<()> {
    let Some(key) = identity::derive_key(&args.user) else {
        bail!("name cannot be empty");
    };
    let category = resolve_category(args.category.as_deref(), &config)?;
    let title = match args.title {
        Some(title) => title,
        None => prompt("Title")?,
    };

    let mut records = store.load(&key)?;
    let created_at = storage::current_timestamp()?;
    let record = form::build_record(&title, category, &args.notes, &records, created_at)
        .map_err(|err| anyhow::anyhow!(err))?;
    let id = record.id;
    records.push(record);
    store.save(&key, &records).context("saving record table")?;
    println!(
        "Saved record #{id} for {} ({})",
        args.user.trim(),
        identity::records_file_name(&key)
    );
    Ok(())
}

pub fn list_records(_config: Arc<AppConfig>, store: RecordStore, args: ListArgs) -> Result<()> {
    let Some(key) = identity::derive_key(&args.user) else {
        bail!("name cannot be empty");
    };
    let records = store.load(&key)?;
    if records.is_empty() {
        println!("No records yet.");
        return Ok(());
    }
    for record in storage::sorted_newest_first(&records) {
        let notes = if record.notes.is_empty() {
            String::new()
        } else {
            format!("  - {}", record.notes.replace('\n', " "))
        };
        println!(
            "#{:<4} {}  [{}]  {}{notes}",
            record.id, record.created_at, record.category, record.title
        );
    }
    Ok(())
}

fn resolve_category(raw: Option<&str>, config: &AppConfig) -> Result<Category> {
    match raw {
        Some(raw) => raw
            .parse()
            .map_err(|_| anyhow::anyhow!("unknown category '{raw}'")),
        None => Ok(config.default_category),
    }
}

fn prompt(label: &str) -> Result<String> {
    print!("{label}: ");
    io::stdout().flush().context("flushing prompt")?;
    let mut buffer = String::new();
    io::stdin()
        .read_line(&mut buffer)
        .context("reading prompt input")?;
    Ok(buffer.trim_end_matches(['\r', '\n']).to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn omitted_category_uses_the_configured_default() -> Result<()> {
        let config = AppConfig {
            default_category: Category::Certificate,
            ..AppConfig::default()
        };
        assert_eq!(resolve_category(None, &config)?, Category::Certificate);
        Ok(())
    }

    #[test]
    fn explicit_category_overrides_the_default() -> Result<()> {
        let config = AppConfig::default();
        assert_eq!(
            resolve_category(Some("account"), &config)?,
            Category::Account
        );
        Ok(())
    }

    #[test]
    fn unknown_category_is_rejected() {
        let config = AppConfig::default();
        assert!(resolve_category(Some("bogus"), &config).is_err());
    }
}

