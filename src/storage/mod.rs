use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use time::format_description::FormatItem;
use time::macros::format_description;
use time::OffsetDateTime;

use crate::identity;

/// Timestamp layout written into the `created_at` column. Lexicographic
/// order on these strings matches chronological order, which the display
/// sort relies on.
pub const TIMESTAMP_FORMAT: &[FormatItem<'static>] =
    format_description!("[year]-[month]-[day] [hour]:[minute]:[second]");

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Default,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumIter,
    strum::EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Category {
    #[default]
    Honor,
    Education,
    Competition,
    Certificate,
    Account,
    Other,
}

/// One row of a user's table. Field order is the on-disk column order:
/// `id,title,category,notes,created_at`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    pub id: u32,
    pub title: String,
    pub category: Category,
    pub notes: String,
    pub created_at: String,
}

/// Per-user CSV tables under a single data directory. Each user key owns
/// one file; a save rewrites that file in full.
#[derive(Debug, Clone)]
pub struct RecordStore {
    data_dir: PathBuf,
}

impl RecordStore {
    pub fn open(data_dir: &Path) -> Result<Self> {
        fs::create_dir_all(data_dir)
            .with_context(|| format!("creating data directory {}", data_dir.display()))?;
        Ok(Self {
            data_dir: data_dir.to_path_buf(),
        })
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    pub fn file_path(&self, key: &str) -> PathBuf {
        self.data_dir.join(identity::records_file_name(key))
    }

    /// Loads the full table for a user key, or an empty table when the user
    /// has never saved. Malformed rows are fatal for the caller; there is no
    /// repair pass.
    pub fn load(&self, key: &str) -> Result<Vec<Record>> {
        let path = self.file_path(key);
        if !path.exists() {
            return Ok(Vec::new());
        }
        let mut reader = csv::Reader::from_path(&path)
            .with_context(|| format!("opening records file {}", path.display()))?;
        let mut records = Vec::new();
        for row in reader.deserialize() {
            let record: Record =
                row.with_context(|| format!("parsing records file {}", path.display()))?;
            records.push(record);
        }
        Ok(records)
    }

    /// Rewrites the user's file with the given rows, header included.
    /// Saving an unchanged table reproduces the file byte for byte.
    pub fn save(&self, key: &str, records: &[Record]) -> Result<()> {
        let path = self.file_path(key);
        let mut writer = csv::Writer::from_path(&path)
            .with_context(|| format!("creating records file {}", path.display()))?;
        for record in records {
            writer
                .serialize(record)
                .with_context(|| format!("writing record #{} to {}", record.id, path.display()))?;
        }
        writer
            .flush()
            .with_context(|| format!("flushing records file {}", path.display()))?;
        Ok(())
    }
}

/// Next id for a table: 1 when empty, otherwise max existing + 1. Ids are
/// derived from the loaded table on every save, never counted separately.
pub fn next_id(records: &[Record]) -> u32 {
    records
        .iter()
        .map(|record| record.id)
        .max()
        .map_or(1, |max| max + 1)
}

/// Copy of the table ordered newest first for display. Rows sharing a
/// timestamp second fall back to descending id, so the latest submission
/// always leads.
pub fn sorted_newest_first(records: &[Record]) -> Vec<Record> {
    let mut sorted = records.to_vec();
    sorted.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
    sorted
}

/// Wall-clock timestamp in the table's `YYYY-MM-DD HH:MM:SS` layout. Falls
/// back to UTC when the local offset cannot be determined.
pub fn current_timestamp() -> Result<String> {
    let now = OffsetDateTime::now_local().unwrap_or_else(|_| {
        tracing::debug!("local offset unavailable, stamping in UTC");
        OffsetDateTime::now_utc()
    });
    now.format(&TIMESTAMP_FORMAT)
        .context("formatting record timestamp")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn record(id: u32, title: &str, created_at: &str) -> Record {
        Record {
            id,
            title: title.to_string(),
            category: Category::Honor,
            notes: String::new(),
            created_at: created_at.to_string(),
        }
    }

    fn open_store(temp: &TempDir) -> RecordStore {
        RecordStore::open(&temp.path().join("data")).expect("open store")
    }

    #[test]
    fn load_missing_user_yields_empty_table() -> Result<()> {
        let temp = TempDir::new()?;
        let store = open_store(&temp);
        assert!(store.load("nobody")?.is_empty());
        assert!(!store.file_path("nobody").exists());
        Ok(())
    }

    #[test]
    fn save_then_load_round_trips() -> Result<()> {
        let temp = TempDir::new()?;
        let store = open_store(&temp);
        let records = vec![
            Record {
                id: 1,
                title: "Cert A".to_string(),
                category: Category::Certificate,
                notes: "with, comma and \"quotes\"".to_string(),
                created_at: "2026-08-28 09:15:00".to_string(),
            },
            Record {
                id: 2,
                title: "第一名".to_string(),
                category: Category::Competition,
                notes: String::new(),
                created_at: "2026-08-28 09:16:30".to_string(),
            },
        ];
        store.save("Ann", &records)?;
        assert_eq!(store.load("Ann")?, records);
        Ok(())
    }

    #[test]
    fn resave_reproduces_identical_bytes() -> Result<()> {
        let temp = TempDir::new()?;
        let store = open_store(&temp);
        store.save("Ann", &[record(1, "First", "2026-08-28 10:00:00")])?;
        let first = fs::read(store.file_path("Ann"))?;
        let reloaded = store.load("Ann")?;
        store.save("Ann", &reloaded)?;
        let second = fs::read(store.file_path("Ann"))?;
        assert_eq!(first, second);
        Ok(())
    }

    #[test]
    fn header_and_column_order_are_fixed() -> Result<()> {
        let temp = TempDir::new()?;
        let store = open_store(&temp);
        store.save("Ann", &[record(1, "First", "2026-08-28 10:00:00")])?;
        let contents = fs::read_to_string(store.file_path("Ann"))?;
        let header = contents.lines().next().expect("header row");
        assert_eq!(header, "id,title,category,notes,created_at");
        Ok(())
    }

    #[test]
    fn save_overwrites_rather_than_appends() -> Result<()> {
        let temp = TempDir::new()?;
        let store = open_store(&temp);
        store.save(
            "Ann",
            &[
                record(1, "First", "2026-08-28 10:00:00"),
                record(2, "Second", "2026-08-28 10:01:00"),
            ],
        )?;
        store.save("Ann", &[record(1, "Only", "2026-08-28 10:02:00")])?;
        let reloaded = store.load("Ann")?;
        assert_eq!(reloaded.len(), 1);
        assert_eq!(reloaded[0].title, "Only");
        Ok(())
    }

    #[test]
    fn malformed_file_fails_loudly() -> Result<()> {
        let temp = TempDir::new()?;
        let store = open_store(&temp);
        fs::write(
            store.file_path("Ann"),
            "id,title,category,notes,created_at\nnot-a-number,x,honor,,2026-01-01 00:00:00\n",
        )?;
        assert!(store.load("Ann").is_err());
        Ok(())
    }

    #[test]
    fn next_id_starts_at_one_and_follows_the_max() {
        assert_eq!(next_id(&[]), 1);
        let table = vec![
            record(1, "a", "2026-08-28 10:00:00"),
            record(3, "b", "2026-08-28 10:01:00"),
            record(4, "c", "2026-08-28 10:02:00"),
        ];
        assert_eq!(next_id(&table), 5);
    }

    #[test]
    fn display_sort_is_newest_first_with_id_breaking_ties() {
        let table = vec![
            record(1, "oldest", "2026-08-28 09:00:00"),
            record(2, "tie-early", "2026-08-28 10:00:00"),
            record(3, "tie-late", "2026-08-28 10:00:00"),
            record(4, "newest", "2026-08-28 11:00:00"),
        ];
        let sorted = sorted_newest_first(&table);
        let titles: Vec<&str> = sorted.iter().map(|r| r.title.as_str()).collect();
        assert_eq!(titles, ["newest", "tie-late", "tie-early", "oldest"]);
    }

    #[test]
    fn same_second_submissions_show_the_higher_id_first() {
        let table = vec![
            record(1, "first", "2026-08-28 10:00:00"),
            record(2, "second", "2026-08-28 10:00:00"),
        ];
        let sorted = sorted_newest_first(&table);
        assert_eq!(sorted[0].id, 2);
        assert_eq!(sorted[1].id, 1);
    }

    #[test]
    fn categories_round_trip_through_csv_as_lowercase() -> Result<()> {
        let temp = TempDir::new()?;
        let store = open_store(&temp);
        let mut records = Vec::new();
        for (id, category) in [
            Category::Honor,
            Category::Education,
            Category::Competition,
            Category::Certificate,
            Category::Account,
            Category::Other,
        ]
        .into_iter()
        .enumerate()
        {
            records.push(Record {
                id: id as u32 + 1,
                title: format!("entry {category}"),
                category,
                notes: String::new(),
                created_at: "2026-08-28 10:00:00".to_string(),
            });
        }
        store.save("cats", &records)?;
        let contents = fs::read_to_string(store.file_path("cats"))?;
        assert!(contents.contains(",education,"));
        assert!(contents.contains(",other,"));
        assert_eq!(store.load("cats")?, records);
        Ok(())
    }

    #[test]
    fn current_timestamp_matches_layout() -> Result<()> {
        let stamp = current_timestamp()?;
        assert_eq!(stamp.len(), 19);
        assert_eq!(&stamp[4..5], "-");
        assert_eq!(&stamp[10..11], " ");
        assert_eq!(&stamp[13..14], ":");
        Ok(())
    }
}
