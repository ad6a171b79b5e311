use thiserror::Error;

use crate::storage::{self, Category, Record};

/// Validation failures surfaced inline; the offending draft is kept so the
/// user can correct and resubmit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("name cannot be empty")]
    EmptyName,
    #[error("title is required")]
    EmptyTitle,
}

/// Builds the completed record for one form submission. The id comes from
/// the table the caller just loaded, never from a separate counter.
pub fn build_record(
    title: &str,
    category: Category,
    notes: &str,
    existing: &[Record],
    created_at: String,
) -> Result<Record, ValidationError> {
    let title = title.trim();
    if title.is_empty() {
        return Err(ValidationError::EmptyTitle);
    }
    Ok(Record {
        id: storage::next_id(existing),
        title: title.to_string(),
        category,
        notes: notes.to_string(),
        created_at,
    })
}
