//! Persisted catalog records.

/// One persisted report row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportRecord {
    /// Unique catalog key.
    pub name: String,
    /// Label shown by designer open/save dialogs.
    pub display_name: String,
    /// Canonical layout bytes from the last successful write.
    pub layout_data: Vec<u8>,
}

/// Listing projection of a persisted report, without layout bytes.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct ReportSummary {
    pub name: String,
    pub display_name: String,
}

/// Result of an insert-or-update write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpsertOutcome {
    /// No record existed; a new one was inserted with `display_name = name`.
    Created,
    /// The existing record's layout bytes were replaced in place.
    Updated,
}

impl UpsertOutcome {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Created => "created",
            Self::Updated => "updated",
        }
    }
}
