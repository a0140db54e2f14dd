mod sqlite;

pub use sqlite::SqliteRecordStore;

use std::path::PathBuf;

use crate::{
    errors::Result,
    modes::{GenerationMode, IntensityLevel},
    orchestrator::PipelineResult,
};
use chrono::{DateTime, Utc};
use serde::Serialize;

/// A finished slop as kept in the gallery.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SlopRecord {
    pub id: i64,
    pub original_path: PathBuf,
    pub slop_path: PathBuf,
    pub caption: String,
    pub level: IntensityLevel,
    pub mode: GenerationMode,
    pub is_favorite: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SlopStats {
    pub total: u64,
    pub favorites: u64,
    pub most_used_mode: Option<GenerationMode>,
}

/// Persistence for pipeline results and the user's later edits.
pub trait RecordStore: Send + Sync {
    fn insert(&self, result: &PipelineResult, mode: GenerationMode) -> Result<i64>;

    fn get(&self, id: i64) -> Result<Option<SlopRecord>>;

    /// Newest first.
    fn list(&self, favorites_only: bool) -> Result<Vec<SlopRecord>>;

    fn update_caption(&self, id: i64, caption: &str) -> Result<()>;

    /// Flips the favorite flag and returns the new state. Unknown ids report `false`.
    fn toggle_favorite(&self, id: i64) -> Result<bool>;

    fn delete(&self, id: i64) -> Result<()>;

    fn delete_all(&self) -> Result<()>;

    fn count(&self) -> Result<u64>;

    fn stats(&self) -> Result<SlopStats>;
}
