//! Dataset layout and metadata persistence
//!
//! A task's entry lives under `<out_dir>/<app_name>/<task_id>/` with
//! screenshots in `steps/` and the execution record in `meta.json`.

use std::path::{Path, PathBuf};

use crate::core::{ExecutionRecord, Result};

/// Name of the metadata file in a task directory
pub const META_FILE: &str = "meta.json";

/// Paths of one dataset entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskLayout {
    task_dir: PathBuf,
}

impl TaskLayout {
    pub fn new(out_dir: impl AsRef<Path>, app_name: &str, task_id: &str) -> Self {
        Self {
            task_dir: out_dir.as_ref().join(app_name).join(task_id),
        }
    }

    pub fn task_dir(&self) -> &Path {
        &self.task_dir
    }

    pub fn steps_dir(&self) -> PathBuf {
        self.task_dir.join("steps")
    }

    pub fn meta_path(&self) -> PathBuf {
        self.task_dir.join(META_FILE)
    }
}

/// Write the record as pretty JSON, replacing any previous file atomically
pub async fn write_record(layout: &TaskLayout, record: &ExecutionRecord) -> Result<PathBuf> {
    tokio::fs::create_dir_all(layout.task_dir()).await?;

    let content = serde_json::to_string_pretty(record)?;
    let meta_path = layout.meta_path();
    let tmp_path = meta_path.with_extension("json.tmp");

    tokio::fs::write(&tmp_path, content).await?;
    tokio::fs::rename(&tmp_path, &meta_path).await?;

    Ok(meta_path)
}
