//! Image and speech generation sessions plus the files they leave behind.

use crate::error::PersistenceError;
use std::path::Path;
use std::time::SystemTime;

pub mod images;
pub mod naming;
pub mod speech;
pub mod voice;

pub use images::{ImageReport, ImageStore, ImageStudio};
pub use speech::{SpeechReport, SpeechStore, SpeechStudio, SpeechTask, TranscriptRecord};
pub use voice::{UnknownVoice, Voice};

/// Entry names in `dir` accepted by `keep`, newest first. A missing
/// directory has no entries.
fn recent_entries(
    dir: &Path,
    count: usize,
    keep: impl Fn(&Path) -> bool,
) -> Result<Vec<String>, PersistenceError> {
    let mut entries = matching_entries(dir, keep)?
        .into_iter()
        .map(|path| {
            let modified = path
                .metadata()
                .and_then(|m| m.modified())
                .unwrap_or(SystemTime::UNIX_EPOCH);
            let name = path
                .file_name()
                .map(|n| n.to_string_lossy().to_string())
                .unwrap_or_default();
            (modified, name)
        })
        .collect::<Vec<_>>();

    entries.sort_by(|a, b| b.cmp(a));
    Ok(entries.into_iter().take(count).map(|(_, name)| name).collect())
}

fn matching_entries(
    dir: &Path,
    keep: impl Fn(&Path) -> bool,
) -> Result<Vec<std::path::PathBuf>, PersistenceError> {
    if !dir.exists() {
        return Ok(vec![]);
    }

    let entries = std::fs::read_dir(dir).map_err(|e| PersistenceError::io(dir, e))?;
    Ok(entries
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| keep(path))
        .collect())
}

fn write_file(path: &Path, bytes: &[u8]) -> Result<u64, PersistenceError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| PersistenceError::io(parent, e))?;
    }
    std::fs::write(path, bytes).map_err(|e| PersistenceError::io(path, e))?;
    Ok(bytes.len() as u64)
}
