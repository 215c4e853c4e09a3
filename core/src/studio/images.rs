use crate::error::{PersistenceError, StudioError};
use crate::studio::{matching_entries, naming, recent_entries, write_file};
use crate::traits::ImageGenerator;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use chrono::{Local, NaiveDateTime};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::info;

fn is_png(path: &Path) -> bool {
    path.is_file() && path.extension().is_some_and(|ext| ext == "png")
}

/// PNG files generated from prompts, kept in one directory.
pub struct ImageStore {
    dir: PathBuf,
}

impl ImageStore {
    pub fn new(dir: impl AsRef<Path>) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Decodes base64 PNG data and writes it under a name derived from
    /// `prompt`. Returns the path and the number of bytes written.
    pub fn save(
        &self,
        prompt: &str,
        b64_data: &str,
        now: NaiveDateTime,
    ) -> Result<(PathBuf, u64), PersistenceError> {
        let bytes = STANDARD.decode(b64_data.trim())?;
        let path = self.dir.join(naming::image_filename(prompt, now));
        let size = write_file(&path, &bytes)?;
        info!(path = %path.display(), size, "Saved image");
        Ok((path, size))
    }

    pub fn recent(&self, count: usize) -> Result<Vec<String>, PersistenceError> {
        recent_entries(&self.dir, count, is_png)
    }

    pub fn count(&self) -> Result<usize, PersistenceError> {
        Ok(matching_entries(&self.dir, is_png)?.len())
    }

    /// Deletes every PNG in the directory, returning how many were removed.
    pub fn clear(&self) -> Result<usize, PersistenceError> {
        let files = matching_entries(&self.dir, is_png)?;
        for file in &files {
            std::fs::remove_file(file).map_err(|e| PersistenceError::io(file, e))?;
        }
        Ok(files.len())
    }
}

#[derive(Debug, Clone)]
pub struct ImageReport {
    pub path: PathBuf,
    pub bytes: u64,
    /// Set only when the provider rewrote the prompt.
    pub revised_prompt: Option<String>,
}

pub struct ImageStudio {
    generator: Arc<dyn ImageGenerator>,
    store: ImageStore,
}

impl ImageStudio {
    pub fn new(generator: Arc<dyn ImageGenerator>, store: ImageStore) -> Self {
        Self { generator, store }
    }

    pub fn store(&self) -> &ImageStore {
        &self.store
    }

    pub async fn create(&self, prompt: &str) -> Result<ImageReport, StudioError> {
        let image = self.generator.generate_image(prompt).await?;
        let (path, bytes) = self
            .store
            .save(prompt, &image.b64_data, Local::now().naive_local())?;

        Ok(ImageReport {
            path,
            bytes,
            revised_prompt: image.revised_prompt.filter(|revised| revised != prompt),
        })
    }
}
