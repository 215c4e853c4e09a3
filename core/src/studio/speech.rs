use crate::error::{PersistenceError, StudioError};
use crate::studio::{Voice, matching_entries, naming, recent_entries, write_file};
use crate::traits::{ChatMessage, ChatRequest, Provider, SpeechSynthesizer};
use chrono::{Local, NaiveDateTime, SecondsFormat};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info};

pub const TRANSCRIPT_FILE: &str = "transcript.json";
pub const AUDIO_FILE: &str = "audio.mp3";

const TRANSCRIPT_SYSTEM_PROMPT: &str = "You are a helpful assistant that creates well-structured, engaging content based on user prompts. Generate clear, natural-sounding text that would work well as a spoken transcript.";
const PREVIEW_CHARS: usize = 200;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TranscriptRecord {
    pub original_prompt: String,
    pub transcript: String,
    pub generated_at: String,
    pub word_count: usize,
}

impl TranscriptRecord {
    pub fn new(prompt: &str, transcript: &str) -> Self {
        Self {
            original_prompt: prompt.to_string(),
            transcript: transcript.to_string(),
            generated_at: Local::now().to_rfc3339_opts(SecondsFormat::Micros, false),
            word_count: word_count(transcript),
        }
    }
}

pub fn word_count(text: &str) -> usize {
    text.split_whitespace().count()
}

/// First 200 characters, with `...` when anything was cut.
pub fn preview(text: &str) -> String {
    if text.chars().count() > PREVIEW_CHARS {
        let head: String = text.chars().take(PREVIEW_CHARS).collect();
        format!("{}...", head)
    } else {
        text.to_string()
    }
}

fn is_dir(path: &Path) -> bool {
    path.is_dir()
}

/// One folder per speech task, each holding a transcript and its audio.
pub struct SpeechStore {
    dir: PathBuf,
}

impl SpeechStore {
    pub fn new(dir: impl AsRef<Path>) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn create_task(
        &self,
        prompt: &str,
        now: NaiveDateTime,
    ) -> Result<SpeechTask, PersistenceError> {
        let folder = self.dir.join(naming::task_folder_name(prompt, now));
        std::fs::create_dir_all(&folder).map_err(|e| PersistenceError::io(&folder, e))?;
        debug!(folder = %folder.display(), "Created speech task folder");
        Ok(SpeechTask { folder })
    }

    pub fn recent(&self, count: usize) -> Result<Vec<String>, PersistenceError> {
        recent_entries(&self.dir, count, is_dir)
    }

    pub fn count(&self) -> Result<usize, PersistenceError> {
        Ok(matching_entries(&self.dir, is_dir)?.len())
    }

    /// Removes every task folder, returning how many were removed.
    pub fn clear(&self) -> Result<usize, PersistenceError> {
        let folders = matching_entries(&self.dir, is_dir)?;
        for folder in &folders {
            std::fs::remove_dir_all(folder).map_err(|e| PersistenceError::io(folder, e))?;
        }
        Ok(folders.len())
    }
}

#[derive(Debug, Clone)]
pub struct SpeechTask {
    folder: PathBuf,
}

impl SpeechTask {
    pub fn folder(&self) -> &Path {
        &self.folder
    }

    pub fn name(&self) -> String {
        self.folder
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default()
    }

    pub fn transcript_path(&self) -> PathBuf {
        self.folder.join(TRANSCRIPT_FILE)
    }

    pub fn audio_path(&self) -> PathBuf {
        self.folder.join(AUDIO_FILE)
    }

    pub fn save_transcript(&self, record: &TranscriptRecord) -> Result<u64, PersistenceError> {
        let json = serde_json::to_string_pretty(record)?;
        write_file(&self.transcript_path(), json.as_bytes())
    }

    pub fn save_audio(&self, audio: &[u8]) -> Result<u64, PersistenceError> {
        write_file(&self.audio_path(), audio)
    }
}

#[derive(Debug, Clone)]
pub struct SpeechReport {
    pub task: SpeechTask,
    pub transcript: String,
    pub word_count: usize,
    pub transcript_bytes: u64,
    pub audio_bytes: u64,
    pub preview: String,
}

pub struct SpeechStudio {
    provider: Arc<dyn Provider>,
    synthesizer: Arc<dyn SpeechSynthesizer>,
    store: SpeechStore,
    max_completion_tokens: u32,
}

impl SpeechStudio {
    pub fn new(
        provider: Arc<dyn Provider>,
        synthesizer: Arc<dyn SpeechSynthesizer>,
        store: SpeechStore,
    ) -> Self {
        Self {
            provider,
            synthesizer,
            store,
            max_completion_tokens: 2000,
        }
    }

    pub fn with_max_completion_tokens(mut self, max: u32) -> Self {
        self.max_completion_tokens = max;
        self
    }

    pub fn store(&self) -> &SpeechStore {
        &self.store
    }

    pub fn model(&self) -> &str {
        self.provider.model()
    }

    pub async fn generate_transcript(&self, prompt: &str) -> Result<String, StudioError> {
        let messages = [
            ChatMessage::system(TRANSCRIPT_SYSTEM_PROMPT),
            ChatMessage::user(prompt),
        ];
        let request =
            ChatRequest::new(&messages).with_max_completion_tokens(self.max_completion_tokens);

        let response = self.provider.chat(request).await?;
        let transcript = response.text_or_empty().trim().to_string();
        if transcript.is_empty() {
            return Err(StudioError::EmptyTranscript);
        }
        Ok(transcript)
    }

    /// Writes the transcript, then the audio, into a fresh task folder. A
    /// failed synthesis leaves the transcript in place.
    pub async fn create(&self, prompt: &str, voice: Voice) -> Result<SpeechReport, StudioError> {
        let transcript = self.generate_transcript(prompt).await?;

        let task = self.store.create_task(prompt, Local::now().naive_local())?;
        let record = TranscriptRecord::new(prompt, &transcript);
        let transcript_bytes = task.save_transcript(&record)?;

        let audio = self
            .synthesizer
            .synthesize_speech(&transcript, voice.as_str())
            .await?;
        let audio_bytes = task.save_audio(&audio)?;
        info!(task = %task.name(), %voice, audio_bytes, "Saved speech task");

        Ok(SpeechReport {
            preview: preview(&transcript),
            word_count: record.word_count,
            task,
            transcript,
            transcript_bytes,
            audio_bytes,
        })
    }
}
