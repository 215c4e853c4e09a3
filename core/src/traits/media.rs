use crate::error::ProviderError;
use async_trait::async_trait;

#[derive(Debug, Clone)]
pub struct GeneratedImage {
    /// Base64-encoded PNG.
    pub b64_data: String,
    pub revised_prompt: Option<String>,
}

#[async_trait]
pub trait ImageGenerator: Send + Sync {
    async fn generate_image(&self, prompt: &str) -> Result<GeneratedImage, ProviderError>;
}

#[async_trait]
pub trait SpeechSynthesizer: Send + Sync {
    /// Returns encoded MP3 audio for `text` spoken with `voice`.
    async fn synthesize_speech(&self, text: &str, voice: &str) -> Result<Vec<u8>, ProviderError>;
}
