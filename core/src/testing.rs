//! In-memory provider doubles shared by the unit tests.

use crate::error::ProviderError;
use crate::traits::{
    ChatMessage, ChatRequest, ChatResponse, GeneratedImage, ImageGenerator, Provider,
    SpeechSynthesizer, ToolCall, ToolChoice,
};
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::Mutex;

#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub messages: Vec<ChatMessage>,
    pub tool_names: Option<Vec<String>>,
    pub tool_choice: Option<ToolChoice>,
    pub max_completion_tokens: Option<u32>,
}

/// Replays queued responses in order and records every request it sees.
#[derive(Default)]
pub struct ScriptedProvider {
    responses: Mutex<VecDeque<Result<ChatResponse, ProviderError>>>,
    requests: Mutex<Vec<RecordedRequest>>,
}

impl ScriptedProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reply(self, text: &str) -> Self {
        self.push(Ok(ChatResponse::text(text)))
    }

    pub fn call_tools(self, calls: Vec<ToolCall>) -> Self {
        self.push(Ok(ChatResponse {
            text: None,
            tool_calls: calls,
        }))
    }

    pub fn fail(self, error: ProviderError) -> Self {
        self.push(Err(error))
    }

    fn push(self, response: Result<ChatResponse, ProviderError>) -> Self {
        self.responses.lock().unwrap().push_back(response);
        self
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn request_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }
}

#[async_trait]
impl Provider for ScriptedProvider {
    async fn chat(&self, request: ChatRequest<'_>) -> Result<ChatResponse, ProviderError> {
        self.requests.lock().unwrap().push(RecordedRequest {
            messages: request.messages.to_vec(),
            tool_names: request
                .tools
                .map(|tools| tools.iter().map(|t| t.name.clone()).collect()),
            tool_choice: request.tool_choice,
            max_completion_tokens: request.max_completion_tokens,
        });

        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(Err(ProviderError::EmptyResponse))
    }

    fn model(&self) -> &str {
        "scripted"
    }
}

/// Image and speech double returning canned payloads.
pub struct FakeMedia {
    pub image_b64: String,
    pub revised_prompt: Option<String>,
    pub audio: Vec<u8>,
    pub fail: bool,
    pub voices: Mutex<Vec<String>>,
}

impl FakeMedia {
    pub fn new() -> Self {
        Self {
            // "hello" in base64
            image_b64: "aGVsbG8=".to_string(),
            revised_prompt: None,
            audio: vec![0xFF, 0xFB, 0x90, 0x00],
            fail: false,
            voices: Mutex::new(vec![]),
        }
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::new()
        }
    }
}

#[async_trait]
impl ImageGenerator for FakeMedia {
    async fn generate_image(&self, _prompt: &str) -> Result<GeneratedImage, ProviderError> {
        if self.fail {
            return Err(ProviderError::NoImage);
        }
        Ok(GeneratedImage {
            b64_data: self.image_b64.clone(),
            revised_prompt: self.revised_prompt.clone(),
        })
    }
}

#[async_trait]
impl SpeechSynthesizer for FakeMedia {
    async fn synthesize_speech(&self, _text: &str, voice: &str) -> Result<Vec<u8>, ProviderError> {
        if self.fail {
            return Err(ProviderError::Api {
                status: 500,
                body: "tts unavailable".into(),
            });
        }
        self.voices.lock().unwrap().push(voice.to_string());
        Ok(self.audio.clone())
    }
}
