use crate::error::ProviderError;
use crate::traits::{
    ChatMessage, ChatRequest, ChatResponse, GeneratedImage, ImageGenerator, Provider,
    SpeechSynthesizer, ToolCall, ToolChoice, ToolSpec,
};
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
pub const TTS_MODEL: &str = "tts-1";

#[derive(Debug, Serialize)]
struct OpenAIRequest<'a> {
    model: &'a str,
    messages: Vec<OpenAIMessage<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tools: Option<Vec<OpenAITool>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tool_choice: Option<ToolChoice>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_completion_tokens: Option<u32>,
}

#[derive(Debug, Serialize)]
struct OpenAIMessage<'a> {
    role: &'a str,
    content: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tool_calls: Option<Vec<OpenAIToolCallRequest<'a>>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tool_call_id: Option<&'a str>,
}

#[derive(Debug, Serialize)]
struct OpenAIToolCallRequest<'a> {
    id: &'a str,
    r#type: &'a str,
    function: OpenAIFunctionRequest<'a>,
}

#[derive(Debug, Serialize)]
struct OpenAIFunctionRequest<'a> {
    name: &'a str,
    arguments: &'a str,
}

#[derive(Debug, Serialize)]
struct OpenAITool {
    r#type: &'static str,
    function: OpenAIToolFunction,
}

#[derive(Debug, Serialize)]
struct OpenAIToolFunction {
    name: String,
    description: String,
    parameters: serde_json::Value,
}

#[derive(Debug, Deserialize)]
struct OpenAIResponse {
    choices: Vec<OpenAIChoice>,
}

#[derive(Debug, Deserialize)]
struct OpenAIChoice {
    message: OpenAIResponseMessage,
}

#[derive(Debug, Deserialize)]
struct OpenAIResponseMessage {
    content: Option<String>,
    tool_calls: Option<Vec<OpenAIToolCall>>,
}

#[derive(Debug, Deserialize)]
struct OpenAIToolCall {
    id: String,
    function: OpenAIFunction,
}

#[derive(Debug, Deserialize)]
struct OpenAIFunction {
    name: String,
    arguments: String,
}

#[derive(Debug, Serialize)]
struct ImageRequest<'a> {
    model: &'a str,
    input: String,
    tools: [HostedTool; 1],
}

#[derive(Debug, Serialize)]
struct HostedTool {
    r#type: &'static str,
}

#[derive(Debug, Deserialize)]
struct ImageResponse {
    #[serde(default)]
    output: Vec<ImageOutputItem>,
}

#[derive(Debug, Deserialize)]
struct ImageOutputItem {
    r#type: String,
    result: Option<String>,
    revised_prompt: Option<String>,
}

#[derive(Debug, Serialize)]
struct SpeechRequest<'a> {
    model: &'a str,
    voice: &'a str,
    input: &'a str,
}

pub struct OpenAIProvider {
    client: reqwest::Client,
    api_key: String,
    organization: Option<String>,
    model: String,
    base_url: String,
}

impl OpenAIProvider {
    pub fn new(api_key: impl Into<String>) -> Self {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(120))
            .connect_timeout(std::time::Duration::from_secs(30))
            .build()
            .unwrap_or_default();

        Self {
            client,
            api_key: api_key.into(),
            organization: None,
            model: "gpt-4o".to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
        }
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_organization(mut self, organization: Option<String>) -> Self {
        self.organization = organization.filter(|o| !o.trim().is_empty());
        self
    }

    fn post(&self, path: &str) -> reqwest::RequestBuilder {
        let mut builder = self
            .client
            .post(format!("{}/{}", self.base_url, path))
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json");
        if let Some(org) = &self.organization {
            builder = builder.header("OpenAI-Organization", org);
        }
        builder
    }

    async fn send(
        &self,
        builder: reqwest::RequestBuilder,
    ) -> Result<reqwest::Response, ProviderError> {
        let response = builder.send().await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(ProviderError::Api { status, body });
        }

        Ok(response)
    }

    async fn send_json<T: DeserializeOwned>(
        &self,
        builder: reqwest::RequestBuilder,
    ) -> Result<T, ProviderError> {
        let body = self.send(builder).await?.text().await?;
        serde_json::from_str(&body).map_err(|e| ProviderError::Decode(e.to_string()))
    }
}

fn convert_messages(messages: &[ChatMessage]) -> Vec<OpenAIMessage<'_>> {
    messages
        .iter()
        .map(|m| {
            let tool_calls = (!m.tool_calls.is_empty()).then(|| {
                m.tool_calls
                    .iter()
                    .map(|tc| OpenAIToolCallRequest {
                        id: &tc.id,
                        r#type: "function",
                        function: OpenAIFunctionRequest {
                            name: &tc.name,
                            arguments: &tc.arguments,
                        },
                    })
                    .collect()
            });

            OpenAIMessage {
                role: m.role.as_str(),
                content: m.content.as_deref(),
                tool_calls,
                tool_call_id: m.tool_call_id.as_deref(),
            }
        })
        .collect()
}

fn convert_tools(tools: &[ToolSpec]) -> Vec<OpenAITool> {
    tools
        .iter()
        .map(|t| OpenAITool {
            r#type: "function",
            function: OpenAIToolFunction {
                name: t.name.clone(),
                description: t.description.clone(),
                parameters: t.parameters_schema(),
            },
        })
        .collect()
}

fn build_request<'a>(model: &'a str, request: &ChatRequest<'a>) -> OpenAIRequest<'a> {
    let tools = request.tools.map(convert_tools);
    OpenAIRequest {
        model,
        messages: convert_messages(request.messages),
        tool_choice: tools.as_ref().and(request.tool_choice),
        tools,
        max_completion_tokens: request.max_completion_tokens,
    }
}

fn into_chat_response(response: OpenAIResponse) -> Result<ChatResponse, ProviderError> {
    let message = response
        .choices
        .into_iter()
        .next()
        .ok_or(ProviderError::NoChoices)?
        .message;

    let tool_calls: Vec<ToolCall> = message
        .tool_calls
        .unwrap_or_default()
        .into_iter()
        .map(|c| ToolCall {
            id: c.id,
            name: c.function.name,
            arguments: c.function.arguments,
        })
        .collect();

    let has_content = message
        .content
        .as_ref()
        .is_some_and(|c| !c.trim().is_empty());
    if !has_content && tool_calls.is_empty() {
        return Err(ProviderError::EmptyResponse);
    }

    Ok(ChatResponse {
        text: message.content,
        tool_calls,
    })
}

fn into_generated_image(response: ImageResponse) -> Result<GeneratedImage, ProviderError> {
    response
        .output
        .into_iter()
        .find(|item| item.r#type == "image_generation_call")
        .and_then(|item| {
            item.result.map(|b64_data| GeneratedImage {
                b64_data,
                revised_prompt: item.revised_prompt,
            })
        })
        .ok_or(ProviderError::NoImage)
}

#[async_trait]
impl Provider for OpenAIProvider {
    async fn chat(&self, request: ChatRequest<'_>) -> Result<ChatResponse, ProviderError> {
        let body = build_request(&self.model, &request);
        let response: OpenAIResponse = self
            .send_json(self.post("chat/completions").json(&body))
            .await?;
        into_chat_response(response)
    }

    fn model(&self) -> &str {
        &self.model
    }
}

#[async_trait]
impl ImageGenerator for OpenAIProvider {
    async fn generate_image(&self, prompt: &str) -> Result<GeneratedImage, ProviderError> {
        let body = ImageRequest {
            model: &self.model,
            input: format!("Generate an image: {}", prompt),
            tools: [HostedTool {
                r#type: "image_generation",
            }],
        };
        let response: ImageResponse = self.send_json(self.post("responses").json(&body)).await?;
        into_generated_image(response)
    }
}

#[async_trait]
impl SpeechSynthesizer for OpenAIProvider {
    async fn synthesize_speech(&self, text: &str, voice: &str) -> Result<Vec<u8>, ProviderError> {
        let body = SpeechRequest {
            model: TTS_MODEL,
            voice,
            input: text,
        };
        let response = self.send(self.post("audio/speech").json(&body)).await?;
        Ok(response.bytes().await?.to_vec())
    }
}
