use std::path::PathBuf;

/// Failure to reach the model provider or to make sense of its answer.
///
/// Aborts the current turn only; the session keeps running.
#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error {status}: {body}")]
    Api { status: u16, body: String },

    #[error("Failed to decode provider response: {0}")]
    Decode(String),

    #[error("No choices in response")]
    NoChoices,

    #[error("Empty response from API: no content or tool calls")]
    EmptyResponse,

    #[error("No image generated in response")]
    NoImage,
}

/// Tool failures. These never abort a turn: the display text becomes the
/// content of the tool-role message so the model can narrate it.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ToolError {
    #[error("Error: Unknown function {0}")]
    UnknownTool(String),

    #[error("Error: Invalid arguments for {tool}: {reason}")]
    InvalidArguments { tool: String, reason: String },

    #[error("Error: Malformed arguments for {tool}: {reason}")]
    MalformedArguments { tool: String, reason: String },

    #[error("Error: Division by zero")]
    DivisionByZero,
}

impl ToolError {
    pub fn invalid(tool: &str, reason: impl Into<String>) -> Self {
        Self::InvalidArguments {
            tool: tool.to_string(),
            reason: reason.into(),
        }
    }

    pub fn malformed(tool: &str, reason: impl Into<String>) -> Self {
        Self::MalformedArguments {
            tool: tool.to_string(),
            reason: reason.into(),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    #[error("Tool '{0}' is already registered")]
    DuplicateTool(String),
}

#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum ConversationError {
    #[error("Tool result '{0}' does not answer a pending tool call")]
    OrphanToolResult(String),

    #[error("Tool result '{got}' out of order, expected '{expected}'")]
    OutOfOrder { expected: String, got: String },

    #[error("{0} tool call(s) still waiting for a result")]
    UnansweredToolCalls(usize),
}

/// Reasons a single dispatch turn could not produce a reply.
#[derive(Debug, thiserror::Error)]
pub enum TurnError {
    #[error(transparent)]
    Transport(#[from] ProviderError),

    #[error(transparent)]
    Conversation(#[from] ConversationError),
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("OPENAI_API_KEY not found in environment, .env file or config")]
    MissingApiKey,

    #[error("Failed to read config from {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config from {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("Failed to write config to {path}: {reason}")]
    Write { path: PathBuf, reason: String },
}

/// File-system failures on the media save paths.
#[derive(Debug, thiserror::Error)]
pub enum PersistenceError {
    #[error("IO error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid image data: {0}")]
    InvalidImageData(#[from] base64::DecodeError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl PersistenceError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum StudioError {
    #[error(transparent)]
    Provider(#[from] ProviderError),

    #[error(transparent)]
    Persistence(#[from] PersistenceError),

    #[error("Generated transcript is empty")]
    EmptyTranscript,
}
