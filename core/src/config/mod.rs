use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

const PARLEY_DIR: &str = ".parley";

pub const DEFAULT_CHAT_MODEL: &str = "gpt-4o";
pub const DEFAULT_IMAGE_MODEL: &str = "gpt-5";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub api_key: String,
    pub organization: Option<String>,
    pub model: Option<String>,
    pub base_url: Option<String>,
    pub max_completion_tokens: u32,
    pub transcript_max_tokens: u32,
    pub voice: String,
    pub images_dir: PathBuf,
    pub audio_dir: PathBuf,
    /// Reject tool arguments the schema does not declare.
    pub strict_arguments: bool,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            api_key: String::new(),
            organization: None,
            model: None,
            base_url: None,
            max_completion_tokens: 500,
            transcript_max_tokens: 2000,
            voice: "alloy".to_string(),
            images_dir: PathBuf::from("images"),
            audio_dir: PathBuf::from("audio"),
            strict_arguments: true,
        }
    }
}

impl Config {
    /// Loads the config file (if any), then `.env`, then the process
    /// environment. Fails when no API key is found anywhere.
    pub fn load() -> Result<Self, ConfigError> {
        if let Err(e) = dotenv::dotenv() {
            tracing::debug!("No .env loaded: {}", e);
        }
        let path = get_config_path();
        let file = path.exists().then_some(path.as_path());
        Self::from_sources(file, |key| std::env::var(key).ok())
    }

    pub fn from_sources(
        file: Option<&Path>,
        env: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ConfigError> {
        let mut config = match file {
            Some(path) => load_config(path)?,
            None => Config::default(),
        };
        config.apply_env(env);

        if config.api_key.trim().is_empty() {
            return Err(ConfigError::MissingApiKey);
        }
        Ok(config)
    }

    fn apply_env(&mut self, env: impl Fn(&str) -> Option<String>) {
        let var = |key: &str| env(key).filter(|v| !v.trim().is_empty());

        if let Some(key) = var("OPENAI_API_KEY") {
            self.api_key = key;
        }
        if let Some(org) = var("OPENAI_ORG_ID") {
            self.organization = Some(org);
        }
        if let Some(model) = var("OPENAI_MODEL") {
            self.model = Some(model);
        }
        if let Some(url) = var("OPENAI_BASE_URL") {
            self.base_url = Some(url);
        }
    }

    /// The configured model, or `default` for the current mode.
    pub fn model_or<'a>(&'a self, default: &'a str) -> &'a str {
        self.model.as_deref().unwrap_or(default)
    }
}

pub fn get_parley_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(PARLEY_DIR)
}

pub fn get_config_path() -> PathBuf {
    get_parley_dir().join("config.toml")
}

pub fn config_exists() -> bool {
    get_config_path().exists()
}

pub fn load_config(path: &Path) -> Result<Config, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;

    toml::from_str(&content).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

pub fn save_config(config: &Config, path: &Path) -> Result<(), ConfigError> {
    let write_err = |reason: String| ConfigError::Write {
        path: path.to_path_buf(),
        reason,
    };

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| write_err(e.to_string()))?;
    }
    let content = toml::to_string_pretty(config).map_err(|e| write_err(e.to_string()))?;
    std::fs::write(path, content).map_err(|e| write_err(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use tempfile::TempDir;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn missing_api_key_is_fatal() {
        let err = Config::from_sources(None, env(&[])).unwrap_err();
        assert!(matches!(err, ConfigError::MissingApiKey));

        let blank = Config::from_sources(None, env(&[("OPENAI_API_KEY", "  ")])).unwrap_err();
        assert!(matches!(blank, ConfigError::MissingApiKey));
    }

    #[test]
    fn environment_fills_credentials_and_model() {
        let config = Config::from_sources(
            None,
            env(&[
                ("OPENAI_API_KEY", "sk-test"),
                ("OPENAI_ORG_ID", "org-1"),
                ("OPENAI_MODEL", "gpt-4o-mini"),
            ]),
        )
        .unwrap();

        assert_eq!(config.api_key, "sk-test");
        assert_eq!(config.organization.as_deref(), Some("org-1"));
        assert_eq!(config.model_or(DEFAULT_IMAGE_MODEL), "gpt-4o-mini");
        assert_eq!(config.max_completion_tokens, 500);
        assert!(config.strict_arguments);
    }

    #[test]
    fn model_falls_back_per_mode() {
        let config = Config::from_sources(None, env(&[("OPENAI_API_KEY", "sk")])).unwrap();
        assert_eq!(config.model_or(DEFAULT_CHAT_MODEL), "gpt-4o");
        assert_eq!(config.model_or(DEFAULT_IMAGE_MODEL), "gpt-5");
    }

    #[test]
    fn environment_overrides_file() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("config.toml");
        std::fs::write(
            &path,
            "api_key = \"sk-file\"\nmodel = \"gpt-file\"\nvoice = \"nova\"\nstrict_arguments = false\n",
        )
        .unwrap();

        let from_file = Config::from_sources(Some(&path), env(&[])).unwrap();
        assert_eq!(from_file.api_key, "sk-file");
        assert_eq!(from_file.voice, "nova");
        assert!(!from_file.strict_arguments);
        assert_eq!(from_file.images_dir, PathBuf::from("images"));

        let overridden =
            Config::from_sources(Some(&path), env(&[("OPENAI_MODEL", "gpt-env")])).unwrap();
        assert_eq!(overridden.model.as_deref(), Some("gpt-env"));
        assert_eq!(overridden.api_key, "sk-file");
    }

    #[test]
    fn invalid_file_is_a_parse_error() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("config.toml");
        std::fs::write(&path, "api_key = [").unwrap();

        let err = Config::from_sources(Some(&path), env(&[])).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }

    #[test]
    fn saved_config_loads_back() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("nested").join("config.toml");
        let config = Config {
            api_key: "sk-saved".into(),
            model: Some("gpt-4o".into()),
            ..Config::default()
        };

        save_config(&config, &path).unwrap();
        let loaded = load_config(&path).unwrap();
        assert_eq!(loaded.api_key, "sk-saved");
        assert_eq!(loaded.model.as_deref(), Some("gpt-4o"));
    }
}
