use crate::config::Config;
use crate::providers::OpenAIProvider;

/// Builds the provider client for one mode; `default_model` applies when the
/// config names no model.
pub fn create_provider(config: &Config, default_model: &str) -> OpenAIProvider {
    let mut provider = OpenAIProvider::new(config.api_key.clone())
        .with_model(config.model_or(default_model))
        .with_organization(config.organization.clone());
    if let Some(base_url) = &config.base_url {
        provider = provider.with_base_url(base_url.clone());
    }
    provider
}
