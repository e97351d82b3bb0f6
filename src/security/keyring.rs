use tracing::debug;

use crate::core::{
    errors::{AppError, AppResult},
    types::Provider,
};

const SERVICE: &str = "docqa";

fn username_for_provider(provider: Provider) -> &'static str {
    match provider {
        Provider::Anthropic => "anthropic",
        Provider::Mistral => "mistral",
    }
}

pub fn env_var_for_provider(provider: Provider) -> &'static str {
    match provider {
        Provider::Anthropic => "ANTHROPIC_API_KEY",
        Provider::Mistral => "MISTRAL_API_KEY",
    }
}

pub fn set_provider_key(provider: Provider, api_key: &str) -> AppResult<()> {
    let entry = keyring::Entry::new(SERVICE, username_for_provider(provider))
        .map_err(|err| AppError::Internal(err.to_string()))?;
    entry
        .set_password(api_key)
        .map_err(|err| AppError::Internal(err.to_string()))
}

/// Reads the key from the OS keyring, then from the provider's environment
/// variable.
pub fn get_provider_key(provider: Provider) -> AppResult<String> {
    let stored = keyring::Entry::new(SERVICE, username_for_provider(provider))
        .and_then(|entry| entry.get_password());
    match stored {
        Ok(key) if !key.trim().is_empty() => Ok(key),
        other => {
            if let Err(err) = other {
                debug!(provider = username_for_provider(provider), error = %err, "no keyring entry");
            }
            key_from_env(provider, |name| std::env::var(name).ok())
        }
    }
}

fn key_from_env<F>(provider: Provider, lookup: F) -> AppResult<String>
where
    F: Fn(&str) -> Option<String>,
{
    lookup(env_var_for_provider(provider))
        .map(|key| key.trim().to_string())
        .filter(|key| !key.is_empty())
        .ok_or(AppError::ProviderAuth)
}
