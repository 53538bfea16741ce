//! Config command handler

use crate::application::ports::ConfigStore;
use crate::domain::config::AppConfig;
use crate::domain::error::ConfigError;
use crate::domain::recording::{normalize_sub_directory, AudioFormat, Directory, Duration};

use super::args::{is_valid_config_key, ConfigAction, VALID_CONFIG_KEYS};
use super::presenter::Presenter;

const NOT_SET: &str = "(not set)";

/// Handle config subcommand
pub async fn handle_config_command<S: ConfigStore>(
    action: ConfigAction,
    store: &S,
    presenter: &Presenter,
) -> Result<(), ConfigError> {
    match action {
        ConfigAction::Init => handle_init(store, presenter).await,
        ConfigAction::Set { key, value } => handle_set(store, presenter, &key, &value).await,
        ConfigAction::Get { key } => handle_get(store, presenter, &key).await,
        ConfigAction::List => handle_list(store, presenter).await,
        ConfigAction::Path => handle_path(store, presenter),
    }
}

async fn handle_init<S: ConfigStore>(store: &S, presenter: &Presenter) -> Result<(), ConfigError> {
    store.init().await?;
    presenter.success(&format!(
        "Config file created at: {}",
        store.path().display()
    ));
    Ok(())
}

async fn handle_set<S: ConfigStore>(
    store: &S,
    presenter: &Presenter,
    key: &str,
    value: &str,
) -> Result<(), ConfigError> {
    check_key(key)?;
    let value = normalize_value(key, value)?;

    let mut config = store.load().await?;
    set_value(&mut config, key, value.clone());
    store.save(&config).await?;

    match value {
        Some(v) => presenter.success(&format!("{} = {}", key, v)),
        None => presenter.success(&format!("{} cleared", key)),
    }
    Ok(())
}

async fn handle_get<S: ConfigStore>(
    store: &S,
    presenter: &Presenter,
    key: &str,
) -> Result<(), ConfigError> {
    check_key(key)?;
    let config = store.load().await?;
    presenter.output(get_value(&config, key).as_deref().unwrap_or(NOT_SET));
    Ok(())
}

async fn handle_list<S: ConfigStore>(store: &S, presenter: &Presenter) -> Result<(), ConfigError> {
    let config = store.load().await?;
    for key in VALID_CONFIG_KEYS {
        presenter.key_value(key, get_value(&config, key).as_deref().unwrap_or(NOT_SET));
    }
    Ok(())
}

fn handle_path<S: ConfigStore>(store: &S, presenter: &Presenter) -> Result<(), ConfigError> {
    presenter.output(&store.path().to_string_lossy());
    Ok(())
}

fn check_key(key: &str) -> Result<(), ConfigError> {
    if is_valid_config_key(key) {
        return Ok(());
    }
    Err(ConfigError::ValidationError {
        key: key.to_string(),
        message: format!("Unknown key. Valid keys: {}", VALID_CONFIG_KEYS.join(", ")),
    })
}

/// Validate a value for `key` and return the form that is stored.
///
/// `None` clears the key (only an all-separator `sub_directory` does that).
fn normalize_value(key: &str, value: &str) -> Result<Option<String>, ConfigError> {
    let invalid = |message: String| ConfigError::ValidationError {
        key: key.to_string(),
        message,
    };

    let stored = match key {
        "directory" => Some(
            value
                .parse::<Directory>()
                .map_err(|e| invalid(e.to_string()))?
                .as_str()
                .to_string(),
        ),
        "sub_directory" => normalize_sub_directory(value),
        "format" => Some(
            value
                .parse::<AudioFormat>()
                .map_err(|e| invalid(e.to_string()))?
                .extension()
                .to_string(),
        ),
        "notify" => Some(
            parse_bool(value)
                .ok_or_else(|| invalid("Value must be 'true' or 'false'".to_string()))?
                .to_string(),
        ),
        "background_budget" | "duration" => {
            value
                .parse::<Duration>()
                .map_err(|e| invalid(e.to_string()))?;
            Some(value.trim().to_lowercase())
        }
        _ => return Err(invalid("Unknown key".to_string())),
    };
    Ok(stored)
}

fn set_value(config: &mut AppConfig, key: &str, value: Option<String>) {
    match key {
        "directory" => config.directory = value,
        "sub_directory" => config.sub_directory = value,
        "format" => config.format = value,
        "notify" => config.notify = value.as_deref().and_then(parse_bool),
        "background_budget" => config.background_budget = value,
        "duration" => config.duration = value,
        _ => {}
    }
}

fn get_value(config: &AppConfig, key: &str) -> Option<String> {
    match key {
        "directory" => config.directory.clone(),
        "sub_directory" => config.sub_directory.clone(),
        "format" => config.format.clone(),
        "notify" => config.notify.map(|b| b.to_string()),
        "background_budget" => config.background_budget.clone(),
        "duration" => config.duration.clone(),
        _ => None,
    }
}

/// Parse a boolean value
fn parse_bool(value: &str) -> Option<bool> {
    match value.to_lowercase().as_str() {
        "true" | "yes" | "1" => Some(true),
        "false" | "no" | "0" => Some(false),
        _ => None,
    }
}
