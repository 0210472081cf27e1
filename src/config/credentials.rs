use config::{ Config, File, FileFormat };
use log::info;
use serde::Deserialize;
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration file '{0}' not found")]
    Missing(String),
    #[error("Failed to read configuration file '{path}': {source}")]
    Parse {
        path: String,
        #[source]
        source: config::ConfigError,
    },
    #[error("Configuration file '{0}' has no [DEFAULT] OPENAI_API_KEY entry")]
    MissingKey(String),
}

#[derive(Deserialize, Debug)]
struct CredentialFile {
    #[serde(alias = "DEFAULT", alias = "Default")]
    default: Option<DefaultSection>,
}

#[derive(Deserialize, Debug)]
struct DefaultSection {
    #[serde(alias = "OPENAI_API_KEY")]
    openai_api_key: Option<String>,
}

/// Reads the API credential from the `[DEFAULT]` section of an INI file.
pub fn load_api_key<P: AsRef<Path>>(path: P) -> Result<String, ConfigError> {
    let path = path.as_ref();
    let display = path.display().to_string();
    if !path.is_file() {
        return Err(ConfigError::Missing(display));
    }

    let file: CredentialFile = Config::builder()
        .add_source(File::new(&display, FileFormat::Ini))
        .build()
        .and_then(|settings| settings.try_deserialize())
        .map_err(|source| ConfigError::Parse {
            path: display.clone(),
            source,
        })?;

    let key = file.default
        .and_then(|section| section.openai_api_key)
        .map(|key| key.trim().to_string())
        .filter(|key| !key.is_empty())
        .ok_or_else(|| ConfigError::MissingKey(display.clone()))?;

    info!("Loaded API credential from {}", display);
    Ok(key)
}
