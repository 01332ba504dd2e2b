use std::env;
use std::fmt;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::debug;

pub const DEFAULT_CONFIG_PATH: &str = "summurai.conf";
pub const DEFAULT_MODEL: &str = "gpt-4-turbo-preview";
const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
const DEFAULT_MODEL_TIMEOUT_SECS: u64 = 60;
const DEFAULT_MAX_RETRIES: u32 = 3;
const DEFAULT_RENDER_TIMEOUT_SECS: u64 = 10;

const API_KEY_SETTING: &str = "openai_api_key";
const MODEL_SETTING: &str = "openai_chat_model";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error(
        "You must provide an OpenAI API key, using the --api-key option or by setting the \
         openai_api_key value in the {} file.",
        path.display()
    )]
    MissingApiKey { path: PathBuf },

    #[error("Failed to read config file '{}'", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Values supplied on the command line. They win over the settings file.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub api_key: Option<String>,
    pub model: Option<String>,
}

/// Values read from the `key=value` settings file. Absent keys are empty.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FileSettings {
    pub api_key: String,
    pub model: String,
}

impl FileSettings {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        match fs::read_to_string(path) {
            Ok(contents) => Ok(Self::parse(&contents)),
            Err(err) if err.kind() == ErrorKind::NotFound => {
                debug!(path = %path.display(), "config file not found, using empty settings");
                Ok(Self::default())
            }
            Err(source) => Err(ConfigError::Read {
                path: path.to_path_buf(),
                source,
            }),
        }
    }

    pub fn parse(contents: &str) -> Self {
        let mut settings = Self::default();
        for (idx, raw) in contents.lines().enumerate() {
            let line = raw.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let Some((key, value)) = line.split_once('=') else {
                debug!(line = idx + 1, "skipping config line without '='");
                continue;
            };
            match key.trim() {
                API_KEY_SETTING => settings.api_key = value.trim().to_string(),
                MODEL_SETTING => settings.model = value.trim().to_string(),
                other => debug!(key = %other, "ignoring unknown config key"),
            }
        }
        settings
    }
}

#[derive(Clone)]
pub struct Config {
    pub api_key: String,
    pub model: String,
    pub base_url: String,
    pub model_timeout_secs: u64,
    pub max_retries: u32,
    pub render_timeout_secs: u64,
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("api_key", &"<redacted>")
            .field("model", &self.model)
            .field("base_url", &self.base_url)
            .field("model_timeout_secs", &self.model_timeout_secs)
            .field("max_retries", &self.max_retries)
            .field("render_timeout_secs", &self.render_timeout_secs)
            .finish()
    }
}

impl Config {
    pub fn load(path: &Path, overrides: &Overrides) -> Result<Self, ConfigError> {
        let file = FileSettings::load(path)?;
        Self::resolve(path, overrides, &file, |key| env::var(key).ok())
    }

    fn resolve(
        path: &Path,
        overrides: &Overrides,
        file: &FileSettings,
        mut get_var: impl FnMut(&str) -> Option<String>,
    ) -> Result<Self, ConfigError> {
        let api_key = pick(overrides.api_key.as_deref(), &file.api_key);
        if api_key.is_empty() {
            return Err(ConfigError::MissingApiKey {
                path: path.to_path_buf(),
            });
        }

        let mut model = pick(overrides.model.as_deref(), &file.model);
        if model.is_empty() {
            model = DEFAULT_MODEL.to_string();
        }

        Ok(Self {
            api_key,
            model,
            base_url: parse_base_url(get_var("OPENAI_BASE_URL").as_deref()),
            model_timeout_secs: parse_positive_u64(
                get_var("OPENAI_TIMEOUT_SECS").as_deref(),
                DEFAULT_MODEL_TIMEOUT_SECS,
            ),
            max_retries: parse_max_retries(get_var("OPENAI_MAX_RETRIES").as_deref()),
            render_timeout_secs: parse_positive_u64(
                get_var("RENDER_TIMEOUT_SECS").as_deref(),
                DEFAULT_RENDER_TIMEOUT_SECS,
            ),
        })
    }
}

fn pick(cli: Option<&str>, file: &str) -> String {
    cli.map(str::trim)
        .filter(|value| !value.is_empty())
        .unwrap_or(file)
        .to_string()
}

fn parse_base_url(raw: Option<&str>) -> String {
    raw.map(str::trim)
        .filter(|value| !value.is_empty())
        .unwrap_or(DEFAULT_BASE_URL)
        .to_string()
}

fn parse_positive_u64(raw: Option<&str>, default: u64) -> u64 {
    raw.and_then(|value| value.trim().parse::<u64>().ok())
        .filter(|value| *value > 0)
        .unwrap_or(default)
}

fn parse_max_retries(raw: Option<&str>) -> u32 {
    raw.and_then(|value| value.trim().parse::<u32>().ok())
        .unwrap_or(DEFAULT_MAX_RETRIES)
}
