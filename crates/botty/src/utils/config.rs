use std::{
    env, fs,
    path::PathBuf,
    sync::{Arc, Mutex, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard},
};

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::ConfigError;

pub const TOKEN_VAR: &str = "BOTTY_TOKEN";
pub const CONFIG_VAR: &str = "BOTTY_CONFIG";
pub const PREFIX_VAR: &str = "BOTTY_PREFIX";
pub const DEFAULT_CONFIG_PATH: &str = "./config.json";

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Config {
    pub prefix: String,
    pub footer: FooterConfig,
    pub embed: EmbedConfig,
    /// User ids allowed to run the administration commands.
    #[serde(default)]
    pub owners: Vec<u64>,
    /// Extensions loaded at startup.
    #[serde(default = "default_extensions")]
    pub extensions: Vec<String>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct FooterConfig {
    pub text: String,
    pub icon_url: String,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct EmbedConfig {
    pub color: u32,
}

fn default_extensions() -> Vec<String> {
    vec!["cogs.botty".to_string(), "cogs.help".to_string()]
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PrefixUpdate {
    Unchanged,
    Changed { previous: String },
}

#[derive(Debug)]
struct Stored {
    /// The file as read, so keys we do not know about survive a rewrite.
    raw: Value,
    config: Arc<Config>,
}

/// The bot configuration and the file it lives in.
///
/// Setters write the file first and only then update memory, so a failed
/// write leaves both as they were. Writers queue on `writer`; the `stored`
/// lock is never held across file IO.
#[derive(Debug)]
pub struct ConfigStore {
    path: PathBuf,
    writer: Mutex<()>,
    stored: RwLock<Stored>,
}

impl ConfigStore {
    pub fn load(path: impl Into<PathBuf>) -> Result<Self, ConfigError> {
        let path = path.into();

        let text = fs::read_to_string(&path).map_err(|e| ConfigError::Read {
            path: path.clone(),
            source: Arc::new(e),
        })?;

        Self::parse(path, &text)
    }

    fn parse(path: PathBuf, text: &str) -> Result<Self, ConfigError> {
        let parse_error = |e| ConfigError::Parse {
            path: path.clone(),
            source: Arc::new(e),
        };

        let mut raw = serde_json::from_str::<Value>(text).map_err(parse_error)?;

        if let Some(object) = raw.as_object_mut() {
            if object.remove("token").is_some() {
                log::warn!(
                    "Ignoring `token` in {}, the token is only read from {TOKEN_VAR}",
                    path.display()
                );
            }
        }

        let config = serde_json::from_value::<Config>(raw.clone()).map_err(parse_error)?;

        validate_prefix(&config.prefix)?;

        Ok(Self {
            path,
            writer: Mutex::new(()),
            stored: RwLock::new(Stored {
                raw,
                config: Arc::new(config),
            }),
        })
    }

    /// Replaces the prefix in memory only.
    pub fn override_prefix(&self, prefix: &str) -> Result<(), ConfigError> {
        validate_prefix(prefix)?;

        let _writer = self.writer.lock().unwrap_or_else(PoisonError::into_inner);
        let mut stored = self.write();
        let mut config = (*stored.config).clone();

        config.prefix = prefix.to_string();
        stored.config = Arc::new(config);

        Ok(())
    }

    fn read(&self) -> RwLockReadGuard<'_, Stored> {
        self.stored.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, Stored> {
        self.stored.write().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn get(&self) -> Arc<Config> {
        self.read().config.clone()
    }

    pub fn prefix(&self) -> String {
        self.get().prefix.clone()
    }

    /// Changes the prefix and persists it. Setting the active prefix again
    /// does not touch the file.
    pub fn set_prefix(&self, prefix: &str) -> Result<PrefixUpdate, ConfigError> {
        validate_prefix(prefix)?;

        let _writer = self.writer.lock().unwrap_or_else(PoisonError::into_inner);

        let (mut raw, mut config) = {
            let stored = self.read();

            if stored.config.prefix == prefix {
                return Ok(PrefixUpdate::Unchanged);
            }

            (stored.raw.clone(), (*stored.config).clone())
        };

        if let Some(object) = raw.as_object_mut() {
            object.insert("prefix".to_string(), Value::String(prefix.to_string()));
        }

        self.persist(&raw)?;

        let previous = std::mem::replace(&mut config.prefix, prefix.to_string());
        let mut stored = self.write();

        stored.raw = raw;
        stored.config = Arc::new(config);
        drop(stored);

        log::info!("Prefix changed from `{previous}` to `{prefix}`");

        Ok(PrefixUpdate::Changed { previous })
    }

    /// Writes to a sibling file and renames it over the config.
    fn persist(&self, raw: &Value) -> Result<(), ConfigError> {
        let write_error = |e| ConfigError::Write {
            path: self.path.clone(),
            source: Arc::new(e),
        };

        let mut tmp = self.path.clone().into_os_string();
        tmp.push(".tmp");
        let tmp = PathBuf::from(tmp);

        let mut text = serde_json::to_string_pretty(raw).map_err(|e| ConfigError::Parse {
            path: self.path.clone(),
            source: Arc::new(e),
        })?;
        text.push('\n');

        if let Err(e) = fs::write(&tmp, text) {
            let _ = fs::remove_file(&tmp);

            return Err(write_error(e));
        }

        fs::rename(&tmp, &self.path).map_err(write_error)
    }
}

pub fn validate_prefix(prefix: &str) -> Result<(), ConfigError> {
    if prefix.is_empty() || prefix.chars().any(char::is_whitespace) {
        return Err(ConfigError::InvalidPrefix(prefix.to_string()));
    }

    Ok(())
}

/// Path of the config file, from the environment or the default.
pub fn config_path() -> PathBuf {
    env::var_os(CONFIG_VAR)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH))
}

pub fn load_token() -> Result<String, ConfigError> {
    token_from(env::var(TOKEN_VAR).ok())
}

fn token_from(value: Option<String>) -> Result<String, ConfigError> {
    match value.map(|token| token.trim().to_string()) {
        Some(token) if !token.is_empty() => Ok(token),
        _ => Err(ConfigError::MissingSecret(TOKEN_VAR)),
    }
}
