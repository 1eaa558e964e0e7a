use crate::prelude::*;
use cap_std::{ambient_authority, fs::Dir};
use std::path::{Path, PathBuf};

pub const DEFAULT_BASE_URL: &str = "https://api.guildwars2.com/";
/// upstream refuses `page_size` / `ids` batches above this
pub const MAX_PAGE_SIZE: usize = 200;

#[derive(Debug, Diagnostic, Error)]
pub enum ConfigError {
    #[error("failed to read config file {file}")]
    #[diagnostic(code(config_error::read))]
    Read {
        file: &'static str,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid json in config file {file}")]
    #[diagnostic(code(config_error::json))]
    Json {
        file: &'static str,
        #[source]
        source: serde_json::Error,
    },
    #[error("invalid value {value:?} for env {var}")]
    #[diagnostic(code(config_error::env))]
    InvalidEnv { var: &'static str, value: String },
}

/// Client Configuration
///
/// Every field has a default, so a config file only needs the keys it wants to change.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    pub base_url: Url,
    /// sent as `lang` to localized endpoints. the server decides when this is None
    pub locale: Option<SmolStr>,
    /// bearer token. none of the public endpoints need it
    pub api_key: Option<String>,
    pub user_agent: String,
    pub timeout_secs: u64,
    pub page_size: usize,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: Url::parse(DEFAULT_BASE_URL).expect("default base url is valid"),
            locale: None,
            api_key: None,
            user_agent: concat!("gw2api/", env!("CARGO_PKG_VERSION")).to_string(),
            timeout_secs: 30,
            page_size: 50,
        }
    }
}

impl ClientConfig {
    pub const FILE_NAME: &'static str = "gw2api.json";

    /// defaults, then `gw2api.json` inside `dir` (if any), then the process environment.
    pub fn load(dir: Option<&Dir>) -> Result<Self, ConfigError> {
        let config = match dir {
            Some(dir) => Self::from_dir(dir)?,
            None => Self::default(),
        };
        config.with_vars(|var| std::env::var(var).ok())
    }

    /// reads `gw2api.json` from the dir. A missing file just means defaults.
    pub fn from_dir(dir: &Dir) -> Result<Self, ConfigError> {
        match dir.read_to_string(Self::FILE_NAME) {
            Ok(json) => Self::from_json(&json),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!("no {} found, using defaults", Self::FILE_NAME);
                Ok(Self::default())
            }
            Err(source) => Err(ConfigError::Read {
                file: Self::FILE_NAME,
                source,
            }),
        }
    }

    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json).map_err(|source| ConfigError::Json {
            file: Self::FILE_NAME,
            source,
        })?;
        Ok(config.clamped())
    }

    /// overrides fields from `GW2API_*` variables as looked up by `var`
    pub fn with_vars(
        mut self,
        var: impl Fn(&'static str) -> Option<String>,
    ) -> Result<Self, ConfigError> {
        if let Some(value) = var("GW2API_BASE_URL") {
            self.base_url = Url::parse(&value).map_err(|_| ConfigError::InvalidEnv {
                var: "GW2API_BASE_URL",
                value: value.clone(),
            })?;
        }
        if let Some(value) = var("GW2API_LANG") {
            let value = value.trim();
            self.locale = (!value.is_empty()).then(|| SmolStr::new(value));
        }
        if let Some(value) = var("GW2API_KEY") {
            self.api_key = (!value.trim().is_empty()).then_some(value);
        }
        if let Some(value) = var("GW2API_TIMEOUT") {
            self.timeout_secs = value.trim().parse().map_err(|_| ConfigError::InvalidEnv {
                var: "GW2API_TIMEOUT",
                value: value.clone(),
            })?;
        }
        if let Some(value) = var("GW2API_PAGE_SIZE") {
            self.page_size = value.trim().parse().map_err(|_| ConfigError::InvalidEnv {
                var: "GW2API_PAGE_SIZE",
                value: value.clone(),
            })?;
        }
        Ok(self.clamped())
    }

    fn clamped(mut self) -> Self {
        self.page_size = self.page_size.clamp(1, MAX_PAGE_SIZE);
        self
    }
}

/// Opens the directory holding `gw2api.json`.
/// We will read a path from env `GW2API_CONFIG_DIR` or fall back to the current directory.
pub fn open_config_dir() -> Result<(PathBuf, Dir)> {
    let path = match std::env::var("GW2API_CONFIG_DIR") {
        Ok(dir) => PathBuf::from(dir),
        Err(_) => std::env::current_dir()
            .into_diagnostic()
            .wrap_err("failed to get current dir")?,
    };
    let dir = open_dir(&path)?;
    Ok((path, dir))
}

fn open_dir(path: &Path) -> Result<Dir> {
    Dir::open_ambient_dir(path, ambient_authority())
        .into_diagnostic()
        .wrap_err_with(|| format!("failed to open config dir at {path:?}"))
}
