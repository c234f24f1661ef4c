use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

pub const DEFAULT_TARGET_SIZE: usize = 100;
pub const DEFAULT_MINIMUM_PER_SOURCE: usize = 10;

/// Options recognised by the curation engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurationConfig {
    #[serde(default = "default_target_size")]
    pub target_size: usize,
    #[serde(default = "default_minimum_per_source")]
    pub minimum_per_source: usize,
    /// Fixed seed for the final shuffle. `None` draws fresh entropy per run.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shuffle_seed: Option<u64>,
}

fn default_target_size() -> usize { DEFAULT_TARGET_SIZE }
fn default_minimum_per_source() -> usize { DEFAULT_MINIMUM_PER_SOURCE }

impl Default for CurationConfig {
    fn default() -> Self {
        Self {
            target_size: DEFAULT_TARGET_SIZE,
            minimum_per_source: DEFAULT_MINIMUM_PER_SOURCE,
            shuffle_seed: None,
        }
    }
}

impl CurationConfig {
    pub fn new(target_size: usize, minimum_per_source: usize) -> Self {
        Self { target_size, minimum_per_source, shuffle_seed: None }
    }

    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.shuffle_seed = Some(seed);
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.target_size == 0 {
            return Err(Error::Validation("target_size must be a positive integer".to_string()));
        }
        Ok(())
    }
}

/// Where persisted search results are read from and curated subsets written to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DataConfig {
    pub search_root: String,
    pub output_dir: String,
    pub folder_prefix: String,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            search_root: "data/search_results".to_string(),
            output_dir: "data/curated".to_string(),
            folder_prefix: "search_".to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct Settings {
    curation: CurationConfig,
    data: DataConfig,
}

pub struct Config {
    figment: Figment,
    base_dir: PathBuf,
}

impl Config {
    pub fn load() -> Result<Self> {
        let env_name = env::var("RUST_ENV").unwrap_or_else(|_| "dev".to_string());
        Self::load_from(Path::new("."), &env_name)
    }

    /// Layers built-in defaults, `config.toml`, `config.<env>.toml` and `APP_*`
    /// env vars (nested keys split on `__`, e.g. `APP_CURATION__TARGET_SIZE`).
    pub fn load_from(dir: &Path, env_name: &str) -> Result<Self> {
        let mut figment = Figment::from(Serialized::defaults(Settings::default()))
            .merge(Toml::file(dir.join("config.toml")));
        match env_name {
            "dev" | "development" => figment = figment.merge(Toml::file(dir.join("config.dev.toml"))),
            "prod" | "production" => figment = figment.merge(Toml::file(dir.join("config.prod.toml"))),
            "test" | "testing" => figment = figment.merge(Toml::file(dir.join("config.test.toml"))),
            _ => {}
        }
        figment = figment.merge(Env::prefixed("APP_").split("__"));

        let config = Self { figment, base_dir: dir.to_path_buf() };
        config.validate_for_env(env_name)?;
        Ok(config)
    }

    pub fn get<T>(&self, key: &str) -> Result<T>
    where
        T: serde::de::DeserializeOwned,
    {
        self.figment
            .extract_inner(key)
            .map_err(|e| Error::InvalidConfig(format!("Failed to get '{}': {}", key, e)))
    }

    pub fn curation(&self) -> Result<CurationConfig> {
        let curation: CurationConfig = self.get("curation")?;
        curation.validate().map_err(|e| Error::InvalidConfig(e.to_string()))?;
        Ok(curation)
    }

    pub fn data(&self) -> Result<DataConfig> {
        self.get("data")
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    fn validate_for_env(&self, env: &str) -> Result<()> {
        let curation = self.curation()?;
        match env {
            "test" | "testing" if curation.shuffle_seed.is_none() => Err(Error::InvalidConfig(
                "test environment requires curation.shuffle_seed".to_string(),
            )),
            _ => Ok(()),
        }
    }
}

/// Expand a user-provided path string:
/// - Expands leading '~' to the user's home directory
/// - Expands ${VAR} and $VAR environment variables
/// - Returns a PathBuf without attempting to canonicalize
pub fn expand_path<S: AsRef<str>>(input: S) -> PathBuf {
    let s = input.as_ref();
    let expanded_env = shellexpand::env(s).unwrap_or(std::borrow::Cow::Borrowed(s));
    let expanded = shellexpand::tilde(&expanded_env);
    PathBuf::from(expanded.as_ref())
}

/// Resolve a possibly relative path against a given base directory after expansion.
/// If `p` is absolute, it's returned as-is; otherwise `base.join(p)` is returned.
pub fn resolve_with_base<S: AsRef<str>>(base: &Path, p: S) -> PathBuf {
    let p = expand_path(p);
    if p.is_absolute() { p } else { base.join(p) }
}
