use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

pub const DEFAULT_OUTPUT_DIRECTORY: &str = "target/site";
pub const DEFAULT_MANIFEST_FILE: &str = "src/main/nbm/manifest.mf";
pub const DEFAULT_PACKAGING: &str = "nbm";
pub const DEFAULT_VERSION_PROPERTY: &str = "suite.version";
pub const DEFAULT_README_FILE: &str = "README.md";
pub const DEFAULT_SCREENSHOTS_DIR: &str = "src/img";

/// Environment variable overriding the config file location
pub const CONFIG_ENV: &str = "SUITEMETA_CONFIG";

/// Error type for configuration loading and editing
#[derive(Debug)]
pub enum ConfigError {
    /// The config file could not be read or written
    Io(PathBuf, std::io::Error),
    /// The config file is not valid TOML for this schema
    Parse(PathBuf, String),
    /// The config could not be serialized
    Serialize(String),
    /// No home/config directory could be determined
    NoConfigDir,
    /// `set`/`get` was called with a key that does not exist
    UnknownKey(String),
    /// A value could not be converted to the key's type
    InvalidValue { key: String, value: String },
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Io(path, e) => write!(f, "{}: {}", path.display(), e),
            ConfigError::Parse(path, msg) => {
                write!(f, "Failed to parse {}: {}", path.display(), msg)
            }
            ConfigError::Serialize(msg) => write!(f, "Failed to serialize config: {}", msg),
            ConfigError::NoConfigDir => write!(f, "Could not determine config directory"),
            ConfigError::UnknownKey(key) => write!(
                f,
                "Unknown config key '{}' (expected one of: {})",
                key,
                Config::KEYS.join(", ")
            ),
            ConfigError::InvalidValue { key, value } => {
                write!(f, "Invalid value '{}' for config key '{}'", value, key)
            }
        }
    }
}

impl std::error::Error for ConfigError {}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub struct Config {
    /// Directory receiving `plugins.json`, screenshots and bundles
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output_directory: Option<String>,
    /// Manifest path relative to each module's base directory
    #[serde(skip_serializing_if = "Option::is_none")]
    pub manifest_file: Option<String>,
    /// Packaging kind that marks a project as a plugin module
    #[serde(skip_serializing_if = "Option::is_none")]
    pub packaging: Option<String>,
    /// Property holding the version label on the reactor and its modules
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version_property: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub readme_file: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub screenshots_dir: Option<String>,
    /// Archive multi-module suites into one download
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bundle_suites: Option<bool>,
}

impl Config {
    pub const KEYS: &'static [&'static str] = &[
        "output-directory",
        "manifest-file",
        "packaging",
        "version-property",
        "readme-file",
        "screenshots-dir",
        "bundle-suites",
    ];

    pub fn path() -> Result<PathBuf, ConfigError> {
        // Explicit override for tests and isolated runs
        if let Ok(env_path) = std::env::var(CONFIG_ENV) {
            let trimmed = env_path.trim();
            if !trimmed.is_empty() {
                return Ok(PathBuf::from(trimmed));
            }
        }

        #[cfg(not(target_os = "windows"))]
        let base = dirs::home_dir().map(|h| h.join(".config"));

        #[cfg(target_os = "windows")]
        let base = dirs::config_dir();

        base.map(|b| b.join("suitemeta").join("suitemeta.toml"))
            .ok_or(ConfigError::NoConfigDir)
    }

    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from_path(&Self::path()?)
    }

    pub fn load_from_path(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Ok(Config::default());
        }
        let content =
            fs::read_to_string(path).map_err(|e| ConfigError::Io(path.to_path_buf(), e))?;
        toml::from_str(&content).map_err(|e| ConfigError::Parse(path.to_path_buf(), e.to_string()))
    }

    pub fn save(&self) -> Result<(), ConfigError> {
        self.save_to_path(&Self::path()?)
    }

    pub fn save_to_path(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| ConfigError::Io(parent.to_path_buf(), e))?;
        }
        let content =
            toml::to_string_pretty(self).map_err(|e| ConfigError::Serialize(e.to_string()))?;
        fs::write(path, content).map_err(|e| ConfigError::Io(path.to_path_buf(), e))
    }

    pub fn get(&self, key: &str) -> Result<Option<String>, ConfigError> {
        let value = match key {
            "output-directory" => self.output_directory.clone(),
            "manifest-file" => self.manifest_file.clone(),
            "packaging" => self.packaging.clone(),
            "version-property" => self.version_property.clone(),
            "readme-file" => self.readme_file.clone(),
            "screenshots-dir" => self.screenshots_dir.clone(),
            "bundle-suites" => self.bundle_suites.map(|b| b.to_string()),
            _ => return Err(ConfigError::UnknownKey(key.to_string())),
        };
        Ok(value)
    }

    pub fn set(&mut self, key: &str, value: String) -> Result<(), ConfigError> {
        match key {
            "output-directory" => self.output_directory = Some(value),
            "manifest-file" => self.manifest_file = Some(value),
            "packaging" => self.packaging = Some(value),
            "version-property" => self.version_property = Some(value),
            "readme-file" => self.readme_file = Some(value),
            "screenshots-dir" => self.screenshots_dir = Some(value),
            "bundle-suites" => {
                let parsed = value
                    .trim()
                    .parse::<bool>()
                    .map_err(|_| ConfigError::InvalidValue {
                        key: key.to_string(),
                        value: value.clone(),
                    })?;
                self.bundle_suites = Some(parsed);
            }
            _ => return Err(ConfigError::UnknownKey(key.to_string())),
        }
        Ok(())
    }

    pub fn is_empty(&self) -> bool {
        self == &Config::default()
    }

    /// Effective values for every key, defaults included
    pub fn values_iter(&self) -> Vec<(&'static str, String)> {
        vec![
            ("output-directory", self.get_output_directory()),
            ("manifest-file", self.get_manifest_file()),
            ("packaging", self.get_packaging()),
            ("version-property", self.get_version_property()),
            ("readme-file", self.get_readme_file()),
            ("screenshots-dir", self.get_screenshots_dir()),
            ("bundle-suites", self.get_bundle_suites().to_string()),
        ]
    }

    pub fn get_output_directory(&self) -> String {
        self.output_directory
            .clone()
            .unwrap_or_else(|| DEFAULT_OUTPUT_DIRECTORY.to_string())
    }

    pub fn get_manifest_file(&self) -> String {
        self.manifest_file
            .clone()
            .unwrap_or_else(|| DEFAULT_MANIFEST_FILE.to_string())
    }

    pub fn get_packaging(&self) -> String {
        self.packaging
            .clone()
            .unwrap_or_else(|| DEFAULT_PACKAGING.to_string())
    }

    pub fn get_version_property(&self) -> String {
        self.version_property
            .clone()
            .unwrap_or_else(|| DEFAULT_VERSION_PROPERTY.to_string())
    }

    pub fn get_readme_file(&self) -> String {
        self.readme_file
            .clone()
            .unwrap_or_else(|| DEFAULT_README_FILE.to_string())
    }

    pub fn get_screenshots_dir(&self) -> String {
        self.screenshots_dir
            .clone()
            .unwrap_or_else(|| DEFAULT_SCREENSHOTS_DIR.to_string())
    }

    pub fn get_bundle_suites(&self) -> bool {
        self.bundle_suites.unwrap_or(true)
    }
}
