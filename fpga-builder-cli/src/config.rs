use crate::{Context, Result};
use fpga_builder::console::ColorMode;
use fpga_builder::paths;
use std::fs;
use std::path::{Path, PathBuf};

/// Configuration file looked up in the current directory
pub const DEFAULT_CONFIG: &str = "fpga-builder.toml";

/// Settings read from `fpga-builder.toml`.
///
/// ```toml
/// [console]
/// color = "auto"
///
/// [run]
/// silent = false
/// cwd = "build"
///
/// [toolchain]
/// version = "2019.2"
/// ```
///
/// Every key is optional. A relative `run.cwd` is resolved against the
/// directory holding the configuration file.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Config {
    pub color: Option<ColorMode>,
    pub silent: bool,
    pub cwd: Option<PathBuf>,
    pub toolchain_version: Option<String>,
}

impl Config {
    /// Loads the configuration from `path`, or from [`DEFAULT_CONFIG`] when
    /// `path` is `None`.
    ///
    /// A missing default file yields the default configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if an explicitly requested file is missing, or if the
    /// file can not be read or contains invalid settings.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let (path, explicit) = match path {
            Some(path) => (path.to_path_buf(), true),
            None => (PathBuf::from(DEFAULT_CONFIG), false),
        };

        if !explicit && !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let base = path.parent().unwrap_or_else(|| Path::new(""));

        Self::parse(&content, base)
            .with_context(|| format!("Invalid configuration in {}", path.display()))
    }

    /// Parses configuration `content`, resolving relative paths against `base`.
    ///
    /// # Errors
    ///
    /// Returns an error on malformed TOML or wrongly typed settings.
    pub fn parse(content: &str, base: &Path) -> Result<Self> {
        let document: toml::Value = toml::from_str(content)?;

        let color = match get_str(&document, "console", "color")? {
            Some(value) => Some(ColorMode::parse(value).ok_or_else(|| {
                anyhow::anyhow!("console.color must be auto, always or never, got '{value}'")
            })?),
            None => None,
        };
        let silent = get_bool(&document, "run", "silent")?.unwrap_or(false);
        let cwd = get_str(&document, "run", "cwd")?.map(|dir| paths::resolve(base, dir));
        let toolchain_version = get_str(&document, "toolchain", "version")?.map(String::from);

        Ok(Self {
            color,
            silent,
            cwd,
            toolchain_version,
        })
    }
}

fn get<'a>(document: &'a toml::Value, section: &str, key: &str) -> Option<&'a toml::Value> {
    document.get(section).and_then(|table| table.get(key))
}

fn get_str<'a>(document: &'a toml::Value, section: &str, key: &str) -> Result<Option<&'a str>> {
    match get(document, section, key) {
        None => Ok(None),
        Some(value) => value
            .as_str()
            .map(Some)
            .ok_or_else(|| anyhow::anyhow!("{section}.{key} must be a string")),
    }
}

fn get_bool(document: &toml::Value, section: &str, key: &str) -> Result<Option<bool>> {
    match get(document, section, key) {
        None => Ok(None),
        Some(value) => value
            .as_bool()
            .map(Some)
            .ok_or_else(|| anyhow::anyhow!("{section}.{key} must be a boolean")),
    }
}
