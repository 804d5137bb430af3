//! Job configuration: INI files with a `DEFAULT` section and extended
//! interpolation, searched for at well-known locations.

mod ini;
mod interpolate;
mod search;
mod section;
mod values;

pub use ini::DEFAULT_SECTION;
pub use search::{expand_user, search_nearby_files};
pub use section::Section;
pub use values::{parse_boolean, LogMode};

use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

use ini::RawConfig;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{origin}:{line}: {message}")]
    Syntax {
        origin: String,
        line: usize,
        message: String,
    },
    #[error("bad value for {key:?} in section {section:?}: {message}")]
    Interpolation {
        section: String,
        key: String,
        message: String,
    },
}

/// Fully interpolated configuration.
#[derive(Debug, Clone, Default)]
pub struct Config {
    defaults: BTreeMap<String, String>,
    sections: Vec<(String, BTreeMap<String, String>)>,
    paths: Vec<PathBuf>,
}

impl Config {
    /// Parse configuration text; `origin` names it in error messages.
    pub fn parse_str(origin: &str, text: &str) -> Result<Self, ConfigError> {
        Self::from_raw(ini::parse(origin, text)?, Vec::new())
    }

    /// Read every existing file of `paths` in order. Unreadable or missing
    /// files are skipped; `Ok(None)` means none could be read.
    pub fn read_files(paths: &[PathBuf]) -> Result<Option<Self>, ConfigError> {
        let mut raw = RawConfig::default();
        let mut read = Vec::new();
        for path in paths {
            let text = match fs::read_to_string(path) {
                Ok(text) => text,
                Err(err) => {
                    if err.kind() != io::ErrorKind::NotFound {
                        tracing::debug!("skipping config {}: {}", path.display(), err);
                    }
                    continue;
                }
            };
            raw.merge(ini::parse(&path.display().to_string(), &text)?);
            read.push(path.clone());
        }
        if read.is_empty() {
            return Ok(None);
        }
        Self::from_raw(raw, read).map(Some)
    }

    fn from_raw(raw: RawConfig, paths: Vec<PathBuf>) -> Result<Self, ConfigError> {
        let defaults = interpolate::resolve_section(&raw, DEFAULT_SECTION)?;
        let sections = raw
            .sections
            .iter()
            .map(|(name, _)| Ok((name.clone(), interpolate::resolve_section(&raw, name)?)))
            .collect::<Result<Vec<_>, ConfigError>>()?;
        Ok(Self {
            defaults,
            sections,
            paths,
        })
    }

    /// Section names in file order, excluding `DEFAULT`.
    pub fn sections(&self) -> impl Iterator<Item = &str> {
        self.sections.iter().map(|(name, _)| name.as_str())
    }

    pub fn has_section(&self, name: &str) -> bool {
        self.section(name).is_some()
    }

    pub fn section(&self, name: &str) -> Option<Section<'_>> {
        self.sections
            .iter()
            .find(|(n, _)| n == name)
            .map(|(n, values)| Section::new(n, values))
    }

    /// The `DEFAULT` section.
    pub fn defaults(&self) -> Section<'_> {
        Section::new(DEFAULT_SECTION, &self.defaults)
    }

    /// Files that were read, in order.
    pub fn paths(&self) -> &[PathBuf] {
        &self.paths
    }
}

/// Load configuration from `config_path` or the well-known locations.
///
/// An absolute `config_path` is the only file read; a relative one (or none)
/// is looked up with [`search_nearby_files`].
pub fn search_configs(config_path: Option<&Path>) -> Result<Option<Config>, ConfigError> {
    let candidates = match config_path {
        Some(path) if path.is_absolute() => vec![path.to_path_buf()],
        other => search_nearby_files(other),
    };
    tracing::debug!("config candidates: {:?}", candidates);
    Config::read_files(&candidates)
}
