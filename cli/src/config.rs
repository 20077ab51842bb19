//! `config.toml` loading for the `docedit` binary.

use docedit_utils_home_dir::HomeDirError;
use docedit_utils_home_dir::find_config_file;
use serde::Deserialize;
use std::path::Path;
use std::path::PathBuf;
use thiserror::Error;

pub const DEFAULT_LOG_LEVEL: &str = "error";
pub const DEFAULT_MAX_ERROR_PREVIEW_BYTES: usize = 2048;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Fallback tracing filter when `RUST_LOG` is unset.
    pub log_level: String,
    pub output: OutputConfig,
    pub apply: ApplyConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            log_level: DEFAULT_LOG_LEVEL.to_string(),
            output: OutputConfig::default(),
            apply: ApplyConfig::default(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct OutputConfig {
    pub format: OutputFormat,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Human,
    Json,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ApplyConfig {
    /// Exit non-zero when directives were given and none matched.
    pub fail_on_no_match: bool,
    /// Bytes of an invalid edited document echoed in the error message.
    pub max_error_preview_bytes: usize,
}

impl Default for ApplyConfig {
    fn default() -> Self {
        Self {
            fail_on_no_match: false,
            max_error_preview_bytes: DEFAULT_MAX_ERROR_PREVIEW_BYTES,
        }
    }
}

/// 1-based position in a config file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextPosition {
    pub line: usize,
    pub column: usize,
}

#[derive(Debug, Error)]
pub enum ConfigLoadError {
    #[error("failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{}:{}:{}: {message}", path.display(), position.line, position.column)]
    Parse {
        path: PathBuf,
        position: TextPosition,
        message: String,
        #[source]
        source: toml::de::Error,
    },

    #[error(transparent)]
    Home(#[from] HomeDirError),
}

/// Load `explicit`, or the home config when present, or defaults.
pub fn load_config(explicit: Option<&Path>) -> Result<Config, ConfigLoadError> {
    let path = match explicit {
        Some(path) => Some(path.to_path_buf()),
        None => match find_config_file() {
            Ok(path) => path,
            Err(HomeDirError::NoHomeDir) => None,
            Err(err) => return Err(err.into()),
        },
    };
    let Some(path) = path else {
        return Ok(Config::default());
    };

    let contents = std::fs::read_to_string(&path).map_err(|source| ConfigLoadError::Read {
        path: path.clone(),
        source,
    })?;
    parse_config(&path, &contents)
}

pub fn parse_config(path: &Path, contents: &str) -> Result<Config, ConfigLoadError> {
    toml::from_str(contents).map_err(|source: toml::de::Error| {
        let offset = source.span().map_or(0, |span| span.start);
        ConfigLoadError::Parse {
            path: path.to_path_buf(),
            position: position_of(contents, offset),
            message: source.message().to_string(),
            source,
        }
    })
}

fn position_of(contents: &str, offset: usize) -> TextPosition {
    let before = &contents[..offset.min(contents.len())];
    let line = before.matches('\n').count() + 1;
    let line_start = before.rfind('\n').map_or(0, |idx| idx + 1);
    TextPosition {
        line,
        column: before[line_start..].chars().count() + 1,
    }
}
