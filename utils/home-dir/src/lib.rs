use dirs::home_dir;
use std::path::Path;
use std::path::PathBuf;
use thiserror::Error;

/// Environment variable that overrides the docedit home directory.
pub const DOCEDIT_HOME_ENV: &str = "DOCEDIT_HOME";

/// Name of the config file inside the docedit home.
pub const CONFIG_FILE_NAME: &str = "config.toml";

#[derive(Debug, Error)]
pub enum HomeDirError {
    #[error("DOCEDIT_HOME points to {path:?}, but that path does not exist")]
    Missing { path: PathBuf },

    #[error("DOCEDIT_HOME points to {path:?}, but that path is not a directory")]
    NotADirectory { path: PathBuf },

    #[error("failed to read DOCEDIT_HOME {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("could not find home directory")]
    NoHomeDir,
}

/// Returns the docedit home directory: `$DOCEDIT_HOME` when set, else
/// `~/.docedit`.
///
/// - If `DOCEDIT_HOME` is set, it must be an existing directory; the value is
///   canonicalized.
/// - Otherwise the default is returned without checking that it exists.
pub fn find_docedit_home() -> Result<PathBuf, HomeDirError> {
    let env_value = std::env::var(DOCEDIT_HOME_ENV)
        .ok()
        .filter(|val| !val.is_empty());
    find_docedit_home_from_env(env_value.as_deref())
}

/// Config file inside the docedit home, if it exists.
pub fn find_config_file() -> Result<Option<PathBuf>, HomeDirError> {
    let path = find_docedit_home()?.join(CONFIG_FILE_NAME);
    Ok(path.is_file().then_some(path))
}

fn find_docedit_home_from_env(env_value: Option<&str>) -> Result<PathBuf, HomeDirError> {
    let Some(val) = env_value else {
        let mut home = home_dir().ok_or(HomeDirError::NoHomeDir)?;
        home.push(".docedit");
        return Ok(home);
    };

    let path = PathBuf::from(val);
    let metadata = std::fs::metadata(&path).map_err(|source| io_error(&path, source))?;
    if !metadata.is_dir() {
        return Err(HomeDirError::NotADirectory { path });
    }
    path.canonicalize().map_err(|source| io_error(&path, source))
}

fn io_error(path: &Path, source: std::io::Error) -> HomeDirError {
    match source.kind() {
        std::io::ErrorKind::NotFound => HomeDirError::Missing {
            path: path.to_path_buf(),
        },
        _ => HomeDirError::Io {
            path: path.to_path_buf(),
            source,
        },
    }
}
