use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Main error type for wallpapers operations
#[derive(Error, Debug)]
pub enum WallpapersError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Image source error: {0}")]
    Source(#[from] SourceError),

    #[error("Vocabulary error: {0}")]
    Vocab(#[from] VocabError),

    #[error("Intent error: {0}")]
    Intent(#[from] IntentError),

    #[error("Desktop integration error: {0}")]
    Desktop(#[from] DesktopError),

    #[error("Image cache error: {0}")]
    Cache(#[from] CacheError),

    #[error("IPC error: {0}")]
    Ipc(#[from] IpcError),
}

/// Configuration-related errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read configuration file: {path:?}")]
    FileRead { path: PathBuf, source: std::io::Error },

    #[error("Failed to parse TOML configuration: {message}")]
    TomlParse { message: String },

    #[error("Invalid configuration value for {field}: {value}")]
    InvalidValue { field: String, value: String },

    #[error("Could not determine config directory")]
    NoConfigDir,
}

/// Upstream image source errors. Every variant is recoverable by moving on
/// to the next candidate source, except `Exhausted`.
#[derive(Error, Debug)]
pub enum SourceError {
    #[error("{source_name} is unavailable: {message}")]
    UpstreamUnavailable { source_name: String, message: String },

    #[error("{source_name} returned no images")]
    EmptyResult { source_name: String },

    #[error("No image source produced any pictures")]
    Exhausted,
}

/// Fuzzy-match vocabulary errors
#[derive(Error, Debug)]
pub enum VocabError {
    #[error("Could not find {name}.voc file in {dir:?}")]
    ResourceMissing { name: String, dir: PathBuf },

    #[error("Failed to read vocabulary file: {path:?}")]
    FileRead { path: PathBuf, source: std::io::Error },
}

/// Intent dispatch errors
#[derive(Error, Debug)]
pub enum IntentError {
    #[error("Intent requires the {context} context")]
    ContextMissing { context: String },

    #[error("No picture is currently selected")]
    NoCurrentPicture,
}

/// Desktop wallpaper errors
#[derive(Error, Debug)]
pub enum DesktopError {
    #[error("Unknown desktop environment: {name}")]
    UnknownEnvironment { name: String },

    #[error("Could not detect the desktop environment")]
    DetectionFailed,

    #[error("Wallpaper command not found: {binary}")]
    BinaryNotFound { binary: String },

    #[error("Command execution failed: {command:?}")]
    Execution { command: String, source: std::io::Error },

    #[error("Command returned non-zero exit code: {code}")]
    NonZeroExit { code: i32, stderr: String },
}

/// On-disk image cache errors
#[derive(Error, Debug)]
pub enum CacheError {
    #[error("Could not determine cache directory")]
    NoCacheDir,

    #[error("Failed to download image: {url}")]
    Download { url: String, message: String },

    #[error("Failed to write cached image: {path:?}")]
    FileWrite { path: PathBuf, source: std::io::Error },
}

/// IPC communication errors
#[derive(Error, Debug)]
pub enum IpcError {
    #[error("Invalid IPC message format")]
    InvalidMessage,

    #[error("Daemon not responding")]
    DaemonUnresponsive,
}

// Convenience type alias
pub type Result<T> = std::result::Result<T, WallpapersError>;

// Error conversion implementations
impl From<serde_json::Error> for WallpapersError {
    fn from(_err: serde_json::Error) -> Self {
        WallpapersError::Ipc(IpcError::InvalidMessage)
    }
}

impl From<toml::de::Error> for WallpapersError {
    fn from(err: toml::de::Error) -> Self {
        WallpapersError::Config(ConfigError::TomlParse {
            message: err.to_string(),
        })
    }
}

impl From<reqwest::Error> for WallpapersError {
    fn from(err: reqwest::Error) -> Self {
        WallpapersError::Cache(CacheError::Download {
            url: err.url().map(|u| u.to_string()).unwrap_or_default(),
            message: err.to_string(),
        })
    }
}

impl SourceError {
    pub fn unavailable(source_name: impl Into<String>, err: impl fmt::Display) -> Self {
        SourceError::UpstreamUnavailable {
            source_name: source_name.into(),
            message: err.to_string(),
        }
    }

    pub fn empty(source_name: impl Into<String>) -> Self {
        SourceError::EmptyResult {
            source_name: source_name.into(),
        }
    }
}

// Error reporting utilities
pub trait ErrorReporting {
    fn log_error(&self, context: &str);
    fn user_friendly_message(&self) -> String;
}

impl ErrorReporting for WallpapersError {
    fn log_error(&self, context: &str) {
        log::error!("{}: {:?}", context, self);
    }

    fn user_friendly_message(&self) -> String {
        match self {
            WallpapersError::Config(ConfigError::FileRead { path, .. }) => {
                format!("Configuration file could not be read: {:?}", path)
            }
            WallpapersError::Config(ConfigError::TomlParse { message }) => {
                format!("Invalid configuration format: {}", message)
            }
            WallpapersError::Source(SourceError::Exhausted) => {
                "No wallpapers could be fetched. Check your network connection.".to_string()
            }
            WallpapersError::Vocab(VocabError::ResourceMissing { name, dir }) => {
                format!("Vocabulary for {} is missing from {:?}; the installation is incomplete", name, dir)
            }
            WallpapersError::Intent(IntentError::ContextMissing { .. }) => {
                "There is no slideshow running. Ask for a picture first.".to_string()
            }
            WallpapersError::Desktop(DesktopError::DetectionFailed) => {
                "Could not detect your desktop. Set desktop_env in the configuration.".to_string()
            }
            WallpapersError::Ipc(IpcError::DaemonUnresponsive) => {
                "wallpapers daemon is not responding. Please restart the daemon.".to_string()
            }
            _ => self.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    #[test]
    fn test_config_error_user_friendly_message() {
        let error = ConfigError::FileRead {
            path: PathBuf::from("/nonexistent/config.toml"),
            source: io::Error::new(io::ErrorKind::PermissionDenied, "Permission denied"),
        };
        let err = WallpapersError::Config(error);

        let message = err.user_friendly_message();
        assert!(message.contains("could not be read"));
        assert!(message.contains("/nonexistent/config.toml"));
    }

    #[test]
    fn test_vocab_missing_message_names_the_channel() {
        let err = WallpapersError::Vocab(VocabError::ResourceMissing {
            name: "EarthPorn".to_string(),
            dir: PathBuf::from("/usr/share/wallpapers/vocab/en-us"),
        });

        let message = err.user_friendly_message();
        assert!(message.contains("EarthPorn"));
        assert!(message.contains("incomplete"));
    }

    #[test]
    fn test_source_error_display() {
        let err = SourceError::unavailable("channel EarthPorn", "connection refused");
        assert_eq!(
            err.to_string(),
            "channel EarthPorn is unavailable: connection refused"
        );
        assert_eq!(
            SourceError::empty("catalog").to_string(),
            "catalog returned no images"
        );
    }

    #[test]
    fn test_process_error_falls_back_to_display() {
        let err = WallpapersError::Desktop(DesktopError::NonZeroExit {
            code: 1,
            stderr: "No such schema".to_string(),
        });

        let message = err.user_friendly_message();
        assert!(message.contains("non-zero exit code"));
        assert!(message.contains("1"));
    }

    #[test]
    fn test_error_conversion() {
        let toml_err = toml::from_str::<toml::Value>("= broken").unwrap_err();
        let err: WallpapersError = toml_err.into();

        match err {
            WallpapersError::Config(ConfigError::TomlParse { .. }) => {}
            _ => panic!("Expected ConfigError::TomlParse"),
        }
    }
}
