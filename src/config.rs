//! Runtime configuration from environment variables.
//!
//! | Variable | Default |
//! |---|---|
//! | `TAVI_LOS_LOG_MODE` | `auto` (`file` when interactive, else `stderr`) |
//! | `TAVI_LOS_LOG_FILE` | `tavi-los.log` |
//! | `TAVI_LOS_MODEL` | `pre-procedure` |
//! | `TAVI_LOS_INCLUDE_PROCEDURAL` | `false` |
//! | `TAVI_LOS_ACCESS_HASH` | unset (gate disabled) |
//! | `TAVI_LOS_ACCESS_HASH_FILE` | unset |
//! | `TAVI_LOS_SESSION_TTL_SECS` | `1800` |

use std::path::PathBuf;
use std::time::Duration;

use crate::application::DEFAULT_SESSION_TTL;
use crate::domain::RiskModel;
use crate::TaviLosError;

/// Where log output goes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogMode {
    /// File when attached to a terminal, stderr otherwise
    Auto,
    File,
    Stderr,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub log_mode: LogMode,
    pub log_file: PathBuf,
    pub model: RiskModel,
    /// Start new assessments with the procedural block enabled
    pub include_procedural: bool,
    /// Argon2 PHC hash of the unlock passphrase
    pub access_hash: Option<String>,
    pub session_ttl: Duration,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            log_mode: LogMode::Auto,
            log_file: PathBuf::from("tavi-los.log"),
            model: RiskModel::PreProcedure,
            include_procedural: false,
            access_hash: None,
            session_ttl: DEFAULT_SESSION_TTL,
        }
    }
}

impl AppConfig {
    /// Read configuration from the process environment.
    ///
    /// # Errors
    /// Returns error if a variable is set to an unparseable value or the hash
    /// file cannot be read.
    pub fn from_env() -> Result<Self, TaviLosError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary key lookup.
    ///
    /// # Errors
    /// See [`AppConfig::from_env`].
    pub fn from_lookup<F>(lookup: F) -> Result<Self, TaviLosError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let log_mode = match get("TAVI_LOS_LOG_MODE").as_deref() {
            None | Some("auto") => LogMode::Auto,
            Some("file") => LogMode::File,
            Some("stderr") | Some("stdout") => LogMode::Stderr,
            Some(other) => {
                return Err(TaviLosError::Config(format!(
                    "TAVI_LOS_LOG_MODE must be auto, file or stderr, got '{other}'"
                )))
            }
        };

        let log_file = get("TAVI_LOS_LOG_FILE")
            .map(PathBuf::from)
            .unwrap_or(defaults.log_file);

        let model = match get("TAVI_LOS_MODEL") {
            Some(v) => v.parse::<RiskModel>().map_err(TaviLosError::Config)?,
            None => defaults.model,
        };

        let include_procedural = get("TAVI_LOS_INCLUDE_PROCEDURAL")
            .map(|v| matches!(v.as_str(), "1" | "true" | "TRUE" | "yes" | "YES"))
            .unwrap_or(defaults.include_procedural);

        let access_hash = match (get("TAVI_LOS_ACCESS_HASH"), get("TAVI_LOS_ACCESS_HASH_FILE")) {
            (Some(hash), _) => Some(hash),
            (None, Some(path)) => {
                let contents = std::fs::read_to_string(&path).map_err(|e| {
                    TaviLosError::Config(format!("Cannot read TAVI_LOS_ACCESS_HASH_FILE {path:?}: {e}"))
                })?;
                Some(contents.trim().to_string()).filter(|h| !h.is_empty())
            }
            (None, None) => None,
        };

        let session_ttl = match get("TAVI_LOS_SESSION_TTL_SECS") {
            Some(v) => {
                let secs = v.parse::<u64>().map_err(|_| {
                    TaviLosError::Config(format!("TAVI_LOS_SESSION_TTL_SECS must be an integer, got '{v}'"))
                })?;
                if secs == 0 {
                    return Err(TaviLosError::Config(
                        "TAVI_LOS_SESSION_TTL_SECS must be greater than zero".to_string(),
                    ));
                }
                Duration::from_secs(secs)
            }
            None => defaults.session_ttl,
        };

        Ok(Self {
            log_mode,
            log_file,
            model,
            include_procedural,
            access_hash,
            session_ttl,
        })
    }
}
