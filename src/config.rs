use serde::Deserialize;
use std::path::Path;

/// Default values mirror the constants fixed by the external interface: a
/// 4096-task cap, 1023-character output lines, 511-character command lines.
const DEFAULT_MAX_TASKS: usize = 4096;
const DEFAULT_MAX_LINE_LEN: usize = 1023;
const DEFAULT_MAX_COMMAND_LEN: usize = 511;

/// Top-level configuration for task-exec.
///
/// Loaded from `$XDG_CONFIG_HOME/task-exec/config.toml`.
/// All fields are optional — missing values use defaults.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub limits: LimitsConfig,
    pub logging: LoggingSettings,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LimitsConfig {
    /// Maximum number of tasks that may be created in one session.
    pub max_tasks: usize,
    /// Maximum length, in characters, of a captured output line.
    pub max_line_len: usize,
    /// Maximum length, in characters, of a command line read from stdin.
    pub max_command_len: usize,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    /// Maximum log file size in megabytes before rotation.
    pub max_file_size_mb: u64,
    /// Number of archived log files to keep.
    pub max_archives: u32,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            limits: LimitsConfig::default(),
            logging: LoggingSettings::default(),
        }
    }
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_tasks: DEFAULT_MAX_TASKS,
            max_line_len: DEFAULT_MAX_LINE_LEN,
            max_command_len: DEFAULT_MAX_COMMAND_LEN,
        }
    }
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            max_file_size_mb: 10,
            max_archives: 5,
        }
    }
}

impl AppConfig {
    /// Load config from a TOML file. Returns defaults if the file doesn't exist.
    /// Logs a warning and returns defaults if the file exists but is malformed.
    pub fn load(path: &Path) -> Self {
        if !path.exists() {
            return Self::default();
        }

        match std::fs::read_to_string(path) {
            Ok(contents) => match toml::from_str(&contents) {
                Ok(config) => config,
                Err(e) => {
                    log::warn!("Failed to parse config at {}: {}", path.display(), e);
                    Self::default()
                }
            },
            Err(e) => {
                log::warn!("Failed to read config at {}: {}", path.display(), e);
                Self::default()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = AppConfig::default();
        assert_eq!(config.limits.max_tasks, 4096);
        assert_eq!(config.limits.max_line_len, 1023);
        assert_eq!(config.limits.max_command_len, 511);
        assert_eq!(config.logging.max_file_size_mb, 10);
        assert_eq!(config.logging.max_archives, 5);
    }

    #[test]
    fn test_partial_toml() {
        let toml = r#"
[limits]
max_tasks = 8
"#;
        let config: AppConfig = toml::from_str(toml).unwrap();
        assert_eq!(config.limits.max_tasks, 8);
        assert_eq!(config.limits.max_line_len, 1023);
        assert_eq!(config.logging.max_file_size_mb, 10);
    }

    #[test]
    fn test_full_toml() {
        let toml = r#"
[limits]
max_tasks = 16
max_line_len = 256
max_command_len = 128

[logging]
max_file_size_mb = 50
max_archives = 10
"#;
        let config: AppConfig = toml::from_str(toml).unwrap();
        assert_eq!(config.limits.max_tasks, 16);
        assert_eq!(config.limits.max_line_len, 256);
        assert_eq!(config.limits.max_command_len, 128);
        assert_eq!(config.logging.max_file_size_mb, 50);
        assert_eq!(config.logging.max_archives, 10);
    }

    #[test]
    fn test_missing_file_returns_defaults() {
        let config = AppConfig::load(Path::new("/nonexistent/path/config.toml"));
        assert_eq!(config.limits.max_tasks, 4096);
    }

    #[test]
    fn test_malformed_file_returns_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "not valid = [ toml").unwrap();
        let config = AppConfig::load(&path);
        assert_eq!(config.limits.max_tasks, 4096);
    }
}
