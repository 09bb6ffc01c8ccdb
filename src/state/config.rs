//! Configuration management

use crate::speech::BackendKind;
use crate::{Result, VoicecraftError};
use ini::Ini;
use log::{debug, info, warn};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Service configuration
///
/// Backed by an INI file (~/.voicecraft.cfg by default) holding the listen
/// address, text limits, engine choice and cleanup schedule.
pub struct Config {
    /// INI configuration storage
    ini: Ini,

    /// Config file path
    path: PathBuf,
}

impl Config {
    /// Load configuration from the default location, creating it if missing
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path())
    }

    /// Load configuration from `path`, creating a default file if missing
    pub fn load_from(path: &Path) -> Result<Self> {
        debug!("Loading config from {:?}", path);

        let ini = if path.exists() {
            Ini::load_from_file(path)
                .map_err(|e| VoicecraftError::IniParse(format!("Failed to load config: {}", e)))?
        } else {
            info!("Config file not found, creating default at {:?}", path);
            let default = Self::default_config();
            default
                .write_to_file(path)
                .map_err(|e| VoicecraftError::IniParse(format!("Failed to write config: {}", e)))?;
            default
        };

        let config = Self {
            ini,
            path: path.to_path_buf(),
        };
        config.validate()?;
        Ok(config)
    }

    /// In-memory defaults, not tied to any file
    pub fn defaults() -> Self {
        Self {
            ini: Self::default_config(),
            path: PathBuf::new(),
        }
    }

    /// Default config file path (~/.voicecraft.cfg)
    fn config_path() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".voicecraft.cfg")
    }

    /// Expose the config file path for display
    pub fn path(&self) -> &PathBuf {
        &self.path
    }

    /// Create default configuration
    fn default_config() -> Ini {
        let mut ini = Ini::new();

        ini.with_section(Some("server"))
            .set("host", "0.0.0.0")
            .set("port", "5000")
            .set("max_text_length", "1000");

        ini.with_section(Some("synthesis"))
            .set("backend", "auto")
            .set("espeak_path", "")
            .set("artifact_dir", "");

        ini.with_section(Some("cleanup"))
            .set("interval_secs", "300");

        ini
    }

    /// Reject values the service cannot start with
    fn validate(&self) -> Result<()> {
        self.backend()?;
        Ok(())
    }

    /// Get a string value from config
    pub fn get_string(&self, section: &str, key: &str, default: &str) -> String {
        self.ini
            .get_from(Some(section), key)
            .unwrap_or(default)
            .to_string()
    }

    /// Get an integer value from config
    pub fn get_int(&self, section: &str, key: &str, default: i64) -> i64 {
        match self.ini.get_from(Some(section), key) {
            Some(v) => v.trim().parse().unwrap_or_else(|_| {
                warn!("Invalid integer for [{}] {} = {:?}, using {}", section, key, v, default);
                default
            }),
            None => default,
        }
    }

    /// Set a value in config
    pub fn set(&mut self, section: &str, key: &str, value: &str) {
        self.ini.with_section(Some(section)).set(key, value);
    }

    // Service-specific configuration getters

    /// Address the HTTP server binds to
    pub fn host(&self) -> String {
        self.get_string("server", "host", "0.0.0.0")
    }

    /// Port the HTTP server listens on
    pub fn port(&self) -> u16 {
        self.get_int("server", "port", 5000)
            .try_into()
            .unwrap_or(5000)
    }

    /// Longest accepted request text, in characters
    pub fn max_text_length(&self) -> usize {
        self.get_int("server", "max_text_length", 1000)
            .try_into()
            .ok()
            .filter(|&n: &usize| n > 0)
            .unwrap_or(1000)
    }

    /// Which speech engine to use
    pub fn backend(&self) -> Result<BackendKind> {
        self.get_string("synthesis", "backend", "auto").parse()
    }

    /// Explicit espeak-ng executable, if configured
    pub fn espeak_path(&self) -> Option<String> {
        Some(self.get_string("synthesis", "espeak_path", ""))
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
    }

    /// Directory generated WAV files are written to
    pub fn artifact_dir(&self) -> PathBuf {
        let configured = self.get_string("synthesis", "artifact_dir", "");
        let configured = configured.trim();
        if configured.is_empty() {
            std::env::temp_dir().join(crate::APP_NAME)
        } else {
            PathBuf::from(configured)
        }
    }

    /// Time between periodic sweeps
    pub fn cleanup_interval(&self) -> Duration {
        let secs = self.get_int("cleanup", "interval_secs", 300);
        Duration::from_secs(u64::try_from(secs).ok().filter(|&s| s > 0).unwrap_or(300))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::defaults();
        assert_eq!(config.host(), "0.0.0.0");
        assert_eq!(config.port(), 5000);
        assert_eq!(config.max_text_length(), 1000);
        assert_eq!(config.backend().unwrap(), BackendKind::Auto);
        assert_eq!(config.espeak_path(), None);
        assert_eq!(config.cleanup_interval(), Duration::from_secs(300));
        assert!(config.artifact_dir().ends_with("voicecraft"));
    }

    #[test]
    fn test_invalid_values_fall_back() {
        let mut config = Config::defaults();
        config.set("server", "port", "seventy");
        config.set("server", "max_text_length", "0");
        config.set("cleanup", "interval_secs", "-5");
        assert_eq!(config.port(), 5000);
        assert_eq!(config.max_text_length(), 1000);
        assert_eq!(config.cleanup_interval(), Duration::from_secs(300));
    }

    #[test]
    fn test_overrides() {
        let mut config = Config::defaults();
        config.set("synthesis", "backend", "espeak");
        config.set("synthesis", "espeak_path", " /opt/espeak-ng/bin/espeak-ng ");
        config.set("synthesis", "artifact_dir", "/var/tmp/speech");
        assert_eq!(config.backend().unwrap(), BackendKind::Espeak);
        assert_eq!(
            config.espeak_path().as_deref(),
            Some("/opt/espeak-ng/bin/espeak-ng")
        );
        assert_eq!(config.artifact_dir(), PathBuf::from("/var/tmp/speech"));
    }
}
