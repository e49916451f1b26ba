//! INI-backed sweep configuration.
//!
//! Section and key lookups are case-insensitive; `configparser` lowercases
//! both on load and on query.

use std::path::Path;

use configparser::ini::Ini;

use crate::domain::error::SweepError;
use crate::ports::config_port::ConfigPort;

pub struct FileConfigAdapter {
    ini: Ini,
}

impl FileConfigAdapter {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, SweepError> {
        let path = path.as_ref();
        let mut ini = Ini::new();
        ini.load(path).map_err(|reason| SweepError::ConfigParse {
            file: path.display().to_string(),
            reason,
        })?;
        tracing::debug!(path = %path.display(), sections = ini.sections().len(), "config loaded");
        Ok(Self { ini })
    }

    pub fn from_string(content: &str) -> Result<Self, SweepError> {
        let mut ini = Ini::new();
        ini.read(content.to_string())
            .map_err(|reason| SweepError::ConfigParse {
                file: "<inline>".to_string(),
                reason,
            })?;
        Ok(Self { ini })
    }
}

/// `true`/`yes`/`on`/`1` and their negations; anything else is unset.
fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_lowercase().as_str() {
        "true" | "yes" | "on" | "1" => Some(true),
        "false" | "no" | "off" | "0" => Some(false),
        _ => None,
    }
}

impl ConfigPort for FileConfigAdapter {
    fn get_string(&self, section: &str, key: &str) -> Option<String> {
        self.ini.get(section, key)
    }

    fn get_int(&self, section: &str, key: &str, default: i64) -> i64 {
        self.get_string(section, key)
            .and_then(|raw| raw.trim().parse::<i64>().ok())
            .unwrap_or(default)
    }

    fn get_double(&self, section: &str, key: &str, default: f64) -> f64 {
        self.get_string(section, key)
            .and_then(|raw| raw.trim().parse::<f64>().ok())
            .filter(|v| v.is_finite())
            .unwrap_or(default)
    }

    fn get_bool(&self, section: &str, key: &str, default: bool) -> bool {
        self.get_string(section, key)
            .and_then(|raw| parse_flag(&raw))
            .unwrap_or(default)
    }

    fn sections(&self) -> Vec<String> {
        self.ini.sections()
    }
}
