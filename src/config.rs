use std::collections::HashMap;
use std::fs;
use std::str::FromStr;
use std::time::Duration;

use crate::{
    ice::ice_settings::IceSettings,
    media::{capture_settings::CaptureSettings, media_constraints::MediaConstraints},
    negotiation::offer_options::OfferOptions,
};

/// INI-style configuration: `[Section]` headers, `key = value` pairs, `#`
/// comments. Keys before the first header are globals.
#[derive(Debug)]
pub struct Config {
    pub globals: HashMap<String, String>,
    pub sections: HashMap<String, HashMap<String, String>>,
}

impl Config {
    /// Reads and parses the file at `path`.
    ///
    /// # Errors
    /// Returns a message naming the path when the file cannot be read.
    pub fn load(path: &str) -> Result<Self, String> {
        let content =
            fs::read_to_string(path).map_err(|e| format!("Error reading file {path}: {e}"))?;
        Ok(Self::parse(&content))
    }

    /// Parses configuration text. Lines that are neither headers nor
    /// `key = value` pairs are ignored.
    #[must_use]
    pub fn parse(content: &str) -> Self {
        let mut globals = HashMap::new();
        let mut sections: HashMap<String, HashMap<String, String>> = HashMap::new();
        let mut current_section: Option<String> = None;

        for line in content.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            if let Some(name) = line.strip_prefix('[').and_then(|l| l.strip_suffix(']')) {
                current_section = Some(name.trim().to_string());
                continue;
            }

            if let Some((key, value)) = line.split_once('=') {
                let key = key.trim().to_string();
                let value = value.trim().trim_matches('"').to_string();

                match &current_section {
                    None => {
                        globals.insert(key, value);
                    }
                    Some(sec) => {
                        sections.entry(sec.clone()).or_default().insert(key, value);
                    }
                }
            }
        }
        Config { globals, sections }
    }

    #[must_use]
    pub fn empty() -> Self {
        Self {
            globals: HashMap::new(),
            sections: HashMap::new(),
        }
    }

    #[must_use]
    pub fn get(&self, section: &str, key: &str) -> Option<&str> {
        self.sections
            .get(section)
            .and_then(|sec| sec.get(key))
            .map(|s| s.as_str())
    }

    #[must_use]
    pub fn get_non_empty(&self, section: &str, key: &str) -> Option<&str> {
        self.get(section, key).filter(|s| !s.is_empty())
    }

    #[must_use]
    pub fn get_global(&self, key: &str) -> Option<&str> {
        self.globals.get(key).map(|s| s.as_str())
    }

    #[must_use]
    pub fn get_or_default<'a>(&'a self, section: &str, key: &str, default: &'a str) -> &'a str {
        self.get(section, key)
            .or_else(|| self.get_global(key))
            .unwrap_or(default)
    }

    /// Parses `[section] key` into `T`, or returns `default` when absent or empty.
    ///
    /// # Errors
    /// Returns a message naming the section, key and offending value.
    pub fn get_parsed<T: FromStr>(&self, section: &str, key: &str, default: T) -> Result<T, String> {
        match self.get_non_empty(section, key) {
            None => Ok(default),
            Some(raw) => raw
                .parse()
                .map_err(|_| format!("Invalid value for [{section}] {key}: '{raw}'")),
        }
    }

    /// Boolean lookup accepting `true/false`, `yes/no`, `on/off` and `1/0`.
    ///
    /// # Errors
    /// Returns a message naming the section, key and offending value.
    pub fn get_bool(&self, section: &str, key: &str, default: bool) -> Result<bool, String> {
        match self.get_non_empty(section, key) {
            None => Ok(default),
            Some(raw) => match raw.to_ascii_lowercase().as_str() {
                "true" | "yes" | "on" | "1" => Ok(true),
                "false" | "no" | "off" | "0" => Ok(false),
                _ => Err(format!("Invalid boolean for [{section}] {key}: '{raw}'")),
            },
        }
    }

    /// Millisecond duration lookup.
    ///
    /// # Errors
    /// Returns a message naming the section, key and offending value.
    pub fn get_millis(&self, section: &str, key: &str, default: Duration) -> Result<Duration, String> {
        let default_ms = u64::try_from(default.as_millis()).unwrap_or(u64::MAX);
        self.get_parsed(section, key, default_ms)
            .map(Duration::from_millis)
    }
}

/// Everything the call controller needs, resolved from a [`Config`].
#[derive(Debug, Clone)]
pub struct CallConfig {
    pub constraints: MediaConstraints,
    pub capture: CaptureSettings,
    pub offer_options: OfferOptions,
    pub ice: IceSettings,
    /// How long the interactive front-end waits for `call` to settle.
    pub connect_timeout: Duration,
}

impl Default for CallConfig {
    fn default() -> Self {
        Self {
            constraints: MediaConstraints::default(),
            capture: CaptureSettings::default(),
            offer_options: OfferOptions::default(),
            ice: IceSettings::default(),
            connect_timeout: Self::DEFAULT_CONNECT_TIMEOUT,
        }
    }
}

impl CallConfig {
    const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

    /// Resolves every section, falling back to defaults for missing keys.
    ///
    /// # Errors
    /// Returns the first invalid value found.
    pub fn from_config(config: &Config) -> Result<Self, String> {
        Ok(Self {
            constraints: MediaConstraints::from_config(config)?,
            capture: CaptureSettings::from_config(config)?,
            offer_options: OfferOptions::from_config(config)?,
            ice: IceSettings::from_config(config)?,
            connect_timeout: config.get_millis(
                "Call",
                "connect_timeout_ms",
                Self::DEFAULT_CONNECT_TIMEOUT,
            )?,
        })
    }
}
