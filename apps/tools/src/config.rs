use std::{collections::HashMap, fs, path::Path, str::FromStr};

use clap::ValueEnum;

pub const SETTINGS_FILE: &str = "calendar.toml";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "text" => Ok(Self::Text),
            "json" => Ok(Self::Json),
            other => Err(format!("unknown output format '{other}'")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub log_filter: String,
    pub format: OutputFormat,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            log_filter: "info".into(),
            format: OutputFormat::Text,
        }
    }
}

pub fn load_settings() -> Settings {
    let settings = load_settings_from(Path::new(SETTINGS_FILE));
    apply_env_overrides(settings, |key| std::env::var(key).ok())
}

/// Reads the settings file; a missing or malformed file yields the defaults.
pub fn load_settings_from(path: &Path) -> Settings {
    let mut settings = Settings::default();

    if let Ok(raw) = fs::read_to_string(path) {
        if let Ok(file_cfg) = toml::from_str::<HashMap<String, String>>(&raw) {
            if let Some(v) = file_cfg.get("log_filter") {
                settings.log_filter = v.clone();
            }
            if let Some(Ok(format)) = file_cfg.get("format").map(|v| v.parse::<OutputFormat>()) {
                settings.format = format;
            }
        }
    }

    settings
}

pub fn apply_env_overrides(
    mut settings: Settings,
    lookup: impl Fn(&str) -> Option<String>,
) -> Settings {
    if let Some(v) = lookup("CALENDAR_LOG") {
        settings.log_filter = v;
    }
    if let Some(v) = lookup("APP__LOG_FILTER") {
        settings.log_filter = v;
    }

    if let Some(Ok(format)) = lookup("APP__FORMAT").map(|v| v.parse::<OutputFormat>()) {
        settings.format = format;
    }

    settings
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_keeps_defaults() {
        let dir = tempfile::tempdir().expect("tempdir");
        let settings = load_settings_from(&dir.path().join(SETTINGS_FILE));
        assert_eq!(settings, Settings::default());
    }

    #[test]
    fn reads_values_from_settings_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join(SETTINGS_FILE);
        fs::write(&path, "log_filter = \"calendar_api=debug\"\nformat = \"json\"\n")
            .expect("write settings");

        let settings = load_settings_from(&path);
        assert_eq!(settings.log_filter, "calendar_api=debug");
        assert_eq!(settings.format, OutputFormat::Json);
    }

    #[test]
    fn unknown_format_in_file_is_ignored() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join(SETTINGS_FILE);
        fs::write(&path, "format = \"yaml\"\n").expect("write settings");

        assert_eq!(load_settings_from(&path).format, OutputFormat::Text);
    }

    #[test]
    fn app_prefixed_env_wins_over_short_name() {
        let env = HashMap::from([
            ("CALENDAR_LOG", "warn"),
            ("APP__LOG_FILTER", "debug"),
            ("APP__FORMAT", "JSON"),
        ]);
        let settings = apply_env_overrides(Settings::default(), |key| {
            env.get(key).map(|v| v.to_string())
        });
        assert_eq!(settings.log_filter, "debug");
        assert_eq!(settings.format, OutputFormat::Json);
    }
}
