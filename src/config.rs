use std::time::Duration;

use config::{Config, File};
use idmap::IdMap;
use log::error;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config_io;
use crate::overlays::toast::{ToastDisplayMethod, ToastTopic};

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to build settings: {0}")]
    Build(#[source] config::ConfigError),
    #[error("failed to deserialize settings: {0}")]
    Deserialize(#[source] config::ConfigError),
    #[error("no usable {0} found")]
    NoUsableYaml(String),
}

const fn def_notification_interval_ms() -> u64 {
    15_000
}

const fn def_monitoring_interval_ms() -> u64 {
    5_000
}

const fn def_poll_interval_ms() -> u64 {
    50 // 20hz
}

const fn def_true() -> bool {
    true
}

/// Longest a single toast may stay on screen.
const MAX_TOAST_TIMEOUT_SECS: f32 = 3600.0;

const fn def_toast_timeout_secs() -> f32 {
    4.0
}

fn def_toast_topics() -> IdMap<ToastTopic, ToastDisplayMethod> {
    IdMap::new()
}

#[derive(Deserialize, Serialize)]
pub struct GeneralConfig {
    #[serde(default = "def_notification_interval_ms")]
    pub notification_interval_ms: u64,

    #[serde(default = "def_monitoring_interval_ms")]
    pub monitoring_interval_ms: u64,

    #[serde(default = "def_poll_interval_ms")]
    pub poll_interval_ms: u64,

    #[serde(default = "def_true")]
    pub notifications_enabled: bool,

    #[serde(default = "def_toast_timeout_secs")]
    pub toast_timeout_secs: f32,

    #[serde(default = "def_toast_topics")]
    pub notification_topics: IdMap<ToastTopic, ToastDisplayMethod>,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            notification_interval_ms: def_notification_interval_ms(),
            monitoring_interval_ms: def_monitoring_interval_ms(),
            poll_interval_ms: def_poll_interval_ms(),
            notifications_enabled: def_true(),
            toast_timeout_secs: def_toast_timeout_secs(),
            notification_topics: def_toast_topics(),
        }
    }
}

impl GeneralConfig {
    fn sanitize_interval(name: &str, val: &mut u64, default: u64) {
        if *val == 0 {
            log::warn!("GeneralConfig: {name} must be greater than 0, using {default}");
            *val = default;
        }
    }

    pub fn post_load(&mut self) {
        Self::sanitize_interval(
            "notification_interval_ms",
            &mut self.notification_interval_ms,
            def_notification_interval_ms(),
        );
        Self::sanitize_interval(
            "monitoring_interval_ms",
            &mut self.monitoring_interval_ms,
            def_monitoring_interval_ms(),
        );
        Self::sanitize_interval(
            "poll_interval_ms",
            &mut self.poll_interval_ms,
            def_poll_interval_ms(),
        );

        if !self.toast_timeout_secs.is_normal()
            || !(0.0..=MAX_TOAST_TIMEOUT_SECS).contains(&self.toast_timeout_secs)
        {
            log::warn!(
                "GeneralConfig: toast_timeout_secs is invalid ({}), using {}",
                self.toast_timeout_secs,
                def_toast_timeout_secs()
            );
            self.toast_timeout_secs = def_toast_timeout_secs();
        }
    }

    pub const fn notification_interval(&self) -> Duration {
        Duration::from_millis(self.notification_interval_ms)
    }

    pub const fn monitoring_interval(&self) -> Duration {
        Duration::from_millis(self.monitoring_interval_ms)
    }

    pub const fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn toast_timeout(&self) -> Duration {
        Duration::try_from_secs_f32(self.toast_timeout_secs.min(MAX_TOAST_TIMEOUT_SECS))
            .unwrap_or_else(|_| Duration::from_secs_f32(def_toast_timeout_secs()))
    }
}

/// Parses a user override from the config root, falling back to the embedded
/// copy when the override is missing or broken.
pub fn load_known_yaml<T>(file_name: &str, fallback: &str) -> Result<T, ConfigError>
where
    T: for<'de> Deserialize<'de>,
{
    let maybe_override = config_io::load(file_name);

    for yaml in [maybe_override.as_deref(), Some(fallback)].iter().flatten() {
        match serde_yaml::from_str::<T>(yaml) {
            Ok(d) => return Ok(d),
            Err(e) => {
                error!("Failed to parse {file_name}, falling back to defaults.");
                error!("{e}");
            }
        }
    }
    // can only get here if the embedded fallback is broken
    Err(ConfigError::NoUsableYaml(file_name.to_string()))
}

pub fn load_config_with_conf_d<ConfigData>(
    root_config_filename: &str,
) -> Result<ConfigData, ConfigError>
where
    ConfigData: for<'de> Deserialize<'de>,
{
    let mut settings_builder = Config::builder();

    let path_conf_d = config_io::get_conf_d_path();

    let mut base_conf = config_io::get_config_root();
    base_conf.push(root_config_filename);
    if base_conf.exists() {
        log::info!("Loading config file: {}", base_conf.to_string_lossy());
        settings_builder = settings_builder.add_source(File::from(base_conf));
    }

    if let Ok(paths_unsorted) = std::fs::read_dir(path_conf_d) {
        let mut paths: Vec<_> = paths_unsorted
            .filter_map(|r| match r {
                Ok(entry) => Some(entry),
                Err(e) => {
                    error!("Failed to read conf.d directory: {e}");
                    None
                }
            })
            .collect();
        // Sort paths alphabetically
        paths.sort_by_key(std::fs::DirEntry::path);
        for path in paths {
            log::info!("Loading config file: {}", path.path().to_string_lossy());
            settings_builder = settings_builder.add_source(File::from(path.path()));
        }
    }

    let settings = settings_builder.build().map_err(ConfigError::Build)?;
    settings
        .try_deserialize::<ConfigData>()
        .map_err(ConfigError::Deserialize)
}

pub fn load_general() -> Result<GeneralConfig, ConfigError> {
    let mut config = load_config_with_conf_d::<GeneralConfig>("config.yaml")?;
    config.post_load();
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_yaml_yields_defaults() {
        let config: GeneralConfig = serde_yaml::from_str("{}").unwrap();
        assert_eq!(config.notification_interval_ms, 15_000);
        assert_eq!(config.monitoring_interval_ms, 5_000);
        assert!(config.notifications_enabled);
        assert_eq!(config.notification_topics.len(), 0);
    }

    #[test]
    fn zero_intervals_are_replaced() {
        let mut config: GeneralConfig =
            serde_yaml::from_str("notification_interval_ms: 0\npoll_interval_ms: 0\n").unwrap();
        config.post_load();
        assert_eq!(config.notification_interval(), Duration::from_secs(15));
        assert_eq!(config.poll_interval(), Duration::from_millis(50));
    }

    #[test]
    fn oversized_toast_timeout_is_replaced() {
        let mut config: GeneralConfig = serde_yaml::from_str("toast_timeout_secs: 1.0e30\n").unwrap();
        assert_eq!(config.toast_timeout(), Duration::from_secs(3600));

        config.post_load();
        assert_eq!(config.toast_timeout_secs, def_toast_timeout_secs());
        assert_eq!(config.toast_timeout(), Duration::from_secs(4));

        config.toast_timeout_secs = -1.0;
        assert_eq!(config.toast_timeout(), Duration::from_secs(4));
    }

    #[test]
    fn topics_can_be_hidden() {
        let config: GeneralConfig =
            serde_yaml::from_str("notification_topics:\n  Notification: Hide\n").unwrap();
        assert!(matches!(
            config.notification_topics.get(ToastTopic::Notification),
            Some(ToastDisplayMethod::Hide)
        ));
    }

    #[test]
    fn broken_override_falls_back_to_embedded() {
        let parsed: Vec<u32> =
            load_known_yaml("does-not-exist-for-tests.yaml", "[1, 2, 3]").unwrap();
        assert_eq!(parsed, vec![1, 2, 3]);

        let err = load_known_yaml::<Vec<u32>>("does-not-exist-for-tests.yaml", "{not: [a list")
            .unwrap_err();
        assert!(matches!(err, ConfigError::NoUsableYaml(_)));
    }
}
