use std::fs;
use std::path::Path;
use std::time::Duration;

use anyhow::Context;
use log::LevelFilter;
use orderdesk_core::{CoordinatorSettings, DeskSettings, Tab};
use serde::{Deserialize, Serialize};

use crate::logging::LogDestination;

pub const DEFAULT_CONFIG_PATH: &str = "./orderdesk.ron";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DeskConfig {
    pub page_size: u32,
    pub debounce_ms: u64,
    pub scroll_threshold_px: u32,
    pub initial_tab: Tab,
    /// Honour host replies that carry no ticket.
    pub accept_untracked: bool,
    pub log_destination: LogDestination,
    pub log_level: String,
}

impl Default for DeskConfig {
    fn default() -> Self {
        Self {
            page_size: orderdesk_core::DEFAULT_PAGE_SIZE,
            debounce_ms: orderdesk_core::DEFAULT_DEBOUNCE.as_millis() as u64,
            scroll_threshold_px: orderdesk_core::DEFAULT_SCROLL_THRESHOLD_PX,
            initial_tab: Tab::SiteA,
            accept_untracked: false,
            log_destination: LogDestination::Terminal,
            log_level: "info".to_string(),
        }
    }
}

impl DeskConfig {
    /// Reads `path`; a missing file yields the defaults.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let content = match fs::read_to_string(path) {
            Ok(text) => text,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                return Ok(Self::default());
            }
            Err(err) => {
                return Err(err).with_context(|| format!("failed to read config {path:?}"));
            }
        };
        let config: Self =
            ron::from_str(&content).with_context(|| format!("failed to parse config {path:?}"))?;
        if config.page_size == 0 {
            anyhow::bail!("page_size must be positive in {path:?}");
        }
        config.log_level()?;
        Ok(config)
    }

    pub fn log_level(&self) -> anyhow::Result<LevelFilter> {
        self.log_level
            .parse()
            .map_err(|_| anyhow::anyhow!("invalid log_level {:?}", self.log_level))
    }

    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }

    pub fn desk_settings(&self) -> DeskSettings {
        DeskSettings {
            coordinator: CoordinatorSettings {
                page_size: self.page_size,
                accept_untracked: self.accept_untracked,
            },
            initial_tab: self.initial_tab,
            scroll_threshold_px: self.scroll_threshold_px,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn missing_file_gives_defaults() {
        let temp = TempDir::new().unwrap();
        let config = DeskConfig::load(&temp.path().join("absent.ron")).unwrap();
        assert_eq!(config, DeskConfig::default());
        assert_eq!(config.page_size, 50);
        assert_eq!(config.debounce(), Duration::from_millis(250));
    }

    #[test]
    fn partial_file_overrides_defaults() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("orderdesk.ron");
        fs::write(
            &path,
            r#"(page_size: 25, initial_tab: "CENTRAL", log_destination: both)"#,
        )
        .unwrap();

        let config = DeskConfig::load(&path).unwrap();
        assert_eq!(config.page_size, 25);
        assert_eq!(config.initial_tab, Tab::SiteB);
        assert_eq!(config.log_destination, LogDestination::Both);
        assert_eq!(config.scroll_threshold_px, 200);

        let settings = config.desk_settings();
        assert_eq!(settings.coordinator.page_size, 25);
        assert_eq!(settings.initial_tab, Tab::SiteB);
    }

    #[test]
    fn invalid_values_are_rejected() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("orderdesk.ron");

        fs::write(&path, "(page_size: 0)").unwrap();
        assert!(DeskConfig::load(&path).is_err());

        fs::write(&path, r#"(initial_tab: "WAREHOUSE")"#).unwrap();
        assert!(DeskConfig::load(&path).is_err());

        fs::write(&path, r#"(log_level: "chatty")"#).unwrap();
        assert!(DeskConfig::load(&path).is_err());
    }
}
