use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use topicmap_core::{EpisodeId, HighlightMode, MapConfig};
use topicmap_graph::DEFAULT_MAX_BARS;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct AppSettings {
    pub theme: ThemeMode,
    /// Directory with `clusters.json`; the built-in demo map is used when unset.
    pub data_dir: Option<PathBuf>,
    pub highlight_mode: HighlightMode,
    pub episode_id: Option<String>,
    pub show_legend: bool,
    pub show_side_panel: bool,
    pub max_bars: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum ThemeMode {
    Latte,
    Frappe,
    Macchiato,
    #[default]
    Mocha,
}

impl ThemeMode {
    pub const ALL: [ThemeMode; 4] = [
        ThemeMode::Latte,
        ThemeMode::Frappe,
        ThemeMode::Macchiato,
        ThemeMode::Mocha,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            ThemeMode::Latte => "Latte",
            ThemeMode::Frappe => "Frappé",
            ThemeMode::Macchiato => "Macchiato",
            ThemeMode::Mocha => "Mocha",
        }
    }
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            theme: ThemeMode::Mocha,
            data_dir: None,
            highlight_mode: HighlightMode::None,
            episode_id: None,
            show_legend: true,
            show_side_panel: true,
            max_bars: DEFAULT_MAX_BARS,
        }
    }
}

impl AppSettings {
    pub fn settings_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("topicmap").join("settings.json"))
    }

    pub fn load() -> Self {
        match Self::settings_path() {
            Some(path) => Self::load_from(&path),
            None => {
                tracing::info!("No config directory available, using default settings");
                Self::default()
            }
        }
    }

    pub fn load_from(path: &Path) -> Self {
        tracing::info!("Loading settings from {:?}", path);
        if !path.exists() {
            tracing::info!("Settings file not found, using defaults");
            return Self::default();
        }
        match std::fs::read_to_string(path) {
            Ok(content) => match serde_json::from_str(&content) {
                Ok(settings) => return settings,
                Err(e) => tracing::error!("Failed to parse settings: {}", e),
            },
            Err(e) => tracing::error!("Failed to read settings file: {}", e),
        }
        Self::default()
    }

    pub fn save(&self) {
        if let Some(path) = Self::settings_path() {
            if let Err(e) = self.save_to(&path) {
                tracing::warn!("Failed to save settings: {e:#}");
            }
        }
    }

    pub fn save_to(&self, path: &Path) -> anyhow::Result<()> {
        if let Some(dir) = path.parent() {
            std::fs::create_dir_all(dir)?;
        }
        std::fs::write(path, serde_json::to_string_pretty(self)?)?;
        Ok(())
    }

    /// Initial map configuration restored from the last session.
    pub fn map_config(&self) -> MapConfig {
        MapConfig {
            highlight_mode: self.highlight_mode,
            episode_id: self
                .episode_id
                .as_deref()
                .map(str::trim)
                .filter(|id| !id.is_empty())
                .map(EpisodeId::new),
            show_legend: self.show_legend,
            ..MapConfig::default()
        }
    }

    pub fn remember(&mut self, config: &MapConfig) {
        self.highlight_mode = config.highlight_mode;
        self.episode_id = config.episode_id.as_ref().map(|id| id.as_str().to_string());
        self.show_legend = config.show_legend;
    }
}
