use arc_swap::ArcSwap;
use notify::{Event, RecommendedWatcher, RecursiveMode, Watcher};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::sync::{Arc, LazyLock};

use crate::utils::{log_settings_error, log_settings_reloaded};

pub const DEFAULT_SETTINGS_FILE: &str = "settings.default.ron";
pub const OVERRIDE_SETTINGS_FILE: &str = "settings.ron";

static SETTINGS: LazyLock<ArcSwap<Settings>> =
    LazyLock::new(|| ArcSwap::from_pointee(Settings::load_from_files()));

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    pub server: Server,
    pub analysis: Analysis,
    pub ml: Ml,
    pub transcription: Transcription,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Server {
    pub port: u16,
    pub database_url: String,
    pub pool_size: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Analysis {
    pub min_text_length: usize,
    pub emotion_char_limit: usize,
    pub oracle_timeout_ms: u64,
    pub history_limit: i64,
    pub preview_length: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Ml {
    pub enabled: bool,
    pub hypothesis_template: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Transcription {
    pub endpoint: Option<String>,
    pub timeout_secs: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            server: Server {
                port: 5000,
                database_url: "checkins.db".to_string(),
                pool_size: 5,
            },
            analysis: Analysis {
                min_text_length: 10,
                emotion_char_limit: 1000,
                oracle_timeout_ms: 5000,
                history_limit: 50,
                preview_length: 100,
            },
            ml: Ml {
                enabled: true,
                hypothesis_template: "The writer of this text feels {}.".to_string(),
            },
            transcription: Transcription {
                endpoint: None,
                timeout_secs: 30,
            },
        }
    }
}

impl Settings {
    pub fn load() -> Arc<Settings> {
        SETTINGS.load_full()
    }

    /// Re-reads the settings files and swaps them in for subsequent readers.
    pub fn reload() {
        SETTINGS.store(Arc::new(Self::load_from_files()));
    }

    fn load_from_files() -> Settings {
        let default_path = Path::new(DEFAULT_SETTINGS_FILE);
        let override_path = Path::new(OVERRIDE_SETTINGS_FILE);

        let mut settings = if default_path.exists() {
            fs::read_to_string(default_path)
                .ok()
                .and_then(|content| Self::parse(default_path, &content))
                .unwrap_or_default()
        } else {
            Settings::default()
        };

        if override_path.exists() {
            if let Ok(content) = fs::read_to_string(override_path) {
                if let Some(overrides) = Self::parse(override_path, &content) {
                    settings = overrides;
                }
            }
        }

        settings
    }

    fn parse(path: &Path, content: &str) -> Option<Settings> {
        match ron::from_str::<Settings>(content) {
            Ok(settings) => Some(settings),
            Err(e) => {
                log_settings_error(&path.display().to_string(), &e.to_string());
                None
            }
        }
    }
}

pub fn settings() -> Arc<Settings> {
    Settings::load()
}

fn is_settings_file(path: &Path) -> bool {
    path.file_name()
        .and_then(|name| name.to_str())
        .is_some_and(|name| name == DEFAULT_SETTINGS_FILE || name == OVERRIDE_SETTINGS_FILE)
}

/// Watches the working directory and reloads settings whenever one of the
/// settings files changes. The returned watcher must be kept alive.
pub fn watch_settings() -> notify::Result<RecommendedWatcher> {
    let mut watcher = notify::recommended_watcher(|res: notify::Result<Event>| {
        let Ok(event) = res else {
            return;
        };
        let touched = event.paths.iter().any(|p| is_settings_file(p));
        if touched && (event.kind.is_modify() || event.kind.is_create()) {
            Settings::reload();
            log_settings_reloaded();
        }
    })?;
    watcher.watch(Path::new("."), RecursiveMode::NonRecursive)?;
    Ok(watcher)
}
