//! Editable configuration file loading

use std::path::{Path, PathBuf};

use anyhow::Context;
use serde::Deserialize;

use crate::locate;

const APP_DIR_NAME: &str = "savevault";
const CONFIG_FILE_NAME: &str = "config.toml";

/// The config that gets loaded from the toml config file
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AppConfig {
    /// Directory holding the registry file and the backing copies
    pub store_dir: Option<PathBuf>,
    /// The game's save file; discovered under `games_root` when unset
    pub live_save: Option<PathBuf>,
    pub games_root: Option<PathBuf>,
    pub save_file_name: Option<String>,
    /// Debug log file
    pub log_path: Option<PathBuf>,
}

/// Load the config at `path`, or the default location when `path` is `None`.
///
/// An explicitly given file must exist. A missing default file means an
/// empty config.
pub fn load_config(path: Option<&Path>) -> anyhow::Result<AppConfig> {
    let path = match path {
        Some(path) => path.to_owned(),
        None => match default_config_path() {
            Some(path) if path.exists() => path,
            _ => return Ok(AppConfig::default()),
        },
    };

    tracing::debug!(?path, "reading configuration");

    let config_text = std::fs::read_to_string(&path)
        .with_context(|| format!("reading {} failed", path.display()))?;
    let config = toml::from_str::<AppConfig>(&config_text)
        .with_context(|| format!("parsing {} failed", path.display()))?;

    tracing::debug!("loaded configuration");

    Ok(config)
}

pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join(APP_DIR_NAME).join(CONFIG_FILE_NAME))
}

pub fn default_store_dir() -> Option<PathBuf> {
    dirs::data_dir().map(|dir| dir.join(APP_DIR_NAME))
}

impl AppConfig {
    /// Command line values take precedence over the file.
    pub fn with_overrides(mut self, store_dir: Option<PathBuf>, live_save: Option<PathBuf>) -> Self {
        if store_dir.is_some() {
            self.store_dir = store_dir;
        }
        if live_save.is_some() {
            self.live_save = live_save;
        }

        self
    }

    /// The store directory, falling back to the platform data directory.
    pub fn resolve_store_dir(&self) -> anyhow::Result<PathBuf> {
        match &self.store_dir {
            Some(dir) => Ok(dir.clone()),
            None => default_store_dir()
                .context("could not determine the user data directory; set `store_dir`"),
        }
    }

    /// The live save path, discovering it when not configured.
    pub fn resolve_live_save(&self) -> anyhow::Result<PathBuf> {
        if let Some(path) = &self.live_save {
            return Ok(path.clone());
        }

        let root = match &self.games_root {
            Some(root) => root.clone(),
            None => locate::default_games_root()?,
        };
        let save_file_name = self
            .save_file_name
            .as_deref()
            .unwrap_or(locate::DEFAULT_SAVE_FILE_NAME);

        let path = locate::find_live_save(&root, save_file_name)
            .context("locating the live save failed")?;

        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_all_keys() {
        let config = toml::from_str::<AppConfig>(
            r#"
            store_dir = "/srv/saves"
            live_save = "/games/ER0000.sl2"
            games_root = "/games"
            save_file_name = "ER0000.co2"
            log_path = "/var/log/savevault.log"
            "#,
        )
        .unwrap();

        assert_eq!(config.store_dir.as_deref(), Some(Path::new("/srv/saves")));
        assert_eq!(config.save_file_name.as_deref(), Some("ER0000.co2"));
        assert_eq!(
            config.log_path.as_deref(),
            Some(Path::new("/var/log/savevault.log"))
        );
    }

    #[test]
    fn empty_file_is_default() {
        let config = toml::from_str::<AppConfig>("").unwrap();

        assert!(config.store_dir.is_none());
        assert!(config.live_save.is_none());
    }

    #[test]
    fn unknown_key_is_rejected() {
        assert!(toml::from_str::<AppConfig>("stor_dir = \"/x\"").is_err());
    }

    #[test]
    fn explicit_missing_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();

        assert!(load_config(Some(dir.path().join("absent.toml").as_path())).is_err());
    }

    #[test]
    fn explicit_file_is_loaded() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "store_dir = \"/srv/saves\"\n").unwrap();

        let config = load_config(Some(path.as_path())).unwrap();

        assert_eq!(config.store_dir.as_deref(), Some(Path::new("/srv/saves")));
    }

    #[test]
    fn overrides_win_over_file() {
        let config = AppConfig {
            store_dir: Some("/from/file".into()),
            live_save: Some("/from/file/save".into()),
            ..AppConfig::default()
        }
        .with_overrides(Some("/from/cli".into()), None);

        assert_eq!(config.resolve_store_dir().unwrap(), Path::new("/from/cli"));
        assert_eq!(
            config.resolve_live_save().unwrap(),
            Path::new("/from/file/save")
        );
    }

    #[test]
    fn live_save_is_discovered_under_games_root() {
        let root = tempfile::tempdir().unwrap();
        std::fs::create_dir(root.path().join("1234")).unwrap();

        let config = AppConfig {
            games_root: Some(root.path().to_owned()),
            save_file_name: Some("save.bin".to_string()),
            ..AppConfig::default()
        };

        assert_eq!(
            config.resolve_live_save().unwrap(),
            root.path().join("1234").join("save.bin")
        );
    }
}
