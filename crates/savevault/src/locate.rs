//! Finding the game's live save file
//!
//! The game keeps one folder per user profile under its app-data directory,
//! e.g. `%APPDATA%\EldenRing\76561198000000000\ER0000.sl2`.

use std::path::{Path, PathBuf};

pub const DEFAULT_GAME_DIR_NAME: &str = "EldenRing";
pub const DEFAULT_SAVE_FILE_NAME: &str = "ER0000.sl2";

#[derive(Debug, thiserror::Error)]
pub enum LocateError {
    #[error("could not determine the user data directory; set `games_root` or `live_save`")]
    NoDataDir,

    #[error("no profile folder found in {}", .root.display())]
    NoProfile { root: PathBuf },

    #[error(
        "several profile folders found in {}: {}; set `live_save` to pick one",
        .root.display(),
        .profiles.join(", ")
    )]
    AmbiguousProfile {
        root: PathBuf,
        profiles: Vec<String>,
    },

    #[error("{}: {source}", .path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// The directory the game keeps its profile folders in.
pub fn default_games_root() -> Result<PathBuf, LocateError> {
    dirs::data_dir()
        .map(|dir| dir.join(DEFAULT_GAME_DIR_NAME))
        .ok_or(LocateError::NoDataDir)
}

/// Resolve the live save inside the single profile folder under `root`.
pub fn find_live_save(root: &Path, save_file_name: &str) -> Result<PathBuf, LocateError> {
    let mut profiles = profile_folders(root)?;

    match profiles.len() {
        0 => Err(LocateError::NoProfile {
            root: root.to_owned(),
        }),
        1 => {
            let profile = profiles.remove(0);
            let path = root.join(profile).join(save_file_name);

            tracing::debug!(?path, "located live save");

            Ok(path)
        }
        _ => Err(LocateError::AmbiguousProfile {
            root: root.to_owned(),
            profiles,
        }),
    }
}

fn profile_folders(root: &Path) -> Result<Vec<String>, LocateError> {
    let io_error = |source: std::io::Error| LocateError::Io {
        path: root.to_owned(),
        source,
    };

    let mut profiles = Vec::new();

    for item in std::fs::read_dir(root).map_err(io_error)? {
        let item = item.map_err(io_error)?;

        if item.file_type().map_err(io_error)?.is_dir() {
            profiles.push(item.file_name().to_string_lossy().into_owned());
        }
    }

    profiles.sort();

    Ok(profiles)
}
