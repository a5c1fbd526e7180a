//! Save manager: user actions against the registry store and the live save
use std::path::{Path, PathBuf};

use chrono::Local;
use uuid::Uuid;

use crate::{
    confirm::{Confirm, Prompt},
    entry::{self, SaveEntry},
    registry::{Registry, RegistryError},
};

#[derive(Debug, thiserror::Error)]
pub enum ManagerError {
    #[error("no save selected")]
    NoSelection,

    #[error("save name must not contain tabs or line breaks: {0:?}")]
    InvalidName(String),

    #[error(transparent)]
    Registry(#[from] RegistryError),

    #[error("copying {} to {} failed: {source}", .from.display(), .to.display())]
    Copy {
        from: PathBuf,
        to: PathBuf,
        source: std::io::Error,
    },

    #[error("deleting {} failed: {source}", .path.display())]
    Delete {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("confirmation failed: {0}")]
    Confirm(std::io::Error),
}

pub type Result<T> = std::result::Result<T, ManagerError>;

/// What happened to an action that needed confirmation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Done,
    Declined,
}

pub struct SaveManager<C> {
    registry: Registry,
    live_save: PathBuf,
    confirm: C,
    selected: Option<Uuid>,
}

impl<C: Confirm> SaveManager<C> {
    pub fn new(registry: Registry, live_save: PathBuf, confirm: C) -> Self {
        Self {
            registry,
            live_save,
            confirm,
            selected: None,
        }
    }

    pub fn entries(&self) -> &[SaveEntry] {
        self.registry.entries()
    }

    pub fn live_save(&self) -> &Path {
        &self.live_save
    }

    pub fn selected(&self) -> Option<&SaveEntry> {
        let id = self.selected.as_ref()?;
        self.registry.find_by_id(id).ok()
    }

    /// Select the entry a display key (or bare id) refers to.
    ///
    /// The selection is left alone if the key does not resolve.
    pub fn select(&mut self, key: &str) -> Result<&SaveEntry> {
        let entry = self.registry.find_by_display_key(key)?;

        tracing::debug!(id = %entry.id, name = %entry.name, "selected save");
        self.selected = Some(entry.id);

        Ok(entry)
    }

    /// Snapshot the live save under a new entry.
    ///
    /// An empty or missing name is replaced with the creation timestamp.
    pub fn create(&mut self, name: Option<&str>) -> Result<SaveEntry> {
        let created_at = entry::format_timestamp(&Local::now());

        let name = match name {
            Some(name) if !name.is_empty() => name.to_string(),
            _ => created_at.clone(),
        };

        if !entry::is_storable_name(&name) {
            return Err(ManagerError::InvalidName(name));
        }

        let entry = SaveEntry::new(name, created_at);
        let backing_path = self.registry.backing_path(&entry.id);

        tracing::info!(id = %entry.id, name = %entry.name, "create save");

        if let Err(error) = copy(&self.live_save, &backing_path) {
            if backing_path.exists() {
                tracing::warn!(path = ?backing_path, "backing file left without a registry entry");
            }
            return Err(error);
        }

        if let Err(error) = self.registry.append(entry.clone()) {
            tracing::warn!(path = ?backing_path, "backing file left without a registry entry");
            return Err(error.into());
        }

        Ok(entry)
    }

    /// Copy the selected entry over the live save after confirmation.
    ///
    /// The live save is overwritten without keeping a copy of it.
    pub fn load(&mut self) -> Result<Outcome> {
        let entry = self.selected().ok_or(ManagerError::NoSelection)?.clone();

        if !self.ask(&Prompt::Load { name: &entry.name })? {
            tracing::info!(id = %entry.id, "load declined");
            return Ok(Outcome::Declined);
        }

        tracing::info!(id = %entry.id, name = %entry.name, "load save");

        let backing_path = self.registry.backing_path(&entry.id);
        copy(&backing_path, &self.live_save)?;

        Ok(Outcome::Done)
    }

    /// Delete the selected entry and its backing file after confirmation.
    pub fn remove(&mut self) -> Result<Outcome> {
        let entry = self.selected().ok_or(ManagerError::NoSelection)?.clone();

        if !self.ask(&Prompt::Remove { name: &entry.name })? {
            tracing::info!(id = %entry.id, "remove declined");
            return Ok(Outcome::Declined);
        }

        tracing::info!(id = %entry.id, name = %entry.name, "remove save");

        self.registry.remove(&entry.id)?;
        self.selected = None;

        let backing_path = self.registry.backing_path(&entry.id);

        match std::fs::remove_file(&backing_path) {
            Ok(_) => {}
            Err(error) if error.kind() == std::io::ErrorKind::NotFound => {
                tracing::warn!(path = ?backing_path, "backing file was already missing");
            }
            Err(source) => {
                return Err(ManagerError::Delete {
                    path: backing_path,
                    source,
                })
            }
        }

        Ok(Outcome::Done)
    }

    fn ask(&mut self, prompt: &Prompt<'_>) -> Result<bool> {
        self.confirm.confirm(prompt).map_err(ManagerError::Confirm)
    }
}

fn copy(from: &Path, to: &Path) -> Result<()> {
    crate::fsutil::copy_preserving(from, to).map_err(|source| ManagerError::Copy {
        from: from.to_owned(),
        to: to.to_owned(),
        source,
    })?;

    Ok(())
}
