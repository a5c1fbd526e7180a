//! Registry store: the list of save entries and the files that back them
//!
//! The registry file holds one `name\tcreated_at\tid` line per entry, in
//! display order. New entries are appended; removals rewrite the whole file.
//! Backing copies of the live save sit next to it, each named by its id.

use std::{
    fs::File,
    io::Write,
    path::{Path, PathBuf},
};

use uuid::Uuid;

use crate::entry::{self, ParseError, SaveEntry};

pub const LIST_FILE_NAME: &str = "data_list.txt";

const REWRITE_SUFFIX: &str = "tmp";

#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    /// The caller refers to an entry the store does not have. The displayed
    /// list and the store have gone out of sync.
    #[error("sync problem: no save entry with id {id}")]
    NotFound { id: String },

    #[error("{}:{line}: malformed registry line: {source}", .path.display())]
    Format {
        path: PathBuf,
        line: usize,
        source: ParseError,
    },

    #[error("{}: {source}", .path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
}

impl RegistryError {
    fn io(path: &Path, source: std::io::Error) -> Self {
        Self::Io {
            path: path.to_owned(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, RegistryError>;

#[derive(Debug)]
pub struct Registry {
    dir: PathBuf,
    entries: Vec<SaveEntry>,
}

impl Registry {
    /// A store rooted at `dir` with nothing loaded yet.
    pub fn new<P: Into<PathBuf>>(dir: P) -> Self {
        Self {
            dir: dir.into(),
            entries: Vec::new(),
        }
    }

    /// Create the store rooted at `dir` and load its registry file.
    pub fn open<P: Into<PathBuf>>(dir: P) -> Result<Self> {
        let mut registry = Self::new(dir);
        registry.load()?;

        Ok(registry)
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn list_path(&self) -> PathBuf {
        self.dir.join(LIST_FILE_NAME)
    }

    pub fn backing_path(&self, id: &Uuid) -> PathBuf {
        self.dir.join(id.to_string())
    }

    pub fn entries(&self) -> &[SaveEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Replace the in-memory list with the contents of the registry file.
    ///
    /// The store directory is created when missing. A missing registry file
    /// means no entries. Malformed lines fail the whole load.
    pub fn load(&mut self) -> Result<()> {
        std::fs::create_dir_all(&self.dir).map_err(|e| RegistryError::io(&self.dir, e))?;

        let path = self.list_path();

        if !path.try_exists().map_err(|e| RegistryError::io(&path, e))? {
            tracing::debug!(?path, "no registry file yet");
            self.entries.clear();
            return Ok(());
        }

        let text = std::fs::read_to_string(&path).map_err(|e| RegistryError::io(&path, e))?;
        let mut entries = Vec::new();

        for (index, line) in text.lines().enumerate() {
            let entry = SaveEntry::from_line(line).map_err(|source| RegistryError::Format {
                path: path.clone(),
                line: index + 1,
                source,
            })?;
            entries.push(entry);
        }

        tracing::debug!(?path, count = entries.len(), "loaded registry");
        self.entries = entries;

        Ok(())
    }

    /// Append `entry` to the registry file and to the end of the list.
    pub fn append(&mut self, entry: SaveEntry) -> Result<()> {
        let path = self.list_path();

        let mut file = File::options()
            .create(true)
            .append(true)
            .open(&path)
            .map_err(|e| RegistryError::io(&path, e))?;
        file.write_all(entry.to_line().as_bytes())
            .and_then(|_| file.sync_all())
            .map_err(|e| RegistryError::io(&path, e))?;

        tracing::debug!(id = %entry.id, name = %entry.name, "appended registry entry");
        self.entries.push(entry);

        Ok(())
    }

    /// Replace the registry file with the current list.
    ///
    /// The new contents are written beside the file and renamed over it.
    pub fn rewrite_all(&self) -> Result<()> {
        let path = self.list_path();
        let temp_path = path.with_extension(REWRITE_SUFFIX);

        let contents = self
            .entries
            .iter()
            .map(SaveEntry::to_line)
            .collect::<String>();

        let mut file = File::create(&temp_path).map_err(|e| RegistryError::io(&temp_path, e))?;
        file.write_all(contents.as_bytes())
            .and_then(|_| file.sync_all())
            .map_err(|e| RegistryError::io(&temp_path, e))?;
        drop(file);

        std::fs::rename(&temp_path, &path).map_err(|e| RegistryError::io(&path, e))?;

        tracing::debug!(?path, count = self.entries.len(), "rewrote registry");

        Ok(())
    }

    /// Drop the entry with `id` from the list and rewrite the file.
    ///
    /// If the rewrite fails the entry is put back where it was.
    pub fn remove(&mut self, id: &Uuid) -> Result<SaveEntry> {
        let index = self.position(id)?;
        let entry = self.entries.remove(index);

        if let Err(error) = self.rewrite_all() {
            self.entries.insert(index, entry);
            return Err(error);
        }

        tracing::debug!(id = %entry.id, name = %entry.name, "removed registry entry");

        Ok(entry)
    }

    pub fn find_by_id(&self, id: &Uuid) -> Result<&SaveEntry> {
        let index = self.position(id)?;
        Ok(&self.entries[index])
    }

    /// Resolve a list view string (or a bare id) to its entry.
    pub fn find_by_display_key(&self, key: &str) -> Result<&SaveEntry> {
        let id = entry::id_from_display_key(key).ok_or_else(|| RegistryError::NotFound {
            id: key.to_string(),
        })?;

        self.find_by_id(&id)
    }

    fn position(&self, id: &Uuid) -> Result<usize> {
        self.entries
            .iter()
            .position(|entry| entry.id == *id)
            .ok_or_else(|| RegistryError::NotFound { id: id.to_string() })
    }
}
