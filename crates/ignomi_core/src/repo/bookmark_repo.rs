//! Bookmark list persistence.
//!
//! # Responsibility
//! - Read and write the ordered bookmark document.
//! - Replace the file atomically on every save.
//!
//! # Invariants
//! - A save writes `<file>.tmp`, syncs it, then renames over the target; a
//!   crash mid-write leaves the previous document intact.
//! - On Unix the parent directory is synced after the rename so the new entry
//!   is durable.
//! - The temporary file does not survive a successful save.
//! - A missing file loads as an empty list; any other failure is returned so
//!   the caller decides how to degrade.

use crate::model::item::ItemId;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::ffi::OsString;
use std::fmt::{Display, Formatter};
use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

const TEMP_SUFFIX: &str = ".tmp";

/// On-disk shape: `{"bookmarks": ["a.desktop", ...]}`.
#[derive(Debug, Default, Serialize, Deserialize)]
struct BookmarkDocument {
    #[serde(default)]
    bookmarks: Vec<ItemId>,
}

/// Errors from bookmark file persistence.
#[derive(Debug)]
pub enum BookmarkFileError {
    Io { path: PathBuf, source: io::Error },
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
    Serialize(serde_json::Error),
}

impl Display for BookmarkFileError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io { path, source } => {
                write!(f, "bookmark file `{}` i/o failed: {source}", path.display())
            }
            Self::Parse { path, source } => {
                write!(f, "bookmark file `{}` is malformed: {source}", path.display())
            }
            Self::Serialize(err) => write!(f, "bookmark list cannot be serialized: {err}"),
        }
    }
}

impl Error for BookmarkFileError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::Parse { source, .. } => Some(source),
            Self::Serialize(err) => Some(err),
        }
    }
}

/// Repository interface for the bookmark list.
pub trait BookmarkRepository {
    fn load(&self) -> Result<Vec<ItemId>, BookmarkFileError>;
    fn save(&self, bookmarks: &[ItemId]) -> Result<(), BookmarkFileError>;
}

/// JSON file repository with atomic replace semantics.
#[derive(Debug, Clone)]
pub struct JsonFileBookmarkRepository {
    path: PathBuf,
}

impl JsonFileBookmarkRepository {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Sibling path used for the write-then-rename step.
    pub fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(OsString::from)
            .unwrap_or_else(|| OsString::from("bookmarks.json"));
        name.push(TEMP_SUFFIX);
        self.path.with_file_name(name)
    }

    fn io_error(&self, path: &Path, source: io::Error) -> BookmarkFileError {
        BookmarkFileError::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}

impl BookmarkRepository for JsonFileBookmarkRepository {
    fn load(&self) -> Result<Vec<ItemId>, BookmarkFileError> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(err) => return Err(self.io_error(&self.path, err)),
        };

        let document: BookmarkDocument =
            serde_json::from_str(&content).map_err(|source| BookmarkFileError::Parse {
                path: self.path.clone(),
                source,
            })?;
        Ok(document.bookmarks)
    }

    fn save(&self, bookmarks: &[ItemId]) -> Result<(), BookmarkFileError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|err| self.io_error(parent, err))?;
        }

        let document = BookmarkDocument {
            bookmarks: bookmarks.to_vec(),
        };
        let mut payload =
            serde_json::to_vec_pretty(&document).map_err(BookmarkFileError::Serialize)?;
        payload.push(b'\n');

        let temp_path = self.temp_path();
        if let Err(err) = write_synced(&temp_path, &payload) {
            let _ = fs::remove_file(&temp_path);
            return Err(self.io_error(&temp_path, err));
        }
        if let Err(err) = fs::rename(&temp_path, &self.path) {
            let _ = fs::remove_file(&temp_path);
            return Err(self.io_error(&self.path, err));
        }
        sync_parent_dir(&self.path).map_err(|err| self.io_error(&self.path, err))?;

        Ok(())
    }
}

fn write_synced(path: &Path, payload: &[u8]) -> io::Result<()> {
    let mut file = File::create(path)?;
    file.write_all(payload)?;
    file.sync_all()
}

#[cfg(unix)]
fn sync_parent_dir(path: &Path) -> io::Result<()> {
    let parent = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    File::open(parent)?.sync_all()
}

#[cfg(not(unix))]
fn sync_parent_dir(_path: &Path) -> io::Result<()> {
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{sync_parent_dir, BookmarkRepository, JsonFileBookmarkRepository};
    use std::path::Path;

    #[test]
    fn save_into_new_directory_syncs_and_leaves_only_the_document() {
        let dir = tempfile::tempdir().expect("tempdir");
        let target = dir.path().join("nested").join("bookmarks.json");
        let repo = JsonFileBookmarkRepository::new(target.clone());

        repo.save(&["a.desktop".to_string()]).expect("save");

        let entries: Vec<_> = std::fs::read_dir(dir.path().join("nested"))
            .expect("read nested dir")
            .map(|entry| entry.expect("entry").file_name())
            .collect();
        assert_eq!(entries, vec![std::ffi::OsString::from("bookmarks.json")]);
        assert_eq!(repo.load().expect("load"), vec!["a.desktop".to_string()]);
    }

    #[test]
    fn parent_sync_accepts_bare_file_names() {
        sync_parent_dir(Path::new("bookmarks.json")).expect("sync current dir");
    }
}
