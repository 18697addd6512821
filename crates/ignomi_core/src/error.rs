//! Launcher-level error taxonomy.
//!
//! # Responsibility
//! - Map layer errors (db, repository, file, surface) onto the four failure
//!   classes callers act on.
//!
//! # Invariants
//! - Nothing in core retries; callers own retry policy.
//! - `PartialToggleFailure` never implies a rollback of applied transitions.

use crate::db::DbError;
use crate::model::item::ItemIdError;
use crate::model::panel::PanelTransition;
use crate::panel::surface::SurfaceError;
use crate::repo::bookmark_repo::BookmarkFileError;
use crate::repo::usage_repo::RepoError;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type LauncherResult<T> = Result<T, LauncherError>;

/// Underlying storage failure carried by `StorageUnavailable`.
#[derive(Debug)]
pub enum StorageError {
    Db(DbError),
    Bookmarks(BookmarkFileError),
}

impl Display for StorageError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::Bookmarks(err) => write!(f, "{err}"),
        }
    }
}

impl Error for StorageError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            Self::Bookmarks(err) => Some(err),
        }
    }
}

/// One panel that failed inside a batch transition.
#[derive(Debug)]
pub struct PanelFailure {
    pub name: String,
    pub error: SurfaceError,
}

#[derive(Debug)]
pub enum LauncherError {
    /// Disk or database inaccessible; fatal for writes.
    StorageUnavailable(StorageError),
    /// Persisted state cannot be decoded.
    MalformedPersistedData(String),
    /// Unknown panel, blank item id, or other rejected input.
    InvalidArgument(String),
    /// Some panels in a batch failed; `applied` stays in effect.
    PartialToggleFailure {
        applied: Vec<PanelTransition>,
        failures: Vec<PanelFailure>,
    },
}

impl LauncherError {
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::InvalidArgument(message.into())
    }

    /// Stable short code used in log lines and CLI output.
    pub fn code(&self) -> &'static str {
        match self {
            Self::StorageUnavailable(_) => "storage_unavailable",
            Self::MalformedPersistedData(_) => "malformed_persisted_data",
            Self::InvalidArgument(_) => "invalid_argument",
            Self::PartialToggleFailure { .. } => "partial_toggle_failure",
        }
    }
}

impl Display for LauncherError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::StorageUnavailable(err) => write!(f, "storage unavailable: {err}"),
            Self::MalformedPersistedData(message) => {
                write!(f, "malformed persisted data: {message}")
            }
            Self::InvalidArgument(message) => write!(f, "invalid argument: {message}"),
            Self::PartialToggleFailure { applied, failures } => {
                let failed = failures
                    .iter()
                    .map(|failure| format!("{} ({})", failure.name, failure.error))
                    .collect::<Vec<_>>()
                    .join(", ");
                write!(
                    f,
                    "{} panel(s) failed to transition, {} applied: {failed}",
                    failures.len(),
                    applied.len()
                )
            }
        }
    }
}

impl Error for LauncherError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::StorageUnavailable(err) => Some(err),
            Self::MalformedPersistedData(_) => None,
            Self::InvalidArgument(_) => None,
            Self::PartialToggleFailure { .. } => None,
        }
    }
}

impl From<DbError> for LauncherError {
    fn from(value: DbError) -> Self {
        Self::StorageUnavailable(StorageError::Db(value))
    }
}

impl From<RepoError> for LauncherError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::Db(err) => Self::StorageUnavailable(StorageError::Db(err)),
            RepoError::InvalidData(message) => Self::MalformedPersistedData(message),
        }
    }
}

impl From<BookmarkFileError> for LauncherError {
    fn from(value: BookmarkFileError) -> Self {
        Self::StorageUnavailable(StorageError::Bookmarks(value))
    }
}

impl From<ItemIdError> for LauncherError {
    fn from(value: ItemIdError) -> Self {
        Self::InvalidArgument(value.to_string())
    }
}
