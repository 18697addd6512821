//! Opaque item identifiers.

use std::error::Error;
use std::fmt::{Display, Formatter};

/// Identifier of one launchable item, e.g. a desktop file id.
///
/// Identifiers are never validated against a live application catalog.
pub type ItemId = String;

/// Validation failure for caller-provided item identifiers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ItemIdError {
    Blank,
}

impl Display for ItemIdError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Blank => write!(f, "item id must not be blank"),
        }
    }
}

impl Error for ItemIdError {}

/// Trims and validates one caller-provided item identifier.
pub fn normalize_item_id(raw: &str) -> Result<ItemId, ItemIdError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(ItemIdError::Blank);
    }
    Ok(trimmed.to_string())
}
