//! Panel visibility model.
//!
//! # Invariants
//! - Panel names are unique within one coordinator.
//! - `placement_hint` changes only on a `Hidden -> Visible` transition.

use std::fmt::{Display, Formatter};

/// Opaque placement token supplied by a monitor-resolution collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PlacementHint(String);

impl PlacementHint {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl Display for PlacementHint {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Visibility state of one panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Visibility {
    Hidden,
    Visible,
}

impl Visibility {
    pub fn flipped(self) -> Self {
        match self {
            Self::Hidden => Self::Visible,
            Self::Visible => Self::Hidden,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Hidden => "hidden",
            Self::Visible => "visible",
        }
    }
}

/// Snapshot of one configured panel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PanelState {
    pub name: String,
    pub visibility: Visibility,
    /// `None` until the panel has been shown once.
    pub placement_hint: Option<PlacementHint>,
}

impl PanelState {
    /// Creates a hidden panel without placement.
    pub fn hidden(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            visibility: Visibility::Hidden,
            placement_hint: None,
        }
    }

    pub fn is_visible(&self) -> bool {
        self.visibility == Visibility::Visible
    }
}

/// One applied visibility change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PanelTransition {
    pub name: String,
    pub from: Visibility,
    pub to: Visibility,
}

impl PanelTransition {
    pub fn is_open(&self) -> bool {
        self.from == Visibility::Hidden && self.to == Visibility::Visible
    }
}
