//! Host collaborators consumed by the coordinator.

use crate::model::panel::PlacementHint;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Failure reported by a host surface.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SurfaceError(String);

impl SurfaceError {
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}

impl Display for SurfaceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl Error for SurfaceError {}

/// Host window backing one panel.
pub trait PanelSurface {
    fn show(&mut self, placement: &PlacementHint) -> Result<(), SurfaceError>;
    fn hide(&mut self) -> Result<(), SurfaceError>;
}

/// Surface for hosts without windows; every call succeeds.
#[derive(Debug, Clone, Copy, Default)]
pub struct HeadlessSurface;

impl PanelSurface for HeadlessSurface {
    fn show(&mut self, _placement: &PlacementHint) -> Result<(), SurfaceError> {
        Ok(())
    }

    fn hide(&mut self) -> Result<(), SurfaceError> {
        Ok(())
    }
}

/// Answers "where is the user's attention now".
pub trait MonitorResolver {
    fn focused_monitor(&self) -> PlacementHint;
}

/// Resolver that always answers with one fixed token.
#[derive(Debug, Clone)]
pub struct StaticMonitorResolver {
    hint: PlacementHint,
}

impl StaticMonitorResolver {
    pub fn new(hint: PlacementHint) -> Self {
        Self { hint }
    }
}

impl Default for StaticMonitorResolver {
    /// Monitor `0`, the fallback when focus detection is unavailable.
    fn default() -> Self {
        Self::new(PlacementHint::new("0"))
    }
}

impl MonitorResolver for StaticMonitorResolver {
    fn focused_monitor(&self) -> PlacementHint {
        self.hint.clone()
    }
}
