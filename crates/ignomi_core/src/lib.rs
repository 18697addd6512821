//! Core domain logic for the ignomi launcher.
//! Usage ranking, bookmarks and panel coordination live here; hosts only
//! supply windows, monitors and a time source.

pub mod bus;
pub mod clock;
pub mod config;
pub mod db;
pub mod error;
pub mod launcher;
pub mod logging;
pub mod model;
pub mod panel;
pub mod ranking;
pub mod repo;
pub mod service;

pub use bus::{ChangeBus, ChangeEvent, DeliveryReport, HandlerError, SubscriptionId, Topic};
pub use clock::{Clock, ManualClock, SystemClock};
pub use config::{load_settings, read_settings, ConfigError, Settings};
pub use db::{open_db, open_db_in_memory, DbError};
pub use error::{LauncherError, LauncherResult, PanelFailure, StorageError};
pub use launcher::{HostBindings, Launcher};
pub use logging::{default_log_level, init_logging, logging_status, LoggingError};
pub use model::item::ItemId;
pub use model::panel::{PanelState, PanelTransition, PlacementHint, Visibility};
pub use model::usage::UsageRecord;
pub use panel::coordinator::PanelCoordinator;
pub use panel::surface::{
    HeadlessSurface, MonitorResolver, PanelSurface, StaticMonitorResolver, SurfaceError,
};
pub use ranking::frecency::{FrecencyScore, Ranking};
pub use repo::bookmark_repo::{BookmarkFileError, BookmarkRepository, JsonFileBookmarkRepository};
pub use repo::usage_repo::{RepoError, RepoResult, SqliteUsageRepository, UsageRepository};
pub use service::bookmark_store::BookmarkStore;
pub use service::usage_store::{ClearScope, UsageStore};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::core_version;

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
