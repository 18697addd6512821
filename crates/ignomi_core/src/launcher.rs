//! Command surface of the launcher core.
//!
//! # Responsibility
//! - Wire the stores, the bus and the coordinator from settings.
//! - Expose the commands external collaborators invoke: launch recording,
//!   panel toggles, bookmark edits, rankings and stat clearing.
//!
//! # Invariants
//! - Every collaborator is injected; there is no process-global state.
//! - All components share one bus instance.

use crate::bus::{ChangeBus, ChangeEvent, HandlerError, SubscriptionId, Topic};
use crate::clock::Clock;
use crate::config::{FrecencySettings, Settings};
use crate::error::{LauncherError, LauncherResult};
use crate::model::item::ItemId;
use crate::model::panel::{PanelState, PanelTransition};
use crate::model::usage::UsageRecord;
use crate::panel::coordinator::PanelCoordinator;
use crate::panel::surface::{MonitorResolver, PanelSurface};
use crate::ranking::frecency::FrecencyScore;
use crate::repo::bookmark_repo::BookmarkRepository;
use crate::repo::usage_repo::UsageRepository;
use crate::service::bookmark_store::BookmarkStore;
use crate::service::usage_store::{ClearScope, UsageStore};
use std::rc::Rc;
use std::time::Instant;

/// Host-side collaborators needed to build a [`Launcher`].
pub struct HostBindings<F>
where
    F: FnMut(&str) -> Box<dyn PanelSurface>,
{
    pub clock: Rc<dyn Clock>,
    pub monitors: Box<dyn MonitorResolver>,
    /// Called once per configured panel name.
    pub surface_factory: F,
}

/// Launcher core with its stores, bus and panel coordinator.
pub struct Launcher<U: UsageRepository, B: BookmarkRepository> {
    bus: Rc<ChangeBus>,
    usage: UsageStore<U>,
    bookmarks: BookmarkStore<B>,
    panels: PanelCoordinator,
    frecency: FrecencySettings,
}

impl<U: UsageRepository, B: BookmarkRepository> Launcher<U, B> {
    /// Builds the core and registers every panel from `settings`.
    ///
    /// # Errors
    /// - `InvalidArgument` when `settings` name an invalid panel set.
    pub fn new<F>(
        usage_repo: U,
        bookmark_repo: B,
        settings: &Settings,
        host: HostBindings<F>,
    ) -> LauncherResult<Self>
    where
        F: FnMut(&str) -> Box<dyn PanelSurface>,
    {
        settings
            .validate()
            .map_err(|err| LauncherError::invalid_argument(err.to_string()))?;
        let HostBindings {
            clock,
            monitors,
            mut surface_factory,
        } = host;
        let bus = Rc::new(ChangeBus::new());

        let usage = UsageStore::new(usage_repo, Rc::clone(&bus), Rc::clone(&clock));
        let bookmarks = BookmarkStore::open(bookmark_repo, Rc::clone(&bus));
        let mut panels = PanelCoordinator::new(
            monitors,
            Rc::clone(&bus),
            clock,
            settings.launcher.close_delay(),
        );
        for name in &settings.launcher.panels {
            panels.register_panel(name, surface_factory(name))?;
        }

        Ok(Self {
            bus,
            usage,
            bookmarks,
            panels,
            frecency: settings.frecency.clone(),
        })
    }

    /// Registers a change handler on the shared bus.
    pub fn subscribe<H>(&self, topic: Topic, handler: H) -> SubscriptionId
    where
        H: Fn(&ChangeEvent) -> Result<(), HandlerError> + 'static,
    {
        self.bus.subscribe(topic, handler)
    }

    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        self.bus.unsubscribe(id)
    }

    pub fn bus(&self) -> Rc<ChangeBus> {
        Rc::clone(&self.bus)
    }

    pub fn usage(&self) -> &UsageStore<U> {
        &self.usage
    }

    pub fn bookmarks(&self) -> &BookmarkStore<B> {
        &self.bookmarks
    }

    pub fn panels(&self) -> &PanelCoordinator {
        &self.panels
    }

    pub fn record_launch(&self, item_id: &str) -> LauncherResult<UsageRecord> {
        self.usage.record_launch(item_id)
    }

    /// Records the launch and arms the configured auto-close.
    pub fn launch_and_close(&mut self, item_id: &str) -> LauncherResult<UsageRecord> {
        self.panels.launch_and_close(&self.usage, item_id)
    }

    pub fn toggle_panel(&mut self, name: &str) -> LauncherResult<PanelTransition> {
        self.panels.toggle(name)
    }

    pub fn toggle_all<S: AsRef<str>>(&mut self, names: &[S]) -> LauncherResult<Vec<PanelTransition>> {
        self.panels.toggle_all(names)
    }

    /// Toggles the full configured panel set together.
    pub fn toggle_launcher(&mut self) -> LauncherResult<Vec<PanelTransition>> {
        let names = self.panels.panel_names();
        self.panels.toggle_all(names.as_slice())
    }

    pub fn close_all(&mut self) -> LauncherResult<Vec<PanelTransition>> {
        self.panels.close_all()
    }

    pub fn panel_states(&self) -> Vec<PanelState> {
        self.panels.panels()
    }

    pub fn add_bookmark(&mut self, item_id: &str) -> LauncherResult<bool> {
        self.bookmarks.add(item_id)
    }

    pub fn remove_bookmark(&mut self, item_id: &str) -> LauncherResult<bool> {
        self.bookmarks.remove(item_id)
    }

    pub fn reorder_bookmark(&mut self, item_id: &str, index: usize) -> LauncherResult<bool> {
        self.bookmarks.reorder(item_id, index)
    }

    pub fn list_bookmarks(&self) -> Vec<ItemId> {
        self.bookmarks.list()
    }

    pub fn top_apps(&self, limit: usize, min_launches: u64) -> Vec<FrecencyScore> {
        self.usage.top_apps(limit, min_launches).to_vec()
    }

    /// Ranking with the configured `max_items` and `min_launches`.
    pub fn frequent_apps(&self) -> Vec<FrecencyScore> {
        self.top_apps(self.frecency.max_items, self.frecency.min_launches)
    }

    pub fn clear_stats(&self, scope: &ClearScope) -> LauncherResult<usize> {
        self.usage.clear_stats(scope)
    }

    /// When the host event loop should call [`Self::poll`] next.
    pub fn next_deadline(&self) -> Option<Instant> {
        self.panels.next_deadline()
    }

    /// Runs due timers; returns transitions applied by a fired auto-close.
    pub fn poll(&mut self) -> LauncherResult<Vec<PanelTransition>> {
        self.panels.poll()
    }
}
