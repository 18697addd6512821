//! Panel visibility coordinator.
//!
//! # Responsibility
//! - Own every panel's `PanelState` and its host surface.
//! - Apply toggles independently per panel, including inside a batch.
//! - Arm, re-arm and fire the single auto-close timer.
//!
//! # Invariants
//! - A batch validates all names before touching any surface.
//! - One panel's surface failure never blocks the others, and applied
//!   transitions are never rolled back.
//! - The monitor resolver is queried exactly once per `Hidden -> Visible`
//!   transition.
//! - Re-arming the auto-close cancels the previous timer; any open
//!   transition cancels a pending close.

use crate::bus::{ChangeBus, ChangeEvent};
use crate::clock::Clock;
use crate::error::{LauncherError, LauncherResult, PanelFailure};
use crate::model::item::normalize_item_id;
use crate::model::panel::{PanelState, PanelTransition, Visibility};
use crate::model::usage::UsageRecord;
use crate::panel::surface::{MonitorResolver, PanelSurface, SurfaceError};
use crate::panel::timer::{TimerHandle, TimerQueue};
use crate::repo::usage_repo::UsageRepository;
use crate::service::usage_store::UsageStore;
use log::{debug, info, warn};
use std::collections::HashSet;
use std::rc::Rc;
use std::time::{Duration, Instant};

/// Longest auto-close delay honoured; longer delays are clamped.
pub const MAX_AUTO_CLOSE_DELAY: Duration = Duration::from_secs(365 * 24 * 60 * 60);

struct PanelSlot {
    state: PanelState,
    surface: Box<dyn PanelSurface>,
}

/// Coordinates the configured panel set.
pub struct PanelCoordinator {
    panels: Vec<PanelSlot>,
    monitors: Box<dyn MonitorResolver>,
    bus: Rc<ChangeBus>,
    clock: Rc<dyn Clock>,
    timers: TimerQueue,
    auto_close: Option<TimerHandle>,
    close_delay: Duration,
}

impl PanelCoordinator {
    /// Creates a coordinator with no panels.
    ///
    /// `close_delay` is the delay `launch_and_close` arms.
    pub fn new(
        monitors: Box<dyn MonitorResolver>,
        bus: Rc<ChangeBus>,
        clock: Rc<dyn Clock>,
        close_delay: Duration,
    ) -> Self {
        Self {
            panels: Vec::new(),
            monitors,
            bus,
            clock,
            timers: TimerQueue::new(),
            auto_close: None,
            close_delay,
        }
    }

    /// Registers one hidden panel backed by `surface`.
    ///
    /// # Errors
    /// - `InvalidArgument` for a blank or already registered name.
    pub fn register_panel(
        &mut self,
        name: &str,
        surface: Box<dyn PanelSurface>,
    ) -> LauncherResult<()> {
        let name = name.trim();
        if name.is_empty() {
            return Err(LauncherError::invalid_argument("panel name must not be blank"));
        }
        if self.slot_index(name).is_some() {
            return Err(LauncherError::invalid_argument(format!(
                "panel already registered: {name}"
            )));
        }

        self.panels.push(PanelSlot {
            state: PanelState::hidden(name),
            surface,
        });
        debug!("event=panel_register module=panel status=ok panel={}", name);
        Ok(())
    }

    pub fn close_delay(&self) -> Duration {
        self.close_delay
    }

    /// Configured panel names in registration order.
    pub fn panel_names(&self) -> Vec<String> {
        self.panels
            .iter()
            .map(|slot| slot.state.name.clone())
            .collect()
    }

    pub fn panel(&self, name: &str) -> Option<PanelState> {
        self.slot_index(name)
            .map(|index| self.panels[index].state.clone())
    }

    pub fn panels(&self) -> Vec<PanelState> {
        self.panels.iter().map(|slot| slot.state.clone()).collect()
    }

    /// Flips one panel.
    ///
    /// # Errors
    /// - `InvalidArgument` for an unknown panel.
    /// - `PartialToggleFailure` when the surface rejects the change; the
    ///   panel keeps its previous state.
    pub fn toggle(&mut self, name: &str) -> LauncherResult<PanelTransition> {
        let index = self.require_slot(name)?;
        match self.apply_toggle(index) {
            Ok(transition) => {
                self.after_transitions(std::slice::from_ref(&transition));
                Ok(transition)
            }
            Err(error) => Err(LauncherError::PartialToggleFailure {
                applied: Vec::new(),
                failures: vec![PanelFailure {
                    name: self.panels[index].state.name.clone(),
                    error,
                }],
            }),
        }
    }

    /// Flips every named panel independently.
    ///
    /// # Errors
    /// - `InvalidArgument` for an unknown or repeated name; nothing toggles.
    /// - `PartialToggleFailure` listing failed panels; the rest stay applied.
    pub fn toggle_all<S: AsRef<str>>(&mut self, names: &[S]) -> LauncherResult<Vec<PanelTransition>> {
        let mut indices = Vec::with_capacity(names.len());
        let mut seen = HashSet::new();
        for name in names {
            let index = self.require_slot(name.as_ref())?;
            if !seen.insert(index) {
                return Err(LauncherError::invalid_argument(format!(
                    "panel listed twice in batch: {}",
                    name.as_ref().trim()
                )));
            }
            indices.push(index);
        }

        let mut applied = Vec::with_capacity(indices.len());
        let mut failures = Vec::new();
        for index in indices {
            match self.apply_toggle(index) {
                Ok(transition) => applied.push(transition),
                Err(error) => failures.push(PanelFailure {
                    name: self.panels[index].state.name.clone(),
                    error,
                }),
            }
        }

        self.after_transitions(&applied);
        finish_batch("toggle_all", applied, failures)
    }

    /// Hides every visible panel and broadcasts `panels-closed`.
    ///
    /// # Errors
    /// - `PartialToggleFailure` when some surfaces refuse to hide.
    pub fn close_all(&mut self) -> LauncherResult<Vec<PanelTransition>> {
        self.cancel_auto_close();

        let mut applied = Vec::new();
        let mut failures = Vec::new();
        for index in 0..self.panels.len() {
            if !self.panels[index].state.is_visible() {
                continue;
            }
            match self.apply_toggle(index) {
                Ok(transition) => applied.push(transition),
                Err(error) => failures.push(PanelFailure {
                    name: self.panels[index].state.name.clone(),
                    error,
                }),
            }
        }

        if !applied.is_empty() {
            self.bus.publish(&ChangeEvent::PanelsClosed {
                panels: applied.iter().map(|t| t.name.clone()).collect(),
            });
        }
        finish_batch("close_all", applied, failures)
    }

    /// Arms the one-shot global close, replacing any pending one.
    ///
    /// Delays above [`MAX_AUTO_CLOSE_DELAY`] are clamped to it.
    pub fn schedule_auto_close(&mut self, delay: Duration) -> TimerHandle {
        self.cancel_auto_close();
        let delay = delay.min(MAX_AUTO_CLOSE_DELAY);
        let now = self.clock.instant();
        let deadline = now.checked_add(delay).unwrap_or(now);
        let handle = self.timers.schedule_at(deadline);
        self.auto_close = Some(handle);
        debug!(
            "event=auto_close_armed module=panel status=ok delay_ms={}",
            delay.as_millis()
        );
        handle
    }

    /// Returns whether a pending close was cancelled.
    pub fn cancel_auto_close(&mut self) -> bool {
        let Some(handle) = self.auto_close.take() else {
            return false;
        };
        let cancelled = self.timers.cancel(handle);
        if cancelled {
            debug!("event=auto_close_cancelled module=panel status=ok");
        }
        cancelled
    }

    pub fn auto_close_pending(&self) -> bool {
        self.auto_close
            .is_some_and(|handle| self.timers.is_pending(handle))
    }

    /// When the host should call [`Self::poll`] next.
    pub fn next_deadline(&self) -> Option<Instant> {
        self.timers.next_deadline()
    }

    /// Fires due timers. Returns the transitions a fired close applied.
    pub fn poll(&mut self) -> LauncherResult<Vec<PanelTransition>> {
        let due = self.timers.pop_due(self.clock.instant());
        let fired = match self.auto_close {
            Some(handle) => due.contains(&handle),
            None => false,
        };
        if !fired {
            return Ok(Vec::new());
        }

        self.auto_close = None;
        info!("event=auto_close_fired module=panel status=ok");
        self.close_all()
    }

    /// Records the launch, then arms the auto-close.
    ///
    /// The close is armed even when recording fails; the recording error is
    /// still returned. A blank id fails before either happens.
    pub fn launch_and_close<R: UsageRepository>(
        &mut self,
        usage: &UsageStore<R>,
        item_id: &str,
    ) -> LauncherResult<UsageRecord> {
        let item_id = normalize_item_id(item_id)?;
        let recorded = usage.record_launch(&item_id);
        self.schedule_auto_close(self.close_delay);

        if let Err(err) = &recorded {
            warn!(
                "event=launch_and_close module=panel status=degraded item_id={} error_code={} error={}",
                item_id,
                err.code(),
                err
            );
        }
        recorded
    }

    fn slot_index(&self, name: &str) -> Option<usize> {
        let name = name.trim();
        self.panels.iter().position(|slot| slot.state.name == name)
    }

    fn require_slot(&self, name: &str) -> LauncherResult<usize> {
        self.slot_index(name).ok_or_else(|| {
            LauncherError::invalid_argument(format!("unknown panel: {}", name.trim()))
        })
    }

    fn apply_toggle(&mut self, index: usize) -> Result<PanelTransition, SurfaceError> {
        let slot = &mut self.panels[index];
        let from = slot.state.visibility;

        match from {
            Visibility::Hidden => {
                let hint = self.monitors.focused_monitor();
                slot.surface.show(&hint)?;
                slot.state.placement_hint = Some(hint);
            }
            Visibility::Visible => slot.surface.hide()?,
        }
        slot.state.visibility = from.flipped();

        debug!(
            "event=panel_toggle module=panel status=ok panel={} from={} to={}",
            slot.state.name,
            from.as_str(),
            slot.state.visibility.as_str()
        );
        Ok(PanelTransition {
            name: slot.state.name.clone(),
            from,
            to: slot.state.visibility,
        })
    }

    fn after_transitions(&mut self, applied: &[PanelTransition]) {
        if applied.iter().any(PanelTransition::is_open) {
            self.cancel_auto_close();
        }
    }
}

fn finish_batch(
    action: &str,
    applied: Vec<PanelTransition>,
    failures: Vec<PanelFailure>,
) -> LauncherResult<Vec<PanelTransition>> {
    if failures.is_empty() {
        return Ok(applied);
    }

    for failure in &failures {
        warn!(
            "event={} module=panel status=partial panel={} error={}",
            action, failure.name, failure.error
        );
    }
    Err(LauncherError::PartialToggleFailure { applied, failures })
}

#[cfg(test)]
mod tests {
    use super::PanelCoordinator;
    use crate::bus::ChangeBus;
    use crate::clock::ManualClock;
    use crate::error::LauncherError;
    use crate::model::panel::{PlacementHint, Visibility};
    use crate::panel::surface::{HeadlessSurface, StaticMonitorResolver};
    use std::rc::Rc;
    use std::time::Duration;

    fn coordinator() -> PanelCoordinator {
        let mut coordinator = PanelCoordinator::new(
            Box::new(StaticMonitorResolver::new(PlacementHint::new("DP-1"))),
            Rc::new(ChangeBus::new()),
            Rc::new(ManualClock::new(0)),
            Duration::from_millis(300),
        );
        for name in ["A", "B"] {
            coordinator
                .register_panel(name, Box::new(HeadlessSurface))
                .expect("register panel");
        }
        coordinator
    }

    #[test]
    fn rejects_duplicate_and_blank_panel_names() {
        let mut coordinator = coordinator();
        let duplicate = coordinator
            .register_panel("A", Box::new(HeadlessSurface))
            .expect_err("duplicate must fail");
        assert!(matches!(duplicate, LauncherError::InvalidArgument(_)));

        let blank = coordinator
            .register_panel("  ", Box::new(HeadlessSurface))
            .expect_err("blank must fail");
        assert!(matches!(blank, LauncherError::InvalidArgument(_)));
    }

    #[test]
    fn toggle_flips_only_named_panel() {
        let mut coordinator = coordinator();
        let transition = coordinator.toggle("A").expect("toggle A");

        assert!(transition.is_open());
        assert_eq!(
            coordinator.panel("A").expect("A").visibility,
            Visibility::Visible
        );
        assert_eq!(
            coordinator.panel("B").expect("B").visibility,
            Visibility::Hidden
        );
    }

    #[test]
    fn batch_with_unknown_name_touches_nothing() {
        let mut coordinator = coordinator();
        let err = coordinator
            .toggle_all(&["A", "missing"])
            .expect_err("unknown panel must fail");

        assert!(matches!(err, LauncherError::InvalidArgument(_)));
        assert!(coordinator.panels().iter().all(|p| !p.is_visible()));
    }

    #[test]
    fn batch_with_repeated_name_is_rejected() {
        let mut coordinator = coordinator();
        let err = coordinator
            .toggle_all(&["A", "A"])
            .expect_err("repeated panel must fail");
        assert!(matches!(err, LauncherError::InvalidArgument(_)));
    }
}
