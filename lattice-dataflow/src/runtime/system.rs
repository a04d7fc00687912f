//! Runtime
//!
//! The runtime owns everything that outlives a traversal: the state store,
//! the event handlers declared by the last traversal and the configuration.
//! It is an explicit value; a program may run any number of independent
//! runtimes side by side.
//!
//! # How a Traversal Works
//!
//! 1. The store starts a new stamp and the event registry is emptied.
//!
//! 2. The UI function runs with a fresh [`Context`]. Every state access
//!    resolves its slot and stamps it as visited.
//!
//! 3. The store sweeps every slot the traversal did not visit. Signals still
//!    pointing at swept cells read as empty from now on.
//!
//! Traversals never overlap: [`Runtime::traverse`] takes `&mut self`.

use serde::Serialize;

use super::context::Context;
use super::events::{EventId, EventRegistry};
use crate::action::Action;
use crate::config::RuntimeConfig;
use crate::error::DispatchError;
use crate::tree::{SlotSummary, StateStore};

/// Counters reported by [`Runtime::traverse`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct TraversalStats {
    pub traversal: u64,
    pub visited: usize,
    pub mounted: usize,
    pub unmounted: usize,
    pub handlers: usize,
}

/// Owner of persistent state across traversals.
pub struct Runtime {
    config: RuntimeConfig,
    store: StateStore,
    events: EventRegistry,

    /// Set during a traversal when a slot wants the host to traverse again.
    refresh_requested: bool,
}

impl Runtime {
    pub fn new(config: RuntimeConfig) -> Self {
        Self {
            config,
            store: StateStore::new(),
            events: EventRegistry::default(),
            refresh_requested: false,
        }
    }

    /// Run the UI function once and sweep state it did not visit.
    pub fn traverse<F>(&mut self, ui: F) -> TraversalStats
    where
        F: FnOnce(&mut Context<'_>),
    {
        let traversal = self.store.begin();
        self.events.clear();
        self.refresh_requested = false;

        {
            let mut ctx = Context::new(
                &mut self.store,
                &mut self.events,
                &self.config,
                &mut self.refresh_requested,
                traversal,
            );
            ui(&mut ctx);
        }

        let sweep = self.store.sweep();
        let stats = TraversalStats {
            traversal,
            visited: sweep.visited,
            mounted: sweep.mounted,
            unmounted: sweep.unmounted,
            handlers: self.events.len(),
        };
        tracing::debug!(
            traversal,
            visited = stats.visited,
            mounted = stats.mounted,
            unmounted = stats.unmounted,
            handlers = stats.handlers,
            "traversal complete"
        );
        stats
    }

    /// Whether state changed or a slot asked for a refresh since the last
    /// traversal began.
    pub fn needs_traversal(&self) -> bool {
        self.store.has_changed() || self.refresh_requested
    }

    /// Trigger the handler registered under `event` by the last traversal.
    ///
    /// A handler that is not ready does nothing; the refusal is returned so
    /// the host can report it, but it is not an error condition.
    pub fn dispatch(&self, event: &EventId) -> Result<(), DispatchError> {
        let action = self
            .events
            .get(event)
            .ok_or_else(|| DispatchError::UnknownEvent(event.clone()))?;

        action.trigger().map_err(|err| {
            tracing::debug!(%event, blocker = %err.blocker, "event handler not ready");
            DispatchError::from(err)
        })
    }

    pub fn handler(&self, event: &EventId) -> Option<&Action> {
        self.events.get(event)
    }

    /// Events declared by the last traversal, in declaration order.
    pub fn events(&self) -> impl Iterator<Item = &EventId> {
        self.events.ids()
    }

    pub fn store(&self) -> &StateStore {
        &self.store
    }

    pub fn config(&self) -> &RuntimeConfig {
        &self.config
    }

    /// Mounted slots, in mount order.
    pub fn snapshot(&self) -> Vec<SlotSummary> {
        self.store.snapshot()
    }

    /// [`snapshot`](Self::snapshot) rendered as pretty JSON.
    pub fn snapshot_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(&self.snapshot())
    }
}

impl Default for Runtime {
    fn default() -> Self {
        Self::new(RuntimeConfig::default())
    }
}

type Ui = Box<dyn FnMut(&mut Context<'_>)>;

/// A runtime bundled with the UI function it drives.
///
/// This is the shape a host loop wants: construct once, then feed it events
/// and timer ticks. The initial traversal runs on construction.
pub struct System {
    runtime: Runtime,
    ui: Ui,
    last: TraversalStats,
}

impl System {
    pub fn new<F>(config: RuntimeConfig, ui: F) -> Self
    where
        F: FnMut(&mut Context<'_>) + 'static,
    {
        let mut system = Self {
            runtime: Runtime::new(config),
            ui: Box::new(ui),
            last: TraversalStats::default(),
        };
        system.refresh();
        system
    }

    /// Run a traversal unconditionally.
    pub fn refresh(&mut self) -> TraversalStats {
        let ui = &mut self.ui;
        self.last = self.runtime.traverse(|ctx| ui(ctx));
        self.last
    }

    /// Run a traversal if state changed or a slot asked for one.
    pub fn refresh_if_needed(&mut self) -> Option<TraversalStats> {
        if self.runtime.needs_traversal() {
            Some(self.refresh())
        } else {
            None
        }
    }

    /// Dispatch an event, then refresh if it changed anything and
    /// `auto_refresh` is on.
    pub fn dispatch(&mut self, event: &EventId) -> Result<(), DispatchError> {
        self.runtime.dispatch(event)?;
        if self.runtime.config().auto_refresh {
            self.refresh_if_needed();
        }
        Ok(())
    }

    pub fn runtime(&self) -> &Runtime {
        &self.runtime
    }

    pub fn last_traversal(&self) -> TraversalStats {
        self.last
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::signal::value;

    #[test]
    fn traversal_reports_mounts_and_unmounts() {
        let mut runtime = Runtime::default();
        let first = runtime.traverse(|ctx| {
            ctx.state(0);
            ctx.state(0);
        });
        assert_eq!(first.traversal, 1);
        assert_eq!(first.mounted, 2);

        let second = runtime.traverse(|ctx| {
            ctx.state(0);
        });
        assert_eq!(second.traversal, 2);
        assert_eq!(second.visited, 1);
        assert_eq!(second.unmounted, 1);
    }

    #[test]
    fn handlers_only_live_for_one_traversal() {
        let mut runtime = Runtime::default();
        let mut event = None;
        runtime.traverse(|ctx| {
            let count = ctx.state(0);
            event = Some(ctx.on_event(&count.increment()));
        });
        let event = event.unwrap();
        runtime.dispatch(&event).unwrap();
        assert!(runtime.needs_traversal());

        runtime.traverse(|ctx| {
            ctx.state(0);
        });
        assert_eq!(
            runtime.dispatch(&event),
            Err(DispatchError::UnknownEvent(event.clone()))
        );
    }

    #[test]
    fn system_refreshes_after_mutating_dispatch() {
        use parking_lot::Mutex;
        use std::sync::Arc;

        let shown = Arc::new(Mutex::new((None, None)));
        let screen = shown.clone();
        let mut system = System::new(RuntimeConfig::default(), move |ctx| {
            let count = ctx.state(0);
            let add = ctx.on_event(&count.add_assign(&value(5)));
            *screen.lock() = (count.read(), Some(add));
        });
        assert_eq!(system.last_traversal().traversal, 1);

        let add = shown.lock().1.clone().unwrap();
        system.dispatch(&add).unwrap();
        assert_eq!(shown.lock().0, Some(5));
        assert_eq!(system.last_traversal().traversal, 2);

        assert_eq!(system.refresh_if_needed(), None);
    }

    #[test]
    fn snapshot_serializes_mounted_slots() {
        let mut runtime = Runtime::default();
        runtime.traverse(|ctx| {
            ctx.state(1u8).write(2);
        });
        let json = runtime.snapshot_json().unwrap();
        assert!(json.contains("\"slot\": 0"));
        assert!(json.contains("\"updated\""));
        assert!(json.contains("u8"));
    }
}
