//! Event registry.
//!
//! The renderer does not hold actions directly. During a traversal it calls
//! [`Context::on_event`](super::Context::on_event) and gets back an
//! [`EventId`]; when the host observes the event it dispatches that id. The
//! registry is rebuilt on every traversal, so only handlers declared by the
//! most recent traversal can fire.

use std::fmt;

use indexmap::IndexMap;
use serde::Serialize;

use crate::action::Action;
use crate::tree::Address;

/// Handle to an event handler declared during a traversal.
///
/// Ids are structural: the same declaration in the next traversal yields an
/// equal id.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct EventId(Address);

impl EventId {
    pub fn address(&self) -> &Address {
        &self.0
    }
}

impl fmt::Display for EventId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "event@{}", self.0)
    }
}

#[derive(Default)]
pub(crate) struct EventRegistry {
    handlers: IndexMap<EventId, Action>,
}

impl EventRegistry {
    pub(crate) fn register(&mut self, address: Address, action: Action) -> EventId {
        let id = EventId(address);
        self.handlers.insert(id.clone(), action);
        id
    }

    pub(crate) fn get(&self, id: &EventId) -> Option<&Action> {
        self.handlers.get(id)
    }

    pub(crate) fn ids(&self) -> impl Iterator<Item = &EventId> {
        self.handlers.keys()
    }

    pub(crate) fn len(&self) -> usize {
        self.handlers.len()
    }

    pub(crate) fn clear(&mut self) {
        self.handlers.clear();
    }
}
