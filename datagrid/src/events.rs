//! Grid notifications.
//!
//! Hosts subscribe to one of three [`EventKind`]s. Each kind carries its own
//! payload variant of [`GridEvent`]. Handlers run synchronously, in
//! registration order, after the grid state is fully updated.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use std::sync::atomic::{AtomicUsize, Ordering};

use log::{trace, warn};

use crate::error::GridError;
use crate::record::Record;

// =============================================================================
// EventKind
// =============================================================================

/// The notification kinds a grid emits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    /// A record was appended.
    Add,
    /// A record was removed.
    Remove,
    /// A record or cell changed. Also emitted after every add and remove.
    Change,
}

impl EventKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventKind::Add => "add",
            EventKind::Remove => "remove",
            EventKind::Change => "change",
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EventKind {
    type Err = GridError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "add" => Ok(EventKind::Add),
            "remove" => Ok(EventKind::Remove),
            "change" => Ok(EventKind::Change),
            other => Err(GridError::UnknownEventKind(other.to_string())),
        }
    }
}

// =============================================================================
// GridEvent
// =============================================================================

/// Payload of a `change` notification.
///
/// Cell edits fill every field. Structural changes (add/remove) only carry
/// the affected row's position in the current view, if it is visible there.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ChangeEvent {
    /// Position in the derived view.
    pub row: Option<usize>,
    /// Column name.
    pub col: Option<String>,
    pub old_value: Option<String>,
    pub new_value: Option<String>,
}

impl ChangeEvent {
    /// A structural change touching `row`.
    pub fn structural(row: Option<usize>) -> Self {
        Self {
            row,
            ..Default::default()
        }
    }

    /// A committed cell edit.
    pub fn cell(row: usize, col: impl Into<String>, old: String, new: String) -> Self {
        Self {
            row: Some(row),
            col: Some(col.into()),
            old_value: Some(old),
            new_value: Some(new),
        }
    }

    /// Whether this change came from a cell edit.
    pub fn is_cell_edit(&self) -> bool {
        self.col.is_some()
    }
}

/// A notification delivered to subscribers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GridEvent {
    /// `index` is the new record's store position.
    Add { index: usize, data: Record },
    /// `index` is the store position the record occupied.
    Remove { index: usize, data: Record },
    Change(ChangeEvent),
}

impl GridEvent {
    pub fn kind(&self) -> EventKind {
        match self {
            GridEvent::Add { .. } => EventKind::Add,
            GridEvent::Remove { .. } => EventKind::Remove,
            GridEvent::Change(_) => EventKind::Change,
        }
    }
}

// =============================================================================
// EventBus
// =============================================================================

/// Handle returned by a subscription, used to unsubscribe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(usize);

impl SubscriptionId {
    fn new() -> Self {
        static COUNTER: AtomicUsize = AtomicUsize::new(0);
        Self(COUNTER.fetch_add(1, Ordering::SeqCst))
    }
}

/// Event handler. Receives the event and a read-only view of the emitter's
/// state as it is after the operation completed.
pub type Handler<V> = Box<dyn FnMut(&GridEvent, &V)>;

/// Subscription registry keyed by [`EventKind`].
pub struct EventBus<V> {
    handlers: HashMap<EventKind, Vec<(SubscriptionId, Handler<V>)>>,
}

impl<V> Default for EventBus<V> {
    fn default() -> Self {
        Self {
            handlers: HashMap::new(),
        }
    }
}

impl<V> EventBus<V> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a handler for `kind`.
    pub fn on<F>(&mut self, kind: EventKind, handler: F) -> SubscriptionId
    where
        F: FnMut(&GridEvent, &V) + 'static,
    {
        let id = SubscriptionId::new();
        self.handlers
            .entry(kind)
            .or_default()
            .push((id, Box::new(handler)));
        trace!("Subscribed {:?} to '{}'", id, kind);
        id
    }

    /// Register a handler by kind name. Unknown names are rejected.
    pub fn on_named<F>(&mut self, kind: &str, handler: F) -> Result<SubscriptionId, GridError>
    where
        F: FnMut(&GridEvent, &V) + 'static,
    {
        let kind = kind.parse::<EventKind>().inspect_err(|e| warn!("{}", e))?;
        Ok(self.on(kind, handler))
    }

    /// Remove a subscription. Returns false if it was not registered.
    pub fn off(&mut self, id: SubscriptionId) -> bool {
        for list in self.handlers.values_mut() {
            let before = list.len();
            list.retain(|(sub, _)| *sub != id);
            if list.len() != before {
                trace!("Unsubscribed {:?}", id);
                return true;
            }
        }
        false
    }

    /// Deliver `event` to every handler of its kind, in registration order.
    pub fn emit(&mut self, event: &GridEvent, state: &V) {
        let kind = event.kind();
        if let Some(list) = self.handlers.get_mut(&kind) {
            trace!("Emitting '{}' to {} handler(s)", kind, list.len());
            for (_, handler) in list.iter_mut() {
                handler(event, state);
            }
        }
    }

    /// Number of handlers registered for `kind`.
    pub fn handler_count(&self, kind: EventKind) -> usize {
        self.handlers.get(&kind).map(Vec::len).unwrap_or(0)
    }
}

impl<V> fmt::Debug for EventBus<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let count: usize = self.handlers.values().map(Vec::len).sum();
        f.debug_struct("EventBus")
            .field("handler_count", &count)
            .finish()
    }
}
