//! Host events and the listener registry
//!
//! The host forwards window and input events here. Components subscribe by
//! event kind; every `add_listener` must be matched by exactly one
//! `remove_listener`, which the animation scope takes care of.

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use slotmap::{new_key_type, SlotMap};
use tracing::trace;

use crate::geometry::Point;

new_key_type! {
    /// Handle to a registered listener
    pub struct ListenerId;
}

/// Pointer buttons
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PointerButton {
    Primary,
    Secondary,
    Middle,
}

/// Events forwarded by the host
#[derive(Clone, Debug, PartialEq)]
pub enum HostEvent {
    /// Pointer moved to a position in viewport pixels
    PointerMoved { x: f32, y: f32 },
    /// Pointer button pressed
    PointerDown { button: PointerButton, x: f32, y: f32 },
    /// Pointer button released
    PointerUp { button: PointerButton, x: f32, y: f32 },
    /// Document scrolled to a new vertical offset
    Scrolled { offset_y: f32 },
    /// Viewport resized
    Resized { width: f32, height: f32 },
}

impl HostEvent {
    pub fn kind(&self) -> EventKind {
        match self {
            HostEvent::PointerMoved { .. } => EventKind::PointerMove,
            HostEvent::PointerDown { .. } => EventKind::PointerDown,
            HostEvent::PointerUp { .. } => EventKind::PointerUp,
            HostEvent::Scrolled { .. } => EventKind::Scroll,
            HostEvent::Resized { .. } => EventKind::Resize,
        }
    }

    /// Pointer position carried by the event, if any
    pub fn pointer(&self) -> Option<Point> {
        match *self {
            HostEvent::PointerMoved { x, y }
            | HostEvent::PointerDown { x, y, .. }
            | HostEvent::PointerUp { x, y, .. } => Some(Point::new(x, y)),
            _ => None,
        }
    }
}

/// Event kinds listeners subscribe to
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EventKind {
    PointerMove,
    PointerDown,
    PointerUp,
    Scroll,
    Resize,
}

/// Listener callback type
pub type Listener = Box<dyn FnMut(&HostEvent)>;

struct ListenerEntry {
    kind: EventKind,
    callback: Listener,
}

/// Registry of event listeners
///
/// Listeners must not register or remove listeners from inside a callback;
/// the hub is borrowed for the whole dispatch.
#[derive(Default)]
pub struct EventHub {
    listeners: SlotMap<ListenerId, ListenerEntry>,
    added: u64,
    removed: u64,
}

/// Shared handle to an event hub
pub type SharedEventHub = Rc<RefCell<EventHub>>;

impl EventHub {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a hub wrapped for sharing with scopes
    pub fn shared() -> SharedEventHub {
        Rc::new(RefCell::new(Self::new()))
    }

    pub fn add_listener<F>(&mut self, kind: EventKind, callback: F) -> ListenerId
    where
        F: FnMut(&HostEvent) + 'static,
    {
        self.added += 1;
        let id = self.listeners.insert(ListenerEntry {
            kind,
            callback: Box::new(callback),
        });
        trace!("EventHub: add {:?} listener {:?}", kind, id);
        id
    }

    /// Remove a listener. Returns false if it was already removed.
    pub fn remove_listener(&mut self, id: ListenerId) -> bool {
        let removed = self.listeners.remove(id).is_some();
        if removed {
            self.removed += 1;
            trace!("EventHub: remove listener {:?}", id);
        }
        removed
    }

    /// Deliver an event to every listener of its kind, in registration order
    pub fn dispatch(&mut self, event: &HostEvent) {
        let kind = event.kind();
        for (_, entry) in self.listeners.iter_mut() {
            if entry.kind == kind {
                (entry.callback)(event);
            }
        }
    }

    /// Number of live listeners
    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }

    /// Number of live listeners for one kind
    pub fn count_for(&self, kind: EventKind) -> usize {
        self.listeners.values().filter(|e| e.kind == kind).count()
    }

    /// (added, removed) totals since creation
    pub fn totals(&self) -> (u64, u64) {
        (self.added, self.removed)
    }
}

/// Weak handle used by scopes so they never keep the hub alive
#[derive(Clone)]
pub struct EventHubHandle {
    inner: Weak<RefCell<EventHub>>,
}

impl EventHubHandle {
    pub fn new(hub: &SharedEventHub) -> Self {
        Self {
            inner: Rc::downgrade(hub),
        }
    }

    pub fn add_listener<F>(&self, kind: EventKind, callback: F) -> Option<ListenerId>
    where
        F: FnMut(&HostEvent) + 'static,
    {
        self.inner
            .upgrade()
            .map(|hub| hub.borrow_mut().add_listener(kind, callback))
    }

    pub fn remove_listener(&self, id: ListenerId) -> bool {
        self.inner
            .upgrade()
            .map(|hub| hub.borrow_mut().remove_listener(id))
            .unwrap_or(false)
    }

    pub fn is_alive(&self) -> bool {
        self.inner.strong_count() > 0
    }
}
