//! Animation scopes
//!
//! A scope owns everything a page section registers: timelines, scroll
//! regions, event listeners, frame callbacks, and arbitrary cleanup
//! closures. Disposing the scope releases all of them together, so a
//! section that unmounts can never leave a listener or an animation behind.
//!
//! Disposal is idempotent and also runs on drop. Registering through a
//! disposed scope releases the item on the spot and reports
//! [`AnimationError::ScopeDisposed`].

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use reel_core::{EventHubHandle, EventKind, HostEvent, ListenerId, SharedEventHub, Stage};
use tracing::{debug, trace};

use crate::engine::{EngineHandle, Frame, FrameCallbackHandle, TimelineEngine, TimelineHandle};
use crate::error::{AnimationError, Result};
use crate::scroll_link::{ControllerHandle, RegionHandle, ScrollLinkController, ScrollRegion};
use crate::timeline::Timeline;

/// Something a scope releases on dispose
pub enum Registration {
    /// Cancelled; written values stay
    Timeline(TimelineHandle),
    /// Removed from its controller; written values stay
    Region(RegionHandle),
    /// Removed from its hub
    Listener(EventHubHandle, ListenerId),
    /// Unregistered from the engine
    FrameCallback(FrameCallbackHandle),
    /// Run once
    Cleanup(Box<dyn FnOnce()>),
    /// A child scope, disposed with its parent
    Scope(ChildScope),
}

/// Weak link from a parent scope to a child
pub struct ChildScope(Weak<RefCell<ScopeInner>>);

impl ChildScope {
    fn is_live(&self) -> bool {
        self.0
            .upgrade()
            .is_some_and(|child| !child.borrow().disposed)
    }
}

impl Registration {
    fn release(self) {
        match self {
            Registration::Timeline(handle) => handle.cancel(),
            Registration::Region(handle) => {
                handle.remove();
            }
            Registration::Listener(hub, id) => {
                hub.remove_listener(id);
            }
            Registration::FrameCallback(handle) => {
                handle.remove();
            }
            Registration::Cleanup(cleanup) => cleanup(),
            Registration::Scope(ChildScope(child)) => {
                if let Some(child) = child.upgrade() {
                    dispose_inner(&child);
                }
            }
        }
    }
}

impl From<TimelineHandle> for Registration {
    fn from(handle: TimelineHandle) -> Self {
        Registration::Timeline(handle)
    }
}

impl From<RegionHandle> for Registration {
    fn from(handle: RegionHandle) -> Self {
        Registration::Region(handle)
    }
}

impl From<FrameCallbackHandle> for Registration {
    fn from(handle: FrameCallbackHandle) -> Self {
        Registration::FrameCallback(handle)
    }
}

struct ScopeInner {
    label: String,
    registrations: Vec<Registration>,
    disposed: bool,
}

fn dispose_inner(inner: &RefCell<ScopeInner>) {
    let (label, registrations) = {
        let mut inner = inner.borrow_mut();
        if inner.disposed {
            return;
        }
        inner.disposed = true;
        (inner.label.clone(), std::mem::take(&mut inner.registrations))
    };
    debug!(
        "AnimationScope '{}': disposing {} registrations",
        label,
        registrations.len()
    );
    // Release in reverse registration order
    for registration in registrations.into_iter().rev() {
        registration.release();
    }
}

/// Weak, cloneable access to a scope's registration API
///
/// Closures that need to register more work later (an intro that schedules
/// its exit, a gallery rebuilt when data arrives) hold one of these instead
/// of the scope itself.
#[derive(Clone)]
pub struct ScopeHandle {
    inner: Weak<RefCell<ScopeInner>>,
    engine: EngineHandle,
    controller: ControllerHandle,
    hub: EventHubHandle,
}

impl ScopeHandle {
    /// Track a registration; released immediately if the scope is disposed
    pub fn register(&self, registration: impl Into<Registration>) -> Result<()> {
        let registration = registration.into();
        match self.inner.upgrade() {
            Some(inner) if !inner.borrow().disposed => {
                inner.borrow_mut().registrations.push(registration);
                Ok(())
            }
            _ => {
                trace!("ScopeHandle: releasing registration on disposed scope");
                registration.release();
                Err(AnimationError::ScopeDisposed)
            }
        }
    }

    /// Schedule a timeline owned by this scope
    pub fn schedule(&self, timeline: Timeline) -> Result<TimelineHandle> {
        self.ensure_live()?;
        let handle = self.engine.schedule(timeline)?;
        self.register(handle.clone())?;
        Ok(handle)
    }

    /// Register a scroll region owned by this scope
    pub fn add_region(&self, region: ScrollRegion) -> Result<RegionHandle> {
        self.ensure_live()?;
        let handle = self.controller.add_region(region)?;
        self.register(handle.clone())?;
        Ok(handle)
    }

    /// Add an event listener owned by this scope
    pub fn listen<F>(&self, kind: EventKind, callback: F) -> Result<ListenerId>
    where
        F: FnMut(&HostEvent) + 'static,
    {
        self.ensure_live()?;
        let id = self
            .hub
            .add_listener(kind, callback)
            .ok_or(AnimationError::EngineDropped)?;
        self.register(Registration::Listener(self.hub.clone(), id))?;
        Ok(id)
    }

    /// Register a per-frame callback owned by this scope
    pub fn on_frame<F>(&self, callback: F) -> Result<FrameCallbackHandle>
    where
        F: FnMut(&Frame, &mut Stage) + 'static,
    {
        self.ensure_live()?;
        let handle = self.engine.on_frame(callback)?;
        self.register(handle.clone())?;
        Ok(handle)
    }

    /// Run `cleanup` when the scope is disposed
    ///
    /// On a disposed scope the closure runs immediately.
    pub fn on_dispose<F>(&self, cleanup: F) -> Result<()>
    where
        F: FnOnce() + 'static,
    {
        self.register(Registration::Cleanup(Box::new(cleanup)))
    }

    /// Create a scope that is disposed together with this one
    ///
    /// Links to children that were already disposed or dropped are pruned.
    pub fn child(&self, label: impl Into<String>) -> Result<AnimationScope> {
        self.ensure_live()?;
        if let Some(inner) = self.inner.upgrade() {
            inner.borrow_mut().registrations.retain(|registration| match registration {
                Registration::Scope(child) => child.is_live(),
                _ => true,
            });
        }
        let child = AnimationScope::from_parts(
            label.into(),
            self.engine.clone(),
            self.controller.clone(),
            self.hub.clone(),
        );
        self.register(Registration::Scope(ChildScope(Rc::downgrade(&child.inner))))?;
        Ok(child)
    }

    pub fn is_disposed(&self) -> bool {
        self.inner
            .upgrade()
            .map(|inner| inner.borrow().disposed)
            .unwrap_or(true)
    }

    /// Dispose the scope this handle points at
    pub fn dispose(&self) {
        if let Some(inner) = self.inner.upgrade() {
            dispose_inner(&inner);
        }
    }

    fn ensure_live(&self) -> Result<()> {
        if self.is_disposed() {
            Err(AnimationError::ScopeDisposed)
        } else {
            Ok(())
        }
    }
}

/// Owner of a set of registrations, released together
pub struct AnimationScope {
    inner: Rc<RefCell<ScopeInner>>,
    handle: ScopeHandle,
}

impl AnimationScope {
    pub fn new(
        label: impl Into<String>,
        engine: &TimelineEngine,
        controller: &ScrollLinkController,
        hub: &SharedEventHub,
    ) -> Self {
        Self::from_parts(
            label.into(),
            engine.handle(),
            controller.handle(),
            EventHubHandle::new(hub),
        )
    }

    fn from_parts(
        label: String,
        engine: EngineHandle,
        controller: ControllerHandle,
        hub: EventHubHandle,
    ) -> Self {
        let inner = Rc::new(RefCell::new(ScopeInner {
            label,
            registrations: Vec::new(),
            disposed: false,
        }));
        let handle = ScopeHandle {
            inner: Rc::downgrade(&inner),
            engine,
            controller,
            hub,
        };
        Self { inner, handle }
    }

    /// Get a weak handle for closures that register later
    pub fn handle(&self) -> ScopeHandle {
        self.handle.clone()
    }

    pub fn label(&self) -> String {
        self.inner.borrow().label.clone()
    }

    pub fn register(&self, registration: impl Into<Registration>) -> Result<()> {
        self.handle.register(registration)
    }

    pub fn schedule(&self, timeline: Timeline) -> Result<TimelineHandle> {
        self.handle.schedule(timeline)
    }

    pub fn add_region(&self, region: ScrollRegion) -> Result<RegionHandle> {
        self.handle.add_region(region)
    }

    pub fn listen<F>(&self, kind: EventKind, callback: F) -> Result<ListenerId>
    where
        F: FnMut(&HostEvent) + 'static,
    {
        self.handle.listen(kind, callback)
    }

    pub fn on_frame<F>(&self, callback: F) -> Result<FrameCallbackHandle>
    where
        F: FnMut(&Frame, &mut Stage) + 'static,
    {
        self.handle.on_frame(callback)
    }

    pub fn on_dispose<F>(&self, cleanup: F) -> Result<()>
    where
        F: FnOnce() + 'static,
    {
        self.handle.on_dispose(cleanup)
    }

    pub fn child(&self, label: impl Into<String>) -> Result<AnimationScope> {
        self.handle.child(label)
    }

    /// Number of live registrations
    pub fn len(&self) -> usize {
        self.inner.borrow().registrations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn is_disposed(&self) -> bool {
        self.inner.borrow().disposed
    }

    /// Release every registration. Safe to call more than once.
    pub fn dispose(&self) {
        dispose_inner(&self.inner);
    }
}

impl Drop for AnimationScope {
    fn drop(&mut self) {
        self.dispose();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keyframe::Keyframe;
    use crate::sampler::Sample;
    use reel_core::{EventHub, Property, Rect, Viewport};
    use std::cell::Cell;

    struct Fixture {
        engine: TimelineEngine,
        controller: ScrollLinkController,
        hub: SharedEventHub,
        stage: Stage,
    }

    fn fixture() -> Fixture {
        Fixture {
            engine: TimelineEngine::new(),
            controller: ScrollLinkController::new(),
            hub: EventHub::shared(),
            stage: Stage::new(),
        }
    }

    impl Fixture {
        fn scope(&self, label: &str) -> AnimationScope {
            AnimationScope::new(label, &self.engine, &self.controller, &self.hub)
        }
    }

    #[test]
    fn test_dispose_releases_everything() {
        let mut f = fixture();
        let el = f.stage.insert("el", Rect::new(0.0, 0.0, 100.0, 100.0));
        let scope = f.scope("section");
        let cleaned = Rc::new(Cell::new(0));

        let timeline = scope
            .schedule(Timeline::new().add(Keyframe::to(1.0).set(el, Property::Opacity, 0.0)))
            .unwrap();
        let region = scope
            .add_region(ScrollRegion::horizontal_pan(el, el))
            .unwrap();
        scope.listen(EventKind::PointerMove, |_| {}).unwrap();
        scope.listen(EventKind::PointerDown, |_| {}).unwrap();
        let frame = scope.on_frame(|_, _| {}).unwrap();
        let c = cleaned.clone();
        scope.on_dispose(move || c.set(c.get() + 1)).unwrap();
        assert_eq!(scope.len(), 6);
        assert_eq!(f.hub.borrow().listener_count(), 2);

        scope.dispose();
        assert!(!timeline.is_scheduled());
        assert!(!region.is_registered());
        assert!(!frame.is_registered());
        assert_eq!(f.hub.borrow().listener_count(), 0);
        assert_eq!(f.engine.timeline_count(), 0);
        assert_eq!(f.controller.region_count(), 0);
        assert_eq!(cleaned.get(), 1);

        scope.dispose();
        drop(scope);
        assert_eq!(cleaned.get(), 1);
        let (added, removed) = f.hub.borrow().totals();
        assert_eq!(added, removed);
    }

    #[test]
    fn test_register_after_dispose_releases_immediately() {
        let f = fixture();
        let scope = f.scope("late");
        let handle = scope.handle();
        scope.dispose();

        assert!(matches!(
            handle.schedule(Timeline::new()),
            Err(AnimationError::ScopeDisposed)
        ));
        assert_eq!(f.engine.timeline_count(), 0);

        assert!(matches!(
            handle.listen(EventKind::Scroll, |_| {}),
            Err(AnimationError::ScopeDisposed)
        ));
        assert_eq!(f.hub.borrow().listener_count(), 0);

        // A handle created elsewhere is cancelled on the spot
        let stray = f.engine.schedule(Timeline::new().paused());
        assert_eq!(
            handle.register(stray.clone()),
            Err(AnimationError::ScopeDisposed)
        );
        assert!(!stray.is_scheduled());

        let ran = Rc::new(Cell::new(false));
        let r = ran.clone();
        assert!(handle.on_dispose(move || r.set(true)).is_err());
        assert!(ran.get());
    }

    #[test]
    fn test_drop_disposes() {
        let f = fixture();
        {
            let scope = f.scope("temp");
            scope.on_frame(|_, _| {}).unwrap();
            scope.listen(EventKind::Resize, |_| {}).unwrap();
            assert_eq!(f.engine.frame_callback_count(), 1);
        }
        assert_eq!(f.engine.frame_callback_count(), 0);
        assert_eq!(f.hub.borrow().listener_count(), 0);
    }

    #[test]
    fn test_child_disposed_with_parent() {
        let f = fixture();
        let parent = f.scope("page");
        let child = parent.child("gallery").unwrap();
        child.on_frame(|_, _| {}).unwrap();
        assert_eq!(f.engine.frame_callback_count(), 1);

        parent.dispose();
        assert!(child.is_disposed());
        assert_eq!(f.engine.frame_callback_count(), 0);
    }

    #[test]
    fn test_rebuilt_children_do_not_accumulate() {
        let f = fixture();
        let parent = f.scope("page");
        parent.on_dispose(|| {}).unwrap();

        for _ in 0..5 {
            let child = parent.child("gallery").unwrap();
            child.dispose();
        }
        drop(parent.child("dropped").unwrap());
        let live = parent.child("gallery").unwrap();
        assert_eq!(parent.len(), 2);

        parent.dispose();
        assert!(live.is_disposed());
    }

    #[test]
    fn test_dispose_from_inside_frame_callback() {
        let mut f = fixture();
        let scope = f.scope("self-closing");
        let handle = scope.handle();
        let frames = Rc::new(Cell::new(0));
        let n = frames.clone();
        scope
            .on_frame(move |_, _| {
                n.set(n.get() + 1);
                handle.dispose();
            })
            .unwrap();

        let viewport = Viewport::default();
        for i in 0..3 {
            f.engine
                .tick(&Sample::at(i as f64 * 0.016, 0.0, viewport), &mut f.stage);
        }
        assert_eq!(frames.get(), 1);
        assert!(scope.is_disposed());
        assert_eq!(f.engine.frame_callback_count(), 0);
    }
}
