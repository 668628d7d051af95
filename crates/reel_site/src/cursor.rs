//! Cursor follower
//!
//! Two elements chase the pointer: a large lens ring that trails behind
//! with slow damping, and a small dot that sits on the pointer. Holding a
//! pointer button shrinks the lens.

use std::cell::RefCell;
use std::rc::Rc;

use reel_animation::{Damped, Easing, FloatTween, Frame, ScopeHandle};
use reel_core::{ElementId, EventKind, Point, Property, Stage};
use tracing::trace;

use crate::config::CursorConfig;
use crate::error::Result;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CursorElements {
    pub lens: ElementId,
    pub dot: ElementId,
}

struct CursorState {
    elements: CursorElements,
    lens: Damped<Point>,
    dot: Damped<Point>,
    scale: FloatTween,
    press_scale: f32,
    press_duration: f32,
    primed: bool,
}

impl CursorState {
    fn press(&mut self, down: bool) {
        let to = if down { self.press_scale } else { 1.0 };
        trace!("CursorFollower: scale -> {}", to);
        self.scale.retarget(to, self.press_duration);
    }

    fn update(&mut self, frame: &Frame, stage: &mut Stage) {
        let pointer = frame.sample.pointer_px;
        if !self.primed {
            self.lens.snap_to(pointer);
            self.dot.snap_to(pointer);
            self.primed = true;
        }
        let lens = self.lens.step_to(pointer);
        let dot = self.dot.step_to(pointer);
        self.scale.tick(frame.dt);

        let CursorElements { lens: lens_el, dot: dot_el } = self.elements;
        stage.write_changed(lens_el, Property::TranslateX, lens.x);
        stage.write_changed(lens_el, Property::TranslateY, lens.y);
        stage.write_changed(lens_el, Property::Scale, self.scale.value());
        stage.write_changed(dot_el, Property::TranslateX, dot.x);
        stage.write_changed(dot_el, Property::TranslateY, dot.y);
    }
}

/// Pointer-following lens and dot
pub struct CursorFollower {
    state: Rc<RefCell<CursorState>>,
}

impl CursorFollower {
    /// Register the follower's frame callback and press listeners on `scope`
    pub fn mount(scope: &ScopeHandle, elements: CursorElements, config: &CursorConfig) -> Result<Self> {
        let state = Rc::new(RefCell::new(CursorState {
            elements,
            lens: Damped::new(Point::ZERO, config.lens_damping),
            dot: Damped::new(Point::ZERO, config.dot_damping),
            scale: FloatTween::new(1.0, 1.0, 0.0, Easing::CubicOut),
            press_scale: config.press_scale,
            press_duration: config.press_duration,
            primed: false,
        }));

        let down = state.clone();
        scope.listen(EventKind::PointerDown, move |_| down.borrow_mut().press(true))?;
        let up = state.clone();
        scope.listen(EventKind::PointerUp, move |_| up.borrow_mut().press(false))?;

        let frame_state = state.clone();
        scope.on_frame(move |frame, stage| frame_state.borrow_mut().update(frame, stage))?;

        Ok(Self { state })
    }

    /// Current lens position (trailing)
    pub fn lens(&self) -> Point {
        self.state.borrow().lens.current()
    }

    /// Current dot position
    pub fn dot(&self) -> Point {
        self.state.borrow().dot.current()
    }

    pub fn lens_scale(&self) -> f32 {
        self.state.borrow().scale.value()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reel_animation::{AnimationScope, Sample, ScrollLinkController, TimelineEngine};
    use reel_core::{EventHub, HostEvent, PointerButton, Rect, Viewport};

    struct Harness {
        engine: TimelineEngine,
        _controller: ScrollLinkController,
        hub: reel_core::SharedEventHub,
        scope: AnimationScope,
        stage: Stage,
        elements: CursorElements,
    }

    fn harness() -> Harness {
        let engine = TimelineEngine::new();
        let controller = ScrollLinkController::new();
        let hub = EventHub::shared();
        let scope = AnimationScope::new("cursor", &engine, &controller, &hub);
        let mut stage = Stage::new();
        let elements = CursorElements {
            lens: stage.insert("cursor.lens", Rect::new(0.0, 0.0, 64.0, 64.0)),
            dot: stage.insert("cursor.dot", Rect::new(0.0, 0.0, 8.0, 8.0)),
        };
        Harness {
            engine,
            _controller: controller,
            hub,
            scope,
            stage,
            elements,
        }
    }

    fn sample_at(t: f64, pointer: Point) -> Sample {
        Sample {
            pointer_px: pointer,
            ..Sample::at(t, 0.0, Viewport::new(1000.0, 800.0))
        }
    }

    #[test]
    fn test_dot_snaps_and_lens_trails() {
        let mut h = harness();
        let cursor =
            CursorFollower::mount(&h.scope.handle(), h.elements, &CursorConfig::default()).unwrap();

        h.engine.tick(&sample_at(0.0, Point::new(100.0, 100.0)), &mut h.stage);
        assert_eq!(cursor.lens(), Point::new(100.0, 100.0));

        let target = Point::new(500.0, 300.0);
        h.engine.tick(&sample_at(1.0 / 60.0, target), &mut h.stage);
        assert_eq!(cursor.dot(), target);
        assert!(cursor.lens().x > 100.0 && cursor.lens().x < 500.0);
        assert_eq!(h.stage.value(h.elements.dot, Property::TranslateX), Some(500.0));

        for i in 2..600 {
            h.engine.tick(&sample_at(i as f64 / 60.0, target), &mut h.stage);
        }
        assert_eq!(cursor.lens(), target);
    }

    #[test]
    fn test_press_shrinks_lens() {
        let mut h = harness();
        let cursor =
            CursorFollower::mount(&h.scope.handle(), h.elements, &CursorConfig::default()).unwrap();
        let p = Point::new(10.0, 10.0);

        h.hub.borrow_mut().dispatch(&HostEvent::PointerDown {
            button: PointerButton::Primary,
            x: 10.0,
            y: 10.0,
        });
        for i in 0..30 {
            h.engine.tick(&sample_at(i as f64 / 60.0, p), &mut h.stage);
        }
        assert!((cursor.lens_scale() - 0.7).abs() < 1e-6);
        assert_eq!(h.stage.value(h.elements.lens, Property::Scale), Some(0.7));

        h.hub.borrow_mut().dispatch(&HostEvent::PointerUp {
            button: PointerButton::Primary,
            x: 10.0,
            y: 10.0,
        });
        for i in 30..60 {
            h.engine.tick(&sample_at(i as f64 / 60.0, p), &mut h.stage);
        }
        assert_eq!(cursor.lens_scale(), 1.0);
    }

    #[test]
    fn test_dispose_removes_listeners_and_callback() {
        let h = harness();
        let _cursor =
            CursorFollower::mount(&h.scope.handle(), h.elements, &CursorConfig::default()).unwrap();
        assert_eq!(h.hub.borrow().listener_count(), 2);
        assert_eq!(h.engine.frame_callback_count(), 1);

        h.scope.dispose();
        assert_eq!(h.hub.borrow().listener_count(), 0);
        assert_eq!(h.engine.frame_callback_count(), 0);
    }
}
