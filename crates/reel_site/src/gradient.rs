//! Background gradient uniforms
//!
//! The page background is a shader fed four uniforms: elapsed time, the
//! normalized pointer, the viewport resolution, and a damped distance from
//! the pointer to a focus point. The distance also drives the background
//! element's color mix so hosts without a shader still get the effect.

use std::cell::RefCell;
use std::f32::consts::SQRT_2;
use std::rc::Rc;

use reel_animation::{Damped, Frame, ScopeHandle};
use reel_core::{ElementId, EventKind, HostEvent, Property, Size, Stage, Vec2};
use tracing::trace;

use crate::config::GradientConfig;
use crate::error::Result;

/// Inputs of the background shader
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct GradientUniforms {
    /// Seconds since the page started
    pub time: f32,
    /// Pointer in normalized coordinates, [-1, 1]
    pub mouse: Vec2,
    pub resolution: Size,
    /// Damped pointer-to-focus distance in normalized units
    pub distance: f32,
}

struct GradientState {
    element: ElementId,
    focus: Vec2,
    distance: Damped<f32>,
    uniforms: GradientUniforms,
}

impl GradientState {
    fn update(&mut self, frame: &Frame, stage: &mut Stage) {
        let focus = self.focus;
        let distance = self
            .distance
            .step(&frame.sample, |s| s.pointer.distance(focus));

        self.uniforms.time = frame.sample.time();
        self.uniforms.mouse = frame.sample.pointer;
        self.uniforms.distance = distance;

        // Corners of the normalized square are SQRT_2 from the center
        let mix = 1.0 - (distance / SQRT_2).clamp(0.0, 1.0);
        stage.write_changed(self.element, Property::ColorMix, mix);
    }

    fn resize(&mut self, width: f32, height: f32) {
        let resolution = Size::new(width, height);
        if resolution.is_empty() {
            return;
        }
        trace!("BackgroundGradient: resolution {:?}", resolution);
        self.uniforms.resolution = resolution;
    }
}

/// Keeps the background shader uniforms current
pub struct BackgroundGradient {
    state: Rc<RefCell<GradientState>>,
}

impl BackgroundGradient {
    pub fn mount(
        scope: &ScopeHandle,
        element: ElementId,
        resolution: Size,
        config: &GradientConfig,
    ) -> Result<Self> {
        let focus = Vec2::new(config.focus[0], config.focus[1]);
        let state = Rc::new(RefCell::new(GradientState {
            element,
            focus,
            distance: Damped::new(Vec2::ZERO.distance(focus), config.distance_damping),
            uniforms: GradientUniforms {
                resolution,
                ..GradientUniforms::default()
            },
        }));

        let on_resize = state.clone();
        scope.listen(EventKind::Resize, move |event| {
            if let HostEvent::Resized { width, height } = *event {
                on_resize.borrow_mut().resize(width, height);
            }
        })?;

        let on_frame = state.clone();
        scope.on_frame(move |frame, stage| on_frame.borrow_mut().update(frame, stage))?;

        Ok(Self { state })
    }

    pub fn uniforms(&self) -> GradientUniforms {
        self.state.borrow().uniforms
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reel_animation::{AnimationScope, Sample, ScrollLinkController, TimelineEngine};
    use reel_core::{EventHub, Rect, Viewport};

    #[test]
    fn test_uniforms_follow_pointer_and_resize() {
        let engine = TimelineEngine::new();
        let controller = ScrollLinkController::new();
        let hub = EventHub::shared();
        let scope = AnimationScope::new("gradient", &engine, &controller, &hub);
        let mut stage = Stage::new();
        let background = stage.insert("background", Rect::new(0.0, 0.0, 1000.0, 800.0));
        let config = GradientConfig {
            distance_damping: 1.0,
            ..GradientConfig::default()
        };
        let gradient =
            BackgroundGradient::mount(&scope.handle(), background, Size::new(1000.0, 800.0), &config)
                .unwrap();

        let viewport = Viewport::new(1000.0, 800.0);
        let sample = Sample {
            pointer: Vec2::new(1.0, 0.0),
            ..Sample::at(2.5, 0.0, viewport)
        };
        engine.tick(&sample, &mut stage);

        let uniforms = gradient.uniforms();
        assert_eq!(uniforms.time, 2.5);
        assert_eq!(uniforms.mouse, Vec2::new(1.0, 0.0));
        assert!((uniforms.distance - 1.0).abs() < 1e-6);
        let mix = stage.value(background, Property::ColorMix).unwrap();
        assert!((mix - (1.0 - 1.0 / SQRT_2)).abs() < 1e-5);

        hub.borrow_mut().dispatch(&HostEvent::Resized {
            width: 600.0,
            height: 900.0,
        });
        assert_eq!(gradient.uniforms().resolution, Size::new(600.0, 900.0));

        // Empty sizes are ignored
        hub.borrow_mut().dispatch(&HostEvent::Resized {
            width: 0.0,
            height: 900.0,
        });
        assert_eq!(gradient.uniforms().resolution, Size::new(600.0, 900.0));
    }

    #[test]
    fn test_distance_trails_pointer() {
        let engine = TimelineEngine::new();
        let controller = ScrollLinkController::new();
        let hub = EventHub::shared();
        let scope = AnimationScope::new("gradient", &engine, &controller, &hub);
        let mut stage = Stage::new();
        let background = stage.insert("background", Rect::new(0.0, 0.0, 1000.0, 800.0));
        let gradient = BackgroundGradient::mount(
            &scope.handle(),
            background,
            Size::new(1000.0, 800.0),
            &GradientConfig::default(),
        )
        .unwrap();

        let sample = Sample {
            pointer: Vec2::new(0.0, 1.0),
            ..Sample::at(0.0, 0.0, Viewport::new(1000.0, 800.0))
        };
        engine.tick(&sample, &mut stage);
        let first = gradient.uniforms().distance;
        assert!(first > 0.0 && first < 1.0);
        engine.tick(&Sample { timestamp: 0.016, ..sample }, &mut stage);
        assert!(gradient.uniforms().distance > first);
    }
}
