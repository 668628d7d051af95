//! Signal sampler
//!
//! Produces one [`Sample`] per display frame from the latest pointer position,
//! the elapsed time, and the document scroll offset. There is no queue:
//! pointer events overwrite each other, and a consumer always sees the most
//! recent state.

use reel_core::{HostEvent, Point, Vec2, Viewport};
use tracing::trace;

/// Source of the document scroll offset
///
/// Read synchronously at sample time; implementations must not cache
/// across frames.
pub trait ScrollSource {
    fn scroll_offset(&self) -> f32;
}

impl ScrollSource for f32 {
    fn scroll_offset(&self) -> f32 {
        *self
    }
}

impl<T: ScrollSource + ?Sized> ScrollSource for &T {
    fn scroll_offset(&self) -> f32 {
        (**self).scroll_offset()
    }
}

/// One frame's worth of input signals
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Sample {
    /// Seconds since the sampler started
    pub timestamp: f64,
    /// Pointer in device-independent units, center (0, 0), range [-1, 1]
    pub pointer: Vec2,
    /// Pointer in viewport pixels
    pub pointer_px: Point,
    /// Document scroll offset in pixels
    pub scroll_offset: f32,
    /// Viewport at sample time
    pub viewport: Viewport,
}

impl Sample {
    /// A sample at the given time with a centered pointer
    pub fn at(timestamp: f64, scroll_offset: f32, viewport: Viewport) -> Self {
        Self {
            timestamp,
            pointer: Vec2::ZERO,
            pointer_px: viewport.center(),
            scroll_offset,
            viewport,
        }
    }

    /// Elapsed time as f32 seconds, for uniforms and trig
    pub fn time(&self) -> f32 {
        self.timestamp as f32
    }
}

/// Collects pointer and resize events and emits frame samples
#[derive(Debug)]
pub struct SignalSampler {
    origin: Option<f64>,
    pointer: Option<Point>,
    viewport: Viewport,
    frames: u64,
}

impl SignalSampler {
    pub fn new(viewport: Viewport) -> Self {
        Self {
            origin: None,
            pointer: None,
            viewport,
            frames: 0,
        }
    }

    /// Record a pointer position. Non-finite positions are ignored.
    pub fn on_pointer_move(&mut self, position: Point) {
        if position.is_finite() {
            self.pointer = Some(position);
        } else {
            trace!("SignalSampler: ignoring non-finite pointer {:?}", position);
        }
    }

    /// Record a viewport resize. Empty or non-finite sizes are ignored.
    pub fn on_resize(&mut self, viewport: Viewport) {
        if viewport.size().is_empty() || !viewport.width.is_finite() || !viewport.height.is_finite()
        {
            trace!("SignalSampler: ignoring invalid viewport {:?}", viewport);
            return;
        }
        self.viewport = viewport;
    }

    /// Feed a host event; events the sampler does not care about are ignored
    pub fn handle_event(&mut self, event: &HostEvent) {
        match *event {
            HostEvent::Resized { width, height } => self.on_resize(Viewport::new(width, height)),
            _ => {
                if let Some(position) = event.pointer() {
                    self.on_pointer_move(position);
                }
            }
        }
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    /// Latest pointer, or the viewport center if none has been seen
    pub fn pointer_px(&self) -> Point {
        self.pointer.unwrap_or_else(|| self.viewport.center())
    }

    /// Number of samples emitted so far
    pub fn frame_count(&self) -> u64 {
        self.frames
    }

    /// Emit the sample for a display frame
    ///
    /// `now` is the host's monotonic frame time in seconds; the first call
    /// becomes time zero. The scroll offset is read from `scroll` right now.
    pub fn sample(&mut self, now: f64, scroll: impl ScrollSource) -> Sample {
        let origin = *self.origin.get_or_insert(now);
        let pointer_px = self.pointer_px();
        let (nx, ny) = self.viewport.normalize(pointer_px);
        self.frames += 1;

        Sample {
            timestamp: (now - origin).max(0.0),
            pointer: Vec2::new(nx, ny),
            pointer_px,
            scroll_offset: scroll.scroll_offset(),
            viewport: self.viewport,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    struct Document {
        scroll_y: Cell<f32>,
    }

    impl ScrollSource for Document {
        fn scroll_offset(&self) -> f32 {
            self.scroll_y.get()
        }
    }

    #[test]
    fn test_pointer_defaults_to_center() {
        let mut sampler = SignalSampler::new(Viewport::new(1000.0, 800.0));
        let sample = sampler.sample(10.0, 0.0_f32);
        assert_eq!(sample.pointer, Vec2::ZERO);
        assert_eq!(sample.pointer_px, Point::new(500.0, 400.0));
        assert_eq!(sample.timestamp, 0.0);
    }

    #[test]
    fn test_latest_pointer_wins() {
        let mut sampler = SignalSampler::new(Viewport::new(1000.0, 800.0));
        sampler.on_pointer_move(Point::new(10.0, 10.0));
        sampler.on_pointer_move(Point::new(1000.0, 0.0));
        let sample = sampler.sample(0.0, 0.0_f32);
        assert_eq!(sample.pointer, Vec2::new(1.0, 1.0));
    }

    #[test]
    fn test_non_finite_pointer_keeps_last_value() {
        let mut sampler = SignalSampler::new(Viewport::new(1000.0, 800.0));
        sampler.on_pointer_move(Point::new(250.0, 200.0));
        sampler.on_pointer_move(Point::new(f32::NAN, 3.0));
        assert_eq!(sampler.pointer_px(), Point::new(250.0, 200.0));
    }

    #[test]
    fn test_scroll_is_read_at_sample_time() {
        let doc = Document {
            scroll_y: Cell::new(0.0),
        };
        let mut sampler = SignalSampler::new(Viewport::default());
        assert_eq!(sampler.sample(0.0, &doc).scroll_offset, 0.0);
        doc.scroll_y.set(640.0);
        assert_eq!(sampler.sample(0.016, &doc).scroll_offset, 640.0);
    }

    #[test]
    fn test_resize_event_updates_viewport() {
        let mut sampler = SignalSampler::new(Viewport::new(1280.0, 800.0));
        sampler.handle_event(&HostEvent::Resized {
            width: 390.0,
            height: 844.0,
        });
        sampler.handle_event(&HostEvent::Resized {
            width: 0.0,
            height: 844.0,
        });
        assert_eq!(sampler.viewport(), Viewport::new(390.0, 844.0));
        assert_eq!(sampler.sample(0.0, 0.0_f32).pointer_px, Point::new(195.0, 422.0));
    }

    #[test]
    fn test_timestamps_are_relative_to_first_frame() {
        let mut sampler = SignalSampler::new(Viewport::default());
        sampler.sample(100.0, 0.0_f32);
        let sample = sampler.sample(101.5, 0.0_f32);
        assert!((sample.timestamp - 1.5).abs() < 1e-9);
        assert_eq!(sampler.frame_count(), 2);
    }
}
