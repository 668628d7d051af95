//! Viewport dimensions and the responsive breakpoint gate

use crate::error::{CoreError, Result};
use crate::geometry::{Point, Size};

/// The visible window, in CSS pixels
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Viewport {
    pub width: f32,
    pub height: f32,
}

impl Viewport {
    pub const fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    /// Create a viewport, rejecting empty or non-finite dimensions
    pub fn try_new(width: f32, height: f32) -> Result<Self> {
        if Size::new(width, height).is_empty() || !width.is_finite() || !height.is_finite() {
            return Err(CoreError::InvalidViewport { width, height });
        }
        Ok(Self::new(width, height))
    }

    pub fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }

    pub fn center(&self) -> Point {
        Point::new(self.width / 2.0, self.height / 2.0)
    }

    /// Map a pixel position to device-independent units in [-1, 1]
    ///
    /// The center maps to (0, 0); +y points up, matching shader conventions.
    /// Positions outside the viewport are clamped.
    pub fn normalize(&self, p: Point) -> (f32, f32) {
        if self.width <= 0.0 || self.height <= 0.0 {
            return (0.0, 0.0);
        }
        let x = (p.x / self.width) * 2.0 - 1.0;
        let y = -((p.y / self.height) * 2.0 - 1.0);
        (x.clamp(-1.0, 1.0), y.clamp(-1.0, 1.0))
    }
}

impl Default for Viewport {
    fn default() -> Self {
        Self::new(1280.0, 800.0)
    }
}

/// A single-threshold viewport-width predicate (`min-width: N px`)
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Breakpoint {
    pub min_width: f32,
}

impl Breakpoint {
    /// The `md` breakpoint used by the gallery gate
    pub const MEDIUM: Breakpoint = Breakpoint { min_width: 768.0 };

    pub const fn min_width(min_width: f32) -> Self {
        Self { min_width }
    }

    pub fn try_min_width(min_width: f32) -> Result<Self> {
        if !min_width.is_finite() || min_width <= 0.0 {
            return Err(CoreError::InvalidBreakpoint(min_width));
        }
        Ok(Self { min_width })
    }

    pub fn matches(&self, viewport: &Viewport) -> bool {
        viewport.width >= self.min_width
    }
}

impl Default for Breakpoint {
    fn default() -> Self {
        Self::MEDIUM
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_center_and_corners() {
        let vp = Viewport::new(1000.0, 500.0);
        assert_eq!(vp.normalize(vp.center()), (0.0, 0.0));
        assert_eq!(vp.normalize(Point::new(0.0, 0.0)), (-1.0, 1.0));
        assert_eq!(vp.normalize(Point::new(1000.0, 500.0)), (1.0, -1.0));
        assert_eq!(vp.normalize(Point::new(5000.0, -10.0)), (1.0, 1.0));
    }

    #[test]
    fn test_try_new_rejects_empty() {
        assert!(Viewport::try_new(0.0, 600.0).is_err());
        assert!(Viewport::try_new(f32::INFINITY, 600.0).is_err());
        assert!(Viewport::try_new(390.0, 844.0).is_ok());
        assert!(Breakpoint::try_min_width(-1.0).is_err());
    }

    #[test]
    fn test_breakpoint_is_inclusive() {
        let bp = Breakpoint::MEDIUM;
        assert!(bp.matches(&Viewport::new(768.0, 600.0)));
        assert!(!bp.matches(&Viewport::new(767.0, 600.0)));
    }
}
