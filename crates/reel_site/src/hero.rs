//! Hero orb motion
//!
//! The hero's 3-D sphere turns slowly and bobs up and down as a function of
//! elapsed time alone. Scene authoring is the renderer's business; this only
//! supplies the transform each frame.

use std::cell::Cell;
use std::rc::Rc;

use reel_animation::ScopeHandle;
use reel_core::{Color, ElementId, Property};

use crate::error::Result;

/// Base color of the orb material
pub const ORB_COLOR_HEX: u32 = 0x8352FD;

pub fn orb_color() -> Color {
    Color::from_hex(ORB_COLOR_HEX)
}

/// Orb rotation (radians) and vertical offset (scene units)
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct OrbTransform {
    pub rotation_x: f32,
    pub rotation_y: f32,
    pub offset_y: f32,
}

impl OrbTransform {
    pub fn at(time: f32) -> Self {
        Self {
            rotation_x: time * 0.2,
            rotation_y: time * 0.3,
            offset_y: time.sin() * 0.2,
        }
    }
}

/// Drives the orb element from the frame clock
pub struct HeroOrb {
    transform: Rc<Cell<OrbTransform>>,
}

impl HeroOrb {
    pub fn mount(scope: &ScopeHandle, orb: ElementId) -> Result<Self> {
        let transform = Rc::new(Cell::new(OrbTransform::default()));
        let shared = transform.clone();
        scope.on_frame(move |frame, stage| {
            let t = OrbTransform::at(frame.sample.time());
            stage.write_changed(orb, Property::RotateX, t.rotation_x);
            stage.write_changed(orb, Property::RotateY, t.rotation_y);
            stage.write_changed(orb, Property::TranslateY, t.offset_y);
            shared.set(t);
        })?;
        Ok(Self { transform })
    }

    pub fn transform(&self) -> OrbTransform {
        self.transform.get()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_orb_transform() {
        assert_eq!(OrbTransform::at(0.0), OrbTransform::default());

        let t = OrbTransform::at(std::f32::consts::FRAC_PI_2);
        assert!((t.offset_y - 0.2).abs() < 1e-6);
        assert!((t.rotation_x - 0.2 * std::f32::consts::FRAC_PI_2).abs() < 1e-6);
        assert!((t.rotation_y - 0.3 * std::f32::consts::FRAC_PI_2).abs() < 1e-6);
    }

    #[test]
    fn test_orb_color() {
        let c = orb_color();
        assert!((c.r - 0x83 as f32 / 255.0).abs() < 1e-6);
        assert!((c.b - 0xFD as f32 / 255.0).abs() < 1e-6);
    }
}
