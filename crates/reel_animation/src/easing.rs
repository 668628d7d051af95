//! Easing curves
//!
//! Named, reusable functions mapping normalized progress [0, 1] to eased
//! progress. Every curve maps 0 to 0 and 1 to 1; `BackOut` overshoots past 1
//! in between.
//!
//! The power families follow the usual tween-library naming: `power1` is
//! quadratic, `power2` cubic, `power3` quartic, `power4` quintic.

use std::fmt;
use std::str::FromStr;

use crate::error::AnimationError;

/// Named easing curve
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub enum Easing {
    #[default]
    Linear,
    QuadIn,
    QuadOut,
    QuadInOut,
    CubicIn,
    CubicOut,
    CubicInOut,
    QuartIn,
    QuartOut,
    QuartInOut,
    QuintIn,
    QuintOut,
    QuintInOut,
    SineInOut,
    /// Overshoots the target before settling (overshoot amount)
    BackOut(f32),
}

impl Easing {
    /// Standard ease-in-out (cubic)
    pub const EASE_IN_OUT: Easing = Easing::CubicInOut;
    /// Standard ease-out (cubic)
    pub const EASE_OUT: Easing = Easing::CubicOut;

    /// Apply the curve to a progress value
    ///
    /// Input is clamped to [0, 1].
    pub fn apply(&self, t: f32) -> f32 {
        let t = t.clamp(0.0, 1.0);
        match *self {
            Easing::Linear => t,
            Easing::QuadIn => power_in(t, 2),
            Easing::QuadOut => power_out(t, 2),
            Easing::QuadInOut => power_in_out(t, 2),
            Easing::CubicIn => power_in(t, 3),
            Easing::CubicOut => power_out(t, 3),
            Easing::CubicInOut => power_in_out(t, 3),
            Easing::QuartIn => power_in(t, 4),
            Easing::QuartOut => power_out(t, 4),
            Easing::QuartInOut => power_in_out(t, 4),
            Easing::QuintIn => power_in(t, 5),
            Easing::QuintOut => power_out(t, 5),
            Easing::QuintInOut => power_in_out(t, 5),
            Easing::SineInOut => -((std::f32::consts::PI * t).cos() - 1.0) / 2.0,
            Easing::BackOut(overshoot) => {
                let c3 = overshoot + 1.0;
                let u = t - 1.0;
                1.0 + c3 * u * u * u + overshoot * u * u
            }
        }
    }

    /// Canonical name, as accepted by `FromStr`
    pub fn name(&self) -> &'static str {
        match self {
            Easing::Linear => "linear",
            Easing::QuadIn => "power1.in",
            Easing::QuadOut => "power1.out",
            Easing::QuadInOut => "power1.inOut",
            Easing::CubicIn => "power2.in",
            Easing::CubicOut => "power2.out",
            Easing::CubicInOut => "power2.inOut",
            Easing::QuartIn => "power3.in",
            Easing::QuartOut => "power3.out",
            Easing::QuartInOut => "power3.inOut",
            Easing::QuintIn => "power4.in",
            Easing::QuintOut => "power4.out",
            Easing::QuintInOut => "power4.inOut",
            Easing::SineInOut => "sine.inOut",
            Easing::BackOut(_) => "back.out",
        }
    }
}

fn power_in(t: f32, p: i32) -> f32 {
    t.powi(p)
}

fn power_out(t: f32, p: i32) -> f32 {
    1.0 - (1.0 - t).powi(p)
}

fn power_in_out(t: f32, p: i32) -> f32 {
    if t < 0.5 {
        2f32.powi(p - 1) * t.powi(p)
    } else {
        1.0 - (-2.0 * t + 2.0).powi(p) / 2.0
    }
}

impl fmt::Display for Easing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Easing {
    type Err = AnimationError;

    /// Accepts tween-library names (`power3.out`, `none`) and CSS-style
    /// names (`ease-out-cubic`, `ease-in-out`)
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let easing = match s.trim() {
            "linear" | "none" => Easing::Linear,
            "power1.in" | "ease-in-quad" => Easing::QuadIn,
            "power1.out" | "power1" | "ease-out-quad" => Easing::QuadOut,
            "power1.inOut" | "ease-in-out-quad" => Easing::QuadInOut,
            "power2.in" | "ease-in-cubic" | "ease-in" => Easing::CubicIn,
            "power2.out" | "power2" | "ease-out-cubic" | "ease-out" => Easing::CubicOut,
            "power2.inOut" | "ease-in-out-cubic" | "ease-in-out" => Easing::CubicInOut,
            "power3.in" | "ease-in-quart" => Easing::QuartIn,
            "power3.out" | "power3" | "ease-out-quart" => Easing::QuartOut,
            "power3.inOut" | "ease-in-out-quart" => Easing::QuartInOut,
            "power4.in" | "ease-in-quint" => Easing::QuintIn,
            "power4.out" | "power4" | "ease-out-quint" => Easing::QuintOut,
            "power4.inOut" | "ease-in-out-quint" => Easing::QuintInOut,
            "sine.inOut" | "ease-in-out-sine" => Easing::SineInOut,
            "back.out" | "ease-out-back" => Easing::BackOut(1.70158),
            other => return Err(AnimationError::UnknownEasing(other.to_string())),
        };
        Ok(easing)
    }
}

impl TryFrom<String> for Easing {
    type Error = AnimationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Easing> for String {
    fn from(easing: Easing) -> Self {
        easing.name().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL: &[Easing] = &[
        Easing::Linear,
        Easing::QuadIn,
        Easing::QuadOut,
        Easing::QuadInOut,
        Easing::CubicIn,
        Easing::CubicOut,
        Easing::CubicInOut,
        Easing::QuartIn,
        Easing::QuartOut,
        Easing::QuartInOut,
        Easing::QuintIn,
        Easing::QuintOut,
        Easing::QuintInOut,
        Easing::SineInOut,
        Easing::BackOut(1.70158),
    ];

    #[test]
    fn test_endpoints() {
        for easing in ALL {
            assert!(easing.apply(0.0).abs() < 1e-5, "{easing} at 0");
            assert!((easing.apply(1.0) - 1.0).abs() < 1e-5, "{easing} at 1");
        }
    }

    #[test]
    fn test_in_out_is_symmetric() {
        for easing in [Easing::QuadInOut, Easing::CubicInOut, Easing::QuintInOut] {
            assert!((easing.apply(0.5) - 0.5).abs() < 1e-5);
            let a = easing.apply(0.2);
            let b = easing.apply(0.8);
            assert!((a + b - 1.0).abs() < 1e-5);
        }
    }

    #[test]
    fn test_out_curves_lead_linear() {
        assert!(Easing::CubicOut.apply(0.3) > 0.3);
        assert!(Easing::QuintIn.apply(0.3) < 0.3);
    }

    #[test]
    fn test_back_out_overshoots() {
        let peak = (1..100)
            .map(|i| Easing::BackOut(1.70158).apply(i as f32 / 100.0))
            .fold(0.0f32, f32::max);
        assert!(peak > 1.0);
    }

    #[test]
    fn test_parse_names() {
        assert_eq!("power3.out".parse::<Easing>().unwrap(), Easing::QuartOut);
        assert_eq!("power2.inOut".parse::<Easing>().unwrap(), Easing::CubicInOut);
        assert_eq!("ease-out-cubic".parse::<Easing>().unwrap(), Easing::CubicOut);
        assert_eq!("none".parse::<Easing>().unwrap(), Easing::Linear);
        assert!(matches!(
            "bouncy".parse::<Easing>(),
            Err(AnimationError::UnknownEasing(_))
        ));
    }

    #[test]
    fn test_name_round_trips_through_parse() {
        for easing in ALL {
            assert_eq!(easing.name().parse::<Easing>().unwrap(), *easing);
        }
    }
}
