//! Reel Animation System
//!
//! Frame-driven orchestration of a page's motion: sampling input once per
//! frame, damping values toward targets, sequencing keyframes on timelines,
//! linking regions to the scroll position, and tearing all of it down as a
//! unit.
//!
//! # Features
//!
//! - **Signal Sampler**: one pointer/scroll/time sample per display frame
//! - **Damped Values**: exponential followers with exact settling
//! - **Easing Curves**: named curves parsable from tween-library names
//! - **Timelines**: sequenced, overlapped, and staggered keyframes
//! - **Viewport Triggers**: play-once or play-reverse reveals
//! - **Scroll Links**: pinned horizontal pans and scroll-bound timelines behind a breakpoint gate
//! - **Intro Sequencer**: counter preloader with an exit choreography
//! - **Scopes**: grouped registrations released together
//!
//! # Frame order
//!
//! A host drives one frame as:
//!
//! ```ignore
//! let sample = sampler.sample(now, scroll);
//! controller.update(&sample, &mut stage);
//! engine.tick(&sample, &mut stage);
//! for write in stage.drain_writes() { /* apply to the document */ }
//! ```

pub mod damping;
pub mod easing;
pub mod engine;
pub mod error;
pub mod intro;
pub mod keyframe;
pub mod sampler;
pub mod scope;
pub mod scroll_link;
pub mod timeline;
pub mod trigger;
pub mod values;

pub use damping::{Damped, DampingFactor};
pub use easing::Easing;
pub use engine::{
    EngineHandle, Frame, FrameCallback, FrameCallbackHandle, FrameCallbackId, TimelineEngine,
    TimelineHandle, TimelineId, DEFAULT_MAX_FRAME_DT,
};
pub use error::{AnimationError, Result};
pub use intro::{IntroElements, IntroPhase, IntroSequencer, IntroTimings};
pub use keyframe::{Keyframe, KeyframeMode};
pub use sampler::{Sample, ScrollSource, SignalSampler};
pub use scope::{AnimationScope, Registration, ScopeHandle};
pub use scroll_link::{
    ControllerHandle, EndCondition, RegionEvent, RegionHandle, RegionId, ScrollLinkController,
    ScrollLinkState, ScrollRegion, ScrubBinding, StartCondition,
};
pub use timeline::{CompletionCallback, Direction, PlayState, Position, Timeline, TimelineKind};
pub use trigger::{TogglePolicy, ViewportTrigger, DEFAULT_START_FRACTION};
pub use values::{FloatTween, Interpolate, Tween};
