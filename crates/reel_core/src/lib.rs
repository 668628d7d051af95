//! Reel Core
//!
//! Foundational types shared by the animation layer and the page:
//!
//! - **Geometry**: points, sizes, rects, vectors, colors
//! - **Viewport**: window dimensions and the responsive breakpoint gate
//! - **Stage**: the element arena style properties are written to
//! - **Events**: host input events and the listener registry

pub mod error;
pub mod events;
pub mod geometry;
pub mod stage;
pub mod viewport;

pub use error::{CoreError, Result};
pub use events::{
    EventHub, EventHubHandle, EventKind, HostEvent, Listener, ListenerId, PointerButton,
    SharedEventHub,
};
pub use geometry::{Color, Point, Rect, Size, Vec2};
pub use stage::{Element, ElementId, Property, Stage, Style, StyleWrite};
pub use viewport::{Breakpoint, Viewport};
