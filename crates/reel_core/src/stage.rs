//! Stage: the headless element arena
//!
//! The orchestration layer never touches a real document. It owns a set of
//! elements with document-space bounds and writes a small, closed set of
//! style properties to them. Hosts drain the write journal every frame and
//! apply it to whatever they render with.
//!
//! Writing to an element that has been removed is a silent no-op, so an
//! animation that outlives its target simply stops producing output.

use rustc_hash::FxHashMap;
use slotmap::{new_key_type, SlotMap};

use crate::geometry::Rect;

new_key_type! {
    /// Handle to an element on the stage
    pub struct ElementId;
}

/// Style properties the orchestration layer is allowed to write
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Property {
    /// Horizontal translation (px)
    TranslateX,
    /// Vertical translation (px)
    TranslateY,
    /// Vertical translation as a percentage of the element's own height
    YPercent,
    /// Uniform scale
    Scale,
    /// Horizontal scale
    ScaleX,
    /// 2D rotation (degrees)
    Rotate,
    /// 3D rotation around the X axis (radians)
    RotateX,
    /// 3D rotation around the Y axis (radians)
    RotateY,
    /// Vertical skew (degrees)
    SkewY,
    /// Opacity (0.0 - 1.0)
    Opacity,
    /// Width as a percentage of the parent
    WidthPercent,
    /// Vertical offset that keeps a pinned element fixed in the viewport (px)
    PinOffset,
    /// Blend factor between an element's base and accent colors (0.0 - 1.0)
    ColorMix,
}

impl Property {
    /// Value an element has before anything is written
    pub fn initial_value(self) -> f32 {
        match self {
            Property::Scale | Property::ScaleX | Property::Opacity => 1.0,
            Property::WidthPercent => 100.0,
            _ => 0.0,
        }
    }

    /// CSS-ish name for logging
    pub fn name(self) -> &'static str {
        match self {
            Property::TranslateX => "x",
            Property::TranslateY => "y",
            Property::YPercent => "yPercent",
            Property::Scale => "scale",
            Property::ScaleX => "scaleX",
            Property::Rotate => "rotate",
            Property::RotateX => "rotationX",
            Property::RotateY => "rotationY",
            Property::SkewY => "skewY",
            Property::Opacity => "opacity",
            Property::WidthPercent => "width%",
            Property::PinOffset => "pin",
            Property::ColorMix => "colorMix",
        }
    }
}

/// Written style values for one element
#[derive(Clone, Debug, Default)]
pub struct Style {
    values: FxHashMap<Property, f32>,
}

impl Style {
    /// Current value, falling back to the property's initial value
    pub fn get(&self, property: Property) -> f32 {
        self.values
            .get(&property)
            .copied()
            .unwrap_or_else(|| property.initial_value())
    }

    /// True if the property was ever written
    pub fn is_set(&self, property: Property) -> bool {
        self.values.contains_key(&property)
    }

    fn set(&mut self, property: Property, value: f32) {
        self.values.insert(property, value);
    }

    fn clear(&mut self, property: Property) -> bool {
        self.values.remove(&property).is_some()
    }
}

/// An element on the stage
#[derive(Clone, Debug)]
pub struct Element {
    /// Debug label (`"works.track"`, `"intro.counter"`, ...)
    pub label: String,
    /// Layout bounds in document space, before any written transform
    pub bounds: Rect,
    /// Full scrollable width of the element's content
    pub scroll_width: f32,
    pub style: Style,
}

/// One entry of the write journal
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct StyleWrite {
    pub element: ElementId,
    pub property: Property,
    /// `None` means the property was cleared back to its initial value
    pub value: Option<f32>,
}

/// The element arena plus its write journal
#[derive(Default)]
pub struct Stage {
    elements: SlotMap<ElementId, Element>,
    journal: Vec<StyleWrite>,
    write_count: u64,
}

impl Stage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an element with the given layout bounds
    pub fn insert(&mut self, label: impl Into<String>, bounds: Rect) -> ElementId {
        self.elements.insert(Element {
            label: label.into(),
            bounds,
            scroll_width: bounds.width(),
            style: Style::default(),
        })
    }

    /// Remove an element; later writes to it are ignored
    pub fn remove(&mut self, id: ElementId) -> Option<Element> {
        self.elements.remove(id)
    }

    pub fn contains(&self, id: ElementId) -> bool {
        self.elements.contains_key(id)
    }

    pub fn get(&self, id: ElementId) -> Option<&Element> {
        self.elements.get(id)
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    pub fn bounds(&self, id: ElementId) -> Option<Rect> {
        self.elements.get(id).map(|e| e.bounds)
    }

    /// Update layout bounds (layout pass, not a style write)
    pub fn set_bounds(&mut self, id: ElementId, bounds: Rect) {
        if let Some(element) = self.elements.get_mut(id) {
            element.bounds = bounds;
        }
    }

    pub fn scroll_width(&self, id: ElementId) -> Option<f32> {
        self.elements.get(id).map(|e| e.scroll_width)
    }

    /// Update the content width of a horizontally overflowing element
    pub fn set_scroll_width(&mut self, id: ElementId, width: f32) {
        if let Some(element) = self.elements.get_mut(id) {
            element.scroll_width = width;
        }
    }

    /// Read a style value (initial value if unset, `None` if the element is gone)
    pub fn value(&self, id: ElementId, property: Property) -> Option<f32> {
        self.elements.get(id).map(|e| e.style.get(property))
    }

    /// Write a style value. Returns false if the element no longer exists.
    pub fn write(&mut self, id: ElementId, property: Property, value: f32) -> bool {
        let Some(element) = self.elements.get_mut(id) else {
            return false;
        };
        element.style.set(property, value);
        self.journal.push(StyleWrite {
            element: id,
            property,
            value: Some(value),
        });
        self.write_count += 1;
        true
    }

    /// Write only if the value differs from the current one
    ///
    /// Continuous consumers call this every frame; settled values then
    /// produce no journal entries.
    pub fn write_changed(&mut self, id: ElementId, property: Property, value: f32) -> bool {
        let unchanged = self
            .elements
            .get(id)
            .is_some_and(|e| e.style.is_set(property) && e.style.get(property) == value);
        if unchanged {
            return false;
        }
        self.write(id, property, value)
    }

    /// Clear a written value back to the property's initial value
    pub fn clear(&mut self, id: ElementId, property: Property) -> bool {
        let Some(element) = self.elements.get_mut(id) else {
            return false;
        };
        if !element.style.clear(property) {
            return false;
        }
        self.journal.push(StyleWrite {
            element: id,
            property,
            value: None,
        });
        self.write_count += 1;
        true
    }

    /// Take all writes since the last drain
    pub fn drain_writes(&mut self) -> Vec<StyleWrite> {
        std::mem::take(&mut self.journal)
    }

    /// Total number of writes and clears since creation
    pub fn write_count(&self) -> u64 {
        self.write_count
    }

    pub fn label(&self, id: ElementId) -> &str {
        self.elements
            .get(id)
            .map(|e| e.label.as_str())
            .unwrap_or("<removed>")
    }
}
