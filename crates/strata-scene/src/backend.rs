//! Rendering surface contract
//!
//! The scene never draws by itself. It owns one container per node on a
//! [`Backend`] and describes each container's transform and paint; the
//! backend turns that into pixels (or, for [`HeadlessBackend`], into an
//! inspectable tree).
//!
//! [`HeadlessBackend`]: crate::headless::HeadlessBackend

use crate::events::{Event, EventHandler, EventKind};
use crate::geometry::{Point, Rect, Size};
use crate::style::TextStyle;
use crate::value::{Color, Value};
use std::fmt;

/// Handle of a drawable container on the backend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ContainerId(pub u64);

impl fmt::Display for ContainerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "c{}", self.0)
    }
}

/// Views hold child containers and paint effects; text containers hold a
/// single text run and no children.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContainerKind {
    View,
    Text,
}

/// Placement of a container relative to its parent
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    pub position: Point,
    pub pivot: Point,
    pub scale: Point,
    pub skew: Point,
    pub rotation: f32,
    pub alpha: f32,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            position: Point::default(),
            pivot: Point::default(),
            scale: Point::new(1.0, 1.0),
            skew: Point::default(),
            rotation: 0.0,
            alpha: 1.0,
        }
    }
}

/// Per-edge border widths and colors, in top, right, bottom, left order
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BorderEdges {
    pub widths: [f32; 4],
    pub colors: [Option<Color>; 4],
}

impl BorderEdges {
    pub fn is_visible(&self) -> bool {
        self.widths.iter().any(|w| *w > 0.0)
    }
}

/// How a background image is scaled into its rect
#[derive(Debug, Clone, PartialEq)]
pub enum BackgroundSize {
    Auto,
    Cover,
    Contain,
    /// Explicit width and height, each a [`Value::Number`] or
    /// [`Value::Percent`]
    Explicit(Value, Value),
}

impl BackgroundSize {
    pub fn from_value(value: &Value) -> Self {
        match value {
            Value::Text(kw) => match kw.trim() {
                "cover" => BackgroundSize::Cover,
                "contain" => BackgroundSize::Contain,
                _ => BackgroundSize::Auto,
            },
            Value::List(items) if items.len() == 2 => {
                BackgroundSize::Explicit(items[0].clone(), items[1].clone())
            }
            Value::Percent(_) | Value::Number(_) => {
                BackgroundSize::Explicit(value.clone(), value.clone())
            }
            _ => BackgroundSize::Auto,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ImageFill {
    pub source: String,
    pub opacity: f32,
    /// Horizontal and vertical offset, numbers or percentages
    pub position: (Value, Value),
    pub size: BackgroundSize,
}

/// One paint effect of a view, in back-to-front order
#[derive(Debug, Clone, PartialEq)]
pub enum PaintOp {
    Fill {
        rect: Rect,
        color: Color,
        radius: f32,
    },
    /// Image clipped to the rounded rect
    Image {
        rect: Rect,
        fill: ImageFill,
        radius: f32,
    },
    Border {
        rect: Rect,
        edges: BorderEdges,
        radius: f32,
    },
}

/// Clip applied to a container and its children
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Mask {
    pub rect: Rect,
    pub radius: f32,
}

/// Load state of an image source
#[derive(Debug, Clone, PartialEq)]
pub enum ImageStatus {
    Ready,
    /// Still loading; the host reports completion through
    /// [`Scene::image_loaded`](crate::Scene::image_loaded)
    Loading,
    Failed(String),
}

/// Text block size reported by the backend
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct TextMetrics {
    pub width: f32,
    pub height: f32,
    pub lines: usize,
}

impl From<TextMetrics> for Size {
    fn from(metrics: TextMetrics) -> Self {
        Size {
            width: metrics.width,
            height: metrics.height,
        }
    }
}

/// A 2D rendering surface the scene drives
pub trait Backend {
    fn create_container(&mut self, kind: ContainerKind) -> ContainerId;

    fn destroy_container(&mut self, container: ContainerId);

    fn add_child(&mut self, parent: ContainerId, child: ContainerId);

    fn insert_child_at(&mut self, parent: ContainerId, child: ContainerId, index: usize);

    fn remove_child(&mut self, parent: ContainerId, child: ContainerId);

    fn children(&self, container: ContainerId) -> Vec<ContainerId>;

    fn set_transform(&mut self, container: ContainerId, transform: Transform);

    /// Replace the container's paint effects
    fn set_effects(&mut self, container: ContainerId, effects: Vec<PaintOp>);

    fn set_mask(&mut self, container: ContainerId, mask: Option<Mask>);

    fn set_text(&mut self, container: ContainerId, text: &str, style: &TextStyle);

    fn add_listener(&mut self, container: ContainerId, kind: EventKind, handler: EventHandler);

    /// Remove the listener registered with this exact handler
    fn remove_listener(&mut self, container: ContainerId, kind: EventKind, handler: &EventHandler);

    fn listener_count(&self, container: ContainerId) -> usize;

    fn set_interactive(&mut self, container: ContainerId, interactive: bool);

    /// Deliver `event` to the container's listeners for `kind`
    fn emit(&mut self, container: ContainerId, kind: EventKind, event: &Event);

    fn image_status(&mut self, source: &str) -> ImageStatus;

    fn measure_text(&self, text: &str, style: &TextStyle, max_width: Option<f32>) -> TextMetrics;
}
