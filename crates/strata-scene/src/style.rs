//! Paint-side property resolution
//!
//! Everything here works on effective values: the caller passes a lookup
//! that already prefers a running tween's value over the static prop.

use crate::backend::{BackgroundSize, BorderEdges, ImageFill, Mask, PaintOp, Transform};
use crate::geometry::{Point, Rect};
use crate::value::{Color, Value};

/// Font size used when no node in the ancestor chain sets `fontSize`
pub const DEFAULT_FONT_SIZE: f32 = 16.0;

/// Props read by [`TextStyle::from_lookup`]
pub const TEXT_STYLE_PROPERTIES: &[&str] = &[
    "color",
    "wordWrap",
    "textAlign",
    "letterSpacing",
    "fontFamily",
    "fontSize",
    "fontStyle",
    "fontWeight",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextAlign {
    Left,
    Center,
    Right,
    Justify,
}

impl TextAlign {
    pub fn from_keyword(kw: &str) -> Option<Self> {
        match kw.trim() {
            "left" => Some(TextAlign::Left),
            "center" => Some(TextAlign::Center),
            "right" => Some(TextAlign::Right),
            "justify" => Some(TextAlign::Justify),
            _ => None,
        }
    }
}

/// Text attributes of one node. Unset fields inherit from the nearest
/// ancestor that sets them.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TextStyle {
    pub fill: Option<Color>,
    pub word_wrap: Option<bool>,
    pub align: Option<TextAlign>,
    pub letter_spacing: Option<f32>,
    pub font_family: Option<String>,
    pub font_size: Option<f32>,
    pub font_style: Option<String>,
    pub font_weight: Option<String>,
}

impl TextStyle {
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<Value>,
    {
        let text = |key: &str| lookup(key).and_then(|v| v.as_text().map(str::to_string));
        Self {
            fill: lookup("color").and_then(|v| v.as_color()),
            word_wrap: lookup("wordWrap").and_then(|v| v.as_bool()),
            align: lookup("textAlign")
                .and_then(|v| v.as_text().and_then(TextAlign::from_keyword)),
            letter_spacing: lookup("letterSpacing").and_then(|v| v.as_number()),
            font_family: text("fontFamily"),
            font_size: lookup("fontSize").and_then(|v| v.as_number()),
            font_style: text("fontStyle"),
            font_weight: text("fontWeight"),
        }
    }

    /// Fill every unset field from `parent`.
    pub fn cascade(mut self, parent: &TextStyle) -> Self {
        fn inherit<T: Clone>(own: &mut Option<T>, parent: &Option<T>) {
            if own.is_none() {
                own.clone_from(parent);
            }
        }
        inherit(&mut self.fill, &parent.fill);
        inherit(&mut self.word_wrap, &parent.word_wrap);
        inherit(&mut self.align, &parent.align);
        inherit(&mut self.letter_spacing, &parent.letter_spacing);
        inherit(&mut self.font_family, &parent.font_family);
        inherit(&mut self.font_size, &parent.font_size);
        inherit(&mut self.font_style, &parent.font_style);
        inherit(&mut self.font_weight, &parent.font_weight);
        self
    }

    pub fn font_size_or_default(&self) -> f32 {
        self.font_size.unwrap_or(DEFAULT_FONT_SIZE)
    }

    pub fn wraps(&self) -> bool {
        self.word_wrap.unwrap_or(true)
    }
}

fn number<F: Fn(&str) -> Option<Value>>(lookup: &F, key: &str) -> Option<f32> {
    lookup(key).and_then(|v| v.as_number())
}

/// Container transform for a node laid out at `rect`.
///
/// The pivot defaults to the center of the node, and the position is offset
/// by the pivot so rotation and scale happen around it without moving the
/// node's laid-out origin.
pub fn resolve_transform<F>(rect: Rect, lookup: F) -> Transform
where
    F: Fn(&str) -> Option<Value>,
{
    let pivot = Point::new(
        number(&lookup, "pivotX").unwrap_or(rect.width / 2.0),
        number(&lookup, "pivotY").unwrap_or(rect.height / 2.0),
    );
    let translate = Point::new(
        number(&lookup, "translateX").unwrap_or(0.0),
        number(&lookup, "translateY").unwrap_or(0.0),
    );

    Transform {
        position: Point::new(
            rect.left + translate.x + pivot.x,
            rect.top + translate.y + pivot.y,
        ),
        pivot,
        scale: Point::new(
            number(&lookup, "scaleX").unwrap_or(1.0),
            number(&lookup, "scaleY").unwrap_or(1.0),
        ),
        skew: Point::new(
            number(&lookup, "skewX").unwrap_or(0.0),
            number(&lookup, "skewY").unwrap_or(0.0),
        ),
        rotation: number(&lookup, "rotation").unwrap_or(0.0),
        alpha: number(&lookup, "opacity").unwrap_or(1.0),
    }
}

const EDGES: [&str; 4] = ["Top", "Right", "Bottom", "Left"];

/// Per-edge border, each edge falling back to `border` / `borderColor`.
pub fn resolve_border<F>(lookup: F) -> BorderEdges
where
    F: Fn(&str) -> Option<Value>,
{
    let width_all = number(&lookup, "border");
    let color_all = lookup("borderColor").and_then(|v| v.as_color());

    let mut edges = BorderEdges {
        widths: [0.0; 4],
        colors: [None; 4],
    };
    for (i, edge) in EDGES.iter().enumerate() {
        edges.widths[i] = number(&lookup, format!("border{edge}").as_str())
            .or(width_all)
            .unwrap_or(0.0);
        edges.colors[i] = lookup(format!("borderColor{edge}").as_str())
            .and_then(|v| v.as_color())
            .or(color_all);
    }
    edges
}

/// Resolved paint of a view, independent of where it is drawn
#[derive(Debug, Clone, PartialEq)]
pub struct PaintStyle {
    pub radius: f32,
    pub background: Option<Color>,
    pub image: Option<ImageFill>,
    pub border: BorderEdges,
    pub clip: bool,
}

impl PaintStyle {
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<Value>,
    {
        let image = lookup("backgroundImage")
            .and_then(|v| v.as_text().map(str::to_string))
            .map(|source| ImageFill {
                source,
                opacity: number(&lookup, "backgroundOpacity").unwrap_or(1.0),
                position: background_position(lookup("backgroundPosition")),
                size: lookup("backgroundSize")
                    .map(|v| BackgroundSize::from_value(&v))
                    .unwrap_or(BackgroundSize::Auto),
            });

        Self {
            radius: number(&lookup, "borderRadius").unwrap_or(0.0),
            background: lookup("backgroundColor").and_then(|v| v.as_color()),
            image,
            border: resolve_border(&lookup),
            clip: lookup("overflow").and_then(|v| v.as_text().map(|s| s.trim() == "hidden"))
                == Some(true),
        }
    }

    /// Paint ops for a view covering `rect`. The image is left out
    /// until its source is ready.
    pub fn effects(&self, rect: Rect, image_ready: bool) -> Vec<PaintOp> {
        let mut ops = Vec::new();
        if let Some(color) = self.background {
            ops.push(PaintOp::Fill {
                rect,
                color,
                radius: self.radius,
            });
        }
        if let Some(fill) = self.image.as_ref().filter(|_| image_ready) {
            ops.push(PaintOp::Image {
                rect,
                fill: fill.clone(),
                radius: self.radius,
            });
        }
        if self.border.is_visible() {
            ops.push(PaintOp::Border {
                rect,
                edges: self.border,
                radius: self.radius,
            });
        }
        ops
    }

    pub fn mask(&self, rect: Rect) -> Option<Mask> {
        self.clip.then_some(Mask {
            rect,
            radius: self.radius,
        })
    }
}

fn background_position(value: Option<Value>) -> (Value, Value) {
    match value {
        Some(single @ (Value::Number(_) | Value::Percent(_))) => (single.clone(), single),
        Some(value) => match value.as_list() {
            Some([x, y]) => (x.clone(), y.clone()),
            _ => (Value::Number(0.0), Value::Number(0.0)),
        },
        None => (Value::Number(0.0), Value::Number(0.0)),
    }
}
