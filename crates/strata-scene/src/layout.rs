//! Layout adapter over a persistent taffy tree
//!
//! Every scene node owns one taffy node. Child order in the taffy tree mirrors
//! the scene's child order; the scene keeps them in step on every mutation.
//! Props are pushed one key at a time, translated from the flexbox vocabulary
//! (`flexDirection: "row-reverse"`, `width: "50%"`, ...) into taffy styles.

use crate::error::SceneResult;
use crate::geometry::{Rect, Size};
use crate::node::NodeId;
use crate::value::Value;
use taffy::geometry::Point as TaffyPoint;
use taffy::prelude::{
    auto, length, percent, AlignContent, AlignItems, AvailableSpace, Dimension, Display,
    FlexDirection, FlexWrap, LengthPercentage, LengthPercentageAuto, Position,
    Size as TaffySize, Style, TaffyTree,
};
use taffy::style::Overflow;

/// Handle of a node inside the layout engine
pub type LayoutHandle = taffy::prelude::NodeId;

/// Props understood by the layout pass
pub const LAYOUT_PROPERTIES: &[&str] = &[
    "position",
    "display",
    "hidden",
    "alignContent",
    "alignItems",
    "alignSelf",
    "justifyContent",
    "flexBasis",
    "flexDirection",
    "flexGrow",
    "flexShrink",
    "flexWrap",
    "top",
    "right",
    "bottom",
    "left",
    "width",
    "height",
    "minWidth",
    "minHeight",
    "maxWidth",
    "maxHeight",
    "margin",
    "marginTop",
    "marginRight",
    "marginBottom",
    "marginLeft",
    "padding",
    "paddingTop",
    "paddingRight",
    "paddingBottom",
    "paddingLeft",
    "border",
    "borderTop",
    "borderRight",
    "borderBottom",
    "borderLeft",
    "overflow",
];

pub fn is_layout_property(key: &str) -> bool {
    LAYOUT_PROPERTIES.contains(&key)
}

/// Style every node starts from: a column flex container that does not
/// shrink, the defaults of the layout model the prop vocabulary comes from.
fn base_style() -> Style {
    Style {
        display: Display::Flex,
        flex_direction: FlexDirection::Column,
        flex_shrink: 0.0,
        ..Default::default()
    }
}

pub struct LayoutEngine {
    tree: TaffyTree<NodeId>,
}

impl Default for LayoutEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl LayoutEngine {
    pub fn new() -> Self {
        Self {
            tree: TaffyTree::new(),
        }
    }

    /// Create a detached node. Measured nodes carry their owner's id so the
    /// measure callback can size them from content.
    pub fn create_node(&mut self, owner: NodeId, measured: bool) -> SceneResult<LayoutHandle> {
        let handle = if measured {
            self.tree.new_leaf_with_context(base_style(), owner)?
        } else {
            self.tree.new_leaf(base_style())?
        };
        Ok(handle)
    }

    /// Drop a node. Its children are detached, not removed.
    pub fn release(&mut self, handle: LayoutHandle) -> SceneResult<()> {
        self.tree.remove(handle)?;
        Ok(())
    }

    pub fn insert_child(
        &mut self,
        parent: LayoutHandle,
        child: LayoutHandle,
        index: usize,
    ) -> SceneResult<()> {
        self.tree.insert_child_at_index(parent, index, child)?;
        Ok(())
    }

    pub fn remove_child(&mut self, parent: LayoutHandle, child: LayoutHandle) -> SceneResult<()> {
        self.tree.remove_child(parent, child)?;
        Ok(())
    }

    pub fn children(&self, handle: LayoutHandle) -> SceneResult<Vec<LayoutHandle>> {
        Ok(self.tree.children(handle)?)
    }

    pub fn child_count(&self, handle: LayoutHandle) -> usize {
        self.tree.children(handle).map(|c| c.len()).unwrap_or(0)
    }

    /// Forward one prop to the node's style.
    ///
    /// Returns `false` when `key` is not a layout attribute or `value` has
    /// no meaning for it; the style is then left as it was.
    pub fn set_property(
        &mut self,
        handle: LayoutHandle,
        key: &str,
        value: &Value,
    ) -> SceneResult<bool> {
        let mut style = self.tree.style(handle)?.clone();
        if !apply_property(&mut style, key, value) {
            return Ok(false);
        }
        self.tree.set_style(handle, style)?;
        Ok(true)
    }

    pub fn mark_dirty(&mut self, handle: LayoutHandle) -> SceneResult<()> {
        self.tree.mark_dirty(handle)?;
        Ok(())
    }

    /// Lay out the tree under `root` within `width` x `height`.
    ///
    /// `measure` receives the owner of every measured node and the width
    /// available to it, and returns the content size.
    pub fn compute<F>(
        &mut self,
        root: LayoutHandle,
        width: f32,
        height: f32,
        mut measure: F,
    ) -> SceneResult<()>
    where
        F: FnMut(NodeId, Option<f32>) -> Size,
    {
        let available = TaffySize {
            width: AvailableSpace::Definite(width),
            height: AvailableSpace::Definite(height),
        };

        self.tree.compute_layout_with_measure(
            root,
            available,
            |known, available_space, _, context, _| {
                if let TaffySize {
                    width: Some(width),
                    height: Some(height),
                } = known
                {
                    return TaffySize { width, height };
                }

                let Some(owner) = context else {
                    return TaffySize::ZERO;
                };

                let max_width = known.width.or(match available_space.width {
                    AvailableSpace::Definite(w) => Some(w),
                    _ => None,
                });
                let measured = measure(*owner, max_width);

                TaffySize {
                    width: known.width.unwrap_or(measured.width),
                    height: known.height.unwrap_or(measured.height),
                }
            },
        )?;
        Ok(())
    }

    /// Rectangle from the last [`compute`](Self::compute), relative to the
    /// parent node.
    pub fn computed_rect(&self, handle: LayoutHandle) -> SceneResult<Rect> {
        let layout = self.tree.layout(handle)?;
        Ok(Rect::new(
            layout.location.x,
            layout.location.y,
            layout.size.width,
            layout.size.height,
        ))
    }
}

fn apply_property(style: &mut Style, key: &str, value: &Value) -> bool {
    match key {
        "position" => set(&mut style.position, keyword(value).and_then(convert_position)),
        "display" => set(&mut style.display, keyword(value).and_then(convert_display)),
        "hidden" => set(
            &mut style.display,
            value
                .as_bool()
                .map(|hidden| if hidden { Display::None } else { Display::Flex }),
        ),
        "alignContent" => set(
            &mut style.align_content,
            keyword(value).and_then(convert_align_content).map(Some),
        ),
        "justifyContent" => set(
            &mut style.justify_content,
            keyword(value).and_then(convert_align_content).map(Some),
        ),
        "alignItems" => set(
            &mut style.align_items,
            keyword(value).and_then(convert_align_items).map(Some),
        ),
        "alignSelf" => set(
            &mut style.align_self,
            keyword(value).and_then(|kw| {
                if kw == "auto" {
                    Some(None)
                } else {
                    convert_align_items(kw).map(Some)
                }
            }),
        ),
        "flexDirection" => set(
            &mut style.flex_direction,
            keyword(value).and_then(convert_flex_direction),
        ),
        "flexWrap" => set(&mut style.flex_wrap, keyword(value).and_then(convert_flex_wrap)),
        "flexGrow" => set(&mut style.flex_grow, value.as_number()),
        "flexShrink" => set(&mut style.flex_shrink, value.as_number()),
        "flexBasis" => set(&mut style.flex_basis, dimension(value)),

        "width" => set(&mut style.size.width, dimension(value)),
        "height" => set(&mut style.size.height, dimension(value)),
        "minWidth" => set(&mut style.min_size.width, dimension(value)),
        "minHeight" => set(&mut style.min_size.height, dimension(value)),
        "maxWidth" => set(&mut style.max_size.width, dimension(value)),
        "maxHeight" => set(&mut style.max_size.height, dimension(value)),

        "top" => set(&mut style.inset.top, length_percentage_auto(value)),
        "right" => set(&mut style.inset.right, length_percentage_auto(value)),
        "bottom" => set(&mut style.inset.bottom, length_percentage_auto(value)),
        "left" => set(&mut style.inset.left, length_percentage_auto(value)),

        "margin" => match length_percentage_auto(value) {
            Some(v) => {
                style.margin.top = v;
                style.margin.right = v;
                style.margin.bottom = v;
                style.margin.left = v;
                true
            }
            None => false,
        },
        "marginTop" => set(&mut style.margin.top, length_percentage_auto(value)),
        "marginRight" => set(&mut style.margin.right, length_percentage_auto(value)),
        "marginBottom" => set(&mut style.margin.bottom, length_percentage_auto(value)),
        "marginLeft" => set(&mut style.margin.left, length_percentage_auto(value)),

        "padding" => match length_percentage(value) {
            Some(v) => {
                style.padding.top = v;
                style.padding.right = v;
                style.padding.bottom = v;
                style.padding.left = v;
                true
            }
            None => false,
        },
        "paddingTop" => set(&mut style.padding.top, length_percentage(value)),
        "paddingRight" => set(&mut style.padding.right, length_percentage(value)),
        "paddingBottom" => set(&mut style.padding.bottom, length_percentage(value)),
        "paddingLeft" => set(&mut style.padding.left, length_percentage(value)),

        "border" => match length_percentage(value) {
            Some(v) => {
                style.border.top = v;
                style.border.right = v;
                style.border.bottom = v;
                style.border.left = v;
                true
            }
            None => false,
        },
        "borderTop" => set(&mut style.border.top, length_percentage(value)),
        "borderRight" => set(&mut style.border.right, length_percentage(value)),
        "borderBottom" => set(&mut style.border.bottom, length_percentage(value)),
        "borderLeft" => set(&mut style.border.left, length_percentage(value)),

        "overflow" => set(
            &mut style.overflow,
            keyword(value)
                .and_then(convert_overflow)
                .map(|o| TaffyPoint { x: o, y: o }),
        ),

        _ => false,
    }
}

fn set<T>(slot: &mut T, value: Option<T>) -> bool {
    match value {
        Some(v) => {
            *slot = v;
            true
        }
        None => false,
    }
}

fn keyword(value: &Value) -> Option<&str> {
    value.as_text().map(str::trim)
}

/// `"50%"` as a percentage, anything else numeric as points
fn parse_percent(text: &str) -> Option<f32> {
    text.trim()
        .strip_suffix('%')
        .and_then(|n| n.trim().parse::<f32>().ok())
}

fn dimension(value: &Value) -> Option<Dimension> {
    match value {
        Value::Number(n) => Some(length(*n)),
        Value::Percent(p) => Some(percent(*p / 100.0)),
        Value::Auto => Some(auto()),
        Value::Text(s) if s.trim() == "auto" => Some(auto()),
        Value::Text(s) => parse_percent(s).map(|p| percent(p / 100.0)),
        _ => None,
    }
}

fn length_percentage(value: &Value) -> Option<LengthPercentage> {
    match value {
        Value::Number(n) => Some(length(*n)),
        Value::Percent(p) => Some(percent(*p / 100.0)),
        Value::Text(s) => parse_percent(s).map(|p| percent(p / 100.0)),
        _ => None,
    }
}

fn length_percentage_auto(value: &Value) -> Option<LengthPercentageAuto> {
    match value {
        Value::Number(n) => Some(length(*n)),
        Value::Percent(p) => Some(percent(*p / 100.0)),
        Value::Auto => Some(auto()),
        Value::Text(s) if s.trim() == "auto" => Some(auto()),
        Value::Text(s) => parse_percent(s).map(|p| percent(p / 100.0)),
        _ => None,
    }
}

fn convert_position(kw: &str) -> Option<Position> {
    match kw {
        "relative" => Some(Position::Relative),
        "absolute" => Some(Position::Absolute),
        _ => None,
    }
}

fn convert_display(kw: &str) -> Option<Display> {
    match kw {
        "flex" => Some(Display::Flex),
        "none" => Some(Display::None),
        _ => None,
    }
}

fn convert_align_items(kw: &str) -> Option<AlignItems> {
    match kw {
        "flex-start" => Some(AlignItems::FlexStart),
        "flex-end" => Some(AlignItems::FlexEnd),
        "start" => Some(AlignItems::Start),
        "end" => Some(AlignItems::End),
        "center" => Some(AlignItems::Center),
        "baseline" => Some(AlignItems::Baseline),
        "stretch" => Some(AlignItems::Stretch),
        _ => None,
    }
}

fn convert_align_content(kw: &str) -> Option<AlignContent> {
    match kw {
        "flex-start" => Some(AlignContent::FlexStart),
        "flex-end" => Some(AlignContent::FlexEnd),
        "start" => Some(AlignContent::Start),
        "end" => Some(AlignContent::End),
        "center" => Some(AlignContent::Center),
        "stretch" => Some(AlignContent::Stretch),
        "space-between" => Some(AlignContent::SpaceBetween),
        "space-around" => Some(AlignContent::SpaceAround),
        "space-evenly" => Some(AlignContent::SpaceEvenly),
        _ => None,
    }
}

fn convert_flex_direction(kw: &str) -> Option<FlexDirection> {
    match kw {
        "row" => Some(FlexDirection::Row),
        "row-reverse" => Some(FlexDirection::RowReverse),
        "column" => Some(FlexDirection::Column),
        "column-reverse" => Some(FlexDirection::ColumnReverse),
        _ => None,
    }
}

fn convert_flex_wrap(kw: &str) -> Option<FlexWrap> {
    match kw {
        "nowrap" => Some(FlexWrap::NoWrap),
        "wrap" => Some(FlexWrap::Wrap),
        "wrap-reverse" => Some(FlexWrap::WrapReverse),
        _ => None,
    }
}

fn convert_overflow(kw: &str) -> Option<Overflow> {
    match kw {
        "visible" => Some(Overflow::Visible),
        "hidden" => Some(Overflow::Hidden),
        "scroll" => Some(Overflow::Scroll),
        _ => None,
    }
}
