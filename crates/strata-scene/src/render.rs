//! Render pass: computed layout and effective props to backend state

use crate::backend::{Backend, ImageStatus};
use crate::error::{SceneError, SceneResult};
use crate::events::{Event, EventKind};
use crate::geometry::{Bounds, Point};
use crate::node::{NodeId, SceneNode};
use crate::scene::Scene;
use crate::style::{resolve_transform, PaintStyle, TextStyle};
use std::collections::HashMap;
use tracing::warn;

/// Text style of `id` with every unset field inherited from the nearest
/// ancestor that sets it. `word_wrap` is the value used when nobody does.
pub(crate) fn cascaded_text_style(
    nodes: &HashMap<NodeId, SceneNode>,
    id: NodeId,
    word_wrap: bool,
) -> TextStyle {
    let mut chain = Vec::new();
    let mut cursor = nodes.get(&id);
    while let Some(node) = cursor {
        chain.push(node);
        cursor = node.parent.and_then(|parent| nodes.get(&parent));
    }

    let mut style = TextStyle {
        word_wrap: Some(word_wrap),
        ..Default::default()
    };
    for node in chain.into_iter().rev() {
        style = TextStyle::from_lookup(|key| node.resolve(key)).cascade(&style);
    }
    style
}

impl<B: Backend> Scene<B> {
    /// Depth-first render of the whole tree. Returns the number of nodes
    /// rendered, zero while no viewport is known.
    pub(crate) fn render_all(&mut self) -> SceneResult<usize> {
        if self.viewport.is_none() {
            return Ok(0);
        }

        let mut rendered = 0;
        let mut stack = vec![(self.root, Point::default())];
        while let Some((id, parent_origin)) = stack.pop() {
            let origin = self.render_node(id, parent_origin)?;
            rendered += 1;
            let children = &self.node(id)?.children;
            stack.extend(children.iter().rev().map(|child| (*child, origin)));
        }
        Ok(rendered)
    }

    /// Render a single node outside a full pass.
    pub(crate) fn render_one(&mut self, id: NodeId) -> SceneResult<bool> {
        if self.viewport.is_none() {
            return Ok(false);
        }
        let origin = self.absolute_origin(self.node(id)?.parent)?;
        self.render_node(id, origin)?;
        Ok(true)
    }

    fn absolute_origin(&self, mut cursor: Option<NodeId>) -> SceneResult<Point> {
        let mut origin = Point::default();
        while let Some(id) = cursor {
            let node = self.node(id)?;
            let rect = self.layout.computed_rect(node.layout)?;
            origin.x += rect.left;
            origin.y += rect.top;
            cursor = node.parent;
        }
        Ok(origin)
    }

    /// Push one node's transform and paint to its container. Returns the
    /// node's absolute origin for its children.
    fn render_node(&mut self, id: NodeId, parent_origin: Point) -> SceneResult<Point> {
        let node = self.nodes.get(&id).ok_or(SceneError::NodeDestroyed(id))?;
        let rect = self.layout.computed_rect(node.layout)?;
        let container = node.container;
        let lookup = |key: &str| node.resolve(key);

        self.backend
            .set_transform(container, resolve_transform(rect, lookup));

        if node.is_text {
            let style = cascaded_text_style(&self.nodes, id, self.config.word_wrap);
            self.backend.set_text(container, &node.text(), &style);
        } else {
            let paint = PaintStyle::from_lookup(lookup);
            let image_ready = match &paint.image {
                Some(fill) => match self.backend.image_status(&fill.source) {
                    ImageStatus::Ready => true,
                    ImageStatus::Loading => {
                        self.pending_images
                            .entry(fill.source.clone())
                            .or_default()
                            .insert(id);
                        false
                    }
                    ImageStatus::Failed(reason) => {
                        warn!(node = %id, source = %fill.source, %reason, "background image unavailable");
                        false
                    }
                },
                None => true,
            };
            let local = rect.local();
            self.backend
                .set_effects(container, paint.effects(local, image_ready));
            self.backend.set_mask(container, paint.mask(local));
        }

        let origin = Point::new(parent_origin.x + rect.left, parent_origin.y + rect.top);
        let size = rect.size();
        let bounds = Bounds::from_origin(origin, size);
        let size_changed = node.last_size != Some(size);
        let bounds_changed = node.last_bounds != Some(bounds);

        if size_changed {
            self.backend
                .emit(container, EventKind::SizeChanged, &Event::SizeChanged(size));
        }
        if bounds_changed {
            self.backend.emit(
                container,
                EventKind::BoundsChanged,
                &Event::BoundsChanged(bounds),
            );
        }
        if let Some(node) = self.nodes.get_mut(&id) {
            node.last_size = Some(size);
            node.last_bounds = Some(bounds);
        }
        Ok(origin)
    }
}
