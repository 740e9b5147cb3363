//! Scene root: node arena, tree mutation, property updates and the frame loop
//!
//! The reconciler drives a [`Scene`] through a small imperative interface:
//! create nodes, attach and detach them, push property updates, and signal
//! the end of a batch with [`Scene::after_commit`]. The host drives it once
//! per display frame with [`Scene::frame`].
//!
//! Three child orders are kept identical after every mutation: the scene's
//! own `children` lists, the layout tree, and the backend container tree.

use crate::animation::{Reconciled, TweenInstruction};
use crate::backend::{Backend, ContainerId, ContainerKind};
use crate::config::SceneConfig;
use crate::error::{SceneError, SceneResult};
use crate::events::{diff_events, Event, EventKind};
use crate::geometry::{Rect, Size};
use crate::layout::{is_layout_property, LayoutEngine, LayoutHandle};
use crate::node::{NodeId, SceneNode};
use crate::props::{PropValue, Props};
use crate::render::cascaded_text_style;
use crate::style::TEXT_STYLE_PROPERTIES;
use crate::value::Value;
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::time::Duration;
use tracing::{debug, trace};

/// Summary of one [`Scene::frame`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrameReport {
    /// Nodes whose animations were advanced
    pub ticked: usize,
    /// Animations that reached their target
    pub completed: usize,
    /// Whether the layout pass ran
    pub layout: bool,
    /// Nodes pushed to the backend
    pub rendered: usize,
}

pub struct Scene<B: Backend> {
    pub(crate) nodes: HashMap<NodeId, SceneNode>,
    pub(crate) handles: HashMap<LayoutHandle, NodeId>,
    pub(crate) root: NodeId,
    next_id: u64,
    pub(crate) layout: LayoutEngine,
    pub(crate) backend: B,
    /// Nodes with at least one running tween
    registry: BTreeSet<NodeId>,
    pub(crate) viewport: Option<Size>,
    pub(crate) config: SceneConfig,
    frame: u64,
    /// Nodes waiting for an image source to finish loading
    pub(crate) pending_images: BTreeMap<String, BTreeSet<NodeId>>,
    layout_requested: bool,
}

impl<B: Backend> Scene<B> {
    pub fn new(backend: B) -> SceneResult<Self> {
        Self::with_config(backend, SceneConfig::default())
    }

    pub fn with_config(backend: B, config: SceneConfig) -> SceneResult<Self> {
        config.validate()?;

        let mut scene = Self {
            nodes: HashMap::new(),
            handles: HashMap::new(),
            root: NodeId::from_raw(0),
            next_id: 0,
            layout: LayoutEngine::new(),
            backend,
            registry: BTreeSet::new(),
            viewport: config.viewport.map(|v| Size {
                width: v.width,
                height: v.height,
            }),
            config,
            frame: 0,
            pending_images: BTreeMap::new(),
            layout_requested: false,
        };
        scene.root = scene.create_instance(false)?;
        Ok(scene)
    }

    // ---- queries ----

    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.nodes.contains_key(&id)
    }

    pub fn node(&self, id: NodeId) -> SceneResult<&SceneNode> {
        self.nodes.get(&id).ok_or(SceneError::NodeDestroyed(id))
    }

    fn node_mut(&mut self, id: NodeId) -> SceneResult<&mut SceneNode> {
        self.nodes.get_mut(&id).ok_or(SceneError::NodeDestroyed(id))
    }

    pub fn nodes(&self) -> impl Iterator<Item = &SceneNode> {
        self.nodes.values()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn children(&self, id: NodeId) -> SceneResult<&[NodeId]> {
        Ok(&self.node(id)?.children)
    }

    pub fn parent(&self, id: NodeId) -> SceneResult<Option<NodeId>> {
        Ok(self.node(id)?.parent)
    }

    pub fn props(&self, id: NodeId) -> SceneResult<&Props> {
        Ok(&self.node(id)?.props)
    }

    /// Effective value of a property: animated if a tween runs, static
    /// otherwise.
    pub fn resolve(&self, id: NodeId, key: &str) -> SceneResult<Option<Value>> {
        Ok(self.node(id)?.resolve(key))
    }

    /// Rectangle from the last layout pass, relative to the parent
    pub fn computed_rect(&self, id: NodeId) -> SceneResult<Rect> {
        self.layout.computed_rect(self.node(id)?.layout)
    }

    pub fn is_animating(&self, id: NodeId) -> bool {
        self.registry.contains(&id)
    }

    pub fn animating_nodes(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.registry.iter().copied()
    }

    /// Children of `id` as the layout tree sees them
    pub fn layout_children(&self, id: NodeId) -> SceneResult<Vec<NodeId>> {
        let handles = self.layout.children(self.node(id)?.layout)?;
        handles
            .into_iter()
            .map(|handle| {
                self.handles.get(&handle).copied().ok_or_else(|| {
                    SceneError::Layout(format!("layout node {handle:?} has no owner"))
                })
            })
            .collect()
    }

    pub fn container(&self, id: NodeId) -> SceneResult<ContainerId> {
        Ok(self.node(id)?.container)
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn backend_mut(&mut self) -> &mut B {
        &mut self.backend
    }

    pub fn config(&self) -> &SceneConfig {
        &self.config
    }

    pub fn viewport(&self) -> Option<Size> {
        self.viewport
    }

    /// Number of frames run so far
    pub fn frame_count(&self) -> u64 {
        self.frame
    }

    /// Instruction towards `to` using the configured default easing
    pub fn instruction(&self, to: impl Into<Value>, duration: Duration) -> TweenInstruction {
        TweenInstruction::new(to, duration).easing(self.config.default_easing)
    }

    // ---- reconciler interface ----

    /// Create a detached node. Text nodes are sized by measuring their
    /// `value` and cannot hold children.
    pub fn create_instance(&mut self, is_text: bool) -> SceneResult<NodeId> {
        self.next_id += 1;
        let id = NodeId::from_raw(self.next_id);

        let layout = self.layout.create_node(id, is_text)?;
        let kind = if is_text {
            ContainerKind::Text
        } else {
            ContainerKind::View
        };
        let container = self.backend.create_container(kind);

        self.handles.insert(layout, id);
        self.nodes
            .insert(id, SceneNode::new(id, is_text, layout, container));
        debug!(node = %id, is_text, %container, "created node");
        Ok(id)
    }

    /// Append `child` as the last child of `parent`, detaching it from its
    /// current parent first.
    pub fn append_child(&mut self, parent: NodeId, child: NodeId) -> SceneResult<()> {
        self.check_insertable(parent, child)?;
        self.detach(child)?;
        let index = self.node(parent)?.children.len();
        self.attach(parent, child, index)
    }

    /// Insert `child` into `parent` right before `before`.
    pub fn insert_before(
        &mut self,
        parent: NodeId,
        child: NodeId,
        before: NodeId,
    ) -> SceneResult<()> {
        self.check_insertable(parent, child)?;
        if self.node(before)?.parent != Some(parent) {
            return Err(SceneError::InvalidOperation(format!(
                "cannot insert before {before}: not a child of {parent}"
            )));
        }
        if child == before {
            return Ok(());
        }

        self.detach(child)?;
        let index = self
            .node(parent)?
            .children
            .iter()
            .position(|c| *c == before)
            .ok_or_else(|| {
                SceneError::InvalidOperation(format!("{before} vanished from {parent}"))
            })?;
        self.attach(parent, child, index)
    }

    /// Detach `child` from `parent`. The child stays alive until destroyed.
    pub fn remove_child(&mut self, parent: NodeId, child: NodeId) -> SceneResult<()> {
        self.node(parent)?;
        if self.node(child)?.parent != Some(parent) {
            return Err(SceneError::InvalidOperation(format!(
                "cannot remove {child}: not a child of {parent}"
            )));
        }
        self.detach(child)
    }

    /// Shallow-merge `delta` into the node's props.
    pub fn update_props(&mut self, id: NodeId, delta: Props) -> SceneResult<()> {
        let next = self.node(id)?.props.merged(&delta);
        self.apply_props(id, next)
    }

    /// Apply the difference between two snapshots sent by the reconciler.
    ///
    /// Keys added or changed from `prev` to `next` are merged in; keys that
    /// `next` no longer carries are removed.
    pub fn commit_update(&mut self, id: NodeId, prev: &Props, next: &Props) -> SceneResult<()> {
        let (set, unset) = prev.delta_to(next);
        let mut snapshot = self.node(id)?.props.merged(&set);
        for key in &unset {
            snapshot.remove(key);
        }
        self.apply_props(id, snapshot)
    }

    /// Destroy `id` and its whole subtree, releasing layout nodes,
    /// containers, registry entries and pending image loads.
    pub fn destroy(&mut self, id: NodeId) -> SceneResult<()> {
        if id == self.root {
            return Err(SceneError::InvalidOperation(
                "the root node cannot be destroyed".to_string(),
            ));
        }
        self.node(id)?;
        self.detach(id)?;

        let mut doomed = Vec::new();
        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            if let Some(node) = self.nodes.get(&current) {
                stack.extend(node.children.iter().copied());
                doomed.push(current);
            }
        }

        for current in doomed.into_iter().rev() {
            self.registry.remove(&current);
            self.pending_images.retain(|_, waiting| {
                waiting.remove(&current);
                !waiting.is_empty()
            });
            if let Some(node) = self.nodes.remove(&current) {
                self.handles.remove(&node.layout);
                self.layout.release(node.layout)?;
                self.backend.destroy_container(node.container);
                debug!(node = %current, "destroyed node");
            }
        }
        Ok(())
    }

    /// End of a reconciler batch: lay out and render the whole tree.
    pub fn after_commit(&mut self) -> SceneResult<()> {
        if self.run_layout()? {
            self.render_all()?;
        }
        Ok(())
    }

    pub fn set_viewport(&mut self, width: f32, height: f32) -> SceneResult<()> {
        if !(width.is_finite() && height.is_finite() && width >= 0.0 && height >= 0.0) {
            return Err(SceneError::InvalidOperation(format!(
                "viewport must be finite and non-negative, got {width}x{height}"
            )));
        }
        self.viewport = Some(Size { width, height });
        debug!(width, height, "viewport changed");
        self.after_commit()
    }

    /// Advance every running tween by `dt` (clamped to the configured
    /// maximum), then lay out and render what changed.
    pub fn frame(&mut self, dt: Duration) -> SceneResult<FrameReport> {
        let dt = dt.min(self.config.max_frame_delta());
        self.frame += 1;
        let frame = self.frame;

        let mut report = FrameReport::default();
        let mut needs_layout = self.layout_requested;
        let mut callbacks = Vec::new();
        let mut restyled = Vec::new();
        let ticked: Vec<NodeId> = self.registry.iter().copied().collect();

        for id in &ticked {
            let Some(node) = self.nodes.get_mut(id) else {
                self.registry.remove(id);
                continue;
            };

            let touched: Vec<String> = node.animations.keys().map(str::to_string).collect();
            for done in node.animations.advance(frame, dt) {
                trace!(node = %id, key = %done.key, "animation completed");
                node.props
                    .insert(done.key, PropValue::Static(done.target));
                callbacks.extend(done.on_complete);
                report.completed += 1;
            }

            for key in touched.iter().filter(|k| is_layout_property(k)) {
                if let Some(value) = node.resolve(key) {
                    needs_layout |= self.layout.set_property(node.layout, key, &value)?;
                }
            }
            if touched
                .iter()
                .any(|k| TEXT_STYLE_PROPERTIES.contains(&k.as_str()))
            {
                restyled.push(*id);
            }
            if node.animations.is_empty() {
                self.registry.remove(id);
            }
            report.ticked += 1;
        }

        for id in restyled {
            needs_layout |= self.mark_text_dirty(id)?;
        }

        for callback in callbacks {
            callback();
        }

        if needs_layout {
            self.layout_requested = true;
            if self.run_layout()? {
                report.layout = true;
                report.rendered = self.render_all()?;
            }
        } else {
            for id in &ticked {
                if self.nodes.contains_key(id) && self.render_one(*id)? {
                    report.rendered += 1;
                }
            }
        }

        trace!(
            frame,
            ticked = report.ticked,
            completed = report.completed,
            layout = report.layout,
            "frame"
        );
        Ok(report)
    }

    /// An image source finished loading: re-render every live node that
    /// was waiting for it, once. Returns how many were re-rendered.
    pub fn image_loaded(&mut self, source: &str) -> SceneResult<usize> {
        let Some(waiting) = self.pending_images.remove(source) else {
            return Ok(0);
        };
        let mut rendered = 0;
        for id in waiting {
            if self.nodes.contains_key(&id) && self.render_one(id)? {
                rendered += 1;
            }
        }
        debug!(source, rendered, "image loaded");
        Ok(rendered)
    }

    /// An image source failed: the waiting nodes keep rendering without it.
    pub fn image_failed(&mut self, source: &str, reason: &str) {
        let waiting = self
            .pending_images
            .remove(source)
            .map(|w| w.len())
            .unwrap_or(0);
        tracing::warn!(source, reason, waiting, "image failed to load");
    }

    /// Deliver `event` to the node's listeners for `kind`.
    pub fn emit_event(&mut self, id: NodeId, kind: EventKind, event: Event) -> SceneResult<()> {
        let container = self.node(id)?.container;
        self.backend.emit(container, kind, &event);
        Ok(())
    }

    // ---- internals ----

    fn check_insertable(&self, parent: NodeId, child: NodeId) -> SceneResult<()> {
        let parent_node = self.node(parent)?;
        self.node(child)?;

        if parent_node.is_text {
            return Err(SceneError::InvalidOperation(format!(
                "text node {parent} cannot have children"
            )));
        }
        if child == self.root {
            return Err(SceneError::InvalidOperation(
                "the root node cannot be a child".to_string(),
            ));
        }

        let mut cursor = Some(parent);
        while let Some(current) = cursor {
            if current == child {
                return Err(SceneError::InvalidOperation(format!(
                    "cannot insert {child} into its own subtree"
                )));
            }
            cursor = self.node(current)?.parent;
        }
        Ok(())
    }

    fn attach(&mut self, parent: NodeId, child: NodeId, index: usize) -> SceneResult<()> {
        let (child_layout, child_container) = {
            let node = self.node(child)?;
            (node.layout, node.container)
        };
        let (parent_layout, parent_container) = {
            let node = self.node(parent)?;
            (node.layout, node.container)
        };

        self.layout.insert_child(parent_layout, child_layout, index)?;
        self.backend
            .insert_child_at(parent_container, child_container, index);
        self.node_mut(parent)?.children.insert(index, child);
        self.node_mut(child)?.parent = Some(parent);
        self.layout_requested = true;
        Ok(())
    }

    fn detach(&mut self, child: NodeId) -> SceneResult<()> {
        let node = self.node_mut(child)?;
        let Some(parent) = node.parent.take() else {
            return Ok(());
        };
        let (child_layout, child_container) = (node.layout, node.container);

        let parent_node = self.node_mut(parent)?;
        parent_node.children.retain(|c| *c != child);
        let (parent_layout, parent_container) = (parent_node.layout, parent_node.container);

        self.layout.remove_child(parent_layout, child_layout)?;
        self.backend.remove_child(parent_container, child_container);
        self.layout_requested = true;
        Ok(())
    }

    /// Replace the node's props with `next`: rebind listeners, reconcile
    /// tweens, then push layout attributes.
    fn apply_props(&mut self, id: NodeId, mut next: Props) -> SceneResult<()> {
        let node = self
            .nodes
            .get_mut(&id)
            .ok_or(SceneError::NodeDestroyed(id))?;
        let prev = std::mem::take(&mut node.props);
        let container = node.container;

        let diff = diff_events(&prev, &next);
        if !diff.is_empty() {
            trace!(node = %id, ?diff, "rebinding listeners");
        }
        for (kind, handler) in &diff.removed {
            self.backend.remove_listener(container, *kind, handler);
        }
        for (kind, (old, new)) in &diff.changed {
            self.backend.remove_listener(container, *kind, old);
            self.backend.add_listener(container, *kind, new.clone());
        }
        for (kind, handler) in &diff.added {
            self.backend.add_listener(container, *kind, handler.clone());
        }
        let interactive = self.backend.listener_count(container) > 0;
        self.backend.set_interactive(container, interactive);

        let mut restyled = false;
        let mut settled = Vec::new();
        let keys: BTreeSet<&str> = prev.keys().chain(next.keys()).collect();
        for key in keys {
            let (before, after) = (prev.get(key), next.get(key));
            if before == after {
                continue;
            }
            restyled |= TEXT_STYLE_PROPERTIES.contains(&key);
            let outcome = node.animations.reconcile(key, before, after);
            match outcome {
                Reconciled::Unchanged => {}
                Reconciled::Settled => settled.push(key.to_string()),
                _ => trace!(node = %id, key, ?outcome, "reconciled property"),
            }
        }
        // Already at the target: keep the static value, no tween and no
        // completion callback.
        for key in settled {
            if let Some(value) = prev.static_value(&key).cloned() {
                next.insert(key, PropValue::Static(value));
            }
        }
        node.props = next;

        let mut pushed = false;
        for key in node.props.keys().filter(|k| is_layout_property(k)) {
            if let Some(value) = node.resolve(key) {
                pushed |= self.layout.set_property(node.layout, key, &value)?;
            }
        }

        if node.animations.is_empty() {
            self.registry.remove(&id);
        } else {
            self.registry.insert(id);
        }

        self.layout_requested |= pushed;
        if node.is_text || restyled {
            self.mark_text_dirty(id)?;
        }
        Ok(())
    }

    /// Mark every text node in the subtree of `id` for re-measurement.
    fn mark_text_dirty(&mut self, id: NodeId) -> SceneResult<bool> {
        let mut marked = false;
        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            let Some(node) = self.nodes.get(&current) else {
                continue;
            };
            if node.is_text {
                self.layout.mark_dirty(node.layout)?;
                marked = true;
            }
            stack.extend(node.children.iter().copied());
        }
        self.layout_requested |= marked;
        Ok(marked)
    }

    /// Lay out the tree against the viewport. Returns `false` while no
    /// viewport is known.
    fn run_layout(&mut self) -> SceneResult<bool> {
        let Some(viewport) = self.viewport else {
            trace!("layout deferred until a viewport is set");
            return Ok(false);
        };

        let root = self.node(self.root)?;
        let root_layout = root.layout;
        if root.resolve("width").is_none() {
            self.layout
                .set_property(root_layout, "width", &Value::Number(viewport.width))?;
        }
        if self.node(self.root)?.resolve("height").is_none() {
            self.layout
                .set_property(root_layout, "height", &Value::Number(viewport.height))?;
        }

        let nodes = &self.nodes;
        let backend = &self.backend;
        let word_wrap = self.config.word_wrap;
        self.layout.compute(
            root_layout,
            viewport.width,
            viewport.height,
            |owner, max_width| match nodes.get(&owner) {
                Some(node) => {
                    let style = cascaded_text_style(nodes, owner, word_wrap);
                    backend.measure_text(&node.text(), &style, max_width).into()
                }
                None => Size::default(),
            },
        )?;

        self.layout_requested = false;
        debug!(
            width = viewport.width,
            height = viewport.height,
            nodes = self.nodes.len(),
            "layout pass"
        );
        Ok(true)
    }
}
