//! In-memory backend
//!
//! Records the container tree, paint state and listeners instead of drawing
//! them. Text is measured on a monospace grid: every cell is half the font
//! size wide and lines are 1.2 font sizes tall.

use crate::backend::{
    Backend, ContainerId, ContainerKind, ImageStatus, Mask, PaintOp, TextMetrics, Transform,
};
use crate::events::{Event, EventHandler, EventKind};
use crate::style::TextStyle;
use std::collections::{BTreeMap, HashMap};
use std::fmt::Write as _;
use std::rc::Rc;
use textwrap::{wrap, Options, WordSplitter};
use tracing::trace;
use unicode_width::UnicodeWidthStr;

const CELL_WIDTH_RATIO: f32 = 0.5;
const LINE_HEIGHT_RATIO: f32 = 1.2;

/// Recorded state of one container
#[derive(Default)]
pub struct ContainerState {
    kind: Option<ContainerKind>,
    parent: Option<ContainerId>,
    children: Vec<ContainerId>,
    transform: Transform,
    effects: Vec<PaintOp>,
    mask: Option<Mask>,
    text: Option<(String, TextStyle)>,
    listeners: Vec<(EventKind, EventHandler)>,
    interactive: bool,
}

impl ContainerState {
    pub fn kind(&self) -> ContainerKind {
        self.kind.unwrap_or(ContainerKind::View)
    }

    pub fn parent(&self) -> Option<ContainerId> {
        self.parent
    }

    pub fn transform(&self) -> &Transform {
        &self.transform
    }

    pub fn effects(&self) -> &[PaintOp] {
        &self.effects
    }

    pub fn mask(&self) -> Option<&Mask> {
        self.mask.as_ref()
    }

    pub fn text(&self) -> Option<&str> {
        self.text.as_ref().map(|(text, _)| text.as_str())
    }

    pub fn text_style(&self) -> Option<&TextStyle> {
        self.text.as_ref().map(|(_, style)| style)
    }

    pub fn is_interactive(&self) -> bool {
        self.interactive
    }

    /// Handlers bound to `kind`, in registration order
    pub fn handlers(&self, kind: EventKind) -> Vec<EventHandler> {
        self.listeners
            .iter()
            .filter(|(k, _)| *k == kind)
            .map(|(_, h)| Rc::clone(h))
            .collect()
    }
}

#[derive(Default)]
pub struct HeadlessBackend {
    next_id: u64,
    containers: BTreeMap<ContainerId, ContainerState>,
    images: HashMap<String, ImageStatus>,
}

impl HeadlessBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn container(&self, id: ContainerId) -> Option<&ContainerState> {
        self.containers.get(&id)
    }

    /// Number of live containers
    pub fn len(&self) -> usize {
        self.containers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.containers.is_empty()
    }

    /// Set what [`Backend::image_status`] reports for `source`. Sources
    /// never set here are ready.
    pub fn set_image_status(&mut self, source: impl Into<String>, status: ImageStatus) {
        self.images.insert(source.into(), status);
    }

    /// Indented text rendering of the container tree under `root`
    pub fn dump(&self, root: ContainerId) -> String {
        let mut out = String::new();
        self.dump_into(root, 0, &mut out);
        out
    }

    fn dump_into(&self, id: ContainerId, depth: usize, out: &mut String) {
        let Some(state) = self.containers.get(&id) else {
            return;
        };
        let t = &state.transform;
        let kind = match state.kind() {
            ContainerKind::View => "view",
            ContainerKind::Text => "text",
        };
        let _ = write!(
            out,
            "{:indent$}{id} {kind} at ({}, {})",
            "",
            t.position.x - t.pivot.x,
            t.position.y - t.pivot.y,
            indent = depth * 2
        );
        if t.alpha != 1.0 {
            let _ = write!(out, " alpha={}", t.alpha);
        }
        for op in &state.effects {
            match op {
                PaintOp::Fill { rect, color, .. } => {
                    let _ = write!(out, " fill={color} {}x{}", rect.width, rect.height);
                }
                PaintOp::Image { fill, .. } => {
                    let _ = write!(out, " image={}", fill.source);
                }
                PaintOp::Border { edges, .. } => {
                    let _ = write!(out, " border={:?}", edges.widths);
                }
            }
        }
        if state.mask.is_some() {
            let _ = write!(out, " clip");
        }
        if let Some(text) = state.text() {
            let _ = write!(out, " {text:?}");
        }
        if state.interactive {
            let _ = write!(out, " interactive");
        }
        out.push('\n');

        for child in &state.children {
            self.dump_into(*child, depth + 1, out);
        }
    }

    fn detach(&mut self, child: ContainerId) {
        let parent = self.containers.get_mut(&child).and_then(|c| c.parent.take());
        if let Some(parent) = parent.and_then(|p| self.containers.get_mut(&p)) {
            parent.children.retain(|c| *c != child);
        }
    }
}

impl Backend for HeadlessBackend {
    fn create_container(&mut self, kind: ContainerKind) -> ContainerId {
        self.next_id += 1;
        let id = ContainerId(self.next_id);
        self.containers.insert(
            id,
            ContainerState {
                kind: Some(kind),
                ..Default::default()
            },
        );
        id
    }

    fn destroy_container(&mut self, container: ContainerId) {
        self.detach(container);
        if let Some(state) = self.containers.remove(&container) {
            for child in state.children {
                if let Some(child) = self.containers.get_mut(&child) {
                    child.parent = None;
                }
            }
        }
    }

    fn add_child(&mut self, parent: ContainerId, child: ContainerId) {
        let index = self
            .containers
            .get(&parent)
            .map(|p| p.children.len())
            .unwrap_or(0);
        self.insert_child_at(parent, child, index);
    }

    fn insert_child_at(&mut self, parent: ContainerId, child: ContainerId, index: usize) {
        if !self.containers.contains_key(&parent) || !self.containers.contains_key(&child) {
            return;
        }
        self.detach(child);
        if let Some(p) = self.containers.get_mut(&parent) {
            let index = index.min(p.children.len());
            p.children.insert(index, child);
        }
        if let Some(c) = self.containers.get_mut(&child) {
            c.parent = Some(parent);
        }
    }

    fn remove_child(&mut self, parent: ContainerId, child: ContainerId) {
        if self.containers.get(&child).and_then(|c| c.parent) == Some(parent) {
            self.detach(child);
        }
    }

    fn children(&self, container: ContainerId) -> Vec<ContainerId> {
        self.containers
            .get(&container)
            .map(|c| c.children.clone())
            .unwrap_or_default()
    }

    fn set_transform(&mut self, container: ContainerId, transform: Transform) {
        if let Some(c) = self.containers.get_mut(&container) {
            c.transform = transform;
        }
    }

    fn set_effects(&mut self, container: ContainerId, effects: Vec<PaintOp>) {
        if let Some(c) = self.containers.get_mut(&container) {
            c.effects = effects;
        }
    }

    fn set_mask(&mut self, container: ContainerId, mask: Option<Mask>) {
        if let Some(c) = self.containers.get_mut(&container) {
            c.mask = mask;
        }
    }

    fn set_text(&mut self, container: ContainerId, text: &str, style: &TextStyle) {
        if let Some(c) = self.containers.get_mut(&container) {
            c.text = Some((text.to_string(), style.clone()));
        }
    }

    fn add_listener(&mut self, container: ContainerId, kind: EventKind, handler: EventHandler) {
        if let Some(c) = self.containers.get_mut(&container) {
            c.listeners.push((kind, handler));
        }
    }

    fn remove_listener(&mut self, container: ContainerId, kind: EventKind, handler: &EventHandler) {
        if let Some(c) = self.containers.get_mut(&container) {
            if let Some(pos) = c
                .listeners
                .iter()
                .position(|(k, h)| *k == kind && Rc::ptr_eq(h, handler))
            {
                c.listeners.remove(pos);
            }
        }
    }

    fn listener_count(&self, container: ContainerId) -> usize {
        self.containers
            .get(&container)
            .map(|c| c.listeners.len())
            .unwrap_or(0)
    }

    fn set_interactive(&mut self, container: ContainerId, interactive: bool) {
        if let Some(c) = self.containers.get_mut(&container) {
            c.interactive = interactive;
        }
    }

    fn emit(&mut self, container: ContainerId, kind: EventKind, event: &Event) {
        let handlers = self
            .containers
            .get(&container)
            .map(|c| c.handlers(kind))
            .unwrap_or_default();
        trace!(%container, event = kind.backend_name(), handlers = handlers.len(), "emit");
        for handler in handlers {
            handler(event);
        }
    }

    fn image_status(&mut self, source: &str) -> ImageStatus {
        self.images
            .get(source)
            .cloned()
            .unwrap_or(ImageStatus::Ready)
    }

    fn measure_text(&self, text: &str, style: &TextStyle, max_width: Option<f32>) -> TextMetrics {
        if text.is_empty() {
            return TextMetrics::default();
        }

        let font_size = style.font_size_or_default();
        let cell = font_size * CELL_WIDTH_RATIO + style.letter_spacing.unwrap_or(0.0);
        let line_height = font_size * LINE_HEIGHT_RATIO;

        let lines: Vec<String> = match max_width.filter(|_| style.wraps() && cell > 0.0) {
            Some(width) => {
                let columns = ((width / cell).floor() as usize).max(1);
                let options = Options::new(columns).word_splitter(WordSplitter::NoHyphenation);
                wrap(text, options)
                    .into_iter()
                    .map(|line| line.into_owned())
                    .collect()
            }
            None => text.lines().map(str::to_string).collect(),
        };

        let columns = lines.iter().map(|l| l.width()).max().unwrap_or(0);
        TextMetrics {
            width: columns as f32 * cell,
            height: lines.len() as f32 * line_height,
            lines: lines.len(),
        }
    }
}
