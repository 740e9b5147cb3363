//! The retained scene node

use crate::animation::AnimationTable;
use crate::backend::ContainerId;
use crate::geometry::{Bounds, Size};
use crate::layout::LayoutHandle;
use crate::props::{PropValue, Props};
use crate::value::Value;
use std::fmt;

/// Identity of a node within one scene. Ids are never reused, so looking
/// an id up doubles as a liveness check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(u64);

impl NodeId {
    pub fn from_raw(raw: u64) -> Self {
        Self(raw)
    }

    pub fn raw(self) -> u64 {
        self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A node of the scene tree.
///
/// Nodes live in the scene's arena; `children` owns the subtree and `parent`
/// is a lookup-only back reference.
#[derive(Debug)]
pub struct SceneNode {
    pub(crate) id: NodeId,
    pub(crate) props: Props,
    pub(crate) children: Vec<NodeId>,
    pub(crate) parent: Option<NodeId>,
    pub(crate) layout: LayoutHandle,
    pub(crate) container: ContainerId,
    pub(crate) animations: AnimationTable,
    pub(crate) is_text: bool,
    /// Size and absolute bounds reported by the previous render pass
    pub(crate) last_size: Option<Size>,
    pub(crate) last_bounds: Option<Bounds>,
}

impl SceneNode {
    pub(crate) fn new(
        id: NodeId,
        is_text: bool,
        layout: LayoutHandle,
        container: ContainerId,
    ) -> Self {
        Self {
            id,
            props: Props::new(),
            children: Vec::new(),
            parent: None,
            layout,
            container,
            animations: AnimationTable::new(),
            is_text,
            last_size: None,
            last_bounds: None,
        }
    }

    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn props(&self) -> &Props {
        &self.props
    }

    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn is_text(&self) -> bool {
        self.is_text
    }

    pub fn animations(&self) -> &AnimationTable {
        &self.animations
    }

    /// Effective value of `key`: the running tween's current value if the
    /// property is animating, otherwise its static value.
    ///
    /// A pending instruction that has not been reconciled yet resolves to
    /// nothing, as does an event handler.
    pub fn resolve(&self, key: &str) -> Option<Value> {
        if let Some(value) = self.animations.value(key) {
            return Some(value);
        }
        match self.props.get(key)? {
            PropValue::Static(value) => Some(value.clone()),
            PropValue::Animation(handle) => Some(handle.borrow().value().clone()),
            PropValue::Instruction(_) | PropValue::Handler(_) => None,
        }
    }

    /// Content of a text node, taken from the `value` prop
    pub fn text(&self) -> String {
        match self.resolve("value") {
            Some(Value::Text(text)) => text,
            Some(Value::Number(n)) => n.to_string(),
            Some(Value::Bool(b)) => b.to_string(),
            _ => String::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::animation::TweenInstruction;
    use crate::layout::LayoutEngine;
    use std::time::Duration;

    fn node(is_text: bool) -> SceneNode {
        let mut engine = LayoutEngine::new();
        let id = NodeId::from_raw(1);
        let layout = engine.create_node(id, is_text).unwrap();
        SceneNode::new(id, is_text, layout, ContainerId(1))
    }

    #[test]
    fn resolve_prefers_running_tween() {
        let mut n = node(false);
        let prev = PropValue::Static(Value::Number(10.0));
        let next =
            PropValue::Instruction(TweenInstruction::new(20.0, Duration::from_millis(100)));
        n.props.insert("width", next.clone());
        n.animations.reconcile("width", Some(&prev), Some(&next));
        n.animations.advance(1, Duration::from_millis(50));

        assert_eq!(n.resolve("width"), Some(Value::Number(15.0)));
    }

    #[test]
    fn resolve_skips_handlers_and_unknown_keys() {
        let mut n = node(false);
        n.props = Props::new().on("onClick", |_| {}).with("height", 3);

        assert_eq!(n.resolve("onClick"), None);
        assert_eq!(n.resolve("missing"), None);
        assert_eq!(n.resolve("height"), Some(Value::Number(3.0)));
    }

    #[test]
    fn text_renders_numbers() {
        let mut n = node(true);
        n.props.insert("value", 42);
        assert_eq!(n.text(), "42");
        n.props.insert("value", "hello");
        assert_eq!(n.text(), "hello");
    }

    #[test]
    fn display_is_compact() {
        assert_eq!(NodeId::from_raw(7).to_string(), "#7");
    }
}
