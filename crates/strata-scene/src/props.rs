//! Property snapshots
//!
//! A node's props are an open-ended map from names to [`PropValue`]s. Keys the
//! layout and paint passes do not understand are kept but never read.

use crate::animation::{TweenHandle, TweenInstruction};
use crate::events::{Event, EventHandler};
use crate::value::{Color, Value};
use std::collections::btree_map::{self, BTreeMap};
use std::fmt;
use std::rc::Rc;

/// One property as sent by the reconciler
#[derive(Clone)]
pub enum PropValue {
    Static(Value),
    Instruction(TweenInstruction),
    /// A tween that is already running, passed through instead of re-derived
    Animation(TweenHandle),
    Handler(EventHandler),
}

impl PropValue {
    pub fn as_static(&self) -> Option<&Value> {
        match self {
            PropValue::Static(value) => Some(value),
            _ => None,
        }
    }

    pub fn as_handler(&self) -> Option<&EventHandler> {
        match self {
            PropValue::Handler(handler) => Some(handler),
            _ => None,
        }
    }
}

impl PartialEq for PropValue {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (PropValue::Static(a), PropValue::Static(b)) => a == b,
            (PropValue::Instruction(a), PropValue::Instruction(b)) => a == b,
            (PropValue::Animation(a), PropValue::Animation(b)) => Rc::ptr_eq(a, b),
            (PropValue::Handler(a), PropValue::Handler(b)) => Rc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl fmt::Debug for PropValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PropValue::Static(value) => f.debug_tuple("Static").field(value).finish(),
            PropValue::Instruction(instr) => f.debug_tuple("Instruction").field(instr).finish(),
            PropValue::Animation(handle) => match handle.try_borrow() {
                Ok(tween) => f.debug_tuple("Animation").field(tween.value()).finish(),
                Err(_) => f.write_str("Animation(<borrowed>)"),
            },
            PropValue::Handler(handler) => write!(f, "Handler({:p})", Rc::as_ptr(handler)),
        }
    }
}

impl From<Value> for PropValue {
    fn from(value: Value) -> Self {
        PropValue::Static(value)
    }
}

impl From<f32> for PropValue {
    fn from(n: f32) -> Self {
        PropValue::Static(n.into())
    }
}

impl From<f64> for PropValue {
    fn from(n: f64) -> Self {
        PropValue::Static(n.into())
    }
}

impl From<i32> for PropValue {
    fn from(n: i32) -> Self {
        PropValue::Static(n.into())
    }
}

impl From<bool> for PropValue {
    fn from(b: bool) -> Self {
        PropValue::Static(b.into())
    }
}

impl From<&str> for PropValue {
    fn from(s: &str) -> Self {
        PropValue::Static(s.into())
    }
}

impl From<String> for PropValue {
    fn from(s: String) -> Self {
        PropValue::Static(s.into())
    }
}

impl From<Color> for PropValue {
    fn from(c: Color) -> Self {
        PropValue::Static(c.into())
    }
}

impl From<TweenInstruction> for PropValue {
    fn from(instruction: TweenInstruction) -> Self {
        PropValue::Instruction(instruction)
    }
}

impl From<TweenHandle> for PropValue {
    fn from(handle: TweenHandle) -> Self {
        PropValue::Animation(handle)
    }
}

impl From<EventHandler> for PropValue {
    fn from(handler: EventHandler) -> Self {
        PropValue::Handler(handler)
    }
}

/// Snapshot of a node's properties
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Props {
    values: BTreeMap<String, PropValue>,
}

impl Props {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert
    pub fn with(mut self, key: impl Into<String>, value: impl Into<PropValue>) -> Self {
        self.values.insert(key.into(), value.into());
        self
    }

    /// Builder-style handler insert
    pub fn on(mut self, key: impl Into<String>, handler: impl Fn(&Event) + 'static) -> Self {
        let handler: EventHandler = Rc::new(handler);
        self.values.insert(key.into(), PropValue::Handler(handler));
        self
    }

    pub fn get(&self, key: &str) -> Option<&PropValue> {
        self.values.get(key)
    }

    pub fn static_value(&self, key: &str) -> Option<&Value> {
        self.get(key).and_then(PropValue::as_static)
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<PropValue>) {
        self.values.insert(key.into(), value.into());
    }

    pub fn remove(&mut self, key: &str) -> Option<PropValue> {
        self.values.remove(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(String::as_str)
    }

    pub fn iter(&self) -> btree_map::Iter<'_, String, PropValue> {
        self.values.iter()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Shallow merge: keys in `delta` overwrite, everything else persists.
    pub fn merged(&self, delta: &Props) -> Props {
        let mut values = self.values.clone();
        for (key, value) in &delta.values {
            values.insert(key.clone(), value.clone());
        }
        Props { values }
    }

    /// Keys whose value differs between `self` and `next`, split into the
    /// values to set and the keys to unset.
    pub fn delta_to(&self, next: &Props) -> (Props, Vec<String>) {
        let mut set = Props::new();
        for (key, value) in &next.values {
            if self.values.get(key) != Some(value) {
                set.values.insert(key.clone(), value.clone());
            }
        }
        let unset = self
            .values
            .keys()
            .filter(|key| !next.values.contains_key(*key))
            .cloned()
            .collect();
        (set, unset)
    }
}

impl<'a> IntoIterator for &'a Props {
    type Item = (&'a String, &'a PropValue);
    type IntoIter = btree_map::Iter<'a, String, PropValue>;

    fn into_iter(self) -> Self::IntoIter {
        self.values.iter()
    }
}

impl<K: Into<String>, V: Into<PropValue>> FromIterator<(K, V)> for Props {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Props {
            values: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}
