//! Event handler props and the diff between two snapshots

use crate::geometry::{Bounds, Point, Size};
use crate::props::Props;
use std::collections::BTreeMap;
use std::rc::Rc;

/// Handler attached through an `on*` prop. Identity is pointer identity.
pub type EventHandler = Rc<dyn Fn(&Event)>;

/// Payload delivered to handlers
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Event {
    Pointer(Point),
    SizeChanged(Size),
    BoundsChanged(Bounds),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum EventKind {
    Click,
    RightClick,
    MouseUp,
    MouseDown,
    MouseEnter,
    MouseLeave,
    MouseMove,
    TouchStart,
    TouchEnd,
    TouchMove,
    TouchCancel,
    TouchEndOutside,
    SizeChanged,
    BoundsChanged,
}

impl EventKind {
    pub const ALL: [EventKind; 14] = [
        EventKind::Click,
        EventKind::RightClick,
        EventKind::MouseUp,
        EventKind::MouseDown,
        EventKind::MouseEnter,
        EventKind::MouseLeave,
        EventKind::MouseMove,
        EventKind::TouchStart,
        EventKind::TouchEnd,
        EventKind::TouchMove,
        EventKind::TouchCancel,
        EventKind::TouchEndOutside,
        EventKind::SizeChanged,
        EventKind::BoundsChanged,
    ];

    /// Event kind for a prop name such as `onClick`
    pub fn from_prop(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.prop_name() == name)
    }

    pub fn prop_name(self) -> &'static str {
        match self {
            EventKind::Click => "onClick",
            EventKind::RightClick => "onRightClick",
            EventKind::MouseUp => "onMouseUp",
            EventKind::MouseDown => "onMouseDown",
            EventKind::MouseEnter => "onMouseEnter",
            EventKind::MouseLeave => "onMouseLeave",
            EventKind::MouseMove => "onMouseMove",
            EventKind::TouchStart => "onTouchStart",
            EventKind::TouchEnd => "onTouchEnd",
            EventKind::TouchMove => "onTouchMove",
            EventKind::TouchCancel => "onTouchCancel",
            EventKind::TouchEndOutside => "onTouchEndOutside",
            EventKind::SizeChanged => "onSizeChanged",
            EventKind::BoundsChanged => "onBoundsChanged",
        }
    }

    /// Name of the event on the rendering surface
    pub fn backend_name(self) -> &'static str {
        match self {
            EventKind::Click => "click",
            EventKind::RightClick => "rightclick",
            EventKind::MouseUp => "mouseup",
            EventKind::MouseDown => "mousedown",
            EventKind::MouseEnter => "mouseover",
            EventKind::MouseLeave => "mouseout",
            EventKind::MouseMove => "mousemove",
            EventKind::TouchStart => "touchstart",
            EventKind::TouchEnd => "touchend",
            EventKind::TouchMove => "touchmove",
            EventKind::TouchCancel => "touchcancel",
            EventKind::TouchEndOutside => "touchendoutside",
            EventKind::SizeChanged => "sizechanged",
            EventKind::BoundsChanged => "boundschanged",
        }
    }
}

pub fn is_event_property(key: &str) -> bool {
    EventKind::from_prop(key).is_some()
}

/// Handler changes between two snapshots
#[derive(Default)]
pub struct EventDiff {
    pub removed: BTreeMap<EventKind, EventHandler>,
    pub added: BTreeMap<EventKind, EventHandler>,
    /// `(previous, next)` for handlers present in both with different identity
    pub changed: BTreeMap<EventKind, (EventHandler, EventHandler)>,
}

impl EventDiff {
    pub fn is_empty(&self) -> bool {
        self.removed.is_empty() && self.added.is_empty() && self.changed.is_empty()
    }
}

impl std::fmt::Debug for EventDiff {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventDiff")
            .field("removed", &self.removed.keys().collect::<Vec<_>>())
            .field("added", &self.added.keys().collect::<Vec<_>>())
            .field("changed", &self.changed.keys().collect::<Vec<_>>())
            .finish()
    }
}

fn handlers(props: &Props) -> BTreeMap<EventKind, &EventHandler> {
    props
        .iter()
        .filter_map(|(key, value)| Some((EventKind::from_prop(key)?, value.as_handler()?)))
        .collect()
}

pub fn diff_events(prev: &Props, next: &Props) -> EventDiff {
    let before = handlers(prev);
    let after = handlers(next);
    let mut diff = EventDiff::default();

    for (kind, old) in &before {
        match after.get(kind) {
            None => {
                diff.removed.insert(*kind, Rc::clone(old));
            }
            Some(new) if !Rc::ptr_eq(old, new) => {
                diff.changed
                    .insert(*kind, (Rc::clone(old), Rc::clone(new)));
            }
            Some(_) => {}
        }
    }

    for (kind, new) in &after {
        if !before.contains_key(kind) {
            diff.added.insert(*kind, Rc::clone(new));
        }
    }

    diff
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    fn handler() -> EventHandler {
        Rc::new(|_: &Event| {})
    }

    #[test_case("onClick", EventKind::Click, "click")]
    #[test_case("onMouseEnter", EventKind::MouseEnter, "mouseover")]
    #[test_case("onMouseLeave", EventKind::MouseLeave, "mouseout")]
    #[test_case("onTouchEndOutside", EventKind::TouchEndOutside, "touchendoutside")]
    #[test_case("onBoundsChanged", EventKind::BoundsChanged, "boundschanged")]
    fn maps_prop_names(prop: &str, kind: EventKind, backend: &str) {
        assert_eq!(EventKind::from_prop(prop), Some(kind));
        assert_eq!(kind.prop_name(), prop);
        assert_eq!(kind.backend_name(), backend);
    }

    #[test]
    fn unknown_prop_is_not_an_event() {
        assert!(!is_event_property("onWheel"));
        assert!(!is_event_property("width"));
    }

    #[test]
    fn diff_splits_removed_added_changed() {
        let f1 = handler();
        let f2 = handler();
        let f3 = handler();
        let keep = handler();

        let mut prev = Props::new();
        prev.insert("onClick", Rc::clone(&f1));
        prev.insert("onMouseUp", Rc::clone(&keep));
        prev.insert("onTouchStart", handler());

        let mut next = Props::new();
        next.insert("onClick", Rc::clone(&f2));
        next.insert("onMouseUp", Rc::clone(&keep));
        next.insert("onMouseEnter", Rc::clone(&f3));

        let diff = diff_events(&prev, &next);

        assert_eq!(diff.removed.keys().collect::<Vec<_>>(), vec![&EventKind::TouchStart]);
        assert!(Rc::ptr_eq(&diff.added[&EventKind::MouseEnter], &f3));
        let (old, new) = &diff.changed[&EventKind::Click];
        assert!(Rc::ptr_eq(old, &f1));
        assert!(Rc::ptr_eq(new, &f2));
        assert_eq!(diff.changed.len(), 1);
    }

    #[test]
    fn non_handler_values_are_ignored() {
        let prev = Props::new().with("onClick", 3);
        let next = Props::new();
        assert!(diff_events(&prev, &next).is_empty());
    }
}
