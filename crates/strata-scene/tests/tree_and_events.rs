//! Tree mutation, listener binding, destruction and image loading

mod common;

use common::{assert_orders_agree, assert_registry_consistent, scene};
use std::cell::{Cell, RefCell};
use std::rc::Rc;
use std::time::Duration;
use strata_scene::backend::ImageStatus;
use strata_scene::{
    Backend, Event, EventHandler, EventKind, PaintOp, Point, Props, SceneError, Size,
    TweenInstruction,
};

fn counting_handler(hits: &Rc<Cell<u32>>) -> EventHandler {
    let hits = Rc::clone(hits);
    Rc::new(move |_: &Event| hits.set(hits.get() + 1))
}

#[test]
fn changed_and_added_handlers_are_rebound() {
    let mut scene = scene();
    let node = scene.create_instance(false).unwrap();
    scene.append_child(scene.root(), node).unwrap();

    let (f1_hits, f2_hits) = (Rc::new(Cell::new(0)), Rc::new(Cell::new(0)));
    let f1 = counting_handler(&f1_hits);
    let f2 = counting_handler(&f2_hits);
    let f3: EventHandler = Rc::new(|_: &Event| {});

    let mut prev = Props::new();
    prev.insert("onClick", Rc::clone(&f1));
    scene.commit_update(node, &Props::new(), &prev).unwrap();

    let mut next = Props::new();
    next.insert("onClick", Rc::clone(&f2));
    next.insert("onMouseEnter", Rc::clone(&f3));
    scene.commit_update(node, &prev, &next).unwrap();

    let container = scene.container(node).unwrap();
    let state = scene.backend().container(container).unwrap();
    let click = state.handlers(EventKind::Click);
    let enter = state.handlers(EventKind::MouseEnter);
    assert_eq!(click.len(), 1);
    assert!(Rc::ptr_eq(&click[0], &f2));
    assert_eq!(enter.len(), 1);
    assert!(Rc::ptr_eq(&enter[0], &f3));
    assert_eq!(scene.backend().listener_count(container), 2);
    assert!(state.is_interactive());

    scene
        .emit_event(node, EventKind::Click, Event::Pointer(Point::new(1.0, 2.0)))
        .unwrap();
    assert_eq!((f1_hits.get(), f2_hits.get()), (0, 1));
}

#[test]
fn removing_last_handler_clears_interactivity() {
    let mut scene = scene();
    let node = scene.create_instance(false).unwrap();

    let with_handler = Props::new().on("onMouseDown", |_| {});
    scene.commit_update(node, &Props::new(), &with_handler).unwrap();
    let container = scene.container(node).unwrap();
    assert!(scene.backend().container(container).unwrap().is_interactive());

    scene
        .commit_update(node, &with_handler, &Props::new())
        .unwrap();

    assert_eq!(scene.backend().listener_count(container), 0);
    assert!(!scene.backend().container(container).unwrap().is_interactive());
    assert!(!scene.props(node).unwrap().contains_key("onMouseDown"));
}

#[test]
fn removing_a_non_child_fails_and_leaves_tree_untouched() {
    let mut scene = scene();
    let root = scene.root();
    let a = scene.create_instance(false).unwrap();
    let b = scene.create_instance(false).unwrap();
    let stranger = scene.create_instance(false).unwrap();
    scene.append_child(root, a).unwrap();
    scene.append_child(a, b).unwrap();

    let err = scene.remove_child(root, b).unwrap_err();
    assert!(matches!(err, SceneError::InvalidOperation(_)));
    let err = scene.remove_child(root, stranger).unwrap_err();
    assert!(matches!(err, SceneError::InvalidOperation(_)));

    assert_eq!(scene.children(root).unwrap(), &[a]);
    assert_eq!(scene.children(a).unwrap(), &[b]);
    assert_eq!(scene.parent(b).unwrap(), Some(a));
    for id in [root, a, b, stranger] {
        assert_orders_agree(&scene, id);
    }
}

#[test]
fn insert_before_keeps_all_three_orders() {
    let mut scene = scene();
    let root = scene.root();
    let [a, b, c, d] = [(); 4].map(|_| scene.create_instance(false).unwrap());

    scene.append_child(root, a).unwrap();
    scene.append_child(root, c).unwrap();
    scene.insert_before(root, b, c).unwrap();
    scene.insert_before(root, d, a).unwrap();
    assert_eq!(scene.children(root).unwrap(), &[d, a, b, c]);

    // Moving an existing child re-inserts it.
    scene.insert_before(root, c, a).unwrap();
    assert_eq!(scene.children(root).unwrap(), &[d, c, a, b]);
    assert_orders_agree(&scene, root);

    let err = scene.insert_before(a, b, c).unwrap_err();
    assert!(matches!(err, SceneError::InvalidOperation(_)));
    assert_eq!(scene.children(root).unwrap(), &[d, c, a, b]);
}

#[test]
fn destroy_releases_subtree_and_suppresses_image_callbacks() {
    let mut scene = scene();
    let root = scene.root();
    scene
        .backend_mut()
        .set_image_status("slow.png", ImageStatus::Loading);

    let doomed = scene.create_instance(false).unwrap();
    let grandchild = scene.create_instance(true).unwrap();
    let survivor = scene.create_instance(false).unwrap();
    scene.append_child(root, doomed).unwrap();
    scene.append_child(doomed, grandchild).unwrap();
    scene.append_child(root, survivor).unwrap();

    let image = Props::new()
        .with("width", 10)
        .with("height", 10)
        .with("backgroundImage", "slow.png");
    scene.update_props(doomed, image.clone()).unwrap();
    scene.update_props(survivor, image).unwrap();
    scene
        .update_props(
            doomed,
            Props::new().with("opacity", TweenInstruction::new(0, Duration::from_secs(1))),
        )
        .unwrap();
    scene.after_commit().unwrap();
    assert!(scene.is_animating(doomed));
    let containers_before = scene.backend().len();

    scene.destroy(doomed).unwrap();

    assert!(!scene.contains(doomed));
    assert!(!scene.contains(grandchild));
    assert!(!scene.is_animating(doomed));
    assert_eq!(scene.children(root).unwrap(), &[survivor]);
    assert_eq!(scene.backend().len(), containers_before - 2);
    assert_orders_agree(&scene, root);
    assert_registry_consistent(&scene);

    scene
        .backend_mut()
        .set_image_status("slow.png", ImageStatus::Ready);
    assert_eq!(scene.image_loaded("slow.png").unwrap(), 1);
    assert_eq!(scene.image_loaded("slow.png").unwrap(), 0);

    let container = scene.container(survivor).unwrap();
    let effects = scene.backend().container(container).unwrap().effects();
    assert!(matches!(&effects[0], PaintOp::Image { fill, .. } if fill.source == "slow.png"));

    let err = scene.update_props(doomed, Props::new()).unwrap_err();
    assert!(matches!(err, SceneError::NodeDestroyed(id) if id == doomed));
}

#[test]
fn failed_images_are_contained() {
    let mut scene = scene();
    let node = scene.create_instance(false).unwrap();
    scene.append_child(scene.root(), node).unwrap();
    scene
        .backend_mut()
        .set_image_status("broken.png", ImageStatus::Loading);
    scene
        .update_props(
            node,
            Props::new()
                .with("backgroundImage", "broken.png")
                .with("backgroundColor", "#123456"),
        )
        .unwrap();
    scene.after_commit().unwrap();

    scene.image_failed("broken.png", "404");

    assert_eq!(scene.image_loaded("broken.png").unwrap(), 0);
    let container = scene.container(node).unwrap();
    let effects = scene.backend().container(container).unwrap().effects();
    assert_eq!(effects.len(), 1);
    assert!(matches!(effects[0], PaintOp::Fill { .. }));
}

#[test]
fn size_and_bounds_notifications_follow_layout() {
    let mut scene = scene();
    let root = scene.root();
    let spacer = scene.create_instance(false).unwrap();
    let node = scene.create_instance(false).unwrap();
    scene.append_child(root, spacer).unwrap();
    scene.append_child(root, node).unwrap();

    let sizes = Rc::new(RefCell::new(Vec::new()));
    let bounds = Rc::new(RefCell::new(Vec::new()));
    let (s, b) = (Rc::clone(&sizes), Rc::clone(&bounds));
    scene
        .update_props(spacer, Props::new().with("height", 5))
        .unwrap();
    scene
        .update_props(
            node,
            Props::new()
                .with("width", 40)
                .with("height", 20)
                .on("onSizeChanged", move |e| {
                    if let Event::SizeChanged(size) = e {
                        s.borrow_mut().push(*size);
                    }
                })
                .on("onBoundsChanged", move |e| {
                    if let Event::BoundsChanged(rect) = e {
                        b.borrow_mut().push(*rect);
                    }
                }),
        )
        .unwrap();

    scene.after_commit().unwrap();
    scene.after_commit().unwrap();
    assert_eq!(
        *sizes.borrow(),
        vec![Size {
            width: 40.0,
            height: 20.0
        }]
    );
    assert_eq!(bounds.borrow().len(), 1);
    assert_eq!(bounds.borrow()[0].top, 5.0);

    scene
        .update_props(spacer, Props::new().with("height", 15))
        .unwrap();
    scene.after_commit().unwrap();

    assert_eq!(sizes.borrow().len(), 1, "size did not change");
    assert_eq!(bounds.borrow().len(), 2);
    assert_eq!(bounds.borrow()[1].top, 15.0);
    assert_eq!(bounds.borrow()[1].bottom, 35.0);
}

#[test]
fn text_is_measured_with_cascaded_style() {
    let mut scene = scene();
    let root = scene.root();
    let parent = scene.create_instance(false).unwrap();
    let label = scene.create_instance(true).unwrap();
    scene.append_child(root, parent).unwrap();
    scene.append_child(parent, label).unwrap();
    scene
        .update_props(
            parent,
            Props::new()
                .with("fontSize", 10)
                .with("color", "#ffffff")
                .with("alignItems", "flex-start"),
        )
        .unwrap();
    scene
        .update_props(label, Props::new().with("value", "hello"))
        .unwrap();
    scene.after_commit().unwrap();

    assert_eq!(scene.computed_rect(label).unwrap().width, 25.0);
    let container = scene.container(label).unwrap();
    let state = scene.backend().container(container).unwrap();
    assert_eq!(state.text(), Some("hello"));
    let style = state.text_style().unwrap();
    assert_eq!(style.font_size, Some(10.0));
    assert_eq!(style.fill, Some(strata_scene::Color::WHITE));

    scene
        .update_props(label, Props::new().with("value", "hello hello"))
        .unwrap();
    scene.after_commit().unwrap();
    assert_eq!(scene.computed_rect(label).unwrap().width, 55.0);
}
