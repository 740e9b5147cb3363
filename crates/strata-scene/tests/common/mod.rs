#![allow(dead_code)]

use strata_scene::{Backend, HeadlessBackend, NodeId, Scene};

pub fn init_test_logging() {
    let _ = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::TRACE)
        .with_test_writer()
        .try_init();
}

/// Headless scene with a 800x600 viewport
pub fn scene() -> Scene<HeadlessBackend> {
    init_test_logging();
    let mut scene = Scene::new(HeadlessBackend::new()).unwrap();
    scene.set_viewport(800.0, 600.0).unwrap();
    scene
}

/// Scene, layout and backend child orders of `id` agree.
pub fn assert_orders_agree(scene: &Scene<HeadlessBackend>, id: NodeId) {
    let children = scene.children(id).unwrap().to_vec();
    assert_eq!(scene.layout_children(id).unwrap(), children, "layout order of {id}");

    let expected: Vec<_> = children
        .iter()
        .map(|child| scene.container(*child).unwrap())
        .collect();
    let actual = scene.backend().children(scene.container(id).unwrap());
    assert_eq!(actual, expected, "backend order of {id}");
}

/// A node is in the animation registry iff it has running tweens.
pub fn assert_registry_consistent(scene: &Scene<HeadlessBackend>) {
    for node in scene.nodes() {
        assert_eq!(
            scene.is_animating(node.id()),
            !node.animations().is_empty(),
            "registry entry of {}",
            node.id()
        );
    }
    for id in scene.animating_nodes() {
        assert!(scene.contains(id), "registry holds destroyed {id}");
    }
}
