//! Rendered backend tree of a small scene

mod common;

use common::scene;
use strata_scene::Props;

#[test]
fn renders_layout_paint_and_text() {
    let mut scene = scene();
    let root = scene.root();
    let card = scene.create_instance(false).unwrap();
    let label = scene.create_instance(true).unwrap();
    let badge = scene.create_instance(false).unwrap();
    scene.append_child(root, card).unwrap();
    scene.append_child(card, label).unwrap();
    scene.append_child(root, badge).unwrap();

    scene
        .update_props(
            card,
            Props::new()
                .with("width", 50)
                .with("height", 20)
                .with("marginTop", 10)
                .with("backgroundColor", "#ff0000")
                .with("border", 1)
                .with("borderColor", "white")
                .with("overflow", "hidden"),
        )
        .unwrap();
    scene
        .update_props(label, Props::new().with("value", "hi"))
        .unwrap();
    scene
        .update_props(
            badge,
            Props::new()
                .with("width", 10)
                .with("height", 10)
                .with("opacity", 0.5)
                .with("backgroundColor", "blue")
                .on("onClick", |_| {}),
        )
        .unwrap();
    scene.after_commit().unwrap();

    let dump = scene.backend().dump(scene.container(root).unwrap());
    insta::assert_snapshot!(dump, @r#"
    c1 view at (0, 0)
      c2 view at (0, 10) fill=#ff0000 50x20 border=[1.0, 1.0, 1.0, 1.0] clip
        c3 text at (1, 1) "hi"
      c4 view at (0, 30) alpha=0.5 fill=#0000ff 10x10 interactive
    "#);
}
