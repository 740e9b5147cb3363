//! Property tests: random mutation sequences keep the tree orders and the
//! animation registry consistent.

mod common;

use common::{assert_orders_agree, assert_registry_consistent};
use proptest::prelude::*;
use std::time::Duration;
use strata_scene::{HeadlessBackend, NodeId, Props, Scene, SceneError, TweenInstruction};

const POOL: usize = 6;

#[derive(Debug, Clone)]
enum TreeOp {
    Append(usize, usize),
    InsertBefore(usize, usize, usize),
    Remove(usize, usize),
}

#[derive(Debug, Clone)]
enum PropOp {
    Animate { node: usize, to: i32, ms: u64 },
    Set { node: usize, value: i32 },
    Unset { node: usize },
    Frame { ms: u64 },
    Destroy { node: usize },
}

/// Index 0 is the root, the rest are the pool
fn arb_slot() -> impl Strategy<Value = usize> {
    0..=POOL
}

fn arb_tree_op() -> impl Strategy<Value = TreeOp> {
    prop_oneof![
        3 => (arb_slot(), arb_slot()).prop_map(|(p, c)| TreeOp::Append(p, c)),
        2 => (arb_slot(), arb_slot(), arb_slot()).prop_map(|(p, c, b)| TreeOp::InsertBefore(p, c, b)),
        2 => (arb_slot(), arb_slot()).prop_map(|(p, c)| TreeOp::Remove(p, c)),
    ]
}

fn arb_prop_op() -> impl Strategy<Value = PropOp> {
    prop_oneof![
        3 => (1..=POOL, -50i32..200, 0u64..60).prop_map(|(node, to, ms)| PropOp::Animate { node, to, ms }),
        2 => (1..=POOL, 0i32..100).prop_map(|(node, value)| PropOp::Set { node, value }),
        1 => (1..=POOL).prop_map(|node| PropOp::Unset { node }),
        3 => (0u64..40).prop_map(|ms| PropOp::Frame { ms }),
        1 => (1..=POOL).prop_map(|node| PropOp::Destroy { node }),
    ]
}

fn build() -> (Scene<HeadlessBackend>, Vec<NodeId>) {
    let mut scene = Scene::new(HeadlessBackend::new()).unwrap();
    scene.set_viewport(320.0, 240.0).unwrap();
    let mut ids = vec![scene.root()];
    for _ in 0..POOL {
        ids.push(scene.create_instance(false).unwrap());
    }
    (scene, ids)
}

fn snapshot(scene: &Scene<HeadlessBackend>, ids: &[NodeId]) -> Vec<(Vec<NodeId>, Option<NodeId>)> {
    ids.iter()
        .map(|id| {
            (
                scene.children(*id).unwrap().to_vec(),
                scene.parent(*id).unwrap(),
            )
        })
        .collect()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(128))]

    #[test]
    fn prop_child_orders_stay_identical(ops in prop::collection::vec(arb_tree_op(), 1..40)) {
        let (mut scene, ids) = build();

        for op in ops {
            let before = snapshot(&scene, &ids);
            let result = match op {
                TreeOp::Append(p, c) => scene.append_child(ids[p], ids[c]),
                TreeOp::InsertBefore(p, c, b) => scene.insert_before(ids[p], ids[c], ids[b]),
                TreeOp::Remove(p, c) => scene.remove_child(ids[p], ids[c]),
            };

            if let Err(err) = result {
                prop_assert!(matches!(err, SceneError::InvalidOperation(_)), "unexpected {err}");
                prop_assert_eq!(snapshot(&scene, &ids), before, "failed op mutated the tree");
            }

            for id in &ids {
                assert_orders_agree(&scene, *id);
            }
        }

        scene.after_commit().unwrap();
    }

    #[test]
    fn prop_registry_matches_animation_tables(ops in prop::collection::vec(arb_prop_op(), 1..60)) {
        let (mut scene, ids) = build();
        for id in &ids[1..] {
            scene.append_child(ids[0], *id).unwrap();
        }

        for op in ops {
            let result = match op {
                PropOp::Animate { node, to, ms } => scene.update_props(
                    ids[node],
                    Props::new().with("width", TweenInstruction::new(to, Duration::from_millis(ms))),
                ),
                PropOp::Set { node, value } => {
                    scene.update_props(ids[node], Props::new().with("width", value))
                }
                PropOp::Unset { node } => match scene.props(ids[node]) {
                    Ok(prev) => {
                        let prev = prev.clone();
                        let mut next = prev.clone();
                        next.remove("width");
                        scene.commit_update(ids[node], &prev, &next)
                    }
                    Err(err) => Err(err),
                },
                PropOp::Frame { ms } => scene.frame(Duration::from_millis(ms)).map(|_| ()),
                PropOp::Destroy { node } => scene.destroy(ids[node]),
            };

            if let Err(err) = result {
                prop_assert!(matches!(err, SceneError::NodeDestroyed(_)), "unexpected {err}");
            }
            assert_registry_consistent(&scene);
        }

        // Every tween eventually completes and writes its target back.
        for _ in 0..10 {
            scene.frame(Duration::from_millis(100)).unwrap();
        }
        prop_assert_eq!(scene.animating_nodes().count(), 0);
        assert_registry_consistent(&scene);
    }
}
