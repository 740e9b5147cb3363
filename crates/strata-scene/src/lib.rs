//! Retained scene graph for declarative UIs
//!
//! A reconciler describes a tree of visual nodes as property snapshots; this
//! crate keeps the matching retained tree, lays it out with flexbox rules,
//! animates properties between values and pushes the result to a 2D
//! rendering [`Backend`] once per frame.
//!
//! ## Features
//!
//! - **Scene**: node arena with the reconciler-facing mutation API
//! - **Tweened props**: any property can be given a [`TweenInstruction`]
//!   instead of a value; running tweens survive re-renders
//! - **Layout**: persistent taffy tree mirroring the scene tree
//! - **Headless backend**: in-memory [`Backend`] for tests and servers
//!
//! ## Usage
//!
//! ```rust,ignore
//! use strata_scene::{HeadlessBackend, Props, Scene, TweenInstruction};
//! use std::time::Duration;
//!
//! let mut scene = Scene::new(HeadlessBackend::new())?;
//! let card = scene.create_instance(false)?;
//! scene.append_child(scene.root(), card)?;
//! scene.update_props(card, Props::new().with("width", 50).with("height", 20))?;
//! scene.set_viewport(800.0, 600.0)?;
//!
//! let grow = TweenInstruction::new(80, Duration::from_millis(100));
//! scene.update_props(card, Props::new().with("width", grow))?;
//! scene.frame(Duration::from_millis(16))?;
//! ```

pub mod animation;
pub mod backend;
pub mod clock;
pub mod config;
pub mod easing;
pub mod error;
pub mod events;
pub mod geometry;
pub mod headless;
pub mod layout;
pub mod node;
pub mod props;
mod render;
pub mod scene;
pub mod style;
pub mod value;

// Re-exports
pub use animation::{AnimationTable, Tween, TweenHandle, TweenInstruction, TweenOptions};
pub use backend::{Backend, ContainerId, ContainerKind, ImageStatus, PaintOp, Transform};
pub use clock::FrameClock;
pub use config::SceneConfig;
pub use easing::Easing;
pub use error::{SceneError, SceneResult};
pub use events::{Event, EventHandler, EventKind};
pub use geometry::{Bounds, Point, Rect, Size};
pub use headless::HeadlessBackend;
pub use node::{NodeId, SceneNode};
pub use props::{PropValue, Props};
pub use scene::{FrameReport, Scene};
pub use style::TextStyle;
pub use value::{Color, Value};
