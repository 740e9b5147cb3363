//! Tweened properties
//!
//! A property is in exactly one of three states: a static value, a pending
//! [`TweenInstruction`], or a running [`Tween`]. [`AnimationTable`] holds the
//! running tweens of one node and implements the transitions between those
//! states; it knows nothing about the tree, so it can be driven directly.

use crate::easing::Easing;
use crate::props::PropValue;
use crate::value::Value;
use std::cell::RefCell;
use std::collections::BTreeMap;
use std::fmt;
use std::rc::Rc;
use std::time::Duration;

/// Invoked once when a tween reaches its target
pub type CompletionCallback = Rc<dyn Fn()>;

/// A running tween that may be shared between the reconciler and a node
pub type TweenHandle = Rc<RefCell<Tween>>;

/// Timing configuration of an instruction
#[derive(Clone, Default)]
pub struct TweenOptions {
    pub duration: Duration,
    pub easing: Easing,
    pub on_complete: Option<CompletionCallback>,
}

impl PartialEq for TweenOptions {
    fn eq(&self, other: &Self) -> bool {
        let same_callback = match (&self.on_complete, &other.on_complete) {
            (Some(a), Some(b)) => Rc::ptr_eq(a, b),
            (None, None) => true,
            _ => false,
        };
        self.duration == other.duration && self.easing == other.easing && same_callback
    }
}

impl fmt::Debug for TweenOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TweenOptions")
            .field("duration", &self.duration)
            .field("easing", &self.easing)
            .field("on_complete", &self.on_complete.is_some())
            .finish()
    }
}

/// Request to animate a property to `to`.
///
/// Two instructions are equal when they share target and options, so the
/// reconciler can resend an instruction every render without restarting it.
#[derive(Debug, Clone, PartialEq)]
pub struct TweenInstruction {
    pub to: Value,
    pub options: TweenOptions,
}

impl TweenInstruction {
    pub fn new(to: impl Into<Value>, duration: Duration) -> Self {
        Self {
            to: to.into(),
            options: TweenOptions {
                duration,
                ..Default::default()
            },
        }
    }

    pub fn easing(mut self, easing: Easing) -> Self {
        self.options.easing = easing;
        self
    }

    pub fn on_complete(mut self, callback: impl Fn() + 'static) -> Self {
        self.options.on_complete = Some(Rc::new(callback));
        self
    }

    pub fn duration(&self) -> Duration {
        self.options.duration
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TweenStatus {
    Running,
    Finished,
}

/// Interpolation from a start value towards an instruction's target
#[derive(Debug, Clone)]
pub struct Tween {
    start: Value,
    current: Value,
    elapsed: Duration,
    instruction: TweenInstruction,
    finished: bool,
    last_frame: Option<u64>,
}

impl Tween {
    /// Begin executing `instruction`, starting from `seed`.
    pub fn start(seed: Value, instruction: TweenInstruction) -> Self {
        Self {
            start: seed.clone(),
            current: seed,
            elapsed: Duration::ZERO,
            instruction,
            finished: false,
            last_frame: None,
        }
    }

    /// Wrap a freshly started tween in a shareable handle
    pub fn shared(seed: Value, instruction: TweenInstruction) -> TweenHandle {
        Rc::new(RefCell::new(Self::start(seed, instruction)))
    }

    /// Retarget mid-flight. The new run starts at the current interpolated
    /// value so the property never jumps.
    pub fn instruct(&mut self, instruction: TweenInstruction) {
        self.start = self.current.clone();
        self.elapsed = Duration::ZERO;
        self.instruction = instruction;
        self.finished = false;
    }

    pub fn advance(&mut self, dt: Duration) -> TweenStatus {
        if self.finished {
            return TweenStatus::Finished;
        }

        self.elapsed += dt;
        let duration = self.instruction.options.duration;

        if duration.is_zero() || self.elapsed >= duration {
            self.current = self.instruction.to.clone();
            self.finished = true;
            return TweenStatus::Finished;
        }

        let progress = self.elapsed.as_secs_f32() / duration.as_secs_f32();
        let eased = self.instruction.options.easing.apply(progress);
        self.current = Value::interpolate(&self.start, &self.instruction.to, eased);
        TweenStatus::Running
    }

    /// Advance at most once per frame; a tween shared by several nodes is
    /// visited once per owner. The flag is set only for the visit that
    /// moved the tween to finished.
    pub(crate) fn advance_frame(&mut self, frame: u64, dt: Duration) -> (TweenStatus, bool) {
        if self.last_frame == Some(frame) {
            return (self.status(), false);
        }
        self.last_frame = Some(frame);
        let was_finished = self.finished;
        let status = self.advance(dt);
        (status, !was_finished && self.finished)
    }

    pub fn status(&self) -> TweenStatus {
        if self.finished {
            TweenStatus::Finished
        } else {
            TweenStatus::Running
        }
    }

    pub fn value(&self) -> &Value {
        &self.current
    }

    pub fn start_value(&self) -> &Value {
        &self.start
    }

    pub fn target(&self) -> &Value {
        &self.instruction.to
    }

    pub fn elapsed(&self) -> Duration {
        self.elapsed
    }

    pub fn instruction(&self) -> &TweenInstruction {
        &self.instruction
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }
}

/// What reconciling one property did to the animation table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reconciled {
    Started,
    Restarted,
    Adopted,
    /// The static value already equals the instruction's target
    Settled,
    Stopped,
    Unchanged,
}

/// A tween that reached its target during a tick
pub struct Completed {
    pub key: String,
    pub target: Value,
    pub on_complete: Option<CompletionCallback>,
}

impl fmt::Debug for Completed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Completed")
            .field("key", &self.key)
            .field("target", &self.target)
            .finish_non_exhaustive()
    }
}

/// Running tweens of one node, keyed by property name
#[derive(Debug, Default)]
pub struct AnimationTable {
    tweens: BTreeMap<String, TweenHandle>,
}

impl AnimationTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.tweens.is_empty()
    }

    pub fn len(&self) -> usize {
        self.tweens.len()
    }

    pub fn contains(&self, key: &str) -> bool {
        self.tweens.contains_key(key)
    }

    pub fn get(&self, key: &str) -> Option<&TweenHandle> {
        self.tweens.get(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.tweens.keys().map(String::as_str)
    }

    /// Current interpolated value of `key`, if it is animating
    pub fn value(&self, key: &str) -> Option<Value> {
        self.tweens.get(key).map(|t| t.borrow().value().clone())
    }

    /// Apply the transition for one property going from `prev` to `next`.
    pub fn reconcile(
        &mut self,
        key: &str,
        prev: Option<&PropValue>,
        next: Option<&PropValue>,
    ) -> Reconciled {
        match next {
            Some(PropValue::Instruction(instruction)) => {
                // A passed-through tween is replaced wholesale rather than
                // retargeted, since the caller still holds it.
                let replacing_adopted = matches!(prev, Some(PropValue::Animation(_)));

                if let Some(handle) = self.tweens.get(key).filter(|_| !replacing_adopted) {
                    let mut tween = handle.borrow_mut();
                    if tween.instruction() == instruction {
                        return Reconciled::Unchanged;
                    }
                    tween.instruct(instruction.clone());
                    return Reconciled::Restarted;
                }

                if let Some(PropValue::Static(current)) = prev {
                    if *current == instruction.to && !self.tweens.contains_key(key) {
                        return Reconciled::Settled;
                    }
                }

                let seed = self
                    .value(key)
                    .or_else(|| match prev {
                        Some(PropValue::Static(value)) => Some(value.clone()),
                        _ => None,
                    })
                    .unwrap_or_else(|| instruction.to.clone());

                self.tweens
                    .insert(key.to_string(), Tween::shared(seed, instruction.clone()));
                Reconciled::Started
            }

            Some(PropValue::Animation(handle)) => {
                let already_adopted = self
                    .tweens
                    .get(key)
                    .is_some_and(|current| Rc::ptr_eq(current, handle));
                if already_adopted {
                    return Reconciled::Unchanged;
                }
                self.tweens.insert(key.to_string(), Rc::clone(handle));
                Reconciled::Adopted
            }

            Some(PropValue::Static(_)) | Some(PropValue::Handler(_)) => {
                if self.tweens.remove(key).is_some() {
                    Reconciled::Stopped
                } else {
                    Reconciled::Unchanged
                }
            }

            None => Reconciled::Unchanged,
        }
    }

    /// Advance every tween by `dt`, removing and returning the ones that
    /// reached their target.
    pub fn advance(&mut self, frame: u64, dt: Duration) -> Vec<Completed> {
        let mut completed = Vec::new();

        self.tweens.retain(|key, handle| {
            let mut tween = handle.borrow_mut();
            match tween.advance_frame(frame, dt) {
                (TweenStatus::Running, _) => true,
                (TweenStatus::Finished, finalized) => {
                    // Every owner writes the target back; only the one that
                    // finalized the tween carries the callback.
                    completed.push(Completed {
                        key: key.clone(),
                        target: tween.target().clone(),
                        on_complete: tween
                            .instruction()
                            .options
                            .on_complete
                            .clone()
                            .filter(|_| finalized),
                    });
                    false
                }
            }
        });

        completed
    }
}
