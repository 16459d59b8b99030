mod animation;
mod handler;
mod transition;

use std::fmt::Debug;

use thiserror::Error;

pub use animation::{AnimState, Animation, AnimationConfig, Animator};
pub use handler::{StateAnimationBased, StateFactory, StateHandler};
pub use transition::{Resolution, StateChecker, StateTransitions, Target};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StateError {
    #[error("state {state} cannot declare a transition to itself")]
    SelfTransition { state: String },
    #[error("state {state} is not registered")]
    UnknownState { state: String },
    #[error("no state is active")]
    NoActiveState,
    #[error("state {state} needs missing animation '{animation}'")]
    MissingAnimation { state: String, animation: String },
}

/// One behavior of an entity. `C` is the entity data the state reads and
/// mutates; the state itself only keeps what it needs between frames.
pub trait State<K, C: ?Sized>
where
    K: Clone + PartialEq + Debug,
{
    fn key(&self) -> K;

    fn transitions(&mut self) -> &mut StateTransitions<K, C>;

    fn enter(&mut self, _context: &mut C) {}

    fn update(&mut self, _extrp: f64, _context: &mut C) {}

    fn exit(&mut self, _context: &mut C) {}

    /// Runs when no transition fired this frame.
    fn post_update(&mut self, _context: &mut C) {}

    fn add_transition(
        &mut self,
        target: Target<K>,
        checker: Box<dyn StateChecker<C>>,
    ) -> Result<(), StateError> {
        self.transitions().add_transition(target, checker)
    }

    fn check_transitions(&mut self, last: Option<&K>, context: &mut C) -> Option<K> {
        let resolution = self.transitions().resolve(last, context);
        if !resolution.fired() {
            self.post_update(context);
        }
        resolution.next()
    }
}
