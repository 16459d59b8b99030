use std::fmt::Debug;

use super::StateError;

/// Where a transition leads.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Target<K> {
    State(K),
    /// The state that was active before the current one.
    Last,
}

/// Guard of one transition. `exit` runs once when the guard fires, before the
/// owning controller swaps states.
pub trait StateChecker<C: ?Sized> {
    fn check(&mut self, context: &C) -> bool;

    fn exit(&mut self, _context: &mut C) {}
}

impl<C: ?Sized, F> StateChecker<C> for F
where
    F: FnMut(&C) -> bool,
{
    fn check(&mut self, context: &C) -> bool {
        self(context)
    }
}

/// Outcome of [`StateTransitions::resolve`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution<K> {
    /// No checker fired.
    Stay,
    /// A checker fired. Holds `None` when it targeted an absent last state.
    Fired(Option<K>),
}

impl<K> Resolution<K> {
    pub fn fired(&self) -> bool {
        matches!(self, Resolution::Fired(_))
    }

    pub fn next(self) -> Option<K> {
        match self {
            Resolution::Fired(next) => next,
            Resolution::Stay => None,
        }
    }
}

/// Ordered transition table of one state.
pub struct StateTransitions<K, C: ?Sized> {
    owner: K,
    transitions: Vec<(Target<K>, Box<dyn StateChecker<C>>)>,
}

impl<K, C> StateTransitions<K, C>
where
    K: Clone + PartialEq + Debug,
    C: ?Sized,
{
    pub fn new(owner: K) -> Self {
        Self {
            owner,
            transitions: Vec::new(),
        }
    }

    pub fn owner(&self) -> &K {
        &self.owner
    }

    /// Appends a transition. A target already present keeps its position and
    /// gets the new checker.
    pub fn add_transition(
        &mut self,
        target: Target<K>,
        checker: Box<dyn StateChecker<C>>,
    ) -> Result<(), StateError> {
        if target == Target::State(self.owner.clone()) {
            return Err(StateError::SelfTransition {
                state: format!("{:?}", self.owner),
            });
        }
        match self.transitions.iter_mut().find(|(known, _)| *known == target) {
            Some((_, existing)) => *existing = checker,
            None => self.transitions.push((target, checker)),
        }
        Ok(())
    }

    pub fn clear_transitions(&mut self) {
        self.transitions.clear();
    }

    pub fn len(&self) -> usize {
        self.transitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.transitions.is_empty()
    }

    pub fn targets(&self) -> impl Iterator<Item = &Target<K>> {
        self.transitions.iter().map(|(target, _)| target)
    }

    /// First checker to fire, in registration order, decides the next state.
    /// [`Target::Last`] resolves to `last`, which may be absent.
    pub fn resolve(&mut self, last: Option<&K>, context: &mut C) -> Resolution<K> {
        for (target, checker) in &mut self.transitions {
            if checker.check(context) {
                checker.exit(context);
                return Resolution::Fired(match target {
                    Target::State(next) => Some(next.clone()),
                    Target::Last => last.cloned(),
                });
            }
        }
        Resolution::Stay
    }
}
