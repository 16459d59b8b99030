use std::collections::BTreeMap;
use std::fmt::Debug;
use std::rc::Rc;

use tracing::debug;

use super::{Animation, AnimationConfig, State, StateError};

type StateBox<K, C> = Box<dyn State<K, C>>;
type Constructor<K, C> = Box<dyn Fn() -> Result<StateBox<K, C>, StateError>>;

/// Explicit registry of state constructors, keyed like the states they build.
pub struct StateFactory<K, C: ?Sized> {
    constructors: BTreeMap<K, Constructor<K, C>>,
}

impl<K, C> Default for StateFactory<K, C>
where
    C: ?Sized,
{
    fn default() -> Self {
        Self {
            constructors: BTreeMap::new(),
        }
    }
}

impl<K, C> StateFactory<K, C>
where
    K: Ord + Clone + Debug + 'static,
    C: ?Sized + 'static,
{
    pub fn register<F>(&mut self, key: K, constructor: F)
    where
        F: Fn() -> Result<StateBox<K, C>, StateError> + 'static,
    {
        self.constructors.insert(key, Box::new(constructor));
    }

    /// Registers one constructor per key, each handed the animation its key
    /// names in `animations`.
    pub fn register_animated<F>(
        &mut self,
        animations: &AnimationConfig,
        keys: &[K],
        constructor: F,
    ) -> Result<(), StateError>
    where
        K: StateAnimationBased,
        F: Fn(K, Animation) -> Result<StateBox<K, C>, StateError> + 'static,
    {
        let constructor = Rc::new(constructor);
        for key in keys {
            let animation = animations
                .animation(key.animation_name())
                .cloned()
                .ok_or_else(|| StateError::MissingAnimation {
                    state: format!("{key:?}"),
                    animation: key.animation_name().to_string(),
                })?;
            let constructor = Rc::clone(&constructor);
            let state_key = key.clone();
            self.register(key.clone(), move || {
                constructor(state_key.clone(), animation.clone())
            });
        }
        Ok(())
    }

    pub fn create(&self, key: &K) -> Result<StateBox<K, C>, StateError> {
        let constructor = self
            .constructors
            .get(key)
            .ok_or_else(|| StateError::UnknownState {
                state: format!("{key:?}"),
            })?;
        constructor()
    }

    pub fn keys(&self) -> impl Iterator<Item = &K> {
        self.constructors.keys()
    }
}

/// State keys whose state plays a named animation.
pub trait StateAnimationBased {
    fn animation_name(&self) -> &'static str;
}

/// Owns the states of one entity and drives the active one.
///
/// Each [`StateHandler::update`] asks the active state for a transition,
/// swaps states when one fires (`exit` then `enter`), then updates whichever
/// state is active.
pub struct StateHandler<K, C: ?Sized> {
    states: BTreeMap<K, StateBox<K, C>>,
    current: Option<K>,
    last: Option<K>,
}

impl<K, C> Default for StateHandler<K, C>
where
    C: ?Sized,
{
    fn default() -> Self {
        Self {
            states: BTreeMap::new(),
            current: None,
            last: None,
        }
    }
}

impl<K, C> StateHandler<K, C>
where
    K: Ord + Clone + Debug + 'static,
    C: ?Sized + 'static,
{
    /// Builds every state registered in `factory`.
    pub fn from_factory(factory: &StateFactory<K, C>) -> Result<Self, StateError> {
        let mut handler = Self::default();
        for key in factory.keys() {
            handler.add_state(factory.create(key)?);
        }
        Ok(handler)
    }

    /// Adds or replaces the state under its own key.
    pub fn add_state(&mut self, state: StateBox<K, C>) {
        self.states.insert(state.key(), state);
    }

    pub fn change_state(&mut self, next: K, context: &mut C) -> Result<(), StateError> {
        if !self.states.contains_key(&next) {
            return Err(StateError::UnknownState {
                state: format!("{next:?}"),
            });
        }
        if let Some(previous) = self.current.take() {
            if let Some(state) = self.states.get_mut(&previous) {
                state.exit(context);
            }
            self.last = Some(previous);
        }
        if let Some(state) = self.states.get_mut(&next) {
            state.enter(context);
        }
        debug!(from = ?self.last, to = ?next, "state_changed");
        self.current = Some(next);
        Ok(())
    }

    pub fn update(&mut self, extrp: f64, context: &mut C) -> Result<(), StateError> {
        let current = self.current.clone().ok_or(StateError::NoActiveState)?;
        let next = self
            .states
            .get_mut(&current)
            .and_then(|state| state.check_transitions(self.last.as_ref(), context));
        if let Some(next) = next {
            self.change_state(next, context)?;
        }
        if let Some(state) = self
            .current
            .as_ref()
            .and_then(|key| self.states.get_mut(key))
        {
            state.update(extrp, context);
        }
        Ok(())
    }

    pub fn current(&self) -> Option<&K> {
        self.current.as_ref()
    }

    pub fn last(&self) -> Option<&K> {
        self.last.as_ref()
    }

    pub fn is_state(&self, key: &K) -> bool {
        self.current.as_ref() == Some(key)
    }

    pub fn state(&self, key: &K) -> Option<&dyn State<K, C>> {
        self.states.get(key).map(|state| state.as_ref())
    }
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use super::*;
    use crate::state::{StateTransitions, Target};

    #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
    enum Key {
        Idle,
        Walk,
        Jump,
    }

    impl StateAnimationBased for Key {
        fn animation_name(&self) -> &'static str {
            match self {
                Key::Idle => "idle",
                Key::Walk => "walk",
                Key::Jump => "jump",
            }
        }
    }

    #[derive(Default)]
    struct Body {
        input_x: f64,
        input_y: f64,
        log: Vec<String>,
        post_updates: u32,
    }

    struct Basic {
        key: Key,
        transitions: StateTransitions<Key, Body>,
    }

    impl Basic {
        fn boxed(key: Key) -> Result<StateBox<Key, Body>, StateError> {
            let mut state = Basic {
                key,
                transitions: StateTransitions::new(key),
            };
            match key {
                Key::Idle => {
                    state.add_transition(
                        Target::State(Key::Walk),
                        Box::new(|body: &Body| body.input_x != 0.0),
                    )?;
                    state.add_transition(
                        Target::State(Key::Jump),
                        Box::new(|body: &Body| body.input_y > 0.0),
                    )?;
                }
                Key::Walk => {
                    state.add_transition(
                        Target::State(Key::Idle),
                        Box::new(|body: &Body| body.input_x == 0.0),
                    )?;
                    state.add_transition(
                        Target::State(Key::Jump),
                        Box::new(|body: &Body| body.input_y > 0.0),
                    )?;
                }
                Key::Jump => {
                    state.add_transition(
                        Target::Last,
                        Box::new(|body: &Body| body.input_y <= 0.0),
                    )?;
                }
            }
            Ok(Box::new(state))
        }
    }

    impl State<Key, Body> for Basic {
        fn key(&self) -> Key {
            self.key
        }

        fn transitions(&mut self) -> &mut StateTransitions<Key, Body> {
            &mut self.transitions
        }

        fn enter(&mut self, body: &mut Body) {
            body.log.push(format!("enter {:?}", self.key));
        }

        fn exit(&mut self, body: &mut Body) {
            body.log.push(format!("exit {:?}", self.key));
        }

        fn update(&mut self, _extrp: f64, body: &mut Body) {
            body.log.push(format!("update {:?}", self.key));
        }

        fn post_update(&mut self, body: &mut Body) {
            body.post_updates += 1;
        }
    }

    fn factory() -> StateFactory<Key, Body> {
        let mut factory = StateFactory::default();
        for key in [Key::Idle, Key::Walk, Key::Jump] {
            factory.register(key, move || Basic::boxed(key));
        }
        factory
    }

    #[test]
    fn update_without_active_state_fails() {
        let mut handler = StateHandler::from_factory(&factory()).expect("handler");
        assert_eq!(
            handler.update(1.0, &mut Body::default()),
            Err(StateError::NoActiveState)
        );
    }

    #[test]
    fn transitions_swap_then_update_new_state() {
        let mut handler = StateHandler::from_factory(&factory()).expect("handler");
        let mut body = Body::default();
        handler.change_state(Key::Idle, &mut body).expect("start");

        handler.update(1.0, &mut body).expect("idle frame");
        assert_eq!(body.post_updates, 1);

        body.input_x = 1.0;
        handler.update(1.0, &mut body).expect("walk frame");
        assert!(handler.is_state(&Key::Walk));
        assert_eq!(handler.last(), Some(&Key::Idle));
        assert_eq!(
            body.log,
            vec!["enter Idle", "update Idle", "exit Idle", "enter Walk", "update Walk"]
        );
    }

    #[test]
    fn jump_returns_to_last_state() {
        let mut handler = StateHandler::from_factory(&factory()).expect("handler");
        let mut body = Body::default();
        handler.change_state(Key::Idle, &mut body).expect("start");
        body.input_x = 1.0;
        handler.update(1.0, &mut body).expect("walk");

        body.input_y = 1.0;
        handler.update(1.0, &mut body).expect("jump");
        assert!(handler.is_state(&Key::Jump));

        body.input_y = 0.0;
        handler.update(1.0, &mut body).expect("land");
        assert_eq!(handler.current(), Some(&Key::Walk));
    }

    #[test]
    fn firing_last_without_history_skips_post_update() {
        let mut handler = StateHandler::from_factory(&factory()).expect("handler");
        let mut body = Body::default();
        handler.change_state(Key::Jump, &mut body).expect("start");
        assert_eq!(handler.last(), None);

        handler.update(1.0, &mut body).expect("fired");
        assert!(handler.is_state(&Key::Jump));
        assert_eq!(body.post_updates, 0);

        body.input_y = 1.0;
        handler.update(1.0, &mut body).expect("held");
        assert_eq!(body.post_updates, 1);
    }

    #[test]
    fn unknown_state_is_reported() {
        let mut handler = StateHandler::<Key, Body>::default();
        assert!(matches!(
            handler.change_state(Key::Jump, &mut Body::default()),
            Err(StateError::UnknownState { .. })
        ));
        assert!(matches!(
            factory().create(&Key::Idle).map(|state| state.key()),
            Ok(Key::Idle)
        ));
    }

    #[test]
    fn animated_states_receive_their_animation() {
        let animations = AnimationConfig::parse(
            Path::new("body.xml"),
            r#"<animations>
                <animation name="idle" start="1" end="1" speed="0"/>
                <animation name="walk" start="2" end="4" speed="0.25" repeat="true"/>
            </animations>"#,
        )
        .expect("animations");

        let mut factory = StateFactory::<Key, Body>::default();
        factory
            .register_animated(&animations, &[Key::Idle, Key::Walk], |key, animation| {
                assert_eq!(animation.name(), key.animation_name());
                Basic::boxed(key)
            })
            .expect("register");
        assert_eq!(factory.keys().count(), 2);

        let err = factory
            .register_animated(&animations, &[Key::Jump], |key, _| Basic::boxed(key))
            .err();
        assert!(matches!(err, Some(StateError::MissingAnimation { .. })));
    }
}
