use serde::Serialize;
use tilecore::{
    Animation, AnimationConfig, Animator, Axis, Frame, Keyed, Localizable, MapTile, Mover,
    Pending, Renderable, Shape, State, StateAnimationBased, StateError, StateFactory,
    StateHandler, StateTransitions, Target, TileCollidable, TileCollidableListener, Updatable,
    Viewer,
};
use tracing::warn;

use super::canvas::Canvas;

pub(crate) const MARIO_KEY: u32 = 1;

const WALK_SPEED: f64 = 2.0;
const ACCELERATION: f64 = 0.25;
const DECELERATION: f64 = 0.3;
const TURN_DECELERATION: f64 = 0.5;
const JUMP_SPEED: f64 = 5.5;
const GRAVITY: f64 = 0.3;
const MAX_FALL_SPEED: f64 = 6.0;
const SPRITE_SIZE: i32 = 16;
const OBSTACLE_LOOKAHEAD: f64 = 24.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub(crate) enum MarioState {
    Idle,
    Walk,
    Turn,
    Jump,
}

impl MarioState {
    const ALL: [MarioState; 4] = [
        MarioState::Idle,
        MarioState::Walk,
        MarioState::Turn,
        MarioState::Jump,
    ];
}

impl StateAnimationBased for MarioState {
    fn animation_name(&self) -> &'static str {
        match self {
            MarioState::Idle => "idle",
            MarioState::Walk => "walk",
            MarioState::Turn => "turn",
            MarioState::Jump => "jump",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub(crate) struct Input {
    pub(crate) direction: f64,
    pub(crate) jump: bool,
}

/// What the states read and drive.
#[derive(Debug, Clone)]
pub(crate) struct Body {
    mover: Mover,
    vx: f64,
    vy: f64,
    input: Input,
    grounded: bool,
    facing: f64,
    animator: Animator,
    state_changes: u32,
}

impl Body {
    fn new(x: f64, y: f64) -> Self {
        let mut mover = Mover::default();
        mover.teleport(x, y);
        Self {
            mover,
            vx: 0.0,
            vy: 0.0,
            input: Input::default(),
            grounded: false,
            facing: 1.0,
            animator: Animator::default(),
            state_changes: 0,
        }
    }

    fn is_reversing(&self) -> bool {
        self.input.direction * self.vx < 0.0
    }
}

fn approach(value: f64, target: f64, step: f64) -> f64 {
    if value < target {
        (value + step).min(target)
    } else {
        (value - step).max(target)
    }
}

struct Behavior {
    key: MarioState,
    animation: Animation,
    transitions: StateTransitions<MarioState, Body>,
}

impl Behavior {
    fn boxed(
        key: MarioState,
        animation: Animation,
    ) -> Result<Box<dyn State<MarioState, Body>>, StateError> {
        let mut behavior = Behavior {
            key,
            animation,
            transitions: StateTransitions::new(key),
        };
        let jump = |body: &Body| body.grounded && body.input.jump;
        match key {
            MarioState::Idle => {
                behavior.add_transition(Target::State(MarioState::Jump), Box::new(jump))?;
                behavior.add_transition(
                    Target::State(MarioState::Walk),
                    Box::new(|body: &Body| body.input.direction != 0.0),
                )?;
            }
            MarioState::Walk => {
                behavior.add_transition(Target::State(MarioState::Jump), Box::new(jump))?;
                behavior.add_transition(
                    Target::State(MarioState::Turn),
                    Box::new(|body: &Body| body.is_reversing()),
                )?;
                behavior.add_transition(
                    Target::State(MarioState::Idle),
                    Box::new(|body: &Body| body.input.direction == 0.0),
                )?;
            }
            MarioState::Turn => {
                behavior.add_transition(Target::State(MarioState::Jump), Box::new(jump))?;
                behavior.add_transition(
                    Target::State(MarioState::Idle),
                    Box::new(|body: &Body| body.input.direction == 0.0),
                )?;
                behavior.add_transition(
                    Target::State(MarioState::Walk),
                    Box::new(|body: &Body| !body.is_reversing()),
                )?;
            }
            MarioState::Jump => {
                let landed = |body: &Body| body.grounded && body.vy <= 0.0;
                behavior.add_transition(
                    Target::State(MarioState::Idle),
                    Box::new(move |body: &Body| landed(body) && body.input.direction == 0.0),
                )?;
                behavior.add_transition(Target::Last, Box::new(landed))?;
            }
        }
        Ok(Box::new(behavior))
    }
}

impl State<MarioState, Body> for Behavior {
    fn key(&self) -> MarioState {
        self.key
    }

    fn transitions(&mut self) -> &mut StateTransitions<MarioState, Body> {
        &mut self.transitions
    }

    fn enter(&mut self, body: &mut Body) {
        body.animator.play(&self.animation);
        body.state_changes += 1;
        match self.key {
            MarioState::Jump => {
                body.vy = JUMP_SPEED;
                body.grounded = false;
            }
            MarioState::Turn => body.facing = body.input.direction.signum(),
            MarioState::Idle | MarioState::Walk => {}
        }
    }

    fn update(&mut self, extrp: f64, body: &mut Body) {
        let direction = body.input.direction;
        match self.key {
            MarioState::Idle => body.vx = approach(body.vx, 0.0, DECELERATION * extrp),
            MarioState::Turn => body.vx = approach(body.vx, 0.0, TURN_DECELERATION * extrp),
            MarioState::Walk | MarioState::Jump => {
                body.vx = approach(body.vx, direction * WALK_SPEED, ACCELERATION * extrp);
                if direction != 0.0 {
                    body.facing = direction.signum();
                }
            }
        }
    }
}

/// Scripted input: wait, walk right hopping over obstacles, walk back for a
/// while, then stand still.
#[derive(Debug, Clone)]
pub(crate) struct Pilot {
    start_tick: u32,
    turn_x: f64,
    return_ticks: u32,
    turned_at: Option<u32>,
}

impl Pilot {
    pub(crate) fn new(start_tick: u32, turn_x: f64, return_ticks: u32) -> Self {
        Self {
            start_tick,
            turn_x,
            return_ticks,
            turned_at: None,
        }
    }

    fn input(&mut self, tick: u32, body: &Body, map: &MapTile) -> Input {
        if tick < self.start_tick {
            return Input::default();
        }
        if self.turned_at.is_none() && body.mover.x() >= self.turn_x {
            self.turned_at = Some(tick);
        }
        let direction = match self.turned_at {
            None => 1.0,
            Some(turned_at) if tick - turned_at < self.return_ticks => -1.0,
            Some(_) => 0.0,
        };
        let ahead = body.mover.x() + direction * OBSTACLE_LOOKAHEAD;
        let jump = body.grounded
            && direction != 0.0
            && map.get_tile_at(ahead, body.mover.y() + 1.0).is_some();
        Input { direction, jump }
    }
}

pub(crate) struct Mario {
    body: Body,
    states: StateHandler<MarioState, Body>,
    collidable: TileCollidable,
    pilot: Pilot,
    tick: u32,
}

impl Mario {
    pub(crate) fn new(
        animations: &AnimationConfig,
        pilot: Pilot,
        x: f64,
        y: f64,
    ) -> Result<Self, StateError> {
        let mut factory = StateFactory::default();
        factory.register_animated(animations, &MarioState::ALL, Behavior::boxed)?;
        let mut states = StateHandler::from_factory(&factory)?;
        let mut body = Body::new(x, y);
        states.change_state(MarioState::Idle, &mut body)?;
        Ok(Self {
            body,
            states,
            collidable: TileCollidable::default(),
            pilot,
            tick: 0,
        })
    }

    pub(crate) fn add_collision_listener(&mut self, listener: Box<dyn TileCollidableListener>) {
        self.collidable.add_listener(listener);
    }

    pub(crate) fn state(&self) -> Option<MarioState> {
        self.states.current().copied()
    }

    pub(crate) fn movement(&self) -> (f64, f64) {
        let mover = &self.body.mover;
        (mover.x() - mover.old_x(), mover.y() - mover.old_y())
    }

    pub(crate) fn is_grounded(&self) -> bool {
        self.body.grounded
    }

    pub(crate) fn state_changes(&self) -> u32 {
        self.body.state_changes
    }

    pub(crate) fn frame(&self) -> u32 {
        self.body.animator.frame()
    }

    /// Gravity, then the horizontal move, then the vertical one, each clipped
    /// by the map.
    fn apply_physics(&mut self, extrp: f64, frame: &Frame<'_>) {
        let body = &mut self.body;
        body.vy = (body.vy - GRAVITY * extrp).max(-MAX_FALL_SPEED);
        let (ox, oy) = (body.mover.x(), body.mover.y());

        let mut x = ox + body.vx * extrp;
        let hits = self
            .collidable
            .update(frame.map, frame.collision, (ox, oy), (x, oy));
        if let Some(hit) = hits.iter().find(|hit| hit.axis == Axis::X) {
            x = if body.vx > 0.0 {
                hit.position - 1.0
            } else {
                hit.position
            };
            body.vx = 0.0;
        }

        let mut y = oy + body.vy * extrp;
        let hits = self
            .collidable
            .update(frame.map, frame.collision, (x, oy), (x, y));
        body.grounded = false;
        if body.vy <= 0.0 {
            if let Some(hit) = hits.iter().find(|hit| hit.axis == Axis::Y) {
                y = hit.position;
                body.vy = 0.0;
                body.grounded = true;
            }
        }

        body.mover.backup();
        body.mover.move_location(1.0, x - ox, y - oy);
    }
}

impl Keyed for Mario {
    type Key = u32;

    fn key(&self) -> u32 {
        MARIO_KEY
    }
}

impl Updatable<Frame<'_>> for Mario {
    fn update(&mut self, extrp: f64, frame: &mut Frame<'_>, _pending: &mut Pending<Self>) {
        self.body.input = self.pilot.input(self.tick, &self.body, frame.map);
        if let Err(err) = self.states.update(extrp, &mut self.body) {
            warn!(error = %err, tick = self.tick, "mario_state_update_failed");
        }
        self.apply_physics(extrp, frame);
        self.body.animator.update(extrp);
        self.tick += 1;
    }
}

impl Renderable<Canvas> for Mario {
    fn render(&self, viewer: &dyn Viewer, canvas: &mut Canvas) {
        if viewer.is_viewable_shape(self, 0, 0) {
            canvas.draw_sprite(
                self.frame(),
                viewer.viewpoint_x(self.x()) as i32,
                viewer.viewpoint_y(self.y()) as i32,
            );
        }
    }
}

impl Localizable for Mario {
    fn x(&self) -> f64 {
        self.body.mover.x()
    }

    fn y(&self) -> f64 {
        self.body.mover.y()
    }
}

impl Shape for Mario {
    fn width(&self) -> i32 {
        SPRITE_SIZE
    }

    fn height(&self) -> i32 {
        SPRITE_SIZE
    }
}
