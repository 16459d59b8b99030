use std::collections::BTreeMap;
use std::path::Path;

use crate::config::ConfigError;
use crate::xml::{self, XmlDoc};

const NODE_ANIMATIONS: &str = "animations";
const NODE_ANIMATION: &str = "animation";

/// Frame range played by an [`Animator`]. Frames are 1-based sheet indices.
#[derive(Debug, Clone, PartialEq)]
pub struct Animation {
    name: String,
    first: u32,
    last: u32,
    speed: f64,
    reverse: bool,
    repeat: bool,
}

impl Animation {
    pub fn new(
        name: impl Into<String>,
        first: u32,
        last: u32,
        speed: f64,
        reverse: bool,
        repeat: bool,
    ) -> Result<Self, ConfigError> {
        let name = name.into();
        if first < 1 || last < first {
            return Err(ConfigError::Invalid {
                kind: "animation",
                name,
                message: format!("frame range {first}..={last} must start at 1 and be ordered"),
            });
        }
        if speed.is_nan() || speed < 0.0 {
            return Err(ConfigError::Invalid {
                kind: "animation",
                name,
                message: format!("speed {speed} must be non-negative"),
            });
        }
        Ok(Self {
            name,
            first,
            last,
            speed,
            reverse,
            repeat,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn first(&self) -> u32 {
        self.first
    }

    pub fn last(&self) -> u32 {
        self.last
    }

    pub fn speed(&self) -> f64 {
        self.speed
    }

    pub fn reverse(&self) -> bool {
        self.reverse
    }

    pub fn repeat(&self) -> bool {
        self.repeat
    }
}

/// Named animations of one entity type.
///
/// ```xml
/// <animations>
///     <animation name="walk" start="2" end="4" speed="0.25" reversed="false" repeat="true"/>
/// </animations>
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AnimationConfig {
    animations: BTreeMap<String, Animation>,
}

impl AnimationConfig {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = xml::read_text(path)?;
        Self::parse(path, &text)
    }

    pub fn parse(path: &Path, text: &str) -> Result<Self, ConfigError> {
        let doc = xml::parse(path, text)?;
        let xml = XmlDoc::new(path, &doc);
        let root = xml.root(NODE_ANIMATIONS)?;

        let mut config = Self::default();
        for node in xml::children(root, NODE_ANIMATION) {
            let name = xml.attribute::<String>(node, "name")?;
            let animation = Animation::new(
                name.clone(),
                xml.attribute(node, "start")?,
                xml.attribute(node, "end")?,
                xml.attribute(node, "speed")?,
                xml.attribute_or(node, "reversed", false)?,
                xml.attribute_or(node, "repeat", false)?,
            )?;
            if config.animations.insert(name.clone(), animation).is_some() {
                return Err(ConfigError::DuplicateName {
                    path: path.to_path_buf(),
                    kind: "animation",
                    name,
                });
            }
        }
        Ok(config)
    }

    pub fn insert(&mut self, animation: Animation) {
        self.animations.insert(animation.name.clone(), animation);
    }

    pub fn animation(&self, name: &str) -> Option<&Animation> {
        self.animations.get(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.animations.keys().map(String::as_str)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnimState {
    Stopped,
    Playing,
    Reversing,
    Finished,
}

/// Plays one [`Animation`] at a time, advancing by `speed * extrp` per update.
#[derive(Debug, Clone)]
pub struct Animator {
    first: u32,
    last: u32,
    speed: f64,
    reverse: bool,
    repeat: bool,
    current: f64,
    state: AnimState,
}

impl Default for Animator {
    fn default() -> Self {
        Self {
            first: 1,
            last: 1,
            speed: 0.0,
            reverse: false,
            repeat: false,
            current: 1.0,
            state: AnimState::Stopped,
        }
    }
}

impl Animator {
    pub fn play(&mut self, animation: &Animation) {
        self.first = animation.first;
        self.last = animation.last;
        self.speed = animation.speed;
        self.reverse = animation.reverse;
        self.repeat = animation.repeat;
        self.current = f64::from(animation.first);
        self.state = AnimState::Playing;
    }

    pub fn stop(&mut self) {
        self.state = AnimState::Stopped;
    }

    pub fn set_speed(&mut self, speed: f64) {
        self.speed = speed.max(0.0);
    }

    pub fn set_frame(&mut self, frame: u32) {
        self.current = f64::from(frame.clamp(self.first, self.last));
    }

    pub fn update(&mut self, extrp: f64) {
        match self.state {
            AnimState::Playing => {
                self.current += self.speed * extrp;
                if self.current >= f64::from(self.last) + 1.0 {
                    if self.reverse {
                        self.current = f64::from(self.last);
                        self.state = AnimState::Reversing;
                    } else if self.repeat {
                        self.current = f64::from(self.first);
                    } else {
                        self.current = f64::from(self.last);
                        self.state = AnimState::Finished;
                    }
                }
            }
            AnimState::Reversing => {
                self.current -= self.speed * extrp;
                if self.current < f64::from(self.first) {
                    self.current = f64::from(self.first);
                    self.state = if self.repeat {
                        AnimState::Playing
                    } else {
                        AnimState::Finished
                    };
                }
            }
            AnimState::Stopped | AnimState::Finished => {}
        }
    }

    pub fn frame(&self) -> u32 {
        (self.current.floor() as u32).clamp(self.first, self.last)
    }

    pub fn state(&self) -> AnimState {
        self.state
    }

    pub fn is_finished(&self) -> bool {
        self.state == AnimState::Finished
    }
}
