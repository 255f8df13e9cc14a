//! Two-body abduction animation.
//!
//! A *descender* (the ship) and a *riser* (the cow) move along the vertical
//! axis. While the phase is [`Phase::Descending`] the ship sinks towards its
//! lowered height and the cow is pulled up to the abduction threshold, swaying
//! sideways on the way and circling on a figure-eight once it arrives. While
//! the phase is [`Phase::Rising`] the ship climbs back and the cow falls,
//! tumbling around X as long as it is between the ground and the threshold.
//!
//! The ship's speed is tied to the cow's progress: it moves at
//! `base_speed * descender_remaining / riser_remaining` so that both tend to
//! arrive together, and falls back to `base_speed` when either distance is
//! within `speed_epsilon`.
//!
//! The update is level-triggered: nothing in here flips the phase, the caller
//! decides which phase applies and every step re-reads it.

use cgmath::Vector3;

use crate::config::ConfigProvider;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Phase {
    /// Descender climbs, riser falls back to the ground.
    Rising,
    /// Descender sinks, riser climbs to the abduction threshold.
    Descending,
}

impl Phase {
    /// The scene's binary flag: the house light being on means `Rising`.
    pub fn from_flag(house_light: bool) -> Self {
        if house_light {
            Phase::Rising
        } else {
            Phase::Descending
        }
    }

    pub fn flag(self) -> bool {
        self == Phase::Rising
    }

    pub fn toggled(self) -> Self {
        match self {
            Phase::Rising => Phase::Descending,
            Phase::Descending => Phase::Rising,
        }
    }
}

/// Which generator places the riser in the horizontal plane.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum RiserMotion {
    /// Offset along X only.
    Straight { lateral_offset: f32 },
    /// Figure-eight around the beam, used while held at the threshold.
    Curved { x: f32, z: f32 },
}

impl RiserMotion {
    pub fn horizontal(&self) -> (f32, f32) {
        match *self {
            RiserMotion::Straight { lateral_offset } => (lateral_offset, 0.0),
            RiserMotion::Curved { x, z } => (x, z),
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct AnimationConfig {
    pub base_speed: f32,
    pub abduction_threshold: f32,
    pub raised_height: f32,
    pub lowered_height: f32,
    /// Radians per second of tumbling while falling.
    pub angular_rate: f32,
    pub max_rotation: f32,
    pub sway_amplitude: f32,
    pub sway_frequency: f32,
    pub curve_amplitude: f32,
    pub curve_frequency: f32,
    pub speed_epsilon: f32,
}

impl Default for AnimationConfig {
    fn default() -> Self {
        let abduction_threshold = 5.0;
        let escape_height = 15.0;
        Self {
            base_speed: 1.5,
            abduction_threshold,
            raised_height: escape_height + 5.0,
            lowered_height: abduction_threshold + 1.5,
            angular_rate: 5.0,
            max_rotation: 720f32.to_radians(),
            sway_amplitude: 0.5,
            sway_frequency: 2.0,
            curve_amplitude: 1.0,
            curve_frequency: 2.0,
            speed_epsilon: 0.01,
        }
    }
}

impl AnimationConfig {
    /// Reads `heights.*`, `motion.*` and `curves.*`. The descender's travel
    /// range defaults to `[abduction + 1.5, escape + 5]`.
    pub fn from_config(cfg: &dyn ConfigProvider) -> Self {
        let defaults = Self::default();
        let abduction = cfg.get_float("heights.abduction", defaults.abduction_threshold);
        let escape = cfg.get_float("heights.escape", 15.0);
        Self {
            base_speed: cfg.get_float("motion.base_speed", defaults.base_speed),
            abduction_threshold: abduction,
            raised_height: cfg.get_float("initial_state.descender_top", escape + 5.0),
            lowered_height: cfg.get_float("initial_state.descender_bottom", abduction + 1.5),
            angular_rate: cfg.get_float("motion.angular_rate", defaults.angular_rate),
            max_rotation: cfg.get_float("motion.max_rotation_deg", 720.0).to_radians(),
            sway_amplitude: cfg.get_float("motion.sway_amplitude", defaults.sway_amplitude),
            sway_frequency: cfg.get_float("motion.sway_frequency", defaults.sway_frequency),
            curve_amplitude: cfg.get_float("curves.amplitude", defaults.curve_amplitude),
            curve_frequency: cfg.get_float("curves.frequency", defaults.curve_frequency),
            speed_epsilon: defaults.speed_epsilon,
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct AnimationState {
    pub descender_height: f32,
    pub riser_height: f32,
    pub rotation_angle: f32,
    pub motion: RiserMotion,
    pub phase: Phase,
}

impl AnimationState {
    /// Ship parked at the top, cow on the ground, ship flying away.
    pub fn new(config: &AnimationConfig) -> Self {
        Self {
            descender_height: config.raised_height,
            riser_height: 0.0,
            rotation_angle: 0.0,
            motion: RiserMotion::Straight {
                lateral_offset: 0.0,
            },
            phase: Phase::Rising,
        }
    }

    /// Sideways offset of the straight generator; zero while curving.
    pub fn lateral_offset(&self) -> f32 {
        match self.motion {
            RiserMotion::Straight { lateral_offset } => lateral_offset,
            RiserMotion::Curved { .. } => 0.0,
        }
    }

    pub fn toggle_phase(&mut self) {
        self.phase = self.phase.toggled();
    }

    pub fn descender_speed(&self, config: &AnimationConfig) -> f32 {
        let riser_remaining = config.abduction_threshold - self.riser_height;
        let descender_remaining = self.descender_height - config.lowered_height;
        if riser_remaining > config.speed_epsilon && descender_remaining > config.speed_epsilon {
            config.base_speed * (descender_remaining / riser_remaining)
        } else {
            config.base_speed
        }
    }

    /// Advances both bodies by `dt` seconds. `elapsed` is the scene clock that
    /// drives the sway and the figure-eight.
    pub fn step(&mut self, config: &AnimationConfig, dt: f32, elapsed: f32) {
        let descender_speed = self.descender_speed(config);
        match self.phase {
            Phase::Rising => {
                self.descender_height =
                    (self.descender_height + descender_speed * dt).min(config.raised_height);

                if self.riser_height > 0.0 {
                    self.riser_height = (self.riser_height - config.base_speed * dt).max(0.0);
                }
                if self.riser_height <= 0.0 {
                    self.riser_height = 0.0;
                    self.rotation_angle = 0.0;
                } else if self.riser_height < config.abduction_threshold {
                    self.rotation_angle = (self.rotation_angle + config.angular_rate * dt)
                        .min(config.max_rotation);
                }

                self.motion = RiserMotion::Straight {
                    lateral_offset: self.lateral_offset(),
                };
            }
            Phase::Descending => {
                self.descender_height =
                    (self.descender_height - descender_speed * dt).max(config.lowered_height);

                if self.riser_height < config.abduction_threshold {
                    self.riser_height = (self.riser_height + config.base_speed * dt)
                        .min(config.abduction_threshold);
                }
                if self.riser_height >= config.abduction_threshold {
                    self.riser_height = config.abduction_threshold;
                    let angle = elapsed * config.curve_frequency;
                    self.motion = RiserMotion::Curved {
                        x: config.curve_amplitude * angle.sin(),
                        z: config.curve_amplitude * angle.sin() * angle.cos(),
                    };
                } else {
                    self.motion = RiserMotion::Straight {
                        lateral_offset: config.sway_amplitude
                            * (elapsed * config.sway_frequency).sin(),
                    };
                }
            }
        }
    }

    /// The riser only tumbles while it falls back down.
    pub fn riser_tumbling(&self, config: &AnimationConfig) -> bool {
        self.phase == Phase::Rising
            && self.riser_height > 0.0
            && self.riser_height < config.abduction_threshold
    }

    pub fn riser_position(&self) -> Vector3<f32> {
        let (x, z) = self.motion.horizontal();
        Vector3::new(x, self.riser_height, z)
    }

    pub fn descender_position(&self) -> Vector3<f32> {
        Vector3::new(0.0, self.descender_height, 0.0)
    }
}
