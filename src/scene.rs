//! The abduction scene: a ship, a cow, a house and the ground.
//!
//! [`SceneDriver`] owns the animation state and the loaded models. Once per
//! frame the caller advances it with [`SceneDriver::update`] and asks for the
//! draw list and the active light. Models that failed to load are logged and
//! left out of the draw list; the animation keeps running regardless.

use std::path::{Path, PathBuf};

use cgmath::{InnerSpace, Matrix4, Point3, Rad, Vector3};

use crate::{
    animation::{AnimationConfig, AnimationState, Phase, RiserMotion},
    config::ConfigProvider,
    data_structures::{
        instance::Instance,
        model::{Material, MaterialBinding, Model},
    },
    error::AssetError,
    render::{DrawItem, Frame, SceneLight},
    resources::{
        load_model_obj,
        obj::LoadOptions,
        texture::{TextureHandle, TextureLoader},
    },
};

/// The things drawn each frame, in draw order.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Body {
    Ground,
    Descender,
    House,
    Riser,
}

impl Body {
    pub const DRAW_ORDER: [Body; 4] = [Body::Ground, Body::Descender, Body::House, Body::Riser];
}

/// Light colour and shading coefficients used while one phase is active.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct PhaseLight {
    pub color: Vector3<f32>,
    pub ambient: Vector3<f32>,
    pub diffuse: Vector3<f32>,
    pub specular: Vector3<f32>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct WindowSettings {
    pub width: u32,
    pub height: u32,
    pub title: String,
}

#[derive(Clone, Debug)]
pub struct SceneSettings {
    pub animation: AnimationConfig,
    pub initial: AnimationState,
    /// Upper bound for a single step, in seconds.
    pub max_step: f32,
    pub model_dir: PathBuf,
    pub descender_model: PathBuf,
    pub riser_model: PathBuf,
    pub house_model: PathBuf,
    pub house_position: Vector3<f32>,
    pub ground_texture: PathBuf,
    /// Drawn behind everything as a screen-filling backdrop.
    pub sky_texture: PathBuf,
    pub ground_material: Material,
    pub ground_half_extent: f32,
    pub house_light_position: Vector3<f32>,
    pub house_light: PhaseLight,
    pub beam_light: PhaseLight,
    pub window: WindowSettings,
}

impl SceneSettings {
    pub fn from_config(cfg: &dyn ConfigProvider) -> Self {
        let animation = AnimationConfig::from_config(cfg);
        let initial = AnimationState {
            descender_height: cfg
                .get_float("initial_state.descender_height", animation.raised_height),
            riser_height: cfg.get_float("initial_state.riser_height", 0.0),
            rotation_angle: cfg.get_float("initial_state.riser_rotation", 0.0),
            motion: RiserMotion::Straight {
                lateral_offset: cfg.get_float("initial_state.riser_offset", 0.0),
            },
            phase: Phase::from_flag(cfg.get_bool("initial_state.house_light", true)),
        };

        let model_dir = PathBuf::from(cfg.get_string("models.directory", "assets"));
        let model_path = |key: &str, default: &str| {
            PathBuf::from(cfg.get_string(key, &model_dir.join(default).to_string_lossy()))
        };

        Self {
            animation,
            initial,
            max_step: cfg.get_float("motion.max_step", 0.25),
            descender_model: model_path("models.descender", "ship.obj"),
            riser_model: model_path("models.riser", "cow.obj"),
            house_model: model_path("models.house", "house.obj"),
            ground_texture: model_path("textures.ground", "grass.png"),
            sky_texture: model_path("textures.sky", "sky.png"),
            model_dir,
            house_position: cfg.get_vec3("models.house_position", Vector3::new(5.0, 0.0, -5.0)),
            ground_material: Material {
                ambient: cfg.get_vec3("ground.ka", Vector3::new(0.2, 0.2, 0.2)),
                diffuse: cfg.get_vec3("ground.kd", Vector3::new(0.8, 0.8, 0.8)),
                specular: cfg.get_vec3("ground.ks", Vector3::new(0.1, 0.1, 0.1)),
                shininess: cfg.get_float("ground.shininess", 8.0),
            },
            ground_half_extent: cfg.get_float("ground.half_extent", 50.0),
            house_light_position: cfg
                .get_vec3("house_light.position", Vector3::new(5.0, 1.5, -6.5)),
            house_light: PhaseLight {
                color: Vector3::new(1.0, 1.0, 1.0),
                ambient: cfg.get_vec3("house_light.ka", Vector3::new(0.2, 0.2, 0.2)),
                diffuse: cfg.get_vec3("house_light.kd", Vector3::new(1.5, 1.5, 1.5)),
                specular: cfg.get_vec3("house_light.ks", Vector3::new(0.3, 0.3, 0.3)),
            },
            beam_light: PhaseLight {
                color: Vector3::new(0.0, 1.0, 0.0),
                ambient: cfg.get_vec3("descender_light.ka", Vector3::new(0.05, 0.2, 0.05)),
                diffuse: cfg.get_vec3("descender_light.kd", Vector3::new(0.2, 1.0, 0.2)),
                specular: cfg.get_vec3("descender_light.ks", Vector3::new(0.1, 0.8, 0.1)),
            },
            window: WindowSettings {
                width: cfg.get_float("window.width", 800.0).max(1.0) as u32,
                height: cfg.get_float("window.height", 600.0).max(1.0) as u32,
                title: cfg.get_string("window.title", "Abduction"),
            },
        }
    }
}

impl Default for SceneSettings {
    fn default() -> Self {
        Self::from_config(&crate::config::IniConfig::default())
    }
}

#[derive(Debug)]
pub struct SceneDriver {
    settings: SceneSettings,
    state: AnimationState,
    elapsed: f32,
    models: Vec<(Body, Model)>,
    sky: Option<TextureHandle>,
}

impl SceneDriver {
    /// A driver without any models; see [`load_assets`](Self::load_assets).
    pub fn new(settings: SceneSettings) -> Self {
        Self {
            state: settings.initial,
            settings,
            elapsed: 0.0,
            models: Vec::new(),
            sky: None,
        }
    }

    /// Loads every body and the sky. Failures are logged and the body is not drawn.
    pub fn load_assets(&mut self, textures: &mut dyn TextureLoader) {
        self.insert_model(Body::Ground, self.ground(textures));
        for body in [Body::Descender, Body::Riser, Body::House] {
            if let Err(e) = self.load_body(body, textures) {
                log::error!("{:?} will not be drawn: {}", body, e);
            }
        }
        self.sky = self.load_sky(textures);
    }

    pub fn load_body(
        &mut self,
        body: Body,
        textures: &mut dyn TextureLoader,
    ) -> Result<(), AssetError> {
        let path: &Path = match body {
            Body::Descender => &self.settings.descender_model,
            Body::Riser => &self.settings.riser_model,
            Body::House => &self.settings.house_model,
            Body::Ground => {
                let ground = self.ground(textures);
                self.insert_model(Body::Ground, ground);
                return Ok(());
            }
        };
        let model = load_model_obj(path, &self.settings.model_dir, &LoadOptions::default(), textures)?;
        self.insert_model(body, model);
        Ok(())
    }

    fn ground(&self, textures: &mut dyn TextureLoader) -> Model {
        let path = &self.settings.ground_texture;
        let texture = match textures.load_texture(path) {
            Ok(handle) => Some(handle),
            Err(e) => {
                log::warn!("Ground texture {} could not be loaded: {}", path.display(), e);
                None
            }
        };
        let binding = MaterialBinding::new(self.settings.ground_material)
            .with_texture(texture, Some(path.clone()));
        Model::ground_plane(self.settings.ground_half_extent, binding)
    }

    fn load_sky(&self, textures: &mut dyn TextureLoader) -> Option<TextureHandle> {
        let path = &self.settings.sky_texture;
        match textures.load_texture(path) {
            Ok(handle) => Some(handle),
            Err(e) => {
                log::warn!("Sky texture {} could not be loaded: {}", path.display(), e);
                None
            }
        }
    }

    /// The backdrop texture, if it loaded.
    pub fn sky(&self) -> Option<TextureHandle> {
        self.sky
    }

    /// Replaces whatever model the body had before.
    pub fn insert_model(&mut self, body: Body, model: Model) {
        self.models.retain(|(b, _)| *b != body);
        self.models.push((body, model));
    }

    pub fn model(&self, body: Body) -> Option<&Model> {
        self.models.iter().find(|(b, _)| *b == body).map(|(_, m)| m)
    }

    pub fn settings(&self) -> &SceneSettings {
        &self.settings
    }

    pub fn state(&self) -> &AnimationState {
        &self.state
    }

    pub fn state_mut(&mut self) -> &mut AnimationState {
        &mut self.state
    }

    pub fn elapsed(&self) -> f32 {
        self.elapsed
    }

    pub fn phase(&self) -> Phase {
        self.state.phase
    }

    pub fn set_phase(&mut self, phase: Phase) {
        self.state.phase = phase;
    }

    pub fn toggle_phase(&mut self) {
        self.state.toggle_phase();
        log::debug!("Phase is now {:?}", self.state.phase);
    }

    /// Advances the scene clock and the animation by one frame.
    ///
    /// `dt` is clamped into `[0, max_step]` so a stalled frame cannot throw
    /// the bodies across their whole range in a single step.
    pub fn update(&mut self, dt: f32) {
        let dt = if dt.is_finite() {
            dt.clamp(0.0, self.settings.max_step.max(0.0))
        } else {
            0.0
        };
        self.elapsed += dt;
        self.state.step(&self.settings.animation, dt, self.elapsed);
    }

    pub fn transform(&self, body: Body) -> Matrix4<f32> {
        let instance = match body {
            Body::Ground => Instance::default(),
            Body::House => Instance::at(self.settings.house_position),
            Body::Descender => {
                Instance::at(self.state.descender_position()).rotated_y(Rad(self.elapsed))
            }
            Body::Riser => {
                let riser = Instance::at(self.state.riser_position());
                if self.state.riser_tumbling(&self.settings.animation) {
                    riser.rotated_x(Rad(self.state.rotation_angle))
                } else {
                    riser
                }
            }
        };
        instance.to_matrix()
    }

    /// Loaded models with their transforms, in [`Body::DRAW_ORDER`].
    pub fn draw_list(&self) -> Vec<DrawItem<'_>> {
        Body::DRAW_ORDER
            .iter()
            .filter_map(|body| {
                self.model(*body).map(|model| DrawItem {
                    body: *body,
                    model,
                    transform: self.transform(*body),
                })
            })
            .collect()
    }

    /// Everything a renderer needs for the current state, seen from `eye`.
    pub fn frame(
        &self,
        view: Matrix4<f32>,
        projection: Matrix4<f32>,
        eye: Point3<f32>,
    ) -> Frame<'_> {
        Frame {
            items: self.draw_list(),
            light: self.light(),
            view,
            projection,
            eye,
            sky: self.sky,
        }
    }

    /// House light while rising, the ship's green beam while descending.
    pub fn light(&self) -> SceneLight {
        match self.state.phase {
            Phase::Rising => {
                let position = self.settings.house_light_position;
                // Aimed at the riser's column; sway does not move the beam.
                let target = Vector3::new(0.0, self.state.riser_height, 0.0);
                let to_riser = target - position;
                let direction = if to_riser.magnitude2() > f32::EPSILON {
                    to_riser.normalize()
                } else {
                    Vector3::new(0.0, -1.0, 0.0)
                };
                let light = self.settings.house_light;
                SceneLight {
                    position,
                    direction,
                    color: light.color,
                    ambient: light.ambient,
                    diffuse: light.diffuse,
                    specular: light.specular,
                }
            }
            Phase::Descending => {
                let light = self.settings.beam_light;
                SceneLight {
                    position: Vector3::new(0.0, self.state.descender_height - 1.0, 0.0),
                    direction: Vector3::new(0.0, -1.0, 0.0),
                    color: light.color,
                    ambient: light.ambient,
                    diffuse: light.diffuse,
                    specular: light.specular,
                }
            }
        }
    }
}
