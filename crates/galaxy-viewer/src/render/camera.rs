use bevy::input::mouse::{MouseMotion, MouseScrollUnit, MouseWheel};
use bevy::pbr::{FogFalloff, FogSettings};
use bevy::prelude::*;
use bevy_egui::EguiContexts;
use std::f32::consts::{FRAC_PI_2, PI};

use crate::app::input::{NavAction, NavKeys};
use crate::graph::GalaxyState;
use crate::render::picking::PointerTracker;
use crate::util::config::{BoundsPolicy, FirstPersonConfig, OrbitConfig, ViewerConfig};

pub const BACKGROUND: Color = Color::srgb(0.039, 0.031, 0.078);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CameraMode {
    #[default]
    Orbit,
    FirstPerson,
}

#[derive(Component)]
pub struct MainCamera;

/// Orbit around a focus point with damped rotate/pan and clamped zoom.
#[derive(Debug, Clone)]
pub struct OrbitRig {
    pub focus: Vec3,
    pub yaw: f32,
    pub pitch: f32,
    pub distance: f32,
    pending_yaw: f32,
    pending_pitch: f32,
    pending_pan: Vec3,
}

impl OrbitRig {
    const PITCH_LIMIT: f32 = FRAC_PI_2 - 0.01;

    pub fn new(distance: f32) -> Self {
        Self {
            focus: Vec3::ZERO,
            yaw: 0.0,
            pitch: 0.0,
            distance,
            pending_yaw: 0.0,
            pending_pitch: 0.0,
            pending_pan: Vec3::ZERO,
        }
    }

    /// Pointer drag in pixels; a drag across the full viewport height is one turn.
    pub fn rotate(&mut self, delta: Vec2, viewport_height: f32, cfg: &OrbitConfig) {
        let h = viewport_height.max(1.0);
        self.pending_yaw -= 2.0 * PI * delta.x / h * cfg.rotate_speed;
        self.pending_pitch += 2.0 * PI * delta.y / h * cfg.rotate_speed;
    }

    pub fn pan(&mut self, delta: Vec2, viewport_height: f32, fov: f32, cfg: &OrbitConfig) {
        let per_px = 2.0 * self.distance * (fov / 2.0).tan() / viewport_height.max(1.0);
        let rot = self.rotation();
        let right = rot * Vec3::X;
        let up = rot * Vec3::Y;
        self.pending_pan += (-right * delta.x + up * delta.y) * per_px * cfg.pan_speed;
    }

    /// Positive steps move closer.
    pub fn zoom(&mut self, steps: f32, cfg: &OrbitConfig) {
        let scale = 0.95_f32.powf(steps * cfg.zoom_speed);
        self.distance = (self.distance * scale).clamp(cfg.min_distance, cfg.max_distance);
    }

    /// Applies a `damping` fraction of the pending motion and decays the rest.
    pub fn step(&mut self, cfg: &OrbitConfig) {
        let d = cfg.damping.clamp(0.0, 1.0);
        self.yaw += self.pending_yaw * d;
        self.pitch = (self.pitch + self.pending_pitch * d).clamp(-Self::PITCH_LIMIT, Self::PITCH_LIMIT);
        self.focus += self.pending_pan * d;

        let keep = 1.0 - d;
        self.pending_yaw *= keep;
        self.pending_pitch *= keep;
        self.pending_pan *= keep;
    }

    fn rotation(&self) -> Quat {
        Quat::from_euler(EulerRot::YXZ, self.yaw, -self.pitch, 0.0)
    }

    pub fn eye(&self) -> Vec3 {
        self.focus + self.rotation() * Vec3::Z * self.distance
    }

    pub fn transform(&self) -> Transform {
        Transform::from_translation(self.eye()).with_rotation(self.rotation())
    }
}

/// Free-flying camera. `position` persists across mode switches.
#[derive(Debug, Clone)]
pub struct FirstPersonRig {
    pub position: Vec3,
    pub yaw: f32,
    pub pitch: f32,
}

impl Default for FirstPersonRig {
    fn default() -> Self {
        Self {
            position: Vec3::new(0.0, 0.0, 30.0),
            yaw: 0.0,
            pitch: 0.0,
        }
    }
}

impl FirstPersonRig {
    pub fn forward(&self) -> Vec3 {
        Vec3::new(-self.yaw.sin(), 0.0, -self.yaw.cos())
    }

    pub fn right(&self) -> Vec3 {
        Vec3::new(self.yaw.cos(), 0.0, -self.yaw.sin())
    }

    pub fn look(&mut self, delta: Vec2, cfg: &FirstPersonConfig) {
        self.yaw -= delta.x * cfg.look_sensitivity;
        self.pitch = (self.pitch - delta.y * cfg.look_sensitivity).clamp(-cfg.pitch_limit, cfg.pitch_limit);
    }

    /// Advances the position by `dt` seconds of held-key movement.
    pub fn integrate(&mut self, keys: &NavKeys, dt: f32, cfg: &FirstPersonConfig) {
        let mut dir = Vec3::ZERO;
        if keys.is_held(NavAction::Forward) {
            dir += self.forward();
        }
        if keys.is_held(NavAction::Back) {
            dir -= self.forward();
        }
        if keys.is_held(NavAction::Right) {
            dir += self.right();
        }
        if keys.is_held(NavAction::Left) {
            dir -= self.right();
        }
        if keys.is_held(NavAction::Up) {
            dir += Vec3::Y;
        }
        if keys.is_held(NavAction::Down) {
            dir -= Vec3::Y;
        }

        let mut speed = cfg.base_speed;
        if keys.is_held(NavAction::Boost) {
            speed *= cfg.boost_multiplier;
        }
        self.position = apply_bounds(self.position + dir * speed * dt, &cfg.bounds);
    }

    pub fn transform(&self) -> Transform {
        Transform::from_translation(self.position)
            .with_rotation(Quat::from_euler(EulerRot::YXZ, self.yaw, self.pitch, 0.0))
    }
}

pub fn apply_bounds(p: Vec3, bounds: &BoundsPolicy) -> Vec3 {
    match *bounds {
        BoundsPolicy::None => p,
        BoundsPolicy::Rect {
            min_x,
            max_x,
            min_z,
            max_z,
        } => Vec3::new(p.x.clamp(min_x, max_x), p.y, p.z.clamp(min_z, max_z)),
    }
}

#[derive(Resource)]
pub struct CameraRig {
    mode: CameraMode,
    pub orbit: OrbitRig,
    pub first_person: FirstPersonRig,
    pub orbit_cfg: OrbitConfig,
    pub first_person_cfg: FirstPersonConfig,
    pub fov: f32,
}

impl CameraRig {
    pub fn from_config(cfg: &ViewerConfig) -> Self {
        Self {
            mode: CameraMode::Orbit,
            orbit: OrbitRig::new(cfg.orbit.start_distance),
            first_person: FirstPersonRig::default(),
            orbit_cfg: cfg.orbit.clone(),
            first_person_cfg: cfg.first_person.clone(),
            fov: cfg.fov_degrees.to_radians(),
        }
    }

    pub fn mode(&self) -> CameraMode {
        self.mode
    }

    /// Switches modes; the keyboard tracker only listens in first person.
    pub fn set_mode(&mut self, mode: CameraMode, keys: &mut NavKeys) {
        if mode == self.mode {
            return;
        }
        self.mode = mode;
        match mode {
            CameraMode::FirstPerson => keys.attach(),
            CameraMode::Orbit => keys.detach(),
        }
        tracing::info!(?mode, "camera mode changed");
    }

    pub fn toggle_mode(&mut self, keys: &mut NavKeys) {
        let next = match self.mode {
            CameraMode::Orbit => CameraMode::FirstPerson,
            CameraMode::FirstPerson => CameraMode::Orbit,
        };
        self.set_mode(next, keys);
    }

    pub fn eye(&self) -> Vec3 {
        match self.mode {
            CameraMode::Orbit => self.orbit.eye(),
            CameraMode::FirstPerson => self.first_person.position,
        }
    }

    /// Distance used for zoom-dependent effects: orbit radius, or distance to
    /// the origin while flying.
    pub fn view_distance(&self) -> f32 {
        match self.mode {
            CameraMode::Orbit => self.orbit.distance,
            CameraMode::FirstPerson => self.first_person.position.length(),
        }
    }
}

/// How far the view is zoomed in relative to the starting distance; 1.0 at
/// the start, larger when closer.
pub fn zoom_factor(distance: f32, reference: f32) -> f32 {
    let z = reference / distance;
    if z.is_finite() && z > 0.0 {
        z
    } else {
        1.0
    }
}

pub fn setup_scene(mut commands: Commands, rig: Res<CameraRig>) {
    commands.insert_resource(ClearColor(BACKGROUND));
    commands.insert_resource(AmbientLight {
        color: Color::WHITE,
        brightness: 200.0,
    });

    commands.spawn(PointLightBundle {
        point_light: PointLight {
            intensity: 2_000_000.0,
            range: 200.0,
            ..default()
        },
        transform: Transform::from_xyz(10.0, 10.0, 10.0),
        ..default()
    });

    commands.spawn((
        Camera3dBundle {
            projection: PerspectiveProjection {
                fov: rig.fov,
                ..default()
            }
            .into(),
            transform: rig.orbit.transform(),
            ..default()
        },
        FogSettings {
            color: BACKGROUND,
            falloff: FogFalloff::Linear {
                start: 30.0,
                end: 100.0,
            },
            ..default()
        },
        MainCamera,
    ));
}

pub fn camera_input(
    mut motion: EventReader<MouseMotion>,
    mut wheel: EventReader<MouseWheel>,
    buttons: Res<ButtonInput<MouseButton>>,
    windows: Query<&Window>,
    pointer: Res<PointerTracker>,
    mut contexts: EguiContexts,
    mut rig: ResMut<CameraRig>,
) {
    let delta: Vec2 = motion.read().map(|m| m.delta).sum();
    let scroll: f32 = wheel
        .read()
        .map(|w| match w.unit {
            MouseScrollUnit::Line => w.y,
            MouseScrollUnit::Pixel => w.y / 100.0,
        })
        .sum();

    if contexts.ctx_mut().wants_pointer_input() {
        return;
    }
    let Ok(window) = windows.get_single() else {
        return;
    };
    let height = window.height();
    let rig = &mut *rig;

    match rig.mode {
        CameraMode::Orbit => {
            if buttons.pressed(MouseButton::Left) && !pointer.holds_edge_gesture() {
                rig.orbit.rotate(delta, height, &rig.orbit_cfg);
            }
            if buttons.pressed(MouseButton::Right) {
                rig.orbit.pan(delta, height, rig.fov, &rig.orbit_cfg);
            }
            if scroll != 0.0 {
                rig.orbit.zoom(scroll, &rig.orbit_cfg);
            }
        }
        CameraMode::FirstPerson => {
            if buttons.pressed(MouseButton::Right) {
                rig.first_person.look(delta, &rig.first_person_cfg);
            }
        }
    }
}

pub fn drive_camera(
    time: Res<Time>,
    keys: Res<NavKeys>,
    mut rig: ResMut<CameraRig>,
    mut cam_q: Query<&mut Transform, With<MainCamera>>,
) {
    let Ok(mut cam_tf) = cam_q.get_single_mut() else {
        return;
    };
    let rig = &mut *rig;
    *cam_tf = match rig.mode {
        CameraMode::Orbit => {
            rig.orbit.step(&rig.orbit_cfg);
            rig.orbit.transform()
        }
        CameraMode::FirstPerson => {
            rig.first_person
                .integrate(&keys, time.delta_seconds(), &rig.first_person_cfg);
            rig.first_person.transform()
        }
    };
}

/// Updates the zoom factor the depth parallax divides by.
pub fn track_zoom(rig: Res<CameraRig>, mut st: ResMut<GalaxyState>) {
    let z = zoom_factor(rig.view_distance(), rig.orbit_cfg.start_distance);
    if (st.zoom - z).abs() > f32::EPSILON {
        st.zoom = z;
    }
}
