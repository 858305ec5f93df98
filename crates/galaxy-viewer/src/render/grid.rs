use bevy::prelude::*;
use bevy::window::CursorMoved;
use std::time::Duration;

use crate::render::camera::{CameraRig, MainCamera};
use crate::render::lines::GridLines;

const GRID_Z: f32 = -0.01;
const CELL: Color = Color::srgb(0.25, 0.25, 0.25);
const SECTION: Color = Color::srgb(0.376, 0.376, 0.376);

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridParams {
    pub size: f32,
    pub divisions: u32,
    pub opacity: f32,
}

/// Grid extent and density for a camera `distance` from the origin looking
/// along `view_dir`. The grid's normal is +z.
pub fn grid_params(distance: f32, view_dir: Vec3) -> GridParams {
    let size = (distance * 2.0).max(50.0);
    let divisions = if distance > 0.0 {
        (20.0 * (50.0 / distance)).floor().clamp(10.0, 50.0) as u32
    } else {
        50
    };
    let dot = Vec3::Z.dot(view_dir.normalize_or_zero());
    GridParams {
        size,
        divisions,
        opacity: dot.abs().sqrt() * 0.5,
    }
}

/// Shows the grid while the pointer moves and hides it after an idle period.
#[derive(Resource, Debug)]
pub struct GridFade {
    idle: Duration,
    last_activity: Option<Duration>,
}

impl GridFade {
    pub fn new(idle: Duration) -> Self {
        Self {
            idle,
            last_activity: None,
        }
    }

    pub fn poke(&mut self, now: Duration) {
        self.last_activity = Some(now);
    }

    pub fn visible(&self, now: Duration) -> bool {
        self.last_activity
            .is_some_and(|at| now.saturating_sub(at) < self.idle)
    }
}

pub fn note_pointer_activity(
    time: Res<Time>,
    mut moved: EventReader<CursorMoved>,
    mut fade: ResMut<GridFade>,
) {
    if moved.read().count() > 0 {
        fade.poke(time.elapsed());
    }
}

pub fn draw_grid(
    time: Res<Time>,
    fade: Res<GridFade>,
    rig: Res<CameraRig>,
    cam_q: Query<&GlobalTransform, With<MainCamera>>,
    mut gizmos: Gizmos<GridLines>,
) {
    if !fade.visible(time.elapsed()) {
        return;
    }
    let Ok(cam_tf) = cam_q.get_single() else {
        return;
    };
    let params = grid_params(rig.eye().length(), *cam_tf.forward());
    if params.opacity <= 0.0 {
        return;
    }

    let half = params.size / 2.0;
    let step = params.size / params.divisions as f32;
    for i in 0..=params.divisions {
        let color = (if i % 10 == 0 { SECTION } else { CELL }).with_alpha(params.opacity);
        let k = -half + i as f32 * step;
        gizmos.line(Vec3::new(k, -half, GRID_Z), Vec3::new(k, half, GRID_Z), color);
        gizmos.line(Vec3::new(-half, k, GRID_Z), Vec3::new(half, k, GRID_Z), color);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn grid_grows_and_thins_with_distance() {
        let near = grid_params(10.0, Vec3::NEG_Z);
        assert_eq!(near.size, 50.0);
        assert_eq!(near.divisions, 50);

        let mid = grid_params(40.0, Vec3::NEG_Z);
        assert_eq!(mid.size, 80.0);
        assert_eq!(mid.divisions, 25);

        let far = grid_params(500.0, Vec3::NEG_Z);
        assert_eq!(far.size, 1000.0);
        assert_eq!(far.divisions, 10);
    }

    #[test]
    fn opacity_follows_view_angle() {
        assert_eq!(grid_params(30.0, Vec3::NEG_Z).opacity, 0.5);
        assert_eq!(grid_params(30.0, Vec3::X).opacity, 0.0);
        let oblique = grid_params(30.0, Vec3::new(0.0, 0.75_f32.sqrt(), -0.5)).opacity;
        assert!((oblique - 0.5_f32.sqrt() * 0.5).abs() < 1e-5);
    }

    #[test]
    fn fade_hides_after_idle() {
        let mut fade = GridFade::new(Duration::from_millis(2000));
        assert!(!fade.visible(Duration::from_secs(1)));

        fade.poke(Duration::from_secs(1));
        assert!(fade.visible(Duration::from_millis(2500)));
        assert!(!fade.visible(Duration::from_millis(3000)));

        fade.poke(Duration::from_millis(2900));
        assert!(fade.visible(Duration::from_millis(3000)));
    }
}
