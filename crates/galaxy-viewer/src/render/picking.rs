use bevy::prelude::*;
use bevy_egui::EguiContexts;
use galaxy_core::NodeId;

use crate::graph::GalaxyState;
use crate::render::camera::MainCamera;
use crate::render::nodes::NodeVisual;

/// Invisible catch plane for "empty space" clicks: 1000x1000 at z = -50, facing +z.
const BACKGROUND_Z: f32 = -50.0;
const BACKGROUND_HALF_EXTENT: f32 = 500.0;
/// Where a ray that hits nothing ends up.
const FALLBACK_DISTANCE: f32 = 20.0;
const DRAG_THRESHOLD_PX: f32 = 6.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Pick {
    Node { id: NodeId, point: Vec3 },
    Background(Vec3),
    Nothing(Vec3),
}

impl Pick {
    pub fn node(&self) -> Option<NodeId> {
        match self {
            Pick::Node { id, .. } => Some(*id),
            _ => None,
        }
    }

    pub fn point(&self) -> Vec3 {
        match *self {
            Pick::Node { point, .. } | Pick::Background(point) | Pick::Nothing(point) => point,
        }
    }
}

/// Nearest positive hit distance of a ray against a sphere.
pub fn ray_sphere(origin: Vec3, dir: Vec3, center: Vec3, radius: f32) -> Option<f32> {
    let oc = origin - center;
    let b = oc.dot(dir);
    let c = oc.length_squared() - radius * radius;
    let disc = b * b - c;
    if disc < 0.0 {
        return None;
    }
    let sq = disc.sqrt();
    [-b - sq, -b + sq].into_iter().find(|t| *t > 0.0)
}

fn ray_background(origin: Vec3, dir: Vec3) -> Option<Vec3> {
    // Front face only.
    if dir.z >= 0.0 {
        return None;
    }
    let t = (BACKGROUND_Z - origin.z) / dir.z;
    if t <= 0.0 {
        return None;
    }
    let p = origin + dir * t;
    (p.x.abs() <= BACKGROUND_HALF_EXTENT && p.y.abs() <= BACKGROUND_HALF_EXTENT).then_some(p)
}

/// Resolves a pointer ray: closest node sphere, else the background plane,
/// else a point a fixed distance along the ray.
pub fn pick_ray(
    origin: Vec3,
    dir: Vec3,
    targets: impl IntoIterator<Item = (NodeId, Vec3, f32)>,
) -> Pick {
    let dir = dir.normalize_or_zero();
    let nearest = targets
        .into_iter()
        .filter_map(|(id, center, radius)| Some((ray_sphere(origin, dir, center, radius)?, id)))
        .min_by(|a, b| a.0.total_cmp(&b.0));

    if let Some((t, id)) = nearest {
        return Pick::Node {
            id,
            point: origin + dir * t,
        };
    }
    match ray_background(origin, dir) {
        Some(p) => Pick::Background(p),
        None => Pick::Nothing(origin + dir * FALLBACK_DISTANCE),
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct Press {
    cursor: Vec2,
    pick: Pick,
    shift: bool,
    moved: bool,
}

/// A press that was released without dragging.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Click {
    pub pick: Pick,
    pub shift: bool,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Gesture {
    None,
    StartEdge(NodeId),
}

/// Left-button press/drag/release bookkeeping.
#[derive(Resource, Debug, Default)]
pub struct PointerTracker {
    press: Option<Press>,
}

impl PointerTracker {
    pub fn press(&mut self, cursor: Vec2, pick: Pick, shift: bool) {
        self.press = Some(Press {
            cursor,
            pick,
            shift,
            moved: false,
        });
    }

    /// Reports the start of a shift-drag off a node, once per press.
    pub fn drag(&mut self, cursor: Vec2) -> Gesture {
        let Some(press) = self.press.as_mut() else {
            return Gesture::None;
        };
        if press.moved || press.cursor.distance(cursor) <= DRAG_THRESHOLD_PX {
            return Gesture::None;
        }
        press.moved = true;
        match (press.shift, press.pick) {
            (true, Pick::Node { id, .. }) => Gesture::StartEdge(id),
            _ => Gesture::None,
        }
    }

    pub fn release(&mut self) -> Option<Click> {
        let press = self.press.take()?;
        (!press.moved).then_some(Click {
            pick: press.pick,
            shift: press.shift,
        })
    }

    /// A shift-press on a node owns the left button; orbit rotation backs off.
    pub fn holds_edge_gesture(&self) -> bool {
        matches!(
            self.press,
            Some(Press {
                shift: true,
                pick: Pick::Node { .. },
                ..
            })
        )
    }
}

#[allow(clippy::too_many_arguments)]
pub fn pointer_interaction(
    buttons: Res<ButtonInput<MouseButton>>,
    keys: Res<ButtonInput<KeyCode>>,
    windows: Query<&Window>,
    cam_q: Query<(&Camera, &GlobalTransform), With<MainCamera>>,
    nodes: Query<(&NodeVisual, &GlobalTransform)>,
    mut contexts: EguiContexts,
    mut tracker: ResMut<PointerTracker>,
    mut st: ResMut<GalaxyState>,
) {
    let Ok(window) = windows.get_single() else {
        return;
    };
    let Some(cursor) = window.cursor_position() else {
        if st.ui.hovered.is_some() {
            st.ui.hovered = None;
        }
        return;
    };
    let Ok((camera, cam_tf)) = cam_q.get_single() else {
        return;
    };
    let Some(ray) = camera.viewport_to_world(cam_tf, cursor) else {
        return;
    };

    let pick = pick_ray(
        ray.origin,
        *ray.direction,
        nodes
            .iter()
            .map(|(v, tf)| (v.id, tf.translation(), v.radius)),
    );

    if st.interaction.edge_session().is_some() {
        st.update_edge_end(pick.point());
    }

    if contexts.ctx_mut().wants_pointer_input() {
        if st.ui.hovered.is_some() {
            st.ui.hovered = None;
        }
        return;
    }

    let hovered = pick.node();
    if st.ui.hovered != hovered {
        st.ui.hovered = hovered;
    }

    let shift = keys.any_pressed([KeyCode::ShiftLeft, KeyCode::ShiftRight]);
    if buttons.just_pressed(MouseButton::Left) {
        tracker.press(cursor, pick, shift);
    }
    if buttons.pressed(MouseButton::Left) {
        if let Gesture::StartEdge(source) = tracker.drag(cursor) {
            st.start_edge(source);
        }
    }
    if buttons.just_released(MouseButton::Left) {
        let Some(click) = tracker.release() else {
            return;
        };
        match (click.pick, click.shift) {
            (Pick::Node { id, .. }, true) => {
                st.shift_click_node(id);
            }
            (Pick::Node { id, .. }, false) => {
                st.click_node(id);
            }
            (Pick::Background(point), _) => {
                st.click_background(point);
            }
            (Pick::Nothing(_), _) => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EYE: Vec3 = Vec3::new(0.0, 0.0, 30.0);

    #[test]
    fn nearest_node_wins() {
        let targets = [
            (NodeId(1), Vec3::new(0.0, 0.0, -10.0), 1.0),
            (NodeId(2), Vec3::new(0.0, 0.0, 5.0), 1.0),
        ];
        let pick = pick_ray(EYE, Vec3::NEG_Z, targets);
        assert_eq!(
            pick,
            Pick::Node {
                id: NodeId(2),
                point: Vec3::new(0.0, 0.0, 6.0)
            }
        );
    }

    #[test]
    fn miss_hits_background_plane() {
        let pick = pick_ray(EYE, Vec3::NEG_Z, [(NodeId(1), Vec3::new(5.0, 0.0, 0.0), 1.0)]);
        assert_eq!(pick, Pick::Background(Vec3::new(0.0, 0.0, -50.0)));
    }

    #[test]
    fn looking_away_falls_back_to_fixed_distance() {
        let pick = pick_ray(EYE, Vec3::Z, []);
        assert_eq!(pick, Pick::Nothing(Vec3::new(0.0, 0.0, 50.0)));

        let sideways = pick_ray(Vec3::ZERO, Vec3::new(1.0, 0.0, -0.001), []);
        assert!(matches!(sideways, Pick::Nothing(_)));
        assert!((sideways.point().length() - 20.0).abs() < 1e-3);
    }

    #[test]
    fn sphere_behind_ray_is_ignored() {
        assert_eq!(ray_sphere(EYE, Vec3::Z, Vec3::ZERO, 1.0), None);
        assert_eq!(ray_sphere(Vec3::ZERO, Vec3::Z, Vec3::ZERO, 2.0), Some(2.0));
    }

    #[test]
    fn click_without_drag() {
        let mut t = PointerTracker::default();
        t.press(Vec2::new(100.0, 100.0), Pick::Background(Vec3::ZERO), false);
        assert_eq!(t.drag(Vec2::new(103.0, 102.0)), Gesture::None);
        assert_eq!(
            t.release(),
            Some(Click {
                pick: Pick::Background(Vec3::ZERO),
                shift: false
            })
        );
        assert_eq!(t.release(), None);
    }

    #[test]
    fn shift_drag_on_node_starts_edge_once() {
        let mut t = PointerTracker::default();
        let on_node = Pick::Node {
            id: NodeId(4),
            point: Vec3::ZERO,
        };
        t.press(Vec2::ZERO, on_node, true);
        assert!(t.holds_edge_gesture());

        assert_eq!(t.drag(Vec2::new(20.0, 0.0)), Gesture::StartEdge(NodeId(4)));
        assert_eq!(t.drag(Vec2::new(40.0, 0.0)), Gesture::None);
        assert_eq!(t.release(), None);
        assert!(!t.holds_edge_gesture());
    }

    #[test]
    fn plain_drag_is_not_a_click() {
        let mut t = PointerTracker::default();
        let on_node = Pick::Node {
            id: NodeId(4),
            point: Vec3::ZERO,
        };
        t.press(Vec2::ZERO, on_node, false);
        assert!(!t.holds_edge_gesture());
        assert_eq!(t.drag(Vec2::new(50.0, 50.0)), Gesture::None);
        assert_eq!(t.release(), None);
    }
}
