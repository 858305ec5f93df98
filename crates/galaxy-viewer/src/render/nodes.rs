use bevy::prelude::*;
use galaxy_core::{NodeId, NodeKind};
use std::f32::consts::TAU;

use crate::graph::GalaxyState;
use crate::render::lines::ThinLines;
use crate::util::ids::float_phase;

const FLOAT_AMPLITUDE: f32 = 0.1;
const FLOAT_SPEED: f32 = 0.5;
const HALO_SEGMENTS: usize = 64;
const MAX_TICKS: usize = 5;

#[derive(Component)]
pub struct NodeVisual {
    pub id: NodeId,
    pub base: Vec3,
    pub depth: f32,
    pub phase: f32,
    pub radius: f32,
    pub material: Handle<StandardMaterial>,
}

/// Highest-precedence interaction state a node is in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeHighlight {
    Selected,
    MultiSelected,
    Hovered,
    Idle,
}

impl NodeHighlight {
    pub fn resolve(selected: bool, multi: bool, hovered: bool) -> Self {
        if selected {
            NodeHighlight::Selected
        } else if multi {
            NodeHighlight::MultiSelected
        } else if hovered {
            NodeHighlight::Hovered
        } else {
            NodeHighlight::Idle
        }
    }

    pub fn emissive(self) -> (Color, f32) {
        match self {
            NodeHighlight::Selected => (Color::srgb_u8(0xff, 0xff, 0xff), 0.8),
            NodeHighlight::MultiSelected => (Color::srgb_u8(0xff, 0xd7, 0x00), 0.8),
            NodeHighlight::Hovered => (Color::srgb_u8(0xa0, 0xa0, 0xff), 0.5),
            NodeHighlight::Idle => (Color::srgb_u8(0x60, 0x60, 0x80), 0.3),
        }
    }

    pub fn halo(self) -> Option<Color> {
        match self {
            NodeHighlight::Selected => Some(Color::WHITE),
            NodeHighlight::MultiSelected => Some(Color::srgb_u8(0xa0, 0x40, 0xff)),
            NodeHighlight::Hovered => Some(Color::srgb_u8(0x80, 0x80, 0x80)),
            NodeHighlight::Idle => None,
        }
    }
}

pub fn node_color(kind: NodeKind) -> Color {
    match kind {
        NodeKind::Concept => Color::srgb_u8(0xc8, 0xa2, 0xe0),
        NodeKind::Thinker => Color::srgb_u8(0x30, 0x60, 0xa0),
        NodeKind::Axiom => Color::srgb_u8(0xf0, 0xd0, 0x80),
        NodeKind::Synthesis => Color::srgb_u8(0xe0, 0x60, 0xa0),
        NodeKind::Archetype | NodeKind::Symbol | NodeKind::Myth => Color::srgb_u8(0x60, 0xe0, 0xc0),
        NodeKind::Custom => Color::srgb_u8(0xa0, 0xa0, 0xa0),
    }
}

pub fn float_offset(t: f32, phase: f32) -> f32 {
    (t * FLOAT_SPEED + phase).sin() * FLOAT_AMPLITUDE
}

/// Stored position plus the float bob and, when enabled, the depth parallax.
pub fn rendered_position(base: Vec3, depth: f32, phase: f32, t: f32, preview_depth: bool, zoom: f32) -> Vec3 {
    let depth_offset = if preview_depth { depth * (1.0 / zoom) } else { 0.0 };
    base + Vec3::new(0.0, float_offset(t, phase), depth_offset)
}

pub fn tick_count(importance: f32) -> usize {
    if importance > 0.0 {
        ((importance * MAX_TICKS as f32).ceil() as usize).min(MAX_TICKS)
    } else {
        0
    }
}

/// Closed circle in the node's local XY plane, spun by `rotation` and scaled by `scale`.
pub fn halo_points(center: Vec3, radius: f32, rotation: f32, scale: f32) -> [Vec3; HALO_SEGMENTS + 1] {
    let mut pts = [Vec3::ZERO; HALO_SEGMENTS + 1];
    for (i, p) in pts.iter_mut().enumerate() {
        let a = i as f32 / HALO_SEGMENTS as f32 * TAU + rotation;
        *p = center + Vec3::new(a.cos(), a.sin(), 0.0) * radius * scale;
    }
    pts
}

pub fn spawn_nodes(
    mut commands: Commands,
    st: Res<GalaxyState>,
    mut meshes: ResMut<Assets<Mesh>>,
    mut mats: ResMut<Assets<StandardMaterial>>,
    existing: Query<Entity, With<NodeVisual>>,
) {
    if !st.take_dirty() {
        return;
    }
    for e in existing.iter() {
        commands.entity(e).despawn_recursive();
    }

    let tick = meshes.add(Cuboid::new(0.1, 0.3, 0.1));
    let mut skipped = 0usize;
    for node in st.model.nodes() {
        let Some(pos) = node.render_position() else {
            skipped += 1;
            continue;
        };
        let radius = node.size.max(0.01) * st.ui.node_scale;
        let color = node_color(node.kind);
        let (glow, intensity) = NodeHighlight::Idle.emissive();
        let material = mats.add(StandardMaterial {
            base_color: color,
            emissive: glow.to_linear() * intensity,
            perceptual_roughness: 0.7,
            metallic: 0.3,
            ..default()
        });
        let tick_mat = mats.add(StandardMaterial {
            base_color: color.with_alpha(0.7),
            unlit: true,
            alpha_mode: AlphaMode::Blend,
            ..default()
        });

        let base = Vec3::from_array(pos);
        commands
            .spawn((
                PbrBundle {
                    mesh: meshes.add(Sphere::new(radius).mesh().uv(32, 32)),
                    material: material.clone(),
                    transform: Transform::from_translation(base),
                    ..default()
                },
                NodeVisual {
                    id: node.id,
                    base,
                    depth: node.depth,
                    phase: float_phase(node.id),
                    radius,
                    material,
                },
            ))
            .with_children(|parent| {
                for i in 0..tick_count(node.importance) {
                    let rot = Quat::from_rotation_z(i as f32 * TAU / MAX_TICKS as f32);
                    parent.spawn(PbrBundle {
                        mesh: tick.clone(),
                        material: tick_mat.clone(),
                        transform: Transform::from_translation(rot * Vec3::new(0.0, radius * 1.5, 0.0))
                            .with_rotation(rot),
                        ..default()
                    });
                }
            });
    }
    if skipped > 0 {
        tracing::debug!(skipped, "nodes without a usable position were not drawn");
    }
}

pub fn animate_nodes(
    time: Res<Time>,
    st: Res<GalaxyState>,
    mut mats: ResMut<Assets<StandardMaterial>>,
    mut nodes: Query<(&NodeVisual, &mut Transform)>,
    mut gizmos: Gizmos<ThinLines>,
) {
    let t = time.elapsed_seconds();
    let ix = &st.interaction;
    let halo_rotation = t * 0.2;
    let halo_scale = 1.0 + (t * 2.0).sin() * 0.05;

    for (visual, mut tf) in nodes.iter_mut() {
        let pos = rendered_position(visual.base, visual.depth, visual.phase, t, st.preview_depth(), st.zoom);
        tf.translation = pos;

        let highlight = NodeHighlight::resolve(
            ix.primary() == Some(visual.id),
            ix.is_multi_selected(visual.id),
            st.ui.hovered == Some(visual.id),
        );
        let (glow, intensity) = highlight.emissive();
        let want = glow.to_linear() * intensity;
        // Only touch the asset when the state changed.
        if mats.get(&visual.material).is_some_and(|m| m.emissive != want) {
            if let Some(m) = mats.get_mut(&visual.material) {
                m.emissive = want;
            }
        }

        if let Some(color) = highlight.halo() {
            gizmos.linestrip(halo_points(pos, visual.radius * 1.5, halo_rotation, halo_scale), color);
        }
    }
}
