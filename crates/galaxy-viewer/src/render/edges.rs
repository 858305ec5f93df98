use bevy::prelude::*;
use galaxy_core::RelationKind;
use smallvec::SmallVec;

use crate::graph::GalaxyState;
use crate::render::lines::{LineWidth, MediumLines, ThickLines, ThinLines};

pub const CURVE_SAMPLES: usize = 20;
const BOW: f32 = 0.2;
const MARKERS_PER_EDGE: usize = 3;
const MARKER_SPEED: f32 = 0.5;
const MARKER_STAGGER: f32 = 0.2;
const PREVIEW_DASH: Dash = Dash { dash: 0.3, gap: 0.1 };

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Dash {
    pub dash: f32,
    pub gap: f32,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EdgeStyle {
    pub color: Color,
    pub width: LineWidth,
    pub dash: Option<Dash>,
}

impl EdgeStyle {
    fn solid(r: u8, g: u8, b: u8) -> Self {
        Self {
            color: Color::srgb_u8(r, g, b),
            width: LineWidth::Thin,
            dash: None,
        }
    }
}

pub fn edge_style(kind: Option<RelationKind>) -> EdgeStyle {
    let Some(kind) = kind else {
        return EdgeStyle::solid(0xa0, 0xa0, 0xa0);
    };
    match kind {
        RelationKind::Is => EdgeStyle {
            width: LineWidth::Thick,
            ..EdgeStyle::solid(0xc0, 0xc0, 0xc0)
        },
        RelationKind::Has => EdgeStyle {
            dash: Some(Dash { dash: 0.3, gap: 0.2 }),
            ..EdgeStyle::solid(0xc0, 0xc0, 0xc0)
        },
        RelationKind::DependsOn => EdgeStyle::solid(0x60, 0x80, 0xa0),
        RelationKind::ContrastsWith => EdgeStyle::solid(0x40, 0x40, 0x60),
        RelationKind::ConflictsWith => EdgeStyle {
            width: LineWidth::Medium,
            ..EdgeStyle::solid(0xa0, 0x40, 0x40)
        },
        RelationKind::Implies => EdgeStyle::solid(0x40, 0xa0, 0xc0),
        RelationKind::EmergesFrom => EdgeStyle::solid(0x40, 0xa0, 0x80),
        RelationKind::TransformsInto => EdgeStyle::solid(0xa0, 0x40, 0xa0),
        RelationKind::AlignsWith => EdgeStyle::solid(0xc0, 0xa0, 0x40),
        RelationKind::Symbolizes => EdgeStyle::solid(0x40, 0xc0, 0xc0),
        RelationKind::ContainsTensionWithin => EdgeStyle::solid(0x80, 0x20, 0x20),
        RelationKind::Seeks => EdgeStyle {
            dash: Some(Dash { dash: 0.5, gap: 0.2 }),
            ..EdgeStyle::solid(0xc0, 0x60, 0x40)
        },
    }
}

/// Quadratic curve from `a` to `b`, bowed sideways by a fifth of its length.
/// `None` when the endpoints or the result aren't finite.
pub fn curve_points(a: Vec3, b: Vec3) -> Option<Vec<Vec3>> {
    if !a.is_finite() || !b.is_finite() {
        return None;
    }
    let d = b - a;
    let side = Vec3::new(-d.y, d.x, d.z).normalize_or_zero();
    let control = (a + b) * 0.5 + side * d.length() * BOW;

    let points: Vec<Vec3> = (0..CURVE_SAMPLES)
        .map(|i| {
            let t = i as f32 / (CURVE_SAMPLES - 1) as f32;
            let u = 1.0 - t;
            a * (u * u) + control * (2.0 * u * t) + b * (t * t)
        })
        .collect();
    if points.iter().all(|p| p.is_finite()) {
        Some(points)
    } else {
        tracing::warn!(?a, ?b, "edge curve is not finite, skipping");
        None
    }
}

/// Splits a polyline into dash pieces; the pattern runs continuously along
/// the whole curve. Dash `k` covers arc length `[k*period, k*period + dash]`,
/// so the piece count is bounded by the dash count plus the sample count.
pub fn dash_segments(points: &[Vec3], pattern: Dash) -> Vec<(Vec3, Vec3)> {
    let mut out = Vec::new();
    if !pattern.dash.is_finite() || pattern.dash <= 0.0 || points.len() < 2 {
        return out;
    }
    let period = pattern.dash + pattern.gap.max(0.0);

    // Arc length at each sample.
    let mut arc = Vec::with_capacity(points.len());
    let mut total = 0.0_f32;
    arc.push(0.0);
    for w in points.windows(2) {
        total += w[0].distance(w[1]);
        arc.push(total);
    }
    if !total.is_finite() || total <= 0.0 {
        return out;
    }

    let at = |i: usize, d: f32| -> Vec3 {
        let len = arc[i + 1] - arc[i];
        if len <= 0.0 {
            points[i]
        } else {
            points[i].lerp(points[i + 1], ((d - arc[i]) / len).clamp(0.0, 1.0))
        }
    };

    let last_seg = points.len() - 2;
    let dashes = (total / period).ceil() as usize;
    let mut seg = 0;
    for k in 0..dashes {
        let from = k as f32 * period;
        let to = (from + pattern.dash).min(total);
        if from >= to {
            continue;
        }
        while seg < last_seg && arc[seg + 1] <= from {
            seg += 1;
        }
        let mut i = seg;
        let mut piece_from = from;
        loop {
            let piece_to = to.min(arc[i + 1]);
            if piece_to > piece_from {
                out.push((at(i, piece_from), at(i, piece_to)));
            }
            if to <= arc[i + 1] || i == last_seg {
                break;
            }
            piece_from = arc[i + 1];
            i += 1;
        }
        seg = i;
    }
    out
}

/// Position and heading of each travelling marker at time `t`.
pub fn marker_poses(points: &[Vec3], t: f32) -> SmallVec<[(Vec3, Vec3); MARKERS_PER_EDGE]> {
    let mut poses = SmallVec::new();
    let Some(last) = points.len().checked_sub(1) else {
        return poses;
    };
    for i in 0..MARKERS_PER_EDGE {
        let offset = (t * MARKER_SPEED + i as f32 * MARKER_STAGGER).rem_euclid(1.0);
        let f = offset * last as f32;
        let idx = (f.floor() as usize).min(last);
        let next = (idx + 1).min(last);
        let pos = points[idx].lerp(points[next], f.fract());
        let dir = (points[next] - points[idx]).normalize_or_zero();
        poses.push((pos, dir));
    }
    poses
}

pub struct EdgeCurve {
    pub style: EdgeStyle,
    pub points: Vec<Vec3>,
    pub directed: bool,
}

/// Curves for the current edge set, rebuilt when the graph changes.
#[derive(Resource, Default)]
pub struct EdgeCurves {
    revision: Option<u64>,
    pub curves: Vec<EdgeCurve>,
}

#[derive(Component)]
pub struct EdgeMarker {
    pub curve: usize,
    pub index: usize,
}

pub fn rebuild_edges(
    mut commands: Commands,
    st: Res<GalaxyState>,
    mut cache: ResMut<EdgeCurves>,
    mut meshes: ResMut<Assets<Mesh>>,
    mut mats: ResMut<Assets<StandardMaterial>>,
    markers: Query<Entity, With<EdgeMarker>>,
) {
    let revision = st.model.revision();
    if cache.revision == Some(revision) {
        return;
    }
    for e in markers.iter() {
        commands.entity(e).despawn_recursive();
    }

    cache.curves = st
        .model
        .renderable_edges()
        .filter_map(|(edge, a, b)| {
            Some(EdgeCurve {
                style: edge_style(edge.kind),
                points: curve_points(a, b)?,
                directed: edge.kind.is_some_and(|k| k.is_directed()),
            })
        })
        .collect();

    let cone = meshes.add(Cone {
        radius: 0.2,
        height: 0.4,
    });
    for (ci, curve) in cache.curves.iter().enumerate().filter(|(_, c)| c.directed) {
        let material = mats.add(StandardMaterial {
            base_color: curve.style.color.with_alpha(0.8),
            unlit: true,
            alpha_mode: AlphaMode::Blend,
            ..default()
        });
        for index in 0..MARKERS_PER_EDGE {
            commands.spawn((
                PbrBundle {
                    mesh: cone.clone(),
                    material: material.clone(),
                    transform: Transform::from_translation(curve.points[0]),
                    ..default()
                },
                EdgeMarker { curve: ci, index },
            ));
        }
    }
    tracing::debug!(
        edges = st.model.edges().len(),
        drawn = cache.curves.len(),
        revision,
        "edge curves rebuilt"
    );
    cache.revision = Some(revision);
}

fn stroke<T: GizmoConfigGroup>(gizmos: &mut Gizmos<T>, curve: &EdgeCurve, color: Color) {
    match curve.style.dash {
        Some(pattern) => {
            for (a, b) in dash_segments(&curve.points, pattern) {
                gizmos.line(a, b, color);
            }
        }
        None => gizmos.linestrip(curve.points.iter().copied(), color),
    }
}

pub fn draw_edges(
    st: Res<GalaxyState>,
    cache: Res<EdgeCurves>,
    mut thin: Gizmos<ThinLines>,
    mut medium: Gizmos<MediumLines>,
    mut thick: Gizmos<ThickLines>,
) {
    let opacity = st.ui.edge_opacity.clamp(0.0, 1.0);
    for curve in &cache.curves {
        let color = curve.style.color.with_alpha(opacity);
        match curve.style.width {
            LineWidth::Thin => stroke(&mut thin, curve, color),
            LineWidth::Medium => stroke(&mut medium, curve, color),
            LineWidth::Thick => stroke(&mut thick, curve, color),
        }
    }
}

pub fn animate_markers(
    time: Res<Time>,
    cache: Res<EdgeCurves>,
    mut markers: Query<(&EdgeMarker, &mut Transform)>,
) {
    let t = time.elapsed_seconds();
    for (marker, mut tf) in markers.iter_mut() {
        let Some(curve) = cache.curves.get(marker.curve) else {
            continue;
        };
        let Some(&(pos, dir)) = marker_poses(&curve.points, t).get(marker.index) else {
            continue;
        };
        tf.translation = pos;
        if dir != Vec3::ZERO {
            tf.rotation = Quat::from_rotation_arc(Vec3::Y, dir);
        }
    }
}

/// Dashed white curve from the edge source to the live pointer endpoint.
pub fn draw_edge_preview(st: Res<GalaxyState>, mut gizmos: Gizmos<ThinLines>) {
    let Some(session) = st.interaction.edge_session() else {
        return;
    };
    let Some(start) = st.model.strict_position(session.source) else {
        return;
    };
    let Some(points) = curve_points(start, session.end) else {
        return;
    };
    let color = Color::WHITE.with_alpha(0.8);
    for (a, b) in dash_segments(&points, PREVIEW_DASH) {
        gizmos.line(a, b, color);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn curve_has_twenty_points_and_hits_endpoints() {
        let a = Vec3::new(0.0, 0.0, 0.0);
        let b = Vec3::new(5.0, 1.0, 3.0);
        let pts = curve_points(a, b).expect("finite curve");
        assert_eq!(pts.len(), CURVE_SAMPLES);
        assert_eq!(pts[0], a);
        assert!((pts[CURVE_SAMPLES - 1] - b).length() < 1e-5);
    }

    #[test]
    fn curve_bows_off_the_straight_line() {
        let a = Vec3::ZERO;
        let b = Vec3::new(10.0, 0.0, 0.0);
        let pts = curve_points(a, b).expect("finite curve");
        // Control point sits 2 units off the midpoint; the curve peaks at half that.
        let peak = pts.iter().map(|p| p.y).fold(f32::MIN, f32::max);
        assert!(peak > 0.9 && peak <= 1.0 + 1e-4);
    }

    #[test]
    fn non_finite_endpoints_are_rejected() {
        assert!(curve_points(Vec3::new(f32::NAN, 0.0, 0.0), Vec3::ONE).is_none());
        assert!(curve_points(Vec3::ZERO, Vec3::new(0.0, f32::INFINITY, 0.0)).is_none());
    }

    #[test]
    fn style_table_lookups() {
        assert_eq!(edge_style(Some(RelationKind::Is)).width, LineWidth::Thick);
        assert_eq!(edge_style(Some(RelationKind::ConflictsWith)).width, LineWidth::Medium);
        assert_eq!(
            edge_style(Some(RelationKind::Seeks)).dash,
            Some(Dash { dash: 0.5, gap: 0.2 })
        );
        let unknown = edge_style(None);
        assert_eq!(unknown.color, Color::srgb_u8(0xa0, 0xa0, 0xa0));
        assert_eq!(unknown.width, LineWidth::Thin);
        assert_eq!(unknown.dash, None);
    }

    #[test]
    fn dashes_follow_pattern() {
        let line = [Vec3::ZERO, Vec3::new(1.0, 0.0, 0.0)];
        let segs = dash_segments(&line, Dash { dash: 0.25, gap: 0.25 });
        assert_eq!(
            segs,
            vec![
                (Vec3::ZERO, Vec3::new(0.25, 0.0, 0.0)),
                (Vec3::new(0.5, 0.0, 0.0), Vec3::new(0.75, 0.0, 0.0)),
            ]
        );
    }

    #[test]
    fn dash_pattern_continues_across_samples() {
        let line = [Vec3::ZERO, Vec3::new(0.125, 0.0, 0.0), Vec3::new(1.0, 0.0, 0.0)];
        let segs = dash_segments(&line, Dash { dash: 0.25, gap: 0.25 });
        let covered: f32 = segs.iter().map(|(a, b)| a.distance(*b)).sum();
        assert!((covered - 0.5).abs() < 1e-5);
    }

    #[test]
    fn long_off_axis_curves_dash_in_bounded_pieces() {
        let cases = [
            (Vec3::new(5.0, 1.0, 3.0), Vec3::new(-30.0, -10.0, -50.0)),
            (Vec3::new(-4.0, -1.0, 2.0), Vec3::new(12.0, 0.0, -6.0)),
            (Vec3::new(0.3, 250.0, -7.0), Vec3::new(-480.0, 3.0, -50.0)),
        ];
        let patterns = [
            PREVIEW_DASH,
            edge_style(Some(RelationKind::Has)).dash.expect("HAS is dashed"),
            edge_style(Some(RelationKind::Seeks)).dash.expect("SEEKS is dashed"),
        ];
        for (a, b) in cases {
            let pts = curve_points(a, b).expect("finite curve");
            let total: f32 = pts.windows(2).map(|w| w[0].distance(w[1])).sum();
            for pattern in patterns {
                let period = pattern.dash + pattern.gap;
                let segs = dash_segments(&pts, pattern);
                let bound = (total / period).ceil() as usize + CURVE_SAMPLES;
                assert!(!segs.is_empty());
                assert!(segs.len() <= bound, "{} pieces for {a:?}->{b:?} {pattern:?}", segs.len());

                let covered: f32 = segs.iter().map(|(p, q)| p.distance(*q)).sum();
                let slack = total * 1e-3;
                assert!(covered <= total + slack);
                assert!(covered >= total * pattern.dash / period - pattern.dash - slack);
                for (p, q) in &segs {
                    assert!(p.distance(*q) <= pattern.dash + 1e-3);
                }
            }
        }
    }

    #[test]
    fn degenerate_polylines_have_no_dashes() {
        let pattern = Dash { dash: 0.3, gap: 0.1 };
        assert!(dash_segments(&[], pattern).is_empty());
        assert!(dash_segments(&[Vec3::ONE], pattern).is_empty());
        assert!(dash_segments(&[Vec3::ONE, Vec3::ONE], pattern).is_empty());
        assert!(dash_segments(&[Vec3::ZERO, Vec3::X], Dash { dash: 0.0, gap: 0.1 }).is_empty());
    }

    #[test]
    fn markers_loop_and_face_along_path() {
        let pts: Vec<Vec3> = (0..CURVE_SAMPLES)
            .map(|i| Vec3::new(i as f32, 0.0, 0.0))
            .collect();
        let at_zero = marker_poses(&pts, 0.0);
        assert_eq!(at_zero.len(), 3);
        assert_eq!(at_zero[0].0, Vec3::ZERO);
        assert!((at_zero[1].0.x - 0.2 * 19.0).abs() < 1e-4);
        for (_, dir) in &at_zero {
            assert_eq!(*dir, Vec3::X);
        }

        // Two seconds at half speed is one full lap.
        let lapped = marker_poses(&pts, 2.0);
        assert!((lapped[0].0 - at_zero[0].0).length() < 1e-4);
    }

    #[test]
    fn markers_on_empty_path() {
        assert!(marker_poses(&[], 1.0).is_empty());
    }
}
