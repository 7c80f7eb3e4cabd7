use foundation::math::precision::stable_total_cmp_f64;
use foundation::math::{Vec2, Vec3};

use crate::World;
use crate::entity::EntityId;
use crate::primitives::{Primitive, PrimitiveKind};

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct PickHit {
    pub entity: EntityId,
    pub kind: PrimitiveKind,
    /// Screen distance from the cursor to the primitive (pixels).
    pub distance_px: f64,
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct PickOptions {
    pub tolerance_px: f64,
}

impl Default for PickOptions {
    fn default() -> Self {
        Self { tolerance_px: 8.0 }
    }
}

/// Deterministic screen-space picking over the world's visible primitives.
///
/// `project` maps a world position to screen pixels; positions it rejects
/// (behind the globe, off screen) are skipped.
///
/// Ordering contract:
/// - Only hits within `tolerance_px` count.
/// - Kinds drawn on top win first: point, then label, then line, then polygon.
/// - Within a kind, the smaller screen distance wins.
/// - Remaining ties go to the lower `EntityId::index()`.
pub fn pick_screen<F>(world: &World, screen: Vec2, opts: PickOptions, project: F) -> Option<PickHit>
where
    F: FnMut(Vec3) -> Option<Vec2>,
{
    drill_pick_screen(world, screen, opts, project).into_iter().next()
}

/// Every hit under the cursor, best first (same ordering as [`pick_screen`]).
pub fn drill_pick_screen<F>(
    world: &World,
    screen: Vec2,
    opts: PickOptions,
    mut project: F,
) -> Vec<PickHit>
where
    F: FnMut(Vec3) -> Option<Vec2>,
{
    if !screen.is_finite() {
        return Vec::new();
    }

    let mut hits: Vec<PickHit> = world
        .visible_primitives()
        .filter_map(|(entity, primitive)| {
            let distance_px = screen_distance(primitive, screen, &mut project)?;
            (distance_px <= opts.tolerance_px).then_some(PickHit {
                entity,
                kind: primitive.kind(),
                distance_px,
            })
        })
        .collect();
    hits.sort_by(|a, b| {
        a.kind
            .pick_rank()
            .cmp(&b.kind.pick_rank())
            .then_with(|| stable_total_cmp_f64(a.distance_px, b.distance_px))
            .then_with(|| a.entity.index().cmp(&b.entity.index()))
    });
    hits
}

fn screen_distance<F>(primitive: &Primitive, screen: Vec2, project: &mut F) -> Option<f64>
where
    F: FnMut(Vec3) -> Option<Vec2>,
{
    match primitive {
        Primitive::Point(p) => {
            let s = project(p.position)?;
            // The rendered disc counts as a direct hit.
            let radius = f64::from(p.pixel_size) * 0.5;
            Some((s.distance(screen) - radius).max(0.0))
        }
        Primitive::Label(l) => {
            let anchor = project(l.position)?;
            let [w, h] = l.estimate_size_px();
            let center = Vec2::new(
                anchor.x + f64::from(l.style.pixel_offset[0]),
                anchor.y + f64::from(l.style.pixel_offset[1]),
            );
            let dx = ((screen.x - center.x).abs() - f64::from(w) * 0.5).max(0.0);
            let dy = ((screen.y - center.y).abs() - f64::from(h) * 0.5).max(0.0);
            Some((dx * dx + dy * dy).sqrt())
        }
        Primitive::Line(l) => {
            // Segments with a hidden endpoint are not drawn, so they never hit.
            let projected: Vec<Option<Vec2>> = l.positions.iter().map(|p| project(*p)).collect();
            if let [only] = projected.as_slice() {
                return only.map(|s| s.distance(screen));
            }
            projected
                .windows(2)
                .filter_map(|w| match (w[0], w[1]) {
                    (Some(a), Some(b)) => Some(point_segment_distance(screen, a, b)),
                    _ => None,
                })
                .min_by(|a, b| stable_total_cmp_f64(*a, *b))
        }
        Primitive::Polygon(p) => {
            let ring: Vec<Vec2> = p.positions.iter().filter_map(|v| project(*v)).collect();
            if ring.len() < 3 {
                return None;
            }
            point_in_polygon(screen, &ring).then_some(0.0)
        }
    }
}

fn point_segment_distance(p: Vec2, a: Vec2, b: Vec2) -> f64 {
    let ab = b - a;
    let len2 = ab.dot(ab);
    if len2 <= 0.0 {
        return p.distance(a);
    }
    let t = ((p - a).dot(ab) / len2).clamp(0.0, 1.0);
    p.distance(a + ab.scale(t))
}

/// Even-odd rule.
fn point_in_polygon(p: Vec2, ring: &[Vec2]) -> bool {
    let mut inside = false;
    let mut j = ring.len() - 1;
    for i in 0..ring.len() {
        let (a, b) = (ring[i], ring[j]);
        if (a.y > p.y) != (b.y > p.y) && p.x < (b.x - a.x) * (p.y - a.y) / (b.y - a.y) + a.x {
            inside = !inside;
        }
        j = i;
    }
    inside
}
