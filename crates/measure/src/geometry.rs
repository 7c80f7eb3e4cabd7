//! Elementary measurement geometry on the WGS84 ellipsoid.
//!
//! Coordinates are ECEF meters. Terrain heights come from the engine; when a
//! sample is missing the ellipsoid surface (0 m) is used.

use earcutr::earcut;
use foundation::math::{
    Geodetic, TangentFrame, Vec3, ecef_to_enu, ecef_to_geodetic, geodesic_distance,
    geodetic_to_ecef,
};
use foundation::math::precision::stable_total_cmp_f64;
use serde::{Deserialize, Serialize};

use crate::engine::GlobeEngine;

pub fn chord_distance(a: Vec3, b: Vec3) -> f64 {
    a.distance(b)
}

/// Distance along the ellipsoid surface, ignoring height.
pub fn surface_distance(a: Vec3, b: Vec3) -> f64 {
    geodesic_distance(ecef_to_geodetic(a), ecef_to_geodetic(b))
}

pub fn path_length(points: &[Vec3]) -> f64 {
    points.windows(2).map(|w| w[0].distance(w[1])).sum()
}

/// Horizontal and vertical components of `a -> b` in the local frame at `a`.
pub fn split_components(a: Vec3, b: Vec3) -> (f64, f64) {
    let geo_a = ecef_to_geodetic(a);
    let geo_b = ecef_to_geodetic(b);
    let enu = ecef_to_enu(b, geo_a);
    (enu.horizontal(), geo_b.alt_m - geo_a.alt_m)
}

/// Re-seat `position` on the terrain at its latitude/longitude.
pub fn clamp_to_ground(engine: &dyn GlobeEngine, position: Vec3) -> Vec3 {
    crate::engine::ground_below(engine, position)
}

/// Ground-following polyline from `a` to `b` with `segments` intervals.
///
/// Interior samples are interpolated along the chord, then re-seated on the
/// terrain. The endpoints are kept as given.
pub fn ground_path(engine: &dyn GlobeEngine, a: Vec3, b: Vec3, segments: usize) -> Vec<Vec3> {
    let segments = segments.max(1);
    let mut out = Vec::with_capacity(segments + 1);
    out.push(a);
    for i in 1..segments {
        let t = i as f64 / segments as f64;
        out.push(clamp_to_ground(engine, a.lerp(b, t)));
    }
    out.push(b);
    out
}

/// Uniform Catmull-Rom spline through `points`; ends are clamped by
/// repeating the first/last control point.
pub fn catmull_rom(points: &[Vec3], samples_per_span: usize) -> Vec<Vec3> {
    if points.len() < 2 {
        return points.to_vec();
    }
    let samples_per_span = samples_per_span.max(1);
    let n = points.len();
    let mut out = Vec::with_capacity((n - 1) * samples_per_span + 1);
    for i in 0..n - 1 {
        let p0 = points[i.saturating_sub(1)];
        let p1 = points[i];
        let p2 = points[i + 1];
        let p3 = points[(i + 2).min(n - 1)];
        for s in 0..samples_per_span {
            let t = s as f64 / samples_per_span as f64;
            out.push(catmull_rom_point(p0, p1, p2, p3, t));
        }
    }
    out.push(points[n - 1]);
    out
}

fn catmull_rom_point(p0: Vec3, p1: Vec3, p2: Vec3, p3: Vec3, t: f64) -> Vec3 {
    let t2 = t * t;
    let t3 = t2 * t;
    let term0 = p1.scale(2.0);
    let term1 = (p2 - p0).scale(t);
    let term2 = (p0.scale(2.0) - p1.scale(5.0) + p2.scale(4.0) - p3).scale(t2);
    let term3 = (p1.scale(3.0) - p0 - p2.scale(3.0) + p3).scale(t3);
    (term0 + term1 + term2 + term3).scale(0.5)
}

/// Control points of an arc from `a` to `b`: the chord midpoint raised by
/// `lift_ratio * chord` above the mean endpoint height.
pub fn arc_control_points(a: Vec3, b: Vec3, lift_ratio: f64) -> [Vec3; 3] {
    let geo_a = ecef_to_geodetic(a);
    let geo_b = ecef_to_geodetic(b);
    let mid = ecef_to_geodetic(a.midpoint(b));
    let apex_alt = (geo_a.alt_m + geo_b.alt_m) * 0.5 + lift_ratio * a.distance(b);
    [a, geodetic_to_ecef(mid.with_alt(apex_alt)), b]
}

pub fn arc_points(a: Vec3, b: Vec3, lift_ratio: f64, samples_per_span: usize) -> Vec<Vec3> {
    catmull_rom(&arc_control_points(a, b, lift_ratio), samples_per_span)
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct HeightSpan {
    pub top: Vec3,
    pub ground: Vec3,
    pub height_m: f64,
}

/// Vertical span from `top` down to the terrain at the same lat/lon.
pub fn height_above_ground(engine: &dyn GlobeEngine, top: Vec3) -> HeightSpan {
    let geo = ecef_to_geodetic(top);
    let ground_h = engine.sample_height(geo).unwrap_or(0.0);
    HeightSpan {
        top,
        ground: geodetic_to_ecef(geo.with_alt(ground_h)),
        height_m: geo.alt_m - ground_h,
    }
}

pub fn centroid(points: &[Vec3]) -> Option<Vec3> {
    if points.is_empty() {
        return None;
    }
    let sum = points.iter().fold(Vec3::ZERO, |acc, p| acc + *p);
    Some(sum.scale(1.0 / points.len() as f64))
}

/// Point halfway along the polyline by length.
pub fn path_midpoint(points: &[Vec3]) -> Option<Vec3> {
    if points.len() < 2 {
        return points.first().copied();
    }
    let total = path_length(points);
    if total <= 0.0 || !total.is_finite() {
        return points.first().copied();
    }
    let target = total * 0.5;
    let mut acc = 0.0;
    for w in points.windows(2) {
        let len = w[0].distance(w[1]);
        if len > 0.0 && acc + len >= target {
            return Some(w[0].lerp(w[1], (target - acc) / len));
        }
        acc += len;
    }
    points.last().copied()
}

/// Closed-ring perimeter.
pub fn perimeter(ring: &[Vec3]) -> f64 {
    if ring.len() < 2 {
        return 0.0;
    }
    let closing = if ring.len() > 2 {
        ring[ring.len() - 1].distance(ring[0])
    } else {
        0.0
    };
    path_length(ring) + closing
}

/// Triangulates an open ring in the tangent plane at its centroid.
///
/// Returns a flat triangle list of the original 3D vertices.
pub fn triangulate(ring: &[Vec3]) -> Vec<[Vec3; 3]> {
    let mut pts = ring.to_vec();
    drop_closing_duplicate(&mut pts);
    if pts.len() < 3 {
        return Vec::new();
    }
    let Some(origin) = centroid(&pts) else {
        return Vec::new();
    };
    let frame = TangentFrame::at(ecef_to_geodetic(origin));

    let mut coords_2d: Vec<f64> = Vec::with_capacity(pts.len() * 2);
    for p in &pts {
        let v = *p - origin;
        coords_2d.push(v.dot(frame.east));
        coords_2d.push(v.dot(frame.north));
    }

    let indices = match earcut(&coords_2d, &[], 2) {
        Ok(ix) => ix,
        Err(_) => return Vec::new(),
    };
    indices
        .chunks_exact(3)
        .filter_map(|tri| Some([*pts.get(tri[0])?, *pts.get(tri[1])?, *pts.get(tri[2])?]))
        .collect()
}

/// Area of the polygon's triangulated surface (square meters).
pub fn polygon_area(ring: &[Vec3]) -> f64 {
    triangulate(ring)
        .iter()
        .map(|[a, b, c]| (*b - *a).cross(*c - *a).length() * 0.5)
        .sum()
}

fn drop_closing_duplicate(points: &mut Vec<Vec3>) {
    if points.len() >= 2 && points[0].distance(points[points.len() - 1]) < 1e-9 {
        points.pop();
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProfileSample {
    /// Surface distance from the first vertex (meters).
    pub distance_m: f64,
    pub height_m: f64,
    pub lat_deg: f64,
    pub lon_deg: f64,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct TerrainProfile {
    pub samples: Vec<ProfileSample>,
    pub surface_distance_m: f64,
    /// Length of the terrain-following path, relief included.
    pub ground_distance_m: f64,
    pub min_height_m: f64,
    pub max_height_m: f64,
    pub elevation_gain_m: f64,
    pub elevation_loss_m: f64,
}

impl TerrainProfile {
    /// Index of the sample closest to `distance_m` along the profile.
    pub fn nearest_sample(&self, distance_m: f64) -> Option<usize> {
        self.samples
            .iter()
            .enumerate()
            .min_by(|(_, a), (_, b)| {
                stable_total_cmp_f64(
                    (a.distance_m - distance_m).abs(),
                    (b.distance_m - distance_m).abs(),
                )
            })
            .map(|(i, _)| i)
    }

    /// Index of the sample whose ground position is closest to `position`.
    pub fn nearest_to(&self, position: Vec3) -> Option<usize> {
        let distance = |s: &ProfileSample| {
            geodetic_to_ecef(Geodetic::from_degrees(s.lat_deg, s.lon_deg, s.height_m))
                .distance(position)
        };
        self.samples
            .iter()
            .enumerate()
            .min_by(|(_, a), (_, b)| stable_total_cmp_f64(distance(a), distance(b)))
            .map(|(i, _)| i)
    }
}

/// Samples terrain heights along the polyline `vertices`.
///
/// `samples` points (at least 2) are spread evenly by surface distance over
/// the whole path, so longer segments receive proportionally more samples.
pub fn sample_profile(
    engine: &dyn GlobeEngine,
    vertices: &[Vec3],
    samples: usize,
) -> TerrainProfile {
    if vertices.is_empty() {
        return TerrainProfile::default();
    }
    let samples = samples.max(2);

    let mut cumulative = Vec::with_capacity(vertices.len());
    cumulative.push(0.0);
    for w in vertices.windows(2) {
        let last = cumulative[cumulative.len() - 1];
        cumulative.push(last + surface_distance(w[0], w[1]));
    }
    let total = cumulative[cumulative.len() - 1];

    let mut out = Vec::with_capacity(samples);
    let mut positions = Vec::with_capacity(samples);
    let mut seg = 0;
    for i in 0..samples {
        let d = total * i as f64 / (samples - 1) as f64;
        while seg + 2 < vertices.len() && cumulative[seg + 1] < d {
            seg += 1;
        }
        let chord_point = if vertices.len() == 1 {
            vertices[0]
        } else {
            let span = cumulative[seg + 1] - cumulative[seg];
            let t = if span > 0.0 {
                ((d - cumulative[seg]) / span).clamp(0.0, 1.0)
            } else {
                0.0
            };
            vertices[seg].lerp(vertices[seg + 1], t)
        };
        let geo = ecef_to_geodetic(chord_point);
        let height = engine.sample_height(geo).unwrap_or(0.0);
        positions.push(geodetic_to_ecef(geo.with_alt(height)));
        out.push(ProfileSample {
            distance_m: d,
            height_m: height,
            lat_deg: geo.lat_deg(),
            lon_deg: geo.lon_deg(),
        });
    }

    let (mut min_h, mut max_h) = (f64::INFINITY, f64::NEG_INFINITY);
    let (mut gain, mut loss) = (0.0, 0.0);
    for (i, s) in out.iter().enumerate() {
        min_h = min_h.min(s.height_m);
        max_h = max_h.max(s.height_m);
        if i > 0 {
            let dh = s.height_m - out[i - 1].height_m;
            if dh > 0.0 {
                gain += dh;
            } else {
                loss -= dh;
            }
        }
    }

    TerrainProfile {
        samples: out,
        surface_distance_m: total,
        ground_distance_m: path_length(&positions),
        min_height_m: min_h,
        max_height_m: max_h,
        elevation_gain_m: gain,
        elevation_loss_m: loss,
    }
}

/// Geodetic position of `p`, for labels and log records.
pub fn geodetic(p: Vec3) -> Geodetic {
    ecef_to_geodetic(p)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::{EllipsoidEngine, FlatTerrain};
    use foundation::math::{Enu, enu_to_ecef};

    fn assert_close(a: f64, b: f64, eps: f64) {
        let diff = (a - b).abs();
        assert!(diff <= eps, "expected {a} ~= {b} (diff {diff})");
    }

    fn origin() -> Geodetic {
        Geodetic::from_degrees(47.0, 8.0, 0.0)
    }

    fn local(e: f64, n: f64, u: f64) -> Vec3 {
        enu_to_ecef(Enu::new(e, n, u), origin())
    }

    #[test]
    fn chord_and_components() {
        let a = local(0.0, 0.0, 0.0);
        let b = local(30.0, 40.0, 0.0);
        assert_close(chord_distance(a, b), 50.0, 1e-6);

        let (h, v) = split_components(a, local(30.0, 40.0, 12.0));
        assert_close(h, 50.0, 1e-3);
        assert_close(v, 12.0, 1e-3);
    }

    #[test]
    fn square_polygon_area_and_perimeter() {
        let ring = vec![
            local(0.0, 0.0, 0.0),
            local(100.0, 0.0, 0.0),
            local(100.0, 100.0, 0.0),
            local(0.0, 100.0, 0.0),
        ];
        assert_close(polygon_area(&ring), 10_000.0, 1e-3);
        assert_close(perimeter(&ring), 400.0, 1e-6);
        assert_eq!(triangulate(&ring).len(), 2);
    }

    #[test]
    fn concave_polygon_area() {
        // L-shape: 100x100 square minus a 50x50 corner.
        let ring = vec![
            local(0.0, 0.0, 0.0),
            local(100.0, 0.0, 0.0),
            local(100.0, 50.0, 0.0),
            local(50.0, 50.0, 0.0),
            local(50.0, 100.0, 0.0),
            local(0.0, 100.0, 0.0),
        ];
        assert_close(polygon_area(&ring), 7_500.0, 1e-3);
    }

    #[test]
    fn degenerate_polygons_have_no_area() {
        assert_eq!(polygon_area(&[local(0.0, 0.0, 0.0), local(1.0, 0.0, 0.0)]), 0.0);
        assert_eq!(perimeter(&[local(0.0, 0.0, 0.0)]), 0.0);
    }

    #[test]
    fn catmull_rom_interpolates_controls() {
        let controls = [local(0.0, 0.0, 0.0), local(50.0, 0.0, 20.0), local(100.0, 0.0, 0.0)];
        let curve = catmull_rom(&controls, 8);
        assert_eq!(curve.len(), 2 * 8 + 1);
        assert_eq!(curve[0], controls[0]);
        assert_close(curve[8].distance(controls[1]), 0.0, 1e-9);
        assert_eq!(curve[16], controls[2]);
    }

    #[test]
    fn arc_is_longer_than_chord() {
        let a = local(0.0, 0.0, 0.0);
        let b = local(200.0, 0.0, 0.0);
        let arc = arc_points(a, b, 0.25, 16);
        let apex = arc_control_points(a, b, 0.25)[1];
        assert_close(ecef_to_geodetic(apex).alt_m, 50.0, 0.01);
        assert!(path_length(&arc) > chord_distance(a, b));
    }

    #[test]
    fn height_span_uses_terrain() {
        let engine = EllipsoidEngine::default().with_terrain(FlatTerrain(100.0));
        let top = geodetic_to_ecef(Geodetic::from_degrees(47.0, 8.0, 160.0));
        let span = height_above_ground(&engine, top);
        assert_close(span.height_m, 60.0, 1e-6);
        assert_close(ecef_to_geodetic(span.ground).alt_m, 100.0, 1e-6);
    }

    #[test]
    fn ground_path_follows_terrain() {
        let engine = EllipsoidEngine::default().with_terrain(FlatTerrain(250.0));
        let a = geodetic_to_ecef(Geodetic::from_degrees(47.0, 8.0, 250.0));
        let b = geodetic_to_ecef(Geodetic::from_degrees(47.0, 8.2, 250.0));
        let path = ground_path(&engine, a, b, 10);
        assert_eq!(path.len(), 11);
        for p in &path {
            assert_close(ecef_to_geodetic(*p).alt_m, 250.0, 1e-3);
        }
        // The chord sags below the surface, the draped path does not.
        assert!(path_length(&path) > chord_distance(a, b));
    }

    #[test]
    fn profile_over_a_ridge() {
        // Height rises linearly with longitude.
        let engine =
            EllipsoidEngine::default().with_terrain(|_lat: f64, lon: f64| (lon - 8.0) * 10_000.0);
        let a = geodetic_to_ecef(Geodetic::from_degrees(47.0, 8.0, 0.0));
        let b = geodetic_to_ecef(Geodetic::from_degrees(47.0, 8.01, 100.0));
        let profile = sample_profile(&engine, &[a, b], 11);

        assert_eq!(profile.samples.len(), 11);
        assert_close(profile.samples[0].distance_m, 0.0, 1e-9);
        assert_close(profile.samples[10].distance_m, profile.surface_distance_m, 1e-6);
        assert_close(profile.min_height_m, 0.0, 1e-3);
        assert_close(profile.max_height_m, 100.0, 1e-3);
        assert_close(profile.elevation_gain_m, 100.0, 1e-3);
        assert_close(profile.elevation_loss_m, 0.0, 1e-9);
        assert!(profile.ground_distance_m >= profile.surface_distance_m);
        assert_eq!(profile.nearest_sample(profile.surface_distance_m * 0.52), Some(5));

        let s3 = profile.samples[3];
        let near_s3 = geodetic_to_ecef(Geodetic::from_degrees(
            s3.lat_deg,
            s3.lon_deg + 1e-6,
            s3.height_m + 2.0,
        ));
        assert_eq!(profile.nearest_to(near_s3), Some(3));
    }

    #[test]
    fn multi_segment_profile_spans_all_vertices() {
        let engine = EllipsoidEngine::default();
        let pts = [local(0.0, 0.0, 0.0), local(100.0, 0.0, 0.0), local(100.0, 300.0, 0.0)];
        let profile = sample_profile(&engine, &pts, 41);
        assert_close(profile.surface_distance_m, 400.0, 0.5);
        let last = profile.samples.last().expect("samples");
        let end = ecef_to_geodetic(pts[2]);
        assert_close(last.lat_deg, end.lat_deg(), 1e-7);
        assert_close(last.lon_deg, end.lon_deg(), 1e-7);
    }

    #[test]
    fn path_midpoint_by_length() {
        let pts = [local(0.0, 0.0, 0.0), local(10.0, 0.0, 0.0), local(10.0, 30.0, 0.0)];
        let mid = path_midpoint(&pts).expect("mid");
        assert_close(mid.distance(local(10.0, 10.0, 0.0)), 0.0, 1e-6);
    }
}
