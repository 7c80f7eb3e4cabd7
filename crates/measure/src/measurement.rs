use foundation::math::{Vec3, ecef_to_geodetic};
use scene::AnnotationKind;
use serde::{Deserialize, Serialize};

use crate::annotation::Annotation;
use crate::config::{MeasureConfig, UnitSystem};
use crate::engine::GlobeEngine;
use crate::format::{format_area, format_distance, format_lat_lon};
use crate::geometry;

/// Derived value of one annotation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Measurement {
    Point {
        lat_deg: f64,
        lon_deg: f64,
        height_m: f64,
    },
    Distance {
        distance_m: f64,
        horizontal_m: f64,
        vertical_m: f64,
    },
    Curve {
        length_m: f64,
        chord_m: f64,
    },
    Height {
        height_m: f64,
    },
    Chain {
        segments_m: Vec<f64>,
        total_m: f64,
        clamped: bool,
    },
    Polygon {
        area_m2: f64,
        perimeter_m: f64,
    },
    Profile {
        surface_distance_m: f64,
        ground_distance_m: f64,
        min_height_m: f64,
        max_height_m: f64,
    },
}

impl Measurement {
    pub fn summary(&self, units: UnitSystem, decimals: usize) -> String {
        let d = |m: f64| format_distance(m, units, decimals);
        match self {
            Measurement::Point {
                lat_deg,
                lon_deg,
                height_m,
            } => {
                let geo = foundation::math::Geodetic::from_degrees(*lat_deg, *lon_deg, *height_m);
                format!("{} / {}", format_lat_lon(geo), d(*height_m))
            }
            Measurement::Distance {
                distance_m,
                horizontal_m,
                vertical_m,
            } => format!(
                "{} (horizontal {}, vertical {})",
                d(*distance_m),
                d(*horizontal_m),
                d(*vertical_m)
            ),
            Measurement::Curve { length_m, chord_m } => {
                format!("{} (chord {})", d(*length_m), d(*chord_m))
            }
            Measurement::Height { height_m } => d(*height_m),
            Measurement::Chain {
                segments_m,
                total_m,
                ..
            } => {
                let parts: Vec<String> = segments_m.iter().map(|m| d(*m)).collect();
                format!("{} [{}]", d(*total_m), parts.join(", "))
            }
            Measurement::Polygon {
                area_m2,
                perimeter_m,
            } => format!(
                "{} (perimeter {})",
                format_area(*area_m2, units, decimals),
                d(*perimeter_m)
            ),
            Measurement::Profile {
                surface_distance_m,
                ground_distance_m,
                min_height_m,
                max_height_m,
            } => format!(
                "{} (ground {}, height {} .. {})",
                d(*surface_distance_m),
                d(*ground_distance_m),
                d(*min_height_m),
                d(*max_height_m)
            ),
        }
    }

    /// The headline value shown in the summary label.
    pub fn headline(&self, units: UnitSystem, decimals: usize) -> String {
        let d = |m: f64| format_distance(m, units, decimals);
        match self {
            Measurement::Point { height_m, .. } => d(*height_m),
            Measurement::Distance { distance_m, .. } => d(*distance_m),
            Measurement::Curve { length_m, .. } => d(*length_m),
            Measurement::Height { height_m } => d(*height_m),
            Measurement::Chain { total_m, .. } => format!("Total: {}", d(*total_m)),
            Measurement::Polygon {
                area_m2,
                perimeter_m,
            } => format!(
                "{}\n{}",
                format_area(*area_m2, units, decimals),
                d(*perimeter_m)
            ),
            Measurement::Profile {
                surface_distance_m, ..
            } => d(*surface_distance_m),
        }
    }
}

/// Polyline for the segment `a -> b`: the chord, or a terrain-draped path
/// for clamped kinds.
pub fn segment_path(
    engine: &dyn GlobeEngine,
    config: &MeasureConfig,
    kind: AnnotationKind,
    a: Vec3,
    b: Vec3,
) -> Vec<Vec3> {
    if kind.is_clamped() {
        geometry::ground_path(engine, a, b, config.clamped_samples_per_segment)
    } else {
        vec![a, b]
    }
}

/// Measures `coordinates` as an annotation of `kind`. `None` until enough
/// vertices exist.
pub fn measure_coordinates(
    kind: AnnotationKind,
    coordinates: &[Vec3],
    engine: &dyn GlobeEngine,
    config: &MeasureConfig,
) -> Option<Measurement> {
    match kind {
        AnnotationKind::Point => {
            let geo = ecef_to_geodetic(*coordinates.first()?);
            Some(Measurement::Point {
                lat_deg: geo.lat_deg(),
                lon_deg: geo.lon_deg(),
                height_m: geo.alt_m,
            })
        }
        AnnotationKind::Height => {
            let span = geometry::height_above_ground(engine, *coordinates.first()?);
            Some(Measurement::Height {
                height_m: span.height_m,
            })
        }
        AnnotationKind::Distance => {
            let (a, b) = first_two(coordinates)?;
            let (horizontal_m, vertical_m) = geometry::split_components(a, b);
            Some(Measurement::Distance {
                distance_m: geometry::chord_distance(a, b),
                horizontal_m,
                vertical_m,
            })
        }
        AnnotationKind::Curve => {
            let (a, b) = first_two(coordinates)?;
            let arc =
                geometry::arc_points(a, b, config.curve_lift_ratio, config.curve_samples_per_span);
            Some(Measurement::Curve {
                length_m: geometry::path_length(&arc),
                chord_m: geometry::chord_distance(a, b),
            })
        }
        AnnotationKind::Profile => {
            let (a, b) = first_two(coordinates)?;
            let profile = geometry::sample_profile(engine, &[a, b], config.profile_samples);
            Some(Measurement::Profile {
                surface_distance_m: profile.surface_distance_m,
                ground_distance_m: profile.ground_distance_m,
                min_height_m: profile.min_height_m,
                max_height_m: profile.max_height_m,
            })
        }
        AnnotationKind::MultiDistance
        | AnnotationKind::MultiDistanceClamped
        | AnnotationKind::ProfileDistances => {
            if coordinates.len() < 2 {
                return None;
            }
            let segments_m: Vec<f64> = coordinates
                .windows(2)
                .map(|w| geometry::path_length(&segment_path(engine, config, kind, w[0], w[1])))
                .collect();
            Some(Measurement::Chain {
                total_m: segments_m.iter().sum(),
                segments_m,
                clamped: kind.is_clamped(),
            })
        }
        AnnotationKind::Polygon => {
            if coordinates.len() < 3 {
                return None;
            }
            Some(Measurement::Polygon {
                area_m2: geometry::polygon_area(coordinates),
                perimeter_m: geometry::perimeter(coordinates),
            })
        }
    }
}

pub fn measure(
    annotation: &Annotation,
    engine: &dyn GlobeEngine,
    config: &MeasureConfig,
) -> Option<Measurement> {
    measure_coordinates(annotation.kind, &annotation.coordinates, engine, config)
}

fn first_two(coordinates: &[Vec3]) -> Option<(Vec3, Vec3)> {
    match coordinates {
        [a, b, ..] => Some((*a, *b)),
        _ => None,
    }
}
