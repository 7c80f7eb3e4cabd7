//! Rebuilds the primitives of one annotation from its coordinates.
//!
//! Every mode draws through [`redraw`]; no primitive is edited in place
//! except label text.

use foundation::math::{Vec3, ecef_to_geodetic};
use scene::{
    AnnotationKind, AnnotationTag, Color, EntityId, LabelPrimitive, LinePrimitive, PointPrimitive,
    PolygonPrimitive, Primitive, PrimitiveRole, Visibility, World,
};
use tracing::trace;

use crate::annotation::Annotation;
use crate::config::MeasureConfig;
use crate::engine::GlobeEngine;
use crate::format::{format_distance, format_point};
use crate::geometry;
use crate::measurement::{measure_coordinates, segment_path};

struct Painter<'w> {
    world: &'w mut World,
    annotation: &'w Annotation,
    config: &'w MeasureConfig,
    pending: bool,
    entities: Vec<EntityId>,
}

impl Painter<'_> {
    fn spawn(&mut self, role: PrimitiveRole, index: u32, primitive: impl Into<Primitive>) {
        let tag = AnnotationTag::new(self.annotation.id, self.annotation.kind, role, index)
            .pending(self.pending);
        let entity = self.world.spawn(primitive, Some(tag));
        if self.annotation.hidden {
            self.world.set_visibility(entity, Visibility::hidden());
        }
        self.entities.push(entity);
    }

    fn point_color(&self) -> Color {
        let palette = &self.config.palette;
        if self.annotation.highlighted {
            palette.highlight
        } else if self.pending {
            palette.pending_point
        } else {
            palette.point
        }
    }

    fn line_color(&self) -> Color {
        let palette = &self.config.palette;
        if self.annotation.highlighted {
            palette.highlight
        } else if self.pending {
            palette.pending_line
        } else {
            palette.line
        }
    }

    fn vertex(&mut self, index: usize, position: Vec3) {
        let point = PointPrimitive::new(position, self.config.point_size_px, self.point_color());
        self.spawn(PrimitiveRole::Vertex, index as u32, point);
    }

    fn line(&mut self, role: PrimitiveRole, index: usize, positions: Vec<Vec3>, clamped: bool) {
        if positions.len() < 2 {
            return;
        }
        let line = LinePrimitive::new(positions, self.config.line_width_px, self.line_color())
            .clamped(clamped)
            .dashed(role == PrimitiveRole::Guide);
        self.spawn(role, index as u32, line);
    }

    fn label(&mut self, role: PrimitiveRole, index: usize, position: Vec3, text: String) {
        let text = self
            .annotation
            .label_overrides
            .get(&(role, index as u32))
            .cloned()
            .unwrap_or(text);
        let label = LabelPrimitive::new(position, text, self.config.label.clone());
        self.spawn(role, index as u32, label);
    }

    fn distance(&self, meters: f64) -> String {
        format_distance(meters, self.config.units, self.config.decimals)
    }
}

/// Despawns the annotation's primitives and spawns a fresh set.
///
/// While drawing, the cursor position is appended as a trailing preview
/// coordinate and everything is tagged pending.
pub fn redraw(
    world: &mut World,
    annotation: &mut Annotation,
    engine: &dyn GlobeEngine,
    config: &MeasureConfig,
) {
    for entity in annotation.entities.drain(..) {
        world.despawn(entity);
    }

    let pending = annotation.is_pending();
    let coords = if pending {
        annotation.preview_coordinates()
    } else {
        annotation.coordinates.clone()
    };

    let mut painter = Painter {
        world,
        annotation,
        config,
        pending,
        entities: Vec::new(),
    };

    let source = painter.annotation;
    for (i, p) in source.coordinates.iter().enumerate() {
        painter.vertex(i, *p);
    }

    match source.kind {
        AnnotationKind::Point => draw_point(&mut painter, &coords),
        AnnotationKind::Height => draw_height(&mut painter, engine, &coords),
        AnnotationKind::Distance | AnnotationKind::Curve | AnnotationKind::Profile => {
            draw_two_point(&mut painter, engine, &coords)
        }
        AnnotationKind::MultiDistance
        | AnnotationKind::MultiDistanceClamped
        | AnnotationKind::ProfileDistances => draw_chain(&mut painter, engine, &coords),
        AnnotationKind::Polygon => draw_polygon(&mut painter, &coords),
    }

    let entities = painter.entities;
    trace!(group = %annotation.id, primitives = entities.len(), "redraw");
    annotation.entities = entities;
}

fn draw_point(painter: &mut Painter<'_>, coords: &[Vec3]) {
    let Some(p) = coords.first() else {
        return;
    };
    let text = format_point(
        ecef_to_geodetic(*p),
        painter.config.units,
        painter.config.decimals,
    );
    painter.label(PrimitiveRole::TotalLabel, 0, *p, text);
}

fn draw_height(painter: &mut Painter<'_>, engine: &dyn GlobeEngine, coords: &[Vec3]) {
    let Some(top) = coords.first() else {
        return;
    };
    let span = geometry::height_above_ground(engine, *top);
    painter.line(PrimitiveRole::Segment, 0, vec![span.top, span.ground], false);
    let ground = PointPrimitive::new(
        span.ground,
        painter.config.point_size_px * 0.6,
        painter.config.palette.guide,
    );
    painter.spawn(PrimitiveRole::Guide, 0, ground);
    let text = painter.distance(span.height_m);
    painter.label(PrimitiveRole::TotalLabel, 0, span.top.midpoint(span.ground), text);
}

fn draw_two_point(painter: &mut Painter<'_>, engine: &dyn GlobeEngine, coords: &[Vec3]) {
    let &[a, b, ..] = coords else {
        return;
    };
    let kind = painter.annotation.kind;
    let config = painter.config;
    let path = match kind {
        AnnotationKind::Curve => {
            geometry::arc_points(a, b, config.curve_lift_ratio, config.curve_samples_per_span)
        }
        _ => segment_path(engine, config, kind, a, b),
    };
    let anchor = geometry::path_midpoint(&path).unwrap_or(a);
    painter.line(PrimitiveRole::Segment, 0, path, kind.is_clamped());

    if kind == AnnotationKind::Distance {
        // Right-angle guides for the horizontal and vertical components.
        let geo_a = ecef_to_geodetic(a);
        let geo_b = ecef_to_geodetic(b);
        let corner = foundation::math::geodetic_to_ecef(geo_b.with_alt(geo_a.alt_m));
        if (geo_b.alt_m - geo_a.alt_m).abs() > 1e-3 {
            painter.line(PrimitiveRole::Guide, 0, vec![a, corner, b], false);
        }
    }

    if let Some(m) = measure_coordinates(kind, &[a, b], engine, config) {
        let text = m.headline(config.units, config.decimals);
        painter.label(PrimitiveRole::TotalLabel, 0, anchor, text);
    }
}

fn draw_chain(painter: &mut Painter<'_>, engine: &dyn GlobeEngine, coords: &[Vec3]) {
    let kind = painter.annotation.kind;
    let mut total = 0.0;
    for (i, w) in coords.windows(2).enumerate() {
        let path = segment_path(engine, painter.config, kind, w[0], w[1]);
        let length = geometry::path_length(&path);
        total += length;
        let anchor = geometry::path_midpoint(&path).unwrap_or(w[0]);
        painter.line(PrimitiveRole::Segment, i, path, kind.is_clamped());
        let text = painter.distance(length);
        painter.label(PrimitiveRole::SegmentLabel, i, anchor, text);
    }
    if coords.len() < 2 {
        return;
    }
    if let Some(last) = coords.last() {
        let text = format!("Total: {}", painter.distance(total));
        painter.label(PrimitiveRole::TotalLabel, 0, *last, text);
    }
}

fn draw_polygon(painter: &mut Painter<'_>, coords: &[Vec3]) {
    if coords.len() >= 2 {
        let mut outline = coords.to_vec();
        if coords.len() >= 3 {
            outline.push(coords[0]);
        }
        painter.line(PrimitiveRole::Segment, 0, outline, false);
    }
    if coords.len() < 3 {
        return;
    }
    let fill = PolygonPrimitive::new(coords.to_vec(), painter.config.palette.polygon_fill);
    painter.spawn(PrimitiveRole::Fill, 0, fill);

    let area = geometry::polygon_area(coords);
    let perimeter = geometry::perimeter(coords);
    let config = painter.config;
    let text = format!(
        "{}\n{}",
        crate::format::format_area(area, config.units, config.decimals),
        format_distance(perimeter, config.units, config.decimals)
    );
    if let Some(c) = geometry::centroid(coords) {
        painter.label(PrimitiveRole::TotalLabel, 0, c, text);
    }
}
