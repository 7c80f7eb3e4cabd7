use serde::{Deserialize, Serialize};

/// Identifies one annotation (a measurement and all its derived primitives).
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct GroupId(pub u64);

impl std::fmt::Display for GroupId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnnotationKind {
    Point,
    Distance,
    Curve,
    Height,
    MultiDistance,
    MultiDistanceClamped,
    Polygon,
    Profile,
    ProfileDistances,
}

impl AnnotationKind {
    pub const ALL: [AnnotationKind; 9] = [
        AnnotationKind::Point,
        AnnotationKind::Distance,
        AnnotationKind::Curve,
        AnnotationKind::Height,
        AnnotationKind::MultiDistance,
        AnnotationKind::MultiDistanceClamped,
        AnnotationKind::Polygon,
        AnnotationKind::Profile,
        AnnotationKind::ProfileDistances,
    ];

    pub fn name(self) -> &'static str {
        match self {
            AnnotationKind::Point => "point",
            AnnotationKind::Distance => "distance",
            AnnotationKind::Curve => "curve",
            AnnotationKind::Height => "height",
            AnnotationKind::MultiDistance => "multi_distance",
            AnnotationKind::MultiDistanceClamped => "multi_distance_clamped",
            AnnotationKind::Polygon => "polygon",
            AnnotationKind::Profile => "profile",
            AnnotationKind::ProfileDistances => "profile_distances",
        }
    }

    /// Segments follow the terrain instead of the straight chord.
    pub fn is_clamped(self) -> bool {
        matches!(
            self,
            AnnotationKind::MultiDistanceClamped
                | AnnotationKind::Profile
                | AnnotationKind::ProfileDistances
        )
    }

    pub fn has_profile(self) -> bool {
        matches!(
            self,
            AnnotationKind::Profile | AnnotationKind::ProfileDistances
        )
    }

    /// Number of vertices that completes the annotation, if fixed.
    pub fn fixed_vertex_count(self) -> Option<usize> {
        match self {
            AnnotationKind::Point | AnnotationKind::Height => Some(1),
            AnnotationKind::Distance | AnnotationKind::Curve | AnnotationKind::Profile => Some(2),
            _ => None,
        }
    }
}

impl std::fmt::Display for AnnotationKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// What a primitive depicts within its annotation.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PrimitiveRole {
    /// A clicked coordinate; `index` is the coordinate index.
    Vertex,
    /// The line for segment `index` (or the whole line for single-line kinds).
    Segment,
    /// Label for segment `index`.
    SegmentLabel,
    /// Summary label (total, area, height...).
    TotalLabel,
    Fill,
    /// Derived helper geometry that is not a clicked coordinate.
    Guide,
}

impl PrimitiveRole {
    pub fn is_label(self) -> bool {
        matches!(self, PrimitiveRole::SegmentLabel | PrimitiveRole::TotalLabel)
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AnnotationTag {
    pub group: GroupId,
    pub kind: AnnotationKind,
    pub role: PrimitiveRole,
    pub index: u32,
    /// Part of an annotation that is still being drawn.
    pub pending: bool,
}

impl AnnotationTag {
    pub fn new(group: GroupId, kind: AnnotationKind, role: PrimitiveRole, index: u32) -> Self {
        Self {
            group,
            kind,
            role,
            index,
            pending: false,
        }
    }

    pub fn pending(mut self, pending: bool) -> Self {
        self.pending = pending;
        self
    }

    pub fn is_committed_vertex(&self) -> bool {
        self.role == PrimitiveRole::Vertex && !self.pending
    }
}
