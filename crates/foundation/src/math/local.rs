use super::{Geodetic, Vec3, geodetic_to_ecef};

/// Local East-North-Up coordinates (meters).
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Enu {
    pub east: f64,
    pub north: f64,
    pub up: f64,
}

impl Enu {
    pub fn new(east: f64, north: f64, up: f64) -> Self {
        Self { east, north, up }
    }

    /// Length of the horizontal (east/north) component.
    pub fn horizontal(&self) -> f64 {
        (self.east * self.east + self.north * self.north).sqrt()
    }
}

/// Unit east/north/up axes of the tangent frame at `origin`, in ECEF.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct TangentFrame {
    pub east: Vec3,
    pub north: Vec3,
    pub up: Vec3,
}

impl TangentFrame {
    pub fn at(origin: Geodetic) -> Self {
        let (sin_lat, cos_lat) = origin.lat_rad.sin_cos();
        let (sin_lon, cos_lon) = origin.lon_rad.sin_cos();
        Self {
            east: Vec3::new(-sin_lon, cos_lon, 0.0),
            north: Vec3::new(-sin_lat * cos_lon, -sin_lat * sin_lon, cos_lat),
            up: Vec3::new(cos_lat * cos_lon, cos_lat * sin_lon, sin_lat),
        }
    }
}

pub fn ecef_to_enu(point: Vec3, origin: Geodetic) -> Enu {
    let frame = TangentFrame::at(origin);
    let d = point - geodetic_to_ecef(origin);
    Enu::new(d.dot(frame.east), d.dot(frame.north), d.dot(frame.up))
}

pub fn enu_to_ecef(enu: Enu, origin: Geodetic) -> Vec3 {
    let frame = TangentFrame::at(origin);
    geodetic_to_ecef(origin)
        + frame.east.scale(enu.east)
        + frame.north.scale(enu.north)
        + frame.up.scale(enu.up)
}
