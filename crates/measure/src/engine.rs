//! The seam to the globe rendering engine.
//!
//! The toolbox never renders, samples terrain or tessellates on its own; it
//! asks the engine through [`GlobeEngine`]. [`EllipsoidEngine`] is a small
//! synthetic engine (linear lon/lat screen mapping over WGS84) used by the
//! CLI and the tests.

use foundation::math::{Geodetic, Vec2, Vec3, ecef_to_geodetic, geodetic_to_ecef};
use scene::World;
use scene::picking::{PickHit, PickOptions, drill_pick_screen};
use scene::snapshot::SceneSnapshot;

pub trait GlobeEngine {
    /// World position under the cursor: terrain, or whatever surface the
    /// engine hits first (buildings, tilesets). `None` when the cursor is off
    /// the globe.
    fn pick_position(&self, screen: Vec2) -> Option<Vec3>;

    /// Screen position of a world point, or `None` if it is not visible.
    fn project(&self, position: Vec3) -> Option<Vec2>;

    /// Bare-terrain height (meters above the ellipsoid) at the given
    /// latitude/longitude. Altitude in `position` is ignored.
    fn sample_height(&self, position: Geodetic) -> Option<f64>;

    /// Every toolbox primitive under the cursor, topmost first.
    fn drill_pick(&self, world: &World, screen: Vec2, tolerance_px: f64) -> Vec<PickHit> {
        drill_pick_screen(world, screen, PickOptions { tolerance_px }, |p| self.project(p))
    }

    /// Topmost toolbox primitive under the cursor.
    fn pick_entity(&self, world: &World, screen: Vec2, tolerance_px: f64) -> Option<PickHit> {
        self.drill_pick(world, screen, tolerance_px).into_iter().next()
    }

    /// Enable or disable camera rotate/zoom input. Disabled while a vertex is
    /// being dragged.
    fn set_camera_controls(&mut self, _enabled: bool) {}

    /// Receives the toolbox primitives after every change.
    fn render(&mut self, _snapshot: &SceneSnapshot) {}
}

/// Position on the terrain directly below (or above) `position`.
///
/// Missing terrain samples fall back to the ellipsoid surface.
pub fn ground_below(engine: &dyn GlobeEngine, position: Vec3) -> Vec3 {
    let geo = ecef_to_geodetic(position);
    let height = engine.sample_height(geo).unwrap_or(0.0);
    geodetic_to_ecef(geo.with_alt(height))
}

/// Height field over latitude/longitude in degrees.
pub trait TerrainModel {
    fn height(&self, lat_deg: f64, lon_deg: f64) -> f64;
}

impl<F> TerrainModel for F
where
    F: Fn(f64, f64) -> f64,
{
    fn height(&self, lat_deg: f64, lon_deg: f64) -> f64 {
        self(lat_deg, lon_deg)
    }
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct FlatTerrain(pub f64);

impl TerrainModel for FlatTerrain {
    fn height(&self, _lat_deg: f64, _lon_deg: f64) -> f64 {
        self.0
    }
}

/// Linear screen mapping: pixel (0, 0) is the north-west corner.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Viewport {
    pub width_px: f64,
    pub height_px: f64,
    pub west_deg: f64,
    pub north_deg: f64,
    pub deg_per_px: f64,
}

impl Viewport {
    pub fn contains(&self, screen: Vec2) -> bool {
        screen.x >= 0.0
            && screen.y >= 0.0
            && screen.x <= self.width_px
            && screen.y <= self.height_px
    }
}

impl Default for Viewport {
    fn default() -> Self {
        // About 1 km across at mid latitudes.
        Self {
            width_px: 1000.0,
            height_px: 1000.0,
            west_deg: 8.0,
            north_deg: 47.0,
            deg_per_px: 1.0e-5,
        }
    }
}

pub struct EllipsoidEngine {
    viewport: Viewport,
    terrain: Box<dyn TerrainModel>,
    surface: Option<Box<dyn TerrainModel>>,
    camera_controls: bool,
    frames_rendered: u64,
    last_snapshot: SceneSnapshot,
}

impl EllipsoidEngine {
    pub fn new(viewport: Viewport) -> Self {
        Self {
            viewport,
            terrain: Box::new(FlatTerrain(0.0)),
            surface: None,
            camera_controls: true,
            frames_rendered: 0,
            last_snapshot: SceneSnapshot::default(),
        }
    }

    pub fn with_terrain(mut self, terrain: impl TerrainModel + 'static) -> Self {
        self.terrain = Box::new(terrain);
        self
    }

    /// Surface hit by `pick_position` (terrain plus structures). Defaults to
    /// the terrain itself.
    pub fn with_surface(mut self, surface: impl TerrainModel + 'static) -> Self {
        self.surface = Some(Box::new(surface));
        self
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn camera_controls_enabled(&self) -> bool {
        self.camera_controls
    }

    pub fn frames_rendered(&self) -> u64 {
        self.frames_rendered
    }

    pub fn last_snapshot(&self) -> &SceneSnapshot {
        &self.last_snapshot
    }

    /// Latitude/longitude (degrees) under a screen pixel.
    pub fn screen_to_degrees(&self, screen: Vec2) -> (f64, f64) {
        let vp = self.viewport;
        (
            vp.north_deg - screen.y * vp.deg_per_px,
            vp.west_deg + screen.x * vp.deg_per_px,
        )
    }

    /// World position of a screen pixel on the picked surface.
    pub fn surface_position(&self, screen: Vec2) -> Vec3 {
        let (lat, lon) = self.screen_to_degrees(screen);
        let height = match &self.surface {
            Some(surface) => surface.height(lat, lon),
            None => self.terrain.height(lat, lon),
        };
        geodetic_to_ecef(Geodetic::from_degrees(lat, lon, height))
    }
}

impl Default for EllipsoidEngine {
    fn default() -> Self {
        Self::new(Viewport::default())
    }
}

impl std::fmt::Debug for EllipsoidEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EllipsoidEngine")
            .field("viewport", &self.viewport)
            .field("camera_controls", &self.camera_controls)
            .field("frames_rendered", &self.frames_rendered)
            .finish_non_exhaustive()
    }
}

impl GlobeEngine for EllipsoidEngine {
    fn pick_position(&self, screen: Vec2) -> Option<Vec3> {
        if !screen.is_finite() || !self.viewport.contains(screen) {
            return None;
        }
        Some(self.surface_position(screen))
    }

    fn project(&self, position: Vec3) -> Option<Vec2> {
        if !position.is_finite() {
            return None;
        }
        let geo = ecef_to_geodetic(position);
        let vp = self.viewport;
        Some(Vec2::new(
            (geo.lon_deg() - vp.west_deg) / vp.deg_per_px,
            (vp.north_deg - geo.lat_deg()) / vp.deg_per_px,
        ))
    }

    fn sample_height(&self, position: Geodetic) -> Option<f64> {
        let h = self.terrain.height(position.lat_deg(), position.lon_deg());
        h.is_finite().then_some(h)
    }

    fn set_camera_controls(&mut self, enabled: bool) {
        self.camera_controls = enabled;
    }

    fn render(&mut self, snapshot: &SceneSnapshot) {
        self.frames_rendered += 1;
        self.last_snapshot = snapshot.clone();
    }
}
