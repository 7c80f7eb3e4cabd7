//! Interactive measurement toolbox for a 3D globe.
//!
//! The toolbox owns the annotation primitives and the per-mode interaction
//! state machines. Everything that needs the real globe (hit testing,
//! terrain heights, drawing) goes through [`engine::GlobeEngine`].

pub mod annotation;
pub mod config;
pub mod engine;
pub mod error;
pub mod events;
pub mod format;
pub mod geometry;
pub mod input;
pub mod log;
pub mod measurement;
pub mod modes;
pub mod render;
pub mod state;
pub mod toolbar;
pub mod toolbox;

pub use annotation::{Annotation, AnnotationStore};
pub use config::MeasureConfig;
pub use engine::{EllipsoidEngine, GlobeEngine};
pub use error::MeasureError;
pub use events::MeasureEvent;
pub use input::InputEvent;
pub use measurement::Measurement;
pub use modes::Tool;
pub use toolbox::MeasureToolbox;

pub use scene::{AnnotationKind, EntityId, GroupId};
