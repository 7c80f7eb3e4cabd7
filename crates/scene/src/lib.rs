pub mod entity;
pub mod picking;
pub mod primitives;
pub mod snapshot;
pub mod world;

pub use entity::*;
pub use primitives::*;
pub use world::*;
