//! Scene layer: surface materials, the object model, and the scene context
//! that keeps the authoritative CPU description synchronized with the GPU
//! buffer.

pub mod material;
pub mod object;
pub mod world;

pub use material::Material;
pub use object::{Cuboid, Geometry, SceneObject, Shape, Sphere};
pub use world::{PathlightScene, RayHit, SceneCounts};
