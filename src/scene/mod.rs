//! Minimal scene model: per-entity components and shared resources
//!
//! Leaves own their transform and material, share one instanced mesh,
//! and register themselves with an entity counter for their lifetime.

mod entity;
mod instanced;
mod material;
mod transform;

pub use entity::{EntityCounter, EntityGuard};
pub use instanced::InstancedMesh;
pub use material::PhongMaterial;
pub use transform::Transform;
