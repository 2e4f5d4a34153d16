pub mod branch;
pub mod generator;
pub mod leaf;

pub use branch::{Mesh, Vertex, VERTEX_FLOATS};
pub use generator::{BranchSegment, MeshGenerator, MeshParams};
pub use leaf::{ground_disc, leaf_blade};
