use std::cell::Cell;
use crate::mesh::Mesh;

/// Geometry shared by every leaf, plus the draw count used for instanced rendering.
///
/// Leaves hold an `Rc` to it; the count lives in a `Cell` so any holder can
/// adjust it from the single-threaded update loop.
#[derive(Debug)]
pub struct InstancedMesh {
    geometry: Mesh,
    instanced: bool,
    instance_count: Cell<usize>,
}

impl InstancedMesh {
    pub fn new(geometry: Mesh, instanced: bool) -> Self {
        Self {
            geometry,
            instanced,
            instance_count: Cell::new(0),
        }
    }

    pub fn geometry(&self) -> &Mesh {
        &self.geometry
    }

    /// Whether leaves are drawn with one instanced call
    pub fn is_instanced(&self) -> bool {
        self.instanced
    }

    pub fn instance_count(&self) -> usize {
        self.instance_count.get()
    }

    pub fn set_instance_count(&self, count: usize) {
        self.instance_count.set(count);
    }

    pub fn add_instances(&self, n: usize) {
        self.instance_count.set(self.instance_count.get() + n);
    }

    /// Drop one instance; saturates at zero
    pub fn remove_instance(&self) {
        self.instance_count.set(self.instance_count.get().saturating_sub(1));
    }
}
