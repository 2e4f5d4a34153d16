use crate::math::{generate_branch_curve, Vec3};
use super::branch::{connect_rings, create_ring, Mesh, Vertex};

/// Parameters for bark mesh generation
#[derive(Debug, Clone, Copy)]
pub struct MeshParams {
    /// Radial segments around each ring
    pub radial_segments: usize,
    /// Rings along each branch
    pub length_segments: usize,
    /// Amount of bark-like displacement
    pub bark_displacement: f32,
    /// Seed for bark displacement
    pub seed: u32,
}

impl Default for MeshParams {
    fn default() -> Self {
        Self {
            radial_segments: 10,
            length_segments: 8,
            bark_displacement: 0.01,
            seed: 42,
        }
    }
}

/// Current tube geometry of one branch
#[derive(Debug, Clone, Copy)]
pub struct BranchSegment {
    pub start: Vec3,
    pub end: Vec3,
    pub start_direction: Vec3,
    pub end_direction: Vec3,
    pub start_radius: f32,
    pub end_radius: f32,
    pub generation: usize,
    pub has_children: bool,
}

impl BranchSegment {
    pub fn length(&self) -> f32 {
        self.start.distance(&self.end)
    }
}

/// Builds the bark mesh from branch segments
pub struct MeshGenerator {
    params: MeshParams,
}

impl MeshGenerator {
    pub fn new(params: MeshParams) -> Self {
        Self { params }
    }

    /// Bark mesh for every segment long enough to be seen
    pub fn generate(&self, segments: &[BranchSegment]) -> Mesh {
        let mut mesh = Mesh::new();
        for segment in segments.iter().filter(|s| s.length() > 1e-4) {
            self.generate_branch_segment(segment, &mut mesh);
            if segment.has_children {
                self.generate_joint(segment, &mut mesh);
            }
        }
        mesh
    }

    fn generate_branch_segment(&self, segment: &BranchSegment, mesh: &mut Mesh) {
        let params = &self.params;
        let rings = params.length_segments.max(2);

        // Thinner branches bend more
        let curvature = 0.5 + (segment.generation as f32 * 0.05).min(0.2);

        let curve_points = generate_branch_curve(
            segment.start,
            segment.end,
            segment.start_direction,
            segment.end_direction,
            curvature,
            rings,
        );

        let directions: Vec<Vec3> = (0..rings)
            .map(|i| {
                if i == 0 {
                    segment.start_direction
                } else if i == rings - 1 {
                    segment.end_direction
                } else {
                    (curve_points[i + 1] - curve_points[i - 1]).normalize()
                }
            })
            .collect();

        let mut ring_starts = Vec::with_capacity(rings);
        for i in 0..rings {
            let t = i as f32 / (rings - 1) as f32;
            let radius = lerp(segment.start_radius, segment.end_radius, t);
            let noise = self.bark_noise(i + segment.generation * 31, params.seed);
            let displaced_radius = radius + noise * params.bark_displacement * radius;

            let ring = create_ring(
                curve_points[i],
                directions[i],
                displaced_radius,
                params.radial_segments,
                t,
                0.85 + noise * 0.15,
            );
            ring_starts.push(mesh.add_vertices(ring));
        }

        for pair in ring_starts.windows(2) {
            connect_rings(mesh, pair[0], pair[1], params.radial_segments);
        }
    }

    /// Small dome at the end of a parent branch to hide the seam with its children
    fn generate_joint(&self, parent: &BranchSegment, mesh: &mut Mesh) {
        let center = parent.end;
        let direction = parent.end_direction;
        let radius = parent.end_radius;
        let segments = self.params.radial_segments;

        let dome_segments = 3;
        let mut prev_ring_start = None;

        for i in 0..=dome_segments {
            let t = i as f32 / dome_segments as f32;
            let dome_radius = radius * (1.0 - t * 0.5).max(0.1);
            let ring_center = center + direction.scale(radius * t * 0.3);

            let ring = create_ring(ring_center, direction, dome_radius, segments, 1.0 + t * 0.1, 0.9);
            let ring_start = mesh.add_vertices(ring);

            if let Some(prev_start) = prev_ring_start {
                connect_rings(mesh, prev_start, ring_start, segments);
            }
            prev_ring_start = Some(ring_start);
        }

        if let Some(last_ring) = prev_ring_start {
            let tip = center + direction.scale(radius * 0.5);
            let tip_idx = mesh.add_vertices(std::iter::once(
                Vertex::new(tip, direction).with_uv(0.5, 1.0).with_shade(0.9),
            ));

            for i in 0..segments {
                let next = (i + 1) % segments;
                mesh.add_triangle(last_ring + i as u32, last_ring + next as u32, tip_idx);
            }
        }
    }

    /// Deterministic noise in [-1, 1] for bark texture
    fn bark_noise(&self, index: usize, seed: u32) -> f32 {
        let x = (index as u32).wrapping_mul(seed).wrapping_add(12345);
        let x = x ^ (x >> 16);
        let x = x.wrapping_mul(0x85eb_ca6b);
        let x = x ^ (x >> 13);
        (x as f32 / u32::MAX as f32) * 2.0 - 1.0
    }
}

fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}
