//! Leaf blade and ground geometry

use crate::math::Vec3;
use super::branch::{Mesh, Vertex};

/// Pointed leaf blade in the XY plane, stem at the origin, tip at `(0, length, 0)`.
///
/// Both faces are emitted so the blade is visible from either side.
pub fn leaf_blade(length: f32, width: f32, segments: usize) -> Mesh {
    let segments = segments.max(2);
    let mut mesh = Mesh::new();

    for (normal, flip) in [(Vec3::FORWARD, false), (-Vec3::FORWARD, true)] {
        // Left edge, midrib, right edge for each row
        let mut rows = Vec::with_capacity(segments + 1);
        for i in 0..=segments {
            let t = i as f32 / segments as f32;
            let y = t * length;
            let half = (t * std::f32::consts::PI).sin() * width * 0.5;
            let left = Vertex::new(Vec3::new(-half, y, 0.0), normal).with_uv(0.0, t).with_shade(0.9);
            let mid = Vertex::new(Vec3::new(0.0, y, 0.0), normal).with_uv(0.5, t).with_shade(1.1);
            let right = Vertex::new(Vec3::new(half, y, 0.0), normal).with_uv(1.0, t).with_shade(0.9);
            rows.push(mesh.add_vertices([left, mid, right]));
        }

        for pair in rows.windows(2) {
            let (a, b) = (pair[0], pair[1]);
            for col in 0..2 {
                let (p, q, r, s) = (a + col, a + col + 1, b + col + 1, b + col);
                if flip {
                    mesh.add_quad(p, s, r, q);
                } else {
                    mesh.add_quad(p, q, r, s);
                }
            }
        }
    }

    mesh
}

/// Flat disc at `y = 0` facing up
pub fn ground_disc(radius: f32, segments: usize) -> Mesh {
    let segments = segments.max(3);
    let mut mesh = Mesh::new();

    let center = mesh.add_vertices(std::iter::once(
        Vertex::new(Vec3::ZERO, Vec3::UP).with_uv(0.5, 0.5),
    ));
    let rim = mesh.add_vertices((0..segments).map(|i| {
        let angle = i as f32 / segments as f32 * std::f32::consts::TAU;
        let (sin_a, cos_a) = angle.sin_cos();
        Vertex::new(Vec3::new(cos_a * radius, 0.0, sin_a * radius), Vec3::UP)
            .with_uv(0.5 + cos_a * 0.5, 0.5 + sin_a * 0.5)
            .with_shade(0.8)
    }));

    for i in 0..segments as u32 {
        let next = (i + 1) % segments as u32;
        mesh.add_triangle(center, rim + next, rim + i);
    }

    mesh
}
