use super::Vec3;

/// Cubic Hermite curve between `p0` and `p1` with tangents `m0`, `m1`
pub fn hermite_curve(p0: Vec3, p1: Vec3, m0: Vec3, m1: Vec3, t: f32) -> Vec3 {
    let t2 = t * t;
    let t3 = t2 * t;

    let h00 = 2.0 * t3 - 3.0 * t2 + 1.0;
    let h10 = t3 - 2.0 * t2 + t;
    let h01 = -2.0 * t3 + 3.0 * t2;
    let h11 = t3 - t2;

    p0.scale(h00) + m0.scale(h10) + p1.scale(h01) + m1.scale(h11)
}

/// Sample a bent branch between two points leaving/arriving along the given directions
pub fn generate_branch_curve(
    start: Vec3,
    end: Vec3,
    start_dir: Vec3,
    end_dir: Vec3,
    curvature: f32,
    samples: usize,
) -> Vec<Vec3> {
    let length = start.distance(&end);
    let m0 = start_dir.scale(length * curvature);
    let m1 = end_dir.scale(length * curvature);

    (0..samples)
        .map(|i| {
            let t = i as f32 / (samples - 1).max(1) as f32;
            hermite_curve(start, end, m0, m1, t)
        })
        .collect()
}
