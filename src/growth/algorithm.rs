use std::f32::consts::PI;
use rand::Rng;
use serde::Deserialize;
use crate::math::Vec3;

/// Parameters controlling tree shape
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct GrowthParams {
    /// Deepest generation grown (0 = trunk only)
    pub max_depth: usize,
    /// Trunk length
    pub base_height: f32,
    /// Length multiplier per generation
    pub height_decay: f32,
    /// Trunk radius at the ground
    pub base_radius: f32,
    /// Radius multiplier per generation
    pub radius_decay: f32,
    /// Angle between a parent and its children (radians)
    pub branch_spread: f32,
    /// Random variation in yaw and spread (radians)
    pub angle_variance: f32,
    /// Random up/down tilt (radians)
    pub pitch_variance: f32,
    /// Pull toward vertical (0.0 to 1.0)
    pub verticality: f32,
    /// Upward curl over a branch's length (0.0 to 1.0)
    pub gravitropism: f32,
    pub min_children: usize,
    pub max_children: usize,
}

impl Default for GrowthParams {
    fn default() -> Self {
        Self {
            max_depth: 5,
            base_height: 3.0,
            height_decay: 0.72,
            base_radius: 0.3,
            radius_decay: 0.62,
            branch_spread: PI / 4.0,
            angle_variance: 0.35,
            pitch_variance: 0.4,
            verticality: 0.25,
            gravitropism: 0.15,
            min_children: 2,
            max_children: 3,
        }
    }
}

/// A node in the grown branch structure
#[derive(Debug, Clone)]
pub struct BranchNode {
    /// Pre-order index, 0 = trunk
    pub id: usize,
    pub start: Vec3,
    pub end: Vec3,
    pub start_direction: Vec3,
    pub end_direction: Vec3,
    pub start_radius: f32,
    pub end_radius: f32,
    /// Depth from the trunk
    pub generation: usize,
    pub children: Vec<BranchNode>,
}

impl BranchNode {
    /// All nodes, parents before children
    pub fn iter_preorder(&self) -> impl Iterator<Item = &BranchNode> {
        PreorderNodeIter { stack: vec![self] }
    }

    pub fn count(&self) -> usize {
        1 + self.children.iter().map(|c| c.count()).sum::<usize>()
    }

    pub fn max_generation(&self) -> usize {
        self.iter_preorder().map(|n| n.generation).max().unwrap_or(0)
    }
}

struct PreorderNodeIter<'a> {
    stack: Vec<&'a BranchNode>,
}

impl<'a> Iterator for PreorderNodeIter<'a> {
    type Item = &'a BranchNode;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.stack.pop()?;
        for child in node.children.iter().rev() {
            self.stack.push(child);
        }
        Some(node)
    }
}

/// Recursive procedural growth
pub struct TreeGrowth {
    pub params: GrowthParams,
}

impl TreeGrowth {
    pub fn new(params: GrowthParams) -> Self {
        Self { params }
    }

    /// Grow a tree rooted at the origin, trunk pointing up
    pub fn grow<R: Rng + ?Sized>(&self, rng: &mut R) -> BranchNode {
        let mut next_id = 0;
        self.grow_branch(rng, &mut next_id, Vec3::ZERO, Vec3::UP, 0)
    }

    fn grow_branch<R: Rng + ?Sized>(
        &self,
        rng: &mut R,
        next_id: &mut usize,
        start: Vec3,
        direction: Vec3,
        generation: usize,
    ) -> BranchNode {
        let params = &self.params;
        let id = *next_id;
        *next_id += 1;

        let gen_factor = params.height_decay.powi(generation as i32);
        let length = params.base_height * gen_factor * rng.gen_range(0.85..1.15);
        let start_radius = params.base_radius * params.radius_decay.powi(generation as i32);
        let end_radius = start_radius * params.radius_decay;

        let yaw_var = (rng.gen::<f32>() - 0.5) * params.angle_variance;
        let pitch_var = (rng.gen::<f32>() - 0.5) * params.pitch_variance;
        let gravitropic_lift = params.gravitropism * (1.0 - gen_factor);

        let mut end_direction = rotate_around_up(direction, yaw_var);
        end_direction = rotate_pitch(end_direction, pitch_var);
        end_direction = blend_direction(end_direction, Vec3::UP, gravitropic_lift);

        // Trunk stays close to vertical
        let vertical_pull = if generation == 0 {
            params.verticality + 0.4
        } else {
            params.verticality * 0.5
        };
        end_direction = blend_direction(end_direction, Vec3::UP, vertical_pull);

        let end = start + end_direction.scale(length);

        let children = if generation < params.max_depth {
            let lo = params.min_children.min(params.max_children);
            let hi = params.max_children.max(lo);
            let n = rng.gen_range(lo..=hi);
            self.grow_children(rng, next_id, n, end, end_direction, generation)
        } else {
            Vec::new()
        };

        BranchNode {
            id,
            start,
            end,
            start_direction: direction,
            end_direction,
            start_radius,
            end_radius,
            generation,
            children,
        }
    }

    fn grow_children<R: Rng + ?Sized>(
        &self,
        rng: &mut R,
        next_id: &mut usize,
        n: usize,
        parent_end: Vec3,
        parent_direction: Vec3,
        parent_generation: usize,
    ) -> Vec<BranchNode> {
        let spread = self.params.branch_spread;
        let (perp1, perp2) = perpendicular_frame(parent_direction);
        let phase = rng.gen_range(0.0..std::f32::consts::TAU);

        (0..n)
            .map(|i| {
                let spread_var = (rng.gen::<f32>() - 0.5) * self.params.angle_variance;
                let elev_var = (rng.gen::<f32>() - 0.5) * self.params.pitch_variance * 0.3;

                let direction = match n {
                    1 => {
                        // Continuation with a slight kink
                        let deviation = (rng.gen::<f32>() - 0.5) * spread * 0.3;
                        let offset = perp1.scale(deviation.sin()) + perp2.scale(elev_var.sin() * 0.5);
                        (parent_direction + offset.scale(0.3)).normalize()
                    }
                    2 => {
                        let angle = spread + spread_var;
                        let radial = if i == 0 { perp1 } else { -perp1 };
                        let tilt = radial.scale(angle.sin().abs()) + perp2.scale(elev_var * 0.5);
                        (parent_direction.scale(angle.cos()) + tilt).normalize()
                    }
                    _ => {
                        let golden_angle = PI * (3.0 - 5.0_f32.sqrt());
                        let radial_angle = phase + i as f32 * golden_angle + spread_var;
                        let radial = perp1.scale(radial_angle.cos()) + perp2.scale(radial_angle.sin());
                        let elev_offset = parent_direction.scale(elev_var * 0.3);
                        (parent_direction.scale(spread.cos()) + radial.scale(spread.sin()) + elev_offset)
                            .normalize()
                    }
                };

                self.grow_branch(rng, next_id, parent_end, direction, parent_generation + 1)
            })
            .collect()
    }
}

/// Two unit vectors orthogonal to `dir` and to each other
fn perpendicular_frame(dir: Vec3) -> (Vec3, Vec3) {
    let dir = dir.normalize();
    let helper = if dir.y.abs() < 0.9 { Vec3::UP } else { Vec3::RIGHT };

    let perp1 = dir.cross(&helper).normalize();
    let perp2 = dir.cross(&perp1).normalize();
    (perp1, perp2)
}

fn blend_direction(dir: Vec3, target: Vec3, amount: f32) -> Vec3 {
    dir.lerp(&target, amount).normalize()
}

fn rotate_around_up(dir: Vec3, angle: f32) -> Vec3 {
    let (sin_a, cos_a) = angle.sin_cos();
    Vec3::new(
        dir.x * cos_a - dir.z * sin_a,
        dir.y,
        dir.x * sin_a + dir.z * cos_a,
    )
}

/// Tilt up/down around the horizontal axis; vertical directions are left alone
fn rotate_pitch(dir: Vec3, angle: f32) -> Vec3 {
    let right = Vec3::UP.cross(&dir);
    if right.length() < 0.001 {
        return dir;
    }
    dir.rotate_around(right.normalize(), angle)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn grow(params: GrowthParams, seed: u64) -> BranchNode {
        TreeGrowth::new(params).grow(&mut StdRng::seed_from_u64(seed))
    }

    #[test]
    fn test_tree_starts_at_origin_and_grows_up() {
        let tree = grow(GrowthParams::default(), 1);
        assert_eq!(tree.start, Vec3::ZERO);
        assert!(tree.end.y > tree.start.y);
        assert_eq!(tree.id, 0);
        assert_eq!(tree.generation, 0);
    }

    #[test]
    fn test_depth_limit() {
        let params = GrowthParams { max_depth: 3, ..Default::default() };
        let tree = grow(params, 2);
        assert_eq!(tree.max_generation(), 3);
    }

    #[test]
    fn test_child_count_bounds() {
        let params = GrowthParams {
            max_depth: 2,
            min_children: 2,
            max_children: 2,
            ..Default::default()
        };
        let tree = grow(params, 3);
        assert_eq!(tree.count(), 1 + 2 + 4);
    }

    #[test]
    fn test_trunk_only() {
        let params = GrowthParams { max_depth: 0, ..Default::default() };
        let tree = grow(params, 4);
        assert_eq!(tree.count(), 1);
        assert!(tree.children.is_empty());
    }

    #[test]
    fn test_ids_are_preorder() {
        let tree = grow(GrowthParams::default(), 5);
        let ids: Vec<_> = tree.iter_preorder().map(|n| n.id).collect();
        let expected: Vec<_> = (0..tree.count()).collect();
        assert_eq!(ids, expected);
    }

    #[test]
    fn test_children_start_at_parent_end() {
        let tree = grow(GrowthParams::default(), 6);
        for node in tree.iter_preorder() {
            for child in &node.children {
                assert!(child.start.distance(&node.end) < 1e-5);
                assert_eq!(child.generation, node.generation + 1);
                assert!(child.start_radius < node.start_radius);
            }
        }
    }

    #[test]
    fn test_split_children_diverge() {
        let params = GrowthParams {
            max_depth: 1,
            min_children: 2,
            max_children: 2,
            ..Default::default()
        };
        let tree = grow(params, 7);
        let left = &tree.children[0];
        let right = &tree.children[1];
        let similarity = (left.end - left.start).normalize().dot(&(right.end - right.start).normalize());
        assert!(similarity < 0.99, "children should diverge, similarity={}", similarity);
    }

    #[test]
    fn test_deterministic_with_seed() {
        let a = grow(GrowthParams::default(), 123);
        let b = grow(GrowthParams::default(), 123);
        assert_eq!(a.count(), b.count());
        for (x, y) in a.iter_preorder().zip(b.iter_preorder()) {
            assert_eq!(x.end, y.end);
        }
    }

    #[test]
    fn test_perpendicular_frame_is_orthonormal() {
        for dir in [Vec3::UP, Vec3::RIGHT, Vec3::new(0.3, 0.8, -0.2)] {
            let (p1, p2) = perpendicular_frame(dir);
            assert!(p1.dot(&dir.normalize()).abs() < 1e-4);
            assert!(p2.dot(&dir.normalize()).abs() < 1e-4);
            assert!(p1.dot(&p2).abs() < 1e-4);
        }
    }
}
