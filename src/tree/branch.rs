use std::rc::Rc;
use crate::animation::BranchAnimState;
use crate::growth::BranchNode;
use crate::math::Vec3;
use crate::mesh::BranchSegment;
use super::anchor::BranchAnchor;

/// Live branch: full-grown shape from growth, current extent from the growth animation
#[derive(Debug)]
pub struct Branch {
    pub id: usize,
    pub parent: Option<usize>,
    pub generation: usize,
    /// Whether this year's leaves have been hung on it
    pub leaves_spawned: bool,
    direction: Vec3,
    start_direction: Vec3,
    end_direction: Vec3,
    length: f32,
    start_radius: f32,
    end_radius: f32,
    has_children: bool,
    length_scale: f32,
    radius_scale: f32,
    anchor: Rc<BranchAnchor>,
}

impl Branch {
    /// Starts collapsed at the node's start point
    pub fn from_node(node: &BranchNode, parent: Option<usize>) -> Self {
        Self {
            id: node.id,
            parent,
            generation: node.generation,
            leaves_spawned: false,
            direction: (node.end - node.start).normalize(),
            start_direction: node.start_direction,
            end_direction: node.end_direction,
            length: node.start.distance(&node.end),
            start_radius: node.start_radius,
            end_radius: node.end_radius,
            has_children: !node.children.is_empty(),
            length_scale: 0.0,
            radius_scale: 0.0,
            anchor: Rc::new(BranchAnchor::new(node.start, node.start)),
        }
    }

    /// Place the branch at `start` and extend it by the animation's scales
    pub fn apply_growth(&mut self, start: Vec3, state: &BranchAnimState) {
        self.length_scale = state.length_scale;
        self.radius_scale = state.radius_scale;
        let end = start + self.direction.scale(self.length * self.length_scale);
        self.anchor.set(start, end);
    }

    pub fn anchor(&self) -> Rc<BranchAnchor> {
        Rc::clone(&self.anchor)
    }

    pub fn start(&self) -> Vec3 {
        self.anchor.start()
    }

    pub fn end(&self) -> Vec3 {
        self.anchor.end()
    }

    pub fn current_length(&self) -> f32 {
        self.length * self.length_scale
    }

    pub fn segment(&self) -> BranchSegment {
        BranchSegment {
            start: self.start(),
            end: self.end(),
            start_direction: self.start_direction,
            end_direction: self.end_direction,
            start_radius: self.start_radius * self.radius_scale,
            end_radius: self.end_radius * self.radius_scale,
            generation: self.generation,
            has_children: self.has_children,
        }
    }
}

/// Branches in pre-order; index equals branch id, parents come before children
pub fn flatten(root: &BranchNode) -> Vec<Branch> {
    fn walk(node: &BranchNode, parent: Option<usize>, out: &mut Vec<Branch>) {
        out.push(Branch::from_node(node, parent));
        for child in &node.children {
            walk(child, Some(node.id), out);
        }
    }

    let mut out = Vec::with_capacity(root.count());
    walk(root, None, &mut out);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn node(id: usize, start: Vec3, end: Vec3, children: Vec<BranchNode>) -> BranchNode {
        BranchNode {
            id,
            start,
            end,
            start_direction: Vec3::UP,
            end_direction: Vec3::UP,
            start_radius: 0.2,
            end_radius: 0.1,
            generation: 0,
            children,
        }
    }

    #[test]
    fn test_flatten_keeps_preorder_ids() {
        let top = Vec3::new(0.0, 2.0, 0.0);
        let root = node(
            0,
            Vec3::ZERO,
            top,
            vec![
                node(1, top, Vec3::new(1.0, 3.0, 0.0), vec![]),
                node(2, top, Vec3::new(-1.0, 3.0, 0.0), vec![]),
            ],
        );
        let branches = flatten(&root);
        assert_eq!(branches.len(), 3);
        for (i, b) in branches.iter().enumerate() {
            assert_eq!(b.id, i);
        }
        assert_eq!(branches[0].parent, None);
        assert_eq!(branches[2].parent, Some(0));
    }

    #[test]
    fn test_starts_collapsed() {
        let branch = Branch::from_node(&node(0, Vec3::ZERO, Vec3::UP, vec![]), None);
        assert_eq!(branch.start(), branch.end());
        assert_eq!(branch.current_length(), 0.0);
    }

    #[test]
    fn test_apply_growth_moves_anchor() {
        let mut branch = Branch::from_node(&node(0, Vec3::ZERO, Vec3::new(0.0, 4.0, 0.0), vec![]), None);
        let anchor = branch.anchor();
        let state = BranchAnimState {
            length_scale: 0.5,
            radius_scale: 0.5,
            ..Default::default()
        };
        branch.apply_growth(Vec3::new(1.0, 0.0, 0.0), &state);

        assert_eq!(anchor.start(), Vec3::new(1.0, 0.0, 0.0));
        assert!((anchor.end() - Vec3::new(1.0, 2.0, 0.0)).length() < 1e-5);
        assert!((branch.segment().start_radius - 0.1).abs() < 1e-6);
    }
}
