//! Tree growth animation
//!
//! Grows the tree from a seedling: each generation starts a little later
//! than its parent, and length and girth ease in at slightly different
//! rates.

use super::easing::{ease, Easing};
use crate::growth::BranchNode;

/// Overall growth animation state
#[derive(Debug, Clone)]
pub struct GrowthAnimation {
    /// Overall progress (0.0 = seed, 1.0 = fully grown)
    pub progress: f32,
    /// Duration in seconds
    pub duration: f32,
    pub elapsed: f32,
    pub playing: bool,
    pub complete: bool,
    pub easing: Easing,
    /// Fraction of the timeline each generation waits after its parent
    pub generation_delay: f32,
    pub max_generation: usize,
    /// Indexed by branch id
    branch_states: Vec<BranchAnimState>,
}

/// Animation state for a single branch
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct BranchAnimState {
    pub visibility: f32,
    pub length_scale: f32,
    pub radius_scale: f32,
    pub generation: usize,
    /// Eased progress of this branch (0.0 to 1.0)
    pub local_progress: f32,
}

impl BranchAnimState {
    pub fn full() -> Self {
        Self {
            visibility: 1.0,
            length_scale: 1.0,
            radius_scale: 1.0,
            generation: 0,
            local_progress: 1.0,
        }
    }
}

impl Default for GrowthAnimation {
    fn default() -> Self {
        Self {
            progress: 0.0,
            duration: 8.0,
            elapsed: 0.0,
            playing: false,
            complete: false,
            easing: Easing::Organic,
            generation_delay: 0.15,
            max_generation: 0,
            branch_states: Vec::new(),
        }
    }
}

impl GrowthAnimation {
    pub fn new(duration: f32) -> Self {
        Self {
            duration,
            ..Default::default()
        }
    }

    /// Animation that is already complete
    pub fn instant() -> Self {
        Self {
            progress: 1.0,
            complete: true,
            ..Default::default()
        }
    }

    pub fn init_from_tree(&mut self, root: &BranchNode) {
        self.max_generation = root.max_generation();
        self.branch_states = vec![BranchAnimState::default(); root.count()];
        for node in root.iter_preorder() {
            if let Some(state) = self.branch_states.get_mut(node.id) {
                state.generation = node.generation;
            }
        }
        if self.max_generation > 0 {
            // The last generation still needs part of the timeline to grow in
            self.generation_delay = self.generation_delay.min(0.8 / self.max_generation as f32);
        }
        if self.complete {
            self.complete_instantly();
        }
    }

    pub fn start(&mut self) {
        self.elapsed = 0.0;
        self.progress = 0.0;
        self.playing = true;
        self.complete = false;
        self.update_branch_states();
    }

    pub fn reset(&mut self) {
        self.elapsed = 0.0;
        self.progress = 0.0;
        self.playing = false;
        self.complete = false;
        for state in &mut self.branch_states {
            *state = BranchAnimState {
                generation: state.generation,
                ..Default::default()
            };
        }
    }

    pub fn complete_instantly(&mut self) {
        self.progress = 1.0;
        self.elapsed = self.duration;
        self.playing = false;
        self.complete = true;
        for state in &mut self.branch_states {
            *state = BranchAnimState {
                generation: state.generation,
                ..BranchAnimState::full()
            };
        }
    }

    pub fn update(&mut self, dt: f32) {
        if !self.playing || self.complete {
            return;
        }

        self.elapsed += dt;
        self.progress = if self.duration > 0.0 {
            (self.elapsed / self.duration).min(1.0)
        } else {
            1.0
        };

        if self.progress >= 1.0 {
            self.playing = false;
            self.complete = true;
            self.progress = 1.0;
        }

        self.update_branch_states();
    }

    fn update_branch_states(&mut self) {
        let window = (1.0 - self.generation_delay * self.max_generation as f32).max(0.05);

        for state in &mut self.branch_states {
            let gen_start = state.generation as f32 * self.generation_delay;
            let gen_end = gen_start + window;

            let local_t = if self.progress <= gen_start {
                0.0
            } else if self.progress >= gen_end {
                1.0
            } else {
                (self.progress - gen_start) / (gen_end - gen_start)
            };

            let eased = ease(local_t, self.easing);
            state.local_progress = eased;
            state.visibility = eased;
            state.length_scale = ease(local_t * 1.1, Easing::EaseOut).min(1.0);
            state.radius_scale = ease(local_t * 0.9, Easing::EaseInOut).min(1.0);
        }
    }

    pub fn get_branch_state(&self, branch_id: usize) -> BranchAnimState {
        if self.complete {
            return BranchAnimState::full();
        }
        self.branch_states.get(branch_id).copied().unwrap_or_default()
    }

    pub fn get_progress(&self) -> f32 {
        self.progress
    }

    pub fn is_complete(&self) -> bool {
        self.complete
    }

    pub fn is_playing(&self) -> bool {
        self.playing
    }

    /// Jump to `progress` and pause
    pub fn set_progress(&mut self, progress: f32) {
        self.progress = progress.clamp(0.0, 1.0);
        self.elapsed = self.progress * self.duration;
        self.complete = self.progress >= 1.0;
        self.playing = false;
        self.update_branch_states();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::Vec3;

    fn node(id: usize, generation: usize, children: Vec<BranchNode>) -> BranchNode {
        BranchNode {
            id,
            start: Vec3::ZERO,
            end: Vec3::UP,
            start_direction: Vec3::UP,
            end_direction: Vec3::UP,
            start_radius: 0.3,
            end_radius: 0.2,
            generation,
            children,
        }
    }

    fn create_test_tree() -> BranchNode {
        node(0, 0, vec![node(1, 1, vec![]), node(2, 1, vec![])])
    }

    #[test]
    fn test_animation_init() {
        let mut anim = GrowthAnimation::new(5.0);
        anim.init_from_tree(&create_test_tree());

        assert_eq!(anim.max_generation, 1);
        assert_eq!(anim.branch_states.len(), 3);
        assert_eq!(anim.branch_states[2].generation, 1);
    }

    #[test]
    fn test_animation_progress() {
        let mut anim = GrowthAnimation::new(1.0);
        anim.init_from_tree(&create_test_tree());
        anim.start();

        anim.update(0.5);
        assert!((anim.progress - 0.5).abs() < 0.01);
        assert!(anim.is_playing());
        assert!(anim.get_branch_state(0).visibility > 0.0);
    }

    #[test]
    fn test_animation_completion() {
        let mut anim = GrowthAnimation::new(1.0);
        anim.init_from_tree(&create_test_tree());
        anim.start();
        anim.update(1.5);

        assert!(anim.is_complete());
        assert!(!anim.is_playing());
        assert_eq!(anim.progress, 1.0);
    }

    #[test]
    fn test_instant_animation() {
        let anim = GrowthAnimation::instant();
        assert!(anim.is_complete());
        assert_eq!(anim.get_branch_state(99), BranchAnimState::full());
    }

    #[test]
    fn test_generation_stagger() {
        let mut anim = GrowthAnimation::new(1.0);
        anim.generation_delay = 0.3;
        anim.init_from_tree(&create_test_tree());
        anim.start();

        anim.update(0.2);
        assert!(anim.get_branch_state(0).visibility > anim.get_branch_state(1).visibility);
    }

    #[test]
    fn test_deep_tree_delay_is_capped() {
        let mut chain = node(6, 6, vec![]);
        for id in (0..6).rev() {
            chain = node(id, id, vec![chain]);
        }
        let mut anim = GrowthAnimation::new(1.0);
        anim.init_from_tree(&chain);
        assert!(anim.generation_delay * anim.max_generation as f32 <= 0.8 + 1e-6);

        anim.set_progress(0.999);
        assert!(anim.get_branch_state(6).local_progress > 0.9);
    }

    #[test]
    fn test_reset() {
        let mut anim = GrowthAnimation::new(1.0);
        anim.init_from_tree(&create_test_tree());
        anim.start();
        anim.update(0.5);
        anim.reset();

        assert!(!anim.is_playing());
        assert!(!anim.is_complete());
        assert_eq!(anim.get_branch_state(0).visibility, 0.0);
    }

    #[test]
    fn test_set_progress() {
        let mut anim = GrowthAnimation::new(1.0);
        anim.init_from_tree(&create_test_tree());
        anim.set_progress(0.75);

        assert!((anim.progress - 0.75).abs() < 0.01);
        assert!(!anim.is_playing());
        assert!(anim.get_branch_state(0).visibility > 0.5);
    }
}
