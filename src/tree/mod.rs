//! The living tree: branches growing in, leaves hung on them, and the season
//! loop that colours, drops and regrows those leaves.
//!
//! [`Tree::update`] is the only clock. It advances growth, then the season,
//! then the fall timer, delivering each timer tick to the falling leaves in
//! subscription order. Landed leaves are queued and dropped after the tick.

mod anchor;
mod branch;
mod leaf;

pub use anchor::{BranchAnchor, FallVector, LeafAnchor};
pub use branch::{flatten, Branch};
pub use leaf::{leaf_rotation, rotation_axis, FallStep, Leaf, LeafKey, LeafState, INSTANCE_FLOATS};

use std::rc::Rc;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use slotmap::SlotMap;
use crate::animation::{AnimationTimer, GrowthAnimation, Season, SeasonCycle};
use crate::config::TreeConfig;
use crate::error::Result;
use crate::growth::{BranchNode, TreeGrowth};
use crate::mesh::{leaf_blade, BranchSegment, Mesh, MeshGenerator, MeshParams};
use crate::scene::{EntityCounter, InstancedMesh};

/// Leaf blade dimensions before the transform scale is applied
const LEAF_LENGTH: f32 = 1.0;
const LEAF_WIDTH: f32 = 0.45;
const LEAF_SEGMENTS: usize = 6;

/// Shortest visible branch that can carry leaves
const MIN_LEAF_BRANCH_LENGTH: f32 = 1e-3;

pub struct Tree {
    config: TreeConfig,
    rng: StdRng,
    root: BranchNode,
    branches: Vec<Branch>,
    leaves: SlotMap<LeafKey, Leaf>,
    leaf_mesh: Rc<InstancedMesh>,
    counter: EntityCounter,
    timer: AnimationTimer<LeafKey>,
    growth: GrowthAnimation,
    seasons: SeasonCycle,
    pending_deletions: Vec<LeafKey>,
    mesh_generator: MeshGenerator,
    bark_dirty: bool,
}

impl Tree {
    /// Validate `config` and grow a seedling, seeded from `config.seed` or entropy
    pub fn new(config: TreeConfig) -> Result<Self> {
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self::with_rng(config, rng)
    }

    pub fn with_rng(config: TreeConfig, mut rng: StdRng) -> Result<Self> {
        config.validate()?;

        let root = TreeGrowth::new(config.growth).grow(&mut rng);
        let mesh_generator = MeshGenerator::new(MeshParams {
            seed: rng.gen(),
            ..Default::default()
        });
        let leaf_mesh = Rc::new(InstancedMesh::new(
            leaf_blade(LEAF_LENGTH, LEAF_WIDTH, LEAF_SEGMENTS),
            config.rendering.instanced,
        ));

        let mut tree = Self {
            branches: flatten(&root),
            growth: start_growth(&config, &root),
            seasons: SeasonCycle::new(config.animation.season_durations()),
            timer: AnimationTimer::new(config.animation.timer_interval()),
            config,
            rng,
            root,
            leaves: SlotMap::with_key(),
            leaf_mesh,
            counter: EntityCounter::new(),
            pending_deletions: Vec::new(),
            mesh_generator,
            bark_dirty: true,
        };
        tree.apply_growth();

        log::info!(
            "tree grown: {} branches, {} generations, instanced leaves: {}",
            tree.branches.len(),
            tree.root.max_generation() + 1,
            tree.leaf_mesh.is_instanced()
        );
        Ok(tree)
    }

    pub fn config(&self) -> &TreeConfig {
        &self.config
    }

    pub fn season(&self) -> Season {
        self.seasons.season()
    }

    /// Fraction of the current season elapsed
    pub fn season_progress(&self) -> f32 {
        self.seasons.progress()
    }

    pub fn growth_progress(&self) -> f32 {
        self.growth.get_progress()
    }

    pub fn branches(&self) -> &[Branch] {
        &self.branches
    }

    pub fn leaves(&self) -> impl Iterator<Item = (LeafKey, &Leaf)> {
        self.leaves.iter()
    }

    pub fn leaf(&self, key: LeafKey) -> Option<&Leaf> {
        self.leaves.get(key)
    }

    pub fn live_leaves(&self) -> usize {
        self.leaves.len()
    }

    /// Leaves currently alive, as tracked by the shared entity counter
    pub fn entity_count(&self) -> u64 {
        self.counter.get()
    }

    /// Instances the shared leaf mesh draws
    pub fn instance_count(&self) -> usize {
        self.leaf_mesh.instance_count()
    }

    pub fn leaf_mesh(&self) -> &InstancedMesh {
        &self.leaf_mesh
    }

    pub fn timer(&self) -> &AnimationTimer<LeafKey> {
        &self.timer
    }

    /// Advance the whole simulation by `dt` seconds
    pub fn update(&mut self, dt: f32) {
        let dt = if dt.is_finite() { dt.max(0.0) } else { 0.0 };

        if !self.growth.is_complete() {
            self.growth.update(dt);
            self.apply_growth();
        }

        if let Some(season) = self.seasons.update(dt, self.growth.is_complete()) {
            self.enter_season(season);
        }

        if self.seasons.season() == Season::Spring {
            self.spawn_leaves();
            self.age_leaves();
        }
        self.follow_branches();

        for _ in 0..self.timer.advance(dt) {
            self.tick();
        }

        self.finish_leaf_fall();
    }

    /// Jump to the next season; finishes growth when leaving the first spring
    pub fn advance_season(&mut self) {
        if self.seasons.season() == Season::Spring {
            if !self.growth.is_complete() {
                self.growth.complete_instantly();
                self.apply_growth();
            }
            self.spawn_leaves();
            self.follow_branches();
        }
        let season = self.seasons.skip();
        self.enter_season(season);
    }

    /// Drop every leaf and grow a new tree from a seedling
    pub fn restart(&mut self) {
        self.timer.clear();
        self.pending_deletions.clear();
        self.leaves.clear();
        self.leaf_mesh.set_instance_count(0);

        self.root = TreeGrowth::new(self.config.growth).grow(&mut self.rng);
        self.branches = flatten(&self.root);
        self.growth = start_growth(&self.config, &self.root);
        self.seasons = SeasonCycle::new(self.config.animation.season_durations());
        self.apply_growth();

        log::info!("tree restarted with {} branches", self.branches.len());
    }

    /// Branch segments at their current grown extent
    pub fn branch_segments(&self) -> Vec<BranchSegment> {
        self.branches
            .iter()
            .filter(|b| b.current_length() > 0.0)
            .map(Branch::segment)
            .collect()
    }

    pub fn bark_mesh(&self) -> Mesh {
        self.mesh_generator.generate(&self.branch_segments())
    }

    /// True once after the branches moved
    pub fn take_bark_dirty(&mut self) -> bool {
        std::mem::take(&mut self.bark_dirty)
    }

    /// Per-leaf instance attributes, [`INSTANCE_FLOATS`] per leaf
    pub fn leaf_instance_data(&self) -> Vec<f32> {
        let mut data = Vec::with_capacity(self.leaves.len() * INSTANCE_FLOATS);
        for leaf in self.leaves.values() {
            data.extend_from_slice(&leaf.instance_data());
        }
        data
    }

    fn apply_growth(&mut self) {
        for i in 0..self.branches.len() {
            let start = match self.branches[i].parent {
                Some(parent) => self.branches[parent].end(),
                None => self.root.start,
            };
            let state = self.growth.get_branch_state(i);
            self.branches[i].apply_growth(start, &state);
        }
        self.bark_dirty = true;
    }

    fn enter_season(&mut self, season: Season) {
        log::info!("season: {} ({} leaves)", season, self.leaves.len());
        match season {
            Season::Spring => {
                for branch in &mut self.branches {
                    branch.leaves_spawned = false;
                }
            }
            Season::Summer => {
                for leaf in self.leaves.values_mut().filter(|l| l.is_attached()) {
                    leaf.set_age(1.0);
                }
            }
            Season::Autumn => {
                for leaf in self.leaves.values_mut().filter(|l| l.is_attached()) {
                    leaf.set_autumn_color(&mut self.rng);
                }
            }
            Season::LeafFall => {}
            Season::Winter => {
                // Anything still hanging drops now
                let attached = self.attached_leaves();
                for key in attached {
                    self.leaves[key].fall_and_die(key, &mut self.timer);
                }
            }
        }
    }

    /// Hang leaves on branches that have started growing and carry none yet
    fn spawn_leaves(&mut self) {
        let params = self.config.leaves;
        let mut spawned = 0;

        for i in 0..self.branches.len() {
            let branch = &self.branches[i];
            if branch.leaves_spawned
                || branch.generation < params.min_generation
                || branch.current_length() < MIN_LEAF_BRANCH_LENGTH
            {
                continue;
            }

            let anchor = branch.anchor();
            for _ in 0..params.per_branch {
                let mut leaf = Leaf::new(
                    Rc::clone(&anchor),
                    Rc::clone(&self.leaf_mesh),
                    i,
                    &self.counter,
                    params,
                    &mut self.rng,
                );
                let spin = self.rng.gen_range(0.0..360.0);
                leaf.rotate(spin, &mut self.rng);
                self.leaves.insert(leaf);
                if self.leaf_mesh.is_instanced() {
                    self.leaf_mesh.add_instances(1);
                }
                spawned += 1;
            }
            self.branches[i].leaves_spawned = true;
        }

        if spawned > 0 {
            log::debug!("spawned {} leaves, {} alive", spawned, self.leaves.len());
        }
    }

    /// Spring leaves grow with their branch and with the season
    fn age_leaves(&mut self) {
        let season = self.seasons.progress();
        for leaf in self.leaves.values_mut().filter(|l| l.is_attached()) {
            let branch = self.growth.get_branch_state(leaf.branch()).local_progress;
            leaf.set_age(branch.min(season));
        }
    }

    fn follow_branches(&mut self) {
        for leaf in self.leaves.values_mut().filter(|l| l.is_attached()) {
            leaf.update_position();
        }
    }

    fn attached_leaves(&self) -> Vec<LeafKey> {
        self.leaves
            .iter()
            .filter(|(_, leaf)| leaf.is_attached())
            .map(|(key, _)| key)
            .collect()
    }

    /// One fall timer tick
    fn tick(&mut self) {
        if self.seasons.season() == Season::LeafFall {
            self.release_leaves(self.config.leaves.released_per_tick);
        }

        let subscribers = self.timer.subscribers().to_vec();
        for key in subscribers {
            let landed = self
                .leaves
                .get_mut(key)
                .map(|leaf| leaf.timeout(&mut self.rng) == FallStep::Landed)
                .unwrap_or(false);
            if landed {
                self.pending_deletions.push(key);
            }
        }

        self.flush_deletions();
    }

    /// Detach up to `n` random hanging leaves
    fn release_leaves(&mut self, n: usize) {
        let attached = self.attached_leaves();
        let chosen: Vec<LeafKey> = attached
            .choose_multiple(&mut self.rng, n)
            .copied()
            .collect();
        for key in chosen {
            self.leaves[key].fall_and_die(key, &mut self.timer);
        }
    }

    fn flush_deletions(&mut self) {
        if self.pending_deletions.is_empty() {
            return;
        }
        for key in std::mem::take(&mut self.pending_deletions) {
            if let Some(mut leaf) = self.leaves.remove(key) {
                if let Some(subscription) = leaf.take_subscription() {
                    self.timer.cancel(subscription);
                }
            }
        }
        log::debug!("{} leaves left", self.leaves.len());
    }

    fn finish_leaf_fall(&mut self) {
        if self.seasons.season() == Season::LeafFall && self.leaves.is_empty() {
            if let Some(season) = self.seasons.end_leaf_fall() {
                self.enter_season(season);
            }
        }
    }
}

fn start_growth(config: &TreeConfig, root: &BranchNode) -> GrowthAnimation {
    let duration = config.animation.growth_duration;
    let mut growth = GrowthAnimation::new(duration);
    growth.init_from_tree(root);
    if duration > 0.0 {
        growth.start();
    } else {
        growth.complete_instantly();
    }
    growth
}

impl std::fmt::Debug for Tree {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Tree")
            .field("season", &self.seasons.season())
            .field("branches", &self.branches.len())
            .field("leaves", &self.leaves.len())
            .field("instances", &self.leaf_mesh.instance_count())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::Color;
    use crate::math::Vec3;

    fn config(instanced: bool) -> TreeConfig {
        crate::logging::init(log::LevelFilter::Debug);
        let mut config = TreeConfig::default();
        config.seed = Some(5);
        config.growth.max_depth = 3;
        config.animation.growth_duration = 2.0;
        config.animation.spring = 2.0;
        config.animation.summer = 1.0;
        config.animation.autumn = 1.0;
        config.animation.winter = 1.0;
        config.leaves.min_generation = 1;
        config.rendering.instanced = instanced;
        config
    }

    fn run(tree: &mut Tree, seconds: f32) {
        let steps = (seconds / 0.016).ceil() as usize;
        for _ in 0..steps {
            tree.update(0.016);
        }
    }

    fn run_until(tree: &mut Tree, season: Season, limit: f32) {
        let mut t = 0.0;
        while tree.season() != season {
            tree.update(0.016);
            t += 0.016;
            assert!(t < limit, "never reached {}", season);
        }
    }

    #[test]
    fn test_new_tree_has_no_leaves() {
        let tree = Tree::new(config(true)).unwrap();
        assert_eq!(tree.season(), Season::Spring);
        assert_eq!(tree.live_leaves(), 0);
        assert_eq!(tree.entity_count(), 0);
        assert!(tree.branches().len() > 1);
    }

    #[test]
    fn test_invalid_config_rejected() {
        let mut bad = config(true);
        bad.leaves.fall_step = 0.0;
        assert!(Tree::new(bad).is_err());
    }

    #[test]
    fn test_spring_grows_leaves() {
        let mut tree = Tree::new(config(true)).unwrap();
        run(&mut tree, 2.5);
        assert!(tree.live_leaves() > 0);
        assert_eq!(tree.entity_count(), tree.live_leaves() as u64);
        assert_eq!(tree.instance_count(), tree.live_leaves());
        assert!(tree
            .leaves()
            .all(|(_, l)| l.color() == Color::DARK_GREEN && l.is_attached()));
    }

    #[test]
    fn test_leaves_follow_growing_branches() {
        let mut tree = Tree::new(config(true)).unwrap();
        run(&mut tree, 1.0);
        for (_, leaf) in tree.leaves() {
            let end = tree.branches()[leaf.branch()].end();
            assert_eq!(leaf.transform().translation, end);
        }
    }

    #[test]
    fn test_summer_leaves_full_size() {
        let mut tree = Tree::new(config(true)).unwrap();
        run_until(&mut tree, Season::Summer, 20.0);
        let base = tree.config().leaves.base_scale;
        assert!(tree.live_leaves() > 0);
        for (_, leaf) in tree.leaves() {
            assert_eq!(leaf.state(), LeafState::Mature);
            assert!((leaf.transform().scale - base).abs() < 1e-6);
        }
    }

    #[test]
    fn test_autumn_recolors() {
        let mut tree = Tree::new(config(true)).unwrap();
        run_until(&mut tree, Season::Autumn, 20.0);
        for (_, leaf) in tree.leaves() {
            let c = leaf.color();
            assert_eq!((c.r, c.b), (255, 0));
        }
    }

    fn full_year(instanced: bool) {
        let mut tree = Tree::new(config(instanced)).unwrap();
        run_until(&mut tree, Season::LeafFall, 20.0);
        let grown = tree.live_leaves();
        assert!(grown > 0);

        let mut fell = false;
        let mut t = 0.0;
        while tree.season() == Season::LeafFall {
            tree.update(0.016);
            t += 0.016;
            assert!(t < 120.0, "leaf fall never finished");
            assert_eq!(tree.entity_count(), tree.live_leaves() as u64);
            if instanced {
                assert_eq!(tree.instance_count(), tree.live_leaves());
            } else {
                assert_eq!(tree.instance_count(), 0);
            }
            fell |= tree.leaves().any(|(_, l)| l.state() == LeafState::Falling);
        }

        assert!(fell);
        assert_eq!(tree.season(), Season::Winter);
        assert_eq!(tree.live_leaves(), 0);
        assert_eq!(tree.entity_count(), 0);
        assert!(tree.timer().subscribers().is_empty());

        run_until(&mut tree, Season::Spring, 20.0);
        run(&mut tree, 0.5);
        assert_eq!(tree.live_leaves(), grown);
    }

    #[test]
    fn test_full_year_instanced() {
        full_year(true);
    }

    #[test]
    fn test_full_year_per_leaf() {
        full_year(false);
    }

    #[test]
    fn test_falling_leaves_detach_and_descend() {
        let mut tree = Tree::new(config(true)).unwrap();
        run_until(&mut tree, Season::LeafFall, 20.0);
        run(&mut tree, 0.2);

        let falling: Vec<(LeafKey, f32)> = tree
            .leaves()
            .filter(|(_, l)| l.state() == LeafState::Falling)
            .map(|(k, l)| (k, l.anchor().end().y))
            .collect();
        assert!(!falling.is_empty());

        run(&mut tree, 0.2);
        for (key, y) in falling {
            if let Some(leaf) = tree.leaf(key) {
                assert!(leaf.anchor().is_detached());
                assert!(leaf.anchor().end().y < y);
            }
        }
    }

    #[test]
    fn test_advance_season_skips() {
        let mut tree = Tree::new(config(true)).unwrap();
        tree.advance_season();
        assert_eq!(tree.season(), Season::Summer);
        assert!((tree.growth_progress() - 1.0).abs() < 1e-6);
        assert!(tree.live_leaves() > 0);

        tree.advance_season();
        tree.advance_season();
        assert_eq!(tree.season(), Season::LeafFall);
        tree.advance_season();
        assert_eq!(tree.season(), Season::Winter);
        assert!(tree.leaves().all(|(_, l)| l.state() == LeafState::Falling));

        run(&mut tree, 30.0);
        assert_eq!(tree.entity_count(), tree.live_leaves() as u64);
    }

    #[test]
    fn test_restart_drops_leaves() {
        let mut tree = Tree::new(config(true)).unwrap();
        tree.advance_season();
        assert!(tree.entity_count() > 0);
        tree.restart();
        assert_eq!(tree.season(), Season::Spring);
        assert_eq!(tree.entity_count(), 0);
        assert_eq!(tree.instance_count(), 0);
        assert!(tree.growth_progress() < 1e-6);
    }

    #[test]
    fn test_same_seed_same_tree() {
        let a = Tree::new(config(true)).unwrap();
        let b = Tree::new(config(true)).unwrap();
        let ends = |t: &Tree| -> Vec<Vec3> { t.root.iter_preorder().map(|n| n.end).collect() };
        assert_eq!(ends(&a), ends(&b));
    }

    #[test]
    fn test_instance_data_per_leaf() {
        let mut tree = Tree::new(config(true)).unwrap();
        tree.advance_season();
        assert_eq!(tree.leaf_instance_data().len(), tree.live_leaves() * INSTANCE_FLOATS);
    }

    #[test]
    fn test_non_finite_dt_is_ignored() {
        let mut tree = Tree::new(config(true)).unwrap();
        tree.update(f32::INFINITY);
        tree.update(f32::NAN);
        assert_eq!(tree.season(), Season::Spring);
        assert_eq!(tree.growth_progress(), 0.0);
        assert_eq!(tree.season_progress(), 0.0);

        tree.update(0.5);
        assert!(tree.growth_progress() > 0.0);
        assert!(tree.season_progress() > 0.0);
    }

    #[test]
    fn test_bark_dirty_while_growing() {
        let mut tree = Tree::new(config(true)).unwrap();
        assert!(tree.take_bark_dirty());
        assert!(!tree.take_bark_dirty());
        tree.update(0.5);
        assert!(tree.take_bark_dirty());
        assert!(!tree.bark_mesh().is_empty());
    }
}
