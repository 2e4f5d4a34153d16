//! A single leaf: seasonal colour, growth scale, and the fall-and-die animation
//!
//! A leaf hangs from the end of its branch, reading the branch's start/end
//! through a shared [`BranchAnchor`]. Once told to fall it switches to an owned
//! [`FallVector`], subscribes to the animation timer, and drifts down one step
//! per tick while spinning about the fall direction. When it reaches the
//! ground it reports [`FallStep::Landed`] exactly once; the owner then removes
//! it, which drops its entity guard.

use std::rc::Rc;
use rand::Rng;
use crate::animation::{AnimationTimer, Subscription};
use crate::color::{autumn_color, Color};
use crate::config::LeafParams;
use crate::math::{Quat, Vec3};
use crate::scene::{EntityCounter, EntityGuard, InstancedMesh, PhongMaterial, Transform};
use super::anchor::{BranchAnchor, FallVector, LeafAnchor};

slotmap::new_key_type! {
    /// Stable handle of a leaf inside a tree
    pub struct LeafKey;
}

/// Floats per leaf in the instance buffer: model matrix then RGB
pub const INSTANCE_FLOATS: usize = 19;

/// Rest normal of the leaf geometry
const LEAF_NORMAL: Vec3 = Vec3::UP;
/// Tilt axis used when the branch is parallel to the leaf normal
const FALLBACK_AXIS: Vec3 = Vec3::RIGHT;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LeafState {
    /// Attached, still scaling in
    Growing,
    /// Attached, full size
    Mature,
    /// Detached and subscribed to the timer
    Falling,
    /// Landed; waiting to be dropped by its owner
    Removed,
}

/// Outcome of one timer tick delivered to a leaf
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FallStep {
    /// Moved one step down
    Falling,
    /// Reached the ground on this tick; remove the leaf
    Landed,
    /// Not falling, nothing happened
    Idle,
}

/// Axis the leaf tilts around so its normal leans towards `branch`
pub fn rotation_axis(branch: Vec3) -> Vec3 {
    let axis = branch.cross(&LEAF_NORMAL);
    if axis.is_null() {
        FALLBACK_AXIS
    } else {
        axis.normalize()
    }
}

/// Orientation for a leaf on the segment `start -> end`.
///
/// Tilts by the angle between the segment and the leaf normal plus `jitter`
/// degrees, then spins `spin` degrees around the segment.
pub fn leaf_rotation(start: Vec3, end: Vec3, spin: f32, jitter: f32) -> Quat {
    let branch = (end - start).normalize();
    let axis = rotation_axis(branch);
    let lean = branch.dot(&LEAF_NORMAL).clamp(-1.0, 1.0).acos().to_degrees() + jitter;
    Quat::from_axes_and_angles(axis, lean, branch, spin)
}

#[derive(Debug)]
pub struct Leaf {
    mesh: Rc<InstancedMesh>,
    material: PhongMaterial,
    transform: Transform,
    anchor: LeafAnchor,
    fall_angle: f32,
    state: LeafState,
    subscription: Option<Subscription<LeafKey>>,
    branch: usize,
    params: LeafParams,
    _entity: EntityGuard,
}

impl Leaf {
    /// Hang a new dark green leaf at the end of `anchor`.
    ///
    /// Registers with `counter` for as long as the leaf lives. The leaf
    /// starts at age zero; the caller orients it with [`Leaf::rotate`].
    pub fn new<R: Rng + ?Sized>(
        anchor: Rc<BranchAnchor>,
        mesh: Rc<InstancedMesh>,
        branch: usize,
        counter: &EntityCounter,
        params: LeafParams,
        rng: &mut R,
    ) -> Self {
        let mut transform = Transform::from_translation(anchor.end());
        transform.set_scale(0.0);

        Self {
            mesh,
            material: PhongMaterial::with_diffuse(Color::DARK_GREEN),
            transform,
            anchor: LeafAnchor::Branch(anchor),
            fall_angle: rng.gen_range(0.0..360.0),
            state: LeafState::Growing,
            subscription: None,
            branch,
            params,
            _entity: counter.register(),
        }
    }

    pub fn state(&self) -> LeafState {
        self.state
    }

    /// Still hanging from its branch
    pub fn is_attached(&self) -> bool {
        matches!(self.state, LeafState::Growing | LeafState::Mature)
    }

    pub fn branch(&self) -> usize {
        self.branch
    }

    pub fn transform(&self) -> &Transform {
        &self.transform
    }

    pub fn material(&self) -> &PhongMaterial {
        &self.material
    }

    pub fn anchor(&self) -> &LeafAnchor {
        &self.anchor
    }

    /// Current spin around the fall direction (degrees)
    pub fn fall_angle(&self) -> f32 {
        self.fall_angle
    }

    pub fn color(&self) -> Color {
        self.material.diffuse
    }

    pub fn set_color(&mut self, color: Color) {
        self.material.set_diffuse(color);
    }

    /// Recolour from the autumn palette
    pub fn set_autumn_color<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        self.set_color(autumn_color(rng));
    }

    /// Scale by `age` clamped to `[0, 1]`; only attached leaves change state
    pub fn set_age(&mut self, age: f32) {
        let age = age.clamp(0.0, 1.0);
        self.transform.set_scale(self.params.base_scale * age);
        if self.is_attached() {
            self.state = if age >= 1.0 {
                LeafState::Mature
            } else {
                LeafState::Growing
            };
        }
    }

    /// Move to the anchor's current end point
    pub fn update_position(&mut self) {
        self.transform.set_translation(self.anchor.end());
    }

    /// Orient along the anchor with `angle` degrees of spin plus a random lean
    pub fn rotate<R: Rng + ?Sized>(&mut self, angle: f32, rng: &mut R) {
        let jitter = if self.params.angle_jitter > 0.0 {
            rng.gen_range(0.0..self.params.angle_jitter)
        } else {
            0.0
        };
        let rotation = leaf_rotation(self.anchor.start(), self.anchor.end(), angle, jitter);
        self.transform.set_rotation(rotation);
    }

    /// Detach from the branch and start falling on `timer` ticks.
    ///
    /// Does nothing when the leaf is already falling or removed.
    pub fn fall_and_die(&mut self, key: LeafKey, timer: &mut AnimationTimer<LeafKey>) {
        if !self.is_attached() {
            return;
        }
        let end = self.anchor.end();
        self.anchor = LeafAnchor::Fall(FallVector {
            start: end - Vec3::new(0.0, self.params.fall_anchor_offset, 0.0),
            end,
        });
        self.subscription = Some(timer.subscribe(key));
        self.state = LeafState::Falling;
    }

    /// Advance the fall by one timer tick
    pub fn timeout<R: Rng + ?Sized>(&mut self, rng: &mut R) -> FallStep {
        let fall = match (&self.anchor, self.state) {
            (LeafAnchor::Fall(fall), LeafState::Falling) => *fall,
            _ => return FallStep::Idle,
        };

        if fall.end.y <= 0.0 {
            self.state = LeafState::Removed;
            if self.mesh.is_instanced() {
                self.mesh.remove_instance();
            }
            return FallStep::Landed;
        }

        self.rotate(self.fall_angle, rng);
        let end = fall.end - Vec3::new(0.0, self.params.fall_step, 0.0);
        self.anchor = LeafAnchor::Fall(FallVector {
            start: end - Vec3::new(0.0, self.params.fall_anchor_offset, 0.0),
            end,
        });
        self.fall_angle += self.params.spin_step;
        self.update_position();
        FallStep::Falling
    }

    /// Hand back the timer subscription so the owner can cancel it
    pub fn take_subscription(&mut self) -> Option<Subscription<LeafKey>> {
        self.subscription.take()
    }

    /// Model matrix followed by the diffuse colour
    pub fn instance_data(&self) -> [f32; INSTANCE_FLOATS] {
        let mut out = [0.0; INSTANCE_FLOATS];
        out[..16].copy_from_slice(self.transform.matrix().as_slice());
        out[16..].copy_from_slice(&self.color().to_rgb_f32());
        out
    }
}
