//! Animation: growth easing, the fall timer and the season cycle
//!
//! Growth runs per frame on the render delta; leaf fall runs on the fixed
//! interval timer so every falling leaf moves in lockstep.

mod easing;
mod growth_animation;
mod season;
mod timer;

pub use easing::{ease, Easing};
pub use growth_animation::{BranchAnimState, GrowthAnimation};
pub use season::{Season, SeasonCycle, SeasonDurations};
pub use timer::{AnimationTimer, Subscription};
