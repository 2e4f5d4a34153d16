//! Engine configuration, read from YAML
//!
//! Every field has a default, so an empty document is a valid config:
//!
//! ```yaml
//! seed: 7
//! leaves:
//!   per_branch: 4
//! animation:
//!   timer_interval_ms: 40
//! rendering:
//!   instanced: false
//! ```

use serde::Deserialize;
use crate::animation::SeasonDurations;
use crate::error::{Result, TreeError};
use crate::growth::GrowthParams;

/// Below this a fall step vanishes in f32 rounding at tree heights
pub const MIN_FALL_STEP: f32 = 1e-4;

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct TreeConfig {
    /// Fixed RNG seed; entropy when absent
    pub seed: Option<u64>,
    pub growth: GrowthParams,
    pub leaves: LeafParams,
    pub animation: AnimationParams,
    pub rendering: RenderParams,
}

/// Leaf appearance and fall motion
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct LeafParams {
    /// Transform scale of a fully grown leaf
    pub base_scale: f32,
    /// Upper bound of the random lean added on each rotate (degrees)
    pub angle_jitter: f32,
    /// Leaves hung at the end of each eligible branch
    pub per_branch: usize,
    /// Youngest generation that carries leaves
    pub min_generation: usize,
    /// Height lost per timer tick while falling
    pub fall_step: f32,
    /// Spin added per timer tick while falling (degrees)
    pub spin_step: f32,
    /// Distance from the fall end point down to the fall start point
    pub fall_anchor_offset: f32,
    /// Leaves detached per timer tick during leaf fall
    pub released_per_tick: usize,
}

impl Default for LeafParams {
    fn default() -> Self {
        Self {
            base_scale: 0.35,
            angle_jitter: 20.0,
            per_branch: 3,
            min_generation: 2,
            fall_step: 0.05,
            spin_step: 15.0,
            fall_anchor_offset: 0.5,
            released_per_tick: 2,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct AnimationParams {
    /// Fall timer period
    pub timer_interval_ms: u32,
    /// First-year growth from seedling to full tree (seconds)
    pub growth_duration: f32,
    pub spring: f32,
    pub summer: f32,
    pub autumn: f32,
    pub winter: f32,
}

impl Default for AnimationParams {
    fn default() -> Self {
        let seasons = SeasonDurations::default();
        Self {
            timer_interval_ms: 50,
            growth_duration: 10.0,
            spring: seasons.spring,
            summer: seasons.summer,
            autumn: seasons.autumn,
            winter: seasons.winter,
        }
    }
}

impl AnimationParams {
    pub fn timer_interval(&self) -> f32 {
        self.timer_interval_ms as f32 / 1000.0
    }

    pub fn season_durations(&self) -> SeasonDurations {
        SeasonDurations {
            spring: self.spring,
            summer: self.summer,
            autumn: self.autumn,
            winter: self.winter,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct RenderParams {
    /// Draw all leaves with one instanced call instead of one call per leaf
    pub instanced: bool,
}

impl Default for RenderParams {
    fn default() -> Self {
        Self { instanced: true }
    }
}

impl TreeConfig {
    /// Parse and validate
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let config: TreeConfig = if yaml.trim().is_empty() {
            TreeConfig::default()
        } else {
            serde_yaml::from_str(yaml)?
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        let invalid = |msg: &str| Err(TreeError::InvalidConfig(msg.to_string()));

        if self.animation.timer_interval_ms == 0 {
            return invalid("animation.timer_interval_ms must be positive");
        }
        let a = &self.animation;
        if [a.growth_duration, a.spring, a.summer, a.autumn, a.winter]
            .iter()
            .any(|d| !d.is_finite() || *d < 0.0)
        {
            return invalid("animation durations must be finite and non-negative");
        }
        let l = &self.leaves;
        if [l.base_scale, l.angle_jitter, l.fall_step, l.spin_step, l.fall_anchor_offset]
            .iter()
            .any(|v| !v.is_finite())
        {
            return invalid("leaf parameters must be finite");
        }
        if l.fall_step < MIN_FALL_STEP {
            return invalid("leaves.fall_step must be at least 1e-4");
        }
        if self.leaves.released_per_tick == 0 {
            return invalid("leaves.released_per_tick must be at least 1");
        }
        if self.leaves.base_scale <= 0.0 {
            return invalid("leaves.base_scale must be positive");
        }
        if self.growth.min_children > self.growth.max_children {
            return invalid("growth.min_children exceeds growth.max_children");
        }
        if self.growth.max_depth > 10 {
            return invalid("growth.max_depth above 10 is too large to render");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_yaml_is_default() {
        let config = TreeConfig::from_yaml("").unwrap();
        assert_eq!(config, TreeConfig::default());
        assert!(config.rendering.instanced);
        assert_eq!(config.leaves.fall_step, 0.05);
    }

    #[test]
    fn test_partial_override() {
        let yaml = r#"
seed: 7
leaves:
  per_branch: 5
animation:
  timer_interval_ms: 40
rendering:
  instanced: false
"#;
        let config = TreeConfig::from_yaml(yaml).unwrap();
        assert_eq!(config.seed, Some(7));
        assert_eq!(config.leaves.per_branch, 5);
        assert_eq!(config.leaves.spin_step, 15.0);
        assert!((config.animation.timer_interval() - 0.04).abs() < 1e-6);
        assert!(!config.rendering.instanced);
        assert_eq!(config.growth, GrowthParams::default());
    }

    #[test]
    fn test_parse_error() {
        let err = TreeConfig::from_yaml("leaves: [1, 2").unwrap_err();
        assert!(matches!(err, TreeError::ConfigParse(_)));
    }

    #[test]
    fn test_zero_interval_rejected() {
        let err = TreeConfig::from_yaml("animation:\n  timer_interval_ms: 0\n").unwrap_err();
        assert!(matches!(err, TreeError::InvalidConfig(_)));
    }

    #[test]
    fn test_non_finite_fall_step_rejected() {
        for step in [".nan", ".inf", "-.inf"] {
            let yaml = format!("leaves:\n  fall_step: {}\n", step);
            let err = TreeConfig::from_yaml(&yaml).unwrap_err();
            assert!(matches!(err, TreeError::InvalidConfig(_)), "{} accepted", step);
        }
    }

    #[test]
    fn test_tiny_fall_step_rejected() {
        let err = TreeConfig::from_yaml("leaves:\n  fall_step: 1.0e-9\n").unwrap_err();
        assert!(matches!(err, TreeError::InvalidConfig(_)));
        assert!(TreeConfig::from_yaml("leaves:\n  fall_step: 0.001\n").is_ok());
    }

    #[test]
    fn test_non_finite_leaf_params_rejected() {
        for field in ["base_scale", "angle_jitter", "spin_step", "fall_anchor_offset"] {
            let yaml = format!("leaves:\n  {}: .nan\n", field);
            assert!(TreeConfig::from_yaml(&yaml).is_err(), "{} accepted NaN", field);
        }
    }

    #[test]
    fn test_zero_release_rate_rejected() {
        let err = TreeConfig::from_yaml("leaves:\n  released_per_tick: 0\n").unwrap_err();
        assert!(matches!(err, TreeError::InvalidConfig(_)));
    }

    #[test]
    fn test_child_bounds_rejected() {
        let yaml = "growth:\n  min_children: 4\n  max_children: 2\n";
        assert!(matches!(TreeConfig::from_yaml(yaml), Err(TreeError::InvalidConfig(_))));
    }

    #[test]
    fn test_season_durations() {
        let config = TreeConfig::default();
        assert_eq!(config.animation.season_durations(), SeasonDurations::default());
    }
}
