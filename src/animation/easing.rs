//! Easing curves for growth

/// Easing function types
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Easing {
    Linear,
    #[default]
    EaseInOut,
    EaseIn,
    EaseOut,
    /// Slow start, steady middle, gentle finish
    Organic,
}

/// Apply `easing` to `t`, clamped to [0, 1]
pub fn ease(t: f32, easing: Easing) -> f32 {
    let t = t.clamp(0.0, 1.0);

    match easing {
        Easing::Linear => t,
        Easing::EaseIn => t * t,
        Easing::EaseOut => 1.0 - (1.0 - t).powi(2),
        Easing::EaseInOut => {
            if t < 0.5 {
                2.0 * t * t
            } else {
                1.0 - (-2.0 * t + 2.0).powi(2) / 2.0
            }
        }
        Easing::Organic => {
            let t2 = t * t;
            let t3 = t2 * t;
            (3.0 * t2 - 2.0 * t3) * (1.0 + 0.3 * (1.0 - t).sin())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL: [Easing; 5] = [
        Easing::Linear,
        Easing::EaseIn,
        Easing::EaseOut,
        Easing::EaseInOut,
        Easing::Organic,
    ];

    #[test]
    fn test_ease_bounds() {
        for easing in ALL {
            assert!(ease(0.0, easing).abs() < 0.01, "{:?} should start near 0", easing);
            assert!((ease(1.0, easing) - 1.0).abs() < 0.1, "{:?} should end near 1", easing);
        }
    }

    #[test]
    fn test_ease_monotonic() {
        for easing in [Easing::Linear, Easing::EaseIn, Easing::EaseOut, Easing::EaseInOut] {
            let mut prev = 0.0;
            for i in 0..=100 {
                let v = ease(i as f32 / 100.0, easing);
                assert!(v >= prev - 0.001, "{:?} should be monotonic", easing);
                prev = v;
            }
        }
    }

    #[test]
    fn test_ease_clamps_input() {
        assert_eq!(ease(-0.5, Easing::Linear), 0.0);
        assert_eq!(ease(1.5, Easing::Linear), 1.0);
    }
}
