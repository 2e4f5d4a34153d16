//! Periodic animation clock with tick subscriptions

/// Handle returned by [`AnimationTimer::subscribe`]; pass it back to `cancel`
#[derive(Debug, PartialEq, Eq)]
#[must_use = "dropping the handle leaves the key subscribed until cancelled by key"]
pub struct Subscription<K> {
    key: K,
}

impl<K: Copy> Subscription<K> {
    pub fn key(&self) -> K {
        self.key
    }
}

/// Turns frame deltas into fixed-interval ticks delivered to subscribers
#[derive(Debug, Clone)]
pub struct AnimationTimer<K> {
    interval: f32,
    accumulator: f32,
    subscribers: Vec<K>,
}

impl<K: Copy + PartialEq> AnimationTimer<K> {
    /// `interval` in seconds; must be positive
    pub fn new(interval: f32) -> Self {
        debug_assert!(interval > 0.0);
        Self {
            interval,
            accumulator: 0.0,
            subscribers: Vec::new(),
        }
    }

    pub fn interval(&self) -> f32 {
        self.interval
    }

    /// Add `dt` seconds and return how many whole ticks elapsed
    pub fn advance(&mut self, dt: f32) -> u32 {
        if dt.is_finite() {
            self.accumulator += dt.max(0.0);
        }
        let ticks = (self.accumulator / self.interval).floor();
        self.accumulator -= ticks * self.interval;
        ticks as u32
    }

    /// Subscribe `key` to ticks. Subscribing twice keeps a single entry.
    pub fn subscribe(&mut self, key: K) -> Subscription<K> {
        if !self.subscribers.contains(&key) {
            self.subscribers.push(key);
        }
        Subscription { key }
    }

    pub fn cancel(&mut self, subscription: Subscription<K>) {
        self.subscribers.retain(|k| *k != subscription.key);
    }

    pub fn is_subscribed(&self, key: K) -> bool {
        self.subscribers.contains(&key)
    }

    /// Subscribers in delivery (subscription) order
    pub fn subscribers(&self) -> &[K] {
        &self.subscribers
    }

    pub fn clear(&mut self) {
        self.subscribers.clear();
        self.accumulator = 0.0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_advance_counts_whole_ticks() {
        let mut timer: AnimationTimer<u32> = AnimationTimer::new(0.05);
        assert_eq!(timer.advance(0.02), 0);
        assert_eq!(timer.advance(0.04), 1);
        assert_eq!(timer.advance(0.26), 5);
        assert_eq!(timer.advance(-1.0), 0);
    }

    #[test]
    fn test_non_finite_dt_adds_nothing() {
        let mut timer: AnimationTimer<u32> = AnimationTimer::new(0.05);
        assert_eq!(timer.advance(f32::INFINITY), 0);
        assert_eq!(timer.advance(f32::NAN), 0);
        assert_eq!(timer.advance(0.06), 1);
    }

    #[test]
    fn test_subscribe_and_cancel() {
        let mut timer = AnimationTimer::new(0.1);
        let a = timer.subscribe(1u32);
        let _b = timer.subscribe(2u32);
        let again = timer.subscribe(1u32);
        assert_eq!(timer.subscribers(), &[1, 2]);
        assert_eq!(again.key(), 1);

        timer.cancel(a);
        assert!(!timer.is_subscribed(1));
        assert!(timer.is_subscribed(2));
    }

    #[test]
    fn test_clear() {
        let mut timer = AnimationTimer::new(0.1);
        let _ = timer.subscribe(5u32);
        timer.advance(0.05);
        timer.clear();
        assert!(timer.subscribers().is_empty());
        assert_eq!(timer.advance(0.06), 0);
    }
}
