//! Yearly cycle the tree runs through

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Season {
    /// Tree and leaves grow in
    Spring,
    Summer,
    /// Leaves turn yellow to red
    Autumn,
    /// Leaves detach and fall until none are left
    LeafFall,
    /// Bare branches
    Winter,
}

impl Season {
    pub fn next(self) -> Season {
        match self {
            Season::Spring => Season::Summer,
            Season::Summer => Season::Autumn,
            Season::Autumn => Season::LeafFall,
            Season::LeafFall => Season::Winter,
            Season::Winter => Season::Spring,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Season::Spring => "spring",
            Season::Summer => "summer",
            Season::Autumn => "autumn",
            Season::LeafFall => "leaf-fall",
            Season::Winter => "winter",
        }
    }
}

impl fmt::Display for Season {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Seconds spent in each timed season
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SeasonDurations {
    pub spring: f32,
    pub summer: f32,
    pub autumn: f32,
    pub winter: f32,
}

impl Default for SeasonDurations {
    fn default() -> Self {
        Self {
            spring: 8.0,
            summer: 6.0,
            autumn: 5.0,
            winter: 4.0,
        }
    }
}

/// Season state machine.
///
/// Spring also waits for the tree to finish growing; leaf fall has no
/// duration and only ends through [`SeasonCycle::end_leaf_fall`].
#[derive(Debug, Clone)]
pub struct SeasonCycle {
    season: Season,
    elapsed: f32,
    durations: SeasonDurations,
}

impl SeasonCycle {
    pub fn new(durations: SeasonDurations) -> Self {
        Self {
            season: Season::Spring,
            elapsed: 0.0,
            durations,
        }
    }

    pub fn season(&self) -> Season {
        self.season
    }

    pub fn elapsed(&self) -> f32 {
        self.elapsed
    }

    fn duration(&self) -> Option<f32> {
        match self.season {
            Season::Spring => Some(self.durations.spring),
            Season::Summer => Some(self.durations.summer),
            Season::Autumn => Some(self.durations.autumn),
            Season::LeafFall => None,
            Season::Winter => Some(self.durations.winter),
        }
    }

    /// Fraction of the current timed season elapsed; 1.0 during leaf fall
    pub fn progress(&self) -> f32 {
        match self.duration() {
            Some(d) if d > 0.0 => (self.elapsed / d).min(1.0),
            _ => 1.0,
        }
    }

    /// Advance by `dt`; returns the new season on a transition
    pub fn update(&mut self, dt: f32, growth_complete: bool) -> Option<Season> {
        self.elapsed += dt;
        let duration = self.duration()?;
        if self.elapsed < duration {
            return None;
        }
        if self.season == Season::Spring && !growth_complete {
            return None;
        }
        Some(self.enter(self.season.next()))
    }

    /// Leave leaf fall for winter; no-op in any other season
    pub fn end_leaf_fall(&mut self) -> Option<Season> {
        (self.season == Season::LeafFall).then(|| self.enter(Season::Winter))
    }

    /// Skip straight to the next season
    pub fn skip(&mut self) -> Season {
        self.enter(self.season.next())
    }

    fn enter(&mut self, season: Season) -> Season {
        self.season = season;
        self.elapsed = 0.0;
        season
    }
}
