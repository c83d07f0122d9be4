/// Resource bounds applied while rolling and analyzing.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct Limits {
    /// How many times a single die may chain explosions.
    pub max_explosion_depth: usize,
    /// How many draws a single evaluation may make, rerolls and explosions included.
    pub max_rolls: usize,
    /// How many distinct pools the exact keep/drop analysis may enumerate.
    pub max_outcomes: u64,
}

impl Limits {
    pub const DEFAULT_MAX_EXPLOSION_DEPTH: usize = 100;
    pub const DEFAULT_MAX_ROLLS: usize = 10_000;
    pub const DEFAULT_MAX_OUTCOMES: u64 = 1_000_000;

    pub fn with_max_explosion_depth(mut self, depth: usize) -> Self {
        self.max_explosion_depth = depth;
        self
    }

    pub fn with_max_rolls(mut self, rolls: usize) -> Self {
        self.max_rolls = rolls;
        self
    }

    pub fn with_max_outcomes(mut self, outcomes: u64) -> Self {
        self.max_outcomes = outcomes;
        self
    }
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            max_explosion_depth: Self::DEFAULT_MAX_EXPLOSION_DEPTH,
            max_rolls: Self::DEFAULT_MAX_ROLLS,
            max_outcomes: Self::DEFAULT_MAX_OUTCOMES,
        }
    }
}
