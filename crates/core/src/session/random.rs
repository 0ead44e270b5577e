use rand::{rngs::StdRng, Rng, SeedableRng};

/// Source of uniformly distributed indices used when drawing questions.
pub trait RandomSource {
    /// Return an index in `0..upper`. Callers never pass zero.
    fn index_below(&mut self, upper: usize) -> usize;
}

/// Production source backed by an OS-seeded [`StdRng`].
#[derive(Debug, Clone)]
pub struct ThreadRandom {
    rng: StdRng,
}

impl ThreadRandom {
    pub fn new() -> Self {
        Self {
            rng: StdRng::from_entropy(),
        }
    }

    /// Deterministic source for reproducible runs.
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl Default for ThreadRandom {
    fn default() -> Self {
        Self::new()
    }
}

impl RandomSource for ThreadRandom {
    fn index_below(&mut self, upper: usize) -> usize {
        self.rng.gen_range(0..upper)
    }
}

/// Replays a fixed list of picks, wrapping each into range.
///
/// Cycles when the list runs out; an empty list always picks zero.
#[derive(Debug, Clone, Default)]
pub struct ScriptedRandom {
    picks: Vec<usize>,
    cursor: usize,
}

impl ScriptedRandom {
    pub fn new(picks: impl Into<Vec<usize>>) -> Self {
        Self {
            picks: picks.into(),
            cursor: 0,
        }
    }
}

impl RandomSource for ScriptedRandom {
    fn index_below(&mut self, upper: usize) -> usize {
        if self.picks.is_empty() {
            return 0;
        }
        let pick = self.picks[self.cursor % self.picks.len()];
        self.cursor += 1;
        pick % upper
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scripted_picks_wrap_into_range() {
        let mut source = ScriptedRandom::new(vec![0, 7, 2]);
        assert_eq!(source.index_below(5), 0);
        assert_eq!(source.index_below(5), 2);
        assert_eq!(source.index_below(1), 0);
        assert_eq!(source.index_below(4), 0);
    }

    #[test]
    fn seeded_source_stays_in_range() {
        let mut source = ThreadRandom::seeded(42);
        for upper in 1..50 {
            assert!(source.index_below(upper) < upper);
        }
    }
}
