//! Simulation statistics collection trait

use alembic_chemistry::Amount;

/// Trait for collecting simulation statistics
///
/// Lets the systems report activity without depending on whatever the
/// embedding application does with it.
pub trait SimStats {
    /// Record that a reaction ran for at least one whole unit
    fn record_reaction(&mut self);

    /// Record a directed move of `amount` between two vessels
    fn record_transfer(&mut self, amount: Amount);

    /// Record a bidirectional exchange of `amount` between two vessels
    fn record_diffusion(&mut self, amount: Amount);
}

/// A no-op implementation for when stats collection is not needed
#[derive(Default)]
pub struct NoopStats;

impl SimStats for NoopStats {
    fn record_reaction(&mut self) {}
    fn record_transfer(&mut self, _amount: Amount) {}
    fn record_diffusion(&mut self, _amount: Amount) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_noop_stats_all_methods() {
        let mut stats = NoopStats;
        for _ in 0..100 {
            stats.record_reaction();
            stats.record_transfer(10);
            stats.record_diffusion(10);
        }
    }

    /// A simple implementation of SimStats for testing the trait
    #[derive(Default)]
    struct CountingStats {
        reactions: u32,
        transferred: Amount,
        diffused: Amount,
    }

    impl SimStats for CountingStats {
        fn record_reaction(&mut self) {
            self.reactions += 1;
        }

        fn record_transfer(&mut self, amount: Amount) {
            self.transferred += amount;
        }

        fn record_diffusion(&mut self, amount: Amount) {
            self.diffused += amount;
        }
    }

    #[test]
    fn test_counting_stats_implementation() {
        let mut stats = CountingStats::default();
        let dyn_stats: &mut dyn SimStats = &mut stats;

        dyn_stats.record_reaction();
        dyn_stats.record_reaction();
        dyn_stats.record_transfer(250);
        dyn_stats.record_diffusion(40);
        dyn_stats.record_diffusion(2);

        assert_eq!(stats.reactions, 2);
        assert_eq!(stats.transferred, 250);
        assert_eq!(stats.diffused, 42);
    }
}
