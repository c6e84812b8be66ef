use ahash::AHashMap;
use alembic_chemistry::ReactionId;

/// Fractional reaction rate carried over between ticks, per rule
///
/// Entries are created lazily and removed once they return to exactly zero.
#[derive(Clone, Debug, Default)]
pub struct ReactionProgress {
    entries: AHashMap<ReactionId, f32>,
}

impl ReactionProgress {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, reaction: ReactionId) -> f32 {
        self.entries.get(&reaction).copied().unwrap_or(0.0)
    }

    pub fn set(&mut self, reaction: ReactionId, progress: f32) {
        if progress == 0.0 || !progress.is_finite() {
            self.entries.remove(&reaction);
        } else {
            self.entries.insert(reaction, progress);
        }
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (ReactionId, f32)> + '_ {
        self.entries.iter().map(|(&id, &progress)| (id, progress))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_entry_reads_zero() {
        let progress = ReactionProgress::new();
        assert_eq!(progress.get(ReactionId(3)), 0.0);
        assert!(progress.is_empty());
    }

    #[test]
    fn test_zero_removes_entry() {
        let mut progress = ReactionProgress::new();
        progress.set(ReactionId(1), 0.25);
        assert_eq!(progress.get(ReactionId(1)), 0.25);
        assert_eq!(progress.len(), 1);

        progress.set(ReactionId(1), 0.0);
        assert!(progress.is_empty());
    }
}
