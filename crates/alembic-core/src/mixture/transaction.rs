//! Scoped all-or-nothing mutation of one or more mixtures
//!
//! A transaction exclusively borrows its participants for its lifetime. Each
//! participant is snapshotted the first time it is borrowed mutably through
//! the transaction; `abort` (or dropping the transaction without `commit`)
//! puts every snapshotted participant back.

use super::{Mixture, MixtureSnapshot};

pub struct Transaction<'a, const N: usize> {
    participants: [&'a mut Mixture; N],
    snapshots: [Option<MixtureSnapshot>; N],
    /// Enclosing scope's snapshots, filled in for participants it never touched
    parent: Option<&'a mut [Option<MixtureSnapshot>; N]>,
    closed: bool,
}

impl<'a, const N: usize> Transaction<'a, N> {
    pub fn open(participants: [&'a mut Mixture; N]) -> Self {
        Self {
            participants,
            snapshots: std::array::from_fn(|_| None),
            parent: None,
            closed: false,
        }
    }

    /// Read access; does not enlist the participant
    pub fn get(&self, index: usize) -> &Mixture {
        &*self.participants[index]
    }

    pub fn get_mut(&mut self, index: usize) -> &mut Mixture {
        self.enlist(index);
        &mut *self.participants[index]
    }

    /// Two distinct participants at once
    ///
    /// # Panics
    ///
    /// Panics if `a == b`.
    pub fn pair_mut(&mut self, a: usize, b: usize) -> (&mut Mixture, &mut Mixture) {
        assert_ne!(a, b, "transaction participant borrowed twice");
        self.enlist(a);
        self.enlist(b);

        let (low, high) = (a.min(b), a.max(b));
        let (left, right) = self.participants.split_at_mut(high);
        let (first, second) = (&mut *left[low], &mut *right[0]);
        if a < b {
            (first, second)
        } else {
            (second, first)
        }
    }

    /// Every participant at once, in order
    pub fn all_mut(&mut self) -> [&mut Mixture; N] {
        for index in 0..N {
            self.enlist(index);
        }
        self.participants.each_mut().map(|mixture| &mut **mixture)
    }

    /// Child scope over the same participants
    ///
    /// Aborting the child reverts only what happened inside it. Committing
    /// the child hands its changes to this scope, which can still revert them.
    pub fn nested(&mut self) -> Transaction<'_, N> {
        Transaction {
            participants: self.participants.each_mut().map(|mixture| &mut **mixture),
            snapshots: std::array::from_fn(|_| None),
            parent: Some(&mut self.snapshots),
            closed: false,
        }
    }

    pub fn commit(mut self) {
        self.closed = true;
    }

    pub fn abort(mut self) {
        self.rollback();
    }

    fn enlist(&mut self, index: usize) {
        if self.snapshots[index].is_some() {
            return;
        }

        let snapshot = self.participants[index].snapshot();
        if let Some(parent) = self.parent.as_deref_mut()
            && parent[index].is_none()
        {
            parent[index] = Some(snapshot.clone());
        }
        self.snapshots[index] = Some(snapshot);
    }

    fn rollback(&mut self) {
        for (mixture, snapshot) in self.participants.iter_mut().zip(self.snapshots.iter_mut()) {
            if let Some(snapshot) = snapshot.take() {
                mixture.restore(snapshot);
            }
        }
        self.closed = true;
    }
}

impl<const N: usize> Drop for Transaction<'_, N> {
    fn drop(&mut self) {
        if !self.closed {
            log::trace!("Transaction dropped without commit, rolling back");
            self.rollback();
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use alembic_chemistry::{ReagentId, ReagentQuantity, Reagents};

    use super::*;

    fn water(amount: u64, temperature: f32) -> ReagentQuantity {
        ReagentQuantity::new(ReagentId::WATER, amount, temperature)
    }

    fn filled(amount: u64) -> Mixture {
        let mut mixture = Mixture::new(Arc::new(Reagents::new()));
        mixture.add(&water(amount, 20.0));
        mixture.clear_altered();
        mixture
    }

    #[test]
    fn test_commit_keeps_changes() {
        let mut mixture = filled(1000);
        let mut txn = Transaction::open([&mut mixture]);
        txn.get_mut(0).add(&water(500, 20.0));
        txn.commit();

        assert_eq!(mixture.amount(ReagentId::WATER), 1500);
        assert!(mixture.is_altered());
    }

    #[test]
    fn test_abort_restores_everything() {
        let mut mixture = filled(1000);
        let energy = mixture.energy();
        let heat_mass = mixture.heat_mass();

        let mut txn = Transaction::open([&mut mixture]);
        txn.get_mut(0).add(&water(500, 90.0));
        txn.get_mut(0).remove(ReagentId::WATER, 200);
        txn.abort();

        assert_eq!(mixture.amount(ReagentId::WATER), 1000);
        assert_eq!(mixture.total_amount(), 1000);
        assert_eq!(mixture.energy(), energy);
        assert_eq!(mixture.heat_mass(), heat_mass);
        assert!(!mixture.is_altered());
    }

    #[test]
    fn test_drop_without_commit_aborts() {
        let mut mixture = filled(1000);
        {
            let mut txn = Transaction::open([&mut mixture]);
            txn.get_mut(0).remove(ReagentId::WATER, 1000);
            assert!(txn.get(0).is_empty());
        }
        assert_eq!(mixture.amount(ReagentId::WATER), 1000);
    }

    #[test]
    fn test_pair_covers_both_participants() {
        let mut a = filled(1000);
        let mut b = filled(0);
        let mut txn = Transaction::open([&mut a, &mut b]);
        {
            let (second, first) = txn.pair_mut(1, 0);
            let moved = first.remove(ReagentId::WATER, 400);
            second.add(&moved);
        }
        txn.abort();

        assert_eq!(a.amount(ReagentId::WATER), 1000);
        assert!(b.is_empty());
    }

    #[test]
    fn test_nested_abort_reverts_only_child() {
        let mut mixture = filled(1000);
        let mut outer = Transaction::open([&mut mixture]);
        outer.get_mut(0).add(&water(100, 20.0));

        let mut inner = outer.nested();
        inner.get_mut(0).add(&water(1000, 20.0));
        inner.abort();

        assert_eq!(outer.get(0).amount(ReagentId::WATER), 1100);
        outer.commit();
        assert_eq!(mixture.amount(ReagentId::WATER), 1100);
    }

    #[test]
    fn test_outer_abort_reverts_committed_child() {
        let mut mixture = filled(1000);
        let mut outer = Transaction::open([&mut mixture]);

        // The child is the first to touch the mixture
        let mut inner = outer.nested();
        inner.get_mut(0).remove(ReagentId::WATER, 600);
        inner.commit();
        assert_eq!(outer.get(0).amount(ReagentId::WATER), 400);

        outer.abort();
        assert_eq!(mixture.amount(ReagentId::WATER), 1000);
        assert!(!mixture.is_altered());
    }
}
