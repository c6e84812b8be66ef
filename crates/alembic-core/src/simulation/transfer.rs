//! Moving reagents between two mixtures
//!
//! Both operations extract first and insert second inside one transaction.
//! When a destination takes less than it was offered the transaction is
//! aborted and the whole step retried with the amount that was accepted, so
//! the loop always terminates and nothing is lost or duplicated.

use alembic_chemistry::{Amount, ReagentId, ReagentState};

use crate::mixture::{Mixture, Transaction};

/// Move up to `amount` of `reagents` from `source` into `target`
///
/// Returns the amount that ended up in `target`.
pub fn move_reagents(
    source: &mut Mixture,
    reagents: &[ReagentId],
    target: &mut Mixture,
    mut amount: Amount,
) -> Amount {
    while amount > 0 {
        let mut txn = Transaction::open([&mut *source, &mut *target]);
        let (from, to) = txn.pair_mut(0, 1);

        let extracted = from.remove_from(reagents, amount);
        let offered = extracted.total_amount();
        if offered == 0 {
            return 0;
        }

        let accepted = to.add_mixture(&extracted);
        if accepted < offered {
            txn.abort();
            log::trace!("Transfer of {} only partly accepted, retrying with {}", offered, accepted);
            amount = accepted;
            continue;
        }

        txn.commit();
        return offered;
    }
    0
}

/// Swap up to `amount` of matter in `state` between `a` and `b`
///
/// `reagents_a` selects what leaves `a`; `b` contributes its own reagents
/// currently in `state`. Returns the total amount exchanged in both
/// directions.
pub fn diffuse(
    a: &mut Mixture,
    b: &mut Mixture,
    reagents_a: &[ReagentId],
    state: ReagentState,
    mut amount: Amount,
) -> Amount {
    let reagents_b = b.reagents_in_state(state);

    while amount > 0 {
        let mut txn = Transaction::open([&mut *a, &mut *b]);
        let (left, right) = txn.pair_mut(0, 1);

        let from_a = left.remove_from(reagents_a, amount);
        let from_b = right.remove_from(&reagents_b, amount);
        let (offered_a, offered_b) = (from_a.total_amount(), from_b.total_amount());
        if offered_a == 0 && offered_b == 0 {
            return 0;
        }

        let into_b = right.add_mixture(&from_a);
        let into_a = left.add_mixture(&from_b);
        let short_b = into_b < offered_a;
        let short_a = into_a < offered_b;
        if short_a || short_b {
            txn.abort();
            amount = match (short_a, short_b) {
                (true, true) => into_a.min(into_b),
                (true, false) => into_a,
                _ => into_b,
            };
            continue;
        }

        txn.commit();
        return offered_a + offered_b;
    }
    0
}
