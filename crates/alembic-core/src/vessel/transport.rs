//! Gradient-driven transport between two neighbouring vessels
//!
//! Each function looks at the physical gradient between the two mixtures,
//! turns it into an amount and hands it to the transfer engine. Gradients
//! below `min_transfer` are ignored.

use alembic_chemistry::{Amount, ReagentId, ReagentState};

use crate::config::DiffusionConfig;
use crate::mixture::Mixture;
use crate::simulation::{SimStats, diffuse, move_reagents};

/// Let solids and then liquids of `upper` fall into `lower`
pub fn settle(upper: &mut Mixture, lower: &mut Mixture, stats: &mut dyn SimStats) {
    for state in [ReagentState::Solid, ReagentState::Liquid] {
        let reagents = upper.reagents_in_state(state);
        if reagents.is_empty() {
            continue;
        }
        let amount = upper.amount_in_state(state);
        let moved = move_reagents(upper, &reagents, lower, amount);
        if moved > 0 {
            stats.record_transfer(moved);
        }
    }
}

/// Move liquid sideways toward equal fill fractions
pub fn level(a: &mut Mixture, b: &mut Mixture, config: &DiffusionConfig, stats: &mut dyn SimStats) {
    let (Some(la), Some(lb)) = (a.volume_limit(), b.volume_limit()) else {
        return;
    };
    let (used_a, volume_a) = (la.used_volume() as i128, la.volume() as i128);
    let (used_b, volume_b) = (lb.used_volume() as i128, lb.volume() as i128);
    if volume_a + volume_b == 0 {
        return;
    }

    // Amount that leaves both sides at the same fill fraction
    let surplus = (used_a * volume_b - used_b * volume_a) / (volume_a + volume_b);
    if surplus > 0 {
        flow(a, b, surplus.unsigned_abs() as Amount, ReagentState::Liquid, config, stats);
    } else if surplus < 0 {
        flow(b, a, surplus.unsigned_abs() as Amount, ReagentState::Liquid, config, stats);
    }
}

/// Move gas toward equal pressure (gas per unit of headroom)
pub fn equalize_gas(
    a: &mut Mixture,
    b: &mut Mixture,
    config: &DiffusionConfig,
    stats: &mut dyn SimStats,
) {
    let (Some(la), Some(lb)) = (a.volume_limit(), b.volume_limit()) else {
        return;
    };
    let (gas_a, free_a) = (la.gas_amount() as i128, la.free_volume().max(1) as i128);
    let (gas_b, free_b) = (lb.gas_amount() as i128, lb.free_volume().max(1) as i128);

    let surplus = (gas_a * free_b - gas_b * free_a) / (free_a + free_b);
    if surplus > 0 {
        flow(a, b, surplus.unsigned_abs() as Amount, ReagentState::Gas, config, stats);
    } else if surplus < 0 {
        flow(b, a, surplus.unsigned_abs() as Amount, ReagentState::Gas, config, stats);
    }
}

/// Swap matter in `state` so the two compositions move toward each other
///
/// Swapping `a_total * b_total / (a_total + b_total)` mixes both sides
/// completely; `rate` is the share of that spent per tick. Nothing moves once
/// the part of the swap that changes composition drops below `min_transfer`.
pub fn mix(
    a: &mut Mixture,
    b: &mut Mixture,
    state: ReagentState,
    config: &DiffusionConfig,
    stats: &mut dyn SimStats,
) {
    let (total_a, total_b) = (a.amount_in_state(state), b.amount_in_state(state));
    if total_a == 0 || total_b == 0 {
        return;
    }

    let full_mix = total_a as f64 * total_b as f64 / (total_a as f64 + total_b as f64);
    let amount = (full_mix * config.rate.clamp(0.0, 1.0) as f64).floor() as Amount;
    let gap = composition_gap(a, b, state);
    if amount == 0 || ((amount as f64 * gap) as Amount) < config.min_transfer.max(1) {
        return;
    }

    let reagents = a.reagents_in_state(state);
    let exchanged = diffuse(a, b, &reagents, state, amount);
    if exchanged > 0 {
        stats.record_diffusion(exchanged);
    }
}

/// Half the summed difference between the two compositions in `state`, in `[0, 1]`
fn composition_gap(a: &Mixture, b: &Mixture, state: ReagentState) -> f64 {
    let shares = |mixture: &Mixture| -> Vec<(ReagentId, f64)> {
        let total = mixture.amount_in_state(state) as f64;
        mixture
            .reagents_in_state(state)
            .into_iter()
            .map(|id| (id, mixture.amount(id) as f64 / total))
            .collect()
    };
    let (shares_a, shares_b) = (shares(a), shares(b));
    let share_of = |shares: &[(ReagentId, f64)], id: ReagentId| {
        shares
            .iter()
            .find(|&&(reagent, _)| reagent == id)
            .map_or(0.0, |&(_, share)| share)
    };

    let mut reagents: Vec<ReagentId> = shares_a.iter().chain(&shares_b).map(|&(id, _)| id).collect();
    reagents.sort();
    reagents.dedup();
    reagents
        .into_iter()
        .map(|id| (share_of(&shares_a, id) - share_of(&shares_b, id)).abs())
        .sum::<f64>()
        / 2.0
}

fn flow(
    from: &mut Mixture,
    to: &mut Mixture,
    amount: Amount,
    state: ReagentState,
    config: &DiffusionConfig,
    stats: &mut dyn SimStats,
) {
    let amount = amount.min(from.amount_in_state(state));
    if amount == 0 || amount < config.min_transfer {
        return;
    }
    let reagents = from.reagents_in_state(state);
    let moved = move_reagents(from, &reagents, to, amount);
    if moved > 0 {
        stats.record_transfer(moved);
    }
}
