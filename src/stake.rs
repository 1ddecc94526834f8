//! Stake balancing for 2- and 3-outcome arbitrage structures.
//!
//! Everything in this module is pure arithmetic over [`rust_decimal::Decimal`]:
//! inputs are plain leg descriptions, outputs are derived stakes and a
//! per-outcome scenario table. Persistence and balance validation live
//! elsewhere.

use rust_decimal::{Decimal, RoundingStrategy};
use std::collections::HashMap;
use std::hash::Hash;

/// One hedged sub-position of a leg.
#[derive(Debug, Clone, PartialEq)]
pub struct EntryInput {
    pub odd: Decimal,
    pub stake: Decimal,
}

/// Calculator view of one outcome.
///
/// When `entries` is non-empty the leg's own `odd`/`stake` are ignored and
/// the effective values are derived from the entries.
#[derive(Debug, Clone, PartialEq)]
pub struct LegInput {
    pub odd: Decimal,
    pub stake: Decimal,
    pub entries: Vec<EntryInput>,
    /// In directed-profit mode, true for legs that receive the target profit.
    pub directed: bool,
}

impl LegInput {
    pub fn simple(odd: Decimal, stake: Decimal) -> Self {
        Self {
            odd,
            stake,
            entries: Vec::new(),
            directed: false,
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct CalcOptions {
    /// Derived stakes are rounded to a multiple of this increment when set.
    pub rounding_increment: Option<Decimal>,
}

/// Stakes derived so every outcome pays out the reference leg's target.
#[derive(Debug, Clone, PartialEq)]
pub struct BalancedStakes {
    /// One stake per leg, in input order. The reference leg keeps its own.
    pub stakes: Vec<Decimal>,
    pub target_return: Decimal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperationProfile {
    /// Every scenario yields non-negative profit.
    Arbitrage,
    /// Some scenarios win, some lose.
    HedgePartial,
    /// Even the best scenario loses.
    Risk,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Scenario {
    pub winning_leg: usize,
    pub retorno: Decimal,
    pub lucro: Decimal,
    /// Percentage over total stake; zero when nothing is staked.
    pub roi: Decimal,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ScenarioTable {
    pub scenarios: Vec<Scenario>,
    pub total_stake: Decimal,
    pub min_profit: Decimal,
    pub max_profit: Decimal,
    pub min_roi: Decimal,
    pub max_roi: Decimal,
    pub profile: OperationProfile,
}

/// Per-currency stake subtotals. The aggregate is only available when all
/// legs share one currency; mixed-currency drafts get subtotals only.
#[derive(Debug, Clone, PartialEq)]
pub struct StakeTotals<K: Eq + Hash> {
    pub per_currency: HashMap<K, Decimal>,
    pub aggregate: Option<Decimal>,
}

const HUNDRED: Decimal = Decimal::ONE_HUNDRED;

/// Round to the nearest multiple of `increment` (half away from zero).
/// Non-positive increments leave the value untouched.
pub fn round_to_increment(value: Decimal, increment: Decimal) -> Decimal {
    if increment <= Decimal::ZERO {
        return value;
    }
    (value / increment).round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
        * increment
}

fn apply_rounding(value: Decimal, opts: &CalcOptions) -> Decimal {
    match opts.rounding_increment {
        Some(inc) => round_to_increment(value, inc),
        None => value,
    }
}

/// Effective stake of a leg: the sum of its entry stakes, or its own stake
/// when it has no entries.
pub fn effective_stake(leg: &LegInput) -> Decimal {
    if leg.entries.is_empty() {
        leg.stake
    } else {
        leg.entries.iter().map(|e| e.stake).sum()
    }
}

/// Effective odd of a leg: the stake-weighted average of its entry odds, or
/// the leg's own odd when it has no entries. A zero-stake entry set falls
/// back to the leg's own odd.
pub fn effective_odd(leg: &LegInput) -> Decimal {
    if leg.entries.is_empty() {
        return leg.odd;
    }
    let total: Decimal = leg.entries.iter().map(|e| e.stake).sum();
    if total.is_zero() {
        return leg.odd;
    }
    let weighted: Decimal = leg.entries.iter().map(|e| e.stake * e.odd).sum();
    weighted / total
}

/// Payout of a leg if it wins. For hedged legs this is the exact sum over
/// entries, which equals effective stake times effective odd.
pub fn leg_return(leg: &LegInput) -> Decimal {
    if leg.entries.is_empty() {
        leg.stake * leg.odd
    } else {
        leg.entries.iter().map(|e| e.stake * e.odd).sum()
    }
}

/// Derive stakes so that every leg's winning payout approximately equals
/// the reference leg's target return (`ref_stake × ref_odd`).
///
/// Supports 2 or 3 legs. Returns `None` when the leg count is out of range,
/// the reference index is invalid, or any effective odd is non-positive.
pub fn balance_stakes(
    legs: &[LegInput],
    reference: usize,
    opts: &CalcOptions,
) -> Option<BalancedStakes> {
    if !(2..=3).contains(&legs.len()) || reference >= legs.len() {
        return None;
    }
    if legs.iter().any(|l| effective_odd(l) <= Decimal::ZERO) {
        return None;
    }

    let target_return = leg_return(&legs[reference]);
    let stakes = legs
        .iter()
        .enumerate()
        .map(|(i, leg)| {
            if i == reference {
                effective_stake(leg)
            } else {
                apply_rounding(target_return / effective_odd(leg), opts)
            }
        })
        .collect();

    Some(BalancedStakes {
        stakes,
        target_return,
    })
}

/// Directed-profit solving: legs flagged `directed` share the reference
/// leg's target return; unflagged legs are sized so their own win yields
/// zero profit (pure hedges).
///
/// With `σ = Σ(1/odd)` over the undirected legs, the total outlay solves to
/// `T = S_directed / (1 − σ)` and each undirected stake is `T / odd`. The
/// system has no solution when `σ ≥ 1`, in which case `None` is returned.
pub fn directed_stakes(
    legs: &[LegInput],
    reference: usize,
    opts: &CalcOptions,
) -> Option<Vec<Decimal>> {
    if !(2..=3).contains(&legs.len()) || reference >= legs.len() {
        return None;
    }
    if legs.iter().any(|l| effective_odd(l) <= Decimal::ZERO) {
        return None;
    }

    let target_return = leg_return(&legs[reference]);

    // First pass: fix the directed stakes off the target return.
    let mut stakes: Vec<Decimal> = vec![Decimal::ZERO; legs.len()];
    let mut directed_total = Decimal::ZERO;
    let mut sigma = Decimal::ZERO;
    for (i, leg) in legs.iter().enumerate() {
        let odd = effective_odd(leg);
        if leg.directed || i == reference {
            let stake = if i == reference {
                effective_stake(leg)
            } else {
                apply_rounding(target_return / odd, opts)
            };
            stakes[i] = stake;
            directed_total += stake;
        } else {
            sigma += Decimal::ONE / odd;
        }
    }

    if sigma >= Decimal::ONE {
        return None;
    }

    // Second pass: size the hedge legs so their own win breaks even.
    let total_outlay = directed_total / (Decimal::ONE - sigma);
    for (i, leg) in legs.iter().enumerate() {
        if !leg.directed && i != reference {
            stakes[i] = apply_rounding(total_outlay / effective_odd(leg), opts);
        }
    }

    Some(stakes)
}

/// Per-outcome scenario analysis over the legs as staked.
pub fn scenario_table(legs: &[LegInput]) -> ScenarioTable {
    let total_stake: Decimal = legs.iter().map(effective_stake).sum();

    let scenarios: Vec<Scenario> = legs
        .iter()
        .enumerate()
        .map(|(i, leg)| {
            let retorno = leg_return(leg);
            let lucro = retorno - total_stake;
            let roi = if total_stake.is_zero() {
                Decimal::ZERO
            } else {
                lucro / total_stake * HUNDRED
            };
            Scenario {
                winning_leg: i,
                retorno,
                lucro,
                roi,
            }
        })
        .collect();

    let min_profit = scenarios
        .iter()
        .map(|s| s.lucro)
        .min()
        .unwrap_or(Decimal::ZERO);
    let max_profit = scenarios
        .iter()
        .map(|s| s.lucro)
        .max()
        .unwrap_or(Decimal::ZERO);
    let min_roi = scenarios
        .iter()
        .map(|s| s.roi)
        .min()
        .unwrap_or(Decimal::ZERO);
    let max_roi = scenarios
        .iter()
        .map(|s| s.roi)
        .max()
        .unwrap_or(Decimal::ZERO);

    let profile = if min_profit >= Decimal::ZERO {
        OperationProfile::Arbitrage
    } else if max_profit >= Decimal::ZERO {
        OperationProfile::HedgePartial
    } else {
        OperationProfile::Risk
    };

    ScenarioTable {
        scenarios,
        total_stake,
        min_profit,
        max_profit,
        min_roi,
        max_roi,
        profile,
    }
}

/// Sum stakes per currency. The aggregate total is withheld as soon as more
/// than one currency is present.
pub fn stake_totals<K, I>(stakes: I) -> StakeTotals<K>
where
    K: Eq + Hash + Copy,
    I: IntoIterator<Item = (K, Decimal)>,
{
    let mut per_currency: HashMap<K, Decimal> = HashMap::new();
    for (currency, stake) in stakes {
        *per_currency.entry(currency).or_insert(Decimal::ZERO) += stake;
    }
    let aggregate = if per_currency.len() == 1 {
        per_currency.values().next().copied()
    } else {
        None
    };
    StakeTotals {
        per_currency,
        aggregate,
    }
}
