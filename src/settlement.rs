//! Per-leg settlement arithmetic.
//!
//! A terminal outcome maps to a fixed profit multiplier over the leg's
//! stake and odd. Hedged legs settle as the sum over their entries. The
//! balance delta applied to a bookmaker is this profit contribution; a
//! re-settlement reverses the previously applied delta before applying the
//! new one, so correcting a result nets out to a single application.

use crate::dto::{Leg, LegResult};
use rust_decimal::Decimal;

/// Profit contribution of a single position with the given outcome.
///
/// GREEN: `stake × (odd − 1)`; MEIO_GREEN: half of that; RED: `−stake`;
/// MEIO_RED: `−stake / 2`; VOID: `0`.
pub fn position_profit(stake: Decimal, odd: Decimal, resultado: LegResult) -> Decimal {
    match resultado {
        LegResult::Green => stake * (odd - Decimal::ONE),
        LegResult::MeioGreen => stake * (odd - Decimal::ONE) / Decimal::TWO,
        LegResult::Red => -stake,
        LegResult::MeioRed => -stake / Decimal::TWO,
        LegResult::Void => Decimal::ZERO,
    }
}

/// Profit contribution of a whole leg: its single position, or the sum over
/// its hedged entries.
pub fn leg_contribution(leg: &Leg, resultado: LegResult) -> Decimal {
    if leg.entries.is_empty() {
        position_profit(leg.stake, leg.odd, resultado)
    } else {
        leg.entries
            .iter()
            .map(|e| position_profit(e.stake, e.odd, resultado))
            .sum()
    }
}

/// Net change to apply to the bookmaker balance when (re-)settling a leg:
/// the new contribution minus whatever was applied before.
pub fn balance_delta(leg: &Leg, resultado: LegResult) -> Decimal {
    let new_delta = leg_contribution(leg, resultado);
    let previously_applied = leg.saldo_aplicado.unwrap_or(Decimal::ZERO);
    new_delta - previously_applied
}

/// Overall operation profit once every leg carries a terminal outcome.
/// Returns `None` while any leg is still open.
pub fn operation_profit(pernas: &[Leg]) -> Option<Decimal> {
    pernas
        .iter()
        .map(|leg| leg.resultado.map(|r| leg_contribution(leg, r)))
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dto::{Currency, LegEntry};
    use rust_decimal_macros::dec;

    #[test]
    fn test_result_multipliers() {
        let stake = dec!(100);
        let odd = dec!(2.50);
        assert_eq!(position_profit(stake, odd, LegResult::Green), dec!(150));
        assert_eq!(position_profit(stake, odd, LegResult::MeioGreen), dec!(75));
        assert_eq!(position_profit(stake, odd, LegResult::Red), dec!(-100));
        assert_eq!(position_profit(stake, odd, LegResult::MeioRed), dec!(-50));
        assert_eq!(position_profit(stake, odd, LegResult::Void), Decimal::ZERO);
    }

    #[test]
    fn test_hedged_leg_sums_entries() {
        let mut leg = Leg::new(1, dec!(0), dec!(0), Currency::BRL);
        leg.entries = vec![
            LegEntry {
                bookmaker_id: Some(1),
                odd: dec!(2.00),
                stake: dec!(100),
            },
            LegEntry {
                bookmaker_id: Some(2),
                odd: dec!(3.00),
                stake: dec!(50),
            },
        ];
        // 100*(2-1) + 50*(3-1) = 200
        assert_eq!(leg_contribution(&leg, LegResult::Green), dec!(200));
        assert_eq!(leg_contribution(&leg, LegResult::Red), dec!(-150));
    }

    #[test]
    fn test_resettlement_nets_to_single_application() {
        let mut leg = Leg::new(1, dec!(2.00), dec!(100), Currency::BRL);

        // First settlement applies the full delta.
        let first = balance_delta(&leg, LegResult::Green);
        assert_eq!(first, dec!(100));
        leg.saldo_aplicado = Some(dec!(100));
        leg.resultado = Some(LegResult::Green);

        // Settling again with the same result applies nothing more.
        assert_eq!(balance_delta(&leg, LegResult::Green), Decimal::ZERO);

        // Correcting GREEN to RED reverses the 100 and applies -100.
        assert_eq!(balance_delta(&leg, LegResult::Red), dec!(-200));
        leg.saldo_aplicado = Some(dec!(-100));
        leg.resultado = Some(LegResult::Red);

        // Cumulative effect equals a single RED application.
        assert_eq!(first + dec!(-200), dec!(-100));
    }

    #[test]
    fn test_operation_profit_requires_all_terminal() {
        let mut green = Leg::new(1, dec!(2.00), dec!(100), Currency::BRL);
        green.resultado = Some(LegResult::Green);
        let mut open = Leg::new(2, dec!(1.80), dec!(111), Currency::BRL);

        assert_eq!(operation_profit(&[green.clone(), open.clone()]), None);

        open.resultado = Some(LegResult::Red);
        // 100*(2.00-1) - 111 = -11
        assert_eq!(
            operation_profit(&[green, open]),
            Some(dec!(-11))
        );
    }

    #[test]
    fn test_void_leg_contributes_nothing() {
        let mut leg = Leg::new(1, dec!(3.00), dec!(80), Currency::BRL);
        leg.resultado = Some(LegResult::Void);
        assert_eq!(operation_profit(&[leg]), Some(Decimal::ZERO));
    }
}
