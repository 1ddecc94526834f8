//! Draft-aware balance checks performed before an operation is saved.
//!
//! The canonical operable balance (`saldo_operavel`) comes from the backend
//! and does not know about the draft being edited, so availability is always
//! re-derived here by subtracting the stakes the draft has already committed
//! to the same bookmaker.

use crate::dto::{Bookmaker, Leg};
use crate::error::{Error, Result};
use rust_decimal::Decimal;
use std::collections::HashMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationMode {
    /// New operation: stakes must fit inside the operable balances.
    Create,
    /// Editing an already-saved operation: balances were committed at save
    /// time, so only the shape of the legs is checked.
    Edit,
}

/// Sum of draft stakes per bookmaker, entries included.
pub fn allocated_by_bookmaker(pernas: &[Leg]) -> HashMap<i64, Decimal> {
    let mut allocated: HashMap<i64, Decimal> = HashMap::new();
    for leg in pernas {
        if leg.entries.is_empty() {
            if let Some(id) = leg.bookmaker_id {
                *allocated.entry(id).or_insert(Decimal::ZERO) += leg.stake;
            }
        } else {
            for entry in &leg.entries {
                if let Some(id) = entry.bookmaker_id {
                    *allocated.entry(id).or_insert(Decimal::ZERO) += entry.stake;
                }
            }
        }
    }
    allocated
}

/// Operable balance still available for one more position at `bookmaker`,
/// given what the draft already allocates there.
pub fn available_for(bookmaker: &Bookmaker, pernas: &[Leg]) -> Decimal {
    let allocated = allocated_by_bookmaker(pernas)
        .get(&bookmaker.id)
        .copied()
        .unwrap_or(Decimal::ZERO);
    bookmaker.saldo_operavel - allocated
}

fn check_entry(
    leg_index: usize,
    label: &str,
    bookmaker_id: Option<i64>,
    odd: Decimal,
    stake: Decimal,
) -> Result<()> {
    let leg_no = leg_index + 1;
    if bookmaker_id.is_none() {
        return Err(Error::Validation(format!(
            "leg {leg_no}{label}: bookmaker is required"
        )));
    }
    if odd <= Decimal::ONE {
        return Err(Error::Validation(format!(
            "leg {leg_no}{label}: odd must be greater than 1.00 (got {odd})"
        )));
    }
    if stake <= Decimal::ZERO {
        return Err(Error::Validation(format!(
            "leg {leg_no}{label}: stake must be positive (got {stake})"
        )));
    }
    Ok(())
}

/// Validate a draft operation before save.
///
/// Every entry (main or additional) must name a bookmaker, carry a decimal
/// odd above 1 and a positive stake. In [`ValidationMode::Create`] the total
/// allocated to each bookmaker must also fit inside its operable balance;
/// the error names the first leg that pushes a bookmaker over.
pub fn validate_draft(
    pernas: &[Leg],
    saldos: &HashMap<i64, Bookmaker>,
    mode: ValidationMode,
) -> Result<()> {
    if pernas.is_empty() {
        return Err(Error::Validation("operation has no legs".to_string()));
    }

    for (i, leg) in pernas.iter().enumerate() {
        if leg.entries.is_empty() {
            check_entry(i, "", leg.bookmaker_id, leg.odd, leg.stake)?;
        } else {
            for (j, entry) in leg.entries.iter().enumerate() {
                let label = format!(" entry {}", j + 1);
                check_entry(i, &label, entry.bookmaker_id, entry.odd, entry.stake)?;
            }
        }
    }

    if mode == ValidationMode::Edit {
        return Ok(());
    }

    // Walk legs in order accumulating per-bookmaker totals so the error can
    // name the leg that exceeded the balance.
    let mut running: HashMap<i64, Decimal> = HashMap::new();
    for (i, leg) in pernas.iter().enumerate() {
        let positions: Vec<(Option<i64>, Decimal)> = if leg.entries.is_empty() {
            vec![(leg.bookmaker_id, leg.stake)]
        } else {
            leg.entries.iter().map(|e| (e.bookmaker_id, e.stake)).collect()
        };

        for (bookmaker_id, stake) in positions {
            let id = bookmaker_id.expect("checked above");
            let bookmaker = saldos.get(&id).ok_or_else(|| {
                Error::Validation(format!("leg {}: unknown bookmaker {id}", i + 1))
            })?;
            let total = running.entry(id).or_insert(Decimal::ZERO);
            *total += stake;
            if *total > bookmaker.saldo_operavel {
                return Err(Error::Validation(format!(
                    "leg {}: stake exceeds operable balance at {} ({} allocated, {} available)",
                    i + 1,
                    bookmaker.nome,
                    total,
                    bookmaker.saldo_operavel
                )));
            }
        }
    }

    Ok(())
}
