//! Read-side aggregation: caixa totals per currency, investor ROI and
//! settled-operation summaries. Fetch happens elsewhere; everything here is
//! a fold over rows already in memory.

use crate::dto::{
    CashTransaction, Currency, FreebetReceived, Operation, TransactionKind, TransactionStatus,
};
use rust_decimal::Decimal;
use std::collections::{BTreeMap, HashMap};

const HUNDRED: Decimal = Decimal::ONE_HUNDRED;

/// Sum transaction values per currency, restricted to one status.
pub fn sum_by_currency(
    transactions: &[CashTransaction],
    status: TransactionStatus,
) -> BTreeMap<Currency, Decimal> {
    let mut totals: BTreeMap<Currency, Decimal> = BTreeMap::new();
    for tx in transactions.iter().filter(|t| t.status == status) {
        // Confirmed rows count at their reconciled value when present.
        let value = tx.valor_confirmado.unwrap_or(tx.valor);
        *totals.entry(tx.moeda).or_insert(Decimal::ZERO) += value;
    }
    totals
}

#[derive(Debug, Clone, PartialEq)]
pub struct InvestorRoi {
    pub investidor: String,
    pub total_aportado: Decimal,
    pub total_retornado: Decimal,
    /// `(returned / contributed − 1) × 100`; `None` when nothing was
    /// contributed yet.
    pub roi_pct: Option<Decimal>,
}

/// Per-investor ROI over confirmed ledger rows: APORTE_FINANCEIRO entries
/// count as contributions, withdrawals carrying an investor name count as
/// returns.
pub fn investor_roi(transactions: &[CashTransaction]) -> Vec<InvestorRoi> {
    let mut contributed: BTreeMap<String, Decimal> = BTreeMap::new();
    let mut returned: BTreeMap<String, Decimal> = BTreeMap::new();

    for tx in transactions
        .iter()
        .filter(|t| t.status == TransactionStatus::Confirmado)
    {
        let Some(name) = &tx.investidor else { continue };
        let value = tx.valor_confirmado.unwrap_or(tx.valor);
        match tx.tipo_transacao {
            TransactionKind::AporteFinanceiro => {
                *contributed.entry(name.clone()).or_insert(Decimal::ZERO) += value;
            }
            TransactionKind::Saque => {
                *returned.entry(name.clone()).or_insert(Decimal::ZERO) += value;
            }
            _ => {}
        }
    }

    let mut names: Vec<String> = contributed.keys().cloned().collect();
    for name in returned.keys() {
        if !contributed.contains_key(name) {
            names.push(name.clone());
        }
    }

    names
        .into_iter()
        .map(|name| {
            let total_aportado = contributed.get(&name).copied().unwrap_or(Decimal::ZERO);
            let total_retornado = returned.get(&name).copied().unwrap_or(Decimal::ZERO);
            let roi_pct = if total_aportado.is_zero() {
                None
            } else {
                Some((total_retornado / total_aportado - Decimal::ONE) * HUNDRED)
            };
            InvestorRoi {
                investidor: name,
                total_aportado,
                total_retornado,
                roi_pct,
            }
        })
        .collect()
}

/// Settled profit per currency. Multi-currency legs are attributed to the
/// first leg's currency, matching how operations are registered (one
/// operating currency per operation; mixed drafts keep per-leg figures).
pub fn settled_profit_by_currency(operations: &[Operation]) -> BTreeMap<Currency, Decimal> {
    let mut totals: BTreeMap<Currency, Decimal> = BTreeMap::new();
    for op in operations {
        let (Some(lucro), Some(leg)) = (op.lucro_total, op.pernas.first()) else {
            continue;
        };
        *totals.entry(leg.moeda).or_insert(Decimal::ZERO) += lucro;
    }
    totals
}

/// Unused freebet value per bookmaker.
pub fn freebet_balance_by_bookmaker(freebets: &[FreebetReceived]) -> HashMap<i64, Decimal> {
    let mut totals: HashMap<i64, Decimal> = HashMap::new();
    for fb in freebets.iter().filter(|f| !f.utilizado) {
        *totals.entry(fb.bookmaker_id).or_insert(Decimal::ZERO) += fb.valor;
    }
    totals
}
