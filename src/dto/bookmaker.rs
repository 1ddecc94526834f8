use super::common::Currency;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Row of the `bookmakers` table.
///
/// `saldo_operavel` is a derived column computed server-side from the real,
/// freebet and bonus balances. It is always read as-is and never recomputed
/// locally, so every client sees the same canonical figure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Bookmaker {
    pub id: i64,
    pub nome: String,
    pub moeda: Currency,
    pub saldo_atual: Decimal,
    #[serde(default)]
    pub saldo_freebet: Decimal,
    #[serde(default)]
    pub saldo_bonus: Decimal,
    pub saldo_operavel: Decimal,
}
