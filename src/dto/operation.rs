use super::common::{Currency, LegResult, OperationContext, OperationStatus, RecordForm};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Conversion rate captured at save time so later reporting is not affected
/// by subsequent rate changes.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CurrencySnapshot {
    pub taxa: Decimal,
    pub capturada_em: DateTime<Utc>,
}

/// One hedged sub-position of a leg, placed at its own bookmaker.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LegEntry {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bookmaker_id: Option<i64>,
    pub odd: Decimal,
    pub stake: Decimal,
}

/// One leg of the `pernas` JSON array persisted on `apostas_unificada`.
///
/// Odd, stake, currency and the conversion snapshot are immutable once the
/// operation is saved. `saldo_aplicado` records the balance delta last
/// applied by settlement so a re-settlement can reverse it first.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Leg {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bookmaker_id: Option<i64>,
    pub odd: Decimal,
    pub stake: Decimal,
    pub moeda: Currency,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cotacao: Option<CurrencySnapshot>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub entries: Vec<LegEntry>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resultado: Option<LegResult>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub saldo_aplicado: Option<Decimal>,
}

impl Leg {
    pub fn new(bookmaker_id: i64, odd: Decimal, stake: Decimal, moeda: Currency) -> Self {
        Self {
            bookmaker_id: Some(bookmaker_id),
            odd,
            stake,
            moeda,
            cotacao: None,
            entries: Vec::new(),
            resultado: None,
            saldo_aplicado: None,
        }
    }

    pub fn is_settled(&self) -> bool {
        self.resultado.is_some()
    }
}

/// Row of the `apostas_unificada` table.
///
/// `versao` backs the compare-and-swap used by settlement: every write of
/// `pernas` must carry the version it read, and bumps it by one.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Operation {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    pub forma_registro: RecordForm,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub estrategia: Option<String>,
    pub contexto_operacional: OperationContext,
    pub status_operacao: OperationStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub evento: Option<String>,
    pub pernas: Vec<Leg>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lucro_total: Option<Decimal>,
    pub versao: i64,
    pub criado_em: DateTime<Utc>,
}

impl Operation {
    pub fn is_fully_settled(&self) -> bool {
        !self.pernas.is_empty() && self.pernas.iter().all(Leg::is_settled)
    }
}
