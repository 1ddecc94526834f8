use super::common::{Currency, TransactionKind, TransactionStatus};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// One entry of the append-only edit history kept inside
/// `auditoria_metadata`. Field names are the persisted JSON contract and
/// must not change.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EditRecord {
    /// What was edited: `"data"` or `"valor"`.
    pub tipo: String,
    pub data_anterior: String,
    pub data_nova: String,
    pub alterado_por: String,
    pub alterado_em: DateTime<Utc>,
}

/// Audit blob attached to every ledger row. Edits are appended, never
/// rewritten.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct AuditMetadata {
    #[serde(default)]
    pub historico_edicoes: Vec<EditRecord>,
}

impl AuditMetadata {
    /// Append one edit to the history. There is deliberately no API to
    /// remove or rewrite entries.
    pub fn record_edit(
        &mut self,
        tipo: &str,
        anterior: impl Into<String>,
        nova: impl Into<String>,
        alterado_por: &str,
    ) {
        self.historico_edicoes.push(EditRecord {
            tipo: tipo.to_string(),
            data_anterior: anterior.into(),
            data_nova: nova.into(),
            alterado_por: alterado_por.to_string(),
            alterado_em: Utc::now(),
        });
    }
}

/// Row of the `cash_ledger` table. Column names mirror the backend schema.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CashTransaction {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    pub tipo_transacao: TransactionKind,
    pub status: TransactionStatus,
    pub valor: Decimal,
    pub moeda: Currency,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub valor_usd: Option<Decimal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub valor_destino: Option<Decimal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub valor_confirmado: Option<Decimal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub moeda_destino: Option<Currency>,
    pub data_transacao: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bookmaker_origem_id: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bookmaker_destino_id: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub carteira_id: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub conta_bancaria_id: Option<i64>,
    /// Investor or partner name, set on APORTE_FINANCEIRO and on withdrawals
    /// paid out to an investor.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub investidor: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub conciliado_por: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub conciliado_em: Option<DateTime<Utc>>,
    #[serde(default)]
    pub auditoria_metadata: AuditMetadata,
}

/// Currency gain/loss produced during reconciliation when the confirmed
/// value differs from the nominal one. Row of `exchange_adjustments`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExchangeAdjustment {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    pub transacao_id: i64,
    pub moeda: Currency,
    pub valor_nominal: Decimal,
    pub valor_confirmado: Decimal,
    /// Positive is a gain, negative a loss.
    pub diferenca: Decimal,
    pub criado_em: DateTime<Utc>,
}

/// Row of `freebets_recebidas`: a freebet credit granted by a bookmaker.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FreebetReceived {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    pub bookmaker_id: i64,
    pub valor: Decimal,
    pub moeda: Currency,
    pub recebido_em: DateTime<Utc>,
    #[serde(default)]
    pub utilizado: bool,
}
