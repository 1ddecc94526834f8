//! Betting-operation lifecycle: draft validation, immutable save-time
//! snapshots and idempotent per-leg settlement.

use crate::api_client::{eq, BackendApiClient};
use crate::balance::{validate_draft, ValidationMode};
use crate::dto::{Bookmaker, Currency, CurrencySnapshot, LegResult, Operation, OperationStatus};
use crate::error::{Error, Result};
use crate::settlement::{balance_delta, leg_contribution, operation_profit};
use chrono::Utc;
use rust_decimal::Decimal;
use serde_json::json;
use std::collections::HashMap;
use tracing::{info, warn};

pub const OPERATIONS_TABLE: &str = "apostas_unificada";
pub const BOOKMAKERS_TABLE: &str = "bookmakers";

/// Result of settling one leg.
#[derive(Debug, Clone, PartialEq)]
pub struct SettleOutcome {
    pub operation_id: i64,
    pub leg_index: usize,
    pub resultado: LegResult,
    /// Net change applied to the bookmaker balance (new contribution minus
    /// whatever a previous settlement of this leg had applied).
    pub delta_aplicado: Decimal,
    /// Set when this settlement closed the whole operation.
    pub lucro_total: Option<Decimal>,
}

pub struct OperationService {
    api: BackendApiClient,
}

impl OperationService {
    pub fn new(api: BackendApiClient) -> Self {
        Self { api }
    }

    pub fn api(&self) -> &BackendApiClient {
        &self.api
    }

    pub async fn load(&self, id: i64) -> Result<Operation> {
        self.api.select_by_id(OPERATIONS_TABLE, id).await
    }

    pub async fn list_open(&self) -> Result<Vec<Operation>> {
        self.api
            .select(OPERATIONS_TABLE, &[eq("status_operacao", "EM_ABERTO")])
            .await
    }

    pub async fn list_settled(&self) -> Result<Vec<Operation>> {
        self.api
            .select(OPERATIONS_TABLE, &[eq("status_operacao", "LIQUIDADA")])
            .await
    }

    pub async fn bookmaker_balances(&self) -> Result<HashMap<i64, Bookmaker>> {
        let rows: Vec<Bookmaker> = self.api.select(BOOKMAKERS_TABLE, &[]).await?;
        Ok(rows.into_iter().map(|b| (b.id, b)).collect())
    }

    /// Validate the draft against the canonical balances, freeze currency
    /// snapshots and persist the operation.
    ///
    /// `rates` maps each leg currency to its conversion rate at save time;
    /// the snapshot written into `pernas` is what reporting reads later,
    /// immune to subsequent rate changes. Legs that already carry a snapshot
    /// (edit flows) keep it.
    pub async fn save(
        &self,
        mut operation: Operation,
        rates: &HashMap<Currency, Decimal>,
        mode: ValidationMode,
    ) -> Result<Operation> {
        let saldos = self.bookmaker_balances().await?;
        validate_draft(&operation.pernas, &saldos, mode)?;

        let now = Utc::now();
        for leg in &mut operation.pernas {
            if leg.cotacao.is_none() {
                let taxa = rates.get(&leg.moeda).copied().ok_or_else(|| {
                    Error::Validation(format!("no conversion rate for {}", leg.moeda))
                })?;
                leg.cotacao = Some(CurrencySnapshot {
                    taxa,
                    capturada_em: now,
                });
            }
        }

        operation.status_operacao = OperationStatus::EmAberto;
        operation.versao = 1;
        let saved: Operation = self.api.insert(OPERATIONS_TABLE, &operation).await?;
        info!(
            "Operation {:?} saved with {} legs",
            saved.id,
            saved.pernas.len()
        );
        Ok(saved)
    }

    /// Settle one leg with a terminal outcome.
    ///
    /// The write-back of `pernas` goes through the version compare-and-swap,
    /// so two concurrent settlements of the same operation cannot both land:
    /// the loser gets [`Error::Conflict`] and applies nothing. The balance
    /// adjustment happens after the swap is won; its failure is logged and
    /// left for manual follow-up rather than rolled back.
    ///
    /// Re-settling a leg (result correction) reverses the previously applied
    /// balance delta before applying the new one, so the cumulative effect
    /// always equals a single application of the latest result.
    pub async fn settle_leg(
        &self,
        operation_id: i64,
        leg_index: usize,
        resultado: LegResult,
    ) -> Result<SettleOutcome> {
        let mut operation = self.load(operation_id).await?;
        let expected_version = operation.versao;

        let leg = operation.pernas.get(leg_index).ok_or_else(|| {
            Error::Validation(format!(
                "operation {operation_id} has no leg {leg_index} ({} legs)",
                operation.pernas.len()
            ))
        })?;

        let delta = balance_delta(leg, resultado);
        let contribution = leg_contribution(leg, resultado);
        let bookmaker_id = leg.bookmaker_id;

        {
            let leg = &mut operation.pernas[leg_index];
            leg.resultado = Some(resultado);
            leg.saldo_aplicado = Some(contribution);
        }

        let lucro_total = if operation.is_fully_settled() {
            operation.status_operacao = OperationStatus::Liquidada;
            operation.lucro_total = operation_profit(&operation.pernas);
            operation.lucro_total
        } else {
            None
        };

        operation.versao = expected_version + 1;
        let patch = json!({
            "pernas": operation.pernas,
            "status_operacao": operation.status_operacao,
            "lucro_total": operation.lucro_total,
            "versao": operation.versao,
        });

        let won = self
            .api
            .compare_and_swap_version(OPERATIONS_TABLE, operation_id, expected_version, patch)
            .await?;
        if !won {
            return Err(Error::Conflict(format!(
                "operation {operation_id} was settled concurrently (version {expected_version} is stale)"
            )));
        }
        info!(
            "Operation {} leg {} settled as {:?} (delta {})",
            operation_id, leg_index, resultado, delta
        );

        if !delta.is_zero() {
            if let Some(bookmaker_id) = bookmaker_id {
                if let Err(err) = self.adjust_bookmaker_balance(bookmaker_id, delta).await {
                    warn!(
                        "Balance adjustment of {} for bookmaker {} failed (continuing): {}",
                        delta, bookmaker_id, err
                    );
                }
            }
        }

        Ok(SettleOutcome {
            operation_id,
            leg_index,
            resultado,
            delta_aplicado: delta,
            lucro_total,
        })
    }

    async fn adjust_bookmaker_balance(&self, bookmaker_id: i64, delta: Decimal) -> Result<()> {
        let bookmaker: Bookmaker = self.api.select_by_id(BOOKMAKERS_TABLE, bookmaker_id).await?;
        let patch = json!({ "saldo_atual": bookmaker.saldo_atual + delta });
        let rows: Vec<Bookmaker> = self
            .api
            .update(BOOKMAKERS_TABLE, &[eq("id", bookmaker_id)], &patch)
            .await?;
        if rows.is_empty() {
            return Err(Error::NotFound(format!("bookmakers id {bookmaker_id}")));
        }
        Ok(())
    }
}
