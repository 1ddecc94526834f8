use anyhow::Result;
use clap::{Parser, Subcommand};
use rust_decimal::Decimal;
use suretrack::dto::{LegResult, TransactionKind, TransactionStatus};
use suretrack::{report, BackendApiClient, Config, LedgerService, OperationService};
use tracing::info;

#[derive(Parser)]
#[command(name = "suretrack")]
#[command(about = "Surebet operations tracker CLI", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List pending cash movements awaiting reconciliation
    Pending {
        /// Narrow to one kind (DEPOSITO, SAQUE, APORTE_FINANCEIRO, TRANSFERENCIA)
        #[arg(short, long)]
        kind: Option<String>,
    },
    /// Confirm a pending transaction at its reconciled value
    Reconcile {
        /// cash_ledger row id
        id: i64,
        /// Value actually observed at the bookmaker/bank
        valor_confirmado: Decimal,
    },
    /// Settle one leg of an operation with a terminal result
    Settle {
        /// apostas_unificada row id
        operation_id: i64,
        /// Zero-based leg index
        leg: usize,
        /// GREEN, MEIO_GREEN, RED, MEIO_RED or VOID
        resultado: String,
    },
    /// Caixa totals per currency (confirmed and pending)
    Caixa,
    /// Investor contribution/return ROI table
    Roi,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    let config = Config::new()?;

    match cli.command {
        Commands::Pending { kind } => {
            let kind = kind
                .map(|k| k.parse::<TransactionKind>())
                .transpose()
                .map_err(|e| anyhow::anyhow!(e))?;
            let ledger = LedgerService::new(BackendApiClient::new(config));
            let pending = ledger.list_pending(kind).await?;
            if pending.is_empty() {
                println!("No pending transactions.");
                return Ok(());
            }
            println!("{:<8} {:<20} {:>14} {:<5} {}", "ID", "TIPO", "VALOR", "", "DATA");
            for tx in pending {
                println!(
                    "{:<8} {:<20} {:>14} {:<5} {}",
                    tx.id.unwrap_or_default(),
                    tx.tipo_transacao.as_str(),
                    tx.valor,
                    tx.moeda.code(),
                    tx.data_transacao.format("%Y-%m-%d %H:%M")
                );
            }
        }
        Commands::Reconcile {
            id,
            valor_confirmado,
        } => {
            let ledger = LedgerService::new(BackendApiClient::new(config));
            match ledger.confirm_transaction(id, valor_confirmado).await {
                Ok(outcome) => {
                    println!(
                        "Transaction {} confirmed: nominal {}, confirmed {}",
                        outcome.transacao_id, outcome.valor_nominal, outcome.valor_confirmado
                    );
                    if let Some(ajuste) = outcome.ajuste {
                        println!("Exchange adjustment recorded: {ajuste}");
                    }
                }
                Err(err) if err.is_conflict() => {
                    println!("Not confirmed: {err}");
                }
                Err(err) => return Err(err.into()),
            }
        }
        Commands::Settle {
            operation_id,
            leg,
            resultado,
        } => {
            let resultado: LegResult = resultado.parse().map_err(|e: String| anyhow::anyhow!(e))?;
            let operations = OperationService::new(BackendApiClient::new(config));
            let outcome = operations.settle_leg(operation_id, leg, resultado).await?;
            println!(
                "Operation {} leg {} settled as {:?} (balance delta {})",
                outcome.operation_id, outcome.leg_index, outcome.resultado, outcome.delta_aplicado
            );
            if let Some(lucro) = outcome.lucro_total {
                println!("Operation closed, total profit: {lucro}");
            }
        }
        Commands::Caixa => {
            let ledger = LedgerService::new(BackendApiClient::new(config));
            let confirmed = ledger.list_by_status(TransactionStatus::Confirmado).await?;
            let pending = ledger.list_by_status(TransactionStatus::Pendente).await?;
            info!(
                "Fetched {} confirmed and {} pending rows",
                confirmed.len(),
                pending.len()
            );

            println!("Confirmed:");
            for (moeda, total) in report::sum_by_currency(&confirmed, TransactionStatus::Confirmado)
            {
                println!("  {} {}", moeda.symbol(), total);
            }
            println!("Pending:");
            for (moeda, total) in report::sum_by_currency(&pending, TransactionStatus::Pendente) {
                println!("  {} {}", moeda.symbol(), total);
            }
        }
        Commands::Roi => {
            let ledger = LedgerService::new(BackendApiClient::new(config));
            let confirmed = ledger.list_by_status(TransactionStatus::Confirmado).await?;
            let rows = report::investor_roi(&confirmed);
            if rows.is_empty() {
                println!("No investor activity yet.");
                return Ok(());
            }
            println!(
                "{:<20} {:>14} {:>14} {:>10}",
                "INVESTIDOR", "APORTADO", "RETORNADO", "ROI %"
            );
            for r in rows {
                let roi = r
                    .roi_pct
                    .map(|p| format!("{:.2}", p))
                    .unwrap_or_else(|| "-".to_string());
                println!(
                    "{:<20} {:>14} {:>14} {:>10}",
                    r.investidor, r.total_aportado, r.total_retornado, roi
                );
            }
        }
    }

    Ok(())
}
