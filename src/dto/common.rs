use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Cash movement kinds of the `cash_ledger` table.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TransactionKind {
    Deposito,
    Saque,
    AporteFinanceiro,
    Transferencia,
}

impl TransactionKind {
    /// Wire value as stored in the backend, used by kind filters.
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionKind::Deposito => "DEPOSITO",
            TransactionKind::Saque => "SAQUE",
            TransactionKind::AporteFinanceiro => "APORTE_FINANCEIRO",
            TransactionKind::Transferencia => "TRANSFERENCIA",
        }
    }
}

impl FromStr for TransactionKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "DEPOSITO" => Ok(TransactionKind::Deposito),
            "SAQUE" => Ok(TransactionKind::Saque),
            "APORTE_FINANCEIRO" => Ok(TransactionKind::AporteFinanceiro),
            "TRANSFERENCIA" => Ok(TransactionKind::Transferencia),
            other => Err(format!("unknown transaction kind: {other}")),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TransactionStatus {
    Pendente,
    Confirmado,
    Cancelado,
    Recusado,
}

impl TransactionStatus {
    /// Wire value as stored in the backend, used by status filters.
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionStatus::Pendente => "PENDENTE",
            TransactionStatus::Confirmado => "CONFIRMADO",
            TransactionStatus::Cancelado => "CANCELADO",
            TransactionStatus::Recusado => "RECUSADO",
        }
    }
}

/// How a betting operation was registered in `apostas_unificada`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RecordForm {
    Simples,
    Multipla,
    Arbitragem,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OperationContext {
    Normal,
    Freebet,
    Bonus,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OperationStatus {
    EmAberto,
    Liquidada,
}

/// Terminal outcome of a single operation leg.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LegResult {
    Green,
    MeioGreen,
    Red,
    MeioRed,
    Void,
}

impl FromStr for LegResult {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "GREEN" => Ok(LegResult::Green),
            "MEIO_GREEN" => Ok(LegResult::MeioGreen),
            "RED" => Ok(LegResult::Red),
            "MEIO_RED" => Ok(LegResult::MeioRed),
            "VOID" => Ok(LegResult::Void),
            other => Err(format!("unknown leg result: {other}")),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Currency {
    BRL,
    USD,
    EUR,
    GBP,
}

impl Currency {
    pub fn code(&self) -> &'static str {
        match self {
            Currency::BRL => "BRL",
            Currency::USD => "USD",
            Currency::EUR => "EUR",
            Currency::GBP => "GBP",
        }
    }

    pub fn symbol(&self) -> &'static str {
        match self {
            Currency::BRL => "R$",
            Currency::USD => "$",
            Currency::EUR => "€",
            Currency::GBP => "£",
        }
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

impl FromStr for Currency {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "BRL" => Ok(Currency::BRL),
            "USD" => Ok(Currency::USD),
            "EUR" => Ok(Currency::EUR),
            "GBP" => Ok(Currency::GBP),
            other => Err(format!("unknown currency: {other}")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transaction_kind_wire_values() {
        let json = serde_json::to_string(&TransactionKind::AporteFinanceiro).unwrap();
        assert_eq!(json, "\"APORTE_FINANCEIRO\"");

        let kind: TransactionKind = serde_json::from_str("\"DEPOSITO\"").unwrap();
        assert_eq!(kind, TransactionKind::Deposito);
    }

    #[test]
    fn test_status_as_str_matches_serde() {
        let json = serde_json::to_string(&TransactionStatus::Pendente).unwrap();
        assert_eq!(json, format!("\"{}\"", TransactionStatus::Pendente.as_str()));
    }

    #[test]
    fn test_leg_result_round_trip() {
        let json = serde_json::to_string(&LegResult::MeioGreen).unwrap();
        assert_eq!(json, "\"MEIO_GREEN\"");
        assert_eq!("meio_green".parse::<LegResult>().unwrap(), LegResult::MeioGreen);
        assert!("HALF".parse::<LegResult>().is_err());
    }

    #[test]
    fn test_currency_parse_and_display() {
        assert_eq!("brl".parse::<Currency>().unwrap(), Currency::BRL);
        assert_eq!(Currency::USD.to_string(), "USD");
        assert_eq!(Currency::BRL.symbol(), "R$");
    }
}
