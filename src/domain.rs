use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;
use uuid::Uuid;

pub const DEFAULT_CATEGORY: &str = "Uncategorized";

/// Largest accepted amount (one trillion). Sums of any realistic number of
/// entries stay far below `Decimal::MAX`.
pub const MAX_AMOUNT: Decimal = Decimal::from_parts(3_567_587_328, 232, 0, false, 0);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionKind {
    Income,
    Expense,
}

impl TransactionKind {
    pub fn as_str(self) -> &'static str {
        match self {
            TransactionKind::Income => "income",
            TransactionKind::Expense => "expense",
        }
    }
}

impl fmt::Display for TransactionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TransactionKind {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "income" => Ok(TransactionKind::Income),
            "expense" => Ok(TransactionKind::Expense),
            other => Err(ValidationError::UnknownKind(other.to_string())),
        }
    }
}

/// Which slice of the store a listing shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TypeFilter {
    #[default]
    All,
    Income,
    Expense,
}

impl TypeFilter {
    pub fn matches(self, kind: TransactionKind) -> bool {
        match self {
            TypeFilter::All => true,
            TypeFilter::Income => kind == TransactionKind::Income,
            TypeFilter::Expense => kind == TransactionKind::Expense,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    pub id: Uuid,
    #[serde(rename = "type")]
    pub kind: TransactionKind,
    /// Always in `(0, MAX_AMOUNT]`. Persisted as an exact JSON number.
    #[serde(with = "rust_decimal::serde::arbitrary_precision")]
    pub amount: Decimal,
    pub description: String,
    pub category: String,
    pub date: NaiveDate,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Please enter a valid amount greater than zero (got '{0}')")]
    InvalidAmount(String),
    #[error("Amount '{0}' is too large; the maximum is {max}", max = MAX_AMOUNT)]
    AmountTooLarge(String),
    #[error("Please enter a description")]
    MissingDescription,
    #[error("Please select a date")]
    MissingDate,
    #[error("Invalid date '{0}'. Expected YYYY-MM-DD")]
    InvalidDate(String),
    #[error("Unknown transaction type '{0}'. Expected income or expense")]
    UnknownKind(String),
}

/// Raw form input. Nothing here is trusted until `validate` succeeds.
#[derive(Debug, Clone, Default)]
pub struct TransactionDraft {
    pub kind: String,
    pub amount: String,
    pub description: String,
    pub category: String,
    pub date: String,
}

impl TransactionDraft {
    pub fn validate(&self) -> Result<Transaction, ValidationError> {
        let kind = self.kind.parse::<TransactionKind>()?;

        let raw_amount = self.amount.trim();
        let amount = raw_amount
            .parse::<Decimal>()
            .map_err(|_| ValidationError::InvalidAmount(raw_amount.to_string()))?;
        if amount <= Decimal::ZERO {
            return Err(ValidationError::InvalidAmount(raw_amount.to_string()));
        }
        if amount > MAX_AMOUNT {
            return Err(ValidationError::AmountTooLarge(raw_amount.to_string()));
        }

        let description = self.description.trim();
        if description.is_empty() {
            return Err(ValidationError::MissingDescription);
        }

        let raw_date = self.date.trim();
        if raw_date.is_empty() {
            return Err(ValidationError::MissingDate);
        }
        let date = NaiveDate::parse_from_str(raw_date, "%Y-%m-%d")
            .map_err(|_| ValidationError::InvalidDate(raw_date.to_string()))?;

        let category = match self.category.trim() {
            "" => DEFAULT_CATEGORY.to_string(),
            c => c.to_string(),
        };

        Ok(Transaction {
            id: Uuid::new_v4(),
            kind,
            amount,
            description: description.to_string(),
            category,
            date,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn draft(kind: &str, amount: &str, description: &str, category: &str, date: &str) -> TransactionDraft {
        TransactionDraft {
            kind: kind.to_string(),
            amount: amount.to_string(),
            description: description.to_string(),
            category: category.to_string(),
            date: date.to_string(),
        }
    }

    #[test]
    fn empty_category_defaults_to_uncategorized() {
        let tx = draft("income", "100", "Salary", "", "2024-01-15")
            .validate()
            .expect("valid");
        assert_eq!(tx.category, DEFAULT_CATEGORY);
        assert_eq!(tx.kind, TransactionKind::Income);
        assert_eq!(tx.amount, Decimal::from(100));
        assert_eq!(tx.date, NaiveDate::from_ymd_opt(2024, 1, 15).unwrap());
    }

    #[test]
    fn zero_negative_and_garbage_amounts_are_rejected() {
        for raw in ["0", "0.00", "-5", "abc", ""] {
            let err = draft("expense", raw, "Coffee", "Food", "2024-01-15")
                .validate()
                .unwrap_err();
            assert!(matches!(err, ValidationError::InvalidAmount(_)), "{raw}");
        }
    }

    #[test]
    fn amount_upper_bound_is_inclusive() {
        assert_eq!(MAX_AMOUNT, Decimal::from(1_000_000_000_000u64));

        let tx = draft("income", "1000000000000", "Lottery", "", "2024-01-15")
            .validate()
            .expect("max amount accepted");
        assert_eq!(tx.amount, MAX_AMOUNT);

        for raw in ["1000000000000.01", "50000000000000000000000000000", "79228162514264337593543950335"] {
            let err = draft("income", raw, "Lottery", "", "2024-01-15")
                .validate()
                .unwrap_err();
            assert_eq!(err, ValidationError::AmountTooLarge(raw.to_string()));
        }
    }

    #[test]
    fn blank_description_is_rejected() {
        let err = draft("expense", "3", "   ", "", "2024-01-15")
            .validate()
            .unwrap_err();
        assert_eq!(err, ValidationError::MissingDescription);
    }

    #[test]
    fn missing_and_malformed_dates_are_rejected() {
        let missing = draft("expense", "3", "Coffee", "", " ").validate().unwrap_err();
        assert_eq!(missing, ValidationError::MissingDate);

        let bad = draft("expense", "3", "Coffee", "", "15/01/2024")
            .validate()
            .unwrap_err();
        assert!(matches!(bad, ValidationError::InvalidDate(_)));
    }

    #[test]
    fn description_and_category_are_trimmed() {
        let tx = draft("Expense", " 4.50 ", "  Lunch ", " Food ", "2024-02-29")
            .validate()
            .expect("valid");
        assert_eq!(tx.description, "Lunch");
        assert_eq!(tx.category, "Food");
        assert_eq!(tx.kind, TransactionKind::Expense);
    }

    #[test]
    fn ids_are_not_reused() {
        let d = draft("income", "1", "Gift", "", "2024-01-01");
        let a = d.validate().unwrap();
        let b = d.validate().unwrap();
        assert_ne!(a.id, b.id);
    }

    #[test]
    fn type_filter_matches() {
        assert!(TypeFilter::All.matches(TransactionKind::Expense));
        assert!(TypeFilter::Income.matches(TransactionKind::Income));
        assert!(!TypeFilter::Income.matches(TransactionKind::Expense));
        assert!(!TypeFilter::Expense.matches(TransactionKind::Income));
    }

    #[test]
    fn persisted_shape_uses_type_key_and_plain_date() {
        let tx = draft("income", "12.5", "Refund", "", "2024-03-01")
            .validate()
            .unwrap();
        let value = serde_json::to_value(&tx).unwrap();
        assert_eq!(value["type"], "income");
        assert_eq!(value["date"], "2024-03-01");
        assert_eq!(value["amount"], serde_json::json!(12.5));
        assert!(value["id"].is_string());
    }
}
