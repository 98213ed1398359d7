use crate::domain::{Transaction, TransactionKind};
use chrono::{Datelike, Duration, Months, NaiveDateTime, NaiveTime};
use rust_decimal::Decimal;
use tracing::warn;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Totals {
    pub income: Decimal,
    pub expense: Decimal,
    pub balance: Decimal,
}

fn add_saturating(sum: Decimal, amount: Decimal) -> Decimal {
    sum.checked_add(amount).unwrap_or_else(|| {
        warn!(%sum, %amount, "total overflowed; clamping to the largest representable amount");
        Decimal::MAX
    })
}

/// Sums saturate at `Decimal::MAX`. Both sides are non-negative, so the
/// balance itself cannot overflow.
pub fn totals(transactions: &[Transaction]) -> Totals {
    let mut income = Decimal::ZERO;
    let mut expense = Decimal::ZERO;
    for t in transactions {
        match t.kind {
            TransactionKind::Income => income = add_saturating(income, t.amount),
            TransactionKind::Expense => expense = add_saturating(expense, t.amount),
        }
    }
    Totals {
        income,
        expense,
        balance: income - expense,
    }
}

/// Inclusive on both ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
}

impl DateRange {
    pub fn contains(&self, at: NaiveDateTime) -> bool {
        at >= self.start && at <= self.end
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportRange {
    Week,
    Month,
}

impl ReportRange {
    pub fn bounds(self, now: NaiveDateTime) -> DateRange {
        match self {
            ReportRange::Week => week_range(now),
            ReportRange::Month => month_range(now),
        }
    }

    pub fn heading(self) -> &'static str {
        match self {
            ReportRange::Week => "Weekly Report",
            ReportRange::Month => "Monthly Report",
        }
    }
}

fn last_instant_before(next_start: NaiveDateTime) -> NaiveDateTime {
    next_start - Duration::milliseconds(1)
}

/// Monday 00:00:00 through Sunday 23:59:59.999 of the week containing `now`.
pub fn week_range(now: NaiveDateTime) -> DateRange {
    let back = i64::from(now.weekday().num_days_from_monday());
    let start = (now.date() - Duration::days(back)).and_time(NaiveTime::MIN);
    DateRange {
        start,
        end: last_instant_before(start + Duration::days(7)),
    }
}

/// First day 00:00:00 through last day 23:59:59.999 of the month containing `now`.
pub fn month_range(now: NaiveDateTime) -> DateRange {
    let first = now.date() - Duration::days(i64::from(now.day0()));
    let next_first = first + Months::new(1);
    DateRange {
        start: first.and_time(NaiveTime::MIN),
        end: last_instant_before(next_first.and_time(NaiveTime::MIN)),
    }
}

pub fn filter_by_range(transactions: &[Transaction], range: &DateRange) -> Vec<Transaction> {
    transactions
        .iter()
        .filter(|t| range.contains(t.date.and_time(NaiveTime::MIN)))
        .cloned()
        .collect()
}
