//! Pure functions that reduce a list of transactions to the totals and time
//! series shown on the dashboard.
//!
//! All functions accept the transactions in any order and sort internally
//! where order matters, so callers do not need to pre-sort.

use std::collections::{BTreeMap, HashMap};

use serde::Serialize;
use time::Date;

use crate::transaction::{Transaction, TransactionKind};

/// The overall income, expense, and net totals.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReportTotals {
    /// The sum of all income amounts.
    pub total_income: f64,
    /// The sum of all expense amounts.
    pub total_expense: f64,
    /// `total_income - total_expense`.
    pub net_balance: f64,
}

/// The income and expense totals for a single day.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DailyTotal {
    /// The day the totals are for.
    #[serde(with = "crate::transaction::iso_date")]
    pub date: Date,
    /// The sum of the day's income amounts.
    pub income: f64,
    /// The sum of the day's expense amounts.
    pub expense: f64,
}

/// The account balance after applying one transaction.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BalancePoint {
    /// The date of the transaction that produced this balance.
    #[serde(with = "crate::transaction::iso_date")]
    pub date: Date,
    /// The balance after applying the transaction.
    pub balance: f64,
}

/// The total spent in one expense category.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryTotal {
    /// The name of the category.
    pub category: String,
    /// The sum of the category's expense amounts.
    pub total: f64,
}

/// Sum the income and expense totals over all transactions.
///
/// Empty input produces all-zero totals.
pub fn report_totals(transactions: &[Transaction]) -> ReportTotals {
    let mut total_income = 0.0;
    let mut total_expense = 0.0;

    for transaction in transactions {
        match transaction.kind {
            TransactionKind::Income => total_income += transaction.amount,
            TransactionKind::Expense => total_expense += transaction.amount,
        }
    }

    ReportTotals {
        total_income,
        total_expense,
        net_balance: total_income - total_expense,
    }
}

/// Group transactions by day and sum income and expense per bucket.
///
/// The buckets are returned in ascending date order. Days with no
/// transactions do not get zero-filled buckets.
pub fn daily_totals(transactions: &[Transaction]) -> Vec<DailyTotal> {
    let mut totals_by_date: HashMap<Date, (f64, f64)> = HashMap::new();

    for transaction in transactions {
        let entry = totals_by_date.entry(transaction.date).or_insert((0.0, 0.0));

        match transaction.kind {
            TransactionKind::Income => entry.0 += transaction.amount,
            TransactionKind::Expense => entry.1 += transaction.amount,
        }
    }

    let mut totals: Vec<_> = totals_by_date
        .into_iter()
        .map(|(date, (income, expense))| DailyTotal {
            date,
            income,
            expense,
        })
        .collect();
    totals.sort_by_key(|daily_total| daily_total.date);

    totals
}

/// The balance after each transaction, in chronological order.
///
/// Transactions are stable-sorted by date, so same-day transactions keep
/// their input order. Each transaction produces one point carrying the
/// running balance after adding (income) or subtracting (expense) its
/// amount.
pub fn running_balance(transactions: &[Transaction]) -> Vec<BalancePoint> {
    let mut sorted: Vec<_> = transactions.to_vec();
    sorted.sort_by_key(|transaction| transaction.date);

    let mut balance = 0.0;

    sorted
        .into_iter()
        .map(|transaction| {
            match transaction.kind {
                TransactionKind::Income => balance += transaction.amount,
                TransactionKind::Expense => balance -= transaction.amount,
            }

            BalancePoint {
                date: transaction.date,
                balance,
            }
        })
        .collect()
}

/// Sum expense amounts per category, ignoring income.
///
/// Categories are emitted in the order they first appear in the
/// date-sorted sequence, so the result is deterministic for a fixed input.
pub fn expense_totals_by_category(transactions: &[Transaction]) -> Vec<CategoryTotal> {
    let mut sorted: Vec<_> = transactions.to_vec();
    sorted.sort_by_key(|transaction| transaction.date);

    let mut totals: Vec<CategoryTotal> = Vec::new();
    let mut index_by_category: HashMap<String, usize> = HashMap::new();

    for transaction in sorted {
        if transaction.kind != TransactionKind::Expense {
            continue;
        }

        match index_by_category.get(&transaction.category) {
            Some(&index) => totals[index].total += transaction.amount,
            None => {
                index_by_category.insert(transaction.category.clone(), totals.len());
                totals.push(CategoryTotal {
                    category: transaction.category,
                    total: transaction.amount,
                });
            }
        }
    }

    totals
}

/// The expense category with the highest total, or `None` when there are no
/// expenses. Ties go to the category seen first in the date-sorted sequence.
pub fn top_expense_category(transactions: &[Transaction]) -> Option<CategoryTotal> {
    expense_totals_by_category(transactions)
        .into_iter()
        .reduce(|best, candidate| {
            if candidate.total > best.total {
                candidate
            } else {
                best
            }
        })
}

/// The signed total per category: income adds, expense subtracts.
///
/// Returned as a sorted map so the JSON report is stable across runs.
pub fn category_summary(transactions: &[Transaction]) -> BTreeMap<String, f64> {
    let mut summary = BTreeMap::new();

    for transaction in transactions {
        let entry = summary.entry(transaction.category.clone()).or_insert(0.0);

        match transaction.kind {
            TransactionKind::Income => *entry += transaction.amount,
            TransactionKind::Expense => *entry -= transaction.amount,
        }
    }

    summary
}
