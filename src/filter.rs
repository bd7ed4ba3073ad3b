//! Narrows a list of transactions down to the ones matching a search term,
//! category, and date range.

use serde::Deserialize;
use time::Date;

use crate::transaction::Transaction;

/// The category value that matches every transaction.
pub const ALL_CATEGORIES: &str = "all";

/// The predicates a transaction must satisfy to pass the filter.
///
/// Every field is optional; an absent field matches everything, so the
/// default filter passes the input through unchanged.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct TransactionFilter {
    /// A case-insensitive substring to look for in descriptions.
    pub search: Option<String>,

    /// The category to keep, compared case-insensitively.
    /// [ALL_CATEGORIES] matches everything.
    pub category: Option<String>,

    /// The earliest date to keep, inclusive.
    #[serde(default, with = "crate::transaction::iso_date::option")]
    pub start_date: Option<Date>,

    /// The latest date to keep, inclusive. Day granularity means the whole
    /// of this day is covered.
    #[serde(default, with = "crate::transaction::iso_date::option")]
    pub end_date: Option<Date>,
}

/// Whether `transaction` satisfies all of the filter's active predicates.
pub fn matches_filter(transaction: &Transaction, filter: &TransactionFilter) -> bool {
    let matches_search = match filter.search.as_deref() {
        None | Some("") => true,
        Some(search) => transaction
            .description
            .to_lowercase()
            .contains(&search.to_lowercase()),
    };

    let matches_category = match filter.category.as_deref() {
        None => true,
        Some(category) if category.eq_ignore_ascii_case(ALL_CATEGORIES) => true,
        Some(category) => transaction.category.eq_ignore_ascii_case(category),
    };

    let matches_start = filter
        .start_date
        .is_none_or(|start_date| transaction.date >= start_date);
    let matches_end = filter
        .end_date
        .is_none_or(|end_date| transaction.date <= end_date);

    matches_search && matches_category && matches_start && matches_end
}

/// The subsequence of `transactions` satisfying all of the filter's active
/// predicates, in the original order.
pub fn filter_transactions(
    transactions: &[Transaction],
    filter: &TransactionFilter,
) -> Vec<Transaction> {
    transactions
        .iter()
        .filter(|transaction| matches_filter(transaction, filter))
        .cloned()
        .collect()
}

/// The distinct categories present in `transactions`, in first-seen order,
/// preceded by the [ALL_CATEGORIES] sentinel.
pub fn category_options(transactions: &[Transaction]) -> Vec<String> {
    let mut options = vec![ALL_CATEGORIES.to_owned()];

    for transaction in transactions {
        if !options
            .iter()
            .any(|option| option.eq_ignore_ascii_case(&transaction.category))
        {
            options.push(transaction.category.clone());
        }
    }

    options
}

#[cfg(test)]
mod filter_tests {
    use time::macros::date;

    use crate::transaction::{Transaction, TransactionKind};

    use super::{TransactionFilter, category_options, filter_transactions};

    fn sample_transactions() -> Vec<Transaction> {
        vec![
            Transaction {
                id: 1,
                date: date!(2024 - 01 - 01),
                kind: TransactionKind::Income,
                category: "Salary".to_owned(),
                amount: 1000.0,
                description: "Monthly salary".to_owned(),
            },
            Transaction {
                id: 2,
                date: date!(2024 - 01 - 02),
                kind: TransactionKind::Expense,
                category: "Groceries".to_owned(),
                amount: 250.50,
                description: "Weekly shop".to_owned(),
            },
            Transaction {
                id: 3,
                date: date!(2024 - 01 - 05),
                kind: TransactionKind::Expense,
                category: "Entertainment".to_owned(),
                amount: 30.0,
                description: "Cinema tickets".to_owned(),
            },
        ]
    }

    #[test]
    fn empty_filter_returns_input_unchanged() {
        let transactions = sample_transactions();

        let filtered = filter_transactions(&transactions, &TransactionFilter::default());

        assert_eq!(filtered, transactions);
    }

    #[test]
    fn search_is_case_insensitive_substring() {
        let transactions = sample_transactions();
        let filter = TransactionFilter {
            search: Some("WEEKLY".to_owned()),
            ..Default::default()
        };

        let filtered = filter_transactions(&transactions, &filter);

        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered[0].description, "Weekly shop");
    }

    #[test]
    fn empty_search_matches_everything() {
        let transactions = sample_transactions();
        let filter = TransactionFilter {
            search: Some(String::new()),
            ..Default::default()
        };

        let filtered = filter_transactions(&transactions, &filter);

        assert_eq!(filtered, transactions);
    }

    #[test]
    fn category_matches_case_insensitively() {
        let transactions = sample_transactions();
        let filter = TransactionFilter {
            category: Some("groceries".to_owned()),
            ..Default::default()
        };

        let filtered = filter_transactions(&transactions, &filter);

        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered[0].category, "Groceries");
    }

    #[test]
    fn all_category_matches_everything() {
        let transactions = sample_transactions();
        let filter = TransactionFilter {
            category: Some("all".to_owned()),
            ..Default::default()
        };

        let filtered = filter_transactions(&transactions, &filter);

        assert_eq!(filtered, transactions);
    }

    #[test]
    fn date_range_is_inclusive_on_both_ends() {
        let transactions = sample_transactions();
        let filter = TransactionFilter {
            start_date: Some(date!(2024 - 01 - 02)),
            end_date: Some(date!(2024 - 01 - 02)),
            ..Default::default()
        };

        let filtered = filter_transactions(&transactions, &filter);

        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered[0].category, "Groceries");
    }

    #[test]
    fn predicates_combine_with_and() {
        let transactions = sample_transactions();
        let filter = TransactionFilter {
            search: Some("shop".to_owned()),
            category: Some("Entertainment".to_owned()),
            ..Default::default()
        };

        let filtered = filter_transactions(&transactions, &filter);

        assert!(filtered.is_empty());
    }

    #[test]
    fn filtering_is_idempotent() {
        let transactions = sample_transactions();
        let filter = TransactionFilter {
            search: Some("s".to_owned()),
            start_date: Some(date!(2024 - 01 - 01)),
            ..Default::default()
        };

        let once = filter_transactions(&transactions, &filter);
        let twice = filter_transactions(&once, &filter);

        assert_eq!(once, twice);
    }

    #[test]
    fn category_options_lists_distinct_categories_after_sentinel() {
        let transactions = sample_transactions();

        let options = category_options(&transactions);

        assert_eq!(options, vec!["all", "Salary", "Groceries", "Entertainment"]);
    }

    #[test]
    fn filter_deserializes_with_empty_dates_as_no_bound() {
        let filter: TransactionFilter = serde_json::from_value(serde_json::json!({
            "search": "shop",
            "category": "all",
            "start_date": "2024-01-01",
            "end_date": "",
        }))
        .expect("Could not deserialize filter");

        assert_eq!(filter.search.as_deref(), Some("shop"));
        assert_eq!(filter.category.as_deref(), Some("all"));
        assert_eq!(filter.start_date, Some(date!(2024 - 01 - 01)));
        assert_eq!(filter.end_date, None);
    }
}
