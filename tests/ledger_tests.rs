// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use chrono::{NaiveDate, TimeZone, Utc};
use rust_decimal::Decimal;
use tallybook::catalog::default_categories;
use tallybook::ledger::{self, Period, TransactionFilter};
use tallybook::models::{Account, AccountType, Transaction, TransactionType};

fn d(y: i32, m: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, day).unwrap()
}

fn dec(s: &str) -> Decimal {
    s.parse().unwrap()
}

fn account(id: &str, name: &str, typ: AccountType, initial: &str) -> Account {
    Account {
        id: id.into(),
        name: name.into(),
        r#type: typ,
        initial_balance: dec(initial),
        currency: "BRL".into(),
        created_at: Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
        bank_name: None,
        account_number_last4: None,
    }
}

fn tx(
    id: &str,
    date: NaiveDate,
    typ: TransactionType,
    amount: &str,
    category: &str,
    account_id: &str,
) -> Transaction {
    Transaction {
        id: id.into(),
        date,
        description: format!("tx {}", id),
        amount: dec(amount),
        r#type: typ,
        category: category.into(),
        account_id: account_id.into(),
        notes: None,
        imported: false,
        is_recurring_instance: false,
        peer_transaction_id: None,
    }
}

fn sample() -> (Vec<Account>, Vec<Transaction>) {
    let accounts = vec![
        account("a1", "Conta Corrente", AccountType::Checking, "1500"),
        account("a2", "Poupança", AccountType::Savings, "3000"),
        account("a3", "Cartão Gold", AccountType::CreditCard, "0"),
    ];
    let txs = vec![
        tx("t1", d(2024, 5, 1), TransactionType::Income, "5200", "Salário", "a1"),
        tx("t2", d(2024, 5, 3), TransactionType::Expense, "85.30", "Supermercado", "a1"),
        tx("t3", d(2024, 5, 4), TransactionType::Expense, "65.00", "Contas (Luz, Água, Gás)", "a1"),
        tx("t4", d(2024, 4, 20), TransactionType::Income, "750", "Freelance", "a2"),
        tx("t5", d(2024, 5, 6), TransactionType::Expense, "62.75", "Restaurantes/Lanches", "a3"),
        tx("t6", d(2024, 5, 7), TransactionType::Transfer, "500", "Transferência", "a1"),
        tx("t7", d(2024, 5, 8), TransactionType::Expense, "10", "Supermercado", "ghost"),
    ];
    (accounts, txs)
}

#[test]
fn balances_follow_initial_plus_income_minus_expense() {
    let (accounts, txs) = sample();
    let balances = ledger::account_balances(&accounts, &txs);
    let by_id = |id: &str| {
        balances
            .iter()
            .find(|b| b.account.id == id)
            .unwrap()
            .current_balance
    };
    assert_eq!(by_id("a1"), dec("6549.70"));
    assert_eq!(by_id("a2"), dec("3750"));
    assert_eq!(by_id("a3"), dec("-62.75"));
    assert_eq!(balances.len(), 3);
}

#[test]
fn balances_ignore_input_order() {
    let (accounts, mut txs) = sample();
    let forward = ledger::account_balances(&accounts, &txs);
    txs.reverse();
    let backward = ledger::account_balances(&accounts, &txs);
    assert_eq!(forward, backward);
}

#[test]
fn balances_sorted_by_name_with_accent_folding() {
    let accounts = vec![
        account("1", "poupança", AccountType::Savings, "0"),
        account("2", "Ágil", AccountType::Checking, "0"),
        account("3", "Banco", AccountType::Checking, "0"),
        account("4", "Poupança", AccountType::Savings, "0"),
    ];
    let names: Vec<String> = ledger::account_balances(&accounts, &[])
        .into_iter()
        .map(|b| b.account.name)
        .collect();
    assert_eq!(names, vec!["Ágil", "Banco", "poupança", "Poupança"]);
}

#[test]
fn net_worth_subtracts_credit_cards_and_loans() {
    let accounts = vec![
        account("c", "Checking", AccountType::Checking, "100"),
        account("cc", "Card", AccountType::CreditCard, "100"),
    ];
    let balances = ledger::account_balances(&accounts, &[]);
    assert_eq!(ledger::net_worth(&balances), Decimal::ZERO);
    assert_eq!(ledger::total_balance(&balances), dec("200"));

    let with_loan = vec![
        account("c", "Checking", AccountType::Checking, "1000"),
        account("l", "Mortgage", AccountType::Loan, "400"),
    ];
    let balances = ledger::account_balances(&with_loan, &[]);
    assert_eq!(ledger::net_worth(&balances), dec("600"));
}

#[test]
fn summary_uses_injected_today_and_skips_transfers() {
    let (_, txs) = sample();
    let s = ledger::summary(&txs, d(2024, 5, 15));
    assert_eq!(s.total_income, dec("5950"));
    assert_eq!(s.total_expenses, dec("223.05"));
    assert_eq!(s.balance, dec("5726.95"));
    assert_eq!(s.income_this_month, dec("5200"));
    assert_eq!(s.expenses_this_month, dec("223.05"));
    assert_eq!(s.savings_rate.round_dp(2), dec("96.25"));

    let april = ledger::summary(&txs, d(2024, 4, 2));
    assert_eq!(april.income_this_month, dec("750"));
    assert_eq!(april.expenses_this_month, Decimal::ZERO);
}

#[test]
fn summary_savings_rate_is_zero_without_income() {
    let txs = vec![tx("x", d(2024, 1, 1), TransactionType::Expense, "5", "Compras", "a")];
    assert_eq!(ledger::summary(&txs, d(2024, 1, 1)).savings_rate, Decimal::ZERO);
}

#[test]
fn summary_is_idempotent() {
    let (_, txs) = sample();
    let today = d(2024, 5, 15);
    assert_eq!(ledger::summary(&txs, today), ledger::summary(&txs, today));
}

#[test]
fn expense_by_category_omits_empty_and_sorts_descending() {
    let (_, txs) = sample();
    let items = ledger::expense_by_category(&txs, &default_categories());
    let names: Vec<&str> = items.iter().map(|c| c.name.as_str()).collect();
    assert_eq!(
        names,
        vec!["Supermercado", "Contas (Luz, Água, Gás)", "Restaurantes/Lanches"]
    );
    assert_eq!(items[0].total, dec("95.30"));
    assert!(items.iter().all(|c| c.total > Decimal::ZERO));
    assert!(!names.contains(&"Educação"));
}

#[test]
fn monthly_overview_keeps_latest_twelve_in_order() {
    let mut txs = Vec::new();
    let mut date = d(2022, 9, 10);
    for i in 0..20 {
        txs.push(tx(&format!("i{}", i), date, TransactionType::Income, "100", "Salário", "a"));
        txs.push(tx(&format!("e{}", i), date, TransactionType::Expense, "40", "Compras", "a"));
        date = date.checked_add_months(chrono::Months::new(1)).unwrap();
    }
    txs.reverse();
    let buckets = ledger::monthly_overview(&txs);
    assert_eq!(buckets.len(), 12);
    assert_eq!((buckets[0].year, buckets[0].month), (2023, 5));
    assert_eq!((buckets[11].year, buckets[11].month), (2024, 4));
    assert_eq!(buckets[0].label, "May 2023");
    assert!(buckets.windows(2).all(|w| (w[0].year, w[0].month) < (w[1].year, w[1].month)));
    assert!(buckets.iter().all(|b| b.income == dec("100") && b.expenses == dec("40")));
}

#[test]
fn monthly_overview_separates_same_month_in_different_years() {
    let txs = vec![
        tx("a", d(2024, 1, 5), TransactionType::Income, "10", "Salário", "a"),
        tx("b", d(2023, 1, 5), TransactionType::Expense, "3", "Compras", "a"),
        tx("c", d(2023, 12, 5), TransactionType::Transfer, "99", "Transferência", "a"),
    ];
    let buckets = ledger::monthly_overview(&txs);
    let labels: Vec<&str> = buckets.iter().map(|b| b.label.as_str()).collect();
    assert_eq!(labels, vec!["Jan 2023", "Jan 2024"]);
}

#[test]
fn period_bounds_cross_year_edges() {
    let today = d(2024, 2, 10);
    assert_eq!(Period::CurrentMonth.bounds(today), (d(2024, 2, 1), d(2024, 2, 29)));
    assert_eq!(Period::LastMonth.bounds(today), (d(2024, 1, 1), d(2024, 1, 31)));
    assert_eq!(Period::CurrentQuarter.bounds(today), (d(2024, 1, 1), d(2024, 3, 31)));
    assert_eq!(Period::LastQuarter.bounds(today), (d(2023, 10, 1), d(2023, 12, 31)));
    assert_eq!(Period::CurrentYear.bounds(today), (d(2024, 1, 1), d(2024, 12, 31)));
    assert_eq!(Period::LastYear.bounds(today), (d(2023, 1, 1), d(2023, 12, 31)));
    assert_eq!(
        Period::LastMonth.bounds(d(2024, 1, 31)),
        (d(2023, 12, 1), d(2023, 12, 31))
    );
    assert_eq!("last-quarter".parse::<Period>().unwrap(), Period::LastQuarter);
}

#[test]
fn income_statement_totals_period_by_category() {
    let (_, txs) = sample();
    let st = ledger::income_statement(&txs, &default_categories(), Period::CurrentMonth, d(2024, 5, 31));
    assert_eq!(st.start, d(2024, 5, 1));
    assert_eq!(st.end, d(2024, 5, 31));
    assert_eq!(st.income.len(), 1);
    assert_eq!(st.total_income, dec("5200"));
    assert_eq!(st.total_expenses, dec("223.05"));
    assert_eq!(st.net_result, dec("4976.95"));
    // catalog order, not amount order
    assert_eq!(st.expenses[0].name, "Supermercado");
    assert_eq!(st.expenses[1].name, "Contas (Luz, Água, Gás)");
}

#[test]
fn filter_matches_search_type_account_and_dates() {
    let (accounts, txs) = sample();
    let f = TransactionFilter {
        search: Some("poupança".into()),
        ..Default::default()
    };
    let hits = ledger::filter_transactions(&txs, &accounts, &f);
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].id, "t4");

    let f = TransactionFilter {
        r#type: Some(TransactionType::Expense),
        account_id: Some("a1".into()),
        start: Some(d(2024, 5, 4)),
        end: Some(d(2024, 5, 31)),
        ..Default::default()
    };
    let ids: Vec<&str> = ledger::filter_transactions(&txs, &accounts, &f)
        .iter()
        .map(|t| t.id.as_str())
        .collect();
    assert_eq!(ids, vec!["t3"]);

    let all = ledger::filter_transactions(&txs, &accounts, &TransactionFilter::default());
    assert_eq!(all.len(), txs.len());
    assert!(all.windows(2).all(|w| w[0].date >= w[1].date));
}

#[test]
fn account_in_use_blocks_deletion() {
    let (_, txs) = sample();
    assert!(ledger::account_in_use("a1", &txs));
    assert!(!ledger::account_in_use("unused", &txs));
}

#[test]
fn balances_with_equal_names_keep_input_order() {
    let accounts = vec![
        account("second", "Carteira", AccountType::Cash, "5"),
        account("first", "Carteira", AccountType::Cash, "7"),
        account("z", "Ágil", AccountType::Checking, "0"),
    ];
    let ids: Vec<String> = ledger::account_balances(&accounts, &[])
        .into_iter()
        .map(|b| b.account.id)
        .collect();
    assert_eq!(ids, vec!["z", "second", "first"]);
}
