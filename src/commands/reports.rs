// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::db::{get_currency, load_accounts, load_categories, load_transactions};
use crate::ledger::{self, Period};
use crate::utils::{fmt_money, maybe_print_json, pretty_table, today_or};
use anyhow::Result;
use rusqlite::Connection;
use serde_json::json;

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("balances", sub)) => balances(conn, sub)?,
        Some(("net-worth", sub)) => net_worth(conn, sub)?,
        Some(("summary", sub)) => summary(conn, sub)?,
        Some(("spend-by-category", sub)) => spend_by_category(conn, sub)?,
        Some(("monthly", sub)) => monthly(conn, sub)?,
        Some(("statement", sub)) => statement(conn, sub)?,
        _ => {}
    }
    Ok(())
}

fn balances(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let balances = ledger::account_balances(&load_accounts(conn)?, &load_transactions(conn)?);
    if !maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &balances)? {
        let data = balances
            .iter()
            .map(|b| {
                vec![
                    b.account.name.clone(),
                    b.account.r#type.to_string(),
                    b.account.currency.clone(),
                    format!("{:.2}", b.current_balance),
                ]
            })
            .collect();
        println!("{}", pretty_table(&["Account", "Type", "CCY", "Balance"], data));
    }
    Ok(())
}

fn net_worth(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let balances = ledger::account_balances(&load_accounts(conn)?, &load_transactions(conn)?);
    let worth = ledger::net_worth(&balances);
    let total = ledger::total_balance(&balances);
    let ccy = get_currency(conn)?;
    let v = json!({ "net_worth": worth, "total_balance": total, "currency": ccy });
    if !maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &v)? {
        println!("Net worth:     {}", fmt_money(&worth, &ccy));
        println!("Total balance: {}", fmt_money(&total, &ccy));
    }
    Ok(())
}

fn summary(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let today = today_or(sub.get_one::<String>("today"))?;
    let s = ledger::summary(&load_transactions(conn)?, today);
    if !maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &s)? {
        let ccy = get_currency(conn)?;
        let data = vec![
            vec!["Total income".into(), fmt_money(&s.total_income, &ccy)],
            vec!["Total expenses".into(), fmt_money(&s.total_expenses, &ccy)],
            vec!["Balance".into(), fmt_money(&s.balance, &ccy)],
            vec!["Income this month".into(), fmt_money(&s.income_this_month, &ccy)],
            vec!["Expenses this month".into(), fmt_money(&s.expenses_this_month, &ccy)],
            vec!["Savings rate".into(), format!("{:.1}%", s.savings_rate)],
        ];
        println!("{}", pretty_table(&["Metric", "Value"], data));
    }
    Ok(())
}

fn spend_by_category(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let items = ledger::expense_by_category(&load_transactions(conn)?, &load_categories(conn)?);
    if !maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &items)? {
        let data = items
            .into_iter()
            .map(|c| vec![c.name, format!("{:.2}", c.total)])
            .collect();
        println!("{}", pretty_table(&["Category", "Spent"], data));
    }
    Ok(())
}

fn monthly(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let buckets = ledger::monthly_overview(&load_transactions(conn)?);
    if !maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &buckets)? {
        let data = buckets
            .into_iter()
            .map(|b| {
                vec![
                    b.label,
                    format!("{:.2}", b.income),
                    format!("{:.2}", b.expenses),
                ]
            })
            .collect();
        println!("{}", pretty_table(&["Month", "Income", "Expenses"], data));
    }
    Ok(())
}

fn statement(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let period: Period = sub.get_one::<String>("period").unwrap().parse()?;
    let today = today_or(sub.get_one::<String>("today"))?;
    let st = ledger::income_statement(
        &load_transactions(conn)?,
        &load_categories(conn)?,
        period,
        today,
    );
    if maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &st)? {
        return Ok(());
    }

    let mut data = vec![vec!["INCOME".to_string(), String::new()]];
    for c in &st.income {
        data.push(vec![format!("  {}", c.name), format!("{:.2}", c.total)]);
    }
    data.push(vec!["Total income".into(), format!("{:.2}", st.total_income)]);
    data.push(vec!["EXPENSES".into(), String::new()]);
    for c in &st.expenses {
        data.push(vec![format!("  {}", c.name), format!("({:.2})", c.total)]);
    }
    data.push(vec!["Total expenses".into(), format!("({:.2})", st.total_expenses)]);
    let net = if st.net_result < rust_decimal::Decimal::ZERO {
        format!("({:.2})", -st.net_result)
    } else {
        format!("{:.2}", st.net_result)
    };
    data.push(vec!["NET RESULT".into(), net]);

    println!("Statement {} to {}", st.start, st.end);
    println!("{}", pretty_table(&["Line", "Amount"], data));
    Ok(())
}
