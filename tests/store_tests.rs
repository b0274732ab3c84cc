// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use clap::ArgMatches;
use rusqlite::Connection;
use rust_decimal::Decimal;
use std::io::Write;
use tallybook::commands::{accounts, config, doctor, importer};
use tallybook::models::{AccountType, TransactionType};
use tallybook::{cli, db, ledger};
use tempfile::NamedTempFile;

fn setup() -> Connection {
    let conn = Connection::open_in_memory().unwrap();
    db::init_schema(&conn).unwrap();
    conn
}

/// Parses `args` and returns the matches handed to a command group's `handle`.
fn leaf(args: &[&str]) -> ArgMatches {
    let argv = std::iter::once("tallybook").chain(args.iter().copied());
    let matches = cli::build_cli().get_matches_from(argv);
    let (_, group) = matches.subcommand().unwrap();
    group.clone()
}

fn import_args(args: &[&str]) -> ArgMatches {
    let mut argv = vec!["import", "transactions"];
    argv.extend_from_slice(args);
    let group = leaf(&argv);
    let (_, sub) = group.subcommand().unwrap();
    sub.clone()
}

fn add_account(conn: &Connection, args: &[&str]) {
    let mut argv = vec!["account", "add"];
    argv.extend_from_slice(args);
    accounts::handle(conn, &leaf(&argv)).unwrap();
}

fn statement() -> NamedTempFile {
    let mut file = tempfile::Builder::new().suffix(".csv").tempfile().unwrap();
    writeln!(file, "Vencimento,Sacado,Valor do Título,Plano de Contas,Tipo").unwrap();
    writeln!(file, "05/03/2024,Mercado Bom,\"210,40\",Supermercado,despesa").unwrap();
    writeln!(file, "06/03/2024,Empresa X,4800,Salário,receita").unwrap();
    writeln!(file, "07/03/2024,Sem valor,,Compras,despesa").unwrap();
    writeln!(file, "08/03/2024,Pet shop,55,Animais,despesa").unwrap();
    file.flush().unwrap();
    file
}

#[test]
fn schema_seeds_default_catalog_once() {
    let conn = setup();
    db::init_schema(&conn).unwrap();
    let catalog = db::load_catalog(&conn).unwrap();
    assert_eq!(catalog.categories().len(), 16);
    assert_eq!(catalog.categories()[0].name, "Salário");
    assert_eq!(db::get_currency(&conn).unwrap(), "BRL");
}

#[test]
fn account_add_persists_optional_fields() {
    let conn = setup();
    add_account(
        &conn,
        &[
            "--name", "Cartão", "--type", "credit-card", "--initial-balance", "-120.50",
            "--bank", "Banco Azul", "--last4", "4321",
        ],
    );
    let stored = db::load_accounts(&conn).unwrap();
    assert_eq!(stored.len(), 1);
    let a = &stored[0];
    assert_eq!(a.r#type, AccountType::CreditCard);
    assert_eq!(a.initial_balance, Decimal::new(-12050, 2));
    assert_eq!(a.currency, "BRL");
    assert_eq!(a.bank_name.as_deref(), Some("Banco Azul"));
    assert_eq!(a.account_number_last4.as_deref(), Some("4321"));

    let bad = leaf(&["account", "add", "--name", "X", "--last4", "12a"]);
    assert!(accounts::handle(&conn, &bad).is_err());
}

#[test]
fn import_stores_into_newest_account_by_default() {
    let mut conn = setup();
    add_account(&conn, &["--name", "Antiga", "--type", "savings"]);
    add_account(&conn, &["--name", "Principal", "--initial-balance", "1000"]);
    let file = statement();
    let path = file.path().to_str().unwrap();

    let sub = import_args(&["--path", path]);
    let outcome = importer::import_transactions(&mut conn, &sub).unwrap();
    assert_eq!(outcome.transactions.len(), 3);
    assert_eq!(outcome.skipped(), 1);
    assert_eq!(outcome.diagnostics.len(), 2);

    let principal = db::account_by_name(&conn, "Principal").unwrap();
    let stored = db::load_transactions(&conn).unwrap();
    assert_eq!(stored.len(), 3);
    assert!(stored.iter().all(|t| t.imported && t.account_id == principal.id));
    assert!(stored.iter().all(|t| t.id.starts_with("txn_imported_")));
    let pet = stored.iter().find(|t| t.description == "Pet shop").unwrap();
    assert_eq!(pet.category, "Outras Despesas");

    let balances = ledger::account_balances(&db::load_accounts(&conn).unwrap(), &stored);
    let principal_balance = balances
        .iter()
        .find(|b| b.account.id == principal.id)
        .unwrap()
        .current_balance;
    assert_eq!(principal_balance, Decimal::new(553460, 2));
}

#[test]
fn import_dry_run_and_named_account() {
    let mut conn = setup();
    add_account(&conn, &["--name", "Principal"]);
    add_account(&conn, &["--name", "Reserva", "--type", "savings"]);
    let file = statement();
    let path = file.path().to_str().unwrap();

    let dry = import_args(&["--path", path, "--dry-run"]);
    let outcome = importer::import_transactions(&mut conn, &dry).unwrap();
    assert_eq!(outcome.transactions.len(), 3);
    assert!(db::load_transactions(&conn).unwrap().is_empty());

    let named = import_args(&["--path", path, "--account", "Reserva"]);
    importer::import_transactions(&mut conn, &named).unwrap();
    let reserva = db::account_by_name(&conn, "Reserva").unwrap();
    let stored = db::load_transactions(&conn).unwrap();
    assert!(stored.iter().all(|t| t.account_id == reserva.id));
    assert_eq!(
        stored.iter().filter(|t| t.r#type == TransactionType::Income).count(),
        1
    );
}

#[test]
fn import_without_accounts_fails() {
    let mut conn = setup();
    let file = statement();
    let sub = import_args(&["--path", file.path().to_str().unwrap()]);
    assert!(importer::import_transactions(&mut conn, &sub).is_err());
}

#[test]
fn account_rm_refuses_while_referenced() {
    let mut conn = setup();
    add_account(&conn, &["--name", "Vazia"]);
    add_account(&conn, &["--name", "Principal"]);
    let file = statement();
    let sub = import_args(&["--path", file.path().to_str().unwrap()]);
    importer::import_transactions(&mut conn, &sub).unwrap();

    assert!(accounts::handle(&conn, &leaf(&["account", "rm", "--name", "Principal"])).is_err());
    accounts::handle(&conn, &leaf(&["account", "rm", "--name", "Vazia"])).unwrap();
    let names: Vec<String> = db::load_accounts(&conn)
        .unwrap()
        .into_iter()
        .map(|a| a.name)
        .collect();
    assert_eq!(names, vec!["Principal"]);
}

#[test]
fn doctor_flags_orphans_and_unknown_categories() {
    let mut conn = setup();
    add_account(&conn, &["--name", "Principal"]);
    let file = statement();
    let sub = import_args(&["--path", file.path().to_str().unwrap()]);
    importer::import_transactions(&mut conn, &sub).unwrap();
    assert!(doctor::find_issues(
        &db::load_accounts(&conn).unwrap(),
        &db::load_transactions(&conn).unwrap(),
        &db::load_catalog(&conn).unwrap(),
    )
    .is_empty());

    let mut transactions = db::load_transactions(&conn).unwrap();
    transactions[0].account_id = "acc_gone".into();
    transactions[1].category = "Viagem".into();
    let issues = doctor::find_issues(
        &db::load_accounts(&conn).unwrap(),
        &transactions,
        &db::load_catalog(&conn).unwrap(),
    );
    let kinds: Vec<&str> = issues.iter().map(|r| r[0].as_str()).collect();
    assert_eq!(kinds, vec!["orphan_account_ref", "unknown_category"]);
}

#[test]
fn config_currency_round_trips_and_validates() {
    let conn = setup();
    config::handle(&conn, &leaf(&["config", "set", "currency", "usd"])).unwrap();
    assert_eq!(db::get_currency(&conn).unwrap(), "USD");
    assert!(config::handle(&conn, &leaf(&["config", "set", "currency", "dollars"])).is_err());
    assert!(config::handle(&conn, &leaf(&["config", "get", "theme"])).is_err());

    add_account(&conn, &["--name", "Wallet", "--type", "cash"]);
    assert_eq!(db::load_accounts(&conn).unwrap()[0].currency, "USD");
}

#[test]
fn account_edit_changes_only_given_fields() {
    let conn = setup();
    add_account(
        &conn,
        &["--name", "Cartão", "--type", "credit-card", "--bank", "Banco Azul", "--last4", "4321"],
    );
    let before = db::account_by_name(&conn, "Cartão").unwrap();

    let edit = |args: &[&str]| {
        let mut argv = vec!["account", "edit"];
        argv.extend_from_slice(args);
        accounts::handle(&conn, &leaf(&argv))
    };
    edit(&[
        "--name", "Cartão", "--new-name", "Cartão Gold", "--initial-balance", "-50", "--last4", "",
    ])
    .unwrap();

    assert!(db::account_by_name(&conn, "Cartão").is_err());
    let after = db::account_by_name(&conn, "Cartão Gold").unwrap();
    assert_eq!(after.id, before.id);
    assert_eq!(after.created_at, before.created_at);
    assert_eq!(after.r#type, AccountType::CreditCard);
    assert_eq!(after.initial_balance, Decimal::new(-50, 0));
    assert_eq!(after.bank_name.as_deref(), Some("Banco Azul"));
    assert_eq!(after.account_number_last4, None);

    assert!(edit(&["--name", "Cartão Gold", "--last4", "99"]).is_err());
    assert!(edit(&["--name", "Cartão Gold", "--type", "boat"]).is_err());
    assert!(edit(&["--name", "Nenhuma", "--currency", "usd"]).is_err());
    assert_eq!(
        db::account_by_name(&conn, "Cartão Gold").unwrap().account_number_last4,
        None
    );
}
