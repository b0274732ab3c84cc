// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use clap::{Arg, ArgAction, Command, crate_version, value_parser};

fn json_args() -> [Arg; 2] {
    [
        Arg::new("json")
            .long("json")
            .action(ArgAction::SetTrue)
            .help("Print as pretty JSON"),
        Arg::new("jsonl")
            .long("jsonl")
            .action(ArgAction::SetTrue)
            .conflicts_with("json")
            .help("Print as JSON lines"),
    ]
}

fn today_arg() -> Arg {
    Arg::new("today")
        .long("today")
        .value_name("YYYY-MM-DD")
        .help("Evaluate relative periods as of this date instead of the clock")
}

pub fn build_cli() -> Command {
    Command::new("tallybook")
        .version(crate_version!())
        .about("Personal ledger: accounts, statement import, balances and reports")
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .action(ArgAction::Count)
                .global(true)
                .help("Increase log verbosity (-v info, -vv debug)"),
        )
        .subcommand(Command::new("init").about("Create the ledger database"))
        .subcommand(
            Command::new("account")
                .about("Manage accounts")
                .subcommand(
                    Command::new("add")
                        .arg(Arg::new("name").long("name").required(true))
                        .arg(
                            Arg::new("type")
                                .long("type")
                                .default_value("checking")
                                .help("checking|savings|credit-card|cash|investment|loan|other"),
                        )
                        .arg(
                            Arg::new("initial_balance")
                                .long("initial-balance")
                                .default_value("0")
                                .allow_hyphen_values(true),
                        )
                        .arg(Arg::new("currency").long("currency"))
                        .arg(Arg::new("bank").long("bank"))
                        .arg(Arg::new("last4").long("last4")),
                )
                .subcommand(
                    Command::new("edit")
                        .about("Change fields of an existing account")
                        .arg(Arg::new("name").long("name").required(true))
                        .arg(Arg::new("new_name").long("new-name"))
                        .arg(Arg::new("type").long("type"))
                        .arg(
                            Arg::new("initial_balance")
                                .long("initial-balance")
                                .allow_hyphen_values(true),
                        )
                        .arg(Arg::new("currency").long("currency"))
                        .arg(Arg::new("bank").long("bank").help("Empty value clears it"))
                        .arg(Arg::new("last4").long("last4").help("Empty value clears it")),
                )
                .subcommand(Command::new("list").args(json_args()))
                .subcommand(
                    Command::new("rm").arg(Arg::new("name").long("name").required(true)),
                ),
        )
        .subcommand(
            Command::new("category")
                .about("Inspect and extend the category catalog")
                .subcommand(
                    Command::new("list")
                        .arg(Arg::new("type").long("type"))
                        .args(json_args()),
                )
                .subcommand(
                    Command::new("add")
                        .arg(Arg::new("name").long("name").required(true))
                        .arg(Arg::new("type").long("type").required(true)),
                ),
        )
        .subcommand(
            Command::new("tx")
                .about("Record and browse transactions")
                .subcommand(
                    Command::new("add")
                        .arg(Arg::new("date").long("date").required(true))
                        .arg(Arg::new("description").long("description").required(true))
                        .arg(Arg::new("amount").long("amount").required(true))
                        .arg(Arg::new("type").long("type").default_value("expense"))
                        .arg(Arg::new("category").long("category").required(true))
                        .arg(Arg::new("account").long("account").required(true))
                        .arg(Arg::new("notes").long("notes")),
                )
                .subcommand(
                    Command::new("edit")
                        .about("Replace fields of a transaction by id")
                        .arg(Arg::new("id").long("id").required(true))
                        .arg(Arg::new("date").long("date").value_name("YYYY-MM-DD"))
                        .arg(Arg::new("description").long("description"))
                        .arg(Arg::new("amount").long("amount"))
                        .arg(Arg::new("type").long("type"))
                        .arg(Arg::new("category").long("category"))
                        .arg(Arg::new("account").long("account"))
                        .arg(Arg::new("notes").long("notes").help("Empty value clears it")),
                )
                .subcommand(
                    Command::new("list")
                        .arg(Arg::new("type").long("type"))
                        .arg(Arg::new("account").long("account"))
                        .arg(Arg::new("search").long("search"))
                        .arg(Arg::new("from").long("from").value_name("YYYY-MM-DD"))
                        .arg(Arg::new("to").long("to").value_name("YYYY-MM-DD"))
                        .arg(
                            Arg::new("limit")
                                .long("limit")
                                .value_parser(value_parser!(usize)),
                        )
                        .args(json_args()),
                )
                .subcommand(Command::new("rm").arg(Arg::new("id").long("id").required(true))),
        )
        .subcommand(
            Command::new("import")
                .about("Import statements")
                .subcommand(
                    Command::new("transactions")
                        .arg(Arg::new("path").long("path").required(true))
                        .arg(
                            Arg::new("format")
                                .long("format")
                                .help("xlsx|csv|json (default: from the file extension)"),
                        )
                        .arg(
                            Arg::new("account")
                                .long("account")
                                .help("Target account (default: the most recently created account)"),
                        )
                        .arg(
                            Arg::new("dry_run")
                                .long("dry-run")
                                .action(ArgAction::SetTrue)
                                .help("Report what would be imported without saving"),
                        ),
                ),
        )
        .subcommand(
            Command::new("report")
                .about("Balances, summaries and statements")
                .subcommand(Command::new("balances").args(json_args()))
                .subcommand(Command::new("net-worth").args(json_args()))
                .subcommand(Command::new("summary").arg(today_arg()).args(json_args()))
                .subcommand(Command::new("spend-by-category").args(json_args()))
                .subcommand(Command::new("monthly").args(json_args()))
                .subcommand(
                    Command::new("statement")
                        .arg(
                            Arg::new("period")
                                .long("period")
                                .default_value("current-month")
                                .help("current-month|last-month|current-quarter|last-quarter|current-year|last-year"),
                        )
                        .arg(today_arg())
                        .args(json_args()),
                ),
        )
        .subcommand(
            Command::new("config")
                .about("Read or change settings")
                .subcommand(Command::new("get").arg(Arg::new("key").required(true)))
                .subcommand(
                    Command::new("set")
                        .arg(Arg::new("key").required(true))
                        .arg(Arg::new("value").required(true)),
                ),
        )
        .subcommand(Command::new("doctor").about("Check ledger integrity"))
}
