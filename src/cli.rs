// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use clap::{Arg, ArgAction, Command, value_parser};

fn json_args(cmd: Command) -> Command {
    cmd.arg(
        Arg::new("json")
            .long("json")
            .action(ArgAction::SetTrue)
            .help("Print as pretty JSON"),
    )
    .arg(
        Arg::new("jsonl")
            .long("jsonl")
            .action(ArgAction::SetTrue)
            .conflicts_with("json")
            .help("Print one JSON object per line"),
    )
}

fn type_arg() -> Arg {
    Arg::new("type").long("type").short('t').help(
        "jazzcash-send | easypaisa-send | bill-payment | stationary-sale | bank-deposit | bank-withdrawal",
    )
}

fn mode_arg() -> Arg {
    Arg::new("mode")
        .long("mode")
        .short('m')
        .help("cash | jazzcash | easypaisa | bank")
}

fn amount_arg() -> Arg {
    Arg::new("amount")
        .long("amount")
        .short('a')
        .allow_negative_numbers(true)
        .help("Principal")
}

fn fee_arg() -> Arg {
    Arg::new("fee")
        .long("fee")
        .short('f')
        .allow_negative_numbers(true)
        .help("Commission earned")
}

fn user_arg() -> Arg {
    Arg::new("user")
        .long("user")
        .short('u')
        .help("Who records the entry (defaults to the default_user setting)")
}

fn id_arg() -> Arg {
    Arg::new("id").long("id").required(true).help("Record id")
}

fn range_args(cmd: Command) -> Command {
    cmd.arg(Arg::new("from").long("from").help("Start date YYYY-MM-DD (inclusive)"))
        .arg(Arg::new("to").long("to").help("End date YYYY-MM-DD (inclusive)"))
}

pub fn build_cli() -> Command {
    Command::new("cashtrack")
        .about("Cash-in-hand, fees and daily balances for a small shop")
        .version(clap::crate_version!())
        .subcommand_required(false)
        .subcommand(Command::new("init").about("Create the database and the default user"))
        .subcommand(
            Command::new("user")
                .about("Shop staff who record entries")
                .subcommand(
                    Command::new("add")
                        .arg(Arg::new("name").required(true).help("Username")),
                )
                .subcommand(json_args(Command::new("list"))),
        )
        .subcommand(
            Command::new("tx")
                .about("Record and browse transactions")
                .subcommand(
                    Command::new("add")
                        .arg(type_arg().required(true))
                        .arg(amount_arg().required(true))
                        .arg(fee_arg())
                        .arg(mode_arg())
                        .arg(Arg::new("note").long("note").short('n'))
                        .arg(user_arg())
                        .arg(
                            Arg::new("at")
                                .long("at")
                                .help("Back-date the entry: local 'YYYY-MM-DD HH:MM'"),
                        ),
                )
                .subcommand(
                    Command::new("edit")
                        .arg(id_arg())
                        .arg(type_arg())
                        .arg(amount_arg())
                        .arg(fee_arg())
                        .arg(mode_arg())
                        .arg(Arg::new("note").long("note").short('n'))
                        .arg(
                            Arg::new("clear-note")
                                .long("clear-note")
                                .action(ArgAction::SetTrue)
                                .conflicts_with("note"),
                        ),
                )
                .subcommand(Command::new("rm").arg(id_arg()))
                .subcommand(json_args(Command::new("show").arg(id_arg())))
                .subcommand(json_args(range_args(
                    Command::new("list")
                        .arg(type_arg())
                        .arg(mode_arg())
                        .arg(
                            Arg::new("today")
                                .long("today")
                                .action(ArgAction::SetTrue)
                                .conflicts_with_all(["from", "to"]),
                        )
                        .arg(
                            Arg::new("search")
                                .long("search")
                                .short('s')
                                .help("Match note or username"),
                        )
                        .arg(user_arg())
                        .arg(
                            Arg::new("limit")
                                .long("limit")
                                .value_parser(value_parser!(usize)),
                        ),
                ))),
        )
        .subcommand(json_args(
            Command::new("dashboard")
                .about("Cash in hand, profit and today's activity")
                .arg(Arg::new("date").long("date").help("Treat this date as today")),
        ))
        .subcommand(json_args(range_args(
            Command::new("balance")
                .about("Daily opening and closing balances")
                .arg(
                    Arg::new("active-only")
                        .long("active-only")
                        .action(ArgAction::SetTrue)
                        .help("Hide days without transactions"),
                ),
        )))
        .subcommand(json_args(
            Command::new("analytics")
                .about("Net cash, profit and counts per type and period")
                .arg(Arg::new("date").long("date").help("Treat this date as today")),
        ))
        .subcommand(
            Command::new("bill")
                .about("Customer bills")
                .subcommand(
                    Command::new("add")
                        .arg(Arg::new("customer").long("customer").short('c').required(true))
                        .arg(Arg::new("name").long("name"))
                        .arg(amount_arg().required(true))
                        .arg(fee_arg())
                        .arg(Arg::new("due").long("due").required(true).help("YYYY-MM-DD"))
                        .arg(Arg::new("note").long("note").short('n'))
                        .arg(user_arg())
                        .arg(
                            Arg::new("pay-now")
                                .long("pay-now")
                                .action(ArgAction::SetTrue)
                                .help("Settle immediately"),
                        ),
                )
                .subcommand(json_args(range_args(
                    Command::new("list")
                        .arg(Arg::new("status").long("status").help("pending | paid"))
                        .arg(Arg::new("customer").long("customer").short('c'))
                        .arg(Arg::new("search").long("search").short('s')),
                )))
                .subcommand(json_args(Command::new("show").arg(id_arg())))
                .subcommand(
                    Command::new("pay")
                        .arg(
                            Arg::new("id")
                                .long("id")
                                .required(true)
                                .num_args(1..)
                                .action(ArgAction::Append),
                        )
                        .arg(user_arg()),
                ),
        )
        .subcommand(
            Command::new("export")
                .about("Export data")
                .subcommand(range_args(
                    Command::new("transactions")
                        .arg(
                            Arg::new("format")
                                .long("format")
                                .required(true)
                                .help("csv | json"),
                        )
                        .arg(Arg::new("out").long("out").required(true))
                        .arg(type_arg()),
                )),
        )
        .subcommand(
            Command::new("config")
                .about("Shop settings")
                .subcommand(json_args(Command::new("list")))
                .subcommand(Command::new("get").arg(Arg::new("key").required(true)))
                .subcommand(
                    Command::new("set")
                        .arg(Arg::new("key").required(true))
                        .arg(Arg::new("value").required(true)),
                ),
        )
        .subcommand(Command::new("doctor").about("Check stored data for inconsistencies"))
}
