// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::dashboard::Dashboard;
use crate::store::Store;
use crate::utils::{
    TX_HEADERS, fmt_money, maybe_print_json, parse_date, pretty_table, transaction_row,
};
use anyhow::Result;

pub fn handle(store: &Store, sub: &clap::ArgMatches) -> Result<()> {
    let today = match sub.get_one::<String>("date") {
        Some(d) => parse_date(d)?,
        None => store.today(),
    };
    let dash = Dashboard::build(store, today)?;
    if maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &dash)? {
        return Ok(());
    }

    let summary = vec![
        vec!["Cash in hand".to_string(), fmt_money(&dash.cash_in_hand)],
        vec!["Total profit".to_string(), fmt_money(&dash.total_profit)],
        vec!["Profit this month".to_string(), fmt_money(&dash.month_profit)],
        vec![
            format!("Transactions on {}", dash.date),
            dash.today.count.to_string(),
        ],
        vec!["Cash in today".to_string(), fmt_money(&dash.today.cash_in)],
        vec!["Cash out today".to_string(), fmt_money(&dash.today.cash_out)],
        vec!["Net today".to_string(), fmt_money(&dash.today.net)],
        vec!["Profit today".to_string(), fmt_money(&dash.today.fees)],
    ];
    println!("{}", pretty_table(&["Metric", "Value"], summary));

    if !dash.today_by_type.is_empty() {
        let rows = dash
            .today_by_type
            .iter()
            .map(|b| {
                vec![
                    b.r#type.label().to_string(),
                    b.count.to_string(),
                    fmt_money(&b.total_amount),
                    fmt_money(&b.total_fees),
                ]
            })
            .collect();
        println!("{}", pretty_table(&["Type", "Count", "Amount", "Fees"], rows));
    }

    let recent = dash
        .recent
        .iter()
        .map(|t| transaction_row(t, store.offset()))
        .collect();
    println!("{}", pretty_table(&TX_HEADERS, recent));
    Ok(())
}
