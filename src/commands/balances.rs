// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::balance::{DailyBalance, daily_balances};
use crate::store::Store;
use crate::utils::{fmt_money, maybe_print_json, parse_date, pretty_table};
use anyhow::{Context, Result};
use chrono::Duration;

pub fn handle(store: &Store, sub: &clap::ArgMatches) -> Result<()> {
    let data = query_days(store, sub)?;
    if !maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &data)? {
        // Most recent day on top.
        let rows = data
            .iter()
            .rev()
            .map(|d| {
                vec![
                    d.date.to_string(),
                    fmt_money(&d.opening_balance),
                    fmt_money(&d.cash_in),
                    fmt_money(&d.cash_out),
                    fmt_money(&d.net_change),
                    fmt_money(&d.closing_balance),
                    fmt_money(&d.fees),
                    d.transaction_count.to_string(),
                ]
            })
            .collect();
        println!(
            "{}",
            pretty_table(
                &["Date", "Opening", "Cash In", "Cash Out", "Net", "Closing", "Fees", "Count"],
                rows,
            )
        );
    }
    Ok(())
}

/// Days for the requested range; defaults to today and the `history_days`
/// days before it.
pub fn query_days(store: &Store, sub: &clap::ArgMatches) -> Result<Vec<DailyBalance>> {
    let to = match sub.get_one::<String>("to") {
        Some(d) => parse_date(d)?,
        None => store.today(),
    };
    let from = match sub.get_one::<String>("from") {
        Some(d) => parse_date(d)?,
        None => to
            .checked_sub_signed(Duration::days(i64::from(store.config().history_days)))
            .context("history window reaches before the calendar starts")?,
    };
    let txs = store.all_transactions()?;
    let mut days = daily_balances(&txs, from, to, store.offset())?;
    if sub.get_flag("active-only") {
        let today = store.today();
        days.retain(|d| d.transaction_count > 0 || d.date == today);
    }
    Ok(days)
}
