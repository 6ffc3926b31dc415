// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::analytics::analytics;
use crate::store::Store;
use crate::utils::{fmt_money, maybe_print_json, parse_date, pretty_table};
use anyhow::Result;

pub fn handle(store: &Store, sub: &clap::ArgMatches) -> Result<()> {
    let today = match sub.get_one::<String>("date") {
        Some(d) => parse_date(d)?,
        None => store.today(),
    };
    let reports = analytics(store, today)?;
    if maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &reports)? {
        return Ok(());
    }
    for report in &reports {
        let mut rows: Vec<Vec<String>> = report
            .by_type
            .iter()
            .map(|(ty, f)| {
                vec![
                    ty.label().to_string(),
                    fmt_money(&f.cash),
                    fmt_money(&f.profit),
                    f.count.to_string(),
                ]
            })
            .collect();
        rows.push(vec![
            "Total".to_string(),
            fmt_money(&report.total.cash),
            fmt_money(&report.total.profit),
            report.total.count.to_string(),
        ]);
        println!("{}", report.period.label());
        println!(
            "{}",
            pretty_table(&["Type", "Net Cash", "Profit", "Count"], rows)
        );
    }
    Ok(())
}
