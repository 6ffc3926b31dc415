// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Opening and closing cash per calendar day.
//!
//! The opening balance of the first day is the net of everything recorded
//! before it; every following day opens at the previous day's close. Days
//! without activity are still reported, with opening equal to closing.

use chrono::{FixedOffset, NaiveDate};
use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::BTreeMap;

use crate::error::{Error, Result};
use crate::models::Transaction;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DailyBalance {
    pub date: NaiveDate,
    pub opening_balance: Decimal,
    pub cash_in: Decimal,
    pub cash_out: Decimal,
    pub fees: Decimal,
    pub net_change: Decimal,
    pub closing_balance: Decimal,
    pub transaction_count: usize,
}

#[derive(Default, Clone, Copy)]
struct DayTotals {
    cash_in: Decimal,
    cash_out: Decimal,
    fees: Decimal,
    count: usize,
}

/// Net cash carried into `day`: Σcash_in − Σcash_out over every transaction
/// whose local date is strictly before it.
pub fn opening_balance<'a, I>(txs: I, day: NaiveDate, offset: FixedOffset) -> Decimal
where
    I: IntoIterator<Item = &'a Transaction>,
{
    txs.into_iter()
        .filter(|t| t.local_date(offset) < day)
        .map(Transaction::net)
        .sum()
}

/// One [`DailyBalance`] per day of the inclusive range `[from, to]`.
///
/// Input order does not matter; transactions after `to` are ignored.
pub fn daily_balances<'a, I>(
    txs: I,
    from: NaiveDate,
    to: NaiveDate,
    offset: FixedOffset,
) -> Result<Vec<DailyBalance>>
where
    I: IntoIterator<Item = &'a Transaction>,
{
    if from > to {
        return Err(Error::validation(
            "range",
            format!("start {} is after end {}", from, to),
        ));
    }

    let mut running = Decimal::ZERO;
    let mut days: BTreeMap<NaiveDate, DayTotals> = BTreeMap::new();
    for t in txs {
        let date = t.local_date(offset);
        if date < from {
            running += t.net();
        } else if date <= to {
            let e = days.entry(date).or_default();
            e.cash_in += t.cash_in;
            e.cash_out += t.cash_out;
            e.fees += t.fee;
            e.count += 1;
        }
    }

    let mut out = Vec::new();
    for date in from.iter_days().take_while(|d| *d <= to) {
        let totals = days.get(&date).copied().unwrap_or_default();
        let net_change = totals.cash_in - totals.cash_out;
        let opening = running;
        running = opening + net_change;
        out.push(DailyBalance {
            date,
            opening_balance: opening,
            cash_in: totals.cash_in,
            cash_out: totals.cash_out,
            fees: totals.fees,
            net_change,
            closing_balance: running,
            transaction_count: totals.count,
        });
    }
    Ok(out)
}
