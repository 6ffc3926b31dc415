// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Read-side figures for the shop dashboard. Nothing here is stored; every
//! number is recomputed from the transactions on each call.

use chrono::{Datelike, FixedOffset, NaiveDate};
use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::HashMap;

use crate::error::Result;
use crate::models::{Transaction, TransactionType};
use crate::store::Store;

/// Σcash_in − Σcash_out.
pub fn cash_in_hand<'a, I>(txs: I) -> Decimal
where
    I: IntoIterator<Item = &'a Transaction>,
{
    txs.into_iter().map(Transaction::net).sum()
}

/// Σfee.
pub fn total_profit<'a, I>(txs: I) -> Decimal
where
    I: IntoIterator<Item = &'a Transaction>,
{
    txs.into_iter().map(|t| t.fee).sum()
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DaySummary {
    pub date: Option<NaiveDate>,
    pub count: usize,
    pub cash_in: Decimal,
    pub cash_out: Decimal,
    pub fees: Decimal,
    pub net: Decimal,
}

pub fn day_summary<'a, I>(txs: I, day: NaiveDate, offset: FixedOffset) -> DaySummary
where
    I: IntoIterator<Item = &'a Transaction>,
{
    let mut s = DaySummary {
        date: Some(day),
        ..Default::default()
    };
    for t in txs.into_iter().filter(|t| t.local_date(offset) == day) {
        s.count += 1;
        s.cash_in += t.cash_in;
        s.cash_out += t.cash_out;
        s.fees += t.fee;
    }
    s.net = s.cash_in - s.cash_out;
    s
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TypeBreakdown {
    pub r#type: TransactionType,
    pub count: usize,
    pub total_amount: Decimal,
    pub total_fees: Decimal,
}

/// Per-type totals, largest principal first. Types with no activity are left out.
pub fn breakdown_by_type<'a, I>(txs: I) -> Vec<TypeBreakdown>
where
    I: IntoIterator<Item = &'a Transaction>,
{
    let mut by_type: HashMap<TransactionType, TypeBreakdown> = HashMap::new();
    for t in txs {
        let e = by_type.entry(t.r#type).or_insert(TypeBreakdown {
            r#type: t.r#type,
            count: 0,
            total_amount: Decimal::ZERO,
            total_fees: Decimal::ZERO,
        });
        e.count += 1;
        e.total_amount += t.amount;
        e.total_fees += t.fee;
    }
    let mut items: Vec<_> = by_type.into_values().collect();
    items.sort_by(|a, b| {
        b.total_amount
            .cmp(&a.total_amount)
            .then_with(|| a.r#type.cmp(&b.r#type))
    });
    items
}

/// The `n` most recent transactions, newest first (ties broken by id).
pub fn recent<'a, I>(txs: I, n: usize) -> Vec<Transaction>
where
    I: IntoIterator<Item = &'a Transaction>,
{
    let mut all: Vec<&Transaction> = txs.into_iter().collect();
    all.sort_by(|a, b| {
        b.created_at
            .cmp(&a.created_at)
            .then_with(|| b.id.cmp(&a.id))
    });
    all.into_iter().take(n).cloned().collect()
}

#[derive(Debug, Clone, Serialize)]
pub struct Dashboard {
    pub date: NaiveDate,
    pub cash_in_hand: Decimal,
    pub total_profit: Decimal,
    pub month_profit: Decimal,
    pub today: DaySummary,
    pub today_by_type: Vec<TypeBreakdown>,
    pub recent: Vec<Transaction>,
}

impl Dashboard {
    /// Read the store and compute every figure as of `today` (a local date).
    pub fn build(store: &Store, today: NaiveDate) -> Result<Dashboard> {
        let offset = store.offset();
        let txs = store.all_transactions()?;
        let month_start = today.with_day(1).unwrap_or(today);

        let todays: Vec<&Transaction> = txs
            .iter()
            .filter(|t| t.local_date(offset) == today)
            .collect();
        let month_profit = total_profit(txs.iter().filter(|t| {
            let d = t.local_date(offset);
            d >= month_start && d <= today
        }));

        Ok(Dashboard {
            date: today,
            cash_in_hand: cash_in_hand(&txs),
            total_profit: total_profit(&txs),
            month_profit,
            today: day_summary(todays.iter().copied(), today, offset),
            today_by_type: breakdown_by_type(todays.iter().copied()),
            recent: recent(&txs, store.config().recent_limit),
        })
    }
}
