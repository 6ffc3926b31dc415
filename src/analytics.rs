// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use chrono::{Datelike, FixedOffset, NaiveDate};
use rust_decimal::Decimal;
use serde::Serialize;

use crate::error::Result;
use crate::models::{Transaction, TransactionType};
use crate::store::Store;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Period {
    Today,
    Yesterday,
    ThisMonth,
    AllTime,
}

impl Period {
    pub const ALL: [Period; 4] = [
        Period::Today,
        Period::Yesterday,
        Period::ThisMonth,
        Period::AllTime,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Period::Today => "Today",
            Period::Yesterday => "Yesterday",
            Period::ThisMonth => "This month",
            Period::AllTime => "All time",
        }
    }

    /// Whether a local date falls in this period as seen from `today`.
    pub fn contains(self, date: NaiveDate, today: NaiveDate) -> bool {
        match self {
            Period::Today => date == today,
            Period::Yesterday => today.pred_opt() == Some(date),
            Period::ThisMonth => {
                date <= today && date.year() == today.year() && date.month() == today.month()
            }
            Period::AllTime => true,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Figures {
    /// Σcash_in − Σcash_out
    pub cash: Decimal,
    pub profit: Decimal,
    pub count: usize,
}

impl Figures {
    fn add(&mut self, t: &Transaction) {
        self.cash += t.net();
        self.profit += t.fee;
        self.count += 1;
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct PeriodReport {
    pub period: Period,
    /// One row per transaction type, in `TransactionType::ALL` order.
    pub by_type: Vec<(TransactionType, Figures)>,
    pub total: Figures,
}

pub fn period_report<'a, I>(
    txs: I,
    period: Period,
    today: NaiveDate,
    offset: FixedOffset,
) -> PeriodReport
where
    I: IntoIterator<Item = &'a Transaction>,
{
    let mut by_type: Vec<(TransactionType, Figures)> = TransactionType::ALL
        .into_iter()
        .map(|t| (t, Figures::default()))
        .collect();
    let mut total = Figures::default();
    for t in txs {
        if !period.contains(t.local_date(offset), today) {
            continue;
        }
        if let Some((_, f)) = by_type.iter_mut().find(|(ty, _)| *ty == t.r#type) {
            f.add(t);
        }
        total.add(t);
    }
    PeriodReport {
        period,
        by_type,
        total,
    }
}

/// Reports for every [`Period`], read fresh from the store.
pub fn analytics(store: &Store, today: NaiveDate) -> Result<Vec<PeriodReport>> {
    let txs = store.all_transactions()?;
    Ok(Period::ALL
        .into_iter()
        .map(|p| period_report(&txs, p, today, store.offset()))
        .collect())
}
