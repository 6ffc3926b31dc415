// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::cashflow;
use crate::store::Store;
use crate::utils::pretty_table;
use anyhow::Result;
use rust_decimal::Decimal;

pub fn handle(store: &Store) -> Result<()> {
    let rows = check(store)?;
    if rows.is_empty() {
        println!("doctor: no issues found");
    } else {
        println!("{}", pretty_table(&["Issue", "Detail"], rows));
    }
    Ok(())
}

/// One `[issue, detail]` row per problem found.
pub fn check(store: &Store) -> Result<Vec<Vec<String>>> {
    let mut rows = Vec::new();

    // 1) Derived cash sides must still follow from (type, amount, fee)
    for t in store.all_transactions()? {
        if t.cash_in < Decimal::ZERO || t.cash_out < Decimal::ZERO {
            rows.push(vec![
                "negative_cash_side".into(),
                format!("#{} in {} out {}", t.id, t.cash_in, t.cash_out),
            ]);
        }
        match cashflow::derive(t.r#type, t.amount, t.fee) {
            Ok(flow) if flow.cash_in != t.cash_in || flow.cash_out != t.cash_out => {
                rows.push(vec![
                    "stale_cash_flow".into(),
                    format!(
                        "#{} stored in {} out {}, expected in {} out {}",
                        t.id, t.cash_in, t.cash_out, flow.cash_in, flow.cash_out
                    ),
                ]);
            }
            Ok(_) => {}
            Err(e) => rows.push(vec!["invalid_transaction".into(), format!("#{} {}", t.id, e)]),
        }
    }

    // 2) Bill status and settlement link must agree
    let mut stmt = store.conn().prepare(
        "SELECT b.id, b.status, b.transaction_id, t.type
         FROM bills b LEFT JOIN transactions t ON t.id=b.transaction_id
         WHERE (b.status='PAID' AND (b.transaction_id IS NULL OR t.type != 'BILL_PAYMENT'))
            OR (b.status='PENDING' AND b.transaction_id IS NOT NULL)
         ORDER BY b.id",
    )?;
    let mut cur = stmt.query([])?;
    while let Some(r) = cur.next()? {
        let id: i64 = r.get(0)?;
        let status: String = r.get(1)?;
        let tx: Option<i64> = r.get(2)?;
        let ty: Option<String> = r.get(3)?;
        let detail = match (status.as_str(), tx, ty) {
            ("PAID", None, _) => format!("bill #{} is paid without a transaction", id),
            ("PAID", Some(tx), ty) => format!(
                "bill #{} settled by #{} of type {}",
                id,
                tx,
                ty.unwrap_or_else(|| "?".into())
            ),
            (_, tx, _) => format!(
                "bill #{} is pending but linked to #{}",
                id,
                tx.unwrap_or_default()
            ),
        };
        rows.push(vec!["bill_settlement".into(), detail]);
    }

    Ok(rows)
}
