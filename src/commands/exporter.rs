// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::commands::transactions::filter_from_args;
use crate::store::Store;
use anyhow::{Context, Result, bail};
use serde_json::json;

pub fn handle(store: &Store, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("transactions", sub)) => export_transactions(store, sub),
        _ => Ok(()),
    }
}

const COLUMNS: [&str; 11] = [
    "id",
    "created_at",
    "type",
    "amount",
    "fee",
    "payment_mode",
    "cash_in",
    "cash_out",
    "note",
    "created_by",
    "updated_at",
];

fn export_transactions(store: &Store, sub: &clap::ArgMatches) -> Result<()> {
    let fmt = sub
        .get_one::<String>("format")
        .context("format is required")?
        .to_lowercase();
    let out = sub.get_one::<String>("out").context("out is required")?;
    if fmt != "csv" && fmt != "json" {
        bail!("Unknown format: {} (use csv|json)", fmt);
    }

    // Oldest first, like a ledger.
    let mut rows = store.list_transactions(&filter_from_args(store, sub)?)?;
    rows.reverse();

    if fmt == "csv" {
        let mut wtr = csv::Writer::from_path(out).with_context(|| format!("Create {}", out))?;
        wtr.write_record(COLUMNS)?;
        for t in &rows {
            wtr.write_record([
                t.id.to_string(),
                t.created_at.to_rfc3339(),
                t.r#type.code().to_string(),
                t.amount.to_string(),
                t.fee.to_string(),
                t.payment_mode.code().to_string(),
                t.cash_in.to_string(),
                t.cash_out.to_string(),
                t.note.clone().unwrap_or_default(),
                t.created_by.clone(),
                t.updated_at.to_rfc3339(),
            ])?;
        }
        wtr.flush()?;
    } else {
        let items: Vec<_> = rows
            .iter()
            .map(|t| {
                json!({
                    "id": t.id,
                    "created_at": t.created_at.to_rfc3339(),
                    "type": t.r#type.code(),
                    "amount": t.amount.to_string(),
                    "fee": t.fee.to_string(),
                    "payment_mode": t.payment_mode.code(),
                    "cash_in": t.cash_in.to_string(),
                    "cash_out": t.cash_out.to_string(),
                    "note": t.note,
                    "created_by": t.created_by,
                    "updated_at": t.updated_at.to_rfc3339(),
                })
            })
            .collect();
        std::fs::write(out, serde_json::to_string_pretty(&items)?)
            .with_context(|| format!("Write {}", out))?;
    }
    tracing::info!(count = rows.len(), path = %out, format = %fmt, "export written");
    println!("Exported {} transactions to {}", rows.len(), out);
    Ok(())
}
