// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::models::{
    NewTransaction, PaymentMode, Transaction, TransactionFilter, TransactionType, TransactionUpdate,
};
use crate::store::Store;
use crate::utils::{
    TX_HEADERS, fmt_money, maybe_print_json, parse_date, parse_decimal, parse_id,
    parse_local_timestamp, pretty_table, transaction_row,
};
use anyhow::{Context, Result};

pub fn handle(store: &Store, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("add", sub)) => add(store, sub)?,
        Some(("edit", sub)) => edit(store, sub)?,
        Some(("rm", sub)) => remove(store, sub)?,
        Some(("show", sub)) => show(store, sub)?,
        Some(("list", sub)) => list(store, sub)?,
        _ => {}
    }
    Ok(())
}

fn user_or_default(store: &Store, sub: &clap::ArgMatches) -> String {
    sub.get_one::<String>("user")
        .map(|s| s.trim().to_string())
        .unwrap_or_else(|| store.config().default_user.clone())
}

fn add(store: &Store, sub: &clap::ArgMatches) -> Result<()> {
    let tx = store.create_transaction(new_from_args(store, sub)?)?;
    println!(
        "Recorded #{} {} {} (in {}, out {})",
        tx.id,
        tx.r#type.label(),
        fmt_money(&tx.amount),
        fmt_money(&tx.cash_in),
        fmt_money(&tx.cash_out)
    );
    Ok(())
}

pub fn new_from_args(store: &Store, sub: &clap::ArgMatches) -> Result<NewTransaction> {
    let r#type = sub
        .get_one::<String>("type")
        .context("type is required")?
        .parse::<TransactionType>()?;
    let amount = parse_decimal(sub.get_one::<String>("amount").context("amount is required")?)?;
    let mut new = NewTransaction::new(r#type, amount, user_or_default(store, sub));
    if let Some(fee) = sub.get_one::<String>("fee") {
        new = new.fee(parse_decimal(fee)?);
    }
    if let Some(mode) = sub.get_one::<String>("mode") {
        new = new.payment_mode(mode.parse::<PaymentMode>()?);
    }
    if let Some(note) = sub.get_one::<String>("note") {
        new = new.note(note.as_str());
    }
    if let Some(at) = sub.get_one::<String>("at") {
        new = new.at(parse_local_timestamp(at, store.offset())?);
    }
    Ok(new)
}

pub fn update_from_args(sub: &clap::ArgMatches) -> Result<TransactionUpdate> {
    let mut update = TransactionUpdate::default();
    if let Some(t) = sub.get_one::<String>("type") {
        update.r#type = Some(t.parse::<TransactionType>()?);
    }
    if let Some(a) = sub.get_one::<String>("amount") {
        update.amount = Some(parse_decimal(a)?);
    }
    if let Some(f) = sub.get_one::<String>("fee") {
        update.fee = Some(parse_decimal(f)?);
    }
    if let Some(mode) = sub.get_one::<String>("mode") {
        update.payment_mode = Some(mode.parse::<PaymentMode>()?);
    }
    if let Some(note) = sub.get_one::<String>("note") {
        update.note = Some(Some(note.clone()));
    } else if sub.get_flag("clear-note") {
        update.note = Some(None);
    }
    Ok(update)
}

fn edit(store: &Store, sub: &clap::ArgMatches) -> Result<()> {
    let id = parse_id(sub.get_one::<String>("id").context("id is required")?)?;
    let update = update_from_args(sub)?;
    if update.is_empty() {
        println!("Nothing to change for #{}", id);
        return Ok(());
    }
    let tx = store.update_transaction(id, update)?;
    println!(
        "Updated #{}: {} {} (in {}, out {})",
        tx.id,
        tx.r#type.label(),
        fmt_money(&tx.amount),
        fmt_money(&tx.cash_in),
        fmt_money(&tx.cash_out)
    );
    Ok(())
}

fn remove(store: &Store, sub: &clap::ArgMatches) -> Result<()> {
    let id = parse_id(sub.get_one::<String>("id").context("id is required")?)?;
    let tx = store.delete_transaction(id)?;
    println!("Removed #{} ({} {})", tx.id, tx.r#type.label(), fmt_money(&tx.amount));
    Ok(())
}

fn show(store: &Store, sub: &clap::ArgMatches) -> Result<()> {
    let id = parse_id(sub.get_one::<String>("id").context("id is required")?)?;
    let tx = store.get_transaction(id)?;
    if !maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &tx)? {
        println!(
            "{}",
            pretty_table(&TX_HEADERS, vec![transaction_row(&tx, store.offset())])
        );
    }
    Ok(())
}

fn list(store: &Store, sub: &clap::ArgMatches) -> Result<()> {
    let json_flag = sub.get_flag("json");
    let jsonl_flag = sub.get_flag("jsonl");
    let data = query_rows(store, sub)?;
    if !maybe_print_json(json_flag, jsonl_flag, &data)? {
        let rows: Vec<Vec<String>> = data
            .iter()
            .map(|t| transaction_row(t, store.offset()))
            .collect();
        println!("{}", pretty_table(&TX_HEADERS, rows));
    }
    Ok(())
}

pub fn filter_from_args(store: &Store, sub: &clap::ArgMatches) -> Result<TransactionFilter> {
    let mut filter = TransactionFilter::default();
    if let Some(t) = sub.get_one::<String>("type") {
        filter.r#type = Some(t.parse::<TransactionType>()?);
    }
    if let Ok(Some(mode)) = sub.try_get_one::<String>("mode") {
        filter.payment_mode = Some(mode.parse::<PaymentMode>()?);
    }
    if let Some(from) = sub.get_one::<String>("from") {
        filter.from = Some(parse_date(from)?);
    }
    if let Some(to) = sub.get_one::<String>("to") {
        filter.to = Some(parse_date(to)?);
    }
    if matches!(sub.try_get_one::<bool>("today"), Ok(Some(true))) {
        let today = store.today();
        filter.from = Some(today);
        filter.to = Some(today);
    }
    if let Ok(Some(search)) = sub.try_get_one::<String>("search") {
        filter.search = Some(search.clone());
    }
    if let Ok(Some(user)) = sub.try_get_one::<String>("user") {
        filter.user = Some(user.clone());
    }
    if let Ok(Some(limit)) = sub.try_get_one::<usize>("limit") {
        filter.limit = Some(*limit);
    }
    Ok(filter)
}

pub fn query_rows(store: &Store, sub: &clap::ArgMatches) -> Result<Vec<Transaction>> {
    let filter = filter_from_args(store, sub)?;
    Ok(store.list_transactions(&filter)?)
}
