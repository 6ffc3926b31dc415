// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::models::{Bill, BillFilter, BillStatus, NewBill};
use crate::store::Store;
use crate::utils::{
    fmt_local, fmt_money, maybe_print_json, parse_date, parse_decimal, parse_id, pretty_table,
};
use anyhow::{Context, Result};

pub fn handle(store: &mut Store, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("add", sub)) => add(store, sub)?,
        Some(("list", sub)) => list(store, sub)?,
        Some(("show", sub)) => show(store, sub)?,
        Some(("pay", sub)) => pay(store, sub)?,
        _ => {}
    }
    Ok(())
}

fn user_or_default(store: &Store, sub: &clap::ArgMatches) -> String {
    sub.get_one::<String>("user")
        .map(|s| s.trim().to_string())
        .unwrap_or_else(|| store.config().default_user.clone())
}

fn add(store: &mut Store, sub: &clap::ArgMatches) -> Result<()> {
    let new = NewBill {
        customer_ref: sub
            .get_one::<String>("customer")
            .context("customer is required")?
            .clone(),
        customer_name: sub.get_one::<String>("name").cloned(),
        amount: parse_decimal(sub.get_one::<String>("amount").context("amount is required")?)?,
        fee: sub
            .get_one::<String>("fee")
            .map(|f| parse_decimal(f))
            .transpose()?,
        due_date: parse_date(sub.get_one::<String>("due").context("due date is required")?)?,
        note: sub.get_one::<String>("note").cloned(),
        user: user_or_default(store, sub),
    };
    let bill = store.create_bill(new, sub.get_flag("pay-now"))?;
    match bill.transaction_id {
        Some(tx) => println!(
            "Bill #{} for {} recorded and paid (transaction #{})",
            bill.id, bill.customer_ref, tx
        ),
        None => println!(
            "Bill #{} for {} recorded, due {}",
            bill.id, bill.customer_ref, bill.due_date
        ),
    }
    Ok(())
}

pub fn filter_from_args(sub: &clap::ArgMatches) -> Result<BillFilter> {
    let mut filter = BillFilter::default();
    if let Some(s) = sub.get_one::<String>("status") {
        filter.status = Some(s.parse::<BillStatus>()?);
    }
    filter.customer = sub.get_one::<String>("customer").cloned();
    filter.search = sub.get_one::<String>("search").cloned();
    if let Some(from) = sub.get_one::<String>("from") {
        filter.due_from = Some(parse_date(from)?);
    }
    if let Some(to) = sub.get_one::<String>("to") {
        filter.due_to = Some(parse_date(to)?);
    }
    Ok(filter)
}

fn bill_row(store: &Store, b: &Bill) -> Vec<String> {
    let today = store.today();
    let status = if b.is_overdue(today) {
        "OVERDUE".to_string()
    } else {
        b.status.to_string()
    };
    vec![
        b.id.to_string(),
        b.customer_ref.clone(),
        b.customer_name.clone().unwrap_or_default(),
        fmt_money(&b.amount),
        fmt_money(&b.fee),
        fmt_money(&b.total()),
        b.due_date.to_string(),
        status,
        b.paid_at
            .as_ref()
            .map(|p| fmt_local(p, store.offset()))
            .unwrap_or_default(),
        b.transaction_id.map(|t| t.to_string()).unwrap_or_default(),
    ]
}

const BILL_HEADERS: [&str; 10] = [
    "ID", "Customer", "Name", "Amount", "Fee", "Total", "Due", "Status", "Paid", "Txn",
];

fn list(store: &Store, sub: &clap::ArgMatches) -> Result<()> {
    let bills = store.list_bills(&filter_from_args(sub)?)?;
    if maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &bills)? {
        return Ok(());
    }
    let rows = bills.iter().map(|b| bill_row(store, b)).collect();
    println!("{}", pretty_table(&BILL_HEADERS, rows));

    let stats = store.bill_stats(store.today())?;
    println!(
        "{} bills: {} pending, {} paid, {} overdue",
        stats.total, stats.pending, stats.paid, stats.overdue
    );
    Ok(())
}

fn show(store: &Store, sub: &clap::ArgMatches) -> Result<()> {
    let id = parse_id(sub.get_one::<String>("id").context("id is required")?)?;
    let bill = store.get_bill(id)?;
    if !maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &bill)? {
        println!(
            "{}",
            pretty_table(&BILL_HEADERS, vec![bill_row(store, &bill)])
        );
    }
    Ok(())
}

fn pay(store: &mut Store, sub: &clap::ArgMatches) -> Result<()> {
    let ids = sub
        .get_many::<String>("id")
        .context("at least one id is required")?
        .map(|s| parse_id(s))
        .collect::<Result<Vec<_>>>()?;
    let user = user_or_default(store, sub);
    if let [id] = ids.as_slice() {
        let bill = store.pay_bill(*id, &user)?;
        println!(
            "Bill #{} paid (transaction #{})",
            bill.id,
            bill.transaction_id.unwrap_or_default()
        );
    } else {
        let paid = store.pay_bills(&ids, &user)?;
        println!("{} bill(s) marked as paid", paid);
    }
    Ok(())
}
