// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use cashtrack::config::Config;
use cashtrack::models::{NewTransaction, PaymentMode, TransactionType};
use cashtrack::store::Store;
use cashtrack::utils::parse_local_timestamp;
use cashtrack::{cli, commands::exporter};
use rust_decimal::Decimal;
use serde_json::json;
use tempfile::tempdir;

fn seeded() -> Store {
    let store = Store::open_in_memory(Config::default()).unwrap();
    let at = |s: &str| parse_local_timestamp(s, store.offset()).unwrap();
    store
        .create_transaction(
            NewTransaction::new(TransactionType::JazzCashSend, Decimal::new(5000, 0), "admin")
                .fee(Decimal::new(50, 0))
                .payment_mode(PaymentMode::JazzCash)
                .note("to Ahmed")
                .at(at("2025-01-02 10:00")),
        )
        .unwrap();
    store
        .create_transaction(
            NewTransaction::new(TransactionType::StationarySale, Decimal::new(12050, 2), "admin")
                .at(at("2025-01-03 15:30")),
        )
        .unwrap();
    store
}

fn run(store: &Store, args: &[&str]) -> anyhow::Result<()> {
    let matches = cli::build_cli().get_matches_from(args.iter().copied());
    match matches.subcommand() {
        Some(("export", sub)) => exporter::handle(store, sub),
        _ => panic!("no export subcommand"),
    }
}

#[test]
fn export_transactions_writes_pretty_json_oldest_first() {
    let store = seeded();
    let dir = tempdir().unwrap();
    let out = dir.path().join("tx.json");

    run(
        &store,
        &[
            "cashtrack",
            "export",
            "transactions",
            "--format",
            "json",
            "--out",
            out.to_str().unwrap(),
        ],
    )
    .unwrap();

    let data = std::fs::read_to_string(&out).unwrap();
    assert!(data.starts_with("[\n"));
    let v: serde_json::Value = serde_json::from_str(&data).unwrap();
    let items = v.as_array().unwrap();
    assert_eq!(items.len(), 2);
    assert_eq!(items[0]["type"], json!("JAZZCASH_SEND"));
    assert_eq!(items[0]["amount"], json!("5000"));
    assert_eq!(items[0]["fee"], json!("50"));
    assert_eq!(items[0]["cash_in"], json!("50"));
    assert_eq!(items[0]["cash_out"], json!("5000"));
    assert_eq!(items[0]["payment_mode"], json!("JAZZCASH"));
    assert_eq!(items[0]["note"], json!("to Ahmed"));
    assert_eq!(items[0]["created_at"], json!("2025-01-02T05:00:00+00:00"));
    assert_eq!(items[1]["type"], json!("STATIONARY_SALE"));
    assert_eq!(items[1]["amount"], json!("120.50"));
    assert_eq!(items[1]["note"], json!(null));
}

#[test]
fn export_transactions_csv_respects_filters() {
    let store = seeded();
    let dir = tempdir().unwrap();
    let out = dir.path().join("tx.csv");

    run(
        &store,
        &[
            "cashtrack",
            "export",
            "transactions",
            "--format",
            "CSV",
            "--out",
            out.to_str().unwrap(),
            "--from",
            "2025-01-03",
        ],
    )
    .unwrap();

    let mut rdr = csv::Reader::from_path(&out).unwrap();
    let headers = rdr.headers().unwrap().clone();
    assert_eq!(headers.len(), 11);
    assert_eq!(&headers[2], "type");
    let rows: Vec<csv::StringRecord> = rdr.records().map(|r| r.unwrap()).collect();
    assert_eq!(rows.len(), 1);
    assert_eq!(&rows[0][2], "STATIONARY_SALE");
    assert_eq!(&rows[0][6], "120.50");
    assert_eq!(&rows[0][7], "0");
}

#[test]
fn unknown_format_fails_before_writing() {
    let store = seeded();
    let dir = tempdir().unwrap();
    let out = dir.path().join("tx.xml");

    let err = run(
        &store,
        &[
            "cashtrack",
            "export",
            "transactions",
            "--format",
            "xml",
            "--out",
            out.to_str().unwrap(),
        ],
    )
    .unwrap_err();
    assert!(err.to_string().contains("Unknown format"));
    assert!(!out.exists());
}
