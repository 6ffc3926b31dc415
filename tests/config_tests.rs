// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use cashtrack::config::{Config, format_offset, parse_offset};
use cashtrack::error::Error;
use cashtrack::store::Store;
use rusqlite::Connection;
use rust_decimal::Decimal;

#[test]
fn defaults() {
    let cfg = Config::default();
    assert_eq!(format_offset(cfg.utc_offset), "+05:00");
    assert_eq!(cfg.recent_limit, 10);
    assert_eq!(cfg.history_days, 30);
    assert_eq!(cfg.max_amount, Decimal::new(10_000_000, 0));
    assert_eq!(cfg.default_user, "admin");
}

#[test]
fn offsets() {
    assert_eq!(parse_offset("+05:00").unwrap().local_minus_utc(), 5 * 3600);
    assert_eq!(parse_offset("-03:30").unwrap().local_minus_utc(), -(3 * 3600 + 1800));
    assert_eq!(parse_offset("+4").unwrap().local_minus_utc(), 4 * 3600);
    assert_eq!(parse_offset("Z").unwrap().local_minus_utc(), 0);
    assert_eq!(format_offset(parse_offset("-03:30").unwrap()), "-03:30");
    for bad in ["05:00", "+25:00", "+05:75", "soon", ""] {
        assert!(parse_offset(bad).is_err(), "{}", bad);
    }
}

#[test]
fn settings_survive_a_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("shop.sqlite");

    let mut store = Store::from_connection(Connection::open(&path).unwrap()).unwrap();
    assert_eq!(store.config(), &Config::default());
    store.set_config("utc_offset", "+04:00").unwrap();
    store.set_config("recent-limit", "3").unwrap();
    store.set_config("default_user", "sana").unwrap();
    assert_eq!(store.config().get("recent_limit").unwrap(), "3");
    drop(store);

    let store = Store::from_connection(Connection::open(&path).unwrap()).unwrap();
    assert_eq!(format_offset(store.offset()), "+04:00");
    assert_eq!(store.config().recent_limit, 3);
    assert_eq!(store.config().default_user, "sana");
    assert_eq!(store.config().history_days, 30);
}

#[test]
fn bad_values_are_rejected_and_not_stored() {
    let mut store = Store::from_connection(Connection::open_in_memory().unwrap()).unwrap();
    let field = |e: Error| e.field();
    assert_eq!(field(store.set_config("recent_limit", "many").unwrap_err()), Some("recent_limit"));
    assert_eq!(field(store.set_config("history_days", "0").unwrap_err()), Some("history_days"));
    assert_eq!(field(store.set_config("max_amount", "-1").unwrap_err()), Some("max_amount"));
    assert_eq!(field(store.set_config("default_user", " ").unwrap_err()), Some("default_user"));
    assert_eq!(field(store.set_config("utc_offset", "PKT").unwrap_err()), Some("utc_offset"));
    assert_eq!(field(store.set_config("currency", "PKR").unwrap_err()), Some("key"));

    assert_eq!(store.config(), &Config::default());
    assert_eq!(Config::load(store.conn()).unwrap(), Config::default());
}

#[test]
fn corrupt_setting_fails_to_load() {
    let store = Store::from_connection(Connection::open_in_memory().unwrap()).unwrap();
    store
        .conn()
        .execute(
            "INSERT INTO settings(key, value) VALUES ('history_days', 'forever')",
            [],
        )
        .unwrap();
    assert!(matches!(Config::load(store.conn()), Err(Error::Corrupt(_))));
}

#[test]
fn failed_write_leaves_the_config_untouched() {
    let mut store = Store::from_connection(Connection::open_in_memory().unwrap()).unwrap();
    store.conn().execute_batch("DROP TABLE settings").unwrap();
    let err = store.set_config("recent_limit", "3").unwrap_err();
    assert!(matches!(err, Error::Storage(_)));
    assert_eq!(store.config().recent_limit, 10);
}
