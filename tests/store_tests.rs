// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use cashtrack::config::Config;
use cashtrack::dashboard::Dashboard;
use cashtrack::error::Error;
use cashtrack::models::{
    NewTransaction, PaymentMode, TransactionFilter, TransactionType, TransactionUpdate,
};
use cashtrack::store::{Store, day_start_utc};
use cashtrack::utils::{parse_date, parse_local_timestamp};
use chrono::NaiveDate;
use rust_decimal::Decimal;

fn d(s: &str) -> Decimal {
    s.parse().unwrap()
}

fn store() -> Store {
    Store::open_in_memory(Config::default()).unwrap()
}

#[test]
fn create_derives_cash_sides_and_owner() {
    let store = store();
    let tx = store
        .create_transaction(
            NewTransaction::new(TransactionType::JazzCashSend, d("5000"), "ali")
                .fee(d("50"))
                .payment_mode(PaymentMode::JazzCash)
                .note("  to 0300-1234567 "),
        )
        .unwrap();
    assert_eq!(tx.cash_in, d("50"));
    assert_eq!(tx.cash_out, d("5000"));
    assert_eq!(tx.payment_mode, PaymentMode::JazzCash);
    assert_eq!(tx.note.as_deref(), Some("to 0300-1234567"));
    assert_eq!(tx.created_by, "ali");
    assert_eq!(tx.created_at, tx.updated_at);

    assert_eq!(store.get_transaction(tx.id).unwrap(), tx);
    let users = store.list_users().unwrap();
    assert_eq!(users.len(), 1);
    assert_eq!(users[0].username, "ali");
}

#[test]
fn update_recomputes_and_keeps_creation_fields() {
    let store = store();
    let at = parse_local_timestamp("2025-02-01 10:00", store.offset()).unwrap();
    let tx = store
        .create_transaction(
            NewTransaction::new(TransactionType::StationarySale, d("400"), "admin").at(at),
        )
        .unwrap();
    assert_eq!((tx.cash_in, tx.cash_out), (d("400"), Decimal::ZERO));

    let updated = store
        .update_transaction(
            tx.id,
            TransactionUpdate {
                r#type: Some(TransactionType::BankDeposit),
                amount: Some(d("450")),
                ..Default::default()
            },
        )
        .unwrap();
    assert_eq!(updated.r#type, TransactionType::BankDeposit);
    assert_eq!(updated.cash_in, Decimal::ZERO);
    assert_eq!(updated.cash_out, d("450"));
    assert_eq!(updated.created_at, at);
    assert_eq!(updated.created_by, "admin");
    assert!(updated.updated_at > updated.created_at);

    let cleared = store
        .update_transaction(
            tx.id,
            TransactionUpdate {
                note: Some(None),
                ..Default::default()
            },
        )
        .unwrap();
    assert_eq!(cleared.note, None);
    assert_eq!(cleared.cash_out, d("450"));
}

#[test]
fn update_that_breaks_a_rule_leaves_the_row_alone() {
    let store = store();
    let tx = store
        .create_transaction(
            NewTransaction::new(TransactionType::EasyPaisaSend, d("1000"), "admin").fee(d("20")),
        )
        .unwrap();
    // switching to a sale with the fee still set
    let err = store
        .update_transaction(
            tx.id,
            TransactionUpdate {
                r#type: Some(TransactionType::StationarySale),
                ..Default::default()
            },
        )
        .unwrap_err();
    assert_eq!(err.field(), Some("fee"));
    assert_eq!(store.get_transaction(tx.id).unwrap(), tx);
}

#[test]
fn missing_ids_are_not_found() {
    let store = store();
    assert_eq!(
        store.get_transaction(42).unwrap_err(),
        Error::not_found("transaction", 42)
    );
    assert!(
        store
            .update_transaction(
                42,
                TransactionUpdate {
                    amount: Some(d("1")),
                    ..Default::default()
                }
            )
            .unwrap_err()
            .is_not_found()
    );
    assert!(store.delete_transaction(42).unwrap_err().is_not_found());
}

#[test]
fn delete_is_reflected_in_the_dashboard() {
    let store = store();
    let keep = store
        .create_transaction(NewTransaction::new(TransactionType::StationarySale, d("300"), "admin"))
        .unwrap();
    let gone = store
        .create_transaction(
            NewTransaction::new(TransactionType::BillPayment, d("2000"), "admin").fee(d("25")),
        )
        .unwrap();

    let today = store.today();
    let before = Dashboard::build(&store, today).unwrap();
    assert_eq!(before.cash_in_hand, d("325"));
    assert_eq!(before.total_profit, d("25"));

    let removed = store.delete_transaction(gone.id).unwrap();
    assert_eq!(removed.id, gone.id);

    let after = Dashboard::build(&store, today).unwrap();
    assert_eq!(after.cash_in_hand, d("300"));
    assert_eq!(after.total_profit, Decimal::ZERO);
    assert_eq!(after.today.count, 1);
    assert_eq!(after.recent.len(), 1);
    assert_eq!(after.recent[0].id, keep.id);
}

#[test]
fn write_rules() {
    let store = store();
    let try_add = |t, amount: &str, fee: &str| {
        store
            .create_transaction(NewTransaction::new(t, d(amount), "admin").fee(d(fee)))
            .unwrap_err()
            .field()
    };
    assert_eq!(try_add(TransactionType::JazzCashSend, "100", "150"), Some("fee"));
    assert_eq!(try_add(TransactionType::StationarySale, "10.555", "0"), Some("amount"));
    assert_eq!(try_add(TransactionType::BillPayment, "100", "0.001"), Some("fee"));
    assert_eq!(try_add(TransactionType::BankDeposit, "10000001", "0"), Some("amount"));
    assert_eq!(try_add(TransactionType::BankDeposit, "-5", "0"), Some("amount"));
    assert_eq!(try_add(TransactionType::BankWithdrawal, "500", "5"), Some("fee"));

    let err = store
        .create_transaction(NewTransaction::new(TransactionType::StationarySale, d("1"), "  "))
        .unwrap_err();
    assert_eq!(err.field(), Some("user"));

    // trailing zeros beyond two places are fine
    store
        .create_transaction(NewTransaction::new(
            TransactionType::StationarySale,
            d("10.5000"),
            "admin",
        ))
        .unwrap();
    assert_eq!(store.all_transactions().unwrap().len(), 1);
}

#[test]
fn filters_use_the_shop_calendar() {
    let store = store();
    let offset = store.offset();
    let add = |t, amount: &str, fee: &str, mode, when: &str, user: &str, note: &str| {
        store
            .create_transaction(
                NewTransaction::new(t, d(amount), user)
                    .fee(d(fee))
                    .payment_mode(mode)
                    .note(note)
                    .at(parse_local_timestamp(when, offset).unwrap()),
            )
            .unwrap()
    };
    let a = add(
        TransactionType::StationarySale,
        "100",
        "0",
        PaymentMode::Cash,
        "2025-04-01 00:30",
        "admin",
        "notebooks",
    );
    let b = add(
        TransactionType::JazzCashSend,
        "2000",
        "20",
        PaymentMode::JazzCash,
        "2025-04-01 23:59",
        "sana",
        "50%_promo",
    );
    let c = add(
        TransactionType::BankDeposit,
        "700",
        "0",
        PaymentMode::Bank,
        "2025-04-02 00:00",
        "admin",
        "weekly deposit",
    );

    let day = parse_date("2025-04-01").unwrap();
    let ids = |f: TransactionFilter| -> Vec<i64> {
        store
            .list_transactions(&f)
            .unwrap()
            .into_iter()
            .map(|t| t.id)
            .collect()
    };

    assert_eq!(ids(TransactionFilter::default()), vec![c.id, b.id, a.id]);
    assert_eq!(
        ids(TransactionFilter {
            from: Some(day),
            to: Some(day),
            ..Default::default()
        }),
        vec![b.id, a.id]
    );
    assert_eq!(
        ids(TransactionFilter {
            from: day.succ_opt(),
            ..Default::default()
        }),
        vec![c.id]
    );
    assert_eq!(
        ids(TransactionFilter {
            r#type: Some(TransactionType::JazzCashSend),
            ..Default::default()
        }),
        vec![b.id]
    );
    assert_eq!(
        ids(TransactionFilter {
            payment_mode: Some(PaymentMode::Bank),
            ..Default::default()
        }),
        vec![c.id]
    );
    assert_eq!(
        ids(TransactionFilter {
            search: Some("NOTEBOOK".into()),
            ..Default::default()
        }),
        vec![a.id]
    );
    assert_eq!(
        ids(TransactionFilter {
            search: Some("sana".into()),
            ..Default::default()
        }),
        vec![b.id]
    );
    // wildcards in the term match literally
    assert_eq!(
        ids(TransactionFilter {
            search: Some("%_".into()),
            ..Default::default()
        }),
        vec![b.id]
    );
    assert_eq!(
        ids(TransactionFilter {
            user: Some("admin".into()),
            limit: Some(1),
            ..Default::default()
        }),
        vec![c.id]
    );
}

#[test]
fn day_start_is_shifted_by_the_offset() {
    let offset = Config::default().utc_offset;
    let start = day_start_utc(parse_date("2025-04-01").unwrap(), offset).unwrap();
    assert_eq!(start.to_rfc3339(), "2025-03-31T19:00:00+00:00");
    assert_eq!(day_start_utc(NaiveDate::MIN, offset), None);
}

#[test]
fn date_filters_at_the_calendar_edges() {
    let store = store();
    let tx = store
        .create_transaction(NewTransaction::new(TransactionType::StationarySale, d("80"), "admin"))
        .unwrap();
    let count = |from: Option<NaiveDate>, to: Option<NaiveDate>| {
        store
            .list_transactions(&TransactionFilter {
                from,
                to,
                ..Default::default()
            })
            .unwrap()
            .len()
    };

    assert_eq!(count(Some(NaiveDate::MIN), None), 1);
    assert_eq!(count(None, Some(NaiveDate::MAX)), 1);
    assert_eq!(count(Some(NaiveDate::MIN), Some(NaiveDate::MAX)), 1);
    assert_eq!(count(None, Some(NaiveDate::MIN)), 0);
    assert_eq!(count(Some(NaiveDate::MAX), None), 0);
    let far = parse_date("+12000-01-01").unwrap();
    assert_eq!(count(Some(far), None), 0);
    assert_eq!(count(None, Some(far)), 1);
    let ancient = parse_date("-0500-01-01").unwrap();
    assert_eq!(count(Some(ancient), None), 1);
    assert_eq!(count(None, Some(ancient)), 0);
    assert_eq!(store.all_transactions().unwrap()[0].id, tx.id);
}

#[test]
fn back_dating_outside_four_digit_years_is_rejected() {
    let store = store();
    let at = parse_local_timestamp("+12000-01-01 10:00", store.offset()).unwrap();
    let err = store
        .create_transaction(
            NewTransaction::new(TransactionType::StationarySale, d("1"), "admin").at(at),
        )
        .unwrap_err();
    assert_eq!(err.field(), Some("created_at"));
    let earliest = format!("{} 00:00", NaiveDate::MIN);
    assert!(parse_local_timestamp(&earliest, store.offset()).is_err());
    assert!(store.all_transactions().unwrap().is_empty());
}
