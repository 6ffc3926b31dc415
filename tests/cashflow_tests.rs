// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use cashtrack::cashflow::{CashFlow, derive};
use cashtrack::models::{PaymentMode, TransactionType};
use rust_decimal::Decimal;

fn d(s: &str) -> Decimal {
    s.parse().unwrap()
}

fn flow(cash_in: &str, cash_out: &str) -> CashFlow {
    CashFlow {
        cash_in: d(cash_in),
        cash_out: d(cash_out),
    }
}

#[test]
fn wallet_send_takes_fee_in_and_amount_out() {
    let f = derive(TransactionType::JazzCashSend, d("5000"), d("50")).unwrap();
    assert_eq!(f, flow("50", "5000"));
    assert_eq!(f.net(), d("-4950"));

    let f = derive(TransactionType::EasyPaisaSend, d("1200"), d("15")).unwrap();
    assert_eq!(f, flow("15", "1200"));
}

#[test]
fn bill_payment_only_moves_the_fee() {
    let f = derive(TransactionType::BillPayment, d("3000"), d("30")).unwrap();
    assert_eq!(f, flow("30", "0"));
}

#[test]
fn sales_and_bank_movements() {
    assert_eq!(
        derive(TransactionType::StationarySale, d("500"), Decimal::ZERO).unwrap(),
        flow("500", "0")
    );
    assert_eq!(
        derive(TransactionType::BankDeposit, d("200"), Decimal::ZERO).unwrap(),
        flow("0", "200")
    );
    assert_eq!(
        derive(TransactionType::BankWithdrawal, d("750.25"), Decimal::ZERO).unwrap(),
        flow("750.25", "0")
    );
}

#[test]
fn zero_amounts_are_accepted() {
    for t in TransactionType::ALL {
        let f = derive(t, Decimal::ZERO, Decimal::ZERO).unwrap();
        assert_eq!(f, flow("0", "0"), "{}", t);
        assert!(!f.cash_in.is_sign_negative());
        assert!(!f.cash_out.is_sign_negative());
    }
    // a fee-only send is still a send
    let f = derive(TransactionType::JazzCashSend, Decimal::ZERO, d("10")).unwrap();
    assert_eq!(f, flow("10", "0"));
}

#[test]
fn negatives_are_rejected() {
    let err = derive(TransactionType::StationarySale, d("-1"), Decimal::ZERO).unwrap_err();
    assert_eq!(err.field(), Some("amount"));

    let err = derive(TransactionType::JazzCashSend, d("100"), d("-5")).unwrap_err();
    assert_eq!(err.field(), Some("fee"));
}

#[test]
fn fee_on_a_feeless_type_is_rejected() {
    for t in [
        TransactionType::StationarySale,
        TransactionType::BankDeposit,
        TransactionType::BankWithdrawal,
    ] {
        let err = derive(t, d("100"), d("5")).unwrap_err();
        assert_eq!(err.field(), Some("fee"), "{}", t);
    }
}

#[test]
fn codes_parse_leniently() {
    assert_eq!(
        "jazzcash-send".parse::<TransactionType>().unwrap(),
        TransactionType::JazzCashSend
    );
    assert_eq!(
        " BILL_PAYMENT ".parse::<TransactionType>().unwrap(),
        TransactionType::BillPayment
    );
    assert_eq!("bank".parse::<PaymentMode>().unwrap(), PaymentMode::Bank);

    let err = "LOTTERY".parse::<TransactionType>().unwrap_err();
    assert_eq!(err.field(), Some("type"));
    let err = "cheque".parse::<PaymentMode>().unwrap_err();
    assert_eq!(err.field(), Some("payment_mode"));
}

#[test]
fn only_transfers_and_bills_bear_fees() {
    let bearing: Vec<_> = TransactionType::ALL
        .into_iter()
        .filter(|t| t.is_fee_bearing())
        .collect();
    assert_eq!(
        bearing,
        vec![
            TransactionType::JazzCashSend,
            TransactionType::EasyPaisaSend,
            TransactionType::BillPayment
        ]
    );
}

#[test]
fn json_uses_stored_codes() {
    let f = derive(TransactionType::BillPayment, d("3000"), d("30")).unwrap();
    assert_eq!(
        serde_json::to_value(f).unwrap(),
        serde_json::json!({"cash_in": "30", "cash_out": "0"})
    );
    assert_eq!(
        serde_json::to_value(TransactionType::EasyPaisaSend).unwrap(),
        serde_json::json!("EASYPAISA_SEND")
    );
    assert_eq!(
        serde_json::to_value(PaymentMode::JazzCash).unwrap(),
        serde_json::json!("JAZZCASH")
    );
}
