// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use chrono::{DateTime, FixedOffset, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use std::fmt;
use std::str::FromStr;

use crate::error::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum TransactionType {
    #[serde(rename = "JAZZCASH_SEND")]
    JazzCashSend,
    #[serde(rename = "EASYPAISA_SEND")]
    EasyPaisaSend,
    #[serde(rename = "BILL_PAYMENT")]
    BillPayment,
    #[serde(rename = "STATIONARY_SALE")]
    StationarySale,
    #[serde(rename = "BANK_DEPOSIT")]
    BankDeposit,
    #[serde(rename = "BANK_WITHDRAWAL")]
    BankWithdrawal,
}

impl TransactionType {
    pub const ALL: [TransactionType; 6] = [
        TransactionType::JazzCashSend,
        TransactionType::EasyPaisaSend,
        TransactionType::BillPayment,
        TransactionType::StationarySale,
        TransactionType::BankDeposit,
        TransactionType::BankWithdrawal,
    ];

    /// Code stored in the database and used on the command line.
    pub fn code(self) -> &'static str {
        match self {
            TransactionType::JazzCashSend => "JAZZCASH_SEND",
            TransactionType::EasyPaisaSend => "EASYPAISA_SEND",
            TransactionType::BillPayment => "BILL_PAYMENT",
            TransactionType::StationarySale => "STATIONARY_SALE",
            TransactionType::BankDeposit => "BANK_DEPOSIT",
            TransactionType::BankWithdrawal => "BANK_WITHDRAWAL",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            TransactionType::JazzCashSend => "JazzCash Send",
            TransactionType::EasyPaisaSend => "EasyPaisa Send",
            TransactionType::BillPayment => "Bill Payment",
            TransactionType::StationarySale => "Stationary Sale",
            TransactionType::BankDeposit => "Bank Deposit",
            TransactionType::BankWithdrawal => "Bank Withdrawal",
        }
    }

    /// Whether the shop earns a fee on this kind of transaction.
    pub fn is_fee_bearing(self) -> bool {
        matches!(
            self,
            TransactionType::JazzCashSend
                | TransactionType::EasyPaisaSend
                | TransactionType::BillPayment
        )
    }
}

impl fmt::Display for TransactionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for TransactionType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key = s.trim().to_ascii_uppercase().replace('-', "_");
        TransactionType::ALL
            .into_iter()
            .find(|t| t.code() == key)
            .ok_or_else(|| Error::validation("type", format!("unknown transaction type '{}'", s)))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum PaymentMode {
    #[default]
    Cash,
    JazzCash,
    EasyPaisa,
    Bank,
}

impl PaymentMode {
    pub const ALL: [PaymentMode; 4] = [
        PaymentMode::Cash,
        PaymentMode::JazzCash,
        PaymentMode::EasyPaisa,
        PaymentMode::Bank,
    ];

    pub fn code(self) -> &'static str {
        match self {
            PaymentMode::Cash => "CASH",
            PaymentMode::JazzCash => "JAZZCASH",
            PaymentMode::EasyPaisa => "EASYPAISA",
            PaymentMode::Bank => "BANK",
        }
    }
}

impl fmt::Display for PaymentMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for PaymentMode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key = s.trim().to_ascii_uppercase();
        PaymentMode::ALL
            .into_iter()
            .find(|m| m.code() == key)
            .ok_or_else(|| {
                Error::validation("payment_mode", format!("unknown payment mode '{}'", s))
            })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Transaction {
    pub id: i64,
    pub r#type: TransactionType,
    pub amount: Decimal,
    pub fee: Decimal,
    pub payment_mode: PaymentMode,
    pub cash_in: Decimal,
    pub cash_out: Decimal,
    pub note: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub created_by: String,
}

impl Transaction {
    /// Positive when the shop's cash grew.
    pub fn net(&self) -> Decimal {
        self.cash_in - self.cash_out
    }

    /// Calendar date of `created_at` in the shop's timezone.
    pub fn local_date(&self, offset: FixedOffset) -> NaiveDate {
        self.created_at.with_timezone(&offset).date_naive()
    }
}

/// Input for `Store::create_transaction`. `cash_in`/`cash_out` are never
/// accepted from the caller.
#[derive(Debug, Clone)]
pub struct NewTransaction {
    pub r#type: TransactionType,
    pub amount: Decimal,
    pub fee: Option<Decimal>,
    pub payment_mode: PaymentMode,
    pub note: Option<String>,
    pub user: String,
    /// Back-dates the entry; `None` stamps the current time.
    pub created_at: Option<DateTime<Utc>>,
}

impl NewTransaction {
    pub fn new(r#type: TransactionType, amount: Decimal, user: impl Into<String>) -> Self {
        Self {
            r#type,
            amount,
            fee: None,
            payment_mode: PaymentMode::Cash,
            note: None,
            user: user.into(),
            created_at: None,
        }
    }

    pub fn fee(mut self, fee: Decimal) -> Self {
        self.fee = Some(fee);
        self
    }

    pub fn payment_mode(mut self, mode: PaymentMode) -> Self {
        self.payment_mode = mode;
        self
    }

    pub fn note(mut self, note: impl Into<String>) -> Self {
        self.note = Some(note.into());
        self
    }

    pub fn at(mut self, created_at: DateTime<Utc>) -> Self {
        self.created_at = Some(created_at);
        self
    }
}

/// Fields an edit may change. `None` keeps the stored value; for `note`,
/// `Some(None)` clears it.
#[derive(Debug, Clone, Default)]
pub struct TransactionUpdate {
    pub r#type: Option<TransactionType>,
    pub amount: Option<Decimal>,
    pub fee: Option<Decimal>,
    pub payment_mode: Option<PaymentMode>,
    pub note: Option<Option<String>>,
}

impl TransactionUpdate {
    pub fn is_empty(&self) -> bool {
        self.r#type.is_none()
            && self.amount.is_none()
            && self.fee.is_none()
            && self.payment_mode.is_none()
            && self.note.is_none()
    }
}

#[derive(Debug, Clone, Default)]
pub struct TransactionFilter {
    pub r#type: Option<TransactionType>,
    pub payment_mode: Option<PaymentMode>,
    /// Inclusive local dates.
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
    /// Case-insensitive match on the note or the owner's username.
    pub search: Option<String>,
    pub user: Option<String>,
    pub limit: Option<usize>,
}

#[derive(Debug, Clone, Serialize)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum BillStatus {
    Pending,
    Paid,
}

impl BillStatus {
    pub fn code(self) -> &'static str {
        match self {
            BillStatus::Pending => "PENDING",
            BillStatus::Paid => "PAID",
        }
    }
}

impl fmt::Display for BillStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for BillStatus {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "PENDING" => Ok(BillStatus::Pending),
            "PAID" => Ok(BillStatus::Paid),
            _ => Err(Error::validation(
                "status",
                format!("unknown bill status '{}'", s),
            )),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Bill {
    pub id: i64,
    pub customer_ref: String,
    pub customer_name: Option<String>,
    pub amount: Decimal,
    pub fee: Decimal,
    pub due_date: NaiveDate,
    pub status: BillStatus,
    pub transaction_id: Option<i64>,
    pub paid_at: Option<DateTime<Utc>>,
    pub note: Option<String>,
    pub created_at: DateTime<Utc>,
    pub created_by: String,
}

impl Bill {
    /// What the customer hands over: principal plus fee.
    pub fn total(&self) -> Decimal {
        self.amount + self.fee
    }

    pub fn is_overdue(&self, today: NaiveDate) -> bool {
        self.status == BillStatus::Pending && today > self.due_date
    }
}

#[derive(Debug, Clone)]
pub struct NewBill {
    pub customer_ref: String,
    pub customer_name: Option<String>,
    pub amount: Decimal,
    pub fee: Option<Decimal>,
    pub due_date: NaiveDate,
    pub note: Option<String>,
    pub user: String,
}

#[derive(Debug, Clone, Default)]
pub struct BillFilter {
    pub status: Option<BillStatus>,
    pub customer: Option<String>,
    pub due_from: Option<NaiveDate>,
    pub due_to: Option<NaiveDate>,
    pub search: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BillStats {
    pub total: i64,
    pub pending: i64,
    pub paid: i64,
    pub overdue: i64,
}
