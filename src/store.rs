// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! SQLite-backed data access for transactions, users and bills.
//!
//! Every write goes through [`cashflow::derive`], so `cash_in`/`cash_out` on
//! disk always follow from `(type, amount, fee)`. Reads never cache: each call
//! hits the database.

use chrono::{DateTime, Datelike, Duration, FixedOffset, NaiveDate, NaiveTime, Utc};
use std::ops::RangeInclusive;
use rusqlite::types::Value;
use rusqlite::{Connection, OptionalExtension, Row, params, params_from_iter};
use rust_decimal::Decimal;
use tracing::{debug, info, warn};

use crate::cashflow::{self, CashFlow};
use crate::config::Config;
use crate::db;
use crate::error::{Error, Result};
use crate::models::{
    Bill, BillFilter, BillStats, BillStatus, NewBill, NewTransaction, PaymentMode, Transaction,
    TransactionFilter, TransactionType, TransactionUpdate, User,
};

const TS_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.6fZ";

/// Years a stored timestamp may fall in; four digits keep text order equal
/// to time order.
const STORED_YEARS: RangeInclusive<i32> = 1..=9999;

const TX_COLUMNS: &str = "t.id, t.type, t.amount, t.fee, t.payment_mode, t.cash_in, t.cash_out, \
     t.note, t.created_at, t.updated_at, u.username";

const BILL_COLUMNS: &str = "b.id, b.customer_ref, b.customer_name, b.amount, b.fee, b.due_date, \
     b.status, b.transaction_id, b.paid_at, b.note, b.created_at, u.username";

pub struct Store {
    conn: Connection,
    config: Config,
}

impl Store {
    pub fn new(conn: Connection, config: Config) -> Self {
        Self { conn, config }
    }

    /// Open an existing connection, make sure the schema exists and load the
    /// persisted configuration.
    pub fn from_connection(conn: Connection) -> Result<Self> {
        db::init_schema(&conn)?;
        let config = Config::load(&conn)?;
        Ok(Self::new(conn, config))
    }

    pub fn open_in_memory(config: Config) -> Result<Self> {
        Ok(Self::new(db::open_in_memory()?, config))
    }

    pub fn conn(&self) -> &Connection {
        &self.conn
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn set_config(&mut self, key: &str, value: &str) -> Result<()> {
        self.config.set(&self.conn, key, value)?;
        info!(key, value, "setting updated");
        Ok(())
    }

    pub fn offset(&self) -> FixedOffset {
        self.config.utc_offset
    }

    /// Current calendar date in the shop's timezone.
    pub fn today(&self) -> NaiveDate {
        Utc::now().with_timezone(&self.config.utc_offset).date_naive()
    }

    // ---------------------------------------------------------------------
    // users
    // ---------------------------------------------------------------------

    /// Get-or-create a user by name and return its id.
    pub fn ensure_user(&self, username: &str) -> Result<i64> {
        ensure_user(&self.conn, username)
    }

    pub fn list_users(&self) -> Result<Vec<User>> {
        let mut stmt = self
            .conn
            .prepare("SELECT id, username, created_at FROM users ORDER BY username")?;
        let rows = stmt.query_map([], |r| {
            Ok((
                r.get::<_, i64>(0)?,
                r.get::<_, String>(1)?,
                r.get::<_, String>(2)?,
            ))
        })?;
        let mut users = Vec::new();
        for row in rows {
            let (id, username, created_at) = row?;
            users.push(User {
                id,
                username,
                created_at: ts_from_sql(&created_at)?,
            });
        }
        Ok(users)
    }

    // ---------------------------------------------------------------------
    // transactions
    // ---------------------------------------------------------------------

    pub fn create_transaction(&self, new: NewTransaction) -> Result<Transaction> {
        let id = insert_transaction(&self.conn, &self.config, &new)?;
        self.get_transaction(id)
    }

    pub fn get_transaction(&self, id: i64) -> Result<Transaction> {
        fetch_transaction(&self.conn, id)?.ok_or_else(|| Error::not_found("transaction", id))
    }

    /// Apply an edit and recompute the derived cash sides. `created_at` and
    /// `created_by` are never touched. A bill settlement keeps the type,
    /// amount and fee of its bill; only its note and payment mode may change.
    pub fn update_transaction(&self, id: i64, update: TransactionUpdate) -> Result<Transaction> {
        let current = self.get_transaction(id)?;
        if update.is_empty() {
            return Ok(current);
        }
        let r#type = update.r#type.unwrap_or(current.r#type);
        let amount = update.amount.unwrap_or(current.amount);
        let fee = update.fee.unwrap_or(current.fee);
        if (r#type, amount, fee) != (current.r#type, current.amount, current.fee) {
            if let Some(bill_id) = settled_bill(&self.conn, id)? {
                warn!(id, bill_id, "refusing to change a bill settlement");
                return Err(Error::validation(
                    "id",
                    format!(
                        "transaction #{} settles bill #{}; only its note and payment mode can change",
                        id, bill_id
                    ),
                ));
            }
        }
        let payment_mode = update.payment_mode.unwrap_or(current.payment_mode);
        let note = match update.note {
            Some(n) => clean_note(n),
            None => current.note.clone(),
        };
        let flow = validate_write(&self.config, r#type, amount, fee)?;

        self.conn.execute(
            "UPDATE transactions
             SET type=?1, amount=?2, fee=?3, payment_mode=?4, cash_in=?5, cash_out=?6,
                 note=?7, updated_at=?8
             WHERE id=?9",
            params![
                r#type.code(),
                amount.to_string(),
                fee.to_string(),
                payment_mode.code(),
                flow.cash_in.to_string(),
                flow.cash_out.to_string(),
                note,
                ts_to_sql(Utc::now()),
                id
            ],
        )?;
        info!(
            id,
            kind = %r#type,
            %amount,
            %fee,
            cash_in = %flow.cash_in,
            cash_out = %flow.cash_out,
            "transaction updated"
        );
        self.get_transaction(id)
    }

    /// Remove a transaction. One that settles a bill stays until the bill goes.
    pub fn delete_transaction(&self, id: i64) -> Result<Transaction> {
        let current = self.get_transaction(id)?;
        if let Some(bill_id) = settled_bill(&self.conn, id)? {
            warn!(id, bill_id, "refusing to delete a bill settlement");
            return Err(Error::validation(
                "id",
                format!("transaction #{} settles bill #{}", id, bill_id),
            ));
        }
        self.conn
            .execute("DELETE FROM transactions WHERE id=?1", params![id])?;
        info!(id, "transaction deleted");
        Ok(current)
    }

    /// Newest first.
    pub fn list_transactions(&self, filter: &TransactionFilter) -> Result<Vec<Transaction>> {
        let mut sql = format!(
            "SELECT {} FROM transactions t JOIN users u ON u.id=t.created_by WHERE 1=1",
            TX_COLUMNS
        );
        let mut args: Vec<Value> = Vec::new();

        if let Some(t) = filter.r#type {
            sql.push_str(" AND t.type=?");
            args.push(Value::Text(t.code().into()));
        }
        if let Some(m) = filter.payment_mode {
            sql.push_str(" AND t.payment_mode=?");
            args.push(Value::Text(m.code().into()));
        }
        // Stored timestamps stay within STORED_YEARS, where text order is time
        // order; a bound beyond that range either excludes nothing or everything.
        if let Some(from) = filter.from {
            match day_start_utc(from, self.offset()) {
                Some(start) if start.year() > *STORED_YEARS.end() => sql.push_str(" AND 0"),
                Some(start) if start.year() >= *STORED_YEARS.start() => {
                    sql.push_str(" AND t.created_at>=?");
                    args.push(Value::Text(ts_to_sql(start)));
                }
                _ => {}
            }
        }
        if let Some(to) = filter.to {
            match to.succ_opt().and_then(|d| day_start_utc(d, self.offset())) {
                Some(end) if end.year() < *STORED_YEARS.start() => sql.push_str(" AND 0"),
                Some(end) if end.year() <= *STORED_YEARS.end() => {
                    sql.push_str(" AND t.created_at<?");
                    args.push(Value::Text(ts_to_sql(end)));
                }
                _ => {}
            }
        }
        if let Some(term) = filter.search.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
            sql.push_str(" AND (t.note LIKE ? ESCAPE '\\' OR u.username LIKE ? ESCAPE '\\')");
            let pat = like_pattern(term);
            args.push(Value::Text(pat.clone()));
            args.push(Value::Text(pat));
        }
        if let Some(user) = filter.user.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
            sql.push_str(" AND u.username=?");
            args.push(Value::Text(user.into()));
        }
        sql.push_str(" ORDER BY t.created_at DESC, t.id DESC");
        if let Some(limit) = filter.limit {
            sql.push_str(" LIMIT ?");
            args.push(Value::Integer(i64::try_from(limit).unwrap_or(i64::MAX)));
        }
        debug!(%sql, "listing transactions");

        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map(params_from_iter(args.iter()), RawTransaction::from_row)?;
        let mut data = Vec::new();
        for row in rows {
            data.push(row?.decode()?);
        }
        Ok(data)
    }

    /// Every transaction, newest first.
    pub fn all_transactions(&self) -> Result<Vec<Transaction>> {
        self.list_transactions(&TransactionFilter::default())
    }

    // ---------------------------------------------------------------------
    // bills
    // ---------------------------------------------------------------------

    /// Record a bill. With `pay_now` it is settled inside the same database
    /// transaction.
    pub fn create_bill(&mut self, new: NewBill, pay_now: bool) -> Result<Bill> {
        let customer_ref = new.customer_ref.trim().to_string();
        if customer_ref.is_empty() {
            return Err(Error::validation("customer_ref", "customer reference is required"));
        }
        let fee = new.fee.unwrap_or(Decimal::ZERO);
        if new.amount <= Decimal::ZERO {
            return Err(Error::validation("amount", "bill amount must be greater than zero"));
        }
        validate_write(&self.config, TransactionType::BillPayment, new.amount, fee)?;

        let tx = self.conn.transaction()?;
        let user_id = ensure_user(&tx, &new.user)?;
        tx.execute(
            "INSERT INTO bills(customer_ref, customer_name, amount, fee, due_date, status, note,
                               created_at, created_by)
             VALUES (?1, ?2, ?3, ?4, ?5, 'PENDING', ?6, ?7, ?8)",
            params![
                customer_ref,
                new.customer_name
                    .as_deref()
                    .map(str::trim)
                    .filter(|s| !s.is_empty()),
                new.amount.to_string(),
                fee.to_string(),
                new.due_date,
                clean_note(new.note.clone()),
                ts_to_sql(Utc::now()),
                user_id
            ],
        )?;
        let id = tx.last_insert_rowid();
        info!(id, customer = %customer_ref, amount = %new.amount, "bill recorded");
        if pay_now {
            let bill = fetch_bill(&tx, id)?.ok_or_else(|| Error::not_found("bill", id))?;
            settle_bill(&tx, &self.config, &bill, &new.user)?;
        }
        tx.commit()?;
        self.get_bill(id)
    }

    pub fn get_bill(&self, id: i64) -> Result<Bill> {
        fetch_bill(&self.conn, id)?.ok_or_else(|| Error::not_found("bill", id))
    }

    /// Settle a pending bill: records a bill-payment transaction and links it.
    pub fn pay_bill(&mut self, id: i64, user: &str) -> Result<Bill> {
        let tx = self.conn.transaction()?;
        let bill = fetch_bill(&tx, id)?.ok_or_else(|| Error::not_found("bill", id))?;
        if bill.status == BillStatus::Paid {
            return Err(Error::validation(
                "status",
                format!("bill #{} is already paid", id),
            ));
        }
        settle_bill(&tx, &self.config, &bill, user)?;
        tx.commit()?;
        self.get_bill(id)
    }

    /// Settle every pending bill among `ids`; paid or unknown ids are skipped.
    /// All or nothing: any failure rolls the whole batch back.
    pub fn pay_bills(&mut self, ids: &[i64], user: &str) -> Result<usize> {
        let tx = self.conn.transaction()?;
        let mut paid = 0;
        for &id in ids {
            match fetch_bill(&tx, id)? {
                Some(bill) if bill.status == BillStatus::Pending => {
                    settle_bill(&tx, &self.config, &bill, user)?;
                    paid += 1;
                }
                Some(_) => debug!(id, "bill already paid, skipping"),
                None => debug!(id, "no such bill, skipping"),
            }
        }
        tx.commit()?;
        info!(paid, requested = ids.len(), "bulk bill payment");
        Ok(paid)
    }

    /// Ordered by due date, then newest first.
    pub fn list_bills(&self, filter: &BillFilter) -> Result<Vec<Bill>> {
        let mut sql = format!(
            "SELECT {} FROM bills b JOIN users u ON u.id=b.created_by WHERE 1=1",
            BILL_COLUMNS
        );
        let mut args: Vec<Value> = Vec::new();
        if let Some(status) = filter.status {
            sql.push_str(" AND b.status=?");
            args.push(Value::Text(status.code().into()));
        }
        if let Some(c) = filter.customer.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
            sql.push_str(" AND b.customer_ref LIKE ? ESCAPE '\\'");
            args.push(Value::Text(like_pattern(c)));
        }
        if let Some(from) = filter.due_from {
            sql.push_str(" AND b.due_date>=?");
            args.push(Value::Text(from.to_string()));
        }
        if let Some(to) = filter.due_to {
            sql.push_str(" AND b.due_date<=?");
            args.push(Value::Text(to.to_string()));
        }
        if let Some(term) = filter.search.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
            sql.push_str(
                " AND (b.customer_ref LIKE ? ESCAPE '\\' OR b.customer_name LIKE ? ESCAPE '\\' \
                 OR b.note LIKE ? ESCAPE '\\')",
            );
            let pat = like_pattern(term);
            for _ in 0..3 {
                args.push(Value::Text(pat.clone()));
            }
        }
        sql.push_str(" ORDER BY b.due_date ASC, b.created_at DESC, b.id DESC");

        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map(params_from_iter(args.iter()), RawBill::from_row)?;
        let mut data = Vec::new();
        for row in rows {
            data.push(row?.decode()?);
        }
        Ok(data)
    }

    pub fn bill_stats(&self, today: NaiveDate) -> Result<BillStats> {
        let stats = self.conn.query_row(
            "SELECT COUNT(*),
                    IFNULL(SUM(status='PENDING'), 0),
                    IFNULL(SUM(status='PAID'), 0),
                    IFNULL(SUM(status='PENDING' AND due_date<?1), 0)
             FROM bills",
            params![today],
            |r| {
                Ok(BillStats {
                    total: r.get(0)?,
                    pending: r.get(1)?,
                    paid: r.get(2)?,
                    overdue: r.get(3)?,
                })
            },
        )?;
        Ok(stats)
    }
}

// -------------------------------------------------------------------------
// helpers usable inside a rusqlite::Transaction
// -------------------------------------------------------------------------

fn ensure_user(conn: &Connection, username: &str) -> Result<i64> {
    let username = username.trim();
    if username.is_empty() {
        return Err(Error::validation("user", "user is required"));
    }
    let created = conn.execute(
        "INSERT INTO users(username, created_at) VALUES (?1, ?2)
         ON CONFLICT(username) DO NOTHING",
        params![username, ts_to_sql(Utc::now())],
    )?;
    if created > 0 {
        info!(username, "user created");
    }
    let id = conn.query_row(
        "SELECT id FROM users WHERE username=?1",
        params![username],
        |r| r.get(0),
    )?;
    Ok(id)
}

fn insert_transaction(conn: &Connection, config: &Config, new: &NewTransaction) -> Result<i64> {
    let fee = new.fee.unwrap_or(Decimal::ZERO);
    let flow = validate_write(config, new.r#type, new.amount, fee)?;
    let created_at = new.created_at.unwrap_or_else(Utc::now);
    if !STORED_YEARS.contains(&created_at.year()) {
        return Err(Error::validation(
            "created_at",
            format!("year {} is out of range", created_at.year()),
        ));
    }
    let user_id = ensure_user(conn, &new.user)?;
    let created_at = ts_to_sql(created_at);
    conn.execute(
        "INSERT INTO transactions(type, amount, fee, payment_mode, cash_in, cash_out, note,
                                  created_at, updated_at, created_by)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?8, ?9)",
        params![
            new.r#type.code(),
            new.amount.to_string(),
            fee.to_string(),
            new.payment_mode.code(),
            flow.cash_in.to_string(),
            flow.cash_out.to_string(),
            clean_note(new.note.clone()),
            created_at,
            user_id
        ],
    )?;
    let id = conn.last_insert_rowid();
    info!(
        id,
        kind = %new.r#type,
        amount = %new.amount,
        %fee,
        cash_in = %flow.cash_in,
        cash_out = %flow.cash_out,
        user = %new.user.trim(),
        "transaction recorded"
    );
    Ok(id)
}

fn settle_bill(conn: &Connection, config: &Config, bill: &Bill, user: &str) -> Result<i64> {
    let new = NewTransaction::new(TransactionType::BillPayment, bill.amount, user)
        .fee(bill.fee)
        .payment_mode(PaymentMode::Cash)
        .note(format!("Bill payment for customer {}", bill.customer_ref));
    let tx_id = insert_transaction(conn, config, &new)?;
    conn.execute(
        "UPDATE bills SET status='PAID', transaction_id=?1, paid_at=?2 WHERE id=?3",
        params![tx_id, ts_to_sql(Utc::now()), bill.id],
    )?;
    info!(bill = bill.id, transaction = tx_id, "bill paid");
    Ok(tx_id)
}

/// The bill a transaction settles, if any.
fn settled_bill(conn: &Connection, tx_id: i64) -> Result<Option<i64>> {
    let bill = conn
        .query_row(
            "SELECT id FROM bills WHERE transaction_id=?1",
            params![tx_id],
            |r| r.get(0),
        )
        .optional()?;
    Ok(bill)
}

fn fetch_transaction(conn: &Connection, id: i64) -> Result<Option<Transaction>> {
    let sql = format!(
        "SELECT {} FROM transactions t JOIN users u ON u.id=t.created_by WHERE t.id=?1",
        TX_COLUMNS
    );
    let raw = conn
        .query_row(&sql, params![id], RawTransaction::from_row)
        .optional()?;
    raw.map(RawTransaction::decode).transpose()
}

fn fetch_bill(conn: &Connection, id: i64) -> Result<Option<Bill>> {
    let sql = format!(
        "SELECT {} FROM bills b JOIN users u ON u.id=b.created_by WHERE b.id=?1",
        BILL_COLUMNS
    );
    let raw = conn
        .query_row(&sql, params![id], RawBill::from_row)
        .optional()?;
    raw.map(RawBill::decode).transpose()
}

/// Checks applied to every write on top of the rule engine's own.
fn validate_write(
    config: &Config,
    r#type: TransactionType,
    amount: Decimal,
    fee: Decimal,
) -> Result<CashFlow> {
    let flow = cashflow::derive(r#type, amount, fee).inspect_err(|e| {
        warn!(error = %e, "rejected transaction");
    })?;
    if amount > config.max_amount {
        return Err(Error::validation(
            "amount",
            format!("amount exceeds the {} ceiling", config.max_amount),
        ));
    }
    if amount.normalize().scale() > 2 {
        return Err(Error::validation("amount", "at most two decimal places"));
    }
    if fee.normalize().scale() > 2 {
        return Err(Error::validation("fee", "at most two decimal places"));
    }
    if r#type.is_fee_bearing() && fee > amount {
        return Err(Error::validation("fee", "fee cannot exceed the amount"));
    }
    Ok(flow)
}

fn clean_note(note: Option<String>) -> Option<String> {
    note.map(|n| n.trim().to_string()).filter(|n| !n.is_empty())
}

fn like_pattern(term: &str) -> String {
    let escaped = term
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{}%", escaped)
}

/// The UTC instant at which `day` begins in the shop's timezone, or `None`
/// when that instant lies outside chrono's range.
pub fn day_start_utc(day: NaiveDate, offset: FixedOffset) -> Option<DateTime<Utc>> {
    day.and_time(NaiveTime::MIN)
        .checked_sub_signed(Duration::seconds(i64::from(offset.local_minus_utc())))
        .map(|t| t.and_utc())
}

fn ts_to_sql(ts: DateTime<Utc>) -> String {
    ts.format(TS_FORMAT).to_string()
}

fn ts_from_sql(s: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(s)
        .map(|d| d.with_timezone(&Utc))
        .map_err(|e| Error::Corrupt(format!("timestamp '{}': {}", s, e)))
}

fn decimal_from_sql(s: &str, what: &str) -> Result<Decimal> {
    s.parse::<Decimal>()
        .map_err(|e| Error::Corrupt(format!("{} '{}': {}", what, s, e)))
}

fn corrupt(e: Error) -> Error {
    match e {
        Error::Validation { message, .. } => Error::Corrupt(message),
        other => other,
    }
}

struct RawTransaction {
    id: i64,
    r#type: String,
    amount: String,
    fee: String,
    payment_mode: String,
    cash_in: String,
    cash_out: String,
    note: Option<String>,
    created_at: String,
    updated_at: String,
    created_by: String,
}

impl RawTransaction {
    fn from_row(r: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: r.get(0)?,
            r#type: r.get(1)?,
            amount: r.get(2)?,
            fee: r.get(3)?,
            payment_mode: r.get(4)?,
            cash_in: r.get(5)?,
            cash_out: r.get(6)?,
            note: r.get(7)?,
            created_at: r.get(8)?,
            updated_at: r.get(9)?,
            created_by: r.get(10)?,
        })
    }

    fn decode(self) -> Result<Transaction> {
        Ok(Transaction {
            id: self.id,
            r#type: self.r#type.parse().map_err(corrupt)?,
            amount: decimal_from_sql(&self.amount, "amount")?,
            fee: decimal_from_sql(&self.fee, "fee")?,
            payment_mode: self.payment_mode.parse().map_err(corrupt)?,
            cash_in: decimal_from_sql(&self.cash_in, "cash_in")?,
            cash_out: decimal_from_sql(&self.cash_out, "cash_out")?,
            note: self.note,
            created_at: ts_from_sql(&self.created_at)?,
            updated_at: ts_from_sql(&self.updated_at)?,
            created_by: self.created_by,
        })
    }
}

struct RawBill {
    id: i64,
    customer_ref: String,
    customer_name: Option<String>,
    amount: String,
    fee: String,
    due_date: NaiveDate,
    status: String,
    transaction_id: Option<i64>,
    paid_at: Option<String>,
    note: Option<String>,
    created_at: String,
    created_by: String,
}

impl RawBill {
    fn from_row(r: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: r.get(0)?,
            customer_ref: r.get(1)?,
            customer_name: r.get(2)?,
            amount: r.get(3)?,
            fee: r.get(4)?,
            due_date: r.get(5)?,
            status: r.get(6)?,
            transaction_id: r.get(7)?,
            paid_at: r.get(8)?,
            note: r.get(9)?,
            created_at: r.get(10)?,
            created_by: r.get(11)?,
        })
    }

    fn decode(self) -> Result<Bill> {
        Ok(Bill {
            id: self.id,
            customer_ref: self.customer_ref,
            customer_name: self.customer_name,
            amount: decimal_from_sql(&self.amount, "amount")?,
            fee: decimal_from_sql(&self.fee, "fee")?,
            due_date: self.due_date,
            status: self.status.parse().map_err(corrupt)?,
            transaction_id: self.transaction_id,
            paid_at: self.paid_at.as_deref().map(ts_from_sql).transpose()?,
            note: self.note,
            created_at: ts_from_sql(&self.created_at)?,
            created_by: self.created_by,
        })
    }
}
