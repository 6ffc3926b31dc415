// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Maps a transaction to the cash it moves through the shop's drawer.
//!
//! | Type                          | cash_in | cash_out |
//! |-------------------------------|---------|----------|
//! | JazzCash / EasyPaisa send     | fee     | amount   |
//! | Bill payment                  | fee     | 0        |
//! | Stationary sale               | amount  | 0        |
//! | Bank deposit                  | 0       | amount   |
//! | Bank withdrawal               | amount  | 0        |

use rust_decimal::Decimal;
use serde::Serialize;

use crate::error::{Error, Result};
use crate::models::TransactionType;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CashFlow {
    pub cash_in: Decimal,
    pub cash_out: Decimal,
}

impl CashFlow {
    pub fn net(&self) -> Decimal {
        self.cash_in - self.cash_out
    }
}

/// Derive `(cash_in, cash_out)` for a transaction.
///
/// Negative inputs are rejected, and so is a nonzero fee on a type that
/// earns no fee (sales and bank movements).
pub fn derive(r#type: TransactionType, amount: Decimal, fee: Decimal) -> Result<CashFlow> {
    if amount < Decimal::ZERO {
        return Err(Error::validation("amount", "amount cannot be negative"));
    }
    if fee < Decimal::ZERO {
        return Err(Error::validation("fee", "fee cannot be negative"));
    }
    if !r#type.is_fee_bearing() && !fee.is_zero() {
        return Err(Error::validation(
            "fee",
            format!("{} does not carry a fee", r#type.label()),
        ));
    }

    let zero = Decimal::ZERO;
    let (cash_in, cash_out) = match r#type {
        TransactionType::JazzCashSend | TransactionType::EasyPaisaSend => (fee, amount),
        TransactionType::BillPayment => (fee, zero),
        TransactionType::StationarySale => (amount, zero),
        TransactionType::BankDeposit => (zero, amount),
        TransactionType::BankWithdrawal => (amount, zero),
    };
    // -0 normalises to 0 so stored text never reads "-0".
    Ok(CashFlow {
        cash_in: cash_in.abs(),
        cash_out: cash_out.abs(),
    })
}
