//! Conversions between ledger amounts and stored minor units
//!
//! Amounts are kept in the store as integer cents so that `SUM` in SQL is
//! exact. Everything above the store works with `Decimal`.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;

use crate::error::{Error, Result};

/// Fractional digits carried by ledger amounts
pub const SCALE: u32 = 2;

/// Largest amount a single record may carry (one trillion).
///
/// Keeps integer `SUM` over any realistic ledger within `i64` cents.
pub const MAX_AMOUNT: Decimal = Decimal::from_parts(3_567_587_328, 232, 0, false, 0);

/// Convert a caller-supplied amount to cents.
///
/// Rejects negative amounts, amounts with more precision than a cent and
/// amounts above `MAX_AMOUNT`.
pub fn to_cents(amount: Decimal) -> Result<i64> {
    if amount.is_sign_negative() && !amount.is_zero() {
        return Err(Error::InvalidData(format!(
            "Amount must not be negative: {}",
            amount
        )));
    }
    let normalized = amount.normalize();
    if normalized.scale() > SCALE {
        return Err(Error::InvalidData(format!(
            "Amount has more than {} decimal places: {}",
            SCALE, amount
        )));
    }
    if normalized > MAX_AMOUNT {
        return Err(Error::InvalidData(format!(
            "Amount must not exceed {}: {}",
            MAX_AMOUNT, amount
        )));
    }
    normalized
        .checked_mul(Decimal::ONE_HUNDRED)
        .and_then(|cents| cents.to_i64())
        .ok_or_else(|| Error::InvalidData(format!("Amount out of range: {}", amount)))
}

/// Convert stored cents back to a ledger amount
pub fn from_cents(cents: i64) -> Decimal {
    Decimal::new(cents, SCALE)
}
