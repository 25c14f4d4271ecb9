//! Word arithmetic. Everything wraps at `WORD_BITS`; no promotion to a wider type.

use super::error::RuntimeFaultKind;

pub fn add(lhs: i64, rhs: i64) -> i64 {
    lhs.wrapping_add(rhs)
}

pub fn sub(lhs: i64, rhs: i64) -> i64 {
    lhs.wrapping_sub(rhs)
}

pub fn multiply(lhs: i64, rhs: i64) -> i64 {
    lhs.wrapping_mul(rhs)
}

/// Truncating division. `i64::MIN / -1` wraps to `i64::MIN`.
pub fn divide(lhs: i64, rhs: i64) -> Result<i64, RuntimeFaultKind> {
    if rhs == 0 {
        return Err(RuntimeFaultKind::DivideByZero);
    }

    Ok(lhs.wrapping_div(rhs))
}

/// Remainder with the sign of `lhs`.
pub fn modulo(lhs: i64, rhs: i64) -> Result<i64, RuntimeFaultKind> {
    if rhs == 0 {
        return Err(RuntimeFaultKind::DivideByZero);
    }

    Ok(lhs.wrapping_rem(rhs))
}

pub fn equal(lhs: i64, rhs: i64) -> i64 {
    (lhs == rhs) as i64
}

pub fn less_than(lhs: i64, rhs: i64) -> i64 {
    (lhs < rhs) as i64
}

pub fn greater_than(lhs: i64, rhs: i64) -> i64 {
    (lhs > rhs) as i64
}

pub fn is_truthy(val: i64) -> bool {
    val != 0
}
