use super::ledger::Ledger;
use super::EGGS_PER_DOZEN;
use rust_decimal::prelude::FromPrimitive;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::Serialize;

/// Return on investment including the value of eggs eaten at home
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RoiResult {
    /// See [`Ledger::consumed`]
    pub consumed: i128,
    /// Imputed value of consumed eggs
    pub savings: Decimal,
    pub cash_income: Decimal,
    pub total_income: Decimal,
    pub expenses: Decimal,
    pub roi: Decimal,
    /// Zero when there are no expenses; check `expenses_absent`
    pub roi_pct: Decimal,
    pub expenses_absent: bool,
}

/// `None` when the figures do not fit a decimal (consumption in the
/// octillions, or a price per dozen to match).
pub fn compute_roi(ledger: &Ledger, eggs_on_hand: u64, price_per_dozen: Decimal) -> Option<RoiResult> {
    let consumed = ledger.consumed(eggs_on_hand);
    if consumed < 0 {
        log::warn!("Consumption is negative ({}); income quantities exceed production", consumed);
    }

    let savings = Decimal::from_i128(consumed)?
        .checked_div(Decimal::from(EGGS_PER_DOZEN))?
        .checked_mul(price_per_dozen)?;
    let total_income = ledger.cash_income.checked_add(savings)?;
    let roi = total_income.checked_sub(ledger.expenses)?;
    let expenses_absent = ledger.expenses <= Decimal::ZERO;
    let roi_pct = if expenses_absent {
        Decimal::ZERO
    } else {
        roi.checked_div(ledger.expenses)?.checked_mul(dec!(100))?
    };

    Some(RoiResult {
        consumed,
        savings,
        cash_income: ledger.cash_income,
        total_income,
        expenses: ledger.expenses,
        roi,
        roi_pct,
        expenses_absent,
    })
}
