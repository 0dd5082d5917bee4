use rust_decimal::Decimal;
use serde::Serialize;

/// Data problems surfaced alongside the totals.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type")]
pub enum Diagnostic {
    /// Eggs were claimed but net laid is zero, so no ratio exists.
    DivisionByZero { claimed: u128 },
    /// More eggs broken than laid.
    NegativeNetLaid { net_laid: i128 },
    /// Totals too large for a decimal ratio.
    RatioOutOfRange { claimed: u128, net_laid: i128 },
    /// ROI figures too large for a decimal.
    RoiOutOfRange,
    /// No expenses recorded; ROI percentage reported as 0.
    ExpensesAbsent,
    /// Sold + donated + broken + on hand exceeds laid.
    NegativeConsumption { consumed: i128 },
    /// Egg income dated before the first production record.
    IncomeBeforeProduction {
        first_income: chrono::NaiveDate,
        first_production: chrono::NaiveDate,
    },
    /// Average implied price per dozen is implausibly low.
    LowPricePerDozen {
        average: Decimal,
    },
}

impl Diagnostic {
    pub fn message(&self) -> String {
        match self {
            Diagnostic::DivisionByZero { claimed } => format!(
                "{} eggs sold/donated but net laid is 0; ratio undetermined",
                claimed
            ),
            Diagnostic::NegativeNetLaid { net_laid } => {
                format!("more eggs broken than laid (net laid {}); ratio undetermined", net_laid)
            }
            Diagnostic::RatioOutOfRange { claimed, net_laid } => format!(
                "{} eggs sold/donated against net laid {} is beyond decimal range; ratio undetermined",
                claimed, net_laid
            ),
            Diagnostic::RoiOutOfRange => {
                "ROI figures are beyond decimal range; check quantities and price".to_string()
            }
            Diagnostic::ExpensesAbsent => "no expenses recorded; ROI % is N/A".to_string(),
            Diagnostic::NegativeConsumption { consumed } => format!(
                "consumption is {} eggs; income quantities exceed what was laid",
                consumed
            ),
            Diagnostic::IncomeBeforeProduction {
                first_income,
                first_production,
            } => format!(
                "egg income starts {} but production records start {}",
                first_income, first_production
            ),
            Diagnostic::LowPricePerDozen { average } => format!(
                "average price {:.2}/dozen is suspiciously low; quantities may be in eggs where dozens were meant",
                average
            ),
        }
    }
}
