use super::duplicates::DuplicateGroups;
use super::ledger::{to_signed, Ledger};
use super::EGGS_PER_DOZEN;
use rust_decimal::prelude::FromPrimitive;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::Serialize;

/// Why a ratio could not be computed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Undetermined {
    /// Net laid is exactly zero
    DivisionByZero,
    /// More eggs broken than laid
    NegativeNetLaid,
    /// Totals too large to divide as decimals
    OutOfRange,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status")]
pub enum ImbalanceStatus {
    /// Sold + donated fits within net laid
    Balanced,
    /// Sold + donated exceeds net laid
    Exceeded { excess: i128, ratio: Decimal },
    /// Sold + donated exceeds net laid, but no usable ratio exists
    Undetermined { reason: Undetermined },
}

/// Outcome of checking `sold + donated <= laid - broken`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ImbalanceReport {
    pub claimed: u128,
    pub net_laid: i128,
    /// `claimed / net_laid`, absent when net laid is zero or negative
    pub ratio: Option<Decimal>,
    pub status: ImbalanceStatus,
}

impl ImbalanceReport {
    pub fn is_imbalanced(&self) -> bool {
        !matches!(self.status, ImbalanceStatus::Balanced)
    }

    /// Net laid minus claimed: eggs left for consumption, negative when over
    pub fn headroom(&self) -> i128 {
        self.net_laid.saturating_sub(to_signed(self.claimed))
    }
}

fn ratio(claimed: u128, net_laid: i128) -> Option<Decimal> {
    Decimal::from_u128(claimed)?.checked_div(Decimal::from_i128(net_laid)?)
}

pub fn detect_imbalance(ledger: &Ledger) -> ImbalanceReport {
    let claimed = ledger.claimed();
    let net_laid = ledger.net_laid();

    let ratio = if net_laid > 0 {
        ratio(claimed, net_laid)
    } else {
        None
    };

    let status = if to_signed(claimed) <= net_laid {
        ImbalanceStatus::Balanced
    } else {
        match ratio {
            Some(ratio) => ImbalanceStatus::Exceeded {
                excess: to_signed(claimed).saturating_sub(net_laid),
                ratio,
            },
            None => {
                let reason = match net_laid {
                    0 => Undetermined::DivisionByZero,
                    n if n < 0 => Undetermined::NegativeNetLaid,
                    _ => Undetermined::OutOfRange,
                };
                log::warn!(
                    "{} eggs claimed against net laid of {}; ratio undetermined",
                    claimed,
                    net_laid
                );
                ImbalanceStatus::Undetermined { reason }
            }
        }
    };

    ImbalanceReport {
        claimed,
        net_laid,
        ratio,
        status,
    }
}

/// Lower bound (exclusive) of the ratio window read as a dozen/egg mix-up
pub const UNIT_MISMATCH_LOW: Decimal = dec!(10);
/// Upper bound (exclusive) of the ratio window read as a dozen/egg mix-up
pub const UNIT_MISMATCH_HIGH: Decimal = dec!(14);

/// Most likely explanation for an imbalance
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "cause")]
pub enum RootCause {
    /// Income records repeated under the same date, amount, quantity and description
    DuplicateRecords { groups: usize },
    /// Heuristic: ratio close to 12 suggests quantities entered in the wrong unit.
    /// `suggested_divisor` is a recommendation, not a verified fix.
    UnitMismatch {
        ratio: Decimal,
        suggested_divisor: u64,
    },
    /// Imbalance present but not attributable to a known cause
    Unexplained { ratio: Option<Decimal> },
}

impl RootCause {
    /// True when the diagnosis rests on the ratio window rather than on evidence
    pub fn is_heuristic(&self) -> bool {
        matches!(self, RootCause::UnitMismatch { .. })
    }

    pub fn name(&self) -> &'static str {
        match self {
            RootCause::DuplicateRecords { .. } => "DuplicateRecords",
            RootCause::UnitMismatch { .. } => "UnitMismatch",
            RootCause::Unexplained { .. } => "Unexplained",
        }
    }
}

/// Classify an imbalance. Duplicates win over the ratio heuristic.
///
/// `ratio` of `None` means the ratio is undetermined. Returns `None` when there
/// is nothing to explain: no duplicates and a ratio of at most one.
pub fn classify_root_cause(ratio: Option<Decimal>, duplicates: &DuplicateGroups) -> Option<RootCause> {
    if !duplicates.is_empty() {
        return Some(RootCause::DuplicateRecords {
            groups: duplicates.len(),
        });
    }

    match ratio {
        Some(ratio) if ratio > UNIT_MISMATCH_LOW && ratio < UNIT_MISMATCH_HIGH => {
            Some(RootCause::UnitMismatch {
                ratio,
                suggested_divisor: EGGS_PER_DOZEN,
            })
        }
        Some(ratio) if ratio > Decimal::ONE => Some(RootCause::Unexplained { ratio: Some(ratio) }),
        Some(_) => None,
        None => Some(RootCause::Unexplained { ratio: None }),
    }
}
