//! Unit conversion applied to egg income quantities.
//!
//! Applying a divisor greater than one to data that has already been corrected
//! divides it again. Nothing here detects "already corrected" data; the fix is
//! meant to be run once against an original backup.

use super::records::IncomeRecord;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;
use std::path::PathBuf;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum CorrectionError {
    #[error("divisor must be at least 1")]
    ZeroDivisor,
    #[error("backup has no `data.income` array to correct")]
    MissingIncome,
    #[error("corrected income has {found} records, backup has {expected}")]
    RecordCountMismatch { expected: usize, found: usize },
    #[error("corrected income record {index} is {found}, backup has {expected}")]
    RecordMismatch {
        index: usize,
        expected: String,
        found: String,
    },
    #[error("an output path is required when reading from stdin")]
    OutputRequired,
    #[error("refusing to overwrite the original backup: {0}")]
    WouldOverwriteInput(PathBuf),
}

/// A single quantity rewrite
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QuantityChange {
    /// Position in `data.income`
    pub index: usize,
    pub id: String,
    pub date: NaiveDate,
    pub amount: Decimal,
    pub before: u64,
    pub after: u64,
}

/// Result of [`apply_unit_fix`]: the corrected copy plus what changed
#[derive(Debug, Clone)]
pub struct Correction {
    pub divisor: u64,
    pub records: Vec<IncomeRecord>,
    pub changes: Vec<QuantityChange>,
}

impl Correction {
    pub fn modified(&self) -> usize {
        self.changes.len()
    }
}

/// Divide the quantity of every egg income record by `divisor`, rounding down.
///
/// Records without a quantity, with a zero quantity, or outside the `eggs`
/// category are copied unchanged. The input slice is never modified.
pub fn apply_unit_fix(records: &[IncomeRecord], divisor: u64) -> Result<Correction, CorrectionError> {
    if divisor == 0 {
        return Err(CorrectionError::ZeroDivisor);
    }

    let mut changes = Vec::new();
    let corrected = records
        .iter()
        .enumerate()
        .map(|(index, record)| {
            let mut record = record.clone();
            match record.quantity {
                Some(before) if before > 0 && record.is_eggs() => {
                    let after = before / divisor;
                    log::debug!("{} {}: {} -> {}", record.date, record.id, before, after);
                    changes.push(QuantityChange {
                        index,
                        id: record.id.clone(),
                        date: record.date,
                        amount: record.amount,
                        before,
                        after,
                    });
                    record.quantity = Some(after);
                }
                _ => {}
            }
            record
        })
        .collect();

    log::info!("Divided {} egg income quantities by {}", changes.len(), divisor);

    Ok(Correction {
        divisor,
        records: corrected,
        changes,
    })
}
