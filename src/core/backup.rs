//! Backup document loading and the corrected-copy writer.
//!
//! The tracker exports a single JSON document with every collection under
//! `data`. Only `eggProduction`, `income` and `expenses` are read; the rest of
//! the document is carried through untouched so a corrected copy can be
//! imported back into the tracker.

use super::correction::CorrectionError;
use super::records::{Category, ExpenseRecord, IncomeRecord, ProductionRecord, RecordSet};
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use eggledger_derive::RecordSchema;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use schemars::JsonSchema;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use sha2::{Digest, Sha256};
use std::fmt;
use std::io::Read;
use std::path::{Path, PathBuf};

pub const PRODUCTION_COLLECTION: &str = "eggProduction";
pub const INCOME_COLLECTION: &str = "income";
pub const EXPENSE_COLLECTION: &str = "expenses";

/// Largest amount accepted on one record. Keeps every decimal total in range.
pub const MAX_AMOUNT: Decimal = dec!(1000000000000000);

/// Where an offending record sits in the document
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordLocation {
    pub collection: &'static str,
    pub index: usize,
    pub id: Option<String>,
}

impl fmt::Display for RecordLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "data.{}[{}]", self.collection, self.index)?;
        if let Some(id) = &self.id {
            write!(f, " (id {})", id)?;
        }
        Ok(())
    }
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum LoadError {
    #[error("failed to read backup: {0}")]
    Io(String),
    #[error("backup is not valid JSON: {0}")]
    Malformed(String),
    #[error("backup has no `data.{0}` array")]
    MissingCollection(&'static str),
    #[error("schema violation at {location}: {reason}")]
    SchemaViolation {
        location: RecordLocation,
        reason: String,
    },
}

/// Field description generated by `#[derive(RecordSchema)]`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SchemaField {
    pub name: &'static str,
    pub required: bool,
    pub description: &'static str,
}

/// Input root of a tracker backup
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct BackupInput {
    /// Exporter version, e.g. "1.0.0"
    #[serde(default)]
    pub version: Option<String>,
    /// When the backup was exported
    #[serde(default, rename = "exportDate")]
    pub export_date: Option<String>,
    pub data: BackupData,
}

/// Collections read from `data`; everything else is passed through
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct BackupData {
    #[serde(rename = "eggProduction")]
    pub egg_production: Vec<ProductionEntry>,
    pub income: Vec<IncomeEntry>,
    pub expenses: Vec<ExpenseEntry>,
}

/// `data.eggProduction[]` as exported
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, RecordSchema)]
pub struct ProductionEntry {
    /// Production date (YYYY-MM-DD or RFC3339)
    #[serde(deserialize_with = "deserialize_date")]
    #[schemars(with = "String")]
    pub date: NaiveDate,
    /// Eggs laid that day
    #[serde(default)]
    pub laid: Option<u64>,
    /// Legacy name for laid; read only when laid is absent
    #[serde(default)]
    pub count: Option<u64>,
    /// Eggs broken that day
    #[serde(default)]
    pub broken: Option<u64>,
}

/// `data.income[]` as exported
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, RecordSchema)]
pub struct IncomeEntry {
    /// Unique record identifier
    pub id: String,
    /// Sale or donation date (YYYY-MM-DD or RFC3339)
    #[serde(deserialize_with = "deserialize_date")]
    #[schemars(with = "String")]
    pub date: NaiveDate,
    /// Income category: eggs, meat, livestock, breeding, other
    #[serde(default, rename = "type")]
    pub kind: Option<String>,
    /// Same as type; takes precedence when both are present
    #[serde(default)]
    pub category: Option<String>,
    /// Cash received; 0 marks a donation
    #[schemars(with = "f64")]
    pub amount: Decimal,
    /// Number of eggs sold or donated
    #[serde(default)]
    pub quantity: Option<u64>,
    /// Free text entered with the sale
    #[serde(default)]
    pub description: Option<String>,
}

/// `data.expenses[]` as exported
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, RecordSchema)]
pub struct ExpenseEntry {
    /// Expense date (YYYY-MM-DD or RFC3339)
    #[serde(deserialize_with = "deserialize_date")]
    #[schemars(with = "String")]
    pub date: NaiveDate,
    /// Amount spent
    #[schemars(with = "f64")]
    pub amount: Decimal,
}

/// A loaded backup: the original document plus its normalized records
#[derive(Debug, Clone)]
pub struct Backup {
    document: Value,
    pub records: RecordSet,
    /// Hex SHA-256 of the raw input bytes
    pub fingerprint: String,
}

/// Read and normalize a backup document
pub fn read_backup<R: Read>(mut reader: R) -> Result<Backup, LoadError> {
    let mut bytes = Vec::new();
    reader
        .read_to_end(&mut bytes)
        .map_err(|err| LoadError::Io(err.to_string()))?;
    parse_backup(&bytes)
}

pub fn parse_backup(bytes: &[u8]) -> Result<Backup, LoadError> {
    let fingerprint = hex::encode(Sha256::digest(bytes));
    let document: Value =
        serde_json::from_slice(bytes).map_err(|err| LoadError::Malformed(err.to_string()))?;

    let production = load_collection(&document, PRODUCTION_COLLECTION, production_record)?;
    let income = load_collection(&document, INCOME_COLLECTION, income_record)?;
    let expenses = load_collection(&document, EXPENSE_COLLECTION, expense_record)?;

    log::info!(
        "Loaded {} production, {} income, {} expense records (sha256 {})",
        production.len(),
        income.len(),
        expenses.len(),
        &fingerprint[..12]
    );

    Ok(Backup {
        document,
        records: RecordSet {
            production,
            income,
            expenses,
        },
        fingerprint,
    })
}

impl Backup {
    /// Copy of the original document with only `data.income[].quantity` replaced.
    ///
    /// `income` must be the corrected counterpart of `self.records.income`:
    /// same length, same ids, same order.
    pub fn corrected_document(&self, income: &[IncomeRecord]) -> Result<Value, CorrectionError> {
        let mut document = self.document.clone();
        let entries = document
            .get_mut("data")
            .and_then(|data| data.get_mut(INCOME_COLLECTION))
            .and_then(Value::as_array_mut)
            .ok_or(CorrectionError::MissingIncome)?;

        if entries.len() != income.len() {
            return Err(CorrectionError::RecordCountMismatch {
                expected: entries.len(),
                found: income.len(),
            });
        }

        for (index, (entry, record)) in entries.iter_mut().zip(income).enumerate() {
            let entry_id = entry.get("id").and_then(Value::as_str).unwrap_or_default();
            if entry_id != record.id {
                return Err(CorrectionError::RecordMismatch {
                    index,
                    expected: entry_id.to_string(),
                    found: record.id.clone(),
                });
            }
            let (Some(quantity), Some(object)) = (record.quantity, entry.as_object_mut()) else {
                continue;
            };
            if let Some(existing) = object.get_mut("quantity") {
                if existing.as_u64() != Some(quantity) {
                    *existing = Value::from(quantity);
                }
            }
        }

        Ok(document)
    }
}

/// Resolve where the corrected document goes, never onto the input itself.
///
/// Without an explicit output the file lands next to the input as
/// `<stem>-CORRECTED.json`.
pub fn corrected_output_path(input: &Path, output: Option<&Path>) -> Result<PathBuf, CorrectionError> {
    let path = match output {
        Some(path) => path.to_path_buf(),
        None => {
            if input.as_os_str() == "-" {
                return Err(CorrectionError::OutputRequired);
            }
            let stem = input
                .file_stem()
                .map(|s| s.to_string_lossy().into_owned())
                .unwrap_or_else(|| "backup".to_string());
            input.with_file_name(format!("{}-CORRECTED.json", stem))
        }
    };

    if input.as_os_str() != "-" && same_file(input, &path) {
        return Err(CorrectionError::WouldOverwriteInput(path));
    }
    Ok(path)
}

fn same_file(a: &Path, b: &Path) -> bool {
    match (std::fs::canonicalize(a), std::fs::canonicalize(b)) {
        (Ok(a), Ok(b)) => a == b,
        _ => a == b,
    }
}

fn load_collection<E, T>(
    document: &Value,
    collection: &'static str,
    convert: fn(E, &RecordLocation) -> Result<T, String>,
) -> Result<Vec<T>, LoadError>
where
    E: for<'de> Deserialize<'de>,
{
    let entries = document
        .get("data")
        .and_then(|data| data.get(collection))
        .and_then(Value::as_array)
        .ok_or(LoadError::MissingCollection(collection))?;

    entries
        .iter()
        .enumerate()
        .map(|(index, value)| {
            let location = RecordLocation {
                collection,
                index,
                id: value.get("id").and_then(Value::as_str).map(str::to_string),
            };
            let entry = E::deserialize(value).map_err(|err| LoadError::SchemaViolation {
                location: location.clone(),
                reason: err.to_string(),
            })?;
            convert(entry, &location).map_err(|reason| LoadError::SchemaViolation { location, reason })
        })
        .collect()
}

fn production_record(entry: ProductionEntry, _: &RecordLocation) -> Result<ProductionRecord, String> {
    Ok(ProductionRecord {
        date: entry.date,
        laid: entry.laid.or(entry.count).unwrap_or(0),
        broken: entry.broken.unwrap_or(0),
    })
}

fn income_record(entry: IncomeEntry, location: &RecordLocation) -> Result<IncomeRecord, String> {
    let category = entry
        .category
        .or(entry.kind)
        .ok_or_else(|| "missing field `type`".to_string())?;
    let amount = non_negative(entry.amount)?;
    log::trace!("{} -> {} {} x{:?}", location, category, amount, entry.quantity);

    Ok(IncomeRecord {
        id: entry.id,
        date: entry.date,
        category: Category::parse(&category),
        amount,
        quantity: entry.quantity,
        description: entry.description,
    })
}

fn expense_record(entry: ExpenseEntry, _: &RecordLocation) -> Result<ExpenseRecord, String> {
    Ok(ExpenseRecord {
        date: entry.date,
        amount: non_negative(entry.amount)?,
    })
}

fn non_negative(amount: Decimal) -> Result<Decimal, String> {
    if amount.is_sign_negative() && !amount.is_zero() {
        Err(format!("amount must not be negative, got {}", amount))
    } else if amount > MAX_AMOUNT {
        Err(format!("amount exceeds {}, got {}", MAX_AMOUNT, amount))
    } else {
        Ok(amount)
    }
}

fn parse_date(s: &str) -> Result<NaiveDate, String> {
    if let Ok(date) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return Ok(date);
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt.date_naive());
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f") {
        return Ok(dt.date());
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S") {
        return Ok(dt.date());
    }
    Err(format!("invalid date: {}", s))
}

fn deserialize_date<'de, D>(deserializer: D) -> Result<NaiveDate, D::Error>
where
    D: Deserializer<'de>,
{
    let s: String = Deserialize::deserialize(deserializer)?;
    parse_date(&s).map_err(serde::de::Error::custom)
}
