use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Serialize, Serializer};
use std::fmt;

/// Income category as recorded by the tracker
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Category {
    Eggs,
    Meat,
    Livestock,
    Breeding,
    /// Anything else, including the tracker's own `other` value
    Other(String),
}

impl Category {
    /// Parse a category value. Matching is case-insensitive; unknown values are kept verbatim.
    pub fn parse(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "eggs" => Category::Eggs,
            "meat" => Category::Meat,
            "livestock" => Category::Livestock,
            "breeding" => Category::Breeding,
            _ => Category::Other(s.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Category::Eggs => "eggs",
            Category::Meat => "meat",
            Category::Livestock => "livestock",
            Category::Breeding => "breeding",
            Category::Other(s) => s,
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl Serialize for Category {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// One day of egg production
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProductionRecord {
    pub date: NaiveDate,
    pub laid: u64,
    pub broken: u64,
}

/// A sale or donation. `amount == 0` marks a donation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IncomeRecord {
    pub id: String,
    pub date: NaiveDate,
    pub category: Category,
    pub amount: Decimal,
    /// Unit-ambiguous: the tracker expects individual eggs, imports have carried dozens.
    pub quantity: Option<u64>,
    pub description: Option<String>,
}

impl IncomeRecord {
    pub fn is_eggs(&self) -> bool {
        self.category == Category::Eggs
    }

    pub fn is_donation(&self) -> bool {
        self.amount.is_zero()
    }

    pub fn quantity_or_zero(&self) -> u64 {
        self.quantity.unwrap_or(0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExpenseRecord {
    pub date: NaiveDate,
    pub amount: Decimal,
}

/// The three collections the engine works on, already normalized by the loader
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecordSet {
    pub production: Vec<ProductionRecord>,
    pub income: Vec<IncomeRecord>,
    pub expenses: Vec<ExpenseRecord>,
}

impl RecordSet {
    /// Income records in the `eggs` category, in document order
    pub fn egg_income(&self) -> impl Iterator<Item = &IncomeRecord> {
        self.income.iter().filter(|r| r.is_eggs())
    }
}
