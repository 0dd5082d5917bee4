use super::records::{IncomeRecord, RecordSet};
use chrono::NaiveDate;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DateRange {
    pub first: NaiveDate,
    pub last: NaiveDate,
    pub records: usize,
}

impl DateRange {
    fn from_dates(dates: impl IntoIterator<Item = NaiveDate>) -> Option<Self> {
        dates.into_iter().fold(None, |range, date| {
            Some(match range {
                None => DateRange {
                    first: date,
                    last: date,
                    records: 1,
                },
                Some(r) => DateRange {
                    first: r.first.min(date),
                    last: r.last.max(date),
                    records: r.records + 1,
                },
            })
        })
    }
}

/// When production and egg income were recorded
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Timeline {
    pub production: Option<DateRange>,
    pub egg_income: Option<DateRange>,
}

impl Timeline {
    /// Egg income recorded before the first production record. Sales with no
    /// matching production window inflate the claimed total.
    pub fn income_precedes_production(&self) -> bool {
        match (self.production, self.egg_income) {
            (Some(production), Some(income)) => income.first < production.first,
            _ => false,
        }
    }
}

pub fn analyze_timeline(records: &RecordSet) -> Timeline {
    Timeline {
        production: DateRange::from_dates(records.production.iter().map(|r| r.date)),
        egg_income: DateRange::from_dates(records.egg_income().map(|r| r.date)),
    }
}

/// Egg income sorted by date; records on the same day keep document order
pub fn egg_income_chronological(records: &RecordSet) -> Vec<&IncomeRecord> {
    let mut income: Vec<_> = records.egg_income().collect();
    income.sort_by_key(|r| r.date);
    income
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::records::{Category, ProductionRecord};
    use rust_decimal_macros::dec;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn produced(d: &str) -> ProductionRecord {
        ProductionRecord {
            date: date(d),
            laid: 6,
            broken: 0,
        }
    }

    fn sale(id: &str, d: &str, category: Category) -> IncomeRecord {
        IncomeRecord {
            id: id.to_string(),
            date: date(d),
            category,
            amount: dec!(4),
            quantity: Some(12),
            description: None,
        }
    }

    #[test]
    fn ranges_cover_all_dates() {
        let records = RecordSet {
            production: vec![produced("2025-03-05"), produced("2025-01-10"), produced("2025-02-01")],
            income: vec![
                sale("a", "2025-02-14", Category::Eggs),
                sale("b", "2025-01-20", Category::Eggs),
                sale("m", "2024-12-01", Category::Meat),
            ],
            expenses: vec![],
        };

        let timeline = analyze_timeline(&records);
        let production = timeline.production.unwrap();
        assert_eq!(production.first, date("2025-01-10"));
        assert_eq!(production.last, date("2025-03-05"));
        assert_eq!(production.records, 3);

        let income = timeline.egg_income.unwrap();
        assert_eq!(income.first, date("2025-01-20"));
        assert_eq!(income.records, 2);
        assert!(!timeline.income_precedes_production());
    }

    #[test]
    fn income_before_production_flagged() {
        let records = RecordSet {
            production: vec![produced("2025-03-01")],
            income: vec![sale("a", "2025-02-28", Category::Eggs)],
            expenses: vec![],
        };
        assert!(analyze_timeline(&records).income_precedes_production());
    }

    #[test]
    fn empty_collections_have_no_range() {
        let timeline = analyze_timeline(&RecordSet::default());
        assert_eq!(timeline.production, None);
        assert_eq!(timeline.egg_income, None);
        assert!(!timeline.income_precedes_production());
    }

    #[test]
    fn chronological_listing_is_stable() {
        let records = RecordSet {
            income: vec![
                sale("late", "2025-05-01", Category::Eggs),
                sale("first", "2025-04-01", Category::Eggs),
                sale("second", "2025-04-01", Category::Eggs),
                sale("meat", "2025-01-01", Category::Meat),
            ],
            ..Default::default()
        };
        let ids: Vec<_> = egg_income_chronological(&records)
            .iter()
            .map(|r| r.id.as_str())
            .collect();
        assert_eq!(ids, vec!["first", "second", "late"]);
    }
}
