use super::records::IncomeRecord;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::BTreeMap;

/// Business identity of an income record.
///
/// Missing quantity and description compare as `0` and `""`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct DuplicateKey {
    pub date: NaiveDate,
    pub amount: Decimal,
    pub quantity: u64,
    pub description: String,
}

impl From<&IncomeRecord> for DuplicateKey {
    fn from(record: &IncomeRecord) -> Self {
        DuplicateKey {
            date: record.date,
            amount: record.amount.normalize(),
            quantity: record.quantity_or_zero(),
            description: record.description.clone().unwrap_or_default(),
        }
    }
}

/// Duplicate groups keyed by business identity, ids in document order
pub type DuplicateGroups = BTreeMap<DuplicateKey, Vec<String>>;

/// Group income records that share date, amount, quantity and description.
///
/// Exact matches only. Groups of one are dropped.
pub fn find_duplicates(records: &[IncomeRecord]) -> DuplicateGroups {
    let mut seen: DuplicateGroups = BTreeMap::new();
    for record in records {
        seen.entry(DuplicateKey::from(record))
            .or_default()
            .push(record.id.clone());
    }
    seen.retain(|_, ids| ids.len() > 1);

    for (key, ids) in &seen {
        log::debug!("Duplicate {} x{}: {:?}", key.date, ids.len(), ids);
    }
    seen
}

/// Quantity that would disappear if each group were collapsed to one record
pub fn surplus_quantity(groups: &DuplicateGroups) -> u128 {
    groups
        .iter()
        .map(|(key, ids)| u128::from(key.quantity) * (ids.len() as u128 - 1))
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::records::Category;
    use rust_decimal_macros::dec;

    fn record(id: &str, date: &str, amount: Decimal, quantity: Option<u64>, desc: Option<&str>) -> IncomeRecord {
        IncomeRecord {
            id: id.to_string(),
            date: NaiveDate::parse_from_str(date, "%Y-%m-%d").unwrap(),
            category: Category::Eggs,
            amount,
            quantity,
            description: desc.map(str::to_string),
        }
    }

    #[test]
    fn distinct_records_have_no_duplicates() {
        let records = vec![
            record("a", "2025-01-01", dec!(4), Some(12), Some("Sam")),
            record("b", "2025-01-02", dec!(4), Some(12), Some("Sam")),
            record("c", "2025-01-01", dec!(5), Some(12), Some("Sam")),
            record("d", "2025-01-01", dec!(4), Some(24), Some("Sam")),
        ];
        assert!(find_duplicates(&records).is_empty());
    }

    #[test]
    fn identical_pair_forms_one_group() {
        let mut records = vec![
            record("a", "2025-01-01", dec!(4), Some(12), Some("Sam")),
            record("b", "2025-01-02", dec!(8), Some(24), Some("Alex")),
        ];
        records.push(record("a2", "2025-01-01", dec!(4), Some(12), Some("Sam")));

        let groups = find_duplicates(&records);
        assert_eq!(groups.len(), 1);
        let (key, ids) = groups.iter().next().unwrap();
        assert_eq!(key.quantity, 12);
        assert_eq!(ids, &vec!["a".to_string(), "a2".to_string()]);
    }

    #[test]
    fn near_duplicates_not_flagged() {
        let records = vec![
            record("a", "2025-01-01", dec!(4), Some(12), Some("Sam")),
            record("b", "2025-01-01", dec!(4), Some(12), Some("Sam ")),
            record("c", "2025-01-01", dec!(4), Some(12), Some("sam")),
        ];
        assert!(find_duplicates(&records).is_empty());
    }

    #[test]
    fn missing_fields_match_defaults() {
        let records = vec![
            record("a", "2025-01-01", dec!(0), None, None),
            record("b", "2025-01-01", dec!(0), Some(0), Some("")),
        ];
        let groups = find_duplicates(&records);
        assert_eq!(groups.len(), 1);
    }

    #[test]
    fn amount_scale_does_not_split_groups() {
        let records = vec![
            record("a", "2025-01-01", dec!(4), Some(12), None),
            record("b", "2025-01-01", dec!(4.00), Some(12), None),
        ];
        assert_eq!(find_duplicates(&records).len(), 1);
    }

    #[test]
    fn surplus_counts_extra_copies() {
        let records = vec![
            record("a", "2025-01-01", dec!(4), Some(12), None),
            record("b", "2025-01-01", dec!(4), Some(12), None),
            record("c", "2025-01-01", dec!(4), Some(12), None),
            record("d", "2025-01-02", dec!(0), Some(6), None),
            record("e", "2025-01-02", dec!(0), Some(6), None),
        ];
        let groups = find_duplicates(&records);
        assert_eq!(groups.len(), 2);
        assert_eq!(surplus_quantity(&groups), 30);
    }

    #[test]
    fn surplus_of_huge_copies_does_not_overflow() {
        let records = vec![
            record("a", "2025-01-01", dec!(4), Some(u64::MAX), None),
            record("b", "2025-01-01", dec!(4), Some(u64::MAX), None),
            record("c", "2025-01-01", dec!(4), Some(u64::MAX), None),
        ];
        let groups = find_duplicates(&records);
        assert_eq!(surplus_quantity(&groups), 2 * u128::from(u64::MAX));
    }
}
