use super::records::RecordSet;
use super::EGGS_PER_DOZEN;
use rust_decimal::prelude::FromPrimitive;
use rust_decimal::Decimal;
use serde::Serialize;

/// Aggregate totals over a record set.
///
/// Egg counts are summed as `u128` so no number of `u64` records can overflow them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Ledger {
    pub laid: u128,
    pub broken: u128,
    /// Quantity on egg income records with `amount > 0`
    pub sold_quantity: u128,
    /// Quantity on egg income records with `amount == 0`
    pub donated_quantity: u128,
    pub sold_records: usize,
    pub donated_records: usize,
    /// Cash from egg sales only
    pub egg_sales: Decimal,
    /// Cash across every income record
    pub cash_income: Decimal,
    pub expenses: Decimal,
}

impl Ledger {
    /// Eggs laid minus eggs broken; the ceiling for sold + donated
    pub fn net_laid(&self) -> i128 {
        to_signed(self.laid).saturating_sub(to_signed(self.broken))
    }

    /// Eggs the income records claim went out the door
    pub fn claimed(&self) -> u128 {
        self.sold_quantity.saturating_add(self.donated_quantity)
    }

    /// Eggs neither sold, donated, broken nor on hand. Negative means the
    /// records claim more eggs than were laid.
    pub fn consumed(&self, eggs_on_hand: u64) -> i128 {
        self.net_laid()
            .saturating_sub(to_signed(self.claimed()))
            .saturating_sub(i128::from(eggs_on_hand))
    }

    /// Claimed quantity if every income quantity were actually dozens
    pub fn claimed_if_dozens(&self) -> Option<u128> {
        self.claimed().checked_mul(u128::from(EGGS_PER_DOZEN))
    }

    /// Claimed quantity divided down to dozens
    pub fn claimed_as_dozens(&self) -> Option<Decimal> {
        Decimal::from_u128(self.claimed())?.checked_div(Decimal::from(EGGS_PER_DOZEN))
    }
}

/// Egg count as a signed value, saturating at `i128::MAX`
pub fn to_signed(count: u128) -> i128 {
    i128::try_from(count).unwrap_or(i128::MAX)
}

/// Sum production, split egg income into sold and donated, and total cash flows.
///
/// Missing `quantity` counts as zero. Income outside the `eggs` category
/// contributes to `cash_income` but not to any quantity.
pub fn compute_totals(records: &RecordSet) -> Ledger {
    let mut ledger = Ledger::default();

    for record in &records.production {
        ledger.laid += u128::from(record.laid);
        ledger.broken += u128::from(record.broken);
    }

    for record in &records.income {
        ledger.cash_income += record.amount;
        if !record.is_eggs() {
            continue;
        }
        let quantity = u128::from(record.quantity_or_zero());
        if record.is_donation() {
            ledger.donated_quantity += quantity;
            ledger.donated_records += 1;
        } else {
            ledger.sold_quantity += quantity;
            ledger.sold_records += 1;
            ledger.egg_sales += record.amount;
        }
    }

    ledger.expenses = records.expenses.iter().map(|e| e.amount).sum();

    log::debug!(
        "Totals: laid={} broken={} sold={} donated={} cash={} expenses={}",
        ledger.laid,
        ledger.broken,
        ledger.sold_quantity,
        ledger.donated_quantity,
        ledger.cash_income,
        ledger.expenses
    );

    ledger
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::records::{Category, ExpenseRecord, IncomeRecord, ProductionRecord};
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;

    fn day(n: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 3, n).unwrap()
    }

    fn produced(n: u32, laid: u64, broken: u64) -> ProductionRecord {
        ProductionRecord {
            date: day(n),
            laid,
            broken,
        }
    }

    fn income(id: &str, category: Category, amount: Decimal, quantity: Option<u64>) -> IncomeRecord {
        IncomeRecord {
            id: id.to_string(),
            date: day(1),
            category,
            amount,
            quantity,
            description: None,
        }
    }

    fn records() -> RecordSet {
        RecordSet {
            production: vec![produced(1, 12, 1), produced(2, 10, 0), produced(3, 0, 0)],
            income: vec![
                income("s1", Category::Eggs, dec!(5), Some(12)),
                income("s2", Category::Eggs, dec!(2.50), Some(6)),
                income("d1", Category::Eggs, dec!(0), Some(3)),
                income("d2", Category::Eggs, dec!(0), None),
                income("m1", Category::Meat, dec!(15), Some(1)),
            ],
            expenses: vec![
                ExpenseRecord {
                    date: day(1),
                    amount: dec!(20),
                },
                ExpenseRecord {
                    date: day(2),
                    amount: dec!(7.25),
                },
            ],
        }
    }

    #[test]
    fn totals_for_mixed_records() {
        let ledger = compute_totals(&records());
        assert_eq!(ledger.laid, 22);
        assert_eq!(ledger.broken, 1);
        assert_eq!(ledger.net_laid(), 21);
        assert_eq!(ledger.sold_quantity, 18);
        assert_eq!(ledger.donated_quantity, 3);
        assert_eq!(ledger.sold_records, 2);
        assert_eq!(ledger.donated_records, 2);
        assert_eq!(ledger.egg_sales, dec!(7.50));
        assert_eq!(ledger.cash_income, dec!(22.50));
        assert_eq!(ledger.expenses, dec!(27.25));
    }

    #[test]
    fn totals_invariant_under_reordering() {
        let mut reversed = records();
        reversed.production.reverse();
        reversed.income.reverse();
        reversed.expenses.reverse();

        let mut rotated = records();
        rotated.production.rotate_left(1);
        rotated.income.rotate_left(2);

        let expected = compute_totals(&records());
        assert_eq!(compute_totals(&reversed), expected);
        assert_eq!(compute_totals(&rotated), expected);
    }

    #[test]
    fn sold_and_donated_partition_egg_quantity() {
        let records = records();
        let ledger = compute_totals(&records);
        let egg_quantity: u128 = records
            .egg_income()
            .map(|r| u128::from(r.quantity_or_zero()))
            .sum();
        assert_eq!(ledger.sold_quantity + ledger.donated_quantity, egg_quantity);
        assert_eq!(
            ledger.sold_records + ledger.donated_records,
            records.egg_income().count()
        );
    }

    #[test]
    fn empty_record_set_is_all_zero() {
        let ledger = compute_totals(&RecordSet::default());
        assert_eq!(ledger, Ledger::default());
        assert_eq!(ledger.net_laid(), 0);
    }

    #[test]
    fn net_laid_may_go_negative() {
        let records = RecordSet {
            production: vec![produced(1, 2, 5)],
            ..Default::default()
        };
        assert_eq!(compute_totals(&records).net_laid(), -3);
    }

    #[test]
    fn unit_hypotheses() {
        let ledger = Ledger {
            sold_quantity: 600,
            donated_quantity: 0,
            ..Default::default()
        };
        assert_eq!(ledger.claimed_if_dozens(), Some(7200));
        assert_eq!(ledger.claimed_as_dozens(), Some(dec!(50)));
    }

    #[test]
    fn quantities_near_u64_max_do_not_overflow() {
        let records = RecordSet {
            production: vec![produced(1, u64::MAX, 0), produced(2, u64::MAX, u64::MAX)],
            income: vec![
                income("s1", Category::Eggs, dec!(1), Some(u64::MAX)),
                income("s2", Category::Eggs, dec!(1), Some(u64::MAX - 1)),
                income("d1", Category::Eggs, dec!(0), Some(u64::MAX)),
            ],
            expenses: vec![],
        };

        let ledger = compute_totals(&records);
        let max = u128::from(u64::MAX);
        assert_eq!(ledger.laid, 2 * max);
        assert_eq!(ledger.broken, max);
        assert_eq!(ledger.net_laid(), max as i128);
        assert_eq!(ledger.sold_quantity, 2 * max - 1);
        assert_eq!(ledger.claimed(), 3 * max - 1);
        assert_eq!(ledger.claimed_if_dozens(), Some(12 * (3 * max - 1)));
        assert!(ledger.claimed_as_dozens().is_some());
    }

    #[test]
    fn extreme_direct_totals_saturate() {
        let ledger = Ledger {
            laid: u128::MAX,
            sold_quantity: u128::MAX,
            donated_quantity: 1,
            ..Default::default()
        };
        assert_eq!(ledger.net_laid(), i128::MAX);
        assert_eq!(ledger.claimed(), u128::MAX);
        assert_eq!(ledger.claimed_if_dozens(), None);
        assert_eq!(ledger.claimed_as_dozens(), None);
    }
}
