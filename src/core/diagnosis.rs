//! Full reconciliation pass over one backup snapshot.

use super::diagnostics::Diagnostic;
use super::duplicates::{find_duplicates, DuplicateGroups};
use super::imbalance::{classify_root_cause, detect_imbalance, ImbalanceReport, ImbalanceStatus, RootCause, Undetermined};
use super::ledger::{compute_totals, Ledger};
use super::pricing::{analyze_prices, PriceAnalysis};
use super::records::RecordSet;
use super::roi::{compute_roi, RoiResult};
use super::timeline::{analyze_timeline, Timeline};
use rust_decimal::Decimal;

#[derive(Debug, Clone)]
pub struct Diagnosis {
    pub ledger: Ledger,
    pub imbalance: ImbalanceReport,
    pub duplicates: DuplicateGroups,
    /// Only classified when the records are imbalanced
    pub root_cause: Option<RootCause>,
    /// `None` when the figures exceed decimal range
    pub roi: Option<RoiResult>,
    pub timeline: Timeline,
    pub prices: Option<PriceAnalysis>,
    pub diagnostics: Vec<Diagnostic>,
}

pub fn diagnose(records: &RecordSet, eggs_on_hand: u64, price_per_dozen: Decimal) -> Diagnosis {
    let ledger = compute_totals(records);
    let imbalance = detect_imbalance(&ledger);
    let duplicates = find_duplicates(&records.income);
    let root_cause = if imbalance.is_imbalanced() {
        classify_root_cause(imbalance.ratio, &duplicates)
    } else {
        None
    };
    let roi = compute_roi(&ledger, eggs_on_hand, price_per_dozen);
    let timeline = analyze_timeline(records);
    let prices = analyze_prices(&records.income);

    let mut diagnostics = Vec::new();
    if let ImbalanceStatus::Undetermined { reason } = imbalance.status {
        diagnostics.push(match reason {
            Undetermined::DivisionByZero => Diagnostic::DivisionByZero {
                claimed: imbalance.claimed,
            },
            Undetermined::NegativeNetLaid => Diagnostic::NegativeNetLaid {
                net_laid: imbalance.net_laid,
            },
            Undetermined::OutOfRange => Diagnostic::RatioOutOfRange {
                claimed: imbalance.claimed,
                net_laid: imbalance.net_laid,
            },
        });
    }
    if roi.is_none() {
        diagnostics.push(Diagnostic::RoiOutOfRange);
    }
    if ledger.expenses <= Decimal::ZERO {
        diagnostics.push(Diagnostic::ExpensesAbsent);
    }
    let consumed = ledger.consumed(eggs_on_hand);
    if consumed < 0 {
        diagnostics.push(Diagnostic::NegativeConsumption { consumed });
    }
    if timeline.income_precedes_production() {
        if let (Some(income), Some(production)) = (timeline.egg_income, timeline.production) {
            diagnostics.push(Diagnostic::IncomeBeforeProduction {
                first_income: income.first,
                first_production: production.first,
            });
        }
    }
    if let Some(analysis) = prices.as_ref().filter(|p| p.suspiciously_low()) {
        diagnostics.push(Diagnostic::LowPricePerDozen {
            average: analysis.average,
        });
    }

    Diagnosis {
        ledger,
        imbalance,
        duplicates,
        root_cause,
        roi,
        timeline,
        prices,
        diagnostics,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::records::{Category, ExpenseRecord, IncomeRecord, ProductionRecord};
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn produced(d: &str, laid: u64, broken: u64) -> ProductionRecord {
        ProductionRecord {
            date: date(d),
            laid,
            broken,
        }
    }

    fn eggs(id: &str, d: &str, amount: Decimal, quantity: u64, desc: &str) -> IncomeRecord {
        IncomeRecord {
            id: id.to_string(),
            date: date(d),
            category: Category::Eggs,
            amount,
            quantity: Some(quantity),
            description: Some(desc.to_string()),
        }
    }

    fn expense(amount: Decimal) -> ExpenseRecord {
        ExpenseRecord {
            date: date("2025-01-01"),
            amount,
        }
    }

    #[test]
    fn duplicates_explain_modest_excess() {
        // Two identical sales plus distinct sales: 1000 + 1000 + 3500 + 3500 = 9000
        let records = RecordSet {
            production: vec![produced("2025-01-01", 7000, 50), produced("2025-06-01", 139, 0)],
            income: vec![
                eggs("dup-1", "2025-03-01", dec!(300), 1000, "Farmers market"),
                eggs("dup-2", "2025-03-01", dec!(300), 1000, "Farmers market"),
                eggs("s1", "2025-04-01", dec!(1000), 3500, "Shop"),
                eggs("s2", "2025-05-01", dec!(1000), 3500, "Cafe"),
            ],
            expenses: vec![expense(dec!(500))],
        };

        let diagnosis = diagnose(&records, 0, dec!(4));
        assert_eq!(diagnosis.ledger.laid, 7139);
        assert_eq!(diagnosis.ledger.sold_quantity, 9000);
        assert_eq!(diagnosis.imbalance.claimed, 9000);
        assert_eq!(diagnosis.imbalance.net_laid, 7089);
        assert!(diagnosis.imbalance.is_imbalanced());
        assert_eq!(diagnosis.imbalance.ratio.unwrap().round_dp(2), dec!(1.27));

        assert_eq!(diagnosis.duplicates.len(), 1);
        let ids = diagnosis.duplicates.values().next().unwrap();
        assert!(ids.len() >= 2);
        assert_eq!(
            diagnosis.root_cause,
            Some(RootCause::DuplicateRecords { groups: 1 })
        );
        assert!(diagnosis
            .diagnostics
            .contains(&Diagnostic::NegativeConsumption { consumed: -1911 }));
    }

    #[test]
    fn dozens_within_laid_are_not_flagged() {
        let records = RecordSet {
            production: vec![produced("2025-01-01", 7139, 0)],
            income: vec![
                eggs("a", "2025-02-01", dec!(1200), 300, "Shop"),
                eggs("b", "2025-03-01", dec!(1200), 300, "Cafe"),
            ],
            expenses: vec![expense(dec!(100))],
        };

        let diagnosis = diagnose(&records, 0, dec!(4));
        assert_eq!(diagnosis.ledger.claimed(), 600);
        assert!(!diagnosis.imbalance.is_imbalanced());
        assert!(diagnosis.imbalance.ratio.unwrap() < Decimal::ONE);
        assert_eq!(diagnosis.root_cause, None);
    }

    #[test]
    fn ratio_of_exactly_ten_is_unexplained() {
        let records = RecordSet {
            production: vec![produced("2025-01-01", 1200, 0)],
            income: vec![
                eggs("a", "2025-02-01", dec!(50), 6000, "Shop"),
                eggs("b", "2025-03-01", dec!(50), 6000, "Cafe"),
            ],
            expenses: vec![expense(dec!(100))],
        };

        let diagnosis = diagnose(&records, 0, dec!(4));
        assert_eq!(diagnosis.imbalance.ratio, Some(dec!(10)));
        assert_eq!(
            diagnosis.root_cause,
            Some(RootCause::Unexplained {
                ratio: Some(dec!(10))
            })
        );
    }

    #[test]
    fn twelvefold_inflation_is_unit_mismatch() {
        let records = RecordSet {
            production: vec![produced("2025-01-01", 1000, 0)],
            income: vec![
                eggs("a", "2025-02-01", dec!(40), 6000, "Shop"),
                eggs("b", "2025-03-01", dec!(40), 6000, "Cafe"),
            ],
            expenses: vec![expense(dec!(100))],
        };

        let diagnosis = diagnose(&records, 0, dec!(4));
        let cause = diagnosis.root_cause.unwrap();
        assert!(cause.is_heuristic());
        assert_eq!(cause.name(), "UnitMismatch");
        assert!(diagnosis
            .diagnostics
            .iter()
            .any(|d| matches!(d, Diagnostic::LowPricePerDozen { .. })));
    }

    #[test]
    fn degenerate_inputs_reported_not_raised() {
        let records = RecordSet {
            production: vec![],
            income: vec![eggs("a", "2025-02-01", dec!(4), 12, "Shop")],
            expenses: vec![],
        };

        let diagnosis = diagnose(&records, 0, dec!(4));
        assert_eq!(diagnosis.imbalance.ratio, None);
        assert_eq!(
            diagnosis.root_cause,
            Some(RootCause::Unexplained { ratio: None })
        );
        assert!(diagnosis
            .diagnostics
            .contains(&Diagnostic::DivisionByZero { claimed: 12 }));
        assert!(diagnosis.diagnostics.contains(&Diagnostic::ExpensesAbsent));
        assert_eq!(diagnosis.roi.unwrap().roi_pct, Decimal::ZERO);
    }

    #[test]
    fn early_income_reported() {
        let records = RecordSet {
            production: vec![produced("2025-03-01", 100, 0)],
            income: vec![eggs("a", "2025-02-01", dec!(4), 12, "Shop")],
            expenses: vec![expense(dec!(10))],
        };

        let diagnosis = diagnose(&records, 0, dec!(4));
        assert!(diagnosis.diagnostics.contains(&Diagnostic::IncomeBeforeProduction {
            first_income: date("2025-02-01"),
            first_production: date("2025-03-01"),
        }));
    }

    #[test]
    fn quantities_near_u64_max_reported_not_raised() {
        let records = RecordSet {
            production: vec![produced("2025-01-01", 10, 0)],
            income: vec![
                eggs("a", "2025-02-01", dec!(4), u64::MAX, "Shop"),
                eggs("b", "2025-03-01", dec!(4), u64::MAX, "Cafe"),
            ],
            expenses: vec![expense(dec!(10))],
        };

        let diagnosis = diagnose(&records, 0, dec!(4));
        assert!(diagnosis.imbalance.is_imbalanced());
        assert_eq!(diagnosis.imbalance.claimed, 2 * u128::from(u64::MAX));
        assert!(diagnosis.roi.is_some());
        assert!(diagnosis
            .diagnostics
            .iter()
            .any(|d| matches!(d, Diagnostic::NegativeConsumption { .. })));
    }
}
