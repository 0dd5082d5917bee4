use super::records::IncomeRecord;
use super::EGGS_PER_DOZEN;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::Serialize;

/// Average price per dozen below which quantities are probably inflated
pub const LOW_PRICE_PER_DOZEN: Decimal = dec!(0.50);

/// Implied price per dozen across egg sales
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PriceAnalysis {
    /// Sales with a non-zero quantity that fed the figures below
    pub sampled: usize,
    pub average: Decimal,
    pub min: Decimal,
    pub max: Decimal,
}

impl PriceAnalysis {
    /// Typical prices are a few units of currency per dozen; a fraction of one
    /// suggests quantities were recorded in eggs where dozens were meant.
    pub fn suspiciously_low(&self) -> bool {
        self.average < LOW_PRICE_PER_DOZEN
    }
}

/// `amount / (quantity / 12)` for one sale, if it has a quantity
pub fn price_per_dozen(record: &IncomeRecord) -> Option<Decimal> {
    match record.quantity {
        Some(quantity) if quantity > 0 => {
            Some(record.amount * Decimal::from(EGGS_PER_DOZEN) / Decimal::from(quantity))
        }
        _ => None,
    }
}

/// Price statistics over egg sales. `None` when no sale carries a quantity.
pub fn analyze_prices<'a>(records: impl IntoIterator<Item = &'a IncomeRecord>) -> Option<PriceAnalysis> {
    let prices: Vec<Decimal> = records
        .into_iter()
        .filter(|r| r.is_eggs() && !r.is_donation())
        .filter_map(price_per_dozen)
        .collect();

    let min = prices.iter().copied().min()?;
    let max = prices.iter().copied().max()?;
    let average = prices.iter().sum::<Decimal>() / Decimal::from(prices.len());

    Some(PriceAnalysis {
        sampled: prices.len(),
        average,
        min,
        max,
    })
}
