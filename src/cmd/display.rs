use rust_decimal::prelude::FromPrimitive;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::fmt::Display;

/// Insert thousands separators into a run of ASCII digits
fn group_thousands(digits: &str) -> String {
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

/// Any integer with thousands separators
pub fn format_count(n: impl Display) -> String {
    let digits = n.to_string();
    match digits.strip_prefix('-') {
        Some(magnitude) => format!("-{}", group_thousands(magnitude)),
        None => group_thousands(&digits),
    }
}

pub fn format_money(amount: Decimal) -> String {
    let s = format!("{:.2}", amount.abs().round_dp(2));
    let (whole, cents) = s.split_once('.').unwrap_or((s.as_str(), "00"));
    let sign = if amount.is_sign_negative() && !amount.round_dp(2).is_zero() {
        "-"
    } else {
        ""
    };
    format!("{}${}.{}", sign, group_thousands(whole), cents)
}

pub fn format_ratio(ratio: Option<Decimal>) -> String {
    ratio.map_or("undetermined".to_string(), |r| format!("{:.2}x", r.round_dp(2)))
}

/// `part` as a percentage of `whole`, or N/A when `whole` is not positive
pub fn format_share(part: u128, whole: i128) -> String {
    if whole <= 0 {
        return "N/A".to_string();
    }
    let pct = Decimal::from_u128(part)
        .zip(Decimal::from_i128(whole))
        .and_then(|(part, whole)| part.checked_div(whole))
        .and_then(|share| share.checked_mul(dec!(100)));
    match pct {
        Some(pct) => format!("{:.1}%", pct.round_dp(1)),
        None => "N/A".to_string(),
    }
}

pub fn short_fingerprint(fingerprint: &str) -> &str {
    &fingerprint[..fingerprint.len().min(12)]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counts_grouped() {
        assert_eq!(format_count(0), "0");
        assert_eq!(format_count(999), "999");
        assert_eq!(format_count(7139), "7,139");
        assert_eq!(format_count(1234567), "1,234,567");
        assert_eq!(format_count(-1911), "-1,911");
        assert_eq!(format_count(u64::MAX), "18,446,744,073,709,551,615");
        assert_eq!(format_count(i128::MIN), "-170,141,183,460,469,231,731,687,303,715,884,105,728");
    }

    #[test]
    fn money_grouped_with_cents() {
        assert_eq!(format_money(dec!(0)), "$0.00");
        assert_eq!(format_money(dec!(1234.5)), "$1,234.50");
        assert_eq!(format_money(dec!(-620.333)), "-$620.33");
        assert_eq!(format_money(dec!(-0.001)), "$0.00");
    }

    #[test]
    fn ratio_and_share() {
        assert_eq!(format_ratio(Some(dec!(1.2696))), "1.27x");
        assert_eq!(format_ratio(None), "undetermined");
        assert_eq!(format_share(600, 7139), "8.4%");
        assert_eq!(format_share(1, 0), "N/A");
        assert_eq!(format_share(u128::MAX, 1), "N/A");
    }
}
