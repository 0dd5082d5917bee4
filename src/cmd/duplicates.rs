//! Duplicates command - income records identical in date, amount, quantity and description

use crate::cmd::display::{format_count, format_money, short_fingerprint};
use crate::cmd::read_backup;
use crate::core::{find_duplicates, surplus_quantity, DuplicateGroups};
use clap::Args;
use rust_decimal::Decimal;
use serde::Serialize;
use std::io;
use std::path::PathBuf;
use tabled::{
    settings::{object::Columns, Alignment, Modify, Style},
    Table, Tabled,
};

#[derive(Args, Debug)]
pub struct DuplicatesCommand {
    /// Backup file (JSON). Reads from stdin with "-".
    file: PathBuf,

    /// Output as CSV instead of formatted table
    #[arg(long)]
    csv: bool,
}

/// One duplicate group, flattened for tables, CSV and JSON
#[derive(Debug, Clone, Tabled, Serialize)]
pub struct DuplicateRow {
    #[tabled(rename = "Date")]
    pub date: String,
    #[tabled(rename = "Amount")]
    pub amount: String,
    #[tabled(rename = "Quantity")]
    pub quantity: u64,
    #[tabled(rename = "Description")]
    pub description: String,
    #[tabled(rename = "Copies")]
    pub copies: usize,
    #[tabled(rename = "Ids")]
    pub ids: String,
}

pub fn duplicate_rows(groups: &DuplicateGroups) -> Vec<DuplicateRow> {
    groups
        .iter()
        .map(|(key, ids)| DuplicateRow {
            date: key.date.format("%Y-%m-%d").to_string(),
            amount: format!("{:.2}", key.amount.round_dp(2)),
            quantity: key.quantity,
            description: key.description.clone(),
            copies: ids.len(),
            ids: ids.join(" "),
        })
        .collect()
}

pub fn duplicate_table(rows: &[DuplicateRow]) -> String {
    Table::new(rows)
        .with(Style::rounded())
        .with(Modify::new(Columns::new(1..3)).with(Alignment::right()))
        .to_string()
}

impl DuplicatesCommand {
    pub fn exec(&self) -> anyhow::Result<()> {
        let backup = read_backup(&self.file)?;
        let groups = find_duplicates(&backup.records.income);
        let rows = duplicate_rows(&groups);

        if self.csv {
            return self.write_csv(&rows);
        }

        println!();
        println!(
            "DUPLICATE INCOME RECORDS ({} records, sha256 {})",
            backup.records.income.len(),
            short_fingerprint(&backup.fingerprint)
        );
        println!();

        if rows.is_empty() {
            println!("\u{2713} No exact duplicates found.");
            return Ok(());
        }

        let copies: usize = groups.values().map(Vec::len).sum();
        let surplus_cash: Decimal = groups
            .iter()
            .map(|(key, ids)| key.amount * Decimal::from(ids.len() - 1))
            .sum();
        println!(
            "\u{26A0} {} set(s) of duplicates covering {} records",
            groups.len(),
            copies
        );
        println!(
            "  Surplus if collapsed: {} eggs, {}",
            format_count(surplus_quantity(&groups)),
            format_money(surplus_cash)
        );
        println!();
        println!("{}", duplicate_table(&rows));
        Ok(())
    }

    fn write_csv(&self, rows: &[DuplicateRow]) -> anyhow::Result<()> {
        let mut wtr = csv::Writer::from_writer(io::stdout());
        for row in rows {
            wtr.serialize(row)?;
        }
        wtr.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::DuplicateKey;
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;

    #[test]
    fn rows_flatten_groups() {
        let key = DuplicateKey {
            date: NaiveDate::from_ymd_opt(2025, 8, 9).unwrap(),
            amount: dec!(4.5),
            quantity: 12,
            description: "Market".to_string(),
        };
        let groups = DuplicateGroups::from([(key, vec!["a".to_string(), "b".to_string()])]);

        let rows = duplicate_rows(&groups);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].date, "2025-08-09");
        assert_eq!(rows[0].amount, "4.50");
        assert_eq!(rows[0].copies, 2);
        assert_eq!(rows[0].ids, "a b");
        assert!(duplicate_table(&rows).contains("Market"));
    }
}
