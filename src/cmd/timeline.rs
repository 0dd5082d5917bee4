//! Timeline command - date ranges and a chronological view of egg income

use crate::cmd::display::{format_count, format_money, short_fingerprint};
use crate::cmd::read_backup;
use crate::cmd::report::print_timeline;
use crate::core::{compute_totals, egg_income_chronological, timeline::analyze_timeline, IncomeRecord};
use clap::Args;
use serde::Serialize;
use std::io;
use std::path::PathBuf;
use tabled::{
    settings::{object::Columns, Alignment, Modify, Style},
    Table, Tabled,
};

#[derive(Args, Debug)]
pub struct TimelineCommand {
    /// Backup file (JSON). Reads from stdin with "-".
    file: PathBuf,

    /// Output the chronological listing as CSV
    #[arg(long)]
    csv: bool,
}

/// Row for the chronological income listing
#[derive(Debug, Clone, Tabled, Serialize)]
pub struct IncomeRow {
    #[tabled(rename = "Date")]
    pub date: String,
    #[tabled(rename = "Id")]
    pub id: String,
    #[tabled(rename = "Quantity")]
    pub quantity: String,
    #[tabled(rename = "Amount")]
    pub amount: String,
    #[tabled(rename = "Description")]
    pub description: String,
}

impl From<&IncomeRecord> for IncomeRow {
    fn from(record: &IncomeRecord) -> Self {
        IncomeRow {
            date: record.date.format("%Y-%m-%d").to_string(),
            id: record.id.clone(),
            quantity: record.quantity.map_or(String::new(), |q| q.to_string()),
            amount: format!("{:.2}", record.amount.round_dp(2)),
            description: record.description.clone().unwrap_or_default(),
        }
    }
}

impl TimelineCommand {
    pub fn exec(&self) -> anyhow::Result<()> {
        let backup = read_backup(&self.file)?;
        let rows: Vec<IncomeRow> = egg_income_chronological(&backup.records)
            .into_iter()
            .map(IncomeRow::from)
            .collect();

        if self.csv {
            let mut wtr = csv::Writer::from_writer(io::stdout());
            for row in &rows {
                wtr.serialize(row)?;
            }
            wtr.flush()?;
            return Ok(());
        }

        let timeline = analyze_timeline(&backup.records);
        let ledger = compute_totals(&backup.records);

        println!();
        println!(
            "DATE RANGE ANALYSIS ({}, sha256 {})",
            self.file.display(),
            short_fingerprint(&backup.fingerprint)
        );
        println!();
        print_timeline(&timeline);
        println!(
            "   Total laid: {} eggs",
            format_count(ledger.laid)
        );
        println!(
            "   Sold: {} eggs for {} | Donated: {} eggs",
            format_count(ledger.sold_quantity),
            format_money(ledger.egg_sales),
            format_count(ledger.donated_quantity)
        );
        println!();

        if rows.is_empty() {
            println!("No egg income records");
            return Ok(());
        }

        println!("EGG INCOME (chronological)");
        let table = Table::new(&rows)
            .with(Style::rounded())
            .with(Modify::new(Columns::new(2..4)).with(Alignment::right()))
            .to_string();
        println!("{}", table);
        Ok(())
    }
}
