//! Fix command - divide egg income quantities and write a corrected copy
//!
//! The original backup is never overwritten. Running the fix again on its own
//! output divides the quantities a second time; always start from the original.

use crate::cmd::display::{format_count, format_money, format_share, short_fingerprint};
use crate::cmd::read_backup;
use crate::core::{
    apply_unit_fix, compute_totals, corrected_output_path, detect_imbalance, ImbalanceReport,
    Ledger, EGGS_PER_DOZEN,
};
use anyhow::Context;
use clap::Args;
use sha2::{Digest, Sha256};
use std::path::PathBuf;

/// Changes listed individually before the rest are summarised
const SHOWN_CHANGES: usize = 5;

#[derive(Args, Debug)]
pub struct FixCommand {
    /// Original backup file (JSON). Reads from stdin with "-" (requires --output).
    file: PathBuf,

    /// Divide every egg income quantity by this factor (rounding down)
    #[arg(short, long, default_value_t = EGGS_PER_DOZEN)]
    divisor: u64,

    /// Where to write the corrected backup (default: <name>-CORRECTED.json next to the input)
    #[arg(short, long)]
    output: Option<PathBuf>,
}

impl FixCommand {
    pub fn exec(&self) -> anyhow::Result<()> {
        let output_path = corrected_output_path(&self.file, self.output.as_deref())?;
        let backup = read_backup(&self.file)?;

        let correction = apply_unit_fix(&backup.records.income, self.divisor)?;
        let document = backup.corrected_document(&correction.records)?;
        let json = serde_json::to_string_pretty(&document)?;
        std::fs::write(&output_path, &json)
            .with_context(|| format!("writing {}", output_path.display()))?;

        let before = compute_totals(&backup.records);
        let mut corrected_records = backup.records.clone();
        corrected_records.income = correction.records.clone();
        let after = compute_totals(&corrected_records);

        println!();
        println!("CORRECTED BACKUP");
        println!(
            "  Source: {} (sha256 {})",
            self.file.display(),
            short_fingerprint(&backup.fingerprint)
        );
        println!(
            "  Output: {} (sha256 {})",
            output_path.display(),
            short_fingerprint(&hex::encode(Sha256::digest(json.as_bytes())))
        );
        println!();
        println!(
            "Divided {} egg income quantities by {}",
            correction.modified(),
            correction.divisor
        );
        for change in correction.changes.iter().take(SHOWN_CHANGES) {
            println!(
                "  {}: {} \u{2192} {} eggs, {}",
                change.date,
                format_count(change.before),
                format_count(change.after),
                format_money(change.amount)
            );
        }
        if correction.modified() > SHOWN_CHANGES {
            println!("  ... and {} more", correction.modified() - SHOWN_CHANGES);
        }
        println!();

        print_totals("Before", &before, &detect_imbalance(&before));
        let imbalance = detect_imbalance(&after);
        print_totals("After", &after, &imbalance);

        if imbalance.is_imbalanced() {
            println!(
                "\u{26A0} Still over by {} eggs; the divisor alone does not explain the imbalance",
                format_count(imbalance.headroom().saturating_neg())
            );
        } else {
            println!(
                "\u{2713} Sold + donated now fits within net laid ({} of eggs)",
                format_share(imbalance.claimed, imbalance.net_laid)
            );
        }
        println!("Review the corrected file before importing it. Do not run fix on its output again.");
        println!();
        Ok(())
    }
}

fn print_totals(label: &str, ledger: &Ledger, imbalance: &ImbalanceReport) {
    println!("{}:", label);
    println!("  Net laid: {} eggs", format_count(ledger.net_laid()));
    println!(
        "  Sold: {} | Donated: {} | Total: {}",
        format_count(ledger.sold_quantity),
        format_count(ledger.donated_quantity),
        format_count(ledger.claimed())
    );
    println!(
        "  Remaining (consumed or on hand): {}",
        format_count(imbalance.headroom())
    );
    println!();
}
