//! Report command - totals, imbalance check, root cause and ROI in one pass

use crate::cmd::display::{format_count, format_money, format_ratio, format_share, short_fingerprint};
use crate::cmd::duplicates::{duplicate_rows, duplicate_table, DuplicateRow};
use crate::cmd::{read_backup, RoiArgs};
use crate::core::{
    diagnose, surplus_quantity, Diagnosis, Diagnostic, ImbalanceReport, ImbalanceStatus, Ledger,
    PriceAnalysis, RoiResult, RootCause, Timeline, EGGS_PER_DOZEN,
};
use clap::Args;
use serde::Serialize;
use std::path::PathBuf;

#[derive(Args, Debug)]
pub struct ReportCommand {
    /// Backup file (JSON). Reads from stdin with "-".
    file: PathBuf,

    #[command(flatten)]
    roi: RoiArgs,

    /// Output as JSON instead of formatted text
    #[arg(long)]
    json: bool,
}

/// JSON output structure
#[derive(Debug, Serialize)]
struct ReportOutput<'a> {
    source: String,
    sha256: &'a str,
    totals: &'a Ledger,
    imbalance: &'a ImbalanceReport,
    duplicate_groups: Vec<DuplicateRow>,
    root_cause: Option<&'a RootCause>,
    root_cause_is_heuristic: bool,
    roi: Option<&'a RoiResult>,
    timeline: &'a Timeline,
    income_precedes_production: bool,
    price_per_dozen: Option<&'a PriceAnalysis>,
    diagnostics: Vec<DiagnosticView<'a>>,
}

#[derive(Debug, Serialize)]
struct DiagnosticView<'a> {
    #[serde(flatten)]
    diagnostic: &'a Diagnostic,
    message: String,
}

impl ReportCommand {
    pub fn exec(&self) -> anyhow::Result<()> {
        let backup = read_backup(&self.file)?;
        let diagnosis = diagnose(
            &backup.records,
            self.roi.eggs_on_hand,
            self.roi.price_per_dozen,
        );

        if self.json {
            self.print_json(&diagnosis, &backup.fingerprint)?;
        } else {
            self.print_text(&diagnosis, &backup.fingerprint, backup.records.income.len());
        }

        // Exit with code 1 if the invariant does not hold
        if diagnosis.imbalance.is_imbalanced() {
            std::process::exit(1);
        }
        Ok(())
    }

    fn print_text(&self, diagnosis: &Diagnosis, fingerprint: &str, income_records: usize) {
        let ledger = &diagnosis.ledger;
        let imbalance = &diagnosis.imbalance;

        println!();
        println!("LEDGER RECONCILIATION REPORT");
        println!(
            "  Backup: {} (sha256 {})",
            self.file.display(),
            short_fingerprint(fingerprint)
        );
        println!();

        println!("1. FINANCIAL SUMMARY");
        println!("   Total Expenses: {}", format_money(ledger.expenses));
        println!("   Total Income (cash): {}", format_money(ledger.cash_income));
        println!("   Egg Sales (cash): {}", format_money(ledger.egg_sales));
        println!();

        println!("2. EGG PRODUCTION");
        println!("   Total Laid: {} eggs", format_count(ledger.laid));
        println!("   Total Broken: {} eggs", format_count(ledger.broken));
        println!("   Net Laid (after broken): {} eggs", format_count(ledger.net_laid()));
        println!();

        println!("3. INCOME RECORDS (eggs)");
        println!(
            "   Sold (amount > 0): {} eggs over {} records",
            format_count(ledger.sold_quantity),
            ledger.sold_records
        );
        println!(
            "   Donated (amount = 0): {} eggs over {} records",
            format_count(ledger.donated_quantity),
            ledger.donated_records
        );
        println!("   Total from income: {} eggs", format_count(ledger.claimed()));
        println!();

        println!("4. INVARIANT: sold + donated <= net laid");
        match &imbalance.status {
            ImbalanceStatus::Balanced => {
                println!(
                    "   \u{2713} Holds: {} of {} net laid eggs accounted for ({})",
                    format_count(imbalance.claimed),
                    format_count(imbalance.net_laid),
                    format_share(imbalance.claimed, imbalance.net_laid)
                );
            }
            ImbalanceStatus::Exceeded { excess, ratio } => {
                println!(
                    "   \u{26A0} VIOLATED: {} claimed vs {} net laid ({} over, ratio {})",
                    format_count(imbalance.claimed),
                    format_count(imbalance.net_laid),
                    format_count(*excess),
                    format_ratio(Some(*ratio))
                );
            }
            ImbalanceStatus::Undetermined { .. } => {
                println!(
                    "   \u{26A0} VIOLATED: {} claimed vs {} net laid (ratio undetermined)",
                    format_count(imbalance.claimed),
                    format_count(imbalance.net_laid)
                );
            }
        }
        match ledger.claimed_if_dozens() {
            Some(eggs) => println!("   If quantities were dozens: {} eggs", format_count(eggs)),
            None => println!("   If quantities were dozens: N/A (out of range)"),
        }
        match ledger.claimed_as_dozens() {
            Some(dozens) => println!("   If quantities are eggs: {:.1} dozen", dozens.round_dp(1)),
            None => println!("   If quantities are eggs: N/A (out of range)"),
        }
        println!();

        println!("5. DUPLICATE INCOME RECORDS ({} records checked)", income_records);
        if diagnosis.duplicates.is_empty() {
            println!("   \u{2713} No exact duplicates found");
        } else {
            println!(
                "   \u{26A0} {} set(s) of duplicates, {} surplus eggs",
                diagnosis.duplicates.len(),
                format_count(surplus_quantity(&diagnosis.duplicates))
            );
            println!("{}", duplicate_table(&duplicate_rows(&diagnosis.duplicates)));
        }
        println!();

        println!("6. ROOT CAUSE");
        match &diagnosis.root_cause {
            None => println!("   No imbalance to explain"),
            Some(cause) => {
                for line in root_cause_lines(cause, diagnosis) {
                    println!("   {}", line);
                }
            }
        }
        println!();

        print_roi(diagnosis.roi.as_ref(), &self.roi, "7.");

        println!("8. TIMELINE");
        print_timeline(&diagnosis.timeline);
        println!();

        println!("9. PRICE PER DOZEN (egg sales)");
        match &diagnosis.prices {
            Some(prices) => {
                println!(
                    "   Average: {} | Min: {} | Max: {} ({} sales)",
                    format_money(prices.average),
                    format_money(prices.min),
                    format_money(prices.max),
                    prices.sampled
                );
            }
            None => println!("   N/A (no sales with a quantity)"),
        }
        println!();

        if !diagnosis.diagnostics.is_empty() {
            println!("DIAGNOSTICS");
            for diagnostic in &diagnosis.diagnostics {
                println!("   \u{26A0} {}", diagnostic.message());
            }
            println!();
        }
    }

    fn print_json(&self, diagnosis: &Diagnosis, fingerprint: &str) -> anyhow::Result<()> {
        let output = ReportOutput {
            source: self.file.display().to_string(),
            sha256: fingerprint,
            totals: &diagnosis.ledger,
            imbalance: &diagnosis.imbalance,
            duplicate_groups: duplicate_rows(&diagnosis.duplicates),
            root_cause: diagnosis.root_cause.as_ref(),
            root_cause_is_heuristic: diagnosis
                .root_cause
                .as_ref()
                .is_some_and(RootCause::is_heuristic),
            roi: diagnosis.roi.as_ref(),
            timeline: &diagnosis.timeline,
            income_precedes_production: diagnosis.timeline.income_precedes_production(),
            price_per_dozen: diagnosis.prices.as_ref(),
            diagnostics: diagnosis
                .diagnostics
                .iter()
                .map(|d| DiagnosticView {
                    diagnostic: d,
                    message: d.message(),
                })
                .collect(),
        };

        println!("{}", serde_json::to_string_pretty(&output)?);
        Ok(())
    }
}

fn root_cause_lines(cause: &RootCause, diagnosis: &Diagnosis) -> Vec<String> {
    match cause {
        RootCause::DuplicateRecords { groups } => vec![
            format!(
                "DuplicateRecords: {} group(s) of identical income records ({} surplus eggs)",
                groups,
                format_count(surplus_quantity(&diagnosis.duplicates))
            ),
            "Remove the extra copies before considering any unit conversion.".to_string(),
        ],
        RootCause::UnitMismatch {
            ratio,
            suggested_divisor,
        } => vec![
            format!(
                "UnitMismatch (HEURISTIC, unverified): ratio {} is close to {} eggs per dozen",
                format_ratio(Some(*ratio)),
                EGGS_PER_DOZEN
            ),
            "Quantities may have been entered in the wrong unit.".to_string(),
            format!(
                "Candidate fix: eggledger fix <FILE> --divisor {} (review before importing)",
                suggested_divisor
            ),
        ],
        RootCause::Unexplained { ratio } => vec![
            format!(
                "Unexplained: sold + donated exceeds net laid (ratio {})",
                format_ratio(*ratio)
            ),
            "Neither duplicates nor a dozen/egg mix-up accounts for it; review the records manually."
                .to_string(),
        ],
    }
}

pub(crate) fn print_roi(roi: Option<&RoiResult>, args: &RoiArgs, heading: &str) {
    println!("{}", format!("{} ROI CALCULATION", heading).trim_start());
    let Some(roi) = roi else {
        println!("   N/A (figures beyond decimal range)");
        println!();
        return;
    };
    println!(
        "   Eggs consumed: {} eggs (on hand: {})",
        format_count(roi.consumed),
        format_count(args.eggs_on_hand)
    );
    println!(
        "   Consumption savings: {} (at {}/dozen)",
        format_money(roi.savings),
        format_money(args.price_per_dozen)
    );
    println!("   Cash income: {}", format_money(roi.cash_income));
    println!("   Total income (with savings): {}", format_money(roi.total_income));
    println!("   Expenses: {}", format_money(roi.expenses));
    if roi.expenses_absent {
        println!("   ROI: {} (N/A %, no expenses recorded)", format_money(roi.roi));
    } else {
        println!(
            "   ROI: {} ({:.1}%)",
            format_money(roi.roi),
            roi.roi_pct.round_dp(1)
        );
    }
    if roi.consumed < 0 {
        println!("   \u{26A0} Negative consumption: income records claim more eggs than were laid");
    }
    println!();
}

pub(crate) fn print_timeline(timeline: &Timeline) {
    match timeline.production {
        Some(range) => println!(
            "   Production: {} to {} ({} records)",
            range.first, range.last, range.records
        ),
        None => println!("   Production: N/A (no records)"),
    }
    match timeline.egg_income {
        Some(range) => println!(
            "   Egg income: {} to {} ({} records)",
            range.first, range.last, range.records
        ),
        None => println!("   Egg income: N/A (no records)"),
    }
    if timeline.income_precedes_production() {
        println!("   \u{26A0} Egg income starts BEFORE egg production records");
    }
}
