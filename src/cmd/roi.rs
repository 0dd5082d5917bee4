//! ROI command - return on investment including eggs eaten at home

use crate::cmd::display::short_fingerprint;
use crate::cmd::report::print_roi;
use crate::cmd::{read_backup, RoiArgs};
use crate::core::{compute_totals, roi::compute_roi};
use clap::Args;
use std::path::PathBuf;

#[derive(Args, Debug)]
pub struct RoiCommand {
    /// Backup file (JSON). Reads from stdin with "-".
    file: PathBuf,

    #[command(flatten)]
    roi: RoiArgs,

    /// Output as JSON instead of formatted text
    #[arg(long)]
    json: bool,
}

impl RoiCommand {
    pub fn exec(&self) -> anyhow::Result<()> {
        let backup = read_backup(&self.file)?;
        let ledger = compute_totals(&backup.records);
        let roi = compute_roi(&ledger, self.roi.eggs_on_hand, self.roi.price_per_dozen);

        if self.json {
            println!("{}", serde_json::to_string_pretty(&roi)?);
            return Ok(());
        }

        println!();
        println!(
            "RETURN ON INVESTMENT ({}, sha256 {})",
            self.file.display(),
            short_fingerprint(&backup.fingerprint)
        );
        println!();
        print_roi(roi.as_ref(), &self.roi, "");
        Ok(())
    }
}
