pub mod display;
pub mod duplicates;
pub mod fix;
pub mod report;
pub mod roi;
pub mod schema;
pub mod timeline;

use crate::core::{self, Backup};
use anyhow::Context;
use clap::Args;
use rust_decimal::Decimal;
use std::fs::File;
use std::io::{self, BufReader, Read};
use std::path::Path;

/// Parameters for valuing eggs eaten at home
#[derive(Args, Debug, Clone)]
pub struct RoiArgs {
    /// Eggs currently on hand (neither sold nor eaten yet)
    #[arg(long, default_value_t = 0)]
    pub eggs_on_hand: u64,

    /// Value of a dozen eggs consumed at home
    #[arg(long, default_value = "4.00")]
    pub price_per_dozen: Decimal,
}

/// Read a backup from a file (or stdin with "-")
pub fn read_backup(path: &Path) -> anyhow::Result<Backup> {
    if path.as_os_str() == "-" {
        read_from_stdin()
    } else {
        read_from_file(path)
    }
}

fn read_from_file(path: &Path) -> anyhow::Result<Backup> {
    let file = File::open(path).with_context(|| format!("opening {}", path.display()))?;
    let backup = core::read_backup(BufReader::new(file))
        .with_context(|| format!("loading {}", path.display()))?;
    Ok(backup)
}

fn read_from_stdin() -> anyhow::Result<Backup> {
    let stdin = io::stdin();
    let mut reader = BufReader::new(stdin.lock());

    let mut buffer = Vec::new();
    reader.read_to_end(&mut buffer)?;

    if buffer.is_empty() {
        anyhow::bail!("No input received. Provide a file or pipe a backup to stdin.");
    }

    Ok(core::backup::parse_backup(&buffer)?)
}
