mod cmd;
mod core;

use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "eggledger")]
#[command(version)]
#[command(about = "Reconcile egg production against sales and donations in a tracker backup")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Full reconciliation report (exits 1 when sold + donated exceeds net laid)
    Report(cmd::report::ReportCommand),
    /// List income records that are exact duplicates of each other
    Duplicates(cmd::duplicates::DuplicatesCommand),
    /// Return on investment including eggs consumed at home
    Roi(cmd::roi::RoiCommand),
    /// Production and egg income date ranges
    Timeline(cmd::timeline::TimelineCommand),
    /// Write a corrected copy with egg income quantities divided
    Fix(cmd::fix::FixCommand),
    /// Print the expected backup format
    Schema(cmd::schema::SchemaCommand),
}

fn main() -> anyhow::Result<()> {
    pretty_env_logger::init();
    let cli = Cli::parse();

    match cli.command {
        Command::Report(report) => report.exec(),
        Command::Duplicates(duplicates) => duplicates.exec(),
        Command::Roi(roi) => roi.exec(),
        Command::Timeline(timeline) => timeline.exec(),
        Command::Fix(fix) => fix.exec(),
        Command::Schema(schema) => schema.exec(),
    }
}
