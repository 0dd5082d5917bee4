//! Schema command - print the backup format the loader accepts

use crate::core::{BackupInput, ExpenseEntry, IncomeEntry, ProductionEntry, SchemaField};
use clap::Args;
use schemars::schema_for;

#[derive(Args, Debug)]
pub struct SchemaCommand {
    /// Output format: json-schema or fields
    #[arg(value_enum, default_value = "json-schema")]
    format: SchemaFormat,
}

#[derive(Debug, Clone, Copy, clap::ValueEnum)]
pub enum SchemaFormat {
    /// JSON Schema for the backup document
    JsonSchema,
    /// Field descriptions per collection
    Fields,
}

impl SchemaCommand {
    pub fn exec(&self) -> anyhow::Result<()> {
        match self.format {
            SchemaFormat::JsonSchema => self.print_json_schema(),
            SchemaFormat::Fields => self.print_fields(),
        }
    }

    fn print_json_schema(&self) -> anyhow::Result<()> {
        let schema = schema_for!(BackupInput);
        println!("{}", serde_json::to_string_pretty(&schema)?);
        Ok(())
    }

    fn print_fields(&self) -> anyhow::Result<()> {
        println!("Backup Input Format");
        println!("===================");
        print_collection("data.eggProduction", ProductionEntry::record_schema());
        print_collection("data.income", IncomeEntry::record_schema());
        print_collection("data.expenses", ExpenseEntry::record_schema());
        println!();
        println!("Unknown fields are ignored on load and kept verbatim in corrected copies.");
        Ok(())
    }
}

fn print_collection(collection: &str, fields: &[SchemaField]) {
    println!();
    println!("{}", collection);
    for field in fields {
        let req = if field.required { "required" } else { "optional" };
        println!("  {:20} ({:8})  {}", field.name, req, field.description);
    }
}
