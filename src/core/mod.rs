pub mod backup;
pub mod correction;
pub mod diagnosis;
pub mod diagnostics;
pub mod duplicates;
pub mod imbalance;
pub mod ledger;
pub mod pricing;
pub mod records;
pub mod roi;
pub mod timeline;

/// Eggs in a dozen; the conversion factor behind the unit-mismatch heuristic.
pub const EGGS_PER_DOZEN: u64 = 12;

// Flat public surface for domain types and functions.
pub use backup::{
    corrected_output_path, read_backup, Backup, BackupInput, ExpenseEntry, IncomeEntry,
    ProductionEntry, SchemaField,
};
pub use correction::apply_unit_fix;
#[allow(unused_imports)]
pub use correction::{Correction, CorrectionError, QuantityChange};
pub use diagnosis::{diagnose, Diagnosis};
pub use diagnostics::Diagnostic;
pub use duplicates::{find_duplicates, surplus_quantity, DuplicateGroups};
#[allow(unused_imports)]
pub use duplicates::DuplicateKey;
pub use imbalance::{detect_imbalance, ImbalanceReport, ImbalanceStatus, RootCause};
#[allow(unused_imports)]
pub use imbalance::{classify_root_cause, Undetermined};
pub use ledger::{compute_totals, Ledger};
pub use pricing::PriceAnalysis;
pub use records::IncomeRecord;
#[allow(unused_imports)]
pub use records::{Category, RecordSet};
#[allow(unused_imports)]
pub use backup::LoadError;
pub use roi::RoiResult;
pub use timeline::{egg_income_chronological, Timeline};
